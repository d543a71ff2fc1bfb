//! Sliced Wasserstein Weisfeiler-Lehman graph kernel.
//!
//! Graphs with continuous node attributes are compared through:
//! - continuous Weisfeiler-Lehman propagation of node attributes, see [wl],
//! - random projections of each level on shared directions and quantile sketches
//!   of the projected distributions, see [sliced],
//! - sliced Wasserstein distances between sketches, see [distance],
//! - conversion of distances to a positive semi-definite Gram matrix, see [kernel].
//!
//! The [swwl] module ties all these steps together.


use env_logger::{Builder};

#[macro_use]
extern crate  lazy_static;

lazy_static! {
    static ref LOG: u64 = {
        let res = init_log_once();
        res
    };
}

// install a logger facility
fn init_log_once() -> u64 {
    let res = Builder::from_default_env().try_init();
    if res.is_err() {
        // a logger was already installed by the calling application
        return 0;
    }
    log::info!("logger initialized");
    return 1;
}

/// installs an env_logger backend (driven by RUST_LOG), at most once.
/// Returns 1 if the logger was installed by this call sequence, 0 if another logger was already present.
pub fn init_log() -> u64 {
    *LOG
}

pub mod error;

pub mod graph;

pub mod wl;

pub mod sliced;

pub mod distance;

pub mod kernel;

pub mod swwl;

pub mod prelude;

pub use error::{SwwlError, Result};
