//! Sliced Wasserstein Weisfeiler-Lehman distances and kernels between attributed graphs.

pub mod cache;
pub mod engine;
pub mod params;

pub use cache::CacheKey;
pub use engine::{SketchBatch, SwwlEngine};
pub use params::SwwlParams;
