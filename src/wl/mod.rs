//! Continuous Weisfeiler-Lehman propagation.
//!
//! Level 0 is the node attribute matrix. Each level h >= 1 is obtained from level h-1
//! by [WlParams::step] passes of neighbour aggregation.

pub mod params;
pub mod propagator;

pub use params::{LevelPolicy, NeighbourAggregation, WlParams};
pub use propagator::{LevelEmbedding, WlPropagator};
