//! Random projections and quantile sketches.
//!
//! A [DirectionSet] per level is sampled once for a run and shared by all graphs.
//! Each graph level is summarized by a [QuantileSketch] of shape (P, Q).

pub mod directions;
pub mod params;
pub mod quantile;

pub use directions::{DirectionSet, LevelDirections};
pub use params::{DirectionPolicy, Interpolation, QuantileGrid, SketchParams};
pub use quantile::{GraphSketch, QuantileSketch};
