//! Sliced Wasserstein distances between graphs and distance matrices.

pub mod assembler;
pub mod matrix;

pub use assembler::{sliced_wasserstein, DistanceAssembler, LevelAggregation};
pub use matrix::{CrossDistanceMatrix, CrossDistanceStack, DistanceMatrix, DistanceRow, DistanceStack};
