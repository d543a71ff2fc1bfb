//! To ease access to most frequently used items
//!

pub use crate::error::{Result, SwwlError};

pub use crate::graph::{Graph, GraphBuilder};

pub use crate::wl::{LevelEmbedding, LevelPolicy, NeighbourAggregation, WlParams, WlPropagator};

pub use crate::sliced::{DirectionPolicy, DirectionSet, GraphSketch, Interpolation, LevelDirections, QuantileGrid, QuantileSketch, SketchParams};

pub use crate::distance::{sliced_wasserstein, CrossDistanceMatrix, CrossDistanceStack, DistanceAssembler, DistanceMatrix, DistanceRow, DistanceStack, LevelAggregation};

pub use crate::kernel::{Bandwidth, GramMatrix, KernelConverter, KernelFamily, KernelParams, TensorFamily, TensorKernel};
pub use crate::kernel::{scalar_cross_distance_matrices, scalar_distance_matrices};

pub use crate::swwl::{CacheKey, SketchBatch, SwwlEngine, SwwlParams};
