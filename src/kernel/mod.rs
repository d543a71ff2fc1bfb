//! From distances to kernels.
//!
//! A distance matrix is converted to a gram matrix with an exponential or power exponential kernel,
//! the bandwidth being fixed or estimated from the distances.
//! Positive semi-definiteness is checked through the min eigenvalue computed by Lapack.

pub mod eigen;
pub mod gram;
pub mod params;
pub mod tensor;

pub use eigen::{min_eigenvalue, symmetric_eigenvalues};
pub use gram::{GramMatrix, KernelConverter};
pub use params::{Bandwidth, KernelFamily, KernelParams};
pub use tensor::{matern52, scalar_cross_distance_matrices, scalar_distance_matrices, TensorFamily, TensorKernel};
