//! Eigenvalues of symmetric matrices, used to check positive semi-definiteness of gram matrices.
//!
//! Computed by Lapack (dsyevd) through ndarray-linalg, only the lower triangle is read.

use ndarray::ArrayView2;
use ndarray_linalg::{EigValsh, UPLO};

use crate::error::{Result, SwwlError};


/// eigenvalues of a symmetric matrix in increasing order
pub fn symmetric_eigenvalues(matrix: ArrayView2<f64>) -> Result<Vec<f64>> {
    if matrix.nrows() != matrix.ncols() {
        return Err(SwwlError::dimension("eigenvalues of non square matrix", matrix.nrows(), matrix.ncols()));
    }
    if matrix.is_empty() {
        return Err(SwwlError::InvalidParameter("eigenvalues of empty matrix".into()));
    }
    if matrix.iter().any(|x| !x.is_finite()) {
        return Err(SwwlError::InvalidParameter("eigenvalues of matrix with non finite entries".into()));
    }
    let eigenvalues = matrix.eigvalsh(UPLO::Lower).map_err(|e| SwwlError::Linalg(e.to_string()))?;
    let mut eigenvalues = eigenvalues.to_vec();
    eigenvalues.sort_unstable_by(|a, b| a.total_cmp(b));
    Ok(eigenvalues)
} // end of symmetric_eigenvalues


/// smallest eigenvalue of a symmetric matrix
pub fn min_eigenvalue(matrix: ArrayView2<f64>) -> Result<f64> {
    let eigenvalues = symmetric_eigenvalues(matrix)?;
    eigenvalues.first().copied().ok_or_else(|| SwwlError::InvalidParameter("eigenvalues of empty matrix".into()))
}



#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::{array, Array2};
    use rand::Rng;
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn test_eigenvalues_small() {
        let m = array![[2., 1.], [1., 2.]];
        let eig = symmetric_eigenvalues(m.view()).unwrap();
        assert!((eig[0] - 1.).abs() < 1.0e-12 && (eig[1] - 3.).abs() < 1.0e-12);
        //
        let m = array![[4., 1., 0.], [1., 3., 1.], [0., 1., 4.]];
        // (1, 0, -1) has eigenvalue 4, the symetric subspace gives 2 and 5
        let eig = symmetric_eigenvalues(m.view()).unwrap();
        for (x, y) in eig.iter().zip([2., 4., 5.].iter()) {
            assert!((x - y).abs() < 1.0e-10, "got {:?}", eig);
        }
        assert_eq!(min_eigenvalue(array![[-1.5]].view()).unwrap(), -1.5);
    } // end of test_eigenvalues_small

    // trace and frobenius norm are preserved, and B^t B has non negative eigenvalues
    #[test]
    fn test_eigenvalues_random() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(2023);
        let n = 25;
        let b = Array2::<f64>::from_shape_fn((n, n), |_| rng.gen_range(-1.0..1.0));
        let s = &b + &b.t();
        let eig = symmetric_eigenvalues(s.view()).unwrap();
        let trace: f64 = s.diag().sum();
        let frob: f64 = s.iter().map(|x| x * x).sum();
        assert!((eig.iter().sum::<f64>() - trace).abs() < 1.0e-9);
        assert!((eig.iter().map(|x| x * x).sum::<f64>() - frob).abs() < 1.0e-8);
        //
        let gram = b.t().dot(&b);
        assert!(min_eigenvalue(gram.view()).unwrap() > -1.0e-10);
        assert!(symmetric_eigenvalues(Array2::<f64>::zeros((2, 3)).view()).is_err());
    } // end of test_eigenvalues_random

    #[test]
    fn test_eigenvalues_non_finite() {
        let m = array![[1., f64::NAN], [f64::NAN, 1.]];
        assert!(min_eigenvalue(m.view()).is_err());
        let m = array![[f64::INFINITY, 0.], [0., 1.]];
        assert!(symmetric_eigenvalues(m.view()).is_err());
    }

} // end of mod tests
