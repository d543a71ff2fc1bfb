//! Conversion of distance matrices to gram matrices.

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::eigen::min_eigenvalue;
use super::params::*;
use crate::distance::{CrossDistanceMatrix, DistanceMatrix};
use crate::error::{Result, SwwlError};


/// A symmetric positive semi-definite similarity matrix between graphs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GramMatrix {
    data: Array2<f64>,
    /// bandwidth used, None for composite kernels
    sigma: Option<f64>,
    /// min eigenvalue if it was computed
    min_eigenvalue: Option<f64>,
} // end of GramMatrix


impl GramMatrix {

    pub(crate) fn new(data: Array2<f64>, sigma: Option<f64>) -> Self {
        GramMatrix { data, sigma, min_eigenvalue: None }
    }

    pub fn get_nb_graphs(&self) -> usize {
        self.data.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[[i, j]]
    }

    pub fn get_data(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    pub fn get_sigma(&self) -> Option<f64> {
        self.sigma
    }

    /// smallest eigenvalue, computed once and kept
    pub fn min_eigenvalue(&mut self) -> Result<f64> {
        if let Some(lambda) = self.min_eigenvalue {
            return Ok(lambda);
        }
        let lambda = min_eigenvalue(self.data.view())?;
        self.min_eigenvalue = Some(lambda);
        Ok(lambda)
    }

    /// returns the min eigenvalue, or NonPsdResult if it is below -tolerance or not finite
    pub fn check_psd(&mut self, tolerance: f64) -> Result<f64> {
        let lambda = self.min_eigenvalue()?;
        if !lambda.is_finite() || lambda < -tolerance {
            return Err(SwwlError::NonPsdResult { min_eigenvalue: lambda, tolerance });
        }
        Ok(lambda)
    }

    /// block of rows and columns, typically test x train
    pub fn block(&self, rows: &[usize], cols: &[usize]) -> Result<Array2<f64>> {
        let n = self.get_nb_graphs();
        if let Some(i) = rows.iter().chain(cols.iter()).find(|i| **i >= n) {
            return Err(SwwlError::InvalidParameter(format!("block index {} out of range, nb graphs {}", i, n)));
        }
        Ok(self.data.select(Axis(0), rows).select(Axis(1), cols))
    }

} // end of impl GramMatrix



/// Converts distances to similarities with a kernel family and a bandwidth.
#[derive(Debug, Copy, Clone)]
pub struct KernelConverter {
    params: KernelParams,
}


impl KernelConverter {

    pub fn new(params: KernelParams) -> Result<Self> {
        params.check()?;
        Ok(KernelConverter { params })
    }

    pub fn get_params(&self) -> &KernelParams {
        &self.params
    }

    /// bandwidth to use for a distance matrix.
    /// An estimated bandwidth maps the reference distance (median or quantile of off diagonal distances) to similarity exp(-1).
    /// If the reference distance is null (all graphs at null distance or a single graph) we fall back to 1.
    pub fn estimate_bandwidth(&self, distances: &DistanceMatrix) -> f64 {
        let reference = match self.params.bandwidth {
            Bandwidth::Fixed(sigma) => return sigma,
            Bandwidth::Median => distances.off_diagonal_quantile(0.5),
            Bandwidth::Quantile(q) => distances.off_diagonal_quantile(q),
        };
        match reference {
            Some(d) if d > 0. => {
                let sigma = self.params.family.sigma_for_reference(d);
                log::debug!("estimated bandwidth {:.3e} from reference distance {:.3e}", sigma, d);
                sigma
            },
            _ => {
                log::warn!("null reference distance, bandwidth set to 1.");
                1.
            },
        }
    } // end of estimate_bandwidth


    /// gram matrix with bandwidth estimated or fixed according to parameters
    pub fn gram(&self, distances: &DistanceMatrix) -> Result<GramMatrix> {
        let sigma = self.estimate_bandwidth(distances);
        self.gram_with_sigma(distances, sigma)
    }


    /// gram matrix with a given bandwidth.
    /// If psd check is asked for and fails, a warning is logged and the matrix is still returned,
    /// the caller can query [GramMatrix::check_psd] and re-estimate the bandwidth.
    pub fn gram_with_sigma(&self, distances: &DistanceMatrix, sigma: f64) -> Result<GramMatrix> {
        if !(sigma.is_finite() && sigma > 0.) {
            return Err(SwwlError::InvalidParameter(format!("bandwidth must be > 0, got {}", sigma)));
        }
        let family = self.params.family;
        let data = distances.get_data().mapv(|d| family.evaluate(d, sigma));
        let mut gram = GramMatrix::new(data, Some(sigma));
        if self.params.check_psd {
            match gram.check_psd(self.params.psd_tolerance) {
                Err(SwwlError::NonPsdResult { min_eigenvalue, tolerance }) => {
                    log::warn!("gram matrix not psd, min eigenvalue {:.3e} < -{:.1e}, sigma {:.3e}", min_eigenvalue, tolerance, sigma);
                },
                Err(e) => return Err(e),
                Ok(lambda) => log::debug!("gram matrix min eigenvalue {:.3e}", lambda),
            }
        }
        Ok(gram)
    } // end of gram_with_sigma


    /// similarities between test graphs (rows) and train graphs (columns), with the train bandwidth
    pub fn cross_gram(&self, distances: &CrossDistanceMatrix, sigma: f64) -> Result<Array2<f64>> {
        if !(sigma.is_finite() && sigma > 0.) {
            return Err(SwwlError::InvalidParameter(format!("bandwidth must be > 0, got {}", sigma)));
        }
        let family = self.params.family;
        Ok(distances.get_data().mapv(|d| family.evaluate(d, sigma)))
    }

} // end of impl KernelConverter



#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn line_distances(points: &[f64]) -> DistanceMatrix {
        let n = points.len();
        DistanceMatrix::from_array(Array2::from_shape_fn((n, n), |(i, j)| (points[i] - points[j]).abs())).unwrap()
    }

    #[test]
    fn test_gram_fixed_sigma() {
        log_init_test();
        let d = line_distances(&[0., 1., 3.]);
        let converter = KernelConverter::new(KernelParams::new(KernelFamily::Exponential, Bandwidth::Fixed(1.), 1.0e-6, true)).unwrap();
        let mut gram = converter.gram(&d).unwrap();
        assert_eq!(gram.get_sigma(), Some(1.));
        assert_eq!(gram.get(0, 0), 1.);
        assert!((gram.get(0, 2) - (-1.5f64).exp()).abs() < 1.0e-15);
        assert!(gram.check_psd(1.0e-6).is_ok());
    }

    #[test]
    fn test_median_bandwidth() {
        // off diagonal distances 1, 2, 3 : median 2
        let d = line_distances(&[0., 1., 3.]);
        let exp = KernelConverter::new(KernelParams::new(KernelFamily::Exponential, Bandwidth::Median, 1.0e-6, false)).unwrap();
        assert!((exp.estimate_bandwidth(&d) - 1.).abs() < 1.0e-15);
        let powexp = KernelConverter::new(KernelParams::new(KernelFamily::PowerExponential { alpha: 0.5 }, Bandwidth::Median, 1.0e-6, false)).unwrap();
        assert_eq!(powexp.estimate_bandwidth(&d), 2.);
        // all distances null
        let zero = line_distances(&[1., 1., 1.]);
        assert_eq!(exp.estimate_bandwidth(&zero), 1.);
    }

    // a matrix that is not a valid distance for exponential kernel gives a warning and NonPsdResult on check
    #[test]
    fn test_non_psd_reported() {
        log_init_test();
        let d = DistanceMatrix::from_array(array![[0., 0., 10.], [0., 0., 0.], [10., 0., 0.]]).unwrap();
        let converter = KernelConverter::new(KernelParams::new(KernelFamily::Exponential, Bandwidth::Fixed(1.), 1.0e-6, true)).unwrap();
        let mut gram = converter.gram(&d).unwrap();
        assert!(gram.min_eigenvalue().unwrap() < -1.0e-6);
        match gram.check_psd(1.0e-6) {
            Err(e) => assert!(e.is_warning()),
            Ok(_) => panic!("expected NonPsdResult"),
        }
    } // end of test_non_psd_reported

    // NaN never compares below the tolerance, it must not pass the check
    #[test]
    fn test_non_finite_not_psd() {
        log_init_test();
        let mut gram = GramMatrix::new(array![[1., f64::NAN], [f64::NAN, 1.]], None);
        assert!(gram.check_psd(1.0e-6).is_err());
        // a min eigenvalue restored from serialized data
        let mut gram = GramMatrix { data: Array2::eye(2), sigma: Some(1.), min_eigenvalue: Some(f64::NAN) };
        match gram.check_psd(1.0e-6) {
            Err(SwwlError::NonPsdResult { min_eigenvalue, .. }) => assert!(min_eigenvalue.is_nan()),
            other => panic!("expected NonPsdResult, got {:?}", other),
        }
        let mut gram = GramMatrix::new(Array2::eye(2), Some(1.));
        assert_eq!(gram.check_psd(1.0e-6).unwrap(), 1.);
    } // end of test_non_finite_not_psd

} // end of mod tests
