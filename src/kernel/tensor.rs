//! Tensor product kernels combining several sliced Wasserstein distance matrices
//! (one per level in the anisotropic setting) with Matern 5/2 kernels on scalar features of graphs.

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::gram::GramMatrix;
use crate::distance::{CrossDistanceStack, DistanceStack};
use crate::error::{Result, SwwlError};


#[cfg_attr(doc, katexit::katexit)]
/// Matern 5/2 kernel at distance r with length scale l :
/// $$ (1 + \frac{\sqrt{5} r}{l} + \frac{5 r^2}{3 l^2}) \exp(-\frac{\sqrt{5} r}{l}) $$
pub fn matern52(r: f64, length: f64) -> f64 {
    let x = 5f64.sqrt() * r / length;
    (1. + x + x * x / 3.) * (-x).exp()
}


/// distance matrices |s_i - s_j| for each column of a (nb graphs, nb scalars) matrix
pub fn scalar_distance_matrices(scalars: ArrayView2<f64>) -> Vec<Array2<f64>> {
    scalar_distances(scalars, scalars)
}

/// |s_i - t_j| for each column, rows from test scalars, columns from train scalars.
/// Both matrices must have the same number of columns.
pub fn scalar_cross_distance_matrices(test: ArrayView2<f64>, train: ArrayView2<f64>) -> Result<Vec<Array2<f64>>> {
    if test.ncols() != train.ncols() {
        return Err(SwwlError::dimension("number of scalar features of test and train graphs", train.ncols(), test.ncols()));
    }
    Ok(scalar_distances(test, train))
}

fn scalar_distances(test: ArrayView2<f64>, train: ArrayView2<f64>) -> Vec<Array2<f64>> {
    (0..test.ncols()).map(|l| {
        let (s, t) = (test.column(l), train.column(l));
        Array2::from_shape_fn((s.len(), t.len()), |(i, j)| (s[i] - t[j]).abs())
    }).collect()
}


/// How a distance enters the tensor product
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TensorFamily {
    /// exp(-gamma d), positive semi-definite for sliced Wasserstein distances
    #[default]
    Exponential,
    /// exp(-gamma d^2), positive semi-definite only when distances are euclidean (exponent 2 with one level)
    Rbf,
}

impl TensorFamily {
    fn factor(&self, gamma: f64, d: f64) -> f64 {
        match self {
            TensorFamily::Exponential => (-gamma * d).exp(),
            TensorFamily::Rbf => (-gamma * d * d).exp(),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            TensorFamily::Exponential => "exp",
            TensorFamily::Rbf => "rbf",
        }
    }
}


#[cfg_attr(doc, katexit::katexit)]
/// $$ K = v \prod_k \exp(-\gamma_k D_k) \prod_l M_{5/2}(S_l, \ell_l) + \eta I $$
/// with $D_k$ distance matrices, $S_l$ scalar distance matrices, variance v and nugget $\eta$.
/// With [TensorFamily::Rbf] the distance factors are $\exp(-\gamma_k D_k^2)$.
/// The nugget is only added to square gram matrices of a set of graphs with itself.
#[derive(Clone, Debug)]
pub struct TensorKernel {
    family: TensorFamily,
    variance: f64,
    gammas: Vec<f64>,
    lengths: Vec<f64>,
    nugget: f64,
}


impl TensorKernel {

    pub fn new(variance: f64, gammas: Vec<f64>, lengths: Vec<f64>, nugget: f64) -> Result<Self> {
        if !(variance > 0. && variance.is_finite()) {
            return Err(SwwlError::InvalidParameter(format!("variance must be > 0, got {}", variance)));
        }
        if let Some(g) = gammas.iter().find(|g| !(**g > 0. && g.is_finite())) {
            return Err(SwwlError::InvalidParameter(format!("gamma must be > 0, got {}", g)));
        }
        if let Some(l) = lengths.iter().find(|l| !(**l > 0. && l.is_finite())) {
            return Err(SwwlError::InvalidParameter(format!("length scale must be > 0, got {}", l)));
        }
        if !(nugget >= 0. && nugget.is_finite()) {
            return Err(SwwlError::InvalidParameter(format!("nugget must be >= 0, got {}", nugget)));
        }
        Ok(TensorKernel { family: TensorFamily::Exponential, variance, gammas, lengths, nugget })
    }

    /// switches the distance factors to another family
    pub fn with_family(mut self, family: TensorFamily) -> Self {
        self.family = family;
        self
    }

    pub fn get_family(&self) -> TensorFamily {
        self.family
    }

    /// gram matrix of a set of graphs with itself
    pub fn gram(&self, distances: &DistanceStack, scalars: &[Array2<f64>]) -> Result<GramMatrix> {
        let views: Vec<ArrayView2<f64>> = distances.get_matrices().iter().map(|d| d.get_data()).collect();
        let mut data = self.product(&views, scalars)?;
        if data.nrows() != data.ncols() {
            return Err(SwwlError::dimension("square tensor gram matrix", data.nrows(), data.ncols()));
        }
        data.diag_mut().iter_mut().for_each(|x| *x += self.nugget);
        Ok(GramMatrix::new(data, None))
    }

    /// test x train similarities, no nugget
    pub fn cross_gram(&self, distances: &CrossDistanceStack, scalars: &[Array2<f64>]) -> Result<Array2<f64>> {
        let views: Vec<ArrayView2<f64>> = distances.get_matrices().iter().map(|d| d.get_data()).collect();
        self.product(&views, scalars)
    }

    fn product(&self, distances: &[ArrayView2<f64>], scalars: &[Array2<f64>]) -> Result<Array2<f64>> {
        if distances.len() != self.gammas.len() {
            return Err(SwwlError::dimension("number of distance matrices and gammas", self.gammas.len(), distances.len()));
        }
        if scalars.len() != self.lengths.len() {
            return Err(SwwlError::dimension("number of scalar distances and length scales", self.lengths.len(), scalars.len()));
        }
        let shape = match (distances.first(), scalars.first()) {
            (Some(d), _) => d.dim(),
            (None, Some(s)) => s.dim(),
            (None, None) => return Err(SwwlError::InvalidParameter("tensor kernel without factor".into())),
        };
        let mut data = Array2::<f64>::from_elem(shape, self.variance);
        for (d, gamma) in distances.iter().zip(self.gammas.iter()) {
            if d.dim() != shape {
                return Err(SwwlError::dimension("tensor kernel factor rows", shape.0 * shape.1, d.len()));
            }
            data.zip_mut_with(d, |k, x| *k *= self.family.factor(*gamma, *x));
        }
        for (s, length) in scalars.iter().zip(self.lengths.iter()) {
            if s.dim() != shape {
                return Err(SwwlError::dimension("tensor kernel scalar factor", shape.0 * shape.1, s.len()));
            }
            data.zip_mut_with(s, |k, r| *k *= matern52(*r, *length));
        }
        Ok(data)
    } // end of product

} // end of impl TensorKernel



#[cfg(test)]
mod tests {

    use super::*;
    use crate::distance::{CrossDistanceMatrix, DistanceMatrix};
    use crate::kernel::eigen::min_eigenvalue;
    use ndarray::array;
    use rand::Rng;
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_matern52() {
        assert_eq!(matern52(0., 2.), 1.);
        let x = 5f64.sqrt();
        assert!((matern52(1., 1.) - (1. + x + 5. / 3.) * (-x).exp()).abs() < 1.0e-15);
        assert!(matern52(3., 1.) < matern52(1., 1.));
    }

    #[test]
    fn test_scalar_distances() {
        let s = array![[0., 10.], [1., 10.], [3., 12.]];
        let d = scalar_distance_matrices(s.view());
        assert_eq!(d.len(), 2);
        assert_eq!(d[0], array![[0., 1., 3.], [1., 0., 2.], [3., 2., 0.]]);
        let c = scalar_cross_distance_matrices(array![[2., 11.]].view(), s.view()).unwrap();
        assert_eq!(c[1], array![[1., 1., 1.]]);
    }

    // a column count mismatch is an error, not a truncation
    #[test]
    fn test_scalar_cross_mismatch() {
        log_init_test();
        let train = array![[0., 10.], [1., 10.], [3., 12.]];
        let res = scalar_cross_distance_matrices(array![[2.]].view(), train.view());
        assert!(matches!(res, Err(SwwlError::DimensionMismatch { expected: 2, got: 1, .. })));
        let res = scalar_cross_distance_matrices(array![[2., 11., 0.]].view(), train.view());
        assert!(matches!(res, Err(SwwlError::DimensionMismatch { expected: 2, got: 3, .. })));
    }

    #[test]
    fn test_tensor_gram_psd() {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(17);
        let n = 12;
        let points: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..5.0)).collect();
        let d = DistanceMatrix::from_array(Array2::from_shape_fn((n, n), |(i, j)| (points[i] - points[j]).abs())).unwrap();
        let d2 = DistanceMatrix::from_array(d.get_data().mapv(|x| 2. * x)).unwrap();
        let stack = DistanceStack::new(vec![d, d2]).unwrap();
        let scalars = Array2::from_shape_fn((n, 1), |_| rng.gen_range(-1.0..1.0));
        let sdist = scalar_distance_matrices(scalars.view());
        //
        let kernel = TensorKernel::new(2., vec![0.5, 0.1], vec![0.7], 1.0e-3).unwrap();
        let gram = kernel.gram(&stack, &sdist).unwrap();
        assert!((gram.get(3, 3) - (2. + 1.0e-3)).abs() < 1.0e-12);
        assert_eq!(gram.get(1, 4), gram.get(4, 1));
        assert!(min_eigenvalue(gram.get_data()).unwrap() > -1.0e-10);
        // wrong number of gammas
        let bad = TensorKernel::new(1., vec![0.5], vec![0.7], 0.).unwrap();
        assert!(bad.gram(&stack, &sdist).is_err());
        assert!(TensorKernel::new(1., vec![-0.5], vec![], 0.).is_err());
    } // end of test_tensor_gram_psd

    // squared distances in the exponential, psd on euclidean distances
    #[test]
    fn test_rbf_family() {
        log_init_test();
        let points: [f64; 4] = [0., 0.5, 1.5, 4.];
        let n = points.len();
        let d = DistanceMatrix::from_array(Array2::from_shape_fn((n, n), |(i, j)| (points[i] - points[j]).abs())).unwrap();
        let stack = DistanceStack::new(vec![d]).unwrap();
        let exp = TensorKernel::new(1.5, vec![0.3], vec![], 0.).unwrap();
        let rbf = exp.clone().with_family(TensorFamily::Rbf);
        assert_eq!(exp.get_family(), TensorFamily::Exponential);
        assert_eq!(rbf.get_family().tag(), "rbf");
        let kexp = exp.gram(&stack, &[]).unwrap();
        let krbf = rbf.gram(&stack, &[]).unwrap();
        assert!((kexp.get(0, 2) - 1.5 * (-0.3f64 * 1.5).exp()).abs() < 1.0e-14);
        assert!((krbf.get(0, 2) - 1.5 * (-0.3f64 * 2.25).exp()).abs() < 1.0e-14);
        assert_eq!(krbf.get(3, 3), 1.5);
        assert!(min_eigenvalue(krbf.get_data()).unwrap() > -1.0e-10);
        // cross gram follows the family
        let cross = CrossDistanceStack::new(vec![CrossDistanceMatrix::new(array![[2., 0.]])]);
        let c = rbf.cross_gram(&cross, &[]).unwrap();
        assert!((c[[0, 0]] - 1.5 * (-1.2f64).exp()).abs() < 1.0e-14);
        assert_eq!(c[[0, 1]], 1.5);
    } // end of test_rbf_family

} // end of mod tests
