//! Random projection directions.
//!
//! Directions are drawn uniformly on the unit sphere by normalizing i.i.d. standard gaussian vectors.
//! The generator of level h is the generator seeded by the run seed and jumped h times,
//! so levels get independent streams that are all reproducible from one seed.
//! A direction set is created once and only read afterwards, all graphs of a run share it.

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use rand::Rng;
use rand_distr::StandardNormal;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use super::params::DirectionPolicy;
use crate::error::{Result, SwwlError};

// below this norm a gaussian draw is rejected
const MIN_NORM: f64 = 1.0e-10;


/// P unit vectors of dimension d, stored as rows of a (P, d) matrix.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionSet {
    level: usize,
    data: Array2<f64>,
} // end of DirectionSet


impl DirectionSet {

    /// samples nb_projections directions in dimension dim for a level, from the seed.
    pub fn sample(dim: usize, nb_projections: usize, seed: u64, level: usize) -> Result<Self> {
        if dim == 0 || nb_projections == 0 {
            return Err(SwwlError::InvalidParameter(format!("cannot sample {} directions in dimension {}", nb_projections, dim)));
        }
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        for _ in 0..level {
            rng.jump();
        }
        let mut data = Array2::<f64>::zeros((nb_projections, dim));
        for mut row in data.rows_mut() {
            loop {
                row.iter_mut().for_each(|x| *x = rng.sample::<f64, _>(StandardNormal));
                let norm = row.dot(&row).sqrt();
                if norm > MIN_NORM {
                    row /= norm;
                    break;
                }
                log::trace!("DirectionSet::sample rejected draw of norm {:.3e}", norm);
            }
        }
        log::debug!("sampled {} directions in dim {} for level {}", nb_projections, dim, level);
        Ok(DirectionSet { level, data })
    } // end of sample


    /// directions given explicitly as rows of vectors. Rows are normalized, null or non finite rows are rejected.
    pub fn from_vectors(level: usize, mut vectors: Array2<f64>) -> Result<Self> {
        if vectors.nrows() == 0 || vectors.ncols() == 0 {
            return Err(SwwlError::InvalidParameter("empty direction set".into()));
        }
        for (p, mut row) in vectors.axis_iter_mut(Axis(0)).enumerate() {
            let norm = row.dot(&row).sqrt();
            if !norm.is_finite() || norm <= MIN_NORM {
                return Err(SwwlError::InvalidParameter(format!("direction {} has norm {:.3e}", p, norm)));
            }
            row /= norm;
        }
        Ok(DirectionSet { level, data: vectors })
    } // end of from_vectors


    pub fn get_level(&self) -> usize {
        self.level
    }

    pub fn get_dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn get_nb_projections(&self) -> usize {
        self.data.nrows()
    }

    pub fn get_direction(&self, p: usize) -> ArrayView1<f64> {
        self.data.row(p)
    }

    /// (P, d) matrix of directions
    pub fn get_data(&self) -> ArrayView2<f64> {
        self.data.view()
    }

} // end of impl DirectionSet


/// The direction sets used at each level of a run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelDirections {
    policy: DirectionPolicy,
    sets: Vec<DirectionSet>,
}


impl LevelDirections {

    /// samples directions for levels of dimensions dims (dims\[h\] is the dimension of level h).
    pub fn sample(dims: &[usize], nb_projections: usize, seed: u64, policy: DirectionPolicy) -> Result<Self> {
        if dims.is_empty() {
            return Err(SwwlError::InvalidParameter("no level to sample directions for".into()));
        }
        let sets = match policy {
            DirectionPolicy::PerLevel => {
                dims.iter().enumerate().map(|(h, d)| DirectionSet::sample(*d, nb_projections, seed, h)).collect::<Result<Vec<DirectionSet>>>()?
            },
            DirectionPolicy::Shared => {
                if let Some((h, d)) = dims.iter().enumerate().find(|(_, d)| **d != dims[0]) {
                    return Err(SwwlError::dimension(format!("shared directions at level {}", h), dims[0], *d));
                }
                vec![DirectionSet::sample(dims[0], nb_projections, seed, 0)?]
            },
        };
        Ok(LevelDirections { policy, sets })
    }

    /// explicit sets. With PerLevel policy set h serves level h, with Shared policy a unique set is expected.
    pub fn from_sets(sets: Vec<DirectionSet>, policy: DirectionPolicy) -> Result<Self> {
        if sets.is_empty() {
            return Err(SwwlError::InvalidParameter("no direction set".into()));
        }
        if policy == DirectionPolicy::Shared && sets.len() != 1 {
            return Err(SwwlError::dimension("number of shared direction sets", 1, sets.len()));
        }
        let nb_projections = sets[0].get_nb_projections();
        if let Some(set) = sets.iter().find(|s| s.get_nb_projections() != nb_projections) {
            return Err(SwwlError::dimension(format!("number of directions at level {}", set.get_level()), nb_projections, set.get_nb_projections()));
        }
        Ok(LevelDirections { policy, sets })
    }

    pub fn get_policy(&self) -> DirectionPolicy {
        self.policy
    }

    /// number of levels served, None means any level (shared directions)
    pub fn get_nb_levels(&self) -> Option<usize> {
        match self.policy {
            DirectionPolicy::PerLevel => Some(self.sets.len()),
            DirectionPolicy::Shared => None,
        }
    }

    pub fn get_nb_projections(&self) -> usize {
        self.sets[0].get_nb_projections()
    }

    /// directions to use at level h
    pub fn get(&self, level: usize) -> Result<&DirectionSet> {
        match self.policy {
            DirectionPolicy::Shared => Ok(&self.sets[0]),
            DirectionPolicy::PerLevel => self.sets.get(level)
                    .ok_or_else(|| SwwlError::dimension("number of direction levels", level + 1, self.sets.len())),
        }
    }

} // end of impl LevelDirections



#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_directions_unit_and_reproducible() {
        log_init_test();
        let d1 = DirectionSet::sample(5, 30, 117, 2).unwrap();
        let d2 = DirectionSet::sample(5, 30, 117, 2).unwrap();
        assert_eq!(d1, d2);
        for p in 0..30 {
            let u = d1.get_direction(p);
            assert!((u.dot(&u) - 1.).abs() < 1.0e-12);
        }
        // another level or seed gives other directions
        let d3 = DirectionSet::sample(5, 30, 117, 3).unwrap();
        assert_ne!(d1.get_data(), d3.get_data());
        let d4 = DirectionSet::sample(5, 30, 118, 2).unwrap();
        assert_ne!(d1.get_data(), d4.get_data());
    } // end of test_directions_unit_and_reproducible

    // directions are approximately isotropic: mean of u u^t is I/d
    #[test]
    fn test_directions_isotropic() {
        let dim = 3;
        let nb = 20000;
        let d = DirectionSet::sample(dim, nb, 0, 0).unwrap();
        let cov = d.get_data().t().dot(&d.get_data()) / nb as f64;
        for i in 0..dim {
            for j in 0..dim {
                let expected = if i == j { 1. / dim as f64 } else { 0. };
                assert!((cov[[i, j]] - expected).abs() < 0.02, "cov {} {} = {}", i, j, cov[[i, j]]);
            }
        }
    }

    #[test]
    fn test_from_vectors() {
        let d = DirectionSet::from_vectors(0, array![[3., 4.], [0., 2.]]).unwrap();
        assert_eq!(d.get_direction(0), array![0.6, 0.8].view());
        assert_eq!(d.get_direction(1), array![0., 1.].view());
        assert!(DirectionSet::from_vectors(0, array![[1., 0.], [0., 0.]]).is_err());
    }

    #[test]
    fn test_level_directions() {
        let per_level = LevelDirections::sample(&[2, 4, 6], 8, 0, DirectionPolicy::PerLevel).unwrap();
        assert_eq!(per_level.get(2).unwrap().get_dim(), 6);
        assert_eq!(per_level.get(0).unwrap(), &DirectionSet::sample(2, 8, 0, 0).unwrap());
        assert!(per_level.get(3).is_err());
        //
        let shared = LevelDirections::sample(&[3, 3, 3], 8, 0, DirectionPolicy::Shared).unwrap();
        assert_eq!(shared.get(0).unwrap(), shared.get(7).unwrap());
        match LevelDirections::sample(&[3, 6], 8, 0, DirectionPolicy::Shared) {
            Err(SwwlError::DimensionMismatch { expected, got, .. }) => assert_eq!((expected, got), (3, 6)),
            _ => panic!("expected DimensionMismatch"),
        }
    } // end of test_level_directions

} // end of mod tests
