//! Keys identifying a distance or gram matrix computation, used by callers persisting matrices.
//! Two computations with the same key give bit identical matrices.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::params::SwwlParams;


#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    dataset: String,
    kernel: String,
    nb_iter: usize,
    nb_projections: usize,
    nb_quantiles: usize,
    step: usize,
    seed: u64,
    /// remaining parameters affecting the result
    variant: String,
} // end of CacheKey


impl CacheKey {

    pub fn new(dataset: &str, kernel: &str, params: &SwwlParams) -> Self {
        let wl = params.get_wl_params();
        let sketch = params.get_sketch_params();
        let variant = [
            wl.get_aggregation().tag().to_string(),
            wl.get_level_policy().tag().to_string(),
            sketch.get_grid().tag().to_string(),
            sketch.get_interpolation().tag().to_string(),
            sketch.get_direction_policy().tag().to_string(),
            format!("p{}", params.get_exponent()),
            params.get_aggregation().tag().to_string(),
        ].join("_");
        CacheKey {
            dataset: dataset.to_string(),
            kernel: kernel.to_string(),
            nb_iter: wl.get_nb_iter(),
            nb_projections: sketch.get_nb_projections(),
            nb_quantiles: sketch.get_nb_quantiles(),
            step: wl.get_step(),
            seed: params.get_seed(),
            variant,
        }
    } // end of new

    pub fn get_dataset(&self) -> &str {
        &self.dataset
    }

    pub fn get_kernel(&self) -> &str {
        &self.kernel
    }

    pub fn get_seed(&self) -> u64 {
        self.seed
    }

} // end of impl CacheKey


impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D_{}_{}_H{}_P{}_Q{}_T{}_seed{}_{}", self.dataset, self.kernel, self.nb_iter, self.nb_projections,
                self.nb_quantiles, self.step, self.seed, self.variant)
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::distance::LevelAggregation;
    use crate::sliced::*;
    use crate::wl::*;

    #[test]
    fn test_cache_key_format() {
        let params = SwwlParams::new(WlParams::new(3, 2, NeighbourAggregation::HalfMean, LevelPolicy::Replace),
                SketchParams::new(50, 20, QuantileGrid::Midpoint, Interpolation::Linear, DirectionPolicy::PerLevel),
                1., LevelAggregation::Mean, 7);
        let key = CacheKey::new("MUTAG", "swwl", &params);
        assert_eq!(key.to_string(), "D_MUTAG_swwl_H3_P50_Q20_T2_seed7_hmean_rep_mid_lin_perlevel_p1_swwl");
        // any change in parameters changes the key, threads do not
        let threaded = params.with_threads(false, 1);
        assert_eq!(CacheKey::new("MUTAG", "swwl", &threaded), key);
        let mut other = params;
        other.exponent = 2.;
        assert_ne!(CacheKey::new("MUTAG", "swwl", &other), key);
        other = params;
        other.seed = 8;
        assert_ne!(CacheKey::new("MUTAG", "swwl", &other).to_string(), key.to_string());
    } // end of test_cache_key_format
} // end of mod tests
