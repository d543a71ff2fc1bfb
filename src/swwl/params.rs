//! Parameters of a complete run.

use serde::{Deserialize, Serialize};

use crate::distance::LevelAggregation;
use crate::error::{Result, SwwlError};
use crate::sliced::SketchParams;
use crate::wl::WlParams;


/// All parameters changing distances between graphs, plus execution parameters.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwwlParams {
    /// WL propagation
    pub wl: WlParams,
    /// projections and quantiles
    pub sketch: SketchParams,
    /// exponent of sliced Wasserstein distance, in \[1, 2\]
    pub exponent: f64,
    /// combination of level distances
    pub aggregation: LevelAggregation,
    /// seed of directions
    pub seed: u64,
    /// do we run in parallel
    pub parallel: bool,
    /// number of threads of the pool if parallel
    pub nb_threads: usize,
} // end of SwwlParams


impl SwwlParams {

    pub fn new(wl: WlParams, sketch: SketchParams, exponent: f64, aggregation: LevelAggregation, seed: u64) -> Self {
        SwwlParams { wl, sketch, exponent, aggregation, seed, parallel: true, nb_threads: num_cpus::get() }
    }

    /// sets parallel mode and number of threads (0 means number of cpus)
    pub fn with_threads(mut self, parallel: bool, nb_threads: usize) -> Self {
        self.parallel = parallel;
        self.nb_threads = if nb_threads == 0 { num_cpus::get() } else { nb_threads };
        self
    }

    pub fn get_wl_params(&self) -> &WlParams { &self.wl }

    pub fn get_sketch_params(&self) -> &SketchParams { &self.sketch }

    pub fn get_exponent(&self) -> f64 { self.exponent }

    pub fn get_aggregation(&self) -> LevelAggregation { self.aggregation }

    pub fn get_seed(&self) -> u64 { self.seed }

    pub fn get_parallel(&self) -> bool { self.parallel }

    pub fn get_nb_threads(&self) -> usize { self.nb_threads }

    pub fn check(&self) -> Result<()> {
        self.wl.check()?;
        self.sketch.check()?;
        if !(1. ..=2.).contains(&self.exponent) {
            return Err(SwwlError::InvalidParameter(format!("distance exponent must be in [1,2], got {}", self.exponent)));
        }
        if self.parallel && self.nb_threads == 0 {
            return Err(SwwlError::InvalidParameter("number of threads must be >= 1".into()));
        }
        Ok(())
    }

} // end of impl SwwlParams


impl Default for SwwlParams {
    fn default() -> Self {
        SwwlParams::new(WlParams::default(), SketchParams::default(), 1., LevelAggregation::Mean, 0)
    }
}
