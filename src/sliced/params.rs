//! Parameters of the projection and quantile sketching stage.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwwlError};


#[cfg_attr(doc, katexit::katexit)]
/// Probability points at which quantiles are sampled.
///  - Midpoint : $t_q = \frac{2q+1}{2Q}$ for q in 0..Q
///  - Uniform : $t_q = \frac{q}{Q-1}$, and $t_0 = 0$ if Q = 1
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuantileGrid {
    #[default]
    Midpoint,
    Uniform,
}

impl QuantileGrid {
    /// probability of quantile rank q among nb_quantiles
    pub fn get_probability(&self, q: usize, nb_quantiles: usize) -> f64 {
        match self {
            QuantileGrid::Midpoint => (2 * q + 1) as f64 / (2 * nb_quantiles) as f64,
            QuantileGrid::Uniform => {
                if nb_quantiles <= 1 { 0. } else { q as f64 / (nb_quantiles - 1) as f64 }
            },
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            QuantileGrid::Midpoint => "mid",
            QuantileGrid::Uniform => "unif",
        }
    }
} // end of impl QuantileGrid


/// How a quantile is read between order statistics.
/// For probability t and n sorted values, the fractional position is t * (n-1).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Interpolation {
    /// linear interpolation between the two surrounding order statistics
    #[default]
    Linear,
    /// lower order statistic
    Lower,
}

impl Interpolation {
    pub fn tag(&self) -> &'static str {
        match self {
            Interpolation::Linear => "lin",
            Interpolation::Lower => "low",
        }
    }
}


/// Whether each level gets its own directions.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirectionPolicy {
    /// one direction set per level, drawn from the level sub-stream
    #[default]
    PerLevel,
    /// one direction set drawn from the level 0 sub-stream, reused at every level.
    /// All levels must have the same dimension.
    Shared,
}

impl DirectionPolicy {
    pub fn tag(&self) -> &'static str {
        match self {
            DirectionPolicy::PerLevel => "perlevel",
            DirectionPolicy::Shared => "shared",
        }
    }
}


/// Parameters of sketches.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchParams {
    /// number of projection directions P
    pub nb_projections: usize,
    /// number of quantiles Q
    pub nb_quantiles: usize,
    ///
    pub grid: QuantileGrid,
    ///
    pub interpolation: Interpolation,
    ///
    pub direction_policy: DirectionPolicy,
} // end of SketchParams


impl SketchParams {
    pub fn new(nb_projections: usize, nb_quantiles: usize, grid: QuantileGrid, interpolation: Interpolation,
                direction_policy: DirectionPolicy) -> Self {
        SketchParams { nb_projections, nb_quantiles, grid, interpolation, direction_policy }
    }

    pub fn get_nb_projections(&self) -> usize { self.nb_projections }

    pub fn get_nb_quantiles(&self) -> usize { self.nb_quantiles }

    pub fn get_grid(&self) -> QuantileGrid { self.grid }

    pub fn get_interpolation(&self) -> Interpolation { self.interpolation }

    pub fn get_direction_policy(&self) -> DirectionPolicy { self.direction_policy }

    /// the probability grid, of length Q
    pub fn get_probabilities(&self) -> Vec<f64> {
        (0..self.nb_quantiles).map(|q| self.grid.get_probability(q, self.nb_quantiles)).collect()
    }

    pub fn check(&self) -> Result<()> {
        if self.nb_projections == 0 {
            return Err(SwwlError::InvalidParameter("number of projections must be >= 1".into()));
        }
        if self.nb_quantiles == 0 {
            return Err(SwwlError::InvalidParameter("number of quantiles must be >= 1".into()));
        }
        Ok(())
    }
} // end of impl SketchParams


impl Default for SketchParams {
    fn default() -> Self {
        SketchParams::new(50, 20, QuantileGrid::Midpoint, Interpolation::Linear, DirectionPolicy::PerLevel)
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_grids() {
        let params = SketchParams::new(1, 4, QuantileGrid::Midpoint, Interpolation::Linear, DirectionPolicy::PerLevel);
        assert_eq!(params.get_probabilities(), vec![0.125, 0.375, 0.625, 0.875]);
        let params = SketchParams::new(1, 5, QuantileGrid::Uniform, Interpolation::Lower, DirectionPolicy::PerLevel);
        assert_eq!(params.get_probabilities(), vec![0., 0.25, 0.5, 0.75, 1.]);
        assert_eq!(QuantileGrid::Uniform.get_probability(0, 1), 0.);
        assert_eq!(QuantileGrid::Midpoint.get_probability(0, 1), 0.5);
        //
        let mut params = SketchParams::default();
        assert!(params.check().is_ok());
        params.nb_quantiles = 0;
        assert!(params.check().is_err());
    }
} // end of mod tests
