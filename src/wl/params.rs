//! Parameters of the continuous Weisfeiler-Lehman propagation.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SwwlError};


#[cfg_attr(doc, katexit::katexit)]
/// How a node combines its own attribute with the attributes of its in-neighbours.
/// Noting $x_i$ the attribute of node i at previous level, $w_{ij}$ the weight of the edge j -> i
/// and $d_i = \sum_j w_{ij}$:
///  - HalfMean : $x'_i = \frac{1}{2} (x_i + \frac{1}{d_i} \sum_j w_{ij} x_j)$. An isolated node gets $\frac{1}{2} x_i$.
///  - SelfMean : $x'_i = \frac{x_i + \sum_j w_{ij} x_j}{1 + d_i}$
///  - Sum : $x'_i = x_i + \sum_j w_{ij} x_j$
///  - SymNormalized : $x'_i = \sum_{j \in N(i) \cup \{i\}} \frac{w_{ij}}{\sqrt{(1+d_i)(1+d_j)}} x_j$ with $w_{ii} = 1$
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NeighbourAggregation {
    #[default]
    HalfMean,
    SelfMean,
    Sum,
    SymNormalized,
}

impl NeighbourAggregation {
    /// short tag used in cache keys
    pub fn tag(&self) -> &'static str {
        match self {
            NeighbourAggregation::HalfMean => "hmean",
            NeighbourAggregation::SelfMean => "smean",
            NeighbourAggregation::Sum => "sum",
            NeighbourAggregation::SymNormalized => "symn",
        }
    }
}


/// Dimension policy along levels
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelPolicy {
    /// level h attributes replace level h-1 attributes, dimension is preserved.
    #[default]
    Replace,
    /// level h is the concatenation of levels 0..=h, dimension is d0 * (h+1)
    Concatenate,
}

impl LevelPolicy {
    pub fn tag(&self) -> &'static str {
        match self {
            LevelPolicy::Replace => "rep",
            LevelPolicy::Concatenate => "cat",
        }
    }
}


/// Parameters of the WL propagation.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct WlParams {
    /// number of levels H after level 0. We get H+1 level embeddings.
    pub nb_iter: usize,
    /// number of propagation passes between 2 recorded levels (1 means no skip)
    pub step: usize,
    ///
    pub aggregation: NeighbourAggregation,
    ///
    pub level_policy: LevelPolicy,
} // end of WlParams


impl WlParams {

    pub fn new(nb_iter: usize, step: usize, aggregation: NeighbourAggregation, level_policy: LevelPolicy) -> Self {
        WlParams { nb_iter, step, aggregation, level_policy }
    }

    /// number of iterations H
    pub fn get_nb_iter(&self) -> usize { self.nb_iter }

    /// number of levels : H+1
    pub fn get_nb_levels(&self) -> usize { self.nb_iter + 1 }

    ///
    pub fn get_step(&self) -> usize { self.step }

    ///
    pub fn get_aggregation(&self) -> NeighbourAggregation { self.aggregation }

    ///
    pub fn get_level_policy(&self) -> LevelPolicy { self.level_policy }

    /// dimension of level h attributes given dimension of initial attributes
    pub fn get_level_dim(&self, dim0: usize, level: usize) -> usize {
        match self.level_policy {
            LevelPolicy::Replace => dim0,
            LevelPolicy::Concatenate => dim0 * (level + 1),
        }
    }

    pub fn check(&self) -> Result<()> {
        if self.step == 0 {
            return Err(SwwlError::InvalidParameter("wl step must be >= 1".into()));
        }
        Ok(())
    }

} // end of impl WlParams


impl Default for WlParams {
    fn default() -> Self {
        WlParams::new(3, 1, NeighbourAggregation::HalfMean, LevelPolicy::Replace)
    }
}
