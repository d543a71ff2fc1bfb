//! Quantile sketches of projected node attributes.
//!
//! For each direction the node attributes of a level are projected, sorted and resampled at Q fixed
//! probability points. Graphs of different sizes thus get sketches of the same shape (P, Q),
//! built once in O(P n log n) and reused for every pairwise comparison.

use ndarray::{Array2, ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

use super::directions::{DirectionSet, LevelDirections};
use super::params::{Interpolation, SketchParams};
use crate::error::{Result, SwwlError};
use crate::graph::Graph;
use crate::wl::WlPropagator;


/// The (P, Q) quantile matrix of a graph at one level. Row p holds the non decreasing quantiles along direction p.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuantileSketch {
    data: Array2<f64>,
}


impl QuantileSketch {

    /// builds the sketch of a (n, d) embedding. Fails with DimensionMismatch if d is not the dimension of directions.
    pub fn new(embedding: ArrayView2<f64>, directions: &DirectionSet, params: &SketchParams) -> Result<Self> {
        let (nb_nodes, dim) = embedding.dim();
        if dim != directions.get_dim() {
            return Err(SwwlError::dimension(format!("projection at level {}", directions.get_level()), directions.get_dim(), dim));
        }
        if nb_nodes == 0 {
            return Err(SwwlError::invalid_graph("<embedding>", "no node to sketch"));
        }
        let probabilities = params.get_probabilities();
        let interpolation = params.get_interpolation();
        // (n, P)
        let projected = embedding.dot(&directions.get_data().t());
        if projected.iter().any(|x| !x.is_finite()) {
            return Err(SwwlError::invalid_graph("<embedding>", format!("non finite projected attribute at level {}", directions.get_level())));
        }
        let mut data = Array2::<f64>::zeros((directions.get_nb_projections(), probabilities.len()));
        let mut sorted = Vec::<f64>::with_capacity(nb_nodes);
        for (p, mut row) in data.rows_mut().into_iter().enumerate() {
            sorted.clear();
            sorted.extend(projected.column(p).iter());
            sorted.sort_unstable_by(|a, b| a.total_cmp(b));
            for (q, t) in probabilities.iter().enumerate() {
                row[q] = quantile(&sorted, *t, interpolation);
            }
        }
        Ok(QuantileSketch { data })
    } // end of new


    pub fn get_nb_projections(&self) -> usize {
        self.data.nrows()
    }

    pub fn get_nb_quantiles(&self) -> usize {
        self.data.ncols()
    }

    /// quantiles along direction p
    pub fn get_quantiles(&self, p: usize) -> ArrayView1<f64> {
        self.data.row(p)
    }

    pub fn get_data(&self) -> ArrayView2<f64> {
        self.data.view()
    }

} // end of impl QuantileSketch


// quantile of probability t of sorted values, position in sorted is t * (n-1)
pub(crate) fn quantile(sorted: &[f64], t: f64, interpolation: Interpolation) -> f64 {
    let last = sorted.len() - 1;
    let pos = t * last as f64;
    let lower = (pos.floor() as usize).min(last);
    match interpolation {
        Interpolation::Lower => sorted[lower],
        Interpolation::Linear => {
            let upper = (lower + 1).min(last);
            let frac = pos - lower as f64;
            if frac <= 0. || upper == lower {
                sorted[lower]
            } else {
                sorted[lower] + frac * (sorted[upper] - sorted[lower])
            }
        },
    }
} // end of quantile



/// The sketches of a graph at levels 0..=H
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphSketch {
    levels: Vec<QuantileSketch>,
}


impl GraphSketch {

    /// propagates graph attributes and sketches each level as soon as it is produced.
    /// Errors are reported with the graph name.
    pub fn new(graph: &Graph, propagator: &WlPropagator, directions: &LevelDirections, params: &SketchParams) -> Result<Self> {
        GraphSketch::new_identified(graph, graph.get_name(), propagator, directions, params)
    }

    // errors are reported with identifier
    pub(crate) fn new_identified(graph: &Graph, identifier: &str, propagator: &WlPropagator, directions: &LevelDirections,
                params: &SketchParams) -> Result<Self> {
        let mut levels = Vec::<QuantileSketch>::with_capacity(propagator.get_params().get_nb_levels());
        propagator.for_each_level(graph, |embedding| {
            let dirs = directions.get(embedding.get_level())?;
            levels.push(QuantileSketch::new(embedding.get_data(), dirs, params)?);
            Ok(())
        }).map_err(|e| e.with_graph(identifier))?;
        Ok(GraphSketch { levels })
    } // end of new_identified

    pub fn from_levels(levels: Vec<QuantileSketch>) -> Self {
        GraphSketch { levels }
    }

    pub fn get_nb_levels(&self) -> usize {
        self.levels.len()
    }

    pub fn get_level(&self, level: usize) -> &QuantileSketch {
        &self.levels[level]
    }

    pub fn get_levels(&self) -> &[QuantileSketch] {
        &self.levels
    }

} // end of impl GraphSketch



// end of mod tests
