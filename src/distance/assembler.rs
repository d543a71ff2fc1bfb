//! Pairwise sliced Wasserstein distances from quantile sketches.
//!
//! Only the upper triangle is computed, row by row. Rows are independent so they are computed
//! in parallel with rayon and merged by index. A row range can also be computed alone
//! and merged later with [DistanceStack::from_rows].

use std::ops::Range;

use ndarray::Array2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::matrix::*;
use crate::error::{Result, SwwlError};
use crate::sliced::{GraphSketch, QuantileSketch};


/// How per level distances are combined.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelAggregation {
    /// mean of SW_h over levels 0..=H (swwl)
    #[default]
    Mean,
    /// sum of SW_h over levels
    Sum,
    /// only the last level SW_H
    LastLevel,
    /// one distance matrix per level (aswwl)
    Separate,
}

impl LevelAggregation {
    /// number of distance matrices produced for nb_levels levels
    pub fn get_nb_outputs(&self, nb_levels: usize) -> usize {
        match self {
            LevelAggregation::Separate => nb_levels,
            _ => 1,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            LevelAggregation::Mean => "swwl",
            LevelAggregation::Sum => "swwlsum",
            LevelAggregation::LastLevel => "swwllast",
            LevelAggregation::Separate => "aswwl",
        }
    }
} // end of impl LevelAggregation


#[cfg_attr(doc, katexit::katexit)]
/// Sliced Wasserstein distance between 2 sketches of shape (P, Q):
/// $$ SW(a, b) = \left( \frac{1}{P} \sum_{p} \frac{1}{Q} \sum_{q} |a_{pq} - b_{pq}|^e \right)^{1/e} $$
/// The computation is symmetric bit for bit and gives exactly 0 for identical sketches.
pub fn sliced_wasserstein(a: &QuantileSketch, b: &QuantileSketch, exponent: f64) -> Result<f64> {
    let (ad, bd) = (a.get_data(), b.get_data());
    if ad.dim() != bd.dim() {
        let (expected, got) = if ad.nrows() != bd.nrows() { (ad.nrows(), bd.nrows()) } else { (ad.ncols(), bd.ncols()) };
        return Err(SwwlError::dimension("sketch shapes", expected, got));
    }
    let (nb_projections, nb_quantiles) = ad.dim();
    let mut sum = 0.;
    for p in 0..nb_projections {
        let mut row_sum = 0.;
        for (x, y) in ad.row(p).iter().zip(bd.row(p).iter()) {
            let delta = (x - y).abs();
            row_sum += if exponent == 1. {
                delta
            } else if exponent == 2. {
                delta * delta
            } else {
                delta.powf(exponent)
            };
        }
        sum += row_sum / nb_quantiles as f64;
    }
    let mean = sum / nb_projections as f64;
    let dist = if exponent == 1. {
        mean
    } else if exponent == 2. {
        mean.sqrt()
    } else {
        mean.powf(1. / exponent)
    };
    if !dist.is_finite() {
        return Err(SwwlError::InvalidParameter(format!("sliced wasserstein distance overflow ({})", dist)));
    }
    Ok(dist)
} // end of sliced_wasserstein



/// Computes distance matrices from graph sketches.
#[derive(Debug, Copy, Clone)]
pub struct DistanceAssembler {
    exponent: f64,
    aggregation: LevelAggregation,
    parallel: bool,
}


impl DistanceAssembler {

    /// exponent must be in \[1, 2\]
    pub fn new(exponent: f64, aggregation: LevelAggregation, parallel: bool) -> Result<Self> {
        if !(1. ..=2.).contains(&exponent) {
            return Err(SwwlError::InvalidParameter(format!("distance exponent must be in [1,2], got {}", exponent)));
        }
        Ok(DistanceAssembler { exponent, aggregation, parallel })
    }

    pub fn get_exponent(&self) -> f64 {
        self.exponent
    }

    pub fn get_aggregation(&self) -> LevelAggregation {
        self.aggregation
    }

    /// distances between 2 graphs, one value per output
    pub fn pair(&self, a: &GraphSketch, b: &GraphSketch) -> Result<Vec<f64>> {
        let nb_levels = a.get_nb_levels();
        if b.get_nb_levels() != nb_levels {
            return Err(SwwlError::dimension("number of sketch levels", nb_levels, b.get_nb_levels()));
        }
        if nb_levels == 0 {
            return Err(SwwlError::InvalidParameter("sketch without level".into()));
        }
        match self.aggregation {
            LevelAggregation::LastLevel => {
                let d = sliced_wasserstein(a.get_level(nb_levels - 1), b.get_level(nb_levels - 1), self.exponent)?;
                Ok(vec![d])
            },
            LevelAggregation::Separate => {
                (0..nb_levels).map(|h| sliced_wasserstein(a.get_level(h), b.get_level(h), self.exponent)).collect()
            },
            LevelAggregation::Mean | LevelAggregation::Sum => {
                let mut sum = 0.;
                for h in 0..nb_levels {
                    sum += sliced_wasserstein(a.get_level(h), b.get_level(h), self.exponent)?;
                }
                if self.aggregation == LevelAggregation::Mean {
                    sum /= nb_levels as f64;
                }
                if !sum.is_finite() {
                    return Err(SwwlError::InvalidParameter(format!("sum of level distances overflow ({})", sum)));
                }
                Ok(vec![sum])
            },
        }
    } // end of pair


    /// upper triangle line of graph i : distances to graphs j > i
    pub fn row(&self, sketches: &[GraphSketch], i: usize) -> Result<DistanceRow> {
        let nb_graphs = sketches.len();
        if i >= nb_graphs {
            return Err(SwwlError::InvalidParameter(format!("row {} out of range, nb graphs {}", i, nb_graphs)));
        }
        let nb_outputs = self.aggregation.get_nb_outputs(sketches[i].get_nb_levels());
        let mut values = Array2::<f64>::zeros((nb_outputs, nb_graphs - i - 1));
        for j in (i + 1)..nb_graphs {
            let d = self.pair(&sketches[i], &sketches[j])?;
            for (k, v) in d.into_iter().enumerate() {
                values[[k, j - i - 1]] = v;
            }
        }
        Ok(DistanceRow::new(i, values))
    } // end of row


    /// rows of a range of graphs, in range order
    pub fn rows(&self, sketches: &[GraphSketch], range: Range<usize>) -> Result<Vec<DistanceRow>> {
        if range.end > sketches.len() {
            return Err(SwwlError::InvalidParameter(format!("row range {:?} out of range, nb graphs {}", range, sketches.len())));
        }
        if self.parallel {
            range.into_par_iter().map(|i| self.row(sketches, i)).collect()
        } else {
            range.map(|i| self.row(sketches, i)).collect()
        }
    } // end of rows


    /// full distance matrices. Any failure aborts the whole computation.
    pub fn assemble(&self, sketches: &[GraphSketch]) -> Result<DistanceStack> {
        let nb_graphs = sketches.len();
        log::debug!("assembling distances for {} graphs, parallel : {}", nb_graphs, self.parallel);
        let rows = self.rows(sketches, 0..nb_graphs)?;
        DistanceStack::from_rows(nb_graphs, rows)
    }


    /// distances of each graph of rows (test graphs) to each graph of columns (train graphs).
    /// All sketches must come from the same directions.
    pub fn cross(&self, rows: &[GraphSketch], columns: &[GraphSketch]) -> Result<CrossDistanceStack> {
        if rows.is_empty() || columns.is_empty() {
            return Err(SwwlError::InvalidParameter("cross distances need non empty sets of graphs".into()));
        }
        let nb_outputs = self.aggregation.get_nb_outputs(columns[0].get_nb_levels());
        let compute_line = |i: usize| -> Result<Vec<Vec<f64>>> {
            columns.iter().map(|c| self.pair(&rows[i], c)).collect()
        };
        let lines: Vec<Vec<Vec<f64>>> = if self.parallel {
            (0..rows.len()).into_par_iter().map(compute_line).collect::<Result<_>>()?
        } else {
            (0..rows.len()).map(compute_line).collect::<Result<_>>()?
        };
        let mut data: Vec<Array2<f64>> = (0..nb_outputs).map(|_| Array2::<f64>::zeros((rows.len(), columns.len()))).collect();
        for (i, line) in lines.iter().enumerate() {
            for (j, d) in line.iter().enumerate() {
                for (k, v) in d.iter().enumerate() {
                    data[k][[i, j]] = *v;
                }
            }
        }
        Ok(CrossDistanceStack::new(data.into_iter().map(CrossDistanceMatrix::new).collect()))
    } // end of cross

} // end of impl DistanceAssembler



// end of mod tests
