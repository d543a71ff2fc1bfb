//! Distance matrices between graphs.
//!
//! A [DistanceMatrix] is square, symmetric with a zero diagonal and non negative finite entries.
//! It is written once, row blocks by row blocks, then frozen.
//! Train/test blocks are extracted by [DistanceMatrix::block].

use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SwwlError};
use crate::sliced::params::Interpolation;
use crate::sliced::quantile::quantile;


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistanceMatrix")]
pub struct DistanceMatrix {
    data: Array2<f64>,
}

// serialized form of DistanceMatrix, validated when deserialized
#[derive(Deserialize)]
struct RawDistanceMatrix {
    data: Array2<f64>,
}

impl TryFrom<RawDistanceMatrix> for DistanceMatrix {
    type Error = SwwlError;

    fn try_from(raw: RawDistanceMatrix) -> Result<Self> {
        DistanceMatrix::from_array(raw.data)
    }
}


impl DistanceMatrix {

    // no check, used by the assembler which fills the upper triangle and mirrors it
    pub(crate) fn from_upper_unchecked(data: Array2<f64>) -> Self {
        DistanceMatrix { data }
    }

    /// validates an externally provided matrix (a reloaded cache for example).
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        let (nrows, ncols) = data.dim();
        if nrows != ncols {
            return Err(SwwlError::dimension("distance matrix must be square", nrows, ncols));
        }
        if nrows == 0 {
            return Err(SwwlError::InvalidParameter("empty distance matrix".into()));
        }
        for i in 0..nrows {
            if data[[i, i]] != 0. {
                return Err(SwwlError::InvalidParameter(format!("distance matrix diagonal not null at {}", i)));
            }
            for j in (i + 1)..nrows {
                let d = data[[i, j]];
                if !d.is_finite() || d < 0. {
                    return Err(SwwlError::InvalidParameter(format!("bad distance {} at ({}, {})", d, i, j)));
                }
                if d != data[[j, i]] {
                    return Err(SwwlError::InvalidParameter(format!("distance matrix not symmetric at ({}, {})", i, j)));
                }
            }
        }
        Ok(DistanceMatrix { data })
    } // end of from_array


    /// number of graphs
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

    /// extracts the block of rows and columns given, typically test x train.
    pub fn block(&self, rows: &[usize], cols: &[usize]) -> Result<Array2<f64>> {
        let n = self.get_nb_graphs();
        if let Some(i) = rows.iter().chain(cols.iter()).find(|i| **i >= n) {
            return Err(SwwlError::InvalidParameter(format!("block index {} out of range, nb graphs {}", i, n)));
        }
        Ok(self.data.select(Axis(0), rows).select(Axis(1), cols))
    }

    /// quantile (linear interpolation) of off diagonal distances. None if less than 2 graphs
    pub fn off_diagonal_quantile(&self, t: f64) -> Option<f64> {
        let n = self.get_nb_graphs();
        if n < 2 {
            return None;
        }
        let mut values = Vec::<f64>::with_capacity(n * (n - 1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                values.push(self.data[[i, j]]);
            }
        }
        values.sort_unstable_by(|a, b| a.total_cmp(b));
        Some(quantile(&values, t, Interpolation::Linear))
    }

} // end of impl DistanceMatrix



/// Rectangular distances between a set of (test) graphs in rows and (train) graphs in columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossDistanceMatrix {
    data: Array2<f64>,
}

impl CrossDistanceMatrix {
    pub(crate) fn new(data: Array2<f64>) -> Self {
        CrossDistanceMatrix { data }
    }

    pub fn get_nb_rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn get_nb_columns(&self) -> usize {
        self.data.ncols()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[[i, j]]
    }

    pub fn get_data(&self) -> ArrayView2<f64> {
        self.data.view()
    }
}



/// A line of the upper triangle of distances : entry (k, j - row - 1) holds output k distance between graphs row and j > row.
/// There is one output for aggregated distances, H+1 for separated levels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistanceRow")]
pub struct DistanceRow {
    row: usize,
    values: Array2<f64>,
}

#[derive(Deserialize)]
struct RawDistanceRow {
    row: usize,
    values: Array2<f64>,
}

impl TryFrom<RawDistanceRow> for DistanceRow {
    type Error = SwwlError;

    fn try_from(raw: RawDistanceRow) -> Result<Self> {
        DistanceRow::from_values(raw.row, raw.values)
    }
}

impl DistanceRow {
    pub(crate) fn new(row: usize, values: Array2<f64>) -> Self {
        DistanceRow { row, values }
    }

    /// a row given from outside (computed elsewhere), entries must be finite and non negative
    pub fn from_values(row: usize, values: Array2<f64>) -> Result<Self> {
        let r = DistanceRow { row, values };
        r.check()?;
        Ok(r)
    }

    fn check(&self) -> Result<()> {
        for ((k, l), d) in self.values.indexed_iter() {
            if !d.is_finite() || *d < 0. {
                return Err(SwwlError::InvalidParameter(format!("bad distance {} between graphs {} and {} (output {})",
                        d, self.row, self.row + 1 + l, k)));
            }
        }
        Ok(())
    }

    pub fn get_row(&self) -> usize {
        self.row
    }

    pub fn get_nb_outputs(&self) -> usize {
        self.values.nrows()
    }

    /// (nb outputs, nb graphs - row - 1)
    pub fn get_values(&self) -> ArrayView2<f64> {
        self.values.view()
    }
}



/// The distance matrices of a run: one matrix for aggregated levels, one per level if levels are kept separate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDistanceStack")]
pub struct DistanceStack {
    matrices: Vec<DistanceMatrix>,
}

#[derive(Deserialize)]
struct RawDistanceStack {
    matrices: Vec<DistanceMatrix>,
}

impl TryFrom<RawDistanceStack> for DistanceStack {
    type Error = SwwlError;

    fn try_from(raw: RawDistanceStack) -> Result<Self> {
        DistanceStack::new(raw.matrices)
    }
}


impl DistanceStack {

    pub fn new(matrices: Vec<DistanceMatrix>) -> Result<Self> {
        if matrices.is_empty() {
            return Err(SwwlError::InvalidParameter("empty distance stack".into()));
        }
        let n = matrices[0].get_nb_graphs();
        if let Some(m) = matrices.iter().find(|m| m.get_nb_graphs() != n) {
            return Err(SwwlError::dimension("distance stack", n, m.get_nb_graphs()));
        }
        Ok(DistanceStack { matrices })
    }

    /// Merges rows computed separately (possibly on other hosts), in any order.
    /// Every row of 0..nb_graphs must be present once, and all distances finite and non negative, else the merge fails.
    pub fn from_rows(nb_graphs: usize, rows: Vec<DistanceRow>) -> Result<Self> {
        if nb_graphs == 0 {
            return Err(SwwlError::InvalidParameter("no graph".into()));
        }
        let nb_outputs = match rows.first() {
            Some(r) => r.get_nb_outputs(),
            None => return Err(SwwlError::IncompleteMatrix { row: 0 }),
        };
        let mut slots: Vec<Option<DistanceRow>> = vec![None; nb_graphs];
        for r in rows {
            let i = r.get_row();
            if i >= nb_graphs {
                return Err(SwwlError::InvalidParameter(format!("row {} out of range, nb graphs {}", i, nb_graphs)));
            }
            let (outputs, width) = r.values.dim();
            if outputs != nb_outputs {
                return Err(SwwlError::dimension(format!("number of outputs of row {}", i), nb_outputs, outputs));
            }
            if width != nb_graphs - i - 1 {
                return Err(SwwlError::dimension(format!("length of row {}", i), nb_graphs - i - 1, width));
            }
            if slots[i].is_some() {
                return Err(SwwlError::InvalidParameter(format!("row {} given twice", i)));
            }
            r.check()?;
            slots[i] = Some(r);
        }
        let mut data: Vec<Array2<f64>> = (0..nb_outputs).map(|_| Array2::<f64>::zeros((nb_graphs, nb_graphs))).collect();
        for (i, slot) in slots.iter().enumerate() {
            let r = slot.as_ref().ok_or(SwwlError::IncompleteMatrix { row: i })?;
            for (k, matrix) in data.iter_mut().enumerate() {
                for (l, d) in r.values.row(k).iter().enumerate() {
                    let j = i + 1 + l;
                    matrix[[i, j]] = *d;
                    matrix[[j, i]] = *d;
                }
            }
        }
        let matrices = data.into_iter().map(DistanceMatrix::from_upper_unchecked).collect();
        Ok(DistanceStack { matrices })
    } // end of from_rows


    /// number of matrices
    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn get_nb_graphs(&self) -> usize {
        self.matrices[0].get_nb_graphs()
    }

    pub fn get(&self, k: usize) -> &DistanceMatrix {
        &self.matrices[k]
    }

    pub fn get_matrices(&self) -> &[DistanceMatrix] {
        &self.matrices
    }

    pub fn into_matrices(self) -> Vec<DistanceMatrix> {
        self.matrices
    }

} // end of impl DistanceStack



/// Test x train distances, one matrix per output as in [DistanceStack]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossDistanceStack {
    matrices: Vec<CrossDistanceMatrix>,
}

impl CrossDistanceStack {
    pub(crate) fn new(matrices: Vec<CrossDistanceMatrix>) -> Self {
        CrossDistanceStack { matrices }
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    pub fn get(&self, k: usize) -> &CrossDistanceMatrix {
        &self.matrices[k]
    }

    pub fn get_matrices(&self) -> &[CrossDistanceMatrix] {
        &self.matrices
    }
}



// end of mod tests
