//! Graph representation : a node attribute matrix and a sparse adjacency matrix.
//!
//! The adjacency is stored in a compressed row matrix (crate sprs).
//! Row i lists the neighbours whose attributes flow into node i during propagation,
//! so for a directed edge src -> dst we store the entry (dst, src).
//! Symetric graphs store both entries.
//!
//! Isolated nodes are legal, an empty graph is not.

use ndarray::{Array2, ArrayView1, ArrayView2};
use sprs::{CsMatI, TriMatI};

use crate::error::{Result, SwwlError};

/// Builder keyed by arbitrary node identifiers.
pub mod builder;

pub use builder::GraphBuilder;

const DEFAULT_NAME: &str = "<unnamed>";

/// An immutable attributed graph.
#[derive(Clone, Debug)]
pub struct Graph {
    /// optional name, used in error reports
    name: Option<String>,
    /// (n, d0) matrix of initial node attributes
    features: Array2<f64>,
    /// (n, n) weighted adjacency, row i lists in-neighbours of i
    adjacency: CsMatI<f64, usize>,
} // end of struct Graph


impl Graph {
    /// Creates a graph from an attribute matrix (one row per node) and a square weighted adjacency matrix.
    /// Weights must be finite and non negative.
    pub fn new(features: Array2<f64>, adjacency: CsMatI<f64, usize>) -> Result<Self> {
        let adjacency = if adjacency.is_csr() { adjacency } else { adjacency.to_csr() };
        let graph = Graph { name: None, features, adjacency };
        graph.check()?;
        Ok(graph)
    } // end of new


    /// Creates a graph from an edge list. Each edge (src, dst) has weight 1.
    /// If symetric is true the reverse edge is also inserted.
    pub fn from_edges(features: Array2<f64>, edges: &[(usize, usize)], symetric: bool) -> Result<Self> {
        let weighted: Vec<(usize, usize, f64)> = edges.iter().map(|e| (e.0, e.1, 1.)).collect();
        Graph::from_weighted_edges(features, &weighted, symetric)
    }


    /// Creates a graph from a weighted edge list (src, dst, weight).
    /// Multiple edges between the same nodes see their weights summed.
    pub fn from_weighted_edges(features: Array2<f64>, edges: &[(usize, usize, f64)], symetric: bool) -> Result<Self> {
        let nb_nodes = features.nrows();
        if nb_nodes == 0 {
            return Err(SwwlError::invalid_graph(DEFAULT_NAME, "graph has no node"));
        }
        let capacity = if symetric { 2 * edges.len() } else { edges.len() };
        let mut rows = Vec::<usize>::with_capacity(capacity);
        let mut cols = Vec::<usize>::with_capacity(capacity);
        let mut values = Vec::<f64>::with_capacity(capacity);
        for (src, dst, w) in edges {
            if *src >= nb_nodes || *dst >= nb_nodes {
                return Err(SwwlError::invalid_graph(DEFAULT_NAME,
                        format!("edge ({}, {}) out of range, nb nodes : {}", src, dst, nb_nodes)));
            }
            rows.push(*dst);
            cols.push(*src);
            values.push(*w);
            if symetric && src != dst {
                rows.push(*src);
                cols.push(*dst);
                values.push(*w);
            }
        }
        let trimat = TriMatI::<f64, usize>::from_triplets((nb_nodes, nb_nodes), rows, cols, values);
        let adjacency: CsMatI<f64, usize> = trimat.to_csr();
        Graph::new(features, adjacency)
    } // end of from_weighted_edges


    /// Creates a graph from a petgraph graph.
    /// node_features gives the attribute vector of each node, edge_weight the weight of each edge.
    /// An undirected petgraph graph gives a symetric adjacency.
    pub fn from_petgraph<N, E, Ty, Ix>(pgraph: &petgraph::Graph<N, E, Ty, Ix>,
                node_features: impl Fn(&N) -> Vec<f64>, edge_weight: impl Fn(&E) -> f64) -> Result<Self>
        where Ty: petgraph::EdgeType,
              Ix: petgraph::graph::IndexType {
        //
        use petgraph::visit::EdgeRef;
        //
        let nb_nodes = pgraph.node_count();
        if nb_nodes == 0 {
            return Err(SwwlError::invalid_graph(DEFAULT_NAME, "petgraph graph has no node"));
        }
        let mut data = Vec::<f64>::new();
        let mut dim: Option<usize> = None;
        for idx in pgraph.node_indices() {
            let feat = node_features(&pgraph[idx]);
            match dim {
                None => { dim = Some(feat.len()); },
                Some(d) if d != feat.len() => {
                    return Err(SwwlError::invalid_graph(DEFAULT_NAME,
                            format!("node {} has {} attributes, expected {}", idx.index(), feat.len(), d)));
                },
                _ => {},
            }
            data.extend(feat);
        }
        let dim = dim.unwrap_or(0);
        let features = Array2::from_shape_vec((nb_nodes, dim), data)
                .map_err(|e| SwwlError::invalid_graph(DEFAULT_NAME, e.to_string()))?;
        let edges: Vec<(usize, usize, f64)> = pgraph.edge_references()
                .map(|e| (e.source().index(), e.target().index(), edge_weight(e.weight())))
                .collect();
        log::debug!("from_petgraph nb nodes : {}, nb edges : {}, directed : {}", nb_nodes, edges.len(), pgraph.is_directed());
        Graph::from_weighted_edges(features, &edges, !pgraph.is_directed())
    } // end of from_petgraph


    /// attach a name to the graph, it is used in error reports
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// returns name or a placeholder
    pub fn get_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_NAME)
    }

    /// true if a name was attached with [Graph::with_name]
    pub fn is_named(&self) -> bool {
        self.name.is_some()
    }

    /// number of nodes
    pub fn get_nb_nodes(&self) -> usize {
        self.features.nrows()
    }

    /// dimension of initial node attributes
    pub fn get_dim(&self) -> usize {
        self.features.ncols()
    }

    /// number of stored (directed) adjacency entries
    pub fn get_nb_edges(&self) -> usize {
        self.adjacency.nnz()
    }

    pub fn get_features(&self) -> ArrayView2<f64> {
        self.features.view()
    }

    pub fn get_node_features(&self, node: usize) -> ArrayView1<f64> {
        self.features.row(node)
    }

    pub fn get_adjacency(&self) -> &CsMatI<f64, usize> {
        &self.adjacency
    }

    /// returns the (neighbour, weight) list of in-neighbours of a node
    pub fn get_neighbours(&self, node: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.adjacency.indptr().outer_inds_sz(node);
        let indices = &self.adjacency.indices()[range.clone()];
        let data = &self.adjacency.data()[range];
        indices.iter().zip(data.iter()).map(|(j, w)| (*j, *w))
    }

    /// sum of weights of in-neighbours (self loops included if stored)
    pub fn get_weighted_degree(&self, node: usize) -> f64 {
        self.get_neighbours(node).map(|(_, w)| w).sum()
    }


    // checks invariants. Called by all constructors
    fn check(&self) -> Result<()> {
        let name = self.get_name();
        let nb_nodes = self.features.nrows();
        if nb_nodes == 0 {
            return Err(SwwlError::invalid_graph(name, "graph has no node"));
        }
        if self.features.ncols() == 0 {
            return Err(SwwlError::invalid_graph(name, "nodes have no attribute"));
        }
        let (nb_rows, nb_cols) = self.adjacency.shape();
        if nb_rows != nb_nodes || nb_cols != nb_nodes {
            return Err(SwwlError::invalid_graph(name,
                    format!("adjacency shape ({}, {}) does not match nb nodes {}", nb_rows, nb_cols, nb_nodes)));
        }
        if let Some(k) = self.adjacency.indices().iter().position(|j| *j >= nb_nodes) {
            return Err(SwwlError::invalid_graph(name, format!("adjacency index {} out of range", self.adjacency.indices()[k])));
        }
        if self.adjacency.data().iter().any(|w| !w.is_finite() || *w < 0.) {
            return Err(SwwlError::invalid_graph(name, "edge weights must be finite and non negative"));
        }
        if self.features.iter().any(|x| !x.is_finite()) {
            return Err(SwwlError::invalid_graph(name, "non finite node attribute"));
        }
        Ok(())
    } // end of check

} // end of impl Graph


//====================================================================================


// end of mod tests
