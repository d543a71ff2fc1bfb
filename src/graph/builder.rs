//! Incremental construction of a [Graph] from nodes identified by arbitrary ids (as read in a data file).
//!
//! The association id -> rank is kept in an IndexSet:
//! given a node id we get its rank (row in attribute matrix) with IndexSet::get_index_of,
//! given a rank we get the original node id with IndexSet::get_index.

use std::hash::Hash;

use indexmap::IndexSet;
use ndarray::Array2;

use super::Graph;
use crate::error::{Result, SwwlError};


/// Builds a graph node by node and edge by edge.
pub struct GraphBuilder<NodeId: Hash + Eq + Clone + std::fmt::Debug> {
    name: Option<String>,
    /// node id -> rank
    nodeindex: IndexSet<NodeId>,
    /// attributes, flattened row by row
    features: Vec<f64>,
    /// attribute dimension, set by first node
    dim: Option<usize>,
    /// edges as (src rank, dst rank, weight)
    edges: Vec<(usize, usize, f64)>,
    /// do we insert reverse edges
    symetric: bool,
} // end of struct GraphBuilder


impl<NodeId> GraphBuilder<NodeId>
    where NodeId: Hash + Eq + Clone + std::fmt::Debug {

    pub fn new(symetric: bool) -> Self {
        GraphBuilder {
            name: None,
            nodeindex: IndexSet::new(),
            features: Vec::new(),
            dim: None,
            edges: Vec::new(),
            symetric,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("<builder>")
    }

    /// adds a node with its attribute vector, returns its rank.
    /// All nodes must have the same attribute dimension and a node cannot be inserted twice.
    pub fn add_node(&mut self, id: NodeId, features: &[f64]) -> Result<usize> {
        match self.dim {
            None => { self.dim = Some(features.len()); },
            Some(d) if d != features.len() => {
                return Err(SwwlError::invalid_graph(self.name(),
                        format!("node {:?} has {} attributes, expected {}", id, features.len(), d)));
            },
            _ => {},
        }
        let (rank, inserted) = self.nodeindex.insert_full(id);
        if !inserted {
            return Err(SwwlError::invalid_graph(self.name(),
                    format!("node {:?} inserted twice", self.nodeindex.get_index(rank))));
        }
        self.features.extend_from_slice(features);
        Ok(rank)
    } // end of add_node


    /// adds an edge between 2 already inserted nodes
    pub fn add_edge(&mut self, src: &NodeId, dst: &NodeId, weight: f64) -> Result<()> {
        let src_rank = self.nodeindex.get_index_of(src);
        let dst_rank = self.nodeindex.get_index_of(dst);
        match (src_rank, dst_rank) {
            (Some(s), Some(d)) => {
                self.edges.push((s, d, weight));
                Ok(())
            },
            _ => {
                log::error!("GraphBuilder::add_edge unknown node in edge {:?} -> {:?}", src, dst);
                Err(SwwlError::invalid_graph(self.name(), format!("edge {:?} -> {:?} refers to unknown node", src, dst)))
            },
        }
    } // end of add_edge


    pub fn get_nb_nodes(&self) -> usize {
        self.nodeindex.len()
    }

    /// returns the graph and the node indexation
    pub fn build(self) -> Result<(Graph, IndexSet<NodeId>)> {
        let nb_nodes = self.nodeindex.len();
        let dim = self.dim.unwrap_or(0);
        let name = self.name.clone();
        let features = Array2::from_shape_vec((nb_nodes, dim), self.features)
                .map_err(|e| SwwlError::invalid_graph(name.as_deref().unwrap_or("<builder>"), e.to_string()))?;
        let graph = Graph::from_weighted_edges(features, &self.edges, self.symetric)
                .map_err(|e| rename(e, name.as_deref()))?;
        let graph = match name {
            Some(name) => graph.with_name(name),
            None => graph,
        };
        log::debug!("GraphBuilder built graph {} nb nodes : {}, nb edges : {}", graph.get_name(), graph.get_nb_nodes(), graph.get_nb_edges());
        Ok((graph, self.nodeindex))
    } // end of build

} // end of impl GraphBuilder


// substitute builder name in graph errors
fn rename(err: SwwlError, name: Option<&str>) -> SwwlError {
    match (err, name) {
        (SwwlError::InvalidGraph { reason, .. }, Some(name)) => SwwlError::invalid_graph(name, reason),
        (err, _) => err,
    }
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_builder_string_ids() {
        let mut builder = GraphBuilder::<String>::new(true).with_name("mol");
        builder.add_node("C1".to_string(), &[0., 1.]).unwrap();
        builder.add_node("O2".to_string(), &[1., 1.]).unwrap();
        builder.add_node("H3".to_string(), &[2., 0.]).unwrap();
        builder.add_edge(&"C1".to_string(), &"O2".to_string(), 1.).unwrap();
        builder.add_edge(&"C1".to_string(), &"H3".to_string(), 1.).unwrap();
        let (graph, nodeindex) = builder.build().unwrap();
        assert_eq!(graph.get_name(), "mol");
        assert_eq!(graph.get_nb_nodes(), 3);
        let rank = nodeindex.get_index_of(&"O2".to_string()).unwrap();
        assert_eq!(graph.get_node_features(rank)[0], 1.);
        assert_eq!(graph.get_weighted_degree(0), 2.);
    } // end of test_builder_string_ids


    #[test]
    fn test_builder_errors() {
        let mut builder = GraphBuilder::<u32>::new(false).with_name("bad");
        builder.add_node(1, &[0.]).unwrap();
        // dimension
        assert!(builder.add_node(2, &[0., 1.]).is_err());
        // twice
        assert!(builder.add_node(1, &[3.]).is_err());
        // unknown node
        let res = builder.add_edge(&1, &7, 1.);
        match res {
            Err(SwwlError::InvalidGraph { graph, .. }) => assert_eq!(graph, "bad"),
            _ => panic!("expected InvalidGraph"),
        }
        // empty builder
        let builder = GraphBuilder::<u32>::new(false);
        assert!(builder.build().is_err());
    } // end of test_builder_errors

} // end of mod tests
