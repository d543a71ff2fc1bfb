//! Continuous Weisfeiler-Lehman propagation of node attributes.
//!
//! At each pass a node aggregates its own attribute and the weighted attributes of its in-neighbours
//! (see [NeighbourAggregation]). The aggregation is a weighted sum over the neighbour multiset, so it
//! does not depend on neighbour ordering and agrees on isomorphic graphs.

use ndarray::{concatenate, Array1, Array2, ArrayView2, Axis};

use super::params::*;
use crate::error::{Result, SwwlError};
use crate::graph::Graph;


/// Node attributes of a graph at one WL level. Row i corresponds to node i.
#[derive(Clone, Debug)]
pub struct LevelEmbedding {
    level: usize,
    data: Array2<f64>,
}

impl LevelEmbedding {
    pub fn get_level(&self) -> usize {
        self.level
    }

    pub fn get_dim(&self) -> usize {
        self.data.ncols()
    }

    pub fn get_nb_nodes(&self) -> usize {
        self.data.nrows()
    }

    pub fn get_data(&self) -> ArrayView2<f64> {
        self.data.view()
    }

    pub fn into_data(self) -> Array2<f64> {
        self.data
    }
} // end of impl LevelEmbedding


/// Produces the level embeddings 0..=H of a graph.
pub struct WlPropagator {
    params: WlParams,
}


impl WlPropagator {

    pub fn new(params: WlParams) -> Result<Self> {
        params.check()?;
        Ok(WlPropagator { params })
    }

    pub fn get_params(&self) -> &WlParams {
        &self.params
    }

    /// returns all level embeddings, level 0 is a copy of graph attributes.
    pub fn propagate(&self, graph: &Graph) -> Result<Vec<LevelEmbedding>> {
        let mut levels = Vec::<LevelEmbedding>::with_capacity(self.params.get_nb_levels());
        self.for_each_level(graph, |embedding| {
            levels.push(embedding.clone());
            Ok(())
        })?;
        Ok(levels)
    } // end of propagate


    /// Calls f on each level embedding in increasing level order.
    /// Only the current level (and the concatenated attributes in Concatenate mode) are kept in memory.
    /// An error returned by f stops the propagation.
    pub fn for_each_level<F>(&self, graph: &Graph, mut f: F) -> Result<()>
        where F: FnMut(&LevelEmbedding) -> Result<()> {
        //
        if graph.get_nb_nodes() == 0 {
            return Err(SwwlError::invalid_graph(graph.get_name(), "graph has no node"));
        }
        let degrees: Vec<f64> = match self.params.aggregation {
            NeighbourAggregation::SymNormalized => {
                (0..graph.get_nb_nodes()).map(|i| 1. + graph.get_weighted_degree(i)).collect()
            },
            _ => Vec::new(),
        };
        let mut current = LevelEmbedding { level: 0, data: graph.get_features().to_owned() };
        f(&current)?;
        // in Replace mode current.data is the state. In Concatenate mode the state is kept apart
        let mut state = match self.params.level_policy {
            LevelPolicy::Replace => None,
            LevelPolicy::Concatenate => Some(current.data.clone()),
        };
        for h in 1..=self.params.nb_iter {
            let next = match state.as_mut() {
                None => {
                    let mut x = self.one_pass(graph, &current.data, &degrees);
                    for _ in 1..self.params.step {
                        x = self.one_pass(graph, &x, &degrees);
                    }
                    x
                },
                Some(x) => {
                    for _ in 0..self.params.step {
                        *x = self.one_pass(graph, x, &degrees);
                    }
                    concatenate(Axis(1), &[current.data.view(), x.view()])
                            .map_err(|e| SwwlError::dimension(format!("concatenation at level {} : {}", h, e), current.get_dim(), x.ncols()))?
                },
            };
            current = LevelEmbedding { level: h, data: next };
            log::trace!("wl level {} graph {} dim {}", h, graph.get_name(), current.get_dim());
            f(&current)?;
        }
        Ok(())
    } // end of for_each_level


    // one propagation pass
    fn one_pass(&self, graph: &Graph, x: &Array2<f64>, degrees: &[f64]) -> Array2<f64> {
        let (nb_nodes, dim) = x.dim();
        let mut out = Array2::<f64>::zeros((nb_nodes, dim));
        let mut acc = Array1::<f64>::zeros(dim);
        for i in 0..nb_nodes {
            acc.fill(0.);
            let mut wsum = 0.;
            let mut out_i = out.row_mut(i);
            match self.params.aggregation {
                NeighbourAggregation::HalfMean => {
                    for (j, w) in graph.get_neighbours(i) {
                        acc.scaled_add(w, &x.row(j));
                        wsum += w;
                    }
                    if wsum > 0. {
                        acc /= wsum;
                    }
                    out_i.assign(&x.row(i));
                    out_i += &acc;
                    out_i *= 0.5;
                },
                NeighbourAggregation::SelfMean => {
                    for (j, w) in graph.get_neighbours(i) {
                        acc.scaled_add(w, &x.row(j));
                        wsum += w;
                    }
                    out_i.assign(&x.row(i));
                    out_i += &acc;
                    out_i /= 1. + wsum;
                },
                NeighbourAggregation::Sum => {
                    for (j, w) in graph.get_neighbours(i) {
                        acc.scaled_add(w, &x.row(j));
                    }
                    out_i.assign(&x.row(i));
                    out_i += &acc;
                },
                NeighbourAggregation::SymNormalized => {
                    let d_i = degrees[i];
                    for (j, w) in graph.get_neighbours(i) {
                        acc.scaled_add(w / (d_i * degrees[j]).sqrt(), &x.row(j));
                    }
                    out_i.assign(&x.row(i));
                    out_i /= d_i;
                    out_i += &acc;
                },
            }
        }
        out
    } // end of one_pass

} // end of impl WlPropagator


//===============================================================================


#[cfg(test)]
mod tests {

    use super::*;

    use ndarray::array;
    use rand::Rng;
    use rand::seq::SliceRandom;
    use rand_xoshiro::rand_core::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn log_init_test() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn path_graph() -> Graph {
        let features = array![[0., 0.], [1., 0.], [2., 0.], [3., 0.]];
        Graph::from_edges(features, &[(0, 1), (1, 2), (2, 3)], true).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1.0e-12
    }

    #[test]
    fn test_level0_is_input() {
        log_init_test();
        let graph = path_graph();
        let propagator = WlPropagator::new(WlParams::new(2, 1, NeighbourAggregation::HalfMean, LevelPolicy::Replace)).unwrap();
        let levels = propagator.propagate(&graph).unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0].get_data(), graph.get_features());
        assert_eq!(levels[2].get_level(), 2);
    }

    #[test]
    fn test_halfmean_path() {
        log_init_test();
        let graph = path_graph();
        let propagator = WlPropagator::new(WlParams::new(1, 1, NeighbourAggregation::HalfMean, LevelPolicy::Replace)).unwrap();
        let levels = propagator.propagate(&graph).unwrap();
        let x1 = levels[1].get_data();
        let expected = [0.5, 1., 2., 2.5];
        for i in 0..4 {
            assert!(close(x1[[i, 0]], expected[i]), "node {} got {}", i, x1[[i, 0]]);
            assert!(close(x1[[i, 1]], 0.));
        }
    } // end of test_halfmean_path

    #[test]
    fn test_isolated_node_aggregations() {
        let graph = Graph::from_edges(array![[2., -4.]], &[], true).unwrap();
        let half = WlPropagator::new(WlParams::new(1, 1, NeighbourAggregation::HalfMean, LevelPolicy::Replace)).unwrap();
        let levels = half.propagate(&graph).unwrap();
        assert_eq!(levels[1].get_data(), array![[1., -2.]].view());
        //
        for aggregation in [NeighbourAggregation::SelfMean, NeighbourAggregation::Sum, NeighbourAggregation::SymNormalized] {
            let propagator = WlPropagator::new(WlParams::new(1, 1, aggregation, LevelPolicy::Replace)).unwrap();
            let levels = propagator.propagate(&graph).unwrap();
            assert_eq!(levels[1].get_data(), array![[2., -4.]].view(), "aggregation {:?}", aggregation);
        }
    } // end of test_isolated_node_aggregations

    #[test]
    fn test_other_aggregations_values() {
        // 2 nodes linked, weights 1
        let graph = Graph::from_edges(array![[1.], [3.]], &[(0, 1)], true).unwrap();
        let run = |aggregation| {
            let propagator = WlPropagator::new(WlParams::new(1, 1, aggregation, LevelPolicy::Replace)).unwrap();
            propagator.propagate(&graph).unwrap()[1].get_data().to_owned()
        };
        let x = run(NeighbourAggregation::SelfMean);
        assert!(close(x[[0, 0]], 2.) && close(x[[1, 0]], 2.));
        let x = run(NeighbourAggregation::Sum);
        assert!(close(x[[0, 0]], 4.) && close(x[[1, 0]], 4.));
        // degrees with self loop are 2, so each node gets x_i/2 + x_j/2
        let x = run(NeighbourAggregation::SymNormalized);
        assert!(close(x[[0, 0]], 2.) && close(x[[1, 0]], 2.));
    } // end of test_other_aggregations_values

    #[test]
    fn test_concatenate_policy() {
        log_init_test();
        let graph = path_graph();
        let replace = WlPropagator::new(WlParams::new(2, 1, NeighbourAggregation::HalfMean, LevelPolicy::Replace)).unwrap();
        let concat = WlPropagator::new(WlParams::new(2, 1, NeighbourAggregation::HalfMean, LevelPolicy::Concatenate)).unwrap();
        let lr = replace.propagate(&graph).unwrap();
        let lc = concat.propagate(&graph).unwrap();
        for h in 0..3 {
            assert_eq!(lc[h].get_dim(), 2 * (h + 1));
            assert_eq!(concat.get_params().get_level_dim(2, h), lc[h].get_dim());
            for k in 0..=h {
                let block = lc[h].get_data().slice(ndarray::s![.., 2 * k..2 * (k + 1)]).to_owned();
                assert_eq!(block, lr[k].get_data());
            }
        }
    } // end of test_concatenate_policy

    #[test]
    fn test_step_skips_levels() {
        let graph = path_graph();
        let step1 = WlPropagator::new(WlParams::new(4, 1, NeighbourAggregation::HalfMean, LevelPolicy::Replace)).unwrap();
        let step2 = WlPropagator::new(WlParams::new(2, 2, NeighbourAggregation::HalfMean, LevelPolicy::Replace)).unwrap();
        let l1 = step1.propagate(&graph).unwrap();
        let l2 = step2.propagate(&graph).unwrap();
        assert_eq!(l2[1].get_data(), l1[2].get_data());
        assert_eq!(l2[2].get_data(), l1[4].get_data());
        //
        assert!(WlPropagator::new(WlParams::new(2, 0, NeighbourAggregation::HalfMean, LevelPolicy::Replace)).is_err());
    }

    // relabelling nodes must permute rows of every level embedding
    #[test]
    fn test_permutation_invariance() {
        log_init_test();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(4664397);
        let nb_nodes = 12;
        let features = Array2::from_shape_fn((nb_nodes, 3), |_| rng.gen_range(-1.0..1.0));
        let mut edges = Vec::<(usize, usize, f64)>::new();
        for i in 0..nb_nodes {
            for j in (i + 1)..nb_nodes {
                if rng.gen_bool(0.3) {
                    edges.push((i, j, rng.gen_range(0.5..2.)));
                }
            }
        }
        let mut perm: Vec<usize> = (0..nb_nodes).collect();
        perm.shuffle(&mut rng);
        // node i becomes perm[i]
        let mut pfeatures = Array2::<f64>::zeros((nb_nodes, 3));
        for i in 0..nb_nodes {
            pfeatures.row_mut(perm[i]).assign(&features.row(i));
        }
        let mut pedges: Vec<(usize, usize, f64)> = edges.iter().map(|e| (perm[e.0], perm[e.1], e.2)).collect();
        pedges.reverse();
        let graph = Graph::from_weighted_edges(features, &edges, true).unwrap();
        let pgraph = Graph::from_weighted_edges(pfeatures, &pedges, true).unwrap();
        for aggregation in [NeighbourAggregation::HalfMean, NeighbourAggregation::SelfMean, NeighbourAggregation::Sum, NeighbourAggregation::SymNormalized] {
            let propagator = WlPropagator::new(WlParams::new(3, 1, aggregation, LevelPolicy::Replace)).unwrap();
            let levels = propagator.propagate(&graph).unwrap();
            let plevels = propagator.propagate(&pgraph).unwrap();
            for h in 0..4 {
                for i in 0..nb_nodes {
                    for k in 0..3 {
                        let a = levels[h].get_data()[[i, k]];
                        let b = plevels[h].get_data()[[perm[i], k]];
                        assert!((a - b).abs() < 1.0e-10, "aggregation {:?} level {} node {}", aggregation, h, i);
                    }
                }
            }
        }
    } // end of test_permutation_invariance

    #[test]
    fn test_for_each_level_stops_on_error() {
        let graph = path_graph();
        let propagator = WlPropagator::new(WlParams::default()).unwrap();
        let mut seen = 0;
        let res = propagator.for_each_level(&graph, |embedding| {
            seen += 1;
            if embedding.get_level() == 1 {
                return Err(SwwlError::InvalidParameter("stop".into()));
            }
            Ok(())
        });
        assert!(res.is_err());
        assert_eq!(seen, 2);
    }

} // end of mod tests
