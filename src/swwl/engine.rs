//! The engine chaining WL propagation, sketching, distance assembly and kernel conversion.
//!
//! Directions are sampled once per run from the seed and shared by all graphs.
//! Graphs are sketched in parallel, then distances are assembled in parallel by rows,
//! both in a dedicated rayon pool. Serial and parallel runs give bit identical results.

use std::ops::Range;
use std::time::SystemTime;

use cpu_time::ProcessTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::cache::CacheKey;
use super::params::SwwlParams;
use crate::distance::*;
use crate::error::{Result, SwwlError};
use crate::graph::Graph;
use crate::kernel::{GramMatrix, KernelConverter, KernelParams};
use crate::sliced::{GraphSketch, LevelDirections};
use crate::wl::WlPropagator;


/// Directions of a run and the sketches of its graphs, in graph order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SketchBatch {
    directions: LevelDirections,
    sketches: Vec<GraphSketch>,
}

impl SketchBatch {
    pub fn get_directions(&self) -> &LevelDirections {
        &self.directions
    }

    pub fn get_sketches(&self) -> &[GraphSketch] {
        &self.sketches
    }

    pub fn get_nb_graphs(&self) -> usize {
        self.sketches.len()
    }
}



pub struct SwwlEngine {
    params: SwwlParams,
    propagator: WlPropagator,
    assembler: DistanceAssembler,
    pool: Option<rayon::ThreadPool>,
} // end of SwwlEngine


impl SwwlEngine {

    pub fn new(params: SwwlParams) -> Result<Self> {
        params.check()?;
        let propagator = WlPropagator::new(params.wl)?;
        let assembler = DistanceAssembler::new(params.exponent, params.aggregation, params.parallel)?;
        let pool = if params.parallel {
            Some(rayon::ThreadPoolBuilder::new().num_threads(params.nb_threads).build()?)
        } else {
            None
        };
        log::info!("SwwlEngine H : {}, P : {}, Q : {}, T : {}, seed : {}, parallel : {}, nb threads : {}", params.wl.get_nb_iter(),
                params.sketch.get_nb_projections(), params.sketch.get_nb_quantiles(), params.wl.get_step(),
                params.seed, params.parallel, params.nb_threads);
        Ok(SwwlEngine { params, propagator, assembler, pool })
    } // end of new


    pub fn get_params(&self) -> &SwwlParams {
        &self.params
    }

    /// key of distances computed by this engine on a dataset
    pub fn cache_key(&self, dataset: &str, kernel: &str) -> CacheKey {
        CacheKey::new(dataset, kernel, &self.params)
    }

    // runs f in our pool if any
    fn run<F, R>(&self, f: F) -> R
        where F: FnOnce() -> R + Send,
              R: Send {
        match &self.pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }


    /// samples the directions of all levels for graphs with attribute dimension dim0
    pub fn directions(&self, dim0: usize) -> Result<LevelDirections> {
        let wl = &self.params.wl;
        let dims: Vec<usize> = (0..wl.get_nb_levels()).map(|h| wl.get_level_dim(dim0, h)).collect();
        LevelDirections::sample(&dims, self.params.sketch.get_nb_projections(), self.params.seed,
                self.params.sketch.get_direction_policy())
    }


    /// sketches of one graph with given directions
    pub fn sketch_graph(&self, graph: &Graph, directions: &LevelDirections) -> Result<GraphSketch> {
        GraphSketch::new(graph, &self.propagator, directions, &self.params.sketch)
    }


    /// samples directions from the dimension of the graphs and sketches all graphs.
    /// All graphs must have the same attribute dimension.
    pub fn sketch_graphs(&self, graphs: &[Graph]) -> Result<SketchBatch> {
        let dim0 = match graphs.first() {
            Some(g) => g.get_dim(),
            None => return Err(SwwlError::InvalidParameter("no graph to sketch".into())),
        };
        let directions = self.directions(dim0)?;
        let sketches = self.sketch_graphs_with(graphs, &directions)?;
        Ok(SketchBatch { directions, sketches })
    }


    /// sketches graphs with given directions, typically test graphs with the directions of the train batch
    pub fn sketch_graphs_with(&self, graphs: &[Graph], directions: &LevelDirections) -> Result<Vec<GraphSketch>> {
        if let Some(nb_levels) = directions.get_nb_levels() {
            if nb_levels < self.params.wl.get_nb_levels() {
                return Err(SwwlError::dimension("number of direction levels", self.params.wl.get_nb_levels(), nb_levels));
            }
        }
        if directions.get_nb_projections() != self.params.sketch.get_nb_projections() {
            log::warn!("sketching with {} directions, parameters ask for {}", directions.get_nb_projections(),
                    self.params.sketch.get_nb_projections());
        }
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        // errors name the graph by its rank in the batch
        let sketch_one = |(i, g): (usize, &Graph)| {
            let identifier = if g.is_named() { format!("index {} ({})", i, g.get_name()) } else { format!("index {}", i) };
            GraphSketch::new_identified(g, &identifier, &self.propagator, directions, &self.params.sketch)
        };
        let sketches: Result<Vec<GraphSketch>> = if self.params.parallel {
            self.run(|| graphs.par_iter().enumerate().map(sketch_one).collect())
        } else {
            graphs.iter().enumerate().map(sketch_one).collect()
        };
        let sketches = sketches.map_err(|e| {
            log::error!("sketching failed : {}", e);
            e
        })?;
        log::info!("sketched {} graphs, sys time(s) {:.2e} cpu time(s) {:.2e}", graphs.len(),
                sys_start.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), cpu_start.elapsed().as_secs_f64());
        Ok(sketches)
    } // end of sketch_graphs_with


    /// full distance matrices of a batch
    pub fn assemble(&self, batch: &SketchBatch) -> Result<DistanceStack> {
        let cpu_start = ProcessTime::now();
        let sys_start = SystemTime::now();
        let stack = self.run(|| self.assembler.assemble(batch.get_sketches()))?;
        log::info!("assembled {} distance matrices of {} graphs, sys time(s) {:.2e} cpu time(s) {:.2e}", stack.len(),
                batch.get_nb_graphs(), sys_start.elapsed().map(|d| d.as_secs_f64()).unwrap_or(0.), cpu_start.elapsed().as_secs_f64());
        Ok(stack)
    }


    /// upper triangle rows of a range of graphs, to be merged with [DistanceStack::from_rows]
    pub fn distance_rows(&self, batch: &SketchBatch, range: Range<usize>) -> Result<Vec<DistanceRow>> {
        self.run(|| self.assembler.rows(batch.get_sketches(), range))
    }


    /// distance matrices between graphs
    pub fn distances(&self, graphs: &[Graph]) -> Result<DistanceStack> {
        let batch = self.sketch_graphs(graphs)?;
        self.assemble(&batch)
    }


    /// distances from test graphs (rows) to the graphs of a train batch (columns), with the train directions
    pub fn cross_distances(&self, test: &[Graph], train: &SketchBatch) -> Result<CrossDistanceStack> {
        let sketches = self.sketch_graphs_with(test, train.get_directions())?;
        self.run(|| self.assembler.cross(&sketches, train.get_sketches()))
    }


    /// gram matrices of graphs, one per distance matrix
    pub fn gram(&self, graphs: &[Graph], kernel: &KernelParams) -> Result<Vec<GramMatrix>> {
        let converter = KernelConverter::new(*kernel)?;
        let stack = self.distances(graphs)?;
        stack.get_matrices().iter().map(|d| converter.gram(d)).collect()
    }

} // end of impl SwwlEngine



// end of mod tests
