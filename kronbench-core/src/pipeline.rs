//! End-to-end orchestration of one benchmark run.

use tracing::{info, instrument};

use crate::{
    Result,
    acquisition::{EdgeSource, acquire_edges},
    checkpoint::CheckpointStore,
    collaborators::{EdgeGenerator, RmatGenerator, TraversalKernel, TreeVerifier},
    config::BenchmarkConfig,
    report::BenchmarkReport,
    roots::{self, RootSet},
    trials::{TrialTiming, construct_graph, run_trials},
    types::{EdgeList, TreeRecord, TreeWidth},
    verify::verify_trials,
};

/// The pluggable components a run is driven through.
#[derive(Clone, Debug, Default)]
pub struct Collaborators<G, R, K, V> {
    /// Kronecker edge generator.
    pub generator: G,
    /// Recursive-matrix edge generator.
    pub rmat: R,
    /// Breadth-first traversal kernel.
    pub kernel: K,
    /// Spanning tree verifier.
    pub verifier: V,
}

/// Everything a completed run produced.
///
/// Each field is written by exactly one stage of the pipeline.
#[derive(Clone, Debug)]
pub struct BenchmarkOutcome {
    /// Origin of the edge list.
    pub edge_source: EdgeSource,
    /// Roots traversed, in trial order.
    pub roots: RootSet,
    /// Per-trial timings, paired with `roots`.
    pub timings: Vec<TrialTiming>,
    /// Per-trial traversed edge counts, paired with `roots`.
    pub edge_counts: Vec<u64>,
    /// Rendered statistics.
    pub report: BenchmarkReport,
}

/// A configured benchmark run.
///
/// The tree record width chosen in the configuration selects the buffer and
/// checkpoint layout used for every trial.
#[derive(Debug)]
pub struct Benchmark<G, R, K, V> {
    config: BenchmarkConfig,
    collaborators: Collaborators<G, R, K, V>,
}

impl<G, R, K, V> Benchmark<G, R, K, V>
where
    G: EdgeGenerator,
    R: RmatGenerator,
    K: TraversalKernel,
    V: TreeVerifier,
{
    /// Pairs a validated configuration with its collaborators.
    pub const fn new(config: BenchmarkConfig, collaborators: Collaborators<G, R, K, V>) -> Self {
        Self {
            config,
            collaborators,
        }
    }

    /// The configuration this run uses.
    #[must_use]
    pub const fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Returns the collaborators, consuming the benchmark.
    #[must_use]
    pub fn into_collaborators(self) -> Collaborators<G, R, K, V> {
        self.collaborators
    }

    /// Runs every stage in order and returns the outcome.
    ///
    /// Stages: acquire edges, checkpoint them, select roots, construct the
    /// kernel graph and release the edges, run the trials, reload the edges,
    /// verify every tree, and summarise.
    ///
    /// # Errors
    /// Returns the first [`crate::BenchError`] raised by any stage. Nothing is
    /// retried.
    #[instrument(
        name = "bench.run",
        err,
        skip(self),
        fields(
            scale = self.config.scale(),
            edgefactor = self.config.edgefactor(),
            trials = self.config.trials(),
            width = %self.config.tree_width(),
        ),
    )]
    pub fn run(&mut self) -> Result<BenchmarkOutcome> {
        match self.config.tree_width() {
            TreeWidth::U32 => self.run_with::<u32>(),
            TreeWidth::U64 => self.run_with::<u64>(),
        }
    }

    fn run_with<W: TreeRecord>(&mut self) -> Result<BenchmarkOutcome> {
        let config = &self.config;
        let Collaborators {
            generator,
            rmat,
            kernel,
            verifier,
        } = &mut self.collaborators;
        let vertex_count = config.vertex_count();

        let store = CheckpointStore::open(config)?;
        let acquired = acquire_edges(config, &store, generator, rmat)?;
        if acquired.source == EdgeSource::Replayed {
            info!("edge list replayed from its checkpoint, skipping write");
        } else {
            store.store_edges(&acquired.edges)?;
        }
        let roots = select_roots(config, &acquired.edges)?;
        info!(roots = roots.len(), "roots selected");

        let construction_seconds = construct_graph(kernel, &acquired.edges, vertex_count)?;
        drop(acquired.edges);

        let timings = run_trials::<K, W>(kernel, &roots, vertex_count, &store)?;
        kernel.release();

        let edges = store.load_edges()?;
        let edge_counts = verify_trials::<V, W>(
            config.verify().into(),
            verifier,
            &timings,
            &edges,
            vertex_count,
            &store,
        )?;
        drop(edges);

        let report = BenchmarkReport::build(
            config,
            acquired.generation_seconds,
            construction_seconds,
            &timings,
            &edge_counts,
        )?;
        Ok(BenchmarkOutcome {
            edge_source: acquired.source,
            roots,
            timings,
            edge_counts,
            report,
        })
    }
}

fn select_roots(config: &BenchmarkConfig, edges: &EdgeList) -> Result<RootSet> {
    if let Some(path) = config.root_file() {
        return roots::load_roots(path, config.trials(), config.vertex_count());
    }
    let flags = roots::mark_adjacency(edges, config.vertex_count())?;
    roots::sample_roots(&flags, config.trials(), config.seed())
}
