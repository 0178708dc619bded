//! Production or replay of the benchmark's input graph.

use std::time::Instant;

use tracing::{info, instrument};

use crate::{
    Result,
    checkpoint::CheckpointStore,
    collaborators::{EdgeGenerator, RmatGenerator},
    config::{BenchmarkConfig, GeneratorModel},
    error::BenchError,
    types::{Edge, EdgeList},
};

/// Where an acquired edge list came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeSource {
    /// Produced by a generator during this run.
    Generated(GeneratorModel),
    /// Replayed from an existing edge list checkpoint.
    Replayed,
}

/// Edge list ready for checkpointing, with its generation time.
#[derive(Clone, Debug)]
pub struct AcquiredEdges {
    /// The benchmark graph.
    pub edges: EdgeList,
    /// Seconds spent in the generator, or zero for a replay.
    pub generation_seconds: f64,
    /// Origin of the edges.
    pub source: EdgeSource,
}

/// Produces the edge list for `config`.
///
/// An explicit edge list path that already exists is replayed and nothing is
/// generated. Otherwise the configured model runs once, timed.
///
/// # Errors
/// Returns [`BenchError::Checkpoint`] when a replay cannot be read and
/// [`BenchError::Generator`] when generation fails.
#[instrument(
    name = "bench.acquire_edges",
    err,
    skip_all,
    fields(scale = config.scale(), model = config.model().label()),
)]
pub fn acquire_edges<G, R>(
    config: &BenchmarkConfig,
    store: &CheckpointStore,
    generator: &mut G,
    rmat: &mut R,
) -> Result<AcquiredEdges>
where
    G: EdgeGenerator,
    R: RmatGenerator,
{
    if config.edgelist_path().is_some() && store.edgelist_exists() {
        let edges = store.load_edges()?;
        info!(edges = edges.len(), "replaying edge list checkpoint");
        return Ok(AcquiredEdges {
            edges,
            generation_seconds: 0.0,
            source: EdgeSource::Replayed,
        });
    }

    let model = config.model();
    let generator_error = |source| BenchError::Generator {
        model: model.label(),
        source,
    };
    let started = Instant::now();
    let edges = match model {
        GeneratorModel::Kronecker => generator
            .generate(
                config.scale(),
                config.desired_edge_count(),
                config.seed(),
                config.seed(),
            )
            .map_err(generator_error)?,
        GeneratorModel::Rmat => {
            let len = usize::try_from(config.desired_edge_count()).map_err(|_| {
                BenchError::UnsupportedWordSize { bits: usize::BITS }
            })?;
            let mut buffer = vec![Edge::default(); len];
            rmat.fill(&mut buffer, config.scale(), config.rmat_params())
                .map_err(generator_error)?;
            EdgeList::from_edges(buffer)
        }
    };
    let generation_seconds = started.elapsed().as_secs_f64();
    info!(
        edges = edges.len(),
        seconds = generation_seconds,
        "edge list generated"
    );
    Ok(AcquiredEdges {
        edges,
        generation_seconds,
        source: EdgeSource::Generated(model),
    })
}
