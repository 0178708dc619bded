//! Graph construction and the timed traversal trials.

use std::time::Instant;

use tracing::{Span, debug, field, info, instrument};

use crate::{
    Result,
    checkpoint::CheckpointStore,
    collaborators::TraversalKernel,
    error::BenchError,
    roots::RootSet,
    types::{EdgeList, TreeBuffer, TreeRecord, VertexId},
};

/// Timing of one traversal, before verification.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrialTiming {
    /// Root of the traversal.
    pub root: VertexId,
    /// Duration reported by the kernel, in seconds.
    pub seconds: f64,
    /// Largest vertex id the kernel reports as reachable.
    pub max_reached: VertexId,
}

/// Hands `edges` to the kernel once and returns the construction time.
///
/// # Errors
/// Returns [`BenchError::Construction`] when the kernel cannot build its
/// graph.
#[instrument(
    name = "bench.construct",
    err,
    skip(kernel, edges),
    fields(edges = edges.len(), seconds = field::Empty),
)]
pub fn construct_graph<K: TraversalKernel>(
    kernel: &mut K,
    edges: &EdgeList,
    vertex_count: u64,
) -> Result<f64> {
    let started = Instant::now();
    kernel
        .construct(edges, vertex_count)
        .map_err(|source| BenchError::Construction { source })?;
    let seconds = started.elapsed().as_secs_f64();
    Span::current().record("seconds", seconds);
    Ok(seconds)
}

/// Runs one traversal per root, checkpointing every tree as it completes.
///
/// Each trial gets a freshly allocated, pre-touched tree buffer that is
/// dropped once the tree is on disk, so at most one tree is resident.
///
/// # Errors
/// Returns [`BenchError::RootOutOfRange`] for a root outside the graph,
/// [`BenchError::Traversal`] when the kernel fails,
/// [`BenchError::InvalidTiming`] for a NaN or negative duration, and
/// [`BenchError::Checkpoint`] when a tree cannot be stored.
#[instrument(
    name = "bench.trials",
    err,
    skip_all,
    fields(trials = roots.len(), width = %W::WIDTH),
)]
pub fn run_trials<K, W>(
    kernel: &mut K,
    roots: &RootSet,
    vertex_count: u64,
    store: &CheckpointStore,
) -> Result<Vec<TrialTiming>>
where
    K: TraversalKernel,
    W: TreeRecord,
{
    let len = usize::try_from(vertex_count)
        .map_err(|_| BenchError::UnsupportedWordSize { bits: usize::BITS })?;
    let mut timings = Vec::with_capacity(roots.len());
    for (trial, root) in roots.iter().enumerate() {
        if root >= vertex_count {
            return Err(BenchError::RootOutOfRange { root, vertex_count });
        }
        let mut tree = TreeBuffer::<W>::allocate(len);
        let outcome = kernel
            .traverse(&mut tree, root)
            .map_err(|source| BenchError::Traversal {
                trial,
                root,
                source,
            })?;
        if outcome.seconds.is_nan() || outcome.seconds < 0.0 {
            return Err(BenchError::InvalidTiming {
                trial,
                root,
                seconds: outcome.seconds,
            });
        }
        store.store_tree(root, &tree)?;
        drop(tree);
        debug!(trial, root, seconds = outcome.seconds, "trial complete");
        timings.push(TrialTiming {
            root,
            seconds: outcome.seconds,
            max_reached: outcome.max_reached,
        });
    }
    info!(trials = timings.len(), "all trials complete");
    Ok(timings)
}
