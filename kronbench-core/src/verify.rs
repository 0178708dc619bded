//! Re-verification of checkpointed spanning trees.

use tracing::{debug, instrument, warn};

use crate::{
    Result,
    checkpoint::CheckpointStore,
    collaborators::TreeVerifier,
    error::BenchError,
    trials::TrialTiming,
    types::{EdgeList, TreeBuffer, TreeRecord, VertexId},
};

/// Whether trees are reloaded and checked after the trials.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VerificationMode {
    /// Credit every trial with the full edge count.
    Skip,
    /// Reload and check every tree.
    #[default]
    Full,
}

impl From<bool> for VerificationMode {
    fn from(verify: bool) -> Self {
        if verify { Self::Full } else { Self::Skip }
    }
}

/// Returns the number of edges traversed by each trial, in trial order.
///
/// In full mode one tree buffer and one converted buffer are allocated up
/// front and reused for every trial; each tree is reloaded from its
/// checkpoint, converted to optional parents, and handed to `verifier`.
///
/// # Errors
/// Returns [`BenchError::Checkpoint`] when a tree cannot be reloaded and
/// [`BenchError::VerificationFailed`] for the first rejected tree.
#[instrument(
    name = "bench.verify",
    err,
    skip_all,
    fields(trials = timings.len(), mode = ?mode),
)]
pub fn verify_trials<V, W>(
    mode: VerificationMode,
    verifier: &V,
    timings: &[TrialTiming],
    edges: &EdgeList,
    vertex_count: u64,
    store: &CheckpointStore,
) -> Result<Vec<u64>>
where
    V: TreeVerifier,
    W: TreeRecord,
{
    let edge_count = edges.len() as u64;
    if mode == VerificationMode::Skip {
        warn!("tree verification skipped, crediting every trial with all edges");
        return Ok(vec![edge_count; timings.len()]);
    }

    let len = usize::try_from(vertex_count)
        .map_err(|_| BenchError::UnsupportedWordSize { bits: usize::BITS })?;
    let mut tree = TreeBuffer::<W>::allocate(len);
    let mut parents: Vec<Option<VertexId>> = vec![None; len];
    let mut counts = Vec::with_capacity(timings.len());
    for (trial, timing) in timings.iter().enumerate() {
        store.load_tree(timing.root, &mut tree)?;
        tree.convert_into(&mut parents);
        let traversed = verifier
            .verify(&parents, timing.max_reached, timing.root, edges)
            .map_err(|source| BenchError::VerificationFailed {
                trial,
                root: timing.root,
                source,
            })?;
        debug!(trial, root = timing.root, traversed, "tree verified");
        counts.push(traversed);
    }
    Ok(counts)
}
