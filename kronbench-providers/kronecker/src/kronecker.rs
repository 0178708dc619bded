//! Scrambled Kronecker graph generator.

use kronbench_core::{Edge, EdgeGenerator, EdgeList, GeneratorError, RmatParams, VertexId};
use rand::{SeedableRng, rngs::SmallRng, seq::SliceRandom};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::placement::{Initiator, check_scale, splitmix64, stream_seed};

const PLACEMENT_STREAM: u64 = 0;
const PERMUTATION_STREAM: u64 = 1;
const SHUFFLE_STREAM: u64 = 2;

/// Kronecker generator with the classic `0.57/0.19/0.19/0.05` initiator.
///
/// Edges are placed by recursive quadrant descent, vertex labels are then
/// replaced through a random permutation, and the edge order is shuffled so
/// neither ids nor positions reveal the recursive structure.
///
/// # Examples
/// ```
/// use kronbench_core::EdgeGenerator;
/// use kronbench_providers_kronecker::KroneckerGenerator;
///
/// let edges = KroneckerGenerator::default().generate(6, 255, 1, 2)?;
/// assert_eq!(edges.len(), 255);
/// assert!(edges.iter().all(|edge| edge.v0 < 64 && edge.v1 < 64));
/// # Ok::<(), kronbench_core::GeneratorError>(())
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct KroneckerGenerator {
    initiator: RmatParams,
}

impl KroneckerGenerator {
    /// Uses a custom initiator instead of the classic one.
    #[must_use]
    pub const fn with_initiator(initiator: RmatParams) -> Self {
        Self { initiator }
    }
}

impl EdgeGenerator for KroneckerGenerator {
    #[instrument(name = "kronecker.generate", err, skip(self))]
    fn generate(
        &mut self,
        scale: u32,
        desired_edges: u64,
        seed_a: u64,
        seed_b: u64,
    ) -> Result<EdgeList, GeneratorError> {
        check_scale(scale)?;
        let len = usize::try_from(desired_edges).map_err(|_| GeneratorError::InvalidParameter {
            parameter: "desired_edges",
        })?;
        let base = splitmix64(seed_a) ^ seed_b.rotate_left(32);

        let mut edges = vec![Edge::default(); len];
        Initiator::new(self.initiator).fill(&mut edges, scale, stream_seed(base, PLACEMENT_STREAM));

        let labels = permutation(1_u64 << scale, stream_seed(base, PERMUTATION_STREAM));
        edges.par_iter_mut().for_each(|edge| {
            *edge = Edge::new(relabel(&labels, edge.v0), relabel(&labels, edge.v1));
        });

        edges.shuffle(&mut SmallRng::seed_from_u64(stream_seed(base, SHUFFLE_STREAM)));
        debug!(edges = edges.len(), "kronecker edges generated");
        Ok(EdgeList::from_edges(edges))
    }
}

fn permutation(vertex_count: u64, seed: u64) -> Vec<VertexId> {
    let mut labels: Vec<VertexId> = (0..vertex_count).collect();
    labels.shuffle(&mut SmallRng::seed_from_u64(seed));
    labels
}

fn relabel(labels: &[VertexId], vertex: VertexId) -> VertexId {
    // Placement never produces ids at or above the vertex count.
    usize::try_from(vertex)
        .ok()
        .and_then(|index| labels.get(index))
        .copied()
        .unwrap_or(vertex)
}
