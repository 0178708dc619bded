//! Selection of the traversal roots.
//!
//! Roots are distinct vertices with at least one edge to a different vertex.
//! They are either replayed from a root file or drawn by selection sampling
//! so that every eligible vertex has the same chance of being picked.

use std::{
    path::Path,
    sync::atomic::{AtomicBool, Ordering},
};

use rand::{Rng, SeedableRng, distributions::Standard, rngs::SmallRng};
use rayon::prelude::*;
use tracing::{instrument, warn};

use crate::{
    Result,
    checkpoint,
    error::BenchError,
    types::{EdgeList, VertexId},
};

/// Ordered, immutable set of distinct traversal roots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootSet {
    roots: Vec<VertexId>,
}

impl RootSet {
    /// Number of roots, which is the effective trial count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    /// Returns whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Borrows the roots in trial order.
    #[must_use]
    pub fn as_slice(&self) -> &[VertexId] {
        &self.roots
    }

    /// Iterates over the roots in trial order.
    pub fn iter(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.roots.iter().copied()
    }
}

/// Flags every vertex touched by an edge to a different vertex.
///
/// # Errors
/// Returns [`BenchError::EdgeOutOfRange`] when an endpoint is not below
/// `vertex_count`.
pub fn mark_adjacency(edges: &EdgeList, vertex_count: u64) -> Result<Vec<bool>> {
    let len = usize::try_from(vertex_count).map_err(|_| BenchError::UnsupportedWordSize {
        bits: usize::BITS,
    })?;
    let flags: Vec<AtomicBool> = (0..len).map(|_| AtomicBool::new(false)).collect();
    edges
        .as_slice()
        .par_iter()
        .enumerate()
        .try_for_each(|(index, edge)| -> Result<()> {
            if edge.is_self_loop() {
                return Ok(());
            }
            for vertex in [edge.v0, edge.v1] {
                let flag = usize::try_from(vertex)
                    .ok()
                    .and_then(|slot| flags.get(slot))
                    .ok_or(BenchError::EdgeOutOfRange {
                        index,
                        vertex,
                        vertex_count,
                    })?;
                // Every writer stores the same value.
                flag.store(true, Ordering::Relaxed);
            }
            Ok(())
        })?;
    Ok(flags.into_iter().map(AtomicBool::into_inner).collect())
}

/// Draws up to `wanted` roots by selection sampling over `has_adjacency`.
///
/// One uniform draw is consumed per vertex, eligible or not, so the chosen
/// set depends only on the seed and the adjacency flags. When the vertices
/// run out before `wanted` roots are accepted the set shrinks with a warning.
///
/// # Errors
/// Returns [`BenchError::NoEligibleRoots`] when no root is accepted.
///
/// # Examples
/// ```
/// use kronbench_core::sample_roots;
///
/// let flags = [true, false, true, true];
/// let roots = sample_roots(&flags, 2, 7)?;
/// assert_eq!(roots.len(), 2);
/// assert!(roots.iter().all(|root| flags[root as usize]));
/// # Ok::<(), kronbench_core::BenchError>(())
/// ```
#[instrument(
    name = "bench.sample_roots",
    err,
    skip(has_adjacency),
    fields(vertices = has_adjacency.len()),
)]
pub fn sample_roots(has_adjacency: &[bool], wanted: usize, seed: u64) -> Result<RootSet> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let vertex_count = has_adjacency.len();
    let mut roots = Vec::with_capacity(wanted);
    for (t, &eligible) in has_adjacency.iter().enumerate() {
        if roots.len() == wanted {
            break;
        }
        let draw: f64 = rng.sample(Standard);
        let remaining = (vertex_count - t) as f64;
        let still_needed = (wanted - roots.len()) as f64;
        if eligible && remaining * draw <= still_needed {
            roots.push(t as VertexId);
        }
    }
    if roots.is_empty() {
        return Err(BenchError::NoEligibleRoots);
    }
    if roots.len() < wanted {
        warn!(
            requested = wanted,
            found = roots.len(),
            "not enough vertices with non-self degree > 0, reducing the trial count"
        );
    }
    Ok(RootSet { roots })
}

/// Loads `count` roots from a root file and checks each is a vertex.
///
/// # Errors
/// Returns [`BenchError::Checkpoint`] when the file cannot be read in full and
/// [`BenchError::RootOutOfRange`] for an id outside `[0, vertex_count)`.
pub fn load_roots(path: &Path, count: usize, vertex_count: u64) -> Result<RootSet> {
    let roots = checkpoint::load_roots(path, count)?;
    if let Some(&root) = roots.iter().find(|&&root| root >= vertex_count) {
        return Err(BenchError::RootOutOfRange { root, vertex_count });
    }
    Ok(RootSet { roots })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Edge;
    use proptest::prelude::*;
    use rstest::{fixture, rstest};
    use std::collections::HashSet;

    #[fixture]
    fn star() -> EdgeList {
        [(0, 1), (0, 2), (3, 3), (0, 4)]
            .into_iter()
            .map(Edge::from)
            .collect()
    }

    #[rstest]
    fn adjacency_skips_self_loops(star: EdgeList) {
        let flags = mark_adjacency(&star, 6).expect("edges are in range");
        assert_eq!(flags, vec![true, true, true, false, true, false]);
    }

    #[rstest]
    fn adjacency_rejects_out_of_range_endpoint(star: EdgeList) {
        let err = mark_adjacency(&star, 4).expect_err("vertex 4 is out of range");
        assert!(matches!(
            err,
            BenchError::EdgeOutOfRange {
                index: 3,
                vertex: 4,
                vertex_count: 4,
            }
        ));
    }

    #[rstest]
    fn sampler_shrinks_when_too_few_vertices_qualify() {
        let roots = sample_roots(&[false, true, false, true], 3, 1).expect("two roots qualify");
        assert_eq!(roots.as_slice(), &[1, 3]);
    }

    #[rstest]
    fn sampler_fails_without_eligible_vertices() {
        let err = sample_roots(&[false; 8], 2, 1).expect_err("no vertex qualifies");
        assert!(matches!(err, BenchError::NoEligibleRoots));
    }

    #[rstest]
    fn sampler_is_deterministic_for_a_seed() {
        let flags = vec![true; 256];
        let first = sample_roots(&flags, 16, 42).expect("roots exist");
        let second = sample_roots(&flags, 16, 42).expect("roots exist");
        assert_eq!(first, second);
    }

    proptest! {
        #[test]
        fn sampled_roots_are_distinct_and_eligible(
            flags in prop::collection::vec(any::<bool>(), 1..512),
            wanted in 1_usize..64,
            seed in any::<u64>(),
        ) {
            let Ok(roots) = sample_roots(&flags, wanted, seed) else {
                return Ok(());
            };
            prop_assert!(roots.len() <= wanted);
            let unique: HashSet<_> = roots.iter().collect();
            prop_assert_eq!(unique.len(), roots.len());
            for root in roots.iter() {
                prop_assert!(flags[root as usize]);
            }
        }

        #[test]
        fn fully_connected_graphs_yield_every_requested_root(
            vertices in 1_usize..512,
            wanted in 1_usize..64,
            seed in any::<u64>(),
        ) {
            let roots = sample_roots(&vec![true; vertices], wanted, seed)
                .expect("every vertex qualifies");
            prop_assert_eq!(roots.len(), wanted.min(vertices));
        }
    }
}
