//! Structural checks for breadth-first spanning trees.

use std::sync::atomic::{AtomicBool, Ordering};

use kronbench_core::{EdgeList, TreeDefect, TreeVerifier, VertexId};
use rayon::prelude::*;
use tracing::{debug, instrument};

const NO_LEVEL: u64 = u64::MAX;

/// Verifier that checks a parent array against the edge list it spans.
///
/// The tree must be rooted at a self-parented root, acyclic, closed under
/// parents, consistent with the reported maximum, and every graph edge must
/// join two reached vertices at most one level apart or two unreached ones.
/// Each tree edge must also appear in the graph.
///
/// # Examples
/// ```
/// use kronbench_core::{Edge, EdgeList, TreeVerifier};
/// use kronbench_providers_bfs::ParentTreeVerifier;
///
/// let edges: EdgeList = [(0, 1), (1, 2)].into_iter().map(Edge::from).collect();
/// let tree = [Some(0), Some(0), Some(1), None];
/// assert_eq!(ParentTreeVerifier.verify(&tree, 2, 0, &edges), Ok(2));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ParentTreeVerifier;

impl TreeVerifier for ParentTreeVerifier {
    #[instrument(name = "verify.tree", err, skip(self, tree, edges), fields(edges = edges.len()))]
    fn verify(
        &self,
        tree: &[Option<VertexId>],
        max_reached: VertexId,
        root: VertexId,
        edges: &EdgeList,
    ) -> Result<u64, TreeDefect> {
        let levels = levels(tree, root)?;
        if let Some(vertex) = (0..tree.len())
            .into_par_iter()
            .filter(|&vertex| vertex as VertexId > max_reached && tree[vertex].is_some())
            .min()
        {
            return Err(TreeDefect::ReachedBeyondMax {
                vertex: vertex as VertexId,
                max_reached,
            });
        }

        let seen: Vec<AtomicBool> = tree.iter().map(|_| AtomicBool::new(false)).collect();
        let traversed = edges
            .as_slice()
            .par_iter()
            .enumerate()
            .map(|(index, edge)| {
                let slot = |vertex: VertexId| {
                    usize::try_from(vertex)
                        .ok()
                        .filter(|&slot| slot < tree.len())
                        .ok_or(TreeDefect::EdgeOutOfRange { index })
                };
                let (v0, v1) = (slot(edge.v0)?, slot(edge.v1)?);
                match (levels[v0], levels[v1]) {
                    (NO_LEVEL, NO_LEVEL) => return Ok(0),
                    (NO_LEVEL, _) | (_, NO_LEVEL) => {
                        return Err(TreeDefect::ReachMismatch { index });
                    }
                    (l0, l1) if l0.abs_diff(l1) > 1 => {
                        return Err(TreeDefect::LevelGap { index });
                    }
                    _ => {}
                }
                if tree[v0] == Some(edge.v1) {
                    seen[v0].store(true, Ordering::Relaxed);
                }
                if tree[v1] == Some(edge.v0) {
                    seen[v1].store(true, Ordering::Relaxed);
                }
                Ok(1_u64)
            })
            .try_reduce(|| 0, |left, right| Ok(left + right))?;

        if let Some(vertex) = (0..tree.len())
            .into_par_iter()
            .filter(|&vertex| {
                vertex as VertexId != root
                    && tree[vertex].is_some()
                    && !seen[vertex].load(Ordering::Relaxed)
            })
            .min()
        {
            return Err(TreeDefect::MissingTreeEdge {
                vertex: vertex as VertexId,
            });
        }

        debug!(traversed, "tree verified");
        Ok(traversed)
    }
}

/// Assigns every reached vertex its depth below `root`.
///
/// Unreached vertices get [`NO_LEVEL`]. Chains are walked once and memoised.
fn levels(tree: &[Option<VertexId>], root: VertexId) -> Result<Vec<u64>, TreeDefect> {
    let root_slot = usize::try_from(root)
        .ok()
        .filter(|&slot| slot < tree.len())
        .ok_or(TreeDefect::RootNotSelfParent { root })?;
    if tree[root_slot] != Some(root) {
        return Err(TreeDefect::RootNotSelfParent { root });
    }

    let mut levels = vec![NO_LEVEL; tree.len()];
    levels[root_slot] = 0;
    let mut chain = Vec::new();
    for start in 0..tree.len() {
        let Some(mut parent) = tree[start] else {
            continue;
        };
        if levels[start] != NO_LEVEL {
            continue;
        }
        chain.clear();
        let mut vertex = start;
        let base = loop {
            let parent_slot = usize::try_from(parent)
                .ok()
                .filter(|&slot| slot < tree.len())
                .ok_or(TreeDefect::ParentOutOfRange {
                    vertex: vertex as VertexId,
                    parent,
                })?;
            let Some(grandparent) = tree[parent_slot] else {
                return Err(TreeDefect::ParentUnreached {
                    vertex: vertex as VertexId,
                    parent,
                });
            };
            chain.push(vertex);
            if chain.len() > tree.len() {
                return Err(TreeDefect::Cycle {
                    vertex: start as VertexId,
                });
            }
            if levels[parent_slot] != NO_LEVEL {
                break levels[parent_slot];
            }
            vertex = parent_slot;
            parent = grandparent;
        };
        for (depth, &vertex) in chain.iter().rev().enumerate() {
            levels[vertex] = base + 1 + depth as u64;
        }
    }
    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kronbench_core::Edge;
    use rstest::rstest;

    fn edges(pairs: &[(u64, u64)]) -> EdgeList {
        pairs.iter().copied().map(Edge::from).collect()
    }

    #[rstest]
    fn levels_follow_parent_chains() {
        let tree = [Some(0), Some(0), Some(1), Some(2), None];
        assert_eq!(levels(&tree, 0), Ok(vec![0, 1, 2, 3, NO_LEVEL]));
    }

    #[rstest]
    fn self_parented_non_root_is_a_cycle() {
        let tree = [Some(0), Some(1)];
        assert_eq!(levels(&tree, 0), Err(TreeDefect::Cycle { vertex: 1 }));
    }

    #[rstest]
    #[case::unreached_root(vec![None, Some(0)], 0)]
    #[case::wrong_parent(vec![Some(1), Some(1)], 0)]
    #[case::root_beyond_tree(vec![Some(0)], 3)]
    fn root_must_be_its_own_parent(#[case] tree: Vec<Option<VertexId>>, #[case] root: VertexId) {
        let err = ParentTreeVerifier
            .verify(&tree, 1, root, &edges(&[(0, 1)]))
            .expect_err("root check fails");
        assert_eq!(err.code(), -1);
    }

    #[rstest]
    #[case::cycle(vec![Some(0), Some(2), Some(1)], -2)]
    #[case::unreached_parent(vec![Some(0), Some(2), None], -3)]
    #[case::parent_out_of_range(vec![Some(0), Some(7), None], -4)]
    fn malformed_parent_chains_are_rejected(
        #[case] tree: Vec<Option<VertexId>>,
        #[case] code: i64,
    ) {
        let err = ParentTreeVerifier
            .verify(&tree, 2, 0, &edges(&[(0, 1), (1, 2)]))
            .expect_err("parent chain is malformed");
        assert_eq!(err.code(), code);
    }

    #[rstest]
    fn reached_vertex_above_maximum_is_rejected() {
        let tree = [Some(0), Some(0), Some(1)];
        let err = ParentTreeVerifier
            .verify(&tree, 1, 0, &edges(&[(0, 1), (1, 2)]))
            .expect_err("vertex 2 exceeds the maximum");
        assert_eq!(
            err,
            TreeDefect::ReachedBeyondMax {
                vertex: 2,
                max_reached: 1,
            }
        );
    }

    #[rstest]
    #[case::endpoint_out_of_range(&[(0, 1), (1, 9)], vec![Some(0), Some(0), None], -11)]
    #[case::half_reached_edge(&[(0, 1), (1, 2)], vec![Some(0), Some(0), None], -12)]
    #[case::level_gap(&[(0, 1), (1, 2), (0, 2)], vec![Some(0), Some(0), Some(1), None], -13)]
    #[case::invented_tree_edge(
        &[(0, 1), (0, 3), (3, 2)],
        vec![Some(0), Some(0), Some(1), Some(0)],
        -15
    )]
    fn edge_scan_defects_are_rejected(
        #[case] pairs: &[(u64, u64)],
        #[case] tree: Vec<Option<VertexId>>,
        #[case] code: i64,
    ) {
        let err = ParentTreeVerifier
            .verify(&tree, tree.len() as VertexId, 0, &edges(pairs))
            .expect_err("edge scan finds a defect");
        assert_eq!(err.code(), code);
    }

    #[rstest]
    fn self_loops_on_reached_vertices_are_counted() {
        let tree = [Some(0), Some(0), None];
        assert_eq!(
            ParentTreeVerifier.verify(&tree, 1, 0, &edges(&[(0, 1), (1, 1), (2, 2)])),
            Ok(2)
        );
    }
}
