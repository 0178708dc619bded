//! Level-synchronous parallel breadth-first search.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Instant,
};

use kronbench_core::{
    EdgeList, KernelError, TraversalKernel, TraversalOutcome, TreeBuffer, TreeRecord, VertexId,
};
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::csr::Csr;

const UNVISITED: u64 = u64::MAX;

/// Top-down breadth-first search over a [`Csr`] graph.
///
/// Each level expands the whole frontier in parallel; a vertex is claimed by
/// whichever frontier neighbour wins the compare-and-swap on its parent slot.
/// The reported duration covers the traversal and the tree write-out.
///
/// # Examples
/// ```
/// use kronbench_core::{Edge, EdgeList, TraversalKernel, TreeBuffer};
/// use kronbench_providers_bfs::LevelSyncBfs;
///
/// let edges: EdgeList = [(0, 1), (1, 2)].into_iter().map(Edge::from).collect();
/// let mut kernel = LevelSyncBfs::default();
/// kernel.construct(&edges, 4)?;
/// let mut tree = TreeBuffer::<u64>::allocate(4);
/// let outcome = kernel.traverse(&mut tree, 2)?;
/// assert_eq!(tree.parent(0), Some(1));
/// assert_eq!(tree.parent(3), None);
/// assert_eq!(outcome.max_reached, 2);
/// # Ok::<(), kronbench_core::KernelError>(())
/// ```
#[derive(Debug, Default)]
pub struct LevelSyncBfs {
    graph: Option<Csr>,
}

impl LevelSyncBfs {
    /// Borrows the constructed graph, if any.
    #[must_use]
    pub fn graph(&self) -> Option<&Csr> {
        self.graph.as_ref()
    }
}

impl TraversalKernel for LevelSyncBfs {
    #[instrument(name = "bfs.construct", err, skip(self, edges), fields(edges = edges.len()))]
    fn construct(&mut self, edges: &EdgeList, vertex_count: u64) -> Result<(), KernelError> {
        let graph = Csr::from_edges(edges, vertex_count)?;
        debug!(arcs = graph.arc_count(), "adjacency built");
        self.graph = Some(graph);
        Ok(())
    }

    #[instrument(name = "bfs.traverse", err, skip(self, tree))]
    fn traverse<W: TreeRecord>(
        &mut self,
        tree: &mut TreeBuffer<W>,
        root: VertexId,
    ) -> Result<TraversalOutcome, KernelError> {
        let graph = self.graph.as_ref().ok_or(KernelError::NotConstructed)?;
        let vertex_count = graph.vertex_count();
        if root >= vertex_count {
            return Err(KernelError::RootOutOfRange { root, vertex_count });
        }
        if tree.len() as u64 != vertex_count {
            return Err(KernelError::VertexOutOfRange {
                vertex: vertex_count - 1,
                len: tree.len(),
            });
        }

        let start = Instant::now();
        let parents: Vec<AtomicU64> = (0..vertex_count).map(|_| AtomicU64::new(UNVISITED)).collect();
        parents[root as usize].store(root, Ordering::Relaxed);

        let mut frontier = vec![root];
        let mut levels = 0_u32;
        while !frontier.is_empty() {
            let parents = &parents;
            frontier = frontier
                .par_iter()
                .flat_map_iter(|&vertex| {
                    graph.neighbours(vertex).iter().filter_map(move |&next| {
                        parents[next as usize]
                            .compare_exchange(UNVISITED, vertex, Ordering::Relaxed, Ordering::Relaxed)
                            .ok()
                            .map(|_| next)
                    })
                })
                .collect();
            levels += 1;
        }

        let max_reached = parents
            .par_iter()
            .enumerate()
            .filter(|(_, parent)| parent.load(Ordering::Relaxed) != UNVISITED)
            .map(|(vertex, _)| vertex as VertexId)
            .max()
            .unwrap_or(root);
        tree.fill_parents(|vertex| {
            let parent = parents[vertex as usize].load(Ordering::Relaxed);
            (parent != UNVISITED).then_some(parent)
        })?;
        let seconds = start.elapsed().as_secs_f64();

        debug!(levels, max_reached, seconds, "traversal finished");
        Ok(TraversalOutcome {
            seconds,
            max_reached,
        })
    }

    fn release(&mut self) {
        self.graph = None;
    }
}
