//! Compressed sparse row adjacency built from an edge list.

use std::sync::atomic::{AtomicUsize, Ordering};

use kronbench_core::{EdgeList, KernelError, VertexId};
use rayon::prelude::*;

/// Undirected graph in compressed sparse row form.
///
/// Every non-self-loop edge is stored in both directions; duplicates are
/// kept.
///
/// # Examples
/// ```
/// use kronbench_core::{Edge, EdgeList};
/// use kronbench_providers_bfs::Csr;
///
/// let edges: EdgeList = [(0, 1), (1, 2), (2, 2)].into_iter().map(Edge::from).collect();
/// let graph = Csr::from_edges(&edges, 4)?;
/// assert_eq!(graph.neighbours(1), &[0, 2]);
/// assert!(graph.neighbours(3).is_empty());
/// # Ok::<(), kronbench_core::KernelError>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Csr {
    offsets: Vec<usize>,
    targets: Vec<VertexId>,
}

impl Csr {
    /// Builds the adjacency of `edges` over `vertex_count` vertices.
    ///
    /// # Errors
    /// Returns [`KernelError::EdgeOutOfRange`] for an endpoint at or above
    /// `vertex_count`.
    pub fn from_edges(edges: &EdgeList, vertex_count: u64) -> Result<Self, KernelError> {
        let len = usize::try_from(vertex_count).map_err(|_| KernelError::Failed {
            message: format!("{vertex_count} vertices do not fit in memory"),
        })?;
        let slot = |index: usize, vertex: VertexId| {
            usize::try_from(vertex)
                .ok()
                .filter(|&slot| slot < len)
                .ok_or(KernelError::EdgeOutOfRange {
                    index,
                    vertex,
                    vertex_count,
                })
        };

        let degree: Vec<AtomicUsize> = (0..len).map(|_| AtomicUsize::new(0)).collect();
        edges
            .as_slice()
            .par_iter()
            .enumerate()
            .try_for_each(|(index, edge)| {
                let (v0, v1) = (slot(index, edge.v0)?, slot(index, edge.v1)?);
                if v0 != v1 {
                    degree[v0].fetch_add(1, Ordering::Relaxed);
                    degree[v1].fetch_add(1, Ordering::Relaxed);
                }
                Ok::<(), KernelError>(())
            })?;

        let mut offsets = Vec::with_capacity(len + 1);
        offsets.push(0);
        let mut total = 0_usize;
        for count in degree {
            total += count.into_inner();
            offsets.push(total);
        }

        // Endpoints were range-checked above.
        let mut targets = vec![0; total];
        let mut cursor = offsets[..len].to_vec();
        for edge in edges {
            if edge.is_self_loop() {
                continue;
            }
            let (v0, v1) = (edge.v0 as usize, edge.v1 as usize);
            targets[cursor[v0]] = edge.v1;
            cursor[v0] += 1;
            targets[cursor[v1]] = edge.v0;
            cursor[v1] += 1;
        }
        Ok(Self { offsets, targets })
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> u64 {
        (self.offsets.len() - 1) as u64
    }

    /// Number of stored directed arcs.
    #[must_use]
    pub fn arc_count(&self) -> usize {
        self.targets.len()
    }

    /// Neighbours of `vertex`, or an empty slice for an unknown vertex.
    #[must_use]
    pub fn neighbours(&self, vertex: VertexId) -> &[VertexId] {
        let Ok(index) = usize::try_from(vertex) else {
            return &[];
        };
        match (self.offsets.get(index), self.offsets.get(index + 1)) {
            (Some(&start), Some(&end)) => &self.targets[start..end],
            _ => &[],
        }
    }
}
