#![allow(dead_code, reason = "each integration test binary uses a subset")]

use std::collections::VecDeque;

use kronbench_core::{
    Edge, EdgeGenerator, EdgeList, GeneratorError, KernelError, RmatGenerator, RmatParams,
    TraversalKernel, TraversalOutcome, TreeBuffer, TreeDefect, TreeRecord, TreeVerifier, VertexId,
};

/// Returns a fixed list of pairs regardless of the requested size.
#[derive(Clone, Debug, Default)]
pub struct FixtureGenerator {
    pub pairs: Vec<(u64, u64)>,
    pub calls: usize,
}

impl FixtureGenerator {
    pub fn new(pairs: Vec<(u64, u64)>) -> Self {
        Self { pairs, calls: 0 }
    }
}

impl EdgeGenerator for FixtureGenerator {
    fn generate(
        &mut self,
        _scale: u32,
        _desired_edges: u64,
        _seed_a: u64,
        _seed_b: u64,
    ) -> Result<EdgeList, GeneratorError> {
        self.calls += 1;
        Ok(self.pairs.iter().copied().map(Edge::from).collect())
    }
}

/// Fills the buffer by cycling through a fixed list of pairs.
#[derive(Clone, Debug, Default)]
pub struct CyclingRmat {
    pub pairs: Vec<(u64, u64)>,
}

impl RmatGenerator for CyclingRmat {
    fn fill(
        &mut self,
        edges: &mut [Edge],
        _scale: u32,
        _params: RmatParams,
    ) -> Result<(), GeneratorError> {
        if self.pairs.is_empty() {
            return Err(GeneratorError::Failed {
                message: "no pairs to cycle".into(),
            });
        }
        for (slot, pair) in edges.iter_mut().zip(self.pairs.iter().cycle()) {
            *slot = Edge::from(*pair);
        }
        Ok(())
    }
}

/// Sequential breadth-first search that reports a fixed duration.
#[derive(Clone, Debug)]
pub struct FixedDurationKernel {
    pub seconds: f64,
    pub corrupt: bool,
    adjacency: Option<Vec<Vec<VertexId>>>,
    pub released: bool,
}

impl FixedDurationKernel {
    pub fn new(seconds: f64) -> Self {
        Self {
            seconds,
            corrupt: false,
            adjacency: None,
            released: false,
        }
    }

    /// Makes every tree claim that the root's first child hangs off an
    /// unreached vertex.
    pub fn corrupting(mut self) -> Self {
        self.corrupt = true;
        self
    }
}

impl TraversalKernel for FixedDurationKernel {
    fn construct(&mut self, edges: &EdgeList, vertex_count: u64) -> Result<(), KernelError> {
        let mut adjacency = vec![Vec::new(); vertex_count as usize];
        for (index, edge) in edges.iter().enumerate() {
            for vertex in [edge.v0, edge.v1] {
                if vertex >= vertex_count {
                    return Err(KernelError::EdgeOutOfRange {
                        index,
                        vertex,
                        vertex_count,
                    });
                }
            }
            if !edge.is_self_loop() {
                adjacency[edge.v0 as usize].push(edge.v1);
                adjacency[edge.v1 as usize].push(edge.v0);
            }
        }
        self.adjacency = Some(adjacency);
        Ok(())
    }

    fn traverse<W: TreeRecord>(
        &mut self,
        tree: &mut TreeBuffer<W>,
        root: VertexId,
    ) -> Result<TraversalOutcome, KernelError> {
        let adjacency = self.adjacency.as_ref().ok_or(KernelError::NotConstructed)?;
        tree.set_parent(root, Some(root))?;
        let mut queue = VecDeque::from([root]);
        let mut max_reached = root;
        while let Some(vertex) = queue.pop_front() {
            for &next in &adjacency[vertex as usize] {
                if tree.parent(next).is_none() {
                    tree.set_parent(next, Some(vertex))?;
                    max_reached = max_reached.max(next);
                    queue.push_back(next);
                }
            }
        }
        if self.corrupt {
            let unreached = (0..tree.len() as u64).find(|&v| tree.parent(v).is_none());
            let child = adjacency[root as usize].first().copied();
            if let (Some(unreached), Some(child)) = (unreached, child) {
                tree.set_parent(child, Some(unreached))?;
            }
        }
        Ok(TraversalOutcome {
            seconds: self.seconds,
            max_reached,
        })
    }

    fn release(&mut self) {
        self.adjacency = None;
        self.released = true;
    }
}

/// Counts edges with both endpoints reached and rejects reached vertices
/// whose parent is unreached.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReachVerifier;

impl TreeVerifier for ReachVerifier {
    fn verify(
        &self,
        tree: &[Option<VertexId>],
        _max_reached: VertexId,
        root: VertexId,
        edges: &EdgeList,
    ) -> Result<u64, TreeDefect> {
        if tree.get(root as usize).copied().flatten() != Some(root) {
            return Err(TreeDefect::RootNotSelfParent { root });
        }
        for (vertex, parent) in tree.iter().enumerate() {
            if let Some(parent) = *parent {
                if tree[parent as usize].is_none() {
                    return Err(TreeDefect::ParentUnreached {
                        vertex: vertex as VertexId,
                        parent,
                    });
                }
            }
        }
        Ok(edges
            .iter()
            .filter(|edge| tree[edge.v0 as usize].is_some() && tree[edge.v1 as usize].is_some())
            .count() as u64)
    }
}
