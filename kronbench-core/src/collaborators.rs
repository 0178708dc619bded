//! Contracts for the components plugged into the pipeline.
//!
//! The pipeline never generates edges, traverses graphs, or checks trees
//! itself. It drives implementations of these traits and enforces the
//! benchmark's rules around them.

use thiserror::Error;

use crate::{
    config::RmatParams,
    error::{GeneratorError, KernelError},
    types::{Edge, EdgeList, TreeBuffer, TreeRecord, VertexId},
};

/// Produces a Kronecker edge list from a scale and two seeds.
///
/// # Examples
/// ```
/// use kronbench_core::{Edge, EdgeGenerator, EdgeList, GeneratorError};
///
/// struct Ring;
///
/// impl EdgeGenerator for Ring {
///     fn generate(
///         &mut self,
///         scale: u32,
///         desired_edges: u64,
///         _seed_a: u64,
///         _seed_b: u64,
///     ) -> Result<EdgeList, GeneratorError> {
///         let n = 1_u64 << scale;
///         Ok((0..desired_edges).map(|k| Edge::new(k % n, (k + 1) % n)).collect())
///     }
/// }
///
/// let edges = Ring.generate(2, 7, 1, 1)?;
/// assert_eq!(edges.len(), 7);
/// # Ok::<(), GeneratorError>(())
/// ```
pub trait EdgeGenerator {
    /// Generates roughly `desired_edges` edges over `2^scale` vertices.
    ///
    /// The returned list may be shorter or longer than requested; its length
    /// is the benchmark's edge count.
    ///
    /// # Errors
    /// Returns [`GeneratorError`] when parameters are unsupported or
    /// generation fails.
    fn generate(
        &mut self,
        scale: u32,
        desired_edges: u64,
        seed_a: u64,
        seed_b: u64,
    ) -> Result<EdgeList, GeneratorError>;
}

/// Fills a caller-allocated buffer with recursive-matrix edges.
pub trait RmatGenerator {
    /// Overwrites every entry of `edges` with an edge over `2^scale` vertices.
    ///
    /// # Errors
    /// Returns [`GeneratorError`] when parameters are unsupported or
    /// generation fails.
    fn fill(&mut self, edges: &mut [Edge], scale: u32, params: RmatParams)
    -> Result<(), GeneratorError>;
}

/// Result of one timed traversal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TraversalOutcome {
    /// Wall-clock duration measured by the kernel, in seconds.
    pub seconds: f64,
    /// Largest vertex id the traversal may have reached.
    pub max_reached: VertexId,
}

/// Parallel breadth-first traversal kernel.
///
/// The kernel builds its own graph representation once and then serves one
/// traversal per root. Internal parallelism is opaque to the pipeline; every
/// call is treated as a blocking unit of work.
pub trait TraversalKernel {
    /// Builds the kernel's graph from `edges`. Called once, and timed.
    ///
    /// # Errors
    /// Returns [`KernelError`] when the graph cannot be built.
    fn construct(&mut self, edges: &EdgeList, vertex_count: u64) -> Result<(), KernelError>;

    /// Writes the breadth-first tree rooted at `root` into `tree`.
    ///
    /// `tree` arrives pre-touched with every vertex unreached. Implementations
    /// measure their own duration and report it with the maximum reached id.
    ///
    /// # Errors
    /// Returns [`KernelError`] when the traversal fails.
    fn traverse<W: TreeRecord>(
        &mut self,
        tree: &mut TreeBuffer<W>,
        root: VertexId,
    ) -> Result<TraversalOutcome, KernelError>;

    /// Drops the graph built by [`TraversalKernel::construct`].
    fn release(&mut self) {}
}

/// Structural defects a verifier may report for a spanning tree.
///
/// Each variant maps to a stable negative status via [`TreeDefect::code`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TreeDefect {
    /// The root is not recorded as its own parent.
    #[error("root {root} is not its own parent")]
    RootNotSelfParent {
        /// Root of the tree.
        root: VertexId,
    },
    /// Following parents from `vertex` never reaches the root.
    #[error("parent chain from vertex {vertex} contains a cycle")]
    Cycle {
        /// Vertex whose chain loops.
        vertex: VertexId,
    },
    /// A reached vertex has a parent that is not itself reached.
    #[error("vertex {vertex} has unreached parent {parent}")]
    ParentUnreached {
        /// Reached vertex.
        vertex: VertexId,
        /// Its unreached parent.
        parent: VertexId,
    },
    /// A parent id is not a vertex of the graph.
    #[error("vertex {vertex} has out-of-range parent {parent}")]
    ParentOutOfRange {
        /// Vertex carrying the bad parent.
        vertex: VertexId,
        /// Out-of-range parent id.
        parent: VertexId,
    },
    /// The tree length differs from the vertex count.
    #[error("tree has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Vertices in the graph.
        expected: usize,
        /// Entries in the tree.
        actual: usize,
    },
    /// A vertex above the reported maximum was reached.
    #[error("vertex {vertex} is reached but above the reported maximum {max_reached}")]
    ReachedBeyondMax {
        /// Offending vertex.
        vertex: VertexId,
        /// Maximum reported by the kernel.
        max_reached: VertexId,
    },
    /// An edge endpoint is not a vertex of the graph.
    #[error("edge {index} has an out-of-range endpoint")]
    EdgeOutOfRange {
        /// Position of the edge in the list.
        index: usize,
    },
    /// An edge joins a reached vertex to an unreached one.
    #[error("edge {index} joins reached and unreached vertices")]
    ReachMismatch {
        /// Position of the edge in the list.
        index: usize,
    },
    /// An edge joins vertices whose levels differ by more than one.
    #[error("edge {index} spans more than one level")]
    LevelGap {
        /// Position of the edge in the list.
        index: usize,
    },
    /// A tree edge does not exist in the graph.
    #[error("tree edge to vertex {vertex} is not a graph edge")]
    MissingTreeEdge {
        /// Vertex whose parent edge is absent.
        vertex: VertexId,
    },
}

impl TreeDefect {
    /// Returns the negative status code for this defect.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::RootNotSelfParent { .. } => -1,
            Self::Cycle { .. } => -2,
            Self::ParentUnreached { .. } => -3,
            Self::ParentOutOfRange { .. } => -4,
            Self::LengthMismatch { .. } => -5,
            Self::ReachedBeyondMax { .. } => -10,
            Self::EdgeOutOfRange { .. } => -11,
            Self::ReachMismatch { .. } => -12,
            Self::LevelGap { .. } => -13,
            Self::MissingTreeEdge { .. } => -15,
        }
    }
}

/// Independent spanning tree checker.
pub trait TreeVerifier {
    /// Checks `tree` against `edges` and returns the number of traversed edges.
    ///
    /// `tree[v]` is the parent of `v`, or `None` when `v` is unreached.
    ///
    /// # Errors
    /// Returns the first [`TreeDefect`] found.
    fn verify(
        &self,
        tree: &[Option<VertexId>],
        max_reached: VertexId,
        root: VertexId,
        edges: &EdgeList,
    ) -> Result<u64, TreeDefect>;
}
