//! Graph data types shared by every pipeline stage.
//!
//! Edges are pairs of 64-bit vertex ids. Spanning trees are stored as
//! fixed-width parent records with an all-ones sentinel for "unreached", but
//! are read and written as `Option<VertexId>` at the API surface.

use std::fmt;

use rayon::prelude::*;

use crate::error::KernelError;

/// Identifier of a graph vertex, in `[0, 2^scale)`.
pub type VertexId = u64;

/// One undirected edge of the benchmark graph.
///
/// # Examples
/// ```
/// use kronbench_core::Edge;
///
/// let edge = Edge::new(3, 3);
/// assert!(edge.is_self_loop());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Edge {
    /// First endpoint.
    pub v0: VertexId,
    /// Second endpoint.
    pub v1: VertexId,
}

impl Edge {
    /// Size of one edge record in a checkpoint file.
    pub const RECORD_BYTES: usize = 16;

    /// Creates an edge between `v0` and `v1`.
    #[must_use]
    pub const fn new(v0: VertexId, v1: VertexId) -> Self {
        Self { v0, v1 }
    }

    /// Returns whether both endpoints are the same vertex.
    #[must_use]
    pub const fn is_self_loop(&self) -> bool {
        self.v0 == self.v1
    }
}

impl From<(VertexId, VertexId)> for Edge {
    fn from((v0, v1): (VertexId, VertexId)) -> Self {
        Self::new(v0, v1)
    }
}

/// Ordered sequence of undirected edges.
///
/// # Examples
/// ```
/// use kronbench_core::{Edge, EdgeList};
///
/// let edges: EdgeList = [(0, 1), (1, 2)].into_iter().map(Edge::from).collect();
/// assert_eq!(edges.len(), 2);
/// assert_eq!(edges.byte_len(), 32);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EdgeList {
    edges: Vec<Edge>,
}

impl EdgeList {
    /// Wraps an existing edge vector.
    #[must_use]
    pub const fn from_edges(edges: Vec<Edge>) -> Self {
        Self { edges }
    }

    /// Number of edges.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Returns whether the list holds no edges.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Borrows the edges as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[Edge] {
        &self.edges
    }

    /// Iterates over the edges in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Edge> {
        self.edges.iter()
    }

    /// Size of the list once written as a checkpoint.
    #[must_use]
    pub fn byte_len(&self) -> u64 {
        (self.edges.len() as u64).saturating_mul(Edge::RECORD_BYTES as u64)
    }
}

impl FromIterator<Edge> for EdgeList {
    fn from_iter<I: IntoIterator<Item = Edge>>(iter: I) -> Self {
        Self {
            edges: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EdgeList {
    type Item = &'a Edge;
    type IntoIter = std::slice::Iter<'a, Edge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// On-disk width of a spanning tree record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TreeWidth {
    /// 32-bit parent ids; supports scales up to 31.
    U32,
    /// 64-bit parent ids.
    U64,
}

impl TreeWidth {
    /// Number of bits in one record.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::U32 => 32,
            Self::U64 => 64,
        }
    }

    /// Largest scale whose vertex ids fit below the all-ones sentinel.
    #[must_use]
    pub const fn max_scale(self) -> u32 {
        self.bits() - 1
    }
}

impl fmt::Display for TreeWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Fixed-width parent record stored in tree buffers and checkpoints.
///
/// The all-ones value of the record type means "unreached".
pub trait TreeRecord: Copy + Send + Sync + PartialEq + fmt::Debug + 'static {
    /// Width tag for this record type.
    const WIDTH: TreeWidth;
    /// Encoded size in bytes.
    const BYTES: usize;
    /// Sentinel marking an unreached vertex.
    const UNREACHED: Self;

    /// Decodes the record into a parent id, mapping the sentinel to `None`.
    fn parent(self) -> Option<VertexId>;

    /// Encodes a parent id, returning `None` when it does not fit.
    fn from_parent(parent: Option<VertexId>) -> Option<Self>;

    /// Appends the little-endian encoding to `out`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Decodes a record from exactly [`Self::BYTES`] little-endian bytes.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_tree_record {
    ($ty:ty, $width:expr) => {
        impl TreeRecord for $ty {
            const WIDTH: TreeWidth = $width;
            const BYTES: usize = std::mem::size_of::<$ty>();
            const UNREACHED: Self = <$ty>::MAX;

            fn parent(self) -> Option<VertexId> {
                (self != Self::UNREACHED).then(|| VertexId::from(self))
            }

            fn from_parent(parent: Option<VertexId>) -> Option<Self> {
                match parent {
                    None => Some(Self::UNREACHED),
                    Some(id) => <$ty>::try_from(id)
                        .ok()
                        .filter(|&record| record != Self::UNREACHED),
                }
            }

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0_u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(bytes);
                <$ty>::from_le_bytes(raw)
            }
        }
    };
}

impl_tree_record!(u32, TreeWidth::U32);
impl_tree_record!(u64, TreeWidth::U64);

/// Parent array for one traversal, sized to the vertex count.
///
/// Allocation pre-touches every record by writing the unreached sentinel, so
/// the first-touch page faults are paid before any timed region begins and
/// kernels receive a buffer in which every vertex starts unreached.
///
/// # Examples
/// ```
/// use kronbench_core::TreeBuffer;
///
/// let mut tree = TreeBuffer::<u32>::allocate(4);
/// tree.set_parent(2, Some(0))?;
/// assert_eq!(tree.parent(2), Some(0));
/// assert_eq!(tree.parent(1), None);
/// # Ok::<(), kronbench_core::KernelError>(())
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TreeBuffer<W: TreeRecord> {
    records: Vec<W>,
}

impl<W: TreeRecord> TreeBuffer<W> {
    /// Allocates and pre-touches a buffer of `vertex_count` records.
    #[must_use]
    pub fn allocate(vertex_count: usize) -> Self {
        let mut records = Vec::with_capacity(vertex_count);
        records.resize(vertex_count, W::UNREACHED);
        Self { records }
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether the buffer has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parent of `vertex`, or `None` when unreached or out of range.
    #[must_use]
    pub fn parent(&self, vertex: VertexId) -> Option<VertexId> {
        usize::try_from(vertex)
            .ok()
            .and_then(|index| self.records.get(index))
            .and_then(|record| record.parent())
    }

    /// Records the parent of `vertex`.
    ///
    /// # Errors
    /// Returns [`KernelError::VertexOutOfRange`] for a vertex beyond the buffer
    /// and [`KernelError::ParentNotRepresentable`] when the parent does not fit
    /// in the record width.
    pub fn set_parent(
        &mut self,
        vertex: VertexId,
        parent: Option<VertexId>,
    ) -> Result<(), KernelError> {
        let len = self.records.len();
        let slot = usize::try_from(vertex)
            .ok()
            .and_then(|index| self.records.get_mut(index))
            .ok_or(KernelError::VertexOutOfRange { vertex, len })?;
        *slot = encode_parent::<W>(parent)?;
        Ok(())
    }

    /// Overwrites every record in parallel from `parent_of(vertex)`.
    ///
    /// # Errors
    /// Returns [`KernelError::ParentNotRepresentable`] if any parent does not
    /// fit in the record width; records may be partially written in that case.
    pub fn fill_parents<F>(&mut self, parent_of: F) -> Result<(), KernelError>
    where
        F: Fn(VertexId) -> Option<VertexId> + Sync,
    {
        self.records
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(index, slot)| {
                *slot = encode_parent::<W>(parent_of(index as VertexId))?;
                Ok(())
            })
    }

    /// Converts the tree into the canonical optional form, in parallel.
    ///
    /// Any sentinel, whatever the record width, becomes `None`. `out` must be
    /// exactly as long as the buffer; extra entries on either side are left
    /// untouched.
    pub fn convert_into(&self, out: &mut [Option<VertexId>]) {
        out.par_iter_mut()
            .zip(self.records.par_iter())
            .for_each(|(converted, record)| *converted = record.parent());
    }

    /// Borrows the raw records.
    #[must_use]
    pub fn records(&self) -> &[W] {
        &self.records
    }

    pub(crate) fn records_mut(&mut self) -> &mut [W] {
        &mut self.records
    }
}

fn encode_parent<W: TreeRecord>(parent: Option<VertexId>) -> Result<W, KernelError> {
    W::from_parent(parent).ok_or(KernelError::ParentNotRepresentable {
        parent: parent.unwrap_or(VertexId::MAX),
        width: W::WIDTH,
    })
}
