//! Benchmark parameter types.
//!
//! Each type renders as a compact Criterion parameter label.

use std::fmt;

/// Parameters for a statistics benchmark run.
#[derive(Clone, Copy, Debug)]
pub struct SampleBenchParams {
    /// Number of samples summarised.
    pub samples: usize,
}

impl fmt::Display for SampleBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={}", self.samples)
    }
}

/// Parameters for graph-based benchmark runs.
#[derive(Clone, Copy, Debug)]
pub struct GraphBenchParams {
    /// Base-two logarithm of the vertex count.
    pub scale: u32,
    /// Edges per vertex.
    pub edgefactor: u64,
}

impl GraphBenchParams {
    /// Number of vertices, `2^scale`.
    #[must_use]
    pub const fn vertex_count(&self) -> u64 {
        1 << self.scale
    }

    /// Number of generated edges, `edgefactor * 2^scale`.
    #[must_use]
    pub const fn edge_count(&self) -> u64 {
        self.edgefactor << self.scale
    }
}

impl fmt::Display for GraphBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scale={},ef={}", self.scale, self.edgefactor)
    }
}
