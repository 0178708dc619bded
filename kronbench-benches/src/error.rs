//! Benchmark setup error type.
//!
//! Aggregates the errors that may arise while preparing benchmark inputs so
//! setup functions can propagate failures with `?` instead of `.expect()`.

use kronbench_core::{BenchError, GeneratorError, KernelError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Graph generation failed.
    #[error("graph generation failed: {0}")]
    Generator(#[from] GeneratorError),
    /// Kernel construction or traversal failed.
    #[error("kernel failed: {0}")]
    Kernel(#[from] KernelError),
    /// A pipeline stage failed.
    #[error("pipeline stage failed: {0}")]
    Pipeline(#[from] BenchError),
    /// A zero value was passed where a non-zero integer was required.
    #[error("expected a non-zero value for {context}")]
    ZeroValue {
        /// A description of the parameter that was unexpectedly zero.
        context: &'static str,
    },
}
