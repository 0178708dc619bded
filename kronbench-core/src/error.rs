//! Error types for the kronbench core library.
//!
//! Every fault detected by the pipeline is escalated to the caller; nothing is
//! retried. [`BenchError`] is the top-level error and carries a stable
//! machine-readable code for each variant.

use std::{fmt, io, path::PathBuf};

use thiserror::Error;

use crate::{
    collaborators::TreeDefect,
    types::{TreeWidth, VertexId},
};

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            #[must_use]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// Failures raised while persisting or replaying checkpoint files.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The checkpoint file or its directory could not be opened.
    #[error("cannot open checkpoint `{path}`: {source}")]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Writing the checkpoint stopped before every record was stored.
    #[error("error dumping checkpoint `{path}`: {source}")]
    Write {
        /// Path being written.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// Reading the checkpoint failed for a reason other than truncation.
    #[error("error reading checkpoint `{path}`: {source}")]
    Read {
        /// Path being read.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The file holds fewer bytes than the records requested from it.
    #[error("short read from `{path}`: expected {expected} bytes, found {actual}")]
    ShortRead {
        /// Path being read.
        path: PathBuf,
        /// Bytes required.
        expected: u64,
        /// Bytes available.
        actual: u64,
    },
    /// The file size does not match the fixed record layout.
    #[error("checkpoint `{path}` holds {actual} bytes, expected {expected}")]
    SizeMismatch {
        /// Path being read.
        path: PathBuf,
        /// Bytes required by the record layout.
        expected: u64,
        /// Bytes present on disk.
        actual: u64,
    },
    /// An edge list checkpoint is not a whole number of edge records.
    #[error("edge list `{path}` holds {actual} bytes, not a multiple of {record_bytes}")]
    Misaligned {
        /// Path being read.
        path: PathBuf,
        /// Bytes present on disk.
        actual: u64,
        /// Size of one edge record.
        record_bytes: usize,
    },
}

/// Failures reported by edge list generators.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GeneratorError {
    /// A generator parameter was outside the supported range.
    #[error("invalid generator parameter `{parameter}`")]
    InvalidParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
    },
    /// The generator failed for an implementation-specific reason.
    #[error("generator failed: {message}")]
    Failed {
        /// Human-readable description supplied by the generator.
        message: String,
    },
}

/// Failures reported by traversal kernels.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum KernelError {
    /// A traversal was requested before the kernel built its graph.
    #[error("traversal requested before the graph was constructed")]
    NotConstructed,
    /// The requested root is not a vertex of the constructed graph.
    #[error("root {root} is outside the {vertex_count}-vertex graph")]
    RootOutOfRange {
        /// Requested root.
        root: VertexId,
        /// Vertices in the constructed graph.
        vertex_count: u64,
    },
    /// An edge endpoint does not fit in the configured vertex range.
    #[error("edge {index} references vertex {vertex}, but the graph has {vertex_count} vertices")]
    EdgeOutOfRange {
        /// Position of the edge in the list.
        index: usize,
        /// Offending endpoint.
        vertex: VertexId,
        /// Vertices in the graph.
        vertex_count: u64,
    },
    /// A tree write addressed a vertex beyond the tree buffer.
    #[error("vertex {vertex} is outside the {len}-entry tree buffer")]
    VertexOutOfRange {
        /// Offending vertex.
        vertex: VertexId,
        /// Length of the tree buffer.
        len: usize,
    },
    /// A parent id cannot be stored in the configured tree record width.
    #[error("parent {parent} does not fit in a {width} tree record")]
    ParentNotRepresentable {
        /// Parent id that overflowed the record.
        parent: VertexId,
        /// Record width in use.
        width: TreeWidth,
    },
    /// The kernel failed for an implementation-specific reason.
    #[error("kernel failed: {message}")]
    Failed {
        /// Human-readable description supplied by the kernel.
        message: String,
    },
}

/// Failures raised by the statistics engine.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum StatisticsError {
    /// An empty sample has no summary.
    #[error("statistics require at least 1 sample (got {got})")]
    TooFewSamples {
        /// Number of samples supplied.
        got: usize,
    },
    /// NaNs are never valid in timing or throughput data.
    #[error("no NaNs permitted in output (sample {index})")]
    NotANumber {
        /// Position of the first NaN in the unsorted input.
        index: usize,
    },
}

/// Error type produced while configuring or running the benchmark.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BenchError {
    /// The platform word is too narrow to index the benchmark's arrays.
    #[error("no 64-bit support: usize is {bits} bits wide")]
    UnsupportedWordSize {
        /// Width of `usize` on this platform.
        bits: u32,
    },
    /// The scale parameter is outside the supported range.
    #[error("scale must be in 1..={max} (got {scale})")]
    InvalidScale {
        /// Requested scale.
        scale: u32,
        /// Largest supported scale.
        max: u32,
    },
    /// The desired edge count violates the construction precondition.
    #[error(
        "desired edge count {desired} must be at least the vertex count {vertex_count} \
         and the edge factor {edgefactor}"
    )]
    EdgeCountPrecondition {
        /// `2^scale * edgefactor - 1`, saturated on overflow.
        desired: u64,
        /// `2^scale`.
        vertex_count: u64,
        /// Configured edge factor.
        edgefactor: u64,
    },
    /// Too few trials were requested to summarise.
    #[error("trial count {trials} is below the minimum of {min}")]
    InvalidTrialCount {
        /// Requested number of trials.
        trials: usize,
        /// Smallest accepted number of trials.
        min: usize,
    },
    /// A recursive-matrix model parameter is invalid.
    #[error("invalid model parameter {parameter}={value}")]
    InvalidModelParameter {
        /// Name of the offending parameter.
        parameter: &'static str,
        /// Value supplied.
        value: f64,
    },
    /// The tree record width cannot hold every vertex id plus the sentinel.
    #[error("{width} tree records cannot address scale {scale}")]
    TreeWidthTooNarrow {
        /// Configured record width.
        width: TreeWidth,
        /// Configured scale.
        scale: u32,
    },
    /// Checkpoint persistence failed.
    #[error(transparent)]
    Checkpoint {
        /// Underlying checkpoint failure.
        #[from]
        source: CheckpointError,
    },
    /// The edge generator failed.
    #[error("{model} generator failed: {source}")]
    Generator {
        /// Generation model in use.
        model: &'static str,
        /// Underlying generator failure.
        #[source]
        source: GeneratorError,
    },
    /// An edge references a vertex beyond the configured scale.
    #[error("edge {index} references vertex {vertex}, but the graph has {vertex_count} vertices")]
    EdgeOutOfRange {
        /// Position of the edge in the list.
        index: usize,
        /// Offending endpoint.
        vertex: VertexId,
        /// Vertices in the graph.
        vertex_count: u64,
    },
    /// A supplied root is not a vertex of the graph.
    #[error("root {root} is outside the {vertex_count}-vertex graph")]
    RootOutOfRange {
        /// Offending root.
        root: VertexId,
        /// Vertices in the graph.
        vertex_count: u64,
    },
    /// No vertex with non-self-loop degree > 0 exists.
    #[error("cannot find any sample roots of non-self degree > 0")]
    NoEligibleRoots,
    /// The kernel failed while building its graph representation.
    #[error("failure creating graph: {source}")]
    Construction {
        /// Underlying kernel failure.
        #[source]
        source: KernelError,
    },
    /// The kernel failed during a traversal trial.
    #[error("bfs {trial} from {root} failed: {source}")]
    Traversal {
        /// Zero-based trial index.
        trial: usize,
        /// Root of the failing trial.
        root: VertexId,
        /// Underlying kernel failure.
        #[source]
        source: KernelError,
    },
    /// The kernel reported a NaN or negative duration.
    #[error("bfs {trial} from {root} reported an invalid time {seconds}")]
    InvalidTiming {
        /// Zero-based trial index.
        trial: usize,
        /// Root of the failing trial.
        root: VertexId,
        /// Reported duration.
        seconds: f64,
    },
    /// The verifier rejected a spanning tree.
    #[error("bfs {trial} from {root} failed verification ({})", .source.code())]
    VerificationFailed {
        /// Zero-based trial index.
        trial: usize,
        /// Root of the rejected tree.
        root: VertexId,
        /// Structural defect reported by the verifier.
        #[source]
        source: TreeDefect,
    },
    /// A statistics summary could not be computed.
    #[error("cannot summarise {metric}: {source}")]
    Statistics {
        /// Metric being summarised.
        metric: &'static str,
        /// Underlying statistics failure.
        #[source]
        source: StatisticsError,
    },
}

define_error_codes! {
    /// Stable codes describing [`BenchError`] variants.
    enum BenchErrorCode for BenchError {
        /// The platform word is too narrow.
        UnsupportedWordSize => UnsupportedWordSize { .. } => "BENCH_UNSUPPORTED_WORD_SIZE",
        /// The scale parameter is outside the supported range.
        InvalidScale => InvalidScale { .. } => "BENCH_INVALID_SCALE",
        /// The desired edge count violates the construction precondition.
        EdgeCountPrecondition => EdgeCountPrecondition { .. } => "BENCH_EDGE_COUNT_PRECONDITION",
        /// Too few trials were requested.
        InvalidTrialCount => InvalidTrialCount { .. } => "BENCH_INVALID_TRIAL_COUNT",
        /// A recursive-matrix model parameter is invalid.
        InvalidModelParameter => InvalidModelParameter { .. } => "BENCH_INVALID_MODEL_PARAMETER",
        /// The tree record width is too narrow for the scale.
        TreeWidthTooNarrow => TreeWidthTooNarrow { .. } => "BENCH_TREE_WIDTH_TOO_NARROW",
        /// Checkpoint persistence failed.
        Checkpoint => Checkpoint { .. } => "BENCH_CHECKPOINT_IO",
        /// The edge generator failed.
        Generator => Generator { .. } => "BENCH_GENERATOR_FAILURE",
        /// An edge references a vertex beyond the configured scale.
        EdgeOutOfRange => EdgeOutOfRange { .. } => "BENCH_EDGE_OUT_OF_RANGE",
        /// A supplied root is not a vertex of the graph.
        RootOutOfRange => RootOutOfRange { .. } => "BENCH_ROOT_OUT_OF_RANGE",
        /// No eligible root exists.
        NoEligibleRoots => NoEligibleRoots => "BENCH_NO_ELIGIBLE_ROOTS",
        /// The kernel failed while building its graph.
        Construction => Construction { .. } => "BENCH_CONSTRUCTION_FAILURE",
        /// The kernel failed during a trial.
        Traversal => Traversal { .. } => "BENCH_TRAVERSAL_FAILURE",
        /// The kernel reported an invalid duration.
        InvalidTiming => InvalidTiming { .. } => "BENCH_INVALID_TIMING",
        /// The verifier rejected a spanning tree.
        VerificationFailed => VerificationFailed { .. } => "BENCH_VERIFICATION_FAILED",
        /// A statistics summary could not be computed.
        Statistics => Statistics { .. } => "BENCH_STATISTICS_FAILURE",
    }
}

impl BenchError {
    /// Returns the verifier's negative status when a tree was rejected.
    #[must_use]
    pub const fn defect_code(&self) -> Option<i64> {
        match self {
            Self::VerificationFailed { source, .. } => Some(source.code()),
            _ => None,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, BenchError>;
