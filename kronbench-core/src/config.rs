//! Benchmark configuration and its validating builder.
//!
//! [`BenchmarkBuilder`] collects run parameters with the classic defaults and
//! [`BenchmarkBuilder::build`] rejects anything the pipeline cannot honour
//! before any work starts.

use std::path::{Path, PathBuf};

use crate::{Result, error::BenchError, types::TreeWidth};

/// Default log2 of the vertex count.
pub const DEFAULT_SCALE: u32 = 14;
/// Default ratio of edges to vertices.
pub const DEFAULT_EDGEFACTOR: u64 = 16;
/// Default number of traversal trials.
pub const DEFAULT_TRIALS: usize = 64;
/// Default seed shared by the generator and the root sampler.
pub const DEFAULT_SEED: u64 = 0xDECA_FBAD;
/// Largest scale accepted by the builder.
pub const MAX_SCALE: u32 = 48;
/// Smallest trial count whose timings have a sample standard deviation.
pub const MIN_TRIALS: usize = 2;

/// Selects the edge list generation model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorModel {
    /// Kronecker generator seeded from the configured seed.
    Kronecker,
    /// Recursive-matrix generator filling a preallocated buffer.
    Rmat,
}

impl GeneratorModel {
    /// Short label used in logs and errors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kronecker => "kronecker",
            Self::Rmat => "rmat",
        }
    }
}

/// Recursive-matrix quadrant probabilities.
///
/// `D` is implied as `1 - A - B - C`.
///
/// # Examples
/// ```
/// use kronbench_core::RmatParams;
///
/// let params = RmatParams::default();
/// assert!((params.d() - 0.05).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RmatParams {
    /// Probability of the top-left quadrant.
    pub a: f64,
    /// Probability of the top-right quadrant.
    pub b: f64,
    /// Probability of the bottom-left quadrant.
    pub c: f64,
}

impl Default for RmatParams {
    fn default() -> Self {
        Self {
            a: 0.57,
            b: 0.19,
            c: 0.19,
        }
    }
}

impl RmatParams {
    /// Probability of the bottom-right quadrant.
    #[must_use]
    pub fn d(&self) -> f64 {
        1.0 - self.a - self.b - self.c
    }

    /// Checks every probability is finite, non-negative, and that they sum to
    /// at most one.
    ///
    /// # Errors
    /// Returns [`BenchError::InvalidModelParameter`] naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        for (parameter, value) in [("A", self.a), ("B", self.b), ("C", self.c)] {
            if !value.is_finite() || value < 0.0 {
                return Err(BenchError::InvalidModelParameter { parameter, value });
            }
        }
        let d = self.d();
        // Allow for rounding in the user's decimal inputs.
        if d < -1e-12 {
            return Err(BenchError::InvalidModelParameter {
                parameter: "D",
                value: d,
            });
        }
        Ok(())
    }
}

/// Configures and constructs [`BenchmarkConfig`] instances.
///
/// # Examples
/// ```
/// use kronbench_core::BenchmarkBuilder;
///
/// let config = BenchmarkBuilder::new()
///     .with_scale(10)
///     .with_edgefactor(4)
///     .with_trials(3)
///     .build()
///     .expect("configuration is valid");
/// assert_eq!(config.vertex_count(), 1024);
/// assert_eq!(config.desired_edge_count(), 4095);
/// ```
#[derive(Debug, Clone)]
pub struct BenchmarkBuilder {
    scale: u32,
    edgefactor: u64,
    trials: usize,
    seed: u64,
    model: GeneratorModel,
    rmat: RmatParams,
    dump_dir: PathBuf,
    edgelist_path: Option<PathBuf>,
    root_file: Option<PathBuf>,
    verify: bool,
    tree_width: TreeWidth,
}

impl Default for BenchmarkBuilder {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            edgefactor: DEFAULT_EDGEFACTOR,
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            model: GeneratorModel::Kronecker,
            rmat: RmatParams::default(),
            dump_dir: std::env::temp_dir(),
            edgelist_path: None,
            root_file: None,
            verify: true,
            tree_width: TreeWidth::U64,
        }
    }
}

impl BenchmarkBuilder {
    /// Creates a builder populated with default parameters.
    ///
    /// # Examples
    /// ```
    /// use kronbench_core::BenchmarkBuilder;
    ///
    /// let builder = BenchmarkBuilder::new();
    /// assert_eq!(builder.scale(), 14);
    /// assert_eq!(builder.trials(), 64);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the scale (log2 of the vertex count).
    #[must_use]
    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    /// Returns the configured scale.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// Overrides the edge factor.
    #[must_use]
    pub fn with_edgefactor(mut self, edgefactor: u64) -> Self {
        self.edgefactor = edgefactor;
        self
    }

    /// Overrides the number of traversal trials.
    #[must_use]
    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials = trials;
        self
    }

    /// Returns the configured number of trials.
    #[must_use]
    pub const fn trials(&self) -> usize {
        self.trials
    }

    /// Overrides the seed used by generation and root sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Selects the generation model.
    #[must_use]
    pub fn with_model(mut self, model: GeneratorModel) -> Self {
        self.model = model;
        self
    }

    /// Overrides the recursive-matrix probabilities.
    #[must_use]
    pub fn with_rmat_params(mut self, params: RmatParams) -> Self {
        self.rmat = params;
        self
    }

    /// Sets the directory that receives edge list and tree checkpoints.
    #[must_use]
    pub fn with_dump_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_dir = dir.into();
        self
    }

    /// Names an explicit edge list checkpoint; replayed when it exists.
    #[must_use]
    pub fn with_edgelist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.edgelist_path = Some(path.into());
        self
    }

    /// Loads roots from a raw file instead of sampling them.
    #[must_use]
    pub fn with_root_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.root_file = Some(path.into());
        self
    }

    /// Enables or disables tree verification.
    #[must_use]
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Selects the on-disk tree record width.
    #[must_use]
    pub fn with_tree_width(mut self, width: TreeWidth) -> Self {
        self.tree_width = width;
        self
    }

    /// Validates the configuration and constructs a [`BenchmarkConfig`].
    ///
    /// # Errors
    /// Returns [`BenchError::UnsupportedWordSize`] on platforms with a
    /// `usize` narrower than 64 bits, [`BenchError::InvalidScale`],
    /// [`BenchError::EdgeCountPrecondition`], [`BenchError::InvalidTrialCount`],
    /// [`BenchError::InvalidModelParameter`], or
    /// [`BenchError::TreeWidthTooNarrow`] for unusable parameters.
    pub fn build(self) -> Result<BenchmarkConfig> {
        if usize::BITS < 64 {
            return Err(BenchError::UnsupportedWordSize { bits: usize::BITS });
        }
        if self.scale == 0 || self.scale > MAX_SCALE {
            return Err(BenchError::InvalidScale {
                scale: self.scale,
                max: MAX_SCALE,
            });
        }
        if self.scale > self.tree_width.max_scale() {
            return Err(BenchError::TreeWidthTooNarrow {
                width: self.tree_width,
                scale: self.scale,
            });
        }
        if self.trials < MIN_TRIALS {
            return Err(BenchError::InvalidTrialCount {
                trials: self.trials,
                min: MIN_TRIALS,
            });
        }
        self.rmat.validate()?;

        let vertex_count = 1_u64 << self.scale;
        let desired_edge_count = vertex_count
            .checked_mul(self.edgefactor)
            .and_then(|edges| edges.checked_sub(1))
            .filter(|&desired| desired >= vertex_count && desired >= self.edgefactor)
            .ok_or(BenchError::EdgeCountPrecondition {
                desired: vertex_count
                    .saturating_mul(self.edgefactor)
                    .saturating_sub(1),
                vertex_count,
                edgefactor: self.edgefactor,
            })?;

        Ok(BenchmarkConfig {
            scale: self.scale,
            vertex_count,
            edgefactor: self.edgefactor,
            desired_edge_count,
            trials: self.trials,
            seed: self.seed,
            model: self.model,
            rmat: self.rmat,
            dump_dir: self.dump_dir,
            edgelist_path: self.edgelist_path,
            root_file: self.root_file,
            verify: self.verify,
            tree_width: self.tree_width,
        })
    }
}

/// Validated run parameters.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    scale: u32,
    vertex_count: u64,
    edgefactor: u64,
    desired_edge_count: u64,
    trials: usize,
    seed: u64,
    model: GeneratorModel,
    rmat: RmatParams,
    dump_dir: PathBuf,
    edgelist_path: Option<PathBuf>,
    root_file: Option<PathBuf>,
    verify: bool,
    tree_width: TreeWidth,
}

impl BenchmarkConfig {
    /// Log2 of the vertex count.
    #[must_use]
    pub const fn scale(&self) -> u32 {
        self.scale
    }

    /// `2^scale`.
    #[must_use]
    pub const fn vertex_count(&self) -> u64 {
        self.vertex_count
    }

    /// Ratio of edges to vertices.
    #[must_use]
    pub const fn edgefactor(&self) -> u64 {
        self.edgefactor
    }

    /// `2^scale * edgefactor - 1`.
    #[must_use]
    pub const fn desired_edge_count(&self) -> u64 {
        self.desired_edge_count
    }

    /// Requested number of trials.
    #[must_use]
    pub const fn trials(&self) -> usize {
        self.trials
    }

    /// Seed for generation and root sampling.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Generation model.
    #[must_use]
    pub const fn model(&self) -> GeneratorModel {
        self.model
    }

    /// Recursive-matrix probabilities.
    #[must_use]
    pub const fn rmat_params(&self) -> RmatParams {
        self.rmat
    }

    /// Checkpoint directory.
    #[must_use]
    pub fn dump_dir(&self) -> &Path {
        &self.dump_dir
    }

    /// Explicit edge list checkpoint, if configured.
    #[must_use]
    pub fn edgelist_path(&self) -> Option<&Path> {
        self.edgelist_path.as_deref()
    }

    /// Root file, if configured.
    #[must_use]
    pub fn root_file(&self) -> Option<&Path> {
        self.root_file.as_deref()
    }

    /// Whether trees are verified after the trials.
    #[must_use]
    pub const fn verify(&self) -> bool {
        self.verify
    }

    /// On-disk tree record width.
    #[must_use]
    pub const fn tree_width(&self) -> TreeWidth {
        self.tree_width
    }
}
