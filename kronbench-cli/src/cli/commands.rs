//! Command implementations and argument parsing for the kronbench CLI.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use kronbench_core::{
    BenchError, Benchmark, BenchmarkBuilder, BenchmarkReport, Collaborators, DEFAULT_EDGEFACTOR,
    DEFAULT_SCALE, DEFAULT_SEED, DEFAULT_TRIALS, EdgeSource, GeneratorModel, RmatParams,
    TreeWidth,
};
use kronbench_providers_bfs::{LevelSyncBfs, ParentTreeVerifier};
use kronbench_providers_kronecker::{KroneckerGenerator, SeededRmat};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Environment variable overriding the checkpoint directory.
pub const DUMP_DIR_ENV: &str = "KRONBENCH_DUMP_DIR";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "kronbench",
    about = "Run the Kronecker-graph breadth-first search benchmark."
)]
pub struct Cli {
    /// Emit debug-level diagnostics unless `RUST_LOG` says otherwise.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate or replay a graph, run the timed trials and print the report.
    Run(RunArgs),
}

/// Options accepted by the `run` command.
#[derive(Debug, Args, Clone, PartialEq)]
pub struct RunArgs {
    /// Base-two logarithm of the vertex count.
    #[arg(short = 's', long, default_value_t = DEFAULT_SCALE)]
    pub scale: u32,

    /// Edges per vertex.
    #[arg(short = 'e', long, default_value_t = DEFAULT_EDGEFACTOR)]
    pub edgefactor: u64,

    /// Number of breadth-first searches to time.
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    pub nbfs: usize,

    /// Seed shared by the generators and the root sampler.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Use the unscrambled recursive-matrix generator instead of Kronecker.
    #[arg(long)]
    pub rmat: bool,

    /// Recursive-matrix probability of the top-left quadrant.
    #[arg(short = 'A', value_name = "A")]
    pub a: Option<f64>,

    /// Recursive-matrix probability of the top-right quadrant.
    #[arg(short = 'B', value_name = "B")]
    pub b: Option<f64>,

    /// Recursive-matrix probability of the bottom-left quadrant.
    #[arg(short = 'C', value_name = "C")]
    pub c: Option<f64>,

    /// Directory receiving the edge list and tree checkpoints.
    #[arg(long, env = DUMP_DIR_ENV)]
    pub dump_dir: Option<PathBuf>,

    /// Edge list checkpoint to replay if present, or to write otherwise.
    #[arg(long)]
    pub edgelist: Option<PathBuf>,

    /// Binary file of little-endian root ids replacing sampled roots.
    #[arg(long)]
    pub roots: Option<PathBuf>,

    /// Skip tree verification and credit every trial with all edges.
    #[arg(long)]
    pub no_verify: bool,

    /// Width of the on-disk parent records.
    #[arg(long, value_enum, default_value_t = TreeWidthArg::Wide)]
    pub tree_width: TreeWidthArg,
}

impl RunArgs {
    /// Translates the flags into a benchmark builder.
    ///
    /// Initiator probabilities that are not given keep their defaults.
    #[must_use]
    pub fn to_builder(&self) -> BenchmarkBuilder {
        let defaults = RmatParams::default();
        let params = RmatParams {
            a: self.a.unwrap_or(defaults.a),
            b: self.b.unwrap_or(defaults.b),
            c: self.c.unwrap_or(defaults.c),
        };
        let model = if self.rmat {
            GeneratorModel::Rmat
        } else {
            GeneratorModel::Kronecker
        };
        let mut builder = BenchmarkBuilder::new()
            .with_scale(self.scale)
            .with_edgefactor(self.edgefactor)
            .with_trials(self.nbfs)
            .with_seed(self.seed)
            .with_model(model)
            .with_rmat_params(params)
            .with_verification(!self.no_verify)
            .with_tree_width(self.tree_width.into());
        if let Some(dir) = &self.dump_dir {
            builder = builder.with_dump_dir(dir);
        }
        if let Some(path) = &self.edgelist {
            builder = builder.with_edgelist_path(path);
        }
        if let Some(path) = &self.roots {
            builder = builder.with_root_file(path);
        }
        builder
    }
}

/// Tree record widths selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TreeWidthArg {
    /// Four-byte parent records.
    #[value(name = "32")]
    Narrow,
    /// Eight-byte parent records.
    #[value(name = "64")]
    Wide,
}

impl From<TreeWidthArg> for TreeWidth {
    fn from(value: TreeWidthArg) -> Self {
        match value {
            TreeWidthArg::Narrow => Self::U32,
            TreeWidthArg::Wide => Self::U64,
        }
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The benchmark pipeline failed.
    #[error(transparent)]
    Core(#[from] BenchError),
}

/// Outcome of a completed `run` command.
#[derive(Debug, Clone)]
pub struct ExecutionSummary {
    /// Whether the edge list was generated or replayed.
    pub edge_source: EdgeSource,
    /// Figures to render.
    pub report: BenchmarkReport,
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when the benchmark fails.
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Run(args) => {
            Span::current().record("command", field::display("run"));
            run_command(&args)
        }
    }
}

#[instrument(
    name = "cli.execute",
    err,
    skip(args),
    fields(scale = args.scale, nbfs = args.nbfs, model = field::Empty),
)]
pub(super) fn run_command(args: &RunArgs) -> Result<ExecutionSummary, CliError> {
    let config = args.to_builder().build()?;
    Span::current().record("model", field::display(config.model().label()));

    let collaborators = Collaborators {
        generator: KroneckerGenerator::default(),
        rmat: SeededRmat::new(config.seed()),
        kernel: LevelSyncBfs::default(),
        verifier: ParentTreeVerifier,
    };
    let outcome = Benchmark::new(config, collaborators).run()?;

    info!(
        trials = outcome.report.trials,
        harmonic_teps = outcome.report.teps.harmonic_mean,
        "benchmark completed"
    );
    Ok(ExecutionSummary {
        edge_source: outcome.edge_source,
        report: outcome.report,
    })
}

/// Renders `summary` to `writer` as `key: value` lines.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    summary.report.render(&mut writer)
}
