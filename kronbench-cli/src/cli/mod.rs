//! Command-line interface for the kronbench benchmark driver.
//!
//! A single `run` command maps its flags onto [`kronbench_core::BenchmarkBuilder`],
//! wires the reference providers in, and renders the report.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, RunArgs, TreeWidthArg, render_summary, run_cli,
};
