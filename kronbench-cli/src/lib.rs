//! Support library for the kronbench CLI binary.
//!
//! Re-exports the CLI and logging modules so integration tests can drive the
//! benchmark without forking a subprocess.

pub mod cli;
pub mod logging;
