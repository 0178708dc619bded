//! Benchmark support crate for kronbench.
//!
//! Provides seeded synthetic inputs and parameter types used by the Criterion
//! benchmarks for the statistics engine, the root sampler, and the reference
//! traversal kernel.

pub mod error;
pub mod params;
pub mod source;
