//! Kronbench core library.
//!
//! Control pipeline for a Kronecker-graph breadth-first search benchmark:
//! edge list acquisition and checkpointing, root sampling, timed traversal
//! trials over a pluggable kernel, tree re-verification, and robust
//! statistics.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod acquisition;
mod checkpoint;
mod collaborators;
mod config;
mod error;
mod pipeline;
mod report;
mod roots;
mod statistics;
mod trials;
mod types;
mod verify;

pub use crate::{
    acquisition::{AcquiredEdges, EdgeSource, acquire_edges},
    checkpoint::{CheckpointStore, load_roots as load_root_file},
    collaborators::{
        EdgeGenerator, RmatGenerator, TraversalKernel, TraversalOutcome, TreeDefect, TreeVerifier,
    },
    config::{
        BenchmarkBuilder, BenchmarkConfig, DEFAULT_EDGEFACTOR, DEFAULT_SCALE, DEFAULT_SEED,
        DEFAULT_TRIALS, GeneratorModel, MAX_SCALE, MIN_TRIALS, RmatParams,
    },
    error::{
        BenchError, BenchErrorCode, CheckpointError, GeneratorError, KernelError, Result,
        StatisticsError,
    },
    pipeline::{Benchmark, BenchmarkOutcome, Collaborators},
    report::{BenchmarkReport, format_sci},
    roots::{RootSet, load_roots, mark_adjacency, sample_roots},
    statistics::{Summary, summarize},
    trials::{TrialTiming, construct_graph, run_trials},
    types::{Edge, EdgeList, TreeBuffer, TreeRecord, TreeWidth, VertexId},
    verify::{VerificationMode, verify_trials},
};
