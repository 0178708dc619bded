//! Reference kernel benchmarks.
//!
//! Measures one breadth-first traversal of the level-synchronous kernel and
//! the verification of the tree it produces.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use kronbench_benches::{error::BenchSetupError, params::GraphBenchParams, source::kronecker_edges};
use kronbench_core::{
    TraversalKernel, TreeBuffer, TreeVerifier, VertexId, mark_adjacency, sample_roots,
};
use kronbench_providers_bfs::{LevelSyncBfs, ParentTreeVerifier};

/// Seed used for graph generation and root choice.
const SEED: u64 = 42;

/// Graph sizes to benchmark.
const SCALES: &[u32] = &[12, 16];

/// Edges per vertex, the reference default.
const EDGEFACTOR: u64 = 16;

#[expect(
    clippy::panic_in_result_fn,
    reason = "Criterion measurement closures cannot propagate errors via Result"
)]
fn traversal_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("bfs");
    group.sample_size(20);
    for &scale in SCALES {
        let params = GraphBenchParams {
            scale,
            edgefactor: EDGEFACTOR,
        };
        let edges = kronecker_edges(params, SEED)?;
        let vertex_count = params.vertex_count();
        let flags = mark_adjacency(&edges, vertex_count)?;
        let len = flags.len();
        let root = sample_roots(&flags, 1, SEED)?
            .iter()
            .next()
            .ok_or(BenchSetupError::ZeroValue { context: "roots" })?;

        let mut kernel = LevelSyncBfs::default();
        kernel.construct(&edges, vertex_count)?;

        group.bench_with_input(
            BenchmarkId::new("traverse", params),
            &root,
            |b, &root| {
                b.iter(|| {
                    let mut tree = TreeBuffer::<u64>::allocate(len);
                    if let Err(err) = kernel.traverse(&mut tree, root) {
                        panic!("traversal failed during benchmark: {err}");
                    }
                });
            },
        );

        let mut tree = TreeBuffer::<u64>::allocate(len);
        let outcome = kernel.traverse(&mut tree, root)?;
        let mut parents: Vec<Option<VertexId>> = vec![None; len];
        tree.convert_into(&mut parents);
        group.bench_with_input(
            BenchmarkId::new("verify", params),
            &parents,
            |b, parents| {
                b.iter(|| {
                    if let Err(err) =
                        ParentTreeVerifier.verify(parents, outcome.max_reached, root, &edges)
                    {
                        panic!("verification failed during benchmark: {err}");
                    }
                });
            },
        );
    }
    group.finish();
    Ok(())
}

fn traversal(c: &mut Criterion) {
    if let Err(err) = traversal_impl(c) {
        panic!("traversal benchmark setup failed: {err}");
    }
}

criterion_group!(benches, traversal);
criterion_main!(benches);
