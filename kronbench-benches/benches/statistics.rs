//! Statistics engine benchmarks.
//!
//! Measures the summary of one metric (sort, quartiles, compensated sums and
//! harmonic moments) over growing trial counts.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]
#![expect(
    clippy::shadow_reuse,
    reason = "Criterion bench_with_input closures rebind parameter names"
)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use kronbench_benches::{
    error::BenchSetupError, params::SampleBenchParams, source::synthetic_timings,
};
use kronbench_core::summarize;

/// Seed used for all synthetic timings in this benchmark.
const SEED: u64 = 42;

/// Trial counts to benchmark; 64 is the default NBFS.
const SAMPLE_COUNTS: &[usize] = &[64, 1_024, 65_536];

#[expect(
    clippy::panic_in_result_fn,
    reason = "Criterion measurement closures cannot propagate errors via Result"
)]
fn summarize_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("summarize");
    for &samples in SAMPLE_COUNTS {
        let timings = synthetic_timings(samples, 0.01, 2.0, SEED)?;
        group.bench_with_input(
            BenchmarkId::from_parameter(SampleBenchParams { samples }),
            &timings,
            |b, timings| {
                b.iter(|| {
                    if let Err(err) = summarize(timings) {
                        panic!("summarize failed during benchmark: {err}");
                    }
                });
            },
        );
    }
    group.finish();
    Ok(())
}

fn summarize_samples(c: &mut Criterion) {
    if let Err(err) = summarize_impl(c) {
        panic!("summarize benchmark setup failed: {err}");
    }
}

criterion_group!(benches, summarize_samples);
criterion_main!(benches);
