//! Seeded synthetic inputs for the benchmarks.
//!
//! Every generator here is deterministic for a given seed so Criterion
//! baselines stay comparable across runs.

use kronbench_core::{EdgeGenerator, EdgeList};
use kronbench_providers_kronecker::KroneckerGenerator;
use rand::{Rng, SeedableRng, distributions::Uniform, rngs::SmallRng};

use crate::{error::BenchSetupError, params::GraphBenchParams};

/// Draws `count` positive trial durations in `[lower, upper)`.
///
/// # Errors
/// Returns [`BenchSetupError::ZeroValue`] when `count` is zero.
///
/// # Examples
/// ```
/// use kronbench_benches::source::synthetic_timings;
///
/// let timings = synthetic_timings(16, 0.5, 2.0, 7)?;
/// assert_eq!(timings.len(), 16);
/// assert!(timings.iter().all(|t| (0.5..2.0).contains(t)));
/// # Ok::<(), kronbench_benches::error::BenchSetupError>(())
/// ```
pub fn synthetic_timings(
    count: usize,
    lower: f64,
    upper: f64,
    seed: u64,
) -> Result<Vec<f64>, BenchSetupError> {
    if count == 0 {
        return Err(BenchSetupError::ZeroValue { context: "count" });
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    let range = Uniform::new(lower, upper);
    Ok((0..count).map(|_| rng.sample(range)).collect())
}

/// Generates a scrambled Kronecker edge list with both seeds set to `seed`.
///
/// # Errors
/// Returns [`BenchSetupError::Generator`] if generation fails.
pub fn kronecker_edges(params: GraphBenchParams, seed: u64) -> Result<EdgeList, BenchSetupError> {
    let edges = KroneckerGenerator::default().generate(
        params.scale,
        params.edge_count(),
        seed,
        seed,
    )?;
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn timings_are_reproducible() {
        let first = synthetic_timings(32, 1.0, 3.0, 5).expect("count is non-zero");
        let second = synthetic_timings(32, 1.0, 3.0, 5).expect("count is non-zero");
        assert_eq!(first, second);
    }

    #[rstest]
    fn zero_count_is_rejected() {
        assert!(matches!(
            synthetic_timings(0, 1.0, 2.0, 1),
            Err(BenchSetupError::ZeroValue { context: "count" })
        ));
    }

    #[rstest]
    fn kronecker_edges_match_the_parameters() {
        let params = GraphBenchParams {
            scale: 6,
            edgefactor: 4,
        };
        let edges = kronecker_edges(params, 3).expect("generation succeeds");
        assert_eq!(edges.len() as u64, params.edge_count());
    }
}
