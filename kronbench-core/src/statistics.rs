//! Robust nine-value summaries of trial samples.

use crate::error::StatisticsError;

/// Summary of a sample vector.
///
/// # Examples
/// ```
/// use kronbench_core::summarize;
///
/// let summary = summarize(&[1.0, 2.0, 3.0, 4.0])?;
/// assert_eq!(summary.median, 2.5);
/// assert_eq!(summary.min, 1.0);
/// assert_eq!(summary.max, 4.0);
/// # Ok::<(), kronbench_core::StatisticsError>(())
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    /// Smallest sample.
    pub min: f64,
    /// First quartile.
    pub first_quartile: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub third_quartile: f64,
    /// Largest sample.
    pub max: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation.
    pub stddev: f64,
    /// Harmonic mean.
    pub harmonic_mean: f64,
    /// Standard deviation of the harmonic mean.
    pub harmonic_stddev: f64,
}

/// Reduces `samples` to a [`Summary`].
///
/// Quartiles interpolate between neighbouring order statistics with fixed
/// weights. Sums use compensated accumulation. A zero sample contributes zero
/// to the reciprocal sums of the harmonic statistics. A single sample fills
/// every order statistic and mean, while both spreads are NaN.
///
/// # Errors
/// Returns [`StatisticsError::TooFewSamples`] for an empty sample and
/// [`StatisticsError::NotANumber`] when any sample is NaN.
pub fn summarize(samples: &[f64]) -> Result<Summary, StatisticsError> {
    let n = samples.len();
    if n == 0 {
        return Err(StatisticsError::TooFewSamples { got: n });
    }
    if let Some(index) = samples.iter().position(|x| x.is_nan()) {
        return Err(StatisticsError::NotANumber { index });
    }
    let mut sorted = samples.to_vec();
    sorted.sort_by(f64::total_cmp);

    let count = n as f64;
    let mean = neumaier_sum(sorted.iter().copied()) / count;
    let spread = neumaier_sum(sorted.iter().map(|x| (x - mean) * (x - mean)));
    let stddev = (spread / (count - 1.0)).sqrt();

    let reciprocal = |x: f64| if x == 0.0 { 0.0 } else { x.recip() };
    let recip_sum = neumaier_sum(sorted.iter().map(|&x| reciprocal(x)));
    let harmonic_mean = count / recip_sum;
    let recip_mean = recip_sum / count;
    let recip_spread = neumaier_sum(sorted.iter().map(|&x| {
        let d = reciprocal(x) - recip_mean;
        d * d
    }));
    let harmonic_stddev = recip_spread.sqrt() / (count - 1.0) * harmonic_mean * harmonic_mean;

    Ok(Summary {
        min: sorted[0],
        first_quartile: quartile(&sorted, 1),
        median: quartile(&sorted, 2),
        third_quartile: quartile(&sorted, 3),
        max: sorted[n - 1],
        mean,
        stddev,
        harmonic_mean,
        harmonic_stddev,
    })
}

/// Order statistic at 1-based position `k(n+1)/4` of an ascending slice.
fn quartile(sorted: &[f64], k: usize) -> f64 {
    let n = sorted.len();
    let scaled = k * (n + 1);
    let whole = scaled / 4;
    let at = |pos: usize| sorted[pos.clamp(1, n) - 1];
    if scaled % 4 == 0 {
        return at(whole);
    }
    let upper = (whole + 1).min(n);
    let (lo_weight, hi_weight) = match k {
        1 => (0.75, 0.25),
        2 => (0.5, 0.5),
        _ => (0.25, 0.75),
    };
    lo_weight * at(whole) + hi_weight * at(upper)
}

/// Compensated (Neumaier) summation.
fn neumaier_sum(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0_f64;
    let mut compensation = 0.0_f64;
    for value in values {
        let next = sum + value;
        if sum.abs() >= value.abs() {
            compensation += (sum - next) + value;
        } else {
            compensation += (value - next) + sum;
        }
        sum = next;
    }
    sum + compensation
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    fn four_ascending_samples() {
        let summary = summarize(&[4.0, 1.0, 3.0, 2.0]).expect("four samples summarise");
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.max, 4.0);
        assert_eq!(summary.first_quartile, 1.25);
        assert_eq!(summary.third_quartile, 3.75);
        assert_eq!(summary.mean, 2.5);
    }

    #[rstest]
    fn constant_samples_have_no_spread() {
        let summary = summarize(&[2.0; 4]).expect("constant samples summarise");
        assert_eq!(summary.mean, 2.0);
        assert_eq!(summary.harmonic_mean, 2.0);
        assert_eq!(summary.stddev, 0.0);
        assert_eq!(summary.harmonic_stddev, 0.0);
    }

    #[rstest]
    #[case::odd(&[5.0, 1.0, 3.0], 3.0)]
    #[case::seven(&[7.0, 6.0, 5.0, 4.0, 3.0, 2.0, 1.0], 4.0)]
    fn median_of_odd_counts_is_middle_sample(#[case] samples: &[f64], #[case] median: f64) {
        let summary = summarize(samples).expect("samples summarise");
        assert_eq!(summary.median, median);
    }

    #[rstest]
    fn seven_samples_hit_exact_quartiles() {
        let summary =
            summarize(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]).expect("seven samples summarise");
        assert_eq!(summary.first_quartile, 2.0);
        assert_eq!(summary.third_quartile, 6.0);
    }

    #[rstest]
    fn harmonic_mean_of_rates() {
        let summary = summarize(&[1.0, 4.0, 4.0]).expect("rates summarise");
        assert!((summary.harmonic_mean - 2.0).abs() < 1e-12);
    }

    #[rstest]
    fn zero_sample_is_ignored_by_reciprocal_sum() {
        let summary = summarize(&[0.0, 2.0]).expect("zero samples are accepted");
        assert_eq!(summary.harmonic_mean, 4.0);
    }

    #[rstest]
    fn empty_sample_fails() {
        assert_eq!(
            summarize(&[]),
            Err(StatisticsError::TooFewSamples { got: 0 })
        );
    }

    #[rstest]
    fn single_sample_has_undefined_spread() {
        let summary = summarize(&[0.5]).expect("one sample summarises");
        for value in [
            summary.min,
            summary.first_quartile,
            summary.median,
            summary.third_quartile,
            summary.max,
            summary.mean,
            summary.harmonic_mean,
        ] {
            assert_eq!(value, 0.5);
        }
        assert!(summary.stddev.is_nan());
        assert!(summary.harmonic_stddev.is_nan());
    }

    #[rstest]
    fn nan_is_rejected() {
        assert_eq!(
            summarize(&[1.0, f64::NAN, 3.0]),
            Err(StatisticsError::NotANumber { index: 1 })
        );
    }

    #[rstest]
    fn compensated_sum_keeps_small_terms() {
        let sum = neumaier_sum([1.0, 1e100, 1.0, -1e100]);
        assert_eq!(sum, 2.0);
    }

    proptest! {
        #[test]
        fn summary_is_ordered(samples in prop::collection::vec(1e-6_f64..1e6, 2..64)) {
            let summary = summarize(&samples).expect("finite samples summarise");
            prop_assert!(summary.min <= summary.first_quartile);
            prop_assert!(summary.first_quartile <= summary.median);
            prop_assert!(summary.median <= summary.third_quartile);
            prop_assert!(summary.third_quartile <= summary.max);
            prop_assert!(summary.min <= summary.mean * (1.0 + 1e-12));
            prop_assert!(summary.mean <= summary.max * (1.0 + 1e-12));
            prop_assert!(summary.harmonic_mean <= summary.mean * (1.0 + 1e-12));
            prop_assert!(summary.stddev >= 0.0);
        }

        #[test]
        fn summary_ignores_input_order(mut samples in prop::collection::vec(-1e3_f64..1e3, 2..32)) {
            let forward = summarize(&samples).expect("finite samples summarise");
            samples.reverse();
            let backward = summarize(&samples).expect("finite samples summarise");
            prop_assert_eq!(forward.min, backward.min);
            prop_assert_eq!(forward.median, backward.median);
            prop_assert_eq!(forward.max, backward.max);
        }
    }
}
