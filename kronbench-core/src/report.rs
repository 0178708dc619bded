//! The benchmark's final text report.
//!
//! Rendering writes one `key: value` line per figure. Floating-point values
//! use C's `%20.17e` layout so existing result parsers keep working.

use std::io::{self, Write};

use crate::{
    Result,
    config::BenchmarkConfig,
    error::BenchError,
    statistics::{Summary, summarize},
    trials::TrialTiming,
};

/// Bytes occupied by one edge in the reference edge list layout.
const EDGE_BYTES: f64 = 16.0;

/// Summaries and run parameters ready to render.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkReport {
    /// Scale of the graph.
    pub scale: u32,
    /// `2^scale`.
    pub vertex_count: u64,
    /// Configured edge factor.
    pub edgefactor: u64,
    /// Recursive-matrix initiator probabilities `[A, B, C, D]`.
    pub initiator: [f64; 4],
    /// Seconds spent generating the edge list.
    pub generation_seconds: f64,
    /// Seconds spent building the kernel's graph.
    pub construction_seconds: f64,
    /// Number of trials actually run.
    pub trials: usize,
    /// Traversal durations.
    pub time: Summary,
    /// Edges traversed per trial.
    pub nedge: Summary,
    /// Traversed edges per second, per trial.
    pub teps: Summary,
}

impl BenchmarkReport {
    /// Summarises the trial timings and per-trial edge counts.
    ///
    /// `timings` and `edge_counts` are paired by index.
    ///
    /// # Errors
    /// Returns [`BenchError::Statistics`] when a metric cannot be summarised,
    /// for example when no trial ran. A root set that shrank to a single root
    /// still summarises, with NaN spreads.
    pub fn build(
        config: &BenchmarkConfig,
        generation_seconds: f64,
        construction_seconds: f64,
        timings: &[TrialTiming],
        edge_counts: &[u64],
    ) -> Result<Self> {
        let times: Vec<f64> = timings.iter().map(|timing| timing.seconds).collect();
        let nedges: Vec<f64> = edge_counts.iter().map(|&count| count as f64).collect();
        let teps: Vec<f64> = nedges
            .iter()
            .zip(&times)
            .map(|(nedge, seconds)| nedge / seconds)
            .collect();
        let params = config.rmat_params();
        Ok(Self {
            scale: config.scale(),
            vertex_count: config.vertex_count(),
            edgefactor: config.edgefactor(),
            initiator: [params.a, params.b, params.c, params.d()],
            generation_seconds,
            construction_seconds,
            trials: timings.len(),
            time: summarise_metric("time", &times)?,
            nedge: summarise_metric("nedge", &nedges)?,
            teps: summarise_metric("TEPS", &teps)?,
        })
    }

    /// Size of the nominal edge list in terabytes.
    #[must_use]
    pub fn terasize(&self) -> f64 {
        self.vertex_count as f64 * self.edgefactor as f64 * EDGE_BYTES / 1.0e12
    }

    /// Writes the report in `key: value` form.
    ///
    /// # Errors
    /// Propagates any error returned by `out`.
    pub fn render<O: Write>(&self, out: &mut O) -> io::Result<()> {
        writeln!(out, "SCALE: {}", self.scale)?;
        writeln!(out, "nvtx: {}", self.vertex_count)?;
        writeln!(out, "edgefactor: {}", self.edgefactor)?;
        writeln!(out, "terasize: {}", format_sci(self.terasize()))?;
        for (label, value) in ["A", "B", "C", "D"].iter().zip(self.initiator) {
            writeln!(out, "{label}: {}", format_sci(value))?;
        }
        writeln!(out, "generation_time: {}", format_sci(self.generation_seconds))?;
        writeln!(
            out,
            "construction_time: {}",
            format_sci(self.construction_seconds)
        )?;
        writeln!(out, "nbfs: {}", self.trials)?;
        render_summary(out, "time", &self.time, Mean::Arithmetic)?;
        render_summary(out, "nedge", &self.nedge, Mean::Arithmetic)?;
        render_summary(out, "TEPS", &self.teps, Mean::Harmonic)
    }
}

#[derive(Clone, Copy)]
enum Mean {
    Arithmetic,
    Harmonic,
}

fn summarise_metric(metric: &'static str, samples: &[f64]) -> Result<Summary> {
    summarize(samples).map_err(|source| BenchError::Statistics { metric, source })
}

fn render_summary<O: Write>(
    out: &mut O,
    label: &str,
    summary: &Summary,
    mean: Mean,
) -> io::Result<()> {
    let order = [
        ("min", summary.min),
        ("firstquartile", summary.first_quartile),
        ("median", summary.median),
        ("thirdquartile", summary.third_quartile),
        ("max", summary.max),
    ];
    for (name, value) in order {
        writeln!(out, "{name}_{label}: {}", format_sci(value))?;
    }
    let (mean_name, mean_value, spread_name, spread_value) = match mean {
        Mean::Arithmetic => ("mean", summary.mean, "stddev", summary.stddev),
        Mean::Harmonic => (
            "harmonic_mean",
            summary.harmonic_mean,
            "harmonic_stddev",
            summary.harmonic_stddev,
        ),
    };
    writeln!(out, "{mean_name}_{label}: {}", format_sci(mean_value))?;
    writeln!(out, "{spread_name}_{label}: {}", format_sci(spread_value))
}

/// Formats `value` like C's `%20.17e`.
///
/// # Examples
/// ```
/// use kronbench_core::format_sci;
///
/// assert_eq!(format_sci(2.5), "2.50000000000000000e+00");
/// assert_eq!(format_sci(f64::INFINITY), "                 inf");
/// ```
#[must_use]
pub fn format_sci(value: f64) -> String {
    if value.is_nan() {
        return format!("{:>20}", "nan");
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "inf" } else { "-inf" };
        return format!("{text:>20}");
    }
    let raw = format!("{value:.17e}");
    let Some((mantissa, exponent)) = raw.split_once('e') else {
        return format!("{raw:>20}");
    };
    let (sign, digits) = exponent
        .strip_prefix('-')
        .map_or(('+', exponent), |digits| ('-', digits));
    format!("{:>20}", format!("{mantissa}e{sign}{digits:0>2}"))
}
