//! The Metrics Aggregator: turns a test's accumulated p-values into a
//! uniformity chi-square and a proportion-in-bounds judgment, per
//! partition.

use crate::config::RunConfig;
use crate::internals::igamc;
use crate::pvalue::is_non_p_value;
use crate::test_interface::TestState;
use crate::Test;

/// Per-test, per-partition verdict.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Verdict {
    PassedBoth,
    FailedUniformity,
    FailedProportion,
    FailedBoth,
    /// Not enough samples to judge at all (e.g. `numOfBitStreams == 0`, or
    /// every iteration emitted NON_P_VALUE for this partition).
    InsufficientSamples,
}

/// The computed metrics for one `(test, partition)` pair.
#[derive(Clone, Debug)]
pub struct PartitionMetrics {
    pub test: Test,
    pub partition: usize,
    pub bins: Vec<u64>,
    pub sample_count: u64,
    pub too_low: u64,
    pub uniformity_p_value: Option<f64>,
    pub proportion_bounds: Option<(f64, f64)>,
    pub verdict: Verdict,
}

/// Computes [`PartitionMetrics`] for every partition of one test.
/// Random-excursion-family tests additionally drop `p_value == 0.0` from
/// `sample_count`, per §4.3.
pub fn aggregate(cfg: &RunConfig, state: &TestState) -> Vec<PartitionMetrics> {
    let is_excursion_family = matches!(
        state.test,
        Test::RandomExcursions | Test::RandomExcursionsVariant
    );

    (0..state.partition_count)
        .map(|partition| {
            aggregate_partition(cfg, state, partition, is_excursion_family)
        })
        .collect()
}

fn aggregate_partition(
    cfg: &RunConfig,
    state: &TestState,
    partition: usize,
    is_excursion_family: bool,
) -> PartitionMetrics {
    let bins_n = cfg.uniformity_bins;
    let mut bins = vec![0u64; bins_n];
    let mut sample_count: u64 = 0;
    let mut too_low: u64 = 0;

    let num_iterations = if state.partition_count == 0 {
        0
    } else {
        state.len() / state.partition_count
    };

    for iteration in 0..num_iterations {
        let idx = iteration * state.partition_count + partition;
        let p = state.p_value_at(idx);

        if is_non_p_value(p) {
            continue;
        }
        if is_excursion_family && p == 0.0 {
            continue;
        }

        sample_count += 1;
        if p < cfg.alpha {
            too_low += 1;
        }

        let bin = if p < 0.0 {
            0
        } else if p >= 1.0 {
            bins_n - 1
        } else {
            ((p * bins_n as f64) as usize).min(bins_n - 1)
        };
        bins[bin] += 1;
    }

    let exp_count = sample_count as f64 / bins_n as f64;

    let (uniformity_p_value, uniformity_passed) = if exp_count <= 0.0 {
        (None, false)
    } else {
        let chi_sq: f64 = bins
            .iter()
            .map(|&count| {
                let diff = count as f64 - exp_count;
                diff * diff / exp_count
            })
            .sum();

        match igamc((bins_n - 1) as f64 / 2.0, chi_sq / 2.0) {
            Ok(p) => {
                let passed = p >= cfg.uniformity_level;
                (Some(p), passed)
            }
            Err(_) => (None, false),
        }
    };

    let proportion = if sample_count == 0 {
        None
    } else {
        let p_hat = 1.0 - cfg.alpha;
        let n = sample_count as f64;
        let spread = 3.0 * (p_hat * cfg.alpha * n).sqrt();
        let min = p_hat * n - spread;
        let max = p_hat * n + spread;
        let passed_count = (sample_count - too_low) as f64;
        Some((min, max, passed_count >= min && passed_count <= max))
    };

    let verdict = match (sample_count == 0, uniformity_passed, proportion) {
        (true, _, _) => Verdict::InsufficientSamples,
        (false, uniformity_ok, Some((_, _, proportion_ok))) => {
            match (uniformity_ok, proportion_ok) {
                (true, true) => Verdict::PassedBoth,
                (true, false) => Verdict::FailedProportion,
                (false, true) => Verdict::FailedUniformity,
                (false, false) => Verdict::FailedBoth,
            }
        }
        (false, _, None) => Verdict::InsufficientSamples,
    };

    PartitionMetrics {
        test: state.test,
        partition,
        bins,
        sample_count,
        too_low,
        uniformity_p_value,
        proportion_bounds: proportion.map(|(min, max, _)| (min, max)),
        verdict,
    }
}
