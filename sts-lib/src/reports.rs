//! Human-readable output writers: `stats.txt`, `results.txt`, `data<k>.txt`
//! and `finalAnalysisReport.txt`. These are the uniform half of the Test
//! Interface (§4.1) - `print` and (together with [`crate::metrics`])
//! `metrics` operate identically over any [`TestState`], so they live here
//! as free functions rather than fifteen near-identical trait methods.
//!
//! Byte format is deliberately unspecified (per the spec's scope note);
//! only the semantic content is. Filenames are built through
//! [`bounded_filename`], a bounded string builder that errors on overflow
//! rather than silently truncating - a truncated filename could collide
//! two different tests' or ranks' output undetected.

use crate::metrics::{PartitionMetrics, Verdict};
use crate::pvalue::is_non_p_value;
use crate::test_interface::TestState;
use crate::{Error, Test};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Filenames in this crate never need anywhere near this many characters;
/// the bound exists so a future caller's bad input produces a clear error
/// instead of a silently truncated, potentially colliding, path.
pub const MAX_FILENAME_LEN: usize = 255;

fn bounded_filename(name: impl Into<String>) -> Result<String, Error> {
    let name = name.into();
    if name.len() > MAX_FILENAME_LEN {
        return Err(Error::InvalidParameter(format!(
            "filename {name:?} exceeds the {MAX_FILENAME_LEN}-byte bound"
        )));
    }
    Ok(name)
}

fn p_value_text(p: f64) -> String {
    if is_non_p_value(p) {
        "__INVALID__".to_string()
    } else {
        format!("{p:.6}")
    }
}

/// Writes `stats.txt` for one test: one block per iteration, each block
/// listing every partition's statistic, p-value and success/failure
/// marker. `NON_P_VALUE` prints as `__INVALID__` rather than as a marker of
/// its own - it is an absence, not a verdict.
pub fn write_stats_txt(dir: &Path, state: &TestState, alpha: f64) -> Result<(), Error> {
    let path = dir.join(bounded_filename("stats.txt")?);
    let file = std::fs::File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(out, "STATISTICAL TEST: {}", state.test)?;

    if state.partition_count == 0 {
        return Ok(());
    }
    let num_iterations = state.len() / state.partition_count;

    for iteration in 0..num_iterations {
        writeln!(out, "---------------------------------------------")?;
        writeln!(out, "iteration {iteration}")?;
        for partition in 0..state.partition_count {
            let idx = iteration * state.partition_count + partition;
            let stat = state.stat_at(idx);
            let p = state.p_value_at(idx);
            let marker = if is_non_p_value(p) {
                "N/A"
            } else if p < alpha {
                "FAILURE"
            } else {
                "SUCCESS"
            };
            writeln!(
                out,
                "\tpartition {partition}: stat = {stat:.6}, p_value = {}, {marker}",
                p_value_text(p)
            )?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Writes `results.txt`: every p-value, one per line, in iteration-major
/// order - the flattened form of `p_val[test]`.
pub fn write_results_txt(dir: &Path, state: &TestState) -> Result<(), Error> {
    let path = dir.join(bounded_filename("results.txt")?);
    let file = std::fs::File::create(path)?;
    let mut out = BufWriter::new(file);

    for value in state.p_values() {
        writeln!(out, "{}", p_value_text(value))?;
    }

    out.flush()?;
    Ok(())
}

/// Writes `data<k>.txt` for `k` in `1..=partition_count`, but only when a
/// test emits more than one p-value per iteration - a single-partition
/// test's `data1.txt` would just duplicate `results.txt`.
pub fn write_data_txt_files(dir: &Path, state: &TestState) -> Result<(), Error> {
    if state.partition_count <= 1 {
        return Ok(());
    }

    let values = state.p_values();
    for k in 1..=state.partition_count {
        let path = dir.join(bounded_filename(format!("data{k}.txt"))?);
        let file = std::fs::File::create(path)?;
        let mut out = BufWriter::new(file);

        for value in values.iter().skip(k - 1).step_by(state.partition_count) {
            writeln!(out, "{}", p_value_text(*value))?;
        }
        out.flush()?;
    }

    Ok(())
}

/// Runs every human-readable writer for one test's output directory:
/// `stats.txt`, `results.txt`, and `data<k>.txt` if applicable.
pub fn write_test_reports(dir: &Path, state: &TestState, alpha: f64) -> Result<(), Error> {
    std::fs::create_dir_all(dir)?;
    write_stats_txt(dir, state, alpha)?;
    write_results_txt(dir, state)?;
    write_data_txt_files(dir, state)?;
    Ok(())
}

/// One bin-histogram row in `finalAnalysisReport.txt`.
fn format_bins(bins: &[u64]) -> String {
    bins.iter()
        .map(|b| format!("{b:>4}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Writes `finalAnalysisReport.txt`: one line per test-partition with the
/// uniformity-bin histogram, the uniformity p-value (or `----` if
/// insufficient samples prevented computing one), the pass/sample count,
/// a `*` marker on failure, and the test name.
pub fn write_final_analysis_report(
    path: &Path,
    metrics_by_test: &[(Test, Vec<PartitionMetrics>)],
) -> Result<(), Error> {
    let file = std::fs::File::create(path)?;
    let mut out = BufWriter::new(file);

    writeln!(
        out,
        "{:>55} {:>10} {:>14} {}",
        "BIN HISTOGRAM (10 BINS)", "UNIFORMITY", "PASS / TOTAL", "TEST"
    )?;
    writeln!(out, "{}", "-".repeat(100))?;

    for (test, partitions) in metrics_by_test {
        for metrics in partitions {
            let uniformity = match metrics.uniformity_p_value {
                Some(p) => format!("{p:.6}"),
                None => "----".to_string(),
            };
            let passed = metrics.sample_count - metrics.too_low;
            let marker = if matches!(
                metrics.verdict,
                Verdict::FailedBoth | Verdict::FailedProportion | Verdict::FailedUniformity
            ) {
                "*"
            } else {
                " "
            };

            let label = if partitions.len() > 1 {
                format!("{test} [partition {}]", metrics.partition)
            } else {
                test.to_string()
            };

            writeln!(
                out,
                "{} {:>10} {:>6}/{:<6} {}{}",
                format_bins(&metrics.bins),
                uniformity,
                passed,
                metrics.sample_count,
                marker,
                label
            )?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Path conventions for a test's output directory and its final report,
/// rooted at the run's results directory.
pub fn test_output_dir(results_root: &Path, test: Test) -> PathBuf {
    results_root.join(test.to_string())
}

pub fn final_report_path(results_root: &Path) -> PathBuf {
    results_root.join("finalAnalysisReport.txt")
}
