//! The Run Mode Controller: sequences `init -> iterate -> write/read p-values
//! -> metrics -> destroy` the way the three run modes require. `parse_args`
//! itself lives in `sts-cmd`, since it is the one stage that is genuinely
//! specific to the command-line front-end; everything from `init` onward is
//! a pure function of a [`RunConfig`] plus a registry, so it lives here and
//! is shared by both the `sts` worker binary and any future front-end.

use crate::bitvec::BitVec;
use crate::config::{RunConfig, RunMode};
use crate::iteration::{run_iterations, ErasedTest};
use crate::metrics::{self, PartitionMetrics};
use crate::pvalue;
use crate::reports;
use crate::test_interface::TestState;
use crate::{Error, Test};
use std::path::{Path, PathBuf};

/// Per-test binary p-value file path within a p-value directory.
pub fn pvalue_file_path(dir: &Path, test: Test) -> PathBuf {
    dir.join(format!("{test}.pval"))
}

/// Runs one job for `cfg.run_mode`.
///
/// `input` is required for `IterateAndAssess`/`IterateOnly` and ignored for
/// `AssessOnly`. `pval_dir` is where binary p-value files are written
/// (iterate-only) or read from (assess-only); defaults to `results_dir` if
/// `None` - the distributed coordinator passes a different directory so
/// rank 0 can point at the union of every worker's output.
pub fn execute(
    cfg: &RunConfig,
    input: Option<&BitVec>,
    registry: &[Box<dyn ErasedTest>],
    results_dir: &Path,
    pval_dir: Option<&Path>,
) -> Result<(), Error> {
    std::fs::create_dir_all(results_dir)?;
    let pval_dir = pval_dir.unwrap_or(results_dir);

    match cfg.run_mode {
        RunMode::IterateAndAssess => {
            let states = iterate(cfg, input, registry)?;
            write_per_test_reports(cfg, &states, results_dir)?;
            write_final_report(&states, cfg, results_dir)
        }
        RunMode::IterateOnly => {
            let states = iterate(cfg, input, registry)?;
            std::fs::create_dir_all(pval_dir)?;
            for state in &states {
                pvalue::write_p_values(pvalue_file_path(pval_dir, state.test), &state.p_values())?;
            }
            Ok(())
        }
        RunMode::AssessOnly => {
            let states = load_states(cfg, registry, pval_dir)?;
            write_final_report(&states, cfg, results_dir)
        }
    }
}

fn iterate(
    cfg: &RunConfig,
    input: Option<&BitVec>,
    registry: &[Box<dyn ErasedTest>],
) -> Result<Vec<TestState>, Error> {
    let input = input.ok_or_else(|| {
        Error::InvalidParameter("iteration requires input data but none was given".into())
    })?;
    let derived = cfg.derive();
    Ok(run_iterations(cfg, &derived, input, registry))
}

/// `destroy`'s human-output half for a fully-iterated run: per-test
/// `stats.txt`/`results.txt`/`data<k>.txt`.
fn write_per_test_reports(cfg: &RunConfig, states: &[TestState], results_dir: &Path) -> Result<(), Error> {
    for state in states {
        if !state.enabled {
            continue;
        }
        let dir = reports::test_output_dir(results_dir, state.test);
        reports::write_test_reports(&dir, state, cfg.alpha)?;
    }
    Ok(())
}

fn write_final_report(states: &[TestState], cfg: &RunConfig, results_dir: &Path) -> Result<(), Error> {
    let metrics_by_test: Vec<(Test, Vec<PartitionMetrics>)> = states
        .iter()
        .filter(|state| state.enabled)
        .map(|state| (state.test, metrics::aggregate(cfg, state)))
        .collect();

    let path = reports::final_report_path(results_dir);
    reports::write_final_analysis_report(&path, &metrics_by_test)
}

/// `init` + `read-p-val` for assess-only mode: rebuilds one [`TestState`]
/// per registry entry from its binary p-value file. A test whose file is
/// missing is treated as never having run (disabled, zero samples) rather
/// than as an error - the distributed coordinator's tail-discard (§4.5) can
/// legitimately leave a test's file absent from a worker's share.
fn load_states(
    cfg: &RunConfig,
    registry: &[Box<dyn ErasedTest>],
    pval_dir: &Path,
) -> Result<Vec<TestState>, Error> {
    registry
        .iter()
        .map(|entry| {
            let test = entry.test();
            let would_enable = cfg.is_enabled(test) && entry.should_enable(cfg);
            let path = pvalue_file_path(pval_dir, test);

            let values = match std::fs::metadata(&path) {
                Ok(_) => pvalue::read_p_values(&path)?,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
                Err(err) => return Err(Error::Io(err)),
            };

            let partition_count = entry.partition_count().max(1);
            let num_iterations = values.len() / partition_count;
            let enabled = would_enable && !values.is_empty();

            let mut state = TestState::new(test, num_iterations, partition_count, enabled);
            if !values.is_empty() {
                state.load_p_values(values, cfg.alpha);
            }
            Ok(state)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iteration::TestAdapter;
    use crate::tests::frequency::Frequency;

    fn tiny_registry() -> Vec<Box<dyn ErasedTest>> {
        vec![Box::new(TestAdapter::<Frequency>::new(()))]
    }

    fn tmp_dir(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sts-run-test-{label}-{}", std::process::id()))
    }

    #[test]
    fn iterate_only_then_assess_only_round_trips() {
        let registry = tiny_registry();
        let cfg = RunConfig {
            iteration_bits: 128,
            num_iterations: 4,
            enabled_tests: std::iter::once(Test::Frequency).collect(),
            ..RunConfig::default()
        };

        let bits: Vec<bool> = (0..(128 * 4)).map(|i| i % 3 == 0).collect();
        let input = BitVec::from(bits.as_slice());

        let worker_dir = tmp_dir("worker");
        let iterate_cfg = RunConfig {
            run_mode: RunMode::IterateOnly,
            ..cfg.clone()
        };
        execute(&iterate_cfg, Some(&input), &registry, &worker_dir, None).unwrap();
        assert!(pvalue_file_path(&worker_dir, Test::Frequency).exists());

        let results_dir = tmp_dir("results");
        let assess_cfg = RunConfig {
            run_mode: RunMode::AssessOnly,
            ..cfg
        };
        execute(&assess_cfg, None, &registry, &results_dir, Some(&worker_dir)).unwrap();
        assert!(reports::final_report_path(&results_dir).exists());

        std::fs::remove_dir_all(&worker_dir).ok();
        std::fs::remove_dir_all(&results_dir).ok();
    }

    #[test]
    fn iterate_and_assess_writes_both_human_and_final_reports() {
        let registry = tiny_registry();
        let cfg = RunConfig {
            iteration_bits: 128,
            num_iterations: 2,
            enabled_tests: std::iter::once(Test::Frequency).collect(),
            ..RunConfig::default()
        };
        let bits: Vec<bool> = (0..(128 * 2)).map(|i| i % 2 == 0).collect();
        let input = BitVec::from(bits.as_slice());

        let dir = tmp_dir("combined");
        execute(&cfg, Some(&input), &registry, &dir, None).unwrap();

        assert!(reports::final_report_path(&dir).exists());
        assert!(reports::test_output_dir(&dir, Test::Frequency)
            .join("results.txt")
            .exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_pvalue_file_is_treated_as_disabled_not_an_error() {
        let registry = tiny_registry();
        let cfg = RunConfig {
            run_mode: RunMode::AssessOnly,
            enabled_tests: std::iter::once(Test::Frequency).collect(),
            ..RunConfig::default()
        };

        let dir = tmp_dir("missing");
        std::fs::create_dir_all(&dir).unwrap();
        let states = load_states(&cfg, &registry, &dir).unwrap();
        assert!(!states[0].enabled);

        std::fs::remove_dir_all(&dir).ok();
    }
}
