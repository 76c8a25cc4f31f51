//! Merges CLI arguments and an optional TOML config file into a
//! [`sts_lib::config::RunConfig`] plus the resolved input/output paths.
//! Command-line flags always win over the config file, the precedence
//! this lineage's config layer has always followed.

use crate::cmd_args::{CmdArgs, ModeArg};
use crate::toml_config::TomlConfig;
use std::collections::HashSet;
use std::path::PathBuf;
use std::str::FromStr;
use sts_lib::config::{RunConfig, RunMode};
use sts_lib::Test;

const DEFAULT_RESULTS_DIR: &str = "sts-results";

/// A fully resolved, ready-to-run configuration.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Absent only when running in assess-only mode.
    pub input_file: Option<PathBuf>,
    pub pvalue_dir: Option<PathBuf>,
    pub results_dir: PathBuf,
    pub run_config: RunConfig,
    pub verbose: u8,
    pub quiet: u8,
}

impl ValidatedConfig {
    pub fn from_cmd_args(args: CmdArgs, toml: Option<TomlConfig>) -> Result<Self, String> {
        let toml = toml.unwrap_or_default();

        let input_file = args.input_file.or(toml.input.input_file);
        let pvalue_dir = args.pvalue_dir.or(toml.input.pvalue_dir);
        let results_dir = args
            .results_dir
            .or(toml.input.results_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_DIR));

        let run_mode = match args.mode {
            ModeArg::IterateOnly => RunMode::IterateOnly,
            ModeArg::AssessOnly => RunMode::AssessOnly,
            ModeArg::Both => RunMode::IterateAndAssess,
        };

        if !matches!(run_mode, RunMode::AssessOnly) && input_file.is_none() {
            return Err("an input file is required unless running in assess-only mode".into());
        }

        let iteration_bits = args
            .bits
            .or(toml.run.bits)
            .unwrap_or(sts_lib::DEFAULT_ITERATION_BITS);

        let num_iterations = if matches!(run_mode, RunMode::AssessOnly) {
            // Assess-only rebuilds each test's iteration count from the
            // p-value files themselves; the flag is meaningless here.
            1
        } else {
            args.iterations
                .or(toml.run.iterations)
                .ok_or("the number of iterations (-i) is required outside assess-only mode")?
        };

        let alpha = toml.run.alpha.unwrap_or(sts_lib::DEFAULT_ALPHA);
        let uniformity_bins = toml
            .run
            .uniformity_bins
            .unwrap_or(sts_lib::DEFAULT_UNIFORMITY_BINS);
        let uniformity_level = toml
            .run
            .uniformity_level
            .unwrap_or(sts_lib::DEFAULT_UNIFORMITY_LEVEL);
        let legacy_output = args.legacy_output || toml.run.legacy_output.unwrap_or(false);
        let results_file = args.results_file || toml.run.results_file.unwrap_or(false);

        let enabled_tests = resolve_tests(
            args.tests.or(toml.tests.include),
            args.exclude_tests.or(toml.tests.exclude),
        )?;

        let run_config = RunConfig {
            iteration_bits,
            num_iterations,
            alpha,
            uniformity_bins,
            uniformity_level,
            run_mode,
            legacy_output,
            results_file,
            enabled_tests,
        };

        Ok(Self {
            input_file,
            pvalue_dir,
            results_dir,
            run_config,
            verbose: args.verbose,
            quiet: args.quiet,
        })
    }
}

/// Resolves the `--tests`/`--exclude-tests` pair (include always wins) into
/// the enabled-test set every [`RunConfig`] carries.
fn resolve_tests(
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
) -> Result<HashSet<Test>, String> {
    use strum::IntoEnumIterator;

    if let Some(names) = include {
        names.iter().map(|n| parse_test(n)).collect()
    } else if let Some(names) = exclude {
        let blocked: HashSet<Test> = names
            .iter()
            .map(|n| parse_test(n))
            .collect::<Result<_, _>>()?;
        Ok(Test::iter().filter(|t| !blocked.contains(t)).collect())
    } else {
        Ok(Test::iter().collect())
    }
}

fn parse_test(name: &str) -> Result<Test, String> {
    Test::from_str(name).map_err(|_| format!("unknown test name: {name:?}"))
}
