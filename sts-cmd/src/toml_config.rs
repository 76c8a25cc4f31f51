//! TOML configuration file schema for the `sts` worker. Every field is
//! optional: an absent field falls back to the CLI argument, and then to
//! `sts-lib`'s own default, in that order (see `valid_arg`).

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlConfig {
    pub input: TomlInput,
    pub run: TomlRun,
    pub tests: TomlTests,
}

/// Input/output paths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlInput {
    pub input_file: Option<PathBuf>,
    pub pvalue_dir: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
}

/// Run Configuration fields (§3), everything but the test selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlRun {
    pub iterations: Option<usize>,
    pub bits: Option<usize>,
    pub alpha: Option<f64>,
    pub uniformity_bins: Option<usize>,
    pub uniformity_level: Option<f64>,
    pub legacy_output: Option<bool>,
    pub results_file: Option<bool>,
}

/// Test selection: include overrides exclude, matching the CLI's own
/// mutually-exclusive `--tests`/`--exclude-tests` pair.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct TomlTests {
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
}
