//! Command-line arguments for the `sts` worker binary. `mpi_sts` takes the
//! plain two-positional-argument form described in its own `main` and has
//! no need of `clap`.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Which half of a run this invocation performs - the Run Mode Controller's
/// three modes, spelled the way the external CLI contract names them.
#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum ModeArg {
    #[value(name = "i")]
    IterateOnly,
    #[value(name = "a")]
    AssessOnly,
    #[value(name = "b")]
    Both,
}

/// `sts -m {i|a|b} -i <iterations> [-d <pval_dir>] [-w <results_dir>]
/// [<input_file>]`
#[derive(Debug, Parser)]
#[command(version, author, about, long_about = None)]
pub struct CmdArgs {
    /// Run mode: 'i' (iterate-only), 'a' (assess-only) or 'b' (iterate-and-assess).
    #[arg(short = 'm', long = "mode", value_enum)]
    pub mode: ModeArg,

    /// Number of iterations (bit-streams) to test. Required outside assess-only mode.
    #[arg(short = 'i', long = "iterations")]
    pub iterations: Option<usize>,

    /// Iteration length in bits. Defaults to 2^20.
    #[arg(short = 'n', long = "bits")]
    pub bits: Option<usize>,

    /// Directory holding binary per-test p-value files: write target in
    /// iterate-only mode, read source in assess-only mode.
    #[arg(short = 'd', long = "pvalue-dir")]
    pub pvalue_dir: Option<PathBuf>,

    /// Directory for human-readable output (stats.txt, results.txt,
    /// finalAnalysisReport.txt, ...).
    #[arg(short = 'w', long = "results-dir")]
    pub results_dir: Option<PathBuf>,

    /// Optional TOML configuration file; CLI flags override its values.
    #[arg(short = 'c', long = "config")]
    pub config_file: Option<PathBuf>,

    /// Raise log verbosity by one step per occurrence.
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Lower log verbosity by one step per occurrence.
    #[arg(short = 'q', long, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Run only the named tests (comma-separated PascalCase test names).
    #[arg(long, value_delimiter = ',', conflicts_with = "exclude_tests")]
    pub tests: Option<Vec<String>>,

    /// Run all tests except the named ones (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub exclude_tests: Option<Vec<String>>,

    /// Use the legacy output layout.
    #[arg(long)]
    pub legacy_output: bool,

    /// Also write a flattened results file across all tests.
    #[arg(long)]
    pub results_file: bool,

    /// Path to the input file. Required unless running assess-only.
    #[arg(value_name = "INPUT_FILE")]
    pub input_file: Option<PathBuf>,
}
