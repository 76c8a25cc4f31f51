//! The `sts` worker binary: a thin shell around `sts_lib::run::execute`.
//! Reached directly by a user running a single-process job, or internally
//! re-invoked by `mpi_sts` once per worker process and once more for the
//! final assess-only pass.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use sts_cmd::cmd_args::CmdArgs;
use sts_cmd::toml_config::TomlConfig;
use sts_cmd::logging;
use sts_cmd::valid_arg::ValidatedConfig;
use sts_lib::bitvec::BitVec;
use sts_lib::config::RunMode;
use sts_lib::tests::default_registry;

fn main() -> Result<()> {
    let args = CmdArgs::parse();
    logging::init(args.verbose, args.quiet);

    let toml = match &args.config_file {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file {}", path.display()))?;
            Some(toml::from_str::<TomlConfig>(&text).context("failed to parse config file")?)
        }
        None => None,
    };

    let config = ValidatedConfig::from_cmd_args(args, toml).map_err(|err| anyhow::anyhow!(err))?;

    let registry = default_registry();
    let needs_input = !matches!(config.run_config.run_mode, RunMode::AssessOnly);

    let input = if needs_input {
        let path = config
            .input_file
            .as_ref()
            .expect("from_cmd_args guarantees an input file outside assess-only mode");
        let bytes = fs::read(path)
            .with_context(|| format!("failed to read input file {}", path.display()))?;
        Some(BitVec::from(bytes.as_slice()))
    } else {
        None
    };

    sts_lib::run::execute(
        &config.run_config,
        input.as_ref(),
        &registry,
        &config.results_dir,
        config.pvalue_dir.as_deref(),
    )?;

    tracing::info!(results_dir = %config.results_dir.display(), "finished");

    Ok(())
}
