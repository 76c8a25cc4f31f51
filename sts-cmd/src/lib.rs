//! Shared plumbing for the `sts` worker and `mpi_sts` launcher binaries:
//! CLI argument parsing, TOML configuration, merging the two into a
//! [`sts_lib::config::RunConfig`], and logging setup. The binaries
//! themselves (`src/bin/sts.rs`, `src/bin/mpi_sts.rs`) are thin shells
//! around this crate and `sts_lib::run`.

pub mod cmd_args;
pub mod logging;
pub mod toml_config;
pub mod valid_arg;
