//! Installs the process-wide `tracing-subscriber` formatting layer used by
//! both binaries for the Warning and Notice/Debug severities of the error
//! handling design.

use tracing_subscriber::EnvFilter;

/// Base level is `warn`. Each `-v` raises it one step (info, debug, trace);
/// each `-q` lowers it one step (error, then off). `RUST_LOG`, when set,
/// always wins - this only supplies the default `EnvFilter` uses in its
/// absence.
pub fn init(verbose: u8, quiet: u8) {
    let level = level_for(verbose as i16 - quiet as i16);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn level_for(delta: i16) -> &'static str {
    match delta {
        i16::MIN..=-2 => "off",
        -1 => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
