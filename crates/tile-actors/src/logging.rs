use env_logger::{Builder, Env};
use log::LevelFilter;

/// Install the `env_logger` backend for the `log` facade.
///
/// `RUST_LOG` wins when set. Otherwise `verbose` shows every state change
/// and hit (debug), and the default shows spawns and level loads (info).
/// Calling it again is harmless.
pub fn init(verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let mut builder = Builder::from_env(Env::default().default_filter_or(level.to_string()));
    builder.format_timestamp(None);
    let _ = builder.try_init();
}
