use log::LevelFilter;

/// Initialize logging using env_logger.
/// Logs at `info` unless the RUST_LOG environment variable says otherwise,
/// e.g. `RUST_LOG=cerebus_core=debug cerebus-rs poll`.
pub fn init_logging() {
    init_logging_with(LevelFilter::Info);
}

/// Like [`init_logging`], with a different fallback level.
/// Safe to call more than once; later calls are ignored.
pub fn init_logging_with(default_level: LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init();
}
