//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from `RUST_LOG`.
///
/// Calling this again after a logger is installed does nothing.
pub fn init() {
    let _ = env_logger::try_init();
}

/// Initialize the logging system with `level` as the default filter.
///
/// `RUST_LOG` still overrides the default when it is set.
pub fn init_with_level(level: &str) {
    let env = env_logger::Env::default().default_filter_or(level);
    let _ = env_logger::Builder::from_env(env).try_init();
}
