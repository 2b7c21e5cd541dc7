//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::Env;

const DEFAULT_LEVEL: &str = "info";

/// Installs `env_logger`. `RUST_LOG` wins over `level`, which falls back to
/// `info`. Later calls are no-ops.
pub fn init_logging(level: Option<&str>) {
    let filter = level.filter(|l| !l.is_empty()).unwrap_or(DEFAULT_LEVEL);
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(filter)).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init_logging(Some("debug"));
        init_logging(None);
        log::info!("logger initialized");
    }
}
