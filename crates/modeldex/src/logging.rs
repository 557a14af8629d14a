//! Tracing bootstrap for binaries embedding the registry.

use crate::config::LogConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter directives read from the environment; win over everything else.
pub const LOG_ENV: &str = "MODELDEX_LOG";

pub const DEFAULT_LOG_FILTER: &str = "modeldex=info,modeldex_schema=info";

/// Install a stderr fmt subscriber. Returns false if one was already set.
pub fn init(config: &LogConfig, verbosity: u8) -> bool {
    let directives = resolve_filter(std::env::var(LOG_ENV).ok(), config, verbosity);
    let filter =
        EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity > 0),
        )
        .try_init()
        .is_ok()
}

/// Environment, then `-v` flags, then the config file, then the default.
#[must_use]
pub fn resolve_filter(env: Option<String>, config: &LogConfig, verbosity: u8) -> String {
    if let Some(env) = env.filter(|e| !e.trim().is_empty()) {
        return env;
    }

    match verbosity {
        0 => config
            .filter
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        1 => "modeldex=debug,modeldex_schema=debug".to_string(),
        _ => "modeldex=trace,modeldex_schema=trace".to_string(),
    }
}

///
/// TESTS
///
