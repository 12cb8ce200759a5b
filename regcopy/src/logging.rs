//! Tracing subscriber setup.

use crate::context::VerbosityLevel;
use tracing_subscriber::EnvFilter;

impl VerbosityLevel {
    /// Default filter directive when `RUST_LOG` is not set.
    pub fn filter_directive(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
            Self::VeryVerbose => "trace",
        }
    }
}

/// Filter from `RUST_LOG`, or from the verbosity flags when it is unset or invalid.
pub fn env_filter(verbosity: VerbosityLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()))
}

/// Install the global subscriber. Logs go to stderr so stdout stays parseable.
pub fn init(verbosity: VerbosityLevel) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .try_init();

    if let Err(e) = result {
        eprintln!("Unable to initialize logging: {}", e);
    }
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
