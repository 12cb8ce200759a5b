/// Copy command handlers
pub mod copy;

/// Plan (dry run) command handlers
pub mod plan;

/// Version command handlers
pub mod version;

/// Normal completion, including runs where some copies failed.
pub const EXIT_OK: u8 = 0;

/// Fatal error: configuration, login or catalog.
pub const EXIT_FATAL: u8 = 1;

/// `--fail-on-error` was given and the run recorded failures.
pub const EXIT_FAILURES: u8 = 2;
