//! Error types for regcopy.
//!
//! Every fallible operation in the library returns [`RegcopyError`]. The
//! variants mirror the places a copy run can go wrong: talking to a registry,
//! reading configuration, or invoking the container engine.

use thiserror::Error;


/// Main error type for regcopy operations
#[derive(Error, Debug)]
pub enum RegcopyError {
    /// Network-related errors (connection, timeout, DNS)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication errors (401, 403)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Resource not found errors (404)
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// Rate limiting errors (429)
    #[error("Rate limit: {message}")]
    RateLimit { message: String },

    /// Server errors (5xx)
    #[error("Server error (status: {status_code}): {message}")]
    Server { message: String, status_code: u16 },

    /// Any other non-200 registry response
    #[error("Unexpected status {status_code}: {message}")]
    Http { message: String, status_code: u16 },

    /// Validation errors (malformed response body, invalid pattern, bad URL)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors (unreadable file, missing settings)
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        path: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Container engine invocation failed to spawn or exited non-zero
    #[error("Engine command '{command}' failed: {message}")]
    Engine {
        command: String,
        message: String,
        exit_code: Option<i32>,
        #[source]
        source: Option<std::io::Error>,
    },
}

/// Result type alias for regcopy operations
pub type Result<T> = std::result::Result<T, RegcopyError>;

impl RegcopyError {
    /// Creates a new network error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregcopy::error::RegcopyError;
    ///
    /// let err = RegcopyError::network("connection refused");
    /// assert!(matches!(err, RegcopyError::Network { .. }));
    /// ```
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new not found error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregcopy::error::RegcopyError;
    ///
    /// let err = RegcopyError::not_found("repository", "myrepo");
    /// assert!(matches!(err, RegcopyError::NotFound { .. }));
    /// ```
    pub fn not_found<S: Into<String>>(resource_type: S, name: S) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit<S: Into<String>>(message: S) -> Self {
        Self::RateLimit {
            message: message.into(),
        }
    }

    /// Creates a new server error.
    pub fn server<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Server {
            message: message.into(),
            status_code,
        }
    }

    /// Creates an error for an unexpected HTTP status.
    pub fn http<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Http {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new validation error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregcopy::error::RegcopyError;
    ///
    /// let err = RegcopyError::validation("invalid include pattern");
    /// assert!(matches!(err, RegcopyError::Validation { .. }));
    /// ```
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S, path: Option<S>) -> Self {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregcopy::error::RegcopyError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    /// let err = RegcopyError::config_with_source("failed to read config", Some("application.yaml"), io_err);
    /// assert!(matches!(err, RegcopyError::Config { .. }));
    /// ```
    pub fn config_with_source<S, E>(message: S, path: Option<S>, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            path: path.map(|p| p.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an engine error for a process that ran but exited non-zero.
    pub fn engine_exit<S: Into<String>>(command: S, exit_code: Option<i32>) -> Self {
        let message = match exit_code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        };
        Self::Engine {
            command: command.into(),
            message,
            exit_code,
            source: None,
        }
    }

    /// Creates an engine error for a process that could not be started.
    pub fn engine_spawn<S: Into<String>>(command: S, source: std::io::Error) -> Self {
        Self::Engine {
            command: command.into(),
            message: format!("unable to start process: {}", source),
            exit_code: None,
            source: Some(source),
        }
    }
}
