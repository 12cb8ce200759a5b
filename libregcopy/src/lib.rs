//! regcopy - copy container images between registries
//!
//! `libregcopy` reads the catalog of a source registry, selects repositories
//! with a regular expression, and copies every tag of each selected
//! repository to a destination registry through a local container engine
//! (`docker`, `podman`, ...).
//!
//! # Quick Start
//!
//! ```no_run
//! use libregcopy::{Config, Copier};
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("application.yaml"))?;
//!     config.validate()?;
//!
//!     let copier = Copier::from_config(&config.app)?;
//!     let summary = copier.run().await?;
//!     println!("{} copied, {} failed", summary.succeeded(), summary.failed());
//!     Ok(())
//! }
//! ```
//!
//! # Main Types
//!
//! - [`Copier`] - runs a copy, or plans one without touching the engine
//! - [`Config`] - YAML + environment configuration
//! - [`Registry`] - catalog and tag listing against a registry
//! - [`Engine`] / [`ProcessEngine`] - container engine invocation
//! - [`CopySummary`] - per-run outcome

#![warn(clippy::all)]

/// Returns the libregcopy crate version.
///
/// # Examples
///
/// ```
/// let version = libregcopy::version();
/// assert!(!version.is_empty());
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

pub use auth::Credentials;
pub use config::{AppConfig, Config, RegistryEndpoint};
pub use copier::{
    CopyFailure, CopyJob, CopyPlan, CopyStep, CopySummary, Copier, PlannedRepository,
    SkippedRepository,
};
pub use engine::{Engine, ProcessEngine};
pub use error::{RegcopyError, Result};
pub use filter::IncludeFilter;
pub use reference::ImageRef;
pub use registry::Registry;

pub mod auth;
pub mod client;
pub mod config;
pub mod copier;
pub mod engine;
pub mod error;
pub mod filter;
pub mod reference;
pub mod registry;
