//! Copy orchestration.
//!
//! A run logs in to both registries, reads the source catalog, keeps the
//! repositories matching the include pattern and copies every tag of each one
//! through the engine: pull, tag, push, remove. Everything is sequential.
//!
//! Failures fall into two tiers. Login, catalog and configuration failures
//! abort the run and are returned as `Err`. Failures for a single repository
//! or tag are logged, recorded in the [`CopySummary`] and the run moves on.

use crate::client::ClientConfig;
use crate::config::{AppConfig, RegistryEndpoint};
use crate::engine::{Engine, ProcessEngine};
use crate::error::{RegcopyError, Result};
use crate::filter::IncludeFilter;
use crate::reference::{ImageRef, registry_host};
use crate::registry::Registry;
use serde::Serialize;
use std::fmt;

#[cfg(test)]
mod tests;

/// Step of the per-tag copy sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStep {
    Pull,
    Tag,
    Push,
    Remove,
}

impl fmt::Display for CopyStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pull => "pull",
            Self::Tag => "tag",
            Self::Push => "push",
            Self::Remove => "remove",
        };
        f.write_str(name)
    }
}

/// One `(repository, tag)` pair to copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyJob {
    pub repository: String,
    pub tag: String,
    /// Name of the image in the source registry.
    pub source: ImageRef,
    /// Name of the image in the destination registry.
    pub target: ImageRef,
}

/// A tag whose copy sequence stopped at `step`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyFailure {
    pub job: CopyJob,
    pub step: CopyStep,
    pub error: String,
}

/// A repository skipped because its tags could not be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRepository {
    pub repository: String,
    pub error: String,
}

/// Outcome of a copy run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub copied: Vec<CopyJob>,
    pub failures: Vec<CopyFailure>,
    pub skipped: Vec<SkippedRepository>,
}

impl CopySummary {
    pub fn succeeded(&self) -> usize {
        self.copied.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// True when no tag failed and no repository was skipped.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.skipped.is_empty()
    }
}

/// A repository selected for copying, with its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRepository {
    pub repository: String,
    pub tags: Vec<String>,
}

/// What a run would copy, computed without touching the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyPlan {
    pub repositories: Vec<PlannedRepository>,
    pub skipped: Vec<SkippedRepository>,
}

impl CopyPlan {
    /// Number of tags that would be copied.
    pub fn tag_count(&self) -> usize {
        self.repositories.iter().map(|r| r.tags.len()).sum()
    }
}

/// Copies images from one registry to another through an [`Engine`].
pub struct Copier<E: Engine> {
    source: Registry,
    source_endpoint: RegistryEndpoint,
    destination: RegistryEndpoint,
    engine: E,
    filter: IncludeFilter,
    cleanup_on_failure: bool,
}

impl Copier<ProcessEngine> {
    /// Builds a copier that drives the configured engine executable.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::with_engine(config, ProcessEngine::new(&config.executable))
    }
}

impl<E: Engine> Copier<E> {
    /// Builds a copier that drives `engine`.
    ///
    /// The include pattern is compiled here, so an invalid pattern fails
    /// before any registry or engine call is made.
    pub fn with_engine(config: &AppConfig, engine: E) -> Result<Self> {
        let filter = IncludeFilter::new(&config.source_include)?;
        let source_endpoint = config.source();
        let source = Registry::connect(
            &source_endpoint,
            ClientConfig::new().with_timeout(config.timeout),
        )?;

        Ok(Self {
            source,
            source_endpoint,
            destination: config.destination(),
            engine,
            filter,
            cleanup_on_failure: config.cleanup_on_failure,
        })
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Runs the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if logging in to either registry fails or the source
    /// catalog cannot be read. Per-repository and per-tag failures are
    /// reported in the returned summary instead.
    pub async fn run(&self) -> Result<CopySummary> {
        self.login(&self.source_endpoint, "source").await?;
        self.login(&self.destination, "destination").await?;

        let repositories = self.matching_repositories().await?;

        let mut summary = CopySummary::default();
        for repository in repositories {
            let tags = match self.source.list_tags(&repository).await {
                Ok(tags) => tags,
                Err(e) => {
                    tracing::error!(%repository, error = %e, "unable to get tags");
                    summary.skipped.push(SkippedRepository {
                        repository,
                        error: e.to_string(),
                    });
                    continue;
                }
            };
            tracing::info!(%repository, ?tags, "tags found");

            for tag in tags {
                let job = self.job(&repository, &tag);
                match self.copy(&job).await {
                    Ok(()) => summary.copied.push(job),
                    Err(failure) => {
                        tracing::error!(
                            image = %failure.job.source,
                            step = %failure.step,
                            error = %failure.error,
                            "unable to copy"
                        );
                        summary.failures.push(failure);
                    }
                }
            }
        }

        tracing::info!(
            copied = summary.succeeded(),
            failed = summary.failed(),
            skipped = summary.skipped.len(),
            "copy finished"
        );
        Ok(summary)
    }

    /// Lists what [`run`](Self::run) would copy without logging in or
    /// invoking the engine.
    pub async fn plan(&self) -> Result<CopyPlan> {
        let repositories = self.matching_repositories().await?;

        let mut plan = CopyPlan::default();
        for repository in repositories {
            match self.source.list_tags(&repository).await {
                Ok(tags) => plan.repositories.push(PlannedRepository { repository, tags }),
                Err(e) => {
                    tracing::error!(%repository, error = %e, "unable to get tags");
                    plan.skipped.push(SkippedRepository {
                        repository,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(plan)
    }

    /// Builds the source and destination references for one tag.
    pub fn job(&self, repository: &str, tag: &str) -> CopyJob {
        CopyJob {
            repository: repository.to_string(),
            tag: tag.to_string(),
            source: ImageRef::new(&self.source_endpoint.url, repository, tag),
            target: ImageRef::new(&self.destination.url, repository, tag),
        }
    }

    async fn login(&self, endpoint: &RegistryEndpoint, role: &str) -> Result<()> {
        let host = registry_host(&endpoint.url);
        let (Some(username), Some(password)) = (
            endpoint.credentials.username(),
            endpoint.credentials.password(),
        ) else {
            tracing::info!(registry = host, "no {} login configured, skipping", role);
            return Ok(());
        };

        tracing::info!(registry = host, username, "login to {} registry", role);
        self.engine
            .login(host, username, password)
            .await
            .inspect_err(|e| {
                tracing::error!(registry = host, error = %e, "unable to login to {} registry", role)
            })
    }

    async fn matching_repositories(&self) -> Result<Vec<String>> {
        let catalog = self.source.list_repositories().await.inspect_err(|e| {
            tracing::error!(registry = self.source.url(), error = %e, "unable to get source catalog")
        })?;

        let repositories = self.filter.filter(&catalog);
        tracing::info!(
            total = catalog.len(),
            matched = repositories.len(),
            include = self.filter.pattern(),
            "catalog filtered"
        );
        Ok(repositories)
    }

    /// Pull, tag, push, remove. Each step runs only if the previous succeeded.
    async fn copy(&self, job: &CopyJob) -> std::result::Result<(), CopyFailure> {
        let fail = |step: CopyStep, error: RegcopyError| CopyFailure {
            job: job.clone(),
            step,
            error: error.to_string(),
        };

        tracing::info!("pull {}", job.source);
        self.engine
            .pull(&job.source)
            .await
            .map_err(|e| fail(CopyStep::Pull, e))?;

        tracing::info!("tag {} to {}", job.source, job.target);
        if let Err(e) = self.engine.tag(&job.source, &job.target).await {
            self.cleanup(&[&job.source]).await;
            return Err(fail(CopyStep::Tag, e));
        }

        tracing::info!("push {}", job.target);
        if let Err(e) = self.engine.push(&job.target).await {
            self.cleanup(&[&job.source, &job.target]).await;
            return Err(fail(CopyStep::Push, e));
        }

        tracing::info!("remove {} and {}", job.source, job.target);
        self.engine
            .remove(&[&job.source, &job.target])
            .await
            .map_err(|e| fail(CopyStep::Remove, e))
    }

    /// Removes images left behind by a failed copy, if enabled.
    async fn cleanup(&self, images: &[&ImageRef]) {
        if !self.cleanup_on_failure {
            return;
        }
        if let Err(e) = self.engine.remove(images).await {
            tracing::warn!(error = %e, "cleanup after failed copy did not complete");
        }
    }
}
