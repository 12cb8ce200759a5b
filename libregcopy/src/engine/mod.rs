//! Container engine invocation.
//!
//! Images are moved by shelling out to a docker-compatible CLI. Each operation
//! is a single process run to completion; success means the process exited
//! with status zero. Output is inherited rather than captured, and no timeout
//! is applied.
//!
//! | operation | command line                                        |
//! |-----------|-----------------------------------------------------|
//! | login     | `<exe> login --username U --password P URL`         |
//! | pull      | `<exe> image pull -q NAME`                          |
//! | tag       | `<exe> image tag SRC DST`                           |
//! | push      | `<exe> image push NAME`                             |
//! | remove    | `<exe> image rm NAME...`                            |

use crate::error::{RegcopyError, Result};
use crate::reference::ImageRef;
use tokio::process::Command;


/// Operations regcopy needs from a container engine.
///
/// [`ProcessEngine`] is the real implementation; the orchestrator only
/// depends on this trait.
#[allow(async_fn_in_trait)]
pub trait Engine {
    /// Authenticates the engine against a registry.
    async fn login(&self, url: &str, username: &str, password: &str) -> Result<()>;

    /// Pulls an image into the local engine.
    async fn pull(&self, image: &ImageRef) -> Result<()>;

    /// Adds `target` as another name for the local image `source`.
    async fn tag(&self, source: &ImageRef, target: &ImageRef) -> Result<()>;

    /// Pushes a local image to its registry.
    async fn push(&self, image: &ImageRef) -> Result<()>;

    /// Removes local images.
    async fn remove(&self, images: &[&ImageRef]) -> Result<()>;
}

/// Engine backed by an external executable such as `docker` or `podman`.
#[derive(Debug, Clone)]
pub struct ProcessEngine {
    executable: String,
}

impl ProcessEngine {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }

    /// Runs the executable with `args` and waits for it to exit.
    ///
    /// `operation` names the command in errors and logs; `args` are never
    /// logged because they may contain a password.
    async fn run(&self, operation: &str, args: &[&str]) -> Result<()> {
        tracing::debug!(executable = %self.executable, operation, "running engine command");

        let status = Command::new(&self.executable)
            .args(args)
            .status()
            .await
            .map_err(|e| RegcopyError::engine_spawn(operation, e))?;

        if status.success() {
            Ok(())
        } else {
            Err(RegcopyError::engine_exit(operation, status.code()))
        }
    }
}

impl Engine for ProcessEngine {
    async fn login(&self, url: &str, username: &str, password: &str) -> Result<()> {
        self.run(
            "login",
            &["login", "--username", username, "--password", password, url],
        )
        .await
    }

    async fn pull(&self, image: &ImageRef) -> Result<()> {
        let image = image.to_string();
        self.run("image pull", &["image", "pull", "-q", &image]).await
    }

    async fn tag(&self, source: &ImageRef, target: &ImageRef) -> Result<()> {
        let source = source.to_string();
        let target = target.to_string();
        self.run("image tag", &["image", "tag", &source, &target])
            .await
    }

    async fn push(&self, image: &ImageRef) -> Result<()> {
        let image = image.to_string();
        self.run("image push", &["image", "push", &image]).await
    }

    async fn remove(&self, images: &[&ImageRef]) -> Result<()> {
        let names: Vec<String> = images.iter().map(|image| image.to_string()).collect();
        let mut args = vec!["image", "rm"];
        args.extend(names.iter().map(String::as_str));
        self.run("image rm", &args).await
    }
}
