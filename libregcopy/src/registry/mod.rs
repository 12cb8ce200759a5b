//! Registry operations module.
//!
//! [`Registry`] pairs an HTTP [`Client`] with the credentials configured for
//! one registry and exposes the two read operations a copy run performs:
//! listing repositories and listing the tags of a repository.

use crate::auth::Credentials;
use crate::client::{Client, ClientConfig};
use crate::config::RegistryEndpoint;
use crate::error::Result;


/// Read-only view of one registry.
pub struct Registry {
    /// HTTP client for registry communication.
    client: Client,
    /// Credentials forwarded with every request.
    credentials: Credentials,
}

impl Registry {
    /// Creates a new `Registry` instance.
    pub fn new(client: Client, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Builds a registry for a configured endpoint.
    pub fn connect(endpoint: &RegistryEndpoint, config: ClientConfig) -> Result<Self> {
        let client = Client::with_config(&endpoint.url, config)?;
        Ok(Self::new(client, endpoint.credentials.clone()))
    }

    /// Base URL requests are sent to.
    pub fn url(&self) -> &str {
        self.client.registry_url()
    }

    /// Lists all repositories in the registry (catalog operation).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use libregcopy::auth::Credentials;
    /// # use libregcopy::client::Client;
    /// # use libregcopy::registry::Registry;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = Client::new("registry.example.com")?;
    /// let registry = Registry::new(client, Credentials::basic("user", "pass"));
    ///
    /// for repo in registry.list_repositories().await? {
    ///     println!("{}", repo);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list_repositories(&self) -> Result<Vec<String>> {
        self.client.fetch_catalog(Some(&self.credentials)).await
    }

    /// Lists all tags for a specific repository.
    pub async fn list_tags(&self, repository: &str) -> Result<Vec<String>> {
        self.client
            .fetch_tags(repository, Some(&self.credentials))
            .await
    }
}
