//! HTTP client for registry communication.
//!
//! A thin client built on reqwest covering the two read-only endpoints of the
//! registry v2 API that a copy run needs: the repository catalog and the tag
//! list of a repository. Responses other than `200 OK` and bodies that do not
//! have the expected JSON shape are returned as errors. Nothing is retried and
//! pagination links are not followed.

use crate::auth::Credentials;
use crate::error::{RegcopyError, Result};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;


/// Response from the catalog API endpoint.
#[derive(Debug, Deserialize)]
struct CatalogResponse {
    /// List of repository names
    repositories: Vec<String>,
}

/// Response from the tags list API endpoint.
#[derive(Debug, Deserialize)]
struct TagsResponse {
    /// Repository name
    name: String,
    /// List of tag names; registries send `null` for a repository without tags
    tags: Option<Vec<String>>,
}

/// Configuration for the HTTP client.
///
/// # Examples
///
/// ```
/// use libregcopy::client::ClientConfig;
///
/// let config = ClientConfig::new().with_timeout(60);
/// assert_eq!(config.timeout_seconds, 60);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Request timeout in seconds; 0 (the default) means no timeout
    pub timeout_seconds: u64,
}

impl ClientConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout in seconds. 0 disables it.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

/// HTTP client for one registry.
#[derive(Debug, Clone)]
pub struct Client {
    /// The underlying HTTP client
    http_client: ReqwestClient,
    /// Base registry URL (e.g., "https://registry.example.com")
    registry_url: String,
    timeout_seconds: u64,
}

impl Client {
    /// Creates a new client for the specified registry URL with default configuration.
    ///
    /// A URL without a scheme is assumed to be served over HTTPS.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregcopy::client::Client;
    ///
    /// let client = Client::new("registry.example.com").unwrap();
    /// assert_eq!(client.registry_url(), "https://registry.example.com");
    /// ```
    pub fn new(registry_url: &str) -> Result<Self> {
        Self::with_config(registry_url, ClientConfig::default())
    }

    /// Creates a new client for the specified registry URL with custom configuration.
    pub fn with_config(registry_url: &str, config: ClientConfig) -> Result<Self> {
        let normalized_url = Self::normalize_url(registry_url)?;

        let mut builder = ReqwestClient::builder();
        if config.timeout_seconds > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout_seconds));
        }
        let http_client = builder
            .build()
            .map_err(|e| RegcopyError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            http_client,
            registry_url: normalized_url,
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Normalizes a registry URL by ensuring it has a scheme and removing trailing slashes.
    fn normalize_url(url: &str) -> Result<String> {
        let url = url.trim();

        if url.is_empty() {
            return Err(RegcopyError::validation("Registry URL cannot be empty"));
        }

        let url = if !url.starts_with("http://") && !url.starts_with("https://") {
            format!("https://{}", url)
        } else {
            url.to_string()
        };

        Ok(url.trim_end_matches('/').to_string())
    }

    /// Returns the base registry URL.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    /// Fetches the catalog of repositories from the registry.
    ///
    /// ```text
    /// GET /v2/_catalog
    /// ```
    ///
    /// Only the first page is read; registries that paginate the catalog
    /// will report a truncated list.
    pub async fn fetch_catalog(&self, credentials: Option<&Credentials>) -> Result<Vec<String>> {
        let url = format!("{}/v2/_catalog", self.registry_url);
        tracing::debug!(%url, "fetching catalog");

        let response = self.get(&url, credentials).await?;
        let catalog: CatalogResponse = response.json().await.map_err(|e| {
            RegcopyError::validation_with_source(
                format!("Failed to parse catalog response from {}", self.registry_url),
                e,
            )
        })?;

        Ok(catalog.repositories)
    }

    /// Fetches the list of tags for a specific repository.
    ///
    /// ```text
    /// GET /v2/<name>/tags/list
    /// ```
    pub async fn fetch_tags(
        &self,
        repository: &str,
        credentials: Option<&Credentials>,
    ) -> Result<Vec<String>> {
        let url = format!("{}/v2/{}/tags/list", self.registry_url, repository);
        tracing::debug!(%url, "fetching tags");

        let response = self.get(&url, credentials).await?;
        let tags_response: TagsResponse = response.json().await.map_err(|e| {
            RegcopyError::validation_with_source(
                format!("Failed to parse tags response for {}", repository),
                e,
            )
        })?;

        if tags_response.name != repository {
            tracing::warn!(
                expected = repository,
                returned = %tags_response.name,
                "registry returned tags under a different repository name"
            );
        }

        Ok(tags_response.tags.unwrap_or_default())
    }

    async fn get(&self, url: &str, credentials: Option<&Credentials>) -> Result<Response> {
        let request = Self::authorize(self.http_client.get(url), credentials);

        let response = request
            .send()
            .await
            .map_err(|e| self.translate_reqwest_error(e))?;

        Self::check_response_status(response).await
    }

    fn authorize(request: RequestBuilder, credentials: Option<&Credentials>) -> RequestBuilder {
        match credentials.and_then(Credentials::to_header_value) {
            Some(header) => request.header(reqwest::header::AUTHORIZATION, header),
            None => request,
        }
    }

    /// Translates a reqwest error into a RegcopyError.
    fn translate_reqwest_error(&self, error: reqwest::Error) -> RegcopyError {
        let registry_url = &self.registry_url;
        if error.is_timeout() {
            RegcopyError::network(format!(
                "Request to {} timed out after {} seconds",
                registry_url, self.timeout_seconds
            ))
        } else if error.is_connect() {
            RegcopyError::network_with_source(
                format!("Failed to connect to registry at {}", registry_url),
                error,
            )
        } else {
            RegcopyError::network_with_source(
                format!("Network error communicating with {}", registry_url),
                error,
            )
        }
    }

    /// Checks the HTTP response status and translates errors to RegcopyError.
    ///
    /// Only `200 OK` is accepted.
    async fn check_response_status(response: Response) -> Result<Response> {
        let status = response.status();

        if status == StatusCode::OK {
            return Ok(response);
        }

        let url = response.url().to_string();
        let error_body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("(unable to read response body)"));

        match status {
            StatusCode::UNAUTHORIZED => Err(RegcopyError::authentication(
                format!("Authentication required for {}: {}", url, error_body),
                Some(401),
            )),
            StatusCode::FORBIDDEN => Err(RegcopyError::authentication(
                format!("Access forbidden for {}: {}", url, error_body),
                Some(403),
            )),
            StatusCode::NOT_FOUND => Err(RegcopyError::not_found("endpoint", url.as_str())),
            StatusCode::TOO_MANY_REQUESTS => Err(RegcopyError::rate_limit(format!(
                "Rate limit exceeded for {}",
                url
            ))),
            s if s.is_server_error() => Err(RegcopyError::server(
                format!("Server error from {}: {}", url, error_body),
                s.as_u16(),
            )),
            s => Err(RegcopyError::http(
                format!("{} from {}: {}", s, url, error_body),
                s.as_u16(),
            )),
        }
    }
}
