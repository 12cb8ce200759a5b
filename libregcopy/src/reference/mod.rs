//! Image references handed to the container engine.
//!
//! The engine addresses images as `host[:port]/repository:tag`. Registry
//! addresses in the configuration may carry a scheme or a trailing slash, so
//! both are stripped here before a reference is rendered.

use std::fmt;


/// Returns the `host[:port][/path]` part of a registry address.
///
/// # Examples
///
/// ```
/// use libregcopy::reference::registry_host;
///
/// assert_eq!(registry_host("https://registry.example.com/"), "registry.example.com");
/// assert_eq!(registry_host("localhost:5000"), "localhost:5000");
/// ```
pub fn registry_host(url: &str) -> &str {
    let url = url.trim();
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    url.trim_end_matches('/')
}

/// A fully qualified `registry/repository:tag` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageRef {
    registry: String,
    repository: String,
    tag: String,
}

impl ImageRef {
    pub fn new(registry_url: &str, repository: &str, tag: &str) -> Self {
        Self {
            registry: registry_host(registry_url).to_string(),
            repository: repository.to_string(),
            tag: tag.to_string(),
        }
    }

    /// Returns the registry part of the reference.
    pub fn registry(&self) -> &str {
        &self.registry
    }

    /// Returns the repository part of the reference.
    pub fn repository(&self) -> &str {
        &self.repository
    }

    /// Returns the tag part of the reference.
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.registry, self.repository, self.tag)
    }
}
