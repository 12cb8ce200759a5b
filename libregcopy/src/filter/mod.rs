//! Repository include filter.
//!
//! Repositories are selected with a regular expression matched anywhere in the
//! name (unanchored, case-sensitive). Anchor the pattern with `^`/`$` to match
//! whole names.

use crate::error::{RegcopyError, Result};
use regex::Regex;

#[cfg(test)]
mod tests;

/// Pattern used when no include pattern is configured.
pub const MATCH_ALL: &str = ".*";

/// Compiled include pattern.
#[derive(Debug, Clone)]
pub struct IncludeFilter {
    regex: Regex,
}

impl IncludeFilter {
    /// Compiles an include pattern.
    ///
    /// # Examples
    ///
    /// ```
    /// use libregcopy::filter::IncludeFilter;
    ///
    /// let filter = IncludeFilter::new("^team/").unwrap();
    /// assert!(filter.is_match("team/api"));
    /// assert!(!filter.is_match("other/team/api"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a validation error if the pattern is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            RegcopyError::validation_with_source(
                format!("Invalid include pattern '{}'", pattern),
                e,
            )
        })?;
        Ok(Self { regex })
    }

    /// The pattern this filter was compiled from.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, repository: &str) -> bool {
        self.regex.is_match(repository)
    }

    /// Keeps the matching names, preserving catalog order.
    pub fn filter<'a, I>(&self, catalog: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        catalog
            .into_iter()
            .filter(|name| self.is_match(name))
            .cloned()
            .collect()
    }
}

impl Default for IncludeFilter {
    fn default() -> Self {
        Self {
            regex: Regex::new(MATCH_ALL).expect("match-all pattern is valid"),
        }
    }
}
