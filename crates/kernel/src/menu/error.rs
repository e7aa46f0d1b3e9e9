//! Navigation error types.
//!
//! Lookup misses (unknown contexts, missing registry buckets, missing
//! auxiliary values) are never errors; they resolve to empty results.

use thiserror::Error;

/// Errors surfaced by navigation resolution and configuration.
#[derive(Debug, Error)]
pub enum NavError {
    /// A required collaborator or setting is missing or invalid.
    #[error("navigation configuration error: {0}")]
    Configuration(String),

    /// A provider failed while listing items.
    #[error("nav provider '{provider}' failed: {source}")]
    Provider {
        provider: String,
        #[source]
        source: Box<NavError>,
    },
}

impl NavError {
    pub fn configuration(message: impl Into<String>) -> Self {
        NavError::Configuration(message.into())
    }

    /// Attach the failing provider's name.
    pub fn in_provider(self, provider: &str) -> Self {
        match self {
            already @ NavError::Provider { .. } => already,
            other => NavError::Provider {
                provider: provider.to_string(),
                source: Box::new(other),
            },
        }
    }
}

/// Result type alias for navigation operations.
pub type NavResult<T> = Result<T, NavError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_wrapping_is_not_nested() {
        let err = NavError::configuration("no handler catalog").in_provider("handlers");
        let err = err.in_provider("outer");
        assert_eq!(
            err.to_string(),
            "nav provider 'handlers' failed: navigation configuration error: no handler catalog"
        );
    }
}
