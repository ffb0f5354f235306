//! Error types for trends operations.
//!
//! This module defines [`TrendsError`] which covers all error cases that can occur
//! when validating requests, fetching provider tables, or caching results.

use thiserror::Error;

/// Errors that can occur during trends operations.
#[derive(Error, Debug)]
pub enum TrendsError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by the upstream provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Too many keywords were supplied to a batch comparison.
    #[error("Maximum {max} keywords allowed for comparison, got {got}")]
    TooManyKeywords {
        /// The maximum number of keywords accepted.
        max: usize,
        /// The number of keywords supplied.
        got: usize,
    },

    /// A batch operation failed on one keyword.
    #[error("Failed to fetch trends for {keyword}: {source}")]
    Keyword {
        /// The keyword whose fetch failed.
        keyword: String,
        /// The underlying failure.
        #[source]
        source: Box<TrendsError>,
    },

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl TrendsError {
    /// Returns true if this error was caused by the caller's input.
    ///
    /// Batch failures are classified by their underlying cause.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::InvalidParameter(_) | Self::TooManyKeywords { .. } => true,
            Self::Keyword { source, .. } => source.is_client_error(),
            _ => false,
        }
    }
}

/// Result type alias using [`TrendsError`].
pub type Result<T> = std::result::Result<T, TrendsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_keywords_message_cites_maximum() {
        let err = TrendsError::TooManyKeywords { max: 5, got: 6 };
        assert_eq!(
            err.to_string(),
            "Maximum 5 keywords allowed for comparison, got 6"
        );
        assert!(err.is_client_error());
    }

    #[test]
    fn test_keyword_error_classification() {
        let upstream = TrendsError::Keyword {
            keyword: "fiber".to_string(),
            source: Box::new(TrendsError::Network("timeout".to_string())),
        };
        assert!(!upstream.is_client_error());
        assert_eq!(
            upstream.to_string(),
            "Failed to fetch trends for fiber: Network error: timeout"
        );

        let invalid = TrendsError::Keyword {
            keyword: String::new(),
            source: Box::new(TrendsError::InvalidParameter("empty".to_string())),
        };
        assert!(invalid.is_client_error());
    }

    #[test]
    fn test_upstream_errors_are_not_client_errors() {
        let rate_limited = TrendsError::RateLimited {
            provider: "Google Trends".to_string(),
            retry_after: None,
        };
        assert!(!rate_limited.is_client_error());
        assert!(!TrendsError::Parse("bad table".to_string()).is_client_error());
        assert!(!TrendsError::Other("boom".to_string()).is_client_error());
    }
}
