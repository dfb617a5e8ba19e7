//! Error types for the Huddle domain.
//!
//! The catalog, prompt layer and provider each get an enum; [`Error`] wraps
//! them for callers that cross more than one.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all Huddle operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Catalog errors ---
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    // --- Prompt errors ---
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Shorthand for results carrying [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures while reading the activity corpus.
///
/// The loader logs these and degrades to an empty corpus; they never
/// escape `ActivityCatalog::load`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read activity corpus at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to parse activity corpus at {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum PromptError {
    #[error("Prompt file not found: {name} ({reason})")]
    NotFound { name: String, reason: String },
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Provider returned no content")]
    EmptyResponse,

    #[error("Network error: {0}")]
    Network(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn prompt_error_names_the_fragment() {
        let err = Error::from(PromptError::NotFound {
            name: "shared-context".into(),
            reason: "No such file or directory".into(),
        });
        assert!(err.to_string().contains("shared-context"));
        assert!(err.to_string().starts_with("Prompt error"));
    }

    #[test]
    fn catalog_error_includes_path() {
        let err = CatalogError::Parse {
            path: PathBuf::from("/data/activities.json"),
            reason: "expected value at line 1".into(),
        };
        assert!(err.to_string().contains("/data/activities.json"));
    }
}
