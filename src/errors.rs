use std::fmt;

/// Failures reported by a single provider adapter.
///
/// The two variants are handled differently upstream: `AuthFailure`
/// disables the provider for the remainder of the run, `Unavailable` is
/// skipped and retried on the next sweep.
#[derive(Debug)]
pub enum ProviderError {
    /// Invalid or expired credential reported by the provider.
    AuthFailure(String),
    /// Network error, timeout, or non-auth HTTP failure.
    Unavailable(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::AuthFailure(msg) => write!(f, "authorization failure: {}", msg),
            ProviderError::Unavailable(msg) => write!(f, "provider unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Unavailable(err.to_string())
    }
}

/// Configuration-class search failures; these abort the operation that
/// triggered them instead of being folded into an empty result.
#[derive(Debug)]
pub enum SearchError {
    /// Location name absent from the bounded lookup table.
    UnknownLocation(String),
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::UnknownLocation(name) => {
                write!(f, "unknown location: '{}' is not in the city table", name)
            }
        }
    }
}

impl std::error::Error for SearchError {}

/// Persistence-layer failures.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    /// Concurrent-writer conflict that survived the retry budget.
    Conflict(String),
    Pool(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "sqlite error: {}", e),
            StoreError::Conflict(msg) => write!(f, "write conflict: {}", msg),
            StoreError::Pool(msg) => write!(f, "connection pool error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Sqlite(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err)
    }
}
