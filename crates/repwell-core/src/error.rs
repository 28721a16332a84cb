//! Core error types for repwell-core.
//!
//! One thiserror hierarchy for the whole library: gateway transport errors,
//! session-load and session-lifecycle errors, and the storage/config errors
//! raised by the local database implementation.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for repwell-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Gateway transport errors
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Session load failed (fatal to the session)
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Session lifecycle errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors crossing the plan-gateway boundary.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The requested document does not exist
    #[error("Not found: {kind} '{id}'")]
    NotFound { kind: &'static str, id: String },

    /// The backing store failed
    #[error("Backend error: {0}")]
    Backend(String),
}

/// A session cannot be built without both the plan and the catalog.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to fetch plan '{id}': {source}")]
    Plan {
        id: String,
        #[source]
        source: GatewayError,
    },

    #[error("Failed to fetch exercise catalog: {source}")]
    Catalog {
        #[source]
        source: GatewayError,
    },
}

/// Session lifecycle errors.
///
/// `StatusSync` is best-effort and logged rather than surfaced; `Completion`
/// leaves the session started so the caller may retry.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session is not ready: {0}")]
    NotReady(&'static str),

    #[error("Failed to sync plan status: {source}")]
    StatusSync {
        #[source]
        source: GatewayError,
    },

    #[error("Failed to mark plan completed: {source}")]
    Completion {
        #[source]
        source: GatewayError,
    },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored row could not be decoded
    #[error("Corrupt row in {table}: {message}")]
    CorruptRow { table: &'static str, message: String },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        DatabaseError::QueryFailed(err.to_string())
    }
}

impl From<DatabaseError> for GatewayError {
    fn from(err: DatabaseError) -> Self {
        GatewayError::Backend(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_sync_reports_its_source() {
        let err = SessionError::StatusSync {
            source: GatewayError::Backend("offline".into()),
        };
        assert_eq!(
            err.to_string(),
            "Failed to sync plan status: Backend error: offline"
        );
    }

    #[test]
    fn gateway_errors_convert_into_core() {
        let err: CoreError = GatewayError::NotFound {
            kind: "plan",
            id: "p1".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Gateway error: Not found: plan 'p1'");
    }
}
