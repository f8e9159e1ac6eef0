//! Error types for the data layer.
//!
//! All store failures are propagated via [`DbError`], which wraps the
//! underlying [`sqlx`] error. The in-memory backend never fails.

/// Errors that can occur in the data layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
