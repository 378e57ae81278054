//! Unified error types for Letterdesk Core infrastructure.

use thiserror::Error;

use crate::store::StoreError;

/// Errors raised while assembling core components.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    /// Key-value store could not be reached or initialized.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// HTTP client construction failed.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Result type alias for core operations.
pub type AppResult<T> = Result<T, AppError>;
