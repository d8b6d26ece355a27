//! Unified error type for the client library.
//!
//! Each module has its own error enum; this is the sum the binary surfaces
//! work with. Checkout flow failures never appear here - the flow recovers
//! locally and reports through its event sink instead.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Application-level error for the Tienda client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// An API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session state or persistence failed.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A local file operation failed (e.g., saving a downloaded document).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_module_errors_with_context() {
        let err = AppError::from(SessionError::NotAuthenticated);
        assert_eq!(err.to_string(), "Session error: not signed in");

        let err = AppError::from(ApiError::Status {
            status: 500,
            message: "boom".to_owned(),
        });
        assert_eq!(err.to_string(), "API error: API error (status 500): boom");
    }
}
