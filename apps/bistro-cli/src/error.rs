//! # CLI Error Type
//!
//! What the operator sees when a command fails.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the CLI                                │
//! │                                                                         │
//! │  bistro checkout                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Session::checkout() ── SessionError::Core(EmptyCart) ──┐              │
//! │         │                                               │              │
//! │  Database::new()  ───── DbError::ConnectionFailed ──────┤              │
//! │         │                                               ▼              │
//! │  AppConfig::load() ──── toml::de::Error ─────────────► AppError        │
//! │                                                         │              │
//! │                                                         ▼              │
//! │                              stderr: "error: Your cart is empty"       │
//! │                              exit code 1                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bistro_core::{CoreError, ValidationError};
use bistro_db::{DbError, SessionError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file or environment value is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The command line could not be understood.
    ///
    /// ## When This Occurs
    /// - Unknown command or subcommand
    /// - Missing argument (`cart add` without an item)
    /// - Malformed value (`report 2026-13`, `menu add Tea abc`)
    #[error("{0}\nRun 'bistro --help' for usage.")]
    Usage(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AppError {
    pub fn usage(message: impl Into<String>) -> Self {
        AppError::Usage(message.into())
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Session(SessionError::Db(err))
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        AppError::Session(SessionError::Core(err))
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Session(SessionError::Core(CoreError::Validation(err)))
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cart_message_is_operator_friendly() {
        let err: AppError = CoreError::EmptyCart.into();
        assert_eq!(err.to_string(), "Your cart is empty");
    }

    #[test]
    fn test_usage_points_at_help() {
        let err = AppError::usage("Unknown command 'pay'");
        assert!(err.to_string().starts_with("Unknown command 'pay'"));
        assert!(err.to_string().contains("bistro --help"));
    }
}
