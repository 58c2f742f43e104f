//! Unified error handling.
//!
//! Each concern has its own error enum. `AppError` wraps the ones that reach
//! callers embedding the whole storefront, and [`AppError::user_message`] gives the
//! text that is safe to show a shopper.

use thiserror::Error;

use crate::cart::CartError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Durable storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),
}

impl AppError {
    /// Message for display to the shopper. Internal details are hidden.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) | Self::Storage(_) => "Something went wrong".to_string(),
            Self::Cart(err) => match err {
                CartError::EmptyCart | CartError::LoginRequired => err.to_string(),
                CartError::Storage(_) | CartError::Serialize(_) => {
                    "Could not update your cart".to_string()
                }
            },
            Self::Auth(err) => match err {
                AuthError::Validation(_)
                | AuthError::UserAlreadyExists
                | AuthError::InvalidCredentials => err.to_string(),
                AuthError::Storage(_) | AuthError::Serialize(_) => {
                    "Authentication error".to_string()
                }
            },
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
