//! Authentication error types.

use thiserror::Error;

use bmart_core::{EmailError, PhoneError};

use crate::storage::StorageError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Form input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Email already registered.
    #[error("An account with this email already exists")]
    UserAlreadyExists,

    /// No user with this email and password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Roster or session storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Roster or session could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Form validation failures. The display text is shown to the user as is.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields")]
    MissingRequiredFields,

    #[error("Please fill in all fields")]
    MissingCredentials,

    #[error("Name must be at least 2 characters long")]
    NameTooShort,

    #[error("Please enter a valid email address")]
    InvalidEmail(#[source] EmailError),

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please enter a valid phone number")]
    InvalidPhone(#[source] PhoneError),
}
