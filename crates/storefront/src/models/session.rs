//! Session-related types.
//!
//! The logged-in identity and the storage keys for everything persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bmart_core::{Email, UserId};

use super::User;

/// Persisted identity of the logged-in user.
///
/// A subset of [`User`] without the password or order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub phone: String,
    pub join_date: DateTime<Utc>,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            join_date: user.join_date,
        }
    }
}

/// Storage keys.
pub mod keys {
    /// Cart lines.
    pub const CART: &str = "bMartCart";

    /// Registered users.
    pub const USERS: &str = "bMartUsers";

    /// Current logged-in user.
    pub const CURRENT_USER: &str = "currentUser";
}
