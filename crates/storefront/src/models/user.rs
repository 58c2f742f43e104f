//! User domain types.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use bmart_core::{Email, UserId};

/// A registered storefront user.
///
/// The password is kept in plain text and compared verbatim. This roster is
/// demo data living in local storage, not an account system.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Creation time in epoch milliseconds.
    pub id: UserId,
    pub name: String,
    pub email: Email,
    pub password: String,
    /// May be empty.
    #[serde(default)]
    pub phone: String,
    pub join_date: DateTime<Utc>,
    #[serde(default)]
    pub orders: Vec<serde_json::Value>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .field("join_date", &self.join_date)
            .field("orders", &self.orders.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let user = User {
            id: UserId::new(1),
            name: "Demo User".to_owned(),
            email: Email::parse("demo@bmart.com").unwrap(),
            password: "password123".to_owned(),
            phone: String::new(),
            join_date: Utc::now(),
            orders: Vec::new(),
        };
        let debug = format!("{user:?}");
        assert!(!debug.contains("password123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_json_field_names() {
        let json = serde_json::json!({
            "id": 1_700_000_000_000_i64,
            "name": "Ana",
            "email": "ana@example.com",
            "password": "secret1",
            "joinDate": "2024-01-01T00:00:00Z"
        });
        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.phone, "");
        assert!(user.orders.is_empty());
        assert_eq!(user.id.as_i64(), 1_700_000_000_000);
    }
}
