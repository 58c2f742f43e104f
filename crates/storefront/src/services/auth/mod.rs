//! Authentication service.
//!
//! Registration, login and logout against a user roster kept in key/value
//! storage, plus the persisted session record.
//!
//! This is demo-grade account handling: passwords are stored in plain text
//! and compared verbatim. Form types carry passwords as [`SecretString`] so
//! they stay out of logs and `Debug` output.

mod error;
mod password;

pub use error::{AuthError, ValidationError};
pub use password::{PasswordStrength, password_strength};

use std::sync::Arc;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use tracing::{info, instrument, warn};

use bmart_core::{Email, Phone, UserId};

use crate::models::session::keys;
use crate::models::{CurrentUser, User};
use crate::notify::{Notification, Notifier};
use crate::storage::KeyValueStore;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Minimum display name length.
const MIN_NAME_LENGTH: usize = 2;

/// Registration form input.
#[derive(Debug)]
pub struct RegistrationForm {
    pub name: String,
    pub email: String,
    pub password: SecretString,
    pub confirm_password: SecretString,
    /// Optional; empty when not given.
    pub phone: String,
}

/// Login form input.
#[derive(Debug)]
pub struct LoginForm {
    pub email: String,
    pub password: SecretString,
}

/// The account seeded into an empty roster.
fn demo_user(now: DateTime<Utc>) -> Result<User, AuthError> {
    let email = Email::parse("demo@bmart.com")
        .map_err(|e| AuthError::Validation(ValidationError::InvalidEmail(e)))?;
    Ok(User {
        id: UserId::new(1),
        name: "Demo User".to_owned(),
        email,
        password: "password123".to_owned(),
        phone: "+1234567890".to_owned(),
        join_date: now,
        orders: Vec::new(),
    })
}

/// Authentication service.
///
/// Holds no state of its own: the roster and the session are read from
/// storage on every call.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Seed the demo account if the roster is absent, corrupt or empty.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the roster cannot be read or written.
    pub fn bootstrap(&self) -> Result<(), AuthError> {
        self.users().map(|_| ())
    }

    /// All registered users, seeding the demo account first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the roster cannot be read or written.
    pub fn users(&self) -> Result<Vec<User>, AuthError> {
        let stored = match self.store.get(keys::USERS)? {
            Some(raw) => serde_json::from_str::<Vec<User>>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored user roster is corrupt, reseeding");
                Vec::new()
            }),
            None => Vec::new(),
        };

        if !stored.is_empty() {
            return Ok(stored);
        }

        let users = vec![demo_user(Utc::now())?];
        self.save_users(&users)?;
        info!("Seeded demo user");
        Ok(users)
    }

    // =========================================================================
    // Registration / Login
    // =========================================================================

    /// Register a new user and log them in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for invalid input,
    /// [`AuthError::UserAlreadyExists`] if the email is taken, or a storage
    /// error.
    #[instrument(skip_all)]
    pub fn register(&self, form: &RegistrationForm) -> Result<CurrentUser, AuthError> {
        let name = form.name.trim();
        let email = form.email.trim();
        let phone = form.phone.trim();
        let password = form.password.expose_secret();
        let confirm = form.confirm_password.expose_secret();

        if name.is_empty() || email.is_empty() || password.is_empty() || confirm.is_empty() {
            return Err(ValidationError::MissingRequiredFields.into());
        }
        if name.chars().count() < MIN_NAME_LENGTH {
            return Err(ValidationError::NameTooShort.into());
        }
        let email = Email::parse(email).map_err(ValidationError::InvalidEmail)?;
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(ValidationError::PasswordTooShort.into());
        }
        if password != confirm {
            return Err(ValidationError::PasswordMismatch.into());
        }
        if !phone.is_empty() {
            Phone::parse(phone).map_err(ValidationError::InvalidPhone)?;
        }

        let mut users = self.users()?;
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::UserAlreadyExists);
        }

        let now = Utc::now();
        let user = User {
            id: next_user_id(&users, now),
            name: name.to_owned(),
            email,
            password: password.to_owned(),
            phone: phone.to_owned(),
            join_date: now,
            orders: Vec::new(),
        };
        let session = CurrentUser::from(&user);
        users.push(user);
        self.save_users(&users)?;
        self.save_session(&session)?;

        info!(user_id = %session.id, "User registered");
        self.notifier.notify(Notification::success(format!(
            "Account created successfully! Welcome to B-Mart, {}!",
            session.name
        )));
        Ok(session)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for missing or malformed input,
    /// [`AuthError::InvalidCredentials`] if no user matches, or a storage
    /// error.
    #[instrument(skip_all)]
    pub fn login(&self, form: &LoginForm) -> Result<CurrentUser, AuthError> {
        let email = form.email.trim();
        let password = form.password.expose_secret();

        if email.is_empty() || password.is_empty() {
            return Err(ValidationError::MissingCredentials.into());
        }
        let email = Email::parse(email).map_err(ValidationError::InvalidEmail)?;

        let users = self.users()?;
        let user = users
            .iter()
            .find(|u| u.email == email && u.password == password)
            .ok_or(AuthError::InvalidCredentials)?;

        let session = CurrentUser::from(user);
        self.save_session(&session)?;

        info!(user_id = %session.id, "User logged in");
        self.notifier.notify(Notification::success(format!(
            "Welcome back, {}!",
            session.name
        )));
        Ok(session)
    }

    /// Clear the session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Storage`] if the session record cannot be removed.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(keys::CURRENT_USER)?;
        info!("User logged out");
        self.notifier
            .notify(Notification::info("You have been logged out successfully"));
        Ok(())
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// The logged-in user, if any. A corrupt session record is discarded.
    #[must_use]
    pub fn current_user(&self) -> Option<CurrentUser> {
        let raw = match self.store.get(keys::CURRENT_USER) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read session");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Discarding corrupt session record");
                if let Err(e) = self.store.remove(keys::CURRENT_USER) {
                    warn!(error = %e, "Failed to remove corrupt session record");
                }
                None
            }
        }
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.current_user().is_some()
    }

    fn save_users(&self, users: &[User]) -> Result<(), AuthError> {
        let json = serde_json::to_string(users)?;
        self.store.set(keys::USERS, &json)?;
        Ok(())
    }

    fn save_session(&self, session: &CurrentUser) -> Result<(), AuthError> {
        let json = serde_json::to_string(session)?;
        self.store.set(keys::CURRENT_USER, &json)?;
        Ok(())
    }
}

/// Creation time in epoch millis, bumped past any existing id.
fn next_user_id(users: &[User], now: DateTime<Utc>) -> UserId {
    let after_existing = users
        .iter()
        .map(|u| u.id.as_i64().saturating_add(1))
        .max()
        .unwrap_or(0);
    UserId::new(now.timestamp_millis().max(after_existing))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::notify::RecordingNotifier;
    use crate::storage::MemoryStore;

    fn service() -> (AuthService, Arc<MemoryStore>, Arc<RecordingNotifier>) {
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let auth = AuthService::new(store.clone(), notifier.clone());
        (auth, store, notifier)
    }

    fn form(name: &str, email: &str, password: &str, confirm: &str, phone: &str) -> RegistrationForm {
        RegistrationForm {
            name: name.to_owned(),
            email: email.to_owned(),
            password: SecretString::from(password),
            confirm_password: SecretString::from(confirm),
            phone: phone.to_owned(),
        }
    }

    fn login_form(email: &str, password: &str) -> LoginForm {
        LoginForm {
            email: email.to_owned(),
            password: SecretString::from(password),
        }
    }

    #[test]
    fn test_bootstrap_seeds_demo_user() {
        let (auth, store, _) = service();
        auth.bootstrap().unwrap();

        let users = auth.users().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].email.as_str(), "demo@bmart.com");
        assert_eq!(users[0].id, UserId::new(1));
        assert!(store.get(keys::USERS).unwrap().is_some());
    }

    #[test]
    fn test_corrupt_roster_is_reseeded() {
        let (auth, store, _) = service();
        store.set(keys::USERS, "not json").unwrap();
        assert_eq!(auth.users().unwrap().len(), 1);
    }

    #[test]
    fn test_demo_login() {
        let (auth, _, notifier) = service();
        let session = auth
            .login(&login_form(" demo@bmart.com ", "password123"))
            .unwrap();
        assert_eq!(session.name, "Demo User");
        assert_eq!(session.phone, "+1234567890");
        assert!(auth.is_logged_in());
        assert_eq!(
            notifier.last().unwrap().message,
            "Welcome back, Demo User!"
        );
    }

    #[test]
    fn test_login_failures() {
        let (auth, _, _) = service();
        assert!(matches!(
            auth.login(&login_form("demo@bmart.com", "wrong-password")),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(&login_form("Demo@bmart.com", "password123")),
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login(&login_form("", "password123")),
            Err(AuthError::Validation(ValidationError::MissingCredentials))
        ));
        assert!(matches!(
            auth.login(&login_form("demo", "password123")),
            Err(AuthError::Validation(ValidationError::InvalidEmail(_)))
        ));
        assert!(!auth.is_logged_in());
    }

    #[test]
    fn test_register_and_login() {
        let (auth, _, _) = service();
        let session = auth
            .register(&form(" Ana Lima ", "ana@example.com", "s3cret!", "s3cret!", ""))
            .unwrap();
        assert_eq!(session.name, "Ana Lima");
        assert_eq!(auth.current_user(), Some(session.clone()));
        assert_eq!(auth.users().unwrap().len(), 2);

        auth.logout().unwrap();
        assert!(!auth.is_logged_in());

        let again = auth
            .login(&login_form("ana@example.com", "s3cret!"))
            .unwrap();
        assert_eq!(again.id, session.id);
    }

    #[test]
    fn test_duplicate_email_leaves_roster_unchanged() {
        let (auth, _, _) = service();
        let before = auth.users().unwrap().len();
        assert!(matches!(
            auth.register(&form("Someone", "demo@bmart.com", "abcdef", "abcdef", "")),
            Err(AuthError::UserAlreadyExists)
        ));
        assert_eq!(auth.users().unwrap().len(), before);
        assert_eq!(
            AuthError::UserAlreadyExists.to_string(),
            "An account with this email already exists"
        );
    }

    #[test]
    fn test_register_validation() {
        let (auth, _, _) = service();
        let cases = [
            (form("", "a@b.co", "abcdef", "abcdef", ""), "Please fill in all required fields"),
            (form("A", "a@b.co", "abcdef", "abcdef", ""), "Name must be at least 2 characters long"),
            (form("Al", "a@b", "abcdef", "abcdef", ""), "Please enter a valid email address"),
            (form("Al", "a@b.co", "abc", "abc", ""), "Password must be at least 6 characters long"),
            (form("Al", "a@b.co", "abcdef", "abcdeg", ""), "Passwords do not match"),
            (form("Al", "a@b.co", "abcdef", "abcdef", "0123"), "Please enter a valid phone number"),
        ];
        for (input, message) in &cases {
            let err = auth.register(input).unwrap_err();
            assert!(matches!(err, AuthError::Validation(_)));
            assert_eq!(err.to_string(), *message);
        }
        assert_eq!(auth.users().unwrap().len(), 1);
    }

    #[test]
    fn test_register_accepts_formatted_phone() {
        let (auth, _, _) = service();
        let session = auth
            .register(&form("Bo", "bo@example.com", "abcdef", "abcdef", "(555) 123-4567"))
            .unwrap();
        assert_eq!(session.phone, "(555) 123-4567");
    }

    #[test]
    fn test_user_ids_stay_unique() {
        let (auth, _, _) = service();
        let a = auth
            .register(&form("Al", "al@example.com", "abcdef", "abcdef", ""))
            .unwrap();
        let b = auth
            .register(&form("Bo", "bo@example.com", "abcdef", "abcdef", ""))
            .unwrap();
        assert!(b.id > a.id);
    }

    #[test]
    fn test_corrupt_session_is_discarded() {
        let (auth, store, _) = service();
        store.set(keys::CURRENT_USER, "{broken").unwrap();
        assert_eq!(auth.current_user(), None);
        assert_eq!(store.get(keys::CURRENT_USER).unwrap(), None);
    }

    #[test]
    fn test_forms_do_not_leak_passwords() {
        let input = form("Al", "al@example.com", "hunter22", "hunter22", "");
        assert!(!format!("{input:?}").contains("hunter22"));
    }

    #[test]
    fn test_next_user_id_is_monotonic() {
        let now = Utc::now();
        let existing = vec![User {
            id: UserId::new(now.timestamp_millis() + 10),
            ..demo_user(now).unwrap()
        }];
        assert_eq!(
            next_user_id(&existing, now).as_i64(),
            now.timestamp_millis() + 11
        );
        assert_eq!(next_user_id(&[], now).as_i64(), now.timestamp_millis());
    }
}
