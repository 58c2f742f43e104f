//! Domain models for storefront accounts.

pub mod session;
pub mod user;

pub use session::CurrentUser;
pub use user::User;
