//! Data models for the login API.
//!
//! - `credentials`: the username/password pair sent on login
//! - `user`: the login response and the session record persisted from it

pub mod credentials;
pub mod user;

pub use credentials::{Credentials, CredentialsError};
pub use user::{Session, User};
