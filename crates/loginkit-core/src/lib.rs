//! loginkit core library.
//!
//! Client-side authentication for a web API: logging in and out, keeping the
//! issued token in a pluggable key-value store, and coarse role checks
//! against that token.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthClient, FileStore, KeyValueStore, KeyringStore, MemoryStore, SessionStore};
pub use config::{Config, StoreBackend};
pub use models::{Credentials, CredentialsError, Session, User};
