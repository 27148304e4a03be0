//! Authentication module for token storage and permission checks.
//!
//! This module provides:
//! - `KeyValueStore`: the storage seam, with memory, file and keyring backends
//! - `SessionStore`: the single `"token"` slot plus the session record
//! - `AuthClient`: login/logout against the API and role checks
//!
//! Nothing here persists a token implicitly; `AuthClient::sign_in` is the
//! one call that both logs in and stores the result.

pub mod client;
pub mod permission;
pub mod session;
pub mod store;

pub use client::AuthClient;
pub use session::SessionStore;
pub use store::{FileStore, KeyValueStore, KeyringStore, MemoryStore};
