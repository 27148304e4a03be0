//! REST API client module for the login service.
//!
//! This module provides the `ApiClient` for the two calls the login
//! service exposes: a credential `POST` to the API root and a
//! `GET {API}/logout`.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
