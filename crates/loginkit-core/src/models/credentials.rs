use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Maximum username length accepted from a login form
pub const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum password length accepted from a login form
pub const MAX_PASSWORD_LENGTH: usize = 128;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("Username and password required")]
    Missing,

    #[error("Username must be at most {MAX_USERNAME_LENGTH} characters")]
    UsernameTooLong,

    #[error("Password must be at most {MAX_PASSWORD_LENGTH} characters")]
    PasswordTooLong,

    #[error("Credentials may not contain control characters")]
    ControlCharacter,
}

/// Username/password pair for a single login attempt. Never persisted.
#[derive(Clone, Serialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Validate and build credentials. The username is trimmed; the password is taken as-is.
    pub fn new(username: &str, password: &str) -> Result<Self, CredentialsError> {
        let username = username.trim();

        if username.is_empty() || password.is_empty() {
            return Err(CredentialsError::Missing);
        }
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(CredentialsError::UsernameTooLong);
        }
        if password.chars().count() > MAX_PASSWORD_LENGTH {
            return Err(CredentialsError::PasswordTooLong);
        }
        if username.chars().chain(password.chars()).any(char::is_control) {
            return Err(CredentialsError::ControlCharacter);
        }

        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
