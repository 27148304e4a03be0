use tracing::{debug, error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::{Credentials, Session, User};

use super::permission::{role_from_token, role_matches};
use super::session::SessionStore;
use super::store::KeyValueStore;

/// Login, logout and role checks over an API client and a token store.
pub struct AuthClient<S> {
    api: ApiClient,
    sessions: SessionStore<S>,
}

impl<S: KeyValueStore> AuthClient<S> {
    pub fn new(api: ApiClient, store: S) -> Self {
        Self {
            api,
            sessions: SessionStore::new(store),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn sessions(&self) -> &SessionStore<S> {
        &self.sessions
    }

    /// Send credentials and return the server's user record. Stores nothing.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, ApiError> {
        self.api.login(credentials).await
    }

    /// Notify the server. The stored token, if any, goes along as a bearer token.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let token = self.stored_token();
        self.api.logout(token.as_deref()).await
    }

    /// Log in and persist the resulting session.
    pub async fn sign_in(&self, credentials: &Credentials) -> anyhow::Result<User> {
        let user = self.login(credentials).await?;
        self.sessions.save_session(&Session::from_user(&user))?;
        info!(username = %user.username, role = %user.role, "Signed in");
        Ok(user)
    }

    /// Log out and clear the store. The store is cleared even when the
    /// request fails; the request error is still returned.
    pub async fn sign_out(&self) -> anyhow::Result<()> {
        let result = self.logout().await;
        if let Err(clear_error) = self.sessions.clear() {
            return Err(match result {
                Err(request_error) => {
                    error!(error = %request_error, "Logout request failed and local session could not be cleared");
                    clear_error.context(format!("Logout request also failed: {}", request_error))
                }
                Ok(()) => clear_error,
            });
        }
        match result {
            Ok(()) => {
                info!("Signed out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Logout request failed; local session cleared anyway");
                Err(e.into())
            }
        }
    }

    /// Stored session record, if it matches the stored token.
    pub fn current_session(&self) -> anyhow::Result<Option<Session>> {
        self.sessions.load_session()
    }

    /// True iff the stored token resolves to exactly `required_role`.
    /// Missing tokens, store failures and undecodable tokens all mean `false`.
    pub fn has_permission(&self, required_role: &str) -> bool {
        let Some(token) = self.stored_token() else {
            debug!(required_role, "No token stored");
            return false;
        };

        let role = role_from_token(&token).or_else(|| match self.sessions.load_session() {
            Ok(session) => session.map(|s| s.role),
            Err(e) => {
                warn!(error = %e, "Failed to read session record");
                None
            }
        });

        let allowed = role_matches(role.as_deref(), required_role);
        debug!(required_role, allowed, "Permission check");
        allowed
    }

    fn stored_token(&self) -> Option<String> {
        match self.sessions.load() {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }
}
