use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::models::Session;

use super::store::KeyValueStore;

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";

/// Key holding the JSON session record written at sign-in
pub const SESSION_KEY: &str = "session";

/// The single token slot, plus the session record that goes with it.
pub struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Write the token, replacing whatever was there
    pub fn save(&self, token: &str) -> Result<()> {
        self.store
            .set(TOKEN_KEY, token)
            .context("Failed to save token")
    }

    /// Read the stored token
    pub fn load(&self) -> Result<Option<String>> {
        self.store.get(TOKEN_KEY).context("Failed to load token")
    }

    /// Remove the token and session record. Safe to call when already empty.
    pub fn clear(&self) -> Result<()> {
        self.store
            .remove(TOKEN_KEY)
            .context("Failed to remove token")?;
        self.store
            .remove(SESSION_KEY)
            .context("Failed to remove session record")?;
        debug!("Session cleared");
        Ok(())
    }

    /// Save the token together with its session record
    pub fn save_session(&self, session: &Session) -> Result<()> {
        let record = serde_json::to_string(session)?;
        self.save(&session.token)?;
        self.store
            .set(SESSION_KEY, &record)
            .context("Failed to save session record")
    }

    /// Session record for the currently stored token, if there is one.
    /// A record left behind by a later bare `save` does not count.
    pub fn load_session(&self) -> Result<Option<Session>> {
        let Some(token) = self.load()? else {
            return Ok(None);
        };
        let Some(record) = self
            .store
            .get(SESSION_KEY)
            .context("Failed to load session record")?
        else {
            return Ok(None);
        };

        match serde_json::from_str::<Session>(&record) {
            Ok(session) if session.token == token => Ok(Some(session)),
            Ok(_) => {
                debug!("Session record belongs to a different token");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Ignoring unparseable session record");
                Ok(None)
            }
        }
    }

    pub fn backend(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStore;
    use crate::models::User;

    fn admin_session(token: &str) -> Session {
        Session::from_user(&User {
            id: 1,
            username: "testuser".to_string(),
            role: "admin".to_string(),
            token: token.to_string(),
        })
    }

    #[test]
    fn test_save_then_load() {
        let sessions = SessionStore::new(MemoryStore::new());
        sessions.save("testToken").unwrap();
        assert_eq!(sessions.load().unwrap().as_deref(), Some("testToken"));
    }

    #[test]
    fn test_save_overwrites() {
        let sessions = SessionStore::new(MemoryStore::new());
        sessions.save("first").unwrap();
        sessions.save("second").unwrap();
        assert_eq!(sessions.load().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_load_unset_is_none() {
        let sessions = SessionStore::new(MemoryStore::new());
        assert_eq!(sessions.load().unwrap(), None);
    }

    #[test]
    fn test_clear_then_load() {
        let sessions = SessionStore::new(MemoryStore::new());
        sessions.save("testToken").unwrap();
        sessions.clear().unwrap();
        assert_eq!(sessions.load().unwrap(), None);
        // Second clear is a no-op
        sessions.clear().unwrap();
        assert_eq!(sessions.load().unwrap(), None);
    }

    #[test]
    fn test_save_session_round_trip() {
        let sessions = SessionStore::new(MemoryStore::new());
        let session = admin_session("mockToken");
        sessions.save_session(&session).unwrap();

        assert_eq!(sessions.load().unwrap().as_deref(), Some("mockToken"));
        assert_eq!(sessions.load_session().unwrap(), Some(session));
    }

    #[test]
    fn test_session_record_ignored_after_token_overwrite() {
        let sessions = SessionStore::new(MemoryStore::new());
        sessions.save_session(&admin_session("mockToken")).unwrap();
        sessions.save("otherToken").unwrap();
        assert_eq!(sessions.load_session().unwrap(), None);
    }

    #[test]
    fn test_clear_removes_session_record() {
        let sessions = SessionStore::new(MemoryStore::new());
        sessions.save_session(&admin_session("mockToken")).unwrap();
        sessions.clear().unwrap();
        assert_eq!(sessions.backend().get(SESSION_KEY).unwrap(), None);
        assert_eq!(sessions.load_session().unwrap(), None);
    }

    #[test]
    fn test_unparseable_session_record() {
        let sessions = SessionStore::new(MemoryStore::new());
        sessions.save("mockToken").unwrap();
        sessions.backend().set(SESSION_KEY, "{not json").unwrap();
        assert_eq!(sessions.load_session().unwrap(), None);
    }

    #[test]
    fn test_clear_and_save_over_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = crate::auth::FileStore::in_dir(dir.path());
        std::fs::write(store.path(), "garbage").unwrap();
        let sessions = SessionStore::new(store);

        sessions.clear().unwrap();
        assert_eq!(sessions.load().unwrap(), None);

        std::fs::write(sessions.backend().path(), "garbage").unwrap();
        sessions.save("newToken").unwrap();
        assert_eq!(sessions.load().unwrap().as_deref(), Some("newToken"));
    }

    #[test]
    fn test_keyring_backend_round_trip() {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        let sessions = SessionStore::new(crate::auth::KeyringStore::with_service("loginkit-session-test"));

        sessions.save_session(&admin_session("mockToken")).unwrap();
        assert_eq!(sessions.load().unwrap().as_deref(), Some("mockToken"));
        assert_eq!(sessions.load_session().unwrap().map(|s| s.role).as_deref(), Some("admin"));

        sessions.clear().unwrap();
        assert_eq!(sessions.load().unwrap(), None);
    }
}
