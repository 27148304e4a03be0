use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Login response body: `{id, username, role, token}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: String,
    pub token: String,
}

/// Session record kept next to the token after a sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub role: String,
    pub user_id: i64,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn from_user(user: &User) -> Self {
        Self {
            token: user.token.clone(),
            role: user.role.clone(),
            user_id: user.id,
            username: user.username.clone(),
            created_at: Utc::now(),
        }
    }

    /// Human-readable age, e.g. "5m ago"
    pub fn age_display(&self) -> String {
        let minutes = (Utc::now() - self.created_at).num_minutes();
        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 60 * 24 {
            format!("{}h ago", minutes / 60)
        } else {
            format!("{}d ago", minutes / (60 * 24))
        }
    }
}
