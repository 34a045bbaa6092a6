use crate::models::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

/// Host-owned application password entry, without the hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub uuid: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub app_id: String,
    pub created: DateTime<Utc>,
    pub last_used: Option<DateTime<Utc>>,
}

/// Result of a host-side create: the plaintext is only available here.
pub struct IssuedCredential {
    pub secret: Zeroizing<String>,
    pub record: CredentialRecord,
}

/// Everything the agent needs to connect, shown exactly once.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub site_url: String,
    pub username: String,
    pub password: String,
}

impl ConnectionInfo {
    /// Pretty JSON for the copy-to-config block.
    pub fn to_config_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("site_url", &self.site_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Drop for ConnectionInfo {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}
