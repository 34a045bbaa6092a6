//! On-disk model of site.toml: plugin configuration plus the state of the
//! reference host (users, application passwords, content, transients).

use crate::constants;
use crate::models::content::ContentItem;
use crate::models::credential::CredentialRecord;
use crate::models::integration::Integration;
use crate::models::user::{User, UserId};
use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFile {
    #[serde(default)]
    pub site: SiteSection,
    #[serde(default)]
    pub plugin: PluginConfig,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub application_passwords: Vec<StoredCredential>,
    #[serde(default)]
    pub content: Vec<ContentItem>,
    #[serde(default)]
    pub transients: Vec<Transient>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSection {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_home_url")]
    pub home_url: String,
    /// Signing key for action nonces; generated at init.
    #[serde(default)]
    pub nonce_secret: String,
    #[serde(default = "default_next_id")]
    pub next_user_id: u64,
    #[serde(default = "default_next_id")]
    pub next_content_id: u64,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            version: default_version(),
            home_url: default_home_url(),
            nonce_secret: String::new(),
            next_user_id: default_next_id(),
            next_content_id: default_next_id(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(default = "default_reserved_name")]
    pub reserved_name: String,
    #[serde(default = "default_app_id")]
    pub app_id: String,
    #[serde(default = "default_required_capability")]
    pub required_capability: String,
    #[serde(default = "default_error_ttl")]
    pub error_ttl_secs: i64,
    #[serde(default = "default_created_ttl")]
    pub created_ttl_secs: i64,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_nonce_lifetime")]
    pub nonce_lifetime_secs: i64,
}

impl PluginConfig {
    pub fn integration(&self) -> Integration {
        Integration::new(self.reserved_name.clone(), self.app_id.clone())
    }

    /// Reject settings the admin flows cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.reserved_name.trim().is_empty() {
            bail!("plugin.reserved_name cannot be empty");
        }
        for (field, secs) in [
            ("error_ttl_secs", self.error_ttl_secs),
            ("created_ttl_secs", self.created_ttl_secs),
            ("nonce_lifetime_secs", self.nonce_lifetime_secs),
        ] {
            if !(1..=constants::MAX_LIFETIME_SECS).contains(&secs) {
                bail!(
                    "plugin.{} must be between 1 and {} seconds, got {}",
                    field,
                    constants::MAX_LIFETIME_SECS,
                    secs
                );
            }
        }
        Ok(())
    }
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            reserved_name: default_reserved_name(),
            app_id: default_app_id(),
            required_capability: default_required_capability(),
            error_ttl_secs: default_error_ttl(),
            created_ttl_secs: default_created_ttl(),
            recent_limit: default_recent_limit(),
            nonce_lifetime_secs: default_nonce_lifetime(),
        }
    }
}

/// Application password row as the host keeps it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCredential {
    pub uuid: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub app_id: String,
    pub password_hash: String,
    pub created: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used: Option<DateTime<Utc>>,
}

impl StoredCredential {
    pub fn record(&self) -> CredentialRecord {
        CredentialRecord {
            uuid: self.uuid,
            user_id: self.user_id,
            name: self.name.clone(),
            app_id: self.app_id.clone(),
            created: self.created,
            last_used: self.last_used,
        }
    }
}

/// Short-lived key/value entry; reads after `expires_at` see nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transient {
    pub key: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

fn default_version() -> u32 {
    1
}

fn default_home_url() -> String {
    "http://localhost/".to_string()
}

fn default_next_id() -> u64 {
    1
}

fn default_reserved_name() -> String {
    constants::DEFAULT_RESERVED_NAME.to_string()
}

fn default_app_id() -> String {
    constants::DEFAULT_APP_ID.to_string()
}

fn default_required_capability() -> String {
    constants::DEFAULT_REQUIRED_CAPABILITY.to_string()
}

fn default_error_ttl() -> i64 {
    constants::DEFAULT_ERROR_TTL_SECS
}

fn default_created_ttl() -> i64 {
    constants::DEFAULT_CREATED_TTL_SECS
}

fn default_recent_limit() -> usize {
    constants::DEFAULT_RECENT_LIMIT
}

fn default_nonce_lifetime() -> i64 {
    constants::DEFAULT_NONCE_LIFETIME_SECS
}
