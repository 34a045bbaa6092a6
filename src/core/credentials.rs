//! Integration credential lifecycle: lookup, create, revoke.
//!
//! Thin delegation to the host's credential store. The one-per-user rule is
//! enforced here with lookup-then-create; hosts that allow concurrent writers
//! must serialise them (the file-backed site holds an exclusive lock).

use crate::constants;
use crate::core::ports::{CredentialStore, SiteDirectory};
use crate::error::{ClawError, ClawResult};
use crate::models::credential::{ConnectionInfo, CredentialRecord};
use crate::models::integration::Integration;
use crate::models::user::UserId;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Returned once from `create`; the plaintext is not recoverable afterwards.
pub struct CreatedCredential {
    /// Plaintext secret in display groups of four.
    pub password: Zeroizing<String>,
    pub uuid: Uuid,
    pub created: DateTime<Utc>,
}

pub fn lookup<C: CredentialStore + ?Sized>(
    store: &C,
    integration: &Integration,
    user: UserId,
) -> ClawResult<Option<CredentialRecord>> {
    Ok(store
        .list_credentials(user)?
        .into_iter()
        .find(|c| integration.owns(c)))
}

pub fn create<C: CredentialStore + ?Sized>(
    store: &mut C,
    integration: &Integration,
    user: UserId,
) -> ClawResult<CreatedCredential> {
    if lookup(&*store, integration, user)?.is_some() {
        return Err(ClawError::AlreadyExists(integration.reserved_name.clone()));
    }

    let issued = store.create_credential(user, &integration.reserved_name, &integration.app_id)?;
    info!(user, uuid = %issued.record.uuid, name = %integration.reserved_name, "integration credential created");

    Ok(CreatedCredential {
        password: Zeroizing::new(chunk_password(&issued.secret)),
        uuid: issued.record.uuid,
        created: issued.record.created,
    })
}

pub fn revoke<C: CredentialStore + ?Sized>(
    store: &mut C,
    integration: &Integration,
    user: UserId,
) -> ClawResult<CredentialRecord> {
    let existing = lookup(&*store, integration, user)?
        .ok_or_else(|| ClawError::NotFound(integration.reserved_name.clone()))?;
    store.delete_credential(user, existing.uuid)?;
    info!(user, uuid = %existing.uuid, "integration credential revoked");
    Ok(existing)
}

/// Connection details for the agent's config, built from a fresh secret.
pub fn connection_info<D: SiteDirectory + ?Sized>(
    directory: &D,
    user: UserId,
    password: &str,
) -> ClawResult<ConnectionInfo> {
    let account = directory
        .user(user)?
        .ok_or_else(|| ClawError::host(format!("user {} not found", user)))?;
    Ok(ConnectionInfo {
        site_url: directory.home_url(),
        username: account.login,
        password: password.to_string(),
    })
}

/// Split a secret into space-separated groups for readability.
pub fn chunk_password(secret: &str) -> String {
    secret
        .chars()
        .collect::<Vec<_>>()
        .chunks(constants::APP_PASSWORD_CHUNK)
        .map(|c| c.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}
