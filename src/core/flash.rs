//! One-time typed messages carried across a redirect, scoped per user.

use crate::constants;
use crate::core::ports::FlashStore;
use crate::error::{ClawError, ClawResult};
use crate::models::user::UserId;
use chrono::Duration;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

pub fn error_key(user: UserId) -> String {
    format!("{}{}", constants::FLASH_ERROR_PREFIX, user)
}

pub fn created_key(user: UserId) -> String {
    format!("{}{}", constants::FLASH_CREATED_PREFIX, user)
}

pub fn put<T: Serialize, F: FlashStore + ?Sized>(
    store: &mut F,
    key: &str,
    value: &T,
    ttl: Duration,
) -> ClawResult<()> {
    let encoded = serde_json::to_string(value).map_err(ClawError::host)?;
    store.set_flash(key, encoded, ttl)
}

/// Read without consuming. Undecodable entries read as absent.
pub fn peek<T: DeserializeOwned, F: FlashStore + ?Sized>(
    store: &F,
    key: &str,
) -> ClawResult<Option<T>> {
    let Some(raw) = store.get_flash(key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(err) => {
            warn!(key, error = %err, "discarding undecodable flash entry");
            Ok(None)
        }
    }
}

/// Single read: the entry is deleted whether or not it decoded.
pub fn take<T: DeserializeOwned, F: FlashStore + ?Sized>(
    store: &mut F,
    key: &str,
) -> ClawResult<Option<T>> {
    let value = peek(&*store, key)?;
    store.delete_flash(key)?;
    Ok(value)
}
