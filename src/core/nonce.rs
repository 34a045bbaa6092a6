//! Action nonces guarding the state-changing admin actions.
//!
//! A token is a truncated HMAC-SHA256 over (tick, action, user). The tick
//! advances every half lifetime and the previous tick is still accepted, so a
//! token lives between half and one full lifetime.

use crate::error::{ClawError, ClawResult};
use crate::models::user::UserId;
use crate::util::secret::{constant_time_eq, hmac_hex};
use chrono::{DateTime, Utc};

const TOKEN_LEN: usize = 10;

#[derive(Clone)]
pub struct NonceSigner {
    secret: String,
    lifetime_secs: i64,
}

impl NonceSigner {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            lifetime_secs: lifetime_secs.max(2),
        }
    }

    pub fn create(&self, action: &str, user: UserId, now: DateTime<Utc>) -> ClawResult<String> {
        self.token(self.tick(now), action, user)
    }

    pub fn verify(&self, token: &str, action: &str, user: UserId, now: DateTime<Utc>) -> ClawResult<()> {
        let tick = self.tick(now);
        for candidate in [tick, tick - 1] {
            if constant_time_eq(self.token(candidate, action, user)?.as_bytes(), token.as_bytes()) {
                return Ok(());
            }
        }
        Err(ClawError::Unauthenticated)
    }

    fn tick(&self, now: DateTime<Utc>) -> i64 {
        let half = self.lifetime_secs / 2;
        now.timestamp().div_euclid(half) + 1
    }

    fn token(&self, tick: i64, action: &str, user: UserId) -> ClawResult<String> {
        let message = format!("{}|{}|{}", tick, action, user);
        let hex = hmac_hex(self.secret.as_bytes(), message.as_bytes())?;
        Ok(hex[hex.len() - TOKEN_LEN - 2..hex.len() - 2].to_string())
    }
}
