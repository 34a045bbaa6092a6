//! Random secrets, salted hashes, and comparisons for application passwords.

use crate::error::{ClawError, ClawResult};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

const HASH_SCHEME: &str = "hmac-sha256";
const SALT_LENGTH: usize = 16;

pub fn generate_secret(length: usize) -> Zeroizing<String> {
    Zeroizing::new(
        OsRng
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect(),
    )
}

/// Strip the display grouping (spaces, dashes) a user may paste back in.
pub fn normalize_app_password(input: &str) -> Zeroizing<String> {
    Zeroizing::new(input.chars().filter(|c| c.is_ascii_alphanumeric()).collect())
}

/// Hex HMAC-SHA256 of `message` under `key`.
pub fn hmac_hex(key: &[u8], message: &[u8]) -> ClawResult<String> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(ClawError::host)?;
    mac.update(message);
    Ok(format!("{:x}", mac.finalize().into_bytes()))
}

/// Hash as `hmac-sha256$<salt>$<hex>`, keyed by the salt.
pub fn hash_password(secret: &str) -> ClawResult<String> {
    let salt = generate_secret(SALT_LENGTH);
    let digest = hmac_hex(salt.as_bytes(), secret.as_bytes())?;
    Ok(format!("{}${}${}", HASH_SCHEME, salt.as_str(), digest))
}

pub fn verify_password(secret: &str, stored: &str) -> bool {
    let mut parts = stored.splitn(3, '$');
    let (Some(scheme), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != HASH_SCHEME {
        return false;
    }
    match hmac_hex(salt.as_bytes(), secret.as_bytes()) {
        Ok(actual) => constant_time_eq(actual.as_bytes(), expected.as_bytes()),
        Err(_) => false,
    }
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
