//! Typed identity of the integration credential.

use crate::constants;
use crate::models::credential::CredentialRecord;
use serde::{Deserialize, Serialize};

/// Binds a reserved credential name (and the app id stamped on it) to the
/// integration. A user holds zero or one credential matching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    pub reserved_name: String,
    pub app_id: String,
}

impl Integration {
    pub fn new(reserved_name: impl Into<String>, app_id: impl Into<String>) -> Self {
        Self {
            reserved_name: reserved_name.into(),
            app_id: app_id.into(),
        }
    }

    pub fn owns(&self, record: &CredentialRecord) -> bool {
        record.name == self.reserved_name
    }
}

impl Default for Integration {
    fn default() -> Self {
        Self::new(constants::DEFAULT_RESERVED_NAME, constants::DEFAULT_APP_ID)
    }
}
