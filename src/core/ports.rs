//! Capabilities the host provides. The plugin never touches host storage
//! except through these traits.

use crate::error::ClawResult;
use crate::models::content::{ContentId, ContentItem, NewContent};
use crate::models::credential::{CredentialRecord, IssuedCredential};
use crate::models::user::{User, UserId};
use chrono::Duration;
use uuid::Uuid;

/// Host application-password subsystem: hashing, storage, validation.
pub trait CredentialStore {
    fn create_credential(
        &mut self,
        user: UserId,
        name: &str,
        app_id: &str,
    ) -> ClawResult<IssuedCredential>;

    fn delete_credential(&mut self, user: UserId, uuid: Uuid) -> ClawResult<()>;

    fn list_credentials(&self, user: UserId) -> ClawResult<Vec<CredentialRecord>>;

    /// Validate `login` + plaintext secret. On success stamps `last_used`
    /// and returns the user and the uuid of the matching credential.
    fn authenticate(&mut self, login: &str, secret: &str) -> ClawResult<Option<(UserId, Uuid)>>;
}

/// Host content storage with per-item key/value metadata.
pub trait ContentStore {
    fn insert_item(&mut self, item: NewContent) -> ClawResult<ContentItem>;

    fn get_item(&self, id: ContentId) -> ClawResult<Option<ContentItem>>;

    fn set_meta(&mut self, id: ContentId, key: &str, value: &str) -> ClawResult<()>;

    fn get_meta(&self, id: ContentId, key: &str) -> ClawResult<Option<String>>;

    /// Remove `key` from every item. Returns how many items carried it.
    fn delete_meta_by_key(&mut self, key: &str) -> ClawResult<usize>;

    /// Items by `author` carrying metadata `key`, any kind and status.
    fn items_with_meta(&self, author: UserId, key: &str) -> ClawResult<Vec<ContentItem>>;

    fn trash_item(&mut self, id: ContentId) -> ClawResult<()>;

    /// Permanently delete an item together with its metadata.
    fn delete_item(&mut self, id: ContentId) -> ClawResult<()>;
}

/// Short-TTL key/value storage for passing state across a redirect.
pub trait FlashStore {
    fn set_flash(&mut self, key: &str, value: String, ttl: Duration) -> ClawResult<()>;

    /// Expired entries read as absent.
    fn get_flash(&self, key: &str) -> ClawResult<Option<String>>;

    fn delete_flash(&mut self, key: &str) -> ClawResult<()>;

    fn delete_flash_prefix(&mut self, prefix: &str) -> ClawResult<usize>;
}

/// Users and site-level settings.
pub trait SiteDirectory {
    fn home_url(&self) -> String;

    fn user(&self, id: UserId) -> ClawResult<Option<User>>;

    fn user_by_login(&self, login: &str) -> ClawResult<Option<User>>;

    fn users(&self) -> ClawResult<Vec<User>>;
}

/// Everything a full host offers.
pub trait Host: CredentialStore + ContentStore + FlashStore + SiteDirectory {}

impl<T> Host for T where T: CredentialStore + ContentStore + FlashStore + SiteDirectory {}
