//! File-backed reference host. Loads site.toml under an exclusive lock,
//! serves every host capability from memory, and writes back on `save`.

use crate::constants;
use crate::core::file_lock::FileLock;
use crate::core::paths::SitePaths;
use crate::core::ports::{ContentStore, CredentialStore, FlashStore, SiteDirectory};
use crate::core::site_file;
use crate::error::{ClawError, ClawResult};
use crate::models::content::{ContentId, ContentItem, NewContent, PostStatus};
use crate::models::credential::{CredentialRecord, IssuedCredential};
use crate::models::site_config::{SiteFile, StoredCredential, Transient};
use crate::models::user::{Role, User, UserId};
use crate::util::secret;
use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug)]
pub struct SiteStore {
    paths: SitePaths,
    data: SiteFile,
    _lock: FileLock,
}

impl SiteStore {
    /// Create site.toml if missing and open it.
    pub fn init(paths: &SitePaths, home_url: Option<&str>) -> Result<Self> {
        Self::init_with(paths, home_url, true)
    }

    /// Like [`SiteStore::init`] but refuses instead of waiting on a held lock.
    pub fn try_init(paths: &SitePaths, home_url: Option<&str>) -> Result<Self> {
        Self::init_with(paths, home_url, false)
    }

    fn init_with(paths: &SitePaths, home_url: Option<&str>, wait: bool) -> Result<Self> {
        site_file::ensure_root(&paths.root)?;
        let lock = Self::lock(paths, wait)?;
        let mut data = if paths.site_toml.exists() {
            site_file::load(&paths.site_toml)?
        } else {
            SiteFile::default()
        };
        if data.site.nonce_secret.is_empty() {
            data.site.nonce_secret = secret::generate_secret(constants::NONCE_SECRET_LENGTH).to_string();
        }
        if let Some(url) = home_url {
            data.site.home_url = url.to_string();
        }
        let store = Self {
            paths: paths.clone(),
            data,
            _lock: lock,
        };
        store.save()?;
        Ok(store)
    }

    /// Open an initialised site, holding its lock until drop.
    pub fn open(paths: &SitePaths) -> Result<Self> {
        Self::open_with(paths, true)
    }

    /// Like [`SiteStore::open`] but refuses instead of waiting on a held lock.
    pub fn try_open(paths: &SitePaths) -> Result<Self> {
        Self::open_with(paths, false)
    }

    fn open_with(paths: &SitePaths, wait: bool) -> Result<Self> {
        if !paths.site_toml.is_file() {
            bail!(
                "site not initialized at {} (run `clawpress site init`)",
                paths.root.display()
            );
        }
        let lock = Self::lock(paths, wait)?;
        let mut store = Self {
            paths: paths.clone(),
            data: site_file::load(&paths.site_toml)?,
            _lock: lock,
        };
        store.purge_expired();
        debug!(site = %paths, "site opened");
        Ok(store)
    }

    fn lock(paths: &SitePaths, wait: bool) -> Result<FileLock> {
        if wait {
            FileLock::exclusive(&paths.site_lock)
        } else {
            FileLock::try_exclusive(&paths.site_lock)
        }
    }

    /// Write site.toml. Expired transients are never written back.
    pub fn save(&self) -> Result<()> {
        let now = Utc::now();
        if self.data.transients.iter().all(|t| t.expires_at > now) {
            return site_file::save(&self.paths.site_toml, &self.data);
        }
        let mut data = self.data.clone();
        data.transients.retain(|t| t.expires_at > now);
        site_file::save(&self.paths.site_toml, &data)
    }

    pub fn data(&self) -> &SiteFile {
        &self.data
    }

    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    pub fn add_user(&mut self, login: &str, role: Role) -> Result<User> {
        if login.trim().is_empty() {
            bail!("login cannot be empty");
        }
        if self.data.users.iter().any(|u| u.login == login) {
            bail!("user already exists: {}", login);
        }
        let user = User {
            id: self.data.site.next_user_id,
            login: login.to_string(),
            role,
        };
        self.data.site.next_user_id += 1;
        self.data.users.push(user.clone());
        Ok(user)
    }

    pub fn require_user(&self, login: &str) -> Result<User> {
        self.user_by_login(login)?
            .with_context(|| format!("unknown user: {}", login))
    }

    fn item_mut(&mut self, id: ContentId) -> ClawResult<&mut ContentItem> {
        self.data
            .content
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ClawError::host(format!("content item {} not found", id)))
    }

    fn purge_expired(&mut self) {
        let now = Utc::now();
        self.data.transients.retain(|t| t.expires_at > now);
    }
}

impl CredentialStore for SiteStore {
    fn create_credential(
        &mut self,
        user: UserId,
        name: &str,
        app_id: &str,
    ) -> ClawResult<IssuedCredential> {
        if !self.data.users.iter().any(|u| u.id == user) {
            return Err(ClawError::host(format!("user {} not found", user)));
        }
        let plain = secret::generate_secret(constants::APP_PASSWORD_LENGTH);
        let stored = StoredCredential {
            uuid: Uuid::new_v4(),
            user_id: user,
            name: name.to_string(),
            app_id: app_id.to_string(),
            password_hash: secret::hash_password(&plain)?,
            created: Utc::now(),
            last_used: None,
        };
        let record = stored.record();
        self.data.application_passwords.push(stored);
        debug!(user, uuid = %record.uuid, "application password stored");
        Ok(IssuedCredential {
            secret: plain,
            record,
        })
    }

    fn delete_credential(&mut self, user: UserId, uuid: Uuid) -> ClawResult<()> {
        let before = self.data.application_passwords.len();
        self.data
            .application_passwords
            .retain(|c| !(c.user_id == user && c.uuid == uuid));
        if self.data.application_passwords.len() == before {
            return Err(ClawError::host(format!(
                "application password {} not found",
                uuid
            )));
        }
        Ok(())
    }

    fn list_credentials(&self, user: UserId) -> ClawResult<Vec<CredentialRecord>> {
        Ok(self
            .data
            .application_passwords
            .iter()
            .filter(|c| c.user_id == user)
            .map(StoredCredential::record)
            .collect())
    }

    fn authenticate(&mut self, login: &str, input: &str) -> ClawResult<Option<(UserId, Uuid)>> {
        let Some(user) = self.data.users.iter().find(|u| u.login == login).map(|u| u.id) else {
            return Ok(None);
        };
        let candidate = secret::normalize_app_password(input);
        let matched = self
            .data
            .application_passwords
            .iter_mut()
            .find(|c| c.user_id == user && secret::verify_password(&candidate, &c.password_hash));
        Ok(matched.map(|c| {
            c.last_used = Some(Utc::now());
            (user, c.uuid)
        }))
    }
}

impl ContentStore for SiteStore {
    fn insert_item(&mut self, item: NewContent) -> ClawResult<ContentItem> {
        let created = ContentItem {
            id: self.data.site.next_content_id,
            author: item.author,
            kind: item.kind,
            title: item.title,
            status: item.status,
            date: item.date.unwrap_or_else(Utc::now),
            meta: Default::default(),
        };
        self.data.site.next_content_id += 1;
        self.data.content.push(created.clone());
        Ok(created)
    }

    fn get_item(&self, id: ContentId) -> ClawResult<Option<ContentItem>> {
        Ok(self.data.content.iter().find(|c| c.id == id).cloned())
    }

    fn set_meta(&mut self, id: ContentId, key: &str, value: &str) -> ClawResult<()> {
        self.item_mut(id)?
            .meta
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get_meta(&self, id: ContentId, key: &str) -> ClawResult<Option<String>> {
        Ok(self
            .data
            .content
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.meta.get(key).cloned()))
    }

    fn delete_meta_by_key(&mut self, key: &str) -> ClawResult<usize> {
        let mut removed = 0;
        for item in self.data.content.iter_mut() {
            if item.meta.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }

    fn items_with_meta(&self, author: UserId, key: &str) -> ClawResult<Vec<ContentItem>> {
        Ok(self
            .data
            .content
            .iter()
            .filter(|c| c.author == author && c.meta.contains_key(key))
            .cloned()
            .collect())
    }

    fn trash_item(&mut self, id: ContentId) -> ClawResult<()> {
        self.item_mut(id)?.status = PostStatus::Trash;
        Ok(())
    }

    fn delete_item(&mut self, id: ContentId) -> ClawResult<()> {
        let before = self.data.content.len();
        self.data.content.retain(|c| c.id != id);
        if self.data.content.len() == before {
            return Err(ClawError::host(format!("content item {} not found", id)));
        }
        Ok(())
    }
}

impl FlashStore for SiteStore {
    fn set_flash(&mut self, key: &str, value: String, ttl: Duration) -> ClawResult<()> {
        self.purge_expired();
        self.data.transients.retain(|t| t.key != key);
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .ok_or_else(|| ClawError::host(format!("flash lifetime out of range for {}", key)))?;
        self.data.transients.push(Transient {
            key: key.to_string(),
            value,
            expires_at,
        });
        Ok(())
    }

    fn get_flash(&self, key: &str) -> ClawResult<Option<String>> {
        let now = Utc::now();
        Ok(self
            .data
            .transients
            .iter()
            .find(|t| t.key == key && t.expires_at > now)
            .map(|t| t.value.clone()))
    }

    fn delete_flash(&mut self, key: &str) -> ClawResult<()> {
        self.data.transients.retain(|t| t.key != key);
        Ok(())
    }

    fn delete_flash_prefix(&mut self, prefix: &str) -> ClawResult<usize> {
        let before = self.data.transients.len();
        self.data.transients.retain(|t| !t.key.starts_with(prefix));
        Ok(before - self.data.transients.len())
    }
}

impl SiteDirectory for SiteStore {
    fn home_url(&self) -> String {
        self.data.site.home_url.clone()
    }

    fn user(&self, id: UserId) -> ClawResult<Option<User>> {
        Ok(self.data.users.iter().find(|u| u.id == id).cloned())
    }

    fn user_by_login(&self, login: &str) -> ClawResult<Option<User>> {
        Ok(self.data.users.iter().find(|u| u.login == login).cloned())
    }

    fn users(&self) -> ClawResult<Vec<User>> {
        Ok(self.data.users.clone())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use tempfile::TempDir;

    pub(crate) fn test_store() -> (TempDir, SiteStore) {
        let dir = TempDir::new().unwrap();
        let paths = SitePaths::from_root(dir.path().to_path_buf());
        let store = SiteStore::init(&paths, Some("https://blog.example/")).unwrap();
        (dir, store)
    }
}
