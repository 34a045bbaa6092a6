//! Admin surface: the create/revoke actions and view-state selection for the
//! connection page and the roster.

use crate::constants;
use crate::core::attribution::AttributionTracker;
use crate::core::credentials;
use crate::core::events::ContentPipeline;
use crate::core::flash;
use crate::core::nonce::NonceSigner;
use crate::core::ports::Host;
use crate::core::stats::{self, UsageStats};
use crate::error::{ClawError, ClawResult};
use crate::models::credential::{ConnectionInfo, CredentialRecord};
use crate::models::integration::Integration;
use crate::models::site_config::{PluginConfig, SiteFile};
use crate::models::user::User;
use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Where the create form sends the browser next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Redirect {
    /// Whether the page should be loaded with `created=1`.
    pub created: bool,
}

/// Structured reply for the AJAX revoke flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AjaxResponse {
    pub success: bool,
    pub data: String,
}

impl AjaxResponse {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: message.into(),
        }
    }

    fn fail(err: &ClawError) -> Self {
        Self {
            success: false,
            data: err.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Page {
    /// Inline error left by a failed create.
    pub notice: Option<String>,
    #[serde(flatten)]
    pub view: View,
}

#[derive(Debug, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum View {
    /// Secret shown this once.
    JustCreated {
        connection: ConnectionInfo,
        config_json: String,
    },
    Connected {
        credential: CredentialRecord,
        stats: UsageStats,
    },
    Disconnected,
}

#[derive(Debug, Serialize)]
pub struct RosterEntry {
    pub user: User,
    pub credential: CredentialRecord,
    pub stats: UsageStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UninstallReport {
    pub tags_removed: usize,
    pub flash_removed: usize,
}

pub struct Plugin {
    config: PluginConfig,
    integration: Integration,
    nonces: NonceSigner,
}

impl Plugin {
    pub fn new(config: PluginConfig, nonce_secret: &str) -> Self {
        let integration = config.integration();
        let nonces = NonceSigner::new(nonce_secret, config.nonce_lifetime_secs);
        Self {
            config,
            integration,
            nonces,
        }
    }

    pub fn from_site(site: &SiteFile) -> Self {
        Self::new(site.plugin.clone(), &site.site.nonce_secret)
    }

    pub fn integration(&self) -> &Integration {
        &self.integration
    }

    /// Content pipeline with the attribution tracker subscribed.
    pub fn content_pipeline(&self) -> ContentPipeline {
        let mut pipeline = ContentPipeline::new();
        pipeline.subscribe(Box::new(AttributionTracker::new(self.integration.clone())));
        pipeline
    }

    pub fn issue_nonce(&self, action: &str, user: &User) -> ClawResult<String> {
        self.nonces.create(action, user.id, Utc::now())
    }

    fn authorize(&self, user: &User, action: &str, nonce: &str) -> ClawResult<()> {
        if !user.can(&self.config.required_capability) {
            return Err(ClawError::PermissionDenied);
        }
        self.nonces.verify(nonce, action, user.id, Utc::now())
    }

    /// Form flow. Authorization failures are returned; create failures are
    /// parked in the error flash for the next render. A credential whose
    /// secret could not be parked is deleted again before the error returns.
    pub fn handle_create(&self, host: &mut dyn Host, user: &User, nonce: &str) -> ClawResult<Redirect> {
        self.authorize(user, constants::ACTION_CREATE, nonce)?;
        let created_ttl = ttl(self.config.created_ttl_secs)?;
        let error_ttl = ttl(self.config.error_ttl_secs)?;

        match credentials::create(&mut *host, &self.integration, user.id) {
            Ok(created) => {
                let parked = credentials::connection_info(&*host, user.id, &created.password)
                    .and_then(|info| {
                        flash::put(&mut *host, &flash::created_key(user.id), &info, created_ttl)
                    });
                if let Err(err) = parked {
                    warn!(user = user.id, uuid = %created.uuid, error = %err, "secret not stored, deleting new credential");
                    if let Err(cleanup) = host.delete_credential(user.id, created.uuid) {
                        warn!(user = user.id, uuid = %created.uuid, error = %cleanup, "credential cleanup failed");
                    }
                    return Err(err);
                }
                Ok(Redirect { created: true })
            }
            Err(err) => {
                warn!(user = user.id, code = err.code(), "create refused");
                flash::put(host, &flash::error_key(user.id), &err.to_string(), error_ttl)?;
                Ok(Redirect { created: false })
            }
        }
    }

    /// AJAX flow. Every outcome becomes a structured response.
    pub fn handle_revoke(&self, host: &mut dyn Host, user: &User, nonce: &str) -> AjaxResponse {
        if let Err(err) = self.authorize(user, constants::ACTION_REVOKE, nonce) {
            return AjaxResponse::fail(&err);
        }
        match credentials::revoke(host, &self.integration, user.id) {
            Ok(_) => AjaxResponse::ok(format!(
                "{} connection revoked successfully.",
                self.integration.reserved_name
            )),
            Err(err) => AjaxResponse::fail(&err),
        }
    }

    /// Select the view for `user`. Consumes the error notice, and the
    /// connection info when `created` is set.
    pub fn render_page(&self, host: &mut dyn Host, user: &User, created: bool) -> ClawResult<Page> {
        if !user.can(&self.config.required_capability) {
            return Err(ClawError::PermissionDenied);
        }

        let notice: Option<String> = flash::take(&mut *host, &flash::error_key(user.id))?;
        let created_key = flash::created_key(user.id);
        let pending: Option<ConnectionInfo> = if created {
            let pending = flash::peek(&*host, &created_key)?;
            // Also clears an entry that expired unread.
            host.delete_flash(&created_key)?;
            pending
        } else {
            None
        };

        let view = if let Some(connection) = pending {
            let config_json = connection.to_config_json().map_err(ClawError::host)?;
            View::JustCreated {
                connection,
                config_json,
            }
        } else if let Some(credential) = credentials::lookup(&*host, &self.integration, user.id)? {
            let stats = stats::usage_stats(&*host, user.id, self.config.recent_limit)?;
            View::Connected { credential, stats }
        } else {
            View::Disconnected
        };

        Ok(Page { notice, view })
    }

    /// Every user currently holding the integration credential.
    pub fn roster(&self, host: &dyn Host, viewer: &User) -> ClawResult<Vec<RosterEntry>> {
        if !viewer.can(constants::ROSTER_CAPABILITY) {
            return Err(ClawError::PermissionDenied);
        }
        let mut entries = Vec::new();
        for user in host.users()? {
            if let Some(credential) = credentials::lookup(host, &self.integration, user.id)? {
                let stats = stats::usage_stats(host, user.id, self.config.recent_limit)?;
                entries.push(RosterEntry {
                    user,
                    credential,
                    stats,
                });
            }
        }
        Ok(entries)
    }
}

fn ttl(secs: i64) -> ClawResult<Duration> {
    Duration::try_seconds(secs)
        .ok_or_else(|| ClawError::host(format!("flash lifetime out of range: {}s", secs)))
}

/// Remove every attribution tag and every plugin flash entry. Credentials
/// stay; users revoke them explicitly.
pub fn uninstall(host: &mut dyn Host) -> ClawResult<UninstallReport> {
    let tags_removed = host.delete_meta_by_key(constants::ATTRIBUTION_META_KEY)?;
    let flash_removed = host.delete_flash_prefix(constants::FLASH_PREFIX)?;
    info!(tags_removed, flash_removed, "plugin data removed");
    Ok(UninstallReport {
        tags_removed,
        flash_removed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ports::{ContentStore, CredentialStore, FlashStore, SiteDirectory};
    use crate::core::request::RequestContext;
    use crate::core::site_store::testing::test_store;
    use crate::core::site_store::SiteStore;
    use crate::models::content::{ContentId, ContentItem, ContentKind, NewContent};
    use crate::models::credential::IssuedCredential;
    use crate::models::user::{Role, UserId};
    use uuid::Uuid;

    fn setup() -> (tempfile::TempDir, SiteStore, Plugin, User) {
        let (dir, mut store) = test_store();
        let admin = store.add_user("alice", Role::Administrator).unwrap();
        let plugin = Plugin::from_site(store.data());
        (dir, store, plugin, admin)
    }

    fn connect(store: &mut SiteStore, plugin: &Plugin, user: &User) -> Redirect {
        let nonce = plugin.issue_nonce(constants::ACTION_CREATE, user).unwrap();
        plugin.handle_create(store, user, &nonce).unwrap()
    }

    /// Delegates to a real store but refuses every flash write.
    struct FlashDown(SiteStore);

    impl CredentialStore for FlashDown {
        fn create_credential(
            &mut self,
            user: UserId,
            name: &str,
            app_id: &str,
        ) -> ClawResult<IssuedCredential> {
            self.0.create_credential(user, name, app_id)
        }

        fn delete_credential(&mut self, user: UserId, uuid: Uuid) -> ClawResult<()> {
            self.0.delete_credential(user, uuid)
        }

        fn list_credentials(&self, user: UserId) -> ClawResult<Vec<CredentialRecord>> {
            self.0.list_credentials(user)
        }

        fn authenticate(&mut self, login: &str, secret: &str) -> ClawResult<Option<(UserId, Uuid)>> {
            self.0.authenticate(login, secret)
        }
    }

    impl ContentStore for FlashDown {
        fn insert_item(&mut self, item: NewContent) -> ClawResult<ContentItem> {
            self.0.insert_item(item)
        }

        fn get_item(&self, id: ContentId) -> ClawResult<Option<ContentItem>> {
            self.0.get_item(id)
        }

        fn set_meta(&mut self, id: ContentId, key: &str, value: &str) -> ClawResult<()> {
            self.0.set_meta(id, key, value)
        }

        fn get_meta(&self, id: ContentId, key: &str) -> ClawResult<Option<String>> {
            self.0.get_meta(id, key)
        }

        fn delete_meta_by_key(&mut self, key: &str) -> ClawResult<usize> {
            self.0.delete_meta_by_key(key)
        }

        fn items_with_meta(&self, author: UserId, key: &str) -> ClawResult<Vec<ContentItem>> {
            self.0.items_with_meta(author, key)
        }

        fn trash_item(&mut self, id: ContentId) -> ClawResult<()> {
            self.0.trash_item(id)
        }

        fn delete_item(&mut self, id: ContentId) -> ClawResult<()> {
            self.0.delete_item(id)
        }
    }

    impl FlashStore for FlashDown {
        fn set_flash(&mut self, _: &str, _: String, _: Duration) -> ClawResult<()> {
            Err(ClawError::host("transient storage unavailable"))
        }

        fn get_flash(&self, key: &str) -> ClawResult<Option<String>> {
            self.0.get_flash(key)
        }

        fn delete_flash(&mut self, key: &str) -> ClawResult<()> {
            self.0.delete_flash(key)
        }

        fn delete_flash_prefix(&mut self, prefix: &str) -> ClawResult<usize> {
            self.0.delete_flash_prefix(prefix)
        }
    }

    impl SiteDirectory for FlashDown {
        fn home_url(&self) -> String {
            self.0.home_url()
        }

        fn user(&self, id: UserId) -> ClawResult<Option<User>> {
            self.0.user(id)
        }

        fn user_by_login(&self, login: &str) -> ClawResult<Option<User>> {
            self.0.user_by_login(login)
        }

        fn users(&self) -> ClawResult<Vec<User>> {
            self.0.users()
        }
    }

    #[test]
    fn test_fresh_user_sees_disconnected() {
        let (_dir, mut store, plugin, admin) = setup();
        let page = plugin.render_page(&mut store, &admin, false).unwrap();
        assert!(page.notice.is_none());
        assert!(matches!(page.view, View::Disconnected));
    }

    #[test]
    fn test_secret_is_shown_exactly_once() {
        let (_dir, mut store, plugin, admin) = setup();
        assert_eq!(connect(&mut store, &plugin, &admin), Redirect { created: true });

        let first = plugin.render_page(&mut store, &admin, true).unwrap();
        let password = match &first.view {
            View::JustCreated {
                connection,
                config_json,
            } => {
                assert_eq!(connection.username, "alice");
                assert_eq!(connection.site_url, "https://blog.example/");
                assert!(config_json.contains(&connection.password));
                connection.password.clone()
            }
            other => panic!("expected just-created view, got {:?}", other),
        };

        let again = plugin.render_page(&mut store, &admin, true).unwrap();
        assert!(matches!(again.view, View::Connected { .. }));
        let rendered = serde_json::to_string(&again).unwrap();
        assert!(!rendered.contains(&password));
        assert!(store.authenticate("alice", &password).unwrap().is_some());
    }

    #[test]
    fn test_created_flag_without_flash_falls_through() {
        let (_dir, mut store, plugin, admin) = setup();
        let page = plugin.render_page(&mut store, &admin, true).unwrap();
        assert!(matches!(page.view, View::Disconnected));
    }

    #[test]
    fn test_page_without_flag_keeps_pending_secret() {
        let (_dir, mut store, plugin, admin) = setup();
        connect(&mut store, &plugin, &admin);
        let plain = plugin.render_page(&mut store, &admin, false).unwrap();
        assert!(matches!(plain.view, View::Connected { .. }));
        let flagged = plugin.render_page(&mut store, &admin, true).unwrap();
        assert!(matches!(flagged.view, View::JustCreated { .. }));
    }

    #[test]
    fn test_duplicate_create_leaves_notice_once() {
        let (_dir, mut store, plugin, admin) = setup();
        connect(&mut store, &plugin, &admin);
        plugin.render_page(&mut store, &admin, true).unwrap();

        assert_eq!(connect(&mut store, &plugin, &admin), Redirect { created: false });
        let page = plugin.render_page(&mut store, &admin, false).unwrap();
        assert_eq!(
            page.notice.as_deref(),
            Some("An OpenClaw Application Password already exists. Revoke it first before creating a new one.")
        );
        assert!(matches!(page.view, View::Connected { .. }));
        let next = plugin.render_page(&mut store, &admin, false).unwrap();
        assert!(next.notice.is_none());
        assert_eq!(store.list_credentials(admin.id).unwrap().len(), 1);
    }

    #[test]
    fn test_create_rejects_bad_nonce_and_missing_capability() {
        let (_dir, mut store, plugin, admin) = setup();
        let editor = store.add_user("ed", Role::Editor).unwrap();

        let err = plugin.handle_create(&mut store, &admin, "0000000000").unwrap_err();
        assert_eq!(err, ClawError::Unauthenticated);

        let revoke_nonce = plugin.issue_nonce(constants::ACTION_REVOKE, &admin).unwrap();
        assert_eq!(
            plugin.handle_create(&mut store, &admin, &revoke_nonce).unwrap_err(),
            ClawError::Unauthenticated
        );

        let nonce = plugin.issue_nonce(constants::ACTION_CREATE, &editor).unwrap();
        assert_eq!(
            plugin.handle_create(&mut store, &editor, &nonce).unwrap_err(),
            ClawError::PermissionDenied
        );
        assert!(store.list_credentials(admin.id).unwrap().is_empty());
        assert_eq!(
            plugin.render_page(&mut store, &editor, false).unwrap_err(),
            ClawError::PermissionDenied
        );
    }

    #[test]
    fn test_revoke_flow() {
        let (_dir, mut store, plugin, admin) = setup();
        let nonce = plugin.issue_nonce(constants::ACTION_REVOKE, &admin).unwrap();

        let missing = plugin.handle_revoke(&mut store, &admin, &nonce);
        assert!(!missing.success);
        assert_eq!(missing.data, "No OpenClaw Application Password found to revoke.");

        connect(&mut store, &plugin, &admin);
        let done = plugin.handle_revoke(&mut store, &admin, &nonce);
        assert_eq!(done, AjaxResponse::ok("OpenClaw connection revoked successfully."));
        assert!(store.list_credentials(admin.id).unwrap().is_empty());

        let forged = plugin.handle_revoke(&mut store, &admin, "forged");
        assert!(!forged.success);
    }

    #[test]
    fn test_connected_view_carries_stats() {
        let (_dir, mut store, plugin, admin) = setup();
        connect(&mut store, &plugin, &admin);
        plugin.render_page(&mut store, &admin, true).unwrap();
        let uuid = credentials::lookup(&store, plugin.integration(), admin.id)
            .unwrap()
            .unwrap()
            .uuid;
        let request = RequestContext::api(admin.id, uuid);
        plugin
            .content_pipeline()
            .insert(&mut store, &request, NewContent::new(admin.id, ContentKind::Post, "Hi"))
            .unwrap();

        match plugin.render_page(&mut store, &admin, false).unwrap().view {
            View::Connected { stats, credential } => {
                assert_eq!(credential.uuid, uuid);
                assert_eq!(stats.post_count, 1);
                assert_eq!(stats.recent_posts[0].title, "Hi");
            }
            other => panic!("expected connected view, got {:?}", other),
        }
    }

    #[test]
    fn test_roster_lists_connected_users_only() {
        let (_dir, mut store, plugin, admin) = setup();
        let bob = store.add_user("bob", Role::Administrator).unwrap();
        let author = store.add_user("carol", Role::Author).unwrap();
        connect(&mut store, &plugin, &bob);

        let roster = plugin.roster(&store, &admin).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].user.login, "bob");
        assert_eq!(roster[0].credential.name, "OpenClaw");

        assert_eq!(
            plugin.roster(&store, &author).unwrap_err(),
            ClawError::PermissionDenied
        );
    }

    #[test]
    fn test_uninstall_keeps_credentials() {
        let (_dir, mut store, plugin, admin) = setup();
        connect(&mut store, &plugin, &admin);
        let uuid = credentials::lookup(&store, plugin.integration(), admin.id)
            .unwrap()
            .unwrap()
            .uuid;
        let request = RequestContext::api(admin.id, uuid);
        let post = plugin
            .content_pipeline()
            .insert(&mut store, &request, NewContent::new(admin.id, ContentKind::Post, "Hi"))
            .unwrap();

        let report = uninstall(&mut store).unwrap();
        assert_eq!(
            report,
            UninstallReport {
                tags_removed: 1,
                flash_removed: 1
            }
        );
        assert!(store.get_meta(post.id, constants::ATTRIBUTION_META_KEY).unwrap().is_none());
        assert_eq!(store.list_credentials(admin.id).unwrap().len(), 1);
        let page = plugin.render_page(&mut store, &admin, true).unwrap();
        assert!(matches!(page.view, View::Connected { .. }));
    }

    #[test]
    fn test_unstorable_secret_leaves_no_credential() {
        let (_dir, store, plugin, admin) = setup();
        let mut host = FlashDown(store);
        let nonce = plugin.issue_nonce(constants::ACTION_CREATE, &admin).unwrap();

        let err = plugin.handle_create(&mut host, &admin, &nonce).unwrap_err();
        assert_eq!(err.code(), "clawpress_host_error");
        assert!(host.list_credentials(admin.id).unwrap().is_empty());

        let mut store = host.0;
        assert_eq!(connect(&mut store, &plugin, &admin), Redirect { created: true });
    }

    #[test]
    fn test_created_render_clears_expired_secret() {
        let (_dir, mut store, plugin, admin) = setup();
        store
            .set_flash(
                &flash::created_key(admin.id),
                "{\"site_url\":\"x\",\"username\":\"alice\",\"password\":\"stale\"}".into(),
                Duration::seconds(-1),
            )
            .unwrap();

        let page = plugin.render_page(&mut store, &admin, true).unwrap();
        assert!(matches!(page.view, View::Disconnected));
        assert!(store.data().transients.is_empty());
    }

    #[test]
    fn test_out_of_range_lifetime_is_refused() {
        let (_dir, mut store, _, admin) = setup();
        let config = PluginConfig {
            created_ttl_secs: i64::MAX,
            ..PluginConfig::default()
        };
        let plugin = Plugin::new(config, &store.data().site.nonce_secret.clone());
        let nonce = plugin.issue_nonce(constants::ACTION_CREATE, &admin).unwrap();

        let err = plugin.handle_create(&mut store, &admin, &nonce).unwrap_err();
        assert_eq!(err.code(), "clawpress_host_error");
        assert!(store.list_credentials(admin.id).unwrap().is_empty());
    }
}
