use clawpress::constants;
use clawpress::core::admin::{self, Plugin, View};
use clawpress::core::attribution::tagged_at;
use clawpress::core::paths::SitePaths;
use clawpress::core::ports::{ContentStore, CredentialStore};
use clawpress::core::request::RequestContext;
use clawpress::core::site_store::SiteStore;
use clawpress::models::content::{ContentKind, NewContent, PostStatus};
use clawpress::models::user::Role;
use tempfile::TempDir;

fn open_site(dir: &TempDir) -> SiteStore {
    SiteStore::open(&SitePaths::from_root(dir.path().to_path_buf())).unwrap()
}

#[test]
fn agent_content_is_attributed_and_counted_across_invocations() {
    let dir = TempDir::new().unwrap();
    let paths = SitePaths::from_root(dir.path().to_path_buf());

    // site init + add user
    {
        let mut store = SiteStore::init(&paths, Some("https://blog.example/")).unwrap();
        store.add_user("alice", Role::Administrator).unwrap();
        store.save().unwrap();
    }

    // connect, then the single render that reveals the password
    let password = {
        let mut store = open_site(&dir);
        let alice = store.require_user("alice").unwrap();
        let plugin = Plugin::from_site(store.data());
        let nonce = plugin.issue_nonce(constants::ACTION_CREATE, &alice).unwrap();
        let redirect = plugin.handle_create(&mut store, &alice, &nonce).unwrap();
        store.save().unwrap();
        let page = plugin.render_page(&mut store, &alice, redirect.created).unwrap();
        store.save().unwrap();
        match page.view {
            View::JustCreated { ref connection, .. } => connection.password.clone(),
            other => panic!("expected just-created view, got {:?}", other),
        }
    };

    // the agent posts with the application password; a human posts without it
    {
        let mut store = open_site(&dir);
        let plugin = Plugin::from_site(store.data());
        let pipeline = plugin.content_pipeline();

        let (user, uuid) = store.authenticate("alice", &password).unwrap().unwrap();
        let agent = RequestContext::api(user, uuid);
        for title in ["First", "Second", "Third"] {
            pipeline
                .insert(
                    &mut store,
                    &agent,
                    NewContent::new(user, ContentKind::Post, title).with_status(PostStatus::Publish),
                )
                .unwrap();
        }
        for file in ["a.png", "b.png"] {
            pipeline
                .insert(&mut store, &agent, NewContent::new(user, ContentKind::Attachment, file))
                .unwrap();
        }

        let human = RequestContext::api_session(user);
        let manual = pipeline
            .insert(&mut store, &human, NewContent::new(user, ContentKind::Post, "Manual"))
            .unwrap();
        assert_eq!(tagged_at(&store, manual.id).unwrap(), None);
        store.save().unwrap();
    }

    // trash one agent post, then check the connected view
    {
        let mut store = open_site(&dir);
        let alice = store.require_user("alice").unwrap();
        let first = store
            .data()
            .content
            .iter()
            .find(|c| c.title == "First")
            .map(|c| c.id)
            .unwrap();
        store.trash_item(first).unwrap();

        let plugin = Plugin::from_site(store.data());
        let page = plugin.render_page(&mut store, &alice, true).unwrap();
        let rendered = serde_json::to_string(&page).unwrap();
        assert!(!rendered.contains(&password));

        match page.view {
            View::Connected { credential, stats } => {
                assert!(credential.last_used.is_some());
                assert_eq!(stats.post_count, 2);
                assert_eq!(stats.media_count, 2);
                let titles: Vec<_> = stats.recent_posts.iter().map(|r| r.title.as_str()).collect();
                assert_eq!(titles, vec!["Third", "Second"]);
            }
            other => panic!("expected connected view, got {:?}", other),
        }
    }

    // uninstall removes tags but keeps the credential usable
    {
        let mut store = open_site(&dir);
        let report = admin::uninstall(&mut store).unwrap();
        assert_eq!(report.tags_removed, 5);
        store.save().unwrap();
        let alice = store.require_user("alice").unwrap();
        assert_eq!(store.list_credentials(alice.id).unwrap().len(), 1);
        assert!(store.authenticate("alice", &password).unwrap().is_some());
    }
}

#[test]
fn revoked_password_no_longer_authenticates() {
    let dir = TempDir::new().unwrap();
    let paths = SitePaths::from_root(dir.path().to_path_buf());
    let mut store = SiteStore::init(&paths, None).unwrap();
    let alice = store.add_user("alice", Role::Administrator).unwrap();
    let plugin = Plugin::from_site(store.data());

    let create = plugin.issue_nonce(constants::ACTION_CREATE, &alice).unwrap();
    plugin.handle_create(&mut store, &alice, &create).unwrap();
    let password = match plugin.render_page(&mut store, &alice, true).unwrap().view {
        View::JustCreated { ref connection, .. } => connection.password.clone(),
        other => panic!("expected just-created view, got {:?}", other),
    };

    let revoke = plugin.issue_nonce(constants::ACTION_REVOKE, &alice).unwrap();
    assert!(plugin.handle_revoke(&mut store, &alice, &revoke).success);
    assert!(store.authenticate("alice", &password).unwrap().is_none());
    assert!(matches!(
        plugin.render_page(&mut store, &alice, false).unwrap().view,
        View::Disconnected
    ));
}
