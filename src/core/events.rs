//! Content pipeline: commit an item in the host, then notify listeners.

use crate::core::ports::Host;
use crate::core::request::RequestContext;
use crate::error::ClawResult;
use crate::models::content::{ContentId, ContentItem, ContentKind, NewContent};
use tracing::warn;

/// Fired after the host has durably created an item.
#[derive(Debug, Clone)]
pub enum ContentEvent {
    /// Post or page inserted through the content API.
    PostInserted(ContentItem),
    /// Media attachment added.
    AttachmentAdded(ContentId),
}

impl ContentEvent {
    pub fn item_id(&self) -> ContentId {
        match self {
            ContentEvent::PostInserted(item) => item.id,
            ContentEvent::AttachmentAdded(id) => *id,
        }
    }
}

pub trait ContentListener {
    fn name(&self) -> &str;

    fn on_created(
        &self,
        event: &ContentEvent,
        request: &RequestContext,
        host: &mut dyn Host,
    ) -> ClawResult<()>;
}

#[derive(Default)]
pub struct ContentPipeline {
    listeners: Vec<Box<dyn ContentListener>>,
}

impl ContentPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Box<dyn ContentListener>) {
        self.listeners.push(listener);
    }

    /// Insert, then dispatch synchronously. Listener failures are logged and
    /// never roll back the committed item. Returns the item as stored after
    /// listeners ran.
    pub fn insert(
        &self,
        host: &mut dyn Host,
        request: &RequestContext,
        item: NewContent,
    ) -> ClawResult<ContentItem> {
        let created = host.insert_item(item)?;
        let event = match created.kind {
            ContentKind::Attachment => ContentEvent::AttachmentAdded(created.id),
            ContentKind::Post | ContentKind::Page => ContentEvent::PostInserted(created.clone()),
        };
        self.dispatch(&event, request, host);
        Ok(host.get_item(created.id)?.unwrap_or(created))
    }

    pub fn dispatch(&self, event: &ContentEvent, request: &RequestContext, host: &mut dyn Host) {
        for listener in &self.listeners {
            if let Err(err) = listener.on_created(event, request, host) {
                warn!(
                    listener = listener.name(),
                    item = event.item_id(),
                    error = %err,
                    "content listener failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ports::ContentStore;
    use crate::core::site_store::testing::test_store;
    use crate::error::ClawError;
    use crate::models::user::Role;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        seen: Rc<RefCell<Vec<ContentId>>>,
    }

    impl ContentListener for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn on_created(
            &self,
            event: &ContentEvent,
            _request: &RequestContext,
            host: &mut dyn Host,
        ) -> ClawResult<()> {
            assert!(host.get_item(event.item_id())?.is_some(), "listener runs post-commit");
            self.seen.borrow_mut().push(event.item_id());
            Ok(())
        }
    }

    struct Failing;

    impl ContentListener for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn on_created(&self, _: &ContentEvent, _: &RequestContext, _: &mut dyn Host) -> ClawResult<()> {
            Err(ClawError::host("boom"))
        }
    }

    #[test]
    fn test_listener_sees_committed_item() {
        let (_dir, mut store) = test_store();
        let user = store.add_user("alice", Role::Author).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut pipeline = ContentPipeline::new();
        pipeline.subscribe(Box::new(Failing));
        pipeline.subscribe(Box::new(Recorder { seen: seen.clone() }));

        let request = RequestContext::api_session(user.id);
        let post = pipeline
            .insert(&mut store, &request, NewContent::new(user.id, ContentKind::Post, "A"))
            .unwrap();
        let media = pipeline
            .insert(&mut store, &request, NewContent::new(user.id, ContentKind::Attachment, "B"))
            .unwrap();

        assert_eq!(*seen.borrow(), vec![post.id, media.id]);
        assert!(store.get_item(post.id).unwrap().is_some());
    }

    #[test]
    fn test_event_kinds() {
        let (_dir, mut store) = test_store();
        let user = store.add_user("alice", Role::Author).unwrap();
        let item = store
            .insert_item(NewContent::new(user.id, ContentKind::Page, "About"))
            .unwrap();
        let event = ContentEvent::PostInserted(item.clone());
        assert_eq!(event.item_id(), item.id);
        assert_eq!(ContentEvent::AttachmentAdded(9).item_id(), 9);
    }
}
