//! Per-user usage of the integration, recomputed on every view.

use crate::constants;
use crate::core::ports::ContentStore;
use crate::error::ClawResult;
use crate::models::content::{ContentId, ContentKind, PostStatus};
use crate::models::user::UserId;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageStats {
    pub post_count: usize,
    pub media_count: usize,
    pub recent_posts: Vec<RecentItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentItem {
    pub id: ContentId,
    pub title: String,
    pub date: DateTime<Utc>,
    pub status: PostStatus,
    pub kind: ContentKind,
}

/// Posts/pages exclude trash; attachments are counted regardless of status.
pub fn usage_stats<S: ContentStore + ?Sized>(
    store: &S,
    user: UserId,
    recent_limit: usize,
) -> ClawResult<UsageStats> {
    let tagged = store.items_with_meta(user, constants::ATTRIBUTION_META_KEY)?;

    let mut posts: Vec<_> = tagged
        .iter()
        .filter(|c| c.kind.is_post_like() && c.status != PostStatus::Trash)
        .collect();
    let media_count = tagged
        .iter()
        .filter(|c| c.kind == ContentKind::Attachment)
        .count();

    posts.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    let recent_posts = posts
        .iter()
        .take(recent_limit)
        .map(|c| RecentItem {
            id: c.id,
            title: c.title.clone(),
            date: c.date,
            status: c.status,
            kind: c.kind,
        })
        .collect();

    Ok(UsageStats {
        post_count: posts.len(),
        media_count,
        recent_posts,
    })
}
