//! Host content items (posts, pages, attachments) and their metadata.

use crate::models::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type ContentId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Post,
    Page,
    Attachment,
}

impl ContentKind {
    /// Posts and pages are counted together in usage stats.
    pub fn is_post_like(&self) -> bool {
        matches!(self, ContentKind::Post | ContentKind::Page)
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentKind::Post => "post",
            ContentKind::Page => "page",
            ContentKind::Attachment => "attachment",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    Inherit,
    Trash,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Publish => "publish",
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Private => "private",
            PostStatus::Future => "future",
            PostStatus::Inherit => "inherit",
            PostStatus::Trash => "trash",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "publish" => Ok(PostStatus::Publish),
            "draft" => Ok(PostStatus::Draft),
            "pending" => Ok(PostStatus::Pending),
            "private" => Ok(PostStatus::Private),
            "future" => Ok(PostStatus::Future),
            "inherit" => Ok(PostStatus::Inherit),
            "trash" => Ok(PostStatus::Trash),
            other => Err(format!("invalid status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: ContentId,
    pub author: UserId,
    pub kind: ContentKind,
    pub title: String,
    pub status: PostStatus,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// Insert request handed to the content store.
#[derive(Debug, Clone)]
pub struct NewContent {
    pub author: UserId,
    pub kind: ContentKind,
    pub title: String,
    pub status: PostStatus,
    /// Creation date; the store stamps the current time when absent.
    pub date: Option<DateTime<Utc>>,
}

impl NewContent {
    pub fn new(author: UserId, kind: ContentKind, title: impl Into<String>) -> Self {
        let status = match kind {
            ContentKind::Attachment => PostStatus::Inherit,
            _ => PostStatus::Draft,
        };
        Self {
            author,
            kind,
            title: title.into(),
            status,
            date: None,
        }
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }
}
