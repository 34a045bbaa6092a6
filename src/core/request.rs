//! Per-request authentication context.

use crate::models::user::UserId;
use chrono::{DateTime, Utc};
use std::cell::OnceCell;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Content API (REST) request.
    Api,
    /// Admin screen or form post.
    Admin,
}

/// What the host resolved about the current request. Lives for one request.
#[derive(Debug)]
pub struct RequestContext {
    kind: RequestKind,
    user: Option<UserId>,
    credential: Option<Uuid>,
    started_at: DateTime<Utc>,
    attribution: OnceCell<bool>,
}

impl RequestContext {
    pub fn new(kind: RequestKind, user: Option<UserId>, credential: Option<Uuid>) -> Self {
        Self {
            kind,
            user,
            credential,
            started_at: Utc::now(),
            attribution: OnceCell::new(),
        }
    }

    /// API request authenticated with an application password.
    pub fn api(user: UserId, credential: Uuid) -> Self {
        Self::new(RequestKind::Api, Some(user), Some(credential))
    }

    /// API request authenticated some other way (cookie session).
    pub fn api_session(user: UserId) -> Self {
        Self::new(RequestKind::Api, Some(user), None)
    }

    pub fn admin(user: UserId) -> Self {
        Self::new(RequestKind::Admin, Some(user), None)
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    pub fn credential(&self) -> Option<Uuid> {
        self.credential
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub(crate) fn attribution_cache(&self) -> &OnceCell<bool> {
        &self.attribution
    }
}
