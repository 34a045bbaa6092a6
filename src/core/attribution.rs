//! Request attribution: decide whether a request was authenticated with the
//! integration credential, and tag content it creates.

use crate::constants;
use crate::core::events::{ContentEvent, ContentListener};
use crate::core::ports::{ContentStore, CredentialStore, Host};
use crate::core::request::{RequestContext, RequestKind};
use crate::error::ClawResult;
use crate::models::content::ContentId;
use crate::models::integration::Integration;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};

/// True iff this is an authenticated API request whose credential carries
/// the reserved name. Never errors; computed once per request.
pub fn is_integration_request<C: CredentialStore + ?Sized>(
    request: &RequestContext,
    credentials: &C,
    integration: &Integration,
) -> bool {
    *request
        .attribution_cache()
        .get_or_init(|| evaluate(request, credentials, integration))
}

fn evaluate<C: CredentialStore + ?Sized>(
    request: &RequestContext,
    credentials: &C,
    integration: &Integration,
) -> bool {
    if request.kind() != RequestKind::Api {
        return false;
    }
    let Some(user) = request.user() else {
        return false;
    };
    let Some(uuid) = request.credential() else {
        return false;
    };
    match credentials.list_credentials(user) {
        Ok(list) => list
            .iter()
            .find(|c| c.uuid == uuid)
            .is_some_and(|c| integration.owns(c)),
        Err(err) => {
            warn!(user, error = %err, "credential lookup failed during attribution");
            false
        }
    }
}

pub fn tag_item<S: ContentStore + ?Sized>(
    store: &mut S,
    id: ContentId,
    at: DateTime<Utc>,
) -> ClawResult<()> {
    store.set_meta(id, constants::ATTRIBUTION_META_KEY, &at.timestamp().to_string())
}

/// When the item was tagged, if it was.
pub fn tagged_at<S: ContentStore + ?Sized>(
    store: &S,
    id: ContentId,
) -> ClawResult<Option<DateTime<Utc>>> {
    Ok(store
        .get_meta(id, constants::ATTRIBUTION_META_KEY)?
        .and_then(|v| v.parse::<i64>().ok())
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single()))
}

/// Content listener tagging posts, pages, and attachments created under the
/// integration credential.
pub struct AttributionTracker {
    integration: Integration,
}

impl AttributionTracker {
    pub fn new(integration: Integration) -> Self {
        Self { integration }
    }
}

impl ContentListener for AttributionTracker {
    fn name(&self) -> &str {
        "attribution"
    }

    fn on_created(
        &self,
        event: &ContentEvent,
        request: &RequestContext,
        host: &mut dyn Host,
    ) -> ClawResult<()> {
        if !is_integration_request(request, &*host, &self.integration) {
            return Ok(());
        }
        let id = event.item_id();
        tag_item(host, id, Utc::now())?;
        debug!(item = id, "tagged content created via integration credential");
        Ok(())
    }
}
