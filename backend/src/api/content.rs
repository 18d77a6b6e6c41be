//! Public content endpoints.

use axum::extract::State;

use super::{error, success, ApiResult};
use crate::models::{PublishedContent, RevisionInfo};
use crate::AppState;

/// Revision of the stored content, used for envelopes of requests that do not change it.
pub(crate) async fn store_revision(state: &AppState) -> i64 {
    state
        .store
        .revision()
        .await
        .map(|r| r.revision_id)
        .unwrap_or(0)
}

/// GET /api/content - Published content for the public pages.
pub async fn get_content(State(state): State<AppState>) -> ApiResult<PublishedContent> {
    match state.cache.get_or_load(state.store.as_ref()).await {
        Ok(content) => {
            let revision_id = content.revision_id;
            success(PublishedContent::clone(&content), revision_id)
        }
        Err(e) => error(e, 0),
    }
}

/// GET /api/content/revision - Current revision info.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    match state.store.revision().await {
        Ok(revision) => {
            let revision_id = revision.revision_id;
            success(revision, revision_id)
        }
        Err(e) => error(e, 0),
    }
}
