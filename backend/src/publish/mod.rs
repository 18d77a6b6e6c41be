//! Publishing a session's content to the store.
//!
//! The session lock is only held to take the ticket and to settle it, never
//! across the store write, so edits keep working while a publish is running
//! and cannot leak into the payload already captured.

use crate::cache::CacheInvalidator;
use crate::errors::AppError;
use crate::models::RevisionInfo;
use crate::session::SessionHandle;
use crate::store::ContentStore;

/// Publish the session's present snapshot.
///
/// With `enforce_revision` set, a publish from a session loaded before some
/// other session's publish fails with a conflict instead of overwriting it.
pub async fn publish_session(
    session: &SessionHandle,
    store: &dyn ContentStore,
    cache: &dyn CacheInvalidator,
    enforce_revision: bool,
) -> Result<RevisionInfo, AppError> {
    let (session_id, ticket) = {
        let mut guard = session.lock().await;
        (guard.id(), guard.begin_publish()?)
    };
    tracing::info!(%session_id, base_revision = ticket.expected_revision, "Publishing content");

    let expected = enforce_revision.then_some(ticket.expected_revision);
    let result = store.publish(&ticket.snapshot, expected).await;

    match &result {
        Ok(revision) => {
            cache.invalidate_public_pages();
            tracing::info!(%session_id, revision_id = revision.revision_id, "Publish succeeded");
        }
        Err(e @ AppError::PartialPersistence { .. }) => {
            // Some sections changed on disk; the cached copy no longer matches.
            cache.invalidate_public_pages();
            tracing::warn!(%session_id, "Publish partially written: {}", e);
        }
        Err(e) => tracing::warn!(%session_id, "Publish failed: {}", e),
    }

    session.lock().await.finish_publish(ticket, &result);
    result
}
