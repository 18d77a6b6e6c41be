//! Admin editing session endpoints.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::content::store_revision;
use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Section, SectionData};
use crate::publish::publish_session;
use crate::session::{EditingSession, SessionHandle, SessionView};
use crate::AppState;

/// Request body for a drag-and-drop reorder.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub active_id: String,
    pub over_id: String,
}

/// Request body for adding a placeholder item.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    /// Required for menu items
    #[serde(default)]
    pub category: Option<String>,
}

async fn lookup(state: &AppState, id: &str) -> Result<SessionHandle, AppError> {
    let id = Uuid::parse_str(id)
        .map_err(|_| AppError::NotFound(format!("Session {} not found", id)))?;
    state.sessions.get(id).await
}

/// Run one edit against a session and answer with its new view.
async fn edit_session<F>(state: &AppState, id: &str, edit: F) -> ApiResult<SessionView>
where
    F: FnOnce(&mut EditingSession) -> Result<(), AppError>,
{
    let handle = match lookup(state, id).await {
        Ok(handle) => handle,
        Err(e) => return error(e, store_revision(state).await),
    };

    let mut session = handle.lock().await;
    let result = edit(&mut *session);
    let revision_id = session.base_revision();
    match result {
        Ok(()) => success(session.view(), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/admin/sessions - Open an editing session over the stored content.
pub async fn create_session(State(state): State<AppState>) -> ApiResult<SessionView> {
    let published = match state.store.load().await {
        Ok(published) => published,
        Err(e) => return error(e, 0),
    };
    let revision_id = published.revision_id;

    let (_, handle) = state.sessions.open(published).await;
    let view = handle.lock().await.view();
    success(view, revision_id)
}

/// GET /api/admin/sessions/:id - Current state of a session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionView> {
    edit_session(&state, &id, |_| Ok(())).await
}

/// DELETE /api/admin/sessions/:id - Discard a session and its unpublished edits.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<()> {
    let revision_id = store_revision(&state).await;

    let result = match Uuid::parse_str(&id) {
        Ok(id) => state.sessions.close(id).await,
        Err(_) => Err(AppError::NotFound(format!("Session {} not found", id))),
    };
    match result {
        Ok(()) => success((), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/admin/sessions/:id/sections/:section - Replace one section.
pub async fn update_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<SessionView> {
    edit_session(&state, &id, |session| {
        let section: Section = section.parse()?;
        let data = SectionData::from_json(section, body).map_err(|e| {
            AppError::Validation(format!("Invalid {} data: {}", section, e))
        })?;
        session.update_section(data)
    })
    .await
}

/// POST /api/admin/sessions/:id/sections/:section/reorder - Move one item.
pub async fn reorder_section(
    State(state): State<AppState>,
    Path((id, section)): Path<(String, String)>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult<SessionView> {
    edit_session(&state, &id, |session| {
        let section: Section = section.parse()?;
        session
            .reorder(section, &request.active_id, &request.over_id)
            .map(|_| ())
    })
    .await
}

/// POST /api/admin/sessions/:id/sections/:section/items - Append a placeholder item.
pub async fn add_item(
    State(state): State<AppState>,
    Path((id, section)): Path<(String, String)>,
    Json(request): Json<AddItemRequest>,
) -> ApiResult<SessionView> {
    edit_session(&state, &id, |session| {
        let section: Section = section.parse()?;
        session.add_item(section, request.category.as_deref())
    })
    .await
}

/// DELETE /api/admin/sessions/:id/sections/:section/items/:item_id - Remove one item.
pub async fn remove_item(
    State(state): State<AppState>,
    Path((id, section, item_id)): Path<(String, String, String)>,
) -> ApiResult<SessionView> {
    edit_session(&state, &id, |session| {
        let section: Section = section.parse()?;
        session.remove_item(section, &item_id)
    })
    .await
}

/// POST /api/admin/sessions/:id/undo
pub async fn undo(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    edit_session(&state, &id, |session| {
        session.undo();
        Ok(())
    })
    .await
}

/// POST /api/admin/sessions/:id/redo
pub async fn redo(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<SessionView> {
    edit_session(&state, &id, |session| {
        session.redo();
        Ok(())
    })
    .await
}

/// POST /api/admin/sessions/:id/reload - Drop edits and reload the stored content.
pub async fn reload_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionView> {
    let handle = match lookup(&state, &id).await {
        Ok(handle) => handle,
        Err(e) => return error(e, store_revision(&state).await),
    };

    // Hold the session while reading so a publish cannot settle in between.
    let mut session = handle.lock().await;
    let result = match state.store.load().await {
        Ok(published) => session.reload(published),
        Err(e) => Err(e),
    };
    let revision_id = session.base_revision();
    match result {
        Ok(()) => success(session.view(), revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/admin/sessions/:id/publish - Write the session's content to the store.
pub async fn publish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<SessionView> {
    let handle = match lookup(&state, &id).await {
        Ok(handle) => handle,
        Err(e) => return error(e, store_revision(&state).await),
    };

    // Run to completion even if the client goes away, so the session never
    // stays stuck in the saving state.
    let task = {
        let handle = handle.clone();
        let store = state.store.clone();
        let cache = state.cache.clone();
        let enforce_revision = !state.config.last_writer_wins;
        tokio::spawn(async move {
            publish_session(&handle, store.as_ref(), cache.as_ref(), enforce_revision).await
        })
    };

    let result = match task.await {
        Ok(result) => result,
        Err(e) => Err(AppError::Internal(format!("Publish task failed: {}", e))),
    };

    let session = handle.lock().await;
    match result {
        Ok(revision) => success(session.view(), revision.revision_id),
        Err(e) => error(e, session.base_revision()),
    }
}
