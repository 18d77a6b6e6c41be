//! Admin editing sessions.
//!
//! An [`EditingSession`] wraps the undo/redo history, remembers the last
//! snapshot known to be on disk (the baseline) and tracks whether a publish
//! is in flight. Sessions are explicit objects owned by the
//! [`SessionRegistry`] and handed to handlers by id.

mod history;
mod registry;

pub use history::*;
pub use registry::*;

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{ContentSnapshot, PublishedContent, RevisionInfo, Section, SectionData};

/// One admin's in-memory editing state.
#[derive(Debug)]
pub struct EditingSession {
    id: Uuid,
    history: HistoryStore,
    baseline: Arc<ContentSnapshot>,
    base_revision: i64,
    is_saving: bool,
}

/// Point-in-time copy of the present snapshot taken when a publish starts.
#[derive(Debug, Clone)]
pub struct PublishTicket {
    pub snapshot: Arc<ContentSnapshot>,
    pub expected_revision: i64,
}

/// What the admin UI needs to render a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: Uuid,
    pub content: ContentSnapshot,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Number of steps `undo` can take
    pub undo_depth: usize,
    /// Number of steps `redo` can take
    pub redo_depth: usize,
    pub is_dirty: bool,
    pub is_saving: bool,
    pub base_revision: i64,
}

impl EditingSession {
    /// Start a session from the content currently in the store.
    pub fn initialize(published: PublishedContent) -> Self {
        let baseline = Arc::new(published.content.clone());
        Self {
            id: Uuid::new_v4(),
            history: HistoryStore::new(published.content),
            baseline,
            base_revision: published.revision_id,
            is_saving: false,
        }
    }

    /// Throw away history and edits and start over from freshly loaded content.
    ///
    /// Used after a publish conflict. Refused while a publish is in flight.
    pub fn reload(&mut self, published: PublishedContent) -> Result<(), AppError> {
        if self.is_saving {
            return Err(AppError::PublishInProgress);
        }
        self.baseline = Arc::new(published.content.clone());
        self.base_revision = published.revision_id;
        self.history.apply(HistoryAction::Init(published.content))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn present(&self) -> &ContentSnapshot {
        self.history.present()
    }

    pub fn history(&self) -> &HistoryState {
        self.history.state()
    }

    pub fn base_revision(&self) -> i64 {
        self.base_revision
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn is_saving(&self) -> bool {
        self.is_saving
    }

    /// Whether the present differs from what was last published.
    pub fn is_dirty(&self) -> bool {
        **self.history.present() != *self.baseline
    }

    /// Replace one section as a single undo step.
    pub fn update_section(&mut self, data: SectionData) -> Result<(), AppError> {
        data.validate()?;
        self.history.apply(HistoryAction::UpdateSection {
            section: data.section(),
            data,
        })
    }

    pub fn undo(&mut self) {
        // Undo and redo cannot fail; at the edge of history they do nothing.
        let _ = self.history.apply(HistoryAction::Undo);
    }

    pub fn redo(&mut self) {
        let _ = self.history.apply(HistoryAction::Redo);
    }

    /// Drag-and-drop reorder within a list section. Returns whether anything moved.
    pub fn reorder(
        &mut self,
        section: Section,
        active_id: &str,
        over_id: &str,
    ) -> Result<bool, AppError> {
        match self.present().section(section).reorder(active_id, over_id)? {
            Some(data) => self.update_section(data).map(|()| true),
            None => Ok(false),
        }
    }

    /// Append a placeholder item to a list section.
    pub fn add_item(&mut self, section: Section, category: Option<&str>) -> Result<(), AppError> {
        let data = self.present().section(section).with_new_item(category)?;
        self.update_section(data)
    }

    /// Remove one item from a list section.
    pub fn remove_item(&mut self, section: Section, item_id: &str) -> Result<(), AppError> {
        match self.present().section(section).without_item(item_id)? {
            Some(data) => self.update_section(data),
            None => Err(AppError::NotFound(format!(
                "Item {} not found in {}",
                item_id, section
            ))),
        }
    }

    /// Capture the present for publishing and mark the session as saving.
    pub fn begin_publish(&mut self) -> Result<PublishTicket, AppError> {
        if self.is_saving {
            return Err(AppError::PublishInProgress);
        }
        self.is_saving = true;
        Ok(PublishTicket {
            snapshot: Arc::clone(self.history.present()),
            expected_revision: self.base_revision,
        })
    }

    /// Settle a publish started with [`EditingSession::begin_publish`].
    ///
    /// On success the published snapshot (not the current present) becomes
    /// the baseline. On failure the baseline is left alone so the edits stay
    /// pending. After a partial write the session moves to the store's new
    /// revision, since part of its own payload is what is live.
    pub fn finish_publish(
        &mut self,
        ticket: PublishTicket,
        outcome: &Result<RevisionInfo, AppError>,
    ) {
        self.is_saving = false;
        match outcome {
            Ok(revision) => {
                self.baseline = ticket.snapshot;
                self.base_revision = revision.revision_id;
            }
            Err(AppError::PartialPersistence {
                current_revision, ..
            }) => self.base_revision = *current_revision,
            Err(_) => {}
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.id,
            content: self.present().clone(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_depth: self.history().past.len(),
            redo_depth: self.history().future.len(),
            is_dirty: self.is_dirty(),
            is_saving: self.is_saving,
            base_revision: self.base_revision,
        }
    }
}
