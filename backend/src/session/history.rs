//! Linear undo/redo history over content snapshots.

use std::sync::Arc;

use crate::errors::AppError;
use crate::models::{ContentSnapshot, Section, SectionData};

/// Past, present and future snapshots of one editing session.
///
/// `past` runs oldest to newest (top of stack is the last element);
/// `future` runs nearest to farthest (top of stack is the first element).
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryState {
    pub past: Vec<Arc<ContentSnapshot>>,
    pub present: Arc<ContentSnapshot>,
    pub future: Vec<Arc<ContentSnapshot>>,
}

/// The four transitions the history understands.
#[derive(Debug, Clone)]
pub enum HistoryAction {
    Init(ContentSnapshot),
    UpdateSection { section: Section, data: SectionData },
    Undo,
    Redo,
}

/// Owner of a [`HistoryState`]; every change goes through [`HistoryStore::apply`].
#[derive(Debug, Clone)]
pub struct HistoryStore {
    state: HistoryState,
}

impl HistoryStore {
    pub fn new(snapshot: ContentSnapshot) -> Self {
        Self {
            state: HistoryState {
                past: Vec::new(),
                present: Arc::new(snapshot),
                future: Vec::new(),
            },
        }
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn present(&self) -> &Arc<ContentSnapshot> {
        &self.state.present
    }

    pub fn can_undo(&self) -> bool {
        !self.state.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.state.future.is_empty()
    }

    /// Apply one transition. Undo/redo at the edge of history are no-ops.
    pub fn apply(&mut self, action: HistoryAction) -> Result<(), AppError> {
        match action {
            HistoryAction::Init(snapshot) => {
                *self = Self::new(snapshot);
            }
            HistoryAction::UpdateSection { section, data } => {
                if data.section() != section {
                    return Err(AppError::InvalidSection(format!(
                        "{} (payload is {})",
                        section,
                        data.section()
                    )));
                }
                let next = Arc::new(self.state.present.with_section(data));
                let previous = std::mem::replace(&mut self.state.present, next);
                self.state.past.push(previous);
                self.state.future.clear();
            }
            HistoryAction::Undo => {
                if let Some(previous) = self.state.past.pop() {
                    let current = std::mem::replace(&mut self.state.present, previous);
                    self.state.future.insert(0, current);
                }
            }
            HistoryAction::Redo => {
                if !self.state.future.is_empty() {
                    let next = self.state.future.remove(0);
                    let current = std::mem::replace(&mut self.state.present, next);
                    self.state.past.push(current);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FaqItem, MenuItem};

    fn menu_item(id: &str, price: u32) -> MenuItem {
        MenuItem {
            id: id.to_string(),
            category: "Cut".to_string(),
            name: format!("Cut {}", id),
            price,
            description: String::new(),
        }
    }

    fn faq_item(id: &str) -> FaqItem {
        FaqItem {
            id: id.to_string(),
            question: format!("Q{}", id),
            answer: format!("A{}", id),
        }
    }

    fn update(section: Section, data: SectionData) -> HistoryAction {
        HistoryAction::UpdateSection { section, data }
    }

    fn edited_store(edits: usize) -> HistoryStore {
        let mut store = HistoryStore::new(ContentSnapshot::default());
        for i in 0..edits {
            let items = (0..=i).map(|n| menu_item(&n.to_string(), n as u32)).collect();
            store
                .apply(update(Section::Menu, SectionData::Menu(items)))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_init_resets_history() {
        let mut store = edited_store(3);
        store.apply(HistoryAction::Undo).unwrap();

        let fresh = ContentSnapshot::default().with_section(SectionData::Faq(vec![faq_item("x")]));
        store.apply(HistoryAction::Init(fresh.clone())).unwrap();

        assert!(store.state().past.is_empty());
        assert!(store.state().future.is_empty());
        assert_eq!(**store.present(), fresh);
    }

    #[test]
    fn test_update_pushes_present_and_clears_future() {
        let mut store = edited_store(2);
        store.apply(HistoryAction::Undo).unwrap();
        assert_eq!(store.state().future.len(), 1);

        store
            .apply(update(Section::Faq, SectionData::Faq(vec![faq_item("1")])))
            .unwrap();

        assert_eq!(store.state().past.len(), 2);
        assert!(store.state().future.is_empty());
        let before = store.state().clone();
        store.apply(HistoryAction::Redo).unwrap();
        assert_eq!(*store.state(), before);
    }

    #[test]
    fn test_update_with_mismatched_payload_is_invalid_section() {
        let mut store = HistoryStore::new(ContentSnapshot::default());
        let err = store
            .apply(update(Section::Menu, SectionData::Faq(Vec::new())))
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SECTION");
        assert!(!store.can_undo());
    }

    #[test]
    fn test_round_trip_through_undo() {
        for edits in [1, 2, 5, 10] {
            let mut store = edited_store(edits);
            for _ in 0..edits {
                store.apply(HistoryAction::Undo).unwrap();
            }
            assert_eq!(**store.present(), ContentSnapshot::default());
            assert!(store.state().past.is_empty());
            assert_eq!(store.state().future.len(), edits);
        }
    }

    #[test]
    fn test_redo_cancels_undo() {
        let mut store = edited_store(4);
        store.apply(HistoryAction::Undo).unwrap();
        let before = store.state().clone();

        store.apply(HistoryAction::Undo).unwrap();
        store.apply(HistoryAction::Redo).unwrap();

        assert_eq!(store.present(), &before.present);
        assert_eq!(store.state().past.len(), before.past.len());
        assert_eq!(store.state().future.len(), before.future.len());
    }

    #[test]
    fn test_boundaries_are_idempotent() {
        let mut store = HistoryStore::new(ContentSnapshot::default());
        let initial = store.state().clone();
        for _ in 0..3 {
            store.apply(HistoryAction::Undo).unwrap();
            assert_eq!(*store.state(), initial);
            store.apply(HistoryAction::Redo).unwrap();
            assert_eq!(*store.state(), initial);
        }

        let mut store = edited_store(1);
        let edited = store.state().clone();
        store.apply(HistoryAction::Redo).unwrap();
        assert_eq!(*store.state(), edited);
    }

    #[test]
    fn test_faq_undo_redo_scenario() {
        let mut store = HistoryStore::new(ContentSnapshot::default());
        store
            .apply(update(Section::Faq, SectionData::Faq(vec![faq_item("1")])))
            .unwrap();
        assert!(store.can_undo());

        store.apply(HistoryAction::Undo).unwrap();
        assert!(store.present().faq.is_empty());
        assert!(!store.can_undo());
        assert!(store.can_redo());

        store.apply(HistoryAction::Redo).unwrap();
        assert_eq!(store.present().faq, vec![faq_item("1")]);
    }

    #[test]
    fn test_two_menu_edits_undo_to_start() {
        let a = menu_item("a", 3000);
        let b = menu_item("b", 5000);
        let mut store = HistoryStore::new(ContentSnapshot::default());
        store
            .apply(update(Section::Menu, SectionData::Menu(vec![a.clone()])))
            .unwrap();
        store
            .apply(update(Section::Menu, SectionData::Menu(vec![a, b])))
            .unwrap();

        store.apply(HistoryAction::Undo).unwrap();
        store.apply(HistoryAction::Undo).unwrap();

        assert!(store.present().menu.is_empty());
        assert!(store.state().past.is_empty());
    }
}
