//! Content sections: the unit of undoable mutation and of persistence.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::items::{FaqItem, GalleryItem, ListItem, MenuItem, StaffItem, MENU_CATEGORIES};
use crate::errors::AppError;

/// Free-form site information record (address, hours, social links...).
pub type SiteInfo = Map<String, Value>;

/// One of the five named content sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    Menu,
    Gallery,
    Staff,
    Faq,
    SiteInfo,
}

impl Section {
    pub const ALL: [Section; 5] = [
        Section::Menu,
        Section::Gallery,
        Section::Staff,
        Section::Faq,
        Section::SiteInfo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Menu => "menu",
            Section::Gallery => "gallery",
            Section::Staff => "staff",
            Section::Faq => "faq",
            Section::SiteInfo => "siteInfo",
        }
    }

    /// File the section is persisted to inside the data directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            Section::Menu => "menu.json",
            Section::Gallery => "gallery.json",
            Section::Staff => "staff.json",
            Section::Faq => "faq.json",
            Section::SiteInfo => "site-info.json",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "menu" => Ok(Section::Menu),
            "gallery" => Ok(Section::Gallery),
            "staff" => Ok(Section::Staff),
            "faq" => Ok(Section::Faq),
            "siteInfo" => Ok(Section::SiteInfo),
            other => Err(AppError::InvalidSection(other.to_string())),
        }
    }
}

/// The typed value of a single section.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionData {
    Menu(Vec<MenuItem>),
    Gallery(Vec<GalleryItem>),
    Staff(Vec<StaffItem>),
    Faq(Vec<FaqItem>),
    SiteInfo(SiteInfo),
}

impl SectionData {
    pub fn section(&self) -> Section {
        match self {
            SectionData::Menu(_) => Section::Menu,
            SectionData::Gallery(_) => Section::Gallery,
            SectionData::Staff(_) => Section::Staff,
            SectionData::Faq(_) => Section::Faq,
            SectionData::SiteInfo(_) => Section::SiteInfo,
        }
    }

    /// Value used when a section has never been written or cannot be read.
    pub fn empty(section: Section) -> Self {
        match section {
            Section::Menu => SectionData::Menu(Vec::new()),
            Section::Gallery => SectionData::Gallery(Vec::new()),
            Section::Staff => SectionData::Staff(Vec::new()),
            Section::Faq => SectionData::Faq(Vec::new()),
            Section::SiteInfo => SectionData::SiteInfo(Map::new()),
        }
    }

    /// Decode a raw JSON document as the given section.
    pub fn from_json(section: Section, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match section {
            Section::Menu => SectionData::Menu(serde_json::from_value(value)?),
            Section::Gallery => SectionData::Gallery(serde_json::from_value(value)?),
            Section::Staff => SectionData::Staff(serde_json::from_value(value)?),
            Section::Faq => SectionData::Faq(serde_json::from_value(value)?),
            Section::SiteInfo => SectionData::SiteInfo(serde_json::from_value(value)?),
        })
    }

    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        match self {
            SectionData::Menu(items) => serde_json::to_value(items),
            SectionData::Gallery(items) => serde_json::to_value(items),
            SectionData::Staff(items) => serde_json::to_value(items),
            SectionData::Faq(items) => serde_json::to_value(items),
            SectionData::SiteInfo(info) => serde_json::to_value(info),
        }
    }

    /// Check list identity: every id present and unique within its list.
    pub fn validate(&self) -> Result<(), AppError> {
        match self {
            SectionData::Menu(items) => validate_ids(Section::Menu, items),
            SectionData::Gallery(items) => validate_ids(Section::Gallery, items),
            SectionData::Staff(items) => validate_ids(Section::Staff, items),
            SectionData::Faq(items) => validate_ids(Section::Faq, items),
            SectionData::SiteInfo(_) => Ok(()),
        }
    }

    /// Move the item `active_id` to the position currently held by `over_id`.
    ///
    /// Returns `Ok(None)` when the move would not change anything (same id, or
    /// either id is not in the list), mirroring a drop outside any target.
    pub fn reorder(&self, active_id: &str, over_id: &str) -> Result<Option<Self>, AppError> {
        if active_id == over_id {
            return Ok(None);
        }
        Ok(match self {
            SectionData::Menu(items) => move_item(items, active_id, over_id).map(SectionData::Menu),
            SectionData::Gallery(items) => {
                move_item(items, active_id, over_id).map(SectionData::Gallery)
            }
            SectionData::Staff(items) => {
                move_item(items, active_id, over_id).map(SectionData::Staff)
            }
            SectionData::Faq(items) => move_item(items, active_id, over_id).map(SectionData::Faq),
            SectionData::SiteInfo(_) => return Err(not_a_list()),
        })
    }

    /// Copy of the section without the item `id`, or `None` if it is absent.
    pub fn without_item(&self, id: &str) -> Result<Option<Self>, AppError> {
        Ok(match self {
            SectionData::Menu(items) => remove_item(items, id).map(SectionData::Menu),
            SectionData::Gallery(items) => remove_item(items, id).map(SectionData::Gallery),
            SectionData::Staff(items) => remove_item(items, id).map(SectionData::Staff),
            SectionData::Faq(items) => remove_item(items, id).map(SectionData::Faq),
            SectionData::SiteInfo(_) => return Err(not_a_list()),
        })
    }

    /// Copy of the section with a freshly created placeholder item appended.
    ///
    /// Menu items need a category from [`MENU_CATEGORIES`].
    pub fn with_new_item(&self, category: Option<&str>) -> Result<Self, AppError> {
        Ok(match self {
            SectionData::Menu(items) => {
                let category = category.ok_or_else(|| {
                    AppError::Validation("category is required for menu items".to_string())
                })?;
                if !MENU_CATEGORIES.contains(&category) {
                    return Err(AppError::Validation(format!(
                        "Unknown menu category: {}",
                        category
                    )));
                }
                SectionData::Menu(appended(items, MenuItem::new_in_category(category)))
            }
            SectionData::Gallery(items) => {
                SectionData::Gallery(appended(items, GalleryItem::new_placeholder()))
            }
            SectionData::Staff(items) => {
                SectionData::Staff(appended(items, StaffItem::new_placeholder()))
            }
            SectionData::Faq(items) => SectionData::Faq(appended(items, FaqItem::new_placeholder())),
            SectionData::SiteInfo(_) => return Err(not_a_list()),
        })
    }
}

fn validate_ids<T: ListItem>(section: Section, items: &[T]) -> Result<(), AppError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        if item.id().trim().is_empty() {
            return Err(AppError::Validation(format!(
                "Every {} item needs an id",
                section
            )));
        }
        if !seen.insert(item.id()) {
            return Err(AppError::Validation(format!(
                "Duplicate id {} in {}",
                item.id(),
                section
            )));
        }
    }
    Ok(())
}

fn move_item<T: ListItem + Clone>(items: &[T], active_id: &str, over_id: &str) -> Option<Vec<T>> {
    let from = items.iter().position(|i| i.id() == active_id)?;
    let to = items.iter().position(|i| i.id() == over_id)?;
    let mut moved = items.to_vec();
    let item = moved.remove(from);
    moved.insert(to, item);
    Some(moved)
}

fn remove_item<T: ListItem + Clone>(items: &[T], id: &str) -> Option<Vec<T>> {
    if !items.iter().any(|i| i.id() == id) {
        return None;
    }
    Some(items.iter().filter(|i| i.id() != id).cloned().collect())
}

fn appended<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut out = items.to_vec();
    out.push(item);
    out
}

fn not_a_list() -> AppError {
    AppError::Validation("siteInfo is a record, not a list".to_string())
}
