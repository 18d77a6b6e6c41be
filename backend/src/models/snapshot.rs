//! Content snapshot: every editable section at one point in time.

use serde::{Deserialize, Serialize};

use super::items::{FaqItem, GalleryItem, MenuItem, StaffItem};
use super::section::{Section, SectionData, SiteInfo};

/// A fully populated value of all five sections.
///
/// Snapshots are never edited in place; [`ContentSnapshot::with_section`]
/// builds the next one. Equality is structural and order-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentSnapshot {
    #[serde(default)]
    pub menu: Vec<MenuItem>,
    #[serde(default)]
    pub gallery: Vec<GalleryItem>,
    #[serde(default)]
    pub staff: Vec<StaffItem>,
    #[serde(default)]
    pub faq: Vec<FaqItem>,
    #[serde(default)]
    pub site_info: SiteInfo,
}

impl ContentSnapshot {
    /// Current value of one section.
    pub fn section(&self, section: Section) -> SectionData {
        match section {
            Section::Menu => SectionData::Menu(self.menu.clone()),
            Section::Gallery => SectionData::Gallery(self.gallery.clone()),
            Section::Staff => SectionData::Staff(self.staff.clone()),
            Section::Faq => SectionData::Faq(self.faq.clone()),
            Section::SiteInfo => SectionData::SiteInfo(self.site_info.clone()),
        }
    }

    /// A new snapshot with one section replaced.
    pub fn with_section(&self, data: SectionData) -> Self {
        let mut next = self.clone();
        next.set_section(data);
        next
    }

    /// Assemble a snapshot from its sections; missing sections stay empty.
    pub fn from_sections(sections: impl IntoIterator<Item = SectionData>) -> Self {
        let mut snapshot = Self::default();
        for data in sections {
            snapshot.set_section(data);
        }
        snapshot
    }

    fn set_section(&mut self, data: SectionData) {
        match data {
            SectionData::Menu(items) => self.menu = items,
            SectionData::Gallery(items) => self.gallery = items,
            SectionData::Staff(items) => self.staff = items,
            SectionData::Faq(items) => self.faq = items,
            SectionData::SiteInfo(info) => self.site_info = info,
        }
    }
}
