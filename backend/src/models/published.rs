//! Published content and revision info served to the public site.

use serde::{Deserialize, Serialize};

use super::{ContentSnapshot, Section};

/// Revision information for change detection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}

/// The content currently on disk together with the revision it was written at.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedContent {
    pub revision_id: i64,
    pub generated_at: String,
    pub content: ContentSnapshot,
}

/// Outcome of one section's write during a publish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionWriteStatus {
    pub section: Section,
    pub written: bool,
}
