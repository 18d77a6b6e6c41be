//! Persistent content store.
//!
//! Each section is one named JSON document. The file-backed implementation is
//! the source of truth for the public site.

mod json_file;

pub use json_file::*;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::{ContentSnapshot, PublishedContent, RevisionInfo, Section, SectionData};

/// Key-value store of the five content sections.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Read one section, falling back to its empty value if absent or unreadable.
    async fn read_section(&self, section: Section) -> Result<SectionData, AppError>;

    /// Current revision of the stored content.
    async fn revision(&self) -> Result<RevisionInfo, AppError>;

    /// Read every section together with the revision.
    async fn load(&self) -> Result<PublishedContent, AppError> {
        let revision = self.revision().await?;
        let mut sections = Vec::with_capacity(Section::ALL.len());
        for section in Section::ALL {
            sections.push(self.read_section(section).await?);
        }
        Ok(PublishedContent {
            revision_id: revision.revision_id,
            generated_at: revision.generated_at,
            content: ContentSnapshot::from_sections(sections),
        })
    }

    /// Overwrite all five sections with `snapshot`.
    ///
    /// When `expected_revision` is set and the stored revision differs, nothing
    /// is written and [`AppError::Conflict`] is returned.
    async fn publish(
        &self,
        snapshot: &ContentSnapshot,
        expected_revision: Option<i64>,
    ) -> Result<RevisionInfo, AppError>;
}
