//! Flat JSON file store.
//!
//! Publishes stage every section to a hidden temporary file first and only
//! rename them over the live files once all five are staged.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::sync::Mutex;

use super::ContentStore;
use crate::errors::AppError;
use crate::models::{
    ContentSnapshot, PublishedContent, RevisionInfo, Section, SectionData, SectionWriteStatus,
};

const REVISION_FILE: &str = "revision.json";

/// How far a commit got before a rename failed.
enum CommitFailure {
    /// No live file was replaced
    Untouched(String),
    /// Some live files were replaced
    Partial {
        message: String,
        sections: Vec<SectionWriteStatus>,
    },
}

/// Content store over a directory of JSON files.
pub struct JsonFileStore {
    data_dir: PathBuf,
    /// Serializes publishes and consistent loads within this process
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open the store, creating the data directory if needed.
    pub async fn open(data_dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(data_dir).await.map_err(|e| {
            AppError::Persistence(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    fn live_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }

    fn staging_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(format!(".{}.tmp", file_name))
    }

    async fn read_section_unlocked(&self, section: Section) -> SectionData {
        let path = self.live_path(section.file_name());
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return SectionData::empty(section),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                return SectionData::empty(section);
            }
        };

        match serde_json::from_slice(&bytes).and_then(|value| SectionData::from_json(section, value))
        {
            Ok(data) => data,
            Err(e) => {
                tracing::warn!("Ignoring corrupt {}: {}", path.display(), e);
                SectionData::empty(section)
            }
        }
    }

    async fn read_revision_unlocked(&self) -> RevisionInfo {
        let path = self.live_path(REVISION_FILE);
        match fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt {}: {}", path.display(), e);
                RevisionInfo::default()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => RevisionInfo::default(),
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
                RevisionInfo::default()
            }
        }
    }

    /// Write one document to its staging file and return the staging path.
    async fn stage(&self, file_name: &str, value: &serde_json::Value) -> Result<PathBuf, AppError> {
        let staging = self.staging_path(file_name);
        let bytes = serde_json::to_vec_pretty(value).map_err(|e| {
            AppError::Persistence(format!("Failed to serialize {}: {}", file_name, e))
        })?;
        fs::write(&staging, bytes).await.map_err(|e| {
            AppError::Persistence(format!("Failed to stage {}: {}", file_name, e))
        })?;
        Ok(staging)
    }

    async fn discard(paths: &[PathBuf]) {
        for path in paths {
            if let Err(e) = fs::remove_file(path).await {
                tracing::warn!("Failed to remove staging file {}: {}", path.display(), e);
            }
        }
    }

    async fn stage_all(&self, snapshot: &ContentSnapshot) -> Result<Vec<(Section, PathBuf)>, AppError> {
        let mut staged = Vec::with_capacity(Section::ALL.len());
        for section in Section::ALL {
            let result = match snapshot.section(section).to_json() {
                Ok(value) => self.stage(section.file_name(), &value).await,
                Err(e) => Err(AppError::Persistence(format!(
                    "Failed to serialize {}: {}",
                    section, e
                ))),
            };
            match result {
                Ok(path) => staged.push((section, path)),
                Err(e) => {
                    let paths: Vec<_> = staged.into_iter().map(|(_, p)| p).collect();
                    Self::discard(&paths).await;
                    return Err(e);
                }
            }
        }
        Ok(staged)
    }

    /// Rename staged files over the live ones, stopping at the first failure.
    async fn commit(&self, staged: Vec<(Section, PathBuf)>) -> Result<(), CommitFailure> {
        let mut statuses: Vec<SectionWriteStatus> = Section::ALL
            .iter()
            .map(|&section| SectionWriteStatus {
                section,
                written: false,
            })
            .collect();

        let mut remaining = staged.into_iter();
        while let Some((section, staging)) = remaining.next() {
            let live = self.live_path(section.file_name());
            if let Err(e) = fs::rename(&staging, &live).await {
                let mut leftovers = vec![staging];
                leftovers.extend(remaining.map(|(_, p)| p));
                Self::discard(&leftovers).await;

                let message = format!("Failed to write {}: {}", section, e);
                if statuses.iter().any(|s| s.written) {
                    return Err(CommitFailure::Partial {
                        message,
                        sections: statuses,
                    });
                }
                return Err(CommitFailure::Untouched(message));
            }
            if let Some(status) = statuses.iter_mut().find(|s| s.section == section) {
                status.written = true;
            }
        }
        Ok(())
    }

    async fn write_revision(&self, revision: &RevisionInfo) -> Result<(), AppError> {
        let value = serde_json::to_value(revision).map_err(|e| {
            AppError::Persistence(format!("Failed to serialize revision: {}", e))
        })?;
        let staging = self.stage(REVISION_FILE, &value).await?;
        fs::rename(&staging, self.live_path(REVISION_FILE)).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for JsonFileStore {
    async fn read_section(&self, section: Section) -> Result<SectionData, AppError> {
        Ok(self.read_section_unlocked(section).await)
    }

    async fn revision(&self) -> Result<RevisionInfo, AppError> {
        Ok(self.read_revision_unlocked().await)
    }

    async fn load(&self) -> Result<PublishedContent, AppError> {
        let _guard = self.write_lock.lock().await;
        let revision = self.read_revision_unlocked().await;
        let mut sections = Vec::with_capacity(Section::ALL.len());
        for section in Section::ALL {
            sections.push(self.read_section_unlocked(section).await);
        }
        Ok(PublishedContent {
            revision_id: revision.revision_id,
            generated_at: revision.generated_at,
            content: ContentSnapshot::from_sections(sections),
        })
    }

    async fn publish(
        &self,
        snapshot: &ContentSnapshot,
        expected_revision: Option<i64>,
    ) -> Result<RevisionInfo, AppError> {
        let _guard = self.write_lock.lock().await;

        let current = self.read_revision_unlocked().await;
        if let Some(expected) = expected_revision {
            if current.revision_id != expected {
                return Err(AppError::Conflict {
                    message: format!(
                        "Content changed since it was loaded: expected revision {}, current {}",
                        expected, current.revision_id
                    ),
                    current_revision: current.revision_id,
                });
            }
        }

        let next = RevisionInfo {
            revision_id: current.revision_id + 1,
            generated_at: Utc::now().to_rfc3339(),
        };

        let staged = self.stage_all(snapshot).await?;
        match self.commit(staged).await {
            Ok(()) => {}
            Err(CommitFailure::Untouched(message)) => return Err(AppError::Persistence(message)),
            Err(CommitFailure::Partial { message, sections }) => {
                tracing::error!("Partial publish: {}", message);
                // Part of the payload is live, so sessions loaded before it must conflict.
                let current_revision = match self.write_revision(&next).await {
                    Ok(()) => next.revision_id,
                    Err(e) => {
                        tracing::error!("Failed to record revision after partial publish: {}", e);
                        current.revision_id
                    }
                };
                return Err(AppError::PartialPersistence {
                    message,
                    sections,
                    current_revision,
                });
            }
        }

        if let Err(e) = self.write_revision(&next).await {
            // Content is live at this point; only the revision marker is stale.
            return Err(AppError::PartialPersistence {
                message: format!("Content written but revision not recorded: {}", e.message()),
                sections: Section::ALL
                    .iter()
                    .map(|&section| SectionWriteStatus {
                        section,
                        written: true,
                    })
                    .collect(),
                current_revision: current.revision_id,
            });
        }

        tracing::info!(revision_id = next.revision_id, "Published content");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FaqItem, MenuItem};
    use serde_json::json;
    use tempfile::TempDir;

    fn snapshot_with_menu(name: &str) -> ContentSnapshot {
        ContentSnapshot::default().with_section(SectionData::Menu(vec![MenuItem {
            id: "m1".to_string(),
            category: "Cut".to_string(),
            name: name.to_string(),
            price: 4500,
            description: String::new(),
        }]))
    }

    #[tokio::test]
    async fn test_missing_files_read_as_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.revision_id, 0);
        assert_eq!(loaded.content, ContentSnapshot::default());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("faq.json"), "{not json").unwrap();
        std::fs::write(dir.path().join("site-info.json"), "[1, 2]").unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        assert_eq!(
            store.read_section(Section::Faq).await.unwrap(),
            SectionData::empty(Section::Faq)
        );
        assert_eq!(
            store.read_section(Section::SiteInfo).await.unwrap(),
            SectionData::empty(Section::SiteInfo)
        );
    }

    #[tokio::test]
    async fn test_reads_existing_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("faq.json"),
            json!([{"id": "1", "question": "Parking?", "answer": "Two spaces"}]).to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("site-info.json"),
            json!({"phone": "03-0000-0000"}).to_string(),
        )
        .unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(
            loaded.content.faq,
            vec![FaqItem {
                id: "1".to_string(),
                question: "Parking?".to_string(),
                answer: "Two spaces".to_string(),
            }]
        );
        assert_eq!(loaded.content.site_info["phone"], "03-0000-0000");
    }

    #[tokio::test]
    async fn test_publish_writes_all_sections_and_bumps_revision() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        let snapshot = snapshot_with_menu("Cut & Blow");

        let revision = store.publish(&snapshot, Some(0)).await.unwrap();
        assert_eq!(revision.revision_id, 1);

        for section in Section::ALL {
            assert!(dir.path().join(section.file_name()).exists());
            assert!(!dir
                .path()
                .join(format!(".{}.tmp", section.file_name()))
                .exists());
        }
        let raw = std::fs::read_to_string(dir.path().join("menu.json")).unwrap();
        assert!(raw.contains("\n  {"), "expected pretty-printed JSON: {}", raw);

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.revision_id, 1);
        assert_eq!(loaded.content, snapshot);
    }

    #[tokio::test]
    async fn test_stale_revision_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        store.publish(&snapshot_with_menu("first"), Some(0)).await.unwrap();
        let err = store
            .publish(&snapshot_with_menu("second"), Some(0))
            .await
            .unwrap_err();

        match err {
            AppError::Conflict {
                current_revision, ..
            } => assert_eq!(current_revision, 1),
            other => panic!("expected conflict, got {}", other),
        }
        assert_eq!(store.load().await.unwrap().content.menu[0].name, "first");
    }

    #[tokio::test]
    async fn test_unchecked_publish_is_last_writer_wins() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        store.publish(&snapshot_with_menu("first"), Some(0)).await.unwrap();
        let revision = store
            .publish(&snapshot_with_menu("second"), None)
            .await
            .unwrap();

        assert_eq!(revision.revision_id, 2);
        assert_eq!(store.load().await.unwrap().content.menu[0].name, "second");
    }

    #[tokio::test]
    async fn test_staging_failure_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();
        store.publish(&snapshot_with_menu("original"), None).await.unwrap();

        // A directory in the way of the faq staging file makes staging fail.
        std::fs::create_dir(dir.path().join(".faq.json.tmp")).unwrap();

        let err = store
            .publish(&snapshot_with_menu("changed"), None)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PERSISTENCE_ERROR");

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.revision_id, 1);
        assert_eq!(loaded.content.menu[0].name, "original");
        assert!(!dir.path().join(".menu.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_rename_failure_reports_partial_publish() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        // A non-empty directory where gallery.json lives cannot be replaced.
        let blocker = dir.path().join("gallery.json");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), "x").unwrap();

        let err = store
            .publish(&snapshot_with_menu("new"), None)
            .await
            .unwrap_err();

        match err {
            AppError::PartialPersistence {
                sections,
                current_revision,
                ..
            } => {
                assert_eq!(current_revision, 1);
                let written: Vec<_> = sections
                    .iter()
                    .filter(|s| s.written)
                    .map(|s| s.section)
                    .collect();
                assert_eq!(written, vec![Section::Menu]);
                assert_eq!(sections.len(), 5);
            }
            other => panic!("expected partial failure, got {}", other),
        }
        for section in Section::ALL {
            assert!(!dir
                .path()
                .join(format!(".{}.tmp", section.file_name()))
                .exists());
        }
        assert_eq!(store.revision().await.unwrap().revision_id, 1);
    }

    #[tokio::test]
    async fn test_stale_publish_after_partial_publish_conflicts() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::open(dir.path()).await.unwrap();

        let blocker = dir.path().join("gallery.json");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), "x").unwrap();

        let err = store
            .publish(&snapshot_with_menu("from first"), Some(0))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PARTIAL_PERSISTENCE");
        std::fs::remove_dir_all(&blocker).unwrap();

        // Another session still at revision 0 must not overwrite the live menu.
        let err = store
            .publish(&ContentSnapshot::default(), Some(0))
            .await
            .unwrap_err();
        match err {
            AppError::Conflict {
                current_revision, ..
            } => assert_eq!(current_revision, 1),
            other => panic!("expected conflict, got {}", other),
        }

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.revision_id, 1);
        assert_eq!(loaded.content.menu[0].name, "from first");

        // The session that made the partial write can retry from the new revision.
        let revision = store
            .publish(&snapshot_with_menu("from first"), Some(1))
            .await
            .unwrap();
        assert_eq!(revision.revision_id, 2);
    }
}
