//! Cached copy of the published content for the public pages.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::errors::AppError;
use crate::models::PublishedContent;
use crate::store::ContentStore;

/// Receives the "public pages changed" signal after a successful publish.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate_public_pages(&self);
}

#[derive(Default)]
struct Slot {
    /// Bumped on every invalidation
    generation: u64,
    content: Option<Arc<PublishedContent>>,
}

/// Lazily loaded, publish-invalidated copy of the stored content.
#[derive(Default)]
pub struct PublicCache {
    slot: RwLock<Slot>,
}

impl PublicCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the cached content, reading it from the store on a miss.
    pub async fn get_or_load(
        &self,
        store: &dyn ContentStore,
    ) -> Result<Arc<PublishedContent>, AppError> {
        let generation = {
            let slot = self.read();
            if let Some(content) = &slot.content {
                return Ok(Arc::clone(content));
            }
            slot.generation
        };

        tracing::debug!("Public content cache miss, loading from store");
        let loaded = Arc::new(store.load().await?);

        let mut slot = self.write();
        // A publish that landed while we were loading wins over what we read.
        if slot.generation == generation {
            slot.content = Some(Arc::clone(&loaded));
        }
        Ok(loaded)
    }

    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.slot.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.slot.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl CacheInvalidator for PublicCache {
    fn invalidate_public_pages(&self) {
        let mut slot = self.write();
        slot.generation += 1;
        slot.content = None;
        tracing::debug!(generation = slot.generation, "Invalidated public content cache");
    }
}
