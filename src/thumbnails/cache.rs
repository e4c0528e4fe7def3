//! In-memory cache of delivered thumbnails.
//!
//! LRU keyed by asset id with a byte budget, so a slot rebound to an asset it
//! showed recently can display it without waiting on the provider.

use std::num::NonZeroUsize;
use std::sync::Arc;

use image::RgbaImage;
use lru::LruCache;
use tracing::{debug, trace};

use crate::models::AssetId;

/// Minimum memory budget in megabytes.
const MIN_MEMORY_MB: usize = 4;

/// Maximum memory budget in megabytes.
const MAX_MEMORY_MB: usize = 256;

/// Bytes per pixel for RGBA images.
const BYTES_PER_PIXEL: usize = 4;

/// Entry cap independent of the byte budget.
const DEFAULT_LRU_CAPACITY: usize = 512;

#[derive(Debug, Clone)]
pub struct CachedThumbnail {
    pub image: Arc<RgbaImage>,
    pub width: u32,
    pub height: u32,
    pub memory_bytes: usize,
}

impl CachedThumbnail {
    fn new(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let memory_bytes = (width as usize) * (height as usize) * BYTES_PER_PIXEL;
        Self {
            image: Arc::new(image),
            width,
            height,
            memory_bytes,
        }
    }
}

pub struct ThumbnailCache {
    max_memory_bytes: usize,
    current_memory_bytes: usize,
    entries: LruCache<AssetId, CachedThumbnail>,
}

impl ThumbnailCache {
    /// Create a cache with a budget of `max_memory_mb`, clamped to a sane range.
    pub fn new(max_memory_mb: usize) -> Self {
        let max_memory_mb = max_memory_mb.clamp(MIN_MEMORY_MB, MAX_MEMORY_MB);
        debug!(max_memory_mb, "Initialized thumbnail memory cache");

        Self {
            max_memory_bytes: max_memory_mb * 1024 * 1024,
            current_memory_bytes: 0,
            entries: LruCache::new(
                NonZeroUsize::new(DEFAULT_LRU_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            ),
        }
    }

    pub fn get(&mut self, id: AssetId) -> Option<CachedThumbnail> {
        self.entries.get(&id).cloned()
    }

    pub fn contains(&self, id: AssetId) -> bool {
        self.entries.contains(&id)
    }

    /// Stores `image` for `id`, evicting least recently used entries to stay in budget.
    pub fn insert(&mut self, id: AssetId, image: RgbaImage) -> CachedThumbnail {
        let cached = CachedThumbnail::new(image);
        if let Some(old) = self.entries.pop(&id) {
            self.current_memory_bytes = self.current_memory_bytes.saturating_sub(old.memory_bytes);
        }

        self.evict_if_needed(cached.memory_bytes);

        if let Some((_, evicted)) = self.entries.push(id, cached.clone()) {
            self.current_memory_bytes = self
                .current_memory_bytes
                .saturating_sub(evicted.memory_bytes);
        }
        self.current_memory_bytes += cached.memory_bytes;
        cached
    }

    fn evict_if_needed(&mut self, needed_bytes: usize) {
        while self.current_memory_bytes + needed_bytes > self.max_memory_bytes {
            match self.entries.pop_lru() {
                Some((_, evicted)) => {
                    self.current_memory_bytes = self
                        .current_memory_bytes
                        .saturating_sub(evicted.memory_bytes);
                    trace!(
                        evicted_bytes = evicted.memory_bytes,
                        current_bytes = self.current_memory_bytes,
                        "Evicted thumbnail from memory cache"
                    );
                }
                None => break,
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.current_memory_bytes = 0;
        debug!("Cleared thumbnail memory cache");
    }

    pub fn memory_usage(&self) -> usize {
        self.current_memory_bytes
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_memory(&self) -> usize {
        self.max_memory_bytes
    }
}
