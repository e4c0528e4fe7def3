//! Thumbnail pipeline for the picker sheet.
//!
//! This module provides:
//! - `AssetProvider` - Contract with the external media library
//! - `CacheWindow` - Look-ahead window of indices kept warm by the provider
//! - `RequestTracker` - One outstanding request per strip slot, stale results dropped
//! - `ThumbnailCache` - LRU memory cache of delivered thumbnails
//! - `ThumbnailPipeline` - Ties the above together for one sheet presentation
//! - `MemoryAssetProvider` - In-process provider backed by a worker pool

pub mod cache;
pub mod memory;
pub mod pipeline;
pub mod provider;
pub mod requests;
#[cfg(test)]
pub mod testing;
pub mod window;

pub use cache::{CachedThumbnail, ThumbnailCache};
pub use memory::{LibraryAsset, MemoryAssetProvider};
pub use pipeline::{SlotThumbnail, ThumbnailPipeline};
pub use provider::{
    AssetProvider, Authorization, RequestHandle, RequestKind, ThumbnailDelivery, ThumbnailRequest,
};
pub use requests::{AcceptedDelivery, RequestTracker, SlotId};
pub use window::{CacheWindow, WindowDelta};
