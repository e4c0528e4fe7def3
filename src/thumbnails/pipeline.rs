//! Thumbnail plumbing for one sheet presentation.
//!
//! Created only once the provider reports authorized access and torn down
//! explicitly when the sheet is dismissed.

use std::sync::Arc;

use flume::{Receiver, Sender};
use tracing::{debug, trace, warn};

use super::cache::{CachedThumbnail, ThumbnailCache};
use super::provider::{AssetProvider, ThumbnailDelivery, ThumbnailRequest};
use super::requests::{RequestTracker, SlotId};
use super::window::{CacheWindow, WindowDelta};
use crate::error::Result;
use crate::models::{AssetRef, Size};

/// A thumbnail ready to be shown in a strip slot.
#[derive(Debug, Clone)]
pub struct SlotThumbnail {
    pub slot: SlotId,
    pub index: usize,
    pub thumbnail: CachedThumbnail,
}

pub struct ThumbnailPipeline {
    provider: Arc<dyn AssetProvider>,
    tracker: RequestTracker,
    window: CacheWindow,
    cache: ThumbnailCache,
    delivery_tx: Sender<ThumbnailDelivery>,
    delivery_rx: Receiver<ThumbnailDelivery>,
}

impl ThumbnailPipeline {
    pub fn new(provider: Arc<dyn AssetProvider>, memory_mb: usize) -> Self {
        let (delivery_tx, delivery_rx) = flume::unbounded();
        Self {
            provider,
            tracker: RequestTracker::new(),
            window: CacheWindow::new(),
            cache: ThumbnailCache::new(memory_mb),
            delivery_tx,
            delivery_rx,
        }
    }

    pub fn provider(&self) -> &Arc<dyn AssetProvider> {
        &self.provider
    }

    /// Points `slot` at `asset`.
    ///
    /// Any request the slot already owns is cancelled first, so a failed
    /// request leaves the slot unbound. A memory cache hit is returned
    /// immediately and no request is issued.
    pub fn bind(
        &mut self,
        slot: SlotId,
        asset: &AssetRef,
        target: Size,
    ) -> Result<Option<CachedThumbnail>> {
        if let Some(previous) = self.tracker.unbind(slot) {
            trace!(?slot, ?previous, "Cancelling superseded request");
            self.provider.cancel(previous);
        }

        if let Some(cached) = self.cache.get(asset.id) {
            trace!(?slot, index = asset.index, "Memory cache hit");
            return Ok(Some(cached));
        }

        let request = ThumbnailRequest::for_asset(asset, target);
        let handle = self
            .provider
            .request_thumbnail(request, self.delivery_tx.clone())?;
        self.tracker.bind(slot, asset.index, handle);
        Ok(None)
    }

    /// Releases `slot`, cancelling its outstanding request.
    pub fn unbind(&mut self, slot: SlotId) {
        if let Some(handle) = self.tracker.unbind(slot) {
            self.provider.cancel(handle);
        }
    }

    /// Drains finished deliveries without blocking.
    ///
    /// Only deliveries that still match their slot are returned; they are
    /// also stored in the memory cache.
    pub fn poll(&mut self, assets: &[AssetRef]) -> Vec<SlotThumbnail> {
        let mut ready = Vec::new();
        while let Ok(delivery) = self.delivery_rx.try_recv() {
            let Some(accepted) = self.tracker.accept(delivery) else {
                continue;
            };
            let Some(asset) = assets.get(accepted.index) else {
                warn!(index = accepted.index, "Delivery for unknown asset index");
                continue;
            };
            let thumbnail = self.cache.insert(asset.id, accepted.image);
            ready.push(SlotThumbnail {
                slot: accepted.slot,
                index: accepted.index,
                thumbnail,
            });
        }
        ready
    }

    /// Moves the cache window and forwards the start/stop directives to the provider.
    pub fn update_window<F>(
        &mut self,
        visible: Option<(usize, usize)>,
        look_ahead: usize,
        assets: &[AssetRef],
        target_for: F,
    ) -> WindowDelta
    where
        F: Fn(&AssetRef) -> Size,
    {
        let delta = self.window.update(visible, look_ahead, assets.len());

        for &index in &delta.to_stop {
            if let Some(asset) = assets.get(index) {
                self.provider
                    .stop_caching(std::slice::from_ref(asset), target_for(asset));
            }
        }
        for &index in &delta.to_start {
            if let Some(asset) = assets.get(index) {
                self.provider
                    .start_caching(std::slice::from_ref(asset), target_for(asset));
            }
        }
        delta
    }

    pub fn cached_indices(&self) -> &std::collections::BTreeSet<usize> {
        self.window.cached()
    }

    pub fn thumbnail_cache(&self) -> &ThumbnailCache {
        &self.cache
    }

    pub fn outstanding_requests(&self) -> usize {
        self.tracker.len()
    }

    /// Drops everything kept warm in response to memory pressure.
    pub fn relieve_memory(&mut self) {
        let dropped = self.window.reset();
        self.provider.stop_caching_all();
        self.cache.clear();
        debug!(dropped = dropped.len(), "Released cached thumbnails");
    }

    /// Cancels every in-flight request and stops all caching.
    pub fn teardown(mut self) {
        let handles = self.tracker.drain();
        for handle in &handles {
            self.provider.cancel(*handle);
        }
        self.window.reset();
        self.provider.stop_caching_all();
        debug!(cancelled = handles.len(), "Tore down thumbnail pipeline");
    }
}
