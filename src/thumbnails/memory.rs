//! In-process asset provider.
//!
//! - Serves a fixed library of assets, most recent first
//! - Bounded worker pool renders placeholder thumbnails off the caller's thread
//! - Results go back on the caller's flume channel
//! - Cancellation is honoured if the worker has not started the request yet

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use flume::{Receiver, Sender};
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use super::provider::{
    AssetProvider, Authorization, RequestHandle, RequestKind, ThumbnailDelivery, ThumbnailRequest,
};
use crate::error::ProviderError;
use crate::models::{AssetId, AssetRef, MediaType, MediaTypeFilter, Size};

/// Default number of worker threads.
const DEFAULT_WORKERS: usize = 2;

/// Maximum number of worker threads.
const MAX_WORKERS: usize = 4;

/// Maximum number of queued requests.
const MAX_QUEUE_SIZE: usize = 256;

/// Longest side of a full-data image.
const MAX_FULL_DATA_SIDE: u32 = 1024;

/// Longest side of a scaled thumbnail.
const MAX_SCALED_SIDE: u32 = 2048;

/// One asset in the in-process library.
#[derive(Debug, Clone)]
pub struct LibraryAsset {
    pub id: AssetId,
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub media_type: MediaType,
    pub is_burst: bool,
    /// Thumbnail requests for this asset fail.
    pub broken: bool,
}

impl LibraryAsset {
    pub fn image(id: u64, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            id: AssetId(id),
            pixel_width,
            pixel_height,
            media_type: MediaType::Image,
            is_burst: false,
            broken: false,
        }
    }

    pub fn video(id: u64, pixel_width: u32, pixel_height: u32) -> Self {
        Self {
            media_type: MediaType::Video,
            ..Self::image(id, pixel_width, pixel_height)
        }
    }

    pub fn burst(mut self) -> Self {
        self.is_burst = true;
        self
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }
}

struct Job {
    handle: RequestHandle,
    request: ThumbnailRequest,
    reply: Sender<ThumbnailDelivery>,
}

/// Shared state between the provider and its workers.
struct Shared {
    library: Vec<LibraryAsset>,
    pending: Mutex<HashSet<RequestHandle>>,
    cancelled: Mutex<HashSet<RequestHandle>>,
}

impl Shared {
    /// Flags `handle` if it is still pending.
    ///
    /// The pending lock is held across both sets, so a request that finishes
    /// concurrently is never flagged after its bookkeeping was cleared.
    fn mark_cancelled(&self, handle: RequestHandle) -> bool {
        let pending = self.pending.lock();
        if !pending.contains(&handle) {
            return false;
        }
        self.cancelled.lock().insert(handle);
        true
    }

    /// Renders `job` unless it was cancelled and clears its bookkeeping.
    fn process(&self, job: &Job) -> ThumbnailDelivery {
        let cancelled = self.cancelled.lock().remove(&job.handle);
        let image = if cancelled {
            Err(ProviderError::Disconnected)
        } else {
            render(&job.request, &self.library)
        };

        {
            let mut pending = self.pending.lock();
            pending.remove(&job.handle);
            self.cancelled.lock().remove(&job.handle);
        }

        ThumbnailDelivery {
            handle: job.handle,
            index: job.request.index,
            cancelled,
            image,
        }
    }
}

pub struct MemoryAssetProvider {
    shared: Arc<Shared>,
    authorization: Mutex<Authorization>,
    grant_on_request: bool,
    job_tx: Sender<Job>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    next_handle: AtomicU64,
    caching: Mutex<HashSet<AssetId>>,
}

impl MemoryAssetProvider {
    /// Create a provider over `library` (most recent first) with `workers` threads.
    ///
    /// Access starts out not determined and is granted when requested.
    pub fn new(library: Vec<LibraryAsset>, workers: usize) -> Self {
        let num_workers = workers.clamp(1, MAX_WORKERS);
        let (job_tx, job_rx) = flume::bounded(MAX_QUEUE_SIZE);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shared = Arc::new(Shared {
            library,
            pending: Mutex::new(HashSet::new()),
            cancelled: Mutex::new(HashSet::new()),
        });

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let rx = job_rx.clone();
            let shutdown = Arc::clone(&shutdown);
            let shared = Arc::clone(&shared);

            match thread::Builder::new()
                .name(format!("asset-worker-{}", worker_id))
                .spawn(move || worker_loop(worker_id, rx, shutdown, shared))
            {
                Ok(handle) => handles.push(handle),
                Err(e) => warn!(worker_id, error = ?e, "Failed to spawn asset worker"),
            }
        }

        debug!(num_workers = handles.len(), "Started asset provider workers");

        Self {
            shared,
            authorization: Mutex::new(Authorization::NotDetermined),
            grant_on_request: true,
            job_tx,
            workers: handles,
            shutdown,
            next_handle: AtomicU64::new(1),
            caching: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_default_workers(library: Vec<LibraryAsset>) -> Self {
        Self::new(library, DEFAULT_WORKERS)
    }

    pub fn with_authorization(self, status: Authorization) -> Self {
        *self.authorization.lock() = status;
        self
    }

    /// Makes an authorization request deny access instead of granting it.
    pub fn denying_requests(mut self) -> Self {
        self.grant_on_request = false;
        self
    }

    /// Assets currently asked to be kept warm.
    pub fn caching(&self) -> HashSet<AssetId> {
        self.caching.lock().clone()
    }

    pub fn pending_count(&self) -> usize {
        self.shared.pending.lock().len()
    }

    pub fn shutdown(&mut self) {
        debug!("Shutting down asset provider");
        self.shutdown.store(true, Ordering::SeqCst);
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl AssetProvider for MemoryAssetProvider {
    fn authorization(&self) -> Authorization {
        *self.authorization.lock()
    }

    fn request_authorization(&self) -> Authorization {
        let mut status = self.authorization.lock();
        if *status == Authorization::NotDetermined {
            *status = if self.grant_on_request {
                Authorization::Authorized
            } else {
                Authorization::Denied
            };
            debug!(status = ?*status, "Resolved library authorization");
        }
        *status
    }

    fn fetch_assets(
        &self,
        filter: MediaTypeFilter,
        limit: usize,
    ) -> Result<Vec<AssetRef>, ProviderError> {
        if self.authorization() != Authorization::Authorized {
            return Err(ProviderError::NotAuthorized);
        }

        let assets: Vec<AssetRef> = self
            .shared
            .library
            .iter()
            .filter(|a| filter.matches(a.media_type))
            .take(limit)
            .enumerate()
            .map(|(index, a)| {
                AssetRef::new(a.id, index, a.pixel_width, a.pixel_height)
                    .with_media_type(a.media_type)
                    .with_burst(a.is_burst)
            })
            .collect();

        debug!(count = assets.len(), ?filter, limit, "Fetched assets");
        Ok(assets)
    }

    fn request_thumbnail(
        &self,
        request: ThumbnailRequest,
        reply: Sender<ThumbnailDelivery>,
    ) -> Result<RequestHandle, ProviderError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(ProviderError::Disconnected);
        }

        let handle = RequestHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.shared.pending.lock().insert(handle);

        match self.job_tx.try_send(Job {
            handle,
            request,
            reply,
        }) {
            Ok(()) => Ok(handle),
            Err(flume::TrySendError::Full(job)) => {
                warn!("Asset request queue full, failing request");
                self.shared.pending.lock().remove(&handle);
                let _ = job.reply.send(ThumbnailDelivery {
                    handle,
                    index: job.request.index,
                    cancelled: false,
                    image: Err(ProviderError::AssetUnavailable(job.request.asset_id)),
                });
                Ok(handle)
            }
            Err(flume::TrySendError::Disconnected(_)) => {
                self.shared.pending.lock().remove(&handle);
                Err(ProviderError::Disconnected)
            }
        }
    }

    fn cancel(&self, handle: RequestHandle) {
        if self.shared.mark_cancelled(handle) {
            trace!(?handle, "Cancelling thumbnail request");
        }
    }

    fn start_caching(&self, assets: &[AssetRef], target: Size) {
        trace!(count = assets.len(), ?target, "Start caching");
        self.caching.lock().extend(assets.iter().map(|a| a.id));
    }

    fn stop_caching(&self, assets: &[AssetRef], target: Size) {
        trace!(count = assets.len(), ?target, "Stop caching");
        let mut caching = self.caching.lock();
        for asset in assets {
            caching.remove(&asset.id);
        }
    }

    fn stop_caching_all(&self) {
        self.caching.lock().clear();
    }
}

impl Drop for MemoryAssetProvider {
    fn drop(&mut self) {
        if !self.shutdown.load(Ordering::Relaxed) {
            self.shutdown();
        }
    }
}

fn worker_loop(
    worker_id: usize,
    rx: Receiver<Job>,
    shutdown: Arc<AtomicBool>,
    shared: Arc<Shared>,
) {
    debug!(worker_id, "Asset worker started");

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(job) => {
                let delivery = shared.process(&job);
                if job.reply.send(delivery).is_err() {
                    trace!(worker_id, "Delivery receiver dropped");
                }
            }
            Err(flume::RecvTimeoutError::Timeout) => continue,
            Err(flume::RecvTimeoutError::Disconnected) => break,
        }
    }

    debug!(worker_id, "Asset worker stopped");
}

/// Renders a flat placeholder thumbnail tinted by asset id.
fn render(
    request: &ThumbnailRequest,
    library: &[LibraryAsset],
) -> Result<RgbaImage, ProviderError> {
    let asset = library
        .iter()
        .find(|a| a.id == request.asset_id)
        .filter(|a| !a.broken)
        .ok_or(ProviderError::AssetUnavailable(request.asset_id))?;

    let (width, height) = match request.kind {
        RequestKind::Scaled => fit(
            request.target.width.max(1.0) as u32,
            request.target.height.max(1.0) as u32,
            MAX_SCALED_SIDE,
        ),
        RequestKind::FullData => fit(asset.pixel_width, asset.pixel_height, MAX_FULL_DATA_SIDE),
    };

    let seed = asset.id.0.wrapping_mul(0x9e37_79b9_7f4a_7c15);
    let tint = Rgba([(seed >> 16) as u8, (seed >> 24) as u8, (seed >> 32) as u8, 0xff]);
    trace!(id = ?asset.id, width, height, "Rendered thumbnail");
    Ok(RgbaImage::from_pixel(width, height, tint))
}

/// Scales `(width, height)` down so the longest side is at most `max_side`.
fn fit(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let width = width.max(1);
    let height = height.max(1);
    let longest = width.max(height);
    if longest <= max_side {
        return (width, height);
    }
    let scale = max_side as f64 / longest as f64;
    (
        ((width as f64 * scale).round() as u32).max(1),
        ((height as f64 * scale).round() as u32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn library() -> Vec<LibraryAsset> {
        vec![
            LibraryAsset::image(1, 400, 300),
            LibraryAsset::video(2, 1920, 1080),
            LibraryAsset::image(3, 300, 400).burst(),
            LibraryAsset::image(4, 300, 200).broken(),
        ]
    }

    fn authorized() -> MemoryAssetProvider {
        MemoryAssetProvider::new(library(), 1).with_authorization(Authorization::Authorized)
    }

    #[test]
    fn test_fetch_requires_authorization() {
        let provider = MemoryAssetProvider::new(library(), 1);
        assert_eq!(
            provider.fetch_assets(MediaTypeFilter::ImageAndVideo, 50),
            Err(ProviderError::NotAuthorized)
        );
        assert_eq!(provider.request_authorization(), Authorization::Authorized);
        assert!(provider.fetch_assets(MediaTypeFilter::ImageAndVideo, 50).is_ok());
    }

    #[test]
    fn test_denied_authorization() {
        let provider = MemoryAssetProvider::new(library(), 1).denying_requests();
        assert_eq!(provider.request_authorization(), Authorization::Denied);
        assert_eq!(provider.request_authorization(), Authorization::Denied);
    }

    #[test]
    fn test_fetch_filters_and_limits() {
        let provider = authorized();
        let images = provider.fetch_assets(MediaTypeFilter::Image, 50).unwrap();
        let ids: Vec<u64> = images.iter().map(|a| a.id.0).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(images[1].index, 1);
        assert!(images[1].is_burst);

        let videos = provider.fetch_assets(MediaTypeFilter::Video, 50).unwrap();
        assert_eq!(videos.len(), 1);
        assert!(videos[0].is_video());

        let limited = provider.fetch_assets(MediaTypeFilter::ImageAndVideo, 2).unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[test]
    fn test_thumbnail_delivered_at_target_size() {
        let provider = authorized();
        let (tx, rx) = flume::unbounded();
        let assets = provider.fetch_assets(MediaTypeFilter::ImageAndVideo, 50).unwrap();

        let request = ThumbnailRequest::for_asset(&assets[0], Size::new(120.0, 90.0));
        let handle = provider.request_thumbnail(request, tx).unwrap();

        let delivery = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(delivery.handle, handle);
        assert!(!delivery.cancelled);
        assert_eq!(delivery.image.unwrap().dimensions(), (120, 90));
    }

    #[test]
    fn test_burst_uses_full_data() {
        let provider = authorized();
        let (tx, rx) = flume::unbounded();
        let assets = provider.fetch_assets(MediaTypeFilter::Image, 50).unwrap();

        let request = ThumbnailRequest::for_asset(&assets[1], Size::new(10.0, 10.0));
        provider.request_thumbnail(request, tx).unwrap();

        let delivery = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(delivery.image.unwrap().dimensions(), (300, 400));
    }

    #[test]
    fn test_broken_asset_fails() {
        let provider = authorized();
        let (tx, rx) = flume::unbounded();
        let assets = provider.fetch_assets(MediaTypeFilter::Image, 50).unwrap();

        let request = ThumbnailRequest::for_asset(&assets[2], Size::new(10.0, 10.0));
        provider.request_thumbnail(request, tx).unwrap();

        let delivery = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(matches!(
            delivery.image,
            Err(ProviderError::AssetUnavailable(AssetId(4)))
        ));
    }

    #[test]
    fn test_caching_bookkeeping() {
        let provider = authorized();
        let assets = provider.fetch_assets(MediaTypeFilter::ImageAndVideo, 50).unwrap();
        let target = Size::new(10.0, 10.0);

        provider.start_caching(&assets[..3], target);
        assert_eq!(provider.caching().len(), 3);
        provider.stop_caching(&assets[..1], target);
        assert!(!provider.caching().contains(&AssetId(1)));
        provider.stop_caching_all();
        assert!(provider.caching().is_empty());
    }

    fn job(handle: u64, asset: &AssetRef) -> (Job, Receiver<ThumbnailDelivery>) {
        let (reply, rx) = flume::unbounded();
        let job = Job {
            handle: RequestHandle(handle),
            request: ThumbnailRequest::for_asset(asset, Size::new(20.0, 20.0)),
            reply,
        };
        (job, rx)
    }

    fn shared() -> (Shared, Vec<AssetRef>) {
        let assets = authorized()
            .fetch_assets(MediaTypeFilter::ImageAndVideo, 50)
            .unwrap();
        let shared = Shared {
            library: library(),
            pending: Mutex::new(HashSet::new()),
            cancelled: Mutex::new(HashSet::new()),
        };
        (shared, assets)
    }

    #[test]
    fn test_queued_cancellation_is_delivered_as_cancelled() {
        let (shared, assets) = shared();
        let (job, _rx) = job(7, &assets[0]);
        shared.pending.lock().insert(job.handle);

        assert!(shared.mark_cancelled(job.handle));
        let delivery = shared.process(&job);
        assert!(delivery.cancelled);
        assert!(delivery.image.is_err());
        assert!(shared.pending.lock().is_empty());
        assert!(shared.cancelled.lock().is_empty());
    }

    #[test]
    fn test_cancel_after_completion_is_ignored() {
        let (shared, assets) = shared();
        let (job, _rx) = job(8, &assets[0]);
        shared.pending.lock().insert(job.handle);

        let delivery = shared.process(&job);
        assert!(!delivery.cancelled);
        assert!(!shared.mark_cancelled(job.handle));
        assert!(shared.cancelled.lock().is_empty());
    }

    #[test]
    fn test_cancel_during_render_leaves_no_residue() {
        let (shared, assets) = shared();
        let (job, _rx) = job(9, &assets[0]);
        shared.pending.lock().insert(job.handle);

        // The worker has already passed its cancellation check when this lands.
        let cancelled_before_render = shared.cancelled.lock().remove(&job.handle);
        assert!(!cancelled_before_render);
        assert!(shared.mark_cancelled(job.handle));

        shared.process(&job);
        assert!(shared.pending.lock().is_empty());
        assert!(shared.cancelled.lock().is_empty());
    }

    #[test]
    fn test_repeated_cancels_under_load_leave_no_residue() {
        let library: Vec<LibraryAsset> = (0..64)
            .map(|id| LibraryAsset::image(id, 8000, 6000).burst())
            .collect();
        let provider =
            MemoryAssetProvider::new(library, 1).with_authorization(Authorization::Authorized);
        let assets = provider.fetch_assets(MediaTypeFilter::Image, 64).unwrap();
        let (tx, rx) = flume::unbounded();

        let handles: Vec<RequestHandle> = assets
            .iter()
            .map(|a| {
                let request = ThumbnailRequest::for_asset(a, Size::new(10.0, 10.0));
                provider.request_thumbnail(request, tx.clone()).unwrap()
            })
            .collect();
        for _ in 0..200 {
            for &handle in &handles {
                provider.cancel(handle);
            }
        }

        for _ in 0..handles.len() {
            let delivery = rx.recv_timeout(Duration::from_secs(10)).unwrap();
            assert_eq!(delivery.cancelled, delivery.image.is_err());
        }
        assert_eq!(provider.pending_count(), 0);
        assert!(provider.shared.cancelled.lock().is_empty());
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit(400, 300, 1024), (400, 300));
        assert_eq!(fit(4000, 3000, 1000), (1000, 750));
        assert_eq!(fit(0, 0, 10), (1, 1));
    }
}
