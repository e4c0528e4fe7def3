//! Synchronous provider double that records every call and delivers on demand.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use flume::Sender;
use image::RgbaImage;
use parking_lot::Mutex;

use super::provider::{
    AssetProvider, Authorization, RequestHandle, ThumbnailDelivery, ThumbnailRequest,
};
use crate::error::ProviderError;
use crate::models::{AssetId, AssetRef, MediaTypeFilter, Size};

pub struct RecordingProvider {
    assets: Vec<AssetRef>,
    authorization: Mutex<Authorization>,
    grant_on_request: bool,
    fail_fetch: bool,
    fail_requests: AtomicBool,
    next_handle: AtomicU64,
    pub requests: Mutex<Vec<(RequestHandle, ThumbnailRequest, Sender<ThumbnailDelivery>)>>,
    pub cancelled: Mutex<Vec<RequestHandle>>,
    pub started: Mutex<Vec<AssetId>>,
    pub stopped: Mutex<Vec<AssetId>>,
    pub stop_all_calls: AtomicUsize,
}

impl RecordingProvider {
    pub fn new(assets: Vec<AssetRef>) -> Self {
        Self {
            assets,
            authorization: Mutex::new(Authorization::Authorized),
            grant_on_request: true,
            fail_fetch: false,
            fail_requests: AtomicBool::new(false),
            next_handle: AtomicU64::new(1),
            requests: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
            started: Mutex::new(Vec::new()),
            stopped: Mutex::new(Vec::new()),
            stop_all_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_sizes(sizes: &[(u32, u32)]) -> Self {
        Self::new(
            sizes
                .iter()
                .enumerate()
                .map(|(i, &(w, h))| AssetRef::new(AssetId(100 + i as u64), i, w, h))
                .collect(),
        )
    }

    pub fn with_authorization(self, status: Authorization) -> Self {
        *self.authorization.lock() = status;
        self
    }

    pub fn denying_requests(mut self) -> Self {
        self.grant_on_request = false;
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    /// Makes every later thumbnail request fail.
    pub fn fail_requests(&self) {
        self.fail_requests.store(true, Ordering::Relaxed);
    }

    pub fn last_handle(&self) -> Option<RequestHandle> {
        self.requests.lock().last().map(|(h, _, _)| *h)
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Sends a delivery for `handle` with an image of `width` x `height`.
    pub fn deliver(&self, handle: RequestHandle, width: u32, height: u32) {
        self.send(handle, false, Ok(RgbaImage::new(width, height)));
    }

    pub fn deliver_cancelled(&self, handle: RequestHandle) {
        self.send(handle, true, Err(ProviderError::Disconnected));
    }

    fn send(
        &self,
        handle: RequestHandle,
        cancelled: bool,
        image: Result<RgbaImage, ProviderError>,
    ) {
        let requests = self.requests.lock();
        if let Some((_, request, reply)) = requests.iter().find(|(h, _, _)| *h == handle) {
            let _ = reply.send(ThumbnailDelivery {
                handle,
                index: request.index,
                cancelled,
                image,
            });
        }
    }
}

impl AssetProvider for RecordingProvider {
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
        }
        *status
    }

    fn fetch_assets(
        &self,
        filter: MediaTypeFilter,
        limit: usize,
    ) -> Result<Vec<AssetRef>, ProviderError> {
        if self.fail_fetch {
            return Err(ProviderError::Disconnected);
        }
        Ok(self
            .assets
            .iter()
            .filter(|a| filter.matches(a.media_type))
            .take(limit)
            .cloned()
            .collect())
    }

    fn request_thumbnail(
        &self,
        request: ThumbnailRequest,
        reply: Sender<ThumbnailDelivery>,
    ) -> Result<RequestHandle, ProviderError> {
        if self.fail_requests.load(Ordering::Relaxed) {
            return Err(ProviderError::Disconnected);
        }
        let handle = RequestHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        self.requests.lock().push((handle, request, reply));
        Ok(handle)
    }

    fn cancel(&self, handle: RequestHandle) {
        self.cancelled.lock().push(handle);
    }

    fn start_caching(&self, assets: &[AssetRef], _target: Size) {
        self.started.lock().extend(assets.iter().map(|a| a.id));
    }

    fn stop_caching(&self, assets: &[AssetRef], _target: Size) {
        self.stopped.lock().extend(assets.iter().map(|a| a.id));
    }

    fn stop_caching_all(&self) {
        self.stop_all_calls.fetch_add(1, Ordering::Relaxed);
    }
}
