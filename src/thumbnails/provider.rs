//! Contract between the sheet and the media library it displays.

use flume::Sender;
use image::RgbaImage;

use crate::error::ProviderError;
use crate::models::{AssetId, AssetRef, MediaTypeFilter, Size};

/// Library access status reported by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authorization {
    NotDetermined,
    Authorized,
    Denied,
}

/// Identifier of one in-flight thumbnail request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestHandle(pub u64);

/// How the provider should produce the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// A scaled image at the target size.
    Scaled,
    /// The full image data, decoded as-is. Used for burst assets, which do not
    /// support scaled requests.
    FullData,
}

/// A thumbnail request sent to the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailRequest {
    pub asset_id: AssetId,
    /// Strip index the request was issued for.
    pub index: usize,
    /// Target size in pixels, display scale already applied.
    pub target: Size,
    pub kind: RequestKind,
}

impl ThumbnailRequest {
    pub fn for_asset(asset: &AssetRef, target: Size) -> Self {
        let kind = if asset.is_burst {
            RequestKind::FullData
        } else {
            RequestKind::Scaled
        };
        Self {
            asset_id: asset.id,
            index: asset.index,
            target,
            kind,
        }
    }
}

/// Result of a thumbnail request, delivered asynchronously on the reply channel.
#[derive(Debug, Clone)]
pub struct ThumbnailDelivery {
    pub handle: RequestHandle,
    pub index: usize,
    /// Set when the request was cancelled before it completed.
    pub cancelled: bool,
    pub image: Result<RgbaImage, ProviderError>,
}

/// An external media library.
///
/// Implementations deliver thumbnails on the supplied channel and must never
/// block the caller waiting for image data. Cancellation is best-effort.
pub trait AssetProvider: Send + Sync {
    fn authorization(&self) -> Authorization;

    /// Asks the user for library access and returns the resulting status.
    fn request_authorization(&self) -> Authorization;

    /// Assets matching `filter`, most recent first, at most `limit` of them.
    fn fetch_assets(
        &self,
        filter: MediaTypeFilter,
        limit: usize,
    ) -> Result<Vec<AssetRef>, ProviderError>;

    fn request_thumbnail(
        &self,
        request: ThumbnailRequest,
        reply: Sender<ThumbnailDelivery>,
    ) -> Result<RequestHandle, ProviderError>;

    fn cancel(&self, handle: RequestHandle);

    fn start_caching(&self, assets: &[AssetRef], target: Size);

    fn stop_caching(&self, assets: &[AssetRef], target: Size);

    fn stop_caching_all(&self);
}
