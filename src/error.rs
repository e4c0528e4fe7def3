//! Error types shared by the sheet core and asset providers.

use thiserror::Error;

use crate::models::{ActionId, AssetId};

/// Errors raised by the sheet core.
#[derive(Debug, Error)]
pub enum SheetError {
    /// An asset index outside `[0, count)` was passed to a selection or binding call.
    #[error("asset index {index} out of range (asset count {count})")]
    InvalidIndex { index: usize, count: usize },

    /// No action with the given id is registered on the sheet.
    #[error("unknown action {0:?}")]
    UnknownAction(ActionId),

    /// The sheet was used after it was dismissed.
    #[error("sheet has been dismissed")]
    Dismissed,

    /// The asset provider failed.
    #[error("asset provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Errors reported by an [`AssetProvider`](crate::thumbnails::AssetProvider).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// Access to the media library has not been granted.
    #[error("media library access not authorized")]
    NotAuthorized,

    /// The asset's data could not be loaded.
    #[error("asset {0:?} is unavailable")]
    AssetUnavailable(AssetId),

    /// The provider's worker pool has shut down.
    #[error("asset provider disconnected")]
    Disconnected,
}

pub type Result<T, E = SheetError> = std::result::Result<T, E>;
