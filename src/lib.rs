//! Core of an image picker action sheet: a horizontally scrolling strip of
//! recent photos above a grouped list of actions.
//!
//! The crate is UI-free. A presenter drives a [`Sheet`] with user events and
//! renders the [`SheetSnapshot`] it hands back; thumbnails come from an
//! [`AssetProvider`].

pub mod config;
pub mod error;
pub mod layout;
pub mod models;
pub mod sheet;
pub mod thumbnails;

pub use config::{Capabilities, SheetConfig};
pub use error::{ProviderError, Result, SheetError};
pub use models::{Action, ActionId, ActionStyle, AssetId, AssetRef, MediaType, MediaTypeFilter};
pub use sheet::{Sheet, SheetBuilder, SheetEvent, SheetSnapshot};
pub use thumbnails::{AssetProvider, Authorization, MemoryAssetProvider, SlotId};
