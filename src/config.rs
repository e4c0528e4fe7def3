//! Sheet configuration.
//!
//! Platform differences (row height, corner rounding, checkmark placement) are
//! carried by [`Capabilities`] instead of being branched on at runtime.

use std::num::NonZeroUsize;

use crate::models::MediaTypeFilter;

/// Row height for action rows on platforms with rounded, inset rows.
pub const MODERN_ACTION_ROW_HEIGHT: f32 = 57.0;

/// Row height for action rows on older platforms.
pub const LEGACY_ACTION_ROW_HEIGHT: f32 = 50.0;

/// Corner radius used for rounded sheet rows.
pub const DEFAULT_CORNER_RADIUS: f32 = 13.0;

/// Default width of the selection checkmark image.
pub const DEFAULT_CHECKMARK_WIDTH: f32 = 22.0;

/// Platform capability configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Capabilities {
    /// Base height of an action row, before its own insets.
    pub action_row_height: f32,
    /// Corner radius for rounded rows; `None` disables rounding and row insets.
    pub corner_radius: Option<f32>,
    /// Inset of the checkmark from the thumbnail edge.
    pub checkmark_inset: f32,
    /// Width of the checkmark image.
    pub checkmark_width: f32,
}

impl Capabilities {
    pub fn modern() -> Self {
        Self {
            action_row_height: MODERN_ACTION_ROW_HEIGHT,
            corner_radius: Some(DEFAULT_CORNER_RADIUS),
            checkmark_inset: 12.5,
            checkmark_width: DEFAULT_CHECKMARK_WIDTH,
        }
    }

    pub fn legacy() -> Self {
        Self {
            action_row_height: LEGACY_ACTION_ROW_HEIGHT,
            corner_radius: None,
            checkmark_inset: 3.5,
            checkmark_width: DEFAULT_CHECKMARK_WIDTH,
        }
    }

    /// Whether rows are drawn as rounded, inset cards.
    pub fn rounds_rows(&self) -> bool {
        self.corner_radius.is_some()
    }

    /// Narrowest thumbnail that can still host the selection checkmark.
    pub fn min_thumbnail_width(&self) -> f32 {
        2.0 * self.checkmark_inset + self.checkmark_width
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::modern()
    }
}

/// Full configuration for one sheet presentation.
#[derive(Debug, Clone)]
pub struct SheetConfig {
    pub capabilities: Capabilities,
    /// Padding around every thumbnail in the preview strip (default: 5)
    pub preview_inset: f32,
    /// Strip height before the first selection (default: 80)
    pub collapsed_preview_height: f32,
    /// Lower clamp for the enlarged image height (default: 200)
    pub min_enlarged_height: f32,
    /// Absolute ceiling for the enlarged image height (default: 400)
    pub max_preview_height: f32,
    /// Height of the optional title row (default: 34)
    pub title_row_height: f32,
    /// Horizontal inset of the sheet from the view edges (default: 10)
    pub sheet_inset: f32,
    /// Gap between the cancel row and the group above it (default: 4)
    pub inner_inset: f32,
    /// Number of strip items kept warm on either side of the visible range (default: 1)
    pub look_ahead: usize,
    /// Maximum number of assets fetched from the provider (default: 50)
    pub fetch_limit: usize,
    pub media_filter: MediaTypeFilter,
    pub max_selection: Option<NonZeroUsize>,
    /// Display scale applied to thumbnail request sizes (default: 2)
    pub display_scale: f32,
    /// Memory budget for delivered thumbnails in megabytes (default: 32)
    pub thumbnail_memory_mb: usize,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            preview_inset: 5.0,
            collapsed_preview_height: 80.0,
            min_enlarged_height: 200.0,
            max_preview_height: 400.0,
            title_row_height: 34.0,
            sheet_inset: 10.0,
            inner_inset: 4.0,
            look_ahead: 1,
            fetch_limit: 50,
            media_filter: MediaTypeFilter::ImageAndVideo,
            max_selection: None,
            display_scale: 2.0,
            thumbnail_memory_mb: 32,
        }
    }
}

impl SheetConfig {
    /// Usable sheet width for a host view of `view_width`.
    pub fn sheet_width(&self, view_width: f32) -> f32 {
        if self.capabilities.rounds_rows() {
            (view_width - 2.0 * self.sheet_inset).max(0.0)
        } else {
            view_width.max(0.0)
        }
    }
}
