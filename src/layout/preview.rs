use tracing::trace;

use crate::config::SheetConfig;
use crate::models::{AssetRef, Size};

/// Geometry of the horizontally scrolling preview strip.
///
/// Each thumbnail is padded by `inset` on all sides. The strip has three height
/// tiers: zero when there is nothing to show, a fixed collapsed height before
/// the first selection, and an enlarged height derived from the assets.
#[derive(Debug, Clone)]
pub struct PreviewLayout {
    /// Padding around each thumbnail (default: 5)
    pub inset: f32,
    /// Height before any selection (default: 80)
    pub collapsed_height: f32,
    /// Lower clamp for the enlarged image height (default: 200)
    pub min_enlarged_height: f32,
    /// Upper clamp for the enlarged image height (default: 400)
    pub max_height: f32,
    pub checkmark_inset: f32,
    pub checkmark_width: f32,
}

impl Default for PreviewLayout {
    fn default() -> Self {
        Self::from_config(&SheetConfig::default())
    }
}

/// Horizontal placement of one strip item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StripFrame {
    pub x: f32,
    pub width: f32,
}

impl StripFrame {
    pub fn mid_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }
}

impl PreviewLayout {
    pub fn from_config(config: &SheetConfig) -> Self {
        Self {
            inset: config.preview_inset,
            collapsed_height: config.collapsed_preview_height,
            min_enlarged_height: config.min_enlarged_height,
            max_height: config.max_preview_height,
            checkmark_inset: config.capabilities.checkmark_inset,
            checkmark_width: config.capabilities.checkmark_width,
        }
    }

    /// Computes the strip height used once the previews are enlarged.
    ///
    /// # Algorithm
    /// 1. For each asset take the orientation-free short/long side ratio.
    /// 2. The candidate height is that ratio times the image width
    ///    (`container_width - 2 * inset`), i.e. the height of the asset shown
    ///    landscape across the full strip.
    /// 3. Candidates at or above the image width or the absolute ceiling are
    ///    discarded, which keeps squares from inflating the strip.
    /// 4. The tallest survivor wins (0 when none survive), clamped to
    ///    `[min_enlarged_height, max_height]`, plus the inset on both sides.
    pub fn enlarged_height(&self, assets: &[AssetRef], container_width: f32) -> f32 {
        let max_image_width = container_width - 2.0 * self.inset;

        let tallest = assets
            .iter()
            .filter_map(AssetRef::orientation_free_ratio)
            .map(|ratio| ratio * max_image_width)
            .filter(|&height| height < max_image_width && height < self.max_height)
            .fold(0.0f32, f32::max);

        let clamped = tallest.min(self.max_height).max(self.min_enlarged_height);
        trace!(tallest, clamped, container_width, "Computed enlarged preview height");
        clamped + 2.0 * self.inset
    }

    /// Picks the height tier for the current state.
    pub fn preview_height(&self, asset_count: usize, enlarged: bool, enlarged_height: f32) -> f32 {
        if asset_count == 0 {
            0.0
        } else if enlarged {
            enlarged_height
        } else {
            self.collapsed_height
        }
    }

    /// Strip height for `assets` in a container of `container_width`.
    pub fn compute_preview_height(
        &self,
        assets: &[AssetRef],
        container_width: f32,
        enlarged: bool,
    ) -> f32 {
        let enlarged_height = self.enlarged_height(assets, container_width);
        self.preview_height(assets.len(), enlarged, enlarged_height)
    }

    /// Thumbnail size for `asset` in a strip of `preview_height`, multiplied by `scale`.
    pub fn size_for_asset(&self, asset: &AssetRef, preview_height: f32, scale: f32) -> Size {
        let image_height = (preview_height - 2.0 * self.inset).max(0.0);
        let image_width = (asset.aspect_ratio() * image_height).floor();
        Size::new(image_width * scale, image_height * scale)
    }

    /// Narrowest thumbnail that can still host the selection checkmark.
    pub fn min_thumbnail_width(&self) -> f32 {
        2.0 * self.checkmark_inset + self.checkmark_width
    }

    /// Drops assets too narrow for the checkmark at `enlarged_height` and
    /// renumbers the rest to their strip position.
    pub fn displayable(&self, assets: Vec<AssetRef>, enlarged_height: f32) -> Vec<AssetRef> {
        let min_width = self.min_thumbnail_width();
        let before = assets.len();

        let kept: Vec<AssetRef> = assets
            .into_iter()
            .filter(|asset| self.size_for_asset(asset, enlarged_height, 1.0).width >= min_width)
            .enumerate()
            .map(|(index, mut asset)| {
                asset.index = index;
                asset
            })
            .collect();

        if kept.len() != before {
            trace!(
                dropped = before - kept.len(),
                min_width,
                "Filtered assets too narrow for the checkmark"
            );
        }
        kept
    }

    /// On-screen size of a strip item: its enlarged size scaled down to the current height.
    pub fn item_size(&self, asset: &AssetRef, enlarged_height: f32, preview_height: f32) -> Size {
        let full = self.size_for_asset(asset, enlarged_height, 1.0);
        let current_height = (preview_height - 2.0 * self.inset).max(0.0);
        if full.height <= 0.0 {
            return Size::new(0.0, current_height);
        }
        let scale = current_height / full.height;
        Size::new(full.width * scale, current_height)
    }

    /// Size of the checkmark overlay attached to every strip item.
    pub fn checkmark_header_size(&self, preview_height: f32) -> Size {
        Size::new(
            self.checkmark_width + 2.0 * self.checkmark_inset,
            (preview_height - 2.0 * self.inset).max(0.0),
        )
    }

    /// Lays the items out left to right, each padded by the inset on both sides.
    pub fn item_frames(
        &self,
        assets: &[AssetRef],
        enlarged_height: f32,
        preview_height: f32,
    ) -> Vec<StripFrame> {
        let mut cursor = 0.0f32;
        assets
            .iter()
            .map(|asset| {
                let width = self.item_size(asset, enlarged_height, preview_height).width;
                let frame = StripFrame {
                    x: cursor + self.inset,
                    width,
                };
                cursor += width + 2.0 * self.inset;
                frame
            })
            .collect()
    }

    /// Total scrollable width of the strip.
    pub fn content_width(&self, frames: &[StripFrame]) -> f32 {
        frames.last().map_or(0.0, |f| f.max_x() + self.inset)
    }

    /// Inclusive index range of items intersecting the viewport at `offset`.
    pub fn visible_range(
        &self,
        frames: &[StripFrame],
        offset: f32,
        viewport_width: f32,
    ) -> Option<(usize, usize)> {
        let right = offset + viewport_width;
        let mut visible = frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.max_x() > offset && f.x < right)
            .map(|(i, _)| i);

        let first = visible.next()?;
        let last = visible.last().unwrap_or(first);
        Some((first, last))
    }

    /// Scroll offset that centres item `index`, clamped to the scrollable content.
    pub fn centered_offset(
        &self,
        frames: &[StripFrame],
        index: usize,
        viewport_width: f32,
    ) -> Option<f32> {
        let frame = frames.get(index)?;
        let max_offset = (self.content_width(frames) - viewport_width).max(0.0);
        Some((frame.mid_x() - viewport_width / 2.0).clamp(0.0, max_offset))
    }
}
