//! The picker sheet: selection, actions, layout, and thumbnails for one presentation.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::actions::{label_for, ActionList};
use super::snapshot::{RowSnapshot, SheetEvent, SheetSnapshot};
use crate::config::{Capabilities, SheetConfig};
use crate::error::{Result, SheetError};
use crate::layout::sheet::{compute_rows, total_height};
use crate::layout::{PreviewLayout, StripFrame};
use crate::models::{
    Action, ActionId, AssetRef, MediaTypeFilter, RowKind, SelectionResult, SelectionState, Size,
};
use crate::thumbnails::{
    AssetProvider, Authorization, CachedThumbnail, SlotId, SlotThumbnail, ThumbnailPipeline,
    WindowDelta,
};

/// Host view width assumed until the presenter reports one.
const DEFAULT_VIEW_WIDTH: f32 = 400.0;

/// Builder for [`Sheet`].
pub struct SheetBuilder {
    config: SheetConfig,
    title: Option<String>,
    view_width: f32,
}

impl SheetBuilder {
    pub fn new() -> Self {
        Self {
            config: SheetConfig::default(),
            title: None,
            view_width: DEFAULT_VIEW_WIDTH,
        }
    }

    pub fn config(mut self, config: SheetConfig) -> Self {
        self.config = config;
        self
    }

    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.config.capabilities = capabilities;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Caps the selection; zero means no cap.
    pub fn max_selection(mut self, max: usize) -> Self {
        self.config.max_selection = NonZeroUsize::new(max);
        self
    }

    pub fn media_filter(mut self, filter: MediaTypeFilter) -> Self {
        self.config.media_filter = filter;
        self
    }

    pub fn look_ahead(mut self, look_ahead: usize) -> Self {
        self.config.look_ahead = look_ahead;
        self
    }

    pub fn fetch_limit(mut self, limit: usize) -> Self {
        self.config.fetch_limit = limit;
        self
    }

    pub fn display_scale(mut self, scale: f32) -> Self {
        self.config.display_scale = scale;
        self
    }

    pub fn view_width(mut self, width: f32) -> Self {
        self.view_width = width;
        self
    }

    pub fn build(self) -> Sheet {
        let preview = PreviewLayout::from_config(&self.config);
        let selection = SelectionState::new(0, self.config.max_selection);
        let sheet_width = self.config.sheet_width(self.view_width);
        let enlarged_height = preview.enlarged_height(&[], sheet_width);
        Sheet {
            preview,
            selection,
            config: self.config,
            title: self.title,
            actions: ActionList::new(),
            assets: Vec::new(),
            view_width: self.view_width,
            enlarged_height,
            pipeline: None,
            dismissed: false,
        }
    }
}

impl Default for SheetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// State of one sheet presentation.
///
/// All operations are synchronous. Thumbnail data arrives from the provider
/// on a channel and is picked up by [`Sheet::poll_thumbnails`].
pub struct Sheet {
    config: SheetConfig,
    preview: PreviewLayout,
    title: Option<String>,
    actions: ActionList,
    selection: SelectionState,
    assets: Vec<AssetRef>,
    view_width: f32,
    enlarged_height: f32,
    pipeline: Option<ThumbnailPipeline>,
    dismissed: bool,
}

impl Sheet {
    pub fn builder() -> SheetBuilder {
        SheetBuilder::new()
    }

    /// Adds an action. See [`ActionList::add`] for cancel handling.
    pub fn add_action(&mut self, action: Action) {
        self.actions.add(action);
    }

    /// Connects the sheet to `provider`.
    ///
    /// Asks for library access when it has not been decided yet. Assets are
    /// only fetched, and the thumbnail pipeline only built, once access is
    /// authorized; otherwise the sheet shows its actions without a preview.
    pub fn open(&mut self, provider: Arc<dyn AssetProvider>) -> Result<Authorization> {
        if self.dismissed {
            return Err(SheetError::Dismissed);
        }

        let mut status = provider.authorization();
        if status == Authorization::NotDetermined {
            status = provider.request_authorization();
        }

        match status {
            Authorization::Authorized => self.attach(provider),
            other => info!(status = ?other, "Library access not granted, showing actions only"),
        }
        Ok(status)
    }

    fn attach(&mut self, provider: Arc<dyn AssetProvider>) {
        if let Some(previous) = self.pipeline.take() {
            previous.teardown();
        }

        let fetched = provider.fetch_assets(self.config.media_filter, self.config.fetch_limit);
        let fetched = match fetched {
            Ok(assets) => assets,
            Err(e) => {
                warn!(error = %e, "Asset fetch failed, hiding preview");
                Vec::new()
            }
        };
        self.ingest(fetched);

        self.pipeline = Some(ThumbnailPipeline::new(
            provider,
            self.config.thumbnail_memory_mb,
        ));
    }

    /// Drops assets too narrow for the checkmark and sizes the enlarged strip.
    fn ingest(&mut self, fetched: Vec<AssetRef>) {
        let width = self.sheet_width();
        let fetched_count = fetched.len();
        let initial_height = self.preview.enlarged_height(&fetched, width);

        self.assets = self.preview.displayable(fetched, initial_height);
        self.enlarged_height = self.preview.enlarged_height(&self.assets, width);
        self.selection.set_item_count(self.assets.len());

        debug!(
            fetched = fetched_count,
            displayable = self.assets.len(),
            enlarged_height = self.enlarged_height,
            "Prepared assets"
        );
    }

    /// Updates the host view width and re-derives the enlarged height.
    pub fn set_view_width(&mut self, width: f32) {
        self.view_width = width;
        self.enlarged_height = self.preview.enlarged_height(&self.assets, self.sheet_width());
    }

    pub fn sheet_width(&self) -> f32 {
        self.config.sheet_width(self.view_width)
    }

    pub fn select_at(&mut self, index: usize) -> Result<SelectionResult> {
        self.ensure_live()?;
        let result = self.selection.select(index)?;
        if result.entered_enlarged {
            info!(index, height = self.enlarged_height, "Enlarged previews");
        }
        Ok(result)
    }

    pub fn deselect_at(&mut self, index: usize) -> Result<bool> {
        self.ensure_live()?;
        Ok(self.selection.deselect(index))
    }

    /// Dismisses the sheet and runs the action's handler with the selection count.
    pub fn invoke_action(&mut self, id: ActionId) -> Result<()> {
        self.ensure_live()?;
        let action = self
            .actions
            .find(id)
            .cloned()
            .ok_or(SheetError::UnknownAction(id))?;
        self.run(action);
        Ok(())
    }

    /// Runs the cancel action if there is one, otherwise just dismisses.
    pub fn cancel(&mut self) {
        if self.dismissed {
            return;
        }
        match self.actions.cancel_action().cloned() {
            Some(action) => self.run(action),
            None => self.dismiss(),
        }
    }

    fn run(&mut self, action: Action) {
        let count = self.selection.count();
        self.dismiss();
        debug!(id = ?action.id, count, "Handling action");
        action.handle(count);
    }

    /// Ends the presentation: clears actions and tears down the thumbnail pipeline.
    ///
    /// The selection stays readable so handlers can fetch the selected assets.
    pub fn dismiss(&mut self) {
        if self.dismissed {
            return;
        }
        self.dismissed = true;
        self.actions.clear();
        if let Some(pipeline) = self.pipeline.take() {
            pipeline.teardown();
        }
        info!(selected = self.selection.count(), "Dismissed sheet");
    }

    pub fn handle_event(&mut self, event: SheetEvent) -> Result<SheetSnapshot> {
        match event {
            SheetEvent::SelectAt(index) => {
                self.select_at(index)?;
            }
            SheetEvent::DeselectAt(index) => {
                self.deselect_at(index)?;
            }
            SheetEvent::InvokeAction(id) => self.invoke_action(id)?,
            SheetEvent::Dismiss => self.dismiss(),
        }
        Ok(self.snapshot())
    }

    /// Moves the cache window to `visible` (inclusive strip indices).
    pub fn visible_range_changed(&mut self, visible: Option<(usize, usize)>) -> WindowDelta {
        let Some(pipeline) = self.pipeline.as_mut() else {
            return WindowDelta::default();
        };
        let preview = &self.preview;
        let enlarged_height = self.enlarged_height;
        let scale = self.config.display_scale;
        pipeline.update_window(visible, self.config.look_ahead, &self.assets, |asset| {
            preview.size_for_asset(asset, enlarged_height, scale)
        })
    }

    /// Moves the cache window for a strip scrolled to `offset`.
    pub fn scrolled_to(&mut self, offset: f32, viewport_width: f32) -> WindowDelta {
        let frames = self.strip_frames();
        let visible = self.preview.visible_range(&frames, offset, viewport_width);
        self.visible_range_changed(visible)
    }

    /// Scroll offset that centres the most recently selected item.
    pub fn focus_offset(&self, viewport_width: f32) -> Option<f32> {
        let index = self.selection.focused()?;
        self.preview
            .centered_offset(&self.strip_frames(), index, viewport_width)
    }

    pub fn strip_frames(&self) -> Vec<StripFrame> {
        self.preview
            .item_frames(&self.assets, self.enlarged_height, self.preview_height())
    }

    /// On-screen size of strip item `index` at the current preview height.
    pub fn item_size(&self, index: usize) -> Option<Size> {
        let asset = self.assets.get(index)?;
        Some(
            self.preview
                .item_size(asset, self.enlarged_height, self.preview_height()),
        )
    }

    pub fn checkmark_size(&self) -> Size {
        self.preview.checkmark_header_size(self.preview_height())
    }

    /// Points a strip slot at asset `index`, requesting its thumbnail.
    ///
    /// Returns the thumbnail immediately when it is already in memory.
    pub fn bind_slot(&mut self, slot: SlotId, index: usize) -> Result<Option<CachedThumbnail>> {
        self.ensure_live()?;
        let asset = self.assets.get(index).ok_or(SheetError::InvalidIndex {
            index,
            count: self.assets.len(),
        })?;
        let Some(pipeline) = self.pipeline.as_mut() else {
            return Ok(None);
        };
        let target = self
            .preview
            .size_for_asset(asset, self.enlarged_height, self.config.display_scale);
        pipeline.bind(slot, asset, target)
    }

    /// Releases a strip slot that scrolled out of view.
    pub fn unbind_slot(&mut self, slot: SlotId) {
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.unbind(slot);
        }
    }

    /// Collects thumbnails delivered since the last poll.
    pub fn poll_thumbnails(&mut self) -> Vec<SlotThumbnail> {
        match self.pipeline.as_mut() {
            Some(pipeline) => pipeline.poll(&self.assets),
            None => Vec::new(),
        }
    }

    /// Stops all caching and drops held thumbnails.
    pub fn memory_warning(&mut self) {
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.relieve_memory();
        }
    }

    pub fn preview_height(&self) -> f32 {
        self.preview.preview_height(
            self.assets.len(),
            self.selection.is_enlarged(),
            self.enlarged_height,
        )
    }

    pub fn sheet_height(&self) -> f32 {
        self.snapshot().sheet_height
    }

    pub fn snapshot(&self) -> SheetSnapshot {
        let sheet_width = self.sheet_width();
        let preview_height = self.preview_height();
        let count = self.selection.count();
        let emphasize_cancel = self.config.capabilities.rounds_rows();

        let rows = compute_rows(
            self.title.is_some(),
            &self.actions,
            preview_height,
            sheet_width,
            &self.config,
        );
        let sheet_height = total_height(&rows);

        let rows = rows
            .into_iter()
            .map(|row| {
                let action = match row.kind {
                    RowKind::Action(i) => self.actions.get(i),
                    _ => None,
                };
                let label = match row.kind {
                    RowKind::Title => self.title.clone(),
                    RowKind::Preview => None,
                    RowKind::Action(_) => action.map(|a| label_for(a, count)),
                };
                RowSnapshot {
                    kind: row.kind,
                    attributes: row.attributes,
                    label,
                    action_id: action.map(|a| a.id),
                    highlightable: row.kind.section() == 1,
                    emphasized: emphasize_cancel && action.is_some_and(Action::is_cancel),
                }
            })
            .collect();

        SheetSnapshot {
            sheet_width,
            sheet_height,
            preview_height,
            rows,
            selected: self.selection.selected().to_vec(),
            enlarged: self.selection.is_enlarged(),
            show_checkmarks: self.selection.is_enlarged(),
        }
    }

    pub fn assets(&self) -> &[AssetRef] {
        &self.assets
    }

    /// Selected assets in selection order.
    pub fn selected_assets(&self) -> Vec<&AssetRef> {
        self.selection
            .selected()
            .iter()
            .filter_map(|&i| self.assets.get(i))
            .collect()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn actions(&self) -> &ActionList {
        &self.actions
    }

    pub fn is_enlarged(&self) -> bool {
        self.selection.is_enlarged()
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed
    }

    /// Strip indices the provider is currently asked to keep warm.
    pub fn cached_indices(&self) -> Vec<usize> {
        self.pipeline
            .as_ref()
            .map(|p| p.cached_indices().iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn has_pipeline(&self) -> bool {
        self.pipeline.is_some()
    }

    fn ensure_live(&self) -> Result<()> {
        if self.dismissed {
            Err(SheetError::Dismissed)
        } else {
            Ok(())
        }
    }
}
