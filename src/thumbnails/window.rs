//! Viewport-driven cache window.
//!
//! Tracks which strip indices the provider has been asked to keep warm and
//! turns a new visible range into start/stop directives by set difference.

use std::collections::BTreeSet;

use tracing::trace;

/// Start/stop directives produced by a window update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowDelta {
    pub to_start: BTreeSet<usize>,
    pub to_stop: BTreeSet<usize>,
}

impl WindowDelta {
    pub fn is_empty(&self) -> bool {
        self.to_start.is_empty() && self.to_stop.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CacheWindow {
    cached: BTreeSet<usize>,
}

impl CacheWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices the window should hold for `visible` (inclusive) expanded by
    /// `look_ahead`, clipped to `[0, asset_count - 1]`.
    pub fn desired(
        visible: Option<(usize, usize)>,
        look_ahead: usize,
        asset_count: usize,
    ) -> BTreeSet<usize> {
        let Some((lo, hi)) = visible else {
            return BTreeSet::new();
        };
        if asset_count == 0 || lo > hi {
            return BTreeSet::new();
        }

        let start = lo.saturating_sub(look_ahead);
        let end = hi.saturating_add(look_ahead).min(asset_count - 1);
        if start > end {
            return BTreeSet::new();
        }
        (start..=end).collect()
    }

    /// Moves the window to cover `visible` and returns what changed.
    pub fn update(
        &mut self,
        visible: Option<(usize, usize)>,
        look_ahead: usize,
        asset_count: usize,
    ) -> WindowDelta {
        let desired = Self::desired(visible, look_ahead, asset_count);

        let delta = WindowDelta {
            to_start: desired.difference(&self.cached).copied().collect(),
            to_stop: self.cached.difference(&desired).copied().collect(),
        };

        if !delta.is_empty() {
            trace!(
                ?visible,
                start = delta.to_start.len(),
                stop = delta.to_stop.len(),
                "Cache window moved"
            );
        }

        self.cached = desired;
        delta
    }

    /// Empties the window, returning every index that was cached.
    pub fn reset(&mut self) -> BTreeSet<usize> {
        std::mem::take(&mut self.cached)
    }

    pub fn cached(&self) -> &BTreeSet<usize> {
        &self.cached
    }

    /// Seeds the window with indices already cached elsewhere.
    pub fn with_cached(indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            cached: indices.into_iter().collect(),
        }
    }
}
