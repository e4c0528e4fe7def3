//! Selection state of the preview strip.
//!
//! Selection order is insertion order. The oldest entry is evicted when the
//! optional cap is reached, and the strip switches to enlarged mode on the
//! first successful selection and stays there for the sheet's lifetime.

use std::num::NonZeroUsize;

use tracing::{debug, trace};

use crate::error::{Result, SheetError};

/// Outcome of [`SelectionState::select`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionResult {
    /// Index dropped to make room under the cap.
    pub evicted: Option<usize>,
    /// True only for the selection that switched the strip into enlarged mode.
    pub entered_enlarged: bool,
    /// False when the index was already selected and nothing changed.
    pub changed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected: Vec<usize>,
    enlarged: bool,
    max_selection: Option<NonZeroUsize>,
    item_count: usize,
}

impl SelectionState {
    pub fn new(item_count: usize, max_selection: Option<NonZeroUsize>) -> Self {
        Self {
            selected: Vec::new(),
            enlarged: false,
            max_selection,
            item_count,
        }
    }

    /// Replace the number of selectable items. Selections that fall out of range are dropped.
    pub fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.selected.retain(|&i| i < item_count);
    }

    pub fn select(&mut self, index: usize) -> Result<SelectionResult> {
        if index >= self.item_count {
            return Err(SheetError::InvalidIndex {
                index,
                count: self.item_count,
            });
        }

        if self.selected.contains(&index) {
            trace!(index, "Index already selected");
            return Ok(SelectionResult::default());
        }

        let mut evicted = None;
        if let Some(cap) = self.max_selection {
            if self.selected.len() >= cap.get() && !self.selected.is_empty() {
                evicted = Some(self.selected.remove(0));
            }
        }

        self.selected.push(index);

        let entered_enlarged = !self.enlarged;
        self.enlarged = true;

        debug!(index, ?evicted, entered_enlarged, "Selected asset");
        Ok(SelectionResult {
            evicted,
            entered_enlarged,
            changed: true,
        })
    }

    /// Remove `index` from the selection. Returns whether it was selected.
    pub fn deselect(&mut self, index: usize) -> bool {
        match self.selected.iter().position(|&i| i == index) {
            Some(pos) => {
                self.selected.remove(pos);
                debug!(index, "Deselected asset");
                true
            }
            None => false,
        }
    }

    /// Empty the selection. Enlarged mode is kept.
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selected.contains(&index)
    }

    pub fn is_enlarged(&self) -> bool {
        self.enlarged
    }

    /// Most recently selected index, used to centre the strip.
    pub fn focused(&self) -> Option<usize> {
        self.selected.last().copied()
    }

    pub fn max_selection(&self) -> Option<NonZeroUsize> {
        self.max_selection
    }
}
