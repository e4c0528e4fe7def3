use crate::models::{ActionId, RowAttributes, RowKind};

/// Everything a renderer needs to draw one row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSnapshot {
    pub kind: RowKind,
    pub attributes: RowAttributes,
    /// Title text or the action label for the current selection count.
    pub label: Option<String>,
    pub action_id: Option<ActionId>,
    /// Only action rows react to taps.
    pub highlightable: bool,
    /// Drawn in the emphasized font (the cancel row).
    pub emphasized: bool,
}

/// State handed to the renderer after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetSnapshot {
    pub sheet_width: f32,
    pub sheet_height: f32,
    pub preview_height: f32,
    pub rows: Vec<RowSnapshot>,
    pub selected: Vec<usize>,
    pub enlarged: bool,
    /// Checkmark overlays are only shown once the strip is enlarged.
    pub show_checkmarks: bool,
}

impl SheetSnapshot {
    pub fn labels(&self) -> Vec<&str> {
        self.rows.iter().filter_map(|r| r.label.as_deref()).collect()
    }
}

/// User events sent back by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetEvent {
    SelectAt(usize),
    DeselectAt(usize),
    InvokeAction(ActionId),
    Dismiss,
}
