/// Which corners of a sheet row are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Corners {
    #[default]
    None,
    Top,
    Bottom,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl Insets {
    pub fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// Derived visual attributes of one sheet row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RowAttributes {
    pub corners: Corners,
    pub insets: Insets,
    pub separator_visible: bool,
    pub height: f32,
}

/// What a sheet row displays.
///
/// Section 0 holds the optional title and the preview strip, section 1 the actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Title,
    Preview,
    Action(usize),
}

impl RowKind {
    pub fn section(&self) -> usize {
        match self {
            Self::Title | Self::Preview => 0,
            Self::Action(_) => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub kind: RowKind,
    pub attributes: RowAttributes,
}

impl SheetRow {
    pub fn new(kind: RowKind, attributes: RowAttributes) -> Self {
        Self { kind, attributes }
    }
}
