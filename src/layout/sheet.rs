use crate::config::SheetConfig;
use crate::models::{RowAttributes, RowKind, SheetRow, Size};
use crate::sheet::ActionList;

/// Rows of section 0: the optional title followed by the preview strip.
pub fn header_rows(has_title: bool) -> Vec<RowKind> {
    if has_title {
        vec![RowKind::Title, RowKind::Preview]
    } else {
        vec![RowKind::Preview]
    }
}

/// Size of one sheet row.
///
/// The title row has a fixed height and the preview row follows the strip.
/// Action rows are the platform base height plus their own vertical insets.
pub fn size_for_sheet_row(
    kind: RowKind,
    preview_height: f32,
    attributes: &RowAttributes,
    sheet_width: f32,
    config: &SheetConfig,
) -> Size {
    let height = match kind {
        RowKind::Title => config.title_row_height,
        RowKind::Preview => preview_height,
        RowKind::Action(_) => {
            config.capabilities.action_row_height + attributes.insets.vertical()
        }
    };
    Size::new(sheet_width, height)
}

/// Computes every row of the sheet with its attributes and height.
pub fn compute_rows(
    has_title: bool,
    actions: &ActionList,
    preview_height: f32,
    sheet_width: f32,
    config: &SheetConfig,
) -> Vec<SheetRow> {
    let header = header_rows(has_title);
    let header_len = header.len();

    header
        .into_iter()
        .chain((0..actions.len()).map(RowKind::Action))
        .enumerate()
        .map(|(overall, kind)| {
            let mut attributes = actions.row_attributes(overall, header_len, config);
            attributes.height =
                size_for_sheet_row(kind, preview_height, &attributes, sheet_width, config).height;
            SheetRow::new(kind, attributes)
        })
        .collect()
}

/// Sum of all row heights.
pub fn total_height(rows: &[SheetRow]) -> f32 {
    rows.iter().map(|r| r.attributes.height).sum()
}
