//! Ordered action list and per-row decoration.

use tracing::debug;

use crate::config::SheetConfig;
use crate::models::{Action, ActionId, Corners, Insets, RowAttributes};

/// Actions shown in section 1, with at most one cancel action, always last.
#[derive(Debug, Clone, Default)]
pub struct ActionList {
    actions: Vec<Action>,
}

impl ActionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an action.
    ///
    /// An action replaces any existing action with the same id, and a new
    /// cancel action replaces any existing one. The cancel action is then
    /// moved to the end; other actions keep their insertion order.
    pub fn add(&mut self, action: Action) {
        let cancel = action.is_cancel();
        self.actions.retain(|a| a.id != action.id && !(cancel && a.is_cancel()));

        debug!(id = ?action.id, label = %action.label, style = ?action.style, "Adding action");
        self.actions.push(action);

        if let Some(pos) = self.actions.iter().position(Action::is_cancel) {
            let cancel = self.actions.remove(pos);
            self.actions.push(cancel);
        }
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Removes and returns every action.
    pub fn take(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Action> {
        self.actions.get(index)
    }

    pub fn find(&self, id: ActionId) -> Option<&Action> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    pub fn cancel_action(&self) -> Option<&Action> {
        self.actions.last().filter(|a| a.is_cancel())
    }

    pub fn has_cancel(&self) -> bool {
        self.cancel_action().is_some()
    }

    /// Row attributes for the row at `overall_index` of a sheet with
    /// `header_rows` rows in section 0 followed by these actions.
    pub fn row_attributes(
        &self,
        overall_index: usize,
        header_rows: usize,
        config: &SheetConfig,
    ) -> RowAttributes {
        compute_row_attributes(
            overall_index,
            header_rows + self.actions.len(),
            overall_index >= header_rows,
            self.has_cancel(),
            config,
        )
    }
}

/// Label shown for `action` given the number of selected assets.
pub fn label_for(action: &Action, selection_count: usize) -> String {
    if selection_count > 0 {
        action.secondary_label(selection_count)
    } else {
        action.label.clone()
    }
}

/// Corners, insets and separator for one row of the grouped sheet.
///
/// Rows are numbered across both sections. The first row is top-rounded. A
/// cancel row (always the last row) is rounded on all corners and detached by
/// the inner inset, with the row above it bottom-rounded. Without a cancel row
/// the last row is bottom-rounded. Separators only appear on action rows.
/// `height` is left at zero for the layout to fill in.
pub fn compute_row_attributes(
    index: usize,
    total_rows: usize,
    is_action_row: bool,
    cancel_present: bool,
    config: &SheetConfig,
) -> RowAttributes {
    let separator_visible = is_action_row;

    if !config.capabilities.rounds_rows() {
        return RowAttributes {
            separator_visible,
            ..RowAttributes::default()
        };
    }

    let side = config.sheet_inset;
    let inner = config.inner_inset;
    let last = total_rows.saturating_sub(1);

    let (corners, insets) = if index == 0 {
        (Corners::Top, Insets::new(0.0, side, 0.0, side))
    } else if cancel_present && index == last {
        (Corners::All, Insets::new(inner, side, side, side))
    } else if cancel_present && index + 1 == last {
        (Corners::Bottom, Insets::new(0.0, side, inner, side))
    } else if !cancel_present && index == last {
        (Corners::Bottom, Insets::new(0.0, side, side, side))
    } else {
        (Corners::None, Insets::new(0.0, side, 0.0, side))
    };

    RowAttributes {
        corners,
        insets,
        separator_visible,
        height: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Capabilities;
    use crate::models::ActionStyle;

    fn action(id: u32, style: ActionStyle) -> Action {
        Action::new(ActionId(id), format!("action {}", id), style)
    }

    fn ids(list: &ActionList) -> Vec<u32> {
        list.iter().map(|a| a.id.0).collect()
    }

    #[test]
    fn test_cancel_moves_to_end() {
        let mut list = ActionList::new();
        list.add(action(1, ActionStyle::Default));
        list.add(action(2, ActionStyle::Cancel));
        list.add(action(3, ActionStyle::Default));
        assert_eq!(ids(&list), vec![1, 3, 2]);
    }

    #[test]
    fn test_cancel_is_replaced() {
        let mut list = ActionList::new();
        list.add(action(1, ActionStyle::Cancel));
        list.add(action(2, ActionStyle::Destructive));
        list.add(action(3, ActionStyle::Cancel));
        list.add(action(4, ActionStyle::Default));

        assert_eq!(ids(&list), vec![2, 4, 3]);
        assert_eq!(list.iter().filter(|a| a.is_cancel()).count(), 1);
        assert_eq!(list.cancel_action().map(|a| a.id), Some(ActionId(3)));
    }

    #[test]
    fn test_duplicate_id_replaces_existing() {
        let mut list = ActionList::new();
        list.add(action(1, ActionStyle::Default));
        list.add(action(9, ActionStyle::Cancel));
        list.add(action(9, ActionStyle::Default));
        list.add(action(2, ActionStyle::Default));

        assert_eq!(ids(&list), vec![1, 9, 2]);
        assert!(!list.has_cancel());
        assert_eq!(list.find(ActionId(9)).map(|a| a.style), Some(ActionStyle::Default));

        list.add(action(1, ActionStyle::Cancel));
        assert_eq!(ids(&list), vec![9, 2, 1]);
        assert_eq!(list.iter().filter(|a| a.id == ActionId(1)).count(), 1);
    }

    #[test]
    fn test_relative_order_preserved() {
        let mut list = ActionList::new();
        for id in 0..6 {
            let style = if id % 2 == 0 {
                ActionStyle::Cancel
            } else {
                ActionStyle::Default
            };
            list.add(action(id, style));
        }
        assert_eq!(ids(&list), vec![1, 3, 5, 4]);
    }

    #[test]
    fn test_label_for_selection_count() {
        let action = Action::new(ActionId(1), "Photo Library", ActionStyle::Default)
            .with_secondary_label(|n| format!("Add {} Photos", n));
        assert_eq!(label_for(&action, 0), "Photo Library");
        assert_eq!(label_for(&action, 2), "Add 2 Photos");
    }

    #[test]
    fn test_row_attributes_with_cancel() {
        let config = SheetConfig::default();
        let mut list = ActionList::new();
        list.add(action(1, ActionStyle::Default));
        list.add(action(2, ActionStyle::Default));
        list.add(action(3, ActionStyle::Cancel));

        // Title + preview header, then three actions.
        let attrs: Vec<RowAttributes> = (0..5)
            .map(|i| list.row_attributes(i, 2, &config))
            .collect();
        assert_eq!(attrs[0].corners, Corners::Top);
        assert_eq!(attrs[1].corners, Corners::None);
        assert_eq!(attrs[2].corners, Corners::None);
        assert_eq!(attrs[3].corners, Corners::Bottom);
        assert_eq!(attrs[3].insets, Insets::new(0.0, 10.0, 4.0, 10.0));
        assert_eq!(attrs[4].corners, Corners::All);
        assert_eq!(attrs[4].insets, Insets::new(4.0, 10.0, 10.0, 10.0));

        assert_eq!(
            attrs.iter().filter(|a| a.corners == Corners::All).count(),
            1
        );
        assert!(!attrs[0].separator_visible);
        assert!(!attrs[1].separator_visible);
        assert!(attrs[2..].iter().all(|a| a.separator_visible));
    }

    #[test]
    fn test_row_attributes_without_cancel() {
        let config = SheetConfig::default();
        let mut list = ActionList::new();
        list.add(action(1, ActionStyle::Default));
        list.add(action(2, ActionStyle::Default));

        let attrs: Vec<RowAttributes> = (0..3)
            .map(|i| list.row_attributes(i, 1, &config))
            .collect();
        assert_eq!(attrs[0].corners, Corners::Top);
        assert_eq!(attrs[1].corners, Corners::None);
        assert_eq!(attrs[2].corners, Corners::Bottom);
        assert_eq!(attrs[2].insets, Insets::new(0.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn test_removing_cancel_shifts_bottom_rounding() {
        let config = SheetConfig::default();
        let mut list = ActionList::new();
        list.add(action(1, ActionStyle::Default));
        list.add(action(2, ActionStyle::Default));
        list.add(action(3, ActionStyle::Cancel));
        assert_eq!(list.row_attributes(2, 1, &config).corners, Corners::Bottom);

        let kept: Vec<Action> = list.take().into_iter().filter(|a| !a.is_cancel()).collect();
        for a in kept {
            list.add(a);
        }
        assert_eq!(list.row_attributes(1, 1, &config).corners, Corners::None);
        assert_eq!(list.row_attributes(2, 1, &config).corners, Corners::Bottom);
    }

    #[test]
    fn test_first_row_wins_over_cancel_neighbour() {
        let config = SheetConfig::default();
        let mut list = ActionList::new();
        list.add(action(1, ActionStyle::Cancel));

        assert_eq!(list.row_attributes(0, 1, &config).corners, Corners::Top);
        assert_eq!(list.row_attributes(1, 1, &config).corners, Corners::All);
    }

    #[test]
    fn test_legacy_has_no_rounding() {
        let config = SheetConfig {
            capabilities: Capabilities::legacy(),
            ..SheetConfig::default()
        };
        let mut list = ActionList::new();
        list.add(action(1, ActionStyle::Cancel));

        let first = list.row_attributes(0, 1, &config);
        assert_eq!(first.corners, Corners::None);
        assert_eq!(first.insets, Insets::default());

        let cancel = list.row_attributes(1, 1, &config);
        assert_eq!(cancel.corners, Corners::None);
        assert!(cancel.separator_visible);
    }
}
