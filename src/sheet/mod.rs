pub mod actions;
pub mod controller;
pub mod snapshot;

pub use actions::{compute_row_attributes, label_for, ActionList};
pub use controller::{Sheet, SheetBuilder};
pub use snapshot::{RowSnapshot, SheetEvent, SheetSnapshot};
