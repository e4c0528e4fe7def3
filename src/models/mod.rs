pub mod action;
pub mod asset;
pub mod row_model;
pub mod selection;

pub use action::*;
pub use asset::*;
pub use row_model::*;
pub use selection::*;
