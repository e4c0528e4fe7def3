pub mod preview;
pub mod sheet;

pub use preview::{PreviewLayout, StripFrame};
