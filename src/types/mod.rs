//! Data types shared by the layout, tracker and sync layers.

mod edit;
mod grid;
mod options;
mod room;

pub use edit::*;
pub use grid::*;
pub use options::*;
pub use room::*;
