//! bookgrid - room bookings laid out as a spreadsheet
//!
//! Turns a room catalog into a two-column booking sheet and keeps it in sync
//! with a shared remote spreadsheet:
//! - Type-grouped room blocks with one merged cell per bed
//! - Sparse value writes plus one dense formatting patch per render
//! - Reconciliation of hand-edited sheets back into the catalog
//! - Local `.xlsx` artifact with static or conditional coloring
//!
//! # Usage
//!
//! ```no_run
//! use bookgrid::{render_catalog, tracker, RenderOptions, RoomCatalog};
//!
//! let catalog = RoomCatalog::load_initial("rooms.json".as_ref())?;
//! let pass = render_catalog(&catalog, &RenderOptions::default());
//! let batch = tracker::build_batch(&pass.edits, "Sheet1")?;
//! println!("{} cells to write", batch.values.len());
//! # Ok::<(), bookgrid::BookgridError>(())
//! ```

pub mod catalog;
pub mod cell_ref;
pub mod config;
pub mod error;
pub mod export;
pub mod layout;
pub mod reconcile;
pub mod sync;
pub mod tracker;
pub mod types;

pub use catalog::{RoomCatalog, RoomGroup};
pub use error::{BookgridError, Result};
pub use layout::{render_catalog, RenderPass};
pub use reconcile::{reconcile, ReconcileWarning, Reconciliation};

pub use types::*;
