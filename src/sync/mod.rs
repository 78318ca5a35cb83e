//! Remote spreadsheet synchronization.
//!
//! The remote service is reached through two narrow traits: [`SheetSource`]
//! reads cell text back, [`SheetSink`] pushes value and formatting batches.
//! Every call is a blocking round trip; a failed call aborts the run.

mod google;
mod session;
mod workbook_file;

pub use google::{format_update_body, parse_sheet_id, values_update_body, GoogleSheetsClient};
pub use session::{read_range, BookingSession, SessionReport};
pub use workbook_file::WorkbookFileSheet;

use crate::error::Result;
use crate::types::{FormatPatch, RemoteGrid, ValueWrite};

/// Read side of a spreadsheet service.
pub trait SheetSource {
    /// Text values of `range` (A1 notation, sheet-qualified), row-major.
    fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<RemoteGrid>;
}

/// Write side of a spreadsheet service.
pub trait SheetSink {
    /// Numeric id of the first sheet of the spreadsheet.
    fn sheet_id(&self, spreadsheet_id: &str) -> Result<i64>;

    /// Write every value; returns the number of updated cells.
    fn batch_update_values(&self, spreadsheet_id: &str, writes: &[ValueWrite]) -> Result<u64>;

    /// Apply one rectangular formatting patch; returns the number of cells covered.
    fn batch_update_formatting(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        patch: &FormatPatch,
    ) -> Result<u64>;
}
