use serde::{Deserialize, Serialize};

use super::{RoomId, RoomType};

/// One bed row written by a render pass.
///
/// Carries enough of its origin (room, bed, occupant) for reconciliation to
/// map a remote cell back onto the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellEdit {
    /// Row of the bed cell (0-indexed)
    pub row: u32,
    /// First column of the merged bed cell (0-indexed)
    pub col: u32,
    /// Last column of the merged bed cell
    pub last_col: u32,
    /// Rendered text, e.g. `"2. Taken"`
    pub text: String,
    pub taken: bool,
    pub bed_index: u32,
    pub occupant_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,
    pub room_index_in_group: u32,
    pub room_type: RoomType,
    pub room_id: RoomId,
}

/// Inclusive cell rectangle, 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRange {
    pub first_row: u32,
    pub first_col: u32,
    pub last_row: u32,
    pub last_col: u32,
}

impl CellRange {
    /// A rectangle covering a single cell.
    pub fn cell(row: u32, col: u32) -> Self {
        Self {
            first_row: row,
            first_col: col,
            last_row: row,
            last_col: col,
        }
    }

    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.first_row..=self.last_row).contains(&row)
            && (self.first_col..=self.last_col).contains(&col)
    }

    pub fn height(&self) -> u32 {
        self.last_row - self.first_row + 1
    }

    pub fn width(&self) -> u32 {
        self.last_col - self.first_col + 1
    }
}

/// RGBA color with channels in `0.0..=1.0`, the remote service's color model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

/// Background of a taken bed.
pub const COLOR_TAKEN: Rgba = Rgba {
    red: 1.0,
    green: 0.0,
    blue: 0.0,
    alpha: 1.0,
};

/// Background of a free bed.
pub const COLOR_FREE: Rgba = Rgba {
    red: 0.0,
    green: 1.0,
    blue: 0.0,
    alpha: 1.0,
};

/// A single sparse text write, addressed in A1 notation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueWrite {
    /// Sheet-qualified address, e.g. `Sheet1!B4`
    pub range: String,
    pub text: String,
}

/// Formatting directive for one cell of a [`FormatPatch`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellFormat {
    pub background: Rgba,
}

/// Dense rectangular formatting patch.
///
/// `rows[r][c]` formats cell `(start_row + r, start_col + c)`. `None` leaves the
/// cell untouched while keeping every row the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatPatch {
    pub start_row: u32,
    pub start_col: u32,
    pub rows: Vec<Vec<Option<CellFormat>>>,
}

impl FormatPatch {
    /// Total number of cells in the patch.
    pub fn cell_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }
}

/// Everything one render pass sends to the remote sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBatch {
    /// Bounding rectangle of all edits
    pub bounds: CellRange,
    pub values: Vec<ValueWrite>,
    pub formats: FormatPatch,
    /// The edits the batch was built from, in render order
    pub edits: Vec<CellEdit>,
}
