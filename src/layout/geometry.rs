//! Grid geometry of the booking sheet.
//!
//! A sheet is one or two block columns, each [`BLOCK_WIDTH`] cells wide:
//! the room-id column followed by three merged name columns. Double-column
//! sheets put a single gap column between the blocks (`2 * 4 + 1` wide).

use crate::types::{CellRange, LayoutMode};

/// Width of one room block: id column + three name columns.
pub const BLOCK_WIDTH: u32 = 4;

/// Gap between neighbouring block columns.
pub const BLOCK_GAP: u32 = 1;

/// Row of the sheet title.
pub const TITLE_ROW: u32 = 0;

/// First group title row; row 1 stays blank.
pub const FIRST_GROUP_ROW: u32 = 2;

/// Position of a room block inside its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Block column, 0 = left
    pub block: u32,
    /// Row-block index inside the group
    pub row_block: u32,
}

pub fn blocks_per_row(mode: LayoutMode) -> u32 {
    match mode {
        LayoutMode::SingleColumn => 1,
        LayoutMode::DoubleColumn => 2,
    }
}

/// Total sheet width in columns.
pub fn sheet_width(mode: LayoutMode) -> u32 {
    let blocks = blocks_per_row(mode);
    blocks * BLOCK_WIDTH + (blocks - 1) * BLOCK_GAP
}

/// Leftmost column of a block column.
pub fn block_col(block: u32) -> u32 {
    block * (BLOCK_WIDTH + BLOCK_GAP)
}

/// Slot of the `index`-th room of a group: even rooms left, odd rooms right.
pub fn slot(index: u32, mode: LayoutMode) -> Slot {
    let per_row = blocks_per_row(mode);
    Slot {
        block: index % per_row,
        row_block: index / per_row,
    }
}

/// Number of row-blocks needed for `rooms` rooms.
pub fn row_blocks(rooms: u32, mode: LayoutMode) -> u32 {
    rooms.div_ceil(blocks_per_row(mode))
}

/// Full-width range of one row.
pub fn full_row(row: u32, mode: LayoutMode) -> CellRange {
    CellRange {
        first_row: row,
        first_col: 0,
        last_row: row,
        last_col: sheet_width(mode) - 1,
    }
}

/// The three merged name columns of a block on one row.
pub fn name_cells(row: u32, block_col: u32) -> CellRange {
    CellRange {
        first_row: row,
        first_col: block_col + 1,
        last_row: row,
        last_col: block_col + BLOCK_WIDTH - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_column_width() {
        assert_eq!(sheet_width(LayoutMode::DoubleColumn), 9);
        assert_eq!(sheet_width(LayoutMode::SingleColumn), 4);
    }

    #[test]
    fn test_slots_alternate() {
        let mode = LayoutMode::DoubleColumn;
        assert_eq!(slot(0, mode), Slot { block: 0, row_block: 0 });
        assert_eq!(slot(1, mode), Slot { block: 1, row_block: 0 });
        assert_eq!(slot(2, mode), Slot { block: 0, row_block: 1 });
        assert_eq!(block_col(1), 5);
    }

    #[test]
    fn test_single_column_stacks() {
        let mode = LayoutMode::SingleColumn;
        assert_eq!(slot(3, mode), Slot { block: 0, row_block: 3 });
        assert_eq!(row_blocks(3, mode), 3);
    }

    #[test]
    fn test_row_blocks_round_up() {
        let mode = LayoutMode::DoubleColumn;
        assert_eq!(row_blocks(0, mode), 0);
        assert_eq!(row_blocks(1, mode), 1);
        assert_eq!(row_blocks(3, mode), 2);
    }

    #[test]
    fn test_name_cells() {
        let r = name_cells(4, 5);
        assert_eq!((r.first_col, r.last_col), (6, 8));
    }
}
