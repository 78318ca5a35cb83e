//! Utilities for Excel-style cell references.
//!
//! The booking sheet never exceeds nine columns, so writing only supports the
//! single-letter columns `A` through `Z`. Parsing accepts any column width so
//! that workbooks edited by hand can still be read back.

use crate::error::{BookgridError, Result};
use crate::types::CellRange;

/// Highest column index expressible as a single letter (`Z`).
pub const MAX_COL: u32 = 25;

/// Convert a 0-indexed column into its letter, e.g. `0 -> "A"`.
///
/// # Errors
/// Returns [`BookgridError::ColumnOutOfRange`] past column `Z`.
pub fn col_to_letter(col: u32) -> Result<char> {
    if col > MAX_COL {
        return Err(BookgridError::ColumnOutOfRange(col));
    }
    char::from_u32(u32::from(b'A') + col).ok_or(BookgridError::ColumnOutOfRange(col))
}

/// Format a 0-indexed `(row, col)` as an A1 reference, e.g. `(3, 1) -> "B4"`.
///
/// # Errors
/// Returns [`BookgridError::ColumnOutOfRange`] past column `Z`.
pub fn cell_ref(row: u32, col: u32) -> Result<String> {
    Ok(format!("{}{}", col_to_letter(col)?, row + 1))
}

/// Format a rectangle as `A1:D1`, or as a single reference when it covers one cell.
///
/// # Errors
/// Returns [`BookgridError::ColumnOutOfRange`] past column `Z`.
pub fn range_ref(range: &CellRange) -> Result<String> {
    let start = cell_ref(range.first_row, range.first_col)?;
    if range.first_row == range.last_row && range.first_col == range.last_col {
        return Ok(start);
    }
    Ok(format!(
        "{}:{}",
        start,
        cell_ref(range.last_row, range.last_col)?
    ))
}

/// Prefix an address with its sheet name, e.g. `Sheet1!B4`.
pub fn qualified(sheet: &str, address: &str) -> String {
    format!("{sheet}!{address}")
}

/// Parse a cell reference like "A1" into (row, col), both 0-indexed.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for ch in cell_ref.trim().chars() {
        if ch == '$' {
            continue;
        }
        if ch.is_ascii_alphabetic() && !saw_row {
            let upper = ch.to_ascii_uppercase();
            col = col.checked_mul(26)?.checked_add(upper as u32 - 'A' as u32 + 1)?;
            saw_col = true;
        } else if ch.is_ascii_digit() {
            row = row.checked_mul(10)?.checked_add(ch as u32 - '0' as u32)?;
            saw_row = true;
        } else {
            return None;
        }
    }

    if !saw_col || !saw_row || row == 0 {
        return None;
    }

    Some((row - 1, col - 1))
}

/// Parse a range like "A1:B10", "A1" or "Sheet1!A1:B10" into a rectangle.
///
/// A sheet prefix is ignored. Returns `None` for malformed or inverted ranges.
pub fn parse_cell_range(range: &str) -> Option<CellRange> {
    let range = range.rsplit_once('!').map_or(range, |(_, r)| r);
    let (start, end) = range.split_once(':').unwrap_or((range, range));
    let (first_row, first_col) = parse_cell_ref(start)?;
    let (last_row, last_col) = parse_cell_ref(end)?;
    if last_row < first_row || last_col < first_col {
        return None;
    }
    Some(CellRange {
        first_row,
        first_col,
        last_row,
        last_col,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_ref_is_one_based_row() {
        assert_eq!(cell_ref(0, 0).unwrap(), "A1");
        assert_eq!(cell_ref(3, 1).unwrap(), "B4");
        assert_eq!(cell_ref(9, 8).unwrap(), "I10");
    }

    #[test]
    fn test_range_ref() {
        let title = CellRange {
            first_row: 0,
            first_col: 0,
            last_row: 0,
            last_col: 3,
        };
        assert_eq!(range_ref(&title).unwrap(), "A1:D1");
        assert_eq!(range_ref(&CellRange::cell(4, 2)).unwrap(), "C5");
    }

    #[test]
    fn test_column_past_z_is_rejected() {
        assert_eq!(col_to_letter(25).unwrap(), 'Z');
        assert!(matches!(
            col_to_letter(26),
            Err(BookgridError::ColumnOutOfRange(26))
        ));
    }

    #[test]
    fn test_parse_cell_ref() {
        assert_eq!(parse_cell_ref("A1"), Some((0, 0)));
        assert_eq!(parse_cell_ref("b4"), Some((3, 1)));
        assert_eq!(parse_cell_ref("$I$10"), Some((9, 8)));
        assert_eq!(parse_cell_ref("AA3"), Some((2, 26)));
    }

    #[test]
    fn test_parse_cell_ref_rejects_garbage() {
        assert_eq!(parse_cell_ref(""), None);
        assert_eq!(parse_cell_ref("A"), None);
        assert_eq!(parse_cell_ref("12"), None);
        assert_eq!(parse_cell_ref("A0"), None);
        assert_eq!(parse_cell_ref("1A"), None);
        assert_eq!(parse_cell_ref("A-1"), None);
    }

    #[test]
    fn test_parse_cell_range() {
        let r = parse_cell_range("Sheet1!A1:I20").unwrap();
        assert_eq!((r.first_row, r.first_col, r.last_row, r.last_col), (0, 0, 19, 8));
        assert_eq!(parse_cell_range("C5"), Some(CellRange::cell(4, 2)));
        assert_eq!(parse_cell_range("D4:A1"), None);
        assert_eq!(parse_cell_range("Sheet1!"), None);
    }

    #[test]
    fn test_qualified() {
        assert_eq!(qualified("Sheet1", "B4"), "Sheet1!B4");
    }
}
