//! Edit tracking and diff building.
//!
//! Turns the bed-row edits of one render pass into the two remote write
//! batches: sparse text writes addressed cell by cell, and one dense
//! formatting patch over the bounding rectangle of all edits. The formatting
//! patch has to be rectangular, so cells inside the rectangle that no edit
//! touches still get an (empty) entry.

use std::collections::BTreeMap;

use crate::cell_ref::{cell_ref, qualified};
use crate::error::{BookgridError, Result};
use crate::types::{
    CellEdit, CellFormat, CellRange, EditBatch, FormatPatch, ValueWrite, COLOR_FREE, COLOR_TAKEN,
};

/// Lookup from `(row, col)` to the edit written there.
#[derive(Debug, Clone, Default)]
pub struct EditMap<'a> {
    cells: BTreeMap<(u32, u32), &'a CellEdit>,
}

impl<'a> EditMap<'a> {
    /// Index `edits` by their anchor cell. A later edit at the same cell wins.
    pub fn new(edits: &'a [CellEdit]) -> Self {
        let cells = edits.iter().map(|e| ((e.row, e.col), e)).collect();
        Self { cells }
    }

    /// The edit anchored at `(row, col)`, if any.
    pub fn get(&self, row: u32, col: u32) -> Option<&'a CellEdit> {
        self.cells.get(&(row, col)).copied()
    }
}

/// Smallest rectangle holding every edit, merged columns included.
///
/// # Errors
/// Returns [`BookgridError::EmptyEditSet`] when `edits` is empty.
pub fn bounding_rect(edits: &[CellEdit]) -> Result<CellRange> {
    let first = edits.first().ok_or(BookgridError::EmptyEditSet)?;
    let init = CellRange {
        first_row: first.row,
        first_col: first.col,
        last_row: first.row,
        last_col: first.last_col,
    };
    Ok(edits.iter().fold(init, |acc, e| CellRange {
        first_row: acc.first_row.min(e.row),
        first_col: acc.first_col.min(e.col),
        last_row: acc.last_row.max(e.row),
        last_col: acc.last_col.max(e.last_col),
    }))
}

/// One sparse text write per edit, addressed as `{sheet}!{A1}`.
///
/// # Errors
/// Returns [`BookgridError::ColumnOutOfRange`] past column `Z`.
pub fn value_writes(edits: &[CellEdit], sheet: &str) -> Result<Vec<ValueWrite>> {
    edits
        .iter()
        .map(|e| {
            Ok(ValueWrite {
                range: qualified(sheet, &cell_ref(e.row, e.col)?),
                text: e.text.clone(),
            })
        })
        .collect()
}

/// Dense background patch covering `bounds`.
pub fn format_patch(edits: &[CellEdit], bounds: &CellRange) -> FormatPatch {
    let map = EditMap::new(edits);
    let rows = (bounds.first_row..=bounds.last_row)
        .map(|row| {
            (bounds.first_col..=bounds.last_col)
                .map(|col| {
                    map.get(row, col).map(|e| CellFormat {
                        background: if e.taken { COLOR_TAKEN } else { COLOR_FREE },
                    })
                })
                .collect()
        })
        .collect();

    FormatPatch {
        start_row: bounds.first_row,
        start_col: bounds.first_col,
        rows,
    }
}

/// Build the complete write batch for one render pass.
///
/// # Errors
/// Returns [`BookgridError::EmptyEditSet`] when there are no edits, and
/// [`BookgridError::ColumnOutOfRange`] past column `Z`.
pub fn build_batch(edits: &[CellEdit], sheet: &str) -> Result<EditBatch> {
    let bounds = bounding_rect(edits)?;
    let values = value_writes(edits, sheet)?;
    let formats = format_patch(edits, &bounds);

    log::debug!(
        "Edit batch: {} value writes, {}x{} format patch at row {} col {}",
        values.len(),
        bounds.height(),
        bounds.width(),
        bounds.first_row,
        bounds.first_col
    );

    Ok(EditBatch {
        bounds,
        values,
        formats,
        edits: edits.to_vec(),
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::RoomType;

    fn edit(row: u32, col: u32, taken: bool) -> CellEdit {
        CellEdit {
            row,
            col,
            last_col: col + 2,
            text: format!("r{row}c{col}"),
            taken,
            bed_index: 0,
            occupant_count: u32::from(taken),
            person: None,
            room_index_in_group: 0,
            room_type: RoomType::FourBed,
            room_id: 1,
        }
    }

    #[test]
    fn test_empty_edit_set_is_fatal() {
        assert!(matches!(
            build_batch(&[], "Sheet1"),
            Err(BookgridError::EmptyEditSet)
        ));
    }

    #[test]
    fn test_bounds_use_last_col() {
        let edits = vec![edit(4, 1, true), edit(5, 6, false), edit(9, 1, false)];
        let bounds = bounding_rect(&edits).unwrap();
        assert_eq!(
            bounds,
            CellRange {
                first_row: 4,
                first_col: 1,
                last_row: 9,
                last_col: 8,
            }
        );
    }

    #[test]
    fn test_value_writes_are_sheet_qualified() {
        let writes = value_writes(&[edit(3, 1, true)], "Sheet1").unwrap();
        assert_eq!(writes[0].range, "Sheet1!B4");
        assert_eq!(writes[0].text, "r3c1");
    }

    #[test]
    fn test_format_patch_is_rectangular() {
        let edits = vec![edit(4, 1, true), edit(6, 6, false)];
        let batch = build_batch(&edits, "Sheet1").unwrap();
        let patch = &batch.formats;
        assert_eq!(patch.rows.len(), 3);
        assert!(patch.rows.iter().all(|r| r.len() == 8));
        assert_eq!(patch.cell_count(), 24);

        assert_eq!(patch.rows[0][0].unwrap().background, COLOR_TAKEN);
        assert_eq!(patch.rows[2][5].unwrap().background, COLOR_FREE);
        // merged tail columns and untouched rows get no directive
        assert!(patch.rows[0][1].is_none());
        assert!(patch.rows[1].iter().all(Option::is_none));
    }

    #[test]
    fn test_edit_map_absent_cells() {
        let edits = vec![edit(4, 1, true)];
        let map = EditMap::new(&edits);
        assert!(map.get(4, 1).is_some());
        assert!(map.get(4, 2).is_none());
        assert!(map.get(0, 0).is_none());
    }
}
