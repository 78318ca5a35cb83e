//! XLSX export pipeline.
//!
//! A render pass is drawn onto an in-memory [`Worksheet`], which is then
//! serialized into a one-sheet workbook with its own style table.

mod package;
pub(crate) mod sheet_writer;
mod styles;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::layout::{geometry, CellStyle, RenderPass, SheetSurface};
use crate::types::CellRange;

pub use package::{SHEET_NAME, SHEET_PATH};

/// Width of the room-id column, in character units.
const ID_COL_WIDTH: f64 = 10.0;
/// Width of each name column, in character units.
const NAME_COL_WIDTH: f64 = 12.0;
/// Width of the gap column between block columns.
const GAP_COL_WIDTH: f64 = 3.0;

/// One written cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetCell {
    /// `None` for the covered cells of a merge, which only carry the style
    pub text: Option<String>,
    pub style: CellStyle,
}

/// A conditional coloring rule over a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalRule {
    pub range: CellRange,
    pub needle: String,
}

/// In-memory sheet that render passes are drawn onto.
#[derive(Debug, Clone, Default)]
pub struct Worksheet {
    pub cells: BTreeMap<(u32, u32), WorksheetCell>,
    pub merges: Vec<CellRange>,
    pub conditional: Vec<ConditionalRule>,
    /// Column widths in character units, keyed by 0-indexed column
    pub col_widths: BTreeMap<u32, f64>,
}

impl Worksheet {
    /// Last used `(row, col)`, or `None` for an empty sheet.
    pub fn extent(&self) -> Option<(u32, u32)> {
        let max_row = self.cells.keys().map(|&(r, _)| r).max()?;
        let max_col = self.cells.keys().map(|&(_, c)| c).max()?;
        Some((max_row, max_col))
    }

    /// Text of the cell at `(row, col)`.
    pub fn text(&self, row: u32, col: u32) -> Option<&str> {
        self.cells.get(&(row, col)).and_then(|c| c.text.as_deref())
    }

    /// Set the column widths for a sheet `width` columns wide.
    pub fn set_block_widths(&mut self, width: u32) {
        for col in 0..width {
            let offset = col % (geometry::BLOCK_WIDTH + geometry::BLOCK_GAP);
            let w = match offset {
                0 => ID_COL_WIDTH,
                o if o < geometry::BLOCK_WIDTH => NAME_COL_WIDTH,
                _ => GAP_COL_WIDTH,
            };
            self.col_widths.insert(col, w);
        }
    }

    /// Serialize into XLSX bytes.
    ///
    /// # Errors
    /// Fails on ZIP write errors or cells past column `Z`.
    pub fn to_xlsx(&self) -> Result<Vec<u8>> {
        package::write_package(self)
    }
}

impl SheetSurface for Worksheet {
    fn merge_range(&mut self, range: CellRange, text: &str, style: CellStyle) -> Result<()> {
        for row in range.first_row..=range.last_row {
            for col in range.first_col..=range.last_col {
                let text = (row == range.first_row && col == range.first_col)
                    .then(|| text.to_string());
                self.cells.insert((row, col), WorksheetCell { text, style });
            }
        }
        self.merges.push(range);
        Ok(())
    }

    fn write_string(&mut self, row: u32, col: u32, text: &str, style: CellStyle) -> Result<()> {
        self.cells.insert(
            (row, col),
            WorksheetCell {
                text: Some(text.to_string()),
                style,
            },
        );
        Ok(())
    }

    fn conditional_fill(&mut self, range: CellRange, needle: &str) -> Result<()> {
        self.conditional.push(ConditionalRule {
            range,
            needle: needle.to_string(),
        });
        Ok(())
    }
}

/// Draw `pass` onto a fresh worksheet.
///
/// # Errors
/// Propagates surface errors.
pub fn build_worksheet(pass: &RenderPass) -> Result<Worksheet> {
    let mut sheet = Worksheet::default();
    sheet.set_block_widths(pass.width);
    pass.draw(&mut sheet)?;
    Ok(sheet)
}

/// Render `pass` into an XLSX file at `path`.
///
/// # Errors
/// Fails on I/O, ZIP or cell addressing errors.
pub fn save_workbook(pass: &RenderPass, path: &Path) -> Result<()> {
    let bytes = build_worksheet(pass)?.to_xlsx()?;
    fs::write(path, bytes)?;
    log::info!("Wrote workbook {}", path.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::types::LayoutMode;

    #[test]
    fn test_block_widths_double_column() {
        let mut sheet = Worksheet::default();
        sheet.set_block_widths(geometry::sheet_width(LayoutMode::DoubleColumn));
        let widths: Vec<f64> = sheet.col_widths.values().copied().collect();
        assert_eq!(widths.len(), 9);
        assert!((widths.first().copied().unwrap() - ID_COL_WIDTH).abs() < f64::EPSILON);
        assert!((widths.get(4).copied().unwrap() - GAP_COL_WIDTH).abs() < f64::EPSILON);
        assert!((widths.get(5).copied().unwrap() - ID_COL_WIDTH).abs() < f64::EPSILON);
        assert!((widths.get(8).copied().unwrap() - NAME_COL_WIDTH).abs() < f64::EPSILON);
    }

    #[test]
    fn test_merge_keeps_text_in_origin() {
        let mut sheet = Worksheet::default();
        let range = CellRange {
            first_row: 4,
            first_col: 0,
            last_row: 6,
            last_col: 0,
        };
        sheet.merge_range(range, "12", CellStyle::RoomId).unwrap();
        assert_eq!(sheet.text(4, 0), Some("12"));
        assert_eq!(sheet.text(5, 0), None);
        assert!(sheet.cells.contains_key(&(6, 0)));
        assert_eq!(sheet.extent(), Some((6, 0)));
    }

    #[test]
    fn test_package_is_a_zip() {
        let bytes = Worksheet::default().to_xlsx().unwrap();
        let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        assert!(names.contains(&SHEET_PATH));
        assert!(names.contains(&"xl/styles.xml"));
    }
}
