use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BookgridError, Result};

/// Text values read back from a sheet, row-major.
///
/// Rows may be ragged: the remote service drops trailing empty cells and rows.
/// Index `(0, 0)` is cell `A1`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteGrid {
    pub rows: Vec<Vec<String>>,
}

impl RemoteGrid {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Text at `(row, col)`, or `None` outside the returned cells.
    pub fn cell(&self, row: u32, col: u32) -> Option<&str> {
        self.rows
            .get(row as usize)
            .and_then(|r| r.get(col as usize))
            .map(String::as_str)
    }

    /// Set `(row, col)`, growing rows and columns with empty strings as needed.
    pub fn set(&mut self, row: u32, col: u32, text: impl Into<String>) {
        let (row, col) = (row as usize, col as usize);
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        if let Some(cells) = self.rows.get_mut(row) {
            if cells.len() <= col {
                cells.resize_with(col + 1, String::new);
            }
            if let Some(cell) = cells.get_mut(col) {
                *cell = text.into();
            }
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Build a grid from a JSON `values` payload (array of arrays of scalars).
    ///
    /// Numbers and booleans are kept as their textual form; `null` becomes an
    /// empty cell.
    ///
    /// # Errors
    /// Returns [`BookgridError::RemoteFormat`] when the payload is not an
    /// array of arrays, or a cell holds a nested array or object.
    pub fn from_json_values(values: &Value) -> Result<Self> {
        let rows = values
            .as_array()
            .ok_or_else(|| BookgridError::RemoteFormat("values is not an array".into()))?;

        let rows = rows
            .iter()
            .enumerate()
            .map(|(r, row)| {
                let cells = row.as_array().ok_or_else(|| {
                    BookgridError::RemoteFormat(format!("row {r} is not an array"))
                })?;
                cells
                    .iter()
                    .enumerate()
                    .map(|(c, cell)| match cell {
                        Value::String(s) => Ok(s.clone()),
                        Value::Number(n) => Ok(n.to_string()),
                        Value::Bool(b) => Ok(if *b { "TRUE" } else { "FALSE" }.to_string()),
                        Value::Null => Ok(String::new()),
                        Value::Array(_) | Value::Object(_) => Err(BookgridError::RemoteFormat(
                            format!("cell ({r}, {c}) is not a scalar"),
                        )),
                    })
                    .collect::<Result<Vec<String>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rows })
    }
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
    use serde_json::json;

    #[test]
    fn test_ragged_rows() {
        let grid = RemoteGrid::from_json_values(&json!([["a"], [], ["", "1. Free"]])).unwrap();
        assert_eq!(grid.cell(0, 0), Some("a"));
        assert_eq!(grid.cell(0, 1), None);
        assert_eq!(grid.cell(1, 0), None);
        assert_eq!(grid.cell(2, 1), Some("1. Free"));
        assert_eq!(grid.cell(7, 7), None);
    }

    #[test]
    fn test_scalars_become_text() {
        let grid = RemoteGrid::from_json_values(&json!([[12, true, null]])).unwrap();
        assert_eq!(grid.rows[0], vec!["12", "TRUE", ""]);
    }

    #[test]
    fn test_rejects_non_row_major() {
        assert!(matches!(
            RemoteGrid::from_json_values(&json!({"a": 1})),
            Err(BookgridError::RemoteFormat(_))
        ));
        assert!(matches!(
            RemoteGrid::from_json_values(&json!(["flat", "list"])),
            Err(BookgridError::RemoteFormat(_))
        ));
        assert!(matches!(
            RemoteGrid::from_json_values(&json!([[["nested"]]])),
            Err(BookgridError::RemoteFormat(_))
        ));
    }

    #[test]
    fn test_set_grows_grid() {
        let mut grid = RemoteGrid::default();
        grid.set(2, 3, "x");
        assert_eq!(grid.row_count(), 3);
        assert_eq!(grid.cell(2, 3), Some("x"));
        assert_eq!(grid.cell(2, 0), Some(""));
    }
}
