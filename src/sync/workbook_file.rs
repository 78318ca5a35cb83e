//! Read-back of a local XLSX file as a [`SheetSource`].
//!
//! Lets a workbook that was downloaded and edited by hand be reconciled the
//! same way as a live remote sheet. Only the first worksheet is read.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use super::SheetSource;
use crate::cell_ref::{parse_cell_range, parse_cell_ref};
use crate::error::{BookgridError, Result};
use crate::export::SHEET_PATH;
use crate::types::RemoteGrid;

const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// An XLSX file on disk.
#[derive(Debug, Clone)]
pub struct WorkbookFileSheet {
    path: PathBuf,
}

impl WorkbookFileSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every non-empty cell of the first worksheet, keyed by `(row, col)`.
    ///
    /// # Errors
    /// Fails when the file is not a readable XLSX package.
    pub fn read_cells(&self) -> Result<HashMap<(u32, u32), String>> {
        let file = File::open(&self.path)?;
        let mut archive = ZipArchive::new(BufReader::new(file))?;
        let shared = parse_shared_strings(&mut archive)?;
        let sheet = archive.by_name(SHEET_PATH)?;
        parse_sheet_cells(BufReader::new(sheet), &shared)
    }
}

impl SheetSource for WorkbookFileSheet {
    fn get_values(&self, _spreadsheet_id: &str, range: &str) -> Result<RemoteGrid> {
        let bounds = parse_cell_range(range)
            .ok_or_else(|| BookgridError::InvalidCellRef(range.to_string()))?;
        let cells = self.read_cells()?;

        let mut grid = RemoteGrid::default();
        for (&(row, col), text) in &cells {
            if bounds.contains(row, col) {
                grid.set(row - bounds.first_row, col - bounds.first_col, text.as_str());
            }
        }
        log::info!(
            "Read {} cells from {}",
            cells.len(),
            self.path.display()
        );
        Ok(grid)
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// Shared string table; an absent part is an empty table.
fn parse_shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
    let file = match archive.by_name(SHARED_STRINGS_PATH) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut xml = Reader::from_reader(BufReader::new(file));
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_t = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_t = true,
                _ => {}
            },
            Event::Text(ref e) if in_t => current.push_str(&e.unescape()?),
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(strings)
}

/// Cell values of one worksheet part.
///
/// Shared (`s`), inline (`inlineStr`, including rich runs), formula string
/// (`str`), number and boolean cells are kept as text.
fn parse_sheet_cells<R: std::io::BufRead>(
    reader: R,
    shared: &[String],
) -> Result<HashMap<(u32, u32), String>> {
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut cells = HashMap::new();
    let mut buf = Vec::new();

    let mut current: Option<(u32, u32)> = None;
    let mut cell_type = String::new();
    let mut text = String::new();
    let mut in_value = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"c" => {
                    current = attr(e, b"r").as_deref().and_then(parse_cell_ref);
                    cell_type = attr(e, b"t").unwrap_or_default();
                    text.clear();
                }
                b"v" | b"t" => in_value = current.is_some(),
                _ => {}
            },
            Event::Text(ref e) if in_value => text.push_str(&e.unescape()?),
            Event::End(ref e) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    if let Some(pos) = current.take() {
                        if let Some(value) = cell_text(&cell_type, &text, shared) {
                            if !value.is_empty() {
                                cells.insert(pos, value);
                            }
                        }
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(cells)
}

fn cell_text(cell_type: &str, raw: &str, shared: &[String]) -> Option<String> {
    match cell_type {
        "s" => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i))
            .cloned(),
        "b" => Some(if raw.trim() == "1" { "TRUE" } else { "FALSE" }.to_string()),
        _ => Some(raw.to_string()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    const SHEET: &str = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>Rooms</t></is></c></row>
<row r="5"><c r="B5" t="s"><v>1</v></c><c r="C5" t="inlineStr"><is><r><t>2. </t></r><r><t>Ann</t></r></is></c></row>
<row r="6"><c r="A6" s="3"/><c r="D6"><v>42</v></c><c r="E6" t="b"><v>1</v></c></row>
</sheetData></worksheet>"#;

    #[test]
    fn test_sheet_cells() {
        let shared = vec!["x".to_string(), "1. Free".to_string()];
        let cells = parse_sheet_cells(SHEET.as_bytes(), &shared).unwrap();
        assert_eq!(cells.get(&(0, 0)).map(String::as_str), Some("Rooms"));
        assert_eq!(cells.get(&(4, 1)).map(String::as_str), Some("1. Free"));
        assert_eq!(cells.get(&(4, 2)).map(String::as_str), Some("2. Ann"));
        assert_eq!(cells.get(&(5, 3)).map(String::as_str), Some("42"));
        assert_eq!(cells.get(&(5, 4)).map(String::as_str), Some("TRUE"));
        assert!(!cells.contains_key(&(5, 0)));
    }

    #[test]
    fn test_shared_index_out_of_range_is_skipped() {
        assert_eq!(cell_text("s", "9", &[]), None);
        assert_eq!(cell_text("str", "Taken", &[]).as_deref(), Some("Taken"));
    }
}
