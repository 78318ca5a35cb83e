//! Export tests for bookgrid
//!
//! Writes real `.xlsx` files and reads them back through the workbook
//! reader, including an offline reconciliation of a hand-edited workbook.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_lossless
)]

mod common;

use std::fs;
use std::io::{Cursor, Read, Write};

use bookgrid::config::OutputConfig;
use bookgrid::export::{build_worksheet, save_workbook, SHEET_PATH};
use bookgrid::sync::{BookingSession, SheetSource, WorkbookFileSheet};
use bookgrid::{render_catalog, BookgridError, Coloring, RenderOptions};
use common::sample_catalog;
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

fn sheet_xml(bytes: &[u8]) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut xml = String::new();
    archive
        .by_name(SHEET_PATH)
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

/// Rebuild the package `src` with its worksheet part replaced by `sheet`.
fn replace_sheet(src: &[u8], sheet: &str) -> Vec<u8> {
    let mut archive = ZipArchive::new(Cursor::new(src)).unwrap();
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let name = file.name().to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data).unwrap();
        writer.start_file(name.as_str(), FileOptions::default()).unwrap();
        if name == SHEET_PATH {
            writer.write_all(sheet.as_bytes()).unwrap();
        } else {
            writer.write_all(&data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn test_workbook_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.xlsx");
    let pass = render_catalog(&sample_catalog(), &RenderOptions::default().with_names());
    save_workbook(&pass, &path).unwrap();

    let cells = WorkbookFileSheet::new(&path).read_cells().unwrap();
    assert_eq!(cells.get(&(0, 0)).map(String::as_str), Some("CECC 2019 Bookings"));
    assert_eq!(cells.get(&(2, 0)).map(String::as_str), Some("Wheelchair accessible"));
    assert_eq!(cells.get(&(3, 0)).map(String::as_str), Some("Room ID"));
    assert_eq!(cells.get(&(3, 6)).map(String::as_str), Some("Name Surname"));
    assert_eq!(cells.get(&(4, 0)).map(String::as_str), Some("3"));
    assert_eq!(cells.get(&(4, 1)).map(String::as_str), Some("1. Cid"));
    // Covered cells of a merge carry no text
    assert!(!cells.contains_key(&(4, 2)));
}

#[test]
fn test_range_read_is_offset_and_clipped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.xlsx");
    save_workbook(
        &render_catalog(&sample_catalog(), &RenderOptions::default()),
        &path,
    )
    .unwrap();

    let grid = WorkbookFileSheet::new(&path)
        .get_values("", "Sheet1!B5:D6")
        .unwrap();
    assert_eq!(grid.cell(0, 0), Some("1. Taken"));
    assert_eq!(grid.cell(1, 0), Some("2. Free"));
    assert_eq!(grid.row_count(), 2);
    assert_eq!(grid.cell(2, 0), None);
}

#[test]
fn test_bad_range_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.xlsx");
    save_workbook(
        &render_catalog(&sample_catalog(), &RenderOptions::default()),
        &path,
    )
    .unwrap();
    let err = WorkbookFileSheet::new(&path)
        .get_values("", "Sheet1!nope")
        .unwrap_err();
    assert!(matches!(err, BookgridError::InvalidCellRef(_)));
}

#[test]
fn test_static_coloring_uses_fill_styles() {
    let pass = render_catalog(&sample_catalog(), &RenderOptions::default());
    let xml = sheet_xml(&build_worksheet(&pass).unwrap().to_xlsx().unwrap());
    assert!(xml.contains("<mergeCell ref=\"A1:I1\"/>"));
    assert!(xml.contains("<mergeCell ref=\"B5:D5\"/>"));
    assert!(xml.contains("<mergeCell ref=\"A5:A7\"/>"));
    assert!(!xml.contains("conditionalFormatting"));
}

#[test]
fn test_conditional_coloring_emits_rules() {
    let options = RenderOptions {
        coloring: Coloring::Conditional,
        ..RenderOptions::default()
    };
    let pass = render_catalog(&sample_catalog(), &options);
    let xml = sheet_xml(&build_worksheet(&pass).unwrap().to_xlsx().unwrap());
    assert_eq!(xml.matches("<conditionalFormatting ").count(), 4);
    assert!(xml.contains("<conditionalFormatting sqref=\"B5:D7\">"));
    assert!(xml.contains("type=\"notContainsText\""));
}

#[test]
fn test_offline_reconcile_from_edited_workbook() {
    let dir = TempDir::new().unwrap();
    let outputs = OutputConfig {
        workbook: dir.path().join("bookings.xlsx"),
        reconciled: dir.path().join("bookings.reconciled.json"),
    };
    let options = RenderOptions::default().with_names();
    let pass = render_catalog(&sample_catalog(), &options);
    save_workbook(&pass, &outputs.workbook).unwrap();

    // Someone typed a name into the second bed of room 3
    let original = fs::read(&outputs.workbook).unwrap();
    let xml = sheet_xml(&original).replace(
        "<c r=\"B6\" s=\"6\" t=\"inlineStr\"><is><t>2. Free</t></is></c>",
        "<c r=\"B6\" t=\"str\"><v>2. Zed</v></c>",
    );
    assert!(xml.contains("2. Zed"));
    let edited = dir.path().join("edited.xlsx");
    fs::write(&edited, replace_sheet(&original, &xml)).unwrap();

    let file = WorkbookFileSheet::new(&edited);
    let report = BookingSession::new(options, outputs.clone())
        .reconcile_from(&file, "", "Sheet1", true)
        .run(sample_catalog())
        .unwrap();

    assert_eq!(
        report.catalog.get(3).unwrap().people,
        vec![Some("Cid".to_string()), Some("Zed".to_string())]
    );
    assert!(outputs.reconciled.exists());
}
