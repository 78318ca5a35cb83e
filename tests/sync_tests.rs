//! Sync tests for bookgrid
//!
//! Full booking sessions against an in-memory sheet: publishing, reading
//! organizer edits back, and failure propagation.
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

use bookgrid::config::OutputConfig;
use bookgrid::sync::BookingSession;
use bookgrid::{
    reconcile, render_catalog, BookgridError, ReconcileWarning, RemoteGrid, RenderOptions,
    RoomCatalog, RoomType, COLOR_FREE, COLOR_TAKEN,
};
use common::{room, sample_catalog, Call, MemorySheet};
use tempfile::TempDir;

fn outputs(dir: &TempDir) -> OutputConfig {
    OutputConfig {
        workbook: dir.path().join("bookings.xlsx"),
        reconciled: dir.path().join("bookings.reconciled.json"),
    }
}

/// Publish the named admin layout of `catalog` to a fresh sheet.
fn admin_sheet(catalog: &RoomCatalog, dir: &TempDir) -> MemorySheet {
    let admin = MemorySheet::new();
    BookingSession::new(RenderOptions::default().with_names(), outputs(dir))
        .publish_to(&admin, "admin", "Sheet1")
        .run(catalog.clone())
        .unwrap();
    admin.calls.borrow_mut().clear();
    admin
}

#[test]
fn test_publish_writes_values_then_formatting() {
    let dir = TempDir::new().unwrap();
    let sheet = MemorySheet::new();
    let report = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .publish_to(&sheet, "pub", "Sheet1")
        .run(sample_catalog())
        .unwrap();

    let edits = report.edits;
    assert_eq!(edits, 3 + 3 + 4 + 4);
    assert_eq!(report.updated_cells, edits as u64);
    assert!(!report.reconciled);
    assert!(dir.path().join("bookings.xlsx").exists());
    assert!(!dir.path().join("bookings.reconciled.json").exists());

    let calls = sheet.calls.borrow();
    assert_eq!(calls[0], Call::SheetId("pub".into()));
    assert_eq!(calls[1], Call::UpdateValues("pub".into(), edits));
    assert!(matches!(calls[2], Call::UpdateFormatting(ref id, _) if id == "pub"));

    // Wheelchair room 3 is the first block: bed cells start at B5
    assert_eq!(sheet.text("B5").as_deref(), Some("1. Taken"));
    assert_eq!(sheet.text("B6").as_deref(), Some("2. Free"));

    let patches = sheet.patches.borrow();
    let patch = &patches[0];
    assert_eq!((patch.start_row, patch.start_col), (4, 1));
    assert_eq!(patch.rows[0][0].unwrap().background, COLOR_TAKEN);
    assert_eq!(patch.rows[1][0].unwrap().background, COLOR_FREE);
    assert!(patch.rows[0][1].is_none());
}

#[test]
fn test_load_remote_applies_organizer_edits() {
    let dir = TempDir::new().unwrap();
    let admin = admin_sheet(&sample_catalog(), &dir);
    admin.edit("B6", "2. Zed");
    // Ann leaves room 12 (third 4-bed block, left column, sheet row 16)
    admin.edit("B16", "1. free");

    let public = MemorySheet::new();
    let report = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .reconcile_from(&admin, "admin", "Sheet1", true)
        .publish_to(&public, "pub", "Sheet1")
        .run(sample_catalog())
        .unwrap();

    assert!(report.reconciled);
    assert!(report.warnings.is_empty());
    assert_eq!(
        *admin.calls.borrow(),
        vec![Call::GetValues("admin".into(), "Sheet1!A1:I19".into())]
    );

    let catalog = &report.catalog;
    assert_eq!(
        catalog.get(3).unwrap().people,
        vec![Some("Cid".to_string()), Some("Zed".to_string())]
    );
    assert_eq!(
        catalog.get(12).unwrap().people,
        vec![Some("Bob".to_string())]
    );
    // Hidden lector rooms are not on the sheet and keep their occupants
    assert_eq!(
        catalog.get(21).unwrap().people,
        vec![Some("Lector One".to_string())]
    );

    // The public sheet never shows names
    assert_eq!(public.text("B6").as_deref(), Some("2. Taken"));
    // Bob still holds a bed in room 12
    assert_eq!(public.text("B16").as_deref(), Some("1. Taken"));
    assert_eq!(public.text("B17").as_deref(), Some("2. Free"));
    let patches = public.patches.borrow();
    let patch = &patches[0];
    assert_eq!((patch.start_row, patch.start_col), (4, 1));
    assert_eq!(patch.rows[11][0].unwrap().background, COLOR_TAKEN);
    assert_eq!(patch.rows[12][0].unwrap().background, COLOR_FREE);

    let saved =
        RoomCatalog::load_initial(&dir.path().join("bookings.reconciled.json")).unwrap();
    assert_eq!(&saved, catalog);
}

#[test]
fn test_freed_first_bed_keeps_remaining_occupant() {
    let dir = TempDir::new().unwrap();
    let admin = admin_sheet(&sample_catalog(), &dir);
    admin.edit("B16", "1. free");

    let first = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .reconcile_from(&admin, "admin", "Sheet1", true)
        .run(sample_catalog())
        .unwrap();

    let named = render_catalog(&first.catalog, &RenderOptions::default().with_names());
    let room12: Vec<(&str, bool)> = named
        .edits
        .iter()
        .filter(|e| e.room_id == 12)
        .map(|e| (e.text.as_str(), e.taken))
        .collect();
    assert_eq!(
        room12,
        vec![
            ("1. Bob", true),
            ("2. Free", false),
            ("3. Free", false),
            ("4. Free", false)
        ]
    );

    // A second load-remote run from the republished admin sheet keeps Bob
    let admin = admin_sheet(&first.catalog, &dir);
    let second = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .reconcile_from(&admin, "admin", "Sheet1", true)
        .run(first.catalog.clone())
        .unwrap();
    assert_eq!(
        second.catalog.get(12).unwrap().people,
        vec![Some("Bob".to_string())]
    );
}

#[test]
fn test_cleared_room_is_freed() {
    let dir = TempDir::new().unwrap();
    let admin = admin_sheet(&sample_catalog(), &dir);
    // Every bed of wheelchair room 3
    for address in ["B5", "B6", "B7"] {
        admin.edit(address, "");
    }

    let report = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .reconcile_from(&admin, "admin", "Sheet1", true)
        .run(sample_catalog())
        .unwrap();

    assert!(report.catalog.get(3).unwrap().people.is_empty());
    assert_eq!(
        report.catalog.get(12).unwrap().people,
        vec![Some("Ann".to_string()), Some("Bob".to_string())]
    );
}

#[test]
fn test_reconciling_from_publish_target_reads_anonymized() {
    let dir = TempDir::new().unwrap();
    let sheet = MemorySheet::new();
    BookingSession::new(RenderOptions::default(), outputs(&dir))
        .publish_to(&sheet, "pub", "Sheet1")
        .run(sample_catalog())
        .unwrap();
    sheet.edit("B6", "2. Zed");

    let report = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .reconcile_from(&sheet, "pub", "Sheet1", true)
        .publish_to(&sheet, "pub", "Sheet1")
        .run(sample_catalog())
        .unwrap();

    assert_eq!(
        report.catalog.get(11).unwrap().people,
        vec![
            Some("Dee".to_string()),
            Some("Eve".to_string()),
            Some("Fay".to_string()),
            Some("Gus".to_string())
        ]
    );
    assert_eq!(
        report.catalog.get(3).unwrap().people,
        vec![Some("Cid".to_string()), Some("Zed".to_string())]
    );
    assert_eq!(sheet.text("B6").as_deref(), Some("2. Taken"));
}

#[test]
fn test_round_trip_without_edits_is_stable() {
    let dir = TempDir::new().unwrap();
    let admin = admin_sheet(&sample_catalog(), &dir);

    let report = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .reconcile_from(&admin, "admin", "Sheet1", true)
        .run(sample_catalog())
        .unwrap();

    assert_eq!(report.catalog, sample_catalog().sort());
    assert_eq!(report.updated_cells, 0);
}

#[test]
fn test_anonymous_source_keeps_rendered_occupants() {
    let dir = TempDir::new().unwrap();
    let public = MemorySheet::new();
    BookingSession::new(RenderOptions::default(), outputs(&dir))
        .publish_to(&public, "pub", "Sheet1")
        .run(sample_catalog())
        .unwrap();

    let report = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .reconcile_from(&public, "pub", "Sheet1", false)
        .run(sample_catalog())
        .unwrap();
    assert_eq!(report.catalog, sample_catalog().sort());
}

#[test]
fn test_unknown_room_is_skipped_with_warning() {
    let rendered = RoomCatalog::new(vec![
        room(1, RoomType::FourBed, 2, &[Some("Ann")]),
        room(99, RoomType::FourBed, 2, &[Some("Ghost")]),
    ]);
    let options = RenderOptions::default().with_names();
    let pass = render_catalog(&rendered, &options);

    let mut grid = RemoteGrid::default();
    for edit in &pass.edits {
        grid.set(edit.row, edit.col, edit.text.as_str());
    }

    let known = RoomCatalog::new(vec![room(1, RoomType::FourBed, 2, &[])]);
    let result = reconcile(&grid, &pass.edits, &known, &options);

    assert_eq!(result.warnings.len(), 2);
    assert!(matches!(
        result.warnings[0],
        ReconcileWarning::UnknownRoomId { room_id: 99, row: 4, col: 6 }
    ));
    assert_eq!(result.catalog.len(), 1);
    assert_eq!(
        result.catalog.get(1).unwrap().people,
        vec![Some("Ann".to_string())]
    );
}

#[test]
fn test_remote_failure_aborts_run() {
    let dir = TempDir::new().unwrap();
    let sheet = MemorySheet::failing(503);
    let err = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .publish_to(&sheet, "pub", "Sheet1")
        .run(sample_catalog())
        .unwrap_err();
    assert!(matches!(err, BookgridError::Remote { status: 503, .. }));
    assert_eq!(sheet.calls.borrow().len(), 1);
}

#[test]
fn test_publishing_empty_catalog_fails() {
    let dir = TempDir::new().unwrap();
    let sheet = MemorySheet::new();
    let err = BookingSession::new(RenderOptions::default(), outputs(&dir))
        .publish_to(&sheet, "pub", "Sheet1")
        .run(RoomCatalog::default())
        .unwrap_err();
    assert!(matches!(err, BookgridError::EmptyEditSet));
    assert!(sheet.calls.borrow().is_empty());
    // The local workbook is still written
    assert!(dir.path().join("bookings.xlsx").exists());
}
