//! Shared fixtures for the integration tests.
//!
//! `MemorySheet` stands in for the remote spreadsheet: value writes land in
//! an in-memory grid that later reads return, so whole sessions run offline.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_lossless
)]

use std::cell::RefCell;

use bookgrid::cell_ref::{parse_cell_range, parse_cell_ref};
use bookgrid::sync::{SheetSink, SheetSource};
use bookgrid::{BookgridError, FormatPatch, RemoteGrid, Result, Room, RoomCatalog, RoomType, ValueWrite};

// ============================================================================
// Dataset fixtures
// ============================================================================

pub fn room(id: u32, room_type: RoomType, beds: u32, people: &[Option<&str>]) -> Room {
    Room {
        id,
        room_type,
        beds,
        people: people.iter().map(|p| p.map(str::to_string)).collect(),
    }
}

/// Small mixed catalog, deliberately unsorted.
pub fn sample_catalog() -> RoomCatalog {
    RoomCatalog::new(vec![
        room(12, RoomType::FourBed, 4, &[Some("Ann"), Some("Bob")]),
        room(3, RoomType::Wheelchair, 3, &[Some("Cid")]),
        room(10, RoomType::FourBed, 3, &[]),
        room(21, RoomType::Duplex2, 2, &[Some("Lector One")]),
        room(11, RoomType::FourBed, 4, &[Some("Dee"), Some("Eve"), Some("Fay"), Some("Gus")]),
    ])
}

pub const SAMPLE_JSON: &str = r#"[
  {"id": 12, "type": "4", "beds": 4, "people": ["Ann", "Bob"]},
  {"id": 3, "type": "3", "beds": 3, "people": ["Cid"]},
  {"id": 10, "type": "4", "beds": 3},
  {"id": 21, "type": "m2", "beds": 2, "people": ["Lector One"]},
  {"id": 11, "type": "4", "beds": 4, "people": ["Dee", "Eve", "Fay", "Gus"]}
]"#;

// ============================================================================
// In-memory sheet service
// ============================================================================

/// One call received by a [`MemorySheet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SheetId(String),
    GetValues(String, String),
    UpdateValues(String, usize),
    UpdateFormatting(String, usize),
}

#[derive(Debug, Default)]
pub struct MemorySheet {
    pub grid: RefCell<RemoteGrid>,
    pub patches: RefCell<Vec<FormatPatch>>,
    pub calls: RefCell<Vec<Call>>,
    /// Answer every call with this HTTP status instead
    pub fail_with: Option<u16>,
}

impl MemorySheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(status: u16) -> Self {
        Self {
            fail_with: Some(status),
            ..Self::default()
        }
    }

    /// Simulate an organizer typing into a cell, e.g. `edit("B5", "1. Zed")`.
    pub fn edit(&self, address: &str, text: &str) {
        let (row, col) = parse_cell_ref(address).unwrap();
        self.grid.borrow_mut().set(row, col, text);
    }

    pub fn text(&self, address: &str) -> Option<String> {
        let (row, col) = parse_cell_ref(address).unwrap();
        self.grid.borrow().cell(row, col).map(str::to_string)
    }

    fn check(&self) -> Result<()> {
        match self.fail_with {
            Some(status) => Err(BookgridError::Remote {
                status,
                body: "simulated failure".into(),
            }),
            None => Ok(()),
        }
    }
}

impl SheetSource for MemorySheet {
    fn get_values(&self, spreadsheet_id: &str, range: &str) -> Result<RemoteGrid> {
        self.calls
            .borrow_mut()
            .push(Call::GetValues(spreadsheet_id.into(), range.into()));
        self.check()?;
        let bounds = parse_cell_range(range).unwrap();
        let grid = self.grid.borrow();
        let mut out = RemoteGrid::default();
        for row in bounds.first_row..=bounds.last_row {
            for col in bounds.first_col..=bounds.last_col {
                if let Some(text) = grid.cell(row, col) {
                    if !text.is_empty() {
                        out.set(row - bounds.first_row, col - bounds.first_col, text);
                    }
                }
            }
        }
        Ok(out)
    }
}

impl SheetSink for MemorySheet {
    fn sheet_id(&self, spreadsheet_id: &str) -> Result<i64> {
        self.calls
            .borrow_mut()
            .push(Call::SheetId(spreadsheet_id.into()));
        self.check()?;
        Ok(0)
    }

    fn batch_update_values(&self, spreadsheet_id: &str, writes: &[ValueWrite]) -> Result<u64> {
        self.calls
            .borrow_mut()
            .push(Call::UpdateValues(spreadsheet_id.into(), writes.len()));
        self.check()?;
        let mut grid = self.grid.borrow_mut();
        for write in writes {
            let cell = parse_cell_range(&write.range).unwrap();
            grid.set(cell.first_row, cell.first_col, write.text.as_str());
        }
        Ok(writes.len() as u64)
    }

    fn batch_update_formatting(
        &self,
        spreadsheet_id: &str,
        _sheet_id: i64,
        patch: &FormatPatch,
    ) -> Result<u64> {
        self.calls
            .borrow_mut()
            .push(Call::UpdateFormatting(spreadsheet_id.into(), patch.cell_count()));
        self.check()?;
        self.patches.borrow_mut().push(patch.clone());
        Ok(patch.cell_count() as u64)
    }
}
