//! Remote reconciliation.
//!
//! Reads a grid of cell texts back from the sheet, maps every bed cell to the
//! room and bed it was rendered from, and rebuilds the catalog's occupant
//! lists from what the cells now say.
//!
//! Cell text is parsed leniently: anything that is not recognisably free is
//! taken as an occupant name, verbatim.

use std::collections::BTreeMap;

use crate::catalog::RoomCatalog;
use crate::cell_ref::cell_ref;
use crate::types::{CellEdit, RemoteGrid, RenderOptions, Room, RoomId, TAKEN_LABEL};

/// Parsed state of one bed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Free,
    Occupied(String),
}

/// Non-fatal problem met while reconciling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileWarning {
    /// A bed cell points at a room the catalog does not know; its text was dropped.
    UnknownRoomId { room_id: RoomId, row: u32, col: u32 },
}

/// Result of a reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// The rebuilt catalog, sorted by `(type, id)`
    pub catalog: RoomCatalog,
    pub warnings: Vec<ReconcileWarning>,
    /// Number of bed cells applied
    pub matched_cells: usize,
}

/// Strip a leading `"{digits}."` bed index and the spaces after it.
fn strip_index_prefix(text: &str) -> &str {
    let rest = text.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() == text.len() {
        return text;
    }
    rest.strip_prefix('.').map_or(text, str::trim_start)
}

/// Classify the text of a bed cell.
///
/// `"3. Free"`, `"1."` and `""` are free; `"2. John Smith"` is occupied by
/// `"John Smith"`. Any text containing "free" (any case) counts as free.
pub fn parse_slot_text(text: &str) -> SlotState {
    let rest = strip_index_prefix(text.trim()).trim();
    if rest.is_empty() || rest.to_lowercase().contains("free") {
        return SlotState::Free;
    }
    SlotState::Occupied(rest.to_string())
}

/// Occupant list from resolved beds: occupied beds only, ascending by bed.
///
/// Free beds leave no entry, so the occupied beds always form a prefix when
/// the room is rendered again.
fn assemble_people(beds: &BTreeMap<u32, Option<String>>) -> Vec<Option<String>> {
    beds.values().filter(|name| name.is_some()).cloned().collect()
}

/// Rebuild `known` from the texts in `grid`.
///
/// Only cells anchored at a recorded edit are looked at. A cell the grid does
/// not return reads as empty, and so as free: the service drops trailing
/// empty cells. Rooms without any edit (not rendered) keep their occupants.
/// With names hidden, a cell still reading the anonymous label keeps the
/// occupant it was rendered from.
pub fn reconcile(
    grid: &RemoteGrid,
    edits: &[CellEdit],
    known: &RoomCatalog,
    options: &RenderOptions,
) -> Reconciliation {
    let mut resolved: BTreeMap<RoomId, BTreeMap<u32, Option<String>>> = BTreeMap::new();
    let mut warnings = Vec::new();
    let mut matched_cells = 0;

    for edit in edits {
        let text = grid.cell(edit.row, edit.col).unwrap_or_default();

        if known.get(edit.room_id).is_none() {
            if text.trim().is_empty() {
                continue;
            }
            let address = cell_ref(edit.row, edit.col).unwrap_or_default();
            log::warn!(
                "Skipping cell {} ({:?}): room {} is not in the catalog",
                address,
                text,
                edit.room_id
            );
            warnings.push(ReconcileWarning::UnknownRoomId {
                room_id: edit.room_id,
                row: edit.row,
                col: edit.col,
            });
            continue;
        }

        let occupant = match parse_slot_text(text) {
            SlotState::Free => None,
            SlotState::Occupied(name) if !options.show_names && name == TAKEN_LABEL => {
                Some(edit.person.clone().unwrap_or(name))
            }
            SlotState::Occupied(name) => Some(name),
        };

        matched_cells += 1;
        resolved
            .entry(edit.room_id)
            .or_default()
            .insert(edit.bed_index, occupant);
    }

    let rooms: Vec<Room> = known
        .rooms()
        .iter()
        .map(|room| match resolved.get(&room.id) {
            Some(beds) => Room {
                people: assemble_people(beds),
                ..room.clone()
            },
            None => room.clone(),
        })
        .collect();

    log::info!(
        "Reconciled {} bed cells across {} rooms ({} warnings)",
        matched_cells,
        resolved.len(),
        warnings.len()
    );

    Reconciliation {
        catalog: RoomCatalog::new(rooms).sort(),
        warnings,
        matched_cells,
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
    use crate::layout::render_catalog;
    use crate::types::RoomType;
    use test_case::test_case;

    #[test_case("3. Free", SlotState::Free ; "indexed free")]
    #[test_case("1.", SlotState::Free ; "index only")]
    #[test_case("", SlotState::Free ; "empty")]
    #[test_case("   ", SlotState::Free ; "blank")]
    #[test_case("FREE", SlotState::Free ; "upper case")]
    #[test_case("4.   free bed", SlotState::Free ; "free with suffix")]
    #[test_case("2. John Smith", SlotState::Occupied("John Smith".into()) ; "indexed name")]
    #[test_case("Jane Roe", SlotState::Occupied("Jane Roe".into()) ; "bare name")]
    #[test_case("12 Monkeys", SlotState::Occupied("12 Monkeys".into()) ; "digits without dot")]
    #[test_case("1. Taken", SlotState::Occupied("Taken".into()) ; "anonymous")]
    fn test_parse_slot_text(text: &str, expected: SlotState) {
        assert_eq!(parse_slot_text(text), expected);
    }

    fn catalog() -> RoomCatalog {
        RoomCatalog::new(vec![
            Room {
                id: 1,
                room_type: RoomType::FourBed,
                beds: 4,
                people: vec![Some("A".into()), Some("B".into())],
            },
            Room {
                id: 2,
                room_type: RoomType::FourBed,
                beds: 3,
                people: vec![Some("C".into())],
            },
        ])
    }

    fn grid_from(edits: &[CellEdit]) -> RemoteGrid {
        let mut grid = RemoteGrid::default();
        for e in edits {
            grid.set(e.row, e.col, e.text.clone());
        }
        grid
    }

    #[test]
    fn test_unchanged_grid_roundtrips() {
        let options = RenderOptions::default().with_names();
        let pass = render_catalog(&catalog(), &options);
        let result = reconcile(&grid_from(&pass.edits), &pass.edits, &catalog(), &options);
        assert_eq!(result.catalog, catalog());
        assert!(result.warnings.is_empty());
        assert_eq!(result.matched_cells, 7);
    }

    #[test]
    fn test_anonymous_cells_keep_rendered_occupant() {
        let options = RenderOptions::default();
        let pass = render_catalog(&catalog(), &options);
        let result = reconcile(&grid_from(&pass.edits), &pass.edits, &catalog(), &options);
        assert_eq!(result.catalog, catalog());
    }

    #[test]
    fn test_remote_edits_are_applied() {
        let options = RenderOptions::default().with_names();
        let pass = render_catalog(&catalog(), &options);
        let mut grid = grid_from(&pass.edits);
        // room 1: free bed 1, book bed 3
        let bed1 = &pass.edits[1];
        let bed3 = &pass.edits[3];
        grid.set(bed1.row, bed1.col, "2. Free");
        grid.set(bed3.row, bed3.col, "4. Dora");

        let result = reconcile(&grid, &pass.edits, &catalog(), &options);
        let room = result.catalog.get(1).unwrap();
        assert_eq!(room.people, vec![Some("A".into()), Some("Dora".into())]);
        assert_eq!(room.occupied_count(), 2);
    }

    #[test]
    fn test_freed_middle_bed_keeps_later_occupant_taken() {
        let options = RenderOptions::default().with_names();
        let pass = render_catalog(&catalog(), &options);
        let mut grid = grid_from(&pass.edits);
        // room 1: A leaves bed 0, B stays on bed 1
        let bed0 = &pass.edits[0];
        grid.set(bed0.row, bed0.col, "1. Free");

        let result = reconcile(&grid, &pass.edits, &catalog(), &options);
        assert_eq!(result.catalog.get(1).unwrap().people, vec![Some("B".into())]);

        let again = render_catalog(&result.catalog, &options);
        let room1: Vec<(&str, bool)> = again
            .edits
            .iter()
            .filter(|e| e.room_id == 1)
            .map(|e| (e.text.as_str(), e.taken))
            .collect();
        assert_eq!(
            room1,
            vec![
                ("1. B", true),
                ("2. Free", false),
                ("3. Free", false),
                ("4. Free", false)
            ]
        );
    }

    #[test]
    fn test_trailing_free_beds_are_dropped() {
        let options = RenderOptions::default().with_names();
        let pass = render_catalog(&catalog(), &options);
        let mut grid = grid_from(&pass.edits);
        let bed = &pass.edits[1];
        grid.set(bed.row, bed.col, "2.");

        let result = reconcile(&grid, &pass.edits, &catalog(), &options);
        assert_eq!(result.catalog.get(1).unwrap().people, vec![Some("A".into())]);
    }

    #[test]
    fn test_unknown_room_is_skipped_with_warning() {
        let options = RenderOptions::default().with_names();
        let pass = render_catalog(&catalog(), &options);
        let known = catalog().filter(|r| r.id == 1);
        let result = reconcile(&grid_from(&pass.edits), &pass.edits, &known, &options);

        assert_eq!(result.catalog.len(), 1);
        assert_eq!(result.warnings.len(), 3);
        assert!(result
            .warnings
            .iter()
            .all(|w| matches!(w, ReconcileWarning::UnknownRoomId { room_id: 2, .. })));
    }

    #[test]
    fn test_missing_cells_read_as_free() {
        let options = RenderOptions::default().with_names();
        let pass = render_catalog(&catalog(), &options);
        let result = reconcile(&RemoteGrid::default(), &pass.edits, &catalog(), &options);
        assert!(result.catalog.rooms().iter().all(|r| r.people.is_empty()));
        assert_eq!(result.matched_cells, 7);
    }

    #[test]
    fn test_cleared_room_is_freed() {
        let options = RenderOptions::default().with_names();
        let pass = render_catalog(&catalog(), &options);
        // only room 1 comes back; room 2's cells were cleared and dropped
        let grid = grid_from(&pass.edits[..4]);
        let result = reconcile(&grid, &pass.edits, &catalog(), &options);
        assert_eq!(
            result.catalog.get(1).unwrap().people,
            vec![Some("A".into()), Some("B".into())]
        );
        assert!(result.catalog.get(2).unwrap().people.is_empty());
    }

    #[test]
    fn test_rooms_not_rendered_keep_occupants() {
        let options = RenderOptions::default().with_names();
        let pass = render_catalog(&catalog().filter(|r| r.id == 1), &options);
        let result = reconcile(&grid_from(&pass.edits), &pass.edits, &catalog(), &options);
        assert_eq!(result.catalog, catalog());
    }
}
