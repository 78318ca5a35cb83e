//! In-memory room catalog.
//!
//! Rooms are loaded once from the JSON dataset, filtered and sorted by
//! `(type, id)`, and split into type groups for rendering. Reconciliation
//! produces a fresh catalog that replaces the loaded one wholesale.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::types::{Room, RoomId, RoomType};

/// Ordered collection of rooms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoomCatalog {
    rooms: Vec<Room>,
}

/// Rooms of one type, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomGroup {
    pub room_type: RoomType,
    pub rooms: Vec<Room>,
}

impl RoomGroup {
    /// Height in bed rows reserved for every room block of the group.
    pub fn room_size(&self) -> u32 {
        self.rooms.iter().map(|r| r.beds).max().unwrap_or(0)
    }
}

/// Dataset record as written on disk; the type code is validated on conversion.
#[derive(Deserialize)]
struct RawRoom {
    id: RoomId,
    #[serde(rename = "type")]
    room_type: String,
    beds: u32,
    #[serde(default)]
    people: Vec<Option<String>>,
}

impl TryFrom<RawRoom> for Room {
    type Error = crate::error::BookgridError;

    fn try_from(raw: RawRoom) -> Result<Self> {
        Ok(Room {
            id: raw.id,
            room_type: RoomType::from_code(&raw.room_type)?,
            beds: raw.beds,
            people: raw.people,
        })
    }
}

impl RoomCatalog {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self { rooms }
    }

    /// Load the initial booking dataset from a JSON file.
    ///
    /// # Errors
    /// Fails on I/O or JSON errors, and with
    /// [`BookgridError::UnknownRoomType`](crate::error::BookgridError::UnknownRoomType)
    /// when a record carries an unknown type code.
    pub fn load_initial(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        let catalog = Self::from_json(&data)?;
        log::debug!("Loaded {} rooms from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Parse a dataset from JSON bytes (an array of room records).
    ///
    /// # Errors
    /// See [`RoomCatalog::load_initial`].
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let raw: Vec<RawRoom> = serde_json::from_slice(data)?;
        let rooms = raw
            .into_iter()
            .map(Room::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rooms })
    }

    /// Write the catalog as a pretty-printed JSON array.
    ///
    /// # Errors
    /// Fails on I/O or serialization errors.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.rooms)?;
        fs::write(path, json)?;
        log::info!("Wrote {} rooms to {}", self.len(), path.display());
        Ok(())
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn into_rooms(self) -> Vec<Room> {
        self.rooms
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn get(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }

    /// Keep only rooms matching `predicate`, preserving order.
    #[must_use]
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&Room) -> bool,
    {
        Self {
            rooms: self.rooms.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// Drop lector rooms unless `show_lectors` is set.
    #[must_use]
    pub fn filter_lectors(&self, show_lectors: bool) -> Self {
        self.filter(|r| show_lectors || !r.room_type.is_lector())
    }

    /// Stable ascending sort by `(type, id)`.
    #[must_use]
    pub fn sort(mut self) -> Self {
        self.rooms.sort_by_key(Room::sort_key);
        self
    }

    /// Split into runs of equal type.
    ///
    /// This is a single linear pass over adjacent rooms: an unsorted catalog
    /// yields several groups for the same type. Sort first.
    pub fn group_by_type(&self) -> Vec<RoomGroup> {
        let mut groups: Vec<RoomGroup> = Vec::new();
        for room in &self.rooms {
            match groups.last_mut() {
                Some(group) if group.room_type == room.room_type => {
                    group.rooms.push(room.clone());
                }
                _ => groups.push(RoomGroup {
                    room_type: room.room_type,
                    rooms: vec![room.clone()],
                }),
            }
        }
        groups
    }
}

impl From<Vec<Room>> for RoomCatalog {
    fn from(rooms: Vec<Room>) -> Self {
        Self::new(rooms)
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
    use crate::error::BookgridError;

    const DATASET: &str = r#"[
        {"id": 7, "type": "4", "beds": 4, "people": ["A", "B"]},
        {"id": 2, "type": "m2", "beds": 2, "people": []},
        {"id": 3, "type": "4", "beds": 3, "people": ["C"]},
        {"id": 1, "type": "3", "beds": 2}
    ]"#;

    #[test]
    fn test_from_json() {
        let catalog = RoomCatalog::from_json(DATASET.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(catalog.get(1).unwrap().room_type, RoomType::Wheelchair);
        assert!(catalog.get(1).unwrap().people.is_empty());
    }

    #[test]
    fn test_unknown_type_code_fails_load() {
        let err = RoomCatalog::from_json(br#"[{"id": 1, "type": "x", "beds": 1}]"#).unwrap_err();
        assert!(matches!(err, BookgridError::UnknownRoomType(ref c) if c == "x"));
    }

    #[test]
    fn test_sort_by_type_then_id() {
        let catalog = RoomCatalog::from_json(DATASET.as_bytes()).unwrap().sort();
        let ids: Vec<RoomId> = catalog.rooms().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 7, 2]);
    }

    #[test]
    fn test_filter_lectors() {
        let catalog = RoomCatalog::from_json(DATASET.as_bytes()).unwrap();
        assert_eq!(catalog.filter_lectors(false).len(), 3);
        assert_eq!(catalog.filter_lectors(true).len(), 4);
    }

    #[test]
    fn test_group_by_type_on_sorted_catalog() {
        let catalog = RoomCatalog::from_json(DATASET.as_bytes()).unwrap().sort();
        let groups = catalog.group_by_type();
        let types: Vec<RoomType> = groups.iter().map(|g| g.room_type).collect();
        assert_eq!(
            types,
            vec![RoomType::Wheelchair, RoomType::FourBed, RoomType::Duplex2]
        );
        assert_eq!(groups[1].room_size(), 4);
    }

    #[test]
    fn test_group_by_type_is_adjacent_only() {
        let catalog = RoomCatalog::from_json(DATASET.as_bytes()).unwrap();
        // 4, m2, 4, 3: the two 4-bed rooms are not adjacent
        assert_eq!(catalog.group_by_type().len(), 4);
    }

    #[test]
    fn test_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.json");
        let catalog = RoomCatalog::from_json(DATASET.as_bytes()).unwrap().sort();
        catalog.save(&path).unwrap();
        assert_eq!(RoomCatalog::load_initial(&path).unwrap(), catalog);
    }
}
