use serde::{Deserialize, Serialize};

use crate::error::{BookgridError, Result};

/// Room identifier as it appears in the booking dataset.
pub type RoomId = u32;

/// Text shown in place of an occupant name when names are hidden.
///
/// Reading an anonymized sheet back yields this literal as the occupant, which
/// is how an "unknown but present" occupant is represented in a catalog.
pub const TAKEN_LABEL: &str = "Taken";

/// Text shown for an unoccupied bed.
pub const FREE_LABEL: &str = "Free";

/// The four room categories of the event.
///
/// Variant order is the sort order: it matches the ordering of the dataset
/// codes (`"3" < "4" < "m2" < "m5"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RoomType {
    #[serde(rename = "3")]
    Wheelchair,
    #[serde(rename = "4")]
    FourBed,
    #[serde(rename = "m2")]
    Duplex2,
    #[serde(rename = "m5")]
    Duplex5,
}

impl RoomType {
    /// Resolve a dataset code into a room type.
    ///
    /// # Errors
    /// Returns [`BookgridError::UnknownRoomType`] for any code other than
    /// `3`, `4`, `m2` or `m5`.
    pub fn from_code(code: &str) -> Result<Self> {
        match code {
            "3" => Ok(Self::Wheelchair),
            "4" => Ok(Self::FourBed),
            "m2" => Ok(Self::Duplex2),
            "m5" => Ok(Self::Duplex5),
            other => Err(BookgridError::UnknownRoomType(other.to_string())),
        }
    }

    /// The dataset code for this type.
    pub fn code(self) -> &'static str {
        match self {
            Self::Wheelchair => "3",
            Self::FourBed => "4",
            Self::Duplex2 => "m2",
            Self::Duplex5 => "m5",
        }
    }

    /// Human readable label used for group title rows.
    pub fn label(self) -> &'static str {
        match self {
            Self::Wheelchair => "Wheelchair accessible",
            Self::FourBed => "4-bed",
            Self::Duplex2 => "2-bed duplex",
            Self::Duplex5 => "5-bed duplex",
        }
    }

    /// Duplex rooms are reserved for lecturers and hidden by default.
    pub fn is_lector(self) -> bool {
        matches!(self, Self::Duplex2 | Self::Duplex5)
    }
}

/// A bookable room and its occupants.
///
/// `people[i]` is the occupant of bed `i`. Reconciled lists hold occupied
/// beds only; a `None` can still come from a hand-written dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub beds: u32,
    #[serde(default)]
    pub people: Vec<Option<String>>,
}

impl Room {
    /// Number of leading beds considered taken.
    ///
    /// Guarded against lists holding explicit `None` placeholders: the count is
    /// the smaller of the list length and the number of named entries.
    pub fn occupied_count(&self) -> usize {
        let named = self.people.iter().filter(|p| p.is_some()).count();
        named.min(self.people.len())
    }

    /// Sort key used by every ordering in the crate.
    pub fn sort_key(&self) -> (RoomType, RoomId) {
        (self.room_type, self.id)
    }
}
