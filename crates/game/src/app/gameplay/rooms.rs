use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

pub(crate) const FIRST_ROOM: u32 = 1;

#[derive(Debug, Error)]
pub(crate) enum RoomTableError {
    #[error("failed to read room table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse room table at {location}: {source}")]
    Parse {
        location: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("room key '{key}' is not a positive room number")]
    InvalidKey { key: String },
    #[error("room table has no room 1")]
    MissingFirstRoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub(crate) struct GridCell {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

/// A role that may be absent from a room. The cell is only meaningful when
/// `exists` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct OptionalPlacement {
    pub(crate) exists: bool,
    #[serde(default)]
    pub(crate) x: i32,
    #[serde(default)]
    pub(crate) y: i32,
}

impl OptionalPlacement {
    pub(crate) fn cell(&self) -> Option<GridCell> {
        self.exists.then_some(GridCell {
            x: self.x,
            y: self.y,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum GoalKind {
    #[serde(alias = "atome")]
    Advance,
    Escape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub(crate) struct GoalPlacement {
    #[serde(rename = "type")]
    pub(crate) kind: GoalKind,
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl GoalPlacement {
    pub(crate) fn cell(&self) -> GridCell {
        GridCell {
            x: self.x,
            y: self.y,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct RoomDefinition {
    #[serde(alias = "pubie")]
    pub(crate) player: GridCell,
    #[serde(alias = "lugie", default)]
    pub(crate) rival: OptionalPlacement,
    #[serde(alias = "back", default)]
    pub(crate) backdrop: OptionalPlacement,
    #[serde(alias = "finish")]
    pub(crate) goal: GoalPlacement,
    #[serde(alias = "dynomete", default)]
    pub(crate) hazards: Vec<GridCell>,
}

/// Every room keyed by its 1-based number. Room 1 always exists, so any
/// index resolves to some room.
#[derive(Debug, Clone)]
pub(crate) struct RoomTable {
    first: RoomDefinition,
    others: BTreeMap<u32, RoomDefinition>,
}

impl RoomTable {
    pub(crate) fn load(path: &Path) -> Result<Self, RoomTableError> {
        let raw = fs::read_to_string(path).map_err(|source| RoomTableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_json(&raw)
    }

    pub(crate) fn parse_json(raw: &str) -> Result<Self, RoomTableError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let keyed: BTreeMap<String, RoomDefinition> =
            serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
                let path = error.path().to_string();
                let location = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                RoomTableError::Parse {
                    location,
                    source: error.into_inner(),
                }
            })?;

        let mut others = BTreeMap::new();
        for (key, room) in keyed {
            let number = parse_room_key(&key)?;
            others.insert(number, room);
        }
        let first = others
            .remove(&FIRST_ROOM)
            .ok_or(RoomTableError::MissingFirstRoom)?;
        Ok(Self { first, others })
    }

    pub(crate) fn get(&self, index: u32) -> Option<&RoomDefinition> {
        if index == FIRST_ROOM {
            Some(&self.first)
        } else {
            self.others.get(&index)
        }
    }

    /// Looks `index` up, falling back to room 1 when it is missing. Returns the
    /// index actually used.
    pub(crate) fn resolve(&self, index: u32) -> (u32, &RoomDefinition) {
        match self.get(index) {
            Some(room) => (index, room),
            None => (FIRST_ROOM, &self.first),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.others.len() + 1
    }
}

fn parse_room_key(key: &str) -> Result<u32, RoomTableError> {
    match key.trim().parse::<u32>() {
        Ok(number) if number >= FIRST_ROOM => Ok(number),
        _ => Err(RoomTableError::InvalidKey {
            key: key.to_string(),
        }),
    }
}
