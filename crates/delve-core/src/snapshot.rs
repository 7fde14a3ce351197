//! Serializable dungeon snapshot
//!
//! The persisted form of a generated dungeon: seed, flattened tile grid and
//! room list. A loader reconstructs the full layout from exactly this value
//! with no randomness beyond the RNG states stored per room.

use serde::{Deserialize, Serialize};

use crate::geometry::{GridPos, Vec3};
use crate::grid::{Grid, Tile};
use crate::rng::RngState;
use crate::room::{Room, Side};

/// Persisted form of one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub position: Vec3,
    pub size: Vec3,
    pub number_of_exits: i32,
    pub id: i32,
    /// RNG stream position captured before the room's exit draw; forking
    /// from here reproduces the room's layout and content
    pub rng_state: RngState,
    pub left_exits: Vec<i32>,
    pub right_exits: Vec<i32>,
    pub top_exits: Vec<i32>,
    pub bottom_exits: Vec<i32>,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            position: room.position,
            size: room.size,
            number_of_exits: room.number_of_exits as i32,
            id: room.id as i32,
            rng_state: room.rng_state,
            left_exits: room.exit_layout.on_side(Side::Left),
            right_exits: room.exit_layout.on_side(Side::Right),
            top_exits: room.exit_layout.on_side(Side::Top),
            bottom_exits: room.exit_layout.on_side(Side::Bottom),
        }
    }
}

impl RoomSnapshot {
    /// Center tile on the grid
    pub fn grid_pos(&self, tile_size: Vec3) -> GridPos {
        GridPos::from_world(self.position, tile_size)
    }

    /// Footprint in tiles
    pub fn grid_extent(&self, tile_size: Vec3) -> (i32, i32) {
        (
            (self.size.x / tile_size.x).round() as i32,
            (self.size.z / tile_size.z).round() as i32,
        )
    }
}

/// A complete serialized dungeon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dungeon {
    pub seed: u64,
    pub grid_size: usize,
    /// Row-major tile states, `tiles[x + y * grid_size]`
    pub tiles: Vec<Tile>,
    pub rooms: Vec<RoomSnapshot>,
}

impl Dungeon {
    pub fn new(seed: u64, grid: &Grid, rooms: &[Room]) -> Self {
        Self {
            seed,
            grid_size: grid.size(),
            tiles: grid.tiles().to_vec(),
            rooms: rooms.iter().map(RoomSnapshot::from).collect(),
        }
    }

    /// Rebuild the 2D grid from the flat buffer.
    ///
    /// Returns None if the buffer length does not match `grid_size`.
    pub fn grid(&self) -> Option<Grid> {
        Grid::from_tiles(self.grid_size, self.tiles.clone())
    }
}
