//! Tile grid
//!
//! A square 2D array of tile states, mutated by room placement and hallway
//! carving. Stored as a flat row-major buffer (`x + y * size`), which is
//! also the serialized layout. The grid can grow (never shrink) when
//! placement runs out of space.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geometry::GridPos;

/// State of one grid cell.
///
/// Cells only move forward: Empty -> Room/RoomSpacing during placement,
/// Empty/Room -> Hallway/HallwayAndRoom during carving. Nothing reverts.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum Tile {
    #[default]
    Empty = 0,
    MainRoom = 1,
    Room = 2,
    Hallway = 3,
    HallwayAndRoom = 4,
    RoomSpacing = 5,
    HallwaySpacing = 6,
    Invalid = 7,
}

impl Tile {
    /// Check if this cell belongs to a room interior
    pub const fn is_room(&self) -> bool {
        matches!(self, Tile::Room | Tile::MainRoom | Tile::HallwayAndRoom)
    }

    /// Check if this cell carries a hallway
    pub const fn is_hallway(&self) -> bool {
        matches!(self, Tile::Hallway | Tile::HallwayAndRoom)
    }

    /// Check if this cell is walkable in the finished layout
    pub const fn is_walkable(&self) -> bool {
        self.is_room() || self.is_hallway()
    }
}

/// The dungeon tile grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    /// Create a grid of `size * size` empty cells
    pub fn new(size: usize) -> Self {
        Self {
            size,
            tiles: vec![Tile::Empty; size * size],
        }
    }

    /// Rebuild a grid from a flat row-major tile buffer.
    ///
    /// Returns None if the buffer length does not match `size * size`.
    pub fn from_tiles(size: usize, tiles: Vec<Tile>) -> Option<Self> {
        if tiles.len() != size * size {
            return None;
        }
        Some(Self { size, tiles })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// The flat row-major tile buffer (`x + y * size`)
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.size && (pos.y as usize) < self.size
    }

    /// Tile at a position, None when out of bounds
    pub fn get(&self, pos: GridPos) -> Option<Tile> {
        if !self.in_bounds(pos) {
            return None;
        }
        Some(self.tiles[pos.x as usize + pos.y as usize * self.size])
    }

    fn set(&mut self, pos: GridPos, tile: Tile) {
        debug_assert!(self.in_bounds(pos));
        self.tiles[pos.x as usize + pos.y as usize * self.size] = tile;
    }

    /// Grow the grid by `amount` in both dimensions.
    ///
    /// Existing cells keep their coordinates (old contents land in the
    /// origin corner); new cells start empty.
    pub fn extend(&mut self, amount: usize) {
        let old_size = self.size;
        let new_size = old_size + amount;
        let mut tiles = vec![Tile::Empty; new_size * new_size];

        for y in 0..old_size {
            let src = y * old_size;
            let dst = y * new_size;
            tiles[dst..dst + old_size].copy_from_slice(&self.tiles[src..src + old_size]);
        }

        self.size = new_size;
        self.tiles = tiles;
    }

    /// Try to stamp a room footprint centered at `center`.
    ///
    /// The footprint is the room interior plus a `spacing` ring, and it must
    /// lie fully in bounds over empty cells only. Writes go to a scratch
    /// buffer that is committed as a whole on success, so a failed attempt
    /// leaves the grid untouched.
    pub fn try_place_room(&mut self, center: GridPos, size: (i32, i32), spacing: i32) -> bool {
        let (w, d) = size;
        let mut scratch = self.tiles.clone();

        for j in -(w + spacing) / 2..(w + spacing) / 2 {
            for k in -(d + spacing) / 2..(d + spacing) / 2 {
                let pos = GridPos::new(center.x + j, center.y + k);
                if !self.in_bounds(pos) {
                    return false;
                }

                let current = self.tiles[pos.x as usize + pos.y as usize * self.size];
                if current != Tile::Empty {
                    return false;
                }

                let in_ring = j < -w / 2 || j >= w / 2 || k < -d / 2 || k >= d / 2;
                scratch[pos.x as usize + pos.y as usize * self.size] = if in_ring {
                    Tile::RoomSpacing
                } else {
                    Tile::Room
                };
            }
        }

        self.tiles = scratch;
        true
    }

    /// Stamp one hallway tile and buffer its surroundings.
    ///
    /// A room cell becomes HallwayAndRoom, everything else becomes Hallway.
    /// Empty 8-connected neighbors become HallwaySpacing so later room
    /// placements keep clear of the path.
    pub fn mark_hallway_tile(&mut self, pos: GridPos) {
        if !self.in_bounds(pos) {
            return;
        }

        let tile = if self.get(pos) == Some(Tile::Room) {
            Tile::HallwayAndRoom
        } else {
            Tile::Hallway
        };
        self.set(pos, tile);

        for i in -1..=1 {
            for j in -1..=1 {
                if i == 0 && j == 0 {
                    continue;
                }
                let neighbor = GridPos::new(pos.x + i, pos.y + j);
                if self.get(neighbor) == Some(Tile::Empty) {
                    self.set(neighbor, Tile::HallwaySpacing);
                }
            }
        }
    }
}
