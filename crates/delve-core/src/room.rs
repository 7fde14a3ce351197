//! Room entities and exit layout
//!
//! A room is a rectangular footprint on the grid plus a set of exits on its
//! perimeter. Exits are drawn deterministically from the generation RNG;
//! the stream position is captured right before the draw so a loader can
//! fork the RNG later and reproduce the identical layout (and, downstream,
//! identical room content).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::geometry::{GridPos, Vec3};
use crate::rng::{DungeonRng, RngState};

/// Which side of the room's perimeter an exit slot sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Exit slots in draw order: (side, slot index along that side)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExitLayout {
    pub slots: Vec<(Side, i32)>,
}

impl ExitLayout {
    /// Draw `count` distinct exit slots for a room with the given interior
    /// extent (tiles), by rejection sampling over the non-corner perimeter
    /// slots. Corner cells never carry exits.
    ///
    /// `count` is clamped to the perimeter capacity `2w + 2d - 8`.
    pub fn generate(rng: &mut DungeonRng, interior: (i32, i32), count: usize) -> Self {
        let (iw, ih) = interior;
        let vertical = (ih - 2).max(0);
        let horizontal = (iw - 2).max(0);
        let capacity = (2 * vertical + 2 * horizontal) as usize;
        let count = count.min(capacity);

        let mut taken = vec![false; capacity];
        let mut slots = Vec::with_capacity(count);

        while slots.len() < count {
            let raw = rng.index(capacity);
            if taken[raw] {
                continue;
            }
            taken[raw] = true;

            let raw = raw as i32;
            let slot = if raw < vertical {
                (Side::Left, raw)
            } else if raw < 2 * vertical {
                (Side::Right, raw - vertical)
            } else if raw < 2 * vertical + horizontal {
                (Side::Top, raw - 2 * vertical)
            } else {
                (Side::Bottom, raw - 2 * vertical - horizontal)
            };
            slots.push(slot);
        }

        Self { slots }
    }

    /// Slot indices on one side, in draw order
    pub fn on_side(&self, side: Side) -> Vec<i32> {
        self.slots
            .iter()
            .filter(|(s, _)| *s == side)
            .map(|&(_, i)| i)
            .collect()
    }
}

/// A placed room
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: usize,
    /// Center in world coordinates
    pub position: Vec3,
    /// Footprint in world coordinates (y unused)
    pub size: Vec3,
    /// Center tile on the grid
    pub grid_pos: GridPos,
    /// Footprint in tiles (as configured, before interior rounding)
    pub grid_extent: (i32, i32),
    pub number_of_exits: usize,
    pub exit_layout: ExitLayout,
    /// Exit positions in world coordinates, in draw order
    pub exits: Vec<Vec3>,
    /// Exits consumed by hallway connections
    pub exits_used: usize,
    /// RNG stream position captured just before the exit draw
    pub rng_state: RngState,
    /// Stack of indices into `exits` not yet connected
    available: Vec<usize>,
}

impl Room {
    /// Create a room at a committed grid position, drawing its exit layout
    /// from the generation RNG.
    pub fn generate(
        rng: &mut DungeonRng,
        grid_pos: GridPos,
        grid_extent: (i32, i32),
        number_of_exits: usize,
        tile_size: Vec3,
        id: usize,
    ) -> Self {
        let rng_state = rng.state();
        let layout = ExitLayout::generate(rng, interior_extent(grid_extent), number_of_exits);
        Self::with_layout(grid_pos, grid_extent, layout, tile_size, rng_state, id)
    }

    /// Rebuild a room from an already-known layout (loader path)
    pub fn with_layout(
        grid_pos: GridPos,
        grid_extent: (i32, i32),
        exit_layout: ExitLayout,
        tile_size: Vec3,
        rng_state: RngState,
        id: usize,
    ) -> Self {
        let position = Vec3::new(
            grid_pos.x as f32 * tile_size.x,
            0.0,
            grid_pos.y as f32 * tile_size.z,
        );
        let size = Vec3::new(
            grid_extent.0 as f32 * tile_size.x,
            0.0,
            grid_extent.1 as f32 * tile_size.z,
        );

        let exits: Vec<Vec3> = exit_layout
            .slots
            .iter()
            .map(|&slot| {
                let tile = exit_tile(grid_pos, grid_extent, slot);
                Vec3::new(tile.x as f32 * tile_size.x, 0.0, tile.y as f32 * tile_size.z)
            })
            .collect();

        let number_of_exits = exits.len();
        let available = (0..number_of_exits).collect();

        Self {
            id,
            position,
            size,
            grid_pos,
            grid_extent,
            number_of_exits,
            exit_layout,
            exits,
            exits_used: 0,
            rng_state,
            available,
        }
    }

    /// Pop the next unused exit position
    pub fn take_available_exit(&mut self) -> Option<Vec3> {
        self.available.pop().map(|i| self.exits[i])
    }

    /// Number of exits this room can still accept
    pub fn has_spare_exits(&self) -> bool {
        self.exits_used < self.number_of_exits
    }
}

/// Interior extent in tiles: the cells actually stamped by placement.
///
/// Placement stamps columns `-w/2 .. w/2` (integer division), so odd
/// configured widths produce an even interior one tile narrower.
pub fn interior_extent(grid_extent: (i32, i32)) -> (i32, i32) {
    let (w, d) = grid_extent;
    (w / 2 + w / 2, d / 2 + d / 2)
}

/// Tile coordinate of an exit slot on the interior perimeter
pub fn exit_tile(center: GridPos, grid_extent: (i32, i32), (side, slot): (Side, i32)) -> GridPos {
    let (w, d) = grid_extent;
    let x_min = center.x - w / 2;
    let x_max = center.x + w / 2 - 1;
    let y_min = center.y - d / 2;
    let y_max = center.y + d / 2 - 1;

    match side {
        Side::Left => GridPos::new(x_min, y_min + 1 + slot),
        Side::Right => GridPos::new(x_max, y_min + 1 + slot),
        Side::Top => GridPos::new(x_min + 1 + slot, y_max),
        Side::Bottom => GridPos::new(x_min + 1 + slot, y_min),
    }
}
