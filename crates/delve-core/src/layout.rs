//! Snapshot loading and piece classification
//!
//! Turns a serialized [`Dungeon`](crate::snapshot::Dungeon) back into
//! concrete geometry: one piece per room and one piece per hallway tile.
//! Rooms are rebuilt by forking the RNG from the stored per-room state and
//! replaying the exit draw; hallway tiles are classified by their
//! 4-neighbor connection mask into a piece kind plus a rotation in degrees.

use bitflags::bitflags;
use serde::Serialize;
use strum::Display;
use thiserror::Error;

use crate::geometry::{GridPos, Vec3};
use crate::grid::{Grid, Tile};
use crate::room::{interior_extent, ExitLayout, Room, Side};
use crate::rng::DungeonRng;
use crate::snapshot::{Dungeon, RoomSnapshot};

/// Neighbor probe order; the connection key is `1 << index`
const DIRECTIONS: [GridPos; 4] = [
    GridPos::new(0, 1),
    GridPos::new(1, 0),
    GridPos::new(0, -1),
    GridPos::new(-1, 0),
];

bitflags! {
    /// Which of a hallway tile's 4 neighbors it connects to
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct HallwayNeighbors: u8 {
        const UP = 1 << 0;
        const RIGHT = 1 << 1;
        const DOWN = 1 << 2;
        const LEFT = 1 << 3;
    }
}

/// Hallway piece shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
pub enum HallwayKind {
    Entrance,
    Straight,
    Corner,
    ThreeWay,
    FourWay,
}

/// A hallway piece: shape plus clockwise rotation in degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HallwayPiece {
    pub kind: HallwayKind,
    pub rotation: u16,
}

impl HallwayPiece {
    const fn new(kind: HallwayKind, rotation: u16) -> Self {
        Self { kind, rotation }
    }
}

/// Piece shape and orientation for one connection mask.
///
/// An isolated hallway tile (no connections) produces no piece.
pub fn piece_for(neighbors: HallwayNeighbors) -> Option<HallwayPiece> {
    use HallwayKind::*;

    let piece = match neighbors.bits() {
        0 => return None,
        1 => HallwayPiece::new(Entrance, 180),
        2 => HallwayPiece::new(Entrance, 90),
        3 => HallwayPiece::new(Corner, 90),
        4 => HallwayPiece::new(Entrance, 0),
        5 => HallwayPiece::new(Straight, 0),
        6 => HallwayPiece::new(Corner, 180),
        7 => HallwayPiece::new(ThreeWay, 0),
        8 => HallwayPiece::new(Entrance, 270),
        9 => HallwayPiece::new(Corner, 0),
        10 => HallwayPiece::new(Straight, 90),
        11 => HallwayPiece::new(ThreeWay, 270),
        12 => HallwayPiece::new(Corner, 270),
        13 => HallwayPiece::new(ThreeWay, 180),
        14 => HallwayPiece::new(ThreeWay, 90),
        _ => HallwayPiece::new(FourWay, 0),
    };
    Some(piece)
}

/// Connection mask for the tile at `pos`: a neighbor connects when it is
/// walkable (hallway or room), so entrances open into rooms.
pub fn hallway_neighbors(grid: &Grid, pos: GridPos) -> HallwayNeighbors {
    let mut mask = HallwayNeighbors::empty();
    for (i, dir) in DIRECTIONS.into_iter().enumerate() {
        if grid.get(pos + dir).is_some_and(|t| t.is_walkable()) {
            mask |= HallwayNeighbors::from_bits_truncate(1 << i);
        }
    }
    mask
}

/// One placed geometry element of a loaded dungeon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DungeonPiece {
    Room {
        id: i32,
        position: Vec3,
        size: Vec3,
        exits: Vec<Vec3>,
    },
    Hallway {
        position: Vec3,
        piece: HallwayPiece,
    },
}

/// Ways a snapshot can fail to load
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("tile buffer holds {actual} tiles, grid size {grid_size} needs {expected}")]
    CorruptGrid {
        grid_size: usize,
        expected: usize,
        actual: usize,
    },

    #[error("room {room}: stored exits do not match the replayed layout")]
    LayoutMismatch { room: i32 },
}

/// Rebuild every placeable piece of a serialized dungeon.
///
/// The result is fully determined by the snapshot: rooms replay their exit
/// draw from the stored RNG state (and fail loudly when the stored exit
/// lists disagree), hallway tiles classify by connection mask.
pub fn load_dungeon(dungeon: &Dungeon, tile_size: Vec3) -> Result<Vec<DungeonPiece>, LoadError> {
    let grid = dungeon.grid().ok_or(LoadError::CorruptGrid {
        grid_size: dungeon.grid_size,
        expected: dungeon.grid_size * dungeon.grid_size,
        actual: dungeon.tiles.len(),
    })?;

    let mut pieces = Vec::new();

    for snap in &dungeon.rooms {
        let room = rebuild_room(snap, tile_size)?;
        pieces.push(DungeonPiece::Room {
            id: snap.id,
            position: room.position,
            size: room.size,
            exits: room.exits.clone(),
        });
    }

    for y in 0..grid.size() as i32 {
        for x in 0..grid.size() as i32 {
            let pos = GridPos::new(x, y);
            if grid.get(pos) != Some(Tile::Hallway) {
                continue;
            }
            let Some(piece) = piece_for(hallway_neighbors(&grid, pos)) else {
                continue;
            };
            pieces.push(DungeonPiece::Hallway {
                position: Vec3::new(x as f32 * tile_size.x, 0.0, y as f32 * tile_size.z),
                piece,
            });
        }
    }

    Ok(pieces)
}

/// Fork the RNG at the stored state and replay the room's exit draw,
/// verifying the result against the stored per-side lists.
fn rebuild_room(snap: &RoomSnapshot, tile_size: Vec3) -> Result<Room, LoadError> {
    let grid_pos = snap.grid_pos(tile_size);
    let extent = snap.grid_extent(tile_size);

    let mut rng = DungeonRng::restore(snap.rng_state);
    let layout = ExitLayout::generate(
        &mut rng,
        interior_extent(extent),
        snap.number_of_exits.max(0) as usize,
    );

    let matches = layout.on_side(Side::Left) == snap.left_exits
        && layout.on_side(Side::Right) == snap.right_exits
        && layout.on_side(Side::Top) == snap.top_exits
        && layout.on_side(Side::Bottom) == snap.bottom_exits;
    if !matches {
        return Err(LoadError::LayoutMismatch { room: snap.id });
    }

    Ok(Room::with_layout(
        grid_pos,
        extent,
        layout,
        tile_size,
        snap.rng_state,
        snap.id.max(0) as usize,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DungeonProperties;
    use crate::generator::DungeonGenerator;

    fn mark_line(grid: &mut Grid, from: GridPos, to: GridPos) {
        let mut pos = from;
        grid.mark_hallway_tile(pos);
        while pos != to {
            let step = GridPos::new((to.x - pos.x).signum(), (to.y - pos.y).signum());
            pos = pos + step;
            grid.mark_hallway_tile(pos);
        }
    }

    #[test]
    fn straight_corridor_classifies_as_straight_with_entrance_ends() {
        let mut grid = Grid::new(15);
        mark_line(&mut grid, GridPos::new(7, 3), GridPos::new(7, 10));

        let middle = piece_for(hallway_neighbors(&grid, GridPos::new(7, 6))).unwrap();
        assert_eq!(middle, HallwayPiece::new(HallwayKind::Straight, 0));

        // Bottom end only connects upward
        let end = piece_for(hallway_neighbors(&grid, GridPos::new(7, 3))).unwrap();
        assert_eq!(end.kind, HallwayKind::Entrance);
    }

    #[test]
    fn bend_classifies_as_corner() {
        let mut grid = Grid::new(15);
        mark_line(&mut grid, GridPos::new(3, 3), GridPos::new(3, 7));
        mark_line(&mut grid, GridPos::new(3, 7), GridPos::new(8, 7));

        // Connects down and right
        let piece = piece_for(hallway_neighbors(&grid, GridPos::new(3, 7))).unwrap();
        assert_eq!(piece, HallwayPiece::new(HallwayKind::Corner, 180));
    }

    #[test]
    fn crossing_classifies_as_four_way() {
        let mut grid = Grid::new(15);
        mark_line(&mut grid, GridPos::new(7, 3), GridPos::new(7, 11));
        mark_line(&mut grid, GridPos::new(3, 7), GridPos::new(11, 7));

        let piece = piece_for(hallway_neighbors(&grid, GridPos::new(7, 7))).unwrap();
        assert_eq!(piece, HallwayPiece::new(HallwayKind::FourWay, 0));
    }

    #[test]
    fn isolated_hallway_tile_yields_no_piece() {
        let mut grid = Grid::new(15);
        grid.mark_hallway_tile(GridPos::new(7, 7));
        assert_eq!(piece_for(hallway_neighbors(&grid, GridPos::new(7, 7))), None);
    }

    #[test]
    fn generated_dungeon_loads_without_error() {
        let config = DungeonProperties::default();
        let tile_size = config.tile_size;
        let dungeon = DungeonGenerator::new(42, config).unwrap().generate().unwrap();

        let pieces = load_dungeon(&dungeon, tile_size).unwrap();

        let rooms = pieces
            .iter()
            .filter(|p| matches!(p, DungeonPiece::Room { .. }))
            .count();
        let hallways = pieces
            .iter()
            .filter(|p| matches!(p, DungeonPiece::Hallway { .. }))
            .count();
        assert_eq!(rooms, dungeon.rooms.len());
        assert!(hallways > 0, "expected hallway pieces");
    }

    #[test]
    fn tampered_exit_lists_are_detected() {
        let config = DungeonProperties::default();
        let tile_size = config.tile_size;
        let mut dungeon = DungeonGenerator::new(7, config).unwrap().generate().unwrap();

        let snap = &mut dungeon.rooms[0];
        snap.left_exits = vec![99];
        snap.right_exits.clear();
        snap.top_exits.clear();
        snap.bottom_exits.clear();

        let err = load_dungeon(&dungeon, tile_size).unwrap_err();
        assert_eq!(err, LoadError::LayoutMismatch { room: dungeon.rooms[0].id });
    }

    #[test]
    fn truncated_tile_buffer_is_rejected() {
        let dungeon = Dungeon {
            seed: 0,
            grid_size: 10,
            tiles: vec![Tile::Empty; 40],
            rooms: Vec::new(),
        };
        let err = load_dungeon(&dungeon, Vec3::new(1.0, 1.0, 1.0)).unwrap_err();
        assert!(matches!(err, LoadError::CorruptGrid { .. }));
    }
}
