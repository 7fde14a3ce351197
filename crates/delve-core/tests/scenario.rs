//! End-to-end generation scenarios: full seeded passes checked for
//! connectivity, determinism and snapshot fidelity.

use std::collections::{HashSet, VecDeque};

use delve_core::geometry::GridPos;
use delve_core::grid::Grid;
use delve_core::{load_dungeon, Dungeon, DungeonGenerator, DungeonPiece, DungeonProperties};

fn scenario_config() -> DungeonProperties {
    DungeonProperties {
        grid_size: 50,
        number_of_rooms: (4, 6),
        room_size: (5, 9),
        number_of_exits: (1, 3),
        loop_probability: 0.2,
        ..Default::default()
    }
}

fn generate(seed: u64) -> Dungeon {
    DungeonGenerator::new(seed, scenario_config())
        .unwrap()
        .generate()
        .unwrap()
}

/// Flood fill over walkable tiles, 4-connected
fn reachable_from(grid: &Grid, start: GridPos) -> HashSet<GridPos> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(start);
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        for dir in [
            GridPos::new(0, 1),
            GridPos::new(1, 0),
            GridPos::new(0, -1),
            GridPos::new(-1, 0),
        ] {
            let next = pos + dir;
            if seen.contains(&next) {
                continue;
            }
            if grid.get(next).is_some_and(|t| t.is_walkable()) {
                seen.insert(next);
                queue.push_back(next);
            }
        }
    }
    seen
}

#[test]
fn every_room_is_reachable_from_every_other() {
    for seed in [42, 7, 1234, 99999] {
        let dungeon = generate(seed);
        let grid = dungeon.grid().expect("tile buffer matches grid size");
        let tile_size = scenario_config().tile_size;

        let centers: Vec<GridPos> = dungeon
            .rooms
            .iter()
            .map(|r| r.grid_pos(tile_size))
            .collect();
        assert!(centers.len() >= 4, "seed {}: expected at least 4 rooms", seed);

        let reached = reachable_from(&grid, centers[0]);
        for (i, center) in centers.iter().enumerate() {
            assert!(
                reached.contains(center),
                "seed {}: room {} at {:?} is disconnected",
                seed,
                i,
                center
            );
        }
    }
}

#[test]
fn generation_is_reproducible_across_runs() {
    let a = generate(42);
    let b = generate(42);
    assert_eq!(a, b);

    // The snapshot survives serialization byte-for-byte
    let json = serde_json::to_string(&a).unwrap();
    let back: Dungeon = serde_json::from_str(&json).unwrap();
    assert_eq!(a, back);
}

#[test]
fn loaded_pieces_cover_all_rooms_and_hallway_tiles() {
    let dungeon = generate(42);
    let tile_size = scenario_config().tile_size;
    let pieces = load_dungeon(&dungeon, tile_size).unwrap();

    let room_pieces = pieces
        .iter()
        .filter(|p| matches!(p, DungeonPiece::Room { .. }))
        .count();
    assert_eq!(room_pieces, dungeon.rooms.len());

    // Loading is deterministic too
    let again = load_dungeon(&dungeon, tile_size).unwrap();
    assert_eq!(pieces, again);
}

#[test]
fn grid_growth_is_recorded_in_the_snapshot() {
    // A cramped initial grid forces extensions; the stored grid size must
    // match the tile buffer that comes with it
    let config = DungeonProperties {
        grid_size: 30,
        number_of_rooms: (6, 6),
        room_size: (7, 9),
        ..Default::default()
    };
    let dungeon = DungeonGenerator::new(3, config).unwrap().generate().unwrap();

    assert_eq!(dungeon.tiles.len(), dungeon.grid_size * dungeon.grid_size);
    assert!(dungeon.grid().is_some());
}
