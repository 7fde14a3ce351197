//! Dungeon assembly
//!
//! One deterministic generation pass from a seed: place rooms with
//! retry/extend, triangulate their centers, span them with an MST, repair
//! rooms whose tree degree exceeds their exit capacity, add probabilistic
//! loop edges, carve a weighted A* hallway per edge, and cap leftover exits
//! with terminal rooms. All randomness flows through one linear RNG stream;
//! the order of draws below is load-bearing for seed reproducibility.

use tracing::debug;

use crate::config::DungeonProperties;
use crate::error::GenerationError;
use crate::geometry::{GridPos, Vec2};
use crate::grid::Grid;
use crate::mst::{minimum_spanning_tree, EdgeList};
use crate::pathfinder::{reconstruct_path, PathFinder};
use crate::rng::DungeonRng;
use crate::room::Room;
use crate::snapshot::Dungeon;
use crate::triangulation::{AdjacencyMatrix, Delaunay};

/// Tiles kept clear between a room center draw and the grid border
const PLACEMENT_MARGIN: i32 = 10;

/// A single dungeon generation pass
pub struct DungeonGenerator {
    seed: u64,
    config: DungeonProperties,
    rng: DungeonRng,
    grid: Grid,
    rooms: Vec<Room>,
    edges: EdgeList,
}

impl DungeonGenerator {
    pub fn new(seed: u64, config: DungeonProperties) -> Result<Self, GenerationError> {
        config.validate()?;
        let grid = Grid::new(config.grid_size);
        Ok(Self {
            seed,
            rng: DungeonRng::new(seed),
            grid,
            rooms: Vec::new(),
            edges: Vec::new(),
            config,
        })
    }

    /// Run the pass and return the serializable dungeon
    pub fn generate(mut self) -> Result<Dungeon, GenerationError> {
        self.run()?;
        Ok(Dungeon::new(self.seed, &self.grid, &self.rooms))
    }

    fn run(&mut self) -> Result<(), GenerationError> {
        self.place_rooms();
        if self.rooms.is_empty() {
            return Err(GenerationError::NoRoomsPlaced);
        }

        self.construct_layout();
        self.construct_hallways()?;
        self.place_terminal_rooms()?;

        debug!(
            rooms = self.rooms.len(),
            grid_size = self.grid.size(),
            "generation pass complete"
        );
        Ok(())
    }

    /// Roll a room size within the configured range, skewed toward small,
    /// normalized to odd
    fn roll_room_size(&mut self) -> (i32, i32) {
        let (lo, hi) = self.config.room_size;
        let mut w = self.rng.skewed_range(lo, hi);
        let mut d = self.rng.skewed_range(lo, hi);
        if w % 2 == 0 {
            w += 1;
        }
        if d % 2 == 0 {
            d += 1;
        }
        (w, d)
    }

    /// Propose/retry/extend until a footprint commits.
    ///
    /// Returns None only when the retry budget is exhausted and grid
    /// extension is disallowed; the room is then dropped from the layout.
    fn find_placement(&mut self) -> Option<(GridPos, (i32, i32))> {
        let mut tries = 0u32;
        loop {
            let hi = self.grid.size() as i32 - PLACEMENT_MARGIN - 1;
            let pos = GridPos::new(
                self.rng.range_inclusive(PLACEMENT_MARGIN, hi),
                self.rng.range_inclusive(PLACEMENT_MARGIN, hi),
            );
            let size = self.roll_room_size();

            tries += 1;
            if tries > self.config.max_placement_tries {
                if !self.config.allow_grid_extensions {
                    return None;
                }
                self.grid.extend(self.config.grid_extension);
                debug!(size = self.grid.size(), "grid extended for placement");
                tries = 0;
            }

            if self
                .grid
                .try_place_room(pos, size, self.config.room_spacing)
            {
                return Some((pos, size));
            }
        }
    }

    /// Commit a room entity at a placed footprint
    fn create_room(&mut self, pos: GridPos, size: (i32, i32), exits: (i32, i32)) -> usize {
        let number_of_exits = self.rng.range_inclusive(exits.0, exits.1) as usize;
        let id = self.rooms.len();
        let room = Room::generate(
            &mut self.rng,
            pos,
            size,
            number_of_exits,
            self.config.tile_size,
            id,
        );
        debug!(id, x = pos.x, y = pos.y, exits = number_of_exits, "room placed");
        self.rooms.push(room);
        id
    }

    fn place_rooms(&mut self) {
        let (lo, hi) = self.config.number_of_rooms;
        let requested = self.rng.range_inclusive(lo, hi);

        for _ in 0..requested {
            if let Some((pos, size)) = self.find_placement() {
                self.create_room(pos, size, self.config.number_of_exits);
            }
        }
    }

    /// Decide which rooms connect: triangulate, span, repair, add loops
    fn construct_layout(&mut self) {
        let vertices: Vec<Vec2> = self.rooms.iter().map(|r| r.position.flat()).collect();
        let matrix = Delaunay::new(vertices).adjacency_matrix();

        self.edges = minimum_spanning_tree(&matrix, &mut self.rng);
        self.count_used_exits();
        self.repair_exit_capacity();
        self.add_loop_edges(&matrix);
    }

    /// Tally tree degree into each room's used-exit counter
    fn count_used_exits(&mut self) {
        for v in 0..self.edges.len() {
            for i in 0..self.edges[v].len() {
                let u = self.edges[v][i];
                self.rooms[v].exits_used += 1;
                self.rooms[u].exits_used += 1;
            }
        }
    }

    /// Replace any room whose tree degree exceeds its exit capacity with a
    /// same-footprint room carrying degree + 1 exits. Id and used-exit
    /// count carry over.
    fn repair_exit_capacity(&mut self) {
        for v in 0..self.rooms.len() {
            let used = self.rooms[v].exits_used;
            if used <= self.rooms[v].number_of_exits {
                continue;
            }

            debug!(room = v, used, "replacing room with too few exits");
            let mut replacement = Room::generate(
                &mut self.rng,
                self.rooms[v].grid_pos,
                self.rooms[v].grid_extent,
                used + 1,
                self.config.tile_size,
                self.rooms[v].id,
            );
            replacement.exits_used = used;
            self.rooms[v] = replacement;
        }
    }

    /// Add back non-tree triangulation edges with `loop_probability`, as
    /// long as both endpoints still have spare exits.
    ///
    /// A roll is consumed for every ordered pair regardless of the other
    /// conditions, keeping the draw sequence independent of layout.
    fn add_loop_edges(&mut self, matrix: &AdjacencyMatrix) {
        let n = self.edges.len();

        for i in 0..n {
            for v in 0..n {
                let roll = self.rng.value();
                if roll <= self.config.loop_probability
                    && matrix[i][v] != 0.0
                    && !self.edges[i].contains(&v)
                    && !self.edges[v].contains(&i)
                    && self.rooms[i].has_spare_exits()
                    && self.rooms[v].has_spare_exits()
                {
                    self.edges[i].push(v);
                    self.rooms[i].exits_used += 1;
                    self.rooms[v].exits_used += 1;
                }
            }
        }

        // Loop edges are capacity-guarded, so repair cannot be outrun
        debug_assert!(self
            .rooms
            .iter()
            .all(|r| r.exits_used <= r.number_of_exits));
    }

    /// Carve one hallway between two rooms, consuming one exit from each
    fn carve_hallway(&mut self, a: usize, b: usize) -> Result<(), GenerationError> {
        let start_exit = self.rooms[a]
            .take_available_exit()
            .ok_or(GenerationError::ExitsExhausted { room: a })?;
        let end_exit = self.rooms[b]
            .take_available_exit()
            .ok_or(GenerationError::ExitsExhausted { room: b })?;

        let start = GridPos::from_world(start_exit, self.config.tile_size);
        let goal = GridPos::from_world(end_exit, self.config.tile_size);

        let finder = PathFinder::new(&self.grid, &self.config.weights);
        let came_from = finder.find_path(start, goal);
        let path = reconstruct_path(&came_from, start, goal)
            .ok_or(GenerationError::HallwayUnreachable { from: a, to: b })?;

        for pos in path {
            self.grid.mark_hallway_tile(pos);
        }
        Ok(())
    }

    fn construct_hallways(&mut self) -> Result<(), GenerationError> {
        for i in 0..self.edges.len() {
            for e in 0..self.edges[i].len() {
                let v = self.edges[i][e];
                self.carve_hallway(i, v)?;
            }
        }
        Ok(())
    }

    /// Place one dead-end room hanging off `source`, consuming one of its
    /// exits. Returns false when no footprint could be found.
    fn add_terminal_room(&mut self, source: usize) -> Result<bool, GenerationError> {
        let Some((pos, size)) = self.find_placement() else {
            return Ok(false);
        };

        let id = self.create_room(pos, size, (1, 1));
        self.rooms[id].exits_used = 1;
        self.carve_hallway(source, id)?;
        Ok(true)
    }

    /// Cap every leftover exit on the main rooms with a terminal room
    fn place_terminal_rooms(&mut self) -> Result<(), GenerationError> {
        let main_rooms = self.edges.len();

        for id in 0..main_rooms {
            let mut tries = 0u32;
            while self.rooms[id].exits_used < self.rooms[id].number_of_exits {
                if tries > self.config.max_placement_tries {
                    if !self.config.allow_grid_extensions {
                        break;
                    }
                    tries = 0;
                    self.grid.extend(self.config.grid_extension);
                }

                if self.add_terminal_room(id)? {
                    self.rooms[id].exits_used += 1;
                    debug!(room = id, "terminal room attached");
                }
                tries += 1;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Tile;

    fn small_config() -> DungeonProperties {
        DungeonProperties {
            grid_size: 50,
            number_of_rooms: (4, 6),
            room_size: (5, 9),
            number_of_exits: (1, 3),
            ..Default::default()
        }
    }

    #[test]
    fn same_seed_produces_identical_dungeons() {
        let a = DungeonGenerator::new(42, small_config())
            .unwrap()
            .generate()
            .unwrap();
        let b = DungeonGenerator::new(42, small_config())
            .unwrap()
            .generate()
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = DungeonGenerator::new(1, small_config())
            .unwrap()
            .generate()
            .unwrap();
        let b = DungeonGenerator::new(2, small_config())
            .unwrap()
            .generate()
            .unwrap();
        assert_ne!(a.tiles, b.tiles);
    }

    #[test]
    fn all_rooms_stay_within_exit_capacity() {
        for seed in 0..20 {
            let mut generator = DungeonGenerator::new(seed, small_config()).unwrap();
            generator.run().unwrap();

            let main_rooms = generator.edges.len();
            for (i, room) in generator.rooms.iter().enumerate() {
                assert!(
                    room.exits_used <= room.number_of_exits,
                    "seed {}: room {} over capacity ({}/{})",
                    seed,
                    i,
                    room.exits_used,
                    room.number_of_exits
                );
                // Terminal capping leaves no main-room exit unused
                if i < main_rooms {
                    assert_eq!(room.exits_used, room.number_of_exits, "seed {}: room {}", seed, i);
                }
            }
        }
    }

    #[test]
    fn carved_dungeon_contains_rooms_and_hallways() {
        let dungeon = DungeonGenerator::new(7, small_config())
            .unwrap()
            .generate()
            .unwrap();

        let rooms = dungeon.tiles.iter().filter(|t| t.is_room()).count();
        let hallways = dungeon.tiles.iter().filter(|t| t.is_hallway()).count();
        assert!(rooms > 0, "expected room tiles");
        assert!(hallways > 0, "expected hallway tiles");
    }

    #[test]
    fn impossible_configuration_fails_explicitly() {
        let config = DungeonProperties {
            grid_size: 12,
            allow_grid_extensions: false,
            ..Default::default()
        };
        let result = DungeonGenerator::new(0, config).unwrap().generate();
        assert_eq!(result, Err(GenerationError::NoRoomsPlaced));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = DungeonProperties {
            number_of_rooms: (3, 1),
            ..Default::default()
        };
        assert!(DungeonGenerator::new(0, config).is_err());
    }
}
