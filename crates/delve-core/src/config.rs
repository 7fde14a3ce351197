//! Generation configuration
//!
//! Plain immutable structs passed into the generator explicitly. Defaults
//! match the tuning the layout algorithm was developed against.

use serde::{Deserialize, Serialize};

use crate::error::GenerationError;
use crate::geometry::Vec3;

/// Traversal cost per tile type for hallway pathfinding.
///
/// Room and HallwayAndRoom are priced near-infinite so paths do not cut
/// through rooms; Hallway stays cheap so paths merge into existing
/// corridors. The turn penalty multiplies the tile cost whenever the step
/// direction changes, detected by the coarse proxy
/// `prev.x != next.x && prev.y != next.y` (previous and next differ on both
/// axes); hallway tiles are exempt so merging into a corridor is never
/// penalized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileWeights {
    pub empty: f32,
    pub main_room: f32,
    pub room: f32,
    pub hallway: f32,
    pub hallway_and_room: f32,
    pub room_spacing: f32,
    pub hallway_spacing: f32,
    pub turn_penalty: f32,
}

/// Effectively impassable
const INF: f32 = 1_000_000.0;

impl Default for TileWeights {
    fn default() -> Self {
        Self {
            empty: 10.0,
            main_room: INF,
            room: INF,
            hallway: 5.0,
            hallway_and_room: INF,
            room_spacing: 20.0,
            hallway_spacing: 7.0,
            turn_penalty: 3.0,
        }
    }
}

/// Everything the generator needs, supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DungeonProperties {
    /// Initial grid edge length in tiles
    pub grid_size: usize,
    /// Probability of re-adding a triangulation edge as a loop
    pub loop_probability: f32,
    /// Inclusive (min, max) room edge length in tiles
    pub room_size: (i32, i32),
    /// Inclusive (min, max) number of main rooms to attempt
    pub number_of_rooms: (i32, i32),
    /// Inclusive (min, max) exits rolled per room
    pub number_of_exits: (i32, i32),
    /// Width of the keep-clear ring around each room, in tiles
    pub room_spacing: i32,
    /// World size of one tile
    pub tile_size: Vec3,
    /// Pathfinding weights
    pub weights: TileWeights,
    /// Whether placement failure may grow the grid
    pub allow_grid_extensions: bool,
    /// Tiles added per extension
    pub grid_extension: usize,
    /// Placement attempts before extending (or giving up)
    pub max_placement_tries: u32,
}

impl Default for DungeonProperties {
    fn default() -> Self {
        Self {
            grid_size: 50,
            loop_probability: 0.2,
            room_size: (5, 9),
            number_of_rooms: (4, 8),
            number_of_exits: (1, 3),
            room_spacing: 4,
            tile_size: Vec3::new(1.0, 1.0, 1.0),
            weights: TileWeights::default(),
            allow_grid_extensions: true,
            grid_extension: 10,
            max_placement_tries: 100,
        }
    }
}

impl DungeonProperties {
    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> Result<(), GenerationError> {
        let ranges = [
            ("room_size", self.room_size),
            ("number_of_rooms", self.number_of_rooms),
            ("number_of_exits", self.number_of_exits),
        ];
        for (name, (lo, hi)) in ranges {
            if lo < 1 || hi < lo {
                return Err(GenerationError::InvalidConfig {
                    reason: format!("{} range ({}, {}) is not a valid range", name, lo, hi),
                });
            }
        }

        // Interior extent is 2*(n/2); below 4 a side has no non-corner
        // perimeter cell left to carry an exit
        if self.room_size.0 < 4 {
            return Err(GenerationError::InvalidConfig {
                reason: format!(
                    "room_size minimum {} leaves no room for exits (need at least 4)",
                    self.room_size.0
                ),
            });
        }

        if self.grid_size == 0 {
            return Err(GenerationError::InvalidConfig {
                reason: "grid_size must be nonzero".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.loop_probability) {
            return Err(GenerationError::InvalidConfig {
                reason: format!("loop_probability {} outside [0, 1]", self.loop_probability),
            });
        }
        if self.tile_size.x <= 0.0 || self.tile_size.z <= 0.0 {
            return Err(GenerationError::InvalidConfig {
                reason: "tile_size must be positive".into(),
            });
        }
        if self.allow_grid_extensions && self.grid_extension == 0 {
            return Err(GenerationError::InvalidConfig {
                reason: "grid_extension must be nonzero when extensions are allowed".into(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DungeonProperties::default().validate().is_ok());
    }

    #[test]
    fn inverted_range_is_rejected() {
        let config = DungeonProperties {
            room_size: (9, 5),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn tiny_rooms_are_rejected() {
        let config = DungeonProperties {
            room_size: (3, 9),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn loop_probability_is_bounded() {
        let config = DungeonProperties {
            loop_probability: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
