//! delve-core: Procedural dungeon generation
//!
//! Deterministic seed-to-dungeon pipeline with no I/O dependencies: room
//! placement on a tile grid, Delaunay triangulation of room centers, a
//! randomized minimum spanning tree plus loop edges, weighted A* hallway
//! carving, and terminal rooms capping unused exits. The result serializes
//! to a compact snapshot that [`layout`] turns back into placeable pieces.

pub mod config;
pub mod error;
pub mod generator;
pub mod geometry;
pub mod grid;
pub mod layout;
pub mod mst;
pub mod pathfinder;
pub mod room;
pub mod snapshot;
pub mod triangulation;

mod rng;

pub use config::{DungeonProperties, TileWeights};
pub use error::GenerationError;
pub use generator::DungeonGenerator;
pub use layout::{load_dungeon, DungeonPiece, LoadError};
pub use rng::{DungeonRng, RngState};
pub use snapshot::{Dungeon, RoomSnapshot};
