//! Generation error types

use thiserror::Error;

/// Failures a generation pass can surface to the caller.
///
/// Placement failures for individual rooms are handled internally by
/// retry/extend/replace; these variants are the cases that cannot be
/// repaired locally.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    #[error("configuration rejected: {reason}")]
    InvalidConfig { reason: String },

    #[error("no rooms could be placed with the given configuration")]
    NoRoomsPlaced,

    #[error("no hallway path between room {from} and room {to}")]
    HallwayUnreachable { from: usize, to: usize },

    #[error("room {room} has no free exit left to connect")]
    ExitsExhausted { room: usize },
}
