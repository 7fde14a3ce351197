//! Weighted A* over the tile grid
//!
//! Connects two room exits with a 4-connected path. Tile costs come from
//! `TileWeights`; a turn penalty multiplier discourages zig-zagging except
//! on hallway tiles, which keeps paths merging into existing corridors.
//! The result is a came-from backpointer map; callers walk it from the goal
//! back to the start.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::config::TileWeights;
use crate::geometry::GridPos;
use crate::grid::{Grid, Tile};

const DIRECTIONS: [GridPos; 4] = [
    GridPos::new(0, 1),
    GridPos::new(1, 0),
    GridPos::new(0, -1),
    GridPos::new(-1, 0),
];

/// Frontier entry for the priority queue
#[derive(Debug, Clone, Copy)]
struct FrontierNode {
    pos: GridPos,
    priority: f32,
}

impl PartialEq for FrontierNode {
    fn eq(&self, other: &Self) -> bool {
        self.priority.total_cmp(&other.priority) == Ordering::Equal
    }
}

impl Eq for FrontierNode {}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other.priority.total_cmp(&self.priority)
    }
}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A* search over a grid with fixed weights
pub struct PathFinder<'a> {
    grid: &'a Grid,
    weights: &'a TileWeights,
}

impl<'a> PathFinder<'a> {
    pub fn new(grid: &'a Grid, weights: &'a TileWeights) -> Self {
        Self { grid, weights }
    }

    /// Cost of stepping onto `next`, having arrived at the current tile
    /// from `previous`.
    ///
    /// Turn detection is the coarse coordinate proxy: previous and next
    /// differing on both axes means the step direction changed.
    fn step_cost(&self, previous: GridPos, next: GridPos) -> f32 {
        let Some(tile) = self.grid.get(next) else {
            return f32::INFINITY;
        };

        let turned = previous.x != next.x && previous.y != next.y;
        let penalty = if turned { self.weights.turn_penalty } else { 1.0 };

        match tile {
            Tile::Empty => penalty * self.weights.empty,
            Tile::MainRoom => penalty * self.weights.main_room,
            Tile::Room => penalty * self.weights.room,
            Tile::RoomSpacing => penalty * self.weights.room_spacing,
            // Hallway tiles are exempt from the turn penalty
            Tile::Hallway => self.weights.hallway,
            Tile::HallwayAndRoom => self.weights.hallway_and_room,
            Tile::HallwaySpacing => self.weights.hallway_spacing,
            Tile::Invalid => f32::INFINITY,
        }
    }

    /// Find the lowest-cost path from `start` to `goal`.
    ///
    /// Returns the came-from backpointer map. If the goal is unreachable
    /// the map simply never connects it to the start; use
    /// [`reconstruct_path`] to detect that.
    pub fn find_path(&self, start: GridPos, goal: GridPos) -> HashMap<GridPos, GridPos> {
        let mut frontier = BinaryHeap::new();
        let mut cost_so_far: HashMap<GridPos, f32> = HashMap::new();
        let mut came_from: HashMap<GridPos, GridPos> = HashMap::new();

        frontier.push(FrontierNode {
            pos: start,
            priority: 0.0,
        });
        cost_so_far.insert(start, 0.0);

        while let Some(FrontierNode { pos: current, .. }) = frontier.pop() {
            if current == goal {
                break;
            }

            let previous = came_from.get(&current).copied().unwrap_or(current);

            for dir in DIRECTIONS {
                let next = current + dir;
                if !self.grid.in_bounds(next) {
                    continue;
                }

                let new_cost = cost_so_far[&current] + self.step_cost(previous, next);
                if !new_cost.is_finite() {
                    continue;
                }

                let improved = cost_so_far.get(&next).map_or(true, |&c| new_cost < c);
                if improved {
                    cost_so_far.insert(next, new_cost);
                    came_from.insert(next, current);
                    frontier.push(FrontierNode {
                        pos: next,
                        priority: new_cost + next.manhattan(goal) as f32,
                    });
                }
            }
        }

        came_from
    }
}

/// Walk the backpointer map from `goal` to `start`.
///
/// Returns the path in goal-to-start order, or None when the chain never
/// reaches the start (disconnected search).
pub fn reconstruct_path(
    came_from: &HashMap<GridPos, GridPos>,
    start: GridPos,
    goal: GridPos,
) -> Option<Vec<GridPos>> {
    let mut path = vec![goal];
    let mut current = goal;

    // Backpointers strictly decrease in path cost, so the chain cannot
    // cycle; the bound is plain defense against a corrupted map
    for _ in 0..came_from.len() + 1 {
        if current == start {
            return Some(path);
        }
        current = *came_from.get(&current)?;
        path.push(current);
    }

    None
}
