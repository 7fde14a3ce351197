//! Minimum spanning tree over the triangulation graph
//!
//! Prim's algorithm with a uniformly-random start vertex. The output is an
//! edge list keyed by child vertex: `edges[v]` holds v's parent in the tree
//! (empty for the start vertex). Loop augmentation happens later in the
//! generator, not here.

use crate::rng::DungeonRng;
use crate::triangulation::AdjacencyMatrix;

/// Tree edges keyed by vertex; each entry is the list of vertices this one
/// connects back to. After MST construction every list has at most one
/// element; loop edges appended later can grow them.
pub type EdgeList = Vec<Vec<usize>>;

/// Build the minimum spanning tree of a nonzero-weight adjacency matrix.
///
/// Assumes the matrix is connected (true for any Delaunay triangulation of
/// three or more distinct points); unreachable vertices simply end up with
/// no parent.
pub fn minimum_spanning_tree(matrix: &AdjacencyMatrix, rng: &mut DungeonRng) -> EdgeList {
    let n = matrix.len();
    let mut edges: EdgeList = vec![Vec::new(); n];

    if n == 0 {
        return edges;
    }

    let mut key = vec![f32::INFINITY; n];
    let mut in_tree = vec![false; n];

    let start = rng.index(n);
    key[start] = 0.0;

    for _ in 0..n {
        let Some(current) = minimum_key(&key, &in_tree) else {
            break;
        };
        in_tree[current] = true;

        for v in 0..n {
            if matrix[current][v] != 0.0 && !in_tree[v] && matrix[current][v] < key[v] {
                if edges[v].is_empty() {
                    edges[v].push(current);
                } else {
                    edges[v][0] = current;
                }
                key[v] = matrix[current][v];
            }
        }
    }

    edges
}

/// Cheapest vertex not yet in the tree, None when the frontier is exhausted
fn minimum_key(key: &[f32], in_tree: &[bool]) -> Option<usize> {
    let mut min = f32::INFINITY;
    let mut min_index = None;

    for (v, &k) in key.iter().enumerate() {
        if !in_tree[v] && k < min {
            min = k;
            min_index = Some(v);
        }
    }

    min_index
}
