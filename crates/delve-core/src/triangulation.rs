//! Delaunay triangulation of room centers
//!
//! Incremental Bowyer-Watson: every point is inserted into a triangulation
//! seeded with a large synthetic super-triangle; triangles whose
//! circumcircle contains the new point are removed and their cavity is
//! re-triangulated against the point. The result is handed on as a
//! symmetric adjacency matrix of center-to-center distances.

use crate::geometry::Vec2;

/// Symmetric matrix of edge distances; 0 means no edge
pub type AdjacencyMatrix = Vec<Vec<f32>>;

/// Index marking a synthetic super-triangle vertex
const SYNTHETIC: i32 = -1;

/// Undirected edge between two triangulation vertices
#[derive(Debug, Clone, Copy)]
struct Edge {
    a: Vec2,
    b: Vec2,
    index_a: i32,
    index_b: i32,
}

impl Edge {
    fn same_as(&self, other: &Edge) -> bool {
        (self.a == other.a && self.b == other.b) || (self.a == other.b && self.b == other.a)
    }
}

/// Triangle over three vertices, keeping both positions and list indices
#[derive(Debug, Clone, Copy)]
struct Triangle {
    a: Vec2,
    b: Vec2,
    c: Vec2,
    index_a: i32,
    index_b: i32,
    index_c: i32,
}

impl Triangle {
    /// Circumcircle containment via the standard determinant sign test.
    ///
    /// Strict `<`: a point exactly on the circle counts as outside, so
    /// co-circular configurations resolve by floating-point rounding.
    fn circumcircle_contains(&self, pt: Vec2) -> bool {
        let dx = self.a.x - pt.x;
        let dy = self.a.y - pt.y;
        let ex = self.b.x - pt.x;
        let ey = self.b.y - pt.y;
        let fx = self.c.x - pt.x;
        let fy = self.c.y - pt.y;

        let ap = dx * dx + dy * dy;
        let bp = ex * ex + ey * ey;
        let cp = fx * fx + fy * fy;

        dx * (ey * cp - bp * fy) - dy * (ex * cp - bp * fx) + ap * (ex * fy - ey * fx) < 0.0
    }

    /// Check if two triangles share at least one vertex position
    fn shares_vertex(&self, other: &Triangle) -> bool {
        [self.a, self.b, self.c]
            .iter()
            .any(|v| *v == other.a || *v == other.b || *v == other.c)
    }
}

/// Incremental Delaunay triangulation over a fixed vertex list
pub struct Delaunay {
    vertices: Vec<Vec2>,
    triangles: Vec<Triangle>,
}

impl Delaunay {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        Self {
            vertices,
            triangles: Vec::new(),
        }
    }

    /// Compute the triangulation and return the adjacency matrix of the
    /// underlying graph.
    pub fn adjacency_matrix(mut self) -> AdjacencyMatrix {
        let super_triangle = self.super_triangle();
        self.triangles.push(super_triangle);

        for i in 0..self.vertices.len() {
            self.insert_vertex(self.vertices[i], i as i32);
        }

        // Anything still touching the synthetic vertices is scaffolding
        self.triangles.retain(|t| !t.shares_vertex(&super_triangle));

        self.build_matrix()
    }

    /// Synthetic triangle enclosing all vertices with a 10x margin, so no
    /// real point can fall outside the initial triangulation
    fn super_triangle(&self) -> Triangle {
        let mut min = Vec2::new(f32::INFINITY, f32::INFINITY);
        let mut max = Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for v in &self.vertices {
            min.x = min.x.min(v.x);
            min.y = min.y.min(v.y);
            max.x = max.x.max(v.x);
            max.y = max.y.max(v.y);
        }

        let dx = (max.x - min.x) * 10.0;
        let dy = (max.y - min.y) * 10.0;

        Triangle {
            a: Vec2::new(min.x - dx, min.y - dy * 3.0),
            b: Vec2::new(min.x - dx, max.y + dy),
            c: Vec2::new(max.x + dx * 3.0, max.y + dy),
            index_a: SYNTHETIC,
            index_b: SYNTHETIC,
            index_c: SYNTHETIC,
        }
    }

    /// Insert one vertex: remove every triangle whose circumcircle contains
    /// it, then fan the cavity boundary back to the vertex
    fn insert_vertex(&mut self, vertex: Vec2, index: i32) {
        let mut cavity_edges = Vec::new();

        self.triangles.retain(|t| {
            if t.circumcircle_contains(vertex) {
                cavity_edges.push(Edge {
                    a: t.a,
                    b: t.b,
                    index_a: t.index_a,
                    index_b: t.index_b,
                });
                cavity_edges.push(Edge {
                    a: t.b,
                    b: t.c,
                    index_a: t.index_b,
                    index_b: t.index_c,
                });
                cavity_edges.push(Edge {
                    a: t.c,
                    b: t.a,
                    index_a: t.index_c,
                    index_b: t.index_a,
                });
                false
            } else {
                true
            }
        });

        // Edges shared by two removed triangles are interior to the cavity;
        // only the unique ones form its boundary
        for edge in unique_edges(&cavity_edges) {
            self.triangles.push(Triangle {
                a: edge.a,
                b: edge.b,
                c: vertex,
                index_a: edge.index_a,
                index_b: edge.index_b,
                index_c: index,
            });
        }
    }

    fn build_matrix(&self) -> AdjacencyMatrix {
        let n = self.vertices.len();
        let mut matrix = vec![vec![0.0; n]; n];

        let mut connect = |ia: i32, ib: i32, a: Vec2, b: Vec2| {
            debug_assert!(ia != SYNTHETIC && ib != SYNTHETIC);
            let dist = a.distance(b);
            matrix[ia as usize][ib as usize] = dist;
            matrix[ib as usize][ia as usize] = dist;
        };

        for t in &self.triangles {
            connect(t.index_a, t.index_b, t.a, t.b);
            connect(t.index_b, t.index_c, t.b, t.c);
            connect(t.index_c, t.index_a, t.c, t.a);
        }

        matrix
    }
}

fn unique_edges(edges: &[Edge]) -> Vec<Edge> {
    let mut unique = Vec::new();

    for (i, edge) in edges.iter().enumerate() {
        let duplicated = edges
            .iter()
            .enumerate()
            .any(|(j, other)| i != j && edge.same_as(other));
        if !duplicated {
            unique.push(*edge);
        }
    }

    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn matrix_for(points: &[(f32, f32)]) -> AdjacencyMatrix {
        let vertices = points.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
        Delaunay::new(vertices).adjacency_matrix()
    }

    #[test]
    fn three_points_form_one_triangle() {
        let matrix = matrix_for(&[(0.0, 0.0), (10.0, 0.0), (5.0, 8.0)]);

        for i in 0..3 {
            for j in 0..3 {
                if i == j {
                    assert_eq!(matrix[i][j], 0.0);
                } else {
                    assert!(matrix[i][j] > 0.0, "missing edge {}-{}", i, j);
                }
            }
        }
        assert_eq!(matrix[0][1], 10.0);
    }

    #[test]
    fn square_gets_one_diagonal() {
        let matrix = matrix_for(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);

        let edge_count: usize = (0..4)
            .flat_map(|i| (i + 1..4).map(move |j| (i, j)))
            .filter(|&(i, j)| matrix[i][j] > 0.0)
            .count();

        // Four sides plus exactly one of the two diagonals
        assert_eq!(edge_count, 5);
    }

    #[test]
    fn empty_and_tiny_inputs_yield_empty_matrices() {
        assert!(matrix_for(&[]).is_empty());
        let single = matrix_for(&[(3.0, 4.0)]);
        assert_eq!(single, vec![vec![0.0]]);
    }

    proptest! {
        #[test]
        fn matrix_is_symmetric_with_real_distances(
            points in proptest::collection::vec((0.0f32..100.0, 0.0f32..100.0), 3..20)
        ) {
            let vertices: Vec<Vec2> = points.iter().map(|&(x, y)| Vec2::new(x, y)).collect();
            let matrix = Delaunay::new(vertices.clone()).adjacency_matrix();

            for i in 0..vertices.len() {
                prop_assert_eq!(matrix[i][i], 0.0);
                for j in 0..vertices.len() {
                    prop_assert_eq!(matrix[i][j], matrix[j][i]);
                    if matrix[i][j] > 0.0 {
                        let dist = vertices[i].distance(vertices[j]);
                        prop_assert!((matrix[i][j] - dist).abs() < 1e-3);
                    }
                }
            }
        }
    }
}
