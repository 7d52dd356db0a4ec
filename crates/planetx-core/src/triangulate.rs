//! Triangulation seam used by the world generator.
//!
//! The generator only needs the undirected edge set of a planar
//! triangulation over its sampled points. [`Triangulator`] is the seam; the
//! default implementation delegates to the `delaunator` crate.

use crate::graph::Point;
use std::collections::BTreeSet;

/// Produces the edges of a planar triangulation.
///
/// Implementations return each undirected edge once as an index pair
/// `(i, j)` with `i < j`, where indices refer to positions in `points`.
/// The returned edge set must connect every point.
pub trait Triangulator {
    fn edges(&self, points: &[Point]) -> Vec<(usize, usize)>;
}

/// Delaunay triangulation via `delaunator`.
///
/// Collinear input has no triangles; in that case the points are chained in
/// `(x, y)` order. Any point the triangulation skipped is joined to its
/// nearest neighbor.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelaunatorTriangulator;

impl Triangulator for DelaunatorTriangulator {
    fn edges(&self, points: &[Point]) -> Vec<(usize, usize)> {
        if points.len() < 2 {
            return Vec::new();
        }
        let input: Vec<delaunator::Point> = points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = delaunator::triangulate(&input);

        let mut pairs = BTreeSet::new();
        for tri in triangulation.triangles.chunks_exact(3) {
            for (i, j) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                pairs.insert(ordered(i, j));
            }
        }

        if pairs.is_empty() {
            return chain_sorted(points);
        }

        let mut covered = vec![false; points.len()];
        for &(i, j) in &pairs {
            covered[i] = true;
            covered[j] = true;
        }
        for (i, _) in covered.iter().enumerate().filter(|(_, c)| !**c) {
            if let Some(j) = nearest_other(points, i) {
                pairs.insert(ordered(i, j));
            }
        }

        pairs.into_iter().collect()
    }
}

fn ordered(i: usize, j: usize) -> (usize, usize) {
    if i < j { (i, j) } else { (j, i) }
}

/// Join points into a path sorted by x, then y.
fn chain_sorted(points: &[Point]) -> Vec<(usize, usize)> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        points[a]
            .x
            .total_cmp(&points[b].x)
            .then(points[a].y.total_cmp(&points[b].y))
    });
    order.windows(2).map(|w| ordered(w[0], w[1])).collect()
}

fn nearest_other(points: &[Point], i: usize) -> Option<usize> {
    let p = points[i];
    points
        .iter()
        .enumerate()
        .filter(|(j, _)| *j != i)
        .map(|(j, q)| ((q.x - p.x).hypot(q.y - p.y), j))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, j)| j)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    fn connected(n: usize, edges: &[(usize, usize)]) -> bool {
        let mut adj = vec![Vec::new(); n];
        for &(a, b) in edges {
            adj[a].push(b);
            adj[b].push(a);
        }
        let mut seen = vec![false; n];
        let mut stack = vec![0];
        seen[0] = true;
        while let Some(v) = stack.pop() {
            for &w in &adj[v] {
                if !seen[w] {
                    seen[w] = true;
                    stack.push(w);
                }
            }
        }
        seen.into_iter().all(|s| s)
    }

    #[test]
    fn square_has_five_edges() {
        let points = [pt(0.0, 0.0), pt(10.0, 0.0), pt(10.0, 10.0), pt(0.0, 10.0)];
        let edges = DelaunatorTriangulator.edges(&points);
        // Four sides plus one diagonal.
        assert_eq!(edges.len(), 5);
        assert!(edges.iter().all(|&(i, j)| i < j));
        assert!(connected(points.len(), &edges));
    }

    #[test]
    fn triangle_has_three_edges() {
        let points = [pt(0.0, 0.0), pt(4.0, 0.0), pt(0.0, 3.0)];
        let edges = DelaunatorTriangulator.edges(&points);
        assert_eq!(edges, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn collinear_points_are_chained_in_order() {
        let points = [pt(5.0, 0.0), pt(1.0, 0.0), pt(9.0, 0.0), pt(3.0, 0.0)];
        let edges = DelaunatorTriangulator.edges(&points);
        // Sorted by x: 1 (x=1), 3 (x=3), 0 (x=5), 2 (x=9).
        assert_eq!(edges, vec![(1, 3), (0, 3), (0, 2)]);
    }

    #[test]
    fn two_points_form_one_edge() {
        let edges = DelaunatorTriangulator.edges(&[pt(0.0, 0.0), pt(3.0, 4.0)]);
        assert_eq!(edges, vec![(0, 1)]);
    }

    #[test]
    fn fewer_than_two_points_have_no_edges() {
        assert!(DelaunatorTriangulator.edges(&[]).is_empty());
        assert!(DelaunatorTriangulator.edges(&[pt(1.0, 1.0)]).is_empty());
    }

    #[test]
    fn scattered_points_stay_connected() {
        let points: Vec<Point> = (0..40)
            .map(|i| {
                let f = f64::from(i);
                pt((f * 37.0) % 101.0, (f * 53.0) % 97.0)
            })
            .collect();
        let edges = DelaunatorTriangulator.edges(&points);
        assert!(connected(points.len(), &edges));
    }
}
