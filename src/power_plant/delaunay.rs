//! Bowyer-Watson Delaunay triangulation.
//!
//! Points are inserted one at a time into a triangulation seeded with a large super triangle.
//! Every triangle whose circumcircle contains the new point is removed, and the resulting
//! polygonal hole is re-triangulated by fanning from the new point. Triangles touching the super
//! triangle are dropped at the end.

use crate::power_plant::loc::Loc;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};

/// Triangles with less area than this (relative to the bounding box) count as degenerate.
const DEGENERATE_AREA: f64 = 1e-12;

/// Super triangle corners sit this many bounding-box spans away from the centre. Closer corners
/// bend the circumcircles of hull triangles enough to lose thin triangles along the hull.
const SUPER_TRIANGLE_SCALE: f64 = 1e5;

/// Twice the signed area of `abc`; positive when counter-clockwise.
fn orientation(a: Loc, b: Loc, c: Loc) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

/// Whether `p` lies strictly inside the circumcircle of `abc`.
fn in_circumcircle(a: Loc, b: Loc, c: Loc, p: Loc) -> bool {
    let (ax, ay) = (a.x - p.x, a.y - p.y);
    let (bx, by) = (b.x - p.x, b.y - p.y);
    let (cx, cy) = (c.x - p.x, c.y - p.y);

    let det = (ax * ax + ay * ay) * (bx * cy - cx * by)
        - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay);

    if orientation(a, b, c) > 0.0 {
        det > 0.0
    } else {
        det < 0.0
    }
}

const fn sorted_edge(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

/// Delaunay triangulation of `points`, as index triples into `points`.
///
/// Fewer than three distinct points, or only collinear points, give no triangles. Repeated
/// points are triangulated at their first occurrence only.
#[must_use]
pub fn triangulate(points: &[Loc]) -> Vec<[usize; 3]> {
    let mut seen = FxHashSet::default();
    let distinct: Vec<usize> = (0..points.len())
        .filter(|&i| seen.insert(points[i]))
        .collect();
    if distinct.len() < 3 {
        return Vec::new();
    }

    let (min_x, max_x) = distinct
        .iter()
        .map(|&i| points[i].x)
        .minmax()
        .into_option()
        .unwrap_or_default();
    let (min_y, max_y) = distinct
        .iter()
        .map(|&i| points[i].y)
        .minmax()
        .into_option()
        .unwrap_or_default();
    let span = (max_x - min_x).max(max_y - min_y).max(1.0);
    let mid = Loc::new((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);

    // Working vertex list: the input points, then the three super triangle corners.
    let mut vertices = points.to_vec();
    let super_start = vertices.len();
    let reach = SUPER_TRIANGLE_SCALE * span;
    vertices.push(Loc::new(mid.x - reach, mid.y - reach));
    vertices.push(Loc::new(mid.x, mid.y + reach));
    vertices.push(Loc::new(mid.x + reach, mid.y - reach));

    let mut triangles: Vec<[usize; 3]> = vec![[super_start, super_start + 1, super_start + 2]];

    for &p in &distinct {
        let point = vertices[p];

        let (bad, good): (Vec<[usize; 3]>, Vec<[usize; 3]>) =
            triangles.into_iter().partition(|&[a, b, c]| {
                in_circumcircle(vertices[a], vertices[b], vertices[c], point)
            });

        // Boundary of the hole: edges belonging to exactly one removed triangle.
        let mut edge_count: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        for &[a, b, c] in &bad {
            for edge in [sorted_edge(a, b), sorted_edge(b, c), sorted_edge(c, a)] {
                *edge_count.entry(edge).or_insert(0) += 1;
            }
        }

        triangles = good;
        for &[a, b, c] in &bad {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                if edge_count[&sorted_edge(u, v)] == 1 {
                    triangles.push([u, v, p]);
                }
            }
        }
    }

    let min_area = DEGENERATE_AREA * span * span;
    triangles
        .into_iter()
        .filter(|t| t.iter().all(|&v| v < super_start))
        .filter(|&[a, b, c]| orientation(vertices[a], vertices[b], vertices[c]).abs() > min_area)
        .map(|[a, b, c]| {
            if orientation(vertices[a], vertices[b], vertices[c]) > 0.0 {
                [a, b, c]
            } else {
                [a, c, b]
            }
        })
        .collect()
}

/// Unique edges of a set of triangles, as `(a, b)` with `a < b`, sorted.
#[must_use]
pub fn triangle_edges(triangles: &[[usize; 3]]) -> Vec<(usize, usize)> {
    triangles
        .iter()
        .flat_map(|&[a, b, c]| [sorted_edge(a, b), sorted_edge(b, c), sorted_edge(c, a)])
        .sorted()
        .dedup()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power_plant::loc::{random_plants, EXAMPLE_PLANTS};
    use crate::power_plant::prims::prims;

    fn assert_empty_circumcircles(points: &[Loc], triangles: &[[usize; 3]]) {
        for &[a, b, c] in triangles {
            for (i, &p) in points.iter().enumerate() {
                if i == a || i == b || i == c || p == points[a] || p == points[b] || p == points[c] {
                    continue;
                }
                assert!(
                    !in_circumcircle(points[a], points[b], points[c], p),
                    "point {i} inside circumcircle of {a} {b} {c}"
                );
            }
        }
    }

    #[test]
    fn test_square_gives_two_triangles() {
        let points = [
            Loc::new(0.0, 0.0),
            Loc::new(1.0, 0.0),
            Loc::new(1.0, 2.0),
            Loc::new(0.0, 2.1),
        ];
        let triangles = triangulate(&points);
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangle_edges(&triangles).len(), 5);
    }

    #[test]
    fn test_triangles_are_counter_clockwise() {
        for [a, b, c] in triangulate(&EXAMPLE_PLANTS) {
            assert!(orientation(EXAMPLE_PLANTS[a], EXAMPLE_PLANTS[b], EXAMPLE_PLANTS[c]) > 0.0);
        }
    }

    #[test]
    fn test_example_plants_are_delaunay() {
        let triangles = triangulate(&EXAMPLE_PLANTS);
        // Six hull points, (32, 36) lying on the hull edge between (40, 35) and (16, 38).
        assert_eq!(triangles.len(), 8);
        assert_empty_circumcircles(&EXAMPLE_PLANTS, &triangles);
    }

    #[test]
    fn test_contains_minimum_spanning_tree() {
        let mut rng = fastrand::Rng::with_seed(99);
        for n in 3..30 {
            let points = random_plants(&mut rng, n, 1000);
            let triangles = triangulate(&points);
            assert_empty_circumcircles(&points, &triangles);

            let edges: FxHashSet<(usize, usize)> = triangle_edges(&triangles).into_iter().collect();
            for &(a, b) in &prims(&points).links {
                if points[a] == points[b] {
                    continue;
                }
                let first = |v: usize| points.iter().position(|&p| p == points[v]).unwrap_or(v);
                let edge = sorted_edge(first(a), first(b));
                // Cocircular points may make the spanning tree pick a tie the triangulation
                // did not, so only check the edge when the triangulation is unambiguous.
                let len = points[a].distance(&points[b]);
                let has_tie = points.iter().enumerate().any(|(i, p)| {
                    i != a && i != b && (p.distance(&points[a]) - len).abs() < 1e-9
                });
                if !has_tie {
                    assert!(edges.contains(&edge), "n = {n}: missing MST edge {edge:?}");
                }
            }
        }
    }

    #[test]
    fn test_degenerate_inputs() {
        assert!(triangulate(&[]).is_empty());
        assert!(triangulate(&[Loc::new(0.0, 0.0), Loc::new(1.0, 1.0)]).is_empty());
        assert!(
            triangulate(&[Loc::new(0.0, 0.0), Loc::new(1.0, 1.0), Loc::new(2.0, 2.0)]).is_empty()
        );
        assert!(
            triangulate(&[Loc::new(0.0, 0.0), Loc::new(0.0, 0.0), Loc::new(1.0, 0.0)]).is_empty()
        );
    }

    #[test]
    fn test_duplicates_use_first_occurrence() {
        let points = [
            Loc::new(0.0, 0.0),
            Loc::new(4.0, 0.0),
            Loc::new(0.0, 3.0),
            Loc::new(4.0, 0.0),
        ];
        let triangles = triangulate(&points);
        assert_eq!(triangles.len(), 1);
        assert!(triangles[0].iter().all(|&v| v != 3));
    }
}
