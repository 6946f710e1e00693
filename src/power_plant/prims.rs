//! Prim's algorithm over the complete Euclidean graph of a set of locations.

use crate::power_plant::loc::{Edge, Loc};
use bit_vec::BitVec;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// A spanning tree over a slice of locations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpanningTree {
    /// Sum of the edge costs.
    pub cost: f64,
    /// Edges in the order they joined the tree.
    pub edges: Vec<Edge>,
    /// Index pairs `(from, to)` into the input slice, parallel to `edges`.
    pub links: Vec<(usize, usize)>,
}

impl SpanningTree {
    /// Number of tree edges at each of the `n` vertices.
    #[must_use]
    pub fn degree(&self, n: usize) -> Vec<usize> {
        let mut degree = vec![0; n];
        for &(a, b) in &self.links {
            degree[a] += 1;
            degree[b] += 1;
        }
        degree
    }
}

type HeapEntry = Reverse<(OrderedFloat<f64>, usize, usize)>;

/// Minimum spanning tree of `points`, grown from the first point.
///
/// Candidate edges live in a binary min-heap keyed by cost (then by endpoint indices, which
/// makes ties deterministic). An edge whose far end is already in the tree is discarded when
/// popped. Duplicate points are joined by zero-cost edges.
#[must_use]
pub fn prims(points: &[Loc]) -> SpanningTree {
    let n = points.len();
    let mut tree = SpanningTree::default();
    if n < 2 {
        return tree;
    }

    let mut visited = BitVec::from_elem(n, false);
    let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::with_capacity(n);

    let push_edges = |heap: &mut BinaryHeap<HeapEntry>, visited: &BitVec, from: usize| {
        for to in 0..n {
            if !visited[to] {
                let cost = points[from].distance(&points[to]);
                heap.push(Reverse((OrderedFloat(cost), from, to)));
            }
        }
    };

    visited.set(0, true);
    let mut visited_count = 1;
    push_edges(&mut heap, &visited, 0);

    while visited_count < n {
        let Some(Reverse((OrderedFloat(cost), from, to))) = heap.pop() else {
            break;
        };
        if visited[to] {
            continue;
        }

        visited.set(to, true);
        visited_count += 1;
        tree.cost += cost;
        tree.edges.push(Edge {
            from: points[from],
            to: points[to],
            cost,
        });
        tree.links.push((from, to));

        push_edges(&mut heap, &visited, to);
    }

    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power_plant::loc::{random_plants, EXAMPLE_PLANTS};
    use itertools::Itertools;

    /// Kruskal with a naive union-find, used as the reference.
    fn kruskal_cost(points: &[Loc]) -> f64 {
        let n = points.len();
        let mut parent: Vec<usize> = (0..n).collect();
        fn find(parent: &mut [usize], mut v: usize) -> usize {
            while parent[v] != v {
                parent[v] = parent[parent[v]];
                v = parent[v];
            }
            v
        }

        let edges = (0..n)
            .tuple_combinations()
            .map(|(a, b)| (points[a].distance(&points[b]), a, b))
            .sorted_by(|x, y| x.0.total_cmp(&y.0))
            .collect_vec();

        let mut cost = 0.0;
        for (w, a, b) in edges {
            let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
            if ra != rb {
                parent[ra] = rb;
                cost += w;
            }
        }
        cost
    }

    #[test]
    fn test_prims_example() {
        let tree = prims(&EXAMPLE_PLANTS);

        assert_eq!(tree.edges.len(), 7);
        assert!((tree.cost - 59.674_644_608_190_39).abs() < 1e-9);
        assert_eq!(
            tree.links,
            vec![(0, 2), (2, 4), (4, 1), (2, 3), (4, 6), (6, 7), (7, 5)]
        );
        assert_eq!(tree.edges[0].from, Loc::new(12.0, 22.0));
        assert_eq!(tree.edges[0].to, Loc::new(18.0, 30.0));
        assert!((tree.edges[0].cost - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_cost_is_sum_of_edges() {
        let tree = prims(&EXAMPLE_PLANTS);
        let sum: f64 = tree.edges.iter().map(|e| e.cost).sum();
        assert!((tree.cost - sum).abs() < 1e-9);
    }

    #[test]
    fn test_matches_kruskal_on_random_instances() {
        let mut rng = fastrand::Rng::with_seed(1234);
        for n in 0..25 {
            let points = random_plants(&mut rng, n, 60);
            let tree = prims(&points);
            assert_eq!(tree.edges.len(), n.saturating_sub(1));
            assert!((tree.cost - kruskal_cost(&points)).abs() < 1e-6, "n = {n}");
        }
    }

    #[test]
    fn test_tree_spans_every_point() {
        let tree = prims(&EXAMPLE_PLANTS);
        let degree = tree.degree(EXAMPLE_PLANTS.len());
        assert!(degree.iter().all(|&d| d > 0));
        assert_eq!(degree.iter().sum::<usize>(), 2 * tree.links.len());
    }

    #[test]
    fn test_trivial_inputs() {
        assert_eq!(prims(&[]), SpanningTree::default());
        assert_eq!(prims(&[Loc::new(1.0, 1.0)]), SpanningTree::default());
    }

    #[test]
    fn test_duplicate_points() {
        let tree = prims(&[Loc::new(1.0, 1.0), Loc::new(1.0, 1.0), Loc::new(4.0, 5.0)]);
        assert_eq!(tree.edges.len(), 2);
        assert!((tree.cost - 5.0).abs() < 1e-12);
    }
}
