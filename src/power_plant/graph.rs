//! Undirected weighted graphs with shortest paths and spanning trees.
//!
//! These are the building blocks of the metric-closure Steiner heuristic: Dijkstra from every
//! terminal gives the closure distances, a spanning tree over the closure picks which shortest
//! paths to keep.

use crate::power_plant::loc::Loc;
use bit_vec::BitVec;
use itertools::Itertools;
use ordered_float::OrderedFloat;
use smallvec::SmallVec;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

type Adjacency = SmallVec<[(usize, f64); 8]>;

/// An undirected graph on vertices `0..len()` with non-negative edge weights.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    adjacency: Vec<Adjacency>,
}

impl Graph {
    /// `n` vertices and no edges.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            adjacency: vec![Adjacency::new(); n],
        }
    }

    /// The complete graph on `points` weighted by Euclidean distance.
    #[must_use]
    pub fn complete(points: &[Loc]) -> Self {
        let mut graph = Self::new(points.len());
        for (a, b) in (0..points.len()).tuple_combinations() {
            graph.add_edge(a, b, points[a].distance(&points[b]));
        }
        graph
    }

    /// Adds an undirected edge. Self loops are ignored.
    ///
    /// # Panics
    ///
    /// If either endpoint is not a vertex of the graph.
    pub fn add_edge(&mut self, a: usize, b: usize, weight: f64) {
        assert!(a < self.len() && b < self.len(), "edge ({a}, {b}) out of range");
        if a == b {
            return;
        }
        self.adjacency[a].push((b, weight));
        self.adjacency[b].push((a, weight));
    }

    /// Number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    /// Whether the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Neighbours of `v` with the weight of the connecting edge.
    ///
    /// # Panics
    ///
    /// If `v` is not a vertex of the graph.
    pub fn neighbours(&self, v: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.adjacency[v].iter().copied()
    }

    /// Every edge once, as `(a, b, weight)` with `a < b`.
    #[must_use]
    pub fn edges(&self) -> Vec<(usize, usize, f64)> {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(a, adj)| {
                adj.iter()
                    .filter(move |&&(b, _)| a < b)
                    .map(move |&(b, w)| (a, b, w))
            })
            .collect()
    }

    /// Sum of all edge weights.
    #[must_use]
    pub fn total_weight(&self) -> f64 {
        self.edges().iter().map(|&(_, _, w)| w).sum()
    }
}

/// Single-source shortest path tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortestPaths {
    /// Vertex the paths start from.
    pub source: usize,
    /// Distance from the source, `f64::INFINITY` when unreachable.
    pub dist: Vec<f64>,
    /// Predecessor on a shortest path from the source.
    pub prev: Vec<Option<usize>>,
}

impl ShortestPaths {
    /// Vertices on the shortest path from the source to `target`, both included.
    #[must_use]
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        if !self.dist.get(target)?.is_finite() {
            return None;
        }

        let mut path = vec![target];
        let mut current = target;
        while current != self.source {
            current = self.prev[current]?;
            path.push(current);
        }
        path.reverse();
        Some(path)
    }
}

/// Dijkstra's algorithm with a binary heap and lazy deletion.
///
/// # Panics
///
/// If `source` is not a vertex of `graph`.
#[must_use]
pub fn dijkstra(graph: &Graph, source: usize) -> ShortestPaths {
    let n = graph.len();
    let mut dist = vec![f64::INFINITY; n];
    let mut prev = vec![None; n];
    let mut settled = BitVec::from_elem(n, false);
    let mut heap = BinaryHeap::new();

    dist[source] = 0.0;
    heap.push(Reverse((OrderedFloat(0.0), source)));

    while let Some(Reverse((OrderedFloat(d), v))) = heap.pop() {
        if settled[v] {
            continue;
        }
        settled.set(v, true);

        for (u, w) in graph.neighbours(v) {
            let candidate = d + w;
            if candidate < dist[u] {
                dist[u] = candidate;
                prev[u] = Some(v);
                heap.push(Reverse((OrderedFloat(candidate), u)));
            }
        }
    }

    ShortestPaths { source, dist, prev }
}

/// Shortest paths from every vertex.
#[must_use]
pub fn all_pairs_shortest_paths(graph: &Graph) -> Vec<ShortestPaths> {
    (0..graph.len()).map(|v| dijkstra(graph, v)).collect()
}

/// The metric closure of `graph` restricted to `terminals`.
///
/// Vertex `i` of the returned graph stands for `terminals[i]`; the edge weight between two
/// terminals is their shortest-path distance in `graph`. Unreachable pairs get no edge. The
/// shortest path trees rooted at each terminal are returned alongside, in terminal order.
#[must_use]
pub fn metric_closure(graph: &Graph, terminals: &[usize]) -> (Graph, Vec<ShortestPaths>) {
    let paths: Vec<ShortestPaths> = terminals.iter().map(|&t| dijkstra(graph, t)).collect();

    let mut closure = Graph::new(terminals.len());
    for (i, j) in (0..terminals.len()).tuple_combinations() {
        let d = paths[i].dist[terminals[j]];
        if d.is_finite() {
            closure.add_edge(i, j, d);
        }
    }

    (closure, paths)
}

/// Minimum spanning forest of `graph` (Prim's, restarted in every component).
#[must_use]
pub fn minimum_spanning_tree(graph: &Graph) -> Vec<(usize, usize, f64)> {
    let n = graph.len();
    let mut in_tree = BitVec::from_elem(n, false);
    let mut tree = Vec::with_capacity(n.saturating_sub(1));
    let mut heap = BinaryHeap::new();

    for root in 0..n {
        if in_tree[root] {
            continue;
        }
        in_tree.set(root, true);
        for (u, w) in graph.neighbours(root) {
            heap.push(Reverse((OrderedFloat(w), root, u)));
        }

        while let Some(Reverse((OrderedFloat(w), from, to))) = heap.pop() {
            if in_tree[to] {
                continue;
            }
            in_tree.set(to, true);
            tree.push((from, to, w));
            for (u, w) in graph.neighbours(to) {
                if !in_tree[u] {
                    heap.push(Reverse((OrderedFloat(w), to, u)));
                }
            }
        }
    }

    tree
}
