//! Approximate Steiner trees connecting the power plants.
//!
//! A Steiner tree may route through junction points that are not plants, which can make it
//! shorter than the minimum spanning tree. Two heuristics are provided, both drawing their
//! junction candidates from the centroids of the Delaunay triangles of the plants:
//!
//! - `Centroid`: greedily insert a candidate whenever the spanning tree including it gets
//!   cheaper, then drop junctions that ended up with two or fewer connections.
//! - `Kmb`: Kou-Markowsky-Berman on the junction graph, the triangulation of plants and
//!   candidates restricted to edges touching a candidate. A spanning tree over the metric closure
//!   of the plants is expanded back into shortest paths, re-spanned and pruned of junction
//!   leaves; the junctions it keeps are then connected to the plants with straight edges.
//!
//! Both fall back to the plain spanning tree when no junction helps.

use crate::error::{KataError, Result};
use crate::power_plant::delaunay::{triangle_edges, triangulate};
use crate::power_plant::graph::{metric_closure, minimum_spanning_tree, Graph};
use crate::power_plant::loc::{centroid, Loc};
use crate::power_plant::prims::{prims, SpanningTree};
use bit_vec::BitVec;
use clap::ValueEnum;
use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt::Display;

/// Heuristic used to pick Steiner points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum SteinerMethod {
    /// Greedy insertion of triangle centroids.
    #[default]
    Centroid,
    /// Kou-Markowsky-Berman over the triangulation graph.
    Kmb,
}

impl Display for SteinerMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Centroid => write!(f, "Centroid insertion"),
            Self::Kmb => write!(f, "Kou-Markowsky-Berman"),
        }
    }
}

/// Options for [`euclidean_steiner`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SteinerConfig {
    /// Heuristic used to find Steiner points.
    pub method: SteinerMethod,
    /// Insertion rounds for the centroid method; each round re-triangulates.
    pub rounds: usize,
    /// Minimum saving for a candidate to be accepted.
    pub tolerance: f64,
}

impl Default for SteinerConfig {
    fn default() -> Self {
        Self {
            method: SteinerMethod::default(),
            rounds: 1,
            tolerance: 1e-9,
        }
    }
}

/// A tree over the plants and the Steiner points it uses.
#[derive(Debug, Clone, PartialEq)]
pub struct SteinerSolution {
    /// The plants, followed by the Steiner points.
    pub nodes: Vec<Loc>,
    /// Junctions kept in the tree, the tail of `nodes`.
    pub steiner_points: Vec<Loc>,
    /// Tree spanning `nodes`.
    pub tree: SpanningTree,
    /// Cost of the minimum spanning tree over the plants alone.
    pub baseline: f64,
}

impl SteinerSolution {
    /// How much shorter the tree is than the plain minimum spanning tree.
    #[must_use]
    pub fn saving(&self) -> f64 {
        self.baseline - self.tree.cost
    }

    fn spanning(plants: &[Loc], baseline: SpanningTree) -> Self {
        Self {
            nodes: plants.to_vec(),
            steiner_points: Vec::new(),
            baseline: baseline.cost,
            tree: baseline,
        }
    }
}

/// Centroids of the Delaunay triangles of `nodes` that do not coincide with a node.
#[must_use]
pub fn centroid_candidates(nodes: &[Loc]) -> Vec<Loc> {
    let existing: FxHashSet<Loc> = nodes.iter().copied().collect();
    triangulate(nodes)
        .into_iter()
        .map(|[a, b, c]| centroid(nodes[a], nodes[b], nodes[c]))
        .filter(|c| !existing.contains(c))
        .unique()
        .collect()
}

/// Connects `plants` with an approximate Steiner tree.
///
/// The result never costs more than the minimum spanning tree of the plants.
///
/// # Errors
///
/// `KataError::EmptyInstance` if there are no plants.
pub fn euclidean_steiner(plants: &[Loc], config: &SteinerConfig) -> Result<SteinerSolution> {
    if plants.is_empty() {
        return Err(KataError::EmptyInstance("plants"));
    }

    let baseline = prims(plants);
    let solution = match config.method {
        SteinerMethod::Centroid => centroid_insertion(plants, config, baseline),
        SteinerMethod::Kmb => kmb_on_triangulation(plants, config, baseline),
    };

    Ok(solution)
}

fn centroid_insertion(plants: &[Loc], config: &SteinerConfig, baseline: SpanningTree) -> SteinerSolution {
    let mut nodes = plants.to_vec();
    let mut best = baseline.clone();

    for _ in 0..config.rounds {
        let mut accepted = false;

        for candidate in centroid_candidates(&nodes) {
            nodes.push(candidate);
            let trial = prims(&nodes);
            if trial.cost < best.cost - config.tolerance {
                best = trial;
                accepted = true;
            } else {
                nodes.pop();
            }
        }

        if !accepted {
            break;
        }
    }

    let (nodes, tree) = prune_junctions(plants.len(), nodes, best);
    SteinerSolution {
        steiner_points: nodes[plants.len()..].to_vec(),
        nodes,
        tree,
        baseline: baseline.cost,
    }
}

/// Removes Steiner points with at most two tree edges, re-spanning after each removal.
///
/// Replacing a junction of degree two by the direct edge between its neighbours is never longer,
/// so the tree cost does not grow.
fn prune_junctions(
    terminals: usize,
    mut nodes: Vec<Loc>,
    mut tree: SpanningTree,
) -> (Vec<Loc>, SpanningTree) {
    loop {
        let degree = tree.degree(nodes.len());
        let Some(idx) = (terminals..nodes.len()).find(|&i| degree[i] <= 2) else {
            return (nodes, tree);
        };
        nodes.remove(idx);
        tree = prims(&nodes);
    }
}

fn kmb_on_triangulation(plants: &[Loc], config: &SteinerConfig, baseline: SpanningTree) -> SteinerSolution {
    let mut points = plants.to_vec();
    points.extend(centroid_candidates(plants));

    // Junction graph: triangulation edges with at least one centroid end, so plants can only
    // reach each other through junctions.
    let mut links: FxHashSet<(usize, usize)> = triangle_edges(&triangulate(&points))
        .into_iter()
        .filter(|&(a, b)| a >= plants.len() || b >= plants.len())
        .collect();

    // Repeated points are only triangulated once; tie each copy to its first occurrence.
    let mut first_seen: FxHashMap<Loc, usize> = FxHashMap::default();
    for (i, &p) in points.iter().enumerate() {
        let first = *first_seen.entry(p).or_insert(i);
        if first != i {
            links.insert((first, i));
        }
    }

    let mut graph = Graph::new(points.len());
    for (a, b) in links.into_iter().sorted() {
        graph.add_edge(a, b, points[a].distance(&points[b]));
    }

    let terminals = (0..plants.len()).collect_vec();
    let junctions: Vec<Loc> = steiner_tree(&graph, &terminals)
        .edges
        .iter()
        .flat_map(|&(a, b, _)| [a, b])
        .filter(|&v| v >= plants.len())
        .sorted()
        .dedup()
        .map(|v| points[v])
        .collect();

    // Re-span plants and chosen junctions with straight edges; this is never longer than the
    // graph tree itself.
    let mut nodes = plants.to_vec();
    nodes.extend(junctions);
    let tree = prims(&nodes);
    let (nodes, tree) = prune_junctions(plants.len(), nodes, tree);

    if tree.cost >= baseline.cost - config.tolerance {
        return SteinerSolution::spanning(plants, baseline);
    }

    SteinerSolution {
        steiner_points: nodes[plants.len()..].to_vec(),
        nodes,
        tree,
        baseline: baseline.cost,
    }
}

/// A Steiner tree in a graph, as graph edges `(a, b, weight)`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GraphSteinerTree {
    /// Total weight of `edges`.
    pub cost: f64,
    /// Tree edges as `(a, b, weight)`.
    pub edges: Vec<(usize, usize, f64)>,
}

/// Kou-Markowsky-Berman 2-approximation of the Steiner tree connecting `terminals`.
///
/// Terminals in different components are connected within their component only.
#[must_use]
pub fn steiner_tree(graph: &Graph, terminals: &[usize]) -> GraphSteinerTree {
    if terminals.len() < 2 {
        return GraphSteinerTree::default();
    }

    let (closure, paths) = metric_closure(graph, terminals);

    let mut expanded: FxHashSet<(usize, usize)> = FxHashSet::default();
    for (i, j, _) in minimum_spanning_tree(&closure) {
        if let Some(path) = paths[i].path_to(terminals[j]) {
            expanded.extend(path.iter().tuple_windows().map(|(&a, &b)| (a.min(b), a.max(b))));
        }
    }

    let mut subgraph = Graph::new(graph.len());
    for (a, b) in expanded.into_iter().sorted() {
        let weight = graph
            .neighbours(a)
            .filter(|&(v, _)| v == b)
            .map(|(_, w)| w)
            .fold(f64::INFINITY, f64::min);
        subgraph.add_edge(a, b, weight);
    }

    let mut edges = minimum_spanning_tree(&subgraph);

    let mut is_terminal = BitVec::from_elem(graph.len(), false);
    for &t in terminals {
        is_terminal.set(t, true);
    }

    // Strip junction leaves until every leaf is a terminal.
    loop {
        let mut degree = vec![0usize; graph.len()];
        for &(a, b, _) in &edges {
            degree[a] += 1;
            degree[b] += 1;
        }
        let before = edges.len();
        edges.retain(|&(a, b, _)| {
            let leaf = |v: usize| degree[v] == 1 && !is_terminal[v];
            !leaf(a) && !leaf(b)
        });
        if edges.len() == before {
            break;
        }
    }

    GraphSteinerTree {
        cost: edges.iter().map(|&(_, _, w)| w).sum(),
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power_plant::loc::{random_plants, EXAMPLE_PLANTS};

    fn tree_length(solution: &SteinerSolution) -> f64 {
        solution
            .tree
            .links
            .iter()
            .map(|&(a, b)| solution.nodes[a].distance(&solution.nodes[b]))
            .sum()
    }

    fn assert_valid(plants: &[Loc], solution: &SteinerSolution) {
        assert_eq!(&solution.nodes[..plants.len()], plants);
        assert_eq!(&solution.nodes[plants.len()..], &solution.steiner_points[..]);
        assert!(solution.tree.cost <= solution.baseline + 1e-9);
        assert!((solution.tree.cost - tree_length(solution)).abs() < 1e-6);
        if plants.len() > 1 {
            let degree = solution.tree.degree(solution.nodes.len());
            assert!(degree.iter().all(|&d| d > 0), "disconnected node");
            assert_eq!(solution.tree.links.len(), solution.nodes.len() - 1);
        }
    }

    /// Three corners of an equilateral triangle: the Fermat point saves about 13%.
    fn equilateral() -> Vec<Loc> {
        vec![
            Loc::new(0.0, 0.0),
            Loc::new(10.0, 0.0),
            Loc::new(5.0, 75f64.sqrt()),
        ]
    }

    #[test]
    fn test_centroid_on_equilateral_triangle() {
        let plants = equilateral();
        let solution = euclidean_steiner(&plants, &SteinerConfig::default()).unwrap();

        assert_valid(&plants, &solution);
        assert_eq!(solution.steiner_points.len(), 1);
        assert!((solution.baseline - 20.0).abs() < 1e-9);
        assert!((solution.tree.cost - 3.0 * 10.0 / 3f64.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_kmb_on_equilateral_triangle() {
        let plants = equilateral();
        let config = SteinerConfig {
            method: SteinerMethod::Kmb,
            ..SteinerConfig::default()
        };
        let solution = euclidean_steiner(&plants, &config).unwrap();

        assert_valid(&plants, &solution);
        assert_eq!(solution.steiner_points.len(), 1);
        assert!(solution.saving() > 2.0);
    }

    #[test]
    fn test_example_plants_centroid() {
        let solution = euclidean_steiner(&EXAMPLE_PLANTS, &SteinerConfig::default()).unwrap();
        assert_valid(&EXAMPLE_PLANTS, &solution);
        assert!((solution.baseline - prims(&EXAMPLE_PLANTS).cost).abs() < 1e-12);
    }

    #[test]
    fn test_example_plants_more_rounds_never_worse() {
        let one = euclidean_steiner(&EXAMPLE_PLANTS, &SteinerConfig::default()).unwrap();
        let three = euclidean_steiner(
            &EXAMPLE_PLANTS,
            &SteinerConfig {
                rounds: 3,
                ..SteinerConfig::default()
            },
        )
        .unwrap();
        assert_valid(&EXAMPLE_PLANTS, &three);
        assert!(three.tree.cost <= one.tree.cost + 1e-9);
    }

    #[test]
    fn test_example_plants_kmb() {
        let config = SteinerConfig {
            method: SteinerMethod::Kmb,
            ..SteinerConfig::default()
        };
        let solution = euclidean_steiner(&EXAMPLE_PLANTS, &config).unwrap();
        assert_valid(&EXAMPLE_PLANTS, &solution);
    }

    #[test]
    fn test_random_instances_never_beat_by_spanning_tree() {
        let mut rng = fastrand::Rng::with_seed(5);
        for n in 1..16 {
            let plants = random_plants(&mut rng, n, 40);
            for method in [SteinerMethod::Centroid, SteinerMethod::Kmb] {
                let config = SteinerConfig {
                    method,
                    rounds: 2,
                    ..SteinerConfig::default()
                };
                let solution = euclidean_steiner(&plants, &config).unwrap();
                assert_valid(&plants, &solution);
            }
        }
    }

    #[test]
    fn test_junctions_have_three_or_more_links() {
        let solution = euclidean_steiner(&EXAMPLE_PLANTS, &SteinerConfig::default()).unwrap();
        let degree = solution.tree.degree(solution.nodes.len());
        assert!(degree[EXAMPLE_PLANTS.len()..].iter().all(|&d| d >= 3));
    }

    #[test]
    fn test_empty_plants() {
        assert!(matches!(
            euclidean_steiner(&[], &SteinerConfig::default()),
            Err(KataError::EmptyInstance(_))
        ));
    }

    #[test]
    fn test_graph_steiner_tree_star() {
        // Terminals 0, 1, 2 around hub 3; going through the hub beats every direct edge.
        let mut graph = Graph::new(4);
        for t in 0..3 {
            graph.add_edge(t, 3, 1.0);
        }
        graph.add_edge(0, 1, 2.1);
        graph.add_edge(1, 2, 2.1);
        graph.add_edge(0, 2, 2.1);

        let tree = steiner_tree(&graph, &[0, 1, 2]);
        assert!((tree.cost - 3.0).abs() < 1e-12);
        assert_eq!(tree.edges.len(), 3);
        assert!(tree.edges.iter().all(|&(a, b, _)| a == 3 || b == 3));
    }

    #[test]
    fn test_graph_steiner_tree_keeps_short_direct_edges() {
        // Direct terminal edges shorter than the two hops through the hub: the hub is never used.
        let mut graph = Graph::new(4);
        for t in 0..3 {
            graph.add_edge(t, 3, 1.0);
        }
        graph.add_edge(0, 1, 1.9);
        graph.add_edge(1, 2, 1.9);
        graph.add_edge(0, 2, 1.9);

        let tree = steiner_tree(&graph, &[0, 1, 2]);
        assert!((tree.cost - 3.8).abs() < 1e-12);
        assert_eq!(tree.edges.len(), 2);
        assert!(tree.edges.iter().all(|&(a, b, _)| a != 3 && b != 3));
    }

    #[test]
    fn test_graph_steiner_tree_prunes_junction_leaves() {
        // Path 0 - 1 - 2 with a dangling junction 3 off vertex 1.
        let mut graph = Graph::new(4);
        graph.add_edge(0, 1, 1.0);
        graph.add_edge(1, 2, 1.0);
        graph.add_edge(1, 3, 0.1);

        let tree = steiner_tree(&graph, &[0, 2]);
        assert!((tree.cost - 2.0).abs() < 1e-12);
        assert!(tree.edges.iter().all(|&(a, b, _)| a != 3 && b != 3));
    }

    #[test]
    fn test_graph_steiner_tree_trivial() {
        let graph = Graph::new(3);
        assert_eq!(steiner_tree(&graph, &[1]), GraphSteinerTree::default());
    }
}
