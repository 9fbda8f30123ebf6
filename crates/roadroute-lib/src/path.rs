use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{EdgeId, Graph, NodeIndex};

/// Budget applied to a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchLimits {
    /// Maximum number of nodes the search may expand.
    pub max_expansions: Option<usize>,
    /// Wall-clock budget for the search.
    pub timeout: Option<Duration>,
}

impl SearchLimits {
    /// No expansion or time limit.
    pub fn unbounded() -> Self {
        Self::default()
    }

    fn check(&self, algorithm: &'static str, expanded: usize, started: Instant) -> Result<()> {
        let over_expansions = self.max_expansions.is_some_and(|max| expanded > max);
        let over_time = self
            .timeout
            .is_some_and(|timeout| started.elapsed() > timeout);
        if over_expansions || over_time {
            return Err(Error::SearchLimitExceeded {
                algorithm,
                expanded,
            });
        }
        Ok(())
    }
}

/// How a node was reached during a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Predecessor {
    pub node: NodeIndex,
    /// Edge used for the hop; `None` falls back to the first matching record.
    pub edge: Option<EdgeId>,
}

/// Result of a single-source search: predecessor map plus the best known
/// cost of every labelled node.
///
/// The source carries a cost of zero but never a predecessor.
#[derive(Debug, Clone, Default)]
pub struct SearchTree {
    pub predecessors: HashMap<NodeIndex, Predecessor>,
    pub costs: HashMap<NodeIndex, f64>,
    /// Number of nodes taken off the queue and expanded.
    pub expanded: usize,
}

impl SearchTree {
    pub fn predecessor(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.predecessors.get(&node).map(|pred| pred.node)
    }

    pub fn cost(&self, node: NodeIndex) -> Option<f64> {
        self.costs.get(&node).copied()
    }

    /// Predecessor map expressed with node identifiers.
    pub fn predecessor_ids(&self, graph: &Graph) -> HashMap<String, String> {
        self.predecessors
            .iter()
            .filter_map(|(node, pred)| {
                let node = graph.node(*node)?;
                let pred = graph.node(pred.node)?;
                Some((node.id.clone(), pred.id.clone()))
            })
            .collect()
    }
}

/// One traversed edge of a reconstructed path.
#[derive(Debug, Clone, PartialEq)]
pub struct PathEdge {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub edge: EdgeId,
    pub weight: f64,
    pub label: String,
}

/// Run Dijkstra's algorithm from `start` over the whole reachable graph.
///
/// Uses lazy deletion: outdated queue entries are skipped when popped
/// instead of being decreased in place.
pub fn dijkstra(graph: &Graph, start: NodeIndex, limits: &SearchLimits) -> Result<SearchTree> {
    let mut tree = SearchTree::default();
    if graph.node(start).is_none() {
        return Ok(tree);
    }

    let started = Instant::now();
    let mut queue = BinaryHeap::new();
    tree.costs.insert(start, 0.0);
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        let current_cost = match tree.costs.get(&entry.node) {
            Some(cost) if *cost < entry.cost.0 => continue,
            Some(cost) => *cost,
            None => continue,
        };

        tree.expanded += 1;
        limits.check("dijkstra", tree.expanded, started)?;

        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            let next_cost = current_cost + edge.weight;
            if next_cost < tree.cost(next).unwrap_or(f64::INFINITY) {
                tree.costs.insert(next, next_cost);
                tree.predecessors.insert(
                    next,
                    Predecessor {
                        node: entry.node,
                        edge: Some(edge.id),
                    },
                );
                queue.push(QueueEntry::new(next, next_cost));
            }
        }
    }

    debug!(start, expanded = tree.expanded, "dijkstra finished");
    Ok(tree)
}

/// Run A* from `start` towards `goal` using the great-circle distance to the
/// goal as heuristic.
///
/// A node is closed once it has been expanded and is never re-opened, even
/// if a cheaper route to it shows up later. That is only sound because the
/// haversine heuristic is consistent (`h(u) <= w(u, v) + h(v)`) whenever
/// edge weights are at least the great-circle length of the edge. Ties on
/// `f` go to the node with the lower index.
///
/// When the goal is unreachable the open set drains and the partial tree is
/// returned; callers detect failure by the goal's missing predecessor.
pub fn a_star(
    graph: &Graph,
    start: NodeIndex,
    goal: NodeIndex,
    limits: &SearchLimits,
) -> Result<SearchTree> {
    let mut tree = SearchTree::default();
    let (Some(start_node), Some(goal_node)) = (graph.node(start), graph.node(goal)) else {
        return Ok(tree);
    };
    tree.costs.insert(start, 0.0);
    if start == goal {
        return Ok(tree);
    }

    let heuristic = |node: NodeIndex| {
        graph
            .node(node)
            .map(|node| node.distance_to(goal_node))
            .unwrap_or(0.0)
    };

    let started = Instant::now();
    let mut closed: HashSet<NodeIndex> = HashSet::new();
    let mut open = BinaryHeap::new();
    open.push(AStarEntry::new(start, 0.0, start_node.distance_to(goal_node)));

    while let Some(entry) = open.pop() {
        if closed.contains(&entry.node) {
            continue;
        }
        let current_score = match tree.costs.get(&entry.node) {
            Some(score) if *score < entry.cost.0 => continue,
            Some(score) => *score,
            None => continue,
        };

        if entry.node == goal {
            debug!(start, goal, expanded = tree.expanded, "a-star reached goal");
            return Ok(tree);
        }

        closed.insert(entry.node);
        tree.expanded += 1;
        limits.check("a-star", tree.expanded, started)?;

        for edge in graph.neighbours(entry.node) {
            let next = edge.target;
            if closed.contains(&next) {
                continue;
            }

            let tentative_g = current_score + edge.weight;
            if tentative_g < tree.cost(next).unwrap_or(f64::INFINITY) {
                tree.costs.insert(next, tentative_g);
                tree.predecessors.insert(
                    next,
                    Predecessor {
                        node: entry.node,
                        edge: Some(edge.id),
                    },
                );
                open.push(AStarEntry::new(next, tentative_g, heuristic(next)));
            }
        }
    }

    debug!(start, goal, expanded = tree.expanded, "a-star drained open set");
    Ok(tree)
}

/// Walk the predecessor chain back from `end` and return the traversed
/// edges in `start -> end` order.
///
/// Empty when `end` is unreachable or equal to `start`. A hop whose edge is
/// no longer present in the graph is an invariant violation.
pub fn reconstruct(
    graph: &Graph,
    tree: &SearchTree,
    start: NodeIndex,
    end: NodeIndex,
) -> Result<Vec<PathEdge>> {
    let mut path = Vec::new();
    let mut current = end;

    while current != start {
        let Some(pred) = tree.predecessors.get(&current) else {
            return Ok(Vec::new());
        };
        let record = match pred.edge {
            Some(id) => graph.edge_between(pred.node, current, id),
            None => graph.first_edge_between(pred.node, current),
        };
        let Some(record) = record else {
            return Err(Error::MissingEdge {
                from: node_name(graph, pred.node),
                to: node_name(graph, current),
            });
        };

        path.push(PathEdge {
            from: pred.node,
            to: current,
            edge: record.id,
            weight: record.weight,
            label: record.label.clone(),
        });
        current = pred.node;
    }

    path.reverse();
    Ok(path)
}

fn node_name(graph: &Graph, idx: NodeIndex) -> String {
    graph
        .node(idx)
        .map(|node| node.id.clone())
        .unwrap_or_else(|| format!("#{idx}"))
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeIndex,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeIndex, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct AStarEntry {
    node: NodeIndex,
    cost: FloatOrd,
    estimate: FloatOrd,
}

impl AStarEntry {
    fn new(node: NodeIndex, cost: f64, heuristic: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
            estimate: FloatOrd(cost + heuristic),
        }
    }
}

impl Ord for AStarEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .estimate
            .cmp(&self.estimate)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for AStarEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Small grid-ish network where weights are the real great-circle
    /// lengths, so the A* heuristic is consistent.
    fn street_graph() -> Graph {
        let mut graph = Graph::new();
        let coords = [
            ("a", 0.000, 0.000),
            ("b", 0.001, 0.000),
            ("c", 0.002, 0.000),
            ("d", 0.000, 0.001),
            ("e", 0.001, 0.001),
            ("f", 0.002, 0.001),
        ];
        for (id, x, y) in coords {
            graph.add_node(id, x, y);
        }
        for (u, v) in [
            ("a", "b"),
            ("b", "c"),
            ("a", "d"),
            ("d", "e"),
            ("e", "f"),
            ("b", "e"),
            ("c", "f"),
        ] {
            let w = {
                let un = graph.node_by_id(u).unwrap();
                let vn = graph.node_by_id(v).unwrap();
                un.distance_to(vn)
            };
            graph.add_edge(u, v, w, format!("{u}-{v}")).unwrap();
        }
        graph
    }

    fn idx(graph: &Graph, id: &str) -> NodeIndex {
        graph.node_index(id).unwrap()
    }

    #[test]
    fn dijkstra_labels_every_reachable_node() {
        let graph = street_graph();
        let tree = dijkstra(&graph, idx(&graph, "a"), &SearchLimits::unbounded()).unwrap();
        assert_eq!(tree.costs.len(), 6);
        assert_eq!(tree.predecessors.len(), 5, "source has no predecessor");
        assert!(tree.predecessor(idx(&graph, "a")).is_none());
        assert_eq!(tree.cost(idx(&graph, "a")), Some(0.0));
    }

    #[test]
    fn a_star_matches_dijkstra_cost() {
        let graph = street_graph();
        let limits = SearchLimits::unbounded();
        let (a, f) = (idx(&graph, "a"), idx(&graph, "f"));
        let full = dijkstra(&graph, a, &limits).unwrap();
        let guided = a_star(&graph, a, f, &limits).unwrap();
        let expected = full.cost(f).unwrap();
        let found = guided.cost(f).unwrap();
        assert!((expected - found).abs() < 1e-9);
    }

    #[test]
    fn a_star_stops_at_goal() {
        let graph = street_graph();
        let limits = SearchLimits::unbounded();
        let (a, b) = (idx(&graph, "a"), idx(&graph, "b"));
        let guided = a_star(&graph, a, b, &limits).unwrap();
        let full = dijkstra(&graph, a, &limits).unwrap();
        assert!(guided.expanded < full.expanded);
        assert_eq!(guided.predecessor(b), Some(a));
    }

    #[test]
    fn reconstruct_walks_back_to_start() {
        let graph = street_graph();
        let (a, c) = (idx(&graph, "a"), idx(&graph, "c"));
        let tree = dijkstra(&graph, a, &SearchLimits::unbounded()).unwrap();
        let path = reconstruct(&graph, &tree, a, c).unwrap();
        let labels: Vec<_> = path.iter().map(|hop| hop.label.as_str()).collect();
        assert_eq!(labels, vec!["a-b", "b-c"]);
        let total: f64 = path.iter().map(|hop| hop.weight).sum();
        assert!((total - tree.cost(c).unwrap()).abs() < 1e-9);
    }

    #[test]
    fn reconstruct_same_node_is_empty() {
        let graph = street_graph();
        let a = idx(&graph, "a");
        let tree = a_star(&graph, a, a, &SearchLimits::unbounded()).unwrap();
        assert!(reconstruct(&graph, &tree, a, a).unwrap().is_empty());
    }

    #[test]
    fn unreachable_goal_drains_and_yields_empty_path() {
        let mut graph = street_graph();
        graph.add_node("island", 1.0, 1.0);
        let (a, island) = (idx(&graph, "a"), idx(&graph, "island"));
        let tree = a_star(&graph, a, island, &SearchLimits::unbounded()).unwrap();
        assert!(tree.predecessor(island).is_none());
        assert_eq!(tree.expanded, 6, "every reachable node is expanded once");
        assert!(reconstruct(&graph, &tree, a, island).unwrap().is_empty());
    }

    #[test]
    fn unknown_start_yields_empty_tree() {
        let graph = street_graph();
        let tree = dijkstra(&graph, 999, &SearchLimits::unbounded()).unwrap();
        assert!(tree.costs.is_empty());
        let tree = a_star(&graph, 0, 999, &SearchLimits::unbounded()).unwrap();
        assert!(tree.costs.is_empty());
    }

    #[test]
    fn expansion_budget_is_enforced() {
        let graph = street_graph();
        let limits = SearchLimits {
            max_expansions: Some(2),
            timeout: None,
        };
        let err = dijkstra(&graph, idx(&graph, "a"), &limits).unwrap_err();
        assert!(matches!(
            err,
            Error::SearchLimitExceeded {
                algorithm: "dijkstra",
                expanded: 3
            }
        ));
    }

    #[test]
    fn reconstruct_detects_missing_edge() {
        let mut graph = street_graph();
        let (a, b) = (idx(&graph, "a"), idx(&graph, "b"));
        let tree = dijkstra(&graph, a, &SearchLimits::unbounded()).unwrap();
        let weight = graph.first_edge_between(a, b).unwrap().weight;
        assert!(graph.remove_edge("a", "b", weight).unwrap().is_some());
        let err = reconstruct(&graph, &tree, a, b).unwrap_err();
        assert!(matches!(err, Error::MissingEdge { .. }));
    }

    #[test]
    fn predecessor_ids_use_node_identifiers() {
        let graph = street_graph();
        let tree = dijkstra(&graph, idx(&graph, "a"), &SearchLimits::unbounded()).unwrap();
        let ids = tree.predecessor_ids(&graph);
        assert_eq!(ids.get("b").map(String::as_str), Some("a"));
        assert!(!ids.contains_key("a"));
    }
}
