use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::geo::haversine_distance;

/// Stable handle of a node inside a [`Graph`] arena.
pub type NodeIndex = usize;

/// Identity shared by both halves of one undirected edge.
pub type EdgeId = u32;

/// One half of an undirected edge, stored on the adjacency list of its owner.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub target: NodeIndex,
    pub weight: f64,
    pub label: String,
}

/// Road network vertex.
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier, usually [`crate::geo::node_key`] of the coordinates.
    pub id: String,
    /// Longitude in degrees.
    pub x: f64,
    /// Latitude in degrees.
    pub y: f64,
    edges: Vec<Edge>,
}

impl Node {
    fn new(id: String, x: f64, y: f64) -> Self {
        Self {
            id,
            x,
            y,
            edges: Vec::new(),
        }
    }

    /// Adjacency list in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Great-circle distance to another node in metres.
    pub fn distance_to(&self, other: &Node) -> f64 {
        haversine_distance(self.y, self.x, other.y, other.x)
    }
}

/// An undirected edge detached from the graph, kept so it can be restored.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedEdge {
    pub id: EdgeId,
    pub a: NodeIndex,
    pub b: NodeIndex,
    pub weight: f64,
    pub label: String,
}

/// Order-independent description of one undirected edge, used to compare
/// graph contents before and after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSnapshot {
    pub a: String,
    pub b: String,
    pub weight: f64,
    pub label: String,
}

/// Undirected weighted multigraph with symmetric adjacency lists.
///
/// Nodes live in an arena addressed by [`NodeIndex`]; identifiers map to
/// indices through a side table. Every edge is stored twice, once on each
/// endpoint, and both records share the same [`EdgeId`].
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeIndex>,
    next_edge_id: EdgeId,
    edge_count: usize,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node unless one with the same identifier already exists.
    ///
    /// Re-inserting an existing identifier leaves the original coordinates
    /// untouched. Returns the index of the (new or existing) node.
    pub fn add_node(&mut self, id: impl Into<String>, x: f64, y: f64) -> NodeIndex {
        let id = id.into();
        if let Some(&existing) = self.index.get(&id) {
            return existing;
        }
        let idx = self.nodes.len();
        self.index.insert(id.clone(), idx);
        self.nodes.push(Node::new(id, x, y));
        idx
    }

    /// Connect two existing nodes with an undirected edge.
    ///
    /// Returns `Ok(None)` without touching the graph when either identifier
    /// is unknown. Parallel edges are never merged.
    pub fn add_edge(
        &mut self,
        src: &str,
        dst: &str,
        weight: f64,
        label: impl Into<String>,
    ) -> Result<Option<EdgeId>> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidWeight {
                from: src.to_string(),
                to: dst.to_string(),
                weight,
            });
        }
        let (Some(a), Some(b)) = (self.node_index(src), self.node_index(dst)) else {
            return Ok(None);
        };

        let id = self.next_edge_id;
        self.next_edge_id += 1;
        self.insert_edge(id, a, b, weight, label.into());
        Ok(Some(id))
    }

    /// Remove the first edge on `a` leading to `b` with exactly `weight`,
    /// together with its counterpart on `b`.
    ///
    /// Parallel edges of equal weight are interchangeable here; use
    /// [`Graph::remove_edge_by_id`] when the identity matters.
    pub fn remove_edge(&mut self, a: &str, b: &str, weight: f64) -> Result<Option<RemovedEdge>> {
        let (Some(ai), Some(bi)) = (self.node_index(a), self.node_index(b)) else {
            return Ok(None);
        };
        let Some(pos) = self.nodes[ai]
            .edges
            .iter()
            .position(|edge| edge.target == bi && edge.weight == weight)
        else {
            return Ok(None);
        };
        self.detach(ai, pos).map(Some)
    }

    /// Remove the edge `id` running between `a` and `b`.
    pub fn remove_edge_by_id(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        id: EdgeId,
    ) -> Result<Option<RemovedEdge>> {
        let Some(node) = self.nodes.get(a) else {
            return Ok(None);
        };
        let Some(pos) = node
            .edges
            .iter()
            .position(|edge| edge.id == id && edge.target == b)
        else {
            return Ok(None);
        };
        self.detach(a, pos).map(Some)
    }

    /// Remove every edge between `a` and `b` carrying exactly `weight`.
    ///
    /// Parallel twins of a route hop are indistinguishable from the hop by
    /// `(neighbour, weight)`, so an alternate search must not see any of them.
    pub fn remove_matching(
        &mut self,
        a: NodeIndex,
        b: NodeIndex,
        weight: f64,
    ) -> Result<Vec<RemovedEdge>> {
        let mut removed = Vec::new();
        while let Some(pos) = self.nodes.get(a).and_then(|node| {
            node.edges
                .iter()
                .position(|edge| edge.target == b && edge.weight == weight)
        }) {
            removed.push(self.detach(a, pos)?);
        }
        Ok(removed)
    }

    /// Put a previously removed edge back, keeping its identity.
    pub fn restore_edge(&mut self, removed: &RemovedEdge) {
        self.insert_edge(
            removed.id,
            removed.a,
            removed.b,
            removed.weight,
            removed.label.clone(),
        );
    }

    /// Return the node stored at `idx`.
    pub fn node(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx)
    }

    /// Lookup a node by its identifier.
    pub fn node_by_id(&self, id: &str) -> Option<&Node> {
        self.node_index(id).map(|idx| &self.nodes[idx])
    }

    /// Lookup the arena index for an identifier.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.index.get(id).copied()
    }

    /// Return the adjacency list for a node (empty for unknown indices).
    pub fn neighbours(&self, idx: NodeIndex) -> &[Edge] {
        self.nodes
            .get(idx)
            .map(|node| node.edges.as_slice())
            .unwrap_or(&[])
    }

    /// Iterate over all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of undirected edges currently present.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Find the record on `from` for edge `id` pointing at `to`.
    pub fn edge_between(&self, from: NodeIndex, to: NodeIndex, id: EdgeId) -> Option<&Edge> {
        self.neighbours(from)
            .iter()
            .find(|edge| edge.id == id && edge.target == to)
    }

    /// First record on `from` pointing at `to`, in insertion order.
    pub fn first_edge_between(&self, from: NodeIndex, to: NodeIndex) -> Option<&Edge> {
        self.neighbours(from).iter().find(|edge| edge.target == to)
    }

    /// Node closest to the given coordinates by great-circle distance.
    pub fn nearest_node(&self, lon: f64, lat: f64) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (idx, haversine_distance(lat, lon, node.y, node.x)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(idx, _)| idx)
    }

    /// Sorted list of every undirected edge, independent of adjacency order
    /// and edge identity.
    pub fn edge_multiset(&self) -> Vec<EdgeSnapshot> {
        let mut seen: HashSet<EdgeId> = HashSet::new();
        let mut snapshot = Vec::with_capacity(self.edge_count);
        for node in &self.nodes {
            for edge in &node.edges {
                if !seen.insert(edge.id) {
                    continue;
                }
                let other = &self.nodes[edge.target].id;
                let (a, b) = if node.id <= *other {
                    (node.id.clone(), other.clone())
                } else {
                    (other.clone(), node.id.clone())
                };
                snapshot.push(EdgeSnapshot {
                    a,
                    b,
                    weight: edge.weight,
                    label: edge.label.clone(),
                });
            }
        }
        snapshot.sort_by(compare_snapshots);
        snapshot
    }

    /// Verify that every edge record has exactly one matching counterpart.
    pub fn check_symmetry(&self) -> Result<()> {
        let mut halves: HashMap<EdgeId, Vec<(NodeIndex, &Edge)>> = HashMap::new();
        for (owner, node) in self.nodes.iter().enumerate() {
            for edge in &node.edges {
                halves.entry(edge.id).or_default().push((owner, edge));
            }
        }

        for (id, records) in halves {
            let (owner, edge) = records[0];
            let paired = match records.as_slice() {
                [(a, first), (b, second)] => {
                    first.target == *b
                        && second.target == *a
                        && first.weight == second.weight
                        && first.label == second.label
                }
                _ => false,
            };
            if !paired {
                return Err(Error::AsymmetricEdge {
                    node: self.nodes[owner].id.clone(),
                    neighbour: self.nodes[edge.target].id.clone(),
                    edge: id,
                });
            }
        }
        Ok(())
    }

    fn insert_edge(&mut self, id: EdgeId, a: NodeIndex, b: NodeIndex, weight: f64, label: String) {
        self.nodes[a].edges.push(Edge {
            id,
            target: b,
            weight,
            label: label.clone(),
        });
        self.nodes[b].edges.push(Edge {
            id,
            target: a,
            weight,
            label,
        });
        self.edge_count += 1;
    }

    /// Remove the record at `pos` on `a` and its counterpart on the target.
    ///
    /// The counterpart is located before anything is removed so a broken
    /// pairing leaves the graph as it was.
    fn detach(&mut self, a: NodeIndex, pos: usize) -> Result<RemovedEdge> {
        let edge = self.nodes[a].edges[pos].clone();
        let b = edge.target;
        let counterpart = self.nodes[b]
            .edges
            .iter()
            .enumerate()
            .position(|(i, other)| {
                other.id == edge.id && other.target == a && !(a == b && i == pos)
            });
        let Some(other_pos) = counterpart else {
            return Err(Error::AsymmetricEdge {
                node: self.nodes[a].id.clone(),
                neighbour: self.nodes[b].id.clone(),
                edge: edge.id,
            });
        };

        if a == b {
            // Self-loop: both halves share one list, drop the later one first.
            let (hi, lo) = if pos > other_pos {
                (pos, other_pos)
            } else {
                (other_pos, pos)
            };
            self.nodes[a].edges.remove(hi);
            self.nodes[a].edges.remove(lo);
        } else {
            self.nodes[a].edges.remove(pos);
            self.nodes[b].edges.remove(other_pos);
        }
        self.edge_count -= 1;

        Ok(RemovedEdge {
            id: edge.id,
            a,
            b,
            weight: edge.weight,
            label: edge.label,
        })
    }

    #[cfg(test)]
    pub(crate) fn corrupt_drop_half(&mut self, node: NodeIndex, pos: usize) {
        self.nodes[node].edges.remove(pos);
    }
}

fn compare_snapshots(a: &EdgeSnapshot, b: &EdgeSnapshot) -> Ordering {
    a.a.cmp(&b.a)
        .then_with(|| a.b.cmp(&b.b))
        .then_with(|| a.weight.total_cmp(&b.weight))
        .then_with(|| a.label.cmp(&b.label))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> Graph {
        let mut graph = Graph::new();
        graph.add_node("a", 0.0, 0.0);
        graph.add_node("b", 1.0, 0.0);
        graph.add_node("c", 0.0, 1.0);
        graph.add_edge("a", "b", 1.0, "Main St").unwrap();
        graph.add_edge("b", "c", 2.0, "").unwrap();
        graph.add_edge("c", "a", 3.0, "Oak Ave").unwrap();
        graph
    }

    #[test]
    fn add_node_is_idempotent() {
        let mut graph = Graph::new();
        let first = graph.add_node("a", 1.0, 2.0);
        let second = graph.add_node("a", 9.0, 9.0);
        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
        let node = graph.node_by_id("a").unwrap();
        assert_eq!((node.x, node.y), (1.0, 2.0));
    }

    #[test]
    fn add_edge_with_unknown_endpoint_is_noop() {
        let mut graph = triangle();
        let before = graph.edge_multiset();
        assert_eq!(graph.add_edge("a", "zzz", 1.0, "").unwrap(), None);
        assert_eq!(graph.add_edge("zzz", "a", 1.0, "").unwrap(), None);
        assert_eq!(graph.edge_multiset(), before);
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn add_edge_rejects_bad_weights() {
        let mut graph = triangle();
        for weight in [-1.0, f64::NAN, f64::INFINITY] {
            let err = graph.add_edge("a", "b", weight, "").unwrap_err();
            assert!(matches!(err, Error::InvalidWeight { .. }));
        }
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn edges_are_stored_symmetrically() {
        let graph = triangle();
        let a = graph.node_index("a").unwrap();
        let b = graph.node_index("b").unwrap();
        let ab = graph.first_edge_between(a, b).unwrap();
        let ba = graph.first_edge_between(b, a).unwrap();
        assert_eq!(ab.id, ba.id);
        assert_eq!(ab.weight, ba.weight);
        assert_eq!(ab.label, "Main St");
        assert_eq!(ba.label, "Main St");
        graph.check_symmetry().expect("symmetric");
    }

    #[test]
    fn parallel_edges_are_kept() {
        let mut graph = triangle();
        graph.add_edge("a", "b", 1.0, "Service Rd").unwrap();
        let a = graph.node_index("a").unwrap();
        let parallel = graph
            .neighbours(a)
            .iter()
            .filter(|edge| graph.node(edge.target).unwrap().id == "b")
            .count();
        assert_eq!(parallel, 2);
        assert_eq!(graph.edge_count(), 4);
    }

    #[test]
    fn remove_edge_matches_neighbour_and_weight() {
        let mut graph = triangle();
        assert!(graph.remove_edge("a", "b", 2.0).unwrap().is_none());

        let removed = graph.remove_edge("b", "a", 1.0).unwrap().expect("edge removed");
        assert_eq!(removed.label, "Main St");
        assert_eq!(graph.edge_count(), 2);
        let a = graph.node_index("a").unwrap();
        let b = graph.node_index("b").unwrap();
        assert!(graph.first_edge_between(a, b).is_none());
        assert!(graph.first_edge_between(b, a).is_none());
        graph.check_symmetry().expect("still symmetric");
    }

    #[test]
    fn remove_then_restore_preserves_multiset() {
        let mut graph = triangle();
        let before = graph.edge_multiset();
        let removed = graph.remove_edge("c", "a", 3.0).unwrap().unwrap();
        assert_ne!(graph.edge_multiset(), before);
        graph.restore_edge(&removed);
        assert_eq!(graph.edge_multiset(), before);
        graph.check_symmetry().unwrap();
    }

    #[test]
    fn remove_by_id_picks_the_exact_parallel_edge() {
        let mut graph = triangle();
        let twin = graph.add_edge("a", "b", 1.0, "Service Rd").unwrap().unwrap();
        let a = graph.node_index("a").unwrap();
        let b = graph.node_index("b").unwrap();

        let removed = graph.remove_edge_by_id(b, a, twin).unwrap().unwrap();
        assert_eq!(removed.label, "Service Rd");
        let left = graph.first_edge_between(a, b).unwrap();
        assert_eq!(left.label, "Main St");
    }

    #[test]
    fn remove_matching_takes_every_twin() {
        let mut graph = triangle();
        graph.add_edge("a", "b", 1.0, "Service Rd").unwrap();
        graph.add_edge("a", "b", 4.0, "Bypass").unwrap();
        let before = graph.edge_multiset();
        let a = graph.node_index("a").unwrap();
        let b = graph.node_index("b").unwrap();

        let removed = graph.remove_matching(a, b, 1.0).unwrap();
        assert_eq!(removed.len(), 2);
        let left: Vec<_> = graph.neighbours(a).iter().filter(|edge| edge.target == b).collect();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].label, "Bypass");
        graph.check_symmetry().unwrap();

        for edge in &removed {
            graph.restore_edge(edge);
        }
        assert_eq!(graph.edge_multiset(), before);
    }

    #[test]
    fn self_loops_remove_both_halves() {
        let mut graph = triangle();
        graph.add_edge("a", "a", 0.5, "roundabout").unwrap();
        graph.check_symmetry().unwrap();
        let removed = graph.remove_edge("a", "a", 0.5).unwrap().unwrap();
        assert_eq!(removed.a, removed.b);
        let a = graph.node_index("a").unwrap();
        assert!(graph.first_edge_between(a, a).is_none());
        graph.check_symmetry().unwrap();
    }

    #[test]
    fn missing_counterpart_is_reported() {
        let mut graph = triangle();
        let b = graph.node_index("b").unwrap();
        let a = graph.node_index("a").unwrap();
        let pos = graph
            .neighbours(b)
            .iter()
            .position(|edge| edge.target == a)
            .unwrap();
        graph.corrupt_drop_half(b, pos);

        assert!(matches!(
            graph.check_symmetry(),
            Err(Error::AsymmetricEdge { .. })
        ));
        let err = graph.remove_edge("a", "b", 1.0).unwrap_err();
        assert!(matches!(err, Error::AsymmetricEdge { .. }));
        assert_eq!(graph.neighbours(a).len(), 2, "failed removal leaves graph intact");
    }

    #[test]
    fn nearest_node_uses_great_circle_distance() {
        let graph = triangle();
        let nearest = graph.nearest_node(0.9, 0.1).unwrap();
        assert_eq!(graph.node(nearest).unwrap().id, "b");
        assert!(Graph::new().nearest_node(0.0, 0.0).is_none());
    }
}
