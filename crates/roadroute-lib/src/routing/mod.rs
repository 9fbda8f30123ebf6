//! Route planning over a road [`Graph`].
//!
//! This module provides:
//! - [`RouteAlgorithm`] - Supported search algorithms (Dijkstra, A*)
//! - [`RouteRequest`] - Endpoints, algorithm and search budget of a query
//! - [`Route`] - Ordered list of traversed edges
//! - [`shortest_path`] - Single best route
//! - [`alternate_routes`] - Best route plus a second route that avoids every
//!   edge of the first
//!
//! # Alternate routes
//!
//! The second route is found by removing the primary route's edges, searching
//! again and putting the edges back. This is a single-pass replacement-path
//! heuristic rather than a k-shortest-paths algorithm: alternates that share
//! some edges with the primary route are never considered, and the second
//! route is empty whenever the primary route contains a bridge.
//!
//! Removal happens on the caller's graph, which is why [`alternate_routes`]
//! takes `&mut Graph`; nothing else can observe the reduced graph while the
//! query runs.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use roadroute_lib::{alternate_routes, load_network, RouteAlgorithm, RouteRequest};
//!
//! let mut network = load_network(Path::new("streets.geojson"))?;
//! let request = RouteRequest::new("(1.0, 2.0)", "(3.5, 4.0)", RouteAlgorithm::AStar);
//! let pair = alternate_routes(&mut network.graph, &request)?;
//! println!("primary: {:.1} m", pair.primary.total_distance());
//! ```

mod planner;

pub use planner::{select_planner, AStarPlanner, DijkstraPlanner, RoutePlanner};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::{EdgeId, Graph, NodeIndex, RemovedEdge};
use crate::path::{reconstruct, PathEdge, SearchLimits};

/// Supported routing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteAlgorithm {
    /// Dijkstra's algorithm (uniform cost).
    Dijkstra,
    /// A* search (heuristic guided).
    #[default]
    #[serde(rename = "a-star")]
    AStar,
}

impl fmt::Display for RouteAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            RouteAlgorithm::Dijkstra => "dijkstra",
            RouteAlgorithm::AStar => "a-star",
        };
        f.write_str(value)
    }
}

impl FromStr for RouteAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "dijkstra" | "d" => Ok(RouteAlgorithm::Dijkstra),
            "a-star" | "astar" | "a*" | "a" => Ok(RouteAlgorithm::AStar),
            other => Err(format!("unknown routing algorithm '{other}'")),
        }
    }
}

/// Route query between two node identifiers.
#[derive(Debug, Clone)]
pub struct RouteRequest {
    pub start: String,
    pub goal: String,
    pub algorithm: RouteAlgorithm,
    pub limits: SearchLimits,
}

impl RouteRequest {
    /// Request without a search budget.
    pub fn new(start: impl Into<String>, goal: impl Into<String>, algorithm: RouteAlgorithm) -> Self {
        Self {
            start: start.into(),
            goal: goal.into(),
            algorithm,
            limits: SearchLimits::unbounded(),
        }
    }

    /// Attach an expansion / time budget to every search of this request.
    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Ordered sequence of traversed edges from start to goal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Route {
    pub edges: Vec<PathEdge>,
}

impl Route {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Number of edges in the route.
    pub fn hop_count(&self) -> usize {
        self.edges.len()
    }

    /// Sum of edge weights in metres.
    pub fn total_distance(&self) -> f64 {
        self.edges.iter().map(|hop| hop.weight).sum()
    }

    /// Distinct non-empty labels in order of first appearance.
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for hop in &self.edges {
            if !hop.label.is_empty() && !labels.contains(&hop.label.as_str()) {
                labels.push(&hop.label);
            }
        }
        labels
    }

    /// Whether the route traverses the edge with the given identity.
    pub fn uses_edge(&self, id: EdgeId) -> bool {
        self.edges.iter().any(|hop| hop.edge == id)
    }
}

/// Outcome of an alternate-route query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlternateStatus {
    /// No route exists between the endpoints at all.
    NoRoute,
    /// Start and goal are the same node; both routes are empty and have
    /// zero length.
    SameEndpoint,
    /// A primary route exists, but removing it disconnects the endpoints.
    NoAlternate,
    /// Both routes were found.
    Found,
}

/// Primary route and the alternate found after removing it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePair {
    pub algorithm: RouteAlgorithm,
    pub primary: Route,
    pub alternate: Route,
    same_endpoint: bool,
}

impl RoutePair {
    pub fn status(&self) -> AlternateStatus {
        match (self.primary.is_empty(), self.alternate.is_empty()) {
            (true, _) if self.same_endpoint => AlternateStatus::SameEndpoint,
            (true, _) => AlternateStatus::NoRoute,
            (false, true) => AlternateStatus::NoAlternate,
            (false, false) => AlternateStatus::Found,
        }
    }
}

/// Compute the best route for a request.
///
/// Unknown endpoints, `start == goal` and unreachable goals all produce an
/// empty route rather than an error.
pub fn shortest_path(graph: &Graph, request: &RouteRequest) -> Result<Route> {
    let (Some(start), Some(goal)) = (
        graph.node_index(&request.start),
        graph.node_index(&request.goal),
    ) else {
        debug!(start = %request.start, goal = %request.goal, "unknown endpoint");
        return Ok(Route::default());
    };
    route_between(graph, start, goal, request)
}

/// Compute the best route and an alternate that shares none of its edges.
///
/// "Shares" is judged by `(endpoints, weight)`: a parallel edge with the
/// same weight as a primary hop is off limits too. The primary route's
/// edges are removed from `graph` for the duration of
/// the second search and restored afterwards, also when that search fails.
/// When no primary route exists the graph is not touched.
pub fn alternate_routes(graph: &mut Graph, request: &RouteRequest) -> Result<RoutePair> {
    let same_endpoint =
        request.start == request.goal && graph.node_index(&request.start).is_some();
    let primary = shortest_path(graph, request)?;
    if primary.is_empty() {
        return Ok(RoutePair {
            algorithm: request.algorithm,
            primary,
            alternate: Route::default(),
            same_endpoint,
        });
    }

    let alternate = {
        let mut scope = EdgeRemoval::new(graph);
        for hop in &primary.edges {
            scope.remove(hop)?;
        }
        debug!(
            removed = scope.removed.len(),
            "primary route detached for alternate search"
        );
        shortest_path(scope.graph(), request)?
    };

    Ok(RoutePair {
        algorithm: request.algorithm,
        primary,
        alternate,
        same_endpoint,
    })
}

fn route_between(
    graph: &Graph,
    start: NodeIndex,
    goal: NodeIndex,
    request: &RouteRequest,
) -> Result<Route> {
    let planner = select_planner(request.algorithm);
    let tree = planner.search(graph, start, goal, &request.limits)?;
    let edges = reconstruct(graph, &tree, start, goal)?;
    Ok(Route { edges })
}

/// Edges detached from a graph, put back when the scope ends.
struct EdgeRemoval<'a> {
    graph: &'a mut Graph,
    removed: Vec<RemovedEdge>,
}

impl<'a> EdgeRemoval<'a> {
    fn new(graph: &'a mut Graph) -> Self {
        Self {
            graph,
            removed: Vec::new(),
        }
    }

    /// Detach the hop's edge together with every parallel edge of the
    /// same weight between its endpoints.
    fn remove(&mut self, hop: &PathEdge) -> Result<()> {
        if self.removed.iter().any(|removed| removed.id == hop.edge) {
            return Ok(());
        }
        if self.graph.edge_between(hop.from, hop.to, hop.edge).is_none() {
            return Err(Error::MissingEdge {
                from: node_name(&*self.graph, hop.from),
                to: node_name(&*self.graph, hop.to),
            });
        }
        let twins = self.graph.remove_matching(hop.from, hop.to, hop.weight)?;
        self.removed.extend(twins);
        Ok(())
    }

    fn graph(&self) -> &Graph {
        &*self.graph
    }
}

impl Drop for EdgeRemoval<'_> {
    fn drop(&mut self) {
        for removed in self.removed.drain(..).rev() {
            self.graph.restore_edge(&removed);
        }
    }
}

fn node_name(graph: &Graph, idx: NodeIndex) -> String {
    graph
        .node(idx)
        .map(|node| node.id.clone())
        .unwrap_or_else(|| format!("#{idx}"))
}
