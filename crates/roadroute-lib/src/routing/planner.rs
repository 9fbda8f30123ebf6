//! Route planning strategies.
//!
//! Each search algorithm sits behind the [`RoutePlanner`] trait so the
//! orchestration in [`super::shortest_path`] and
//! [`super::alternate_routes`] does not care which one runs.

use crate::error::Result;
use crate::graph::{Graph, NodeIndex};
use crate::path::{a_star, dijkstra, SearchLimits, SearchTree};

use super::RouteAlgorithm;

/// Trait for route planning strategies.
pub trait RoutePlanner: Send + Sync {
    /// The algorithm identifier for this planner.
    fn algorithm(&self) -> RouteAlgorithm;

    /// Run the search and return its predecessor tree.
    ///
    /// An unreachable `goal` is not an error: it simply has no predecessor
    /// entry in the returned tree.
    fn search(
        &self,
        graph: &Graph,
        start: NodeIndex,
        goal: NodeIndex,
        limits: &SearchLimits,
    ) -> Result<SearchTree>;

    /// Whether the search is steered by a distance-to-goal estimate.
    fn uses_heuristic(&self) -> bool {
        false
    }
}

/// Uniform-cost search over the whole reachable graph.
#[derive(Debug, Clone, Default)]
pub struct DijkstraPlanner;

impl RoutePlanner for DijkstraPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::Dijkstra
    }

    fn search(
        &self,
        graph: &Graph,
        start: NodeIndex,
        _goal: NodeIndex,
        limits: &SearchLimits,
    ) -> Result<SearchTree> {
        dijkstra(graph, start, limits)
    }
}

/// Goal-directed search using great-circle distance as heuristic.
#[derive(Debug, Clone, Default)]
pub struct AStarPlanner;

impl RoutePlanner for AStarPlanner {
    fn algorithm(&self) -> RouteAlgorithm {
        RouteAlgorithm::AStar
    }

    fn search(
        &self,
        graph: &Graph,
        start: NodeIndex,
        goal: NodeIndex,
        limits: &SearchLimits,
    ) -> Result<SearchTree> {
        a_star(graph, start, goal, limits)
    }

    fn uses_heuristic(&self) -> bool {
        true
    }
}

/// Select the planner for an algorithm.
pub fn select_planner(algorithm: RouteAlgorithm) -> Box<dyn RoutePlanner> {
    match algorithm {
        RouteAlgorithm::Dijkstra => Box::new(DijkstraPlanner),
        RouteAlgorithm::AStar => Box::new(AStarPlanner),
    }
}
