//! Route command handler for computing a primary and an alternate route.

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use tracing::debug;

use crate::commands::{load, Coordinate};
use roadroute_cli::output::{format_route_pair, OutputFormat};
use roadroute_cli::terminal::ColorPalette;
use roadroute_lib::{
    alternate_routes, AlternateStatus, Error as RouteError, Graph, RouteAlgorithm,
    RoutePairSummary, RouteRequest, SearchLimits,
};

/// Arguments for the route command.
#[derive(Args, Debug, Clone)]
pub struct RouteCommandArgs {
    /// Starting node identifier, e.g. "(-9.142, 38.71)".
    #[arg(long, required_unless_present = "from_coord", conflicts_with = "from_coord")]
    pub from: Option<String>,
    /// Start at the node nearest to `LON,LAT`.
    #[arg(long, allow_hyphen_values = true)]
    pub from_coord: Option<Coordinate>,
    /// Destination node identifier.
    #[arg(long, required_unless_present = "to_coord", conflicts_with = "to_coord")]
    pub to: Option<String>,
    /// End at the node nearest to `LON,LAT`.
    #[arg(long, allow_hyphen_values = true)]
    pub to_coord: Option<Coordinate>,
    /// Search algorithm: dijkstra or a-star.
    #[arg(long, default_value_t = RouteAlgorithm::AStar)]
    pub algorithm: RouteAlgorithm,
    /// Abort a search after expanding this many nodes.
    #[arg(long)]
    pub max_expansions: Option<usize>,
    /// Abort a search after this many milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

impl RouteCommandArgs {
    /// Budget applied to each of the two searches.
    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_expansions: self.max_expansions,
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }

    /// Convert CLI args to a library request, resolving coordinates to nodes.
    pub fn to_request(&self, graph: &Graph) -> Result<RouteRequest> {
        let start = resolve_endpoint(graph, self.from.as_deref(), self.from_coord, "start")?;
        let goal = resolve_endpoint(graph, self.to.as_deref(), self.to_coord, "destination")?;
        Ok(RouteRequest::new(start, goal, self.algorithm).with_limits(self.limits()))
    }
}

/// Handle the route subcommand.
pub fn handle_route_command(
    network_path: &Path,
    format: OutputFormat,
    args: &RouteCommandArgs,
) -> Result<()> {
    let mut network = load(network_path)?;
    let request = args.to_request(&network.graph)?;
    debug!(start = %request.start, goal = %request.goal, algorithm = %request.algorithm, "routing");

    let pair = alternate_routes(&mut network.graph, &request)
        .with_context(|| format!("failed to route {} -> {}", request.start, request.goal))?;
    if pair.status() == AlternateStatus::NoRoute {
        return Err(RouteError::RouteNotFound {
            start: request.start,
            goal: request.goal,
        }
        .into());
    }

    let summary = RoutePairSummary::from_pair(&network.graph, &pair);
    let palette = ColorPalette::detect();
    print!("{}", format_route_pair(&summary, format, &palette)?);
    Ok(())
}

fn resolve_endpoint(
    graph: &Graph,
    id: Option<&str>,
    coordinate: Option<Coordinate>,
    role: &str,
) -> Result<String> {
    match (id, coordinate) {
        (Some(id), _) => {
            if graph.node_index(id).is_none() {
                return Err(RouteError::UnknownNode { id: id.to_string() }.into());
            }
            Ok(id.to_string())
        }
        (None, Some(coordinate)) => graph
            .nearest_node(coordinate.lon, coordinate.lat)
            .and_then(|idx| graph.node(idx))
            .map(|node| node.id.clone())
            .ok_or_else(|| anyhow!("no node near the {role} coordinate; the network is empty")),
        (None, None) => Err(anyhow!("a {role} node or coordinate is required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> RouteCommandArgs {
        RouteCommandArgs {
            from: None,
            from_coord: None,
            to: None,
            to_coord: None,
            algorithm: RouteAlgorithm::Dijkstra,
            max_expansions: Some(50),
            timeout_ms: Some(250),
        }
    }

    fn graph() -> Graph {
        let mut graph = Graph::new();
        graph.add_node("west", 0.0, 0.0);
        graph.add_node("east", 0.01, 0.0);
        graph
    }

    #[test]
    fn limits_map_onto_search_budget() {
        let limits = args().limits();
        assert_eq!(limits.max_expansions, Some(50));
        assert_eq!(limits.timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn coordinates_snap_to_nearest_node() {
        let mut args = args();
        args.from_coord = Some(Coordinate { lon: 0.001, lat: 0.0 });
        args.to = Some("east".to_string());
        let request = args.to_request(&graph()).unwrap();
        assert_eq!(request.start, "west");
        assert_eq!(request.goal, "east");
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let mut args = args();
        args.from = Some("north".to_string());
        args.to = Some("east".to_string());
        let err = args.to_request(&graph()).unwrap_err();
        assert!(err.to_string().contains("unknown node: north"));
    }
}
