//! Nearest command handler: snap a coordinate to the closest network node.

use std::path::Path;

use anyhow::{anyhow, Result};
use clap::Args;

use crate::commands::{load, Coordinate};
use roadroute_cli::output::{format_nearest, NearestNode, OutputFormat};
use roadroute_lib::haversine_distance;

/// Arguments for the nearest command.
#[derive(Args, Debug, Clone)]
pub struct NearestCommandArgs {
    /// Coordinate to look up, as `LON,LAT`.
    #[arg(long, allow_hyphen_values = true)]
    pub coord: Coordinate,
}

pub fn handle_nearest_command(
    network_path: &Path,
    format: OutputFormat,
    args: &NearestCommandArgs,
) -> Result<()> {
    let network = load(network_path)?;
    let graph = &network.graph;
    let node = graph
        .nearest_node(args.coord.lon, args.coord.lat)
        .and_then(|idx| graph.node(idx))
        .ok_or_else(|| anyhow!("road network {} has no nodes", network_path.display()))?;

    let nearest = NearestNode {
        id: node.id.clone(),
        lon: node.x,
        lat: node.y,
        distance_m: haversine_distance(args.coord.lat, args.coord.lon, node.y, node.x),
    };
    print!("{}", format_nearest(&nearest, format)?);
    Ok(())
}
