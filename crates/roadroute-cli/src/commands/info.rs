//! Info command handler: node, edge and ingestion counts of a network.

use std::path::Path;

use anyhow::Result;

use crate::commands::load;
use roadroute_cli::output::{format_info, NetworkInfo, OutputFormat};

pub fn handle_info_command(network_path: &Path, format: OutputFormat) -> Result<()> {
    let network = load(network_path)?;
    let info = NetworkInfo::new(
        network_path.to_path_buf(),
        network.graph.node_count(),
        network.graph.edge_count(),
        network.stats,
    );
    print!("{}", format_info(&info, format)?);
    Ok(())
}
