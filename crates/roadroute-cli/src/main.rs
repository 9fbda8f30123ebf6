mod commands;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::info::handle_info_command;
use commands::nearest::{handle_nearest_command, NearestCommandArgs};
use commands::route::{handle_route_command, RouteCommandArgs};
use roadroute_cli::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about = "Road network routing utilities")]
struct Cli {
    /// GeoJSON road network to load.
    #[arg(long, env = "ROADROUTE_NETWORK", global = true)]
    network: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the shortest route and an alternate that avoids its streets.
    Route(RouteCommandArgs),
    /// Report node, edge and ingestion counts of the network.
    Info,
    /// Find the network node closest to a coordinate.
    Nearest(NearestCommandArgs),
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let network = cli
        .network
        .ok_or_else(|| anyhow!("no road network given; pass --network or set ROADROUTE_NETWORK"))?;

    match cli.command {
        Command::Route(args) => handle_route_command(&network, cli.format, &args),
        Command::Info => handle_info_command(&network, cli.format),
        Command::Nearest(args) => handle_nearest_command(&network, cli.format, &args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
