// Module exports for CLI subcommands.
//
// Each module handles one subcommand; main.rs only parses arguments and
// dispatches to these handlers.

pub mod info;
pub mod nearest;
pub mod route;

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};

use roadroute_lib::{load_network, RoadNetwork};

/// Longitude/latitude pair given on the command line as `LON,LAT`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl FromStr for Coordinate {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        let (lon, lat) = value
            .split_once(',')
            .ok_or_else(|| format!("expected LON,LAT but got '{value}'"))?;
        let parse = |part: &str, axis: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|err| format!("invalid {axis} '{}': {err}", part.trim()))
        };
        let coordinate = Coordinate {
            lon: parse(lon, "longitude")?,
            lat: parse(lat, "latitude")?,
        };
        if !(-180.0..=180.0).contains(&coordinate.lon) || !(-90.0..=90.0).contains(&coordinate.lat)
        {
            return Err(format!("coordinate '{value}' is out of range"));
        }
        Ok(coordinate)
    }
}

/// Load the road network the command operates on.
pub fn load(network: &Path) -> Result<RoadNetwork> {
    load_network(network)
        .with_context(|| format!("failed to load road network from {}", network.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_parses_lon_lat() {
        let coordinate: Coordinate = "-9.142, 38.71".parse().unwrap();
        assert_eq!(coordinate, Coordinate { lon: -9.142, lat: 38.71 });
    }

    #[test]
    fn coordinate_rejects_garbage() {
        assert!("38.71".parse::<Coordinate>().is_err());
        assert!("east,north".parse::<Coordinate>().is_err());
        assert!("10,95".parse::<Coordinate>().is_err());
    }
}
