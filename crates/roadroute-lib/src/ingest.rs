//! GeoJSON road network ingestion.
//!
//! Every `LineString` (and each part of a `MultiLineString`) is treated as a
//! polyline; `Polygon` and `MultiPolygon` contribute their outer rings only.
//! Vertices become nodes keyed by [`node_key`], consecutive vertices become
//! edges weighted by great-circle distance and labelled with the feature's
//! `name` property. Points and other geometry types carry no street segments
//! and are skipped.

use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::geo::{haversine_distance, node_key};
use crate::graph::Graph;

/// Counters collected while turning features into graph elements.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Features that produced at least one polyline.
    pub features: usize,
    /// Features without a supported line or polygon geometry.
    pub skipped_features: usize,
    /// Edges inserted into the graph.
    pub segments: usize,
    /// Zero-length segments (repeated vertices) that were dropped.
    ///
    /// Not every consecutive coordinate pair becomes an edge: a repeated
    /// vertex would only add a weight-0 self-loop, so it is counted here
    /// instead of being inserted.
    pub skipped_segments: usize,
}

/// Graph loaded from a GeoJSON document together with its ingestion stats.
#[derive(Debug, Clone, Default)]
pub struct RoadNetwork {
    pub graph: Graph,
    pub stats: IngestStats,
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    geometry: Option<Geometry>,
}

impl Feature {
    fn name(&self) -> &str {
        self.properties
            .as_ref()
            .and_then(|props| props.get("name"))
            .and_then(Value::as_str)
            .unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: Value,
}

type Position = Vec<f64>;

impl Geometry {
    /// Polylines described by this geometry, `None` for unsupported types.
    fn polylines(&self) -> Result<Option<Vec<Vec<Position>>>> {
        let lines = match self.kind.as_str() {
            "LineString" => vec![self.parse::<Vec<Position>>()?],
            "MultiLineString" => self.parse::<Vec<Vec<Position>>>()?,
            "Polygon" => outer_ring(self.parse::<Vec<Vec<Position>>>()?)
                .into_iter()
                .collect(),
            "MultiPolygon" => self
                .parse::<Vec<Vec<Vec<Position>>>>()?
                .into_iter()
                .filter_map(outer_ring)
                .collect(),
            _ => return Ok(None),
        };
        Ok(Some(lines))
    }

    fn parse<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.coordinates.clone()).map_err(|err| Error::InvalidGeoJson {
            message: format!("{} coordinates: {err}", self.kind),
        })
    }
}

fn outer_ring(rings: Vec<Vec<Position>>) -> Option<Vec<Position>> {
    rings.into_iter().next()
}

/// Load a road network from a GeoJSON file.
pub fn load_network(path: &Path) -> Result<RoadNetwork> {
    if !path.exists() {
        return Err(Error::NetworkNotFound {
            path: path.to_path_buf(),
        });
    }
    let started = Instant::now();
    let contents = fs::read_to_string(path)?;
    let network = parse_network(&contents)?;
    info!(
        path = %path.display(),
        nodes = network.graph.node_count(),
        edges = network.graph.edge_count(),
        elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
        "loaded road network"
    );
    Ok(network)
}

/// Build a road network from a GeoJSON `FeatureCollection` string.
pub fn parse_network(json: &str) -> Result<RoadNetwork> {
    let mut graph = Graph::new();
    let stats = ingest_geojson(&mut graph, json)?;
    Ok(RoadNetwork { graph, stats })
}

/// Add the streets of a GeoJSON `FeatureCollection` to an existing graph.
///
/// Nodes already present (shared vertices) are reused.
pub fn ingest_geojson(graph: &mut Graph, json: &str) -> Result<IngestStats> {
    let collection: FeatureCollection = serde_json::from_str(json)?;
    if collection.kind != "FeatureCollection" {
        return Err(Error::InvalidGeoJson {
            message: format!("expected a FeatureCollection, found {}", collection.kind),
        });
    }

    let mut stats = IngestStats::default();
    for (index, feature) in collection.features.iter().enumerate() {
        let Some(geometry) = &feature.geometry else {
            stats.skipped_features += 1;
            continue;
        };
        let Some(lines) = geometry.polylines()? else {
            debug!(index, kind = %geometry.kind, "skipping feature without street geometry");
            stats.skipped_features += 1;
            continue;
        };

        stats.features += 1;
        for line in &lines {
            add_polyline(graph, line, feature.name(), &mut stats)?;
        }
    }

    if stats.skipped_features > 0 {
        warn!(
            skipped = stats.skipped_features,
            "features without line or polygon geometry were ignored"
        );
    }
    Ok(stats)
}

fn add_polyline(
    graph: &mut Graph,
    line: &[Position],
    name: &str,
    stats: &mut IngestStats,
) -> Result<()> {
    let mut previous: Option<(String, f64, f64)> = None;
    for position in line {
        let [lon, lat, ..] = position.as_slice() else {
            return Err(Error::InvalidGeoJson {
                message: format!("position {position:?} needs longitude and latitude"),
            });
        };
        let (lon, lat) = (*lon, *lat);
        let key = node_key(lon, lat);
        graph.add_node(key.clone(), lon, lat);

        if let Some((prev_key, prev_lon, prev_lat)) = previous.take() {
            if prev_key == key {
                stats.skipped_segments += 1;
            } else {
                let weight = haversine_distance(prev_lat, prev_lon, lat, lon);
                graph.add_edge(&prev_key, &key, weight, name)?;
                stats.segments += 1;
            }
        }
        previous = Some((key, lon, lat));
    }
    Ok(())
}
