//! Road network routing library.
//!
//! This crate loads street networks from GeoJSON into an undirected weighted
//! graph, runs Dijkstra and A* searches over it, and computes a primary route
//! together with an edge-disjoint alternate. Higher-level consumers (the CLI)
//! should only depend on the functions exported here instead of
//! reimplementing behavior.
//!

#![deny(warnings)]

pub mod error;
pub mod geo;
pub mod graph;
pub mod ingest;
pub mod output;
pub mod path;
pub mod routing;

pub use error::{Error, Result};
pub use geo::{haversine_distance, node_key, EARTH_RADIUS_M};
pub use graph::{Edge, EdgeId, EdgeSnapshot, Graph, Node, NodeIndex, RemovedEdge};
pub use ingest::{ingest_geojson, load_network, parse_network, IngestStats, RoadNetwork};
pub use output::{RouteOutputKind, RoutePairSummary, RouteRenderMode, RouteStep, RouteSummary};
pub use path::{a_star, dijkstra, reconstruct, PathEdge, Predecessor, SearchLimits, SearchTree};
pub use routing::{
    alternate_routes, select_planner, shortest_path, AlternateStatus, Route, RouteAlgorithm,
    RoutePair, RoutePlanner, RouteRequest,
};
