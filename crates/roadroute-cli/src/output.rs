//! Output formatting for route, network and lookup results.
//!
//! Every formatter returns a `String` so the command handlers decide where it
//! goes and the formatting stays testable.

use std::fmt::Write;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;

use roadroute_lib::{AlternateStatus, IngestStats, RoutePairSummary, RouteRenderMode, RouteSummary};

use crate::terminal::{format_distance, ColorPalette};

/// Output formats accepted by `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-friendly text with colored route headings.
    #[default]
    Text,
    /// Markdown-like rendering from the library.
    Rich,
    /// Pretty-printed JSON.
    Json,
}

/// Counts reported by the `info` command.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NetworkInfo {
    pub path: PathBuf,
    pub nodes: usize,
    pub edges: usize,
    pub features: usize,
    pub skipped_features: usize,
    pub segments: usize,
    pub skipped_segments: usize,
}

impl NetworkInfo {
    pub fn new(path: PathBuf, nodes: usize, edges: usize, stats: IngestStats) -> Self {
        Self {
            path,
            nodes,
            edges,
            features: stats.features,
            skipped_features: stats.skipped_features,
            segments: stats.segments,
            skipped_segments: stats.skipped_segments,
        }
    }
}

/// Result of a `nearest` lookup.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NearestNode {
    pub id: String,
    pub lon: f64,
    pub lat: f64,
    pub distance_m: f64,
}

/// Render a route pair in the requested format.
pub fn format_route_pair(
    summary: &RoutePairSummary,
    format: OutputFormat,
    palette: &ColorPalette,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(summary).map(|json| json + "\n"),
        OutputFormat::Rich => Ok(summary.render(RouteRenderMode::RichText)),
        OutputFormat::Text => Ok(format_route_pair_text(summary, palette)),
    }
}

/// Text view: primary route in the primary color, alternate in the
/// alternate color, followed by a note when no alternate exists.
pub fn format_route_pair_text(summary: &RoutePairSummary, palette: &ColorPalette) -> String {
    let mut buffer = String::new();
    if summary.status == AlternateStatus::SameEndpoint {
        let _ = writeln!(
            buffer,
            "{}Start and destination are the same node; the route has zero length (0.0 m).{}",
            palette.white_bold, palette.reset
        );
        return buffer;
    }
    write_route(&mut buffer, &summary.primary, palette.primary, palette);
    let _ = writeln!(buffer);
    write_route(&mut buffer, &summary.alternate, palette.alternate, palette);

    if summary.status == AlternateStatus::NoAlternate {
        let _ = writeln!(
            buffer,
            "\n{}No alternate route: every other way between the endpoints uses a street of the primary route.{}",
            palette.warning, palette.reset
        );
    }
    buffer
}

fn write_route(buffer: &mut String, route: &RouteSummary, color: &str, palette: &ColorPalette) {
    let heading = route.kind.label();
    if route.is_empty() {
        let _ = writeln!(buffer, "{color}{heading}{}: none", palette.reset);
        return;
    }

    let _ = writeln!(
        buffer,
        "{color}{heading}{} ({} hops; {}; algorithm: {}):",
        palette.reset,
        route.hops,
        format_distance(route.total_distance_m),
        route.algorithm
    );
    if !route.labels.is_empty() {
        let _ = writeln!(
            buffer,
            "  {}Streets:{} {}",
            palette.white_bold,
            palette.reset,
            route.labels.join(" > ")
        );
    }
    for step in &route.steps {
        let label = if step.label.is_empty() {
            "<unnamed>"
        } else {
            step.label.as_str()
        };
        let _ = writeln!(
            buffer,
            "  {}{:>3}.{} {} -> {} ({}, {})",
            palette.gray,
            step.index,
            palette.reset,
            step.from,
            step.to,
            format_distance(step.distance_m),
            label
        );
    }
}

/// Render network counts.
pub fn format_info(info: &NetworkInfo, format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(info).map(|json| json + "\n");
    }

    let mut buffer = String::new();
    let _ = writeln!(buffer, "Network: {}", info.path.display());
    let _ = writeln!(buffer, "Nodes: {}", info.nodes);
    let _ = writeln!(buffer, "Edges: {}", info.edges);
    let _ = writeln!(
        buffer,
        "Features: {} ingested, {} skipped",
        info.features, info.skipped_features
    );
    let _ = writeln!(
        buffer,
        "Segments: {} added, {} zero-length skipped",
        info.segments, info.skipped_segments
    );
    Ok(buffer)
}

/// Render a nearest-node lookup.
pub fn format_nearest(nearest: &NearestNode, format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(nearest).map(|json| json + "\n");
    }
    Ok(format!(
        "{} ({} away)\n",
        nearest.id,
        format_distance(nearest.distance_m)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use roadroute_lib::{alternate_routes, Graph, RouteAlgorithm, RouteRequest};

    fn summary_for(graph: &mut Graph, start: &str, goal: &str) -> RoutePairSummary {
        let request = RouteRequest::new(start, goal, RouteAlgorithm::Dijkstra);
        let pair = alternate_routes(graph, &request).expect("query succeeds");
        RoutePairSummary::from_pair(graph, &pair)
    }

    fn square() -> Graph {
        let mut graph = Graph::new();
        graph.add_node("A", 0.0, 0.0);
        graph.add_node("B", 0.0, 0.001);
        graph.add_node("C", 0.001, 0.001);
        graph.add_node("D", 0.001, 0.0);
        graph.add_edge("A", "B", 100.0, "West Street").unwrap();
        graph.add_edge("B", "C", 100.0, "North Street").unwrap();
        graph.add_edge("A", "D", 150.0, "South Street").unwrap();
        graph.add_edge("D", "C", 150.0, "").unwrap();
        graph
    }

    #[test]
    fn text_output_lists_both_routes() {
        let mut graph = square();
        let summary = summary_for(&mut graph, "A", "C");
        let text = format_route_pair_text(&summary, &ColorPalette::plain());

        assert!(text.contains("Primary route (2 hops; 200.0 m; algorithm: dijkstra):"));
        assert!(text.contains("Streets: West Street > North Street"));
        assert!(text.contains("Alternate route (2 hops; 300.0 m; algorithm: dijkstra):"));
        assert!(text.contains("<unnamed>"));
        assert!(!text.contains("No alternate route"));
    }

    #[test]
    fn text_output_explains_missing_alternate() {
        let mut graph = square();
        graph.add_node("E", 0.002, 0.001);
        graph.add_edge("C", "E", 50.0, "Spur").unwrap();
        let summary = summary_for(&mut graph, "C", "E");
        let text = format_route_pair_text(&summary, &ColorPalette::plain());

        assert!(text.contains("Alternate route: none"));
        assert!(text.contains("No alternate route"));
    }

    #[test]
    fn text_output_handles_same_endpoint() {
        let mut graph = square();
        let summary = summary_for(&mut graph, "B", "B");
        assert_eq!(summary.status, AlternateStatus::SameEndpoint);
        let text = format_route_pair_text(&summary, &ColorPalette::plain());
        assert!(text.contains("same node"));
        assert!(!text.contains("Alternate route"));
    }

    #[test]
    fn colored_text_wraps_headings() {
        let mut graph = square();
        let summary = summary_for(&mut graph, "A", "C");
        let palette = ColorPalette::colored();
        let text = format_route_pair_text(&summary, &palette);
        assert!(text.starts_with(&format!("{}Primary route{}", palette.primary, palette.reset)));
        assert!(text.contains(&format!("{}Alternate route{}", palette.alternate, palette.reset)));
    }

    #[test]
    fn json_output_carries_status() {
        let mut graph = square();
        let summary = summary_for(&mut graph, "A", "C");
        let json = format_route_pair(&summary, OutputFormat::Json, &ColorPalette::plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "found");
        assert_eq!(value["primary"]["hops"], 2);
        assert_eq!(value["alternate"]["labels"][0], "South Street");
    }

    #[test]
    fn info_text_lists_counts() {
        let info = NetworkInfo::new(
            PathBuf::from("streets.geojson"),
            4,
            3,
            IngestStats {
                features: 2,
                skipped_features: 1,
                segments: 3,
                skipped_segments: 0,
            },
        );
        let text = format_info(&info, OutputFormat::Text).unwrap();
        assert!(text.contains("Nodes: 4"));
        assert!(text.contains("Features: 2 ingested, 1 skipped"));
    }
}
