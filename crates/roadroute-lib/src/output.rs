use std::fmt::Write;

use serde::Serialize;

use crate::graph::Graph;
use crate::routing::{AlternateStatus, Route, RouteAlgorithm, RoutePair};

/// Which route of a pair a summary describes.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteOutputKind {
    Primary,
    Alternate,
}

impl RouteOutputKind {
    /// Human-readable label shown in textual renderings.
    pub fn label(self) -> &'static str {
        match self {
            RouteOutputKind::Primary => "Primary route",
            RouteOutputKind::Alternate => "Alternate route",
        }
    }
}

/// Presentation style for turning a [`RouteSummary`] into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteRenderMode {
    PlainText,
    RichText,
}

/// Edge traversed by a summarised route.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteStep {
    pub index: usize,
    pub from: String,
    pub to: String,
    pub distance_m: f64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl RouteStep {
    fn display_label(&self) -> &str {
        if self.label.is_empty() {
            "<unnamed>"
        } else {
            &self.label
        }
    }
}

/// Structured representation of a route that higher-level consumers can serialise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RouteSummary {
    pub kind: RouteOutputKind,
    pub algorithm: RouteAlgorithm,
    pub hops: usize,
    pub total_distance_m: f64,
    /// Street names in order of first appearance, without repeats.
    pub labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    pub steps: Vec<RouteStep>,
}

impl RouteSummary {
    /// Summarise a route, resolving node indices to identifiers.
    ///
    /// An empty route yields a summary with no steps and zero distance.
    pub fn from_route(
        kind: RouteOutputKind,
        algorithm: RouteAlgorithm,
        graph: &Graph,
        route: &Route,
    ) -> Self {
        let name = |idx| {
            graph
                .node(idx)
                .map(|node| node.id.clone())
                .unwrap_or_else(|| format!("#{idx}"))
        };

        let steps: Vec<RouteStep> = route
            .edges
            .iter()
            .enumerate()
            .map(|(index, hop)| RouteStep {
                index: index + 1,
                from: name(hop.from),
                to: name(hop.to),
                distance_m: hop.weight,
                label: hop.label.clone(),
            })
            .collect();

        Self {
            kind,
            algorithm,
            hops: route.hop_count(),
            total_distance_m: route.total_distance(),
            labels: route.labels().into_iter().map(str::to_string).collect(),
            start: steps.first().map(|step| step.from.clone()),
            goal: steps.last().map(|step| step.to.clone()),
            steps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Render the summary using the requested textual mode.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        match mode {
            RouteRenderMode::PlainText => self.render_plain(),
            RouteRenderMode::RichText => self.render_rich(),
        }
    }

    fn render_plain(&self) -> String {
        let mut buffer = String::new();
        if self.is_empty() {
            let _ = writeln!(buffer, "{}: none", self.kind.label());
            return buffer;
        }

        let _ = writeln!(
            buffer,
            "{}: {} -> {} ({} hops, {:.1} m, algorithm: {})",
            self.kind.label(),
            self.start.as_deref().unwrap_or("<unknown>"),
            self.goal.as_deref().unwrap_or("<unknown>"),
            self.hops,
            self.total_distance_m,
            self.algorithm
        );
        if !self.labels.is_empty() {
            let _ = writeln!(buffer, "Streets: {}", self.labels.join(", "));
        }
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "{:>3}: {} -> {} {:>9.1} m  {}",
                step.index,
                step.from,
                step.to,
                step.distance_m,
                step.display_label()
            );
        }
        buffer
    }

    fn render_rich(&self) -> String {
        let mut buffer = String::new();
        if self.is_empty() {
            let _ = writeln!(buffer, "**{}** — _none_", self.kind.label());
            return buffer;
        }

        let _ = writeln!(
            buffer,
            "**{}** — {:.1} m in {} hops (algorithm: `{}`)",
            self.kind.label(),
            self.total_distance_m,
            self.hops,
            self.algorithm
        );
        for step in &self.steps {
            let _ = writeln!(
                buffer,
                "* {:>2}. **{}** `{}` → `{}` ({:.1} m)",
                step.index,
                step.display_label(),
                step.from,
                step.to,
                step.distance_m
            );
        }
        buffer
    }
}

/// Summary of a primary/alternate route pair.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RoutePairSummary {
    pub status: AlternateStatus,
    pub algorithm: RouteAlgorithm,
    pub primary: RouteSummary,
    pub alternate: RouteSummary,
}

impl RoutePairSummary {
    pub fn from_pair(graph: &Graph, pair: &RoutePair) -> Self {
        Self {
            status: pair.status(),
            algorithm: pair.algorithm,
            primary: RouteSummary::from_route(
                RouteOutputKind::Primary,
                pair.algorithm,
                graph,
                &pair.primary,
            ),
            alternate: RouteSummary::from_route(
                RouteOutputKind::Alternate,
                pair.algorithm,
                graph,
                &pair.alternate,
            ),
        }
    }

    /// Render both routes, separated by a blank line.
    pub fn render(&self, mode: RouteRenderMode) -> String {
        format!(
            "{}\n{}",
            self.primary.render(mode),
            self.alternate.render(mode)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{alternate_routes, RouteRequest};

    fn triangle() -> Graph {
        let mut graph = Graph::new();
        graph.add_node("A", 0.0, 0.0);
        graph.add_node("B", 0.000001, 0.0);
        graph.add_node("C", 0.000001, 0.000001);
        graph.add_edge("A", "B", 2.0, "Main Street").unwrap();
        graph.add_edge("B", "C", 2.0, "").unwrap();
        graph.add_edge("A", "C", 3.0, "Shortcut").unwrap();
        graph
    }

    #[test]
    fn pair_summary_resolves_node_names() {
        let mut graph = triangle();
        let request = RouteRequest::new("A", "C", RouteAlgorithm::Dijkstra);
        let pair = alternate_routes(&mut graph, &request).unwrap();
        let summary = RoutePairSummary::from_pair(&graph, &pair);

        assert_eq!(summary.status, AlternateStatus::Found);
        assert_eq!(summary.primary.start.as_deref(), Some("A"));
        assert_eq!(summary.primary.goal.as_deref(), Some("C"));
        assert_eq!(summary.primary.labels, vec!["Shortcut".to_string()]);
        assert_eq!(summary.alternate.hops, 2);
        assert_eq!(summary.alternate.total_distance_m, 4.0);
        assert_eq!(summary.alternate.labels, vec!["Main Street".to_string()]);
    }

    #[test]
    fn plain_render_lists_steps() {
        let mut graph = triangle();
        let request = RouteRequest::new("A", "C", RouteAlgorithm::AStar);
        let pair = alternate_routes(&mut graph, &request).unwrap();
        let text = RoutePairSummary::from_pair(&graph, &pair).render(RouteRenderMode::PlainText);

        assert!(text.contains("Primary route: A -> C (1 hops, 3.0 m, algorithm: a-star)"));
        assert!(text.contains("Alternate route: A -> C (2 hops, 4.0 m"));
        assert!(text.contains("<unnamed>"));
    }

    #[test]
    fn empty_route_renders_none() {
        let graph = triangle();
        let summary = RouteSummary::from_route(
            RouteOutputKind::Alternate,
            RouteAlgorithm::Dijkstra,
            &graph,
            &Route::default(),
        );
        assert!(summary.is_empty());
        assert_eq!(summary.render(RouteRenderMode::PlainText), "Alternate route: none\n");
        assert!(summary.render(RouteRenderMode::RichText).contains("_none_"));
    }

    #[test]
    fn json_omits_missing_endpoints() {
        let graph = triangle();
        let summary = RouteSummary::from_route(
            RouteOutputKind::Primary,
            RouteAlgorithm::AStar,
            &graph,
            &Route::default(),
        );
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["kind"], "primary");
        assert_eq!(value["algorithm"], "a-star");
        assert!(value.get("start").is_none());
    }
}
