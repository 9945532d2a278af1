use serde::Serialize;

use crate::models::{ChartAnnotations, MarkerKind, MetricsResult, Sample, Target};

const LINE_COLOR: &str = "#00ff00";
const NEUTRAL_COLOR: &str = "#ffffff";
const MONTH_COLOR: &str = "#8888ff";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectionStyle {
    pub glyph: &'static str,
    pub color: &'static str,
}

/// The single mapping from a change direction to its glyph and color.
pub fn direction_style(non_negative: bool) -> DirectionStyle {
    if non_negative {
        DirectionStyle {
            glyph: "▲",
            color: "#2ecc71",
        }
    } else {
        DirectionStyle {
            glyph: "▼",
            color: "#e74c3c",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartMarker {
    pub index: usize,
    pub kind: MarkerKind,
    pub label: Option<String>,
    pub color: &'static str,
}

/// Declarative line-chart description handed to whatever draws the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    pub kind: &'static str,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub unit: &'static str,
    pub line_color: &'static str,
    pub markers: Vec<ChartMarker>,
    pub target_line: Option<f64>,
    pub summary_color: &'static str,
}

pub fn render_chart(
    metrics: &MetricsResult,
    annotations: &ChartAnnotations,
    series: &[Sample],
    target: Option<Target>,
) -> ChartConfig {
    let markers = annotations
        .markers
        .iter()
        .map(|marker| ChartMarker {
            index: marker.index,
            kind: marker.kind,
            label: marker.label.clone(),
            color: marker_color(marker.kind),
        })
        .collect();

    let summary_color = if metrics.is_empty() {
        NEUTRAL_COLOR
    } else {
        direction_style(metrics.total.non_negative).color
    };

    ChartConfig {
        kind: "line",
        labels: series
            .iter()
            .map(|sample| sample.date.format("%Y-%m-%d").to_string())
            .collect(),
        values: series.iter().map(|sample| sample.weight).collect(),
        unit: "kg",
        line_color: LINE_COLOR,
        markers,
        target_line: target.map(|target| target.kilograms),
        summary_color,
    }
}

fn marker_color(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::LocalMaximum | MarkerKind::SeriesMaximum => direction_style(true).color,
        MarkerKind::LocalMinimum | MarkerKind::SeriesMinimum => direction_style(false).color,
        MarkerKind::MonthBoundary => MONTH_COLOR,
    }
}
