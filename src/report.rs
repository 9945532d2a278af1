use std::fmt::Write;

use crate::chart::direction_style;
use crate::models::{ChartAnnotations, Delta, MarkerKind, MetricsResult, Sample, Target};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatLine {
    pub label: &'static str,
    pub value: String,
    pub color: Option<&'static str>,
}

fn delta_line(label: &'static str, delta: Delta) -> StatLine {
    let style = direction_style(delta.non_negative);
    StatLine {
        label,
        value: format!("{}{} kg", style.glyph, delta),
        color: Some(style.color),
    }
}

fn plain_line(label: &'static str, value: String) -> StatLine {
    StatLine {
        label,
        value,
        color: None,
    }
}

/// The stats panel shown next to the chart.
pub fn stat_lines(metrics: &MetricsResult, target: Option<Target>) -> Vec<StatLine> {
    let Some(actual) = metrics.actual else {
        return vec![plain_line("Samples", "No samples".to_string())];
    };

    let mut lines = vec![
        plain_line("Actual", format!("{actual:.2} kg")),
        delta_line("Change", metrics.change),
        delta_line("Trend (week)", metrics.trend_week),
        delta_line("This Week", metrics.this_week),
        delta_line("This Month", metrics.this_month),
        delta_line("Total", metrics.total),
    ];

    if let Some(consistency) = metrics.consistency {
        lines.push(plain_line("Consistency", format!("{consistency:.0}%")));
    }

    if let Some(target) = target {
        lines.push(plain_line("Target", format!("{:.2} kg", target.kilograms)));
        lines.push(delta_line(
            "To target",
            Delta::from_signed(target.kilograms - actual),
        ));
    }

    lines
}

pub fn build_report(
    source: &str,
    series: &[Sample],
    metrics: &MetricsResult,
    annotations: &ChartAnnotations,
    target: Option<Target>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Weight Trend Report");
    match (series.first(), series.last()) {
        (Some(first), Some(last)) => {
            let _ = writeln!(
                output,
                "Generated from {} ({} samples, {} to {})",
                source,
                series.len(),
                first.date,
                last.date
            );
        }
        _ => {
            let _ = writeln!(output, "Generated from {} (no samples)", source);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    for line in stat_lines(metrics, target) {
        let _ = writeln!(output, "- {}: {}", line.label, line.value);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Notable Points");

    let notable: Vec<_> = annotations
        .markers
        .iter()
        .filter(|marker| marker.kind != MarkerKind::MonthBoundary)
        .filter_map(|marker| series.get(marker.index).map(|sample| (marker, sample)))
        .collect();

    if notable.is_empty() {
        let _ = writeln!(output, "No notable points in this series.");
    } else {
        for (marker, sample) in notable {
            let _ = writeln!(
                output,
                "- {} on {}: {:.2} kg",
                describe_kind(marker.kind),
                sample.date,
                sample.weight
            );
        }
    }

    let months: Vec<&str> = annotations
        .of_kind(MarkerKind::MonthBoundary)
        .filter_map(|marker| marker.label.as_deref())
        .collect();
    if !months.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "Months covered: {}", months.join(", "));
    }

    output
}

fn describe_kind(kind: MarkerKind) -> &'static str {
    match kind {
        MarkerKind::LocalMaximum => "Local peak",
        MarkerKind::LocalMinimum => "Local dip",
        MarkerKind::SeriesMinimum => "Lowest weight",
        MarkerKind::SeriesMaximum => "Highest weight",
        MarkerKind::MonthBoundary => "Month start",
    }
}
