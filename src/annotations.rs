use chrono::Datelike;

use crate::error::ValidationError;
use crate::metrics::validate_series;
use crate::models::{ChartAnnotations, Marker, MarkerKind, Sample};

/// Picks the points worth highlighting on the weight chart.
///
/// Markers come back ordered by index, then by kind.
pub fn compute_chart_annotations(series: &[Sample]) -> Result<ChartAnnotations, ValidationError> {
    validate_series(series)?;

    let mut markers = Vec::new();
    if series.is_empty() {
        return Ok(ChartAnnotations { markers });
    }

    markers.extend(local_extrema(series));

    let (min_index, max_index) = series_extrema(series);
    markers.push(marker(min_index, MarkerKind::SeriesMinimum));
    markers.push(marker(max_index, MarkerKind::SeriesMaximum));

    markers.extend(month_boundaries(series));

    markers.sort_by_key(|marker| (marker.index, marker.kind));
    Ok(ChartAnnotations { markers })
}

fn marker(index: usize, kind: MarkerKind) -> Marker {
    Marker {
        index,
        kind,
        label: None,
    }
}

fn local_extrema(series: &[Sample]) -> Vec<Marker> {
    series
        .windows(3)
        .enumerate()
        .filter_map(|(offset, triple)| {
            let (prev, current, next) = (triple[0].weight, triple[1].weight, triple[2].weight);
            let index = offset + 1;
            if current > prev && current > next {
                Some(marker(index, MarkerKind::LocalMaximum))
            } else if current < prev && current < next {
                Some(marker(index, MarkerKind::LocalMinimum))
            } else {
                None
            }
        })
        .collect()
}

/// First-occurring indices of the lowest and highest weights.
fn series_extrema(series: &[Sample]) -> (usize, usize) {
    let mut min_index = 0;
    let mut max_index = 0;
    for (index, sample) in series.iter().enumerate().skip(1) {
        if sample.weight < series[min_index].weight {
            min_index = index;
        }
        if sample.weight > series[max_index].weight {
            max_index = index;
        }
    }
    (min_index, max_index)
}

fn month_boundaries(series: &[Sample]) -> Vec<Marker> {
    series
        .iter()
        .enumerate()
        .filter(|(index, sample)| {
            *index == 0 || {
                let previous = series[index - 1].date;
                (previous.year(), previous.month()) != (sample.date.year(), sample.date.month())
            }
        })
        .map(|(index, sample)| Marker {
            index,
            kind: MarkerKind::MonthBoundary,
            label: Some(sample.date.format("%B").to_string()),
        })
        .collect()
}
