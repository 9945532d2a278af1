use chrono::Duration;
use clap::ValueEnum;

use crate::error::ValidationError;
use crate::models::{Delta, MetricsResult, Sample};

const WEEK_DAYS: i64 = 7;
const MONTH_DAYS: i64 = 30;

/// How the weekly and monthly windows are cut from the end of a series.
///
/// One policy covers `trend_week`, `this_week` and `this_month` together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WindowPolicy {
    /// Samples dated within the last N calendar days, counting the latest day.
    #[default]
    Calendar,
    /// The last N samples regardless of their dates.
    Count,
}

impl WindowPolicy {
    fn window(self, series: &[Sample], span: i64) -> &[Sample] {
        let Some(last) = series.last() else {
            return series;
        };

        match self {
            WindowPolicy::Calendar => {
                // No representable cutoff means every sample is in range.
                match last.date.checked_sub_signed(Duration::days(span)) {
                    Some(cutoff) => {
                        let start = series.partition_point(|sample| sample.date <= cutoff);
                        &series[start..]
                    }
                    None => series,
                }
            }
            WindowPolicy::Count => {
                let len = usize::try_from(span).unwrap_or(usize::MAX);
                &series[series.len().saturating_sub(len)..]
            }
        }
    }
}

pub fn validate_series(series: &[Sample]) -> Result<(), ValidationError> {
    for (index, sample) in series.iter().enumerate() {
        if !sample.weight.is_finite() {
            return Err(ValidationError::NonFiniteWeight {
                index,
                weight: sample.weight,
            });
        }

        if index > 0 {
            let previous = series[index - 1].date;
            if sample.date < previous {
                return Err(ValidationError::OutOfOrder {
                    index,
                    previous,
                    current: sample.date,
                });
            }
        }
    }

    Ok(())
}

pub fn compute_metrics(
    series: &[Sample],
    policy: WindowPolicy,
) -> Result<MetricsResult, ValidationError> {
    validate_series(series)?;

    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Ok(MetricsResult::empty());
    };

    let change = match series.len() {
        0 | 1 => 0.0,
        n => last.weight - series[n - 2].weight,
    };

    let weekly = per_sample_rate(policy.window(series, WEEK_DAYS));
    let monthly = per_sample_rate(policy.window(series, MONTH_DAYS));

    Ok(MetricsResult {
        sample_count: series.len(),
        actual: Some(last.weight),
        first: Some(first.weight),
        change: Delta::from_signed(change),
        total: Delta::from_signed(last.weight - first.weight),
        trend_week: Delta::from_signed(weekly),
        this_week: Delta::from_signed(weekly),
        this_month: Delta::from_signed(monthly),
        consistency: Some(consistency(series)),
    })
}

/// Average change per sample across the window.
pub fn per_sample_rate(window: &[Sample]) -> f64 {
    match (window.first(), window.last()) {
        (Some(first), Some(last)) if window.len() > 1 => {
            (last.weight - first.weight) / (window.len() - 1) as f64
        }
        _ => 0.0,
    }
}

fn consistency(series: &[Sample]) -> f64 {
    let days = match (series.first(), series.last()) {
        (Some(first), Some(last)) => (last.date - first.date).num_days(),
        _ => 0,
    };
    series.len() as f64 / days.max(1) as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap() + Duration::days(offset)
    }

    fn daily(weights: &[f64]) -> Vec<Sample> {
        weights
            .iter()
            .enumerate()
            .map(|(i, weight)| Sample::new(day(i as i64), *weight))
            .collect()
    }

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn empty_series_gives_empty_result() {
        for policy in [WindowPolicy::Calendar, WindowPolicy::Count] {
            let result = compute_metrics(&[], policy).unwrap();
            assert_eq!(result, MetricsResult::empty());
            assert!(result.is_empty());
            assert_eq!(result.actual, None);
            assert_eq!(result.consistency, None);
            assert_eq!(result.change, Delta::zero());
        }
    }

    #[test]
    fn single_sample_has_zero_changes() {
        let result = compute_metrics(&daily(&[10.0]), WindowPolicy::Calendar).unwrap();
        assert_eq!(result.actual, Some(10.0));
        assert_eq!(result.change, Delta::zero());
        assert_eq!(result.total, Delta::zero());
        assert_eq!(result.trend_week, Delta::zero());
        assert_eq!(result.this_month, Delta::zero());
        assert_eq!(result.consistency, Some(100.0));
        assert!(result.change.non_negative);
    }

    #[test]
    fn three_daily_samples() {
        let result = compute_metrics(&daily(&[70.0, 72.0, 69.0]), WindowPolicy::Count).unwrap();
        assert_eq!(result.actual, Some(69.0));
        assert_eq!(result.change.magnitude, 3.0);
        assert!(!result.change.non_negative);
        assert_eq!(result.total.magnitude, 1.0);
        assert!(!result.total.non_negative);
        assert!(approx(result.trend_week.signed(), -0.5));
        assert_eq!(result.sample_count, 3);
        assert!(approx(result.consistency.unwrap(), 150.0));
    }

    #[test]
    fn total_is_exact_difference() {
        let series = daily(&[81.3, 80.7, 80.9, 79.95, 80.05, 78.6]);
        let result = compute_metrics(&series, WindowPolicy::Calendar).unwrap();
        assert_eq!(
            result.total.signed(),
            result.actual.unwrap() - result.first.unwrap()
        );
        assert_eq!(result.total.signed(), 78.6 - 81.3);
    }

    #[test]
    fn weekly_fields_agree_under_both_policies() {
        let dates = [0, 1, 2, 9, 10, 11, 12];
        let weights = [80.0, 79.5, 79.0, 78.0, 77.8, 77.5, 77.0];
        let series: Vec<Sample> = dates
            .iter()
            .zip(weights)
            .map(|(offset, weight)| Sample::new(day(*offset), weight))
            .collect();

        let calendar = compute_metrics(&series, WindowPolicy::Calendar).unwrap();
        assert_eq!(calendar.trend_week, calendar.this_week);
        assert!(approx(calendar.trend_week.signed(), -1.0 / 3.0));

        let count = compute_metrics(&series, WindowPolicy::Count).unwrap();
        assert_eq!(count.trend_week, count.this_week);
        assert!(approx(count.trend_week.signed(), -0.5));
    }

    #[test]
    fn count_window_takes_last_seven_samples() {
        let series = daily(&[90.0, 85.0, 84.0, 83.0, 82.0, 81.0, 80.0, 79.0, 78.0]);
        assert_eq!(WindowPolicy::Count.window(&series, WEEK_DAYS).len(), 7);
        assert_eq!(WindowPolicy::Count.window(&series[..3], WEEK_DAYS).len(), 3);

        let result = compute_metrics(&series, WindowPolicy::Count).unwrap();
        assert!(approx(result.this_week.signed(), (78.0 - 84.0) / 6.0));
    }

    #[test]
    fn calendar_window_counts_the_latest_day() {
        let series = daily(&[70.0; 10]);
        let window = WindowPolicy::Calendar.window(&series, WEEK_DAYS);
        assert_eq!(window.len(), 7);
        assert_eq!(window[0].date, day(3));
    }

    #[test]
    fn calendar_window_near_earliest_date() {
        let series = vec![
            Sample::new(NaiveDate::MIN, 70.0),
            Sample::new(NaiveDate::MIN + Duration::days(2), 69.0),
        ];
        let result = compute_metrics(&series, WindowPolicy::Calendar).unwrap();
        assert_eq!(result.this_week.signed(), -1.0);
        assert_eq!(result.this_month.signed(), -1.0);
        assert_eq!(result.trend_week, result.this_week);
    }

    #[test]
    fn monthly_window_over_daily_samples() {
        let weights: Vec<f64> = (0..40).map(|i| 100.0 - i as f64 * 0.1).collect();
        let series = daily(&weights);

        for policy in [WindowPolicy::Calendar, WindowPolicy::Count] {
            let result = compute_metrics(&series, policy).unwrap();
            assert!((result.this_month.signed() + 0.1).abs() < 1e-6);
            assert!(!result.this_month.non_negative);
        }
    }

    #[test]
    fn consistency_measures_entries_per_day() {
        let series: Vec<Sample> = [0, 2, 4, 6]
            .iter()
            .map(|offset| Sample::new(day(*offset), 75.0))
            .collect();
        let result = compute_metrics(&series, WindowPolicy::Calendar).unwrap();
        assert!(approx(result.consistency.unwrap(), 4.0 / 6.0 * 100.0));
    }

    #[test]
    fn rejects_non_finite_weight() {
        let mut series = daily(&[70.0, 71.0, 72.0]);
        series[1].weight = f64::NAN;
        let err = compute_metrics(&series, WindowPolicy::Calendar).unwrap_err();
        assert!(matches!(err, ValidationError::NonFiniteWeight { index: 1, .. }));

        series[1].weight = f64::INFINITY;
        assert!(validate_series(&series).is_err());
    }

    #[test]
    fn rejects_descending_dates() {
        let series = vec![Sample::new(day(2), 70.0), Sample::new(day(1), 71.0)];
        let err = compute_metrics(&series, WindowPolicy::Count).unwrap_err();
        assert_eq!(
            err,
            ValidationError::OutOfOrder {
                index: 1,
                previous: day(2),
                current: day(1),
            }
        );
    }

    #[test]
    fn accepts_same_day_entries() {
        let series = vec![Sample::new(day(0), 70.0), Sample::new(day(0), 70.4)];
        let result = compute_metrics(&series, WindowPolicy::Calendar).unwrap();
        assert_eq!(result.consistency, Some(200.0));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let series = daily(&[72.4, 72.1, 71.9, 72.3, 71.5]);
        let first = compute_metrics(&series, WindowPolicy::Calendar).unwrap();
        let second = compute_metrics(&series, WindowPolicy::Calendar).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.this_week.magnitude.to_bits(), second.this_week.magnitude.to_bits());
    }
}
