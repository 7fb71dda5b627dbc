//! Chronological mood trend for line charts.

use chrono::{Datelike, NaiveDate};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::daily::DailyAggregates;

/// Which per-day figure is plotted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TrendValue {
    /// Mean score over every record of the day.
    #[default]
    Average,
    /// Score of the day's majority mood.
    Majority,
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub label: String,
    pub value: f64,
}

/// Labels and values as parallel arrays, the shape chart widgets take.
#[derive(Clone, Debug, Default, PartialEq, Serialize, JsonSchema)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

/// `day/month` without zero padding, e.g. `1/1` or `24/12`.
pub fn day_month_label(day: NaiveDate) -> String {
    format!("{}/{}", day.day(), day.month())
}

/// One point per aggregated day, strictly ascending by date.
pub fn build_trend(daily: &DailyAggregates, value: TrendValue) -> Vec<TrendPoint> {
    daily
        .iter()
        .map(|(day, agg)| TrendPoint {
            date: *day,
            label: day_month_label(*day),
            value: match value {
                TrendValue::Average => agg.average_score,
                TrendValue::Majority => f64::from(agg.majority_mood.score()),
            },
        })
        .collect()
}

pub fn chart_series(points: &[TrendPoint]) -> ChartSeries {
    ChartSeries {
        labels: points.iter().map(|p| p.label.clone()).collect(),
        values: points.iter().map(|p| p.value).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daily::aggregate_daily;
    use crate::normalize::normalize_items;
    use serde_json::json;

    fn daily() -> DailyAggregates {
        let items = vec![
            json!({"Mood": "Neutre", "Date": "2025-01-02T09:00:00Z"}),
            json!({"Mood": "Happy", "Date": "2025-01-01T10:00:00Z"}),
            json!({"Mood": "Super_Happy", "Date": "2025-01-01T18:00:00Z"}),
        ];
        aggregate_daily(&normalize_items(&items).records)
    }

    #[test]
    fn average_trend_is_sorted_and_labelled() {
        let points = build_trend(&daily(), TrendValue::Average);
        let pairs: Vec<(&str, f64)> = points.iter().map(|p| (p.label.as_str(), p.value)).collect();
        assert_eq!(pairs, vec![("1/1", 4.5), ("2/1", 3.0)]);
    }

    #[test]
    fn majority_trend_uses_majority_score() {
        // tie between Happy and Super_Happy resolves to Super_Happy
        let points = build_trend(&daily(), TrendValue::Majority);
        assert_eq!(points[0].value, 5.0);
        assert_eq!(points[1].value, 3.0);
    }

    #[test]
    fn empty_daily_gives_empty_trend() {
        assert!(build_trend(&DailyAggregates::default(), TrendValue::Average).is_empty());
    }

    #[test]
    fn repeated_builds_are_identical() {
        let d = daily();
        assert_eq!(build_trend(&d, TrendValue::Average), build_trend(&d, TrendValue::Average));
    }

    #[test]
    fn chart_series_splits_points() {
        let series = chart_series(&build_trend(&daily(), TrendValue::Average));
        assert_eq!(series.labels, vec!["1/1", "2/1"]);
        assert_eq!(series.values, vec![4.5, 3.0]);
    }

    #[test]
    fn label_has_no_padding() {
        let d = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();
        assert_eq!(day_month_label(d), "24/12");
    }
}
