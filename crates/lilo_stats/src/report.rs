//! Scope-parametrized statistics report.
//!
//! The same pipeline serves the personal statistics screen (one user) and
//! the manager screen (whole team); only the record filter differs.

use lilo_client::{DEFAULT_PAGE_SIZE, MoodQuery};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::daily::{DailyAggregates, DayRule, aggregate_daily_with};
use crate::error::StatsResult;
use crate::normalize::{MoodRecord, Normalized};
use crate::ranking::{DEFAULT_TOP_N, RankedValue, top_drinks, top_emotions};
use crate::trend::{TrendPoint, TrendValue, build_trend};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "userId", rename_all = "lowercase")]
pub enum Scope {
    User(String),
    Team,
}

impl Scope {
    /// Records without an owner reference are kept in a user scope: the
    /// backend already filtered them and often omits the relation.
    pub fn includes(&self, record: &MoodRecord) -> bool {
        match self {
            Scope::Team => true,
            Scope::User(id) => record.user_id.as_deref().is_none_or(|owner| owner == id),
        }
    }

    /// Backend query for every page of this scope's moods.
    pub fn query(&self) -> MoodQuery {
        let user_id = match self {
            Scope::User(id) => Some(id.clone()),
            Scope::Team => None,
        };
        MoodQuery {
            user_id,
            page_size: Some(DEFAULT_PAGE_SIZE),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::User(id) => write!(f, "user:{id}"),
            Scope::Team => f.write_str("team"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReportOptions {
    pub top_n: usize,
    pub trend_value: TrendValue,
    pub include_emotions: bool,
    pub day_rule: DayRule,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            trend_value: TrendValue::Average,
            include_emotions: true,
            day_rule: DayRule::Utc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsReport {
    pub scope: Scope,
    pub record_count: usize,
    pub dropped: usize,
    pub daily: DailyAggregates,
    pub trend: Vec<TrendPoint>,
    pub top_drinks: Vec<RankedValue>,
    pub top_emotions: Vec<RankedValue>,
}

impl StatsReport {
    pub fn build(normalized: &Normalized, scope: &Scope, options: &ReportOptions) -> Self {
        let records: Vec<MoodRecord> = normalized
            .records
            .iter()
            .filter(|r| scope.includes(r))
            .cloned()
            .collect();

        let daily = aggregate_daily_with(&records, options.day_rule);
        let trend = build_trend(&daily, options.trend_value);
        let top_emotions = if options.include_emotions {
            top_emotions(&records, options.top_n)
        } else {
            Vec::new()
        };

        Self {
            scope: scope.clone(),
            record_count: records.len(),
            dropped: normalized.dropped,
            top_drinks: top_drinks(&records, options.top_n),
            top_emotions,
            daily,
            trend,
        }
    }
}

/// JSON Schema of [`StatsReport`].
pub fn report_schema() -> StatsResult<serde_json::Value> {
    Ok(serde_json::to_value(schemars::schema_for!(StatsReport))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_items;
    use serde_json::json;

    fn sample() -> Normalized {
        normalize_items(&[
            json!({"Mood": "Happy", "Date": "2025-01-01T10:00:00Z", "Boisson": "Eau", "utilisateur": 1}),
            json!({"Mood": "Depressed", "Date": "2025-01-01T11:00:00Z", "Boisson": "Cafe", "utilisateur": 2}),
            json!({"Mood": "Neutre", "Date": "2025-01-02T09:00:00Z", "Emotion": ["Fier"], "utilisateur": 1}),
            json!({"Date": "2025-01-03T09:00:00Z"}),
        ])
    }

    #[test]
    fn team_scope_keeps_everything() {
        let report = StatsReport::build(&sample(), &Scope::Team, &ReportOptions::default());
        assert_eq!(report.record_count, 3);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.daily.len(), 2);
        assert_eq!(report.top_drinks.len(), 2);
    }

    #[test]
    fn user_scope_filters_foreign_records() {
        let report = StatsReport::build(&sample(), &Scope::User("1".into()), &ReportOptions::default());
        assert_eq!(report.record_count, 2);
        let day = report.daily.get_key("2025-01-01").expect("day");
        assert_eq!(day.record_count, 1);
        assert_eq!(report.top_drinks[0].value, "Eau");
        assert_eq!(report.top_emotions[0].value, "Fier");
    }

    #[test]
    fn user_scope_keeps_unowned_records() {
        let n = normalize_items(&[json!({"Mood": "Happy", "Date": "2025-01-01"})]);
        let report = StatsReport::build(&n, &Scope::User("9".into()), &ReportOptions::default());
        assert_eq!(report.record_count, 1);
    }

    #[test]
    fn emotions_can_be_left_out() {
        let options = ReportOptions {
            include_emotions: false,
            ..ReportOptions::default()
        };
        let report = StatsReport::build(&sample(), &Scope::Team, &options);
        assert!(report.top_emotions.is_empty());
    }

    #[test]
    fn scope_serializes_tagged() {
        assert_eq!(
            serde_json::to_value(Scope::User("4".into())).unwrap(),
            json!({"kind": "user", "userId": "4"})
        );
        assert_eq!(serde_json::to_value(Scope::Team).unwrap(), json!({"kind": "team"}));
        assert_eq!(Scope::Team.query().user_id, None);
        assert_eq!(Scope::User("4".into()).query().user_id.as_deref(), Some("4"));
        assert_eq!(Scope::Team.query().page_size, Some(DEFAULT_PAGE_SIZE));
        assert_eq!(Scope::User("4".into()).to_string(), "user:4");
    }

    #[test]
    fn schema_describes_report_fields() {
        let schema = report_schema().expect("schema");
        let props = schema.get("properties").expect("properties");
        assert!(props.get("daily").is_some());
        assert!(props.get("topDrinks").is_some());
    }
}
