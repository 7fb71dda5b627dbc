//! Per-calendar-day aggregation of mood records.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use lilo_client::Mood;
use schemars::JsonSchema;
use serde::Serialize;

use crate::normalize::MoodRecord;

/// How a timestamp is truncated to its calendar day.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DayRule {
    /// The UTC date of the timestamp.
    #[default]
    Utc,
    /// The date as seen at a fixed UTC offset.
    Offset(FixedOffset),
}

impl DayRule {
    /// Offset in minutes east of UTC; out-of-range values yield `None`.
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        FixedOffset::east_opt(minutes.checked_mul(60)?).map(DayRule::Offset)
    }

    pub fn day_of(&self, ts: &DateTime<Utc>) -> NaiveDate {
        match self {
            DayRule::Utc => ts.date_naive(),
            DayRule::Offset(offset) => ts.with_timezone(offset).date_naive(),
        }
    }
}

/// Count of records per mood level, in canonical order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct MoodDistribution {
    pub counts: [usize; 5],
    pub unknown: usize,
}

impl MoodDistribution {
    fn add(&mut self, mood: Mood) {
        match mood.index() {
            Some(i) => self.counts[i] += 1,
            None => self.unknown += 1,
        }
    }

    pub fn count(&self, mood: Mood) -> usize {
        mood.index().map_or(self.unknown, |i| self.counts[i])
    }

    /// Most frequent known level; ties go to the level listed first in
    /// [`Mood::ALL`]. `Unknown` only when no known level was recorded.
    pub fn majority(&self) -> Mood {
        let mut best: Option<(Mood, usize)> = None;
        for (mood, &count) in Mood::ALL.iter().zip(self.counts.iter()) {
            if count == 0 {
                continue;
            }
            match best {
                Some((_, top)) if count <= top => {}
                _ => best = Some((*mood, count)),
            }
        }
        best.map_or(Mood::Unknown, |(mood, _)| mood)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum::<usize>() + self.unknown
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregate {
    pub majority_mood: Mood,
    pub average_score: f64,
    pub record_count: usize,
    pub distribution: MoodDistribution,
}

/// Day → aggregate, ordered by day. Only days with records appear.
#[derive(Clone, Debug, Default, PartialEq, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct DailyAggregates(BTreeMap<NaiveDate, DailyAggregate>);

impl DailyAggregates {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, day: &NaiveDate) -> Option<&DailyAggregate> {
        self.0.get(day)
    }

    /// Look a day up by its ISO key, e.g. `"2025-01-01"`.
    pub fn get_key(&self, key: &str) -> Option<&DailyAggregate> {
        let day = NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()?;
        self.0.get(&day)
    }

    /// Days in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &DailyAggregate)> {
        self.0.iter()
    }

    /// Calendar overlay: each day with its dominant mood.
    pub fn calendar(&self) -> impl Iterator<Item = (NaiveDate, Mood)> + '_ {
        self.0.iter().map(|(day, agg)| (*day, agg.majority_mood))
    }
}

/// Group records by UTC calendar day.
pub fn aggregate_daily(records: &[MoodRecord]) -> DailyAggregates {
    aggregate_daily_with(records, DayRule::Utc)
}

pub fn aggregate_daily_with(records: &[MoodRecord], rule: DayRule) -> DailyAggregates {
    let mut groups: BTreeMap<NaiveDate, (MoodDistribution, u32)> = BTreeMap::new();
    for record in records {
        let (dist, score_sum) = groups.entry(rule.day_of(&record.date)).or_default();
        dist.add(record.mood);
        *score_sum += u32::from(record.mood.score());
    }

    let days = groups
        .into_iter()
        .map(|(day, (distribution, score_sum))| {
            let record_count = distribution.total();
            let agg = DailyAggregate {
                majority_mood: distribution.majority(),
                average_score: f64::from(score_sum) / record_count as f64,
                record_count,
                distribution,
            };
            (day, agg)
        })
        .collect();
    DailyAggregates(days)
}
