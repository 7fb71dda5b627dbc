//! Canonical mood records built from raw backend items.
//!
//! Items come either flat (`{"id": 1, "Mood": "Happy", ...}`) or wrapped
//! (`{"id": 1, "attributes": {"Mood": "Happy", ...}}`) depending on the backend
//! version. Each field is looked up directly first, then under `attributes`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use lilo_client::Mood;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

pub const DROPPED_RECORDS_TOTAL: &str = "lilo_stats_dropped_records_total";

const ID_KEYS: &[&str] = &["id", "documentId"];
const MOOD_KEYS: &[&str] = &["Mood", "mood"];
const DATE_KEYS: &[&str] = &["Date", "date"];
const DATE_FALLBACK_KEYS: &[&str] = &["createdAt"];
const EMOTION_KEYS: &[&str] = &["Emotion", "emotions"];
const DRINK_KEYS: &[&str] = &["Boisson", "drink"];
const JOURNAL_KEYS: &[&str] = &["Journal", "journalText"];
const USER_KEYS: &[&str] = &["utilisateur", "userId"];

/// A mood entry after normalization. Never mutated once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodRecord {
    pub id: Option<String>,
    pub mood: Mood,
    pub emotions: Vec<String>,
    pub drink: Option<String>,
    pub journal_text: Option<String>,
    pub date: DateTime<Utc>,
    pub user_id: Option<String>,
}

/// Why a raw item was left out of aggregation.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DropReason {
    #[error("item is not an object")]
    NotAnObject,
    #[error("missing mood")]
    MissingMood,
    #[error("missing date")]
    MissingDate,
    #[error("date does not parse")]
    InvalidDate,
}

/// Records that survived normalization plus how many items were dropped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Normalized {
    pub records: Vec<MoodRecord>,
    pub dropped: usize,
}

/// Parse a backend timestamp into UTC.
///
/// Accepts RFC 3339 with any offset, naive `YYYY-MM-DDTHH:MM:SS[.fff]`
/// (taken as UTC) and bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Normalize one raw item.
pub fn normalize_item(item: &Value) -> Result<MoodRecord, DropReason> {
    let obj = item.as_object().ok_or(DropReason::NotAnObject)?;

    let mood = lookup(obj, MOOD_KEYS)
        .map(|v| v.as_str().map(Mood::parse).unwrap_or(Mood::Unknown))
        .ok_or(DropReason::MissingMood)?;

    let raw_date = lookup(obj, DATE_KEYS)
        .or_else(|| lookup(obj, DATE_FALLBACK_KEYS))
        .ok_or(DropReason::MissingDate)?;
    let date = raw_date
        .as_str()
        .and_then(parse_timestamp)
        .ok_or(DropReason::InvalidDate)?;

    Ok(MoodRecord {
        id: lookup(obj, ID_KEYS).and_then(scalar_string),
        mood,
        emotions: lookup(obj, EMOTION_KEYS).map(string_list).unwrap_or_default(),
        drink: lookup(obj, DRINK_KEYS).and_then(text),
        journal_text: lookup(obj, JOURNAL_KEYS).and_then(text),
        date,
        user_id: lookup(obj, USER_KEYS).and_then(reference_id),
    })
}

/// Normalize a whole payload, keeping input order and counting drops.
pub fn normalize_items(items: &[Value]) -> Normalized {
    let mut out = Normalized {
        records: Vec::with_capacity(items.len()),
        dropped: 0,
    };
    for (index, item) in items.iter().enumerate() {
        match normalize_item(item) {
            Ok(record) => out.records.push(record),
            Err(reason) => {
                tracing::debug!(index, %reason, "dropping mood item");
                out.dropped += 1;
            }
        }
    }
    if out.dropped > 0 {
        metrics::counter!(DROPPED_RECORDS_TOTAL).increment(out.dropped as u64);
    }
    out
}

/// First present value for `keys`, top level before `attributes`.
fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    let direct = keys.iter().find_map(|k| present(obj.get(*k)));
    direct.or_else(|| {
        let nested = obj.get("attributes")?.as_object()?;
        keys.iter().find_map(|k| present(nested.get(*k)))
    })
}

// null and blank strings count as absent
fn present(v: Option<&Value>) -> Option<&Value> {
    v.filter(|v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    })
}

fn text(v: &Value) -> Option<String> {
    v.as_str().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Relation reference: a bare id, `{id}` or the `{data: {id}}` wrapper.
fn reference_id(v: &Value) -> Option<String> {
    match v {
        Value::Object(obj) => obj
            .get("id")
            .and_then(scalar_string)
            .or_else(|| obj.get("data").and_then(reference_id)),
        other => scalar_string(other),
    }
}

fn string_list(v: &Value) -> Vec<String> {
    match v {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}
