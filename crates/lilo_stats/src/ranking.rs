//! Top-N frequency ranking of categorical attributes.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::Serialize;

use crate::normalize::MoodRecord;

pub const DEFAULT_TOP_N: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub struct RankedValue {
    pub value: String,
    pub count: usize,
}

/// Count distinct non-blank values and keep the `n` most frequent.
///
/// Equal counts keep first-seen order.
pub fn rank_values<'a, I>(values: I, n: usize) -> Vec<RankedValue>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ranked: Vec<RankedValue> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for value in values {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match index.get(value) {
            Some(&i) => ranked[i].count += 1,
            None => {
                index.insert(value, ranked.len());
                ranked.push(RankedValue {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }
    // stable: ties stay in first-seen order
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked.truncate(n);
    ranked
}

/// Rank a single-valued attribute picked by `selector`.
pub fn top_n<F>(records: &[MoodRecord], selector: F, n: usize) -> Vec<RankedValue>
where
    F: Fn(&MoodRecord) -> Option<&str>,
{
    rank_values(records.iter().filter_map(selector), n)
}

pub fn top_drinks(records: &[MoodRecord], n: usize) -> Vec<RankedValue> {
    top_n(records, |r| r.drink.as_deref(), n)
}

/// Emotion tags are multi-valued; each tag on each record counts once.
pub fn top_emotions(records: &[MoodRecord], n: usize) -> Vec<RankedValue> {
    rank_values(
        records
            .iter()
            .flat_map(|r| r.emotions.iter().map(String::as_str)),
        n,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(pairs: &[(&str, usize)]) -> Vec<RankedValue> {
        pairs
            .iter()
            .map(|(v, c)| RankedValue {
                value: v.to_string(),
                count: *c,
            })
            .collect()
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let input = ["The", "Eau", "Cafe", "Eau", "Cafe", "Eau", "Cafe"];
        assert_eq!(
            rank_values(input, 2),
            ranked(&[("Eau", 3), ("Cafe", 3)])
        );
    }

    #[test]
    fn length_is_min_of_n_and_distinct() {
        assert_eq!(rank_values(["Jus", "Jus"], 3).len(), 1);
        assert_eq!(rank_values(["A", "B", "C", "D"], 3).len(), 3);
        assert!(rank_values(Vec::<&str>::new(), 3).is_empty());
        assert!(rank_values(["Eau"], 0).is_empty());
    }

    #[test]
    fn blank_values_are_ignored() {
        assert_eq!(rank_values(["", "  ", "Soda"], 3), ranked(&[("Soda", 1)]));
    }

    #[test]
    fn sorted_by_descending_count() {
        let out = rank_values(["Jus", "Soda", "Soda", "Sirop", "Sirop", "Sirop"], 3);
        assert_eq!(out, ranked(&[("Sirop", 3), ("Soda", 2), ("Jus", 1)]));
    }
}
