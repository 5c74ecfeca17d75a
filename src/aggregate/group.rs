use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::data::model::VehicleRecord;

// ---------------------------------------------------------------------------
// Per-group running totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub sum: f64,
}

impl GroupStats {
    pub fn average(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }

    /// The figure a group is ranked and plotted by.
    pub fn metric(&self, by: RankBy) -> f64 {
        match by {
            RankBy::Count => self.count as f64,
            RankBy::Average => self.average(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankBy {
    Count,
    Average,
}

// ---------------------------------------------------------------------------
// Groups – insertion-ordered key → stats
// ---------------------------------------------------------------------------

/// Grouped totals keyed by label, remembering first-encountered order so
/// that ranking ties resolve deterministically.
#[derive(Debug, Clone, Default)]
pub struct Groups {
    entries: Vec<(String, GroupStats)>,
    index: HashMap<String, usize>,
}

impl Groups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one value into `key`'s group. Returns the group's position.
    pub fn add(&mut self, key: String, value: f64) -> usize {
        let pos = match self.index.get(&key) {
            Some(&pos) => pos,
            None => {
                let pos = self.entries.len();
                self.index.insert(key.clone(), pos);
                self.entries.push((key, GroupStats::default()));
                pos
            }
        };
        let stats = &mut self.entries[pos].1;
        stats.count += 1;
        stats.sum += value;
        pos
    }

    pub fn get(&self, key: &str) -> Option<&GroupStats> {
        self.index.get(key).map(|&pos| &self.entries[pos].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Groups in first-encountered order.
    pub fn entries(&self) -> &[(String, GroupStats)] {
        &self.entries
    }

    /// Sum of counts over all groups.
    pub fn total_count(&self) -> usize {
        self.entries.iter().map(|(_, s)| s.count).sum()
    }

    /// Descending by `by`; ties keep first-encountered order.
    pub fn ranked(&self, by: RankBy) -> Vec<(String, GroupStats)> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| b.1.metric(by).total_cmp(&a.1.metric(by)));
        out
    }

    /// Ascending by key; keys that both parse as numbers compare numerically.
    pub fn by_key(&self) -> Vec<(String, GroupStats)> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| compare_keys(&a.0, &b.0));
        out
    }
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        _ => a.cmp(b),
    }
}

// ---------------------------------------------------------------------------
// Group-and-reduce
// ---------------------------------------------------------------------------

/// Group `records` by `key` and accumulate `metric`.
///
/// A record contributes only when both its key and metric are present;
/// missing values are skipped, never treated as zero.
pub fn group_reduce<K, M>(records: &[VehicleRecord], key: K, metric: M) -> Groups
where
    K: Fn(&VehicleRecord) -> Option<String>,
    M: Fn(&VehicleRecord) -> Option<f64>,
{
    let mut groups = Groups::new();
    for rec in records {
        let (Some(k), Some(v)) = (key(rec), metric(rec)) else {
            continue;
        };
        groups.add(k, v);
    }
    groups
}

/// Count records per key.
pub fn group_count<K>(records: &[VehicleRecord], key: K) -> Groups
where
    K: Fn(&VehicleRecord) -> Option<String>,
{
    group_reduce(records, key, |_| Some(1.0))
}

/// Keep the first `n` entries. `n` larger than the input keeps everything.
pub fn top_n<T>(mut entries: Vec<T>, n: usize) -> Vec<T> {
    entries.truncate(n);
    entries
}

// ---------------------------------------------------------------------------
// Two-level selection (outer × inner)
// ---------------------------------------------------------------------------

/// Result of ranking outer groups, then inner groups within each kept
/// outer group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TwoLevel {
    /// Kept outer keys with their total counts, in rank order.
    pub outer: Vec<(String, usize)>,
    /// Union of every kept outer group's top inner keys, first-appearance
    /// order.
    pub inner: Vec<String>,
    /// `counts[i][j]` = records with inner key `inner[i]` in outer group
    /// `outer[j]` (0 when absent).
    pub counts: Vec<Vec<usize>>,
}

/// Rank outer keys by total count and keep `top_outer`; within each kept
/// outer key rank inner keys and keep `top_inner`. The inner key set is
/// the union of those local winners, so a key can appear because it
/// dominates a single outer group. Dropped outer groups never contribute.
pub fn two_level_top<O, I>(
    records: &[VehicleRecord],
    outer_key: O,
    inner_key: I,
    top_outer: usize,
    top_inner: usize,
) -> TwoLevel
where
    O: Fn(&VehicleRecord) -> Option<String>,
    I: Fn(&VehicleRecord) -> Option<String>,
{
    let mut outer = Groups::new();
    let mut inner: Vec<Groups> = Vec::new();

    for rec in records {
        let (Some(o), Some(i)) = (outer_key(rec), inner_key(rec)) else {
            continue;
        };
        let pos = outer.add(o, 1.0);
        if pos == inner.len() {
            inner.push(Groups::new());
        }
        inner[pos].add(i, 1.0);
    }

    let kept = top_n(outer.ranked(RankBy::Count), top_outer);

    let mut union: Vec<String> = Vec::new();
    for (o, _) in &kept {
        let Some(&pos) = outer.index.get(o) else {
            continue;
        };
        for (i, _) in top_n(inner[pos].ranked(RankBy::Count), top_inner) {
            if !union.contains(&i) {
                union.push(i);
            }
        }
    }

    let counts = union
        .iter()
        .map(|i| {
            kept.iter()
                .map(|(o, _)| {
                    outer
                        .index
                        .get(o)
                        .and_then(|&pos| inner[pos].get(i))
                        .map_or(0, |s| s.count)
                })
                .collect()
        })
        .collect();

    TwoLevel {
        outer: kept.into_iter().map(|(o, s)| (o, s.count)).collect(),
        inner: union,
        counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{columns, FieldValue};

    fn rec(pairs: &[(&str, FieldValue)]) -> VehicleRecord {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    fn make_range(make: &str, range: Option<i64>) -> VehicleRecord {
        rec(&[
            (columns::MAKE, FieldValue::Text(make.into())),
            (
                columns::ELECTRIC_RANGE,
                range.map_or(FieldValue::Null, FieldValue::Integer),
            ),
        ])
    }

    fn city_make(city: &str, make: &str) -> VehicleRecord {
        rec(&[
            (columns::CITY, FieldValue::Text(city.into())),
            (columns::MAKE, FieldValue::Text(make.into())),
        ])
    }

    #[test]
    fn test_average_range_by_make() {
        let records = vec![
            make_range("Tesla", Some(300)),
            make_range("Tesla", Some(250)),
            make_range("Nissan", Some(150)),
        ];
        let groups = group_reduce(&records, VehicleRecord::make, VehicleRecord::electric_range);
        let ranked = groups.ranked(RankBy::Average);

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, "Tesla");
        assert_eq!(ranked[0].1.average(), 275.0);
        assert_eq!(ranked[1].0, "Nissan");
        assert_eq!(ranked[1].1.average(), 150.0);
    }

    #[test]
    fn test_missing_metric_is_skipped_not_zeroed() {
        let records = vec![
            make_range("Kia", Some(200)),
            make_range("Kia", None),
            make_range("Kia", Some(100)),
        ];
        let groups = group_reduce(&records, VehicleRecord::make, VehicleRecord::electric_range);
        let kia = groups.get("Kia").unwrap();
        assert_eq!(kia.count, 2);
        assert_eq!(kia.average(), 150.0);
    }

    #[test]
    fn test_counts_sum_to_records_with_key() {
        let records = vec![
            make_range("Tesla", None),
            make_range("Kia", None),
            rec(&[(columns::MODEL, FieldValue::Text("LEAF".into()))]),
            make_range("  ", None),
            make_range("Tesla", None),
        ];
        let groups = group_count(&records, VehicleRecord::make);
        assert_eq!(groups.total_count(), 3);
        assert_eq!(groups.len(), 2);
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let records = vec![
            make_range("Ford", None),
            make_range("Audi", None),
            make_range("Kia", None),
            make_range("Audi", None),
            make_range("Kia", None),
            make_range("Ford", None),
        ];
        let groups = group_count(&records, VehicleRecord::make);
        let first: Vec<String> = groups.ranked(RankBy::Count).into_iter().map(|(k, _)| k).collect();
        let second: Vec<String> = groups.ranked(RankBy::Count).into_iter().map(|(k, _)| k).collect();
        assert_eq!(first, vec!["Ford", "Audi", "Kia"]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_by_key_sorts_numbers_numerically() {
        let mut groups = Groups::new();
        for year in ["2021", "998", "2010", "2021"] {
            groups.add(year.to_string(), 1.0);
        }
        let keys: Vec<String> = groups.by_key().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["998", "2010", "2021"]);
    }

    #[test]
    fn test_top_n_bounds() {
        let v = vec![1, 2, 3];
        assert!(top_n(v.clone(), 0).is_empty());
        assert_eq!(top_n(v.clone(), 2), vec![1, 2]);
        assert_eq!(top_n(v, 10), vec![1, 2, 3]);
    }

    #[test]
    fn test_two_level_union_of_local_winners() {
        let mut records = Vec::new();
        // Seattle: Tesla 4, Nissan 2, Kia 1
        for _ in 0..4 {
            records.push(city_make("Seattle", "Tesla"));
        }
        for _ in 0..2 {
            records.push(city_make("Seattle", "Nissan"));
        }
        records.push(city_make("Seattle", "Kia"));
        // Bothell: Chevrolet 3, Tesla 1
        for _ in 0..3 {
            records.push(city_make("Bothell", "Chevrolet"));
        }
        records.push(city_make("Bothell", "Tesla"));
        // Yakima: Jeep 2 (third city, dropped with top_outer = 2)
        for _ in 0..2 {
            records.push(city_make("Yakima", "Jeep"));
        }

        let result = two_level_top(&records, VehicleRecord::city, VehicleRecord::make, 2, 1);
        assert_eq!(
            result.outer,
            vec![("Seattle".to_string(), 7), ("Bothell".to_string(), 4)]
        );
        assert_eq!(result.inner, vec!["Tesla", "Chevrolet"]);
        assert_eq!(result.counts, vec![vec![4, 1], vec![0, 3]]);
    }

    #[test]
    fn test_two_level_zero_outer_is_empty() {
        let records = vec![city_make("Seattle", "Tesla")];
        let result = two_level_top(&records, VehicleRecord::city, VehicleRecord::make, 0, 3);
        assert!(result.outer.is_empty());
        assert!(result.inner.is_empty());
        assert!(result.counts.is_empty());
    }
}
