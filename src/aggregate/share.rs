use serde::Serialize;

use super::group::{group_count, RankBy};
use crate::data::model::VehicleRecord;

/// Label used for the folded remainder of a truncated share view.
pub const OTHER_LABEL: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    /// Percentage of the qualifying total, 0–100.
    pub percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Shares {
    pub entries: Vec<Share>,
    /// Records with a present key; the denominator of every share.
    pub total: usize,
}

/// Express each key's count as a percentage of the records that have a key.
///
/// Entries are ranked by descending share, ties in first-encountered order.
/// With `top_n`, groups past the first `n` are folded into a trailing
/// [`OTHER_LABEL`] entry so the shares still add up to 100; `Some(0)`
/// yields no entries at all.
pub fn shares<K>(records: &[VehicleRecord], key: K, top_n: Option<usize>) -> Shares
where
    K: Fn(&VehicleRecord) -> Option<String>,
{
    let groups = group_count(records, key);
    let total = groups.total_count();
    if total == 0 || top_n == Some(0) {
        return Shares {
            entries: Vec::new(),
            total,
        };
    }

    let percent = |count: usize| count as f64 / total as f64 * 100.0;
    let mut ranked = groups.ranked(RankBy::Count);

    let rest: Vec<_> = match top_n {
        Some(n) if n < ranked.len() => ranked.split_off(n),
        _ => Vec::new(),
    };

    let mut entries: Vec<Share> = ranked
        .into_iter()
        .map(|(label, stats)| Share {
            label,
            count: stats.count,
            percent: percent(stats.count),
        })
        .collect();

    let other: usize = rest.iter().map(|(_, s)| s.count).sum();
    if other > 0 {
        entries.push(Share {
            label: OTHER_LABEL.to_string(),
            count: other,
            percent: percent(other),
        });
    }

    Shares { entries, total }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{columns, FieldValue};

    fn typed(ev_type: Option<&str>) -> VehicleRecord {
        let value = ev_type.map_or(FieldValue::Null, |t| FieldValue::Text(t.into()));
        [(columns::EV_TYPE, value)].into_iter().collect()
    }

    #[test]
    fn test_shares_sum_to_100() {
        let records = vec![
            typed(Some("PHEV")),
            typed(Some("BEV")),
            typed(Some("BEV")),
        ];
        let s = shares(&records, VehicleRecord::ev_type, None);
        assert_eq!(s.total, 3);
        assert_eq!(s.entries[0].label, "BEV");
        assert_eq!(s.entries[1].label, "PHEV");
        let sum: f64 = s.entries.iter().map(|e| e.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_key_excluded_from_denominator() {
        let records = vec![typed(Some("BEV")), typed(None), typed(Some("PHEV")), typed(None)];
        let s = shares(&records, VehicleRecord::ev_type, None);
        assert_eq!(s.total, 2);
        assert_eq!(s.entries[0].percent, 50.0);
        assert_eq!(s.entries[1].percent, 50.0);
    }

    #[test]
    fn test_top_n_folds_rest_into_other() {
        let records = vec![
            typed(Some("A")),
            typed(Some("A")),
            typed(Some("A")),
            typed(Some("B")),
            typed(Some("B")),
            typed(Some("C")),
            typed(Some("D")),
        ];
        let s = shares(&records, VehicleRecord::ev_type, Some(2));
        let labels: Vec<&str> = s.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B", OTHER_LABEL]);
        assert_eq!(s.entries[2].count, 2);
        let sum: f64 = s.entries.iter().map(|e| e.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_top_n_edge_cases() {
        let records = vec![typed(Some("A")), typed(Some("B"))];
        assert!(shares(&records, VehicleRecord::ev_type, Some(0)).entries.is_empty());
        let all = shares(&records, VehicleRecord::ev_type, Some(10));
        assert_eq!(all.entries.len(), 2);
        assert!(all.entries.iter().all(|e| e.label != OTHER_LABEL));
    }
}
