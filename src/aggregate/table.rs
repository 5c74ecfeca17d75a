use super::group::{group_count, group_reduce, top_n, two_level_top, RankBy};
use super::histogram::{histogram, Bucket, RANGE_BUCKETS};
use super::insight;
use super::share::shares;
use super::view::{ViewKind, ViewRequest};
use super::{ChartKind, Series};
use crate::data::model::VehicleRecord;

pub type KeyFn = fn(&VehicleRecord) -> Option<String>;
pub type MetricFn = fn(&VehicleRecord) -> Option<f64>;

// ---------------------------------------------------------------------------
// Declarative view table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
pub enum Order {
    Rank(RankBy),
    KeyAscending,
}

/// Which primitive a view runs and with which selectors.
#[derive(Debug, Clone, Copy)]
pub enum Reduction {
    /// Group by `key`; plot `value` of each group. Without a metric every
    /// record counts as 1.
    Grouped {
        key: KeyFn,
        metric: Option<MetricFn>,
        value: RankBy,
        order: Order,
    },
    /// Rank `outer` groups by count, then `inner` groups within each.
    TwoLevel { outer: KeyFn, inner: KeyFn },
    /// Percentage of records with a key, descending.
    Share { key: KeyFn },
    Histogram {
        metric: MetricFn,
        buckets: &'static [Bucket],
    },
    /// Counts for a fixed, ordered label set produced by `key`.
    Categories {
        key: KeyFn,
        labels: &'static [&'static str],
    },
}

pub struct ViewSpec {
    pub kind: ViewKind,
    pub chart: ChartKind,
    pub x_axis: &'static str,
    pub y_axis: &'static str,
    pub series_name: &'static str,
    pub top_n: Option<usize>,
    pub per_group_n: Option<usize>,
    pub reduction: Reduction,
    pub insights: fn(&Computed) -> Vec<String>,
}

/// Output of a reduction before it is wrapped into an `AggregationResult`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Computed {
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    /// Record count behind each label (the outer total for two-level views).
    pub counts: Vec<usize>,
    /// Records that contributed to any group.
    pub qualifying: usize,
    /// Records in the dataset.
    pub records: usize,
}

impl Computed {
    /// Values of the first series.
    pub fn values(&self) -> &[f64] {
        self.series
            .first()
            .map(|s| s.values.as_slice())
            .unwrap_or(&[])
    }
}

pub const CAFV_ELIGIBLE: &str = "Clean Alternative Fuel Vehicle Eligible";
pub const ELIGIBLE_LABEL: &str = "Eligible";
pub const NON_ELIGIBLE_LABEL: &str = "Non-Eligible";

fn model_year_key(r: &VehicleRecord) -> Option<String> {
    r.model_year().map(|y| y.to_string())
}

/// A zero MSRP means "not reported".
fn reported_msrp(r: &VehicleRecord) -> Option<f64> {
    r.base_msrp().filter(|&p| p != 0.0)
}

fn cafv_class(r: &VehicleRecord) -> Option<String> {
    r.cafv_eligibility().map(|v| {
        if v == CAFV_ELIGIBLE {
            ELIGIBLE_LABEL.to_string()
        } else {
            NON_ELIGIBLE_LABEL.to_string()
        }
    })
}

/// Indexed by `ViewKind as usize`; order matches `ViewKind::ALL`.
static VIEWS: [ViewSpec; 9] = [
    ViewSpec {
        kind: ViewKind::TopMakesByCity,
        chart: ChartKind::GroupedBar,
        x_axis: "City",
        y_axis: "Number of Vehicles",
        series_name: "Vehicles",
        top_n: Some(5),
        per_group_n: Some(3),
        reduction: Reduction::TwoLevel {
            outer: VehicleRecord::city,
            inner: VehicleRecord::make,
        },
        insights: insight::top_makes_by_city,
    },
    ViewSpec {
        kind: ViewKind::EvTypeDistribution,
        chart: ChartKind::Doughnut,
        x_axis: "EV Type",
        y_axis: "Share (%)",
        series_name: "Share of vehicles (%)",
        top_n: None,
        per_group_n: None,
        reduction: Reduction::Share {
            key: VehicleRecord::ev_type,
        },
        insights: insight::ev_type_distribution,
    },
    ViewSpec {
        kind: ViewKind::AvgRangeByMake,
        chart: ChartKind::Bar,
        x_axis: "Make",
        y_axis: "Average Electric Range (miles)",
        series_name: "Avg Electric Range (miles)",
        top_n: Some(10),
        per_group_n: None,
        reduction: Reduction::Grouped {
            key: VehicleRecord::make,
            metric: Some(VehicleRecord::electric_range),
            value: RankBy::Average,
            order: Order::Rank(RankBy::Average),
        },
        insights: insight::avg_range_by_make,
    },
    ViewSpec {
        kind: ViewKind::BaseMsrpOverYears,
        chart: ChartKind::Line,
        x_axis: "Model Year",
        y_axis: "Average Base MSRP ($)",
        series_name: "Avg Base MSRP ($)",
        top_n: None,
        per_group_n: None,
        reduction: Reduction::Grouped {
            key: model_year_key,
            metric: Some(reported_msrp),
            value: RankBy::Average,
            order: Order::KeyAscending,
        },
        insights: insight::base_msrp_over_years,
    },
    ViewSpec {
        kind: ViewKind::RangeDistribution,
        chart: ChartKind::Bar,
        x_axis: "Electric Range (miles)",
        y_axis: "Number of Vehicles",
        series_name: "Number of Vehicles",
        top_n: None,
        per_group_n: None,
        reduction: Reduction::Histogram {
            metric: VehicleRecord::electric_range,
            buckets: &RANGE_BUCKETS,
        },
        insights: insight::range_distribution,
    },
    ViewSpec {
        kind: ViewKind::EvAdoption,
        chart: ChartKind::Line,
        x_axis: "Model Year",
        y_axis: "Number of Vehicles",
        series_name: "Number of EVs",
        top_n: None,
        per_group_n: None,
        reduction: Reduction::Grouped {
            key: model_year_key,
            metric: None,
            value: RankBy::Count,
            order: Order::KeyAscending,
        },
        insights: insight::ev_adoption,
    },
    ViewSpec {
        kind: ViewKind::MostCommonModels,
        chart: ChartKind::Bar,
        x_axis: "Model",
        y_axis: "Number of Vehicles",
        series_name: "Count of EVs",
        top_n: Some(10),
        per_group_n: None,
        reduction: Reduction::Grouped {
            key: VehicleRecord::model,
            metric: None,
            value: RankBy::Count,
            order: Order::Rank(RankBy::Count),
        },
        insights: insight::most_common_models,
    },
    ViewSpec {
        kind: ViewKind::CafvEligibility,
        chart: ChartKind::Pie,
        x_axis: "CAFV Eligibility",
        y_axis: "Number of Vehicles",
        series_name: "Vehicles",
        top_n: None,
        per_group_n: None,
        reduction: Reduction::Categories {
            key: cafv_class,
            labels: &[ELIGIBLE_LABEL, NON_ELIGIBLE_LABEL],
        },
        insights: insight::cafv_eligibility,
    },
    ViewSpec {
        kind: ViewKind::EvMarketShare,
        chart: ChartKind::Doughnut,
        x_axis: "Make",
        y_axis: "Share (%)",
        series_name: "Market share (%)",
        top_n: Some(10),
        per_group_n: None,
        reduction: Reduction::Share {
            key: VehicleRecord::make,
        },
        insights: insight::ev_market_share,
    },
];

pub fn spec_for(kind: ViewKind) -> &'static ViewSpec {
    &VIEWS[kind as usize]
}

// ---------------------------------------------------------------------------
// Running a reduction
// ---------------------------------------------------------------------------

impl ViewSpec {
    pub fn compute(&self, records: &[VehicleRecord], request: &ViewRequest) -> Computed {
        let limit = request.top_n.or(self.top_n);
        let mut out = match self.reduction {
            Reduction::Grouped {
                key,
                metric,
                value,
                order,
            } => {
                let groups = match metric {
                    Some(metric) => group_reduce(records, key, metric),
                    None => group_count(records, key),
                };
                let qualifying = groups.total_count();
                let mut entries = match order {
                    Order::Rank(by) => groups.ranked(by),
                    Order::KeyAscending => groups.by_key(),
                };
                if let Some(n) = limit {
                    entries = top_n(entries, n);
                }
                let values = entries
                    .iter()
                    .map(|(_, s)| s.metric(value))
                    .collect();
                Computed {
                    counts: entries.iter().map(|(_, s)| s.count).collect(),
                    labels: entries.into_iter().map(|(k, _)| k).collect(),
                    series: vec![Series::new(self.series_name, values)],
                    qualifying,
                    records: 0,
                }
            }
            Reduction::TwoLevel { outer, inner } => {
                let qualifying = records
                    .iter()
                    .filter(|&r| outer(r).is_some() && inner(r).is_some())
                    .count();
                let per_group = request.per_group_n.or(self.per_group_n).unwrap_or(usize::MAX);
                let table = two_level_top(
                    records,
                    outer,
                    inner,
                    limit.unwrap_or(usize::MAX),
                    per_group,
                );
                let series = table
                    .inner
                    .iter()
                    .zip(&table.counts)
                    .map(|(name, row)| Series::new(name, row.iter().map(|&c| c as f64).collect()))
                    .collect();
                Computed {
                    counts: table.outer.iter().map(|(_, c)| *c).collect(),
                    labels: table.outer.into_iter().map(|(o, _)| o).collect(),
                    series,
                    qualifying,
                    records: 0,
                }
            }
            Reduction::Share { key } => {
                let s = shares(records, key, limit);
                Computed {
                    labels: s.entries.iter().map(|e| e.label.clone()).collect(),
                    counts: s.entries.iter().map(|e| e.count).collect(),
                    series: vec![Series::new(
                        self.series_name,
                        s.entries.iter().map(|e| e.percent).collect(),
                    )],
                    qualifying: s.total,
                    records: 0,
                }
            }
            Reduction::Histogram { metric, buckets } => {
                let h = histogram(records, buckets, metric);
                Computed {
                    labels: h.labels.iter().map(|l| l.to_string()).collect(),
                    series: vec![Series::new(
                        self.series_name,
                        h.counts.iter().map(|&c| c as f64).collect(),
                    )],
                    qualifying: h.total(),
                    counts: h.counts,
                    records: 0,
                }
            }
            Reduction::Categories { key, labels } => {
                let groups = group_count(records, key);
                let counts: Vec<usize> = labels
                    .iter()
                    .map(|l| groups.get(l).map_or(0, |s| s.count))
                    .collect();
                Computed {
                    labels: labels.iter().map(|l| l.to_string()).collect(),
                    series: vec![Series::new(
                        self.series_name,
                        counts.iter().map(|&c| c as f64).collect(),
                    )],
                    qualifying: counts.iter().sum(),
                    counts,
                    records: 0,
                }
            }
        };
        out.records = records.len();
        // Labels without any series (no makes kept per city) are as empty
        // as no labels at all.
        if out.labels.is_empty() || out.series.is_empty() {
            out.labels.clear();
            out.counts.clear();
            out.series.clear();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{columns, FieldValue};

    fn rec(pairs: &[(&str, FieldValue)]) -> VehicleRecord {
        pairs.iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.into())
    }

    #[test]
    fn test_table_order_matches_view_kinds() {
        for (i, kind) in ViewKind::ALL.into_iter().enumerate() {
            assert_eq!(VIEWS[i].kind, kind);
            assert_eq!(spec_for(kind).kind, kind);
        }
    }

    #[test]
    fn test_top_makes_by_city_drops_fourth_city() {
        let mut records = Vec::new();
        let mut add = |city: &str, make: &str, n: usize| {
            for _ in 0..n {
                records.push(rec(&[(columns::CITY, text(city)), (columns::MAKE, text(make))]));
            }
        };
        add("Seattle", "TESLA", 5);
        add("Seattle", "NISSAN", 3);
        add("Redmond", "TESLA", 4);
        add("Kent", "KIA", 3);
        add("Yakima", "JEEP", 2);

        let spec = spec_for(ViewKind::TopMakesByCity);
        let req = ViewRequest::new(ViewKind::TopMakesByCity)
            .with_top_n(3)
            .with_per_group_n(1);
        let c = spec.compute(&records, &req);

        assert_eq!(c.labels, vec!["Seattle", "Redmond", "Kent"]);
        assert_eq!(c.counts, vec![8, 4, 3]);
        let names: Vec<&str> = c.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["TESLA", "KIA"]);
        assert_eq!(c.series[0].values, vec![5.0, 4.0, 0.0]);
        assert_eq!(c.series[1].values, vec![0.0, 0.0, 3.0]);
        assert_eq!(c.qualifying, 17);
    }

    #[test]
    fn test_msrp_skips_unreported_and_orders_years() {
        let records = vec![
            rec(&[(columns::MODEL_YEAR, FieldValue::Integer(2021)), (columns::BASE_MSRP, FieldValue::Integer(40000))]),
            rec(&[(columns::MODEL_YEAR, FieldValue::Integer(2019)), (columns::BASE_MSRP, FieldValue::Integer(0))]),
            rec(&[(columns::MODEL_YEAR, FieldValue::Integer(2019)), (columns::BASE_MSRP, FieldValue::Integer(30000))]),
            rec(&[(columns::MODEL_YEAR, FieldValue::Integer(2021)), (columns::BASE_MSRP, FieldValue::Integer(50000))]),
            rec(&[(columns::MODEL_YEAR, text("unknown")), (columns::BASE_MSRP, FieldValue::Integer(99999))]),
        ];
        let spec = spec_for(ViewKind::BaseMsrpOverYears);
        let c = spec.compute(&records, &ViewRequest::new(ViewKind::BaseMsrpOverYears));
        assert_eq!(c.labels, vec!["2019", "2021"]);
        assert_eq!(c.values(), &[30000.0, 45000.0]);
        assert_eq!(c.counts, vec![1, 2]);
        assert_eq!(c.qualifying, 3);
        assert_eq!(c.records, 5);
    }

    #[test]
    fn test_cafv_classes_and_excludes_missing() {
        let records = vec![
            rec(&[(columns::CAFV_ELIGIBILITY, text(CAFV_ELIGIBLE))]),
            rec(&[(columns::CAFV_ELIGIBILITY, text("Not eligible due to low battery range"))]),
            rec(&[(columns::CAFV_ELIGIBILITY, text(CAFV_ELIGIBLE))]),
            rec(&[(columns::MAKE, text("KIA"))]),
        ];
        let spec = spec_for(ViewKind::CafvEligibility);
        let c = spec.compute(&records, &ViewRequest::new(ViewKind::CafvEligibility));
        assert_eq!(c.labels, vec![ELIGIBLE_LABEL, NON_ELIGIBLE_LABEL]);
        assert_eq!(c.counts, vec![2, 1]);
        assert_eq!(c.qualifying, 3);
    }

    #[test]
    fn test_market_share_folds_other() {
        let mut records = Vec::new();
        for (make, n) in [("TESLA", 6), ("KIA", 2), ("BMW", 1), ("FORD", 1)] {
            for _ in 0..n {
                records.push(rec(&[(columns::MAKE, text(make))]));
            }
        }
        let spec = spec_for(ViewKind::EvMarketShare);
        let c = spec.compute(&records, &ViewRequest::new(ViewKind::EvMarketShare).with_top_n(2));
        assert_eq!(c.labels, vec!["TESLA", "KIA", "Other"]);
        assert_eq!(c.values(), &[60.0, 20.0, 20.0]);
    }

    #[test]
    fn test_adoption_counts_only_integer_years() {
        let records = vec![
            rec(&[(columns::MODEL_YEAR, FieldValue::Integer(2022))]),
            rec(&[(columns::MODEL_YEAR, FieldValue::Float(2022.5))]),
            rec(&[(columns::MODEL_YEAR, FieldValue::Integer(2020))]),
            rec(&[(columns::MODEL_YEAR, FieldValue::Integer(2022))]),
        ];
        let spec = spec_for(ViewKind::EvAdoption);
        let c = spec.compute(&records, &ViewRequest::new(ViewKind::EvAdoption));
        assert_eq!(c.labels, vec!["2020", "2022"]);
        assert_eq!(c.values(), &[1.0, 2.0]);
    }
}
