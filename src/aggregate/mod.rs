//! Aggregation layer: turns the loaded [`Dataset`] into chart-ready series.
//!
//! ```text
//!   ViewRequest ──► table::spec_for(kind) ──► Reduction
//!                                              │
//!             group · histogram · share  ◄─────┘
//!                        │
//!                        ▼
//!                    Computed ──► insight::* ──► AggregationResult
//! ```
//!
//! Everything here is a pure function of its inputs; the UI only ever
//! hands in a dataset and a request.
pub mod group;
pub mod histogram;
pub mod insight;
pub mod share;
pub mod table;
pub mod view;

use log::debug;
use serde::Serialize;

use crate::data::model::Dataset;
pub use view::{UnknownView, ViewKind, ViewRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    Bar,
    GroupedBar,
    Line,
    Pie,
    Doughnut,
}

/// One named series, aligned with [`AggregationResult::labels`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Series {
            name: name.into(),
            values,
        }
    }
}

/// Everything a chart needs for one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregationResult {
    pub view: ViewKind,
    pub chart: ChartKind,
    pub title: &'static str,
    pub x_axis: &'static str,
    pub y_axis: &'static str,
    pub labels: Vec<String>,
    pub series: Vec<Series>,
    pub insights: Vec<String>,
}

impl AggregationResult {
    fn empty(spec: &table::ViewSpec) -> Self {
        AggregationResult {
            view: spec.kind,
            chart: spec.chart,
            title: spec.kind.title(),
            x_axis: spec.x_axis,
            y_axis: spec.y_axis,
            labels: Vec::new(),
            series: Vec::new(),
            insights: Vec::new(),
        }
    }

    /// Nothing to draw: no labels, or no series plotted against them.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() || self.series.is_empty()
    }
}

/// Run the aggregator for `request` over `dataset`.
///
/// An empty dataset, or a request that keeps no groups, produces an empty
/// result rather than an error.
pub fn aggregate(dataset: &Dataset, request: &ViewRequest) -> AggregationResult {
    let spec = table::spec_for(request.kind);
    let mut result = AggregationResult::empty(spec);
    if dataset.is_empty() {
        return result;
    }

    let computed = spec.compute(&dataset.records, request);
    if computed.labels.is_empty() {
        debug!("{}: no groups to show", request.kind);
        return result;
    }

    if computed.qualifying > 0 {
        result.insights = (spec.insights)(&computed);
    }
    debug!(
        "{}: {} labels, {} series from {} qualifying records",
        request.kind,
        computed.labels.len(),
        computed.series.len(),
        computed.qualifying
    );
    result.labels = computed.labels;
    result.series = computed.series;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_csv;
    use crate::data::model::{columns, FieldValue, VehicleRecord};

    const FLEET: &str = "\
City,Model Year,Make,Model,Electric Vehicle Type,Clean Alternative Fuel Vehicle (CAFV) Eligibility,Electric Range,Base MSRP
Seattle,2020,TESLA,MODEL 3,Battery Electric Vehicle (BEV),Clean Alternative Fuel Vehicle Eligible,322,0
Seattle,2021,TESLA,MODEL Y,Battery Electric Vehicle (BEV),Eligibility unknown as battery range has not been researched,0,0
Seattle,2018,NISSAN,LEAF,Battery Electric Vehicle (BEV),Clean Alternative Fuel Vehicle Eligible,151,30000
Bellevue,2019,BMW,X5,Plug-in Hybrid Electric Vehicle (PHEV),Not eligible due to low battery range,30,60000
Bellevue,2021,TESLA,MODEL 3,Battery Electric Vehicle (BEV),Clean Alternative Fuel Vehicle Eligible,,
Tacoma,2018,CHEVROLET,VOLT,Plug-in Hybrid Electric Vehicle (PHEV),Clean Alternative Fuel Vehicle Eligible,53,34000
";

    fn fleet() -> Dataset {
        parse_csv(FLEET).unwrap()
    }

    #[test]
    fn test_empty_dataset_yields_empty_results() {
        let ds = Dataset::default();
        for kind in ViewKind::ALL {
            let result = aggregate(&ds, &ViewRequest::new(kind));
            assert!(result.labels.is_empty(), "{kind}");
            assert!(result.series.is_empty(), "{kind}");
            assert!(result.insights.is_empty(), "{kind}");
            assert_eq!(result.view, kind);
        }
    }

    #[test]
    fn test_every_view_produces_output_for_fleet() {
        let ds = fleet();
        for kind in ViewKind::ALL {
            let result = aggregate(&ds, &ViewRequest::new(kind));
            assert!(!result.labels.is_empty(), "{kind}");
            assert!(!result.insights.is_empty(), "{kind}");
            for s in &result.series {
                assert_eq!(s.values.len(), result.labels.len(), "{kind}");
            }
        }
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let ds = fleet();
        for kind in ViewKind::ALL {
            let req = ViewRequest::new(kind);
            assert_eq!(aggregate(&ds, &req), aggregate(&ds, &req), "{kind}");
        }
    }

    #[test]
    fn test_top_n_zero_is_empty() {
        let ds = fleet();
        for kind in [
            ViewKind::TopMakesByCity,
            ViewKind::AvgRangeByMake,
            ViewKind::MostCommonModels,
            ViewKind::EvMarketShare,
            ViewKind::EvTypeDistribution,
        ] {
            let result = aggregate(&ds, &ViewRequest::new(kind).with_top_n(0));
            assert!(result.is_empty(), "{kind}");
            assert!(result.series.is_empty(), "{kind}");
            assert!(result.insights.is_empty(), "{kind}");
        }
    }

    #[test]
    fn test_no_makes_per_city_is_empty() {
        let request = ViewRequest::new(ViewKind::TopMakesByCity).with_per_group_n(0);
        let result = aggregate(&fleet(), &request);
        assert!(result.is_empty());
        assert!(result.labels.is_empty());
        assert!(result.series.is_empty());
        assert!(result.insights.is_empty());
    }

    #[test]
    fn test_ev_type_insights_do_not_name_other_as_a_type() {
        let ds = parse_csv("Electric Vehicle Type\nBEV\nBEV\nPHEV\nFCEV\n").unwrap();
        let request = ViewRequest::new(ViewKind::EvTypeDistribution).with_top_n(1);
        let result = aggregate(&ds, &request);
        assert_eq!(result.labels, vec!["BEV", share::OTHER_LABEL]);
        assert_eq!(
            result.insights,
            vec![
                "The most common EV type is BEV, accounting for 50.00% of vehicles.",
                "The remaining EV types together account for 50.00%.",
            ]
        );
    }

    #[test]
    fn test_top_n_larger_than_groups_keeps_all() {
        let ds = fleet();
        let result = aggregate(&ds, &ViewRequest::new(ViewKind::MostCommonModels).with_top_n(50));
        assert_eq!(result.labels.len(), 5);
    }

    #[test]
    fn test_avg_range_scenario() {
        let rec = |make: &str, range: i64| -> VehicleRecord {
            [
                (columns::MAKE, FieldValue::Text(make.into())),
                (columns::ELECTRIC_RANGE, FieldValue::Integer(range)),
            ]
            .into_iter()
            .collect()
        };
        let ds = Dataset::from_records(vec![rec("Tesla", 300), rec("Tesla", 250), rec("Nissan", 150)]);
        let result = aggregate(&ds, &ViewRequest::new(ViewKind::AvgRangeByMake));

        assert_eq!(result.chart, ChartKind::Bar);
        assert_eq!(result.labels, vec!["Tesla", "Nissan"]);
        assert_eq!(result.series[0].values, vec![275.0, 150.0]);
        assert_eq!(
            result.insights[0],
            "Tesla has the highest average electric range, at 275.00 miles."
        );
    }

    #[test]
    fn test_range_distribution_scenario() {
        let rec = |v: FieldValue| -> VehicleRecord {
            [(columns::ELECTRIC_RANGE, v)].into_iter().collect()
        };
        let ds = Dataset::from_records(vec![
            rec(FieldValue::Integer(40)),
            rec(FieldValue::Integer(60)),
            rec(FieldValue::Null),
        ]);
        let result = aggregate(&ds, &ViewRequest::new(ViewKind::RangeDistribution));
        assert_eq!(result.labels.len(), 8);
        assert_eq!(result.labels[0], "0-50");
        assert_eq!(result.series[0].values, vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(result.insights[0], "2 vehicles report an electric range.");
    }

    #[test]
    fn test_range_distribution_without_ranges_keeps_buckets() {
        let ds = Dataset::from_records(vec![[(columns::MAKE, FieldValue::Text("KIA".into()))]
            .into_iter()
            .collect()]);
        let result = aggregate(&ds, &ViewRequest::new(ViewKind::RangeDistribution));
        assert_eq!(result.labels.len(), 8);
        assert!(result.series[0].values.iter().all(|&v| v == 0.0));
        assert!(result.insights.is_empty());
    }

    #[test]
    fn test_result_serializes() {
        let result = aggregate(&fleet(), &ViewRequest::new(ViewKind::CafvEligibility));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["view"], "cafv-eligibility");
        assert_eq!(json["chart"], "pie");
        assert_eq!(json["labels"][0], "Eligible");
    }
}
