use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// ViewKind – the fixed set of dashboard views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    TopMakesByCity,
    EvTypeDistribution,
    AvgRangeByMake,
    BaseMsrpOverYears,
    RangeDistribution,
    EvAdoption,
    MostCommonModels,
    CafvEligibility,
    EvMarketShare,
}

impl ViewKind {
    /// Every view, in menu order.
    pub const ALL: [ViewKind; 9] = [
        ViewKind::TopMakesByCity,
        ViewKind::EvTypeDistribution,
        ViewKind::AvgRangeByMake,
        ViewKind::BaseMsrpOverYears,
        ViewKind::RangeDistribution,
        ViewKind::EvAdoption,
        ViewKind::MostCommonModels,
        ViewKind::CafvEligibility,
        ViewKind::EvMarketShare,
    ];

    /// Stable kebab-case identifier (CLI flag value, JSON tag).
    pub fn id(self) -> &'static str {
        match self {
            ViewKind::TopMakesByCity => "top-makes-by-city",
            ViewKind::EvTypeDistribution => "ev-type-distribution",
            ViewKind::AvgRangeByMake => "avg-range-by-make",
            ViewKind::BaseMsrpOverYears => "base-msrp-over-years",
            ViewKind::RangeDistribution => "range-distribution",
            ViewKind::EvAdoption => "ev-adoption",
            ViewKind::MostCommonModels => "most-common-models",
            ViewKind::CafvEligibility => "cafv-eligibility",
            ViewKind::EvMarketShare => "ev-market-share",
        }
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            ViewKind::TopMakesByCity => "Top Makes By City",
            ViewKind::EvTypeDistribution => "EV Type Distribution",
            ViewKind::AvgRangeByMake => "Avg Range By Make",
            ViewKind::BaseMsrpOverYears => "Base MSRP Over Years",
            ViewKind::RangeDistribution => "Range Distribution",
            ViewKind::EvAdoption => "EV Adoption",
            ViewKind::MostCommonModels => "Most Common Models",
            ViewKind::CafvEligibility => "CAFV Eligibility",
            ViewKind::EvMarketShare => "EV Market Share",
        }
    }

    /// Chart heading.
    pub fn title(self) -> &'static str {
        match self {
            ViewKind::TopMakesByCity => "Top EV Makes in Major Cities",
            ViewKind::EvTypeDistribution => "EV Type Distribution",
            ViewKind::AvgRangeByMake => "Average Electric Range by Make",
            ViewKind::BaseMsrpOverYears => "Average Base MSRP Over Model Years",
            ViewKind::RangeDistribution => "Electric Range Distribution",
            ViewKind::EvAdoption => "EV Adoption Over Model Years",
            ViewKind::MostCommonModels => "Most Common EV Models",
            ViewKind::CafvEligibility => "CAFV Eligibility Breakdown",
            ViewKind::EvMarketShare => "EV Market Share by Make",
        }
    }

    /// Static explanation shown next to the chart.
    pub fn description(self) -> &'static str {
        match self {
            ViewKind::TopMakesByCity => {
                "Compares the most registered makes across the cities with the most EVs. \
                 Each city contributes its own leading makes, so a brand can appear because \
                 it dominates a single city."
            }
            ViewKind::EvTypeDistribution => {
                "Share of each electric vehicle type among registrations that report one."
            }
            ViewKind::AvgRangeByMake => {
                "Makes ranked by the average electric range of their registered vehicles."
            }
            ViewKind::BaseMsrpOverYears => {
                "Average base MSRP per model year. Vehicles without a reported MSRP are \
                 left out."
            }
            ViewKind::RangeDistribution => {
                "How many vehicles fall into each electric-range band, in miles."
            }
            ViewKind::EvAdoption => "Registrations per model year.",
            ViewKind::MostCommonModels => "The models with the most registrations.",
            ViewKind::CafvEligibility => {
                "Vehicles eligible for Clean Alternative Fuel Vehicle status versus all \
                 other reported eligibility states."
            }
            ViewKind::EvMarketShare => {
                "Each make's share of registrations; makes beyond the top of the list are \
                 grouped as Other."
            }
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown view '{0}' (expected one of: {})", known_ids())]
pub struct UnknownView(pub String);

fn known_ids() -> String {
    ViewKind::ALL
        .iter()
        .map(|v| v.id())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for ViewKind {
    type Err = UnknownView;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ViewKind::ALL
            .into_iter()
            .find(|v| v.id().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownView(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// ViewRequest – what the caller wants aggregated
// ---------------------------------------------------------------------------

/// An immutable request for one view. `None` limits fall back to the
/// view's defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViewRequest {
    pub kind: ViewKind,
    /// Number of ranked groups kept (cities for the city view).
    pub top_n: Option<usize>,
    /// Inner groups kept per outer group (makes per city).
    pub per_group_n: Option<usize>,
}

impl ViewRequest {
    pub fn new(kind: ViewKind) -> Self {
        ViewRequest {
            kind,
            top_n: None,
            per_group_n: None,
        }
    }

    pub fn with_top_n(self, n: usize) -> Self {
        ViewRequest {
            top_n: Some(n),
            ..self
        }
    }

    pub fn with_per_group_n(self, n: usize) -> Self {
        ViewRequest {
            per_group_n: Some(n),
            ..self
        }
    }
}

impl From<ViewKind> for ViewRequest {
    fn from(kind: ViewKind) -> Self {
        ViewRequest::new(kind)
    }
}
