use std::path::PathBuf;

use clap::Parser;

use ev_dashboard::aggregate::{ViewKind, ViewRequest};
use ev_dashboard::data::source::DEFAULT_DATA_PATH;

/// EV Dashboard - explore electric-vehicle registration data
///
/// Loads a registration CSV and shows it through nine chart views with
/// derived insights.
///
/// Examples:
///   ev-dashboard
///   ev-dashboard --data ./Electric_Vehicle_Population_Data.csv
///   ev-dashboard --view avg-range-by-make --top 5 --light
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// CSV file to load at start-up
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = DEFAULT_DATA_PATH,
        env = "EV_DASHBOARD_DATA"
    )]
    pub data: PathBuf,

    /// View shown first
    #[arg(long, value_name = "VIEW", default_value = "top-makes-by-city")]
    pub view: ViewKind,

    /// Override the number of ranked groups for the first view
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Start in light mode
    #[arg(long)]
    pub light: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Start-up settings handed to the app.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub initial_view: ViewRequest,
    pub dark_mode: bool,
}

impl Args {
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }

    pub fn into_config(self) -> AppConfig {
        let mut initial_view = ViewRequest::new(self.view);
        if let Some(n) = self.top {
            initial_view = initial_view.with_top_n(n);
        }
        AppConfig {
            data_path: self.data,
            initial_view,
            dark_mode: !self.light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["ev-dashboard", "--data", "fleet.csv"]).unwrap();
        assert_eq!(args.log_level(), "info");
        let config = args.into_config();
        assert_eq!(config.data_path, PathBuf::from("fleet.csv"));
        assert_eq!(config.initial_view, ViewRequest::new(ViewKind::TopMakesByCity));
        assert!(config.dark_mode);
    }

    #[test]
    fn test_view_and_flags() {
        let args = Args::try_parse_from([
            "ev-dashboard",
            "--data",
            "fleet.csv",
            "--view",
            "most-common-models",
            "--top",
            "5",
            "--light",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.log_level(), "debug");
        let config = args.into_config();
        assert_eq!(
            config.initial_view,
            ViewRequest::new(ViewKind::MostCommonModels).with_top_n(5)
        );
        assert!(!config.dark_mode);
    }

    #[test]
    fn test_unknown_view_rejected() {
        let result = Args::try_parse_from(["ev-dashboard", "--view", "scatter"]);
        assert!(result.is_err());
    }
}
