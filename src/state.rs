use std::path::Path;

use anyhow::{Context, Result};

use ev_dashboard::aggregate::{aggregate, AggregationResult, ViewKind, ViewRequest};
use ev_dashboard::data::ingest::IngestState;
use ev_dashboard::data::source::{FileSource, TextSource};

use crate::cli::AppConfig;
use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loading state of the dataset.
    pub ingest: IngestState,

    /// Where the current dataset comes from.
    pub source_location: Option<String>,

    /// The view currently shown. Replaced, never mutated in place.
    pub request: ViewRequest,

    /// Aggregation of the current view (cached until the request or
    /// dataset changes).
    pub result: Option<AggregationResult>,

    /// Colours for the current result's labels / series.
    pub color_map: Option<ColorMap>,

    pub dark_mode: bool,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            ingest: IngestState::default(),
            source_location: None,
            request: ViewRequest::new(ViewKind::TopMakesByCity),
            result: None,
            color_map: None,
            dark_mode: true,
            status_message: None,
        }
    }
}

impl AppState {
    /// State for a fresh session; starts loading the configured file.
    pub fn new(config: &AppConfig) -> Self {
        let mut state = Self {
            request: config.initial_view,
            dark_mode: config.dark_mode,
            ..Self::default()
        };
        state.start_load(Box::new(FileSource::new(config.data_path.clone())));
        state
    }

    /// Begin loading a new dataset. Any current dataset is dropped.
    pub fn start_load(&mut self, source: Box<dyn TextSource>) {
        self.source_location = Some(source.describe());
        self.result = None;
        self.color_map = None;
        self.status_message = None;
        self.ingest = IngestState::start(source);
    }

    /// Advance a pending load; recompute the view once it is ready.
    /// Returns `true` when the load finished this call.
    pub fn poll_load(&mut self) -> bool {
        if !self.ingest.poll() {
            return false;
        }
        match self.ingest.error() {
            Some(e) => self.status_message = Some(format!("Error: {e}")),
            None => self.refresh(),
        }
        true
    }

    pub fn is_loading(&self) -> bool {
        self.ingest.is_pending()
    }

    /// Switch to `kind` with that view's default limits.
    pub fn select_view(&mut self, kind: ViewKind) {
        if self.request.kind != kind {
            self.set_request(ViewRequest::new(kind));
        }
    }

    /// Replace the current request and recompute.
    pub fn set_request(&mut self, request: ViewRequest) {
        self.request = request;
        self.refresh();
    }

    pub fn toggle_dark_mode(&mut self) {
        self.dark_mode = !self.dark_mode;
        self.rebuild_color_map();
    }

    /// Recompute the current view. No-op until a dataset is loaded.
    pub fn refresh(&mut self) {
        let Some(dataset) = self.ingest.dataset() else {
            return;
        };
        self.result = Some(aggregate(dataset, &self.request));
        self.rebuild_color_map();
    }

    /// Series are coloured by name when there are several, slices and
    /// bars by label otherwise.
    fn rebuild_color_map(&mut self) {
        self.color_map = self.result.as_ref().map(|r| {
            if r.series.len() > 1 {
                let names: Vec<&str> = r.series.iter().map(|s| s.name.as_str()).collect();
                ColorMap::new(&names, self.dark_mode)
            } else {
                ColorMap::new(&r.labels, self.dark_mode)
            }
        });
    }

    /// Write the current view's aggregation as pretty JSON.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let result = self
            .result
            .as_ref()
            .context("no view has been computed yet")?;
        let json = serde_json::to_string_pretty(result).context("serializing view")?;
        std::fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
