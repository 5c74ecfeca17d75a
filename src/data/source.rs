use std::path::{Path, PathBuf};

use super::error::IngestError;

/// Location of the registration CSV relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data-to-visualize/Electric_Vehicle_Population_Data.csv";

/// Where the raw CSV text comes from.
///
/// The loader never touches the filesystem directly, so the parsing and
/// aggregation layers can be driven from memory in tests.
pub trait TextSource: Send {
    /// Fetch the whole document.
    fn fetch_text(&self) -> Result<String, IngestError>;

    /// Human-readable location, used in logs and the status bar.
    fn describe(&self) -> String;
}

// ---------------------------------------------------------------------------
// File on disk
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for FileSource {
    fn fetch_text(&self) -> Result<String, IngestError> {
        let bytes = std::fs::read(&self.path).map_err(|source| IngestError::SourceUnavailable {
            location: self.describe(),
            source,
        })?;
        String::from_utf8(bytes).map_err(|e| {
            IngestError::parse(None, format!("file is not valid UTF-8: {e}"))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// In-memory text
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct InlineSource {
    label: String,
    text: String,
}

impl InlineSource {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

impl TextSource for InlineSource {
    fn fetch_text(&self) -> Result<String, IngestError> {
        Ok(self.text.clone())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
