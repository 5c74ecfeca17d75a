use thiserror::Error;

/// Failures that abort a load. Nothing else in the data layer is fatal:
/// missing fields and empty datasets degrade to empty aggregates.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("data source unavailable: {location}")]
    SourceUnavailable {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV parse error{}: {message}", line_suffix(.line))]
    Parse { line: Option<u64>, message: String },
}

fn line_suffix(line: &Option<u64>) -> String {
    match line {
        Some(l) => format!(" on line {l}"),
        None => String::new(),
    }
}

impl IngestError {
    pub fn parse(line: Option<u64>, message: impl Into<String>) -> Self {
        IngestError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Line the parser choked on, when known.
    pub fn line(&self) -> Option<u64> {
        match self {
            IngestError::Parse { line, .. } => *line,
            IngestError::SourceUnavailable { .. } => None,
        }
    }
}
