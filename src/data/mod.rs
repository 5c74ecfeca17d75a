//! Data layer: core types, sources, parsing and the load state machine.
//!
//! Architecture:
//! ```text
//!   FileSource / InlineSource
//!        │  fetch_text
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse CSV → Dataset (all-or-nothing)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  ingest   │  Pending → Ready(Arc<Dataset>) | Failed(IngestError)
//!   └──────────┘
//!        │
//!        ▼
//!   crate::aggregate
//! ```

pub mod error;
pub mod ingest;
pub mod loader;
pub mod model;
pub mod source;

pub use error::IngestError;
pub use model::{Dataset, FieldValue, VehicleRecord};
