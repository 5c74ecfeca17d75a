//! Electric-vehicle registration dashboard: CSV ingestion and the
//! aggregations behind each chart view.
//!
//! The `ev-dashboard` binary layers an egui front end over these two
//! modules; everything here is UI-free and can be driven from tests.

pub mod aggregate;
pub mod data;
