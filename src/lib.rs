//! SchoolReport - analytics engine for school data-collection forms.
//!
//! Classifies form fields, aggregates per-school responses by geography,
//! derives insights and compares entities. The engine works purely on
//! in-memory data; [`loader`] reads it from JSON files and [`report`]
//! assembles and renders the final payloads.

pub mod analysis;
pub mod loader;
pub mod models;
pub mod report;
