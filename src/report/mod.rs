//! Report assembly and rendering.

pub mod builder;
pub mod generator;

pub use builder::{analyze_form, build_comparison, build_report, ComparisonRequest, ReportOptions};
pub use generator::*;
