//! Field analysis engine.
//!
//! Classification, aggregation, insight generation and entity comparison
//! over in-memory form responses. Every function here is pure and keeps
//! no state between calls.

pub mod aggregator;
pub mod classifier;
pub mod comparison;
pub mod coverage;
pub mod insights;
pub mod stats;

pub use aggregator::aggregate;
pub use classifier::classify;
pub use comparison::{compare, retain_entities};
pub use coverage::coverage;
pub use insights::generate_insights;

/// `100 * part / total` with one decimal place.
pub(crate) fn format_percentage(part: usize, total: usize) -> String {
    if total == 0 {
        return "0.0".to_string();
    }
    stats::to_fixed(part as f64 / total as f64 * 100.0, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(2, 3), "66.7");
        assert_eq!(format_percentage(1, 3), "33.3");
        assert_eq!(format_percentage(0, 0), "0.0");
        assert_eq!(format_percentage(1, 16), "6.3");
        assert_eq!(format_percentage(15, 16), "93.8");
    }
}
