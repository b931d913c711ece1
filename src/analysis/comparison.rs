//! Entity comparison.
//!
//! Ranks the groups of an aggregated field and describes how the leader
//! compares to the runner-up.

use super::stats;
use crate::models::{AggregatedField, DataType};

/// Keep only groups whose label is one of `entities`.
pub fn retain_entities(aggregated: &mut AggregatedField, entities: &[String]) {
    aggregated
        .data
        .retain(|group| entities.iter().any(|entity| *entity == group.label));
}

/// Comparison sentences for an aggregated field.
///
/// Needs at least two groups. Groups are ranked by value with a stable
/// sort, so equal values keep their original order. The percentage
/// difference reads `N/A` when the runner-up value is zero.
pub fn compare(aggregated: &AggregatedField) -> Vec<String> {
    if aggregated.data.len() < 2 {
        return Vec::new();
    }

    let mut ranked: Vec<_> = aggregated.data.iter().collect();
    ranked.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let (winner, runner_up) = (ranked[0], ranked[1]);

    match aggregated.data_type {
        DataType::Numeric => {
            let diff = winner.value - runner_up.value;
            let pct_diff = if runner_up.value == 0.0 {
                "N/A".to_string()
            } else {
                format!("{}%", stats::to_fixed(diff / runner_up.value * 100.0, 1))
            };
            vec![format!(
                "{} is higher than {} by {} ({}).",
                winner.label,
                runner_up.label,
                stats::to_fixed(diff, 2),
                pct_diff
            )]
        }
        DataType::Categorical => vec![format!(
            "{} has more responses ({}) than {} ({}).",
            winner.label, winner.value, runner_up.label, runner_up.value
        )],
        DataType::Boolean | DataType::Date | DataType::Text => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GroupDetail, GroupStats};

    fn field(data_type: DataType, groups: &[(&str, f64)]) -> AggregatedField {
        AggregatedField {
            field_id: "f1".to_string(),
            field_label: "Enrollment".to_string(),
            data_type,
            data: groups
                .iter()
                .map(|(label, value)| GroupStats {
                    label: label.to_string(),
                    value: *value,
                    detail: GroupDetail::Empty {},
                })
                .collect(),
        }
    }

    #[test]
    fn test_fewer_than_two_groups() {
        assert!(compare(&field(DataType::Numeric, &[])).is_empty());
        assert!(compare(&field(DataType::Numeric, &[("Pune", 4.0)])).is_empty());
    }

    #[test]
    fn test_numeric_comparison() {
        let insights = compare(&field(DataType::Numeric, &[("Pune", 40.0), ("Satara", 50.0)]));
        assert_eq!(
            insights,
            vec!["Satara is higher than Pune by 10.00 (25.0%).".to_string()]
        );
    }

    #[test]
    fn test_numeric_differences_round_halves_up() {
        let insights = compare(&field(DataType::Numeric, &[("Pune", 8.0), ("Satara", 8.5)]));
        assert_eq!(
            insights,
            vec!["Satara is higher than Pune by 0.50 (6.3%).".to_string()]
        );

        let insights = compare(&field(DataType::Numeric, &[("Pune", 1.0), ("Satara", 3.125)]));
        assert_eq!(
            insights,
            vec!["Satara is higher than Pune by 2.13 (212.5%).".to_string()]
        );
    }

    #[test]
    fn test_numeric_zero_runner_up() {
        let insights = compare(&field(DataType::Numeric, &[("Pune", 0.0), ("Satara", 3.0)]));
        assert_eq!(
            insights,
            vec!["Satara is higher than Pune by 3.00 (N/A).".to_string()]
        );
    }

    #[test]
    fn test_ties_keep_original_order() {
        let insights = compare(&field(DataType::Numeric, &[("Pune", 5.0), ("Satara", 5.0)]));
        assert_eq!(
            insights,
            vec!["Pune is higher than Satara by 0.00 (0.0%).".to_string()]
        );
    }

    #[test]
    fn test_categorical_comparison() {
        let insights = compare(&field(DataType::Categorical, &[("Pune", 12.0), ("Satara", 30.0)]));
        assert_eq!(
            insights,
            vec!["Satara has more responses (30) than Pune (12).".to_string()]
        );
    }

    #[test]
    fn test_date_comparison_is_empty() {
        assert!(compare(&field(DataType::Date, &[("Pune", 1.0), ("Satara", 2.0)])).is_empty());
    }

    #[test]
    fn test_retain_entities() {
        let mut aggregated = field(
            DataType::Numeric,
            &[("Pune", 1.0), ("Unknown", 2.0), ("Satara", 3.0)],
        );
        retain_entities(&mut aggregated, &["Satara".to_string(), "Pune".to_string()]);

        let labels: Vec<_> = aggregated.data.iter().map(|g| g.label.as_str()).collect();
        assert_eq!(labels, vec!["Pune", "Satara"]);
    }
}
