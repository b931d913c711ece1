//! Insight generation.
//!
//! Turns the groups of an aggregated field into a summary sentence, a
//! list of key findings and a few headline statistics.

use super::{format_percentage, stats};
use crate::models::{AggregatedField, DataType, GroupStats, Insights};
use indexmap::IndexMap;
use std::collections::BTreeMap;

/// Summary used when a field has no usable data.
pub const NO_DATA_SUMMARY: &str = "No data available for analysis.";

/// Cross-group standard deviation above this share of the mean counts as
/// significant variation.
const VARIATION_THRESHOLD: f64 = 0.2;

/// Derive insights for one aggregated field.
///
/// Boolean and date fields produce empty insights.
pub fn generate_insights(aggregated: &AggregatedField) -> Insights {
    if aggregated.data.is_empty() {
        return Insights {
            summary: NO_DATA_SUMMARY.to_string(),
            ..Default::default()
        };
    }

    match aggregated.data_type {
        DataType::Numeric => numeric_insights(&aggregated.field_label, &aggregated.data),
        DataType::Categorical => categorical_insights(&aggregated.data),
        DataType::Boolean | DataType::Date | DataType::Text => Insights::default(),
    }
}

fn numeric_insights(field_label: &str, data: &[GroupStats]) -> Insights {
    let values: Vec<f64> = data.iter().map(|g| g.value).collect();
    let overall_avg = stats::round2(stats::mean(&values).unwrap_or_default());

    // First occurrence wins on ties.
    let highest = first_by(data, |candidate, best| candidate > best);
    let lowest = first_by(data, |candidate, best| candidate < best);

    let mut key_findings = vec![
        format!(
            "Highest value recorded in {} ({}).",
            highest.label,
            stats::to_fixed(highest.value, 2)
        ),
        format!(
            "Lowest value recorded in {} ({}).",
            lowest.label,
            stats::to_fixed(lowest.value, 2)
        ),
    ];

    if data.len() > 2 {
        let spread = stats::std_dev(&values).unwrap_or_default();
        if spread > overall_avg * VARIATION_THRESHOLD {
            key_findings.push("Significant variation observed across groups.".to_string());
        } else {
            key_findings.push("Values are relatively consistent across groups.".to_string());
        }
    }

    let statistics = BTreeMap::from([
        ("mean".to_string(), overall_avg),
        ("max".to_string(), highest.value),
        ("min".to_string(), lowest.value),
    ]);

    Insights {
        summary: format!(
            "The average {} is {}.",
            field_label.to_lowercase(),
            stats::to_fixed(overall_avg, 2)
        ),
        key_findings,
        statistics,
    }
}

/// Returns the first group whose value beats every earlier one.
/// `data` must be non-empty.
fn first_by(data: &[GroupStats], beats: impl Fn(f64, f64) -> bool) -> &GroupStats {
    let mut best = &data[0];
    for group in &data[1..] {
        if beats(group.value, best.value) {
            best = group;
        }
    }
    best
}

fn categorical_insights(data: &[GroupStats]) -> Insights {
    let mut tally: IndexMap<&str, usize> = IndexMap::new();
    for summary in data.iter().filter_map(GroupStats::categorical) {
        for entry in &summary.breakdown {
            *tally.entry(entry.name.as_str()).or_default() += entry.value;
        }
    }

    // Stable sort: equal counts keep first-seen order.
    let mut ranked: Vec<(&str, usize)> = tally.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let total: usize = ranked.iter().map(|(_, count)| count).sum();

    let mut insights = Insights::default();
    let Some((top_name, top_count)) = ranked.first() else {
        return insights;
    };

    insights.summary = format!(
        "The most common response is \"{}\" ({}%).",
        top_name,
        format_percentage(*top_count, total)
    );
    insights
        .key_findings
        .push(format!("\"{}\" dominates with {} selections.", top_name, top_count));

    if let Some((second_name, second_count)) = ranked.get(1) {
        insights.key_findings.push(format!(
            "\"{}\" is the second most popular choice ({}%).",
            second_name,
            format_percentage(*second_count, total)
        ));
    }

    insights
}
