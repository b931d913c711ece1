//! Response aggregation.
//!
//! Groups the answers for one field by a geographic key and computes
//! per-group statistics according to the field's data type. Missing or
//! malformed answers are dropped silently so a report can always render
//! whatever data is usable.

use super::{classify, format_percentage, stats};
use crate::models::{
    AggregatedField, BreakdownEntry, CategoricalSummary, DataType, FieldDefinition, GroupBy,
    GroupDetail, GroupStats, NumericSummary, ResponseRecord, ResponseValue,
};
use indexmap::IndexMap;
use tracing::trace;

/// Aggregate one field across `responses`.
///
/// Groups appear in the order their key was first seen. A field that is
/// not aggregatable yields an empty `data` list.
pub fn aggregate<'a, I>(responses: I, field: &FieldDefinition, group_by: GroupBy) -> AggregatedField
where
    I: IntoIterator<Item = &'a ResponseRecord>,
{
    let analysis = classify(field);
    let mut result = AggregatedField {
        field_id: field.field_id.clone(),
        field_label: field.field_label.clone(),
        data_type: analysis.detected_data_type,
        data: Vec::new(),
    };

    if !analysis.is_aggregatable {
        return result;
    }

    let mut groups: IndexMap<String, Vec<&ResponseValue>> = IndexMap::new();
    for response in responses {
        let Some(value) = response.value(&field.field_id) else {
            continue;
        };
        groups
            .entry(group_by.group_key(response))
            .or_default()
            .push(value);
    }

    result.data = groups
        .into_iter()
        .map(|(label, values)| {
            trace!("Group {} of {}: {} values", label, field.field_id, values.len());
            match analysis.detected_data_type {
                // Text fields returned above; listed for exhaustiveness.
                DataType::Numeric | DataType::Text => numeric_group(label, &values),
                DataType::Categorical | DataType::Boolean => categorical_group(label, &values),
                DataType::Date => GroupStats {
                    label,
                    value: values.len() as f64,
                    detail: GroupDetail::Date {
                        count: values.len(),
                    },
                },
            }
        })
        .collect();

    result
}

fn numeric_group(label: String, values: &[&ResponseValue]) -> GroupStats {
    let numbers: Vec<f64> = values.iter().filter_map(|v| v.to_number()).collect();

    match summarize(&numbers) {
        Some(summary) => GroupStats {
            label,
            value: summary.avg,
            detail: GroupDetail::Numeric(summary),
        },
        None => GroupStats {
            label,
            value: 0.0,
            detail: GroupDetail::Empty {},
        },
    }
}

fn summarize(numbers: &[f64]) -> Option<NumericSummary> {
    Some(NumericSummary {
        count: numbers.len(),
        sum: stats::sum(numbers)?,
        avg: stats::mean(numbers)?,
        min: stats::min(numbers)?,
        max: stats::max(numbers)?,
        median: stats::median(numbers)?,
        std_dev: stats::std_dev(numbers)?,
    })
}

fn categorical_group(label: String, values: &[&ResponseValue]) -> GroupStats {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    let mut total = 0usize;

    for key in values.iter().flat_map(|v| v.category_keys()) {
        *counts.entry(key).or_default() += 1;
        total += 1;
    }

    // Ties go to the option seen first.
    let most_common = counts
        .iter()
        .fold(None::<(&String, &usize)>, |best, entry| match best {
            Some(best) if best.1 >= entry.1 => Some(best),
            _ => Some(entry),
        })
        .map(|(name, _)| name.clone())
        .unwrap_or_default();

    let breakdown = counts
        .into_iter()
        .map(|(name, count)| BreakdownEntry {
            name,
            value: count,
            percentage: format_percentage(count, total),
        })
        .collect();

    GroupStats {
        label,
        value: total as f64,
        detail: GroupDetail::Categorical(CategoricalSummary {
            breakdown,
            most_common,
        }),
    }
}
