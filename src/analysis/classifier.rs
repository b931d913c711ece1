//! Field classification.
//!
//! Maps a form field's input type to a semantic data category and the
//! chart kinds that suit it.

use crate::models::{ChartKind, DataType, FieldAnalysis, FieldDefinition, FieldType};

/// Label keywords that mark an unmapped field type as numeric.
const NUMERIC_LABEL_KEYWORDS: [&str; 4] = ["score", "count", "amount", "total"];

/// Classify a field. Never fails: unknown types fall back to
/// non-aggregatable text unless the label names a quantity.
pub fn classify(field: &FieldDefinition) -> FieldAnalysis {
    let (detected_data_type, suggested_charts, is_aggregatable) = match field.field_type {
        FieldType::Number | FieldType::Range | FieldType::Rating => (
            DataType::Numeric,
            vec![
                ChartKind::Bar,
                ChartKind::Line,
                ChartKind::Area,
                ChartKind::Gauge,
                ChartKind::Heatmap,
            ],
            true,
        ),
        FieldType::Select | FieldType::Radio | FieldType::Checkbox | FieldType::Dropdown => (
            DataType::Categorical,
            vec![ChartKind::Pie, ChartKind::Donut, ChartKind::Bar],
            true,
        ),
        FieldType::Date | FieldType::Time | FieldType::Datetime => (
            DataType::Date,
            vec![ChartKind::Timeline, ChartKind::Line, ChartKind::Area],
            true,
        ),
        FieldType::Boolean | FieldType::Toggle | FieldType::Switch => (
            DataType::Boolean,
            vec![ChartKind::Pie, ChartKind::Gauge],
            true,
        ),
        FieldType::Text | FieldType::Textarea | FieldType::Email | FieldType::Tel | FieldType::Url => {
            (DataType::Text, Vec::new(), false)
        }
        FieldType::Other(_) if label_names_quantity(&field.field_label) => (
            DataType::Numeric,
            vec![ChartKind::Bar, ChartKind::Line],
            true,
        ),
        FieldType::Other(_) => (DataType::Text, Vec::new(), false),
    };

    FieldAnalysis {
        field_id: field.field_id.clone(),
        field_label: field.field_label.clone(),
        original_type: field.field_type.clone(),
        detected_data_type,
        suggested_charts,
        is_aggregatable,
    }
}

fn label_names_quantity(label: &str) -> bool {
    let label = label.to_lowercase();
    NUMERIC_LABEL_KEYWORDS.iter().any(|k| label.contains(k))
}
