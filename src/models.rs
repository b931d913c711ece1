//! Data models for the report engine.
//!
//! This module contains the form and response types consumed by the
//! engine, the derived analysis types it produces, and the report,
//! comparison and coverage payloads handed to the rendering layer.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Input type of a form field as configured by the form builder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Number,
    Range,
    Rating,
    Select,
    Radio,
    Checkbox,
    Dropdown,
    Date,
    Time,
    Datetime,
    Boolean,
    Toggle,
    Switch,
    Text,
    Textarea,
    Email,
    Tel,
    Url,
    /// Any type the engine has no mapping for (`file`, `phone`, ...).
    Other(String),
}

impl FieldType {
    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Number => "number",
            FieldType::Range => "range",
            FieldType::Rating => "rating",
            FieldType::Select => "select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Dropdown => "dropdown",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Datetime => "datetime",
            FieldType::Boolean => "boolean",
            FieldType::Toggle => "toggle",
            FieldType::Switch => "switch",
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Email => "email",
            FieldType::Tel => "tel",
            FieldType::Url => "url",
            FieldType::Other(s) => s,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for FieldType {
    fn from(s: &str) -> Self {
        match s {
            "number" => FieldType::Number,
            "range" => FieldType::Range,
            "rating" => FieldType::Rating,
            "select" => FieldType::Select,
            "radio" => FieldType::Radio,
            "checkbox" => FieldType::Checkbox,
            "dropdown" => FieldType::Dropdown,
            "date" => FieldType::Date,
            "time" => FieldType::Time,
            "datetime" => FieldType::Datetime,
            "boolean" => FieldType::Boolean,
            "toggle" => FieldType::Toggle,
            "switch" => FieldType::Switch,
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "email" => FieldType::Email,
            "tel" => FieldType::Tel,
            "url" => FieldType::Url,
            other => FieldType::Other(other.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(s: String) -> Self {
        FieldType::from(s.as_str())
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

/// Semantic data category detected for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Numeric,
    Categorical,
    Boolean,
    Date,
    Text,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Numeric => write!(f, "numeric"),
            DataType::Categorical => write!(f, "categorical"),
            DataType::Boolean => write!(f, "boolean"),
            DataType::Date => write!(f, "date"),
            DataType::Text => write!(f, "text"),
        }
    }
}

/// Chart kinds understood by the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Area,
    Gauge,
    Heatmap,
    Pie,
    Donut,
    Timeline,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Area => "area",
            ChartKind::Gauge => "gauge",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Pie => "pie",
            ChartKind::Donut => "donut",
            ChartKind::Timeline => "timeline",
        };
        write!(f, "{}", name)
    }
}

/// A single field of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    /// Identifier, unique within its form.
    pub field_id: String,
    pub field_label: String,
    pub field_type: FieldType,
    /// Ordered options for choice fields.
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
}

/// A form as fetched for one report run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    pub form_id: String,
    pub form_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_description: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
}

/// Classification result for a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAnalysis {
    pub field_id: String,
    pub field_label: String,
    pub original_type: FieldType,
    pub detected_data_type: DataType,
    /// Ordered; the first entry is the default chart.
    pub suggested_charts: Vec<ChartKind>,
    pub is_aggregatable: bool,
}

impl FieldAnalysis {
    /// Returns the default chart, if the field suggests any.
    pub fn default_chart(&self) -> Option<ChartKind> {
        self.suggested_charts.first().copied()
    }
}

/// A scalar answer (or one item of a multi-select answer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl ScalarValue {
    /// String form used as a category key, before trimming.
    pub fn to_key(&self) -> String {
        match self {
            ScalarValue::Bool(b) => b.to_string(),
            ScalarValue::Number(n) => n.to_string(),
            ScalarValue::Text(s) => s.clone(),
        }
    }

    /// Numeric coercion; `None` for anything that is not a finite number.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            ScalarValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            ScalarValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            ScalarValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        }
    }
}

/// Reference to an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub url: String,
    pub file_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
}

/// A submitted answer for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseValue {
    Scalar(ScalarValue),
    MultiSelect(Vec<ScalarValue>),
    File(FileRef),
    /// Any other JSON shape; kept so a stray value never fails a load.
    Other(serde_json::Value),
}

impl ResponseValue {
    /// Empty strings count as "no answer".
    pub fn is_blank(&self) -> bool {
        matches!(self, ResponseValue::Scalar(ScalarValue::Text(s)) if s.is_empty())
    }

    /// Numeric coercion. Only scalars coerce; lists, files and other
    /// shapes never yield a number.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            ResponseValue::Scalar(scalar) => scalar.to_number(),
            _ => None,
        }
    }

    /// Trimmed category keys carried by this answer. Multi-select answers
    /// contribute one key per selected item.
    pub fn category_keys(&self) -> Vec<String> {
        match self {
            ResponseValue::Scalar(scalar) => vec![scalar.to_key().trim().to_string()],
            ResponseValue::MultiSelect(items) => items
                .iter()
                .map(|item| item.to_key().trim().to_string())
                .collect(),
            ResponseValue::File(file) => vec![file.file_name.trim().to_string()],
            ResponseValue::Other(value) => vec![value.to_string().trim().to_string()],
        }
    }
}

/// Reads a string that may be `null`, mapping `null` to empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One school's submission for a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub form_id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub udise_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub school_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub district_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub taluka_name: String,
    /// Answers keyed by field id. `null` answers deserialize to `None`.
    #[serde(default)]
    pub responses: HashMap<String, Option<ResponseValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Review status as recorded by the collector, e.g. `submitted`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ResponseRecord {
    /// Returns the usable answer for a field: missing, `null` and empty
    /// string answers all yield `None`.
    pub fn value(&self, field_id: &str) -> Option<&ResponseValue> {
        self.responses
            .get(field_id)
            .and_then(Option::as_ref)
            .filter(|value| !value.is_blank())
    }
}

/// Geographic dimension used to bucket responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    None,
    District,
    Taluka,
    School,
}

impl GroupBy {
    /// Group label for the singleton bucket.
    pub const OVERALL: &'static str = "Overall";
    /// Group label for responses with a blank location.
    pub const UNKNOWN: &'static str = "Unknown";

    /// Location value of a response on this dimension, `None` for `GroupBy::None`.
    pub fn location<'a>(&self, response: &'a ResponseRecord) -> Option<&'a str> {
        match self {
            GroupBy::None => None,
            GroupBy::District => Some(&response.district_name),
            GroupBy::Taluka => Some(&response.taluka_name),
            GroupBy::School => Some(&response.school_name),
        }
    }

    /// Bucket key of a response on this dimension.
    pub fn group_key(&self, response: &ResponseRecord) -> String {
        match self.location(response) {
            None => Self::OVERALL.to_string(),
            Some(location) if location.trim().is_empty() => Self::UNKNOWN.to_string(),
            Some(location) => location.to_string(),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupBy::None => write!(f, "none"),
            GroupBy::District => write!(f, "district"),
            GroupBy::Taluka => write!(f, "taluka"),
            GroupBy::School => write!(f, "school"),
        }
    }
}

/// Statistics of a numeric group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumericSummary {
    pub count: usize,
    pub sum: f64,
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub std_dev: f64,
}

/// One option's share within a categorical group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub value: usize,
    /// Percentage of the group total, one decimal place.
    pub percentage: String,
}

/// Distribution of a categorical or boolean group.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoricalSummary {
    /// Ordered by first appearance of each option.
    pub breakdown: Vec<BreakdownEntry>,
    pub most_common: String,
}

/// Type-specific part of a group's statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GroupDetail {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
    Date { count: usize },
    /// Numeric group where no value survived coercion.
    Empty {},
}

/// Aggregated statistics of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub label: String,
    /// Primary scalar used for charting.
    pub value: f64,
    #[serde(flatten)]
    pub detail: GroupDetail,
}

impl GroupStats {
    pub fn numeric(&self) -> Option<&NumericSummary> {
        match &self.detail {
            GroupDetail::Numeric(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn categorical(&self) -> Option<&CategoricalSummary> {
        match &self.detail {
            GroupDetail::Categorical(summary) => Some(summary),
            _ => None,
        }
    }
}

/// All groups computed for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedField {
    pub field_id: String,
    pub field_label: String,
    pub data_type: DataType,
    pub data: Vec<GroupStats>,
}

/// Human-readable findings for one aggregated field.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub summary: String,
    pub key_findings: Vec<String>,
    pub statistics: BTreeMap<String, f64>,
}

/// Inclusive submission date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        let day = at.date_naive();
        self.start <= day && day <= self.end
    }
}

/// Response filters applied before aggregation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub districts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub talukas: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schools: Vec<String>,
}

impl ReportFilters {
    pub fn is_empty(&self) -> bool {
        self.date_range.is_none()
            && self.districts.is_empty()
            && self.talukas.is_empty()
            && self.schools.is_empty()
    }

    /// Whether a response passes every configured filter.
    pub fn matches(&self, response: &ResponseRecord) -> bool {
        if let Some(range) = &self.date_range {
            match &response.submitted_at {
                Some(at) if range.contains(at) => {}
                _ => return false,
            }
        }

        let in_list =
            |list: &[String], value: &str| list.is_empty() || list.iter().any(|v| v == value);

        in_list(self.districts.as_slice(), &response.district_name)
            && in_list(self.talukas.as_slice(), &response.taluka_name)
            && in_list(self.schools.as_slice(), &response.school_name)
    }
}

/// Chart-ready output for one field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Visualization {
    pub field_id: String,
    pub field_label: String,
    pub chart_type: ChartKind,
    pub data: Vec<GroupStats>,
    pub insights: Insights,
}

/// Executive summary of a report.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub overview: String,
    pub key_findings: Vec<String>,
}

/// The complete analytical report for a form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub report_id: String,
    pub generated_at: DateTime<Utc>,
    pub form_title: String,
    pub response_count: usize,
    pub applied_filters: ReportFilters,
    pub visualizations: Vec<Visualization>,
    pub summary: ReportSummary,
}

/// Entity-vs-entity output for one field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonField {
    pub field_label: String,
    pub chart_type: ChartKind,
    pub data: Vec<GroupStats>,
    pub insights: Vec<String>,
}

/// Comparison of named entities across every aggregatable field.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub fields: Vec<ComparisonField>,
}

/// A school from the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub udise_code: String,
    pub school_name: String,
    pub district_name: String,
    pub taluka_name: String,
}

/// Administrative level used for coverage analytics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageLevel {
    #[default]
    District,
    Taluka,
}

/// Submission coverage of one district or taluka.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageRow {
    pub name: String,
    /// Parent district, only set for taluka rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    pub school_count: usize,
    pub response_count: usize,
    /// Rounded percentage of responses per registered school.
    pub completion_rate: u32,
}

/// Coverage of the registry by submitted responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub level: CoverageLevel,
    pub total_schools: usize,
    pub total_responses: usize,
    pub rows: Vec<CoverageRow>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_from_str() {
        assert_eq!(FieldType::from("number"), FieldType::Number);
        assert_eq!(FieldType::from("radio"), FieldType::Radio);
        assert_eq!(
            FieldType::from("file"),
            FieldType::Other("file".to_string())
        );
        assert_eq!(String::from(FieldType::Textarea), "textarea");
    }

    #[test]
    fn test_field_definition_deserialize() {
        let json = r#"{"fieldId":"f1","fieldLabel":"Score","fieldType":"number"}"#;
        let field: FieldDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(field.field_id, "f1");
        assert_eq!(field.field_type, FieldType::Number);
        assert!(field.options.is_empty());
        assert!(!field.required);
    }

    #[test]
    fn test_response_value_shapes() {
        let json = r#"{
            "responses": {
                "a": "12",
                "b": 7,
                "c": ["Math", " Science "],
                "d": {"url": "https://files.example/x.pdf", "fileName": "x.pdf"},
                "e": null,
                "f": "",
                "g": true
            }
        }"#;
        let record: ResponseRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.value("a").and_then(ResponseValue::to_number), Some(12.0));
        assert_eq!(record.value("b").and_then(ResponseValue::to_number), Some(7.0));
        assert_eq!(
            record.value("c").map(ResponseValue::category_keys),
            Some(vec!["Math".to_string(), "Science".to_string()])
        );
        assert!(matches!(record.value("d"), Some(ResponseValue::File(_))));
        assert!(record.value("e").is_none());
        assert!(record.value("f").is_none());
        assert!(record.value("missing").is_none());
        assert_eq!(
            record.value("g").map(ResponseValue::category_keys),
            Some(vec!["true".to_string()])
        );
    }

    #[test]
    fn test_scalar_coercion() {
        assert_eq!(ScalarValue::Text(" 4.5 ".to_string()).to_number(), Some(4.5));
        assert_eq!(ScalarValue::Text("abc".to_string()).to_number(), None);
        assert_eq!(ScalarValue::Text("inf".to_string()).to_number(), None);
        assert_eq!(ScalarValue::Bool(true).to_number(), Some(1.0));
        assert_eq!(ScalarValue::Number(5.0).to_key(), "5");
    }

    #[test]
    fn test_group_key() {
        let record = ResponseRecord {
            district_name: "Pune".to_string(),
            taluka_name: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(GroupBy::None.group_key(&record), "Overall");
        assert_eq!(GroupBy::District.group_key(&record), "Pune");
        assert_eq!(GroupBy::Taluka.group_key(&record), "Unknown");
        assert_eq!(GroupBy::School.group_key(&record), "Unknown");
    }

    #[test]
    fn test_null_locations_group_as_unknown() {
        let records: Vec<ResponseRecord> = serde_json::from_value(serde_json::json!([
            {
                "formId": null,
                "districtName": null,
                "talukaName": null,
                "schoolName": null,
                "status": "pending-review",
                "responses": {"f1": "3"}
            },
            {"districtName": "A", "responses": {"f1": "5"}}
        ]))
        .unwrap();

        assert_eq!(records[0].district_name, "");
        assert_eq!(records[0].form_id, "");
        assert_eq!(records[0].status.as_deref(), Some("pending-review"));
        assert_eq!(GroupBy::District.group_key(&records[0]), "Unknown");
        assert_eq!(GroupBy::School.group_key(&records[0]), "Unknown");
        assert_eq!(GroupBy::District.group_key(&records[1]), "A");
    }

    #[test]
    fn test_filters_match() {
        let at = DateTime::parse_from_rfc3339("2025-03-10T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let record = ResponseRecord {
            district_name: "Pune".to_string(),
            submitted_at: Some(at),
            ..Default::default()
        };

        let mut filters = ReportFilters {
            districts: vec!["Pune".to_string()],
            ..Default::default()
        };
        assert!(filters.matches(&record));

        filters.date_range = Some(DateRange {
            start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        });
        assert!(filters.matches(&record));

        filters.talukas = vec!["Haveli".to_string()];
        assert!(!filters.matches(&record));

        let undated = ResponseRecord {
            district_name: "Pune".to_string(),
            ..Default::default()
        };
        filters.talukas.clear();
        assert!(!filters.matches(&undated));
    }

    #[test]
    fn test_group_stats_serialization() {
        let group = GroupStats {
            label: "Overall".to_string(),
            value: 3.0,
            detail: GroupDetail::Categorical(CategoricalSummary {
                breakdown: vec![BreakdownEntry {
                    name: "Yes".to_string(),
                    value: 3,
                    percentage: "100.0".to_string(),
                }],
                most_common: "Yes".to_string(),
            }),
        };
        let json = serde_json::to_value(&group).unwrap();
        assert_eq!(json["label"], "Overall");
        assert_eq!(json["mostCommon"], "Yes");
        assert_eq!(json["breakdown"][0]["percentage"], "100.0");
    }
}
