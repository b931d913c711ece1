//! Report orchestration.
//!
//! Runs classification, aggregation and insight generation over every
//! field of a form and assembles the report and comparison payloads.

use crate::analysis::{aggregate, classify, compare, generate_insights, retain_entities};
use crate::models::{
    ChartKind, Comparison, ComparisonField, FieldAnalysis, FormDefinition, GroupBy, Report,
    ReportFilters, ReportSummary, ResponseRecord, Visualization,
};
use chrono::Utc;
use tracing::{debug, info};

/// Settings for one report run.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub group_by: GroupBy,
    pub filters: ReportFilters,
    /// When false the report carries counts only.
    pub include_charts: bool,
    /// Chart used for fields that suggest none.
    pub default_chart: ChartKind,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            group_by: GroupBy::None,
            filters: ReportFilters::default(),
            include_charts: true,
            default_chart: ChartKind::Bar,
        }
    }
}

/// Settings for one comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub compare_by: GroupBy,
    /// Group labels to compare, e.g. two district names.
    pub entities: Vec<String>,
    pub default_chart: ChartKind,
}

/// Classify every field of a form.
pub fn analyze_form(form: &FormDefinition) -> Vec<FieldAnalysis> {
    form.fields.iter().map(classify).collect()
}

/// Build the analytical report for a form.
pub fn build_report(
    form: &FormDefinition,
    responses: &[ResponseRecord],
    options: &ReportOptions,
) -> Report {
    let generated_at = Utc::now();
    let filtered: Vec<&ResponseRecord> = responses
        .iter()
        .filter(|r| options.filters.matches(r))
        .collect();

    info!(
        "Building report for {}: {} of {} responses match filters",
        form.form_id,
        filtered.len(),
        responses.len()
    );

    let mut visualizations = Vec::new();
    let mut key_findings = Vec::new();

    if options.include_charts {
        for field in &form.fields {
            let analysis = classify(field);
            if !analysis.is_aggregatable {
                debug!("Skipping non-aggregatable field {}", field.field_id);
                continue;
            }

            let aggregated = aggregate(filtered.iter().copied(), field, options.group_by);
            if aggregated.data.is_empty() {
                debug!("No usable values for field {}", field.field_id);
                continue;
            }

            let insights = generate_insights(&aggregated);
            key_findings.extend(insights.key_findings.iter().cloned());

            visualizations.push(Visualization {
                field_id: field.field_id.clone(),
                field_label: field.field_label.clone(),
                chart_type: analysis.default_chart().unwrap_or(options.default_chart),
                data: aggregated.data,
                insights,
            });
        }
    }

    Report {
        report_id: format!("REP-{}", generated_at.timestamp_millis()),
        generated_at,
        form_title: form.form_title.clone(),
        response_count: filtered.len(),
        applied_filters: options.filters.clone(),
        visualizations,
        summary: ReportSummary {
            overview: format!(
                "Analysis of {} responses for {}.",
                filtered.len(),
                form.form_title
            ),
            key_findings,
        },
    }
}

/// Compare named entities across every aggregatable field.
///
/// Only groups whose label is one of the requested entities appear in
/// the output.
pub fn build_comparison(
    form: &FormDefinition,
    responses: &[ResponseRecord],
    request: &ComparisonRequest,
) -> Comparison {
    let scoped: Vec<&ResponseRecord> = responses
        .iter()
        .filter(|r| match request.compare_by.location(r) {
            Some(location) => request.entities.iter().any(|e| e == location),
            None => true,
        })
        .collect();

    info!(
        "Comparing {} by {} across {} responses",
        request.entities.join(", "),
        request.compare_by,
        scoped.len()
    );

    let mut fields = Vec::new();
    for field in &form.fields {
        let analysis = classify(field);
        if !analysis.is_aggregatable {
            continue;
        }

        let mut aggregated = aggregate(scoped.iter().copied(), field, request.compare_by);
        retain_entities(&mut aggregated, &request.entities);
        if aggregated.data.is_empty() {
            continue;
        }

        fields.push(ComparisonField {
            field_label: field.field_label.clone(),
            chart_type: analysis.default_chart().unwrap_or(request.default_chart),
            insights: compare(&aggregated),
            data: aggregated.data,
        });
    }

    Comparison {
        title: format!("Comparison: {}", request.entities.join(" vs ")),
        generated_at: Utc::now(),
        fields,
    }
}
