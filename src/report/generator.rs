//! Markdown and JSON rendering.
//!
//! This module renders field analyses, reports, comparisons and coverage
//! tables as Markdown documents, and any payload as pretty JSON.

use crate::analysis::stats::to_fixed;
use crate::models::{
    Comparison, CoverageLevel, CoverageReport, FieldAnalysis, FormDefinition, GroupDetail,
    GroupStats, Report, ReportFilters, Visualization,
};
use anyhow::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Generate a complete Markdown report.
///
/// `max_findings` caps the executive summary list; `None` shows all.
pub fn generate_markdown_report(report: &Report, max_findings: Option<usize>) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", report.form_title));

    output.push_str(&generate_metadata_section(report));
    output.push_str(&generate_summary_section(report, max_findings));

    output.push_str("## Visualizations\n\n");
    if report.visualizations.is_empty() {
        output.push_str("No aggregatable data was found for this form.\n\n");
    }
    for visualization in &report.visualizations {
        output.push_str(&generate_visualization_section(visualization));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Report ID:** `{}`\n", report.report_id));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Responses:** {}\n", report.response_count));
    if !report.applied_filters.is_empty() {
        section.push_str(&format!(
            "- **Filters:** {}\n",
            describe_filters(&report.applied_filters)
        ));
    }
    section.push('\n');

    section
}

fn describe_filters(filters: &ReportFilters) -> String {
    let mut parts = Vec::new();

    if let Some(range) = &filters.date_range {
        parts.push(format!("submitted {} to {}", range.start, range.end));
    }
    if !filters.districts.is_empty() {
        parts.push(format!("districts: {}", filters.districts.join(", ")));
    }
    if !filters.talukas.is_empty() {
        parts.push(format!("talukas: {}", filters.talukas.join(", ")));
    }
    if !filters.schools.is_empty() {
        parts.push(format!("schools: {}", filters.schools.join(", ")));
    }

    parts.join("; ")
}

/// Generate the executive summary section.
fn generate_summary_section(report: &Report, max_findings: Option<usize>) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&report.summary.overview);
    section.push_str("\n\n");

    let limit = max_findings.unwrap_or(usize::MAX);
    if !report.summary.key_findings.is_empty() {
        section.push_str("### Key Findings\n\n");
        for finding in report.summary.key_findings.iter().take(limit) {
            section.push_str(&format!("- {}\n", finding));
        }
        let hidden = report.summary.key_findings.len().saturating_sub(limit);
        if hidden > 0 {
            section.push_str(&format!("- *...and {} more*\n", hidden));
        }
        section.push('\n');
    }

    section
}

/// Generate the section for a single field.
fn generate_visualization_section(visualization: &Visualization) -> String {
    let mut section = String::new();

    section.push_str(&format!("### {}\n\n", visualization.field_label));
    section.push_str(&format!(
        "*Field: `{}` | Chart: {}*\n\n",
        visualization.field_id, visualization.chart_type
    ));

    if !visualization.insights.summary.is_empty() {
        section.push_str(&format!("{}\n\n", visualization.insights.summary));
    }
    for finding in &visualization.insights.key_findings {
        section.push_str(&format!("- {}\n", finding));
    }
    if !visualization.insights.key_findings.is_empty() {
        section.push('\n');
    }

    section.push_str(&generate_group_table(&visualization.data));

    section
}

/// Render groups as a table whose columns depend on the group kind.
fn generate_group_table(data: &[GroupStats]) -> String {
    let mut table = String::new();

    let Some(first) = data.first() else {
        return table;
    };

    match first.detail {
        GroupDetail::Numeric(_) | GroupDetail::Empty {} => {
            table.push_str("| Group | Count | Avg | Min | Max | Median | Std Dev |\n");
            table.push_str("|:---|:---:|:---:|:---:|:---:|:---:|:---:|\n");
        }
        GroupDetail::Categorical(_) => {
            table.push_str("| Group | Total | Most Common | Breakdown |\n");
            table.push_str("|:---|:---:|:---|:---|\n");
        }
        GroupDetail::Date { .. } => {
            table.push_str("| Group | Count |\n");
            table.push_str("|:---|:---:|\n");
        }
    }

    for group in data {
        let row = match &group.detail {
            GroupDetail::Numeric(stats) => format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                group.label,
                stats.count,
                to_fixed(stats.avg, 2),
                to_fixed(stats.min, 2),
                to_fixed(stats.max, 2),
                to_fixed(stats.median, 2),
                to_fixed(stats.std_dev, 2)
            ),
            GroupDetail::Empty {} => format!("| {} | 0 | - | - | - | - | - |\n", group.label),
            GroupDetail::Categorical(summary) => {
                let breakdown = summary
                    .breakdown
                    .iter()
                    .map(|b| format!("{}: {} ({}%)", b.name, b.value, b.percentage))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "| {} | {} | {} | {} |\n",
                    group.label, group.value, summary.most_common, breakdown
                )
            }
            GroupDetail::Date { count } => format!("| {} | {} |\n", group.label, count),
        };
        table.push_str(&row);
    }
    table.push('\n');

    table
}

/// Generate a Markdown comparison.
pub fn generate_markdown_comparison(comparison: &Comparison) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", comparison.title));
    output.push_str(&format!(
        "*Generated {}*\n\n",
        comparison.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if comparison.fields.is_empty() {
        output.push_str("None of the requested entities have data for this form.\n\n");
    }

    for field in &comparison.fields {
        output.push_str(&format!("## {}\n\n", field.field_label));
        output.push_str(&format!("*Chart: {}*\n\n", field.chart_type));
        for insight in &field.insights {
            output.push_str(&format!("> {}\n\n", insight));
        }
        output.push_str(&generate_group_table(&field.data));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate a Markdown table of field classifications.
pub fn generate_markdown_analysis(form: &FormDefinition, analyses: &[FieldAnalysis]) -> String {
    let mut output = String::new();

    output.push_str(&format!("# Field Analysis: {}\n\n", form.form_title));
    output.push_str("| Field | Type | Data Type | Aggregatable | Suggested Charts |\n");
    output.push_str("|:---|:---|:---|:---:|:---|\n");

    for analysis in analyses {
        let charts = if analysis.suggested_charts.is_empty() {
            "-".to_string()
        } else {
            analysis
                .suggested_charts
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        output.push_str(&format!(
            "| {} (`{}`) | {} | {} | {} | {} |\n",
            analysis.field_label,
            analysis.field_id,
            analysis.original_type,
            analysis.detected_data_type,
            if analysis.is_aggregatable { "yes" } else { "no" },
            charts
        ));
    }
    output.push('\n');

    output
}

/// Generate a Markdown coverage table.
pub fn generate_markdown_coverage(coverage: &CoverageReport) -> String {
    let mut output = String::new();

    let level = match coverage.level {
        CoverageLevel::District => "District",
        CoverageLevel::Taluka => "Taluka",
    };

    output.push_str(&format!("# {}-wise Coverage\n\n", level));
    output.push_str(&format!("- **Schools:** {}\n", coverage.total_schools));
    output.push_str(&format!("- **Responses:** {}\n\n", coverage.total_responses));

    match coverage.level {
        CoverageLevel::District => {
            output.push_str("| District | Schools | Responses | Completion |\n");
            output.push_str("|:---|:---:|:---:|:---:|\n");
        }
        CoverageLevel::Taluka => {
            output.push_str("| Taluka | District | Schools | Responses | Completion |\n");
            output.push_str("|:---|:---|:---:|:---:|:---:|\n");
        }
    }

    for row in &coverage.rows {
        match &row.district {
            Some(district) => output.push_str(&format!(
                "| {} | {} | {} | {} | {}% |\n",
                row.name, district, row.school_count, row.response_count, row.completion_rate
            )),
            None => output.push_str(&format!(
                "| {} | {} | {} | {}% |\n",
                row.name, row.school_count, row.response_count, row.completion_rate
            )),
        }
    }
    output.push('\n');

    output
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Report generated by SchoolReport*\n".to_string()
}

/// Serialize any payload as pretty JSON.
pub fn generate_json<T: Serialize>(payload: &T) -> Result<String> {
    serde_json::to_string_pretty(payload).map_err(Into::into)
}

/// Write rendered output to a file.
pub fn write_output(content: &str, path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(content.as_bytes())?;

    Ok(())
}
