//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use schoolreport::models::{CoverageLevel, DateRange, GroupBy, ReportFilters};
use std::path::PathBuf;

/// SchoolReport - analytics for school data-collection forms
///
/// Classify form fields, aggregate school responses by district, taluka
/// or school, and generate Markdown/JSON reports with insights.
///
/// Examples:
///   schoolreport analyze --form form.json
///   schoolreport report --form form.json --responses responses/ --group-by district
///   schoolreport compare --form form.json --responses responses.json --by district --entity Pune --entity Satara
///   schoolreport coverage --schools schools.json --responses responses.json --level taluka
///   schoolreport init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .schoolreport.toml in the current directory
    #[arg(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Output file path (stdout when omitted)
    #[arg(short, long, value_name = "FILE", global = true)]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT", global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Classify every field of a form and suggest charts
    Analyze {
        /// Form definition (JSON)
        #[arg(long, value_name = "FILE")]
        form: PathBuf,
    },
    /// Generate an analytical report for a form
    Report(ReportArgs),
    /// Compare named districts, talukas or schools
    Compare(CompareArgs),
    /// Show how many registered schools have submitted responses
    Coverage(CoverageArgs),
    /// Generate a default .schoolreport.toml configuration file
    InitConfig,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ReportArgs {
    /// Form definition (JSON)
    #[arg(long, value_name = "FILE")]
    pub form: PathBuf,

    /// Response file or directory of response files (JSON)
    #[arg(long, value_name = "PATH")]
    pub responses: PathBuf,

    /// Grouping dimension (default from config, else none)
    #[arg(long, value_name = "DIMENSION")]
    pub group_by: Option<GroupByArg>,

    /// Only include these districts (repeatable or comma-separated)
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub district: Vec<String>,

    /// Only include these talukas (repeatable or comma-separated)
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub taluka: Vec<String>,

    /// Only include these schools (repeatable or comma-separated)
    #[arg(long, value_name = "NAME", value_delimiter = ',')]
    pub school: Vec<String>,

    /// First submission day to include (YYYY-MM-DD), requires --to
    #[arg(long, value_name = "DATE", requires = "to")]
    pub from: Option<NaiveDate>,

    /// Last submission day to include (YYYY-MM-DD), requires --from
    #[arg(long, value_name = "DATE", requires = "from")]
    pub to: Option<NaiveDate>,

    /// Only count responses, skip per-field visualizations
    #[arg(long)]
    pub no_charts: bool,

    /// Exit with code 2 when the report has no visualizations
    #[arg(long)]
    pub fail_on_empty: bool,
}

impl ReportArgs {
    /// Build response filters from the CLI flags.
    pub fn filters(&self) -> ReportFilters {
        let date_range = match (self.from, self.to) {
            (Some(start), Some(end)) => Some(DateRange { start, end }),
            _ => None,
        };

        ReportFilters {
            date_range,
            districts: self.district.clone(),
            talukas: self.taluka.clone(),
            schools: self.school.clone(),
        }
    }
}

#[derive(clap::Args, Debug, Clone)]
pub struct CompareArgs {
    /// Form definition (JSON)
    #[arg(long, value_name = "FILE")]
    pub form: PathBuf,

    /// Response file or directory of response files (JSON)
    #[arg(long, value_name = "PATH")]
    pub responses: PathBuf,

    /// Dimension the entities belong to
    #[arg(long, value_name = "DIMENSION")]
    pub by: CompareByArg,

    /// Entity to compare (repeat at least twice)
    #[arg(long = "entity", value_name = "NAME", required = true)]
    pub entities: Vec<String>,

    /// Exit with code 2 when no field has data for the entities
    #[arg(long)]
    pub fail_on_empty: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CoverageArgs {
    /// School registry (JSON)
    #[arg(long, value_name = "FILE")]
    pub schools: PathBuf,

    /// Response file or directory of response files (JSON)
    #[arg(long, value_name = "PATH")]
    pub responses: PathBuf,

    /// Administrative level
    #[arg(long, value_name = "LEVEL", default_value = "district")]
    pub level: LevelArg,
}

/// Output format for rendered payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Grouping dimension for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum GroupByArg {
    None,
    District,
    Taluka,
    School,
}

impl From<GroupByArg> for GroupBy {
    fn from(arg: GroupByArg) -> Self {
        match arg {
            GroupByArg::None => GroupBy::None,
            GroupByArg::District => GroupBy::District,
            GroupByArg::Taluka => GroupBy::Taluka,
            GroupByArg::School => GroupBy::School,
        }
    }
}

/// Comparison dimension; comparing "overall" against itself makes no sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CompareByArg {
    District,
    Taluka,
    School,
}

impl From<CompareByArg> for GroupBy {
    fn from(arg: CompareByArg) -> Self {
        match arg {
            CompareByArg::District => GroupBy::District,
            CompareByArg::Taluka => GroupBy::Taluka,
            CompareByArg::School => GroupBy::School,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LevelArg {
    District,
    Taluka,
}

impl From<LevelArg> for CoverageLevel {
    fn from(arg: LevelArg) -> Self {
        match arg {
            LevelArg::District => CoverageLevel::District,
            LevelArg::Taluka => CoverageLevel::Taluka,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Report(report) => {
                if let (Some(from), Some(to)) = (report.from, report.to) {
                    if from > to {
                        return Err(format!("--from {} is after --to {}", from, to));
                    }
                }
            }
            Command::Compare(compare) => {
                if compare.entities.len() < 2 {
                    return Err("Comparison needs at least two --entity values".to_string());
                }
                let mut seen = std::collections::HashSet::new();
                if let Some(dup) = compare.entities.iter().find(|e| !seen.insert(e.as_str())) {
                    return Err(format!("Entity '{}' is listed more than once", dup));
                }
            }
            Command::Analyze { .. } | Command::Coverage(_) | Command::InitConfig => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
