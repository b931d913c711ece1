//! SchoolReport - analytics for school data-collection forms
//!
//! A CLI tool that loads a form definition and its per-school responses,
//! aggregates them by geography and renders reports with insights.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing input, parse failure, bad config, etc.)
//!   2 - Empty result with --fail-on-empty

mod cli;
mod config;

use anyhow::{Context, Result};
use cli::{Args, Command, CompareArgs, CoverageArgs, ReportArgs};
use config::{Config, FormatSetting, CONFIG_FILE};
use schoolreport::loader::{self, LoadOptions};
use schoolreport::models::GroupBy;
use schoolreport::report::{self, ComparisonRequest, ReportOptions};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle init-config early (no logging needed)
    if matches!(args.command, Command::InitConfig) {
        return handle_init_config();
    }

    // Load configuration before logging so `general.verbose` applies
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(&args, &config);

    info!("SchoolReport v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    match run(args, config).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: generate a default .schoolreport.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize grouping, charts, and response loading.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Dispatch the selected command. Returns the exit code (0 or 2).
async fn run(args: Args, config: Config) -> Result<i32> {
    let load_options = LoadOptions::from(&config.loader);

    match &args.command {
        Command::Analyze { form } => run_analyze(form, &config).await,
        Command::Report(report_args) => run_report(report_args, &config, &load_options).await,
        Command::Compare(compare_args) => run_compare(compare_args, &config, &load_options).await,
        Command::Coverage(coverage_args) => {
            run_coverage(coverage_args, &config, &load_options).await
        }
        Command::InitConfig => Ok(0),
    }
}

async fn run_analyze(form_path: &Path, config: &Config) -> Result<i32> {
    let form = loader::load_form(form_path).await?;
    let analyses = report::analyze_form(&form);

    let aggregatable = analyses.iter().filter(|a| a.is_aggregatable).count();
    info!(
        "{} of {} fields are aggregatable",
        aggregatable,
        analyses.len()
    );

    let output = match config.general.format {
        FormatSetting::Json => report::generate_json(&analyses)?,
        FormatSetting::Markdown => report::generate_markdown_analysis(&form, &analyses),
    };
    emit(&output, config.general.output.as_deref())?;

    Ok(0)
}

async fn run_report(args: &ReportArgs, config: &Config, load_options: &LoadOptions) -> Result<i32> {
    let (form, responses) =
        loader::load_form_with_responses(&args.form, &args.responses, load_options).await?;

    let options = ReportOptions {
        group_by: config.report.group_by,
        filters: args.filters(),
        include_charts: config.report.include_charts,
        default_chart: config.report.default_chart,
    };

    let generated = report::build_report(&form, &responses, &options);

    let output = match config.general.format {
        FormatSetting::Json => report::generate_json(&generated)?,
        FormatSetting::Markdown => {
            report::generate_markdown_report(&generated, config.max_findings())
        }
    };
    emit(&output, config.general.output.as_deref())?;

    info!(
        "Report {} covers {} responses with {} visualizations",
        generated.report_id,
        generated.response_count,
        generated.visualizations.len()
    );

    if args.fail_on_empty && generated.visualizations.is_empty() {
        warn!("Report has no visualizations. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

async fn run_compare(
    args: &CompareArgs,
    config: &Config,
    load_options: &LoadOptions,
) -> Result<i32> {
    let (form, responses) =
        loader::load_form_with_responses(&args.form, &args.responses, load_options).await?;

    let request = ComparisonRequest {
        compare_by: GroupBy::from(args.by),
        entities: args.entities.clone(),
        default_chart: config.report.default_chart,
    };

    let comparison = report::build_comparison(&form, &responses, &request);

    let output = match config.general.format {
        FormatSetting::Json => report::generate_json(&comparison)?,
        FormatSetting::Markdown => report::generate_markdown_comparison(&comparison),
    };
    emit(&output, config.general.output.as_deref())?;

    if args.fail_on_empty && comparison.fields.is_empty() {
        warn!("Comparison has no fields. Failing (exit code 2).");
        return Ok(2);
    }

    Ok(0)
}

async fn run_coverage(
    args: &CoverageArgs,
    config: &Config,
    load_options: &LoadOptions,
) -> Result<i32> {
    let (schools, responses) = tokio::try_join!(
        loader::load_schools(&args.schools),
        loader::load_responses(&args.responses, load_options)
    )?;

    let coverage = schoolreport::analysis::coverage(&schools, &responses, args.level.into());

    let output = match config.general.format {
        FormatSetting::Json => report::generate_json(&coverage)?,
        FormatSetting::Markdown => report::generate_markdown_coverage(&coverage),
    };
    emit(&output, config.general.output.as_deref())?;

    Ok(0)
}

/// Write rendered output to the configured file, or stdout.
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            report::write_output(content, path)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            println!("✅ Output saved to: {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

/// Load configuration from file or use defaults.
///
/// Returns the config and the file it came from, if any. Runs before
/// logging is initialized, so problems are reported on stderr.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, Some(PathBuf::from(CONFIG_FILE)))),
        Ok(None) => Ok((Config::default(), None)),
        Err(e) => {
            eprintln!("⚠️  Failed to load config: {:#}", e);
            Ok((Config::default(), None))
        }
    }
}
