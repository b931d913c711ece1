//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.schoolreport.toml` files.

use crate::cli::{Args, Command, OutputFormat};
use anyhow::{Context, Result};
use schoolreport::loader::LoadOptions;
use schoolreport::models::{ChartKind, GroupBy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".schoolreport.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Input loading settings.
    #[serde(default)]
    pub loader: LoaderConfig,
}

/// General application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Output file path; stdout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// Output format.
    #[serde(default)]
    pub format: FormatSetting,
}

/// Output format as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatSetting {
    #[default]
    Markdown,
    Json,
}

impl From<OutputFormat> for FormatSetting {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Markdown => FormatSetting::Markdown,
            OutputFormat::Json => FormatSetting::Json,
        }
    }
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Default grouping dimension.
    #[serde(default)]
    pub group_by: GroupBy,

    /// Include per-field visualizations.
    #[serde(default = "default_true")]
    pub include_charts: bool,

    /// Chart used when a field suggests none.
    #[serde(default)]
    pub default_chart: ChartKind,

    /// Maximum key findings shown in the Markdown summary (0 = all).
    #[serde(default)]
    pub max_summary_findings: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            group_by: GroupBy::None,
            include_charts: true,
            default_chart: ChartKind::Bar,
            max_summary_findings: 0,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Response loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Extension of response files inside a directory.
    #[serde(default = "default_extension")]
    pub response_extension: String,

    /// Maximum directory depth to walk.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            response_extension: default_extension(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_max_depth() -> usize {
    4
}

impl From<&LoaderConfig> for LoadOptions {
    fn from(config: &LoaderConfig) -> Self {
        Self {
            extension: config.response_extension.clone(),
            max_depth: config.max_depth,
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// Only explicitly provided values override the config.
    pub fn merge_with_args(&mut self, args: &Args) {
        if let Some(ref output) = args.output {
            self.general.output = Some(output.clone());
        }
        if let Some(format) = args.format {
            self.general.format = format.into();
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Command::Report(report) = &args.command {
            if let Some(group_by) = report.group_by {
                self.report.group_by = group_by.into();
            }
            if report.no_charts {
                self.report.include_charts = false;
            }
        }
    }

    /// Summary finding cap, `None` when unlimited.
    pub fn max_findings(&self) -> Option<usize> {
        match self.report.max_summary_findings {
            0 => None,
            n => Some(n),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.report.group_by, GroupBy::None);
        assert!(config.report.include_charts);
        assert_eq!(config.report.default_chart, ChartKind::Bar);
        assert_eq!(config.loader.response_extension, "json");
        assert_eq!(config.max_findings(), None);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output = "district_report.md"
verbose = true
format = "json"

[report]
group_by = "district"
default_chart = "pie"
max_summary_findings = 5

[loader]
max_depth = 2
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(
            config.general.output,
            Some(PathBuf::from("district_report.md"))
        );
        assert!(config.general.verbose);
        assert_eq!(config.general.format, FormatSetting::Json);
        assert_eq!(config.report.group_by, GroupBy::District);
        assert_eq!(config.report.default_chart, ChartKind::Pie);
        assert!(config.report.include_charts);
        assert_eq!(config.max_findings(), Some(5));
        assert_eq!(config.loader.max_depth, 2);
        assert_eq!(config.loader.response_extension, "json");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report]\ninclude_charts = false").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert!(!config.report.include_charts);
        assert!(Config::load(Path::new("/no/such/config.toml")).is_err());
    }

    #[test]
    fn test_merge_with_args() {
        let mut config = Config::default();
        config.report.group_by = GroupBy::District;

        let args = Args::try_parse_from([
            "schoolreport",
            "--format",
            "json",
            "report",
            "--form",
            "f.json",
            "--responses",
            "r.json",
            "--no-charts",
        ])
        .unwrap();
        config.merge_with_args(&args);

        assert_eq!(config.general.format, FormatSetting::Json);
        assert_eq!(config.report.group_by, GroupBy::District);
        assert!(!config.report.include_charts);

        let args = Args::try_parse_from([
            "schoolreport",
            "report",
            "--form",
            "f.json",
            "--responses",
            "r.json",
            "--group-by",
            "school",
        ])
        .unwrap();
        config.merge_with_args(&args);
        assert_eq!(config.report.group_by, GroupBy::School);
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(!toml_str.is_empty());
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[report]"));
        assert!(toml_str.contains("[loader]"));

        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.report.default_chart, ChartKind::Bar);
    }
}
