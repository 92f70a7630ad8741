//! `config.yaml` loading.
use crate::error::SheetSqlError;
use serde::Deserialize;
use std::path::Path;
use std::path::PathBuf;

/// Default configuration file, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub cli: CliConfig,
    pub generate: GenerateConfig,
}

/// Log output targets. Each entry is `stdout`, `stderr` or a file path.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct CliConfig {
    /// Receives INFO, DEBUG and TRACE events
    pub stdout: Vec<String>,
    /// Receives WARN and ERROR events
    pub stderr: Vec<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            stdout: vec!["stdout".to_owned()],
            stderr: vec!["stderr".to_owned()],
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerateConfig {
    pub template: PathBuf,
    pub output_dir: PathBuf,
    /// Value written in place of a cell that cannot be read
    pub placeholder: String,
    /// Omit unreadable cells instead of writing the placeholder
    pub shorten_rows: bool,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("template.txt"),
            output_dir: PathBuf::from("."),
            placeholder: String::new(),
            shorten_rows: false,
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file.
    /// A missing file yields the defaults; empty target lists fall back to their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SheetSqlError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, SheetSqlError> {
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        let mut config: Config = serde_yaml::from_str(content)?;
        let defaults = CliConfig::default();
        if config.cli.stdout.is_empty() {
            config.cli.stdout = defaults.stdout;
        }
        if config.cli.stderr.is_empty() {
            config.cli.stderr = defaults.stderr;
        }
        Ok(config)
    }
}
