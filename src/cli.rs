//! Command-line interface for edgepin.
//!
//! Parses `<stage> <mode>` plus overrides, layers them over the settings file,
//! builds the AWS SDK backend and dispatches to the update or view pipeline.

use crate::commands::{self, Style};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use edgepin_config::{LogLevel, Settings, Stage, StageConfigStore};
use edgepin_provider::{AwsSdk, AwsSdkConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

/// edgepin - pin CloudFront Lambda@Edge associations to their latest versions
#[derive(Parser, Debug)]
#[command(name = "edgepin")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Stage whose block and distribution to use
    #[arg(value_enum)]
    pub stage: Stage,

    /// What to do with the stage
    #[arg(value_enum)]
    pub mode: Mode,

    /// Stage store file (default: image_flex_config.json)
    #[arg(long, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Settings file (default: ~/.config/edgepin/config.yaml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// AWS named profile
    #[arg(long, value_name = "NAME")]
    pub profile: Option<String>,

    /// Region the edge functions are published in
    #[arg(long, value_name = "REGION")]
    pub lambda_region: Option<String>,

    /// Timeout for each provider call
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Log verbosity on stderr
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Resolve latest function versions, save the stage and push it
    Update,
    /// Print the live distribution config
    View,
}

impl Cli {
    /// Load the settings file and apply command-line overrides on top.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::load_from(path),
            None => Settings::load(),
        }
        .context("Failed to load settings")?;

        if let Some(store) = &self.store {
            settings.store_path = Some(store.clone());
        }
        if let Some(profile) = &self.profile {
            settings.profile = Some(profile.clone());
        }
        if let Some(region) = &self.lambda_region {
            settings.lambda_region = region.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
        settings.validate().context("Invalid settings")?;
        Ok(settings)
    }
}

/// Backend configuration derived from settings
pub fn aws_sdk_config(settings: &Settings) -> AwsSdkConfig {
    AwsSdkConfig {
        profile: settings.profile.clone(),
        cloudfront_region: settings.cloudfront_region.clone(),
        lambda_region: settings.lambda_region.clone(),
        timeout: Duration::from_secs(settings.timeout_secs),
    }
}

/// Run the parsed command against the AWS backend, writing to stdout.
pub fn run(cli: &Cli, settings: &Settings, runtime: Arc<Runtime>) -> Result<()> {
    let store = StageConfigStore::new(settings.resolved_store_path());
    let aws = AwsSdk::connect(runtime, &aws_sdk_config(settings));
    let style = Style::detect();
    let mut stdout = std::io::stdout().lock();

    log::info!(
        "Running {:?} for stage '{}' with store {:?}",
        cli.mode,
        cli.stage,
        store.path()
    );

    match cli.mode {
        Mode::Update => {
            commands::run_update(cli.stage, &store, &aws, &aws, style, &mut stdout)?;
        }
        Mode::View => {
            commands::run_view(cli.stage, &store, &aws, style, &mut stdout)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positionals() {
        let cli = Cli::try_parse_from(["edgepin", "prod", "view"]).unwrap();
        assert_eq!(cli.stage, Stage::Prod);
        assert_eq!(cli.mode, Mode::View);
        assert!(cli.store.is_none());
    }

    #[test]
    fn test_rejects_unknown_stage_and_mode() {
        assert!(Cli::try_parse_from(["edgepin", "staging", "view"]).is_err());
        assert!(Cli::try_parse_from(["edgepin", "dev", "deploy"]).is_err());
        assert!(Cli::try_parse_from(["edgepin", "dev"]).is_err());
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(Cli::try_parse_from(["edgepin", "dev", "update", "--timeout", "0"]).is_err());
    }

    #[test]
    fn test_flags_override_settings_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = dir.path().join("config.yaml");
        std::fs::write(&config, "profile: from-file\ntimeout_secs: 30\n").unwrap();

        let cli = Cli::try_parse_from([
            "edgepin",
            "dev",
            "update",
            "--config",
            config.to_str().unwrap(),
            "--profile",
            "from-flag",
            "--store",
            "/tmp/stages.json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        let settings = cli.settings().unwrap();

        assert_eq!(settings.profile.as_deref(), Some("from-flag"));
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.resolved_store_path(), PathBuf::from("/tmp/stages.json"));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));

        let backend = aws_sdk_config(&settings);
        assert_eq!(backend.timeout, Duration::from_secs(30));
        assert_eq!(backend.lambda_region, "us-east-1");
        assert_eq!(backend.profile.as_deref(), Some("from-flag"));
    }
}
