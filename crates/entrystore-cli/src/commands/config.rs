//! Config command - View and validate entry store configuration
//!
//! Provides the `entrystore config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Validates the configuration file and reports errors

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use entrystore_core::config::{Config, ValidationError};

use crate::output::{get_formatter, OutputFormat};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current configuration
    Show,
    /// Validate configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command against `path` (or the default location)
    pub async fn execute(&self, path: Option<&PathBuf>, format: OutputFormat) -> Result<()> {
        let config_path = path.cloned().unwrap_or_else(Config::default_path);
        match self {
            ConfigCommand::Show => self.execute_show(&config_path, format).await,
            ConfigCommand::Validate => self.execute_validate(&config_path, format).await,
        }
    }

    /// Show current configuration
    async fn execute_show(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);
        let config = Config::load_or_default(config_path);

        info!(config_path = %config_path.display(), "Showing configuration");

        if format == OutputFormat::Json {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            formatter.print_json(&json);
        } else {
            formatter.success(&format!("Configuration ({})", config_path.display()));
            formatter.info("");

            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;

            for line in yaml.lines() {
                formatter.info(line);
            }
        }

        Ok(())
    }

    /// Validate configuration file
    async fn execute_validate(&self, config_path: &Path, format: OutputFormat) -> Result<()> {
        let formatter = get_formatter(format);

        // Load explicitly (not load_or_default) so parse errors surface
        let config = match Config::load(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                if !config_path.exists() {
                    if format == OutputFormat::Json {
                        let json = serde_json::json!({
                            "valid": false,
                            "config_path": config_path.display().to_string(),
                            "errors": ["Configuration file not found. Using defaults."],
                        });
                        formatter.print_json(&json);
                    } else {
                        formatter.info(&format!(
                            "Configuration file not found at {}",
                            config_path.display()
                        ));
                        formatter.info("Using default configuration.");
                    }
                    return Ok(());
                }

                if format == OutputFormat::Json {
                    let json = serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [format!("Failed to parse configuration: {}", e)],
                    });
                    formatter.print_json(&json);
                } else {
                    formatter.error(&format!("Failed to parse configuration: {}", e));
                    formatter.info(&format!("File: {}", config_path.display()));
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating configuration");

        let errors = config.validate();

        if format == OutputFormat::Json {
            formatter.print_json(&validation_report(config_path, &errors));
        } else if errors.is_empty() {
            formatter.success("Configuration is valid");
            formatter.info(&format!("File: {}", config_path.display()));
        } else {
            formatter.error(&format!(
                "Configuration has {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            formatter.info(&format!("File: {}", config_path.display()));
            formatter.info("");
            for error in &errors {
                formatter.info(&format!("  {} - {}", error.field, error.message));
            }
        }

        Ok(())
    }
}

fn validation_report(config_path: &Path, errors: &[ValidationError]) -> serde_json::Value {
    let error_strings: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
    serde_json::json!({
        "valid": errors.is_empty(),
        "config_path": config_path.display().to_string(),
        "errors": error_strings,
    })
}
