//! CLI command definitions and dispatch.

pub mod config;
pub mod pack;
pub mod slots;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use edgehook_core::config::AppConfig;
use edgehook_core::error::AppError;

/// EdgeHook: hook composition for edge workers
#[derive(Debug, Parser)]
#[command(name = "edgehook", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/edgehook.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compose hook code ahead of payload code
    Pack(pack::PackArgs),
    /// Configuration management
    Config(config::ConfigArgs),
    /// List the interception slots
    Slots,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Pack(args) => pack::execute(args, self.format).await,
            Commands::Config(args) => config::execute(args, &self.config, self.format).await,
            Commands::Slots => {
                slots::execute(self.format);
                Ok(())
            }
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
        .map_err(|e| AppError::configuration(format!("Failed to load config: {}", e.message)))
}
