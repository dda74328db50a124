//! Configuration management CLI commands.

use clap::{Args, Subcommand};
use tracing::{debug, info};

use crate::output::{self, OutputFormat};
use edgehook_core::error::AppError;

const DEFAULT_CONFIG: &str = include_str!("../../../../config/edgehook.toml");

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    debug!(path = config_path, command = ?args.command, "Running config command");

    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                output::print_success(&format!("Configuration '{}' is valid", config_path));
                output::print_kv("Log level", &config.logging.level);
                output::print_kv("Log format", &config.logging.format);
                output::print_kv(
                    "Upstream",
                    config.host.upstream.as_deref().unwrap_or("(echo)"),
                );
                output::print_kv("Observers", &enabled_observers(&config).join(", "));
                output::print_kv("Env keys", &config.runtime_env().len().to_string());
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
        ConfigCommand::Generate { output: out_path } => {
            if let Some(parent) = std::path::Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| AppError::internal(format!("Failed to create dir: {}", e)))?;
            }

            tokio::fs::write(out_path, DEFAULT_CONFIG)
                .await
                .map_err(|e| AppError::internal(format!("Failed to write config: {}", e)))?;

            info!(path = %out_path, "Default config generated");
            output::print_success(&format!("Default config written to '{}'", out_path));
        }
    }

    Ok(())
}

fn enabled_observers(config: &edgehook_core::config::AppConfig) -> Vec<&'static str> {
    let observers = &config.observers;
    let mut enabled = Vec::new();
    if observers.add_event_listener {
        enabled.push("addEventListener");
    }
    if observers.fetch {
        enabled.push("fetch");
    }
    if observers.respond_with {
        enabled.push("respondWith");
    }
    if observers.crypto {
        enabled.push("crypto");
    }
    if enabled.is_empty() {
        enabled.push("none");
    }
    enabled
}
