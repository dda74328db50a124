//! `edgehook` command-line tool.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use edgehook_core::error::{AppError, ErrorKind};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    // Diagnostics go to stderr so `--format json` output stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = cli.execute().await {
        tracing::debug!(kind = %e.kind, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(exit_code(&e));
    }
}

/// Maps failures onto sysexits codes.
fn exit_code(error: &AppError) -> i32 {
    match error.kind {
        ErrorKind::Composition | ErrorKind::Validation => 65,
        ErrorKind::Configuration => 78,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        assert_eq!(exit_code(&AppError::composition("blank hook")), 65);
        assert_eq!(exit_code(&AppError::configuration("bad toml")), 78);
        assert_eq!(exit_code(&AppError::network("refused")), 1);
    }
}
