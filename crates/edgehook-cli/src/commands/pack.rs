//! `edgehook pack <hook> <src> <output>`.

use std::path::PathBuf;

use clap::Args;
use tracing::{debug, info};

use crate::output::{self, OutputFormat};
use edgehook_core::error::AppError;
use edgehook_pack::pack_files;

/// Arguments for the pack command
#[derive(Debug, Args)]
pub struct PackArgs {
    /// Hook-installation script
    pub hook: PathBuf,
    /// Payload script
    pub src: PathBuf,
    /// Where to write the composed artifact
    pub output: PathBuf,
}

/// Execute the pack command
pub async fn execute(args: &PackArgs, format: OutputFormat) -> Result<(), AppError> {
    debug!(
        hook = %args.hook.display(),
        src = %args.src.display(),
        output = %args.output.display(),
        "Packing artifact"
    );

    let report = match pack_files(&args.hook, &args.src, &args.output).await {
        Ok(report) => report,
        Err(e) => {
            output::print_error(&e.to_string());
            return Err(e.into());
        }
    };
    info!(bytes = report.artifact_bytes, "Pack complete");

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Packed '{}'", report.output.display()));
            output::print_kv("Hook", &format!("{} bytes", report.hook_bytes));
            output::print_kv("Src", &format!("{} bytes", report.src_bytes));
            output::print_kv("Artifact", &format!("{} bytes", report.artifact_bytes));
        }
        OutputFormat::Json => output::print_item(&report, format),
    }

    Ok(())
}
