//! Error type for composition and the pack pipeline.

use std::path::PathBuf;

use edgehook_core::error::{AppError, ErrorKind};
use thiserror::Error;

/// Which of the two inputs an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRole {
    /// The hook-installation fragment.
    Hook,
    /// The payload fragment.
    Src,
}

impl std::fmt::Display for InputRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hook => write!(f, "Hook"),
            Self::Src => write!(f, "Src"),
        }
    }
}

/// Failure to produce a composed artifact. No output is written when any of
/// these is returned.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// An input is empty or blank.
    #[error("{role} Error: Missing required input")]
    MissingInput {
        /// The input that was missing.
        role: InputRole,
    },

    /// An input file could not be read.
    #[error("{role} Error: Load file failed: {}", .path.display())]
    Load {
        /// The input being loaded.
        role: InputRole,
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The artifact could not be written.
    #[error("Save Error: Write file failed: {}", .path.display())]
    Save {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<ComposeError> for AppError {
    fn from(err: ComposeError) -> Self {
        let message = err.to_string();
        match err {
            ComposeError::MissingInput { .. } => AppError::composition(message),
            ComposeError::Load { source, .. } | ComposeError::Save { source, .. } => {
                AppError::with_source(ErrorKind::Composition, message, source)
            }
        }
    }
}
