//! File-level pack pipeline: load both inputs, compose, write atomically.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compose::compose;
use crate::error::{ComposeError, InputRole};

/// Summary of a successful pack.
#[derive(Debug, Clone, Serialize)]
pub struct PackReport {
    /// Where the artifact was written.
    pub output: PathBuf,
    /// Size of the hook fragment in bytes.
    pub hook_bytes: usize,
    /// Size of the payload fragment in bytes.
    pub src_bytes: usize,
    /// Size of the written artifact in bytes.
    pub artifact_bytes: usize,
}

/// Packs `hook_path` ahead of `src_path` into `output_path`.
///
/// The artifact is written to a temporary sibling and renamed into place,
/// so `output_path` is either untouched or complete.
pub async fn pack_files(
    hook_path: &Path,
    src_path: &Path,
    output_path: &Path,
) -> Result<PackReport, ComposeError> {
    let hook_code = load(InputRole::Hook, hook_path).await?;
    let src_code = load(InputRole::Src, src_path).await?;

    let artifact = compose(&hook_code, &src_code)?;
    write_atomic(output_path, artifact.as_ref()).await?;

    info!(
        output = %output_path.display(),
        bytes = artifact.len(),
        "Artifact packed"
    );

    Ok(PackReport {
        output: output_path.to_path_buf(),
        hook_bytes: hook_code.len(),
        src_bytes: src_code.len(),
        artifact_bytes: artifact.len(),
    })
}

async fn load(role: InputRole, path: &Path) -> Result<String, ComposeError> {
    let code = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ComposeError::Load {
            role,
            path: path.to_path_buf(),
            source,
        })?;
    debug!(role = %role, path = %path.display(), bytes = code.len(), "Input loaded");
    Ok(code)
}

async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ComposeError> {
    let temp = temp_sibling(path);
    let save_error = |source| ComposeError::Save {
        path: path.to_path_buf(),
        source,
    };

    if let Err(e) = tokio::fs::write(&temp, contents).await {
        discard(&temp).await;
        return Err(save_error(e));
    }
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        discard(&temp).await;
        return Err(save_error(e));
    }
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "artifact".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

async fn discard(temp: &Path) {
    match tokio::fs::remove_file(temp).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            warn!(path = %temp.display(), error = %e, "Failed to remove temporary artifact");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temp_sibling_stays_in_directory() {
        let temp = temp_sibling(Path::new("/out/dist/worker.js"));
        assert_eq!(temp.parent(), Some(Path::new("/out/dist")));
        let name = temp.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with(".worker.js."));
        assert!(name.ends_with(".tmp"));
    }
}
