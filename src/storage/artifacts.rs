//! JSON artifact persistence.
//!
//! Every fitted object (calibration table, preprocessing pipeline, trained
//! model) is stored as one JSON document. Saves are atomic: the document is
//! written to a temp file alongside the target and renamed into place, so a
//! reader never observes a half-written artifact.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// Errors raised while reading or writing an artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("artifact I/O error ({}): {1}", .0.display())]
    Io(PathBuf, io::Error),
    #[error("artifact {} is unreadable: {1}", .0.display())]
    Decode(PathBuf, serde_json::Error),
    #[error("failed to encode artifact {}: {1}", .0.display())]
    Encode(PathBuf, serde_json::Error),
}

/// Serialize `value` to `path` atomically (write temp file, then rename).
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ArtifactError> {
    let json = serde_json::to_vec_pretty(value)
        .map_err(|e| ArtifactError::Encode(path.to_path_buf(), e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ArtifactError::Io(parent.to_path_buf(), e))?;
    }

    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, &json).map_err(|e| ArtifactError::Io(tmp_path.clone(), e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| ArtifactError::Io(path.to_path_buf(), e))?;

    tracing::info!(path = %path.display(), size = %format_size(json.len() as u64), "Artifact saved");
    Ok(())
}

/// Load an artifact written by [`save_json`].
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ArtifactError::NotFound(path.to_path_buf())
        } else {
            ArtifactError::Io(path.to_path_buf(), e)
        }
    })?;
    serde_json::from_slice(&data).map_err(|e| ArtifactError::Decode(path.to_path_buf(), e))
}

/// Presence report for one artifact file.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactStatus {
    pub name: &'static str,
    pub path: String,
    pub present: bool,
    pub size: Option<String>,
}

impl ArtifactStatus {
    pub fn probe(name: &'static str, path: &Path) -> Self {
        let size = std::fs::metadata(path).ok().map(|m| format_size(m.len()));
        Self {
            name,
            path: path.display().to_string(),
            present: size.is_some(),
            size,
        }
    }
}

/// Human-readable size rounded to whole kilobytes (`~ 12 KB`).
pub fn format_size(bytes: u64) -> String {
    format!("~ {} KB", (bytes + 512) / 1024)
}
