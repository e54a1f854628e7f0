use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::models::export::ExportMetadata;

/// Sidecar path for a recording: `{recording_path}.metadata.json`.
pub fn metadata_path(recording_path: &Path) -> PathBuf {
    recording_path.with_extension("metadata.json")
}

/// Write export metadata as a JSON sidecar file next to the recording.
pub fn write_metadata(
    metadata: &ExportMetadata,
    recording_path: &Path,
) -> Result<PathBuf, CaptureError> {
    let path = metadata_path(recording_path);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| CaptureError::write_failed(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&path, json)
        .map_err(|e| CaptureError::write_failed(format!("failed to write metadata: {}", e)))?;
    Ok(path)
}

/// Read export metadata from a JSON sidecar file.
pub fn read_metadata(recording_path: &Path) -> Result<ExportMetadata, CaptureError> {
    let path = metadata_path(recording_path);
    let json = fs::read_to_string(&path)
        .map_err(|e| CaptureError::MetadataReadFailed(e.to_string()))?;
    serde_json::from_str(&json)
        .map_err(|e| CaptureError::MetadataReadFailed(format!("invalid JSON: {}", e)))
}
