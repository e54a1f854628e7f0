use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::CaptureError;

/// Outcome of an export: the written file, or why nothing was written.
pub type ExportResult = Result<ExportReport, CaptureError>;

/// Returned when an export completes successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    pub file_path: PathBuf,
    pub sample_count: usize,
    pub sample_rate: u32,
    pub duration_secs: f64,
    /// SHA-256 of the written file, lowercase hex.
    pub checksum: String,
}

/// Metadata stored alongside an exported recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub id: String,
    pub created_at: String,
    pub file_path: String,
    pub duration_secs: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_count: usize,
    pub checksum: String,
    pub output_device_uid: Option<String>,
    pub tap_uid: Option<String>,
}

impl ExportMetadata {
    pub fn new(
        report: &ExportReport,
        channels: u16,
        output_device_uid: Option<String>,
        tap_uid: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            file_path: report.file_path.to_string_lossy().into_owned(),
            duration_secs: report.duration_secs,
            sample_rate: report.sample_rate,
            channels,
            sample_count: report.sample_count,
            checksum: report.checksum.clone(),
            output_device_uid,
            tap_uid,
        }
    }
}
