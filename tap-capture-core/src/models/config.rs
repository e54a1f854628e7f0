use super::devices::ProcessRef;

/// Sample rate written into exported files, in Hz.
pub const EXPORT_SAMPLE_RATE: u32 = 44_100;

/// Channel count of the tap stream and of exported files.
pub const EXPORT_CHANNELS: u16 = 1;

/// Configuration for a capture session.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfiguration {
    /// Prefix of the private aggregate device name. The session appends its
    /// aggregate UID so two sessions never share a name.
    pub aggregate_name_prefix: String,

    /// Processes whose output the tap ignores. Empty captures the full mix.
    pub excluded_processes: Vec<ProcessRef>,

    /// Seconds of audio to reserve in the sample buffer up front, so the
    /// real-time callback rarely has to grow it (default: 60).
    pub reserve_secs: f64,

    /// Write `<file>.metadata.json` next to each export (default: false).
    pub write_metadata_sidecar: bool,
}

impl CaptureConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.aggregate_name_prefix.trim().is_empty() {
            return Err("aggregate device name prefix must not be empty".into());
        }
        if !self.reserve_secs.is_finite() || self.reserve_secs < 0.0 {
            return Err(format!("invalid buffer reservation: {} s", self.reserve_secs));
        }
        Ok(())
    }

    /// Number of samples to pre-reserve in the sample buffer.
    pub fn reserve_samples(&self) -> usize {
        (self.reserve_secs * EXPORT_SAMPLE_RATE as f64 * EXPORT_CHANNELS as f64) as usize
    }
}

impl Default for CaptureConfiguration {
    fn default() -> Self {
        Self {
            aggregate_name_prefix: "System Audio Tap".into(),
            excluded_processes: Vec::new(),
            reserve_secs: 60.0,
            write_metadata_sidecar: false,
        }
    }
}
