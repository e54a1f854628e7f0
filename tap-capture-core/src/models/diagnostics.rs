/// Counters for debugging a capture session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureDiagnostics {
    /// I/O callback invocations received while armed.
    pub callback_count: u64,
    /// Samples appended to the buffer.
    pub samples_appended: u64,
    /// Buffers skipped because their descriptor was unusable.
    pub faulted_buffers: u64,
    /// Invocations that arrived after the sink was disarmed.
    pub late_callbacks: u64,
}

impl CaptureDiagnostics {
    pub fn has_faults(&self) -> bool {
        self.faulted_buffers > 0 || self.late_callbacks > 0
    }
}

/// Returned by `stop_capture()`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSummary {
    pub sample_count: usize,
    pub duration_secs: f64,
    pub output_device_uid: String,
    pub tap_uid: String,
    pub diagnostics: CaptureDiagnostics,
}
