use crate::models::diagnostics::CaptureSummary;
use crate::models::error::CaptureError;
use crate::models::state::CaptureState;

/// Event delegate for capture session notifications.
///
/// All methods are called from the thread that drives the session (the one
/// calling `start_capture` / `stop_capture`), never from the audio queue.
pub trait CaptureDelegate: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: CaptureState);

    /// Called when a session operation fails.
    fn on_error(&self, error: &CaptureError);

    /// Called once a capture has stopped and its device graph is released.
    fn on_capture_finished(&self, summary: &CaptureSummary);
}
