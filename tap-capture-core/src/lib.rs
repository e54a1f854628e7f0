//! # tap-capture-core
//!
//! Platform-agnostic system audio capture through a process tap.
//!
//! Builds a device graph (default output + process tap → private aggregate
//! device), registers a real-time I/O callback that accumulates samples, and
//! exports what was captured as a WAV file. Platform backends (macOS Core
//! Audio) implement the `AudioPlatform` trait and plug into the generic
//! `TapCaptureSession`.
//!
//! ## Architecture
//!
//! ```text
//! tap-capture-core (this crate)
//! ├── traits/       ← AudioPlatform, CaptureDelegate, RawAudioBuffer
//! ├── models/       ← CaptureError, CaptureState, CaptureConfiguration, device refs
//! ├── setup/        ← output discovery, tap factory, aggregate builder
//! ├── processing/   ← SampleBuffer, SampleSink (real-time callback target)
//! ├── session/      ← TapCaptureSession (state machine + graph ownership)
//! └── storage/      ← WAV exporter, metadata sidecar
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod setup;
pub mod storage;
pub mod traits;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use models::config::{CaptureConfiguration, EXPORT_CHANNELS, EXPORT_SAMPLE_RATE};
pub use models::devices::{
    AggregateDescriptor, AggregateDeviceRef, AudioObjectId, OutputDeviceRef, ProcessRef,
    SubDeviceEntry, SubTapEntry, TapHandle, TapRequest,
};
pub use models::diagnostics::{CaptureDiagnostics, CaptureSummary};
pub use models::error::{CaptureError, DeviceQueryStage, OsStatus};
pub use models::export::{ExportMetadata, ExportReport, ExportResult};
pub use models::state::CaptureState;
pub use processing::sample_buffer::SampleBuffer;
pub use processing::sample_sink::SampleSink;
pub use session::capture_session::TapCaptureSession;
pub use traits::audio_platform::{AudioPlatform, BufferFault, IoCallback, RawAudioBuffer};
pub use traits::capture_delegate::CaptureDelegate;
