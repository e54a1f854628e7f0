//! # tap-capture-macos
//!
//! macOS Core Audio backend for tap-capture-core.
//!
//! Provides:
//! - `CoreAudioPlatform` — `AudioPlatform` over the Core Audio HAL
//! - `process_tap` — `CATapDescription` global taps with process exclusion
//! - `aggregate_device` — private aggregate devices wrapping output + tap
//!
//! ## Platform Requirements
//! - macOS 14.2+ for process taps
//! - The host app needs the "System Audio Recording" (TCC) permission; a
//!   denied request surfaces as `CaptureError::is_permission_related()`
//!
//! ## Usage
//! ```ignore
//! use tap_capture_core::{CaptureConfiguration, TapCaptureSession};
//! use tap_capture_macos::CoreAudioPlatform;
//!
//! let platform = CoreAudioPlatform::new();
//! let mut session = TapCaptureSession::new(platform, CaptureConfiguration::default())?;
//! session.start_capture()?;
//! // ...
//! session.stop_capture()?;
//! let report = session.export_to("capture.wav".as_ref())?;
//! ```

#[cfg(target_os = "macos")]
pub mod aggregate_device;
#[cfg(target_os = "macos")]
pub mod device_properties;
#[cfg(target_os = "macos")]
mod ffi;
#[cfg(target_os = "macos")]
pub mod io_proc;
#[cfg(target_os = "macos")]
pub mod platform;
#[cfg(target_os = "macos")]
pub mod process_tap;

#[cfg(target_os = "macos")]
pub use io_proc::CoreAudioIoProc;
#[cfg(target_os = "macos")]
pub use platform::CoreAudioPlatform;
