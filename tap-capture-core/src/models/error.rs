use std::fmt;

use thiserror::Error;

use super::state::CaptureState;

/// Raw status code returned by the platform audio subsystem (`OSStatus` on macOS).
pub type OsStatus = i32;

/// `kAudioHardwareIllegalOperationError` (`'nope'`), what the tap constructor
/// returns when the audio capture permission has not been granted.
pub const STATUS_PERMISSION_DENIED: OsStatus = 0x6E6F_7065;

/// Which step of default-output discovery failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceQueryStage {
    /// Reading the global default system output device.
    DefaultOutputDevice,
    /// Asking for the byte size of the device UID property.
    DeviceUidSize,
    /// Reading the device UID property itself.
    DeviceUid,
}

impl fmt::Display for DeviceQueryStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DefaultOutputDevice => "default output device",
            Self::DeviceUidSize => "device UID size",
            Self::DeviceUid => "device UID",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while setting up, running, or exporting a capture.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("failed to query {stage} (status {code})")]
    DeviceQueryFailed { stage: DeviceQueryStage, code: OsStatus },

    #[error("process tap creation failed (status {code}); check system audio recording permission")]
    TapCreationFailed { code: OsStatus },

    #[error("aggregate device creation failed (status {code})")]
    AggregateCreationFailed { code: OsStatus },

    #[error("I/O callback registration failed (status {code})")]
    CallbackRegistrationFailed { code: OsStatus },

    #[error("audio device start failed (status {code})")]
    DeviceStartFailed { code: OsStatus },

    #[error("cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: CaptureState,
    },

    #[error("nothing to export: the sample buffer is empty")]
    EmptyBuffer,

    #[error("failed to write audio file: {cause}")]
    WriteFailed { cause: String },

    #[error("failed to read metadata: {0}")]
    MetadataReadFailed(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),
}

impl CaptureError {
    /// Whether the caller should prompt the user for the capture permission.
    ///
    /// Tap creation is the step the OS gates behind consent; it reports a
    /// denial as `'nope'`.
    pub fn is_permission_related(&self) -> bool {
        matches!(
            self,
            Self::TapCreationFailed {
                code: STATUS_PERMISSION_DENIED
            }
        )
    }

    /// Whether the error was produced by a device-graph setup stage.
    pub fn is_setup_failure(&self) -> bool {
        matches!(
            self,
            Self::DeviceQueryFailed { .. }
                | Self::TapCreationFailed { .. }
                | Self::AggregateCreationFailed { .. }
                | Self::CallbackRegistrationFailed { .. }
                | Self::DeviceStartFailed { .. }
        )
    }

    pub(crate) fn write_failed(cause: impl fmt::Display) -> Self {
        Self::WriteFailed {
            cause: cause.to_string(),
        }
    }
}
