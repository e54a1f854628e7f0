use serde::Serialize;

/// Transient numeric handle of an audio object (device, tap, aggregate).
pub type AudioObjectId = u32;

/// Process whose audio a tap should ignore, identified by its pid.
pub type ProcessRef = u32;

/// The system output device a capture is anchored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDeviceRef {
    pub id: AudioObjectId,
    /// Persistent UID, stable across reboots unlike `id`.
    pub uid: String,
}

/// What the tap factory asks the platform to create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapRequest {
    /// UID the platform must assign to the tap; the aggregate refers to it.
    pub uid: String,
    pub name: String,
    /// Global tap of every process except these.
    pub excluded_processes: Vec<ProcessRef>,
    /// Downmix the tapped output to one channel.
    pub mono: bool,
}

/// A live process tap. Released when the session that created it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapHandle {
    pub id: AudioObjectId,
    pub uid: String,
}

/// Sub-device entry of an aggregate description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubDeviceEntry {
    pub uid: String,
}

/// Tap entry of an aggregate description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubTapEntry {
    pub uid: String,
    /// Resample the tap against the main sub-device's clock.
    pub drift_compensation: bool,
}

/// Full description of the aggregate device combining the output and the tap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AggregateDescriptor {
    pub name: String,
    pub uid: String,
    pub main_sub_device_uid: String,
    /// Hidden from other processes.
    pub is_private: bool,
    /// Sub-devices layered into one stream rather than side by side.
    pub is_stacked: bool,
    /// Start the taps whenever the aggregate starts.
    pub tap_auto_start: bool,
    pub sub_devices: Vec<SubDeviceEntry>,
    pub taps: Vec<SubTapEntry>,
}

/// A live aggregate device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateDeviceRef {
    pub id: AudioObjectId,
    pub uid: String,
}
