use crate::models::devices::OutputDeviceRef;
use crate::models::error::{CaptureError, DeviceQueryStage, OsStatus};
use crate::traits::audio_platform::AudioPlatform;

/// Resolve the default system output device and its persistent UID.
///
/// The UID is read in two steps, size then data, and the buffer is always
/// sized from the first step. Any failure aborts; there are no retries.
pub fn resolve_default_output_device<P: AudioPlatform>(
    platform: &P,
) -> Result<OutputDeviceRef, CaptureError> {
    let id = platform
        .default_output_device()
        .map_err(|code| query_failed(DeviceQueryStage::DefaultOutputDevice, code))?;

    let size = platform
        .device_uid_size(id)
        .map_err(|code| query_failed(DeviceQueryStage::DeviceUidSize, code))?;

    let uid = platform
        .device_uid(id, size)
        .map_err(|code| query_failed(DeviceQueryStage::DeviceUid, code))?;

    log::debug!("Default output device #{} ({})", id, uid);
    Ok(OutputDeviceRef { id, uid })
}

fn query_failed(stage: DeviceQueryStage, code: OsStatus) -> CaptureError {
    log::error!("Output device query failed at {}: status {}", stage, code);
    CaptureError::DeviceQueryFailed { stage, code }
}
