use crate::models::devices::{
    AggregateDescriptor, AggregateDeviceRef, OutputDeviceRef, SubDeviceEntry, SubTapEntry,
    TapHandle,
};
use crate::models::error::CaptureError;
use crate::traits::audio_platform::AudioPlatform;

impl AggregateDescriptor {
    /// Describe a private aggregate of `output` plus `tap`.
    ///
    /// The output device is the main (clock) sub-device. The tap sits beside
    /// it, not stacked, and is drift-compensated because the tap's virtual
    /// clock and the hardware clock are independent.
    pub fn for_tap(name_prefix: &str, output: &OutputDeviceRef, tap: &TapHandle) -> Self {
        let uid = uuid::Uuid::new_v4().to_string();
        Self {
            name: format!("{}-{}", name_prefix, &uid[..8]),
            uid,
            main_sub_device_uid: output.uid.clone(),
            is_private: true,
            is_stacked: false,
            tap_auto_start: true,
            sub_devices: vec![SubDeviceEntry {
                uid: output.uid.clone(),
            }],
            taps: vec![SubTapEntry {
                uid: tap.uid.clone(),
                drift_compensation: true,
            }],
        }
    }
}

/// Create the aggregate device that the I/O callback is registered on.
pub fn build_aggregate<P: AudioPlatform>(
    platform: &mut P,
    name_prefix: &str,
    output: &OutputDeviceRef,
    tap: &TapHandle,
) -> Result<AggregateDeviceRef, CaptureError> {
    let descriptor = AggregateDescriptor::for_tap(name_prefix, output, tap);
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "Aggregate descriptor: {}",
            serde_json::to_string(&descriptor).unwrap_or_default()
        );
    }

    let id = platform.create_aggregate_device(&descriptor).map_err(|code| {
        log::error!("Aggregate device creation failed: status {}", code);
        CaptureError::AggregateCreationFailed { code }
    })?;

    log::info!("Created aggregate device #{} ({})", id, descriptor.name);
    Ok(AggregateDeviceRef {
        id,
        uid: descriptor.uid,
    })
}
