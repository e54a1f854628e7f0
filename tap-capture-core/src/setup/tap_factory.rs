use crate::models::devices::{ProcessRef, TapHandle, TapRequest};
use crate::models::error::CaptureError;
use crate::traits::audio_platform::AudioPlatform;

/// Create a global mono tap of every process's output except `excluded`.
///
/// The tap UID is generated here so the aggregate descriptor can reference
/// it before the platform hands back a numeric id.
pub fn create_tap<P: AudioPlatform>(
    platform: &mut P,
    excluded: &[ProcessRef],
) -> Result<TapHandle, CaptureError> {
    let uid = uuid::Uuid::new_v4().to_string();
    let request = TapRequest {
        name: format!("Tap-{}", &uid[..8]),
        uid,
        excluded_processes: excluded.to_vec(),
        mono: true,
    };

    let id = platform.create_process_tap(&request).map_err(|code| {
        log::error!("Process tap creation failed: status {}", code);
        CaptureError::TapCreationFailed { code }
    })?;

    log::info!("Created process tap #{} ({})", id, request.uid);
    Ok(TapHandle { id, uid: request.uid })
}
