//! `CATapDescription` construction and process tap lifetime.

use std::ffi::c_void;

use coreaudio::sys::{AudioObjectID, OSStatus};
use objc2::rc::{Allocated, Retained};
use objc2::runtime::{AnyClass, AnyObject};
use objc2::{msg_send, msg_send_id, ClassType};
use objc2_foundation::{NSArray, NSNumber, NSString, NSUUID};

use tap_capture_core::TapRequest;

use crate::device_properties;
use crate::ffi::*;

/// Whether this OS has process taps (macOS 14.2+).
pub fn is_available() -> bool {
    AnyClass::get("CATapDescription").is_some()
}

/// Create a global tap of every process except `request.excluded_processes`.
///
/// Pids that have no Core Audio process object (never produced audio) are
/// skipped: there is nothing of theirs to exclude.
pub fn create(request: &TapRequest) -> Result<AudioObjectID, OSStatus> {
    let Some(class) = AnyClass::get("CATapDescription") else {
        return Err(kAudioHardwareUnsupportedOperationError);
    };

    let excluded: Vec<Retained<NSNumber>> = request
        .excluded_processes
        .iter()
        .filter_map(|&pid| match device_properties::process_object_for_pid(pid) {
            Ok(object) => Some(NSNumber::new_u32(object)),
            Err(status) => {
                log::warn!("Not excluding pid {} from tap: status {}", pid, status);
                None
            }
        })
        .collect();
    let excluded = NSArray::from_vec(excluded);

    let uuid_string = NSString::from_str(&request.uid);
    // SAFETY: `initWithUUIDString:` returns nil for malformed strings.
    let uuid: Option<Retained<NSUUID>> =
        unsafe { msg_send_id![NSUUID::alloc(), initWithUUIDString: &*uuid_string] };
    let Some(uuid) = uuid else {
        log::error!("Tap UID {} is not a UUID", request.uid);
        return Err(kAudioHardwareBadObjectError);
    };

    // SAFETY: selectors and argument types follow CATapDescription.h.
    let description: Retained<AnyObject> = unsafe {
        let allocated: Allocated<AnyObject> = msg_send_id![class, alloc];
        if request.mono {
            msg_send_id![allocated, initMonoGlobalTapButExcludeProcesses: &*excluded]
        } else {
            msg_send_id![allocated, initStereoGlobalTapButExcludeProcesses: &*excluded]
        }
    };
    unsafe {
        let _: () = msg_send![&*description, setUUID: &*uuid];
        let _: () = msg_send![&*description, setName: &*NSString::from_str(&request.name)];
    }

    let mut tap_id: AudioObjectID = kAudioObjectUnknown;
    // SAFETY: `description` is a live CATapDescription for the whole call.
    let description_ptr = Retained::as_ptr(&description) as *mut c_void;
    let status = unsafe { AudioHardwareCreateProcessTap(description_ptr, &mut tap_id) };
    if status != 0 {
        return Err(status);
    }
    Ok(tap_id)
}

pub fn destroy(tap: AudioObjectID) -> Result<(), OSStatus> {
    // SAFETY: plain value call; Core Audio validates the id.
    match unsafe { AudioHardwareDestroyProcessTap(tap) } {
        0 => Ok(()),
        status => Err(status),
    }
}
