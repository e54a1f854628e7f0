//! Audio object property reads: default output device, device UID, and
//! pid → process object translation.

use std::ffi::c_void;
use std::mem;
use std::ptr;

use core_foundation::base::TCFType;
use core_foundation::string::{CFString, CFStringRef};
use coreaudio::sys::{
    AudioObjectGetPropertyData, AudioObjectGetPropertyDataSize, AudioObjectID,
    AudioObjectPropertyAddress, OSStatus,
};

use tap_capture_core::ProcessRef;

use crate::ffi::*;

fn global_address(selector: u32) -> AudioObjectPropertyAddress {
    AudioObjectPropertyAddress {
        mSelector: selector,
        mScope: kAudioObjectPropertyScopeGlobal,
        mElement: kAudioObjectPropertyElementMain,
    }
}

fn check(status: OSStatus) -> Result<(), OSStatus> {
    if status == 0 {
        Ok(())
    } else {
        Err(status)
    }
}

/// The device currently selected for system sounds and alerts output.
pub fn default_system_output_device() -> Result<AudioObjectID, OSStatus> {
    let address = global_address(kAudioHardwarePropertyDefaultSystemOutputDevice);
    let mut device: AudioObjectID = kAudioObjectUnknown;
    let mut size = mem::size_of::<AudioObjectID>() as u32;

    // SAFETY: `device` is a valid out-buffer of `size` bytes.
    check(unsafe {
        AudioObjectGetPropertyData(
            kAudioObjectSystemObject,
            &address,
            0,
            ptr::null(),
            &mut size,
            &mut device as *mut AudioObjectID as *mut c_void,
        )
    })?;

    if device == kAudioObjectUnknown {
        return Err(kAudioHardwareBadObjectError);
    }
    Ok(device)
}

/// Byte size of the device's UID property.
pub fn device_uid_size(device: AudioObjectID) -> Result<usize, OSStatus> {
    let address = global_address(kAudioDevicePropertyDeviceUID);
    let mut size: u32 = 0;

    // SAFETY: only writes the size out-parameter.
    check(unsafe { AudioObjectGetPropertyDataSize(device, &address, 0, ptr::null(), &mut size) })?;
    Ok(size as usize)
}

/// Read the device UID into a buffer of the previously queried `size`.
///
/// The property holds a retained `CFStringRef`, so `size` must be exactly
/// one pointer wide.
pub fn device_uid(device: AudioObjectID, size: usize) -> Result<String, OSStatus> {
    if size != mem::size_of::<CFStringRef>() {
        return Err(kAudioHardwareBadPropertySizeError);
    }

    let address = global_address(kAudioDevicePropertyDeviceUID);
    let mut uid: CFStringRef = ptr::null();
    let mut io_size = size as u32;

    // SAFETY: `uid` is a pointer-sized out-buffer and `io_size` matches it.
    check(unsafe {
        AudioObjectGetPropertyData(
            device,
            &address,
            0,
            ptr::null(),
            &mut io_size,
            &mut uid as *mut CFStringRef as *mut c_void,
        )
    })?;

    if uid.is_null() {
        return Err(kAudioHardwareBadObjectError);
    }
    // SAFETY: Core Audio returns the UID with +1 retain count.
    let uid = unsafe { CFString::wrap_under_create_rule(uid) };
    Ok(uid.to_string())
}

/// Translate a pid into the Core Audio process object a tap can exclude.
pub fn process_object_for_pid(pid: ProcessRef) -> Result<AudioObjectID, OSStatus> {
    let address = global_address(kAudioHardwarePropertyTranslatePIDToProcessObject);
    let qualifier: i32 = pid as i32;
    let mut process: AudioObjectID = kAudioObjectUnknown;
    let mut size = mem::size_of::<AudioObjectID>() as u32;

    // SAFETY: qualifier and out-buffer both match their declared sizes.
    check(unsafe {
        AudioObjectGetPropertyData(
            kAudioObjectSystemObject,
            &address,
            mem::size_of::<i32>() as u32,
            &qualifier as *const i32 as *const c_void,
            &mut size,
            &mut process as *mut AudioObjectID as *mut c_void,
        )
    })?;

    if process == kAudioObjectUnknown {
        return Err(kAudioHardwareBadObjectError);
    }
    Ok(process)
}
