//! Aggregate device creation from an `AggregateDescriptor`.

use core_foundation::array::CFArray;
use core_foundation::base::{CFType, TCFType};
use core_foundation::boolean::CFBoolean;
use core_foundation::dictionary::CFDictionary;
use core_foundation::string::CFString;
use coreaudio::sys::{
    AudioHardwareCreateAggregateDevice, AudioHardwareDestroyAggregateDevice, AudioObjectID,
    OSStatus,
};

use tap_capture_core::{AggregateDescriptor, SubDeviceEntry, SubTapEntry};

use crate::ffi::*;

type CFPropertyDictionary = CFDictionary<CFString, CFType>;

fn string(value: &str) -> CFType {
    CFString::new(value).as_CFType()
}

fn boolean(value: bool) -> CFType {
    CFBoolean::from(value).as_CFType()
}

fn dictionary(pairs: &[(&str, CFType)]) -> CFPropertyDictionary {
    let pairs: Vec<(CFString, CFType)> = pairs
        .iter()
        .map(|(key, value)| (CFString::new(key), value.clone()))
        .collect();
    CFDictionary::from_CFType_pairs(&pairs)
}

fn sub_device(entry: &SubDeviceEntry) -> CFPropertyDictionary {
    dictionary(&[(kAudioSubDeviceUIDKey, string(&entry.uid))])
}

fn sub_tap(entry: &SubTapEntry) -> CFPropertyDictionary {
    dictionary(&[
        (kAudioSubTapUIDKey, string(&entry.uid)),
        (kAudioSubTapDriftCompensationKey, boolean(entry.drift_compensation)),
    ])
}

/// Translate the descriptor into the `CFDictionary` layout
/// `AudioHardwareCreateAggregateDevice` expects.
pub fn description(descriptor: &AggregateDescriptor) -> CFPropertyDictionary {
    let sub_devices: Vec<CFPropertyDictionary> =
        descriptor.sub_devices.iter().map(sub_device).collect();
    let taps: Vec<CFPropertyDictionary> = descriptor.taps.iter().map(sub_tap).collect();

    dictionary(&[
        (kAudioAggregateDeviceNameKey, string(&descriptor.name)),
        (kAudioAggregateDeviceUIDKey, string(&descriptor.uid)),
        (kAudioAggregateDeviceMainSubDeviceKey, string(&descriptor.main_sub_device_uid)),
        (kAudioAggregateDeviceIsPrivateKey, boolean(descriptor.is_private)),
        (kAudioAggregateDeviceIsStackedKey, boolean(descriptor.is_stacked)),
        (kAudioAggregateDeviceTapAutoStartKey, boolean(descriptor.tap_auto_start)),
        (kAudioAggregateDeviceSubDeviceListKey, CFArray::from_CFTypes(&sub_devices).as_CFType()),
        (kAudioAggregateDeviceTapListKey, CFArray::from_CFTypes(&taps).as_CFType()),
    ])
}

pub fn create(descriptor: &AggregateDescriptor) -> Result<AudioObjectID, OSStatus> {
    let description = description(descriptor);
    let mut device: AudioObjectID = kAudioObjectUnknown;

    // SAFETY: `description` outlives the call; Core Audio copies what it keeps.
    let description_ref = description.as_concrete_TypeRef() as _;
    let status = unsafe { AudioHardwareCreateAggregateDevice(description_ref, &mut device) };
    if status != 0 {
        return Err(status);
    }
    if device == kAudioObjectUnknown {
        return Err(kAudioHardwareBadObjectError);
    }
    Ok(device)
}

pub fn destroy(device: AudioObjectID) -> Result<(), OSStatus> {
    // SAFETY: plain value call; Core Audio validates the id.
    match unsafe { AudioHardwareDestroyAggregateDevice(device) } {
        0 => Ok(()),
        status => Err(status),
    }
}
