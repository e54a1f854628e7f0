//! Core Audio declarations not covered by `coreaudio-sys`.
//!
//! Process taps and block-based I/O procs (macOS 14.2+) are newer than the
//! SDK headers the bindings were generated from, so they are declared here.
//! Property selectors are spelled out as four-char codes for the same reason.

#![allow(non_upper_case_globals, non_snake_case)]

use std::ffi::c_void;
use std::os::raw::c_char;

use block2::Block;
use coreaudio::sys::{AudioDeviceIOProcID, AudioObjectID, OSStatus};

const fn fourcc(code: &[u8; 4]) -> u32 {
    ((code[0] as u32) << 24) | ((code[1] as u32) << 16) | ((code[2] as u32) << 8) | code[3] as u32
}

pub const kAudioObjectSystemObject: AudioObjectID = 1;
pub const kAudioObjectUnknown: AudioObjectID = 0;
pub const kAudioObjectPropertyScopeGlobal: u32 = fourcc(b"glob");
pub const kAudioObjectPropertyElementMain: u32 = 0;

pub const kAudioHardwarePropertyDefaultSystemOutputDevice: u32 = fourcc(b"sOut");
pub const kAudioHardwarePropertyTranslatePIDToProcessObject: u32 = fourcc(b"id2p");
pub const kAudioDevicePropertyDeviceUID: u32 = fourcc(b"uid ");

pub const kAudioHardwareBadObjectError: OSStatus = fourcc(b"!obj") as OSStatus;
pub const kAudioHardwareBadPropertySizeError: OSStatus = fourcc(b"!siz") as OSStatus;
pub const kAudioHardwareUnsupportedOperationError: OSStatus = fourcc(b"unop") as OSStatus;

// Aggregate device description keys (AudioHardware.h).
pub const kAudioAggregateDeviceNameKey: &str = "name";
pub const kAudioAggregateDeviceUIDKey: &str = "uid";
pub const kAudioAggregateDeviceMainSubDeviceKey: &str = "master";
pub const kAudioAggregateDeviceIsPrivateKey: &str = "private";
pub const kAudioAggregateDeviceIsStackedKey: &str = "stacked";
pub const kAudioAggregateDeviceTapAutoStartKey: &str = "tapautostart";
pub const kAudioAggregateDeviceSubDeviceListKey: &str = "subdevices";
pub const kAudioAggregateDeviceTapListKey: &str = "taps";
pub const kAudioSubDeviceUIDKey: &str = "uid";
pub const kAudioSubTapUIDKey: &str = "uid";
pub const kAudioSubTapDriftCompensationKey: &str = "drift";

/// `QOS_CLASS_USER_INITIATED`
pub const QOS_CLASS_USER_INITIATED: u32 = 0x19;

/// `AudioDeviceIOBlock`: (now, input data, input time, output data, output time).
///
/// Pointer arguments are erased to `c_void` so the block signature only uses
/// types with an Objective-C encoding.
pub type AudioDeviceIOBlock =
    Block<dyn Fn(*const c_void, *const c_void, *const c_void, *mut c_void, *const c_void)>;

pub type DispatchQueue = *mut c_void;
pub type DispatchQueueAttr = *mut c_void;

#[link(name = "CoreAudio", kind = "framework")]
extern "C" {
    /// `description` is a `CATapDescription *`.
    pub fn AudioHardwareCreateProcessTap(
        description: *mut c_void,
        out_tap_id: *mut AudioObjectID,
    ) -> OSStatus;

    pub fn AudioHardwareDestroyProcessTap(tap_id: AudioObjectID) -> OSStatus;

    pub fn AudioDeviceCreateIOProcIDWithBlock(
        out_io_proc_id: *mut AudioDeviceIOProcID,
        device: AudioObjectID,
        dispatch_queue: DispatchQueue,
        io_block: &AudioDeviceIOBlock,
    ) -> OSStatus;
}

// libdispatch lives in libSystem, which is always linked.
extern "C" {
    pub fn dispatch_queue_attr_make_with_qos_class(
        attr: DispatchQueueAttr,
        qos_class: u32,
        relative_priority: i32,
    ) -> DispatchQueueAttr;

    pub fn dispatch_queue_create(label: *const c_char, attr: DispatchQueueAttr) -> DispatchQueue;

    pub fn dispatch_release(object: *mut c_void);
}
