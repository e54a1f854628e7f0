//! `AudioPlatform` implementation over the Core Audio HAL.

use std::ffi::CStr;
use std::ptr;

use tap_capture_core::{
    AggregateDescriptor, AudioObjectId, AudioPlatform, IoCallback, OsStatus, TapRequest,
};

use crate::ffi::*;
use crate::io_proc::CoreAudioIoProc;
use crate::{aggregate_device, device_properties, io_proc, process_tap};

const IO_QUEUE_LABEL: &CStr = c"tap-capture.io";

/// Core Audio backend for `TapCaptureSession`.
///
/// Owns the serial dispatch queue every I/O proc it registers runs on.
pub struct CoreAudioPlatform {
    io_queue: DispatchQueue,
}

// SAFETY: dispatch queues are thread-safe reference-counted objects.
unsafe impl Send for CoreAudioPlatform {}

impl CoreAudioPlatform {
    pub fn new() -> Self {
        // SAFETY: a null attribute means a serial queue; the label is a
        // static C string that dispatch copies.
        let io_queue = unsafe {
            let qos = QOS_CLASS_USER_INITIATED;
            let attr = dispatch_queue_attr_make_with_qos_class(ptr::null_mut(), qos, 0);
            dispatch_queue_create(IO_QUEUE_LABEL.as_ptr(), attr)
        };
        Self { io_queue }
    }

    /// Whether this OS supports process taps (macOS 14.2+).
    pub fn is_process_tap_available() -> bool {
        process_tap::is_available()
    }
}

impl Default for CoreAudioPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CoreAudioPlatform {
    fn drop(&mut self) {
        if !self.io_queue.is_null() {
            // SAFETY: balances `dispatch_queue_create`; registered procs are
            // destroyed by the session before the platform goes away.
            unsafe { dispatch_release(self.io_queue) };
        }
    }
}

impl AudioPlatform for CoreAudioPlatform {
    type IoProc = CoreAudioIoProc;

    fn default_output_device(&self) -> Result<AudioObjectId, OsStatus> {
        device_properties::default_system_output_device()
    }

    fn device_uid_size(&self, device: AudioObjectId) -> Result<usize, OsStatus> {
        device_properties::device_uid_size(device)
    }

    fn device_uid(&self, device: AudioObjectId, size: usize) -> Result<String, OsStatus> {
        device_properties::device_uid(device, size)
    }

    fn create_process_tap(&mut self, request: &TapRequest) -> Result<AudioObjectId, OsStatus> {
        process_tap::create(request)
    }

    fn destroy_process_tap(&mut self, tap: AudioObjectId) -> Result<(), OsStatus> {
        process_tap::destroy(tap)
    }

    fn create_aggregate_device(
        &mut self,
        descriptor: &AggregateDescriptor,
    ) -> Result<AudioObjectId, OsStatus> {
        aggregate_device::create(descriptor)
    }

    fn destroy_aggregate_device(&mut self, device: AudioObjectId) -> Result<(), OsStatus> {
        aggregate_device::destroy(device)
    }

    fn create_io_proc(
        &mut self,
        device: AudioObjectId,
        callback: IoCallback,
    ) -> Result<CoreAudioIoProc, OsStatus> {
        if self.io_queue.is_null() {
            log::error!("No I/O dispatch queue; cannot register callback");
            return Err(kAudioHardwareUnsupportedOperationError);
        }
        io_proc::create(device, self.io_queue, callback)
    }

    fn destroy_io_proc(
        &mut self,
        device: AudioObjectId,
        io_proc: CoreAudioIoProc,
    ) -> Result<(), OsStatus> {
        io_proc::destroy(device, io_proc)
    }

    fn start_device(
        &mut self,
        device: AudioObjectId,
        io_proc: &CoreAudioIoProc,
    ) -> Result<(), OsStatus> {
        io_proc::start(device, io_proc)
    }

    fn stop_device(
        &mut self,
        device: AudioObjectId,
        io_proc: &CoreAudioIoProc,
    ) -> Result<(), OsStatus> {
        io_proc::stop(device, io_proc)
    }
}
