use std::ffi::c_void;
use std::sync::Arc;

use crate::models::devices::{AggregateDescriptor, AudioObjectId, TapRequest};
use crate::models::error::OsStatus;

/// One buffer of an I/O callback's input buffer list.
///
/// Wraps the platform's raw `{ byte length, data pointer }` pair. Reading the
/// samples goes through [`RawAudioBuffer::samples`], which validates the
/// descriptor instead of trusting it.
///
/// The layout is `{ channels: u32, byte_len: u32, data: *const c_void }` in C
/// order, the same as Core Audio's `AudioBuffer`, so a backend may view an
/// incoming buffer array as `&[RawAudioBuffer]` directly.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct RawAudioBuffer {
    channels: u32,
    byte_len: u32,
    data: *const c_void,
}

/// Why a raw buffer could not be read as `f32` samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferFault {
    NullData,
    PartialSample,
    Misaligned,
}

impl RawAudioBuffer {
    /// # Safety
    ///
    /// If `data` is non-null it must point to `byte_len` readable bytes that
    /// stay valid and unmodified for as long as this value is used. Platforms
    /// uphold this for the duration of the I/O callback only.
    pub unsafe fn new(data: *const c_void, byte_len: u32, channels: u32) -> Self {
        Self {
            channels,
            byte_len,
            data,
        }
    }

    pub fn byte_len(&self) -> u32 {
        self.byte_len
    }

    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Interpret the buffer as native-endian 32-bit float samples.
    pub fn samples(&self) -> Result<&[f32], BufferFault> {
        let sample_size = std::mem::size_of::<f32>();
        if self.byte_len == 0 {
            return Ok(&[]);
        }
        if self.data.is_null() {
            return Err(BufferFault::NullData);
        }
        if self.byte_len as usize % sample_size != 0 {
            return Err(BufferFault::PartialSample);
        }
        if self.data as usize % std::mem::align_of::<f32>() != 0 {
            return Err(BufferFault::Misaligned);
        }
        let count = self.byte_len as usize / sample_size;
        // SAFETY: non-null, aligned, and `new`'s contract guarantees `byte_len`
        // readable bytes; `count * 4 == byte_len`.
        Ok(unsafe { std::slice::from_raw_parts(self.data as *const f32, count) })
    }
}

impl Default for RawAudioBuffer {
    /// An empty buffer with no data.
    fn default() -> Self {
        Self {
            channels: 0,
            byte_len: 0,
            data: std::ptr::null(),
        }
    }
}

// SAFETY: the pointer is only dereferenced through `samples()`, under the
// validity contract of `new`, which does not depend on the thread.
unsafe impl Send for RawAudioBuffer {}
unsafe impl Sync for RawAudioBuffer {}

/// Callback bound to an aggregate device's I/O proc.
///
/// Invoked once per audio chunk on the platform's dedicated real-time queue,
/// with every input buffer of that chunk. Invocations are serialized.
pub type IoCallback = Arc<dyn Fn(&[RawAudioBuffer]) + Send + Sync + 'static>;

/// Capability provider for the platform audio subsystem.
///
/// Every call maps one-to-one onto a platform primitive and reports failure
/// as the raw platform status. Implemented by:
/// - `CoreAudioPlatform` (macOS, `tap-capture-macos`)
pub trait AudioPlatform: Send {
    /// Handle of a registered I/O proc.
    type IoProc: Send;

    /// The device currently selected as the system output.
    fn default_output_device(&self) -> Result<AudioObjectId, OsStatus>;

    /// Size in bytes of the device's UID property.
    fn device_uid_size(&self, device: AudioObjectId) -> Result<usize, OsStatus>;

    /// Read the device's UID property into a buffer of `size` bytes.
    fn device_uid(&self, device: AudioObjectId, size: usize) -> Result<String, OsStatus>;

    fn create_process_tap(&mut self, request: &TapRequest) -> Result<AudioObjectId, OsStatus>;

    fn destroy_process_tap(&mut self, tap: AudioObjectId) -> Result<(), OsStatus>;

    fn create_aggregate_device(
        &mut self,
        descriptor: &AggregateDescriptor,
    ) -> Result<AudioObjectId, OsStatus>;

    fn destroy_aggregate_device(&mut self, device: AudioObjectId) -> Result<(), OsStatus>;

    /// Bind `callback` to `device` on the platform's real-time queue.
    fn create_io_proc(
        &mut self,
        device: AudioObjectId,
        callback: IoCallback,
    ) -> Result<Self::IoProc, OsStatus>;

    fn destroy_io_proc(
        &mut self,
        device: AudioObjectId,
        io_proc: Self::IoProc,
    ) -> Result<(), OsStatus>;

    fn start_device(
        &mut self,
        device: AudioObjectId,
        io_proc: &Self::IoProc,
    ) -> Result<(), OsStatus>;

    /// Stop the device. Blocks until the platform reports it stopped.
    fn stop_device(
        &mut self,
        device: AudioObjectId,
        io_proc: &Self::IoProc,
    ) -> Result<(), OsStatus>;
}
