//! Block-based I/O procs and device start/stop.
//!
//! The block runs on the backend's serial dispatch queue. It only walks the
//! incoming `AudioBufferList` and hands it to the shared callback as one
//! borrowed slice; nothing here allocates or copies.

use std::ffi::c_void;
use std::{mem, slice};

use block2::RcBlock;
use coreaudio::sys::{
    AudioBuffer, AudioBufferList, AudioDeviceDestroyIOProcID, AudioDeviceIOProcID, AudioDeviceStart,
    AudioDeviceStop, AudioObjectID, OSStatus,
};

use tap_capture_core::{IoCallback, RawAudioBuffer};

use crate::ffi::*;

type IoBlockFn = dyn Fn(*const c_void, *const c_void, *const c_void, *mut c_void, *const c_void);

// `forward` views the `mBuffers` array as `RawAudioBuffer`s in place.
const _: () = {
    assert!(mem::size_of::<RawAudioBuffer>() == mem::size_of::<AudioBuffer>());
    assert!(mem::align_of::<RawAudioBuffer>() == mem::align_of::<AudioBuffer>());
    assert!(mem::offset_of!(AudioBuffer, mNumberChannels) == 0);
    assert!(mem::offset_of!(AudioBuffer, mDataByteSize) == 4);
    assert!(mem::offset_of!(AudioBuffer, mData) == 8);
};

/// A registered I/O proc. The block must stay alive until the proc is
/// destroyed, so it is owned alongside the id.
pub struct CoreAudioIoProc {
    id: AudioDeviceIOProcID,
    _block: RcBlock<IoBlockFn>,
}

// SAFETY: the id is an opaque token and the block is only invoked by Core
// Audio on its dispatch queue. The proc itself is only touched by the
// session that owns it.
unsafe impl Send for CoreAudioIoProc {}

fn check(status: OSStatus) -> Result<(), OSStatus> {
    if status == 0 {
        Ok(())
    } else {
        Err(status)
    }
}

/// Hand every buffer of `list` to `callback` in a single invocation.
///
/// # Safety
/// `list` must be null or point to a valid `AudioBufferList` whose
/// `mNumberBuffers` entries stay valid for the duration of the call.
unsafe fn forward(list: *const AudioBufferList, callback: &IoCallback) {
    if list.is_null() {
        return;
    }
    let count = (*list).mNumberBuffers as usize;
    let first = (*list).mBuffers.as_ptr() as *const RawAudioBuffer;
    // SAFETY: `RawAudioBuffer` is `#[repr(C)]` with `AudioBuffer`'s layout
    // (checked above) and `new`'s contract is the callback-duration
    // validity Core Audio provides.
    let buffers = slice::from_raw_parts(first, count);
    callback(buffers);
}

pub fn create(
    device: AudioObjectID,
    queue: DispatchQueue,
    callback: IoCallback,
) -> Result<CoreAudioIoProc, OSStatus> {
    let block = RcBlock::new(
        move |_now: *const c_void,
              input_data: *const c_void,
              _input_time: *const c_void,
              _output_data: *mut c_void,
              _output_time: *const c_void| {
            // SAFETY: Core Audio passes a valid (or null) input buffer list
            // that lives for the duration of the block invocation.
            unsafe { forward(input_data as *const AudioBufferList, &callback) }
        },
    );

    let mut id: AudioDeviceIOProcID = None;
    // SAFETY: `block` is kept alive in the returned proc until destroy.
    check(unsafe { AudioDeviceCreateIOProcIDWithBlock(&mut id, device, queue, &block) })?;
    if id.is_none() {
        return Err(kAudioHardwareBadObjectError);
    }
    Ok(CoreAudioIoProc { id, _block: block })
}

pub fn destroy(device: AudioObjectID, io_proc: CoreAudioIoProc) -> Result<(), OSStatus> {
    // SAFETY: the proc was registered on `device`; the block is dropped only
    // after Core Audio has released it.
    check(unsafe { AudioDeviceDestroyIOProcID(device, io_proc.id) })
}

pub fn start(device: AudioObjectID, io_proc: &CoreAudioIoProc) -> Result<(), OSStatus> {
    // SAFETY: plain value call on a registered proc.
    check(unsafe { AudioDeviceStart(device, io_proc.id) })
}

pub fn stop(device: AudioObjectID, io_proc: &CoreAudioIoProc) -> Result<(), OSStatus> {
    // SAFETY: plain value call on a registered proc.
    check(unsafe { AudioDeviceStop(device, io_proc.id) })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    /// Storage for an `AudioBufferList` with `count` trailing buffers.
    fn buffer_list(samples: &[f32], count: usize) -> Vec<u64> {
        let bytes = mem::size_of::<AudioBufferList>() + (count - 1) * mem::size_of::<AudioBuffer>();
        let mut storage = vec![0u64; bytes.div_ceil(8)];
        let list = storage.as_mut_ptr() as *mut AudioBufferList;
        unsafe {
            (*list).mNumberBuffers = count as u32;
            let buffers = (*list).mBuffers.as_mut_ptr();
            for index in 0..count {
                *buffers.add(index) = AudioBuffer {
                    mNumberChannels: 1,
                    mDataByteSize: (samples.len() * 4) as u32,
                    mData: samples.as_ptr() as *mut c_void,
                };
            }
        }
        storage
    }

    #[test]
    fn whole_buffer_list_arrives_in_one_invocation() {
        let samples = [0.5f32, -0.5];
        let storage = buffer_list(&samples, 20);
        let calls: Arc<Mutex<Vec<Vec<f32>>>> = Arc::default();

        let seen = Arc::clone(&calls);
        let callback: IoCallback = Arc::new(move |buffers: &[RawAudioBuffer]| {
            let mut chunk = Vec::new();
            for buffer in buffers {
                chunk.extend_from_slice(buffer.samples().unwrap());
            }
            seen.lock().push(chunk);
        });
        unsafe { forward(storage.as_ptr() as *const AudioBufferList, &callback) };

        let calls = calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 40);
        assert_eq!(&calls[0][..2], &samples);
    }

    #[test]
    fn null_list_is_ignored() {
        let callback: IoCallback = Arc::new(|_: &[RawAudioBuffer]| panic!("no chunk expected"));
        unsafe { forward(std::ptr::null(), &callback) };
    }
}
