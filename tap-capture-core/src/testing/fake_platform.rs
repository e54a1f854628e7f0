//! Scripted in-memory `AudioPlatform` for unit tests.
//!
//! Records every create/destroy so tests can check that no handle outlives
//! its session, fails on demand at a chosen stage, and lets tests push audio
//! chunks through the registered I/O callback as the real audio queue would.

use std::ffi::c_void;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::devices::{AggregateDescriptor, AudioObjectId, TapRequest};
use crate::models::error::OsStatus;
use crate::traits::audio_platform::{AudioPlatform, IoCallback, RawAudioBuffer};

/// Platform call that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    DefaultOutputDevice,
    DeviceUidSize,
    DeviceUid,
    ProcessTap,
    AggregateDevice,
    IoProc,
    DeviceStart,
    DeviceStop,
}

#[derive(Default)]
struct FakeLog {
    next_id: AudioObjectId,
    live_taps: Vec<AudioObjectId>,
    live_aggregates: Vec<AudioObjectId>,
    live_io_procs: Vec<(AudioObjectId, u32)>,
    running: Vec<AudioObjectId>,
    callbacks: Vec<(u32, IoCallback)>,
    tap_requests: Vec<TapRequest>,
    aggregate_descriptors: Vec<AggregateDescriptor>,
    uid_read_sizes: Vec<usize>,
    stop_calls: usize,
}

impl FakeLog {
    fn allocate_id(&mut self) -> AudioObjectId {
        self.next_id += 1;
        100 + self.next_id
    }
}

/// Handle onto a fake platform's log that stays usable after the platform
/// has been moved into a session.
#[derive(Clone)]
pub struct FakeProbe {
    log: Arc<Mutex<FakeLog>>,
}

impl FakeProbe {
    pub fn live_taps(&self) -> Vec<AudioObjectId> {
        self.log.lock().live_taps.clone()
    }

    pub fn live_aggregates(&self) -> Vec<AudioObjectId> {
        self.log.lock().live_aggregates.clone()
    }

    pub fn live_io_procs(&self) -> usize {
        self.log.lock().live_io_procs.len()
    }

    pub fn running_devices(&self) -> Vec<AudioObjectId> {
        self.log.lock().running.clone()
    }

    pub fn stop_calls(&self) -> usize {
        self.log.lock().stop_calls
    }

    /// No tap, aggregate, I/O proc or running device is left behind.
    pub fn is_leak_free(&self) -> bool {
        let log = self.log.lock();
        log.live_taps.is_empty()
            && log.live_aggregates.is_empty()
            && log.live_io_procs.is_empty()
            && log.running.is_empty()
    }

    pub fn tap_requests(&self) -> usize {
        self.log.lock().tap_requests.len()
    }

    pub fn last_tap_request(&self) -> Option<TapRequest> {
        self.log.lock().tap_requests.last().cloned()
    }

    pub fn last_aggregate_descriptor(&self) -> Option<AggregateDescriptor> {
        self.log.lock().aggregate_descriptors.last().cloned()
    }

    pub fn last_uid_read_size(&self) -> Option<usize> {
        self.log.lock().uid_read_sizes.last().copied()
    }

    /// Deliver one chunk holding a single buffer of `samples`.
    ///
    /// Returns false (and delivers nothing) unless a registered I/O proc's
    /// device is running, matching when the real queue fires.
    pub fn deliver(&self, samples: &[f32]) -> bool {
        self.deliver_buffers(&[samples])
    }

    /// Deliver one chunk holding several buffers.
    pub fn deliver_buffers(&self, buffers: &[&[f32]]) -> bool {
        let raw: Vec<RawAudioBuffer> = buffers
            .iter()
            .map(|samples| unsafe {
                RawAudioBuffer::new(
                    samples.as_ptr() as *const c_void,
                    std::mem::size_of_val(*samples) as u32,
                    1,
                )
            })
            .collect();
        self.deliver_raw(&raw)
    }

    pub fn deliver_raw(&self, buffers: &[RawAudioBuffer]) -> bool {
        let callback = {
            let log = self.log.lock();
            let running_proc = log
                .live_io_procs
                .iter()
                .find(|(device, _)| log.running.contains(device))
                .map(|(_, proc_id)| *proc_id);
            running_proc.and_then(|proc_id| {
                log.callbacks
                    .iter()
                    .find(|(id, _)| *id == proc_id)
                    .map(|(_, cb)| Arc::clone(cb))
            })
        };
        match callback {
            Some(callback) => {
                callback(buffers);
                true
            }
            None => false,
        }
    }
}

pub struct FakePlatform {
    log: Arc<Mutex<FakeLog>>,
    failure: Option<(Stage, OsStatus)>,
}

impl FakePlatform {
    pub const OUTPUT_DEVICE_ID: AudioObjectId = 73;
    pub const OUTPUT_DEVICE_UID: &'static str = "BuiltInSpeakerDevice";

    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(FakeLog::default())),
            failure: None,
        }
    }

    pub fn failing_at(stage: Stage, code: OsStatus) -> Self {
        Self {
            failure: Some((stage, code)),
            ..Self::new()
        }
    }

    pub fn probe(&self) -> FakeProbe {
        FakeProbe {
            log: Arc::clone(&self.log),
        }
    }

    fn check(&self, stage: Stage) -> Result<(), OsStatus> {
        match self.failure {
            Some((failing, code)) if failing == stage => Err(code),
            _ => Ok(()),
        }
    }
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioPlatform for FakePlatform {
    type IoProc = u32;

    fn default_output_device(&self) -> Result<AudioObjectId, OsStatus> {
        self.check(Stage::DefaultOutputDevice)?;
        Ok(Self::OUTPUT_DEVICE_ID)
    }

    fn device_uid_size(&self, device: AudioObjectId) -> Result<usize, OsStatus> {
        self.check(Stage::DeviceUidSize)?;
        assert_eq!(device, Self::OUTPUT_DEVICE_ID);
        Ok(Self::OUTPUT_DEVICE_UID.len())
    }

    fn device_uid(&self, device: AudioObjectId, size: usize) -> Result<String, OsStatus> {
        self.check(Stage::DeviceUid)?;
        assert_eq!(device, Self::OUTPUT_DEVICE_ID);
        self.log.lock().uid_read_sizes.push(size);
        Ok(Self::OUTPUT_DEVICE_UID[..size.min(Self::OUTPUT_DEVICE_UID.len())].to_string())
    }

    fn create_process_tap(&mut self, request: &TapRequest) -> Result<AudioObjectId, OsStatus> {
        let mut log = self.log.lock();
        log.tap_requests.push(request.clone());
        self.check(Stage::ProcessTap)?;
        let id = log.allocate_id();
        log.live_taps.push(id);
        Ok(id)
    }

    fn destroy_process_tap(&mut self, tap: AudioObjectId) -> Result<(), OsStatus> {
        let mut log = self.log.lock();
        assert!(log.live_taps.contains(&tap), "destroying unknown tap #{}", tap);
        log.live_taps.retain(|id| *id != tap);
        Ok(())
    }

    fn create_aggregate_device(
        &mut self,
        descriptor: &AggregateDescriptor,
    ) -> Result<AudioObjectId, OsStatus> {
        let mut log = self.log.lock();
        log.aggregate_descriptors.push(descriptor.clone());
        self.check(Stage::AggregateDevice)?;
        let id = log.allocate_id();
        log.live_aggregates.push(id);
        Ok(id)
    }

    fn destroy_aggregate_device(&mut self, device: AudioObjectId) -> Result<(), OsStatus> {
        let mut log = self.log.lock();
        assert!(
            !log.running.contains(&device),
            "destroying running aggregate #{}",
            device
        );
        assert!(
            !log.live_io_procs.iter().any(|(d, _)| *d == device),
            "destroying aggregate #{} with a live I/O proc",
            device
        );
        log.live_aggregates.retain(|id| *id != device);
        Ok(())
    }

    fn create_io_proc(
        &mut self,
        device: AudioObjectId,
        callback: IoCallback,
    ) -> Result<u32, OsStatus> {
        self.check(Stage::IoProc)?;
        let mut log = self.log.lock();
        assert!(log.live_aggregates.contains(&device));
        let proc_id = log.allocate_id();
        log.live_io_procs.push((device, proc_id));
        log.callbacks.push((proc_id, callback));
        Ok(proc_id)
    }

    fn destroy_io_proc(&mut self, device: AudioObjectId, io_proc: u32) -> Result<(), OsStatus> {
        let mut log = self.log.lock();
        log.live_io_procs.retain(|entry| *entry != (device, io_proc));
        log.callbacks.retain(|(id, _)| *id != io_proc);
        Ok(())
    }

    fn start_device(&mut self, device: AudioObjectId, _io_proc: &u32) -> Result<(), OsStatus> {
        self.check(Stage::DeviceStart)?;
        self.log.lock().running.push(device);
        Ok(())
    }

    fn stop_device(&mut self, device: AudioObjectId, _io_proc: &u32) -> Result<(), OsStatus> {
        let mut log = self.log.lock();
        log.stop_calls += 1;
        log.running.retain(|id| *id != device);
        drop(log);
        self.check(Stage::DeviceStop)
    }
}
