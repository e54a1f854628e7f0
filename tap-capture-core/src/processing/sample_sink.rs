use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::diagnostics::CaptureDiagnostics;
use crate::processing::sample_buffer::SampleBuffer;
use crate::traits::audio_platform::{IoCallback, RawAudioBuffer};

/// Lock-free counters updated from the audio queue.
#[derive(Debug, Default)]
struct SinkCounters {
    callbacks: AtomicU64,
    samples: AtomicU64,
    faulted_buffers: AtomicU64,
    late_callbacks: AtomicU64,
}

/// Real-time target of the aggregate device's I/O proc.
///
/// Copies every input buffer of a chunk into the shared [`SampleBuffer`].
/// Runs on the platform's audio queue: no I/O, no logging, no blocking other
/// than the buffer lock, which the caller side never takes while armed.
///
/// Cloning yields another handle onto the same buffer, counters and arm flag.
#[derive(Clone)]
pub struct SampleSink {
    buffer: Arc<Mutex<SampleBuffer>>,
    counters: Arc<SinkCounters>,
    armed: Arc<AtomicBool>,
}

impl SampleSink {
    pub fn new(buffer: Arc<Mutex<SampleBuffer>>) -> Self {
        Self {
            buffer,
            counters: Arc::new(SinkCounters::default()),
            armed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start accepting chunks.
    pub fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }

    /// Stop accepting chunks. Anything delivered afterwards is counted as
    /// late and dropped.
    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    /// Disarm while holding the buffer lock.
    ///
    /// Waits out a chunk that is mid-append; once this returns the buffer
    /// cannot change until the sink is armed again, even if the platform
    /// still flushes queued invocations.
    pub fn disarm_locked(&self) {
        let _buffer = self.buffer.lock();
        self.armed.store(false, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    /// Zero all counters. Only call while disarmed.
    pub fn reset_counters(&self) {
        self.counters.callbacks.store(0, Ordering::Relaxed);
        self.counters.samples.store(0, Ordering::Relaxed);
        self.counters.faulted_buffers.store(0, Ordering::Relaxed);
        self.counters.late_callbacks.store(0, Ordering::Relaxed);
    }

    /// Consume one chunk of audio.
    ///
    /// The arm flag is checked again under the buffer lock: `disarm_locked`
    /// flips it while holding the same lock, so no chunk can land after it.
    pub fn consume(&self, buffers: &[RawAudioBuffer]) {
        if !self.is_armed() {
            self.counters.late_callbacks.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let mut buffer = self.buffer.lock();
        if !self.is_armed() {
            self.counters.late_callbacks.fetch_add(1, Ordering::Relaxed);
            return;
        }
        self.counters.callbacks.fetch_add(1, Ordering::Relaxed);

        let mut appended = 0u64;
        let mut faults = 0u64;
        for raw in buffers {
            match raw.samples() {
                Ok(samples) => {
                    buffer.append(samples);
                    appended += samples.len() as u64;
                }
                Err(_) => faults += 1,
            }
        }

        self.counters.samples.fetch_add(appended, Ordering::Relaxed);
        if faults > 0 {
            self.counters.faulted_buffers.fetch_add(faults, Ordering::Relaxed);
        }
    }

    /// Wrap the sink as the callback handed to the platform.
    pub fn into_callback(self) -> IoCallback {
        Arc::new(move |buffers: &[RawAudioBuffer]| self.consume(buffers))
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        CaptureDiagnostics {
            callback_count: self.counters.callbacks.load(Ordering::Relaxed),
            samples_appended: self.counters.samples.load(Ordering::Relaxed),
            faulted_buffers: self.counters.faulted_buffers.load(Ordering::Relaxed),
            late_callbacks: self.counters.late_callbacks.load(Ordering::Relaxed),
        }
    }
}
