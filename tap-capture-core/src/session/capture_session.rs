use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

use crate::models::config::{CaptureConfiguration, EXPORT_CHANNELS};
use crate::models::devices::{AggregateDeviceRef, OutputDeviceRef, TapHandle};
use crate::models::diagnostics::{CaptureDiagnostics, CaptureSummary};
use crate::models::error::CaptureError;
use crate::models::export::{ExportMetadata, ExportResult};
use crate::models::state::CaptureState;
use crate::processing::sample_buffer::SampleBuffer;
use crate::processing::sample_sink::SampleSink;
use crate::setup::{aggregate_builder, discovery, tap_factory};
use crate::storage::{exporter, metadata};
use crate::traits::audio_platform::AudioPlatform;
use crate::traits::capture_delegate::CaptureDelegate;

/// Platform objects that exist while a capture is running.
struct LiveGraph<I> {
    output: OutputDeviceRef,
    tap: TapHandle,
    aggregate: AggregateDeviceRef,
    io_proc: I,
}

/// Device identities of the last finished capture, for export metadata.
struct LastCapture {
    output_device_uid: String,
    tap_uid: String,
}

/// System audio capture session over a platform backend.
///
/// Owns every platform handle it creates. Data flow:
/// ```text
/// [default output] ─┐
///                   ├→ [private aggregate] → I/O proc → [SampleSink] → [SampleBuffer]
/// [process tap] ────┘                                                       │
///                                                    export_to(path) ←──────┘
/// ```
///
/// All methods are meant to be called from one controlling thread. The
/// sample buffer is only touched from that thread while no capture runs.
pub struct TapCaptureSession<P: AudioPlatform> {
    platform: P,
    config: CaptureConfiguration,
    state: CaptureState,
    delegate: Option<Arc<dyn CaptureDelegate>>,
    buffer: Arc<Mutex<SampleBuffer>>,
    sink: SampleSink,
    graph: Option<LiveGraph<P::IoProc>>,
    capture_start: Option<Instant>,
    last_capture: Option<LastCapture>,
}

impl<P: AudioPlatform> TapCaptureSession<P> {
    pub fn new(platform: P, config: CaptureConfiguration) -> Result<Self, CaptureError> {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let buffer = Arc::new(Mutex::new(SampleBuffer::new()));
        let sink = SampleSink::new(Arc::clone(&buffer));
        Ok(Self {
            platform,
            config,
            state: CaptureState::Idle,
            delegate: None,
            buffer,
            sink,
            graph: None,
            capture_start: None,
            last_capture: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn CaptureDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn config(&self) -> &CaptureConfiguration {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn diagnostics(&self) -> CaptureDiagnostics {
        self.sink.diagnostics()
    }

    /// Number of samples captured so far.
    ///
    /// While running this comes from the sink's counters so the buffer lock
    /// is never taken against the audio queue.
    pub fn sample_count(&self) -> usize {
        if self.state.buffer_readable() {
            self.buffer.lock().len()
        } else {
            self.sink.diagnostics().samples_appended as usize
        }
    }

    /// Run `f` over the captured samples. Fails while a capture is running.
    pub fn with_samples<R>(&self, f: impl FnOnce(&[f32]) -> R) -> Result<R, CaptureError> {
        if !self.state.buffer_readable() {
            return Err(self.reject("read samples"));
        }
        let buffer = self.buffer.lock();
        Ok(f(buffer.as_slice()))
    }

    /// Build the device graph and start capturing.
    ///
    /// Transitions: idle/stopped → configuring → running. On any failure all
    /// platform objects created so far are released and the session returns
    /// to idle.
    pub fn start_capture(&mut self) -> Result<(), CaptureError> {
        if !self.state.can_start() {
            return Err(self.reject("start capture"));
        }

        self.set_state(CaptureState::Configuring);
        self.sink.reset_counters();
        self.buffer.lock().reset(self.config.reserve_samples());
        self.last_capture = None;

        match self.bring_up() {
            Ok(graph) => {
                log::info!(
                    "Capturing system audio via aggregate #{} (output {}, tap {})",
                    graph.aggregate.id,
                    graph.output.uid,
                    graph.tap.uid
                );
                self.graph = Some(graph);
                self.capture_start = Some(Instant::now());
                self.set_state(CaptureState::Running);
                Ok(())
            }
            Err(e) => {
                self.sink.disarm();
                self.set_state(CaptureState::Idle);
                Err(self.report(e))
            }
        }
    }

    /// Stop capturing and release the device graph.
    ///
    /// Transitions: running → stopped. Blocks until the platform confirms the
    /// device stopped. Teardown failures are logged; the session still ends
    /// up stopped.
    pub fn stop_capture(&mut self) -> Result<CaptureSummary, CaptureError> {
        if !self.state.is_running() {
            return Err(self.reject("stop capture"));
        }
        let Some(graph) = self.graph.take() else {
            return Err(self.reject("stop capture"));
        };

        self.sink.disarm_locked();
        if let Err(code) = self.platform.stop_device(graph.aggregate.id, &graph.io_proc) {
            log::warn!("Failed to stop aggregate device #{}: status {}", graph.aggregate.id, code);
        }
        release_graph(
            &mut self.platform,
            Some(graph.io_proc),
            Some(&graph.aggregate),
            Some(&graph.tap),
        );

        let diagnostics = self.sink.diagnostics();
        if diagnostics.has_faults() {
            log::warn!(
                "Capture dropped {} malformed buffers and {} late callbacks",
                diagnostics.faulted_buffers,
                diagnostics.late_callbacks
            );
        }

        let summary = CaptureSummary {
            sample_count: self.buffer.lock().len(),
            duration_secs: self
                .capture_start
                .take()
                .map(|t| t.elapsed().as_secs_f64())
                .unwrap_or(0.0),
            output_device_uid: graph.output.uid.clone(),
            tap_uid: graph.tap.uid.clone(),
            diagnostics,
        };
        self.last_capture = Some(LastCapture {
            output_device_uid: graph.output.uid,
            tap_uid: graph.tap.uid,
        });

        log::info!(
            "Capture stopped: {} samples in {} callbacks",
            summary.sample_count,
            diagnostics.callback_count
        );
        self.set_state(CaptureState::Stopped);
        if let Some(ref delegate) = self.delegate {
            delegate.on_capture_finished(&summary);
        }
        Ok(summary)
    }

    /// Write the captured samples to `destination` as a mono 44.1 kHz WAV.
    ///
    /// Only valid while idle or stopped.
    pub fn export_to(&self, destination: &Path) -> ExportResult {
        if !self.state.buffer_readable() {
            return Err(self.reject("export"));
        }

        let buffer = self.buffer.lock();
        let report = exporter::export(buffer.as_slice(), destination).map_err(|e| self.report(e))?;
        drop(buffer);

        if self.config.write_metadata_sidecar {
            let meta = ExportMetadata::new(
                &report,
                EXPORT_CHANNELS,
                self.last_capture.as_ref().map(|c| c.output_device_uid.clone()),
                self.last_capture.as_ref().map(|c| c.tap_uid.clone()),
            );
            metadata::write_metadata(&meta, destination).map_err(|e| self.report(e))?;
        }
        Ok(report)
    }

    // --- Internal helpers ---

    /// Discovery → tap → aggregate → I/O proc → start, stopping at the
    /// first failure after releasing what the earlier steps created.
    fn bring_up(&mut self) -> Result<LiveGraph<P::IoProc>, CaptureError> {
        let platform = &mut self.platform;

        let output = discovery::resolve_default_output_device(platform)?;
        let tap = tap_factory::create_tap(platform, &self.config.excluded_processes)?;

        let name_prefix = &self.config.aggregate_name_prefix;
        let aggregate = aggregate_builder::build_aggregate(platform, name_prefix, &output, &tap)
            .inspect_err(|_| release_graph(platform, None, None, Some(&tap)))?;

        let io_proc = platform
            .create_io_proc(aggregate.id, self.sink.clone().into_callback())
            .map_err(|code| {
                log::error!("I/O proc registration on #{} failed: status {}", aggregate.id, code);
                CaptureError::CallbackRegistrationFailed { code }
            })
            .inspect_err(|_| release_graph(platform, None, Some(&aggregate), Some(&tap)))?;

        self.sink.arm();
        if let Err(code) = platform.start_device(aggregate.id, &io_proc) {
            log::error!("Aggregate device #{} failed to start: status {}", aggregate.id, code);
            release_graph(platform, Some(io_proc), Some(&aggregate), Some(&tap));
            return Err(CaptureError::DeviceStartFailed { code });
        }

        Ok(LiveGraph {
            output,
            tap,
            aggregate,
            io_proc,
        })
    }

    fn set_state(&mut self, new_state: CaptureState) {
        self.state = new_state;
        if let Some(ref delegate) = self.delegate {
            delegate.on_state_changed(new_state);
        }
    }

    fn reject(&self, operation: &'static str) -> CaptureError {
        self.report(CaptureError::InvalidState {
            operation,
            state: self.state,
        })
    }

    fn report(&self, error: CaptureError) -> CaptureError {
        log::error!("{}", error);
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(&error);
        }
        error
    }
}

impl<P: AudioPlatform> Drop for TapCaptureSession<P> {
    fn drop(&mut self) {
        if self.state.is_running() {
            let _ = self.stop_capture();
        }
    }
}

/// Release device-graph objects in reverse creation order.
///
/// Failures are logged and skipped so one stuck object never keeps the
/// others alive.
fn release_graph<P: AudioPlatform>(
    platform: &mut P,
    io_proc: Option<P::IoProc>,
    aggregate: Option<&AggregateDeviceRef>,
    tap: Option<&TapHandle>,
) {
    if let Some(aggregate) = aggregate {
        if let Some(io_proc) = io_proc {
            if let Err(code) = platform.destroy_io_proc(aggregate.id, io_proc) {
                log::warn!("Failed to destroy I/O proc on #{}: status {}", aggregate.id, code);
            }
        }
        if let Err(code) = platform.destroy_aggregate_device(aggregate.id) {
            log::warn!("Failed to destroy aggregate device #{}: status {}", aggregate.id, code);
        }
    }
    if let Some(tap) = tap {
        if let Err(code) = platform.destroy_process_tap(tap.id) {
            log::warn!("Failed to destroy process tap #{}: status {}", tap.id, code);
        }
    }
}
