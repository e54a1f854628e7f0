/// Append-only store of captured mono `f32` samples.
///
/// Filled by the I/O callback and read by the caller after capture stops.
/// Wrap in `Arc<parking_lot::Mutex<SampleBuffer>>` to share the two sides.
///
/// Unlike a ring buffer nothing is ever dropped: the buffer grows for as
/// long as capture runs.
#[derive(Debug, Default, Clone)]
pub struct SampleBuffer {
    samples: Vec<f32>,
}

impl SampleBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
        }
    }

    /// Append samples in order.
    pub fn append(&mut self, samples: &[f32]) {
        self.samples.extend_from_slice(samples);
    }

    /// Empty the buffer and make sure at least `capacity` samples fit
    /// without reallocating.
    pub fn reset(&mut self, capacity: usize) {
        self.samples.clear();
        self.samples.reserve(capacity);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}
