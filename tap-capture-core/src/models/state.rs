use std::fmt;

/// Capture session state machine.
///
/// State transitions:
/// ```text
/// idle → configuring → running → stopped
///  ↑          │                     │
///  └── (setup failure)              └── start_capture() → configuring
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Configuring,
    Running,
    Stopped,
}

impl CaptureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Whether a new capture may be started from this state.
    ///
    /// `Stopped` is idle-equivalent: it only differs from `Idle` in that the
    /// sample buffer still holds the previous capture.
    pub fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Stopped)
    }

    /// Whether the sample buffer may be read from the caller's thread.
    pub fn buffer_readable(&self) -> bool {
        matches!(self, Self::Idle | Self::Stopped)
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Configuring => "configuring",
            Self::Running => "running",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}
