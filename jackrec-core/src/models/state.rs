/// Recording controller state machine.
///
/// State transitions:
/// ```text
/// starting → recording → stopping → stopped
///     ↓                      ↑
///     └──────────────────────┘   (setup failure skips recording)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Starting,
    Recording,
    Stopping,
    Stopped,
}

impl RecorderState {
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }
}

/// Process exit status reported by a recording run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Recording stopped normally.
    Normal,
    /// The encoder could not be constructed.
    EncoderFailed,
    /// The output file could not be opened.
    SessionFailed,
    /// Encoding or capture failed while recording.
    RecordingFailed,
    /// Forced exit on a repeated stop signal, or a fatal error before recording.
    Aborted,
    /// Invalid command-line usage.
    Usage,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::EncoderFailed => 1,
            Self::SessionFailed => 2,
            Self::RecordingFailed => 3,
            Self::Aborted => 9,
            Self::Usage => 10,
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, Self::Normal)
    }
}
