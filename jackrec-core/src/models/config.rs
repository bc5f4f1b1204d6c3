use std::path::PathBuf;
use std::time::Duration;

/// Default bitrate per channel in kbit/s, used when none is requested.
pub const DEFAULT_BITRATE_PER_CHANNEL: u32 = 128;

/// Configuration for a recording run.
#[derive(Debug, Clone, PartialEq)]
pub struct RecorderConfiguration {
    /// Name to register with the audio server (default: "jackrec").
    pub client_name: String,

    /// Output format identifier, looked up in the format registry (default: "aiff").
    pub format: String,

    /// Target bitrate in kbit/s. `None` means 128 kbit/s per channel.
    pub bitrate: Option<u32>,

    /// Number of input channels to capture (default: 2).
    pub channels: usize,

    /// Recording duration in seconds; 0 records until stopped.
    pub duration_secs: u64,

    /// Length of audio each channel's ring buffer can hold (default: 2.0).
    pub buffer_duration_secs: f64,

    /// Output ports to connect, in channel order. Empty means auto-connect.
    pub ports: Vec<String>,

    /// Whether the audio server may be started on demand (default: true).
    pub start_server: bool,

    /// Destination file.
    pub output_path: PathBuf,

    /// Write a JSON metadata sidecar next to the recording.
    pub write_metadata: bool,
}

impl RecorderConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.channels == 0 {
            return Err("channel count must be at least 1".into());
        }
        if u16::try_from(self.channels).is_err() {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if !self.buffer_duration_secs.is_finite() || self.buffer_duration_secs <= 0.0 {
            return Err(format!(
                "buffer duration must be positive: {}",
                self.buffer_duration_secs
            ));
        }
        if self.ports.len() > self.channels {
            return Err(format!(
                "{} ports given for {} channels",
                self.ports.len(),
                self.channels
            ));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err("an output file is required".into());
        }
        if self.client_name.is_empty() {
            return Err("client name must not be empty".into());
        }
        Ok(())
    }

    /// Bitrate handed to the encoder factory.
    pub fn effective_bitrate(&self) -> u32 {
        self.bitrate
            .unwrap_or(DEFAULT_BITRATE_PER_CHANNEL * self.channels as u32)
    }

    /// Requested recording length, if bounded.
    pub fn max_duration(&self) -> Option<Duration> {
        (self.duration_secs > 0).then(|| Duration::from_secs(self.duration_secs))
    }

    /// Sleep between drain attempts when not enough audio is buffered.
    pub fn backoff_interval(&self) -> Duration {
        Duration::from_secs_f64(self.buffer_duration_secs / 4.0)
    }
}

impl Default for RecorderConfiguration {
    fn default() -> Self {
        Self {
            client_name: "jackrec".into(),
            format: "aiff".into(),
            bitrate: None,
            channels: 2,
            duration_secs: 0,
            buffer_duration_secs: 2.0,
            ports: Vec::new(),
            start_server: true,
            output_path: PathBuf::new(),
            write_metadata: false,
        }
    }
}
