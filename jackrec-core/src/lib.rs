//! # jackrec-core
//!
//! Capture-to-disk pipeline for a real-time audio server.
//!
//! Provides per-channel ring buffers, the real-time capture handler, file
//! encoders and the recording controller. Audio-server backends (JACK)
//! implement the `AudioServer` trait and plug into `CaptureClient`.
//!
//! ## Architecture
//!
//! ```text
//! jackrec-core (this crate)
//! ├── traits/       ← AudioServer
//! ├── models/       ← CaptureError, RecorderState, ExitStatus, RecorderConfiguration, RecordingResult
//! ├── capture/      ← CaptureClient, CaptureHandler (real-time side), ClientStatus
//! ├── processing/   ← ChannelBuffer, interleaving, sample conversion, AIFF/AU headers
//! ├── encoding/     ← format registry, FileEncoder, Session
//! ├── session/      ← RecordingController, ShutdownCoordinator
//! └── storage/      ← AIFF/AU and FLAC writers, checksum, metadata sidecar
//! ```

pub mod capture;
pub mod encoding;
pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use capture::client::{input_port_name, CaptureChannels, CaptureClient};
pub use capture::handler::{BlockOutcome, CaptureHandler};
pub use capture::status::ClientStatus;
pub use encoding::encoder::{FileEncoder, Session, DRAIN_BLOCK_FRAMES};
pub use encoding::registry::{output_format, Container, OutputFormat, OUTPUT_FORMATS};
pub use models::config::RecorderConfiguration;
pub use models::error::CaptureError;
pub use models::recording_result::{RecordingMetadata, RecordingResult};
pub use models::state::{ExitStatus, RecorderState};
pub use processing::channel_buffer::{ChannelReader, ChannelWriter, Sample, SAMPLE_SIZE};
pub use processing::sample_format::SampleEncoding;
pub use session::controller::RecordingController;
pub use session::shutdown::{ShutdownCoordinator, StopRequest};
pub use traits::audio_server::AudioServer;
