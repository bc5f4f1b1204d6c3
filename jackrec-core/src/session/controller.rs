use std::sync::Arc;
use std::thread;
use std::time::Instant;

use log::{debug, error, info, warn};
use parking_lot::Mutex;

use crate::capture::client::CaptureClient;
use crate::encoding::encoder::FileEncoder;
use crate::encoding::registry::output_format;
use crate::models::config::RecorderConfiguration;
use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingMetadata;
use crate::models::state::{ExitStatus, RecorderState};
use crate::storage::metadata::write_metadata;
use crate::traits::audio_server::AudioServer;

use super::shutdown::ShutdownCoordinator;

/// Drives one recording run on the control thread.
///
/// ```text
/// [AudioServer RT thread] → [CaptureHandler] → [ChannelBuffer × C]
///                                                      ↓
///                         [RecordingController] → [Session] → file
/// ```
///
/// Teardown always deactivates real-time callbacks before the session is
/// closed and before the ring buffers are freed.
pub struct RecordingController {
    config: RecorderConfiguration,
    shutdown: Arc<ShutdownCoordinator>,
    state: Mutex<RecorderState>,
}

impl RecordingController {
    pub fn new(config: RecorderConfiguration, shutdown: Arc<ShutdownCoordinator>) -> Self {
        Self {
            config,
            shutdown,
            state: Mutex::new(RecorderState::Starting),
        }
    }

    pub fn state(&self) -> RecorderState {
        *self.state.lock()
    }

    pub fn config(&self) -> &RecorderConfiguration {
        &self.config
    }

    /// Run a full recording: connect, record until stopped, tear down.
    ///
    /// `connect` opens the audio-server connection and is called once, inside
    /// the starting phase.
    pub fn run<S, F>(&self, connect: F) -> ExitStatus
    where
        S: AudioServer,
        F: FnOnce(&RecorderConfiguration) -> Result<S, CaptureError>,
    {
        self.set_state(RecorderState::Starting);
        let status = self.start(connect);
        self.set_state(RecorderState::Stopped);
        debug!("Stopped with exit status {}.", status.code());
        status
    }

    fn start<S, F>(&self, connect: F) -> ExitStatus
    where
        S: AudioServer,
        F: FnOnce(&RecorderConfiguration) -> Result<S, CaptureError>,
    {
        let server = match connect(&self.config) {
            Ok(server) => server,
            Err(e) => {
                error!("Failed to connect to the audio server: {}", e);
                self.begin_stopping();
                return ExitStatus::Aborted;
            }
        };

        let mut client = match CaptureClient::open(server, self.config.channels, self.config.buffer_duration_secs) {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to set up the capture client: {}", e);
                self.begin_stopping();
                return ExitStatus::Aborted;
            }
        };

        let status = self.start_client(&mut client);

        if let Err(e) = client.close() {
            warn!("Failed to close client: {}", e);
        }
        status
    }

    fn start_client<S: AudioServer>(&self, client: &mut CaptureClient<S>) -> ExitStatus {
        if let Err(e) = client.activate() {
            error!("Failed to activate client: {}", e);
            self.begin_stopping();
            return ExitStatus::Aborted;
        }

        let source_ports = if self.config.ports.is_empty() {
            match client.auto_connect() {
                Ok(ports) => ports,
                Err(e) => {
                    error!("Failed to get the list of output ports: {}", e);
                    self.begin_stopping();
                    return ExitStatus::Aborted;
                }
            }
        } else {
            client.connect_ports(&self.config.ports)
        };
        if source_ports.is_empty() {
            warn!("No ports are connected; the recording will be silent.");
        }

        let encoder = output_format(&self.config.format)
            .ok_or_else(|| CaptureError::UnknownFormat(self.config.format.clone()))
            .and_then(|format| {
                format.create_encoder(
                    client.sample_rate(),
                    client.channel_count(),
                    self.config.effective_bitrate(),
                )
            });
        let encoder = match encoder {
            Ok(encoder) => encoder,
            Err(e) => {
                error!("Failed to create encoder: {}", e);
                self.begin_stopping();
                return ExitStatus::EncoderFailed;
            }
        };

        let status = self.record(client, &encoder, source_ports);
        encoder.shutdown();
        status
    }

    fn record<S: AudioServer>(
        &self,
        client: &CaptureClient<S>,
        encoder: &FileEncoder,
        source_ports: Vec<String>,
    ) -> ExitStatus {
        let path = &self.config.output_path;
        let mut session = match encoder.open(client, path) {
            Ok(session) => session,
            Err(e) => {
                warn!("Failed to open output file \"{}\": {}", path.display(), e);
                self.begin_stopping();
                return ExitStatus::SessionFailed;
            }
        };

        info!(
            "Recording to \"{}\": {}, {} channels at {} Hz.",
            path.display(),
            encoder.format().description,
            encoder.channels(),
            encoder.sample_rate()
        );

        let backoff = self.config.backoff_interval();
        let deadline = self.config.max_duration().map(|d| Instant::now() + d);
        let mut status = ExitStatus::Normal;

        self.shutdown.begin_recording();
        self.set_state(RecorderState::Recording);

        while self.shutdown.running() {
            if !client.is_active() {
                if client.status().is_faulted() {
                    error!("Capture failed: a ring buffer accepted less than it reported room for.");
                    status = ExitStatus::RecordingFailed;
                } else {
                    warn!("Audio server is shutting down.");
                }
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                info!("Requested duration reached.");
                break;
            }

            if client.status().take_overflow() {
                warn!("Ring buffer overflow; some audio was not written.");
            }

            match session.write() {
                Ok(0) => thread::sleep(backoff),
                Ok(_) => {}
                Err(e) => {
                    error!("Failed to encode audio: {}", e);
                    status = ExitStatus::RecordingFailed;
                    break;
                }
            }
        }

        self.begin_stopping();

        if let Err(e) = client.deactivate() {
            warn!("Failed to deactivate client: {}", e);
        }

        if status.is_success() {
            loop {
                match session.write() {
                    Ok(0) => break,
                    Ok(_) => {}
                    Err(e) => {
                        error!("Failed to encode audio: {}", e);
                        status = ExitStatus::RecordingFailed;
                        break;
                    }
                }
            }
        }

        match session.close() {
            Ok(result) => {
                info!(
                    "Wrote {} frames ({:.2} seconds) to \"{}\".",
                    result.frames_written,
                    result.duration_secs,
                    result.file_path.display()
                );
                let overflows = client.status().overflow_count();
                if overflows > 0 {
                    warn!("{} blocks were dropped on overflow.", overflows);
                }
                if self.config.write_metadata {
                    let metadata =
                        RecordingMetadata::new(&result, &client.client_name(), overflows, source_ports);
                    match write_metadata(&metadata, &result.file_path) {
                        Ok(sidecar) => debug!("Metadata written to \"{}\".", sidecar.display()),
                        Err(e) => warn!("{}", e),
                    }
                }
            }
            Err(e) => warn!("Failed to close output file: {}", e),
        }

        status
    }

    fn begin_stopping(&self) {
        self.shutdown.end_recording();
        self.set_state(RecorderState::Stopping);
    }

    fn set_state(&self, state: RecorderState) {
        let mut current = self.state.lock();
        if *current != state {
            debug!("State: {:?} -> {:?}", *current, state);
            *current = state;
        }
    }
}
