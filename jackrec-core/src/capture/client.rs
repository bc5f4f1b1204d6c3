use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::{Mutex, MutexGuard};

use crate::encoding::encoder::DRAIN_BLOCK_FRAMES;
use crate::models::error::CaptureError;
use crate::processing::channel_buffer::{self, ChannelReader, SAMPLE_SIZE};
use crate::traits::audio_server::AudioServer;

use super::handler::CaptureHandler;
use super::status::ClientStatus;

/// Name of the input port for channel `index` out of `total`.
///
/// One channel is "mono", two are "left"/"right", anything else is
/// "channel_N" counting from 1.
pub fn input_port_name(total: usize, index: usize) -> String {
    match (total, index) {
        (1, _) => "mono".into(),
        (2, 0) => "left".into(),
        (2, _) => "right".into(),
        _ => format!("channel_{}", index + 1),
    }
}

/// Consumer side of a capture client: one reader per channel plus the shared flags.
///
/// Only the control thread locks `readers`; the real-time thread holds the
/// writer halves and never touches this lock.
pub struct CaptureChannels {
    readers: Mutex<Vec<ChannelReader>>,
    status: Arc<ClientStatus>,
    sample_rate: u32,
    buffer_duration_secs: f64,
}

impl CaptureChannels {
    pub fn count(&self) -> usize {
        self.readers.lock().len()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn buffer_duration_secs(&self) -> f64 {
        self.buffer_duration_secs
    }

    pub fn status(&self) -> &ClientStatus {
        &self.status
    }

    pub fn readers(&self) -> MutexGuard<'_, Vec<ChannelReader>> {
        self.readers.lock()
    }
}

/// A registered audio-server client with one input port and one ring buffer
/// per channel.
///
/// Teardown order is fixed: deactivate callbacks, unregister ports and close
/// the connection, then free the ring buffers.
pub struct CaptureClient<S: AudioServer> {
    server: S,
    channels: CaptureChannels,
    input_ports: Vec<String>,
    handler: Option<CaptureHandler>,
    closed: bool,
}

impl<S: AudioServer> CaptureClient<S> {
    /// Register `channel_count` input ports on `server` and allocate their ring buffers.
    ///
    /// Fails as a whole if any port or buffer cannot be set up.
    pub fn open(mut server: S, channel_count: usize, buffer_duration_secs: f64) -> Result<Self, CaptureError> {
        if channel_count == 0 {
            return Err(CaptureError::Configuration("channel count must be at least 1".into()));
        }

        info!("Client registered as \"{}\".", server.client_name());

        let sample_rate = server.sample_rate();
        let samples = channel_buffer::capacity_samples(sample_rate, buffer_duration_secs);
        let required = DRAIN_BLOCK_FRAMES + server.buffer_size() as usize;
        if samples < required {
            if let Err(close_err) = server.close() {
                warn!("Failed to close client after setup error: {}", close_err);
            }
            return Err(CaptureError::Configuration(format!(
                "ring buffer of {} seconds holds {} frames at {} Hz; at least {} are needed",
                buffer_duration_secs, samples, sample_rate, required
            )));
        }
        let capacity = samples * SAMPLE_SIZE;
        debug!(
            "Ring buffer size: {:.2} seconds; {} bytes.",
            buffer_duration_secs, capacity
        );

        let mut input_ports = Vec::with_capacity(channel_count);
        let mut writers = Vec::with_capacity(channel_count);
        let mut readers = Vec::with_capacity(channel_count);

        for index in 0..channel_count {
            let setup = server
                .register_input(&input_port_name(channel_count, index))
                .and_then(|port| Ok((port, channel_buffer::channel_buffer(sample_rate, buffer_duration_secs)?)));

            match setup {
                Ok((port, (writer, reader))) => {
                    input_ports.push(port);
                    writers.push(writer);
                    readers.push(reader);
                }
                Err(e) => {
                    if let Err(close_err) = server.close() {
                        warn!("Failed to close client after setup error: {}", close_err);
                    }
                    return Err(e);
                }
            }
        }

        let status = Arc::new(ClientStatus::new());
        Ok(Self {
            server,
            channels: CaptureChannels {
                readers: Mutex::new(readers),
                status: Arc::clone(&status),
                sample_rate,
                buffer_duration_secs,
            },
            input_ports,
            handler: Some(CaptureHandler::new(writers, status)),
            closed: false,
        })
    }

    /// Begin real-time callbacks.
    pub fn activate(&mut self) -> Result<(), CaptureError> {
        let handler = self
            .handler
            .take()
            .ok_or_else(|| CaptureError::ActivationFailed("client already activated".into()))?;
        self.server.activate(handler)
    }

    /// Connect `output_port` to the input port of `channel`.
    pub fn connect_port(&self, channel: usize, output_port: &str) -> Result<(), CaptureError> {
        let input_port = self.input_ports.get(channel).ok_or_else(|| {
            CaptureError::Configuration(format!("no input port for channel {}", channel + 1))
        })?;
        info!("Connecting port \"{}\" to \"{}\".", output_port, input_port);
        self.server.connect(output_port, input_port)
    }

    /// Connect the given output ports in channel order.
    ///
    /// A port that fails to connect is logged and skipped. Returns the ports
    /// that were connected.
    pub fn connect_ports(&self, output_ports: &[String]) -> Vec<String> {
        let mut connected = Vec::with_capacity(output_ports.len());
        for (channel, output_port) in output_ports.iter().enumerate().take(self.input_ports.len()) {
            match self.connect_port(channel, output_port) {
                Ok(()) => connected.push(output_port.clone()),
                Err(e) => warn!("{}", e),
            }
        }
        connected
    }

    /// Connect the first `channel_count` output ports the server offers.
    ///
    /// Fails only when the server's port list cannot be read.
    pub fn auto_connect(&self) -> Result<Vec<String>, CaptureError> {
        let outputs = self.server.output_ports()?;
        if outputs.len() < self.input_ports.len() {
            warn!(
                "Only {} output ports available for {} channels.",
                outputs.len(),
                self.input_ports.len()
            );
        }
        let wanted: Vec<String> = outputs.into_iter().take(self.input_ports.len()).collect();
        Ok(self.connect_ports(&wanted))
    }

    pub fn channels(&self) -> &CaptureChannels {
        &self.channels
    }

    pub fn channel_count(&self) -> usize {
        self.input_ports.len()
    }

    pub fn input_ports(&self) -> &[String] {
        &self.input_ports
    }

    pub fn client_name(&self) -> String {
        self.server.client_name()
    }

    pub fn sample_rate(&self) -> u32 {
        self.channels.sample_rate
    }

    pub fn status(&self) -> &ClientStatus {
        &self.channels.status
    }

    /// False once the server has shut down or the capture path faulted.
    pub fn is_active(&self) -> bool {
        self.channels.status.is_active()
    }

    /// Stop real-time callbacks without releasing ports or buffers.
    pub fn deactivate(&self) -> Result<(), CaptureError> {
        self.server.deactivate()
    }

    /// Deactivate, unregister ports, close the connection and free the buffers.
    pub fn close(mut self) -> Result<(), CaptureError> {
        self.teardown()
    }

    fn teardown(&mut self) -> Result<(), CaptureError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        if let Err(e) = self.server.deactivate() {
            warn!("Failed to deactivate client: {}", e);
        }
        self.server.close()?;
        debug!("Client closed.");
        Ok(())
    }
}

impl<S: AudioServer> Drop for CaptureClient<S> {
    fn drop(&mut self) {
        if let Err(e) = self.teardown() {
            warn!("Failed to close client: {}", e);
        }
    }
}
