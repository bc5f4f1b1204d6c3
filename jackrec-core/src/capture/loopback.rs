//! In-memory audio server for tests.
//!
//! `LoopbackServer` implements `AudioServer`; its `LoopbackFeed` stands in for
//! the server's real-time thread and pushes blocks through the activated
//! `CaptureHandler`.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::traits::audio_server::AudioServer;

use super::handler::{BlockOutcome, CaptureHandler};
use super::status::ClientStatus;

#[derive(Default)]
struct Shared {
    handler: Mutex<Option<CaptureHandler>>,
    status: Mutex<Option<Arc<ClientStatus>>>,
    connections: Mutex<Vec<(String, String)>>,
    events: Mutex<Vec<&'static str>>,
}

pub(crate) struct LoopbackServer {
    sample_rate: u32,
    buffer_size: u32,
    outputs: Vec<String>,
    inputs: Vec<String>,
    fail_registration_at: Option<usize>,
    fail_activation: bool,
    fail_port_listing: bool,
    refused: HashSet<String>,
    closed: bool,
    shared: Arc<Shared>,
}

impl LoopbackServer {
    /// A server running at `sample_rate` offering `outputs` capture ports.
    pub(crate) fn new(sample_rate: u32, outputs: usize) -> (Self, LoopbackFeed) {
        let shared = Arc::new(Shared::default());
        let server = Self {
            sample_rate,
            buffer_size: 64,
            outputs: (1..=outputs).map(|i| format!("system:capture_{}", i)).collect(),
            inputs: Vec::new(),
            fail_registration_at: None,
            fail_activation: false,
            fail_port_listing: false,
            refused: HashSet::new(),
            closed: false,
            shared: Arc::clone(&shared),
        };
        (server, LoopbackFeed { shared })
    }

    pub(crate) fn fail_registration_at(mut self, index: usize) -> Self {
        self.fail_registration_at = Some(index);
        self
    }

    pub(crate) fn fail_activation(mut self) -> Self {
        self.fail_activation = true;
        self
    }

    pub(crate) fn fail_port_listing(mut self) -> Self {
        self.fail_port_listing = true;
        self
    }

    pub(crate) fn refuse_connection(mut self, output_port: &str) -> Self {
        self.refused.insert(output_port.to_string());
        self
    }
}

impl AudioServer for LoopbackServer {
    fn client_name(&self) -> String {
        "loopback".into()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    fn register_input(&mut self, port_name: &str) -> Result<String, CaptureError> {
        if self.fail_registration_at == Some(self.inputs.len()) {
            return Err(CaptureError::PortRegistration {
                port: port_name.into(),
                reason: "refused".into(),
            });
        }
        let full = format!("loopback:{}", port_name);
        self.inputs.push(full.clone());
        Ok(full)
    }

    fn activate(&mut self, handler: CaptureHandler) -> Result<(), CaptureError> {
        if self.fail_activation {
            return Err(CaptureError::ActivationFailed("refused".into()));
        }
        *self.shared.status.lock() = Some(handler.status());
        *self.shared.handler.lock() = Some(handler);
        self.shared.events.lock().push("activate");
        Ok(())
    }

    fn output_ports(&self) -> Result<Vec<String>, CaptureError> {
        if self.fail_port_listing {
            return Err(CaptureError::Unknown("port list unavailable".into()));
        }
        Ok(self.outputs.clone())
    }

    fn connect(&self, output_port: &str, input_port: &str) -> Result<(), CaptureError> {
        if self.refused.contains(output_port) || !self.outputs.iter().any(|p| p == output_port) {
            return Err(CaptureError::PortConnection {
                source_port: output_port.into(),
                input_port: input_port.into(),
                reason: "refused".into(),
            });
        }
        self.shared
            .connections
            .lock()
            .push((output_port.to_string(), input_port.to_string()));
        Ok(())
    }

    fn deactivate(&self) -> Result<(), CaptureError> {
        if self.shared.handler.lock().take().is_some() {
            self.shared.events.lock().push("deactivate");
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        if !self.closed {
            self.closed = true;
            self.inputs.clear();
            self.shared.events.lock().push("close");
        }
        Ok(())
    }
}

/// Test-side handle that plays the role of the server's real-time thread.
#[derive(Clone)]
pub(crate) struct LoopbackFeed {
    shared: Arc<Shared>,
}

impl LoopbackFeed {
    /// Deliver one block with `channels[c]` as channel `c`'s input.
    ///
    /// Returns `None` when the client is not active.
    pub(crate) fn push(&self, channels: &[Vec<f32>]) -> Option<BlockOutcome> {
        let frames = channels.first().map_or(0, |c| c.len());
        let mut handler = self.shared.handler.lock();
        handler
            .as_mut()
            .map(|h| h.process(frames, |c| channels[c].as_slice()))
    }

    /// Deliver `frames` frames of a constant `value` on `channel_count` channels.
    pub(crate) fn push_constant(&self, channel_count: usize, frames: usize, value: f32) -> Option<BlockOutcome> {
        self.push(&vec![vec![value; frames]; channel_count])
    }

    /// Simulate the server shutting down underneath the client.
    pub(crate) fn shut_down_server(&self) {
        if let Some(status) = self.shared.status.lock().as_ref() {
            status.mark_shutdown();
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.shared.handler.lock().is_some()
    }

    pub(crate) fn events(&self) -> Vec<&'static str> {
        self.shared.events.lock().clone()
    }

    pub(crate) fn connections(&self) -> Vec<(String, String)> {
        self.shared.connections.lock().clone()
    }
}
