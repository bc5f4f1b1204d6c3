//! JACK audio server connection.
//!
//! Registers one `AudioIn` port per channel and forwards every process cycle
//! to the core's `CaptureHandler`.

use std::mem;
use std::sync::Arc;

use jack::{AudioIn, Client, ClientOptions, Control, Port, PortFlags, ProcessScope};
use log::{debug, info, warn};
use parking_lot::Mutex;

use jackrec_core::capture::handler::{BlockOutcome, CaptureHandler};
use jackrec_core::capture::status::ClientStatus;
use jackrec_core::models::error::CaptureError;
use jackrec_core::traits::audio_server::AudioServer;

/// Real-time half: owns the ports while the client is active.
pub struct CaptureProcess {
    ports: Vec<Port<AudioIn>>,
    handler: CaptureHandler,
}

impl jack::ProcessHandler for CaptureProcess {
    fn process(&mut self, _: &Client, ps: &ProcessScope) -> Control {
        let ports = &self.ports;
        match self.handler.process(ps.n_frames() as usize, |c| ports[c].as_slice(ps)) {
            BlockOutcome::Written | BlockOutcome::Dropped => Control::Continue,
            BlockOutcome::Fault => Control::Quit,
        }
    }
}

/// Raises the client's shutdown flag when the server goes away.
pub struct ShutdownNotifier {
    status: Arc<ClientStatus>,
}

impl jack::NotificationHandler for ShutdownNotifier {
    unsafe fn shutdown(&mut self, _status: jack::ClientStatus, _reason: &str) {
        // Signal-handler context: no logging, no allocation.
        self.status.mark_shutdown();
    }
}

enum JackState {
    Open {
        client: Client,
        ports: Vec<Port<AudioIn>>,
    },
    Active(jack::AsyncClient<ShutdownNotifier, CaptureProcess>),
    Closed,
}

/// A JACK client implementing `AudioServer`.
pub struct JackServer {
    name: String,
    sample_rate: u32,
    buffer_size: u32,
    state: Mutex<JackState>,
}

// SAFETY: The JACK client handle is only driven from the control thread
// through the mutex; the real-time thread only touches `CaptureProcess`,
// which it owns while the client is active.
unsafe impl Send for JackServer {}

impl JackServer {
    /// Open a JACK client named `client_name`.
    ///
    /// With `start_server` false the JACK server is never started on demand.
    pub fn connect(client_name: &str, start_server: bool) -> Result<Self, CaptureError> {
        let options = if start_server {
            ClientOptions::empty()
        } else {
            ClientOptions::NO_START_SERVER
        };

        let (client, status) = Client::new(client_name, options).map_err(open_error)?;

        if status.contains(jack::ClientStatus::SERVER_STARTED) {
            info!("JACK server started.");
        }
        if status.contains(jack::ClientStatus::NAME_NOT_UNIQUE) {
            warn!("Client name \"{}\" was taken; registered as \"{}\".", client_name, client.name());
        }

        let sample_rate = client.sample_rate() as u32;
        let buffer_size = client.buffer_size();
        debug!("JACK sample rate: {} Hz; buffer size: {} frames.", sample_rate, buffer_size);

        Ok(Self {
            name: client.name().to_string(),
            sample_rate,
            buffer_size,
            state: Mutex::new(JackState::Open {
                client,
                ports: Vec::new(),
            }),
        })
    }
}

impl AudioServer for JackServer {
    fn client_name(&self) -> String {
        self.name.clone()
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    fn register_input(&mut self, port_name: &str) -> Result<String, CaptureError> {
        let mut state = self.state.lock();
        let JackState::Open { client, ports } = &mut *state else {
            return Err(CaptureError::PortRegistration {
                port: port_name.into(),
                reason: "client is not open for registration".into(),
            });
        };

        let port = client
            .register_port(port_name, AudioIn::default())
            .map_err(|e| CaptureError::PortRegistration {
                port: port_name.into(),
                reason: e.to_string(),
            })?;
        let full_name = port.name().unwrap_or_else(|_| format!("{}:{}", self.name, port_name));
        debug!("Registered port \"{}\".", full_name);
        ports.push(port);
        Ok(full_name)
    }

    fn activate(&mut self, handler: CaptureHandler) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        let JackState::Open { client, ports } = mem::replace(&mut *state, JackState::Closed) else {
            return Err(CaptureError::ActivationFailed("client is not open".into()));
        };

        let notifier = ShutdownNotifier {
            status: handler.status(),
        };
        let process = CaptureProcess { ports, handler };

        // On failure the client and ports are dropped, which closes the connection.
        let active = client
            .activate_async(notifier, process)
            .map_err(|e| CaptureError::ActivationFailed(e.to_string()))?;
        *state = JackState::Active(active);
        Ok(())
    }

    fn output_ports(&self) -> Result<Vec<String>, CaptureError> {
        let state = self.state.lock();
        let client = match &*state {
            JackState::Open { client, .. } => client,
            JackState::Active(active) => active.as_client(),
            JackState::Closed => return Err(CaptureError::Unknown("client is closed".into())),
        };
        Ok(client.ports(None, None, PortFlags::IS_OUTPUT))
    }

    fn connect(&self, output_port: &str, input_port: &str) -> Result<(), CaptureError> {
        let state = self.state.lock();
        let client = match &*state {
            JackState::Open { client, .. } => client,
            JackState::Active(active) => active.as_client(),
            JackState::Closed => return Err(CaptureError::Unknown("client is closed".into())),
        };
        client
            .connect_ports_by_name(output_port, input_port)
            .map_err(|e| CaptureError::PortConnection {
                source_port: output_port.into(),
                input_port: input_port.into(),
                reason: e.to_string(),
            })
    }

    fn deactivate(&self) -> Result<(), CaptureError> {
        let mut state = self.state.lock();
        match mem::replace(&mut *state, JackState::Closed) {
            JackState::Active(active) => {
                let (client, _notifier, process) = active
                    .deactivate()
                    .map_err(|e| CaptureError::Unknown(format!("failed to deactivate: {}", e)))?;
                debug!("Client deactivated.");
                *state = JackState::Open {
                    client,
                    ports: process.ports,
                };
                Ok(())
            }
            other => {
                *state = other;
                Ok(())
            }
        }
    }

    fn close(&mut self) -> Result<(), CaptureError> {
        self.deactivate()?;

        let mut state = self.state.lock();
        if let JackState::Open { client, ports } = mem::replace(&mut *state, JackState::Closed) {
            for port in ports {
                if let Err(e) = client.unregister_port(port) {
                    warn!("Failed to unregister port: {}", e);
                }
            }
            debug!("Closing client \"{}\".", self.name);
        }
        Ok(())
    }
}

/// Translate a failed `Client::new` into the capture error vocabulary.
fn open_error(err: jack::Error) -> CaptureError {
    match err {
        jack::Error::ClientError(status) => status_error(status),
        other => CaptureError::Unknown(other.to_string()),
    }
}

fn status_error(status: jack::ClientStatus) -> CaptureError {
    use jack::ClientStatus as S;

    if status.contains(S::INVALID_OPTION) {
        CaptureError::InvalidOption
    } else if status.contains(S::NAME_NOT_UNIQUE) {
        CaptureError::NameNotUnique
    } else if status.contains(S::SERVER_FAILED) {
        CaptureError::ServerUnavailable
    } else if status.contains(S::SERVER_ERROR) {
        CaptureError::ServerCommError
    } else if status.contains(S::INIT_FAILURE) {
        CaptureError::InitFailure
    } else if status.contains(S::SHM_FAILURE) {
        CaptureError::SharedMemoryFailure
    } else if status.contains(S::VERSION_ERROR) {
        CaptureError::VersionMismatch
    } else {
        CaptureError::Unknown(format!("{:?}", status))
    }
}
