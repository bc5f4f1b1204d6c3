use crate::capture::handler::CaptureHandler;
use crate::models::error::CaptureError;

/// Connection to a real-time audio server.
///
/// Implemented by:
/// - `JackServer` (jackrec-jack)
///
/// Lifecycle: `register_input` for every channel, `activate` once, then
/// `connect` as needed. `deactivate` stops real-time callbacks and must be
/// callable while other threads hold shared references, hence `&self`.
/// `close` unregisters ports and disconnects; it is only called after
/// `deactivate`.
pub trait AudioServer: Send {
    /// Name the server assigned to this client.
    fn client_name(&self) -> String;

    /// Server sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Frames delivered per real-time callback.
    fn buffer_size(&self) -> u32;

    /// Register an input port and return its full name.
    fn register_input(&mut self, port_name: &str) -> Result<String, CaptureError>;

    /// Start real-time callbacks.
    ///
    /// The server invokes `handler.process` once per audio block on its
    /// real-time thread, and `handler.status().mark_shutdown()` if it shuts
    /// down underneath this client.
    fn activate(&mut self, handler: CaptureHandler) -> Result<(), CaptureError>;

    /// Full names of every output port the server currently offers.
    fn output_ports(&self) -> Result<Vec<String>, CaptureError>;

    /// Connect a server output port to one of this client's input ports.
    fn connect(&self, output_port: &str, input_port: &str) -> Result<(), CaptureError>;

    /// Stop real-time callbacks. Idempotent.
    fn deactivate(&self) -> Result<(), CaptureError>;

    /// Unregister ports and close the connection. Idempotent.
    fn close(&mut self) -> Result<(), CaptureError>;
}
