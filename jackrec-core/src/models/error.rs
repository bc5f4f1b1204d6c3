use thiserror::Error;

/// Errors that can occur while capturing and persisting audio.
///
/// The first group mirrors the reasons an audio server can refuse a client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("invalid option")]
    InvalidOption,

    #[error("client name is not unique")]
    NameNotUnique,

    #[error("unable to connect to the audio server")]
    ServerUnavailable,

    #[error("communication error with the audio server")]
    ServerCommError,

    #[error("client initialization failed")]
    InitFailure,

    #[error("unable to access shared memory")]
    SharedMemoryFailure,

    #[error("protocol version mismatch")]
    VersionMismatch,

    #[error("operation failed: {0}")]
    Unknown(String),

    #[error("failed to activate client: {0}")]
    ActivationFailed(String),

    #[error("failed to register input port \"{port}\": {reason}")]
    PortRegistration { port: String, reason: String },

    #[error("failed to connect \"{source_port}\" to \"{input_port}\": {reason}")]
    PortConnection {
        source_port: String,
        input_port: String,
        reason: String,
    },

    #[error("configuration failed: {0}")]
    Configuration(String),

    #[error("unknown output format \"{0}\"")]
    UnknownFormat(String),

    #[error("encoding failed: {0}")]
    EncodingFailed(String),

    #[error("storage error: {0}")]
    StorageError(String),
}
