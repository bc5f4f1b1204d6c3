//! # jackrec-jack
//!
//! JACK backend for jackrec.
//!
//! Provides:
//! - `JackServer` — a JACK client implementing the core `AudioServer` trait
//!
//! ## Usage
//! ```ignore
//! use jackrec_core::CaptureClient;
//! use jackrec_jack::JackServer;
//!
//! let server = JackServer::connect("jackrec", true)?;
//! let mut client = CaptureClient::open(server, 2, 2.0)?;
//! client.activate()?;
//! client.auto_connect()?;
//! ```

pub mod jack_server;

pub use jack_server::JackServer;
