use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::capture::client::{CaptureChannels, CaptureClient};
use crate::models::error::CaptureError;
use crate::models::recording_result::RecordingResult;
use crate::processing::channel_buffer::SAMPLE_SIZE;
use crate::processing::interleave::interleave_into;
use crate::storage::checksum::sha256_file;
use crate::traits::audio_server::AudioServer;

use super::container::ContainerSink;
use super::registry::OutputFormat;

/// Frames drained from every channel per `Session::write` call.
pub const DRAIN_BLOCK_FRAMES: usize = 256;

/// An encoder for one output format, bound to a sample rate and channel count.
///
/// Created by [`OutputFormat::create_encoder`].
#[derive(Debug)]
pub struct FileEncoder {
    format: &'static OutputFormat,
    sample_rate: u32,
    channels: usize,
    bitrate: u32,
}

impl FileEncoder {
    pub(crate) fn new(format: &'static OutputFormat, sample_rate: u32, channels: usize, bitrate: u32) -> Self {
        Self {
            format,
            sample_rate,
            channels,
            bitrate,
        }
    }

    pub fn format(&self) -> &'static OutputFormat {
        self.format
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn bitrate(&self) -> u32 {
        self.bitrate
    }

    /// Open a session recording `client`'s channels to `file_path`.
    ///
    /// All scratch storage is sized here; `write` never reallocates.
    pub fn open<'a, S: AudioServer>(
        &'a self,
        client: &'a CaptureClient<S>,
        file_path: &Path,
    ) -> Result<Session<'a>, CaptureError> {
        let channels = client.channels();
        if channels.count() != self.channels {
            return Err(CaptureError::Configuration(format!(
                "encoder expects {} channels, client has {}",
                self.channels,
                channels.count()
            )));
        }
        if channels.sample_rate() != self.sample_rate {
            return Err(CaptureError::Configuration(format!(
                "encoder expects {} Hz, client runs at {} Hz",
                self.sample_rate,
                channels.sample_rate()
            )));
        }

        let sink = ContainerSink::create(file_path, self.format, self.sample_rate, self.channels as u16)?;
        debug!("Created a new {} session recording to \"{}\".", self.format.name, file_path.display());

        Ok(Session {
            encoder: self,
            channels,
            file_path: file_path.to_path_buf(),
            sink,
            channel_scratch: vec![vec![0.0; DRAIN_BLOCK_FRAMES]; self.channels],
            interleaved: vec![0.0; DRAIN_BLOCK_FRAMES * self.channels],
            frames_written: 0,
        })
    }

    /// Release encoder-level resources once every session is closed.
    pub fn shutdown(self) {
        debug!("Encoder for {} released.", self.format.name);
    }
}

/// One output file being recorded from a capture client.
///
/// Borrows the client's channels and the encoder, so it cannot outlive either.
pub struct Session<'a> {
    encoder: &'a FileEncoder,
    channels: &'a CaptureChannels,
    file_path: PathBuf,
    sink: ContainerSink,
    channel_scratch: Vec<Vec<f32>>,
    interleaved: Vec<f32>,
    frames_written: u64,
}

impl<'a> Session<'a> {
    /// Drain one block from every channel and persist it.
    ///
    /// Returns `Ok(0)` without touching any buffer when some channel holds
    /// less than a full block; the caller should retry later. Otherwise
    /// returns the number of frames written. An `Err` is unrecoverable.
    pub fn write(&mut self) -> Result<usize, CaptureError> {
        let wanted = DRAIN_BLOCK_FRAMES * SAMPLE_SIZE;
        let mut readers = self.channels.readers();

        if readers.iter().any(|r| r.used_space() < wanted) {
            return Ok(0);
        }

        for (c, (reader, scratch)) in readers.iter_mut().zip(self.channel_scratch.iter_mut()).enumerate() {
            if reader.read(scratch) != DRAIN_BLOCK_FRAMES {
                return Err(CaptureError::EncodingFailed(format!(
                    "short read from channel {} ring buffer",
                    c + 1
                )));
            }
        }
        drop(readers);

        interleave_into(&self.channel_scratch, DRAIN_BLOCK_FRAMES, &mut self.interleaved);

        let written = self.sink.write_frames(&self.interleaved)?;
        if written != DRAIN_BLOCK_FRAMES {
            return Err(CaptureError::EncodingFailed(format!(
                "wrote {} of {} frames",
                written, DRAIN_BLOCK_FRAMES
            )));
        }

        self.frames_written += written as u64;
        Ok(written)
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Flush and finalize the file.
    pub fn close(self) -> Result<RecordingResult, CaptureError> {
        let Session {
            encoder,
            file_path,
            sink,
            frames_written,
            ..
        } = self;

        sink.finalize().map_err(|e| {
            warn!("Failed to close output file: {}", e);
            e
        })?;

        let checksum = sha256_file(&file_path)?;
        Ok(RecordingResult {
            file_path,
            format: encoder.format.name.to_string(),
            sample_rate: encoder.sample_rate,
            channels: encoder.channels,
            frames_written,
            duration_secs: frames_written as f64 / encoder.sample_rate as f64,
            checksum,
        })
    }
}
