//! FLAC output.
//!
//! `flacenc` encodes a whole stream at once, so samples are held in memory
//! until `close` and the file is written in one pass. The file is created on
//! open so an unwritable path fails before recording starts.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use flacenc::component::BitRepr;
use flacenc::error::Verify;
use log::debug;

use crate::models::error::CaptureError;
use crate::processing::sample_format;

/// Bits per sample written to FLAC files.
pub const FLAC_BITS_PER_SAMPLE: usize = 16;

pub struct FlacWriter {
    file_path: PathBuf,
    file: File,
    sample_rate: u32,
    channels: usize,
    samples: Vec<i32>,
    frames_written: u64,
}

impl FlacWriter {
    pub fn create(file_path: &Path, sample_rate: u32, channels: u16) -> Result<Self, CaptureError> {
        let file = File::create(file_path)
            .map_err(|e| CaptureError::StorageError(format!("failed to create file: {}", e)))?;
        Ok(Self {
            file_path: file_path.to_path_buf(),
            file,
            sample_rate,
            channels: channels as usize,
            samples: Vec::new(),
            frames_written: 0,
        })
    }

    /// Queue interleaved frames as 16-bit samples. Returns the number of frames taken.
    pub fn write_frames(&mut self, interleaved: &[f32]) -> Result<usize, CaptureError> {
        let frames = interleaved.len() / self.channels;
        self.samples.extend(
            interleaved[..frames * self.channels]
                .iter()
                .map(|&s| sample_format::to_i16(s) as i32),
        );
        self.frames_written += frames as u64;
        Ok(frames)
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Encode every queued frame and write the stream.
    pub fn close(mut self) -> Result<(), CaptureError> {
        let config = flacenc::config::Encoder::default()
            .into_verified()
            .map_err(|_| CaptureError::EncodingFailed("invalid FLAC encoder configuration".into()))?;
        let source = flacenc::source::MemSource::from_samples(
            &self.samples,
            self.channels,
            FLAC_BITS_PER_SAMPLE,
            self.sample_rate as usize,
        );
        let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
            .map_err(|e| CaptureError::EncodingFailed(format!("FLAC encoding failed: {:?}", e)))?;

        let mut sink = flacenc::bitsink::ByteSink::new();
        stream
            .write(&mut sink)
            .map_err(|_| CaptureError::EncodingFailed("failed to serialize FLAC stream".into()))?;

        self.file
            .write_all(sink.as_slice())
            .and_then(|_| self.file.sync_all())
            .map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;
        debug!("Encoded {} frames to FLAC.", self.frames_written);
        Ok(())
    }
}
