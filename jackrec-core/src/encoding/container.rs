use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::models::error::CaptureError;
use crate::processing::sample_format::{self, SampleEncoding};
use crate::storage::container_writer::ContainerWriter;
use crate::storage::flac_writer::FlacWriter;

use super::registry::{Container, OutputFormat};

/// An open output file, one variant per container.
pub enum ContainerSink {
    Wav {
        writer: hound::WavWriter<BufWriter<File>>,
        encoding: SampleEncoding,
        channels: usize,
    },
    BigEndian(ContainerWriter),
    Flac(FlacWriter),
}

impl ContainerSink {
    /// Create `path` and write the container header.
    pub fn create(
        path: &Path,
        format: &OutputFormat,
        sample_rate: u32,
        channels: u16,
    ) -> Result<Self, CaptureError> {
        match format.container {
            Container::Wav => {
                let spec = hound::WavSpec {
                    channels,
                    sample_rate,
                    bits_per_sample: format.encoding.bits_per_sample(),
                    sample_format: if format.encoding.is_float() {
                        hound::SampleFormat::Float
                    } else {
                        hound::SampleFormat::Int
                    },
                };
                let writer = hound::WavWriter::create(path, spec)
                    .map_err(|e| CaptureError::StorageError(format!("failed to create file: {}", e)))?;
                Ok(Self::Wav {
                    writer,
                    encoding: format.encoding,
                    channels: channels as usize,
                })
            }
            Container::Aiff => Ok(Self::BigEndian(ContainerWriter::create_aiff(
                path,
                sample_rate,
                channels,
                format.encoding,
            )?)),
            Container::Au => Ok(Self::BigEndian(ContainerWriter::create_au(
                path,
                sample_rate,
                channels,
                format.encoding,
            )?)),
            Container::Flac => Ok(Self::Flac(FlacWriter::create(path, sample_rate, channels)?)),
        }
    }

    /// Write interleaved frames. Returns the number of whole frames written.
    pub fn write_frames(&mut self, interleaved: &[f32]) -> Result<usize, CaptureError> {
        match self {
            Self::Wav {
                writer,
                encoding,
                channels,
            } => {
                let frames = interleaved.len() / *channels;
                for &sample in &interleaved[..frames * *channels] {
                    let written = match encoding {
                        SampleEncoding::Pcm16 => writer.write_sample(sample_format::to_i16(sample)),
                        SampleEncoding::Pcm24 => writer.write_sample(sample_format::to_i24(sample)),
                        SampleEncoding::Float32 => writer.write_sample(sample),
                    };
                    written.map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;
                }
                Ok(frames)
            }
            Self::BigEndian(writer) => writer.write_frames(interleaved),
            Self::Flac(writer) => writer.write_frames(interleaved),
        }
    }

    /// Flush and finalize the container.
    pub fn finalize(self) -> Result<(), CaptureError> {
        match self {
            Self::Wav { writer, .. } => writer
                .finalize()
                .map_err(|e| CaptureError::StorageError(format!("failed to finalize file: {}", e))),
            Self::BigEndian(writer) => writer.close(),
            Self::Flac(writer) => writer.close(),
        }
    }
}
