use log::debug;
use serde::Serialize;

use crate::models::error::CaptureError;
use crate::processing::sample_format::SampleEncoding;

use super::encoder::FileEncoder;

/// FLAC frames carry at most eight channels.
const FLAC_MAX_CHANNELS: u16 = 8;

/// Container a format writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    Aiff,
    Au,
    Flac,
    Wav,
}

/// Static description of a supported output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OutputFormat {
    pub name: &'static str,
    pub description: &'static str,
    pub container: Container,
    pub encoding: SampleEncoding,
}

/// Every supported format, in display order.
pub static OUTPUT_FORMATS: &[OutputFormat] = &[
    OutputFormat {
        name: "aiff",
        description: "AIFF (16-bit PCM)",
        container: Container::Aiff,
        encoding: SampleEncoding::Pcm16,
    },
    OutputFormat {
        name: "aiff24",
        description: "AIFF (24-bit PCM)",
        container: Container::Aiff,
        encoding: SampleEncoding::Pcm24,
    },
    OutputFormat {
        name: "aiff32",
        description: "AIFF-C (32-bit float)",
        container: Container::Aiff,
        encoding: SampleEncoding::Float32,
    },
    OutputFormat {
        name: "au",
        description: "AU (16-bit PCM)",
        container: Container::Au,
        encoding: SampleEncoding::Pcm16,
    },
    OutputFormat {
        name: "au24",
        description: "AU (24-bit PCM)",
        container: Container::Au,
        encoding: SampleEncoding::Pcm24,
    },
    OutputFormat {
        name: "au32",
        description: "AU (32-bit float)",
        container: Container::Au,
        encoding: SampleEncoding::Float32,
    },
    OutputFormat {
        name: "flac",
        description: "FLAC (16-bit PCM)",
        container: Container::Flac,
        encoding: SampleEncoding::Pcm16,
    },
    OutputFormat {
        name: "wav",
        description: "WAV (16-bit PCM)",
        container: Container::Wav,
        encoding: SampleEncoding::Pcm16,
    },
    OutputFormat {
        name: "wav24",
        description: "WAV (24-bit PCM)",
        container: Container::Wav,
        encoding: SampleEncoding::Pcm24,
    },
    OutputFormat {
        name: "wav32",
        description: "WAV (32-bit float)",
        container: Container::Wav,
        encoding: SampleEncoding::Float32,
    },
];

/// Look up a format by identifier.
pub fn output_format(name: &str) -> Option<&'static OutputFormat> {
    OUTPUT_FORMATS.iter().find(|f| f.name == name)
}

impl OutputFormat {
    /// Build an encoder for `channels` channels at `sample_rate`.
    ///
    /// `bitrate` (kbit/s) is carried for reporting; PCM and FLAC ignore it.
    pub fn create_encoder(
        &'static self,
        sample_rate: u32,
        channels: usize,
        bitrate: u32,
    ) -> Result<FileEncoder, CaptureError> {
        if sample_rate == 0 {
            return Err(CaptureError::EncodingFailed("sample rate must be positive".into()));
        }
        let channels_u16 = u16::try_from(channels)
            .ok()
            .filter(|c| *c > 0 && (self.container != Container::Flac || *c <= FLAC_MAX_CHANNELS))
            .ok_or_else(|| {
                CaptureError::EncodingFailed(format!("{} cannot hold {} channels", self.description, channels))
            })?;

        debug!(
            "Created a {} encoder: {} Hz, {} channels, {} kbit/s requested.",
            self.description, sample_rate, channels_u16, bitrate
        );
        Ok(FileEncoder::new(self, sample_rate, channels, bitrate))
    }

    /// Conventional file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self.container {
            Container::Aiff if self.encoding.is_float() => "aifc",
            Container::Aiff => "aiff",
            Container::Au => "au",
            Container::Flac => "flac",
            Container::Wav => "wav",
        }
    }
}
