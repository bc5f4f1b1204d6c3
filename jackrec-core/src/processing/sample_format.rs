//! Sample encodings supported by the file encoders, and the conversions from
//! captured `f32` samples into big-endian container bytes.

use serde::Serialize;

const I24_MAX: f32 = 8_388_607.0;

/// On-disk sample encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    Pcm16,
    Pcm24,
    Float32,
}

impl SampleEncoding {
    pub fn bits_per_sample(self) -> u16 {
        match self {
            Self::Pcm16 => 16,
            Self::Pcm24 => 24,
            Self::Float32 => 32,
        }
    }

    pub fn bytes_per_sample(self) -> usize {
        self.bits_per_sample() as usize / 8
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32)
    }
}

/// Convert an `f32` sample in `[-1.0, 1.0]` to 16-bit PCM. Out-of-range values are clamped.
pub fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Convert an `f32` sample in `[-1.0, 1.0]` to 24-bit PCM held in an `i32`.
pub fn to_i24(sample: f32) -> i32 {
    (sample.clamp(-1.0, 1.0) * I24_MAX) as i32
}

/// Append `samples` to `out` as big-endian bytes in `encoding`.
pub fn encode_be(samples: &[f32], encoding: SampleEncoding, out: &mut Vec<u8>) {
    out.reserve(samples.len() * encoding.bytes_per_sample());
    match encoding {
        SampleEncoding::Pcm16 => {
            for &sample in samples {
                out.extend_from_slice(&to_i16(sample).to_be_bytes());
            }
        }
        SampleEncoding::Pcm24 => {
            for &sample in samples {
                out.extend_from_slice(&to_i24(sample).to_be_bytes()[1..]);
            }
        }
        SampleEncoding::Float32 => {
            for &sample in samples {
                out.extend_from_slice(&sample.to_be_bytes());
            }
        }
    }
}
