//! AIFF / AIFF-C header generation.
//!
//! Integer PCM is written as plain AIFF; 32-bit float requires AIFF-C with
//! the `fl32` compression type. All fields are big-endian. Sizes that are only
//! known after recording (form size, frame count, sound data size) are written
//! as zero and patched on close at the offsets reported in [`AiffHeader`].

use super::sample_format::SampleEncoding;

/// AIFF-C version 1 timestamp, required in the `FVER` chunk.
const AIFC_VERSION_1: u32 = 0xA280_5140;

const FLOAT_COMPRESSION_NAME: &[u8] = b"32-bit floating point";

/// A generated header plus the offsets of the fields patched on close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AiffHeader {
    pub bytes: Vec<u8>,
    /// Offset of the `COMM` numSampleFrames field.
    pub frames_offset: u64,
    /// Offset of the `SSND` chunk size field.
    pub sound_size_offset: u64,
}

/// Offset of the `FORM` chunk size field.
pub const FORM_SIZE_OFFSET: u64 = 4;

/// Generate an AIFF (or AIFF-C for float) header with zeroed size fields.
///
/// Layout for integer PCM:
/// ```text
/// [0-3]    "FORM"
/// [4-7]    form size (file size - 8)
/// [8-11]   "AIFF"
/// [12-15]  "COMM"
/// [16-19]  18
/// [20-21]  channels
/// [22-25]  sample frames
/// [26-27]  bits per sample
/// [28-37]  sample rate (80-bit extended)
/// [38-41]  "SSND"
/// [42-45]  sound size (8 + data size)
/// [46-49]  offset (0)
/// [50-53]  block size (0)
/// ```
pub fn generate_aiff_header(sample_rate: u32, channels: u16, encoding: SampleEncoding) -> AiffHeader {
    let mut bytes = Vec::with_capacity(96);
    let is_float = encoding.is_float();

    bytes.extend_from_slice(b"FORM");
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(if is_float { b"AIFC" } else { b"AIFF" });

    if is_float {
        bytes.extend_from_slice(b"FVER");
        bytes.extend_from_slice(&4u32.to_be_bytes());
        bytes.extend_from_slice(&AIFC_VERSION_1.to_be_bytes());
    }

    let name = pascal_string(FLOAT_COMPRESSION_NAME);
    let comm_size: u32 = if is_float { 18 + 4 + name.len() as u32 } else { 18 };
    bytes.extend_from_slice(b"COMM");
    bytes.extend_from_slice(&comm_size.to_be_bytes());
    bytes.extend_from_slice(&channels.to_be_bytes());
    let frames_offset = bytes.len() as u64;
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(&encoding.bits_per_sample().to_be_bytes());
    bytes.extend_from_slice(&sample_rate_to_extended(sample_rate));
    if is_float {
        bytes.extend_from_slice(b"fl32");
        bytes.extend_from_slice(&name);
    }

    bytes.extend_from_slice(b"SSND");
    let sound_size_offset = bytes.len() as u64;
    bytes.extend_from_slice(&8u32.to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());
    bytes.extend_from_slice(&0u32.to_be_bytes());

    AiffHeader {
        bytes,
        frames_offset,
        sound_size_offset,
    }
}

/// Encode an integer sample rate as an 80-bit IEEE 754 extended float.
pub fn sample_rate_to_extended(sample_rate: u32) -> [u8; 10] {
    let mut out = [0u8; 10];
    if sample_rate == 0 {
        return out;
    }
    let rate = sample_rate as u64;
    let top_bit = 63 - rate.leading_zeros();
    let exponent = 16383u16 + top_bit as u16;
    let mantissa = rate << (63 - top_bit);
    out[0..2].copy_from_slice(&exponent.to_be_bytes());
    out[2..10].copy_from_slice(&mantissa.to_be_bytes());
    out
}

/// Pascal string padded to an even total length.
fn pascal_string(text: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(text.len() as u8);
    out.extend_from_slice(text);
    if out.len() % 2 != 0 {
        out.push(0);
    }
    out
}
