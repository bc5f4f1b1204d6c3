//! Sun/NeXT AU header generation.
//!
//! ```text
//! [0-3]    ".snd"
//! [4-7]    data offset (24)
//! [8-11]   data size (0xFFFFFFFF until patched)
//! [12-15]  encoding
//! [16-19]  sample rate
//! [20-23]  channels
//! ```
//! All fields are big-endian.

use super::sample_format::SampleEncoding;

pub const AU_HEADER_SIZE: usize = 24;

/// Offset of the data size field patched on close.
pub const DATA_SIZE_OFFSET: u64 = 8;

/// Data size value meaning "unknown".
pub const UNKNOWN_DATA_SIZE: u32 = 0xFFFF_FFFF;

/// AU encoding code for a sample encoding.
pub fn encoding_code(encoding: SampleEncoding) -> u32 {
    match encoding {
        SampleEncoding::Pcm16 => 3,
        SampleEncoding::Pcm24 => 4,
        SampleEncoding::Float32 => 6,
    }
}

pub fn generate_au_header(sample_rate: u32, channels: u16, encoding: SampleEncoding) -> [u8; AU_HEADER_SIZE] {
    let mut header = [0u8; AU_HEADER_SIZE];
    header[0..4].copy_from_slice(b".snd");
    header[4..8].copy_from_slice(&(AU_HEADER_SIZE as u32).to_be_bytes());
    header[8..12].copy_from_slice(&UNKNOWN_DATA_SIZE.to_be_bytes());
    header[12..16].copy_from_slice(&encoding_code(encoding).to_be_bytes());
    header[16..20].copy_from_slice(&sample_rate.to_be_bytes());
    header[20..24].copy_from_slice(&(channels as u32).to_be_bytes());
    header
}
