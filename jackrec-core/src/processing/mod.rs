pub mod aiff_format;
pub mod au_format;
pub mod channel_buffer;
pub mod interleave;
pub mod sample_format;
