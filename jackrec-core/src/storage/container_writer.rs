use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::models::error::CaptureError;
use crate::processing::aiff_format::{self, AiffHeader};
use crate::processing::au_format;
use crate::processing::sample_format::{self, SampleEncoding};

/// Which size fields must be patched once the data length is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderLayout {
    Aiff {
        frames_offset: u64,
        sound_size_offset: u64,
    },
    Au,
}

/// Streaming writer for big-endian PCM containers (AIFF, AIFF-C, AU).
///
/// ## File Format
///
/// ```text
/// [container header with placeholder sizes]
/// [interleaved big-endian samples...]
/// [pad byte, AIFF only, when the sound data length is odd]
/// ```
///
/// `close` seeks back and patches the header size fields.
pub struct ContainerWriter {
    file_path: PathBuf,
    file: BufWriter<File>,
    layout: HeaderLayout,
    encoding: SampleEncoding,
    channels: usize,
    header_len: u64,
    data_bytes: u64,
    frames_written: u64,
    scratch: Vec<u8>,
}

impl ContainerWriter {
    /// Create an AIFF (AIFF-C for float) file and write its header.
    pub fn create_aiff(
        file_path: &Path,
        sample_rate: u32,
        channels: u16,
        encoding: SampleEncoding,
    ) -> Result<Self, CaptureError> {
        let AiffHeader {
            bytes,
            frames_offset,
            sound_size_offset,
        } = aiff_format::generate_aiff_header(sample_rate, channels, encoding);
        Self::create(
            file_path,
            &bytes,
            HeaderLayout::Aiff {
                frames_offset,
                sound_size_offset,
            },
            encoding,
            channels as usize,
        )
    }

    /// Create a Sun AU file and write its header.
    pub fn create_au(
        file_path: &Path,
        sample_rate: u32,
        channels: u16,
        encoding: SampleEncoding,
    ) -> Result<Self, CaptureError> {
        let header = au_format::generate_au_header(sample_rate, channels, encoding);
        Self::create(file_path, &header, HeaderLayout::Au, encoding, channels as usize)
    }

    fn create(
        file_path: &Path,
        header: &[u8],
        layout: HeaderLayout,
        encoding: SampleEncoding,
        channels: usize,
    ) -> Result<Self, CaptureError> {
        let file = File::create(file_path)
            .map_err(|e| CaptureError::StorageError(format!("failed to create file: {}", e)))?;
        let mut file = BufWriter::new(file);
        file.write_all(header)
            .map_err(|e| CaptureError::StorageError(format!("failed to write header: {}", e)))?;

        Ok(Self {
            file_path: file_path.to_path_buf(),
            file,
            layout,
            encoding,
            channels,
            header_len: header.len() as u64,
            data_bytes: 0,
            frames_written: 0,
            scratch: Vec::new(),
        })
    }

    /// Write interleaved frames. Returns the number of frames written.
    pub fn write_frames(&mut self, interleaved: &[f32]) -> Result<usize, CaptureError> {
        let frames = interleaved.len() / self.channels;
        let samples = &interleaved[..frames * self.channels];

        self.scratch.clear();
        sample_format::encode_be(samples, self.encoding, &mut self.scratch);

        if let HeaderLayout::Aiff { .. } = self.layout {
            let data_bytes = self.data_bytes + self.scratch.len() as u64;
            if aiff_form_size(self.header_len, data_bytes) > u32::MAX as u64 {
                return Err(CaptureError::StorageError(
                    "AIFF size limit reached; the file cannot hold more audio".into(),
                ));
            }
        }

        self.file
            .write_all(&self.scratch)
            .map_err(|e| CaptureError::StorageError(format!("write failed: {}", e)))?;

        self.data_bytes += self.scratch.len() as u64;
        self.frames_written += frames as u64;
        Ok(frames)
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Patch the header sizes, flush and close the file.
    pub fn close(mut self) -> Result<(), CaptureError> {
        let mut total = self.header_len + self.data_bytes;

        match self.layout {
            HeaderLayout::Aiff {
                frames_offset,
                sound_size_offset,
            } => {
                if self.data_bytes % 2 != 0 {
                    self.file.write_all(&[0]).map_err(storage_error)?;
                    total += 1;
                }
                self.patch_u32(aiff_format::FORM_SIZE_OFFSET, exact_u32(total - 8)?)?;
                self.patch_u32(frames_offset, exact_u32(self.frames_written)?)?;
                self.patch_u32(sound_size_offset, exact_u32(8 + self.data_bytes)?)?;
            }
            // AU reads an all-ones size as "unknown", so clamping is valid there.
            HeaderLayout::Au => {
                self.patch_u32(au_format::DATA_SIZE_OFFSET, clamp_u32(self.data_bytes))?;
            }
        }

        self.file.flush().map_err(storage_error)?;
        self.file.get_ref().sync_all().map_err(storage_error)?;
        Ok(())
    }

    fn patch_u32(&mut self, offset: u64, value: u32) -> Result<(), CaptureError> {
        self.file.seek(SeekFrom::Start(offset)).map_err(storage_error)?;
        self.file.write_all(&value.to_be_bytes()).map_err(storage_error)
    }
}

fn storage_error(e: std::io::Error) -> CaptureError {
    CaptureError::StorageError(e.to_string())
}

fn clamp_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn exact_u32(value: u64) -> Result<u32, CaptureError> {
    u32::try_from(value).map_err(|_| CaptureError::StorageError(format!("size {} exceeds the AIFF limit", value)))
}

/// FORM chunk size for `data_bytes` of sound data, including the pad byte.
fn aiff_form_size(header_len: u64, data_bytes: u64) -> u64 {
    header_len - 8 + data_bytes + data_bytes % 2
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("jackrec_test_{}_{}", uuid::Uuid::new_v4(), name))
    }

    fn be_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn aiff_sizes_are_patched() {
        let path = temp_file_path("sizes.aiff");
        let mut writer = ContainerWriter::create_aiff(&path, 48000, 2, SampleEncoding::Pcm16).unwrap();

        assert_eq!(writer.write_frames(&[0.0; 8]).unwrap(), 4);
        assert_eq!(writer.write_frames(&[0.5; 4]).unwrap(), 2);
        assert_eq!(writer.frames_written(), 6);
        writer.close().unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), 54 + 24);
        assert_eq!(be_u32(&data, 4) as usize, data.len() - 8);
        assert_eq!(be_u32(&data, 22), 6);
        assert_eq!(be_u32(&data, 42), 8 + 24);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn aiff_odd_data_is_padded() {
        let path = temp_file_path("odd.aiff");
        let mut writer = ContainerWriter::create_aiff(&path, 44100, 1, SampleEncoding::Pcm24).unwrap();
        writer.write_frames(&[0.25]).unwrap();
        writer.close().unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), 54 + 3 + 1);
        assert_eq!(be_u32(&data, 4) as usize, data.len() - 8);
        assert_eq!(be_u32(&data, 42), 8 + 3);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn au_data_size_is_patched() {
        let path = temp_file_path("size.au");
        let mut writer = ContainerWriter::create_au(&path, 44100, 2, SampleEncoding::Float32).unwrap();
        writer.write_frames(&[0.1, 0.2, 0.3, 0.4]).unwrap();
        writer.close().unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(data.len(), 24 + 16);
        assert_eq!(be_u32(&data, 8), 16);
        assert_eq!(f32::from_be_bytes([data[24], data[25], data[26], data[27]]), 0.1);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn aiff_refuses_to_grow_past_four_gib() {
        let path = temp_file_path("limit.aiff");
        let mut writer = ContainerWriter::create_aiff(&path, 48000, 2, SampleEncoding::Pcm16).unwrap();
        let block = [0.0; 512];

        // Leaves room for exactly one more 256-frame stereo block (1024 bytes).
        writer.data_bytes = u32::MAX as u64 - 46 - 1 - 1024;
        assert_eq!(writer.write_frames(&block).unwrap(), 256);
        assert_eq!(aiff_form_size(54, writer.data_bytes), u32::MAX as u64 - 1);

        let before = writer.data_bytes;
        assert!(matches!(writer.write_frames(&block), Err(CaptureError::StorageError(_))));
        assert_eq!(writer.data_bytes, before);
        assert_eq!(writer.frames_written(), 256);

        writer.data_bytes = u32::MAX as u64 - 16;
        assert!(writer.write_frames(&block).is_err());

        drop(writer);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn au_keeps_writing_past_four_gib() {
        let path = temp_file_path("limit.au");
        let mut writer = ContainerWriter::create_au(&path, 48000, 2, SampleEncoding::Pcm16).unwrap();
        writer.data_bytes = u32::MAX as u64 - 16;
        assert_eq!(writer.write_frames(&[0.0; 512]).unwrap(), 256);
        writer.close().unwrap();

        let data = fs::read(&path).unwrap();
        assert_eq!(be_u32(&data, 8), u32::MAX);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn create_fails_for_missing_directory() {
        let path = std::env::temp_dir()
            .join(format!("jackrec_missing_{}", uuid::Uuid::new_v4()))
            .join("take.au");
        let result = ContainerWriter::create_au(&path, 48000, 1, SampleEncoding::Pcm16);
        assert!(matches!(result, Err(CaptureError::StorageError(_))));
    }
}
