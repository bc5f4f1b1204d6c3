use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Result returned when a session is closed and its file finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingResult {
    pub file_path: PathBuf,
    pub format: String,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames_written: u64,
    pub duration_secs: f64,
    pub checksum: String,
}

/// Metadata written alongside a recording.
///
/// Serializable for the JSON sidecar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingMetadata {
    pub id: String,
    pub client_name: String,
    pub file_path: String,
    pub format: String,
    pub sample_rate: u32,
    pub channels: usize,
    pub frames: u64,
    pub duration_secs: f64,
    pub checksum: String,
    pub overflow_count: u64,
    pub source_ports: Vec<String>,
    pub created_at: String,
}

impl RecordingMetadata {
    pub fn new(
        result: &RecordingResult,
        client_name: &str,
        overflow_count: u64,
        source_ports: Vec<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            client_name: client_name.to_string(),
            file_path: result.file_path.to_string_lossy().into_owned(),
            format: result.format.clone(),
            sample_rate: result.sample_rate,
            channels: result.channels,
            frames: result.frames_written,
            duration_secs: result.duration_secs,
            checksum: result.checksum.clone(),
            overflow_count,
            source_ports,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
