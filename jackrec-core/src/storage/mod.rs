pub mod checksum;
pub mod container_writer;
pub mod flac_writer;
pub mod metadata;
