//! Upload staging.
//!
//! # Responsibilities
//! - Hold the inbound file's bytes between validation and forwarding
//! - Support both staging strategies: in-memory buffer and temp file
//! - Guarantee release on every exit path
//!
//! # Design Decisions
//! - Disk staging uses uniquely named temp files deleted when the handle
//!   drops, so abandonment (client disconnect), errors, and success all
//!   release exactly once — there is no cleanup callback to forget
//! - A staged upload is reopened, never consumed, for forwarding; the
//!   handle outlives the outbound call and drops after it returns

use std::io;
use std::path::Path;

use bytes::{Bytes, BytesMut};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::config::{LimitsConfig, StagingStrategy};

/// Write side of staging: accumulates chunks as they arrive off the wire.
pub enum StagingBuffer {
    Memory(BytesMut),
    Disk {
        temp: NamedTempFile,
        file: tokio::fs::File,
        written: u64,
    },
}

impl StagingBuffer {
    /// Create a buffer for the configured staging strategy.
    pub async fn create(limits: &LimitsConfig) -> io::Result<Self> {
        match limits.staging {
            StagingStrategy::Memory => Ok(StagingBuffer::Memory(BytesMut::new())),
            StagingStrategy::Disk => {
                let mut builder = tempfile::Builder::new();
                builder.prefix("ocr-upload-");
                let temp = match &limits.staging_dir {
                    Some(dir) => builder.tempfile_in(dir)?,
                    None => builder.tempfile()?,
                };
                let file = tokio::fs::File::from_std(temp.reopen()?);
                Ok(StagingBuffer::Disk {
                    temp,
                    file,
                    written: 0,
                })
            }
        }
    }

    /// Append one chunk of the inbound file part.
    pub async fn push_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        match self {
            StagingBuffer::Memory(buf) => {
                buf.extend_from_slice(chunk);
                Ok(())
            }
            StagingBuffer::Disk { file, written, .. } => {
                file.write_all(chunk).await?;
                *written += chunk.len() as u64;
                Ok(())
            }
        }
    }

    /// Bytes staged so far.
    pub fn len(&self) -> u64 {
        match self {
            StagingBuffer::Memory(buf) => buf.len() as u64,
            StagingBuffer::Disk { written, .. } => *written,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Seal the buffer into a readable staged upload.
    pub async fn finish(self) -> io::Result<StagedUpload> {
        match self {
            StagingBuffer::Memory(buf) => Ok(StagedUpload::Memory(buf.freeze())),
            StagingBuffer::Disk {
                temp,
                mut file,
                written,
            } => {
                file.flush().await?;
                drop(file);
                Ok(StagedUpload::Disk(DiskStaging { temp, len: written }))
            }
        }
    }
}

/// A fully staged upload, ready to forward.
///
/// Dropping this releases the staged bytes: the buffer is freed or the
/// temp file is deleted.
pub enum StagedUpload {
    Memory(Bytes),
    Disk(DiskStaging),
}

impl StagedUpload {
    /// Size of the staged file in bytes.
    pub fn len(&self) -> u64 {
        match self {
            StagedUpload::Memory(bytes) => bytes.len() as u64,
            StagedUpload::Disk(disk) => disk.len,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Disk-backed staged upload.
pub struct DiskStaging {
    temp: NamedTempFile,
    len: u64,
}

impl DiskStaging {
    /// Open an independent read handle at the start of the staged file.
    ///
    /// The temp file itself stays owned by the staging handle, so the
    /// bytes remain on disk until the handling flow drops it.
    pub fn reopen(&self) -> io::Result<std::fs::File> {
        self.temp.reopen()
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimitsConfig;
    use std::io::Read;

    fn memory_limits() -> LimitsConfig {
        LimitsConfig::default()
    }

    fn disk_limits(dir: &Path) -> LimitsConfig {
        LimitsConfig {
            staging: StagingStrategy::Disk,
            staging_dir: Some(dir.to_path_buf()),
            ..LimitsConfig::default()
        }
    }

    #[tokio::test]
    async fn memory_staging_round_trips() {
        let mut buffer = StagingBuffer::create(&memory_limits()).await.unwrap();
        buffer.push_chunk(b"hello ").await.unwrap();
        buffer.push_chunk(b"world").await.unwrap();
        assert_eq!(buffer.len(), 11);

        let staged = buffer.finish().await.unwrap();
        match &staged {
            StagedUpload::Memory(bytes) => assert_eq!(&bytes[..], b"hello world"),
            StagedUpload::Disk(_) => panic!("expected memory staging"),
        }
    }

    #[tokio::test]
    async fn disk_staging_writes_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = StagingBuffer::create(&disk_limits(dir.path())).await.unwrap();
        buffer.push_chunk(b"%PDF-1.4 fake").await.unwrap();
        let staged = buffer.finish().await.unwrap();

        let StagedUpload::Disk(disk) = &staged else {
            panic!("expected disk staging");
        };
        assert!(disk.path().starts_with(dir.path()));

        let mut content = Vec::new();
        disk.reopen().unwrap().read_to_end(&mut content).unwrap();
        assert_eq!(content, b"%PDF-1.4 fake");
    }

    #[tokio::test]
    async fn dropping_disk_staging_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = StagingBuffer::create(&disk_limits(dir.path())).await.unwrap();
        buffer.push_chunk(b"bytes").await.unwrap();
        let staged = buffer.finish().await.unwrap();

        let path = match &staged {
            StagedUpload::Disk(disk) => disk.path().to_path_buf(),
            StagedUpload::Memory(_) => panic!("expected disk staging"),
        };
        assert!(path.exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn dropping_unfinished_buffer_deletes_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut buffer = StagingBuffer::create(&disk_limits(dir.path())).await.unwrap();
        buffer.push_chunk(b"partial").await.unwrap();
        drop(buffer);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
