//! Archive output: named byte blobs → zip container.
//!
//! The exporter writes through the [`ArchiveSink`] trait so the partition
//! and naming logic can be tested against [`MemorySink`] without producing a
//! real zip file.

use crate::error::SplitError;
use std::io::{Seek, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Destination for exported checklist documents.
pub trait ArchiveSink {
    /// Store `bytes` under the `/`-separated relative `path`.
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<(), SplitError>;
}

/// Deflate-compressed zip archive over any seekable writer.
pub struct ZipSink<W: Write + Seek> {
    writer: ZipWriter<W>,
    options: SimpleFileOptions,
    entries: usize,
}

impl<W: Write + Seek> ZipSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            writer: ZipWriter::new(inner),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644),
            entries: 0,
        }
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write the central directory and hand back the inner writer.
    pub fn finish(self) -> Result<W, SplitError> {
        self.writer
            .finish()
            .map_err(|e| SplitError::ArchiveWriteFailed {
                entry: "<central directory>".into(),
                detail: e.to_string(),
            })
    }
}

impl<W: Write + Seek> ArchiveSink for ZipSink<W> {
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<(), SplitError> {
        let fail = |detail: String| SplitError::ArchiveWriteFailed {
            entry: path.to_string(),
            detail,
        };

        self.writer
            .start_file(path, self.options)
            .map_err(|e| fail(e.to_string()))?;
        self.writer
            .write_all(bytes)
            .map_err(|e| fail(e.to_string()))?;

        self.entries += 1;
        debug!("Archived {} ({} bytes)", path, bytes.len());
        Ok(())
    }
}

/// Keeps every entry in memory, in write order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub entries: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl ArchiveSink for MemorySink {
    fn write_entry(&mut self, path: &str, bytes: &[u8]) -> Result<(), SplitError> {
        self.entries.push((path.to_string(), bytes.to_vec()));
        Ok(())
    }
}
