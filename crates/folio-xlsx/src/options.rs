//! Options for reading and writing XLSX files

/// Compression applied to every part of a written archive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Deflate (default)
    #[default]
    Deflated,
    /// No compression
    Stored,
}

impl Compression {
    pub(crate) fn method(self) -> zip::CompressionMethod {
        match self {
            Compression::Deflated => zip::CompressionMethod::Deflated,
            Compression::Stored => zip::CompressionMethod::Stored,
        }
    }
}

/// Options for writing XLSX files
#[derive(Debug, Clone, Default)]
pub struct XlsxWriteOptions {
    /// Compression method (default: deflate)
    pub compression: Compression,
    /// Compression level (default: the library's default level)
    pub compression_level: Option<i64>,
}

impl XlsxWriteOptions {
    /// Set the compression method
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Set the compression level
    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = Some(level);
        self
    }
}

/// Options for reading XLSX files
#[derive(Debug, Clone, Default)]
pub struct XlsxReadOptions {
    /// Largest uncompressed part accepted, in bytes (default: no limit)
    pub max_part_size: Option<u64>,
}

impl XlsxReadOptions {
    /// Reject any part larger than `bytes` once decompressed
    pub fn with_max_part_size(mut self, bytes: u64) -> Self {
        self.max_part_size = Some(bytes);
        self
    }
}
