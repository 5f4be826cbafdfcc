//! Zip container I/O
//!
//! Reading decompresses every part into memory up front; writing packs parts
//! in the order given with fixed timestamps so equal inputs give equal bytes.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipArchive, ZipWriter};

use crate::error::{XlsxError, XlsxResult};
use crate::options::{XlsxReadOptions, XlsxWriteOptions};

/// Part name to uncompressed content
pub(crate) type Parts = BTreeMap<String, Vec<u8>>;

/// Decompress every file of the archive
pub(crate) fn unpack(bytes: &[u8], options: &XlsxReadOptions) -> XlsxResult<Parts> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut parts = Parts::new();

    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        let declared = file.size();

        let mut content = Vec::new();
        match options.max_part_size {
            Some(limit) => {
                if declared > limit {
                    return Err(XlsxError::MemoryLimit {
                        part: name,
                        limit,
                        actual: declared,
                    });
                }
                // the declared size is not trusted; read one byte past the limit
                file.take(limit + 1).read_to_end(&mut content)?;
                if content.len() as u64 > limit {
                    return Err(XlsxError::MemoryLimit {
                        part: name,
                        limit,
                        actual: content.len() as u64,
                    });
                }
            }
            None => {
                let mut file = file;
                file.read_to_end(&mut content)?;
            }
        }

        log::debug!("unpacked {} ({} bytes)", name, content.len());
        parts.insert(name, content);
    }

    Ok(parts)
}

/// Pack parts, in order, into a zip archive
pub(crate) fn pack(parts: &[(String, Vec<u8>)], options: &XlsxWriteOptions) -> XlsxResult<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default()
        .compression_method(options.compression.method())
        .compression_level(options.compression_level)
        .last_modified_time(DateTime::default());

    for (name, content) in parts {
        zip.start_file(name.as_str(), file_options)?;
        zip.write_all(content)?;
        log::debug!("packed {} ({} bytes)", name, content.len());
    }

    Ok(zip.finish()?.into_inner())
}
