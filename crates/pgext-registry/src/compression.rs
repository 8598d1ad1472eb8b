//! Magic-byte detection and decompression of metadata payloads.
//!
//! RPM primary databases are published bzip2, gzip, xz or zstd compressed
//! depending on the `createrepo` version used by the mirror.

use std::io::Read;

use bzip2::read::MultiBzDecoder;
use flate2::read::MultiGzDecoder;
use xz2::read::XzDecoder;

use crate::error::{RegistryError, Result};

/// Magic bytes for SQLite database files.
pub const SQLITE_MAGIC_BYTES: [u8; 4] = [0x53, 0x51, 0x4c, 0x69];

/// Magic bytes for Zstandard compressed files.
pub const ZST_MAGIC_BYTES: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

pub const BZIP2_MAGIC_BYTES: [u8; 3] = [0x42, 0x5a, 0x68];
pub const GZIP_MAGIC_BYTES: [u8; 2] = [0x1f, 0x8b];
pub const XZ_MAGIC_BYTES: [u8; 6] = [0xfd, 0x37, 0x7a, 0x58, 0x5a, 0x00];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    Bzip2,
    Gzip,
    Xz,
    Zstd,
    None,
}

impl Compression {
    /// Detects the compression format from the leading bytes of `data`.
    pub fn detect(data: &[u8]) -> Self {
        if data.starts_with(&BZIP2_MAGIC_BYTES) {
            Compression::Bzip2
        } else if data.starts_with(&GZIP_MAGIC_BYTES) {
            Compression::Gzip
        } else if data.starts_with(&XZ_MAGIC_BYTES) {
            Compression::Xz
        } else if data.starts_with(&ZST_MAGIC_BYTES) {
            Compression::Zstd
        } else {
            Compression::None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::Bzip2 => "bzip2",
            Compression::Gzip => "gzip",
            Compression::Xz => "xz",
            Compression::Zstd => "zstd",
            Compression::None => "raw",
        }
    }
}

fn read_all<R: Read>(mut reader: R, format: &'static str) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    reader
        .read_to_end(&mut out)
        .map_err(|source| RegistryError::Decompress { format, source })?;
    Ok(out)
}

/// Decompresses `data` according to its magic bytes. Uncompressed input is
/// returned as-is.
///
/// Concatenated streams (as produced by parallel compressors such as
/// `pbzip2` or `pigz`) are decoded in full, not just the first member.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let compression = Compression::detect(data);
    let format = compression.as_str();
    match compression {
        Compression::Bzip2 => read_all(MultiBzDecoder::new(data), format),
        Compression::Gzip => read_all(MultiGzDecoder::new(data), format),
        Compression::Xz => read_all(XzDecoder::new_multi_decoder(data), format),
        Compression::Zstd => {
            let decoder = zstd::Decoder::new(data)
                .map_err(|source| RegistryError::Decompress { format, source })?;
            read_all(decoder, format)
        }
        Compression::None => Ok(data.to_vec()),
    }
}
