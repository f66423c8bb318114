//! Binary encoding of assemblies
//!
//! Records are encoded with bincode; the result may be wrapped in gzip at
//! compression level 9. [`decode`] accepts either form.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::assembly::Assembly;

/// gzip compression level used for `.mira` files
pub const COMPRESSION_LEVEL: u32 = 9;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Codec errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum CodecError {
    #[error("Encode error: {0}")]
    Encode(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Compression error: {0}")]
    Compression(String),
}

/// Serialize an assembly to raw bytes
pub fn serialize(assembly: &Assembly) -> Result<Vec<u8>, CodecError> {
    bincode::serialize(assembly).map_err(|e| CodecError::Encode(e.to_string()))
}

/// Deserialize raw (uncompressed) bytes
pub fn deserialize(bytes: &[u8]) -> Result<Assembly, CodecError> {
    bincode::deserialize(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// gzip-compress bytes at [`COMPRESSION_LEVEL`]
pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut encoder = GzEncoder::new(
        Vec::with_capacity(bytes.len() / 2),
        Compression::new(COMPRESSION_LEVEL),
    );
    encoder
        .write_all(bytes)
        .map_err(|e| CodecError::Compression(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| CodecError::Compression(e.to_string()))
}

/// Inflate gzip bytes
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut decoder = GzDecoder::new(bytes);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| CodecError::Compression(e.to_string()))?;
    Ok(out)
}

/// Check for the gzip magic number
pub fn is_compressed(bytes: &[u8]) -> bool {
    bytes.starts_with(&GZIP_MAGIC)
}

/// Serialize and optionally compress
pub fn encode(assembly: &Assembly, compressed: bool) -> Result<Vec<u8>, CodecError> {
    let raw = serialize(assembly)?;
    if compressed { compress(&raw) } else { Ok(raw) }
}

/// Decode bytes produced by [`encode`], compressed or not
pub fn decode(bytes: &[u8]) -> Result<Assembly, CodecError> {
    if is_compressed(bytes) {
        deserialize(&decompress(bytes)?)
    } else {
        deserialize(bytes)
    }
}
