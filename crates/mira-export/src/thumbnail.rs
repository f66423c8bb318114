//! Thumbnail images embedded in the assembly

use std::path::Path;

use mirabuf::Thumbnail;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Thumbnail errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ThumbnailError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Not a PNG image")]
    NotPng,
    #[error("Truncated PNG header")]
    Truncated,
}

/// Wrap PNG bytes, reading the size from the IHDR chunk
pub fn thumbnail_from_png(data: Vec<u8>) -> Result<Thumbnail, ThumbnailError> {
    if data.len() < 8 || data[..8] != PNG_SIGNATURE {
        return Err(ThumbnailError::NotPng);
    }
    // signature, chunk length, "IHDR", width, height, bit depth, color type
    if data.len() < 26 {
        return Err(ThumbnailError::Truncated);
    }
    if &data[12..16] != b"IHDR" {
        return Err(ThumbnailError::NotPng);
    }

    let be = |at: usize| u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]]);
    let width = be(16);
    let height = be(20);
    // Color types 4 and 6 carry alpha
    let transparent = matches!(data[25], 4 | 6);

    Ok(Thumbnail {
        width,
        height,
        extension: "png".to_string(),
        transparent,
        data,
    })
}

/// Read a PNG thumbnail from disk
pub fn load_png(path: &Path) -> Result<Thumbnail, ThumbnailError> {
    let data = std::fs::read(path).map_err(|e| ThumbnailError::Io(e.to_string()))?;
    let thumbnail = thumbnail_from_png(data)?;
    tracing::debug!(
        "Loaded {}x{} thumbnail from {:?}",
        thumbnail.width,
        thumbnail.height,
        path
    );
    Ok(thumbnail)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_header(width: u32, height: u32, color_type: u8) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, color_type, 0, 0, 0]);
        data
    }

    #[test]
    fn test_reads_dimensions() {
        let thumbnail = thumbnail_from_png(png_header(250, 120, 6)).unwrap();
        assert_eq!((thumbnail.width, thumbnail.height), (250, 120));
        assert!(thumbnail.transparent);
        assert_eq!(thumbnail.extension, "png");
    }

    #[test]
    fn test_opaque_color_type() {
        let thumbnail = thumbnail_from_png(png_header(1, 1, 2)).unwrap();
        assert!(!thumbnail.transparent);
    }

    #[test]
    fn test_rejects_other_data() {
        assert!(matches!(
            thumbnail_from_png(b"GIF89a....".to_vec()),
            Err(ThumbnailError::NotPng)
        ));
        assert!(matches!(
            thumbnail_from_png(PNG_SIGNATURE.to_vec()),
            Err(ThumbnailError::Truncated)
        ));
    }
}
