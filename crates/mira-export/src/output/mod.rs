//! Output targets for encoded assemblies

mod http;

use std::path::Path;

use crate::error::{ExportError, ExportResult};

pub use http::HttpBlobSink;

/// Remote storage accepting exported files
pub trait BlobSink {
    /// Store `bytes` and return a handle, or `None` if the upload failed
    fn upload(
        &self,
        project_id: &str,
        folder_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Option<String>;
}

/// Write bytes to `path`, creating parent directories
pub fn write_file(path: &Path, bytes: &[u8]) -> ExportResult<()> {
    let write_error = |e: std::io::Error| ExportError::Write {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, bytes).map_err(write_error)?;
    tracing::info!("Wrote {} bytes to {:?}", bytes.len(), path);
    Ok(())
}
