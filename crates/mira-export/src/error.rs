//! Export error type

use mirabuf::CodecError;

use crate::ids::Namespace;
use crate::options::OptionsError;
use crate::scene::SceneError;

/// Errors that abort an export
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExportError {
    #[error("Export cancelled")]
    Cancelled,

    #[error("Identifier {key} issued for {first} and {second} ({namespace:?})")]
    IdentifierCollision {
        namespace: Namespace,
        key: String,
        first: String,
        second: String,
    },

    #[error("Encoding failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Failed to write {path}: {message}")]
    Write { path: String, message: String },

    #[error("Upload of {file_name} failed")]
    UploadFailed { file_name: String },

    #[error("No upload sink configured")]
    UploadUnavailable,

    #[error("Project is invalid")]
    InvalidProject,

    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    #[error("Options error: {0}")]
    Options(#[from] OptionsError),
}

/// Result type for export operations
pub type ExportResult<T> = Result<T, ExportError>;
