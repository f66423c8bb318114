//! Mirabuf assembly exporter
//!
//! Turns a snapshot of a CAD design into a Mirabuf [`Assembly`]:
//! - Scene: read-only snapshot of the host design
//! - Kernel: tessellation and mass properties behind [`GeometryKernel`]
//! - Parts / Joints: definitions, instances and both hierarchies
//! - Exporter: runs the pipeline and writes or uploads the result
//!
//! [`Assembly`]: mirabuf::Assembly
//! [`GeometryKernel`]: kernel::GeometryKernel

pub mod context;
pub mod error;
pub mod exporter;
pub mod fill;
pub mod ids;
pub mod joints;
pub mod kernel;
pub mod materials;
pub mod options;
pub mod output;
pub mod parts;
pub mod progress;
pub mod scene;
pub mod summary;
pub mod thumbnail;

pub use context::ExportContext;
pub use error::{ExportError, ExportResult};
pub use exporter::{ExportOutcome, ExportTarget, Exporter};
pub use ids::IdentifierMapper;
pub use kernel::{GeometryKernel, MeshQuality, PrimitiveKernel};
pub use options::ExportOptions;
pub use progress::{CancelToken, ProgressSink, ProgressState, ProgressUpdate, SharedProgress};
pub use scene::Scene;
pub use summary::ExportSummary;
