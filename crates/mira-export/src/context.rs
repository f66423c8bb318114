//! Per-export state

use crate::ids::IdentifierMapper;
use crate::kernel::GeometryKernel;
use crate::options::ExportOptions;
use crate::progress::ProgressTracker;
use crate::scene::Scene;

/// Everything one export run reads and mutates
///
/// Built fresh for each export and dropped when it finishes; nothing here
/// outlives the run.
pub struct ExportContext<'a> {
    pub scene: &'a Scene,
    pub options: &'a ExportOptions,
    pub kernel: &'a dyn GeometryKernel,
    pub ids: IdentifierMapper,
    pub progress: ProgressTracker<'a>,
}

impl<'a> ExportContext<'a> {
    pub fn new(
        scene: &'a Scene,
        options: &'a ExportOptions,
        kernel: &'a dyn GeometryKernel,
        progress: ProgressTracker<'a>,
    ) -> Self {
        Self {
            scene,
            options,
            kernel,
            ids: IdentifierMapper::new(),
            progress,
        }
    }
}
