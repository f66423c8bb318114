//! Top-level export pipeline

use std::path::PathBuf;

use mirabuf::{Assembly, Thumbnail};

use crate::context::ExportContext;
use crate::error::{ExportError, ExportResult};
use crate::fill::Fill;
use crate::joints::{assign_joint_parts, build_joint_hierarchy, populate_joints};
use crate::kernel::GeometryKernel;
use crate::materials::map_materials;
use crate::options::{ExportLocation, ExportMode, ExportOptions};
use crate::output::{BlobSink, write_file};
use crate::parts::{
    apply_gamepiece_friction, apply_gamepiece_weights, apply_robot_weight, build_design_tree,
    map_components, map_rigid_groups,
};
use crate::progress::{CancelToken, LogSink, ProgressSink, ProgressTracker};
use crate::scene::Scene;
use crate::summary::ExportSummary;

/// Message shown for unexpected failures outside debug mode
pub const GENERIC_FAILURE: &str = "An error occurred while exporting.";

/// Where an export ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportTarget {
    File(PathBuf),
    /// Handle returned by the blob sink
    Upload(String),
}

/// Result of [`Exporter::export`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Written { target: ExportTarget, bytes: usize },
    Cancelled,
    Failed { message: String },
}

impl ExportOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, ExportOutcome::Written { .. })
    }
}

static LOG_SINK: LogSink = LogSink;

/// Runs exports against a geometry kernel
pub struct Exporter<'a> {
    kernel: &'a dyn GeometryKernel,
    progress: &'a dyn ProgressSink,
    blob_sink: Option<&'a dyn BlobSink>,
    cancel: CancelToken,
    thumbnail: Option<Thumbnail>,
    debug: bool,
}

impl<'a> Exporter<'a> {
    pub fn new(kernel: &'a dyn GeometryKernel) -> Self {
        Self {
            kernel,
            progress: &LOG_SINK,
            blob_sink: None,
            cancel: CancelToken::new(),
            thumbnail: None,
            debug: false,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_blob_sink(mut self, sink: &'a dyn BlobSink) -> Self {
        self.blob_sink = Some(sink);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: Thumbnail) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    /// Report full error details to the user
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Export `scene` to the target chosen in `options`
    pub fn export(&self, scene: &Scene, options: &ExportOptions) -> ExportOutcome {
        tracing::info!("Exporting {} using {} kernel", scene.name(), self.kernel.name());
        match self.run(scene, options) {
            Ok((target, bytes)) => {
                tracing::info!("Export of {} finished", scene.name());
                ExportOutcome::Written { target, bytes }
            }
            Err(ExportError::Cancelled) => {
                tracing::info!("Export of {} cancelled", scene.name());
                ExportOutcome::Cancelled
            }
            Err(e) => {
                tracing::error!("Export of {} failed: {}", scene.name(), e);
                let message = if self.debug {
                    format!("Failed: {:?}", e)
                } else {
                    GENERIC_FAILURE.to_string()
                };
                self.progress.message("Export failed", &message);
                ExportOutcome::Failed { message }
            }
        }
    }

    fn run(&self, scene: &Scene, options: &ExportOptions) -> ExportResult<(ExportTarget, usize)> {
        let assembly = self.build_assembly(scene, options)?;
        if self.debug {
            let summary = ExportSummary::new(&assembly).to_string();
            tracing::debug!("{}", summary);
            self.progress.message("Export summary", &summary);
        }

        let bytes = mirabuf::encode(&assembly, options.compress_output)?;
        // Last chance to cancel before anything leaves the process
        if self.cancel.is_cancelled() {
            return Err(ExportError::Cancelled);
        }

        let target = match options.export_location {
            ExportLocation::Download => {
                let path = options.output_path(scene.name());
                write_file(&path, &bytes)?;
                ExportTarget::File(path)
            }
            ExportLocation::Upload => ExportTarget::Upload(self.upload(scene, options, &bytes)?),
        };
        Ok((target, bytes.len()))
    }

    fn upload(&self, scene: &Scene, options: &ExportOptions, bytes: &[u8]) -> ExportResult<String> {
        let project = scene
            .project()
            .filter(|p| p.valid)
            .ok_or(ExportError::InvalidProject)?;
        let sink = self.blob_sink.ok_or(ExportError::UploadUnavailable)?;
        let file_name = options.upload_name(scene.name());
        sink.upload(&project.id, &project.root_folder_id, &file_name, bytes)
            .ok_or(ExportError::UploadFailed { file_name })
    }

    /// Build the assembly record without writing it anywhere
    pub fn build_assembly(&self, scene: &Scene, options: &ExportOptions) -> ExportResult<Assembly> {
        let mut progress = ProgressTracker::new(self.cancel.clone(), self.progress);
        progress.start(
            scene.name(),
            scene.components().len(),
            scene.occurrences().len(),
            scene.appearances().len() + scene.materials().len(),
        );
        let mut ctx = ExportContext::new(scene, options, self.kernel, progress);

        let mut assembly = Assembly::default();
        assembly.fill(Some(scene.root_component()), Some(scene.name()));
        assembly.dynamic = options.export_mode == ExportMode::Robot;

        let data = &mut assembly.data;
        map_materials(&mut ctx, &mut data.materials)?;
        map_components(&mut ctx, &data.materials, &mut data.parts)?;
        let root = build_design_tree(&mut ctx, &data.materials, &mut data.parts)?;
        assembly.design_hierarchy.nodes.push(root);

        let data = &mut assembly.data;
        map_rigid_groups(&mut ctx, &mut data.joints)?;
        populate_joints(&mut ctx, &mut data.joints, &mut data.signals)?;
        assign_joint_parts(&mut ctx, &data.parts, &mut data.joints)?;
        assembly.joint_hierarchy = build_joint_hierarchy(options, &assembly.data.joints);

        apply_robot_weight(options, &mut assembly.data.parts);
        apply_gamepiece_weights(options, &mut assembly.data.parts);
        let data = &mut assembly.data;
        apply_gamepiece_friction(options, &mut data.materials, &mut data.parts);
        assembly.thumbnail = self.thumbnail.clone();

        ctx.progress.finish();
        tracing::debug!(
            "Built {} with {} ids issued",
            assembly.info.name,
            ctx.ids.len()
        );
        Ok(assembly)
    }
}
