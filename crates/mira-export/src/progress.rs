//! Progress reporting and cooperative cancellation
//!
//! The pipeline polls a [`CancelToken`] at loop boundaries and reports
//! counters to a [`ProgressSink`]. A UI thread can hold a clone of the token
//! and a [`SharedProgress`] handle while the export runs on a worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::error::{ExportError, ExportResult};

/// Lifecycle of one export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressState {
    #[default]
    Idle,
    Running,
    Cancelled,
    Completed,
}

impl ProgressState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressState::Cancelled | ProgressState::Completed)
    }
}

/// Cancellation flag shared between the export and its caller
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Snapshot of the counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub state: ProgressState,
    pub title: String,
    pub message: String,
    pub components: usize,
    pub total_components: usize,
    pub occurrences: usize,
    pub total_occurrences: usize,
    pub materials: usize,
    pub total_materials: usize,
    pub joints: usize,
}

impl ProgressUpdate {
    /// Fraction of occurrences visited, `0.0..=1.0`
    pub fn fraction(&self) -> f32 {
        if self.total_occurrences == 0 {
            return 0.0;
        }
        (self.occurrences as f32 / self.total_occurrences as f32).min(1.0)
    }
}

/// Receiver of progress updates and user-facing messages
pub trait ProgressSink {
    fn report(&self, update: &ProgressUpdate);

    /// Show a message to the user
    fn message(&self, title: &str, body: &str);
}

/// Reports through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn report(&self, update: &ProgressUpdate) {
        tracing::debug!(
            "{} [{:?}] components {}/{}, occurrences {}/{}, materials {}/{}",
            update.message,
            update.state,
            update.components,
            update.total_components,
            update.occurrences,
            update.total_occurrences,
            update.materials,
            update.total_materials
        );
    }

    fn message(&self, title: &str, body: &str) {
        tracing::info!("{}: {}", title, body);
    }
}

/// Latest update and messages, readable from another thread
#[derive(Debug, Default, Clone)]
pub struct SharedProgress {
    latest: Arc<Mutex<ProgressUpdate>>,
    messages: Arc<Mutex<Vec<(String, String)>>>,
}

impl SharedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest(&self) -> ProgressUpdate {
        self.latest.lock().clone()
    }

    /// Drain messages posted since the last call
    pub fn take_messages(&self) -> Vec<(String, String)> {
        std::mem::take(&mut *self.messages.lock())
    }
}

impl ProgressSink for SharedProgress {
    fn report(&self, update: &ProgressUpdate) {
        *self.latest.lock() = update.clone();
    }

    fn message(&self, title: &str, body: &str) {
        self.messages
            .lock()
            .push((title.to_string(), body.to_string()));
    }
}

/// Counters and state for one export run
pub struct ProgressTracker<'a> {
    update: ProgressUpdate,
    cancel: CancelToken,
    sink: &'a dyn ProgressSink,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(cancel: CancelToken, sink: &'a dyn ProgressSink) -> Self {
        Self {
            update: ProgressUpdate::default(),
            cancel,
            sink,
        }
    }

    pub fn state(&self) -> ProgressState {
        self.update.state
    }

    pub fn snapshot(&self) -> &ProgressUpdate {
        &self.update
    }

    /// Enter `Running` with the expected totals
    pub fn start(
        &mut self,
        title: impl Into<String>,
        components: usize,
        occurrences: usize,
        materials: usize,
    ) {
        if self.update.state != ProgressState::Idle {
            return;
        }
        self.update.state = ProgressState::Running;
        self.update.title = title.into();
        self.update.total_components = components;
        self.update.total_occurrences = occurrences;
        self.update.total_materials = materials;
        self.sink.report(&self.update);
    }

    /// Poll the cancel flag; moves to `Cancelled` the first time it is seen
    pub fn check(&mut self) -> ExportResult<()> {
        if self.update.state == ProgressState::Cancelled {
            return Err(ExportError::Cancelled);
        }
        if self.cancel.is_cancelled() && !self.update.state.is_terminal() {
            self.update.state = ProgressState::Cancelled;
            self.update.message = "Cancelled".to_string();
            self.sink.report(&self.update);
            return Err(ExportError::Cancelled);
        }
        Ok(())
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.update.message = message.into();
        self.sink.report(&self.update);
    }

    pub fn add_component(&mut self) {
        self.update.components += 1;
        self.sink.report(&self.update);
    }

    pub fn add_occurrence(&mut self) {
        self.update.occurrences += 1;
        self.sink.report(&self.update);
    }

    pub fn add_material(&mut self) {
        self.update.materials += 1;
    }

    pub fn add_joint(&mut self) {
        self.update.joints += 1;
        self.sink.report(&self.update);
    }

    /// Enter `Completed` unless already terminal
    pub fn finish(&mut self) {
        if self.update.state.is_terminal() {
            return;
        }
        self.update.state = ProgressState::Completed;
        self.update.message = "Done".to_string();
        self.sink.report(&self.update);
    }

    /// Forward a user-facing message to the sink
    pub fn notify(&self, title: &str, body: &str) {
        self.sink.message(title, body);
    }
}
