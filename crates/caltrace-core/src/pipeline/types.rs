use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Analysis pipeline stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnalyzeStage {
    Indexing,
    Extracting,
    Normalizing,
    Assembling,
}

impl std::fmt::Display for AnalyzeStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indexing => write!(f, "Indexing cells"),
            Self::Extracting => write!(f, "Extracting intensities"),
            Self::Normalizing => write!(f, "Normalizing"),
            Self::Assembling => write!(f, "Assembling table"),
        }
    }
}

/// Thread-safe progress reporting for the analysis pipeline.
///
/// Implementors can use this to drive progress bars, logging, or any other
/// UI feedback. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items
    /// in this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: AnalyzeStage, _total_items: Option<usize>) {}

    /// Work items completed so far within the current stage.
    fn advance(&self, _items_done: usize) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter, used when `analyze` delegates.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Cooperative cancellation handle, checked at frame granularity.
///
/// Cancellation is best-effort: correctness never depends on it firing.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
