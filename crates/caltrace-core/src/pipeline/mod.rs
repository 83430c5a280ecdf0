pub mod config;
pub mod orchestrator;
pub mod types;

pub use config::AnalyzeConfig;
pub use orchestrator::{analyze, analyze_reported};
pub use types::{AnalyzeStage, CancelToken, NoOpReporter, ProgressReporter};
