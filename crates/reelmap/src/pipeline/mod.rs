pub mod error;
pub mod progress;
pub mod runner;
pub mod status;

pub use error::PipelineError;
pub use progress::{BroadcastProgress, NoopProgress, PipelineStep, ProgressEvent, ProgressReporter};
pub use runner::{Pipeline, SourceOutcome};
pub use status::SourceStatus;
