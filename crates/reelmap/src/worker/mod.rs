pub mod batch;
pub mod scheduler;

pub use batch::{BatchReport, BatchWorker};
pub use scheduler::{WorkerScheduler, WorkerTrigger};
