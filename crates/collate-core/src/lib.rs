pub mod engine;
pub mod error;
pub mod job;
pub mod report;

// Convenience re-exports
pub use engine::{probe_inputs, run, InputProbe};
pub use error::{BundleError, BundleResult, ConfigError};
pub use job::{BundleJob, JobBuilder, Manifest, OutputTarget, JOB_FILE_VERSION};
pub use report::{BundleReport, TargetReport};
