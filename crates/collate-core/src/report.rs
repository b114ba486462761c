//! Run report: what a successful run wrote, per target.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// Per-target summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetReport {
    /// Destination path as configured in the job.
    pub path: PathBuf,
    /// Number of input files concatenated into this target.
    pub files: usize,
    /// Total bytes written, separators included.
    pub bytes: u64,
    /// Digest of the written content, `sha256:<hex>`.
    pub digest: String,
}

/// Summary of a completed bundling run, serializable for machine consumers.
#[derive(Debug, Clone, Serialize)]
pub struct BundleReport {
    /// RFC 3339 timestamp taken when the run finished.
    pub created_at: String,
    pub targets: Vec<TargetReport>,
}

impl BundleReport {
    pub(crate) fn new(targets: Vec<TargetReport>) -> Self {
        Self {
            created_at: chrono::Utc::now().to_rfc3339(),
            targets,
        }
    }

    /// Looks up the entry for a target path.
    pub fn target(&self, path: &Path) -> Option<&TargetReport> {
        self.targets.iter().find(|t| t.path == path)
    }

    pub fn total_bytes(&self) -> u64 {
        self.targets.iter().map(|t| t.bytes).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
