//! Error types for job loading and bundling runs.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for bundling runs.
pub type BundleResult<T> = Result<T, BundleError>;

/// Errors that abort a bundling run.
///
/// All input failures collapse into one kind: a missing file, a permission
/// error and a mid-read failure are handled identically (abort the run,
/// leave already-truncated targets as they are). Output failures get the
/// same treatment.
#[derive(Debug, Error)]
pub enum BundleError {
    /// An input file named in a manifest could not be opened or read.
    #[error("failed to open input file {}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An output target could not be created, truncated, written or flushed.
    #[error("failed to write output target {}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl BundleError {
    pub(crate) fn input(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Input {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn output(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the failure was on the input side.
    pub fn is_input(&self) -> bool {
        matches!(self, Self::Input { .. })
    }

    /// Path of the file involved in the failure.
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Input { path, .. } | Self::Output { path, .. } => path,
        }
    }
}

/// Errors raised while loading or validating a [`BundleJob`].
///
/// [`BundleJob`]: crate::job::BundleJob
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The job file could not be read.
    #[error("failed to read job file {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The job file is not valid YAML or does not match the schema.
    #[error("invalid job file: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The job file declares a schema version this build does not support.
    #[error("unsupported job file version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    /// A manifest name was declared twice.
    #[error("manifest '{name}' declared more than once")]
    DuplicateManifest { name: String },

    /// A target references a manifest that was never declared.
    #[error("target {} references unknown manifest '{name}'", .path.display())]
    UnknownManifest { path: PathBuf, name: String },

    /// Two targets share one destination path.
    #[error("target {} declared more than once", .path.display())]
    DuplicateTarget { path: PathBuf },

    /// The output override only applies to single-target jobs.
    #[error("cannot override output path: job declares {targets} targets")]
    Override { targets: usize },
}
