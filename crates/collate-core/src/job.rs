//! Job model: manifests, output targets and the immutable [`BundleJob`].
//!
//! A job is built once, validated, and never mutated afterwards. Manifests
//! are plain data: an ordered list of input paths under a common base
//! directory. Targets reference manifests by name; validation resolves the
//! names so the engine never deals with dangling references.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Job file schema version accepted by this build.
pub const JOB_FILE_VERSION: u32 = 1;

/// A named, ordered sequence of input file paths.
///
/// Order is load-bearing: files are concatenated exactly as listed
/// (license headers and base definitions go first because the operator put
/// them first). Entries are not deduplicated; listing a file twice bundles
/// it twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    name: String,
    files: Vec<PathBuf>,
}

impl Manifest {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

/// A destination file plus the manifests that stream into it, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    path: PathBuf,
    manifests: Vec<usize>,
}

impl OutputTarget {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Manifest ids in declaration order, resolvable via [`BundleJob::manifest`].
    pub fn manifest_ids(&self) -> &[usize] {
        &self.manifests
    }
}

/// The complete, validated configuration for one bundling run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleJob {
    base_dir: PathBuf,
    manifests: Vec<Manifest>,
    targets: Vec<OutputTarget>,
}

impl BundleJob {
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }

    /// Loads and validates a job from a YAML file on disk.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parses and validates a job from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let file: JobFile = serde_yaml::from_str(content)?;
        if file.version != JOB_FILE_VERSION {
            return Err(ConfigError::Version {
                found: file.version,
                expected: JOB_FILE_VERSION,
            });
        }

        let mut builder = Self::builder().base_dir(file.base_dir);
        for (name, files) in file.manifests {
            builder = builder.manifest(name, files);
        }
        for entry in file.targets {
            builder = builder.target(entry.path, entry.manifests);
        }
        builder.build()
    }

    /// Base directory input paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn manifests(&self) -> &[Manifest] {
        &self.manifests
    }

    /// Resolves a manifest id produced by validation.
    pub fn manifest(&self, id: usize) -> &Manifest {
        &self.manifests[id]
    }

    /// Targets in declaration order. Declaration order decides write order
    /// when one manifest fans out to several targets.
    pub fn targets(&self) -> &[OutputTarget] {
        &self.targets
    }

    /// Resolves an input path against the job's base directory.
    pub fn input_path(&self, file: &Path) -> PathBuf {
        if self.base_dir.as_os_str() == "." {
            file.to_path_buf()
        } else {
            self.base_dir.join(file)
        }
    }

    /// Returns a copy of the job with its single target redirected to `path`.
    ///
    /// Errors unless the job declares exactly one target; jobs with several
    /// targets have no meaningful single override.
    pub fn redirect_target(&self, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        if self.targets.len() != 1 {
            return Err(ConfigError::Override {
                targets: self.targets.len(),
            });
        }
        let mut job = self.clone();
        job.targets[0].path = path.into();
        Ok(job)
    }
}

/// Builder for [`BundleJob`], used by embedders and tests.
///
/// Validation happens in [`build`](JobBuilder::build): duplicate manifest
/// names, unknown manifest references and duplicate target paths are
/// rejected there, mirroring the job file loader.
#[derive(Debug, Default)]
pub struct JobBuilder {
    base_dir: Option<PathBuf>,
    manifests: Vec<Manifest>,
    targets: Vec<(PathBuf, Vec<String>)>,
}

impl JobBuilder {
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn manifest(
        mut self,
        name: impl Into<String>,
        files: impl IntoIterator<Item = impl Into<PathBuf>>,
    ) -> Self {
        self.manifests.push(Manifest {
            name: name.into(),
            files: files.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn target(
        mut self,
        path: impl Into<PathBuf>,
        manifests: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.targets
            .push((path.into(), manifests.into_iter().map(Into::into).collect()));
        self
    }

    pub fn build(self) -> Result<BundleJob, ConfigError> {
        let mut ids: BTreeMap<String, usize> = BTreeMap::new();
        for (id, manifest) in self.manifests.iter().enumerate() {
            if ids.insert(manifest.name.clone(), id).is_some() {
                return Err(ConfigError::DuplicateManifest {
                    name: manifest.name.clone(),
                });
            }
        }

        let mut seen_paths: BTreeSet<PathBuf> = BTreeSet::new();
        let mut targets = Vec::with_capacity(self.targets.len());
        for (path, names) in self.targets {
            if !seen_paths.insert(path.clone()) {
                return Err(ConfigError::DuplicateTarget { path });
            }
            let mut resolved = Vec::with_capacity(names.len());
            for name in names {
                match ids.get(&name) {
                    Some(&id) => resolved.push(id),
                    None => return Err(ConfigError::UnknownManifest { path, name }),
                }
            }
            targets.push(OutputTarget {
                path,
                manifests: resolved,
            });
        }

        Ok(BundleJob {
            base_dir: self.base_dir.unwrap_or_else(|| PathBuf::from(".")),
            manifests: self.manifests,
            targets,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct JobFile {
    version: u32,
    #[serde(default = "default_base_dir")]
    base_dir: PathBuf,
    #[serde(default)]
    manifests: BTreeMap<String, Vec<PathBuf>>,
    #[serde(default)]
    targets: Vec<TargetEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TargetEntry {
    path: PathBuf,
    manifests: Vec<String>,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}
