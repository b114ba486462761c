//! The bundling engine.
//!
//! Execution model, in order:
//!
//! 1. Plan: derive the pass sequence from the per-target manifest lists.
//!    A pass is one read of a manifest fanned out to every target whose
//!    next undelivered manifest it is, so a manifest shared by several
//!    targets is read once.
//! 2. Truncate every target, before anything is written anywhere.
//!    Truncation is eager: a run that fails later leaves targets empty or
//!    partial rather than rolling back.
//! 3. Open every target for append and hold the handles for the whole run.
//! 4. Execute passes: copy each input line by line to every fed target,
//!    then write one blank separator line per file, unconditionally.
//!
//! The first input or output failure aborts the run.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{BundleError, BundleResult};
use crate::job::BundleJob;
use crate::report::{BundleReport, TargetReport};

/// One planned manifest read and the targets it feeds, in declaration order.
#[derive(Debug, PartialEq, Eq)]
struct Pass {
    manifest: usize,
    targets: Vec<usize>,
}

/// Derives the pass sequence for a job.
///
/// Greedy: repeatedly take the first unfinished target's next manifest and
/// feed every target whose cursor sits on the same manifest. Targets that
/// order shared manifests differently simply get separate reads; the bytes
/// written are identical either way.
fn plan_passes(job: &BundleJob) -> Vec<Pass> {
    let mut cursors = vec![0usize; job.targets().len()];
    let mut passes = Vec::new();
    loop {
        let lead = (0..cursors.len())
            .find(|&t| cursors[t] < job.targets()[t].manifest_ids().len());
        let Some(lead) = lead else { break };
        let manifest = job.targets()[lead].manifest_ids()[cursors[lead]];

        let mut fed = Vec::new();
        for (t, cursor) in cursors.iter_mut().enumerate() {
            let seq = job.targets()[t].manifest_ids();
            if *cursor < seq.len() && seq[*cursor] == manifest {
                fed.push(t);
                *cursor += 1;
            }
        }
        passes.push(Pass {
            manifest,
            targets: fed,
        });
    }
    passes
}

/// An append-mode target handle with running write statistics.
struct TargetWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    files: usize,
    bytes: u64,
    digest: Sha256,
}

impl TargetWriter {
    /// Opens an already-truncated target for appending.
    fn open_append(path: &Path) -> BundleResult<Self> {
        let file = OpenOptions::new()
            .append(true)
            .open(path)
            .map_err(|e| BundleError::output(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            files: 0,
            bytes: 0,
            digest: Sha256::new(),
        })
    }

    fn write_all(&mut self, buf: &[u8]) -> BundleResult<()> {
        self.writer
            .write_all(buf)
            .map_err(|e| BundleError::output(&self.path, e))?;
        self.digest.update(buf);
        self.bytes += buf.len() as u64;
        Ok(())
    }

    /// Flushes buffered output and folds the handle into its report entry.
    fn finish(mut self) -> BundleResult<TargetReport> {
        self.writer
            .flush()
            .map_err(|e| BundleError::output(&self.path, e))?;
        Ok(TargetReport {
            path: self.path,
            files: self.files,
            bytes: self.bytes,
            digest: format!("sha256:{}", hex::encode(self.digest.finalize())),
        })
    }
}

/// Creates or clears a target file, making parent directories as needed.
fn truncate_target(path: &Path) -> BundleResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| BundleError::output(path, e))?;
    }
    File::create(path).map_err(|e| BundleError::output(path, e))?;
    Ok(())
}

/// Copies one input file into every fed target, line by line.
///
/// Lines are normalized to `\n` endings (`\r\n` input is accepted; a final
/// line without a terminator still comes out terminated). After the last
/// line, one blank separator line goes to every fed target, even when the
/// input was empty.
fn copy_file(path: &Path, writers: &mut [TargetWriter], fed: &[usize]) -> BundleResult<()> {
    let file = File::open(path).map_err(|e| BundleError::input(path, e))?;
    let mut reader = BufReader::new(file);
    let mut line: Vec<u8> = Vec::new();
    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| BundleError::input(path, e))?;
        if read == 0 {
            break;
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        line.push(b'\n');
        for &t in fed {
            writers[t].write_all(&line)?;
        }
    }
    for &t in fed {
        writers[t].write_all(b"\n")?;
        writers[t].files += 1;
    }
    Ok(())
}

/// Executes one bundling run against a validated job.
///
/// On success every target's bytes equal the ordered concatenation of its
/// manifests' files, each file followed by one blank line. On failure the
/// run stops at the first error; targets stay in whatever truncated or
/// partial state the run left them in.
pub fn run(job: &BundleJob) -> BundleResult<BundleReport> {
    let passes = plan_passes(job);
    tracing::debug!(
        targets = job.targets().len(),
        passes = passes.len(),
        "starting bundle run"
    );

    // Truncate all targets first, then open append handles. Order matters:
    // nothing may be written before the last target is cleared.
    for target in job.targets() {
        truncate_target(target.path())?;
    }
    let mut writers = Vec::with_capacity(job.targets().len());
    for target in job.targets() {
        writers.push(TargetWriter::open_append(target.path())?);
    }

    for pass in &passes {
        let manifest = job.manifest(pass.manifest);
        tracing::debug!(
            manifest = %manifest.name(),
            fan_out = pass.targets.len(),
            "executing pass"
        );
        for file in manifest.files() {
            let path = job.input_path(file);
            copy_file(&path, &mut writers, &pass.targets)?;
        }
    }

    let mut targets = Vec::with_capacity(writers.len());
    for writer in writers {
        targets.push(writer.finish()?);
    }
    Ok(BundleReport::new(targets))
}

/// A failed input probe, one per unopenable file.
#[derive(Debug, Clone, Serialize)]
pub struct InputProbe {
    pub manifest: String,
    pub path: PathBuf,
    pub error: String,
}

/// Tries to open every input file named by the job's manifests, touching
/// no target. Unlike [`run`] this does not stop at the first failure; it
/// reports all of them.
pub fn probe_inputs(job: &BundleJob) -> Vec<InputProbe> {
    let mut failures = Vec::new();
    for manifest in job.manifests() {
        for file in manifest.files() {
            let path = job.input_path(file);
            if let Err(err) = File::open(&path) {
                failures.push(InputProbe {
                    manifest: manifest.name().to_string(),
                    path,
                    error: err.to_string(),
                });
            }
        }
    }
    failures
}
