use std::error::Error as _;
use std::fs;

use anyhow::Context;
use collate_core::{engine, BundleJob};

use crate::cli::args::BuildArgs;
use crate::exit_codes::{BUNDLE_FAILED, SUCCESS};

pub fn run(args: BuildArgs) -> anyhow::Result<i32> {
    let job = BundleJob::from_file(&args.job)?;
    tracing::debug!(job = %args.job.display(), targets = job.targets().len(), "job loaded");
    let job = match args.output {
        Some(output) => job.redirect_target(output)?,
        None => job,
    };

    let report = match engine::run(&job) {
        Ok(report) => report,
        Err(err) => {
            // One diagnostic line, then the contract exit code.
            match err.source() {
                Some(cause) => eprintln!("error: {err}: {cause}"),
                None => eprintln!("error: {err}"),
            }
            return Ok(BUNDLE_FAILED);
        }
    };

    for target in &report.targets {
        eprintln!(
            "wrote {} ({} files, {} bytes)",
            target.path.display(),
            target.files,
            target.bytes
        );
    }

    if let Some(report_path) = args.report {
        let json = report.to_json().context("failed to serialize run report")?;
        fs::write(&report_path, json)
            .with_context(|| format!("failed to write report: {}", report_path.display()))?;
    }

    Ok(SUCCESS)
}
