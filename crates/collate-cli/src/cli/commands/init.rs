use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::cli::args::InitArgs;
use crate::exit_codes::SUCCESS;
use crate::templates;

pub fn run(args: InitArgs) -> anyhow::Result<i32> {
    if args.force {
        if let Some(parent) = args.job.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&args.job, templates::JOB_YAML)
            .with_context(|| format!("failed to write {}", args.job.display()))?;
        println!("Created {}", args.job.display());
    } else {
        write_file_if_missing(&args.job, templates::JOB_YAML)?;
    }
    Ok(SUCCESS)
}

fn write_file_if_missing(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    } else {
        println!("Skipped {} (exists)", path.display());
    }
    Ok(())
}
