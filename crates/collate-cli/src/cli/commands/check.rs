use collate_core::{engine, BundleJob};

use crate::cli::args::{CheckArgs, OutputFormat};
use crate::exit_codes::{BUNDLE_FAILED, SUCCESS};

pub fn run(args: CheckArgs) -> anyhow::Result<i32> {
    let job = BundleJob::from_file(&args.job)?;
    let total: usize = job.manifests().iter().map(|m| m.files().len()).sum();
    let failures = engine::probe_inputs(&job);

    match args.format {
        OutputFormat::Json => {
            let payload = serde_json::json!({
                "job": args.job,
                "inputs": total,
                "unreadable": failures,
            });
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        OutputFormat::Text => {
            if failures.is_empty() {
                println!(
                    "ok: {total} inputs readable across {} manifests",
                    job.manifests().len()
                );
            } else {
                for failure in &failures {
                    eprintln!(
                        "unreadable: {} (manifest '{}'): {}",
                        failure.path.display(),
                        failure.manifest,
                        failure.error
                    );
                }
            }
        }
    }

    if failures.is_empty() {
        Ok(SUCCESS)
    } else {
        Ok(BUNDLE_FAILED)
    }
}
