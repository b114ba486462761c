use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod common;
pub use common::*;

#[derive(Parser)]
#[command(
    name = "collate",
    version,
    about = "Ordered source bundler: concatenates curated file lists into single-file artifacts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the job and write every output target
    Build(BuildArgs),
    /// Validate the job file and probe every input for readability
    Check(CheckArgs),
    /// Write a starter job file
    Init(InitArgs),
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
    /// Job file describing manifests and targets
    #[arg(long, default_value = "collate.yaml")]
    pub job: PathBuf,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Override the target path (valid only when the job has exactly one target)
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Job file describing manifests and targets
    #[arg(long, default_value = "collate.yaml")]
    pub job: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Path of the job file to create
    #[arg(long, default_value = "collate.yaml")]
    pub job: PathBuf,

    /// Overwrite the job file if it already exists
    #[arg(long)]
    pub force: bool,
}
