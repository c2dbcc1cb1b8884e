use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitepack")]
#[command(about = "Inspect, verify and queue site export packages", long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to $SITEPACK_CONFIG or config/sitepack.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the packages available for import
    List(ListArgs),
    /// Verify a package and print its import summary
    Verify(VerifyArgs),
    /// Queue an import job for a package
    Queue(QueueArgs),
    /// Show a queued job
    Job(JobArgs),
    /// Print the effective configuration
    Config,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    /// Package folder name under the export root
    pub package_id: String,

    /// Only check that the data store opens
    #[arg(long)]
    pub no_summary: bool,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(clap::Args, Debug)]
pub struct QueueArgs {
    /// Package folder name under the export root
    pub package_id: String,

    /// User requesting the import
    #[arg(long, default_value_t = 0)]
    pub user: i32,

    /// Target portal
    #[arg(long, default_value_t = 0)]
    pub portal: i32,

    /// Overwrite existing content instead of ignoring collisions
    #[arg(long)]
    pub overwrite: bool,

    /// Ask the scheduler to run the job immediately
    #[arg(long)]
    pub run_now: bool,
}

#[derive(clap::Args, Debug)]
pub struct JobArgs {
    pub job_id: u64,
}
