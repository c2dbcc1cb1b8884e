mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use sitepack::config::Config;
use sitepack::observability;
use std::process::ExitCode;

fn main() -> Result<ExitCode, Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            let _ = dotenvy::dotenv();
            Config::load_from_path(path.clone())?
        }
        None => Config::load()?,
    };
    observability::init_tracing(&config.telemetry);

    match cli.command {
        Commands::List(args) => commands::list(&config, args),
        Commands::Verify(args) => commands::verify(&config, args),
        Commands::Queue(args) => commands::queue(&config, args),
        Commands::Job(args) => commands::job(&config, args),
        Commands::Config => commands::show_config(&config),
    }
}
