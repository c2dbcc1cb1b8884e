use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

use sitepack::config::Config;
use sitepack::controller::ImportController;
use sitepack::observability::Metrics;
use sitepack::queue::{CollisionResolution, FjallJobQueue, ImportRequest};

use crate::cli::{JobArgs, ListArgs, QueueArgs, VerifyArgs};

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

fn open_queue(config: &Config) -> Result<Arc<FjallJobQueue>, AnyError> {
    Ok(Arc::new(FjallJobQueue::open(&config.queue.path)?))
}

fn controller(config: &Config) -> Result<ImportController, AnyError> {
    Ok(ImportController::from_config(config, Arc::new(Metrics::new()))?)
}

pub fn list(config: &Config, args: ListArgs) -> Result<ExitCode, AnyError> {
    let controller = controller(config)?;
    let packages = controller.list_packages()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
    } else if packages.is_empty() {
        println!("No packages under {}", controller.export_root().display());
    } else {
        for package in &packages {
            println!("{}\t{}\t{}", package.package_id, package.name, package.description);
        }
    }

    Ok(ExitCode::SUCCESS)
}

pub fn verify(config: &Config, args: VerifyArgs) -> Result<ExitCode, AnyError> {
    let controller = controller(config)?;
    let verification = controller.verify_package(&args.package_id, !args.no_summary);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verification)?);
    } else if verification.is_valid {
        println!("{}: valid", args.package_id);
        if let Some(summary) = &verification.summary {
            for item in &summary.summary_items {
                let marker = if item.show_item { "*" } else { " " };
                println!("  {marker} {:<20} {}", item.category, item.total_items);
            }
            println!("  include deletions:          {}", summary.include_deletions);
            println!("  include profile properties: {}", summary.include_profile_properties);
        }
    } else if verification.error_message.is_empty() {
        println!("{}: not an import package", args.package_id);
    } else {
        println!("{}: {}", args.package_id, verification.error_message);
    }

    Ok(if verification.is_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn queue(config: &Config, args: QueueArgs) -> Result<ExitCode, AnyError> {
    let queue = open_queue(config)?;
    let controller = controller(config)?.with_queue(queue.clone());

    let request = ImportRequest {
        portal_id: args.portal,
        package_id: args.package_id,
        collision_resolution: if args.overwrite {
            CollisionResolution::Overwrite
        } else {
            CollisionResolution::Ignore
        },
        run_now: args.run_now,
    };
    let job_id = controller.queue_operation(args.user, &request)?;
    queue.flush()?;

    info!(job_id, package_id = %request.package_id, "Import queued");
    println!("{job_id}");
    Ok(ExitCode::SUCCESS)
}

pub fn job(config: &Config, args: JobArgs) -> Result<ExitCode, AnyError> {
    let queue = open_queue(config)?;
    match queue.get_job(args.job_id)? {
        Some(job) => {
            println!("{}", serde_json::to_string_pretty(&job)?);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("Job {} not found", args.job_id);
            Ok(ExitCode::FAILURE)
        }
    }
}

pub fn show_config(config: &Config) -> Result<ExitCode, AnyError> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(ExitCode::SUCCESS)
}
