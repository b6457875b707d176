//! CLI probe for the local material store.
//!
//! # Responsibility
//! - Open the shared database from the environment and report its state.
//! - Keep output deterministic for quick local sanity checks.

use sitestock_core::{
    core_version, default_log_level, init_logging, shared_repository, DatabaseConfig,
};
use log::{error, info};
use std::process::ExitCode;

const LOG_DIR_ENV: &str = "SITESTOCK_LOG_DIR";

#[tokio::main]
async fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var(LOG_DIR_ENV) {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("sitestock logging disabled: {err}");
        }
    }

    println!("sitestock_core version={}", core_version());

    let config = DatabaseConfig::from_env();
    let repo = match shared_repository(&config) {
        Ok(repo) => repo,
        Err(err) => {
            error!(
                "event=cli_probe module=cli status=error stage=open location={} error={err}",
                config.location
            );
            eprintln!("sitestock open failed location={} error={err}", config.location);
            return ExitCode::FAILURE;
        }
    };

    match repo.database().schema_version().await {
        Ok(version) => println!("sitestock schema_version={version}"),
        Err(err) => {
            error!("event=cli_probe module=cli status=error stage=schema error={err}");
            eprintln!("sitestock schema check failed error={err}");
            return ExitCode::FAILURE;
        }
    }

    let projects = match repo.observe_projects().next().await {
        Some(Ok(projects)) => projects,
        Some(Err(err)) => {
            error!("event=cli_probe module=cli status=error stage=projects error={err}");
            eprintln!("sitestock project query failed error={err}");
            return ExitCode::FAILURE;
        }
        None => Vec::new(),
    };
    println!("sitestock projects={}", projects.len());

    for project in &projects {
        match repo.materials_by_project(&project.id).await {
            Ok(materials) => {
                let purchased = materials.iter().filter(|m| m.is_purchased).count();
                println!(
                    "project id={} name={:?} materials={} purchased={}",
                    project.id,
                    project.name,
                    materials.len(),
                    purchased
                );
            }
            Err(err) => {
                error!(
                    "event=cli_probe module=cli status=error stage=materials project_id={} error={err}",
                    project.id
                );
                eprintln!("sitestock material query failed project_id={} error={err}", project.id);
                return ExitCode::FAILURE;
            }
        }
    }

    info!(
        "event=cli_probe module=cli status=ok projects={}",
        projects.len()
    );
    ExitCode::SUCCESS
}
