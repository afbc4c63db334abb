#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

pub mod cli;
pub mod commands;
pub mod document;
pub mod dom;
pub mod error;
pub mod helpers;
pub mod models;
pub mod output;
pub mod settings;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::artifact::ArtifactRequest;
use commands::task::FetchRequest;
use document::Document;
use output::Output;
use settings::{ServerVersion, Settings};

pub use dom::Element;
pub use error::Error;

/// Installs the stderr log subscriber. `RUST_LOG` wins when set; otherwise
/// `verbose` selects debug over warn.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Ignore a second installation, e.g. when run() is driven from tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn target_version(flag: Option<&str>) -> Result<ServerVersion> {
    Settings::load()?.server_version(flag)
}

pub fn run(cli: Cli) -> Result<()> {
    let flag = cli.server_version.as_deref();

    match cli.command {
        Commands::List { file, json } => {
            let document = Document::open(&file)?;
            let listing = commands::list::run(&document)?;
            Output::new(json).listing(&listing)
        }
        Commands::AddExec {
            file,
            working_dir,
            runif,
            json,
            command,
        } => {
            let mut document = Document::open(&file)?;
            let task = commands::task::add_exec(command, working_dir, runif, &mut document)?;
            Output::new(json).task_added(&task)
        }
        Commands::AddRake {
            file,
            target,
            runif,
            json,
        } => {
            let mut document = Document::open(&file)?;
            let task = commands::task::add_rake(target, runif, &mut document)?;
            Output::new(json).task_added(&task)
        }
        Commands::AddFetch {
            file,
            pipeline,
            stage,
            job,
            source,
            config,
            dest,
            origin,
            runif,
            json,
        } => {
            let mut document = Document::open(&file)?;
            let request =
                FetchRequest::new(pipeline, stage, job, source, config, dest, origin, runif);
            let task = commands::task::add_fetch(request, &mut document)?;
            Output::new(json).task_added(&task)
        }
        Commands::AddArtifact {
            file,
            source,
            dest,
            test,
            store_id,
            config,
            json,
        } => {
            let version = target_version(flag)?;
            let mut document = Document::open(&file)?;
            let request = ArtifactRequest::new(source, dest, test, store_id, config);
            let artifact = commands::artifact::add(request, version, &mut document)?;
            Output::new(json).artifact_added(&artifact, version)
        }
        Commands::Convert { file, json } => {
            let version = target_version(flag)?;
            let mut document = Document::open(&file)?;
            let artifacts = commands::convert::run(version, &mut document)?;
            Output::new(json).converted(&artifacts, version)
        }
    }
}
