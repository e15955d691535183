use anyhow::{Context, Result};
use clap::Parser;
use cubemx_regen::cli::RootArgs;
use cubemx_regen::paths::ProjectPaths;
use cubemx_regen::{config, workflow};
use std::env;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = RootArgs::parse();
    let working_dir = match args.project_dir {
        Some(dir) => dir,
        None => env::current_dir().context("resolve current directory")?,
    };
    let paths = ProjectPaths::discover(&working_dir);
    tracing::debug!(
        root = %paths.root().display(),
        project = paths.project_name(),
        "resolved project layout"
    );

    // Config problems are the only fatal exit; everything past this point
    // is best-effort and only logs.
    let config = config::load_or_bootstrap(&paths.config_path())?;

    let options = workflow::GenerateOptions {
        headless: args.headless,
        timeout: Duration::from_secs(args.timeout),
    };
    workflow::run_generate(&paths, &config, &options);
    Ok(())
}
