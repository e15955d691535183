//! Generation workflow: plan commands, stage, drive, reconcile.
//!
//! Filesystem and process failures inside a run are logged and the run
//! continues: restore and cleanup always execute so a failed generation
//! does not strand the project in a half-staged state. Only configuration
//! problems abort, back in main.

use crate::config::Config;
use crate::driver::{self, DriveOutcome, DriveRequest};
use crate::paths::ProjectPaths;
use crate::script::{build_script, LoadCommand};
use crate::stager::{self, DIR_MAPPING};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct GenerateOptions {
    pub headless: bool,
    pub timeout: Duration,
}

/// Run one generation pass against the project.
pub fn run_generate(paths: &ProjectPaths, config: &Config, options: &GenerateOptions) {
    let install_dir = driver::locate_install(&config.cubemx_loc);

    let (load, save_to) = plan_commands(paths, config);
    if load.is_none() {
        tracing::warn!(
            "no descriptor found and no BOARDNAME configured, the tool has nothing to load"
        );
    }
    let script = build_script(
        load.as_ref(),
        save_to.as_deref(),
        paths.project_name(),
        &paths.temp_root(),
    );

    generate_and_reconcile(paths, install_dir.as_deref(), &script, options);
}

/// An existing descriptor wins; otherwise a configured board seeds a fresh
/// descriptor that is persisted to the canonical path after generation.
fn plan_commands(paths: &ProjectPaths, config: &Config) -> (Option<LoadCommand>, Option<PathBuf>) {
    if let Some(descriptor) = paths.resolve_descriptor() {
        tracing::info!(descriptor = %descriptor.display(), "loading existing descriptor");
        return (Some(LoadCommand::Descriptor(descriptor)), None);
    }
    let board = config.board_name.trim();
    if !board.is_empty() {
        tracing::info!(board, "no descriptor, loading board template");
        return (
            Some(LoadCommand::Board(board.to_string())),
            Some(paths.descriptor_path()),
        );
    }
    (None, None)
}

fn generate_and_reconcile(
    paths: &ProjectPaths,
    install_dir: Option<&Path>,
    script: &str,
    options: &GenerateOptions,
) {
    let temp_root = paths.temp_root();
    let generated_root = paths.generated_root();
    let script_path = paths.script_path();

    snapshot_to_backup(paths);

    if let Err(err) = stager::create_temp_root(&temp_root) {
        tracing::warn!(%err, "create temp folder");
    }

    for (name, generated) in DIR_MAPPING {
        let from = paths.root().join(name);
        let to = generated_root.join(generated);
        if let Err(err) = stager::move_dir(&from, &to) {
            tracing::warn!(directory = name, %err, "stage directory");
        }
    }

    let request = DriveRequest {
        install_dir,
        script: Some(script),
        script_path: &script_path,
        headless: options.headless,
        timeout: options.timeout,
    };
    match driver::run_tool(&request) {
        Ok(DriveOutcome::Completed) => tracing::info!("generation finished"),
        Ok(DriveOutcome::Failed) => {
            tracing::error!("tool reported an error, generated output may be incomplete");
        }
        Ok(DriveOutcome::TimedOut) => {
            tracing::error!("tool did not finish before the deadline and was terminated");
        }
        Err(err) => tracing::error!(%err, "tool launch failed"),
    }

    // Restore runs even after a failed launch; each move is independent and
    // skips a missing source, and the backup snapshot covers the rest.
    for (name, generated) in DIR_MAPPING {
        let from = generated_root.join(generated);
        let to = paths.root().join(name);
        if let Err(err) = stager::move_dir(&from, &to) {
            tracing::warn!(directory = name, %err, "restore directory");
        }
    }

    if let Err(err) = stager::remove_temp_root(&temp_root) {
        tracing::warn!(%err, "remove temp folder");
    }
}

/// Snapshot the mapped trees before touching them so a restore from an
/// empty generated tree stays recoverable.
fn snapshot_to_backup(paths: &ProjectPaths) {
    let backup_root = paths.backup_root();
    if let Err(err) = stager::create_backup_root(&backup_root) {
        tracing::warn!(%err, "create backup folder");
        return;
    }
    for (name, _) in DIR_MAPPING {
        let source = paths.root().join(name);
        if !source.exists() {
            continue;
        }
        if let Err(err) = stager::snapshot_dir(&source, &backup_root.join(name)) {
            tracing::warn!(directory = name, %err, "backup directory");
        }
    }
}
