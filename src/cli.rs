//! CLI argument parsing.
//!
//! The CLI is intentionally thin: everything of substance lives behind
//! `workflow::run_generate` so it can be exercised without a terminal.

use clap::Parser;
use std::path::PathBuf;

/// Default seconds to wait for the tool before terminating it.
pub const DEFAULT_TIMEOUT_SECS: u64 = 600;

#[derive(Parser, Debug)]
#[command(
    name = "mxgen",
    version,
    about = "Regenerates STM32CubeMX project sources in place",
    after_help = "Reads config.toml from the project working folder; a missing or blank\nconfig is replaced with a commented template and the run aborts.\n\nExamples:\n  mxgen\n  mxgen --project-dir lib/cubemx --headless"
)]
pub struct RootArgs {
    /// Project working directory holding config.toml and the descriptor
    /// (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Launch the tool in quiet mode (-q) instead of scripted-interactive (-s)
    #[arg(long)]
    pub headless: bool,

    /// Seconds to wait for the tool before terminating it
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,
}
