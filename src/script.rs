//! Automation-script construction for the tool's batch mode.
//!
//! Pure text assembly: the same inputs always produce the same bytes.

use std::path::{Path, PathBuf};

/// Toolchain the generated project is configured for.
pub const TOOLCHAIN: &str = "Makefile";

/// How the tool seeds the project before generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadCommand {
    /// Load an existing descriptor file.
    Descriptor(PathBuf),
    /// Start from a board template.
    Board(String),
}

impl LoadCommand {
    fn render(&self) -> String {
        match self {
            LoadCommand::Descriptor(path) => format!("config load \"{}\"", path.display()),
            LoadCommand::Board(name) => format!("loadboard {name} allmodes"),
        }
    }
}

/// Build the newline-delimited command script.
///
/// `save_to` persists the descriptor after generation; it is only set when
/// the project was seeded from a board template. With neither a load command
/// nor a save target the degenerate project-only script is produced.
pub fn build_script(
    load: Option<&LoadCommand>,
    save_to: Option<&Path>,
    project_name: &str,
    temp_root: &Path,
) -> String {
    let mut lines = Vec::new();
    if let Some(load) = load {
        lines.push(load.render());
    }
    lines.push("SetStructure Basic".to_string());
    lines.push("SetCopyLibrary \"copy as reference\"".to_string());
    lines.push(format!("project name {project_name}"));
    lines.push(format!("project path \"{}\"", temp_root.display()));
    lines.push(format!("project toolchain {TOOLCHAIN}"));
    lines.push("project couplefilesbyip 1".to_string());
    if let Some(save_to) = save_to {
        lines.push(format!("config saveext \"{}\"", save_to.display()));
    }

    let mut script = lines.join("\n");
    script.push('\n');
    normalize_drive_prefix(&script)
}

// The tool rejects lowercase drive letters in quoted Windows paths.
fn normalize_drive_prefix(script: &str) -> String {
    script.replace("c:\\", "C:\\")
}
