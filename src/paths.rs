use std::fs;
use std::path::{Path, PathBuf};

/// Extension of the CubeMX project descriptor file.
pub const DESCRIPTOR_EXTENSION: &str = "ioc";

/// Project name used when the working folder is not inside a firmware tree.
pub const FALLBACK_PROJECT_NAME: &str = "cubemxgen";

/// File the automation script is written to before launching the tool.
pub const SCRIPT_FILE_NAME: &str = "StartupScript.txt";

/// Filesystem layout for a single run, resolved once and passed by reference.
///
/// `root` is the working folder holding `config.toml`, the descriptor, and
/// the `src`/`include` trees. The project name only affects naming (the
/// canonical descriptor and the generated project subdirectory).
#[derive(Debug, Clone)]
pub struct ProjectPaths {
    root: PathBuf,
    project_name: String,
}

impl ProjectPaths {
    pub fn new(root: PathBuf, project_name: String) -> Self {
        Self { root, project_name }
    }

    /// Resolve the layout from a starting directory.
    ///
    /// Firmware trees keep this tool under `<project>/lib/...`; when a `lib`
    /// ancestor exists the project name is the stem of its parent. Otherwise
    /// the fallback name is used. The working folder is always `start`.
    pub fn discover(start: &Path) -> Self {
        for ancestor in start.ancestors().skip(1) {
            if ancestor.file_name().is_some_and(|name| name == "lib") {
                if let Some(project_root) = ancestor.parent() {
                    let name = project_root
                        .file_stem()
                        .and_then(|stem| stem.to_str())
                        .unwrap_or(FALLBACK_PROJECT_NAME)
                        .to_string();
                    return Self::new(start.to_path_buf(), name);
                }
            }
        }
        Self::new(start.to_path_buf(), FALLBACK_PROJECT_NAME.to_string())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// Canonical descriptor location: `<working folder>/<project>.ioc`.
    pub fn descriptor_path(&self) -> PathBuf {
        self.root
            .join(format!("{}.{DESCRIPTOR_EXTENSION}", self.project_name))
    }

    pub fn temp_root(&self) -> PathBuf {
        self.root.join("temp")
    }

    /// Directory the tool writes its generated project into.
    pub fn generated_root(&self) -> PathBuf {
        self.temp_root().join(&self.project_name)
    }

    pub fn script_path(&self) -> PathBuf {
        self.root.join(SCRIPT_FILE_NAME)
    }

    pub fn backup_root(&self) -> PathBuf {
        self.root.join("backup")
    }

    /// Pick the descriptor for this run.
    ///
    /// The canonically named descriptor wins; otherwise the
    /// lexicographically first `*.ioc` in the working folder is used so the
    /// choice does not depend on directory enumeration order. An unreadable
    /// working folder counts as no descriptor.
    pub fn resolve_descriptor(&self) -> Option<PathBuf> {
        let canonical = self.descriptor_path();
        if canonical.is_file() {
            return Some(canonical);
        }

        let entries = fs::read_dir(&self.root).ok()?;
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext == DESCRIPTOR_EXTENSION)
            })
            .collect();
        candidates.sort();
        candidates.into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn discover_uses_lib_parent_stem() {
        let tree = TempDir::new().unwrap();
        let working = tree.path().join("blinky/lib/cubemx");
        fs::create_dir_all(&working).unwrap();

        let paths = ProjectPaths::discover(&working);
        assert_eq!(paths.project_name(), "blinky");
        assert_eq!(paths.root(), working.as_path());
    }

    #[test]
    fn discover_falls_back_without_lib_ancestor() {
        let tree = TempDir::new().unwrap();
        let paths = ProjectPaths::discover(tree.path());
        assert_eq!(paths.project_name(), FALLBACK_PROJECT_NAME);
    }

    #[test]
    fn canonical_descriptor_preferred() {
        let tree = TempDir::new().unwrap();
        let paths = ProjectPaths::new(tree.path().to_path_buf(), "proj".to_string());
        fs::write(tree.path().join("old.ioc"), "").unwrap();
        fs::write(tree.path().join("proj.ioc"), "").unwrap();

        assert_eq!(paths.resolve_descriptor(), Some(paths.descriptor_path()));
    }

    #[test]
    fn non_canonical_descriptors_resolve_lexicographically() {
        let tree = TempDir::new().unwrap();
        let paths = ProjectPaths::new(tree.path().to_path_buf(), "proj".to_string());
        fs::write(tree.path().join("zeta.ioc"), "").unwrap();
        fs::write(tree.path().join("alpha.ioc"), "").unwrap();
        fs::write(tree.path().join("notes.txt"), "").unwrap();

        assert_eq!(
            paths.resolve_descriptor(),
            Some(tree.path().join("alpha.ioc"))
        );
    }

    #[test]
    fn no_descriptor_resolves_to_none() {
        let tree = TempDir::new().unwrap();
        let paths = ProjectPaths::new(tree.path().to_path_buf(), "proj".to_string());
        assert_eq!(paths.resolve_descriptor(), None);
    }
}
