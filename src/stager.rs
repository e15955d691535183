use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory pairs staged between the project tree and the generated tree:
/// (name in the project, name the tool uses inside its generated project).
/// The same pairs move directories out before generation and back after.
pub const DIR_MAPPING: [(&str, &str); 2] = [("src", "Src"), ("include", "Inc")];

#[derive(Debug, Error)]
pub enum StageError {
    #[error("temp workspace {path} already exists, not cleaned up?")]
    TempExists { path: PathBuf },
    #[error("source {path} does not exist")]
    MissingSource { path: PathBuf },
    #[error("create {path}: {source}")]
    Create { path: PathBuf, source: io::Error },
    #[error("remove {path}: {source}")]
    Remove { path: PathBuf, source: io::Error },
    #[error("move {from} -> {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
    #[error("copy {from} -> {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Create the temporary workspace root. A leftover root from a previous run
/// is reported, not reused silently; the caller decides to continue.
pub fn create_temp_root(path: &Path) -> Result<(), StageError> {
    if path.exists() {
        return Err(StageError::TempExists {
            path: path.to_path_buf(),
        });
    }
    fs::create_dir_all(path).map_err(|source| StageError::Create {
        path: path.to_path_buf(),
        source,
    })
}

/// Idempotent: pre-existence is not an error.
pub fn create_backup_root(path: &Path) -> Result<(), StageError> {
    fs::create_dir_all(path).map_err(|source| StageError::Create {
        path: path.to_path_buf(),
        source,
    })
}

pub fn remove_temp_root(path: &Path) -> Result<(), StageError> {
    fs::remove_dir_all(path).map_err(|source| StageError::Remove {
        path: path.to_path_buf(),
        source,
    })
}

/// Relocate a directory tree, creating the destination's parent as needed.
pub fn move_dir(from: &Path, to: &Path) -> Result<(), StageError> {
    if !from.exists() {
        return Err(StageError::MissingSource {
            path: from.to_path_buf(),
        });
    }
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|source| StageError::Create {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    fs::rename(from, to).map_err(|source| StageError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })
}

/// Replace `to` with a recursive copy of `from`. Used for pre-run backups;
/// the source tree is left untouched.
pub fn snapshot_dir(from: &Path, to: &Path) -> Result<(), StageError> {
    if !from.exists() {
        return Err(StageError::MissingSource {
            path: from.to_path_buf(),
        });
    }
    if to.exists() {
        fs::remove_dir_all(to).map_err(|source| StageError::Remove {
            path: to.to_path_buf(),
            source,
        })?;
    }
    copy_dir_recursive(from, to)
}

fn copy_dir_recursive(from: &Path, to: &Path) -> Result<(), StageError> {
    fs::create_dir_all(to).map_err(|source| StageError::Create {
        path: to.to_path_buf(),
        source,
    })?;
    let entries = fs::read_dir(from).map_err(|source| StageError::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| StageError::Copy {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })?;
        let source_path = entry.path();
        let dest_path = to.join(entry.file_name());
        if source_path.is_dir() {
            copy_dir_recursive(&source_path, &dest_path)?;
        } else {
            fs::copy(&source_path, &dest_path).map_err(|source| StageError::Copy {
                from: source_path.clone(),
                to: dest_path.clone(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn leftover_temp_root_is_reported() {
        let tree = TempDir::new().unwrap();
        let temp = tree.path().join("temp");
        fs::create_dir(&temp).unwrap();

        let err = create_temp_root(&temp).unwrap_err();
        assert!(matches!(err, StageError::TempExists { .. }));
    }

    #[test]
    fn backup_root_creation_is_idempotent() {
        let tree = TempDir::new().unwrap();
        let backup = tree.path().join("backup");
        create_backup_root(&backup).unwrap();
        create_backup_root(&backup).unwrap();
        assert!(backup.is_dir());
    }

    #[test]
    fn move_dir_creates_destination_parent() {
        let tree = TempDir::new().unwrap();
        let from = tree.path().join("src");
        fs::create_dir(&from).unwrap();
        fs::write(from.join("main.c"), "int main(void) { return 0; }").unwrap();

        let to = tree.path().join("temp/proj/Src");
        move_dir(&from, &to).unwrap();

        assert!(!from.exists());
        assert!(to.join("main.c").is_file());
    }

    #[test]
    fn move_dir_reports_missing_source() {
        let tree = TempDir::new().unwrap();
        let err = move_dir(&tree.path().join("absent"), &tree.path().join("dest")).unwrap_err();
        assert!(matches!(err, StageError::MissingSource { .. }));
    }

    #[test]
    fn snapshot_replaces_previous_copy() {
        let tree = TempDir::new().unwrap();
        let src = tree.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("nested/a.c"), "a").unwrap();

        let backup = tree.path().join("backup/src");
        snapshot_dir(&src, &backup).unwrap();
        assert!(backup.join("nested/a.c").is_file());

        // A second snapshot replaces the first wholesale.
        fs::remove_file(src.join("nested/a.c")).unwrap();
        fs::write(src.join("nested/b.c"), "b").unwrap();
        snapshot_dir(&src, &backup).unwrap();
        assert!(!backup.join("nested/a.c").exists());
        assert!(backup.join("nested/b.c").is_file());
        // Source is untouched by snapshotting.
        assert!(src.join("nested/b.c").is_file());
    }
}
