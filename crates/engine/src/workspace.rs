//! Materialization of the pipeline working directory.
//!
//! The source tree is copied into the working directory with deny-listed
//! entries pruned at every depth. Symbolic links are recreated as links and
//! never followed. Existing directories in the destination are reused and
//! existing files overwritten.

use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};
use walkdir::{DirEntry, WalkDir};

use crate::LaunchError;

/// Counts of what a materialization wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MaterializeSummary {
    pub directories: usize,
    pub files: usize,
    pub symlinks: usize,
    /// Entries skipped because their name is deny-listed.
    pub pruned: usize,
}

/// Copy `source` into `destination`, skipping entries named in `excluded`.
///
/// # Errors
///
/// Returns [`LaunchError::Workspace`] naming the path that failed. A missing
/// source root is an error.
pub fn materialize_workspace(source: &Path, destination: &Path, excluded: &[String]) -> Result<MaterializeSummary, LaunchError> {
    if !source.is_dir() {
        return Err(LaunchError::workspace(
            source,
            io::Error::new(io::ErrorKind::NotFound, "source root is not a directory"),
        ));
    }
    let mut summary = MaterializeSummary::default();
    fs::create_dir_all(destination).map_err(|error| LaunchError::workspace(destination, error))?;

    let walker = WalkDir::new(source)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            let keep = !is_excluded(entry, excluded) && entry.path() != destination;
            if !keep {
                debug!(path = %entry.path().display(), "pruned from working directory");
                summary.pruned += 1;
            }
            keep
        });

    let mut entries = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|error| {
            let path = error.path().unwrap_or(source).to_path_buf();
            LaunchError::workspace(&path, io::Error::from(error))
        })?;
        entries.push(entry);
    }

    for entry in entries {
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|error| LaunchError::workspace(entry.path(), io::Error::other(error)))?;
        let target = destination.join(relative);
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
            summary.symlinks += 1;
        } else if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|error| LaunchError::workspace(&target, error))?;
            summary.directories += 1;
        } else {
            remove_link(&target)?;
            fs::copy(entry.path(), &target).map_err(|error| LaunchError::workspace(entry.path(), error))?;
            summary.files += 1;
        }
    }

    info!(
        source = %source.display(),
        destination = %destination.display(),
        files = summary.files,
        directories = summary.directories,
        symlinks = summary.symlinks,
        pruned = summary.pruned,
        "materialized working directory"
    );
    Ok(summary)
}

fn is_excluded(entry: &DirEntry, excluded: &[String]) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excluded.iter().any(|denied| denied == name))
}

/// Remove `target` when it is a symbolic link so that a copy never writes
/// through it.
fn remove_link(target: &Path) -> Result<(), LaunchError> {
    match fs::symlink_metadata(target) {
        Ok(metadata) if metadata.file_type().is_symlink() => {
            fs::remove_file(target).map_err(|error| LaunchError::workspace(target, error))
        }
        _ => Ok(()),
    }
}

fn copy_symlink(link: &Path, target: &Path) -> Result<(), LaunchError> {
    let pointee = fs::read_link(link).map_err(|error| LaunchError::workspace(link, error))?;
    match fs::symlink_metadata(target) {
        Ok(metadata) if metadata.is_dir() => fs::remove_dir_all(target),
        Ok(_) => fs::remove_file(target),
        Err(_) => Ok(()),
    }
    .map_err(|error| LaunchError::workspace(target, error))?;
    create_symlink(link, &pointee, target).map_err(|error| LaunchError::workspace(target, error))
}

#[cfg(unix)]
fn create_symlink(_link: &Path, pointee: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(pointee, target)
}

/// Windows distinguishes directory links; `link` is followed to decide.
#[cfg(windows)]
fn create_symlink(link: &Path, pointee: &Path, target: &Path) -> io::Result<()> {
    if fs::metadata(link).is_ok_and(|metadata| metadata.is_dir()) {
        std::os::windows::fs::symlink_dir(pointee, target)
    } else {
        std::os::windows::fs::symlink_file(pointee, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::DEFAULT_EXCLUDED_DIRECTORIES;

    fn deny_list() -> Vec<String> {
        DEFAULT_EXCLUDED_DIRECTORIES.iter().map(|name| name.to_string()).collect()
    }

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn copies_tree_and_prunes_denied_names_at_every_depth() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        write(source.path(), "main.nf", "workflow {}");
        write(source.path(), "latch.config", "process {}");
        write(source.path(), "modules/local/filter.nf", "process FILTER {}");
        write(source.path(), "work/ab/cd/.command.sh", "stale");
        write(source.path(), ".nextflow/history", "stale");
        write(source.path(), "modules/results/old.txt", "stale");
        write(source.path(), "assets/nested/miniconda/bin/python", "stale");

        let summary = materialize_workspace(source.path(), destination.path(), &deny_list()).unwrap();

        assert!(destination.path().join("main.nf").is_file());
        assert!(destination.path().join("modules/local/filter.nf").is_file());
        assert!(destination.path().join("assets/nested").is_dir());
        assert_eq!(summary.files, 3);
        assert_eq!(summary.pruned, 4);

        for entry in WalkDir::new(destination.path()).min_depth(1) {
            let entry = entry.unwrap();
            let relative = entry.path().strip_prefix(destination.path()).unwrap();
            for component in relative.components() {
                let name = component.as_os_str().to_str().unwrap();
                assert!(!DEFAULT_EXCLUDED_DIRECTORIES.contains(&name), "denied component in {}", relative.display());
            }
        }
    }

    #[test]
    fn merges_into_existing_destination() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        write(source.path(), "conf/base.config", "new");
        write(destination.path(), "conf/base.config", "old");
        write(destination.path(), "conf/keep.config", "untouched");

        materialize_workspace(source.path(), destination.path(), &deny_list()).unwrap();

        assert_eq!(fs::read_to_string(destination.path().join("conf/base.config")).unwrap(), "new");
        assert_eq!(fs::read_to_string(destination.path().join("conf/keep.config")).unwrap(), "untouched");
    }

    #[cfg(unix)]
    #[test]
    fn recreates_symlinks_without_following_them() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        write(source.path(), "bin/tool.sh", "#!/bin/sh");
        std::os::unix::fs::symlink("bin/tool.sh", source.path().join("tool")).unwrap();
        std::os::unix::fs::symlink("does/not/exist", source.path().join("dangling")).unwrap();

        let summary = materialize_workspace(source.path(), destination.path(), &deny_list()).unwrap();

        assert_eq!(summary.symlinks, 2);
        assert_eq!(fs::read_link(destination.path().join("tool")).unwrap(), Path::new("bin/tool.sh"));
        assert_eq!(fs::read_link(destination.path().join("dangling")).unwrap(), Path::new("does/not/exist"));
    }

    #[cfg(unix)]
    fn symlink_dir(pointee: &str, link: &Path) {
        std::os::unix::fs::symlink(pointee, link).unwrap();
    }

    #[cfg(windows)]
    fn symlink_dir(pointee: &str, link: &Path) {
        std::os::windows::fs::symlink_dir(pointee, link).unwrap();
    }

    #[test]
    fn directory_links_resolve_to_directories_after_copy() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        write(source.path(), "assets/db/index.txt", "taxa");
        symlink_dir("assets", &source.path().join("shared"));

        let summary = materialize_workspace(source.path(), destination.path(), &deny_list()).unwrap();

        let linked = destination.path().join("shared");
        assert_eq!(summary.symlinks, 1);
        assert!(fs::symlink_metadata(&linked).unwrap().file_type().is_symlink());
        assert!(fs::metadata(&linked).unwrap().is_dir());
        assert_eq!(fs::read_to_string(linked.join("db/index.txt")).unwrap(), "taxa");
    }

    #[test]
    fn missing_source_is_a_workspace_error() {
        let root = tempfile::tempdir().unwrap();
        let error = materialize_workspace(&root.path().join("absent"), &root.path().join("out"), &deny_list()).unwrap_err();
        assert!(matches!(error, LaunchError::Workspace { .. }));
    }
}
