//! File system utilities for staging package trees.
//!
//! Provides file operations with automatic directory creation,
//! symlink preservation, and path-aware error context.

use crate::bail;
use crate::bundler::error::{ErrorExt, Result};
use std::{
    fs,
    io,
    path::Path,
};

/// Creates all of the directories of the specified path.
pub fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).fs_context("removing directory", path)
    } else {
        Ok(())
    }
}

/// Writes `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).fs_context("creating parent directory", parent)?;
    }
    fs::write(path, contents).fs_context("writing file", path)
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Creates `link` pointing at `target`, replacing any existing link or file.
///
/// `target` is stored as given, so relative targets stay relative to the
/// link's directory.
pub fn symlink(target: &Path, link: &Path) -> Result<()> {
    if link.symlink_metadata().is_ok() {
        fs::remove_file(link).fs_context("removing existing link", link)?;
    }
    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent).fs_context("creating link directory", parent)?;
    }

    let resolved = link.parent().map(|p| p.join(target)).unwrap_or_else(|| target.to_path_buf());
    if resolved.is_dir() {
        symlink_dir(target, link).fs_context("creating directory link", link)
    } else {
        symlink_file(target, link).fs_context("creating file link", link)
    }
}

/// Copies a regular file from one path to another, creating any parent
/// directories of the destination path as necessary.
///
/// Fails if the source path is a directory or doesn't exist.
pub fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        bail!("{from:?} does not exist");
    }
    if !from.is_file() {
        bail!("{from:?} is not a file");
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir).fs_context("creating destination directory", dest_dir)?;
    }
    fs::copy(from, to).fs_context("copying file", from)?;
    Ok(())
}

/// Recursively copies a directory into another, merging with existing content.
///
/// Preserves symlinks on platforms that support them.
/// Fails if the source path is not a directory or doesn't exist.
pub fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.exists() {
        bail!("{from:?} does not exist");
    }
    if !from.is_dir() {
        bail!("{from:?} is not a directory");
    }
    fs::create_dir_all(to).fs_context("creating destination directory", to)?;

    for entry in walkdir::WalkDir::new(from) {
        let entry = entry?;
        debug_assert!(entry.path().starts_with(from));
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = fs::read_link(entry.path()).fs_context("reading link", entry.path())?;
            if dest_path.symlink_metadata().is_ok() {
                fs::remove_file(&dest_path).fs_context("replacing link", &dest_path)?;
            }
            if entry.path().is_dir() {
                symlink_dir(&target, &dest_path)?;
            } else {
                symlink_file(&target, &dest_path)?;
            }
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
        } else {
            fs::copy(entry.path(), &dest_path).fs_context("copying file", entry.path())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_dir_merges_and_creates_parents() {
        let src = tempfile::tempdir().unwrap();
        let dst = tempfile::tempdir().unwrap();
        write_file(&src.path().join("a/b.txt"), b"b").unwrap();
        write_file(&dst.path().join("out/existing.txt"), b"e").unwrap();

        copy_dir(src.path(), &dst.path().join("out")).unwrap();

        assert_eq!(fs::read(dst.path().join("out/a/b.txt")).unwrap(), b"b");
        assert!(dst.path().join("out/existing.txt").exists());
    }

    #[test]
    fn test_create_dir_all_keeps_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("a/keep.txt"), b"k").unwrap();

        create_dir_all(&dir.path().join("a/b/c")).unwrap();
        create_dir_all(&dir.path().join("a")).unwrap();

        assert!(dir.path().join("a/b/c").is_dir());
        assert!(dir.path().join("a/keep.txt").exists());
    }

    #[test]
    fn test_copy_file_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        assert!(copy_file(dir.path(), &dir.path().join("x")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("usr/bin/app"), b"#!/bin/sh").unwrap();
        let link = dir.path().join("AppRun");

        symlink(Path::new("usr/bin/app"), &link).unwrap();
        symlink(Path::new("usr/bin/app"), &link).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), Path::new("usr/bin/app"));
    }
}
