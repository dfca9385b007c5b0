//! Side-effecting primitives used while staging and building packages.
//!
//! Everything that touches processes or the filesystem goes through the
//! [`Operations`] trait, so package builders can be exercised against
//! [`RecordingOperations`] without running any packaging tool.

use super::fs;
use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    cell::RefCell,
    io,
    path::{Path, PathBuf},
    process::Command,
};
use walkdir::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Process and filesystem capabilities needed by package builders.
///
/// All calls are synchronous and run to completion.
pub trait Operations {
    /// Runs a shell command line, failing on spawn error or non-zero exit.
    fn execute(&self, command: &str, env: &[(String, String)]) -> Result<()>;

    /// Creates a directory and its parents. Existing directories are kept.
    fn create_dir(&self, path: &Path) -> Result<()>;

    /// Removes a directory tree if present.
    fn remove_dir(&self, path: &Path) -> Result<()>;

    /// Copies one file, creating the destination's parents.
    fn copy_file(&self, from: &Path, to: &Path) -> Result<()>;

    /// Copies a directory tree into `to`, merging with existing content.
    fn copy_dir(&self, from: &Path, to: &Path) -> Result<()>;

    /// Writes text to a file, creating parents and replacing existing content.
    fn write_file(&self, path: &Path, contents: &str) -> Result<()>;

    /// Creates or replaces a symbolic link.
    fn symlink(&self, target: &Path, link: &Path) -> Result<()>;

    /// Archives the contents of `dir` into a zip file at `output`.
    fn zip_dir(&self, dir: &Path, output: &Path) -> Result<()>;
}

/// [`Operations`] backed by the host shell and filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShellOperations;

impl ShellOperations {
    fn shell(command: &str) -> Command {
        if cfg!(windows) {
            let mut cmd = Command::new("cmd");
            cmd.arg("/C").arg(command);
            cmd
        } else {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(command);
            cmd
        }
    }
}

impl Operations for ShellOperations {
    fn execute(&self, command: &str, env: &[(String, String)]) -> Result<()> {
        log::debug!("Running: {}", command);

        let status = Self::shell(command)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .status()
            .map_err(|error| Error::CommandFailed {
                command: command.to_string(),
                error,
            })?;

        if !status.success() {
            return Err(Error::CommandExit {
                command: command.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        fs::remove_dir_all(path)
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        fs::copy_file(from, to)
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> Result<()> {
        fs::copy_dir(from, to)
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        fs::write_file(path, contents.as_bytes())
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        fs::symlink(target, link)
    }

    fn zip_dir(&self, dir: &Path, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent).fs_context("creating output directory", parent)?;
        }
        let file = std::fs::File::create(output).fs_context("creating zip archive", output)?;
        let mut writer = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut entries: Vec<_> = WalkDir::new(dir)
            .min_depth(1)
            .into_iter()
            .collect::<std::result::Result<_, _>>()?;
        entries.sort_by(|a, b| a.path().cmp(b.path()));

        for entry in entries {
            let rel = entry.path().strip_prefix(dir)?;
            let name = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            if entry.file_type().is_dir() {
                writer.add_directory(format!("{}/", name), options)?;
            } else {
                let permissions = file_mode(entry.path());
                writer.start_file(name, options.unix_permissions(permissions))?;
                let mut source =
                    std::fs::File::open(entry.path()).fs_context("opening file for zip", entry.path())?;
                io::copy(&mut source, &mut writer).fs_context("adding file to zip", entry.path())?;
            }
        }

        writer.finish()?;
        log::debug!("Wrote {}", output.display());
        Ok(())
    }
}

#[cfg(unix)]
fn file_mode(path: &Path) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o777)
        .unwrap_or(0o644)
}

#[cfg(not(unix))]
fn file_mode(_path: &Path) -> u32 {
    0o644
}

/// One call made against [`RecordingOperations`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Recorded {
    Execute {
        command: String,
        env: Vec<(String, String)>,
    },
    CreateDir(PathBuf),
    RemoveDir(PathBuf),
    CopyFile(PathBuf, PathBuf),
    CopyDir(PathBuf, PathBuf),
    WriteFile(PathBuf, String),
    Symlink(PathBuf, PathBuf),
    ZipDir(PathBuf, PathBuf),
}

/// [`Operations`] that records every call and performs none of them.
///
/// Used for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingOperations {
    calls: RefCell<Vec<Recorded>>,
}

impl RecordingOperations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.borrow().clone()
    }

    /// Command lines passed to `execute`, in order.
    pub fn commands(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Recorded::Execute { command, .. } => Some(command.clone()),
                _ => None,
            })
            .collect()
    }

    /// Contents of the last write to `path`.
    pub fn written(&self, path: &Path) -> Option<String> {
        self.calls.borrow().iter().rev().find_map(|c| match c {
            Recorded::WriteFile(p, contents) if p == path => Some(contents.clone()),
            _ => None,
        })
    }

    fn record(&self, call: Recorded) -> Result<()> {
        self.calls.borrow_mut().push(call);
        Ok(())
    }
}

impl Operations for RecordingOperations {
    fn execute(&self, command: &str, env: &[(String, String)]) -> Result<()> {
        self.record(Recorded::Execute {
            command: command.to_string(),
            env: env.to_vec(),
        })
    }

    fn create_dir(&self, path: &Path) -> Result<()> {
        self.record(Recorded::CreateDir(path.to_path_buf()))
    }

    fn remove_dir(&self, path: &Path) -> Result<()> {
        self.record(Recorded::RemoveDir(path.to_path_buf()))
    }

    fn copy_file(&self, from: &Path, to: &Path) -> Result<()> {
        self.record(Recorded::CopyFile(from.to_path_buf(), to.to_path_buf()))
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> Result<()> {
        self.record(Recorded::CopyDir(from.to_path_buf(), to.to_path_buf()))
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        self.record(Recorded::WriteFile(path.to_path_buf(), contents.to_string()))
    }

    fn symlink(&self, target: &Path, link: &Path) -> Result<()> {
        self.record(Recorded::Symlink(target.to_path_buf(), link.to_path_buf()))
    }

    fn zip_dir(&self, dir: &Path, output: &Path) -> Result<()> {
        self.record(Recorded::ZipDir(dir.to_path_buf(), output.to_path_buf()))
    }
}
