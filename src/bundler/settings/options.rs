//! Per-invocation build options that are not part of the configuration document.

use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Options supplied by the caller for a single build.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_deploy::bundler::BuildOptions;
///
/// let options = BuildOptions::default()
///     .work_root("/tmp/deploy-work")
///     .output_name("Custom.AppImage");
/// ```
#[derive(Clone, Debug)]
pub struct BuildOptions {
    work_root: PathBuf,
    arch_override: Option<String>,
    output_override: Option<String>,
    timestamp: Option<DateTime<Utc>>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            work_root: std::env::temp_dir().join("kodegen-deploy"),
            arch_override: None,
            output_override: None,
            timestamp: None,
        }
    }
}

impl BuildOptions {
    /// Sets the directory under which per-package build trees are created.
    ///
    /// Default: `$TMPDIR/kodegen-deploy`
    pub fn work_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.work_root = path.into();
        self
    }

    /// Sets an explicit package architecture token, used verbatim by Setup.
    pub fn arch(mut self, arch: impl Into<String>) -> Self {
        self.arch_override = Some(arch.into());
        self
    }

    /// Replaces the computed output file name.
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_override = Some(name.into());
        self
    }

    /// Fixes the build timestamp, making generated dates reproducible.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn work_root_dir(&self) -> &std::path::Path {
        &self.work_root
    }

    pub fn arch_override(&self) -> Option<&str> {
        self.arch_override.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn output_override(&self) -> Option<&str> {
        self.output_override.as_deref().filter(|s| !s.trim().is_empty())
    }

    /// The fixed timestamp, or the current time.
    pub fn build_time(&self) -> DateTime<Utc> {
        self.timestamp.unwrap_or_else(Utc::now)
    }
}
