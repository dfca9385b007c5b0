//! Command line argument parsing and validation.
//!
//! One invocation builds one package kind from one configuration document.

use crate::bundler::{BuildOptions, PackageKind};
use clap::Parser;
use std::path::PathBuf;

/// Package a published application for Linux and Windows
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_deploy",
    version,
    about = "Package a published application for Linux and Windows",
    long_about = "Build AppImage, Flatpak, RPM, Debian, Inno Setup and Zip packages
from a single Key = Value deployment document.

Usage:
  kodegen_bundler_deploy --new HelloWorld.deploy.conf
  kodegen_bundler_deploy --kind deb
  kodegen_bundler_deploy HelloWorld.deploy.conf --kind appimage --runtime linux-arm64
  kodegen_bundler_deploy HelloWorld.deploy.conf --kind setup --runtime win-x64 --plan"
)]
pub struct Args {
    /// Configuration document (defaults to the only *.deploy.conf in the current directory)
    #[arg(index = 1, value_name = "CONF")]
    pub conf: Option<PathBuf>,

    /// Package kind to build
    #[arg(short, long, value_enum, required_unless_present = "new")]
    pub kind: Option<PackageKind>,

    /// Target runtime id, e.g. linux-x64 or win-arm64 (defaults to the host)
    #[arg(short, long, value_name = "ID")]
    pub runtime: Option<String>,

    /// Architecture override; Setup takes the value verbatim
    #[arg(long, value_name = "ARCH")]
    pub arch: Option<String>,

    /// Output file name override
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,

    /// Directory that holds the intermediate build trees
    #[arg(long, value_name = "DIR", env = "KODEGEN_DEPLOY_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Directory with default icons and the embedded appimagetool
    #[arg(long, value_name = "DIR")]
    pub assets: Option<PathBuf>,

    /// Print the build plan as JSON instead of building
    #[arg(long)]
    pub plan: bool,

    /// Write a commented example configuration to NAME and exit
    #[arg(long, value_name = "NAME", conflicts_with_all = ["kind", "plan"])]
    pub new: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Some(runtime) = &self.runtime
            && runtime.trim().is_empty()
        {
            return Err("--runtime must not be empty".to_string());
        }
        if let Some(output) = &self.output
            && (output.trim().is_empty() || output.contains(['/', '\\']))
        {
            return Err(format!("--output must be a plain file name, got '{}'", output));
        }
        if self.arch.is_some() && self.kind == Some(PackageKind::Zip) {
            return Err("--arch has no effect on zip packages".to_string());
        }
        Ok(())
    }

    /// Build options derived from the arguments.
    pub fn build_options(&self) -> BuildOptions {
        let mut options = BuildOptions::default();
        if let Some(dir) = &self.work_dir {
            options = options.work_root(dir);
        }
        if let Some(arch) = &self.arch {
            options = options.arch(arch);
        }
        if let Some(name) = &self.output {
            options = options.output_name(name);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("kodegen_bundler_deploy").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_kind_is_required_without_new() {
        assert!(Args::try_parse_from(["kodegen_bundler_deploy", "app.deploy.conf"]).is_err());
        let parsed = args(&["--new", "app.deploy.conf"]);
        assert!(parsed.kind.is_none());
    }

    #[test]
    fn test_kind_values() {
        assert_eq!(args(&["--kind", "appimage"]).kind, Some(PackageKind::AppImage));
        assert_eq!(args(&["-k", "deb"]).kind, Some(PackageKind::Deb));
    }

    #[test]
    fn test_validate_output_name() {
        assert!(args(&["--kind", "rpm", "--output", "a/b.rpm"]).validate().is_err());
        assert!(args(&["--kind", "rpm", "--output", "app.rpm"]).validate().is_ok());
        assert!(args(&["--kind", "zip", "--arch", "x64"]).validate().is_err());
    }

    #[test]
    fn test_build_options() {
        let parsed = args(&["--kind", "setup", "--arch", "x64compatible", "--work-dir", "/tmp/w"]);
        let options = parsed.build_options();
        assert_eq!(options.arch_override(), Some("x64compatible"));
        assert_eq!(options.work_root_dir(), std::path::Path::new("/tmp/w"));
        assert!(options.output_override().is_none());
    }
}
