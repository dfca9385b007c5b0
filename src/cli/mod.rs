//! Command line interface for kodegen_bundler_deploy.
//!
//! Resolves the configuration document, then either scaffolds a new one,
//! prints a build plan, or builds a package.

mod args;
mod output;

pub use args::Args;
pub use output::OutputManager;

use crate::bundler::{
    AssetLocator, Bundler, Configuration, PackageKind, RenderStyle, ShellOperations,
};
use crate::error::{CliError, Result};
use std::path::{Path, PathBuf};

/// File name suffix of deploy configuration documents.
pub const CONF_SUFFIX: &str = ".deploy.conf";

/// Main CLI entry point
pub fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args)
}

/// Runs one parsed invocation and returns the process exit code.
pub fn execute(args: &Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    let output = OutputManager::new();

    if let Some(path) = &args.new {
        write_sample(path)?;
        output.success(&format!("Created {}", path.display()))?;
        return Ok(0);
    }

    let kind = args.kind.ok_or_else(|| CliError::InvalidArguments {
        reason: "--kind is required".to_string(),
    })?;

    let conf_path = match &args.conf {
        Some(path) => path.clone(),
        None => find_config(&std::env::current_dir()?)?,
    };
    log::info!("Using configuration {}", conf_path.display());
    let conf = Configuration::from_file(&conf_path)?;

    let assets = match &args.assets {
        Some(dir) => AssetLocator::new(dir),
        None => AssetLocator::discover(),
    };
    let bundler = Bundler::new(conf, args.runtime.as_deref(), args.build_options(), assets);

    if args.plan {
        let plan = bundler.plan(kind)?;
        output.println(&serde_json::to_string_pretty(&plan)?)?;
        return Ok(0);
    }

    deploy(&bundler, kind, &output)
}

fn deploy(bundler: &Bundler, kind: PackageKind, output: &OutputManager) -> Result<i32> {
    let artifact = bundler.deploy(kind, &ShellOperations)?;
    output.success(&format!("Built {} package", artifact.kind))?;
    output.field("Path", &artifact.path.display().to_string())?;
    output.field("Size", &format!("{} bytes", artifact.size))?;
    output.field("SHA256", &artifact.checksum)?;
    Ok(0)
}

/// Writes a commented example configuration. Never overwrites.
fn write_sample(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(CliError::AlreadyExists {
            path: path.to_path_buf(),
        }
        .into());
    }

    let base_dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => parent.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let text = Configuration::sample(&base_dir).render(RenderStyle::Commented);
    std::fs::write(path, text)?;
    Ok(())
}

/// Finds the single `*.deploy.conf` in `dir`.
fn find_config(dir: &Path) -> Result<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(CONF_SUFFIX))
        })
        .collect();
    candidates.sort();

    match candidates.len() {
        0 => Err(CliError::ConfigNotFound {
            directory: dir.to_path_buf(),
        }
        .into()),
        1 => Ok(candidates.remove(0)),
        _ => Err(CliError::AmbiguousConfig {
            directory: dir.to_path_buf(),
            candidates: candidates
                .iter()
                .filter_map(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                .collect(),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeployError;

    #[test]
    fn test_find_config() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            find_config(dir.path()),
            Err(DeployError::Cli(CliError::ConfigNotFound { .. }))
        ));

        std::fs::write(dir.path().join("a.deploy.conf"), "").unwrap();
        std::fs::write(dir.path().join("notes.conf"), "").unwrap();
        assert_eq!(find_config(dir.path()).unwrap(), dir.path().join("a.deploy.conf"));

        std::fs::write(dir.path().join("b.deploy.conf"), "").unwrap();
        let Err(DeployError::Cli(CliError::AmbiguousConfig { candidates, .. })) = find_config(dir.path()) else {
            panic!("expected an ambiguity error");
        };
        assert_eq!(candidates, vec!["a.deploy.conf", "b.deploy.conf"]);
    }

    #[test]
    fn test_sample_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("HelloWorld.deploy.conf");
        write_sample(&path).unwrap();

        let conf = Configuration::from_file(&path).unwrap();
        assert_eq!(conf.app_base_name(), "HelloWorld");
        assert_eq!(conf.output_directory(), dir.path().join("Deploy").join("OUT"));

        assert!(matches!(
            write_sample(&path),
            Err(DeployError::Cli(CliError::AlreadyExists { .. }))
        ));
    }
}
