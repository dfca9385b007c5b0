//! Error types for the deploy command line.
//!
//! Library failures arrive as [`crate::bundler::Error`]; this module wraps
//! them together with argument problems and attaches recovery suggestions.

use crate::bundler;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for deploy operations
pub type Result<T> = std::result::Result<T, DeployError>;

/// Main error type for the deploy binary
#[derive(Error, Debug)]
pub enum DeployError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bundler errors
    #[error("Bundler error: {0}")]
    Bundler(#[from] bundler::Error),
}

/// Command line errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// No configuration given and none found in the directory
    #[error("No *.deploy.conf file found in {directory}")]
    ConfigNotFound {
        /// Directory that was searched
        directory: PathBuf,
    },

    /// Several candidate configurations in the directory
    #[error("Several configuration files found in {directory}: {candidates:?}")]
    AmbiguousConfig {
        /// Directory that was searched
        directory: PathBuf,
        /// File names found
        candidates: Vec<String>,
    },

    /// `--new` would overwrite an existing file
    #[error("Refusing to overwrite existing file {path}")]
    AlreadyExists {
        /// Existing file
        path: PathBuf,
    },
}

impl DeployError {
    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            DeployError::Cli(CliError::ConfigNotFound { .. }) => vec![
                "Pass the configuration file explicitly: kodegen_bundler_deploy app.deploy.conf --kind deb".to_string(),
                "Create one with: kodegen_bundler_deploy --new app.deploy.conf".to_string(),
            ],
            DeployError::Cli(CliError::AmbiguousConfig { candidates, .. }) => vec![format!(
                "Name the configuration to use, one of: {}",
                candidates.join(", ")
            )],
            DeployError::Cli(CliError::AlreadyExists { .. }) => {
                vec!["Choose another file name or remove the existing file".to_string()]
            }
            DeployError::Bundler(err) => bundler_suggestions(err),
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }
}

fn bundler_suggestions(err: &bundler::Error) -> Vec<String> {
    use bundler::Error;

    match err {
        Error::Context(_, inner) => bundler_suggestions(inner),
        Error::MissingValue { key } => vec![format!("Add a value for {} to the configuration", key)],
        Error::DuplicateKey { key, .. } => vec![format!("Remove the repeated {} assignment", key)],
        Error::InvalidArchitecture(_) => vec![
            "Use a runtime id such as linux-x64, linux-arm64 or win-x64".to_string(),
            "Or give the architecture explicitly with --arch".to_string(),
        ],
        Error::IconPathError => vec![
            "List at least one icon in IconFiles".to_string(),
            "Or point --assets at a directory with default icons".to_string(),
        ],
        Error::ToolUnavailable { tool, .. } => vec![
            format!("Install {} and make sure it is on PATH", tool),
            "Run with --plan to inspect the build without external tools".to_string(),
        ],
        Error::CommandExit { .. } | Error::CommandFailed { .. } => vec![
            "Re-run with --verbose to see the full command and environment".to_string(),
        ],
        Error::OutputNotFound { directory, .. } => vec![format!(
            "Inspect {} for the output of the packaging tool",
            directory.display()
        )],
        _ => vec!["Check the error message above for specific details".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggestions_follow_context() {
        let err = DeployError::from(bundler::Error::Context(
            "building".into(),
            Box::new(bundler::Error::ToolUnavailable {
                tool: "dpkg-deb".into(),
                reason: "not found".into(),
            }),
        ));
        let suggestions = err.recovery_suggestions();
        assert!(suggestions[0].contains("dpkg-deb"));
    }

    #[test]
    fn test_ambiguous_config_lists_candidates() {
        let err = DeployError::from(CliError::AmbiguousConfig {
            directory: PathBuf::from("/work"),
            candidates: vec!["a.deploy.conf".into(), "b.deploy.conf".into()],
        });
        assert_eq!(
            err.recovery_suggestions(),
            vec!["Name the configuration to use, one of: a.deploy.conf, b.deploy.conf".to_string()]
        );
    }
}
