//! Error types for deploy operations.
//!
//! Provides contextual error chaining, filesystem-specific errors, and the
//! validation/construction/tool failure variants raised while turning a
//! configuration into a package.
//!
//! # Features
//!
//! - **Context trait**: Add context to errors similar to anyhow
//! - **ErrorExt trait**: Filesystem operations with automatic path context
//! - **bail! macro**: Early return with formatted error messages
//!
//! # Example
//!
//! ```no_run
//! # use std::path::{Path, PathBuf};
//! # type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
//! #
//! # trait ErrorExt<T> {
//! #     fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
//! # }
//! # impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
//! #     fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
//! #         self.map_err(|e| Box::new(e) as Box<dyn std::error::Error>)
//! #     }
//! # }
//! fn read_template(path: &Path) -> Result<String> {
//!     let contents = std::fs::read_to_string(path)
//!         .fs_context("reading desktop template", path)?;
//!     Ok(contents)
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the bundler.
///
/// Validation errors (`MissingValue`, `InvalidFormat`, `FileNotFound`, ...)
/// abort before any filesystem mutation. `ToolUnavailable` is only raised
/// when a build is actually attempted without the required tool.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "reading config file")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Mandatory configuration value absent or blank.
    #[error("mandatory value {key} is missing or empty")]
    MissingValue {
        /// Configuration key
        key: String,
    },

    /// Configuration value present but malformed.
    #[error("invalid value for {key} '{value}': {reason}")]
    InvalidFormat {
        /// Configuration key
        key: String,
        /// Offending value
        value: String,
        /// What was expected
        reason: String,
    },

    /// Path-valued configuration entry does not exist.
    #[error("{key} refers to a file that does not exist: {path}")]
    FileNotFound {
        /// Configuration key
        key: String,
        /// Resolved path
        path: PathBuf,
    },

    /// Same key assigned twice in one document.
    #[error("duplicate key {key} on line {line}")]
    DuplicateKey {
        /// Configuration key
        key: String,
        /// 1-based line number of the second assignment
        line: usize,
    },

    /// Malformed document line.
    #[error("syntax error on line {line}: {reason}")]
    Syntax {
        /// 1-based line number
        line: usize,
        /// Description of the problem
        reason: String,
    },

    /// Unrecognized architecture token where an exact architecture is required.
    #[error("invalid architecture: {0}")]
    InvalidArchitecture(String),

    /// No usable icon could be resolved, including the built-in defaults.
    #[error("no usable icon found in configuration or default assets")]
    IconPathError,

    /// A required derived value could not be computed.
    #[error("cannot construct package layout: {0}")]
    Construction(String),

    /// External tool missing on this host.
    #[error("{tool} is not available: {reason}")]
    ToolUnavailable {
        /// Tool name
        tool: String,
        /// Why it cannot be used
        reason: String,
    },

    /// Child process could not be started.
    #[error("failed to run command {command}: {error}")]
    CommandFailed {
        /// Command that failed to execute
        command: String,
        /// The underlying error
        error: io::Error,
    },

    /// Child process exited unsuccessfully.
    #[error("command exited with status {code:?}: {command}")]
    CommandExit {
        /// Command line
        command: String,
        /// Exit code, `None` when terminated by a signal
        code: Option<i32>,
    },

    /// Expected artifact not found after the packaging tool ran.
    #[error("expected exactly one package under {directory}, found {found}")]
    OutputNotFound {
        /// Directory that was searched
        directory: PathBuf,
        /// Number of candidates found
        found: usize,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking a directory tree.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// ZIP archive creation error.
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Semantic version parsing error.
    #[error("{0}")]
    SemverError(#[from] semver::Error),

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Whether this error was raised while validating configuration input.
    pub fn is_validation(&self) -> bool {
        match self {
            Error::MissingValue { .. }
            | Error::InvalidFormat { .. }
            | Error::FileNotFound { .. }
            | Error::DuplicateKey { .. }
            | Error::Syntax { .. } => true,
            Error::Context(_, inner) => inner.is_validation(),
            _ => false,
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with bundler's Error type.
/// Works with both `Result<T, E>` and `Option<T>`.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Extension trait for filesystem operations with automatic path context.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "copying binary".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_wraps_message() {
        let result: Result<()> = Err(Error::GenericError("inner".into()));
        let err = result.context("outer").unwrap_err();
        assert_eq!(err.to_string(), "outer: inner");
    }

    #[test]
    fn test_option_context_becomes_generic_error() {
        let value: Option<u32> = None;
        let err = value.context("no value").unwrap_err();
        assert!(matches!(err, Error::GenericError(ref m) if m == "no value"));
    }

    #[test]
    fn test_validation_classification_sees_through_context() {
        let err = Error::Context(
            "parsing".into(),
            Box::new(Error::MissingValue { key: "AppId".into() }),
        );
        assert!(err.is_validation());
        assert!(!Error::IconPathError.is_validation());
    }
}
