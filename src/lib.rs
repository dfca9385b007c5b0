//! # Kodegen Bundler Deploy
//!
//! Configuration-driven packaging of already-built desktop applications.
//!
//! A single `Key = Value` document describes the application once; this
//! crate turns it into AppImage, Flatpak, RPM, Debian, Inno Setup and Zip
//! packages by staging a build tree and handing it to the native tool.
//!
//! ## Usage
//!
//! ```bash
//! kodegen_bundler_deploy --new HelloWorld.deploy.conf   # scaffold a document
//! kodegen_bundler_deploy --kind deb                     # build for the host
//! kodegen_bundler_deploy --kind setup --runtime win-x64 --plan
//! ```

#![deny(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod bundler;
pub mod cli;
pub mod error;

pub use bundler::{BundledArtifact, Bundler, PackageKind};
pub use cli::Args;
pub use error::{CliError, DeployError, Result};
