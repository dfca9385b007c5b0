//! Package deployment for published applications.
//!
//! This module turns a `*.deploy.conf` document plus an already-built
//! application into distributable packages for Linux and Windows.
//!
//! # Configuration
//!
//! Deploys are described by a `Key = Value` document:
//!
//! ```text
//! AppBaseName = HelloWorld
//! AppId = net.example.helloworld
//! AppVersionRelease = 1.0.0[1]
//! PublishCommand = cargo build --release && cp target/release/HelloWorld "${BUILD_APP_BIN}/"
//! ```
//!
//! See [`Configuration`] for every key and [`macros`] for the `${NAME}`
//! values available to commands and templates.
//!
//! # Supported Kinds
//!
//! | Target | Kinds | Notes |
//! |--------|-------|-------|
//! | Linux | AppImage, Flatpak, RPM, Deb | Desktop entry and AppStream metainfo staged |
//! | Windows | Setup (Inno Setup) | Signing via Inno's `SignTool` |
//! | Any | Zip | No external tool |
//!
//! # Integration
//!
//! ```no_run
//! use kodegen_bundler_deploy::bundler::{
//!     AssetLocator, BuildOptions, Bundler, Configuration, PackageKind, ShellOperations,
//! };
//!
//! let conf = Configuration::from_file("HelloWorld.deploy.conf")?;
//! let bundler = Bundler::new(conf, None, BuildOptions::default(), AssetLocator::discover());
//!
//! let plan = bundler.plan(PackageKind::AppImage)?;
//! println!("would write {}", plan.output.display());
//!
//! let artifact = bundler.deploy(PackageKind::AppImage, &ShellOperations)?;
//! println!("SHA256: {}", artifact.checksum);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod builder;
mod error;
pub mod macros;
pub mod platform;
pub mod resources;
pub mod settings;
#[cfg(test)]
pub(crate) mod testing;
pub mod utils;

// Public re-exports
pub use builder::Bundler;
pub use error::{Context, Error, ErrorExt, Result};
pub use macros::{MacroId, MacroTable};
pub use platform::{BuildLayout, BuildPlan, PackageBuilder, PackageCommand, PackageKind};
pub use resources::{AssetLocator, IconEntry, IconRole, IconSet};
pub use settings::{
    AppVersion,
    // Runtime classification
    Arch,
    BuildOptions,
    // Main configuration types
    Configuration,
    FieldKey,
    RenderStyle,
    RuntimeDescriptor,
    describe_runtime,
    resolve_architecture,
};
pub use utils::ops::{Operations, RecordingOperations, ShellOperations};

/// A finished package.
///
/// Returned by [`Bundler::deploy`] once the package exists at its declared
/// output path.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_deploy::bundler::{
///     AssetLocator, BuildOptions, Bundler, Configuration, PackageKind, ShellOperations,
/// };
///
/// # fn example() -> kodegen_bundler_deploy::bundler::Result<()> {
/// # let conf = Configuration::from_file("app.deploy.conf")?;
/// let bundler = Bundler::new(conf, Some("linux-x64"), BuildOptions::default(), AssetLocator::discover());
/// let artifact = bundler.deploy(PackageKind::Zip, &ShellOperations)?;
///
/// println!("Created {}: {} bytes", artifact.kind, artifact.size);
/// println!("SHA256: {}", artifact.checksum);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, serde::Serialize)]
pub struct BundledArtifact {
    /// The package kind that was built.
    pub kind: PackageKind,

    /// Path of the package file.
    pub path: std::path::PathBuf,

    /// Size of the package in bytes.
    pub size: u64,

    /// SHA-256 checksum of the package, lowercase hex.
    ///
    /// This can be published alongside the package for users to verify downloads.
    pub checksum: String,
}
