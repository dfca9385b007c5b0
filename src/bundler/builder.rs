//! Deploy orchestration.
//!
//! This module provides the main [`Bundler`] struct that drives a complete
//! package build: clean the work area, publish the application into the
//! build tree, stage desktop integration, run the packaging tool, and
//! fingerprint the result.
//!
//! # Example
//!
//! ```no_run
//! use kodegen_bundler_deploy::bundler::{
//!     AssetLocator, BuildOptions, Bundler, Configuration, PackageKind, ShellOperations,
//! };
//!
//! # fn example() -> kodegen_bundler_deploy::bundler::Result<()> {
//! let conf = Configuration::from_file("app.deploy.conf")?;
//! let bundler = Bundler::new(conf, Some("linux-x64"), BuildOptions::default(), AssetLocator::discover());
//!
//! let artifact = bundler.deploy(PackageKind::Deb, &ShellOperations)?;
//! println!("{} ({} bytes)", artifact.path.display(), artifact.size);
//! # Ok(())
//! # }
//! ```

use crate::bundler::{
    BundledArtifact,
    error::{Context, Error, ErrorExt, Result},
    platform::{BuildPlan, PackageBuilder, PackageKind},
    resources::AssetLocator,
    settings::{BuildOptions, Configuration, RuntimeDescriptor, describe_runtime},
    utils::ops::Operations,
};
use sha2::{Digest, Sha256};
use std::{fs::File, io::Read, path::Path};

/// Builds packages from one configuration for one runtime.
///
/// The same `Bundler` can produce several kinds in turn; each call starts
/// from a clean package root.
#[derive(Debug)]
pub struct Bundler {
    conf: Configuration,
    runtime: RuntimeDescriptor,
    options: BuildOptions,
    assets: AssetLocator,
}

impl Bundler {
    /// Creates a bundler. `runtime` defaults to the host platform.
    pub fn new(
        conf: Configuration,
        runtime: Option<&str>,
        options: BuildOptions,
        assets: AssetLocator,
    ) -> Self {
        let runtime = describe_runtime(runtime);
        log::debug!("Runtime {} resolved to {}", runtime.id(), runtime.arch());
        Self {
            conf,
            runtime,
            options,
            assets,
        }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.conf
    }

    pub fn runtime(&self) -> &RuntimeDescriptor {
        &self.runtime
    }

    /// Validates and computes one build, collecting warnings.
    pub fn prepare(&self, kind: PackageKind, warnings: &mut Vec<String>) -> Result<PackageBuilder<'_>> {
        PackageBuilder::new(
            &self.conf,
            &self.runtime,
            kind,
            &self.options,
            &self.assets,
            warnings,
        )
    }

    /// Describes what [`deploy`](Self::deploy) would do. Touches nothing.
    pub fn plan(&self, kind: PackageKind) -> Result<BuildPlan> {
        let mut warnings = Vec::new();
        let builder = self.prepare(kind, &mut warnings)?;
        builder.plan(&warnings)
    }

    /// Builds one package.
    ///
    /// # Errors
    ///
    /// Any construction error from [`prepare`](Self::prepare), any failing
    /// command, or [`Error::OutputNotFound`] if the package is missing
    /// afterwards.
    pub fn deploy(&self, kind: PackageKind, ops: &dyn Operations) -> Result<BundledArtifact> {
        let mut warnings = Vec::new();
        let builder = self.prepare(kind, &mut warnings)?;
        let layout = builder.layout();

        log::info!(
            "Building {} {} for {} ({}): {}",
            self.conf.app_friendly_name(),
            self.conf.app_version(),
            self.runtime.id(),
            kind,
            builder.output_file_name()
        );

        ops.remove_dir(layout.package_root())?;
        ops.create_dir(layout.package_root())?;

        self.publish(&builder, ops).context("publish step failed")?;

        let (desktop, metainfo) = builder.expand_templates()?;
        builder.create(&desktop, &metainfo, ops)?;
        builder.build_package(ops)?;

        let path = layout.output_path().to_path_buf();
        if !path.is_file() {
            return Err(Error::OutputNotFound {
                directory: layout.output_dir().to_path_buf(),
                found: 0,
            });
        }

        let size = std::fs::metadata(&path)
            .fs_context("reading artifact metadata", &path)?
            .len();
        let checksum = calculate_sha256(&path)?;

        log::info!("Created {} ({} bytes)", path.display(), size);
        Ok(BundledArtifact {
            kind,
            path,
            size,
            checksum,
        })
    }

    /// Runs the publish command and copies the publish directory into the
    /// application directory of the build tree.
    fn publish(&self, builder: &PackageBuilder<'_>, ops: &dyn Operations) -> Result<()> {
        let app_bin = builder.layout().app_bin();
        ops.create_dir(app_bin)?;

        if let Some(command) = self.conf.publish_command() {
            let macros = builder.macros();
            let command = macros.expand(command, false);
            log::info!("Publishing: {}", command);
            ops.execute(&command, &macros.env_vars())?;
        }

        if let Some(dir) = self.conf.publish_directory() {
            log::info!("Copying {} to {}", dir.display(), app_bin.display());
            ops.copy_dir(dir, app_bin)?;
        }

        if self.conf.publish_command().is_none() && self.conf.publish_directory().is_none() {
            log::warn!("Neither PublishCommand nor PublishDirectory is set; the package will hold no application files");
        }
        Ok(())
    }
}

/// Calculates the SHA-256 of a file as lowercase hex.
fn calculate_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).fs_context("opening artifact", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer).fs_context("reading artifact", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{
        testing,
        utils::ops::{Recorded, RecordingOperations},
    };

    #[test]
    fn test_sha256_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.txt");
        std::fs::write(&path, "abc").unwrap();
        assert_eq!(
            calculate_sha256(&path).unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_deploy_publishes_with_macro_environment() {
        let dir = tempfile::tempdir().unwrap();
        let conf = testing::hello_with("PublishCommand = make install DEST=${BUILD_APP_BIN}\n");
        let bundler = Bundler::new(
            conf,
            Some("linux-x64"),
            BuildOptions::default().work_root(dir.path().join("work")),
            AssetLocator::new(dir.path()).with_search_path(dir.path().as_os_str()),
        );

        let ops = RecordingOperations::new();
        let err = bundler.deploy(PackageKind::Zip, &ops).unwrap_err();
        assert!(matches!(err, Error::OutputNotFound { found: 0, .. }));

        let calls = ops.calls();
        assert!(matches!(calls[0], Recorded::RemoveDir(_)));
        let Some(Recorded::Execute { command, env }) =
            calls.iter().find(|c| matches!(c, Recorded::Execute { .. }))
        else {
            panic!("publish command was not run");
        };
        assert!(command.starts_with("make install DEST=/"));
        assert!(command.ends_with("/Publish"));
        assert!(env.iter().any(|(k, v)| k == "APP_ID" && v == "com.example.helloworld"));
        assert!(matches!(calls.last(), Some(Recorded::ZipDir(..))));
    }

    #[test]
    fn test_plan_does_not_touch_work_root() {
        let dir = tempfile::tempdir().unwrap();
        let work = dir.path().join("work");
        let bundler = Bundler::new(
            testing::hello(),
            Some("linux-arm64"),
            BuildOptions::default().work_root(&work),
            AssetLocator::new(dir.path()).with_search_path(dir.path().as_os_str()),
        );

        let plan = bundler.plan(PackageKind::Deb).unwrap();
        assert_eq!(plan.package_arch, "arm64");
        assert!(plan.output.ends_with("helloworld_5.4.3-2_arm64.deb"));
        assert!(!work.exists());
    }
}
