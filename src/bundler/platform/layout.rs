//! Computed filesystem layout of one package build.

use super::{
    PackageKind, archive,
    linux::{appimage, debian, flatpak, rpm},
    windows::setup,
};
use crate::bundler::{
    error::{Error, Result},
    settings::{BuildOptions, Configuration, RuntimeDescriptor, resolve_architecture},
};
use std::path::{Path, PathBuf};

/// Absolute paths and names for one package build.
///
/// Computed once from the configuration, runtime and kind; never mutated.
/// Linux kinds stage a `usr/` tree under the build root. Setup and Zip stage
/// a flat publish directory and have no `usr/` paths.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct BuildLayout {
    kind: PackageKind,
    package_arch: String,
    package_root: PathBuf,
    build_root: PathBuf,
    app_bin: PathBuf,
    usr_bin: Option<PathBuf>,
    usr_share: Option<PathBuf>,
    metainfo_dir: Option<PathBuf>,
    applications_dir: Option<PathBuf>,
    icons_dir: Option<PathBuf>,
    desktop_path: Option<PathBuf>,
    metainfo_path: Option<PathBuf>,
    launcher_path: Option<PathBuf>,
    install_bin: Option<String>,
    install_exec: Option<String>,
    manifest_path: Option<PathBuf>,
    output_dir: PathBuf,
    output_name: String,
    output_path: PathBuf,
}

/// Lowercase package identifier accepted by RPM and dpkg.
pub(crate) fn package_id(conf: &Configuration) -> String {
    conf.output_base_name()
        .to_lowercase()
        .replace(['_', ' '], "-")
}

fn package_arch(runtime: &RuntimeDescriptor, kind: PackageKind, options: &BuildOptions) -> Result<String> {
    if kind == PackageKind::Setup
        && let Some(token) = options.arch_override()
    {
        return Ok(token.to_string());
    }

    let arch = match options.arch_override() {
        Some(token) => resolve_architecture(token)?,
        None => runtime.arch(),
    };

    let token = match kind {
        PackageKind::AppImage => appimage::arch_token(arch),
        PackageKind::Flatpak => flatpak::arch_token(arch),
        PackageKind::Rpm => rpm::arch_token(arch),
        PackageKind::Deb => debian::arch_token(arch),
        PackageKind::Setup => setup::arch_token(arch),
        PackageKind::Zip => Some(arch.name()),
    };

    token.map(str::to_string).ok_or_else(|| {
        Error::InvalidArchitecture(format!(
            "{} has no {} architecture",
            options.arch_override().unwrap_or(runtime.id()),
            kind
        ))
    })
}

impl BuildLayout {
    /// Computes the layout.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArchitecture`] when the kind has no architecture token
    /// for the runtime (or the override), or when the runtime id is not a
    /// single path segment.
    pub fn new(
        conf: &Configuration,
        runtime: &RuntimeDescriptor,
        kind: PackageKind,
        options: &BuildOptions,
    ) -> Result<Self> {
        let runtime_id = runtime.id();
        if runtime_id.is_empty() || runtime_id.contains(['/', '\\']) || runtime_id.contains("..") {
            return Err(Error::InvalidArchitecture(format!(
                "runtime id '{}' must be a plain identifier such as linux-x64",
                runtime_id
            )));
        }

        let package_arch = package_arch(runtime, kind, options)?;
        let package_root = options
            .work_root_dir()
            .join(format!("{}-{}-{}", conf.app_id(), runtime.id(), kind));

        let name = package_id(conf);
        let base = conf.app_base_name();
        let app_id = conf.app_id();

        let (build_root, app_bin, install_bin, install_exec) = match kind {
            PackageKind::AppImage => {
                let root = package_root.join("AppDir");
                let bin = root.join("usr/bin");
                (root, bin, Some("usr/bin".to_string()), Some(base.to_string()))
            }
            PackageKind::Flatpak => {
                let root = package_root.join("AppDir");
                let bin = root.join("usr/bin");
                (
                    root,
                    bin,
                    Some("/app/bin".to_string()),
                    Some(format!("/app/bin/{}", base)),
                )
            }
            PackageKind::Rpm | PackageKind::Deb => {
                let root = package_root.join("BuildRoot");
                let bin = root.join("opt").join(app_id);
                (
                    root,
                    bin,
                    Some(format!("/opt/{}", app_id)),
                    Some(format!("/opt/{}/{}", app_id, base)),
                )
            }
            PackageKind::Setup => {
                let root = package_root.join("Publish");
                (
                    root.clone(),
                    root,
                    Some("{app}".to_string()),
                    Some(format!("{{app}}\\{}.exe", base)),
                )
            }
            PackageKind::Zip => {
                let root = package_root.join("Publish");
                (root.clone(), root, None, None)
            }
        };

        let linux = kind.targets_linux();
        let usr_bin = linux.then(|| build_root.join("usr/bin"));
        let usr_share = linux.then(|| build_root.join("usr/share"));
        let metainfo_dir = usr_share.as_ref().map(|s| s.join("metainfo"));
        let applications_dir = usr_share.as_ref().map(|s| s.join("applications"));
        let icons_dir = usr_share.as_ref().map(|s| s.join("icons"));
        let desktop_path = applications_dir
            .as_ref()
            .map(|d| d.join(format!("{}.desktop", app_id)));
        let metainfo_path = metainfo_dir
            .as_ref()
            .map(|d| d.join(format!("{}.metainfo.xml", app_id)));

        let launcher_path = match (kind, conf.start_command(), &usr_bin) {
            (PackageKind::Rpm | PackageKind::Deb, Some(cmd), Some(bin)) => Some(bin.join(cmd)),
            _ => None,
        };

        let manifest_path = match kind {
            PackageKind::Flatpak => Some(package_root.join(format!("{}.yml", app_id))),
            PackageKind::Rpm => Some(package_root.join(format!("{}.spec", name))),
            PackageKind::Deb => Some(build_root.join("DEBIAN/control")),
            PackageKind::Setup => Some(package_root.join(format!("{}.iss", conf.output_base_name()))),
            PackageKind::AppImage | PackageKind::Zip => None,
        };

        let output_name = match options.output_override() {
            Some(name) => name.to_string(),
            None => match kind {
                PackageKind::AppImage => appimage::output_name(conf, &package_arch),
                PackageKind::Flatpak => flatpak::output_name(conf, &package_arch),
                PackageKind::Rpm => rpm::output_name(conf, &package_arch),
                PackageKind::Deb => debian::output_name(conf, &package_arch),
                PackageKind::Setup => setup::output_name(conf, &package_arch),
                PackageKind::Zip => archive::output_name(conf, runtime),
            },
        };
        let output_dir = conf.output_directory().to_path_buf();
        let output_path = output_dir.join(&output_name);

        Ok(Self {
            kind,
            package_arch,
            package_root,
            build_root,
            app_bin,
            usr_bin,
            usr_share,
            metainfo_dir,
            applications_dir,
            icons_dir,
            desktop_path,
            metainfo_path,
            launcher_path,
            install_bin,
            install_exec,
            manifest_path,
            output_dir,
            output_name,
            output_path,
        })
    }

    pub fn kind(&self) -> PackageKind {
        self.kind
    }

    /// Kind-specific architecture token, e.g. `amd64` for Deb.
    pub fn package_arch(&self) -> &str {
        &self.package_arch
    }

    /// Per-build working directory holding the build root and manifests.
    pub fn package_root(&self) -> &Path {
        &self.package_root
    }

    /// Root of the staged package contents.
    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    /// Directory receiving the application files.
    pub fn app_bin(&self) -> &Path {
        &self.app_bin
    }

    pub fn usr_bin(&self) -> Option<&Path> {
        self.usr_bin.as_deref()
    }

    pub fn usr_share(&self) -> Option<&Path> {
        self.usr_share.as_deref()
    }

    pub fn metainfo_dir(&self) -> Option<&Path> {
        self.metainfo_dir.as_deref()
    }

    pub fn applications_dir(&self) -> Option<&Path> {
        self.applications_dir.as_deref()
    }

    pub fn icons_dir(&self) -> Option<&Path> {
        self.icons_dir.as_deref()
    }

    /// Staged desktop entry.
    pub fn desktop_path(&self) -> Option<&Path> {
        self.desktop_path.as_deref()
    }

    /// Staged AppStream metainfo.
    pub fn metainfo_path(&self) -> Option<&Path> {
        self.metainfo_path.as_deref()
    }

    /// Forwarding script in `usr/bin` (RPM and Debian with a start command).
    pub fn launcher_path(&self) -> Option<&Path> {
        self.launcher_path.as_deref()
    }

    /// Installed application directory as seen on the target system.
    pub fn install_bin(&self) -> Option<&str> {
        self.install_bin.as_deref()
    }

    /// Installed executable as seen on the target system.
    pub fn install_exec(&self) -> Option<&str> {
        self.install_exec.as_deref()
    }

    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{settings::describe_runtime, testing};

    #[test]
    fn test_launcher_stays_in_usr_bin() {
        let conf = testing::hello();
        let options = BuildOptions::default().work_root("/tmp/w");
        let layout = BuildLayout::new(&conf, &testing::linux_x64(), PackageKind::Deb, &options).unwrap();

        let launcher = layout.launcher_path().unwrap();
        assert_eq!(launcher.parent(), layout.usr_bin());
        assert!(launcher.starts_with(layout.build_root()));
        assert!(layout.package_root().starts_with("/tmp/w"));
    }

    #[test]
    fn test_runtime_id_must_be_one_segment() {
        let conf = testing::hello();
        let options = BuildOptions::default().work_root("/tmp/w");
        for id in ["../../linux-x64", "linux/x64", "win\\x64"] {
            let runtime = describe_runtime(Some(id));
            assert!(
                matches!(
                    BuildLayout::new(&conf, &runtime, PackageKind::Zip, &options),
                    Err(Error::InvalidArchitecture(_))
                ),
                "{id}"
            );
        }
    }
}
