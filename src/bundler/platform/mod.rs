//! Package kinds and their layout, manifest and command generation.
//!
//! # Supported Kinds
//!
//! | Kind | Output | Tool | Module |
//! |------|--------|------|--------|
//! | AppImage | `.AppImage` | appimagetool | [`linux::appimage`] |
//! | Flatpak | `.flatpak` | flatpak-builder, flatpak | [`linux::flatpak`] |
//! | Rpm | `.rpm` | rpmbuild | [`linux::rpm`] |
//! | Deb | `.deb` | dpkg-deb | [`linux::debian`] |
//! | Setup | `.exe` | Inno Setup (`iscc`) | [`windows::setup`] |
//! | Zip | `.zip` | none | [`archive`] |
//!
//! Every kind is available on every host; whether the external tool can
//! actually run is reported as a warning when the [`PackageBuilder`] is
//! constructed.

pub mod archive;
mod layout;
pub mod linux;
mod package;
pub mod windows;

pub use layout::BuildLayout;
pub use package::{BuildPlan, PackageBuilder, PackageCommand};

use crate::bundler::error::Error;
use std::{fmt, str::FromStr};

/// Output artifact types.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_deploy::bundler::PackageKind;
///
/// let kind: PackageKind = "deb".parse().unwrap();
/// assert!(kind.targets_linux());
/// assert_eq!(kind.to_string(), "deb");
/// ```
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, Hash, serde::Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    /// Self-contained Linux executable.
    #[value(name = "appimage")]
    AppImage,
    /// Flatpak single-file bundle.
    Flatpak,
    /// RPM package for Fedora, RHEL, openSUSE and derivatives.
    Rpm,
    /// Debian package for Debian, Ubuntu and derivatives.
    Deb,
    /// Windows installer compiled by Inno Setup.
    Setup,
    /// Plain zip archive of the published application.
    Zip,
}

impl PackageKind {
    /// All kinds.
    pub const ALL: [PackageKind; 6] = [
        PackageKind::AppImage,
        PackageKind::Flatpak,
        PackageKind::Rpm,
        PackageKind::Deb,
        PackageKind::Setup,
        PackageKind::Zip,
    ];

    /// Lowercase identifier used on the command line and in paths.
    pub fn short_name(&self) -> &'static str {
        match self {
            PackageKind::AppImage => "appimage",
            PackageKind::Flatpak => "flatpak",
            PackageKind::Rpm => "rpm",
            PackageKind::Deb => "deb",
            PackageKind::Setup => "setup",
            PackageKind::Zip => "zip",
        }
    }

    /// File extension of the finished package, including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            PackageKind::AppImage => ".AppImage",
            PackageKind::Flatpak => ".flatpak",
            PackageKind::Rpm => ".rpm",
            PackageKind::Deb => ".deb",
            PackageKind::Setup => ".exe",
            PackageKind::Zip => ".zip",
        }
    }

    /// Whether the package installs on Windows.
    pub fn targets_windows(&self) -> bool {
        matches!(self, PackageKind::Setup)
    }

    /// Whether the package installs on Linux.
    ///
    /// Zip is neutral and targets neither.
    pub fn targets_linux(&self) -> bool {
        !matches!(self, PackageKind::Setup | PackageKind::Zip)
    }
}

impl fmt::Display for PackageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for PackageKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageKind::ALL
            .iter()
            .copied()
            .find(|k| k.short_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::GenericError(format!("unknown package kind: {}", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_predicates() {
        assert!(PackageKind::Setup.targets_windows());
        assert!(!PackageKind::Setup.targets_linux());
        assert!(!PackageKind::Zip.targets_windows());
        assert!(!PackageKind::Zip.targets_linux());
        for kind in [PackageKind::AppImage, PackageKind::Flatpak, PackageKind::Rpm, PackageKind::Deb] {
            assert!(kind.targets_linux());
            assert!(!kind.targets_windows());
        }
    }

    #[test]
    fn test_parse_round_trip() {
        for kind in PackageKind::ALL {
            assert_eq!(kind.to_string().parse::<PackageKind>().unwrap(), kind);
        }
        assert_eq!("AppImage".parse::<PackageKind>().unwrap(), PackageKind::AppImage);
        assert!("msi".parse::<PackageKind>().is_err());
    }
}
