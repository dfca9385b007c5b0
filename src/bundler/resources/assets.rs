//! Locating bundled assets and external packaging tools.

use crate::bundler::{
    error::{Error, Result},
    settings::Arch,
};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Environment variable overriding the asset directory.
pub const ASSETS_ENV: &str = "KODEGEN_DEPLOY_ASSETS";

/// Where default icons and embedded tools live, and where external tools are searched.
///
/// Layout of the asset root:
///
/// ```text
/// assets/
/// ├── icons/generic.svg, generic.{N}x{N}.png, generic.ico
/// └── appimagetool/appimagetool-{x86_64|aarch64}.AppImage
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetLocator {
    root: PathBuf,
    search_path: Option<OsString>,
}

impl AssetLocator {
    /// Uses `root` as the asset directory and `PATH` for tool lookup.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            search_path: None,
        }
    }

    /// Finds the asset directory.
    ///
    /// Tries `$KODEGEN_DEPLOY_ASSETS`, then `assets/` beside the running
    /// executable, then this crate's own `assets/` directory.
    pub fn discover() -> Self {
        if let Some(dir) = std::env::var_os(ASSETS_ENV).filter(|v| !v.is_empty()) {
            return Self::new(dir);
        }

        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|p| p.join("assets")))
            .filter(|dir| dir.is_dir())
        {
            return Self::new(dir);
        }

        Self::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"))
    }

    /// Restricts external tool lookup to `path` (same syntax as `PATH`).
    pub fn with_search_path(mut self, path: impl Into<OsString>) -> Self {
        self.search_path = Some(path.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Existing default icon files under `icons/`, sorted by name.
    pub fn default_icons(&self) -> Vec<PathBuf> {
        let dir = self.root.join("icons");
        let Ok(read) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut icons: Vec<PathBuf> = read
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("generic."))
            })
            .collect();
        icons.sort();
        icons
    }

    /// Path of the embedded appimagetool for `arch`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArchitecture`] when no embedded build exists for `arch`.
    pub fn appimagetool(&self, arch: Arch) -> Result<PathBuf> {
        let token = match arch {
            Arch::X64 => "x86_64",
            Arch::Arm64 => "aarch64",
            other => return Err(Error::InvalidArchitecture(other.to_string())),
        };
        Ok(self
            .root
            .join("appimagetool")
            .join(format!("appimagetool-{}.AppImage", token)))
    }

    /// Looks up an executable on the configured search path.
    pub fn find_tool(&self, name: &str) -> Option<PathBuf> {
        let found = match &self.search_path {
            Some(paths) => {
                let cwd = std::env::current_dir().unwrap_or_else(|_| self.root.clone());
                which::which_in(name, Some(paths), cwd)
            }
            None => which::which(name),
        };

        match found {
            Ok(path) => {
                log::debug!("Found {} at: {}", name, path.display());
                Some(path)
            }
            Err(e) => {
                log::debug!("{} not found: {}", name, e);
                None
            }
        }
    }
}

impl Default for AssetLocator {
    fn default() -> Self {
        Self::discover()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_icons_only_lists_generic_files() {
        let dir = tempfile::tempdir().unwrap();
        let icons = dir.path().join("icons");
        std::fs::create_dir_all(&icons).unwrap();
        for name in ["generic.svg", "generic.64.png", "other.svg"] {
            std::fs::write(icons.join(name), "x").unwrap();
        }

        let found = AssetLocator::new(dir.path()).default_icons();
        assert_eq!(found, vec![icons.join("generic.64.png"), icons.join("generic.svg")]);
    }

    #[test]
    fn test_missing_icon_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AssetLocator::new(dir.path()).default_icons().is_empty());
    }

    #[test]
    fn test_appimagetool_requires_supported_arch() {
        let locator = AssetLocator::new("/assets");
        assert_eq!(
            locator.appimagetool(Arch::Arm64).unwrap(),
            Path::new("/assets/appimagetool/appimagetool-aarch64.AppImage")
        );
        assert!(matches!(
            locator.appimagetool(Arch::Arm),
            Err(Error::InvalidArchitecture(_))
        ));
    }

    #[test]
    fn test_empty_search_path_finds_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let locator = AssetLocator::new(dir.path()).with_search_path(dir.path().as_os_str());
        assert_eq!(locator.find_tool("definitely-not-a-real-tool"), None);
    }
}
