//! Icon classification and placement.
//!
//! Icon sources are recognised by file name:
//!
//! | Source | Role |
//! |--------|------|
//! | `Name.svg` | scalable |
//! | `Name.32x32.png`, `Name.32.png` | fixed-size PNG |
//! | `Name.ico` | Windows icon |
//!
//! Linux kinds install the scalable icon and every standard-size PNG into the
//! hicolor theme. Setup uses a single ICO and installs nothing else. Zip
//! carries no icons.

use crate::bundler::platform::PackageKind;
use std::path::{Path, PathBuf};

/// PNG sizes installed into the hicolor icon theme.
pub const STANDARD_SIZES: [u32; 9] = [16, 24, 32, 48, 64, 96, 128, 256, 512];

/// What an icon source file is used for.
#[derive(Clone, Copy, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconRole {
    /// SVG.
    Scalable,
    /// Square PNG of the given edge length.
    Png(u32),
    /// Windows `.ico`.
    Ico,
}

impl IconRole {
    /// Classifies a source path by extension and embedded size.
    ///
    /// PNG files without a recognisable size return `None`.
    pub fn classify(path: &Path) -> Option<IconRole> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(IconRole::Scalable),
            "ico" => Some(IconRole::Ico),
            "png" => {
                let stem = path.file_stem()?.to_str()?;
                let size = stem.rsplit('.').next()?;
                let size = match size.split_once(['x', 'X']) {
                    Some((w, h)) if w == h => w,
                    Some(_) => return None,
                    None => size,
                };
                size.parse().ok().filter(|n| *n > 0).map(IconRole::Png)
            }
            _ => None,
        }
    }
}

/// One icon installed into the build tree.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct IconEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub role: IconRole,
}

/// Icons to install for one package kind, plus the single representative icon.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
pub struct IconSet {
    entries: Vec<IconEntry>,
    primary: Option<PathBuf>,
}

impl IconSet {
    /// Selects and places icons from `sources`.
    ///
    /// For Linux kinds, destinations are
    /// `{build_root}/usr/share/icons/hicolor/{N}x{N}/apps/{app_id}.png` and
    /// `.../scalable/apps/{app_id}.svg`; the first source for a role wins.
    /// The primary icon is the SVG if present, else the largest PNG.
    /// For Setup the primary icon is the first ICO and the set is empty.
    pub fn resolve(sources: &[PathBuf], kind: PackageKind, build_root: &Path, app_id: &str) -> Self {
        let classified: Vec<(&PathBuf, IconRole)> = sources
            .iter()
            .filter_map(|p| IconRole::classify(p).map(|role| (p, role)))
            .collect();

        match kind {
            PackageKind::Zip => IconSet::default(),
            PackageKind::Setup => IconSet {
                entries: Vec::new(),
                primary: classified
                    .iter()
                    .find(|(_, role)| *role == IconRole::Ico)
                    .map(|(p, _)| (*p).clone()),
            },
            PackageKind::AppImage | PackageKind::Flatpak | PackageKind::Rpm | PackageKind::Deb => {
                let hicolor = build_root.join("usr/share/icons/hicolor");
                let mut entries: Vec<IconEntry> = Vec::new();

                for (source, role) in &classified {
                    let destination = match role {
                        IconRole::Scalable => hicolor.join("scalable/apps").join(format!("{}.svg", app_id)),
                        IconRole::Png(size) if STANDARD_SIZES.contains(size) => hicolor
                            .join(format!("{0}x{0}/apps", size))
                            .join(format!("{}.png", app_id)),
                        IconRole::Png(size) => {
                            log::debug!("Skipping {}: {}px is not a standard icon size", source.display(), size);
                            continue;
                        }
                        IconRole::Ico => continue,
                    };
                    if entries.iter().any(|e| e.role == *role) {
                        continue;
                    }
                    entries.push(IconEntry {
                        source: (*source).clone(),
                        destination,
                        role: *role,
                    });
                }

                let primary = entries
                    .iter()
                    .find(|e| e.role == IconRole::Scalable)
                    .or_else(|| {
                        entries
                            .iter()
                            .filter_map(|e| match e.role {
                                IconRole::Png(size) => Some((size, e)),
                                _ => None,
                            })
                            .max_by_key(|(size, _)| *size)
                            .map(|(_, e)| e)
                    })
                    .map(|e| e.source.clone());

                IconSet { entries, primary }
            }
        }
    }

    /// Installed icons.
    pub fn entries(&self) -> &[IconEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The single representative icon.
    pub fn primary(&self) -> Option<&Path> {
        self.primary.as_deref()
    }
}
