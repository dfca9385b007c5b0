//! Configuration key catalog and typed value readers.

use super::document::Document;
use crate::bundler::error::{Error, Result};
use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

/// How a key's raw text is interpreted.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Must be present and non-blank.
    Mandatory,
    /// May be absent or blank.
    Optional,
    /// `true` or `false`, case-insensitive; absent means `false`.
    Boolean,
    /// Entries separated by `;` or newlines.
    List,
    /// Text block whose line structure is preserved.
    MultiLine,
}

macro_rules! field_keys {
    ($( $variant:ident => $name:literal, $mode:ident, $path:literal, $section:literal, $help:literal; )+) => {
        /// Every key a deploy configuration understands.
        #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
        pub enum FieldKey {
            $(
                #[doc = $help]
                $variant,
            )+
        }

        impl FieldKey {
            /// All keys in document order.
            pub const ALL: &'static [FieldKey] = &[$(FieldKey::$variant),+];

            /// Key as written in documents.
            pub fn name(&self) -> &'static str {
                match self {
                    $(FieldKey::$variant => $name,)+
                }
            }

            /// Value interpretation.
            pub fn mode(&self) -> Mode {
                match self {
                    $(FieldKey::$variant => Mode::$mode,)+
                }
            }

            /// Whether values are filesystem paths resolved against the document directory.
            pub fn is_path(&self) -> bool {
                match self {
                    $(FieldKey::$variant => $path,)+
                }
            }

            /// Heading under which the key is rendered.
            pub fn section(&self) -> &'static str {
                match self {
                    $(FieldKey::$variant => $section,)+
                }
            }

            /// One-line description used in commented renderings.
            pub fn help(&self) -> &'static str {
                match self {
                    $(FieldKey::$variant => $help,)+
                }
            }
        }
    };
}

field_keys! {
    AppBaseName => "AppBaseName", Mandatory, false, "APP PREAMBLE",
        "Base name of the application executable, without extension or whitespace.";
    AppFriendlyName => "AppFriendlyName", Mandatory, false, "APP PREAMBLE",
        "Human readable application name.";
    AppId => "AppId", Mandatory, false, "APP PREAMBLE",
        "Reverse-DNS application identifier, e.g. net.example.helloworld.";
    AppVersionRelease => "AppVersionRelease", Mandatory, false, "APP PREAMBLE",
        "Version and package release as MAJOR.MINOR.PATCH[RELEASE]; release defaults to 1.";
    AppShortSummary => "AppShortSummary", Mandatory, false, "APP PREAMBLE",
        "Single-line summary of the application.";
    AppDescription => "AppDescription", MultiLine, false, "APP PREAMBLE",
        "Longer description. Blank lines separate paragraphs; lines starting '-', '*' or '+' are bullets.";
    AppLicenseId => "AppLicenseId", Mandatory, false, "APP PREAMBLE",
        "SPDX license identifier.";
    AppLicenseFile => "AppLicenseFile", Optional, true, "APP PREAMBLE",
        "Optional license file copied next to the installed executable.";
    AppChangeFile => "AppChangeFile", Optional, true, "APP PREAMBLE",
        "Optional changelog: '+ VERSION;DATE' starts a release, '- text' adds an item.";
    PublisherName => "PublisherName", Mandatory, false, "PUBLISHER",
        "Publisher or author name.";
    PublisherCopyright => "PublisherCopyright", Optional, false, "PUBLISHER",
        "Copyright notice.";
    PublisherLinkName => "PublisherLinkName", Optional, false, "PUBLISHER",
        "Display name for the publisher link.";
    PublisherLinkUrl => "PublisherLinkUrl", Optional, false, "PUBLISHER",
        "Publisher or project homepage.";
    PublisherEmail => "PublisherEmail", Optional, false, "PUBLISHER",
        "Maintainer email address.";
    DesktopNoDisplay => "DesktopNoDisplay", Boolean, false, "DESKTOP INTEGRATION",
        "Hide the application from desktop menus.";
    DesktopTerminal => "DesktopTerminal", Boolean, false, "DESKTOP INTEGRATION",
        "Run the application in a terminal.";
    DesktopFile => "DesktopFile", Optional, true, "DESKTOP INTEGRATION",
        "Custom desktop entry template; macros are expanded. A default is generated when absent.";
    StartCommand => "StartCommand", Optional, false, "DESKTOP INTEGRATION",
        "Launcher command installed in /usr/bin by RPM and Debian packages.";
    PrimeCategory => "PrimeCategory", Optional, false, "DESKTOP INTEGRATION",
        "Freedesktop main category, e.g. Development or Utility.";
    MetaFile => "MetaFile", Optional, true, "DESKTOP INTEGRATION",
        "Custom AppStream metainfo template; macros are expanded with XML escaping.";
    IconFiles => "IconFiles", List, true, "DESKTOP INTEGRATION",
        "Icon files: Name.svg, Name.NxN.png or Name.N.png, and Name.ico for Windows.";
    PublishCommand => "PublishCommand", Optional, false, "PUBLISH OPERATION",
        "Shell command that writes the application into ${BUILD_APP_BIN}; macros are exported as environment variables.";
    PublishDirectory => "PublishDirectory", Optional, true, "PUBLISH OPERATION",
        "Directory of prebuilt application files copied into ${BUILD_APP_BIN}.";
    PackageName => "PackageName", Optional, false, "PUBLISH OPERATION",
        "Name used for output files in place of AppBaseName.";
    OutputDirectory => "OutputDirectory", Optional, true, "PUBLISH OPERATION",
        "Directory receiving finished packages. Defaults to Deploy/OUT.";
    AppImageArgs => "AppImageArgs", Optional, false, "APPIMAGE OPTIONS",
        "Additional appimagetool arguments.";
    AppImageVersionOutput => "AppImageVersionOutput", Boolean, false, "APPIMAGE OPTIONS",
        "Include version and release in the AppImage file name.";
    FlatpakPlatformRuntime => "FlatpakPlatformRuntime", Mandatory, false, "FLATPAK OPTIONS",
        "Flatpak runtime, e.g. org.freedesktop.Platform.";
    FlatpakPlatformSdk => "FlatpakPlatformSdk", Mandatory, false, "FLATPAK OPTIONS",
        "Flatpak SDK, e.g. org.freedesktop.Sdk.";
    FlatpakPlatformVersion => "FlatpakPlatformVersion", Mandatory, false, "FLATPAK OPTIONS",
        "Flatpak runtime version.";
    FlatpakFinishArgs => "FlatpakFinishArgs", List, false, "FLATPAK OPTIONS",
        "Sandbox permissions, one per line, e.g. --socket=wayland.";
    FlatpakBuilderArgs => "FlatpakBuilderArgs", Optional, false, "FLATPAK OPTIONS",
        "Additional flatpak-builder arguments.";
    RpmAutoReq => "RpmAutoReq", Boolean, false, "RPM OPTIONS",
        "Let rpmbuild compute dependencies automatically.";
    RpmAutoProv => "RpmAutoProv", Boolean, false, "RPM OPTIONS",
        "Let rpmbuild compute provided capabilities automatically.";
    RpmRequires => "RpmRequires", List, false, "RPM OPTIONS",
        "Explicit RPM dependencies, one per line.";
    DebianRecommends => "DebianRecommends", List, false, "DEBIAN OPTIONS",
        "Recommended Debian packages, one per line.";
    SetupGroupName => "SetupGroupName", Optional, false, "WINDOWS SETUP OPTIONS",
        "Start menu group. Defaults to AppFriendlyName.";
    SetupAdminInstall => "SetupAdminInstall", Boolean, false, "WINDOWS SETUP OPTIONS",
        "Install for all users with administrator privileges.";
    SetupCommandPrompt => "SetupCommandPrompt", Optional, false, "WINDOWS SETUP OPTIONS",
        "Title of an optional start menu console shortcut opened in the install directory.";
    SetupMinWindowsVersion => "SetupMinWindowsVersion", Mandatory, false, "WINDOWS SETUP OPTIONS",
        "Minimum Windows version, e.g. 10.";
    SetupSignTool => "SetupSignTool", Optional, false, "WINDOWS SETUP OPTIONS",
        "Sign tool definition passed to the installer compiler.";
    SetupSuffixOutput => "SetupSuffixOutput", Optional, false, "WINDOWS SETUP OPTIONS",
        "Text appended to the name of the setup file, e.g. Setup.";
    SetupVersionOutput => "SetupVersionOutput", Boolean, false, "WINDOWS SETUP OPTIONS",
        "Include version and release in the setup file name.";
    SetupUninstallScript => "SetupUninstallScript", Optional, false, "WINDOWS SETUP OPTIONS",
        "Script in the install directory run on uninstall.";
}

impl FieldKey {
    /// Looks up a key by its exact, case-sensitive name.
    pub fn from_name(name: &str) -> Option<FieldKey> {
        FieldKey::ALL.iter().copied().find(|k| k.name() == name)
    }
}

/// Reads typed values from a [`Document`].
pub(crate) struct FieldReader<'a> {
    doc: &'a Document,
    base_dir: &'a Path,
    strict: bool,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(doc: &'a Document, base_dir: &'a Path, strict: bool) -> Self {
        for entry in doc.entries() {
            if FieldKey::from_name(&entry.key).is_none() {
                log::warn!("Ignoring unknown key {} on line {}", entry.key, entry.line);
            }
        }
        Self {
            doc,
            base_dir,
            strict,
        }
    }

    fn raw(&self, key: FieldKey) -> Option<&'a str> {
        self.doc
            .get(key.name())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub(crate) fn mandatory(&self, key: FieldKey) -> Result<String> {
        self.raw(key)
            .map(str::to_string)
            .ok_or_else(|| Error::MissingValue {
                key: key.name().to_string(),
            })
    }

    pub(crate) fn optional(&self, key: FieldKey) -> Option<String> {
        self.raw(key).map(str::to_string)
    }

    pub(crate) fn boolean(&self, key: FieldKey) -> Result<bool> {
        match self.raw(key) {
            None => Ok(false),
            Some(v) if v.eq_ignore_ascii_case("true") => Ok(true),
            Some(v) if v.eq_ignore_ascii_case("false") => Ok(false),
            Some(v) => Err(Error::InvalidFormat {
                key: key.name().to_string(),
                value: v.to_string(),
                reason: "expected true or false".into(),
            }),
        }
    }

    pub(crate) fn list(&self, key: FieldKey) -> Vec<String> {
        self.raw(key)
            .map(|v| {
                v.split([';', '\n'])
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn multiline(&self, key: FieldKey) -> Vec<String> {
        self.raw(key)
            .map(|v| v.lines().map(|l| l.trim().to_string()).collect())
            .unwrap_or_default()
    }

    /// Resolves a path value without checking that it exists.
    pub(crate) fn resolve(&self, key: FieldKey, value: &str) -> Result<PathBuf> {
        Path::new(value)
            .absolutize_from(self.base_dir)
            .map(|p| p.into_owned())
            .map_err(|e| Error::InvalidFormat {
                key: key.name().to_string(),
                value: value.to_string(),
                reason: e.to_string(),
            })
    }

    fn checked(&self, key: FieldKey, value: &str) -> Result<PathBuf> {
        let path = self.resolve(key, value)?;
        if self.strict && !path.exists() {
            return Err(Error::FileNotFound {
                key: key.name().to_string(),
                path,
            });
        }
        Ok(path)
    }

    pub(crate) fn path(&self, key: FieldKey) -> Result<Option<PathBuf>> {
        self.raw(key).map(|v| self.checked(key, v)).transpose()
    }

    pub(crate) fn path_list(&self, key: FieldKey) -> Result<Vec<PathBuf>> {
        self.list(key)
            .iter()
            .map(|v| self.checked(key, v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_for(text: &str) -> Document {
        Document::parse(text).unwrap()
    }

    #[test]
    fn test_names_are_unique_and_resolvable() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::from_name(key.name()), Some(*key));
            assert!(!key.help().is_empty());
        }
        assert_eq!(FieldKey::from_name("appbasename"), None);
    }

    #[test]
    fn test_boolean_values() {
        let doc = reader_for("DesktopTerminal = TRUE\nDesktopNoDisplay = maybe");
        let base = std::env::temp_dir();
        let r = FieldReader::new(&doc, &base, false);
        assert!(r.boolean(FieldKey::DesktopTerminal).unwrap());
        assert!(!r.boolean(FieldKey::RpmAutoReq).unwrap());
        assert!(matches!(
            r.boolean(FieldKey::DesktopNoDisplay),
            Err(Error::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_list_splits_on_semicolons_and_newlines() {
        let doc = reader_for("RpmRequires = \"\"\"\na; b\n\nc;\n\"\"\"");
        let base = std::env::temp_dir();
        let r = FieldReader::new(&doc, &base, false);
        assert_eq!(r.list(FieldKey::RpmRequires), vec!["a", "b", "c"]);
        assert!(r.list(FieldKey::DebianRecommends).is_empty());
    }

    #[test]
    fn test_strict_paths_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let doc = reader_for("AppLicenseFile = LICENSE");

        let lenient = FieldReader::new(&doc, dir.path(), false);
        let path = lenient.path(FieldKey::AppLicenseFile).unwrap().unwrap();
        assert_eq!(path, dir.path().join("LICENSE"));

        let strict = FieldReader::new(&doc, dir.path(), true);
        assert!(matches!(
            strict.path(FieldKey::AppLicenseFile),
            Err(Error::FileNotFound { .. })
        ));

        std::fs::write(dir.path().join("LICENSE"), "MIT").unwrap();
        assert!(strict.path(FieldKey::AppLicenseFile).unwrap().is_some());
    }
}
