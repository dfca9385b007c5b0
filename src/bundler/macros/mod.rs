//! Named `${MACRO}` substitution values.
//!
//! A [`MacroTable`] is built fresh for every package build from the
//! configuration, the runtime descriptor and the computed
//! [`BuildLayout`](crate::bundler::platform::BuildLayout). Templates (desktop
//! entries, AppStream metadata, publish commands) are then expanded against
//! it with [`MacroTable::expand`].
//!
//! Macro names are stable: renaming one breaks existing templates.

pub mod changelog;
pub mod description;
mod expander;

pub use expander::escape_xml;

use crate::bundler::{
    error::{Error, Result},
    platform::BuildLayout,
    settings::{Configuration, RuntimeDescriptor},
};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Every macro a template may reference.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum MacroId {
    AppBaseName,
    AppFriendlyName,
    AppId,
    AppShortSummary,
    AppLicenseId,
    AppVersion,
    PackageRelease,
    PackageName,
    PublisherName,
    PublisherCopyright,
    PublisherLinkName,
    PublisherLinkUrl,
    PublisherEmail,
    DesktopNoDisplay,
    DesktopIntegrate,
    DesktopTerminal,
    PrimeCategory,
    AppStreamDescriptionXml,
    AppStreamChangelogXml,
    DeployKind,
    RuntimeId,
    BuildArch,
    BuildDate,
    BuildYear,
    BuildRoot,
    BuildShare,
    BuildAppBin,
    InstallBin,
    InstallExec,
    OutputFile,
}

impl MacroId {
    /// All macros, in documentation order.
    pub const ALL: [MacroId; 30] = [
        MacroId::AppBaseName,
        MacroId::AppFriendlyName,
        MacroId::AppId,
        MacroId::AppShortSummary,
        MacroId::AppLicenseId,
        MacroId::AppVersion,
        MacroId::PackageRelease,
        MacroId::PackageName,
        MacroId::PublisherName,
        MacroId::PublisherCopyright,
        MacroId::PublisherLinkName,
        MacroId::PublisherLinkUrl,
        MacroId::PublisherEmail,
        MacroId::DesktopNoDisplay,
        MacroId::DesktopIntegrate,
        MacroId::DesktopTerminal,
        MacroId::PrimeCategory,
        MacroId::AppStreamDescriptionXml,
        MacroId::AppStreamChangelogXml,
        MacroId::DeployKind,
        MacroId::RuntimeId,
        MacroId::BuildArch,
        MacroId::BuildDate,
        MacroId::BuildYear,
        MacroId::BuildRoot,
        MacroId::BuildShare,
        MacroId::BuildAppBin,
        MacroId::InstallBin,
        MacroId::InstallExec,
        MacroId::OutputFile,
    ];

    /// Token name, as written inside `${...}`.
    pub fn name(&self) -> &'static str {
        match self {
            MacroId::AppBaseName => "APP_BASE_NAME",
            MacroId::AppFriendlyName => "APP_FRIENDLY_NAME",
            MacroId::AppId => "APP_ID",
            MacroId::AppShortSummary => "APP_SHORT_SUMMARY",
            MacroId::AppLicenseId => "APP_LICENSE_ID",
            MacroId::AppVersion => "APP_VERSION",
            MacroId::PackageRelease => "PACKAGE_RELEASE",
            MacroId::PackageName => "PACKAGE_NAME",
            MacroId::PublisherName => "PUBLISHER_NAME",
            MacroId::PublisherCopyright => "PUBLISHER_COPYRIGHT",
            MacroId::PublisherLinkName => "PUBLISHER_LINK_NAME",
            MacroId::PublisherLinkUrl => "PUBLISHER_LINK_URL",
            MacroId::PublisherEmail => "PUBLISHER_EMAIL",
            MacroId::DesktopNoDisplay => "DESKTOP_NODISPLAY",
            MacroId::DesktopIntegrate => "DESKTOP_INTEGRATE",
            MacroId::DesktopTerminal => "DESKTOP_TERMINAL",
            MacroId::PrimeCategory => "PRIME_CATEGORY",
            MacroId::AppStreamDescriptionXml => "APPSTREAM_DESCRIPTION_XML",
            MacroId::AppStreamChangelogXml => "APPSTREAM_CHANGELOG_XML",
            MacroId::DeployKind => "DEPLOY_KIND",
            MacroId::RuntimeId => "RUNTIME_ID",
            MacroId::BuildArch => "BUILD_ARCH",
            MacroId::BuildDate => "BUILD_DATE",
            MacroId::BuildYear => "BUILD_YEAR",
            MacroId::BuildRoot => "BUILD_ROOT",
            MacroId::BuildShare => "BUILD_SHARE",
            MacroId::BuildAppBin => "BUILD_APP_BIN",
            MacroId::InstallBin => "INSTALL_BIN",
            MacroId::InstallExec => "INSTALL_EXEC",
            MacroId::OutputFile => "OUTPUT_FILE",
        }
    }

    /// Short description shown in help output.
    pub fn help(&self) -> &'static str {
        match self {
            MacroId::AppBaseName => "Executable base name (AppBaseName)",
            MacroId::AppFriendlyName => "Human readable application name",
            MacroId::AppId => "Reverse-DNS application identifier",
            MacroId::AppShortSummary => "Single-line summary",
            MacroId::AppLicenseId => "SPDX license identifier",
            MacroId::AppVersion => "Application version without release",
            MacroId::PackageRelease => "Package release number",
            MacroId::PackageName => "Name used for output files",
            MacroId::PublisherName => "Publisher name",
            MacroId::PublisherCopyright => "Copyright notice",
            MacroId::PublisherLinkName => "Publisher link display name",
            MacroId::PublisherLinkUrl => "Publisher link URL",
            MacroId::PublisherEmail => "Publisher email",
            MacroId::DesktopNoDisplay => "true when the entry is hidden from menus",
            MacroId::DesktopIntegrate => "Inverse of DESKTOP_NODISPLAY",
            MacroId::DesktopTerminal => "true when the application runs in a terminal",
            MacroId::PrimeCategory => "Freedesktop main category",
            MacroId::AppStreamDescriptionXml => "Description converted to AppStream XML",
            MacroId::AppStreamChangelogXml => "Change file converted to AppStream release XML",
            MacroId::DeployKind => "Package kind being built, e.g. deb",
            MacroId::RuntimeId => "Runtime identifier, e.g. linux-x64",
            MacroId::BuildArch => "Architecture token for the package kind",
            MacroId::BuildDate => "Build date as yyyy-MM-dd (UTC)",
            MacroId::BuildYear => "Build year (UTC)",
            MacroId::BuildRoot => "Root of the staged package tree",
            MacroId::BuildShare => "Staged usr/share directory (Linux kinds only)",
            MacroId::BuildAppBin => "Directory receiving the application binaries",
            MacroId::InstallBin => "Installed location of the application directory",
            MacroId::InstallExec => "Installed path of the main executable",
            MacroId::OutputFile => "Path of the finished package",
        }
    }

    /// Whether the value is already XML and must not be escaped on insertion.
    pub fn is_xml(&self) -> bool {
        matches!(
            self,
            MacroId::AppStreamDescriptionXml | MacroId::AppStreamChangelogXml
        )
    }

    /// Looks up a macro by token name.
    pub fn from_name(name: &str) -> Option<MacroId> {
        MacroId::ALL.iter().copied().find(|m| m.name() == name)
    }
}

/// Resolved value for every [`MacroId`].
#[derive(Clone, Debug)]
pub struct MacroTable {
    values: HashMap<MacroId, String>,
}

impl MacroTable {
    /// Computes every macro value for one build.
    ///
    /// `changelog_xml` is the already-converted change file (empty when none).
    pub fn build(
        conf: &Configuration,
        runtime: &RuntimeDescriptor,
        layout: &BuildLayout,
        changelog_xml: &str,
        built: DateTime<Utc>,
    ) -> Self {
        let path = |p: Option<&std::path::Path>| {
            p.map(|p| p.display().to_string()).unwrap_or_default()
        };
        let flag = |b: bool| if b { "true" } else { "false" }.to_string();
        let opt = |s: Option<&str>| s.unwrap_or_default().to_string();

        let resolve = |id: MacroId| -> String {
            match id {
                MacroId::AppBaseName => conf.app_base_name().to_string(),
                MacroId::AppFriendlyName => conf.app_friendly_name().to_string(),
                MacroId::AppId => conf.app_id().to_string(),
                MacroId::AppShortSummary => conf.app_short_summary().to_string(),
                MacroId::AppLicenseId => conf.app_license_id().to_string(),
                MacroId::AppVersion => conf.app_version().version().to_string(),
                MacroId::PackageRelease => conf.app_version().release().to_string(),
                MacroId::PackageName => conf.output_base_name().to_string(),
                MacroId::PublisherName => conf.publisher_name().to_string(),
                MacroId::PublisherCopyright => opt(conf.publisher_copyright()),
                MacroId::PublisherLinkName => opt(conf.publisher_link_name()),
                MacroId::PublisherLinkUrl => opt(conf.publisher_link_url()),
                MacroId::PublisherEmail => opt(conf.publisher_email()),
                MacroId::DesktopNoDisplay => flag(conf.desktop_no_display()),
                MacroId::DesktopIntegrate => flag(!conf.desktop_no_display()),
                MacroId::DesktopTerminal => flag(conf.desktop_terminal()),
                MacroId::PrimeCategory => opt(conf.prime_category()),
                MacroId::AppStreamDescriptionXml => {
                    description::to_html(conf.app_description(), conf.app_short_summary())
                }
                MacroId::AppStreamChangelogXml => changelog_xml.to_string(),
                MacroId::DeployKind => layout.kind().short_name().to_string(),
                MacroId::RuntimeId => runtime.id().to_string(),
                MacroId::BuildArch => layout.package_arch().to_string(),
                MacroId::BuildDate => built.format("%Y-%m-%d").to_string(),
                MacroId::BuildYear => built.format("%Y").to_string(),
                MacroId::BuildRoot => path(Some(layout.build_root())),
                MacroId::BuildShare => path(layout.usr_share()),
                MacroId::BuildAppBin => path(Some(layout.app_bin())),
                MacroId::InstallBin => opt(layout.install_bin()),
                MacroId::InstallExec => opt(layout.install_exec()),
                MacroId::OutputFile => path(Some(layout.output_path())),
            }
        };

        let values = MacroId::ALL.iter().map(|&id| (id, resolve(id))).collect();
        Self { values }
    }

    /// Value of one macro.
    pub fn get(&self, id: MacroId) -> &str {
        self.values.get(&id).map(String::as_str).unwrap_or_default()
    }

    /// `(name, value)` pairs in [`MacroId::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (MacroId, &str)> {
        MacroId::ALL.iter().map(move |&id| (id, self.get(id)))
    }

    /// Checks that every macro has a name, help text and an entry.
    ///
    /// A failure here is a defect in this crate, not in user input.
    pub fn verify_complete(&self) -> Result<()> {
        for id in MacroId::ALL {
            if id.name().is_empty() || id.help().is_empty() || !self.values.contains_key(&id) {
                return Err(Error::Construction(format!(
                    "macro {:?} has no resolved value",
                    id
                )));
            }
        }
        Ok(())
    }

    /// Environment variables exported to publish commands, one per macro.
    pub fn env_vars(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|(id, value)| (id.name().to_string(), value.to_string()))
            .collect()
    }
}
