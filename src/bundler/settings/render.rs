//! Writes a [`Configuration`] back out as a document.

use super::{
    config::Configuration,
    fields::{FieldKey, Mode},
};
use std::{fmt::Write as _, path::Path};

/// Output flavour of [`Configuration::render`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum RenderStyle {
    /// Assignments only.
    #[default]
    Plain,
    /// Assignments with section banners and a comment describing each key.
    Commented,
}

enum Rendered {
    Text(Option<String>),
    Lines(Vec<String>),
}

impl Configuration {
    /// Renders the configuration in document syntax.
    ///
    /// Parsing the result with the same base directory yields an equal
    /// configuration. Paths below the base directory are written relative to it.
    pub fn render(&self, style: RenderStyle) -> String {
        let mut out = String::new();
        let mut section = "";

        if style == RenderStyle::Commented {
            out.push_str("# Deploy configuration for kodegen_bundler_deploy.\n");
            out.push_str("# Values may be quoted; multi-line values are enclosed in \"\"\".\n");
            out.push_str("# Macros such as ${APP_ID} are expanded in templates and publish commands.\n");
        }

        for key in FieldKey::ALL {
            if style == RenderStyle::Commented {
                if key.section() != section {
                    section = key.section();
                    let _ = write!(out, "\n########################################\n# {}\n########################################\n", section);
                }
                let requirement = match key.mode() {
                    Mode::Mandatory => " Mandatory.",
                    _ => "",
                };
                let relative = if key.is_path() {
                    " Relative to this file."
                } else {
                    ""
                };
                let _ = write!(out, "\n# {}{}{}\n", key.help(), requirement, relative);
            }

            match self.rendered(*key) {
                Rendered::Text(None) => {
                    let _ = writeln!(out, "{} =", key.name());
                }
                Rendered::Text(Some(value)) if value.contains('\n') => {
                    write_block(&mut out, key.name(), value.lines());
                }
                Rendered::Text(Some(value)) => {
                    let _ = writeln!(out, "{} = {}", key.name(), quote(&value));
                }
                Rendered::Lines(lines) if lines.is_empty() => {
                    let _ = writeln!(out, "{} =", key.name());
                }
                Rendered::Lines(lines) => {
                    write_block(&mut out, key.name(), lines.iter().map(String::as_str));
                }
            }
        }

        out
    }

    fn rendered(&self, key: FieldKey) -> Rendered {
        let text = |s: &str| Rendered::Text(Some(s.to_string()));
        let opt = |s: Option<&str>| Rendered::Text(s.map(str::to_string));
        let flag = |b: bool| text(if b { "true" } else { "false" });
        let path = |p: Option<&Path>| Rendered::Text(p.map(|p| self.relative(p)));

        match key {
            FieldKey::AppBaseName => text(self.app_base_name()),
            FieldKey::AppFriendlyName => text(self.app_friendly_name()),
            FieldKey::AppId => text(self.app_id()),
            FieldKey::AppVersionRelease => Rendered::Text(Some(self.app_version().to_string())),
            FieldKey::AppShortSummary => text(self.app_short_summary()),
            FieldKey::AppDescription => Rendered::Lines(self.app_description().to_vec()),
            FieldKey::AppLicenseId => text(self.app_license_id()),
            FieldKey::AppLicenseFile => path(self.app_license_file()),
            FieldKey::AppChangeFile => path(self.app_change_file()),
            FieldKey::PublisherName => text(self.publisher_name()),
            FieldKey::PublisherCopyright => opt(self.publisher_copyright()),
            FieldKey::PublisherLinkName => opt(self.publisher_link_name()),
            FieldKey::PublisherLinkUrl => opt(self.publisher_link_url()),
            FieldKey::PublisherEmail => opt(self.publisher_email()),
            FieldKey::DesktopNoDisplay => flag(self.desktop_no_display()),
            FieldKey::DesktopTerminal => flag(self.desktop_terminal()),
            FieldKey::DesktopFile => path(self.desktop_file()),
            FieldKey::StartCommand => opt(self.start_command()),
            FieldKey::PrimeCategory => opt(self.prime_category()),
            FieldKey::MetaFile => path(self.meta_file()),
            FieldKey::IconFiles => Rendered::Lines(
                self.icon_files().iter().map(|p| self.relative(p)).collect(),
            ),
            FieldKey::PublishCommand => opt(self.publish_command()),
            FieldKey::PublishDirectory => path(self.publish_directory()),
            FieldKey::PackageName => opt(self.package_name()),
            FieldKey::OutputDirectory => path(Some(self.output_directory())),
            FieldKey::AppImageArgs => opt(self.appimage_args()),
            FieldKey::AppImageVersionOutput => flag(self.appimage_version_output()),
            FieldKey::FlatpakPlatformRuntime => text(self.flatpak_platform_runtime()),
            FieldKey::FlatpakPlatformSdk => text(self.flatpak_platform_sdk()),
            FieldKey::FlatpakPlatformVersion => text(self.flatpak_platform_version()),
            FieldKey::FlatpakFinishArgs => Rendered::Lines(self.flatpak_finish_args().to_vec()),
            FieldKey::FlatpakBuilderArgs => opt(self.flatpak_builder_args()),
            FieldKey::RpmAutoReq => flag(self.rpm_auto_req()),
            FieldKey::RpmAutoProv => flag(self.rpm_auto_prov()),
            FieldKey::RpmRequires => Rendered::Lines(self.rpm_requires().to_vec()),
            FieldKey::DebianRecommends => Rendered::Lines(self.debian_recommends().to_vec()),
            FieldKey::SetupGroupName => opt(self.setup_group_name_raw()),
            FieldKey::SetupAdminInstall => flag(self.setup_admin_install()),
            FieldKey::SetupCommandPrompt => opt(self.setup_command_prompt()),
            FieldKey::SetupMinWindowsVersion => text(self.setup_min_windows_version()),
            FieldKey::SetupSignTool => opt(self.setup_sign_tool()),
            FieldKey::SetupSuffixOutput => opt(self.setup_suffix_output()),
            FieldKey::SetupVersionOutput => flag(self.setup_version_output()),
            FieldKey::SetupUninstallScript => opt(self.setup_uninstall_script()),
        }
    }

    fn relative(&self, path: &Path) -> String {
        match path.strip_prefix(self.base_dir()) {
            Ok(rel) if !rel.as_os_str().is_empty() => rel.display().to_string(),
            _ => path.display().to_string(),
        }
    }
}

fn write_block<'a>(out: &mut String, key: &str, lines: impl Iterator<Item = &'a str>) {
    let _ = writeln!(out, "{} = \"\"\"", key);
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("\"\"\"\n");
}

/// Protects values whose edges the reader would otherwise strip.
fn quote(value: &str) -> String {
    if value.starts_with('"') {
        format!("'{}'", value)
    } else if value.starts_with('\'') {
        format!("\"{}\"", value)
    } else {
        value.to_string()
    }
}
