//! The validated deploy configuration.

use super::{
    document::Document,
    fields::{FieldKey, FieldReader},
};
use crate::bundler::error::{Error, ErrorExt, Result};
use path_absolutize::Absolutize;
use std::{
    fmt,
    path::{Path, PathBuf},
};

/// Application version with package release, written `5.4.3[2]`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct AppVersion {
    version: String,
    release: String,
}

impl AppVersion {
    /// Parses `MAJOR.MINOR.PATCH[RELEASE]`; the release defaults to `1`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidFormat`] when the version is not semantic or the
    /// release is empty or contains characters packaging tools reject.
    pub fn parse(value: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidFormat {
            key: FieldKey::AppVersionRelease.name().to_string(),
            value: value.to_string(),
            reason,
        };

        let trimmed = value.trim();
        let (version, release) = match trimmed.split_once('[') {
            Some((v, r)) => {
                let r = r
                    .strip_suffix(']')
                    .ok_or_else(|| invalid("release must be closed with ']'".into()))?;
                (v.trim(), r.trim())
            }
            None => (trimmed, "1"),
        };

        semver::Version::parse(version)
            .map_err(|e| invalid(format!("expected MAJOR.MINOR.PATCH: {}", e)))?;

        if release.is_empty()
            || !release
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '~'))
        {
            return Err(invalid(format!("invalid release '{}'", release)));
        }

        Ok(Self {
            version: version.to_string(),
            release: release.to_string(),
        })
    }

    /// The `MAJOR.MINOR.PATCH` part.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The package release.
    pub fn release(&self) -> &str {
        &self.release
    }
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.version, self.release)
    }
}

/// Immutable, validated application description read from a `.deploy.conf` document.
///
/// Every mandatory value is non-empty and every path has been resolved against
/// the document directory. In strict mode, path values are known to exist.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_deploy::bundler::Configuration;
///
/// # fn example() -> kodegen_bundler_deploy::bundler::Result<()> {
/// let conf = Configuration::from_file("HelloWorld.deploy.conf")?;
/// println!("{} {}", conf.app_id(), conf.app_version());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    base_dir: PathBuf,

    app_base_name: String,
    app_friendly_name: String,
    app_id: String,
    app_version: AppVersion,
    app_short_summary: String,
    app_description: Vec<String>,
    app_license_id: String,
    app_license_file: Option<PathBuf>,
    app_change_file: Option<PathBuf>,

    publisher_name: String,
    publisher_copyright: Option<String>,
    publisher_link_name: Option<String>,
    publisher_link_url: Option<String>,
    publisher_email: Option<String>,

    desktop_no_display: bool,
    desktop_terminal: bool,
    desktop_file: Option<PathBuf>,
    start_command: Option<String>,
    prime_category: Option<String>,
    meta_file: Option<PathBuf>,
    icon_files: Vec<PathBuf>,

    publish_command: Option<String>,
    publish_directory: Option<PathBuf>,
    package_name: Option<String>,
    output_directory: PathBuf,

    appimage_args: Option<String>,
    appimage_version_output: bool,

    flatpak_platform_runtime: String,
    flatpak_platform_sdk: String,
    flatpak_platform_version: String,
    flatpak_finish_args: Vec<String>,
    flatpak_builder_args: Option<String>,

    rpm_auto_req: bool,
    rpm_auto_prov: bool,
    rpm_requires: Vec<String>,

    debian_recommends: Vec<String>,

    setup_group_name: Option<String>,
    setup_admin_install: bool,
    setup_command_prompt: Option<String>,
    setup_min_windows_version: String,
    setup_sign_tool: Option<String>,
    setup_suffix_output: Option<String>,
    setup_version_output: bool,
    setup_uninstall_script: Option<String>,
}

impl Configuration {
    /// Parses and validates document text.
    ///
    /// Relative paths resolve against `base_dir`. With `strict` set, every
    /// path value except `OutputDirectory` must exist.
    ///
    /// # Errors
    ///
    /// Any validation error; see [`Error::is_validation`].
    pub fn parse(text: &str, base_dir: impl AsRef<Path>, strict: bool) -> Result<Self> {
        let base_dir = base_dir
            .as_ref()
            .absolutize()
            .fs_context("resolving base directory", base_dir.as_ref())?
            .into_owned();

        let doc = Document::parse(text)?;
        let r = FieldReader::new(&doc, &base_dir, strict);

        let app_base_name = r.mandatory(FieldKey::AppBaseName)?;
        if app_base_name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidFormat {
                key: FieldKey::AppBaseName.name().to_string(),
                value: app_base_name,
                reason: "must not contain whitespace".into(),
            });
        }
        validate_file_name(FieldKey::AppBaseName, &app_base_name)?;

        let start_command = r.optional(FieldKey::StartCommand);
        if let Some(cmd) = &start_command {
            validate_file_name(FieldKey::StartCommand, cmd)?;
        }
        let package_name = r.optional(FieldKey::PackageName);
        if let Some(name) = &package_name {
            validate_file_name(FieldKey::PackageName, name)?;
        }

        let app_id = r.mandatory(FieldKey::AppId)?;
        validate_app_id(&app_id)?;

        let app_version = AppVersion::parse(&r.mandatory(FieldKey::AppVersionRelease)?)?;

        let output_directory = match r.optional(FieldKey::OutputDirectory) {
            Some(dir) => r.resolve(FieldKey::OutputDirectory, &dir)?,
            None => base_dir.join("Deploy").join("OUT"),
        };

        Ok(Self {
            app_base_name,
            app_friendly_name: r.mandatory(FieldKey::AppFriendlyName)?,
            app_id,
            app_version,
            app_short_summary: r.mandatory(FieldKey::AppShortSummary)?,
            app_description: r.multiline(FieldKey::AppDescription),
            app_license_id: r.mandatory(FieldKey::AppLicenseId)?,
            app_license_file: r.path(FieldKey::AppLicenseFile)?,
            app_change_file: r.path(FieldKey::AppChangeFile)?,

            publisher_name: r.mandatory(FieldKey::PublisherName)?,
            publisher_copyright: r.optional(FieldKey::PublisherCopyright),
            publisher_link_name: r.optional(FieldKey::PublisherLinkName),
            publisher_link_url: r.optional(FieldKey::PublisherLinkUrl),
            publisher_email: r.optional(FieldKey::PublisherEmail),

            desktop_no_display: r.boolean(FieldKey::DesktopNoDisplay)?,
            desktop_terminal: r.boolean(FieldKey::DesktopTerminal)?,
            desktop_file: r.path(FieldKey::DesktopFile)?,
            start_command,
            prime_category: r.optional(FieldKey::PrimeCategory),
            meta_file: r.path(FieldKey::MetaFile)?,
            icon_files: r.path_list(FieldKey::IconFiles)?,

            publish_command: r.optional(FieldKey::PublishCommand),
            publish_directory: r.path(FieldKey::PublishDirectory)?,
            package_name,
            output_directory,

            appimage_args: r.optional(FieldKey::AppImageArgs),
            appimage_version_output: r.boolean(FieldKey::AppImageVersionOutput)?,

            flatpak_platform_runtime: r.mandatory(FieldKey::FlatpakPlatformRuntime)?,
            flatpak_platform_sdk: r.mandatory(FieldKey::FlatpakPlatformSdk)?,
            flatpak_platform_version: r.mandatory(FieldKey::FlatpakPlatformVersion)?,
            flatpak_finish_args: r.list(FieldKey::FlatpakFinishArgs),
            flatpak_builder_args: r.optional(FieldKey::FlatpakBuilderArgs),

            rpm_auto_req: r.boolean(FieldKey::RpmAutoReq)?,
            rpm_auto_prov: r.boolean(FieldKey::RpmAutoProv)?,
            rpm_requires: r.list(FieldKey::RpmRequires),

            debian_recommends: r.list(FieldKey::DebianRecommends),

            setup_group_name: r.optional(FieldKey::SetupGroupName),
            setup_admin_install: r.boolean(FieldKey::SetupAdminInstall)?,
            setup_command_prompt: r.optional(FieldKey::SetupCommandPrompt),
            setup_min_windows_version: r.mandatory(FieldKey::SetupMinWindowsVersion)?,
            setup_sign_tool: r.optional(FieldKey::SetupSignTool),
            setup_suffix_output: r.optional(FieldKey::SetupSuffixOutput),
            setup_version_output: r.boolean(FieldKey::SetupVersionOutput)?,
            setup_uninstall_script: r.optional(FieldKey::SetupUninstallScript),

            base_dir,
        })
    }

    /// Reads and strictly validates a configuration file.
    ///
    /// Relative paths inside the document resolve against the file's directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).fs_context("reading configuration", path)?;
        let absolute = path
            .absolutize()
            .fs_context("resolving configuration path", path)?;
        let base_dir = absolute.parent().unwrap_or(Path::new("/")).to_path_buf();

        log::debug!("Parsing configuration {}", absolute.display());
        Self::parse(&text, &base_dir, true)
    }

    /// A complete example configuration, used to scaffold new documents.
    pub fn sample(base_dir: impl AsRef<Path>) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        Self {
            output_directory: base_dir.join("Deploy").join("OUT"),
            base_dir,

            app_base_name: "HelloWorld".into(),
            app_friendly_name: "Hello World".into(),
            app_id: "net.example.helloworld".into(),
            app_version: AppVersion {
                version: "1.0.0".into(),
                release: "1".into(),
            },
            app_short_summary: "A HelloWorld application".into(),
            app_description: vec![
                "HelloWorld is an example application.".into(),
                String::new(),
                "- It says hello".into(),
                "- It says goodbye".into(),
            ],
            app_license_id: "MIT".into(),
            app_license_file: None,
            app_change_file: None,

            publisher_name: "The Hello World Team".into(),
            publisher_copyright: Some("Copyright (C) The Hello World Team".into()),
            publisher_link_name: Some("Home Page".into()),
            publisher_link_url: Some("https://example.net".into()),
            publisher_email: Some("contact@example.net".into()),

            desktop_no_display: false,
            desktop_terminal: true,
            desktop_file: None,
            start_command: Some("helloworld".into()),
            prime_category: Some("Utility".into()),
            meta_file: None,
            icon_files: Vec::new(),

            publish_command: Some("cargo build --release && cp target/release/HelloWorld \"${BUILD_APP_BIN}/\"".into()),
            publish_directory: None,
            package_name: None,

            appimage_args: None,
            appimage_version_output: false,

            flatpak_platform_runtime: "org.freedesktop.Platform".into(),
            flatpak_platform_sdk: "org.freedesktop.Sdk".into(),
            flatpak_platform_version: "23.08".into(),
            flatpak_finish_args: vec![
                "--socket=wayland".into(),
                "--socket=x11".into(),
                "--filesystem=host".into(),
                "--share=network".into(),
            ],
            flatpak_builder_args: None,

            rpm_auto_req: false,
            rpm_auto_prov: true,
            rpm_requires: Vec::new(),

            debian_recommends: Vec::new(),

            setup_group_name: None,
            setup_admin_install: false,
            setup_command_prompt: Some("Command Prompt".into()),
            setup_min_windows_version: "10".into(),
            setup_sign_tool: None,
            setup_suffix_output: None,
            setup_version_output: false,
            setup_uninstall_script: None,
        }
    }

    /// Directory that relative document paths were resolved against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Executable base name.
    pub fn app_base_name(&self) -> &str {
        &self.app_base_name
    }

    /// Human readable name.
    pub fn app_friendly_name(&self) -> &str {
        &self.app_friendly_name
    }

    /// Reverse-DNS identifier.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Version and package release.
    pub fn app_version(&self) -> &AppVersion {
        &self.app_version
    }

    pub fn app_short_summary(&self) -> &str {
        &self.app_short_summary
    }

    /// Description lines, with blank lines kept as paragraph breaks.
    pub fn app_description(&self) -> &[String] {
        &self.app_description
    }

    pub fn app_license_id(&self) -> &str {
        &self.app_license_id
    }

    pub fn app_license_file(&self) -> Option<&Path> {
        self.app_license_file.as_deref()
    }

    pub fn app_change_file(&self) -> Option<&Path> {
        self.app_change_file.as_deref()
    }

    pub fn publisher_name(&self) -> &str {
        &self.publisher_name
    }

    pub fn publisher_copyright(&self) -> Option<&str> {
        self.publisher_copyright.as_deref()
    }

    pub fn publisher_link_name(&self) -> Option<&str> {
        self.publisher_link_name.as_deref()
    }

    pub fn publisher_link_url(&self) -> Option<&str> {
        self.publisher_link_url.as_deref()
    }

    pub fn publisher_email(&self) -> Option<&str> {
        self.publisher_email.as_deref()
    }

    pub fn desktop_no_display(&self) -> bool {
        self.desktop_no_display
    }

    pub fn desktop_terminal(&self) -> bool {
        self.desktop_terminal
    }

    /// Custom desktop entry template.
    pub fn desktop_file(&self) -> Option<&Path> {
        self.desktop_file.as_deref()
    }

    /// Launcher command name for RPM and Debian packages.
    pub fn start_command(&self) -> Option<&str> {
        self.start_command.as_deref()
    }

    pub fn prime_category(&self) -> Option<&str> {
        self.prime_category.as_deref()
    }

    /// Custom AppStream metainfo template.
    pub fn meta_file(&self) -> Option<&Path> {
        self.meta_file.as_deref()
    }

    pub fn icon_files(&self) -> &[PathBuf] {
        &self.icon_files
    }

    pub fn publish_command(&self) -> Option<&str> {
        self.publish_command.as_deref()
    }

    pub fn publish_directory(&self) -> Option<&Path> {
        self.publish_directory.as_deref()
    }

    pub fn package_name(&self) -> Option<&str> {
        self.package_name.as_deref()
    }

    /// Name used in output file names: `PackageName`, else `AppBaseName`.
    pub fn output_base_name(&self) -> &str {
        self.package_name.as_deref().unwrap_or(&self.app_base_name)
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn appimage_args(&self) -> Option<&str> {
        self.appimage_args.as_deref()
    }

    pub fn appimage_version_output(&self) -> bool {
        self.appimage_version_output
    }

    pub fn flatpak_platform_runtime(&self) -> &str {
        &self.flatpak_platform_runtime
    }

    pub fn flatpak_platform_sdk(&self) -> &str {
        &self.flatpak_platform_sdk
    }

    pub fn flatpak_platform_version(&self) -> &str {
        &self.flatpak_platform_version
    }

    pub fn flatpak_finish_args(&self) -> &[String] {
        &self.flatpak_finish_args
    }

    pub fn flatpak_builder_args(&self) -> Option<&str> {
        self.flatpak_builder_args.as_deref()
    }

    pub fn rpm_auto_req(&self) -> bool {
        self.rpm_auto_req
    }

    pub fn rpm_auto_prov(&self) -> bool {
        self.rpm_auto_prov
    }

    pub fn rpm_requires(&self) -> &[String] {
        &self.rpm_requires
    }

    pub fn debian_recommends(&self) -> &[String] {
        &self.debian_recommends
    }

    /// Start menu group, defaulting to the friendly name.
    pub fn setup_group_name(&self) -> &str {
        self.setup_group_name
            .as_deref()
            .unwrap_or(&self.app_friendly_name)
    }

    pub fn setup_admin_install(&self) -> bool {
        self.setup_admin_install
    }

    pub fn setup_command_prompt(&self) -> Option<&str> {
        self.setup_command_prompt.as_deref()
    }

    pub fn setup_min_windows_version(&self) -> &str {
        &self.setup_min_windows_version
    }

    pub fn setup_sign_tool(&self) -> Option<&str> {
        self.setup_sign_tool.as_deref()
    }

    pub fn setup_suffix_output(&self) -> Option<&str> {
        self.setup_suffix_output.as_deref()
    }

    pub fn setup_version_output(&self) -> bool {
        self.setup_version_output
    }

    pub fn setup_uninstall_script(&self) -> Option<&str> {
        self.setup_uninstall_script.as_deref()
    }

    /// Raw group name as configured, without the friendly-name fallback.
    pub(crate) fn setup_group_name_raw(&self) -> Option<&str> {
        self.setup_group_name.as_deref()
    }
}

/// Values that become a single file name inside the build tree.
fn validate_file_name(key: FieldKey, value: &str) -> Result<()> {
    if value.contains(['/', '\\', ':']) || value == "." || value.contains("..") {
        return Err(Error::InvalidFormat {
            key: key.name().to_string(),
            value: value.to_string(),
            reason: "must be a plain file name without path separators or '..'".into(),
        });
    }
    Ok(())
}

fn validate_app_id(id: &str) -> Result<()> {
    let segments: Vec<&str> = id.split('.').collect();
    let valid = segments.len() >= 2
        && segments.iter().all(|s| {
            !s.is_empty()
                && s.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        });

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidFormat {
            key: FieldKey::AppId.name().to_string(),
            value: id.to_string(),
            reason: "expected reverse-DNS form such as net.example.app".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = "\
AppBaseName = HelloWorld
AppFriendlyName = Hello World
AppId = com.example.helloworld
AppVersionRelease = 5.4.3[2]
AppShortSummary = Says hello
AppLicenseId = MIT
PublisherName = Example
FlatpakPlatformRuntime = org.freedesktop.Platform
FlatpakPlatformSdk = org.freedesktop.Sdk
FlatpakPlatformVersion = 23.08
SetupMinWindowsVersion = 10
";

    #[test]
    fn test_version_release() {
        let v = AppVersion::parse("5.4.3[2]").unwrap();
        assert_eq!(v.version(), "5.4.3");
        assert_eq!(v.release(), "2");
        assert_eq!(v.to_string(), "5.4.3[2]");

        let v = AppVersion::parse("1.0.0").unwrap();
        assert_eq!(v.release(), "1");

        assert!(AppVersion::parse("1.0").is_err());
        assert!(AppVersion::parse("1.0.0[").is_err());
        assert!(AppVersion::parse("1.0.0[]").is_err());
    }

    #[test]
    fn test_minimal_document_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let conf = Configuration::parse(MINIMAL, dir.path(), true).unwrap();

        assert_eq!(conf.app_id(), "com.example.helloworld");
        assert!(conf.app_description().is_empty());
        assert_eq!(conf.app_license_file(), None);
        assert_eq!(conf.publisher_email(), None);
        assert!(!conf.desktop_terminal());
        assert!(conf.icon_files().is_empty());
        assert!(conf.rpm_requires().is_empty());
        assert_eq!(conf.output_base_name(), "HelloWorld");
        assert_eq!(conf.setup_group_name(), "Hello World");
        assert!(conf.output_directory().ends_with("Deploy/OUT"));
    }

    #[test]
    fn test_each_mandatory_key_is_enforced() {
        let dir = tempfile::tempdir().unwrap();
        for line in MINIMAL.lines() {
            let key = line.split('=').next().unwrap().trim();
            let text: String = MINIMAL
                .lines()
                .filter(|l| *l != line)
                .map(|l| format!("{}\n", l))
                .collect();
            let err = Configuration::parse(&text, dir.path(), false).unwrap_err();
            assert!(
                matches!(err, Error::MissingValue { key: ref k } if k == key),
                "{} -> {}",
                key,
                err
            );
        }
    }

    #[test]
    fn test_blank_mandatory_value_is_missing() {
        let text = MINIMAL.replace("AppFriendlyName = Hello World", "AppFriendlyName = \"  \"");
        let err = Configuration::parse(&text, ".", false).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_app_id_and_base_name_validation() {
        let bad_id = MINIMAL.replace("com.example.helloworld", "helloworld");
        assert!(matches!(
            Configuration::parse(&bad_id, ".", false),
            Err(Error::InvalidFormat { .. })
        ));

        let spaced = MINIMAL.replace("com.example.helloworld", "com.example.hello world");
        assert!(Configuration::parse(&spaced, ".", false).is_err());

        let bad_name = MINIMAL.replace("AppBaseName = HelloWorld", "AppBaseName = Hello World");
        assert!(Configuration::parse(&bad_name, ".", false).is_err());
    }

    #[test]
    fn test_file_name_values_stay_inside_build_tree() {
        for extra in [
            "StartCommand = ../../../../escape\n",
            "StartCommand = bin/hello\n",
            "PackageName = ..\n",
            "PackageName = C:\\hello\n",
        ] {
            let text = format!("{}{}", MINIMAL, extra);
            assert!(
                matches!(Configuration::parse(&text, ".", false), Err(Error::InvalidFormat { .. })),
                "{extra}"
            );
        }

        let bad_base = MINIMAL.replace("AppBaseName = HelloWorld", "AppBaseName = ../HelloWorld");
        assert!(Configuration::parse(&bad_base, ".", false).is_err());

        let text = format!("{}StartCommand = hello-world\nPackageName = Hello.World\n", MINIMAL);
        let conf = Configuration::parse(&text, ".", false).unwrap();
        assert_eq!(conf.start_command(), Some("hello-world"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let text = format!("{}Unrecognised = value\n", MINIMAL);
        assert!(Configuration::parse(&text, ".", false).is_ok());
    }
}
