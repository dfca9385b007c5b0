//! Inno Setup installer bundler.
//!
//! The publish directory is staged flat, an `.iss` script describing it is
//! written beside it, and `iscc` compiles the installer straight into the
//! output directory.

use crate::bundler::{
    platform::{BuildLayout, PackageCommand},
    settings::{Arch, Configuration},
};
use std::path::Path;

/// Inno Setup architecture token. Inno Setup has no 32-bit ARM target.
pub fn arch_token(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X64 => Some("x64"),
        Arch::Arm64 => Some("arm64"),
        Arch::X86 => Some("x86"),
        Arch::Arm | Arch::Unknown => None,
    }
}

/// `{Name}{Suffix}-{Version}-{Release}.{Arch}.exe`, or `{Name}{Suffix}.{Arch}.exe`
/// when `SetupVersionOutput` is off.
pub fn output_name(conf: &Configuration, arch: &str) -> String {
    let name = format!(
        "{}{}",
        conf.output_base_name(),
        conf.setup_suffix_output().unwrap_or_default()
    );
    let version = conf.app_version();
    if conf.setup_version_output() {
        format!("{}-{}-{}.{}.exe", name, version.version(), version.release(), arch)
    } else {
        format!("{}.{}.exe", name, arch)
    }
}

/// `ArchitecturesAllowed` value; `None` places no restriction.
fn allowed_architectures(arch: &str) -> Option<&str> {
    match arch {
        "x64" => Some("x64compatible"),
        "x86" | "" => None,
        other => Some(other),
    }
}

fn win_path(path: &Path) -> String {
    path.display().to_string().replace('/', "\\")
}

/// Installer script.
///
/// `icon` is the `.ico` used for the installer itself and the uninstall entry.
pub fn script(conf: &Configuration, layout: &BuildLayout, icon: Option<&Path>) -> String {
    let version = conf.app_version();
    let exe = format!("{{app}}\\{}.exe", conf.app_base_name());
    let friendly = conf.app_friendly_name();
    let mut out = String::new();

    out.push_str("[Setup]\n");
    out.push_str(&format!("AppName={}\n", friendly));
    out.push_str(&format!("AppId={}\n", conf.app_id()));
    out.push_str(&format!("AppVersion={}\n", version.version()));
    out.push_str(&format!("AppVerName={} {}\n", friendly, version.version()));
    out.push_str(&format!("VersionInfoVersion={}\n", version.version()));
    out.push_str(&format!("OutputDir={}\n", win_path(layout.output_dir())));
    if let Some(stem) = Path::new(layout.output_name()).file_stem() {
        out.push_str(&format!("OutputBaseFilename={}\n", stem.to_string_lossy()));
    }
    out.push_str(&format!("AppPublisher={}\n", conf.publisher_name()));
    if let Some(copyright) = conf.publisher_copyright() {
        out.push_str(&format!("AppCopyright={}\n", copyright));
    }
    if let Some(url) = conf.publisher_link_url() {
        out.push_str(&format!("AppPublisherURL={}\n", url));
    }
    if let Some(license) = conf.app_license_file() {
        out.push_str(&format!("LicenseFile={}\n", win_path(license)));
    }
    if let Some(icon) = icon {
        out.push_str(&format!("SetupIconFile={}\n", win_path(icon)));
    }
    out.push_str("AllowNoIcons=yes\n");
    out.push_str(&format!("MinVersion={}\n", conf.setup_min_windows_version()));
    out.push_str(&format!("DefaultGroupName={}\n", conf.setup_group_name()));
    out.push_str(&format!("DefaultDirName={{autopf}}\\{}\n", conf.app_base_name()));
    out.push_str(&format!(
        "PrivilegesRequired={}\n",
        if conf.setup_admin_install() { "admin" } else { "lowest" }
    ));
    if let Some(allowed) = allowed_architectures(layout.package_arch()) {
        out.push_str(&format!("ArchitecturesAllowed={}\n", allowed));
        out.push_str(&format!("ArchitecturesInstallIn64BitMode={}\n", allowed));
    }
    out.push_str("Compression=lzma2\n");
    out.push_str("SolidCompression=yes\n");
    out.push_str("WizardStyle=modern\n");
    out.push_str(&format!("UninstallDisplayName={}\n", friendly));
    out.push_str(&format!("UninstallDisplayIcon={}\n", exe));
    if let Some(tool) = conf.setup_sign_tool() {
        out.push_str(&format!("SignTool={}\n", tool));
    }

    out.push_str("\n[Files]\n");
    out.push_str(&format!(
        "Source: \"{}\\*\"; DestDir: \"{{app}}\"; Flags: ignoreversion recursesubdirs createallsubdirs\n",
        win_path(layout.build_root())
    ));

    let visible = !conf.desktop_no_display();

    out.push_str("\n[Tasks]\n");
    if visible {
        out.push_str("Name: \"desktopicon\"; Description: \"{cm:CreateDesktopIcon}\"; GroupDescription: \"{cm:AdditionalIcons}\"; Flags: unchecked\n");
    }

    out.push_str("\n[Icons]\n");
    if visible {
        out.push_str(&format!("Name: \"{{group}}\\{}\"; Filename: \"{}\"\n", friendly, exe));
        out.push_str(&format!(
            "Name: \"{{autodesktop}}\\{}\"; Filename: \"{}\"; Tasks: desktopicon\n",
            friendly, exe
        ));
    }
    if let Some(prompt) = conf.setup_command_prompt() {
        out.push_str(&format!(
            "Name: \"{{group}}\\{}\"; Filename: \"{{cmd}}\"; Parameters: \"/k\"; WorkingDir: \"{{app}}\"\n",
            prompt
        ));
    }
    if let (Some(name), Some(url)) = (conf.publisher_link_name(), conf.publisher_link_url()) {
        out.push_str(&format!("Name: \"{{group}}\\{}\"; Filename: \"{}\"\n", name, url));
    }

    out.push_str("\n[Run]\n");
    if visible && !conf.desktop_terminal() {
        out.push_str(&format!(
            "Filename: \"{}\"; Description: \"{{cm:LaunchProgram,{}}}\"; Flags: nowait postinstall skipifsilent\n",
            exe, friendly
        ));
    }

    out.push_str("\n[UninstallRun]\n");
    if let Some(uninstall) = conf.setup_uninstall_script() {
        out.push_str(&format!(
            "Filename: \"{{app}}\\{}\"; Flags: runhidden\n",
            uninstall
        ));
    }
    out
}

/// `iscc` invocation writing the installer to the output path.
pub fn command(layout: &BuildLayout) -> PackageCommand {
    let stem = Path::new(layout.output_name())
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let script = layout
        .manifest_path()
        .map(|p| format!("\"{}\"", p.display()))
        .unwrap_or_default();

    PackageCommand::new(format!(
        "iscc /O\"{}\" /F\"{}\" {}",
        layout.output_dir().display(),
        stem,
        script
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{platform::PackageKind, settings::BuildOptions, testing};

    fn layout(conf: &Configuration, options: BuildOptions) -> BuildLayout {
        BuildLayout::new(conf, &testing::win_x64(), PackageKind::Setup, &options.work_root("/tmp/w"))
            .unwrap()
    }

    #[test]
    fn test_output_name() {
        let conf = testing::hello();
        let name = layout(&conf, BuildOptions::default()).output_name().to_string();
        assert!(name.starts_with("HelloWorldSetup-5.4.3-2."));
        assert!(name.ends_with(".exe"));
        assert_eq!(name, "HelloWorldSetup-5.4.3-2.x64.exe");
    }

    #[test]
    fn test_arch_override_passes_through() {
        let conf = testing::hello();
        let layout = layout(&conf, BuildOptions::default().arch("x64compatible"));
        assert_eq!(layout.package_arch(), "x64compatible");
        assert_eq!(layout.output_name(), "HelloWorldSetup-5.4.3-2.x64compatible.exe");
    }

    #[test]
    fn test_script_sections() {
        let conf = testing::hello_with("SetupSignTool = signtool $f\nSetupUninstallScript = cleanup.bat\n");
        let layout = layout(&conf, BuildOptions::default());
        let text = script(&conf, &layout, Some(Path::new("/icons/app.ico")));

        for section in ["[Setup]", "[Files]", "[Tasks]", "[Icons]", "[Run]", "[UninstallRun]"] {
            assert!(text.contains(section), "missing {}", section);
        }
        assert!(text.contains("AppId=com.example.helloworld\n"));
        assert!(text.contains("OutputBaseFilename=HelloWorldSetup-5.4.3-2.x64\n"));
        assert!(text.contains("SetupIconFile=\\icons\\app.ico\n"));
        assert!(text.contains("PrivilegesRequired=lowest\n"));
        assert!(text.contains("ArchitecturesAllowed=x64compatible\n"));
        assert!(text.contains("DefaultGroupName=Hello World\n"));
        assert!(text.contains("SignTool=signtool $f\n"));
        assert!(text.contains("Name: \"{group}\\Command Prompt\"; Filename: \"{cmd}\""));
        assert!(text.contains("Name: \"{group}\\Home Page\"; Filename: \"https://example.com\"\n"));
        assert!(text.contains("Filename: \"{app}\\cleanup.bat\"; Flags: runhidden\n"));
    }

    #[test]
    fn test_terminal_app_is_not_launched_after_install() {
        let conf = testing::hello_with("DesktopTerminal = true\n");
        let text = script(&conf, &layout(&conf, BuildOptions::default()), None);
        let run = text.split("[Run]\n").nth(1).unwrap();
        assert!(run.starts_with("\n[UninstallRun]"));
        assert!(!text.contains("SetupIconFile"));
    }

    #[test]
    fn test_command() {
        let conf = testing::hello();
        let cmd = command(&layout(&conf, BuildOptions::default()));
        assert!(cmd.command.starts_with("iscc /O\"/work/hello/Deploy/OUT\" /F\"HelloWorldSetup-5.4.3-2.x64\" \"/tmp/w/"));
        assert!(cmd.command.ends_with("HelloWorld.iss\""));
    }

    #[test]
    fn test_arm32_runtime_is_rejected() {
        use crate::bundler::{error::Error, settings::describe_runtime};

        let conf = testing::hello();
        let options = BuildOptions::default().work_root("/tmp/w");
        let err = BuildLayout::new(&conf, &describe_runtime(Some("win-arm")), PackageKind::Setup, &options)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArchitecture(_)));
        assert_eq!(arch_token(Arch::Arm64), Some("arm64"));
    }
}
