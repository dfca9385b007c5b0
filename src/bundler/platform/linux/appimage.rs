//! AppImage bundler.
//!
//! Stages an `AppDir` and hands it to `appimagetool`. The tool reads the
//! desktop entry, metainfo and icon duplicated at the `AppDir` root, and
//! launches the application through the `AppRun` symlink.

use super::quoted;
use crate::bundler::{
    platform::{BuildLayout, PackageCommand},
    settings::{Arch, Configuration},
};
use std::path::{Path, PathBuf};

/// AppImage architecture token.
pub fn arch_token(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X64 => Some("x86_64"),
        Arch::Arm64 => Some("aarch64"),
        Arch::Arm => Some("armhf"),
        Arch::X86 => Some("i686"),
        Arch::Unknown => None,
    }
}

/// `{Name}-{Version}-{Release}.{Arch}.AppImage`, or `{Name}.{Arch}.AppImage`
/// when `AppImageVersionOutput` is off.
pub fn output_name(conf: &Configuration, arch: &str) -> String {
    let version = conf.app_version();
    if conf.appimage_version_output() {
        format!(
            "{}-{}-{}.{}.AppImage",
            conf.output_base_name(),
            version.version(),
            version.release(),
            arch
        )
    } else {
        format!("{}.{}.AppImage", conf.output_base_name(), arch)
    }
}

/// Relative target of the `AppRun` symlink.
pub fn app_run_target(conf: &Configuration) -> PathBuf {
    Path::new("usr/bin").join(conf.app_base_name())
}

/// Desktop entry duplicated at the `AppDir` root.
pub fn root_desktop(layout: &BuildLayout, app_id: &str) -> PathBuf {
    layout.build_root().join(format!("{}.desktop", app_id))
}

/// AppStream metainfo duplicated at the `AppDir` root.
pub fn root_metainfo(layout: &BuildLayout, app_id: &str) -> PathBuf {
    layout.build_root().join(format!("{}.appdata.xml", app_id))
}

/// Primary icon duplicated at the `AppDir` root.
///
/// The icon keeps its own extension so `appimagetool` can find it by the
/// `Icon=` name in the desktop entry.
pub fn root_icon(layout: &BuildLayout, app_id: &str, icon: &Path) -> PathBuf {
    let ext = icon
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("png")
        .to_ascii_lowercase();
    layout.build_root().join(format!("{}.{}", app_id, ext))
}

/// `appimagetool` invocation. `ARCH` tells the tool which runtime to embed.
pub fn command(conf: &Configuration, layout: &BuildLayout, tool: &Path) -> PackageCommand {
    let mut line = quoted(tool);
    if let Some(args) = conf.appimage_args().filter(|a| !a.trim().is_empty()) {
        line.push(' ');
        line.push_str(args.trim());
    }
    line.push_str(&format!(
        " {} {}",
        quoted(layout.build_root()),
        quoted(layout.output_path())
    ));

    PackageCommand::new(line).env("ARCH", layout.package_arch())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{platform::PackageKind, settings::BuildOptions, testing};

    fn layout(conf: &Configuration) -> BuildLayout {
        let options = BuildOptions::default().work_root("/tmp/work");
        BuildLayout::new(conf, &testing::linux_x64(), PackageKind::AppImage, &options).unwrap()
    }

    #[test]
    fn test_output_name() {
        let conf = testing::hello();
        let name = output_name(&conf, "x86_64");
        assert!(name.starts_with("HelloWorld-5.4.3-2."));
        assert!(name.ends_with(".AppImage"));

        let conf = testing::hello_with("AppImageArgs = --no-appstream\n");
        assert_eq!(layout(&conf).output_name(), "HelloWorld-5.4.3-2.x86_64.AppImage");
    }

    #[test]
    fn test_unversioned_output_name() {
        let text = testing::HELLO.replace("AppImageVersionOutput = true", "AppImageVersionOutput = false");
        let conf = Configuration::parse(&text, "/work/hello", false).unwrap();
        assert_eq!(output_name(&conf, "aarch64"), "HelloWorld.aarch64.AppImage");
    }

    #[test]
    fn test_command_carries_arch_and_args() {
        let conf = testing::hello_with("AppImageArgs = --no-appstream\n");
        let layout = layout(&conf);
        let cmd = command(&conf, &layout, Path::new("/assets/appimagetool"));

        assert!(cmd.command.starts_with("\"/assets/appimagetool\" --no-appstream \"/tmp/work/"));
        assert!(cmd.command.ends_with("HelloWorld-5.4.3-2.x86_64.AppImage\""));
        assert_eq!(cmd.env, vec![("ARCH".to_string(), "x86_64".to_string())]);
    }

    #[test]
    fn test_root_files() {
        let conf = testing::hello();
        let layout = layout(&conf);

        assert!(root_desktop(&layout, conf.app_id()).ends_with("AppDir/com.example.helloworld.desktop"));
        assert!(root_metainfo(&layout, conf.app_id()).ends_with("AppDir/com.example.helloworld.appdata.xml"));
        assert!(
            root_icon(&layout, conf.app_id(), Path::new("/icons/Icon.SVG"))
                .ends_with("AppDir/com.example.helloworld.svg")
        );
        assert_eq!(app_run_target(&conf), Path::new("usr/bin/HelloWorld"));
    }
}
