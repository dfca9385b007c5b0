//! Flatpak bundler.
//!
//! The staged `usr/` tree becomes a single `simple` module whose build
//! commands copy it into `/app`. `flatpak-builder` exports into a local
//! repository, then `flatpak build-bundle` writes the single-file bundle.

use super::quoted;
use crate::bundler::{
    platform::{BuildLayout, PackageCommand},
    settings::{Arch, Configuration},
};

/// Flatpak architecture token.
pub fn arch_token(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X64 => Some("x86_64"),
        Arch::Arm64 => Some("aarch64"),
        Arch::Arm => Some("arm"),
        Arch::X86 => Some("i386"),
        Arch::Unknown => None,
    }
}

/// `{Name}-{Version}-{Release}.{Arch}.flatpak`
pub fn output_name(conf: &Configuration, arch: &str) -> String {
    let version = conf.app_version();
    format!(
        "{}-{}-{}.{}.flatpak",
        conf.output_base_name(),
        version.version(),
        version.release(),
        arch
    )
}

/// Single-quoted YAML scalar.
fn scalar(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// flatpak-builder manifest.
pub fn manifest(conf: &Configuration, layout: &BuildLayout) -> String {
    let mut out = String::new();
    out.push_str(&format!("app-id: {}\n", conf.app_id()));
    out.push_str(&format!("runtime: {}\n", scalar(conf.flatpak_platform_runtime())));
    out.push_str(&format!(
        "runtime-version: {}\n",
        scalar(conf.flatpak_platform_version())
    ));
    out.push_str(&format!("sdk: {}\n", scalar(conf.flatpak_platform_sdk())));
    out.push_str(&format!("command: {}\n", scalar(conf.app_base_name())));
    out.push_str("modules:\n");
    out.push_str(&format!("  - name: {}\n", conf.app_id()));
    out.push_str("    buildsystem: simple\n");
    out.push_str("    build-commands:\n");
    out.push_str("      - mkdir -p /app/bin\n");
    out.push_str("      - cp -rn bin/* /app/bin\n");
    out.push_str("      - mkdir -p /app/share\n");
    out.push_str("      - cp -rn share/* /app/share\n");
    out.push_str("    sources:\n");
    out.push_str("      - type: dir\n");
    out.push_str(&format!(
        "        path: {}\n",
        scalar(&layout.build_root().join("usr").display().to_string())
    ));

    if !conf.flatpak_finish_args().is_empty() {
        out.push_str("finish-args:\n");
        for arg in conf.flatpak_finish_args() {
            out.push_str(&format!("  - {}\n", scalar(arg)));
        }
    }
    out
}

/// Build into a repository, then export the bundle.
pub fn commands(conf: &Configuration, layout: &BuildLayout) -> Vec<PackageCommand> {
    let root = layout.package_root();
    let repo = quoted(&root.join("repo"));
    let arch = layout.package_arch();

    let mut build = String::from("flatpak-builder");
    if let Some(args) = conf.flatpak_builder_args().filter(|a| !a.trim().is_empty()) {
        build.push(' ');
        build.push_str(args.trim());
    }

    let manifest = layout
        .manifest_path()
        .map(quoted)
        .unwrap_or_default();

    build.push_str(&format!(
        " --arch={} --repo={} --force-clean {} {}",
        arch,
        repo,
        quoted(&root.join("build-dir")),
        manifest
    ));

    let bundle = format!(
        "flatpak build-bundle --arch={} {} {} {}",
        arch,
        repo,
        quoted(layout.output_path()),
        conf.app_id()
    );

    vec![PackageCommand::new(build), PackageCommand::new(bundle)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{platform::PackageKind, settings::BuildOptions, testing};

    fn layout(conf: &Configuration) -> BuildLayout {
        let options = BuildOptions::default().work_root("/tmp/work");
        BuildLayout::new(conf, &testing::linux_x64(), PackageKind::Flatpak, &options).unwrap()
    }

    #[test]
    fn test_output_name_always_has_version() {
        let conf = testing::hello();
        assert_eq!(layout(&conf).output_name(), "HelloWorld-5.4.3-2.x86_64.flatpak");
    }

    #[test]
    fn test_manifest() {
        let conf = testing::hello();
        let text = manifest(&conf, &layout(&conf));

        assert!(text.starts_with("app-id: com.example.helloworld\n"));
        assert!(text.contains("runtime-version: '23.08'\n"));
        assert!(text.contains("command: 'HelloWorld'\n"));
        assert!(text.contains("  - '--socket=wayland'\n  - '--share=network'\n"));
        assert!(text.contains("/AppDir/usr'\n"));
    }

    #[test]
    fn test_commands_in_order() {
        let conf = testing::hello_with("FlatpakBuilderArgs = --user\n");
        let cmds = commands(&conf, &layout(&conf));

        assert_eq!(cmds.len(), 2);
        assert!(cmds[0].command.starts_with("flatpak-builder --user --arch=x86_64 --repo="));
        assert!(cmds[0].command.ends_with("com.example.helloworld.yml\""));
        assert!(cmds[1].command.starts_with("flatpak build-bundle --arch=x86_64 "));
        assert!(cmds[1].command.ends_with(".flatpak\" com.example.helloworld"));
    }

    #[test]
    fn test_scalar_escapes_quotes() {
        assert_eq!(scalar("it's"), "'it''s'");
    }
}
