//! RPM bundler for Red Hat-based distributions.
//!
//! Writes a binary-only spec whose `%files` section lists the staged build
//! root, runs `rpmbuild -bb` against it, then picks the produced package out
//! of the `RPMS` tree. rpmbuild chooses its own file name and architecture
//! subdirectory, so the package is located by search rather than by path.

use super::{super::layout::package_id, quoted};
use crate::bundler::{
    error::{Error, Result},
    platform::{BuildLayout, PackageCommand},
    settings::{Arch, Configuration},
};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// RPM architecture token.
pub fn arch_token(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X64 => Some("x86_64"),
        Arch::Arm64 => Some("aarch64"),
        Arch::Arm => Some("armhfp"),
        Arch::X86 => Some("i686"),
        Arch::Unknown => None,
    }
}

/// `{name}_{Version}-{Release}.{Arch}.rpm` with the lowercased output base name.
///
/// The package metadata name is the dpkg/rpm-safe [`package_id`], so it may
/// differ from the file name when the base name holds `_` or spaces.
pub fn output_name(conf: &Configuration, arch: &str) -> String {
    let version = conf.app_version();
    format!(
        "{}_{}-{}.{}.rpm",
        conf.output_base_name().to_lowercase(),
        version.version(),
        version.release(),
        arch
    )
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Complete spec file text.
///
/// The `%files` section reflects whatever currently exists under the build
/// root, so this is called after the tree is populated.
pub fn spec(conf: &Configuration, layout: &BuildLayout) -> Result<String> {
    let version = conf.app_version();
    let mut out = String::new();

    out.push_str(&format!("Name: {}\n", package_id(conf)));
    out.push_str(&format!("Version: {}\n", version.version()));
    out.push_str(&format!("Release: {}\n", version.release()));
    out.push_str(&format!("BuildArch: {}\n", layout.package_arch()));
    out.push_str(&format!("Summary: {}\n", conf.app_short_summary()));
    out.push_str(&format!("License: {}\n", conf.app_license_id()));
    out.push_str(&format!("Vendor: {}\n", conf.publisher_name()));
    if let Some(url) = conf.publisher_link_url() {
        out.push_str(&format!("Url: {}\n", url));
    }
    out.push_str(&format!("AutoReq: {}\n", yes_no(conf.rpm_auto_req())));
    out.push_str(&format!("AutoProv: {}\n", yes_no(conf.rpm_auto_prov())));
    for req in conf.rpm_requires() {
        out.push_str(&format!("Requires: {}\n", req));
    }

    out.push('\n');
    out.push_str("%define _build_id_links none\n");
    out.push_str("%global debug_package %{nil}\n");

    out.push_str("\n%description\n");
    if conf.app_description().iter().all(|l| l.is_empty()) {
        out.push_str(conf.app_short_summary());
        out.push('\n');
    } else {
        for line in conf.app_description() {
            out.push_str(line);
            out.push('\n');
        }
    }

    out.push_str("\n%files\n");
    let license = conf.app_license_file().and_then(Path::file_name);
    let changes = conf.app_change_file().and_then(Path::file_name);
    for line in files_section(layout.build_root(), license, changes)? {
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// One `%files` entry per path under `build_root`, sorted.
///
/// Only directories under `/opt` are owned; the shared `usr/` hierarchy
/// belongs to the filesystem package.
fn files_section(
    build_root: &Path,
    license: Option<&std::ffi::OsStr>,
    changes: Option<&std::ffi::OsStr>,
) -> Result<Vec<String>> {
    if !build_root.exists() {
        return Ok(Vec::new());
    }

    let mut entries: Vec<_> = WalkDir::new(build_root)
        .min_depth(1)
        .into_iter()
        .collect::<std::result::Result<_, _>>()?;
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let mut lines = Vec::new();
    for entry in entries {
        let rel = entry.path().strip_prefix(build_root)?;
        let installed = Path::new("/").join(rel);
        let listed = quoted(&installed);

        if entry.file_type().is_dir() {
            if installed.starts_with("/opt") && installed != Path::new("/opt") {
                lines.push(format!("%dir {}", listed));
            }
            continue;
        }

        let name = entry.file_name();
        if license == Some(name) {
            lines.push(format!("%license {}", listed));
        } else if changes == Some(name) {
            lines.push(format!("%doc {}", listed));
        } else {
            lines.push(listed);
        }
    }
    Ok(lines)
}

fn top_dir(layout: &BuildLayout) -> PathBuf {
    layout.package_root().join("rpmbuild")
}

/// Directory rpmbuild writes packages into.
pub fn rpms_dir(layout: &BuildLayout) -> PathBuf {
    top_dir(layout).join("RPMS")
}

/// `rpmbuild -bb` invocation. `SOURCE_DATE_EPOCH` pins file timestamps.
pub fn command(layout: &BuildLayout, built: DateTime<Utc>) -> PackageCommand {
    let spec = layout.manifest_path().map(quoted).unwrap_or_default();
    let line = format!(
        "rpmbuild -bb {} --target {} --buildroot={} --define \"_topdir {}\" --define \"_rpmdir {}\"",
        spec,
        layout.package_arch(),
        quoted(layout.build_root()),
        top_dir(layout).display(),
        rpms_dir(layout).display()
    );
    PackageCommand::new(line).env("SOURCE_DATE_EPOCH", built.timestamp().to_string())
}

/// Finds the single `.rpm` produced under `directory`.
///
/// # Errors
///
/// [`Error::OutputNotFound`] when zero or several packages are present.
pub fn locate_output(directory: &Path) -> Result<PathBuf> {
    let mut found: Vec<PathBuf> = if directory.exists() {
        WalkDir::new(directory)
            .into_iter()
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter()
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "rpm"))
            .collect()
    } else {
        Vec::new()
    };

    if found.len() == 1 {
        Ok(found.remove(0))
    } else {
        Err(Error::OutputNotFound {
            directory: directory.to_path_buf(),
            found: found.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{platform::PackageKind, settings::BuildOptions, testing};

    fn layout(conf: &Configuration, work: &Path) -> BuildLayout {
        let options = BuildOptions::default().work_root(work);
        BuildLayout::new(conf, &testing::linux_x64(), PackageKind::Rpm, &options).unwrap()
    }

    #[test]
    fn test_output_name() {
        let conf = testing::hello();
        assert_eq!(
            layout(&conf, Path::new("/tmp/w")).output_name(),
            "helloworld_5.4.3-2.x86_64.rpm"
        );
    }

    #[test]
    fn test_spec_header_and_description() {
        let conf = testing::hello();
        let text = spec(&conf, &layout(&conf, Path::new("/nonexistent/work"))).unwrap();

        assert!(text.starts_with("Name: helloworld\nVersion: 5.4.3\nRelease: 2\nBuildArch: x86_64\n"));
        assert!(text.contains("AutoReq: no\nAutoProv: yes\n"));
        assert!(text.contains("Requires: krb5-libs\nRequires: libicu\n"));
        assert!(text.contains("%define _build_id_links none\n"));
        assert!(text.contains("%description\nHelloWorld greets the world.\n\n- Says hello\n"));
        assert!(text.ends_with("%files\n"));
    }

    #[test]
    fn test_files_section_marks_license_and_docs() {
        let dir = tempfile::tempdir().unwrap();
        let conf = testing::hello_with("AppLicenseFile = LICENSE\nAppChangeFile = CHANGES\n");
        let layout = layout(&conf, dir.path());
        let app = layout.app_bin();
        std::fs::create_dir_all(app).unwrap();
        std::fs::create_dir_all(layout.build_root().join("usr/bin")).unwrap();
        for name in ["HelloWorld", "LICENSE", "CHANGES"] {
            std::fs::write(app.join(name), "x").unwrap();
        }

        let text = spec(&conf, &layout).unwrap();
        let files = text.split("%files\n").nth(1).unwrap();
        assert_eq!(
            files,
            "%dir \"/opt/com.example.helloworld\"\n\
             %doc \"/opt/com.example.helloworld/CHANGES\"\n\
             \"/opt/com.example.helloworld/HelloWorld\"\n\
             %license \"/opt/com.example.helloworld/LICENSE\"\n"
        );
    }

    #[test]
    fn test_command_pins_timestamp() {
        let conf = testing::hello();
        let layout = layout(&conf, Path::new("/tmp/w"));
        let built = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let cmd = command(&layout, built);

        assert!(cmd.command.starts_with("rpmbuild -bb \"/tmp/w/"));
        assert!(cmd.command.contains("--target x86_64 --buildroot=\"/tmp/w/"));
        assert!(cmd.command.contains("rpmbuild/RPMS\""));
        assert_eq!(cmd.env, vec![("SOURCE_DATE_EPOCH".to_string(), "1700000000".to_string())]);
    }

    #[test]
    fn test_locate_output_requires_single_match() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            locate_output(dir.path()),
            Err(Error::OutputNotFound { found: 0, .. })
        ));

        let arch_dir = dir.path().join("x86_64");
        std::fs::create_dir_all(&arch_dir).unwrap();
        std::fs::write(arch_dir.join("helloworld-5.4.3-2.x86_64.rpm"), "x").unwrap();
        std::fs::write(arch_dir.join("notes.txt"), "x").unwrap();
        assert_eq!(
            locate_output(dir.path()).unwrap(),
            arch_dir.join("helloworld-5.4.3-2.x86_64.rpm")
        );

        std::fs::write(arch_dir.join("other.rpm"), "x").unwrap();
        assert!(matches!(
            locate_output(dir.path()),
            Err(Error::OutputNotFound { found: 2, .. })
        ));
    }

    #[test]
    fn test_file_name_keeps_underscores() {
        let conf = testing::hello_with("PackageName = My_App\n");
        assert_eq!(output_name(&conf, "x86_64"), "my_app_5.4.3-2.x86_64.rpm");
        let text = spec(&conf, &layout(&conf, Path::new("/nonexistent/work"))).unwrap();
        assert!(text.contains("Name: my-app\n"));
    }
}
