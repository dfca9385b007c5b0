//! Debian package (.deb) bundler.
//!
//! The control file is written to `DEBIAN/control` inside the build root and
//! `dpkg-deb` builds the archive directly from that tree.

use super::{super::layout::package_id, quoted};
use crate::bundler::{
    platform::{BuildLayout, PackageCommand},
    settings::{Arch, Configuration},
};

/// Debian architecture token.
pub fn arch_token(arch: Arch) -> Option<&'static str> {
    match arch {
        Arch::X64 => Some("amd64"),
        Arch::Arm64 => Some("arm64"),
        Arch::Arm => Some("armhf"),
        Arch::X86 => Some("i386"),
        Arch::Unknown => None,
    }
}

/// `{name}_{Version}-{Release}_{Arch}.deb` with the lowercased output base name.
///
/// The package metadata name is the dpkg/rpm-safe [`package_id`], so it may
/// differ from the file name when the base name holds `_` or spaces.
pub fn output_name(conf: &Configuration, arch: &str) -> String {
    let version = conf.app_version();
    format!(
        "{}_{}-{}_{}.deb",
        conf.output_base_name().to_lowercase(),
        version.version(),
        version.release(),
        arch
    )
}

/// Maps a freedesktop main category to a Debian archive section.
pub fn section(category: Option<&str>) -> &'static str {
    let Some(category) = category else {
        return "misc";
    };
    match category.trim().to_ascii_lowercase().as_str() {
        "audiovideo" | "video" => "video",
        "audio" => "sound",
        "development" => "devel",
        "education" => "education",
        "game" => "games",
        "graphics" => "graphics",
        "network" => "net",
        "office" => "office",
        "science" => "science",
        "settings" | "system" => "admin",
        "utility" => "utils",
        _ => "misc",
    }
}

/// `DEBIAN/control` contents.
pub fn control(conf: &Configuration, layout: &BuildLayout) -> String {
    let version = conf.app_version();
    let mut out = String::new();

    out.push_str(&format!("Package: {}\n", package_id(conf)));
    out.push_str(&format!("Version: {}-{}\n", version.version(), version.release()));
    out.push_str(&format!("Section: {}\n", section(conf.prime_category())));
    out.push_str("Priority: optional\n");
    out.push_str(&format!("Architecture: {}\n", layout.package_arch()));

    match conf.publisher_email() {
        Some(email) => out.push_str(&format!("Maintainer: {} <{}>\n", conf.publisher_name(), email)),
        None => out.push_str(&format!("Maintainer: {}\n", conf.publisher_name())),
    }
    if let Some(url) = conf.publisher_link_url() {
        out.push_str(&format!("Homepage: {}\n", url));
    }
    if !conf.debian_recommends().is_empty() {
        out.push_str(&format!("Recommends: {}\n", conf.debian_recommends().join(", ")));
    }

    out.push_str(&format!("Description: {}\n", conf.app_short_summary()));
    for line in conf.app_description() {
        if line.trim().is_empty() {
            out.push_str(" .\n");
        } else {
            out.push_str(&format!(" {}\n", line.trim()));
        }
    }
    out
}

/// `dpkg-deb --build` invocation.
pub fn command(layout: &BuildLayout) -> PackageCommand {
    PackageCommand::new(format!(
        "dpkg-deb --root-owner-group --build {} {}",
        quoted(layout.build_root()),
        quoted(layout.output_path())
    ))
}
