//! Linux package kinds.
//!
//! # Build Requirements
//!
//! | Kind | Required Tools |
//! |------|----------------|
//! | AppImage | `appimagetool` (embedded under `assets/` or on `PATH`) |
//! | Flatpak | `flatpak-builder`, `flatpak` |
//! | Rpm | `rpmbuild` |
//! | Deb | `dpkg-deb` |
//!
//! All four stage a `usr/` tree under the build root. The [`freedesktop`]
//! module supplies the default desktop entry and AppStream metainfo templates.

pub mod appimage;
pub mod debian;
pub mod flatpak;
pub mod freedesktop;
pub mod rpm;

/// Quotes a path for use in a POSIX shell command line.
pub(crate) fn quoted(path: &std::path::Path) -> String {
    format!("\"{}\"", path.display())
}

/// Forwarding script placed in `usr/bin` for packages installed under `/opt`.
pub(crate) fn launcher_script(install_exec: &str) -> String {
    format!("#!/bin/sh\nexec \"{}\" \"$@\"\n", install_exec)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_forwards_arguments() {
        let script = launcher_script("/opt/com.example.app/App");
        assert!(script.starts_with("#!/bin/sh\n"));
        assert!(script.contains("exec \"/opt/com.example.app/App\" \"$@\""));
    }
}
