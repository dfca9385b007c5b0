//! Default FreeDesktop.org desktop entry and AppStream metainfo.
//!
//! Both templates are written in `${NAME}` macros and expanded per build.
//! They are used when the configuration supplies no `DesktopFile` or
//! `MetaFile` of its own.

use crate::bundler::{
    error::{ErrorExt, Result},
    platform::PackageKind,
};
use std::path::Path;

/// Desktop entry installed under `usr/share/applications`.
pub const DESKTOP_TEMPLATE: &str = "\
[Desktop Entry]
Type=Application
Name=${APP_FRIENDLY_NAME}
Icon=${APP_ID}
Comment=${APP_SHORT_SUMMARY}
Exec=${INSTALL_EXEC}
TryExec=${INSTALL_EXEC}
NoDisplay=${DESKTOP_NODISPLAY}
X-AppImage-Integrate=${DESKTOP_INTEGRATE}
Terminal=${DESKTOP_TERMINAL}
Categories=${PRIME_CATEGORY}
MimeType=
Keywords=
";

/// AppStream metainfo installed under `usr/share/metainfo`.
pub const METAINFO_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<component type="desktop-application">
  <id>${APP_ID}</id>
  <metadata_license>MIT</metadata_license>
  <project_license>${APP_LICENSE_ID}</project_license>
  <content_rating type="oars-1.1" />

  <name>${APP_FRIENDLY_NAME}</name>
  <summary>${APP_SHORT_SUMMARY}</summary>
  <developer_name>${PUBLISHER_NAME}</developer_name>
  <url type="homepage">${PUBLISHER_LINK_URL}</url>

  <launchable type="desktop-id">${APP_ID}.desktop</launchable>

  <description>
    ${APPSTREAM_DESCRIPTION_XML}
  </description>

  <releases>
    ${APPSTREAM_CHANGELOG_XML}
  </releases>
</component>
"#;

/// Reads a user template, or falls back to the built-in one.
///
/// Returns an empty string for kinds that install no desktop integration.
pub fn load_template(kind: PackageKind, custom: Option<&Path>, default: &str) -> Result<String> {
    if !kind.targets_linux() {
        return Ok(String::new());
    }
    match custom {
        Some(path) => std::fs::read_to_string(path).fs_context("reading template", path),
        None => Ok(default.to_string()),
    }
}
