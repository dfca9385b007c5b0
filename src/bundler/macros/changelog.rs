//! Change file parsing and conversion to AppStream `<release>` elements.
//!
//! ```text
//! + 1.2.0;2024-05-01
//! - Added dark mode
//! - Fixed crash on startup
//!
//! + 1.1.0;2024-02-11
//! - Initial public release
//! ```
//!
//! Lines that are neither a release header (`+ VERSION;DATE`) nor an item
//! (`- text`) are ignored, so free-form prose can surround the entries.

use super::escape_xml;

/// One release block from a change file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Release {
    pub version: String,
    pub date: String,
    pub items: Vec<String>,
}

/// Parses change file text into releases, newest first as written.
pub fn parse(text: &str) -> Vec<Release> {
    let mut releases: Vec<Release> = Vec::new();

    for line in text.lines().map(str::trim) {
        if let Some(header) = line.strip_prefix('+') {
            let (version, date) = header.split_once(';').unwrap_or((header, ""));
            let version = version.trim();
            if version.is_empty() {
                continue;
            }
            releases.push(Release {
                version: version.to_string(),
                date: date.trim().to_string(),
                items: Vec::new(),
            });
        } else if let Some(item) = line.strip_prefix('-') {
            let item = item.trim();
            if let (Some(current), false) = (releases.last_mut(), item.is_empty()) {
                current.items.push(item.to_string());
            }
        }
    }

    releases
}

fn attribute(text: &str) -> String {
    escape_xml(text).replace('"', "&quot;")
}

/// Converts change file text into a sequence of AppStream `<release>` elements.
///
/// Returns an empty string when the text holds no releases.
pub fn to_appstream(text: &str) -> String {
    let mut out = String::new();

    for release in parse(text) {
        let date = if release.date.is_empty() {
            String::new()
        } else {
            format!(" date=\"{}\"", attribute(&release.date))
        };

        if release.items.is_empty() {
            out.push_str(&format!(
                "<release version=\"{}\"{}/>\n",
                attribute(&release.version),
                date
            ));
            continue;
        }

        out.push_str(&format!(
            "<release version=\"{}\"{}>\n  <description>\n    <ul>\n",
            attribute(&release.version),
            date
        ));
        for item in &release.items {
            out.push_str(&format!("      <li>{}</li>\n", escape_xml(item)));
        }
        out.push_str("    </ul>\n  </description>\n</release>\n");
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHANGES: &str = "\
Project history

+ 1.2.0;2024-05-01
- Added dark mode
- Fixed <crash>

+ 1.1.0 ; 2024-02-11
";

    #[test]
    fn test_parse_releases() {
        let releases = parse(CHANGES);
        assert_eq!(releases.len(), 2);
        assert_eq!(releases[0].version, "1.2.0");
        assert_eq!(releases[0].date, "2024-05-01");
        assert_eq!(releases[0].items, vec!["Added dark mode", "Fixed <crash>"]);
        assert_eq!(releases[1].version, "1.1.0");
        assert!(releases[1].items.is_empty());
    }

    #[test]
    fn test_items_before_first_release_are_ignored() {
        assert!(parse("- orphan\n").is_empty());
    }

    #[test]
    fn test_appstream_output() {
        let xml = to_appstream(CHANGES);
        assert!(xml.starts_with("<release version=\"1.2.0\" date=\"2024-05-01\">"));
        assert!(xml.contains("<li>Fixed &lt;crash&gt;</li>"));
        assert!(xml.ends_with("<release version=\"1.1.0\" date=\"2024-02-11\"/>"));
        assert_eq!(to_appstream(""), "");
    }
}
