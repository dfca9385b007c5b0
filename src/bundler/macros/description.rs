//! Converts description text into an AppStream `<p>`/`<ul>` fragment.

use super::escape_xml;

fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix(['-', '*', '+'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
}

/// Builds the description fragment.
///
/// Blank lines end a paragraph or list. Lines starting with `-`, `*` or
/// `+` become list items, with or without a space after the marker;
/// consecutive plain lines are joined into one paragraph. An empty description falls back to a paragraph holding
/// `summary`. All text is escaped.
pub fn to_html(lines: &[String], summary: &str) -> String {
    let mut blocks: Vec<String> = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut items: Vec<&str> = Vec::new();

    fn flush_paragraph(blocks: &mut Vec<String>, paragraph: &mut Vec<&str>) {
        if !paragraph.is_empty() {
            blocks.push(format!("<p>{}</p>", escape_xml(&paragraph.join(" "))));
            paragraph.clear();
        }
    }

    fn flush_list(blocks: &mut Vec<String>, items: &mut Vec<&str>) {
        if !items.is_empty() {
            let mut list = String::from("<ul>\n");
            for item in items.iter() {
                list.push_str(&format!("<li>{}</li>\n", escape_xml(item)));
            }
            list.push_str("</ul>");
            blocks.push(list);
            items.clear();
        }
    }

    for line in lines.iter().map(|l| l.trim()) {
        if line.is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut items);
        } else if let Some(item) = bullet(line) {
            flush_paragraph(&mut blocks, &mut paragraph);
            items.push(item);
        } else {
            flush_list(&mut blocks, &mut items);
            paragraph.push(line);
        }
    }
    flush_paragraph(&mut blocks, &mut paragraph);
    flush_list(&mut blocks, &mut items);

    if blocks.is_empty() {
        return format!("<p>{}</p>", escape_xml(summary));
    }
    blocks.join("\n")
}
