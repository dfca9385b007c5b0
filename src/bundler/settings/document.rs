//! Line-oriented `Key = Value` document reader.
//!
//! Syntax:
//!
//! ```text
//! # comment
//! AppBaseName = HelloWorld
//! AppShortSummary = "Quoted values lose one pair of matching quotes"
//! AppDescription = """
//!     Multi-line values are opened and closed by triple quotes.
//!     Each line is trimmed.
//! """
//! ```

use crate::bundler::error::{Error, Result};
use std::collections::HashMap;

const BLOCK_MARKER: &str = "\"\"\"";

/// One `Key = Value` assignment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    /// Key exactly as written (keys are case-sensitive).
    pub key: String,
    /// Value with quotes stripped; block lines are joined with `\n`.
    pub value: String,
    /// 1-based line of the assignment.
    pub line: usize,
}

/// Parsed document, preserving assignment order.
#[derive(Clone, Debug, Default)]
pub struct Document {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

/// Multi-line value being accumulated.
struct OpenBlock {
    key: String,
    line: usize,
    lines: Vec<String>,
}

impl Document {
    /// Parses document text.
    ///
    /// # Errors
    ///
    /// - [`Error::Syntax`] for a line without `=`, an empty key, or an
    ///   unterminated multi-line block
    /// - [`Error::DuplicateKey`] when a key is assigned twice
    pub fn parse(text: &str) -> Result<Self> {
        let mut doc = Document::default();
        let mut block: Option<OpenBlock> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            let line = raw.trim();

            if let Some(open) = block.as_mut() {
                if let Some(head) = line.strip_suffix(BLOCK_MARKER) {
                    let head = head.trim();
                    if !head.is_empty() {
                        open.lines.push(head.to_string());
                    }
                    if let Some(done) = block.take() {
                        doc.push(done.key, join_block(done.lines), done.line)?;
                    }
                } else {
                    open.lines.push(line.to_string());
                }
                continue;
            }

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((key, value)) = line.split_once('=') else {
                return Err(Error::Syntax {
                    line: line_no,
                    reason: format!("expected 'Key = Value', found '{}'", line),
                });
            };

            let key = key.trim();
            if key.is_empty() {
                return Err(Error::Syntax {
                    line: line_no,
                    reason: "assignment has no key".into(),
                });
            }

            let value = value.trim();
            if let Some(rest) = value.strip_prefix(BLOCK_MARKER) {
                match rest.strip_suffix(BLOCK_MARKER) {
                    // Opened and closed on the same line
                    Some(inner) if value.len() >= 2 * BLOCK_MARKER.len() => {
                        doc.push(key.to_string(), inner.trim().to_string(), line_no)?;
                    }
                    _ => {
                        let mut lines = Vec::new();
                        if !rest.trim().is_empty() {
                            lines.push(rest.trim().to_string());
                        }
                        block = Some(OpenBlock {
                            key: key.to_string(),
                            line: line_no,
                            lines,
                        });
                    }
                }
            } else {
                doc.push(key.to_string(), unquote(value).to_string(), line_no)?;
            }
        }

        if let Some(open) = block {
            return Err(Error::Syntax {
                line: open.line,
                reason: format!("multi-line value for {} is never closed", open.key),
            });
        }

        Ok(doc)
    }

    fn push(&mut self, key: String, value: String, line: usize) -> Result<()> {
        if self.index.contains_key(&key) {
            return Err(Error::DuplicateKey { key, line });
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Entry { key, value, line });
        Ok(())
    }

    /// Value assigned to `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&i| self.entries[i].value.as_str())
    }

    /// All assignments in document order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }
}

/// Strips one pair of matching single or double quotes.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

fn join_block(mut lines: Vec<String>) -> String {
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    let first = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    lines.drain(..first);
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_assignments_and_comments() {
        let doc = Document::parse("# header\n\nA = 1\n  B=two words  \n").unwrap();
        assert_eq!(doc.get("A"), Some("1"));
        assert_eq!(doc.get("B"), Some("two words"));
        assert_eq!(doc.get("a"), None);
        assert_eq!(doc.entries().len(), 2);
    }

    #[test]
    fn test_quotes_are_stripped_once() {
        let doc = Document::parse("A = \"x\"\nB = '\"y\"'\nC = \"z'").unwrap();
        assert_eq!(doc.get("A"), Some("x"));
        assert_eq!(doc.get("B"), Some("\"y\""));
        assert_eq!(doc.get("C"), Some("\"z'"));
    }

    #[test]
    fn test_multiline_block_trims_lines_and_edges() {
        let text = "D = \"\"\"\n\n   first  \n\n  - bullet\n\n\"\"\"\nE = x";
        let doc = Document::parse(text).unwrap();
        assert_eq!(doc.get("D"), Some("first\n\n- bullet"));
        assert_eq!(doc.get("E"), Some("x"));
    }

    #[test]
    fn test_single_line_block() {
        let doc = Document::parse("D = \"\"\" inline \"\"\"").unwrap();
        assert_eq!(doc.get("D"), Some("inline"));
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let err = Document::parse("A = 1\nA = 2").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { ref key, line: 2 } if key == "A"));
    }

    #[test]
    fn test_unterminated_block_is_rejected() {
        let err = Document::parse("A = 1\nD = \"\"\"\nline").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, .. }));
    }

    #[test]
    fn test_line_without_equals_is_rejected() {
        let err = Document::parse("A = 1\nnonsense").unwrap_err();
        assert!(matches!(err, Error::Syntax { line: 2, .. }));
    }
}
