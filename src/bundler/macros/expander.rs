//! Single-pass `${NAME}` substitution.

use super::{MacroId, MacroTable};
use regex::{Captures, Regex};
use std::sync::LazyLock;

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Z0-9_]+)\}").expect("macro token pattern is valid")
});

/// Escapes `&`, `<` and `>`.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

impl MacroTable {
    /// Replaces every known `${NAME}` token in `template`.
    ///
    /// The scan runs once over the template: tokens that appear inside a
    /// substituted value are copied through untouched, and unknown names are
    /// left as written. With `escape_xml`, inserted values (but not the
    /// template text) are XML-escaped, except for macros that already hold XML.
    pub fn expand(&self, template: &str, escape_xml: bool) -> String {
        TOKEN
            .replace_all(template, |caps: &Captures<'_>| {
                match MacroId::from_name(&caps[1]) {
                    Some(id) if escape_xml && !id.is_xml() => self::escape_xml(self.get(id)),
                    Some(id) => self.get(id).to_string(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
