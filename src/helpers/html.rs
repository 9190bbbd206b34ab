//! Markup escaping

/// Escape the characters that would break an XML text node
///
/// Only `&`, `<` and `>` are substituted. `&` goes first so entities produced
/// by the later substitutions are not escaped twice.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a value placed inside a double-quoted XML attribute
pub fn escape_attr(s: &str) -> String {
    escape_xml(s).replace('"', "&quot;")
}
