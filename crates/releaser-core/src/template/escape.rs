//! HTML escaping for substituted variables.

/// Escapes `& < > " '` but leaves `/` alone: tag names such as
/// `plugin/v0.0.8` end up inside download URLs and must stay literal.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
