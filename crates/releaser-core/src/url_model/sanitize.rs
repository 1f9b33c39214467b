//! Linux-safe local filenames for downloaded assets.

/// Longest file name (bytes) Linux filesystems accept.
pub(crate) const NAME_MAX: usize = 255;

/// Sanitizes an asset name for use as a local file name on Linux.
///
/// Path separators, NUL, whitespace and control characters become `_`
/// (runs collapsed); leading/trailing dots and underscores are trimmed and
/// the result is cut to NAME_MAX bytes on a char boundary.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let bad = matches!(c, '\0' | '/' | '\\' | ' ' | '\t') || c.is_control();
        if !bad {
            out.push(c);
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    truncate_on_char_boundary(trimmed, NAME_MAX).to_string()
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
pub(crate) fn truncate_on_char_boundary(s: &str, max: usize) -> &str {
    let mut take = s.len().min(max);
    while !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}
