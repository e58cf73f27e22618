//! String helpers shared by the layers.

use std::borrow::Cow;

/// Longest prefix of `s` that fits in `max_bytes` and ends on a char boundary.
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    &s[..end]
}

/// Like [`truncate_str`], with a trailing line saying how much was cut.
///
/// Tool output goes back to the model as conversation content; the notice
/// keeps a cut-off result from reading as complete.
pub fn truncate_with_notice(s: &str, max_bytes: usize) -> Cow<'_, str> {
    let kept = truncate_str(s, max_bytes);
    if kept.len() == s.len() {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(format!("{}\n[truncated {} bytes]", kept, s.len() - kept.len()))
    }
}
