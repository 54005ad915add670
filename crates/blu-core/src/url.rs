//! URL helpers for the classification path

/// Longest URL, in bytes, kept in a block event.
pub const MAX_LOGGED_URL_LEN: usize = 512;

/// Lower-case a URL once so every trigger comparison is case-insensitive.
#[inline]
pub fn normalize(url: &str) -> String {
    url.to_lowercase()
}

/// Truncate to at most `max_len` bytes without splitting a character.
pub fn truncate_for_log(url: &str, max_len: usize) -> &str {
    if url.len() <= max_len {
        return url;
    }
    let mut end = max_len;
    while !url.is_char_boundary(end) {
        end -= 1;
    }
    &url[..end]
}
