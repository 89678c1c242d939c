//! Delimiter boundary scanning.
//!
//! A delimiter may arrive split across two chunks (`"<thi"` + `"nk>"`), so
//! the streaming extractor must know not only where a delimiter *is* but
//! also where one *could start* given more input.

/// Find the earliest index at which `needle` could begin in `buffer`.
///
/// Returns the lowest byte index `i` such that either `buffer[i..]` starts
/// with the whole `needle`, or `buffer[i..]` is a non-empty prefix of
/// `needle` (a delimiter cut off at the end of the buffer). Only char
/// boundaries are considered, so the returned index is always safe to slice
/// at. Returns `None` when `needle` cannot start anywhere in `buffer`, or
/// when `needle` is empty.
///
/// The earliest qualifying index wins, not the longest match.
///
/// ```rust
/// use cherry_streaming::find_potential_start;
///
/// assert_eq!(find_potential_start("hello <thi", "<think>"), Some(6));
/// assert_eq!(find_potential_start("hello world", "<think>"), None);
/// ```
#[must_use]
pub fn find_potential_start(buffer: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }

    let haystack = buffer.as_bytes();
    let needle = needle.as_bytes();

    buffer.char_indices().map(|(i, _)| i).find(|&i| {
        let max_match = (haystack.len() - i).min(needle.len());
        haystack[i..i + max_match] == needle[..max_match]
    })
}

/// Whether the potential start at `index` is a complete delimiter.
#[must_use]
pub fn is_complete_match(buffer: &str, index: usize, needle: &str) -> bool {
    buffer
        .get(index..)
        .is_some_and(|rest| rest.starts_with(needle))
}
