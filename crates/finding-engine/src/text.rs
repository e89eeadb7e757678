//! Character-offset helpers
//!
//! Finding offsets count Unicode scalar values, not bytes. Every slice of the
//! subject text goes through here so that out-of-range offsets clamp instead
//! of panicking on a char boundary.

use shared_types::TextSpan;

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the character at `offset`, clamped to `text.len()`
pub fn byte_index(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map_or(text.len(), |(idx, _)| idx)
}

/// Slice by character offsets; out-of-range or inverted bounds clamp to an empty slice
pub fn slice_chars(text: &str, start: usize, end: usize) -> &str {
    let start_byte = byte_index(text, start);
    let end_byte = byte_index(text, end.max(start));
    &text[start_byte..end_byte]
}

fn eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Find the first case-insensitive occurrence of `needle` in `haystack`
pub fn find_case_insensitive(haystack: &str, needle: &str) -> Option<TextSpan> {
    let needle: Vec<char> = needle.chars().collect();
    if needle.is_empty() {
        return None;
    }
    let hay: Vec<char> = haystack.chars().collect();
    if needle.len() > hay.len() {
        return None;
    }

    (0..=hay.len() - needle.len())
        .find(|&start| {
            hay[start..start + needle.len()]
                .iter()
                .zip(&needle)
                .all(|(a, b)| eq_ignore_case(*a, *b))
        })
        .map(|start| TextSpan::new(start, start + needle.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_case_insensitive_first_match() {
        let span = find_case_insensitive("You should MAN UP. Man up!", "man up").unwrap();
        assert_eq!(span, TextSpan::new(11, 17));
    }

    #[test]
    fn test_find_case_insensitive_missing() {
        assert_eq!(find_case_insensitive("officer on duty", "policeman"), None);
        assert_eq!(find_case_insensitive("abc", ""), None);
        assert_eq!(find_case_insensitive("ab", "abc"), None);
    }

    #[test]
    fn test_offsets_count_characters() {
        let text = "Café guys";
        let span = find_case_insensitive(text, "GUYS").unwrap();
        assert_eq!(span, TextSpan::new(5, 9));
        assert_eq!(slice_chars(text, span.start, span.end), "guys");
    }

    #[test]
    fn test_slice_clamps_out_of_range() {
        assert_eq!(slice_chars("hello", 3, 99), "lo");
        assert_eq!(slice_chars("hello", 99, 120), "");
        assert_eq!(slice_chars("hello", 4, 2), "");
    }
}
