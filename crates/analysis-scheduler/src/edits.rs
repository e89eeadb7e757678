//! Replacement splicing

use shared_types::TextSpan;

fn ends_with_word(s: &str) -> bool {
    s.chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == ')')
}

fn starts_with_word(s: &str) -> bool {
    s.chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphanumeric() || c == '(')
}

/// Join `before + replacement + after`, inserting one space when the
/// replacement would otherwise run into the following word
pub fn join_with_smart_space(before: &str, replacement: &str, after: &str) -> String {
    let mut out = String::with_capacity(before.len() + replacement.len() + after.len() + 1);
    out.push_str(before);
    out.push_str(replacement);
    if ends_with_word(replacement) && starts_with_word(after) {
        out.push(' ');
    }
    out.push_str(after);
    out
}

/// Text after a replacement, with the char span the replacement now occupies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub text: String,
    pub inserted: TextSpan,
}

/// Replace `span` (char offsets, clamped) in `text` with the trimmed `replacement`
pub fn splice_replacement(text: &str, span: TextSpan, replacement: &str) -> Splice {
    let len = text.chars().count();
    let start = span.start.min(len);
    let end = span.end.clamp(start, len);

    let before: String = text.chars().take(start).collect();
    let after: String = text.chars().skip(end).collect();
    let replacement = replacement.trim();

    let inserted = TextSpan::new(start, start + replacement.chars().count());
    Splice {
        text: join_with_smart_space(&before, replacement, &after),
        inserted,
    }
}
