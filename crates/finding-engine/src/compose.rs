//! Highlight compositor
//!
//! Produces the markup layer drawn behind the editor: escaped literal text with
//! non-overlapping `<mark>` regions for findings and, optionally, one
//! transient "accepted" region.

use shared_types::{Finding, FindingKind, TextSpan};

use crate::arbitrate::flatten_by;
use crate::text::{char_len, slice_chars};

pub const FINDING_MARK_CLASS: &str = "et_mark";
pub const ACCEPTED_MARK_CLASS: &str = "et_good";

/// Neutralize markup metacharacters
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escape literal text and turn newlines into explicit line breaks
fn escape_text(text: &str) -> String {
    escape_html(text).replace('\n', "<br/>")
}

enum Region<'a> {
    Finding(&'a Finding),
    Accepted,
}

struct Marked<'a> {
    span: TextSpan,
    region: Region<'a>,
}

fn clamp_span(span: TextSpan, len: usize) -> TextSpan {
    TextSpan::new(span.start.min(len), span.end.min(len))
}

/// Render `text` with the given findings and an optional accepted span.
///
/// Offsets are clamped to the text; empty ranges are skipped. Findings win over
/// the transient span when they overlap.
pub fn compose(text: &str, findings: &[Finding], transient: Option<TextSpan>) -> String {
    let len = char_len(text);

    let candidates: Vec<Marked<'_>> = findings
        .iter()
        .map(|f| Marked {
            span: clamp_span(f.span(), len),
            region: Region::Finding(f),
        })
        .filter(|m| !m.span.is_empty())
        .collect();
    let mut regions = flatten_by(candidates, |m| m.span);

    if let Some(span) = transient.map(|s| clamp_span(s, len)) {
        if !span.is_empty() && !regions.iter().any(|m| m.span.overlaps(&span)) {
            regions.push(Marked {
                span,
                region: Region::Accepted,
            });
            regions.sort_by_key(|m| m.span.start);
        }
    }

    let mut out = String::new();
    let mut cursor = 0;

    for marked in &regions {
        let TextSpan { start, end } = marked.span;
        if start > cursor {
            out.push_str(&escape_text(slice_chars(text, cursor, start)));
        }

        let literal = slice_chars(text, start, end);
        match marked.region {
            Region::Finding(finding) => {
                let shown = match (&finding.kind, finding.mask.as_deref()) {
                    (FindingKind::Replace, Some(mask)) => mask,
                    _ => literal,
                };
                out.push_str(&format!(
                    "<mark data-id=\"{}\" class=\"{}\">{}</mark>",
                    escape_html(&finding.id),
                    FINDING_MARK_CLASS,
                    escape_text(shown)
                ));
            }
            Region::Accepted => {
                out.push_str(&format!(
                    "<mark class=\"{}\">{}</mark>",
                    ACCEPTED_MARK_CLASS,
                    escape_text(literal)
                ));
            }
        }
        cursor = end;
    }

    if cursor < len {
        out.push_str(&escape_text(slice_chars(text, cursor, len)));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn replace(id: &str, start: usize, end: usize, mask: Option<&str>) -> Finding {
        Finding {
            id: id.to_string(),
            kind: FindingKind::Replace,
            start,
            end,
            original_text: String::new(),
            mask: mask.map(str::to_string),
            message: "msg".to_string(),
            replacement: Some("x".to_string()),
            confidence: None,
        }
    }

    #[test]
    fn test_plain_text_is_escaped() {
        assert_eq!(
            compose("a < b & \"c\"\nd's", &[], None),
            "a &lt; b &amp; &quot;c&quot;<br/>d&#039;s"
        );
    }

    #[test]
    fn test_marks_replace_finding() {
        let text = "You should man up.";
        let out = compose(text, &[replace("f_0_11_17", 11, 17, None)], None);
        assert_eq!(
            out,
            "You should <mark data-id=\"f_0_11_17\" class=\"et_mark\">man up</mark>."
        );
    }

    #[test]
    fn test_mask_used_only_for_replace() {
        let text = "bad word here";
        let masked = compose(text, &[replace("m", 0, 3, Some("b*d"))], None);
        assert!(masked.contains(">b*d</mark>"));

        let mut avoid = replace("a", 0, 3, Some("b*d"));
        avoid.kind = FindingKind::Avoid;
        let shown = compose(text, &[avoid], None);
        assert!(shown.contains(">bad</mark>"));
    }

    #[test]
    fn test_overlapping_findings_are_flattened() {
        let text = "abcdefghij";
        let out = compose(
            text,
            &[replace("inner", 2, 4, None), replace("outer", 1, 6, None)],
            None,
        );
        assert_eq!(
            out,
            "a<mark data-id=\"outer\" class=\"et_mark\">bcdef</mark>ghij"
        );
    }

    #[test]
    fn test_transient_span_yields_to_findings() {
        let text = "Hello folks, hi guys";
        let accepted = compose(text, &[], Some(TextSpan::new(6, 11)));
        assert_eq!(
            accepted,
            "Hello <mark class=\"et_good\">folks</mark>, hi guys"
        );

        let blocked = compose(
            text,
            &[replace("r", 8, 14, None)],
            Some(TextSpan::new(6, 11)),
        );
        assert!(!blocked.contains("et_good"));

        let both = compose(text, &[replace("r", 16, 20, None)], Some(TextSpan::new(6, 11)));
        assert_eq!(
            both,
            "Hello <mark class=\"et_good\">folks</mark>, hi <mark data-id=\"r\" class=\"et_mark\">guys</mark>"
        );
    }

    #[test]
    fn test_out_of_range_offsets_clamp() {
        let out = compose("short", &[replace("r", 3, 99, None), replace("z", 50, 60, None)], None);
        assert_eq!(out, "sho<mark data-id=\"r\" class=\"et_mark\">rt</mark>");
    }

    #[test]
    fn test_id_is_attribute_escaped() {
        let out = compose("abc", &[replace("x\"y", 0, 1, None)], None);
        assert!(out.starts_with("<mark data-id=\"x&quot;y\""));
    }
}
