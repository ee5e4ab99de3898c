//! Text transforms for uncertainty-annotated component lists.
//!
//! A rater marks an uncertain list item by wrapping it in parentheses, e.g.
//! `1,(2),3` or `memory, language(2), visual`. The transforms here either
//! drop those markers entirely (strict) or keep the number inline
//! (conservative).

use std::sync::OnceLock;

use regex::Regex;

/// Parenthesised run of decimal digits (any script), e.g. `(12)`.
fn marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(\d+\)").expect("marker pattern is valid"))
}

/// A run of commas together with spaces or tabs around them. Line breaks
/// are never part of a run.
fn separator_run_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[ \t]*,[ \t,]*").expect("separator pattern is valid"))
}

fn is_edge_separator(c: char) -> bool {
    matches!(c, ',' | ' ' | '\t')
}

/// Count non-overlapping uncertainty markers in `text`.
pub fn count_uncertain_markers(text: &str) -> usize {
    marker_pattern().find_iter(text).count()
}

/// Remove every uncertainty marker and normalise list separators.
///
/// Separator runs collapse to a single `,` and leading or trailing
/// separators are stripped, so removing an item never leaves an empty slot.
/// Line structure is kept. The result is never longer than the input.
pub fn strict_variant(text: &str) -> String {
    let without_markers = marker_pattern().replace_all(text, "");
    let collapsed = separator_run_pattern().replace_all(&without_markers, ",");
    collapsed.trim_matches(is_edge_separator).to_string()
}

/// Remove parenthesis characters, keeping whatever they enclosed.
pub fn conservative_variant(text: &str) -> String {
    text.chars().filter(|&c| c != '(' && c != ')').collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_uncertain_markers() {
        assert_eq!(count_uncertain_markers("1,(2),3,(14)"), 2);
        assert_eq!(count_uncertain_markers("memory, language(2), visual"), 1);
        assert_eq!(count_uncertain_markers("(a),(),( 3)"), 0);
        assert_eq!(count_uncertain_markers("a(\u{663}),b(\u{967}\u{968})"), 2);
        assert_eq!(count_uncertain_markers(""), 0);
    }

    #[test]
    fn test_strict_variant_prose_list() {
        assert_eq!(
            strict_variant("memory, language(2), visual"),
            "memory,language,visual"
        );
    }

    #[test]
    fn test_strict_variant_removes_whole_items() {
        assert_eq!(strict_variant("1,(2),3"), "1,3");
        assert_eq!(strict_variant("(1),2,(3)"), "2");
        assert_eq!(strict_variant("(1),(2)"), "");
    }

    #[test]
    fn test_strict_variant_collapses_existing_separator_runs() {
        assert_eq!(strict_variant(",,1,,,2,"), "1,2");
    }

    #[test]
    fn test_strict_variant_keeps_line_breaks() {
        assert_eq!(
            strict_variant("1,(2),\n3,4\nfoo, bar"),
            "1,\n3,4\nfoo,bar"
        );
        assert_eq!(strict_variant("1,(2)\r\n5"), "1,\r\n5");
    }

    #[test]
    fn test_strict_variant_removes_non_ascii_digit_markers() {
        assert_eq!(strict_variant("a,b(\u{663}),c"), "a,b,c");
    }

    #[test]
    fn test_strict_variant_keeps_non_numeric_parens() {
        assert_eq!(strict_variant("1,(maybe),3"), "1,(maybe),3");
    }

    #[test]
    fn test_strict_never_grows() {
        for input in ["1,(2),3", "  a ,b , (3)", "x", "", ",(1),", "a,  b"] {
            assert!(strict_variant(input).len() <= input.len(), "grew: {:?}", input);
        }
    }

    #[test]
    fn test_conservative_variant() {
        assert_eq!(
            conservative_variant("memory, language(2), visual"),
            "memory, language2, visual"
        );
        assert_eq!(conservative_variant("1,(2),3"), "1,2,3");
    }

    #[test]
    fn test_conservative_is_idempotent() {
        let once = conservative_variant("(1),2,(33)");
        assert_eq!(conservative_variant(&once), once);
    }
}
