//! Review text sanitization.
//!
//! Raw input is cleaned before it is sent to the classifier or persisted:
//! markup tags go, anything outside letters/digits/whitespace/`.,!?` goes,
//! surrounding whitespace is trimmed, and the result is capped at
//! [`MAX_REVIEW_CHARS`]. Always returns a string, possibly empty; the
//! service rejects empty input before calling in here.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum review length, enforced both before classification and again at
/// the storage boundary.
pub const MAX_REVIEW_CHARS: usize = 1000;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());
static DISALLOWED_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9\s.,!?]").unwrap());

pub fn sanitize(raw: &str) -> String {
    let no_tags = TAG_RE.replace_all(raw, "");
    let cleaned = DISALLOWED_RE.replace_all(&no_tags, "");
    truncate_chars(cleaned.trim(), MAX_REVIEW_CHARS)
}

/// Character-based truncation (not bytes, so multi-byte input cannot be
/// split mid-character).
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_tags() {
        assert_eq!(sanitize("<b>Great movie!!!</b>"), "Great movie!!!");
        assert_eq!(sanitize("<div class=\"x\">hi</div> there"), "hi there");
    }

    #[test]
    fn removes_disallowed_characters_but_keeps_punctuation() {
        assert_eq!(sanitize("Wow! Really good, right? 10/10"), "Wow! Really good, right? 1010");
        assert_eq!(sanitize("so-so; #hashtag @user"), "soso hashtag user");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize("   fine   "), "fine");
    }

    #[test]
    fn truncates_to_max_chars() {
        let long = "x".repeat(5000);
        assert_eq!(sanitize(&long).chars().count(), MAX_REVIEW_CHARS);
    }

    #[test]
    fn empty_and_symbol_only_input_become_empty() {
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("@#$%^&*"), "");
    }

    #[test]
    fn truncate_chars_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("日本語のレビュー", 3), "日本語");
        assert_eq!(truncate_chars("short", 1000), "short");
    }
}
