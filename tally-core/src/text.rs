//! Description normalization used for rule matching and duplicate detection.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

fn installment_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\(\s*\d+\s*/\s*\d+\s*\)|\b\d+/\d+\b").expect("invalid marker regex")
    })
}

/// Remove diacritics: NFD decomposition, then drop combining marks.
pub fn strip_accents(s: &str) -> String {
    s.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case, accent-free, single-spaced text.
pub fn normalize_text(s: &str) -> String {
    collapse_whitespace(&strip_accents(&s.to_lowercase()))
}

/// [`normalize_text`] plus removal of asterisks and `(n/m)` / `n/m`
/// installment markers. Two descriptions of the same purchase on different
/// statements normalize to the same string.
pub fn normalize_description(s: &str) -> String {
    let lowered = strip_accents(&s.to_lowercase()).replace('*', "");
    let unmarked = installment_marker_re().replace_all(&lowered, " ");
    collapse_whitespace(&unmarked)
}
