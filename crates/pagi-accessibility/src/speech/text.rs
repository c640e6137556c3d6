//! Text cleanup applied to every utterance before it is queued.

use once_cell::sync::Lazy;
use regex::Regex;

/// Rich-text tags like `<color=#fff>` or `</b>`.
static ANGLE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Curly-brace markup like `{b}` or `{/i}`.
static BRACE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]+\}").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Punctuation a screen reader would either skip or read literally, spoken as a pause instead.
const PAUSE_MARKS: [&str; 4] = ["...", "\u{2026}", "\u{2014}", "\u{2013}"];

/// Strip markup, collapse whitespace, and canonicalize pause punctuation.
///
/// Returns an empty string when nothing speakable is left.
pub fn clean_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let stripped = ANGLE_TAG.replace_all(text, "");
    let stripped = BRACE_TAG.replace_all(&stripped, "");
    let mut result = WHITESPACE.replace_all(&stripped, " ").into_owned();

    for mark in PAUSE_MARKS {
        result = result.replace(mark, ", ");
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_rich_text_and_brace_tags() {
        assert_eq!(
            clean_text("<color=#ff0000>Danger</color> {b}ahead{/b}"),
            "Danger ahead"
        );
    }

    #[test]
    fn collapses_whitespace() {
        assert_eq!(clean_text("  Open\n\n   the\tdoor  "), "Open the door");
    }

    #[test]
    fn pause_punctuation_becomes_comma() {
        assert_eq!(clean_text("Wait... what"), "Wait,  what");
        assert_eq!(clean_text("Atma\u{2014}Raya"), "Atma, Raya");
        assert_eq!(clean_text("Hmm\u{2026}"), "Hmm,");
    }

    #[test]
    fn markup_only_is_empty() {
        assert_eq!(clean_text("<b></b>{i}"), "");
        assert_eq!(clean_text("   "), "");
    }
}
