//! Regex fallback for venue names the recognizer misses.

use std::sync::LazyLock;

use regex::Regex;

/// A capitalized phrase after a "went there" verb or preposition, up to
/// punctuation, end of text, or a following " in".
static RE_AFTER_PREPOSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?:ate at|eating at|food (?:at|from)|at|from|in|visit(?:ing|ed)?|try(?:ing)?)\s+([A-Z][A-Za-z'’&\s]*?)(?:[.,!?;:]|$|\s+in\b)",
    )
    .unwrap()
});

/// A capitalized phrase ending in a possessive or a venue word.
static RE_VENUE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b([A-Z][\w&]*(?:\s+[A-Z][\w&]*)*?(?:'s|’s|\s+(?i:restaurant|cafe|bistro|bar|grill)))\b",
    )
    .unwrap()
});

/// First venue-looking phrase in `text`, trimmed.
pub fn match_venue_name(text: &str) -> Option<String> {
    [&*RE_AFTER_PREPOSITION, &*RE_VENUE_SUFFIX]
        .into_iter()
        .find_map(|re| re.captures(text).and_then(|caps| caps.get(1)))
        .map(|m| m.as_str().trim().to_string())
        .filter(|name| !name.is_empty())
}
