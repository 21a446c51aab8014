//! Trigram similarity with `pg_trgm` semantics.
//!
//! Each word is lower-cased and padded with two leading blanks and one
//! trailing blank before trigrams are taken, so `"cat"` yields
//! `"  c"`, `" ca"`, `"cat"`, `"at "`. Similarity is the number of shared
//! trigrams over the number of distinct trigrams in either string.

use std::collections::HashSet;

/// Distinct trigrams of `text`.
pub fn trigrams(text: &str) -> HashSet<[char; 3]> {
    let mut out = HashSet::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars().flat_map(char::to_lowercase))
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            out.insert([window[0], window[1], window[2]]);
        }
    }
    out
}

/// Similarity in `[0, 1]`. Two strings without any word characters score 0.
pub fn similarity(a: &str, b: &str) -> f64 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.intersection(&tb).count();
    let union = ta.len() + tb.len() - shared;
    shared as f64 / union as f64
}
