//! Named-entity recognition seam and the built-in rule-based recognizer.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::gazetteer::{
    self, BUSINESS_SUFFIXES, CONNECTORS, GEO_FEATURES, LEADING_NOISE, MAX_PLACE_WORDS,
    SPAN_BREAKERS, VENUE_KEYWORDS,
};

/// Words (with inner apostrophes and hyphens), ampersands, or single
/// punctuation characters.
static RE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’\-][\p{L}\p{N}]+)*|&|[^\s\p{L}\p{N}]").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    /// Companies, venues, brands.
    Organization,
    /// Cities, states, countries.
    GeopoliticalEntity,
    /// Non-political locations: regions, valleys, coasts.
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub text: String,
    pub kind: EntityKind,
    /// Byte offset of the entity in the input.
    pub start: usize,
}

/// Finds typed entity spans in free text, in order of appearance.
pub trait EntityRecognizer: Send + Sync {
    fn recognize(&self, text: &str) -> Vec<Entity>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    Ampersand,
    Punct,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    kind: TokenKind,
}

impl Token<'_> {
    fn is_capitalized(&self) -> bool {
        self.kind == TokenKind::Word && self.text.chars().next().is_some_and(char::is_uppercase)
    }

    fn lower(&self) -> String {
        self.text.to_lowercase()
    }

    fn is_possessive(&self) -> bool {
        self.kind == TokenKind::Word && (self.text.ends_with("'s") || self.text.ends_with("’s"))
    }

    /// Lower-case text with a trailing possessive removed.
    fn base(&self) -> String {
        let lower = self.lower();
        lower
            .strip_suffix("'s")
            .or_else(|| lower.strip_suffix("’s"))
            .map(str::to_string)
            .unwrap_or(lower)
    }

    fn is_breaker(&self) -> bool {
        self.kind == TokenKind::Word && SPAN_BREAKERS.contains(&self.lower().as_str())
    }

    fn is_connector(&self) -> bool {
        match self.kind {
            TokenKind::Ampersand => true,
            TokenKind::Word => {
                !self.is_capitalized() && CONNECTORS.contains(&self.text)
            }
            TokenKind::Punct => false,
        }
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    RE_TOKEN
        .find_iter(text)
        .map(|m| {
            let s = m.as_str();
            let kind = if s == "&" {
                TokenKind::Ampersand
            } else if s.chars().next().is_some_and(char::is_alphanumeric) {
                TokenKind::Word
            } else {
                TokenKind::Punct
            };
            Token {
                text: s,
                start: m.start(),
                end: m.end(),
                kind,
            }
        })
        .collect()
}

/// Rule-based recognizer.
///
/// Runs of capitalized words (joined by `&`, `of`, `de` and similar) form
/// candidate spans. A span is split around known place names, which
/// become geopolitical entities. What remains is a location when it ends
/// in a geographic feature word, and an organization when it has a
/// possessive or a venue or business word.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicRecognizer;

impl EntityRecognizer for HeuristicRecognizer {
    fn recognize(&self, text: &str) -> Vec<Entity> {
        let tokens = tokenize(text);
        let mut entities = Vec::new();
        for (start, end) in capitalized_spans(&tokens) {
            classify_span(text, &tokens[start..end], &mut entities);
        }
        entities
    }
}

/// Index ranges of capitalized runs.
fn capitalized_spans(tokens: &[Token<'_>]) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if !token.is_capitalized() || token.is_breaker() {
            i += 1;
            continue;
        }

        let mut j = i + 1;
        while j < tokens.len() {
            let next = &tokens[j];
            if next.is_capitalized() && !next.is_breaker() {
                j += 1;
            } else if next.is_connector()
                && tokens
                    .get(j + 1)
                    .is_some_and(|after| after.is_capitalized() && !after.is_breaker())
            {
                j += 2;
            } else {
                break;
            }
        }
        spans.push((i, j));
        i = j;
    }
    spans
}

/// Splits a span around gazetteer matches and classifies the pieces.
fn classify_span(text: &str, span: &[Token<'_>], out: &mut Vec<Entity>) {
    let mut pending_start = 0;
    let mut idx = 0;
    while idx < span.len() {
        match place_match_at(span, idx) {
            Some((len, kind)) => {
                classify_remainder(text, &span[pending_start..idx], out);
                out.push(entity(text, &span[idx..idx + len], kind));
                idx += len;
                pending_start = idx;
            }
            None => idx += 1,
        }
    }
    classify_remainder(text, &span[pending_start..], out);
}

/// Longest gazetteer entry starting at `idx`, as (token count, kind).
fn place_match_at(span: &[Token<'_>], idx: usize) -> Option<(usize, EntityKind)> {
    let max = MAX_PLACE_WORDS.min(span.len() - idx);
    (1..=max).rev().find_map(|len| {
        let window = &span[idx..idx + len];
        if window.iter().any(|t| t.kind != TokenKind::Word) {
            return None;
        }
        let phrase = window
            .iter()
            .enumerate()
            .map(|(i, t)| if i + 1 == len { t.base() } else { t.lower() })
            .collect::<Vec<_>>()
            .join(" ");
        if gazetteer::is_place(&phrase) {
            Some((len, EntityKind::GeopoliticalEntity))
        } else if gazetteer::is_region(&phrase) {
            Some((len, EntityKind::Location))
        } else {
            None
        }
    })
}

fn classify_remainder(text: &str, tokens: &[Token<'_>], out: &mut Vec<Entity>) {
    let start = tokens
        .iter()
        .position(|t| t.is_capitalized() && !LEADING_NOISE.contains(&t.lower().as_str()));
    let Some(start) = start else {
        return;
    };
    let Some(end) = tokens.iter().rposition(|t| t.is_capitalized()) else {
        return;
    };
    if end < start {
        return;
    }
    let tokens = &tokens[start..=end];

    let last = tokens[tokens.len() - 1].base();
    let kind = if GEO_FEATURES.contains(&last.as_str()) {
        Some(EntityKind::Location)
    } else if tokens.iter().any(Token::is_possessive)
        || tokens.iter().any(|t| VENUE_KEYWORDS.contains(&t.base().as_str()))
        || (tokens.len() > 1 && BUSINESS_SUFFIXES.contains(&last.as_str()))
    {
        Some(EntityKind::Organization)
    } else {
        None
    };

    if let Some(kind) = kind {
        out.push(entity(text, tokens, kind));
    }
}

fn entity(text: &str, tokens: &[Token<'_>], kind: EntityKind) -> Entity {
    let start = tokens[0].start;
    let end = tokens[tokens.len() - 1].end;
    let mut value = &text[start..end];
    // "NYC's best slice" names NYC, not "NYC's".
    if kind != EntityKind::Organization {
        value = value
            .strip_suffix("'s")
            .or_else(|| value.strip_suffix("’s"))
            .unwrap_or(value);
    }
    Entity {
        text: value.to_string(),
        kind,
        start,
    }
}
