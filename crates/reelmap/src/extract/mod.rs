//! Venue name and location hints from free text.

pub mod entities;
pub mod gazetteer;
pub mod patterns;

use std::sync::Arc;

use serde::Serialize;

pub use entities::{Entity, EntityKind, EntityRecognizer, HeuristicRecognizer};
pub use patterns::match_venue_name;

use gazetteer::VENUE_KEYWORDS;

/// What the extractor found. Empty strings mean nothing was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlaceHint {
    pub name: String,
    pub hint_location: String,
}

impl PlaceHint {
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    pub fn location(&self) -> Option<&str> {
        let loc = self.hint_location.trim();
        (!loc.is_empty()).then_some(loc)
    }
}

#[derive(Clone)]
pub struct TextExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(Arc::new(HeuristicRecognizer))
    }
}

impl TextExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Never fails; an empty hint means the text named no venue.
    pub fn extract(&self, text: &str) -> PlaceHint {
        if text.trim().is_empty() {
            return PlaceHint::default();
        }

        let entities = self.recognizer.recognize(text);
        let name = venue_name(&entities).or_else(|| match_venue_name(text));
        let hint_location = location(&entities);

        PlaceHint {
            name: name.unwrap_or_default(),
            hint_location: hint_location.unwrap_or_default(),
        }
    }
}

/// First organization mentioning a venue keyword, else the first organization.
fn venue_name(entities: &[Entity]) -> Option<String> {
    let orgs: Vec<&Entity> = entities
        .iter()
        .filter(|e| e.kind == EntityKind::Organization)
        .collect();

    orgs.iter()
        .find(|e| {
            let lower = e.text.to_lowercase();
            VENUE_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .or_else(|| orgs.first())
        .map(|e| e.text.clone())
}

fn location(entities: &[Entity]) -> Option<String> {
    let first_of = |kind: EntityKind| {
        entities
            .iter()
            .find(|e| e.kind == kind)
            .map(|e| e.text.clone())
    };
    first_of(EntityKind::GeopoliticalEntity).or_else(|| first_of(EntityKind::Location))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedRecognizer(Vec<Entity>);

    impl EntityRecognizer for FixedRecognizer {
        fn recognize(&self, _text: &str) -> Vec<Entity> {
            self.0.clone()
        }
    }

    fn ent(text: &str, kind: EntityKind) -> Entity {
        Entity {
            text: text.to_string(),
            kind,
            start: 0,
        }
    }

    fn with(entities: Vec<Entity>) -> TextExtractor {
        TextExtractor::new(Arc::new(FixedRecognizer(entities)))
    }

    #[test]
    fn test_pizza_video() {
        let hint = TextExtractor::default().extract(
            "BEST Pizza in New York City We visited Joe's Pizza in NYC and it was amazing! \
             The classic slice is perfect.",
        );
        assert_eq!(hint.name, "Joe's Pizza");
        assert_eq!(hint.hint_location, "New York City");
    }

    #[test]
    fn test_empty_text() {
        assert_eq!(TextExtractor::default().extract(""), PlaceHint::default());
        assert_eq!(TextExtractor::default().extract("   \n"), PlaceHint::default());
    }

    #[test]
    fn test_keyword_org_preferred() {
        let hint = with(vec![
            ent("Acme Holdings", EntityKind::Organization),
            ent("Sunset Grill", EntityKind::Organization),
        ])
        .extract("anything");
        assert_eq!(hint.name, "Sunset Grill");
    }

    #[test]
    fn test_first_org_without_keyword() {
        let hint = with(vec![
            ent("Franklin Barbecue", EntityKind::Organization),
            ent("Valentina's", EntityKind::Organization),
        ])
        .extract("anything");
        assert_eq!(hint.name, "Franklin Barbecue");
    }

    #[test]
    fn test_gpe_preferred_over_loc() {
        let hint = with(vec![
            ent("Napa Valley", EntityKind::Location),
            ent("Yountville", EntityKind::GeopoliticalEntity),
            ent("Bouchon Bistro", EntityKind::Organization),
        ])
        .extract("anything");
        assert_eq!(hint.hint_location, "Yountville");

        let hint = with(vec![ent("Napa Valley", EntityKind::Location)]).extract("anything");
        assert_eq!(hint.hint_location, "Napa Valley");
        assert!(!hint.has_name());
    }

    #[test]
    fn test_regex_fallback() {
        let hint = with(vec![]).extract("great dinner at Katz's Deli, so good");
        assert_eq!(hint.name, "Katz's Deli");
        assert_eq!(hint.location(), None);
    }

    #[test]
    fn test_nothing_found() {
        let hint = TextExtractor::default().extract("just a lovely day out");
        assert!(!hint.has_name());
        assert_eq!(hint.location(), None);
    }
}
