//! Entity recognition module
//!
//! Recognition runs in two layers:
//! - A base tagger producing coarse labelled spans (ORG, PERSON, DATE, ...)
//! - Financial domain patterns from [`crate::patterns`]
//!
//! Tagger labels are mapped onto the closed financial entity set and
//! anything outside it is dropped. Overlapping spans are resolved in favour
//! of the earliest, then longest, span.

use std::collections::HashSet;

use chrono::Utc;
use regex::Regex;
use tracing::debug;

use crate::patterns::ENTITY_PATTERNS;
use crate::text::context_window;
use crate::{EntityCandidate, EntityExtractor};
use fkg_core::{EntityType, PropertyValue, Result};

// ============================================================================
// Base Tagger
// ============================================================================

/// Labelled span produced by a base tagger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedSpan {
    pub start: usize,
    pub end: usize,
    pub label: String,
}

/// General-purpose named entity tagger
pub trait BaseTagger: Send + Sync {
    fn tag(&self, text: &str) -> Vec<TaggedSpan>;
}

/// Map a tagger label onto the financial entity set
pub fn map_label(label: &str) -> Option<EntityType> {
    match label {
        "ORG" => Some(EntityType::Company),
        "PERSON" => Some(EntityType::Person),
        "DATE" => Some(EntityType::Date),
        "MONEY" => Some(EntityType::Currency),
        "PERCENT" => Some(EntityType::Percentage),
        _ => None,
    }
}

const CORPORATE_SUFFIXES: &str =
    "Corp|Corporation|Inc|Ltd|LLC|PLC|plc|Group|Holdings|Co|Company|Bank|AG|SA|GmbH|NV";

const ARTICLES: &[&str] = &["The ", "A ", "An "];

/// Capitalization and keyword heuristics standing in for a statistical model
pub struct HeuristicTagger {
    rules: Vec<(Regex, &'static str)>,
}

impl HeuristicTagger {
    pub fn new() -> Self {
        let mut tagger = Self { rules: Vec::new() };

        // Organizations: capitalized words closed by a corporate suffix
        tagger.add_rule(
            &format!(r"\b(?:[A-Z][A-Za-z0-9&'-]*\s+){{1,4}}(?:{CORPORATE_SUFFIXES})\b"),
            "ORG",
        );

        // People: honorific or role title followed by a capitalized name
        tagger.add_rule(
            r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)?",
            "PERSON",
        );
        tagger.add_rule(
            r"\b(?:CEO|CFO|COO|CTO|Chairman|Chairwoman|President|Director)\s+(?P<name>[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)",
            "PERSON",
        );

        // Dates
        tagger.add_rule(
            r"\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},\s+(?:19|20)\d{2}\b",
            "DATE",
        );
        tagger.add_rule(r"\b(?:Q[1-4]|H[12]|FY)\s?(?:19|20)\d{2}\b", "DATE");
        tagger.add_rule(r"\b(?:19|20)\d{2}-\d{2}-\d{2}\b", "DATE");
        tagger.add_rule(r"\b(?:19|20)\d{2}\b", "DATE");

        tagger
    }

    fn add_rule(&mut self, pattern: &str, label: &'static str) {
        if let Ok(regex) = Regex::new(pattern) {
            self.rules.push((regex, label));
        }
    }
}

impl Default for HeuristicTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl BaseTagger for HeuristicTagger {
    fn tag(&self, text: &str) -> Vec<TaggedSpan> {
        let mut spans = Vec::new();
        for (regex, label) in &self.rules {
            for caps in regex.captures_iter(text) {
                let Some(m) = caps.name("name").or_else(|| caps.get(0)) else {
                    continue;
                };
                let mut start = m.start();
                if *label == "ORG" {
                    if let Some(article) = ARTICLES.iter().find(|a| m.as_str().starts_with(**a)) {
                        start += article.len();
                    }
                }
                spans.push(TaggedSpan {
                    start,
                    end: m.end(),
                    label: (*label).to_string(),
                });
            }
        }
        spans
    }
}

// ============================================================================
// Confidence
// ============================================================================

/// Recognition confidence of an entity:
/// 0.7 base, +0.2 for currency/percentage, +0.1 for company/person,
/// +0.1 for an uppercase first character, +0.05 for more than three
/// characters, clamped to [0, 1].
pub fn entity_confidence(entity_type: EntityType, text: &str) -> f64 {
    let mut confidence: f64 = 0.7;

    if matches!(entity_type, EntityType::Currency | EntityType::Percentage) {
        confidence += 0.2;
    }
    if matches!(entity_type, EntityType::Company | EntityType::Person) {
        confidence += 0.1;
    }
    if text.chars().next().is_some_and(char::is_uppercase) {
        confidence += 0.1;
    }
    if text.chars().count() > 3 {
        confidence += 0.05;
    }

    confidence.clamp(0.0, 1.0)
}

// ============================================================================
// Financial NER
// ============================================================================

struct Span {
    start: usize,
    end: usize,
    entity_type: EntityType,
}

/// Financial entity recognizer
pub struct FinancialNer {
    tagger: Box<dyn BaseTagger>,
    patterns: Vec<(Regex, EntityType)>,
    context_radius: usize,
}

impl FinancialNer {
    /// Create a recognizer with the heuristic tagger
    pub fn new() -> Self {
        Self::with_tagger(Box::new(HeuristicTagger::new()))
    }

    /// Create a recognizer around a custom base tagger
    pub fn with_tagger(tagger: Box<dyn BaseTagger>) -> Self {
        let mut ner = Self {
            tagger,
            patterns: Vec::new(),
            context_radius: 50,
        };
        for pattern in ENTITY_PATTERNS {
            ner.add_pattern(pattern.pattern, pattern.entity_type);
        }
        ner
    }

    pub fn with_context_radius(mut self, radius: usize) -> Self {
        self.context_radius = radius;
        self
    }

    fn add_pattern(&mut self, pattern: &str, entity_type: EntityType) {
        if let Ok(regex) = Regex::new(pattern) {
            self.patterns.push((regex, entity_type));
        }
    }

    fn extract_by_tagger(&self, text: &str) -> Vec<Span> {
        self.tagger
            .tag(text)
            .into_iter()
            .filter(|s| s.start < s.end && text.get(s.start..s.end).is_some())
            .filter_map(|s| {
                map_label(&s.label).map(|entity_type| Span {
                    start: s.start,
                    end: s.end,
                    entity_type,
                })
            })
            .collect()
    }

    fn extract_by_patterns(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for (regex, entity_type) in &self.patterns {
            for m in regex.find_iter(text) {
                spans.push(Span {
                    start: m.start(),
                    end: m.end(),
                    entity_type: *entity_type,
                });
            }
        }
        spans
    }

    /// Keep the earliest, then longest, span of each overlapping group.
    /// Tagger spans precede pattern spans on exact ties.
    fn deduplicate(&self, mut spans: Vec<Span>) -> Vec<Span> {
        // Stable sort keeps tagger-before-pattern order for identical ranges
        spans.sort_by(|a, b| {
            a.start
                .cmp(&b.start)
                .then((b.end - b.start).cmp(&(a.end - a.start)))
        });

        let mut result = Vec::new();
        let mut covered: HashSet<usize> = HashSet::new();

        for span in spans {
            let overlaps = (span.start..span.end).any(|i| covered.contains(&i));
            if !overlaps {
                covered.extend(span.start..span.end);
                result.push(span);
            }
        }

        result.sort_by_key(|s| s.start);
        result
    }
}

impl Default for FinancialNer {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityExtractor for FinancialNer {
    fn extract(&self, text: &str, page: u32) -> Result<Vec<EntityCandidate>> {
        let mut spans = self.extract_by_tagger(text);
        spans.extend(self.extract_by_patterns(text));
        let spans = self.deduplicate(spans);

        let detected_at = Utc::now().to_rfc3339();
        let entities: Vec<EntityCandidate> = spans
            .into_iter()
            .map(|span| {
                let surface = &text[span.start..span.end];
                let confidence = entity_confidence(span.entity_type, surface);
                let mut candidate = EntityCandidate::new(
                    surface,
                    span.entity_type,
                    confidence,
                    page,
                    span.start,
                    span.end,
                );
                candidate.metadata.insert(
                    "context".to_string(),
                    PropertyValue::from(context_window(text, span.start, span.end, self.context_radius)),
                );
                candidate
                    .metadata
                    .insert("detected_at".to_string(), PropertyValue::from(detected_at.as_str()));
                candidate
            })
            .collect();

        debug!(page, count = entities.len(), "Recognized entities");
        Ok(entities)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(entities: &'a [EntityCandidate], text: &str) -> Option<&'a EntityCandidate> {
        entities.iter().find(|e| e.text == text)
    }

    #[test]
    fn test_xyz_scenario_entities() {
        let ner = FinancialNer::new();
        let entities = ner
            .extract("XYZ Corp reported revenue of $10 million in 2023.", 1)
            .unwrap();

        let company = find(&entities, "XYZ Corp").unwrap();
        assert_eq!(company.entity_type, EntityType::Company);
        assert!((company.confidence - 0.95).abs() < 1e-9);

        let amount = find(&entities, "$10 million").unwrap();
        assert_eq!(amount.entity_type, EntityType::Currency);
        assert!((amount.confidence - 0.95).abs() < 1e-9);

        let year = find(&entities, "2023").unwrap();
        assert_eq!(year.entity_type, EntityType::Date);
        assert!((year.confidence - 0.75).abs() < 1e-9);

        assert_eq!(
            find(&entities, "revenue").map(|e| e.entity_type),
            Some(EntityType::FinancialMetric)
        );
    }

    #[test]
    fn test_currency_confidence() {
        assert!((entity_confidence(EntityType::Currency, "$500,000") - 0.95).abs() < 1e-9);
        assert!((entity_confidence(EntityType::Percentage, "5%") - 0.9).abs() < 1e-9);
        assert!((entity_confidence(EntityType::Market, "NYSE") - 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_positions_and_context() {
        let text = "Shares of Acme Holdings trade on the NASDAQ.";
        let entities = FinancialNer::new().extract(text, 3).unwrap();
        for e in &entities {
            assert_eq!(&text[e.position.start..e.position.end], e.text);
            assert_eq!(e.page, 3);
            let context = e.metadata["context"].as_str().unwrap();
            assert!(context.contains(&e.text));
        }
        assert_eq!(
            find(&entities, "Acme Holdings").map(|e| e.entity_type),
            Some(EntityType::Company)
        );
        assert_eq!(
            find(&entities, "NASDAQ").map(|e| e.entity_type),
            Some(EntityType::Market)
        );
    }

    #[test]
    fn test_overlaps_keep_longest() {
        let text = "Operating income growth reached 12.5% while accounts receivable fell.";
        let entities = FinancialNer::new().extract(text, 1).unwrap();
        assert!(find(&entities, "income growth").is_some());
        assert!(find(&entities, "accounts receivable").is_some());
        assert!(find(&entities, "12.5%").is_some());
        assert!(find(&entities, "income").is_none());
    }

    #[test]
    fn test_article_stripped_from_company() {
        let entities = FinancialNer::new()
            .extract("The Northwind Trading Company opened a branch.", 1)
            .unwrap();
        assert!(find(&entities, "Northwind Trading Company").is_some());
    }

    #[test]
    fn test_person_by_role() {
        let entities = FinancialNer::new()
            .extract("CFO Jane Doe joined Acme Corp in 2021.", 1)
            .unwrap();
        let person = find(&entities, "Jane Doe").unwrap();
        assert_eq!(person.entity_type, EntityType::Person);
        assert!((person.confidence - 0.95).abs() < 1e-9);
    }

    struct FixedTagger;

    impl BaseTagger for FixedTagger {
        fn tag(&self, _text: &str) -> Vec<TaggedSpan> {
            vec![
                TaggedSpan { start: 0, end: 6, label: "GPE".to_string() },
                TaggedSpan { start: 0, end: 6, label: "ORG".to_string() },
            ]
        }
    }

    #[test]
    fn test_unmapped_labels_dropped() {
        let ner = FinancialNer::with_tagger(Box::new(FixedTagger));
        let entities = ner.extract("London Bridge", 1).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].entity_type, EntityType::Company);
    }
}
