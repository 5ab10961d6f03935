//! Relationship extraction module
//!
//! Pairs entities that share a sentence and lie within a character window,
//! scores every relationship pattern against the text spanning the pair and
//! keeps the best-scoring kind above a confidence threshold.

use tracing::debug;
use uuid::Uuid;

use crate::metadata::relationship_metadata;
use crate::patterns::{
    is_compatible, relation_pattern, RelationPattern, NEGATION_CUES, RELATION_PATTERNS,
    TEMPORAL_CUES,
};
use crate::text::{slice, split_sentences};
use crate::{EntityCandidate, RelationExtractor, RelationshipCandidate};
use fkg_core::{RelationshipType, Result};

// ============================================================================
// Confidence
// ============================================================================

fn score(
    context: &str,
    context_lower: &str,
    source: &EntityCandidate,
    target: &EntityCandidate,
    relation: RelationshipType,
    pattern: Option<&RelationPattern>,
) -> f64 {
    let mut confidence = 0.6;

    if is_compatible(source.entity_type, relation, target.entity_type) {
        confidence += 0.2;
    }
    if context.chars().count() < 50 {
        confidence += 0.1;
    }
    confidence += (source.confidence + target.confidence) * 0.05;
    confidence += pattern.map_or(0.0, |p| p.quality(context_lower)) * 0.1;
    if TEMPORAL_CUES.iter().any(|r| r.is_match(context)) {
        confidence += 0.1;
    }
    if NEGATION_CUES.iter().any(|r| r.is_match(context)) {
        confidence -= 0.3;
    }

    f64::clamp(confidence, 0.0, 1.0)
}

/// Confidence that `relation` links `source` to `target` given the text
/// spanning both entities
pub fn relationship_confidence(
    context: &str,
    source: &EntityCandidate,
    target: &EntityCandidate,
    relation: RelationshipType,
) -> f64 {
    let lower = context.to_lowercase();
    score(context, &lower, source, target, relation, relation_pattern(relation))
}

// ============================================================================
// Pattern-based Relation Extractor
// ============================================================================

/// Lexical-pattern relationship extractor
pub struct PatternRelationExtractor {
    window_size: usize,
    threshold: f64,
}

impl PatternRelationExtractor {
    pub fn new() -> Self {
        Self {
            window_size: 100,
            threshold: 0.5,
        }
    }

    /// Maximum distance between the starts of two paired entities
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Minimum confidence a candidate must reach
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Best matching relationship kind for a pair; earlier patterns win ties
    pub fn find_relationship(
        &self,
        context: &str,
        source: &EntityCandidate,
        target: &EntityCandidate,
    ) -> Option<(RelationshipType, f64)> {
        let lower = context.to_lowercase();
        let mut best: Option<(RelationshipType, f64)> = None;

        for pattern in RELATION_PATTERNS {
            if !pattern.matches(&lower) {
                continue;
            }
            let confidence = score(context, &lower, source, target, pattern.relation, Some(pattern));
            if best.map_or(true, |(_, b)| confidence > b) {
                best = Some((pattern.relation, confidence));
            }
        }

        best
    }
}

impl Default for PatternRelationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RelationExtractor for PatternRelationExtractor {
    fn extract(
        &self,
        text: &str,
        entities: &[EntityCandidate],
    ) -> Result<Vec<RelationshipCandidate>> {
        let mut relationships = Vec::new();

        for sentence in split_sentences(text) {
            let members: Vec<&EntityCandidate> = entities
                .iter()
                .filter(|e| sentence.contains(e.position.start))
                .collect();
            if members.len() < 2 {
                continue;
            }

            for (i, source) in members.iter().enumerate() {
                for target in &members[i + 1..] {
                    if source.position.start.abs_diff(target.position.start) > self.window_size {
                        continue;
                    }

                    let start = source.position.start.min(target.position.start);
                    let end = source.position.end.max(target.position.end);
                    let context = slice(text, start, end);

                    let Some((relation, confidence)) = self.find_relationship(context, source, target)
                    else {
                        continue;
                    };
                    if confidence < self.threshold {
                        continue;
                    }

                    relationships.push(RelationshipCandidate {
                        id: Uuid::new_v4(),
                        source_id: source.id,
                        target_id: target.id,
                        relationship_type: relation,
                        confidence,
                        metadata: relationship_metadata(context, sentence.text, source, target, relation),
                    });
                }
            }
        }

        debug!(count = relationships.len(), "Extracted relationships");
        Ok(relationships)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fkg_core::{EntityType, PropertyValue};

    fn entity(text: &str, entity_type: EntityType, confidence: f64, haystack: &str) -> EntityCandidate {
        let start = haystack.find(text).unwrap();
        EntityCandidate::new(text, entity_type, confidence, 1, start, start + text.len())
    }

    #[test]
    fn test_has_revenue_scenario() {
        let text = "XYZ Corp reported revenue of $10 million in 2023.";
        let entities = vec![
            entity("XYZ Corp", EntityType::Company, 0.95, text),
            entity("$10 million", EntityType::Currency, 0.95, text),
        ];
        let rels = PatternRelationExtractor::new().extract(text, &entities).unwrap();

        assert_eq!(rels.len(), 1);
        let rel = &rels[0];
        assert_eq!(rel.relationship_type, RelationshipType::HasRevenue);
        assert_eq!(rel.source_id, entities[0].id);
        assert!(rel.confidence >= 0.5);

        let temporal = rel.metadata["temporal_indicators"].as_map().unwrap();
        assert_eq!(temporal["has_date"], PropertyValue::Bool(true));
        assert!(rel.metadata.contains_key("financial_metrics"));
    }

    #[test]
    fn test_confidence_terms() {
        let text = "XYZ Corp reported revenue of $10 million";
        let source = entity("XYZ Corp", EntityType::Company, 0.95, text);
        let target = entity("$10 million", EntityType::Currency, 0.95, text);
        // 0.6 + 0.2 + 0.1 + 0.095 + 0.025, clamped
        let confidence = relationship_confidence(text, &source, &target, RelationshipType::HasRevenue);
        assert_eq!(confidence, 1.0);

        // No compatibility bonus for HAS_METRIC towards a currency
        let metric = relationship_confidence(text, &source, &target, RelationshipType::HasMetric);
        let expected = 0.6 + 0.1 + 0.095 + (0.6 / 7.0 + 0.4 / 5.0) * 0.1;
        assert!((metric - expected).abs() < 1e-9);
    }

    #[test]
    fn test_pairs_outside_window_skipped() {
        let text = "Acme Corp said that, after a long and detailed review of every single line item, revenue of $5 million was booked.";
        let entities = vec![
            entity("Acme Corp", EntityType::Company, 0.95, text),
            entity("$5 million", EntityType::Currency, 0.95, text),
        ];
        let narrow = PatternRelationExtractor::new().with_window_size(20);
        assert!(narrow.extract(text, &entities).unwrap().is_empty());
        let wide = PatternRelationExtractor::new().with_window_size(200);
        assert_eq!(wide.extract(text, &entities).unwrap().len(), 1);
    }

    #[test]
    fn test_pairs_never_cross_sentences() {
        let text = "Acme Corp grew. Revenue of $5 million followed.";
        let entities = vec![
            entity("Acme Corp", EntityType::Company, 0.95, text),
            entity("$5 million", EntityType::Currency, 0.95, text),
        ];
        let rels = PatternRelationExtractor::new().extract(text, &entities).unwrap();
        assert!(rels.is_empty());
    }

    #[test]
    fn test_threshold_filters() {
        let text = "XYZ Corp did not report revenue of $10 million";
        let entities = vec![
            entity("XYZ Corp", EntityType::Company, 0.2, text),
            entity("$10 million", EntityType::Currency, 0.2, text),
        ];
        let strict = PatternRelationExtractor::new().with_threshold(0.95);
        assert!(strict.extract(text, &entities).unwrap().is_empty());
    }

    #[test]
    fn test_no_pattern_no_relationship() {
        let text = "Acme Corp and $5 million.";
        let entities = vec![
            entity("Acme Corp", EntityType::Company, 0.95, text),
            entity("$5 million", EntityType::Currency, 0.95, text),
        ];
        assert!(PatternRelationExtractor::new().extract(text, &entities).unwrap().is_empty());
    }
}
