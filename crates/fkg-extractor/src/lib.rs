//! FKG Extractor - Financial knowledge extraction
//!
//! Implements entity recognition and relationship extraction over the
//! plain text of financial documents, plus conversion of the resulting
//! candidates into graph models.

use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use fkg_core::{
    DocumentText, EntityType, ExtractionConfig, FkgError, PropertyMap, RelationshipType, Result,
};

/// Byte range of an entity inside its page text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

/// Entity recognized in text, before persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCandidate {
    pub id: Uuid,
    pub text: String,
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    pub confidence: f64,
    pub page: u32,
    pub position: Position,
    #[serde(default)]
    pub metadata: PropertyMap,
}

impl EntityCandidate {
    pub fn new(
        text: impl Into<String>,
        entity_type: EntityType,
        confidence: f64,
        page: u32,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            entity_type,
            confidence,
            page,
            position: Position { start, end },
            metadata: PropertyMap::new(),
        }
    }
}

/// Typed link between two entity candidates of the same batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipCandidate {
    pub id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    pub confidence: f64,
    #[serde(default)]
    pub metadata: PropertyMap,
}

/// Trait for entity extractors
pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str, page: u32) -> Result<Vec<EntityCandidate>>;
}

/// Trait for relation extractors
pub trait RelationExtractor: Send + Sync {
    fn extract(
        &self,
        text: &str,
        entities: &[EntityCandidate],
    ) -> Result<Vec<RelationshipCandidate>>;
}

// ============================================================================
// Statistics
// ============================================================================

/// Aggregate view over a set of entity candidates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStatistics {
    pub total_entities: usize,
    pub entities_by_type: BTreeMap<String, usize>,
    pub entities_by_page: BTreeMap<u32, usize>,
    pub average_confidence: f64,
}

impl EntityStatistics {
    pub fn from_entities(entities: &[EntityCandidate]) -> Self {
        let mut stats = Self {
            total_entities: entities.len(),
            ..Self::default()
        };
        for entity in entities {
            *stats
                .entities_by_type
                .entry(entity.entity_type.as_str().to_string())
                .or_insert(0) += 1;
            *stats.entities_by_page.entry(entity.page).or_insert(0) += 1;
        }
        stats.average_confidence = mean(entities.iter().map(|e| e.confidence));
        stats
    }
}

/// Aggregate view over a set of relationship candidates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelationshipStatistics {
    pub total_relationships: usize,
    pub relationships_by_type: BTreeMap<String, usize>,
    pub average_confidence: f64,
    pub unique_entity_pairs: usize,
}

impl RelationshipStatistics {
    pub fn from_relationships(relationships: &[RelationshipCandidate]) -> Self {
        let mut stats = Self {
            total_relationships: relationships.len(),
            ..Self::default()
        };
        let mut pairs = HashSet::new();
        for rel in relationships {
            *stats
                .relationships_by_type
                .entry(rel.relationship_type.as_str().to_string())
                .or_insert(0) += 1;
            pairs.insert((rel.source_id, rel.target_id));
        }
        stats.average_confidence = mean(relationships.iter().map(|r| r.confidence));
        stats.unique_entity_pairs = pairs.len();
        stats
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

// ============================================================================
// Document Extraction
// ============================================================================

/// Everything extracted from one document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentExtraction {
    pub entities: Vec<EntityCandidate>,
    pub relationships: Vec<RelationshipCandidate>,
    pub entity_statistics: EntityStatistics,
    pub relationship_statistics: RelationshipStatistics,
    pub extracted_at: chrono::DateTime<Utc>,
}

/// Runs entity recognition then relationship extraction page by page
pub struct ExtractionPipeline {
    entities: Box<dyn EntityExtractor>,
    relations: Box<dyn RelationExtractor>,
    max_text_bytes: usize,
}

impl ExtractionPipeline {
    pub fn new(entities: Box<dyn EntityExtractor>, relations: Box<dyn RelationExtractor>) -> Self {
        Self {
            entities,
            relations,
            max_text_bytes: ExtractionConfig::default().max_text_bytes,
        }
    }

    /// Default recognizer and pattern extractor tuned by `config`
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let ner = ner::FinancialNer::new().with_context_radius(config.context_radius);
        let re = relation::PatternRelationExtractor::new()
            .with_window_size(config.window_size)
            .with_threshold(config.relationship_threshold);
        Self {
            entities: Box::new(ner),
            relations: Box::new(re),
            max_text_bytes: config.max_text_bytes,
        }
    }

    /// Extract entities and relationships from every page.
    ///
    /// Relationships never span pages since positions are page-relative.
    pub fn extract_document(&self, document: &DocumentText) -> Result<DocumentExtraction> {
        let mut entities = Vec::new();
        let mut relationships = Vec::new();

        for (page, text) in document.pages() {
            if text.len() > self.max_text_bytes {
                return Err(FkgError::ExtractionError(format!(
                    "page {page} is {} bytes, limit is {}",
                    text.len(),
                    self.max_text_bytes
                )));
            }
            let page_entities = self.entities.extract(text, page)?;
            let page_relations = self.relations.extract(text, &page_entities)?;
            debug!(
                page,
                entities = page_entities.len(),
                relationships = page_relations.len(),
                "Extracted page"
            );
            entities.extend(page_entities);
            relationships.extend(page_relations);
        }

        let entity_statistics = EntityStatistics::from_entities(&entities);
        let relationship_statistics = RelationshipStatistics::from_relationships(&relationships);
        info!(
            pages = document.page_count(),
            entities = entity_statistics.total_entities,
            relationships = relationship_statistics.total_relationships,
            "Document extraction complete"
        );

        Ok(DocumentExtraction {
            entities,
            relationships,
            entity_statistics,
            relationship_statistics,
            extracted_at: Utc::now(),
        })
    }
}

impl Default for ExtractionPipeline {
    fn default() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }
}

pub mod loader;
pub mod metadata;
pub mod ner;
pub mod patterns;
pub mod relation;
pub mod text;

pub use loader::GraphLoader;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_statistics() {
        let entities = vec![
            EntityCandidate::new("XYZ Corp", EntityType::Company, 0.95, 1, 0, 8),
            EntityCandidate::new("$10 million", EntityType::Currency, 0.95, 1, 29, 40),
            EntityCandidate::new("2023", EntityType::Date, 0.75, 2, 0, 4),
        ];
        let stats = EntityStatistics::from_entities(&entities);
        assert_eq!(stats.total_entities, 3);
        assert_eq!(stats.entities_by_type["Company"], 1);
        assert_eq!(stats.entities_by_page[&1], 2);
        assert!((stats.average_confidence - (0.95 + 0.95 + 0.75) / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_statistics() {
        let stats = RelationshipStatistics::from_relationships(&[]);
        assert_eq!(stats.total_relationships, 0);
        assert_eq!(stats.average_confidence, 0.0);
    }

    #[test]
    fn test_unique_pairs() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let rel = |t| RelationshipCandidate {
            id: Uuid::new_v4(),
            source_id: a,
            target_id: b,
            relationship_type: t,
            confidence: 0.8,
            metadata: PropertyMap::new(),
        };
        let stats = RelationshipStatistics::from_relationships(&[
            rel(RelationshipType::HasRevenue),
            rel(RelationshipType::HasMetric),
        ]);
        assert_eq!(stats.unique_entity_pairs, 1);
        assert_eq!(stats.relationships_by_type.len(), 2);
    }

    #[test]
    fn test_pipeline_rejects_oversized_page() {
        let config = ExtractionConfig {
            max_text_bytes: 8,
            ..ExtractionConfig::default()
        };
        let pipeline = ExtractionPipeline::from_config(&config);
        let doc = DocumentText::from_pages("XYZ Corp reported revenue.", '\x0c');
        assert!(matches!(
            pipeline.extract_document(&doc),
            Err(FkgError::ExtractionError(_))
        ));
    }
}
