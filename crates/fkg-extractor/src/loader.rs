//! Graph Loader module
//!
//! Converts entity and relationship candidates into graph models ready for
//! the persistence collaborator. Every persisted item gets a fresh id; the
//! loader keeps the mapping from candidate id to graph id so relationships
//! can be re-pointed at the persisted entities.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use fkg_core::{flatten_properties, Entity, PropertyValue, Relationship};

use crate::{EntityCandidate, RelationshipCandidate};

// ============================================================================
// Conversion utilities
// ============================================================================

/// Convert an entity candidate to a graph entity with flattened metadata
pub fn entity_to_graph(candidate: &EntityCandidate, document_id: Option<&str>) -> Entity {
    let mut entity = Entity::new(candidate.entity_type, candidate.text.as_str())
        .with_confidence(candidate.confidence)
        .with_property("name", candidate.text.as_str())
        .with_property("page", i64::from(candidate.page))
        .with_property("start", candidate.position.start)
        .with_property("end", candidate.position.end)
        .with_metadata("candidate_id", candidate.id.to_string());

    entity.metadata.extend(flatten_properties(&candidate.metadata));
    if let Some(document_id) = document_id {
        entity = entity.with_source_document(document_id);
    }
    entity
}

/// Convert a relationship candidate to a graph relationship between
/// already-persisted entities
pub fn relationship_to_graph(
    candidate: &RelationshipCandidate,
    source_id: Uuid,
    target_id: Uuid,
    document_id: Option<&str>,
) -> Relationship {
    let mut rel = Relationship::new(candidate.relationship_type, source_id, target_id)
        .with_confidence(candidate.confidence);
    rel.metadata = flatten_properties(&candidate.metadata);
    rel.metadata.insert(
        "candidate_id".to_string(),
        PropertyValue::from(candidate.id.to_string()),
    );
    rel.source_document = document_id.map(str::to_string);
    rel
}

// ============================================================================
// Graph Loader
// ============================================================================

/// Result of preparing candidates for the graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadResult {
    /// Number of entities prepared
    pub entities_loaded: usize,
    /// Number of relationships prepared
    pub relationships_loaded: usize,
    /// Candidate id to graph id
    pub id_map: HashMap<Uuid, Uuid>,
    /// Relationships skipped because an endpoint was unknown
    pub errors: Vec<String>,
}

impl LoadResult {
    /// Check if any items were prepared
    pub fn is_empty(&self) -> bool {
        self.entities_loaded == 0 && self.relationships_loaded == 0
    }

    /// Total items prepared
    pub fn total(&self) -> usize {
        self.entities_loaded + self.relationships_loaded
    }
}

/// Graph loader for converting candidates to graph models
pub struct GraphLoader {
    /// Source document recorded on every model
    document_id: Option<String>,
    /// Candidate id to graph id
    id_map: HashMap<Uuid, Uuid>,
    entities: Vec<Entity>,
    relationships: Vec<Relationship>,
    errors: Vec<String>,
}

impl GraphLoader {
    pub fn new() -> Self {
        Self {
            document_id: None,
            id_map: HashMap::new(),
            entities: Vec::new(),
            relationships: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// Add an entity candidate; adding the same candidate twice is a no-op
    pub fn add_entity(&mut self, candidate: &EntityCandidate) -> Uuid {
        if let Some(&id) = self.id_map.get(&candidate.id) {
            return id;
        }

        let entity = entity_to_graph(candidate, self.document_id.as_deref());
        let id = entity.id;
        self.id_map.insert(candidate.id, id);
        self.entities.push(entity);
        id
    }

    /// Add a relationship candidate whose endpoints were added before
    pub fn add_relationship(&mut self, candidate: &RelationshipCandidate) -> Option<Uuid> {
        let (Some(&source), Some(&target)) = (
            self.id_map.get(&candidate.source_id),
            self.id_map.get(&candidate.target_id),
        ) else {
            warn!(candidate = %candidate.id, "Relationship endpoint not loaded, skipping");
            self.errors.push(format!(
                "relationship {} references an unknown entity",
                candidate.id
            ));
            return None;
        };

        let rel = relationship_to_graph(candidate, source, target, self.document_id.as_deref());
        let id = rel.id;
        self.relationships.push(rel);
        Some(id)
    }

    /// Add a whole extraction batch, entities first
    pub fn add_all(&mut self, entities: &[EntityCandidate], relationships: &[RelationshipCandidate]) {
        for entity in entities {
            self.add_entity(entity);
        }
        for rel in relationships {
            self.add_relationship(rel);
        }
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Graph id assigned to a candidate
    pub fn graph_id(&self, candidate_id: Uuid) -> Option<Uuid> {
        self.id_map.get(&candidate_id).copied()
    }

    /// Take ownership of the prepared models
    pub fn take(&mut self) -> (Vec<Entity>, Vec<Relationship>) {
        (
            std::mem::take(&mut self.entities),
            std::mem::take(&mut self.relationships),
        )
    }

    pub fn result(&self) -> LoadResult {
        LoadResult {
            entities_loaded: self.entities.len(),
            relationships_loaded: self.relationships.len(),
            id_map: self.id_map.clone(),
            errors: self.errors.clone(),
        }
    }
}

impl Default for GraphLoader {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use fkg_core::{EntityType, PropertyMap, RelationshipType};

    fn candidate(text: &str, entity_type: EntityType) -> EntityCandidate {
        let mut c = EntityCandidate::new(text, entity_type, 0.9, 1, 0, text.len());
        let mut nested = PropertyMap::new();
        nested.insert("inner".to_string(), PropertyValue::Bool(true));
        c.metadata.insert("nested".to_string(), PropertyValue::Map(nested));
        c
    }

    #[test]
    fn test_entity_gets_fresh_id() {
        let c = candidate("XYZ Corp", EntityType::Company);
        let entity = entity_to_graph(&c, Some("report.txt"));
        assert_ne!(entity.id, c.id);
        assert_eq!(entity.name, "XYZ Corp");
        assert_eq!(entity.property("name").and_then(PropertyValue::as_str), Some("XYZ Corp"));
        assert_eq!(entity.source_document.as_deref(), Some("report.txt"));
        assert!(entity.metadata.values().all(PropertyValue::is_storable));
    }

    #[test]
    fn test_loader_remaps_relationships() {
        let company = candidate("XYZ Corp", EntityType::Company);
        let amount = candidate("$10 million", EntityType::Currency);
        let rel = RelationshipCandidate {
            id: Uuid::new_v4(),
            source_id: company.id,
            target_id: amount.id,
            relationship_type: RelationshipType::HasRevenue,
            confidence: 1.0,
            metadata: PropertyMap::new(),
        };

        let mut loader = GraphLoader::new();
        loader.add_all(&[company.clone(), amount.clone()], &[rel]);

        let result = loader.result();
        assert_eq!(result.entities_loaded, 2);
        assert_eq!(result.relationships_loaded, 1);
        assert!(result.errors.is_empty());

        let stored = &loader.relationships()[0];
        assert_eq!(Some(stored.source_id), loader.graph_id(company.id));
        assert_eq!(Some(stored.target_id), loader.graph_id(amount.id));
    }

    #[test]
    fn test_dangling_relationship_reported() {
        let rel = RelationshipCandidate {
            id: Uuid::new_v4(),
            source_id: Uuid::new_v4(),
            target_id: Uuid::new_v4(),
            relationship_type: RelationshipType::Owns,
            confidence: 0.7,
            metadata: PropertyMap::new(),
        };
        let mut loader = GraphLoader::new();
        assert!(loader.add_relationship(&rel).is_none());
        assert_eq!(loader.result().errors.len(), 1);
        assert!(loader.result().is_empty());
    }

    #[test]
    fn test_duplicate_candidate_loaded_once() {
        let c = candidate("Acme Corp", EntityType::Company);
        let mut loader = GraphLoader::new();
        let first = loader.add_entity(&c);
        let second = loader.add_entity(&c);
        assert_eq!(first, second);
        assert_eq!(loader.entities().len(), 1);
    }
}
