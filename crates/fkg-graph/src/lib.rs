//! FKG Graph - Graph persistence abstraction
//!
//! Provides the persistence collaborator for extracted and validated
//! financial knowledge: an async [`GraphStore`] trait and an in-memory
//! implementation backed by `petgraph`.

use std::collections::BTreeMap;

use async_trait::async_trait;
use fkg_core::{Entity, EntityType, Relationship, RelationshipType, Result};
use futures::future::try_join_all;
use serde::Serialize;
use uuid::Uuid;

pub mod memory_store;

pub use memory_store::MemoryGraphStore;

/// Entities and relationships reachable from a start entity
#[derive(Debug, Clone, Default, Serialize)]
pub struct Subgraph {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

/// Size and composition of a stored graph
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphMetrics {
    pub node_count: usize,
    pub edge_count: usize,
    pub entities_by_type: BTreeMap<EntityType, usize>,
    pub relationships_by_type: BTreeMap<RelationshipType, usize>,
    /// Edges per node, counting both ends
    pub average_degree: f64,
}

/// Ids assigned by a bulk store
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoredIds {
    pub entities: Vec<Uuid>,
    pub relationships: Vec<Uuid>,
}

/// Trait for graph persistence operations
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Store a new entity and return its id
    async fn create_entity(&self, entity: &Entity) -> Result<Uuid>;

    /// Get entity by ID
    async fn get_entity(&self, id: Uuid) -> Result<Option<Entity>>;

    /// Replace a stored entity
    async fn update_entity(&self, entity: &Entity) -> Result<()>;

    /// Delete an entity and its relationships; false if it was not stored
    async fn delete_entity(&self, id: Uuid) -> Result<bool>;

    /// Store a relationship between two stored entities
    async fn create_relationship(&self, relationship: &Relationship) -> Result<Uuid>;

    async fn get_relationship(&self, id: Uuid) -> Result<Option<Relationship>>;

    async fn update_relationship(&self, relationship: &Relationship) -> Result<()>;

    async fn delete_relationship(&self, id: Uuid) -> Result<bool>;

    /// Find entities by type
    async fn find_by_type(&self, entity_type: EntityType, limit: usize) -> Result<Vec<Entity>>;

    /// Entities one hop away in either direction, optionally through one
    /// relationship type only
    async fn neighbors(
        &self,
        id: Uuid,
        relationship_type: Option<RelationshipType>,
    ) -> Result<Vec<Entity>>;

    /// Traverse the graph from an entity up to `depth` hops
    async fn subgraph(&self, start_id: Uuid, depth: u32) -> Result<Subgraph>;

    async fn metrics(&self) -> Result<GraphMetrics>;

    /// Store entities, then the relationships between them
    async fn store_all(
        &self,
        entities: &[Entity],
        relationships: &[Relationship],
    ) -> Result<StoredIds> {
        let entity_ids = try_join_all(entities.iter().map(|e| self.create_entity(e))).await?;
        let relationship_ids =
            try_join_all(relationships.iter().map(|r| self.create_relationship(r))).await?;
        Ok(StoredIds {
            entities: entity_ids,
            relationships: relationship_ids,
        })
    }
}
