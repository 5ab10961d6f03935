//! In-memory graph store
//!
//! Entities are nodes and relationships are edges of a `petgraph`
//! `StableDiGraph`, so indices stay valid across deletions.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use chrono::Utc;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use fkg_core::{
    Entity, EntityType, FkgError, GraphConfig, PropertyMap, Relationship, RelationshipType, Result,
};

use crate::{GraphMetrics, GraphStore, Subgraph};

#[derive(Default)]
struct Graph {
    graph: StableDiGraph<Entity, Relationship>,
    nodes: HashMap<Uuid, NodeIndex>,
    edges: HashMap<Uuid, EdgeIndex>,
}

impl Graph {
    fn node(&self, id: Uuid) -> Result<NodeIndex> {
        self.nodes
            .get(&id)
            .copied()
            .ok_or_else(|| FkgError::NotFound(format!("entity {id}")))
    }
}

/// Reject property bags a primitive-only store could not hold
fn ensure_storable(kind: &str, id: Uuid, bags: [&PropertyMap; 2]) -> Result<()> {
    for bag in bags {
        if let Some((key, _)) = bag.iter().find(|(_, value)| !value.is_storable()) {
            return Err(FkgError::DatabaseError(format!(
                "{kind} {id} has nested value under '{key}'; flatten it before storing"
            )));
        }
    }
    Ok(())
}

/// Graph store held in process memory
pub struct MemoryGraphStore {
    inner: RwLock<Graph>,
    max_depth: u32,
}

impl MemoryGraphStore {
    pub fn new(config: &GraphConfig) -> Self {
        Self {
            inner: RwLock::new(Graph::default()),
            max_depth: config.max_traversal_depth,
        }
    }
}

impl Default for MemoryGraphStore {
    fn default() -> Self {
        Self::new(&GraphConfig::default())
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn create_entity(&self, entity: &Entity) -> Result<Uuid> {
        ensure_storable("entity", entity.id, [&entity.properties, &entity.metadata])?;

        let mut inner = self.inner.write().await;
        if inner.nodes.contains_key(&entity.id) {
            return Err(FkgError::DatabaseError(format!(
                "entity {} already exists",
                entity.id
            )));
        }
        let index = inner.graph.add_node(entity.clone());
        inner.nodes.insert(entity.id, index);
        debug!(entity_id = %entity.id, entity_type = %entity.entity_type, "Entity stored");
        Ok(entity.id)
    }

    async fn get_entity(&self, id: Uuid) -> Result<Option<Entity>> {
        let inner = self.inner.read().await;
        Ok(inner
            .nodes
            .get(&id)
            .and_then(|index| inner.graph.node_weight(*index))
            .cloned())
    }

    async fn update_entity(&self, entity: &Entity) -> Result<()> {
        ensure_storable("entity", entity.id, [&entity.properties, &entity.metadata])?;

        let mut inner = self.inner.write().await;
        let index = inner.node(entity.id)?;
        if let Some(slot) = inner.graph.node_weight_mut(index) {
            *slot = entity.clone();
            slot.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_entity(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(index) = inner.nodes.remove(&id) else {
            return Ok(false);
        };
        let incident: Vec<Uuid> = inner
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(inner.graph.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().id)
            .collect();
        for rel_id in &incident {
            inner.edges.remove(rel_id);
        }
        inner.graph.remove_node(index);
        debug!(entity_id = %id, relationships_removed = incident.len(), "Entity deleted");
        Ok(true)
    }

    async fn create_relationship(&self, relationship: &Relationship) -> Result<Uuid> {
        ensure_storable(
            "relationship",
            relationship.id,
            [&relationship.properties, &relationship.metadata],
        )?;

        let mut inner = self.inner.write().await;
        if inner.edges.contains_key(&relationship.id) {
            return Err(FkgError::DatabaseError(format!(
                "relationship {} already exists",
                relationship.id
            )));
        }
        let source = inner.node(relationship.source_id)?;
        let target = inner.node(relationship.target_id)?;
        let index = inner.graph.add_edge(source, target, relationship.clone());
        inner.edges.insert(relationship.id, index);
        Ok(relationship.id)
    }

    async fn get_relationship(&self, id: Uuid) -> Result<Option<Relationship>> {
        let inner = self.inner.read().await;
        Ok(inner
            .edges
            .get(&id)
            .and_then(|index| inner.graph.edge_weight(*index))
            .cloned())
    }

    async fn update_relationship(&self, relationship: &Relationship) -> Result<()> {
        ensure_storable(
            "relationship",
            relationship.id,
            [&relationship.properties, &relationship.metadata],
        )?;

        let mut inner = self.inner.write().await;
        let index = inner
            .edges
            .get(&relationship.id)
            .copied()
            .ok_or_else(|| FkgError::NotFound(format!("relationship {}", relationship.id)))?;

        let endpoints = inner.graph.edge_endpoints(index);
        let source = inner.node(relationship.source_id)?;
        let target = inner.node(relationship.target_id)?;
        if endpoints != Some((source, target)) {
            // Re-pointed: move the edge
            inner.graph.remove_edge(index);
            let moved = inner.graph.add_edge(source, target, relationship.clone());
            inner.edges.insert(relationship.id, moved);
        } else if let Some(slot) = inner.graph.edge_weight_mut(index) {
            *slot = relationship.clone();
        }
        Ok(())
    }

    async fn delete_relationship(&self, id: Uuid) -> Result<bool> {
        let mut inner = self.inner.write().await;
        let Some(index) = inner.edges.remove(&id) else {
            return Ok(false);
        };
        Ok(inner.graph.remove_edge(index).is_some())
    }

    async fn find_by_type(&self, entity_type: EntityType, limit: usize) -> Result<Vec<Entity>> {
        let inner = self.inner.read().await;
        Ok(inner
            .graph
            .node_indices()
            .filter_map(|index| inner.graph.node_weight(index))
            .filter(|e| e.entity_type == entity_type)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn neighbors(
        &self,
        id: Uuid,
        relationship_type: Option<RelationshipType>,
    ) -> Result<Vec<Entity>> {
        let inner = self.inner.read().await;
        let index = inner.node(id)?;

        let mut seen = HashSet::new();
        let mut found = Vec::new();
        let outgoing = inner
            .graph
            .edges_directed(index, Direction::Outgoing)
            .map(|edge| (edge.weight(), edge.target()));
        let incoming = inner
            .graph
            .edges_directed(index, Direction::Incoming)
            .map(|edge| (edge.weight(), edge.source()));
        for (rel, other) in outgoing.chain(incoming) {
            if relationship_type.is_some_and(|t| t != rel.relationship_type) {
                continue;
            }
            if seen.insert(other) {
                if let Some(entity) = inner.graph.node_weight(other) {
                    found.push(entity.clone());
                }
            }
        }
        Ok(found)
    }

    async fn subgraph(&self, start_id: Uuid, depth: u32) -> Result<Subgraph> {
        let depth = if depth > self.max_depth {
            warn!(requested = depth, max = self.max_depth, "Traversal depth capped");
            self.max_depth
        } else {
            depth
        };

        let inner = self.inner.read().await;
        let start = inner.node(start_id)?;

        let mut visited = HashSet::from([start]);
        let mut order = vec![start];
        let mut edges = HashSet::new();
        let mut queue = VecDeque::from([(start, 0u32)]);

        while let Some((node, level)) = queue.pop_front() {
            if level == depth {
                continue;
            }
            let outgoing = inner
                .graph
                .edges_directed(node, Direction::Outgoing)
                .map(|edge| (edge.id(), edge.target()));
            let incoming = inner
                .graph
                .edges_directed(node, Direction::Incoming)
                .map(|edge| (edge.id(), edge.source()));
            for (edge, other) in outgoing.chain(incoming) {
                edges.insert(edge);
                if visited.insert(other) {
                    order.push(other);
                    queue.push_back((other, level + 1));
                }
            }
        }

        let entities = order
            .iter()
            .filter_map(|index| inner.graph.node_weight(*index).cloned())
            .collect();
        let mut relationships: Vec<Relationship> = edges
            .into_iter()
            .filter_map(|index| inner.graph.edge_weight(index).cloned())
            .collect();
        relationships.sort_by_key(|r| r.id);

        Ok(Subgraph {
            entities,
            relationships,
        })
    }

    async fn metrics(&self) -> Result<GraphMetrics> {
        let inner = self.inner.read().await;
        let mut metrics = GraphMetrics {
            node_count: inner.graph.node_count(),
            edge_count: inner.graph.edge_count(),
            ..Default::default()
        };
        for entity in inner
            .graph
            .node_indices()
            .filter_map(|index| inner.graph.node_weight(index))
        {
            *metrics.entities_by_type.entry(entity.entity_type).or_default() += 1;
        }
        for rel in inner
            .graph
            .edge_indices()
            .filter_map(|index| inner.graph.edge_weight(index))
        {
            *metrics
                .relationships_by_type
                .entry(rel.relationship_type)
                .or_default() += 1;
        }
        if metrics.node_count > 0 {
            metrics.average_degree = 2.0 * metrics.edge_count as f64 / metrics.node_count as f64;
        }
        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fkg_core::PropertyValue;

    fn store() -> MemoryGraphStore {
        MemoryGraphStore::default()
    }

    #[tokio::test]
    async fn test_entity_crud() {
        let store = store();
        let mut acme = Entity::new(EntityType::Company, "Acme Corp").with_property("ticker", "ACME");
        let id = store.create_entity(&acme).await.unwrap();
        assert_eq!(id, acme.id);
        assert!(store.create_entity(&acme).await.is_err());

        acme.properties.insert("ticker".into(), PropertyValue::from("ACM"));
        store.update_entity(&acme).await.unwrap();
        let stored = store.get_entity(id).await.unwrap().unwrap();
        assert_eq!(stored.property("ticker"), Some(&PropertyValue::from("ACM")));

        assert!(store.delete_entity(id).await.unwrap());
        assert!(!store.delete_entity(id).await.unwrap());
        assert!(store.get_entity(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_nested_properties_rejected() {
        let store = store();
        let nested = PropertyValue::from(vec![PropertyValue::from(vec!["a"])]);
        let entity = Entity::new(EntityType::Company, "Acme").with_property("tags", nested.clone());
        assert!(matches!(
            store.create_entity(&entity).await,
            Err(FkgError::DatabaseError(_))
        ));

        let flat = Entity::new(EntityType::Company, "Acme").with_property("tags", nested.flatten());
        assert!(store.create_entity(&flat).await.is_ok());
    }

    #[tokio::test]
    async fn test_relationship_needs_endpoints() {
        let store = store();
        let rel = Relationship::new(RelationshipType::Issues, Uuid::new_v4(), Uuid::new_v4());
        assert!(matches!(
            store.create_relationship(&rel).await,
            Err(FkgError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_entity_drops_relationships() {
        let store = store();
        let acme = Entity::new(EntityType::Company, "Acme");
        let bond = Entity::new(EntityType::FinancialInstrument, "Acme 2030 Notes");
        store.create_entity(&acme).await.unwrap();
        store.create_entity(&bond).await.unwrap();
        let rel = Relationship::new(RelationshipType::Issues, acme.id, bond.id);
        store.create_relationship(&rel).await.unwrap();

        store.delete_entity(bond.id).await.unwrap();
        assert!(store.get_relationship(rel.id).await.unwrap().is_none());
        assert_eq!(store.metrics().await.unwrap().edge_count, 0);
    }
}
