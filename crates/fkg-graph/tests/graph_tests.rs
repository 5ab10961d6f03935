use fkg_core::{DocumentText, Entity, EntityType, FkgError, Relationship, RelationshipType};
use fkg_extractor::{ExtractionPipeline, GraphLoader};
use fkg_graph::{GraphStore, MemoryGraphStore};

const FILING: &str = "XYZ Corp reported revenue of $10 million in 2023.";

fn chain(len: usize) -> (Vec<Entity>, Vec<Relationship>) {
    let entities: Vec<Entity> = (0..len)
        .map(|i| Entity::new(EntityType::Company, format!("Company {i}")))
        .collect();
    let relationships = entities
        .windows(2)
        .map(|pair| Relationship::new(RelationshipType::Owns, pair[0].id, pair[1].id))
        .collect();
    (entities, relationships)
}

#[tokio::test]
async fn extracted_document_round_trips_through_store() {
    let doc = DocumentText::from_pages(FILING, '\x0c');
    let extraction = ExtractionPipeline::default().extract_document(&doc).unwrap();

    let mut loader = GraphLoader::new().with_document("filing-2023");
    loader.add_all(&extraction.entities, &extraction.relationships);
    let (entities, relationships) = loader.take();

    let store = MemoryGraphStore::default();
    let ids = store.store_all(&entities, &relationships).await.unwrap();
    assert_eq!(ids.entities.len(), extraction.entities.len());
    assert_eq!(ids.relationships.len(), relationships.len());

    let metrics = store.metrics().await.unwrap();
    assert_eq!(metrics.node_count, entities.len());
    assert_eq!(metrics.entities_by_type[&EntityType::Company], 1);
    assert!(metrics.relationships_by_type[&RelationshipType::HasRevenue] >= 1);

    let company = store.find_by_type(EntityType::Company, 10).await.unwrap();
    assert_eq!(company[0].name, "XYZ Corp");
    assert_eq!(company[0].source_document.as_deref(), Some("filing-2023"));

    let revenue = store
        .neighbors(company[0].id, Some(RelationshipType::HasRevenue))
        .await
        .unwrap();
    assert!(revenue
        .iter()
        .any(|e| e.entity_type == EntityType::Currency && e.name == "$10 million"));
}

#[tokio::test]
async fn subgraph_is_bounded_by_depth() {
    let store = MemoryGraphStore::default();
    let (entities, relationships) = chain(6);
    store.store_all(&entities, &relationships).await.unwrap();

    let one_hop = store.subgraph(entities[0].id, 1).await.unwrap();
    assert_eq!(one_hop.entities.len(), 2);
    assert_eq!(one_hop.relationships.len(), 1);

    // Depth is capped at the configured maximum of 3
    let capped = store.subgraph(entities[0].id, 10).await.unwrap();
    assert_eq!(capped.entities.len(), 4);
    assert_eq!(capped.entities[0].id, entities[0].id);

    let middle = store.subgraph(entities[3].id, 1).await.unwrap();
    assert_eq!(middle.entities.len(), 3);
}

#[tokio::test]
async fn store_all_fails_on_dangling_relationship() {
    let store = MemoryGraphStore::default();
    let (entities, mut relationships) = chain(2);
    relationships.push(Relationship::new(
        RelationshipType::Owns,
        entities[0].id,
        uuid::Uuid::new_v4(),
    ));

    let err = store.store_all(&entities, &relationships).await.unwrap_err();
    assert!(matches!(err, FkgError::NotFound(_)));
}

#[test]
fn relationship_update_moves_edge() {
    tokio_test::block_on(async {
        let store = MemoryGraphStore::default();
        let (entities, relationships) = chain(3);
        store.store_all(&entities, &relationships).await.unwrap();

        let mut rel = relationships[0].clone();
        rel.target_id = entities[2].id;
        store.update_relationship(&rel).await.unwrap();

        let neighbors = store.neighbors(entities[0].id, None).await.unwrap();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].id, entities[2].id);
        assert!(store.delete_relationship(rel.id).await.unwrap());
        assert!(store.neighbors(entities[0].id, None).await.unwrap().is_empty());
    });
}
