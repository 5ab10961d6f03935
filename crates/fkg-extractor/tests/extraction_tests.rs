use fkg_core::{DocumentText, EntityType, PropertyValue, RelationshipType};
use fkg_extractor::ner::{entity_confidence, FinancialNer};
use fkg_extractor::relation::{relationship_confidence, PatternRelationExtractor};
use fkg_extractor::{
    EntityCandidate, EntityExtractor, ExtractionPipeline, RelationExtractor, RelationshipStatistics,
};
use proptest::prelude::*;

const XYZ: &str = "XYZ Corp reported revenue of $10 million in 2023.";

fn types() -> impl Strategy<Value = EntityType> {
    prop::sample::select(EntityType::RECOGNIZED.to_vec())
}

#[test]
fn xyz_end_to_end() {
    let entities = FinancialNer::new().extract(XYZ, 1).unwrap();
    let names: Vec<(&str, EntityType)> = entities.iter().map(|e| (e.text.as_str(), e.entity_type)).collect();
    assert!(names.contains(&("XYZ Corp", EntityType::Company)));
    assert!(names.contains(&("$10 million", EntityType::Currency)));
    assert!(names.contains(&("2023", EntityType::Date)));

    let relationships = PatternRelationExtractor::new().extract(XYZ, &entities).unwrap();
    let company = entities.iter().find(|e| e.text == "XYZ Corp").unwrap();
    let amount = entities.iter().find(|e| e.text == "$10 million").unwrap();
    let revenue = relationships
        .iter()
        .find(|r| r.source_id == company.id && r.target_id == amount.id)
        .expect("company to amount relationship");

    assert_eq!(revenue.relationship_type, RelationshipType::HasRevenue);
    assert!(revenue.confidence >= 0.5 && revenue.confidence <= 1.0);
    let temporal = revenue.metadata["temporal_indicators"].as_map().unwrap();
    assert_eq!(temporal["has_date"], PropertyValue::Bool(true));
}

#[test]
fn pipeline_keeps_pages_apart() {
    let doc = DocumentText::from_pages(format!("{XYZ}\x0cAcme Holdings listed on the NYSE."), '\x0c');
    let extraction = ExtractionPipeline::default().extract_document(&doc).unwrap();

    let stats = &extraction.entity_statistics;
    assert_eq!(stats.total_entities, extraction.entities.len());
    assert!(stats.entities_by_page[&1] >= 3);
    assert!(stats.entities_by_page[&2] >= 2);

    let by_id = |id: uuid::Uuid| extraction.entities.iter().find(|e| e.id == id).unwrap();
    for rel in &extraction.relationships {
        assert_eq!(by_id(rel.source_id).page, by_id(rel.target_id).page);
    }
    assert_eq!(
        extraction.relationship_statistics,
        RelationshipStatistics::from_relationships(&extraction.relationships)
    );
}

#[test]
fn negation_lowers_confidence_by_exactly_point_three() {
    let plain = "Acme reported revenue of about ten units across several regions overall";
    let negated = "Acme reported revenue of about ten units across several regions overall not";
    let source = EntityCandidate::new("Acme", EntityType::Company, 0.7, 1, 0, 4);
    let target = EntityCandidate::new("units", EntityType::Account, 0.7, 1, 35, 40);

    let a = relationship_confidence(plain, &source, &target, RelationshipType::HasRevenue);
    let b = relationship_confidence(negated, &source, &target, RelationshipType::HasRevenue);
    assert!((a - b - 0.3).abs() < 1e-9, "{a} vs {b}");
}

proptest! {
    #[test]
    fn entity_confidence_bounded(entity_type in types(), text in "\\PC{0,24}") {
        let c = entity_confidence(entity_type, &text);
        prop_assert!((0.0..=1.0).contains(&c));
        prop_assert!(c >= 0.7);
    }

    #[test]
    fn relationship_confidence_bounded(
        context in "[a-zA-Z0-9 $%.,]{0,160}",
        source_type in types(),
        target_type in types(),
        source_conf in 0.0f64..=1.0,
        target_conf in 0.0f64..=1.0,
        relation in prop::sample::select(RelationshipType::all().to_vec()),
    ) {
        let source = EntityCandidate::new("a", source_type, source_conf, 1, 0, 1);
        let target = EntityCandidate::new("b", target_type, target_conf, 1, 0, 1);
        let c = relationship_confidence(&context, &source, &target, relation);
        prop_assert!((0.0..=1.0).contains(&c));
    }

    #[test]
    fn extraction_positions_index_the_text(text in "[A-Za-z0-9 $%.,]{0,200}") {
        let entities = FinancialNer::new().extract(&text, 1).unwrap();
        for e in &entities {
            prop_assert_eq!(&text[e.position.start..e.position.end], e.text.as_str());
            prop_assert!((0.0..=1.0).contains(&e.confidence));
        }
        let rels = PatternRelationExtractor::new().extract(&text, &entities).unwrap();
        for r in &rels {
            prop_assert!(r.confidence >= 0.5 && r.confidence <= 1.0);
        }
    }
}
