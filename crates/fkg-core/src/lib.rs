//! FKG Core - Domain models, traits, and shared types
//!
//! This crate defines the core abstractions used throughout the FKG system:
//! - Entity and relationship vocabularies (types, relationship catalog, domains)
//! - Typed property bags
//! - Graph models handed to the persistence collaborator
//! - Common error types
//! - Collaborator traits (text extraction)
//! - Configuration management

pub mod config;
pub mod types;
pub mod value;

pub use config::{
    AppConfig, ConfigError, ExtractionConfig, GraphConfig, LoggingConfig, QualityConfig,
    ValidationConfig,
};
pub use types::{EntityType, FinancialDomain, RelationshipGroup, RelationshipType};
pub use value::{flatten_properties, PropertyMap, PropertyValue, ValueKind};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for FKG operations
#[derive(Error, Debug)]
pub enum FkgError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("No validation rules apply to {subject}")]
    NoApplicableRules { subject: String },

    #[error("Invalid financial domain: {0}")]
    InvalidDomain(String),

    #[error("Extraction error: {0}")]
    ExtractionError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<ConfigError> for FkgError {
    fn from(err: ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FkgError>;

// ============================================================================
// Knowledge Graph Models
// ============================================================================

fn default_confidence() -> f64 {
    1.0
}

/// An entity in the knowledge graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Entity type
    #[serde(rename = "type")]
    pub entity_type: EntityType,

    /// Name or label
    #[serde(default)]
    pub name: String,

    /// Property values checked by validation rules
    #[serde(default)]
    pub properties: PropertyMap,

    /// Recognition confidence (0.0 - 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    /// Source document ID
    #[serde(default)]
    pub source_document: Option<String>,

    /// Additional metadata
    #[serde(default)]
    pub metadata: PropertyMap,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Create a new entity
    pub fn new(entity_type: EntityType, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            entity_type,
            name: name.into(),
            properties: PropertyMap::new(),
            confidence: 1.0,
            source_document: None,
            metadata: PropertyMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a property value
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Add a metadata value
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_source_document(mut self, document: impl Into<String>) -> Self {
        self.source_document = Some(document.into());
        self
    }

    /// Look up a property
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

/// A typed, directed relationship between two entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Relationship type
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,

    /// Source entity ID
    pub source_id: Uuid,

    /// Target entity ID
    pub target_id: Uuid,

    #[serde(default)]
    pub properties: PropertyMap,

    /// Extraction confidence (0.0 - 1.0)
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub source_document: Option<String>,

    #[serde(default)]
    pub metadata: PropertyMap,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(relationship_type: RelationshipType, source_id: Uuid, target_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            relationship_type,
            source_id,
            target_id,
            properties: PropertyMap::new(),
            confidence: 1.0,
            source_document: None,
            metadata: PropertyMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }
}

// ============================================================================
// Document Text
// ============================================================================

/// Byte range of one page inside [`DocumentText::text`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpan {
    pub page: u32,
    pub start: usize,
    pub end: usize,
}

/// Plain text of a document plus its page index
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentText {
    pub text: String,
    pub pages: Vec<PageSpan>,
}

impl DocumentText {
    /// Split text on a page separator, numbering pages from 1
    pub fn from_pages(text: impl Into<String>, separator: char) -> Self {
        let text = text.into();
        let mut pages = Vec::new();
        let mut start = 0;
        for (page, chunk) in text.split(separator).enumerate() {
            let end = start + chunk.len();
            pages.push(PageSpan {
                page: page as u32 + 1,
                start,
                end,
            });
            start = end + separator.len_utf8();
        }
        Self { text, pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Iterate `(page number, page text)`
    pub fn pages(&self) -> impl Iterator<Item = (u32, &str)> {
        self.pages
            .iter()
            .filter_map(|span| self.text.get(span.start..span.end).map(|t| (span.page, t)))
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for the text extraction collaborator (PDF, OCR, plain text)
#[async_trait::async_trait]
pub trait TextExtractor: Send + Sync {
    /// Extract UTF-8 text and the page index of a document
    async fn extract_text(&self, path: &Path) -> Result<DocumentText>;

    /// Extractor name for logging
    fn name(&self) -> &str;
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_builder() {
        let entity = Entity::new(EntityType::Company, "XYZ Corp")
            .with_property("name", "XYZ Corp")
            .with_property("employees", 250_i64)
            .with_source_document("annual-report-2023");

        assert_eq!(entity.entity_type, EntityType::Company);
        assert_eq!(entity.property("employees").and_then(PropertyValue::as_f64), Some(250.0));
        assert_eq!(entity.source_document.as_deref(), Some("annual-report-2023"));
    }

    #[test]
    fn test_entity_json_defaults() {
        let entity: Entity = serde_json::from_str(
            r#"{"type": "Person", "name": "Jane Doe", "properties": {"role": "CFO"}}"#,
        )
        .unwrap();
        assert_eq!(entity.entity_type, EntityType::Person);
        assert_eq!(entity.confidence, 1.0);
        assert!(entity.metadata.is_empty());
    }

    #[test]
    fn test_relationship_json_uses_machine_name() {
        let rel = Relationship::new(RelationshipType::HasRevenue, Uuid::new_v4(), Uuid::new_v4());
        let json = serde_json::to_value(&rel).unwrap();
        assert_eq!(json["type"], "HAS_REVENUE");
    }

    #[test]
    fn test_document_text_pages() {
        let doc = DocumentText::from_pages("page one\x0cpage two\x0c", '\x0c');
        let pages: Vec<_> = doc.pages().collect();
        assert_eq!(doc.page_count(), 3);
        assert_eq!(pages[0], (1, "page one"));
        assert_eq!(pages[1], (2, "page two"));
        assert_eq!(pages[2], (3, ""));
    }

    struct FixedText(&'static str);

    #[async_trait::async_trait]
    impl TextExtractor for FixedText {
        async fn extract_text(&self, path: &Path) -> Result<DocumentText> {
            if path.as_os_str().is_empty() {
                return Err(FkgError::ExtractionError("empty path".to_string()));
            }
            Ok(DocumentText::from_pages(self.0, '\x0c'))
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_text_extractor_object() {
        let extractor: Box<dyn TextExtractor> = Box::new(FixedText("a\x0cb"));
        let doc = extractor.extract_text(Path::new("filing.txt")).await.unwrap();
        assert_eq!(doc.page_count(), 2);
        assert!(matches!(
            extractor.extract_text(Path::new("")).await,
            Err(FkgError::ExtractionError(_))
        ));
    }

    #[test]
    fn test_config_error_converts() {
        let err: FkgError = ConfigError::MissingRequired("rules".to_string()).into();
        assert!(matches!(err, FkgError::ConfigError(_)));
    }
}
