//! FKG Validation - Rule-driven validation and data quality
//!
//! Entities and relationships produced by extraction are checked against a
//! registry of declarative rules. Findings feed a quality-control service
//! that keeps weighted metric history, and a correction dispatch table can
//! repair entities from the suggestions attached to each finding.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fkg_validation::{QualityControl, ValidationPipeline, ValidationService};
//!
//! let pipeline = ValidationPipeline::new(
//!     Arc::new(ValidationService::with_default_rules()),
//!     Arc::new(QualityControl::default()),
//!     Default::default(),
//! );
//! let (report, metrics) = pipeline.validate_entity_pipeline(&entity, true)?;
//! ```

pub mod catalog;
pub mod correction;
pub mod pipeline;
pub mod quality;
pub mod rules;
pub mod service;

pub use correction::{
    Correction, CorrectionError, CorrectionOutcome, CorrectionParams, CorrectionStrategy,
};
pub use pipeline::{
    BatchResult, BatchStatus, CorrectionBatchResult, CorrectionRecord, CorrectionStatus,
    EntityCorrectionDetail, RelationshipBatchResult, ValidationPipeline, ValidationSummary,
};
pub use quality::{
    weighted_score, QualityControl, QualityMetric, QualityMetricType, QualityReport,
};
pub use rules::{
    EntityRule, FinancialDomainRule, RelationshipRule, RuleCatalog, RuleLevel, RuleRegistry,
    ValidationRule,
};
pub use service::{
    BatchFinding, CheckKind, CorrectionSuggestion, RelationshipTypeInfo, ValidationReport,
    ValidationResult, ValidationService,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use fkg_core::{Entity, PropertyValue};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Value of a field on an entity, treating Null as absent.
///
/// A non-empty entity name answers for the `name` field.
pub fn entity_field(entity: &Entity, field: &str) -> Option<PropertyValue> {
    match entity.properties.get(field) {
        Some(value) if !value.is_null() => Some(value.clone()),
        _ if field == "name" && !entity.name.trim().is_empty() => {
            Some(PropertyValue::String(entity.name.clone()))
        }
        _ => None,
    }
}

/// Parse a date from a string property
pub fn parse_date(value: &PropertyValue) -> Option<NaiveDate> {
    let text = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use fkg_core::EntityType;

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 31);
        for text in ["2024-03-31", "2024/03/31", "2024-03-31T10:00:00", "2024-03-31T10:00:00Z"] {
            assert_eq!(parse_date(&PropertyValue::from(text)), expected, "{text}");
        }
        assert_eq!(parse_date(&PropertyValue::from("Q1 2024")), None);
        assert_eq!(parse_date(&PropertyValue::Number(2024.0)), None);
    }

    #[test]
    fn test_entity_name_answers_for_name_field() {
        let entity = Entity::new(EntityType::Company, "Acme Corp");
        assert_eq!(entity_field(&entity, "name"), Some(PropertyValue::from("Acme Corp")));

        let unnamed = Entity::new(EntityType::Company, "  ").with_property("ticker", PropertyValue::Null);
        assert_eq!(entity_field(&unnamed, "name"), None);
        assert_eq!(entity_field(&unnamed, "ticker"), None);
    }
}
