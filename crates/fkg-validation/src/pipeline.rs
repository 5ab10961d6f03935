//! Validation pipeline
//!
//! Orchestrates the validation service and quality control per item and
//! over batches, and applies suggested corrections through the dispatch
//! table in [`crate::correction`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use fkg_core::{
    Entity, EntityType, FinancialDomain, FkgError, PropertyValue, Relationship, Result,
    ValidationConfig,
};

use crate::correction::{self, Correction, CorrectionOutcome, CorrectionStrategy};
use crate::entity_field;
use crate::quality::{QualityControl, QualityMetric, QualityMetricType, QualityReport};
use crate::service::{BatchFinding, CheckKind, ValidationReport, ValidationService};

const COMPLETENESS_THRESHOLD: f64 = 0.8;
const CONSISTENCY_THRESHOLD: f64 = 0.9;
const VALIDITY_THRESHOLD: f64 = 0.9;
const TYPE_CONSISTENCY_THRESHOLD: f64 = 1.0;

// ============================================================================
// Batch Records
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Completed,
    Failed,
}

/// An item whose validation failed outright
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemFailure {
    pub item_id: Uuid,
    pub error: String,
}

/// Counters and reports of a validation batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResult {
    pub total: usize,
    pub processed: usize,
    pub error_count: usize,
    pub warning_count: usize,
    pub success_count: usize,
    /// Items no enabled rule applies to
    pub skipped_count: usize,
    pub average_confidence: f64,
    /// Seconds
    pub processing_time: f64,
    pub status: BatchStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub reports: Vec<ValidationReport>,
    pub failures: Vec<ItemFailure>,
}

impl BatchResult {
    fn start(total: usize) -> Self {
        Self {
            total,
            processed: 0,
            error_count: 0,
            warning_count: 0,
            success_count: 0,
            skipped_count: 0,
            average_confidence: 0.0,
            processing_time: 0.0,
            status: BatchStatus::Completed,
            start_time: Utc::now(),
            end_time: None,
            reports: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn record(&mut self, item_id: Uuid, outcome: Result<ValidationReport>) {
        self.processed += 1;
        match outcome {
            Ok(report) => {
                if report.has_errors() {
                    self.error_count += 1;
                } else if report.has_warnings() {
                    self.warning_count += 1;
                } else {
                    self.success_count += 1;
                }
                self.reports.push(report);
            }
            Err(FkgError::NoApplicableRules { .. }) => self.skipped_count += 1,
            Err(e) => {
                self.error_count += 1;
                self.failures.push(ItemFailure {
                    item_id,
                    error: e.to_string(),
                });
            }
        }
    }

    fn finish(mut self, started: Instant, status: BatchStatus) -> Self {
        self.average_confidence = if self.reports.is_empty() {
            0.0
        } else {
            self.reports.iter().map(|r| r.confidence_score).sum::<f64>() / self.reports.len() as f64
        };
        self.processing_time = started.elapsed().as_secs_f64();
        self.status = status;
        self.end_time = Some(Utc::now());
        self
    }
}

/// Relationship batch: per-item counters plus batch-wide findings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipBatchResult {
    #[serde(flatten)]
    pub batch: BatchResult,
    pub cardinality_findings: Vec<BatchFinding>,
    /// Relationships whose source or target is not in the entity list
    pub unresolved: Vec<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStatus {
    Suggested,
    Applied,
    Unchanged,
    Rejected,
    Failed,
    /// Applied, then undone because another correction of the entity failed
    RolledBack,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub rule: String,
    pub field: String,
    pub action: CorrectionStrategy,
    pub description: String,
    pub status: CorrectionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityCorrectionDetail {
    pub entity_id: Uuid,
    pub corrections: Vec<CorrectionRecord>,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionBatchResult {
    pub total: usize,
    pub processed: usize,
    pub corrected_count: usize,
    pub failed_count: usize,
    /// Percentage of entities corrected
    pub success_rate: f64,
    pub details: Vec<EntityCorrectionDetail>,
    pub processing_time: f64,
    pub status: BatchStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCounts {
    pub entity_rules: usize,
    pub relationship_rules: usize,
    pub domain_rules: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub quality_report: QualityReport,
    pub rule_counts: RuleCounts,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Metric Derivation
// ============================================================================

fn field_list(results: &[&crate::service::ValidationResult]) -> PropertyValue {
    let mut fields: Vec<&str> = results
        .iter()
        .flat_map(|r| r.affected_fields.iter().map(String::as_str))
        .collect();
    fields.sort_unstable();
    fields.dedup();
    PropertyValue::from(fields)
}

fn error_ratio_metric(
    report: &ValidationReport,
    metric_type: QualityMetricType,
    checks: &[CheckKind],
    threshold: f64,
    detail_key: &str,
) -> QualityMetric {
    let matching: Vec<_> = report
        .results
        .iter()
        .filter(|r| checks.contains(&r.check))
        .collect();
    let total = report.results.len();
    let value = if total == 0 {
        1.0
    } else {
        1.0 - matching.len() as f64 / total as f64
    };
    QualityMetric::new(metric_type, value, threshold)
        .with_detail(detail_key, field_list(&matching))
        .with_detail("total_results", total)
}

/// Completeness, consistency and validity of one validated item
fn item_metrics(
    report: &ValidationReport,
    required: &[String],
    present: impl Fn(&str) -> bool,
    actual: Vec<String>,
) -> Vec<QualityMetric> {
    let missing: Vec<&str> = required
        .iter()
        .map(String::as_str)
        .filter(|f| !present(f))
        .collect();
    let completeness = if required.is_empty() {
        1.0
    } else {
        (required.len() - missing.len()) as f64 / required.len() as f64
    };

    let mut metrics = vec![
        QualityMetric::new(QualityMetricType::Completeness, completeness, COMPLETENESS_THRESHOLD)
            .with_detail("required_properties", required.to_vec())
            .with_detail("actual_properties", actual)
            .with_detail("missing_properties", missing),
        error_ratio_metric(
            report,
            QualityMetricType::Consistency,
            &[CheckKind::Pattern],
            CONSISTENCY_THRESHOLD,
            "inconsistent_fields",
        ),
        error_ratio_metric(
            report,
            QualityMetricType::Validity,
            &[CheckKind::Range, CheckKind::Conversion],
            VALIDITY_THRESHOLD,
            "invalid_values",
        ),
    ];

    for metric in &mut metrics {
        metric.confidence_score = report.confidence_score;
        if metric.is_below_threshold() {
            if let Some(id) = report.entity_id {
                metric.affected_entities.push(id);
            }
            if let Some(id) = report.relationship_id {
                metric.affected_relationships.push(id);
            }
        }
    }
    metrics
}

fn entity_metrics(entity: &Entity, report: &ValidationReport, required: &[String]) -> Vec<QualityMetric> {
    item_metrics(
        report,
        required,
        |field| entity_field(entity, field).is_some(),
        entity.properties.keys().cloned().collect(),
    )
}

// ============================================================================
// Validation Pipeline
// ============================================================================

/// Runs validation and quality control per item and in batches
#[derive(Debug, Clone)]
pub struct ValidationPipeline {
    service: Arc<ValidationService>,
    quality: Arc<QualityControl>,
    config: ValidationConfig,
}

impl ValidationPipeline {
    pub fn new(
        service: Arc<ValidationService>,
        quality: Arc<QualityControl>,
        config: ValidationConfig,
    ) -> Self {
        Self {
            service,
            quality,
            config,
        }
    }

    pub fn service(&self) -> &Arc<ValidationService> {
        &self.service
    }

    pub fn quality(&self) -> &Arc<QualityControl> {
        &self.quality
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Per item
    // ------------------------------------------------------------------------

    /// Validate an entity and derive its quality metrics
    pub fn validate_entity_pipeline(
        &self,
        entity: &Entity,
        update_quality: bool,
    ) -> Result<(ValidationReport, Vec<QualityMetric>)> {
        let report = self.service.validate_entity(entity)?;
        let required = self.service.required_entity_fields(entity);
        let metrics = entity_metrics(entity, &report, &required);
        if update_quality {
            self.quality
                .update_quality_metrics(&metrics, Some(entity.entity_type));
        }
        Ok((report, metrics))
    }

    /// Validate an entity against a financial domain and derive its metrics
    pub fn validate_financial_entity_pipeline(
        &self,
        entity: &Entity,
        domain: FinancialDomain,
        update_quality: bool,
    ) -> Result<(ValidationReport, Vec<QualityMetric>)> {
        let report = self.service.validate_financial_entity(entity, domain)?;
        let mut required: Vec<String> = self
            .service
            .registry()
            .domain_rules_for(domain, entity.entity_type)
            .into_iter()
            .flat_map(|rule| rule.required_fields)
            .collect();
        required.sort();
        required.dedup();
        let metrics = entity_metrics(entity, &report, &required);
        if update_quality {
            self.quality
                .update_quality_metrics(&metrics, Some(entity.entity_type));
        }
        Ok((report, metrics))
    }

    /// Validate a relationship; with both endpoints, also score whether
    /// their types match the rules of the relationship type
    pub fn validate_relationship_pipeline(
        &self,
        relationship: &Relationship,
        source: Option<&Entity>,
        target: Option<&Entity>,
        update_quality: bool,
    ) -> Result<(ValidationReport, Vec<QualityMetric>)> {
        let report = self.service.validate_relationship(relationship)?;
        let rules = self
            .service
            .registry()
            .relationship_rules_for(relationship.relationship_type);

        let mut required: Vec<String> = rules
            .iter()
            .flat_map(|rule| rule.required_properties.iter().cloned())
            .collect();
        required.sort();
        required.dedup();

        let mut metrics = item_metrics(
            &report,
            &required,
            |field| {
                relationship
                    .property(field)
                    .is_some_and(|value| !value.is_null())
            },
            relationship.properties.keys().cloned().collect(),
        );
        // Only completeness and consistency apply to relationships
        metrics.truncate(2);

        if let (Some(source), Some(target)) = (source, target) {
            let type_errors: usize = rules
                .iter()
                .map(|rule| {
                    usize::from(rule.source_entity_type != source.entity_type)
                        + usize::from(rule.target_entity_type != target.entity_type)
                })
                .sum();
            let value = (1.0 - type_errors as f64 / 2.0).max(0.0);
            let mut metric =
                QualityMetric::new(QualityMetricType::Validity, value, TYPE_CONSISTENCY_THRESHOLD)
                    .with_detail("source_type", source.entity_type.as_str())
                    .with_detail("target_type", target.entity_type.as_str())
                    .with_detail("type_errors", type_errors);
            if metric.is_below_threshold() {
                metric.affected_relationships.push(relationship.id);
                metric.affected_entities.extend([source.id, target.id]);
            }
            metrics.push(metric);
        }

        if update_quality {
            self.quality.update_quality_metrics(&metrics, None);
        }
        Ok((report, metrics))
    }

    /// Run one correction through the dispatch table. Failures are logged
    /// and reported in the returned status, never propagated.
    pub fn apply_correction(
        &self,
        entity: &mut Entity,
        correction: &Correction,
    ) -> (CorrectionStatus, Option<String>) {
        match correction::apply(entity, correction) {
            Ok(CorrectionOutcome::Applied) => (CorrectionStatus::Applied, None),
            Ok(CorrectionOutcome::Unchanged) => (CorrectionStatus::Unchanged, None),
            Ok(CorrectionOutcome::Rejected { reason }) => (CorrectionStatus::Rejected, Some(reason)),
            Err(e) => {
                warn!(
                    entity_id = %entity.id,
                    strategy = %correction.strategy,
                    error = %e,
                    "Correction failed"
                );
                (CorrectionStatus::Failed, Some(e.to_string()))
            }
        }
    }

    /// Quality report for an entity type combined with rule counts
    pub fn get_validation_summary(&self, entity_type: Option<EntityType>) -> ValidationSummary {
        let catalog = self.service.get_validation_rules();
        ValidationSummary {
            quality_report: self.quality.get_quality_report(entity_type),
            rule_counts: RuleCounts {
                entity_rules: catalog.entity_rules.len(),
                relationship_rules: catalog.relationship_rules.len(),
                domain_rules: catalog.domain_rules.len(),
                total: catalog.total(),
            },
            timestamp: Utc::now(),
        }
    }

    // ------------------------------------------------------------------------
    // Batches
    // ------------------------------------------------------------------------

    /// Validate entities in chunks of `batch_size`.
    ///
    /// With a domain, entities are checked against that domain's rules.
    pub fn validate_entity_batch(
        &self,
        entities: &[Entity],
        domain: Option<FinancialDomain>,
        update_quality: bool,
        batch_size: usize,
    ) -> BatchResult {
        let started = Instant::now();
        let mut result = BatchResult::start(entities.len());
        if batch_size == 0 {
            warn!("Entity batch rejected: batch size is zero");
            return result.finish(started, BatchStatus::Failed);
        }

        for (index, chunk) in entities.chunks(batch_size).enumerate() {
            for entity in chunk {
                let outcome = match domain {
                    Some(domain) => self.validate_financial_entity_pipeline(entity, domain, update_quality),
                    None => self.validate_entity_pipeline(entity, update_quality),
                };
                result.record(entity.id, outcome.map(|(report, _)| report));
            }
            debug!(
                chunk = index,
                processed = result.processed,
                total = result.total,
                "Entity batch chunk validated"
            );
        }

        let result = result.finish(started, BatchStatus::Completed);
        info!(
            total = result.total,
            errors = result.error_count,
            warnings = result.warning_count,
            skipped = result.skipped_count,
            processing_time = result.processing_time,
            "Entity batch validated"
        );
        result
    }

    /// Apply or suggest the corrections attached to validation reports.
    ///
    /// Reports are matched to entities by id. Corrections of one entity are
    /// all-or-nothing: if any fails or is rejected the entity is left as it
    /// was and its applied corrections are marked rolled back.
    pub fn correct_entity_batch(
        &self,
        entities: &mut [Entity],
        reports: &[ValidationReport],
        auto_apply: bool,
        batch_size: usize,
    ) -> CorrectionBatchResult {
        let started = Instant::now();
        let start_time = Utc::now();
        let by_entity: HashMap<Uuid, &ValidationReport> = reports
            .iter()
            .filter_map(|r| r.entity_id.map(|id| (id, r)))
            .collect();

        let mut result = CorrectionBatchResult {
            total: entities.len(),
            processed: 0,
            corrected_count: 0,
            failed_count: 0,
            success_rate: 0.0,
            details: Vec::new(),
            processing_time: 0.0,
            status: BatchStatus::Completed,
            start_time,
            end_time: start_time,
        };

        if batch_size == 0 {
            warn!("Correction batch rejected: batch size is zero");
            result.status = BatchStatus::Failed;
        } else {
            for (index, chunk) in entities.chunks_mut(batch_size).enumerate() {
                for entity in chunk {
                    result.processed += 1;
                    let Some(report) = by_entity.get(&entity.id) else {
                        continue;
                    };
                    let detail = self.correct_entity(entity, report, auto_apply);
                    if !detail.success {
                        result.failed_count += 1;
                    } else if !detail.corrections.is_empty() {
                        result.corrected_count += 1;
                    }
                    result.details.push(detail);
                }
                debug!(chunk = index, processed = result.processed, "Correction batch chunk processed");
            }
        }

        if result.total > 0 {
            result.success_rate = result.corrected_count as f64 / result.total as f64 * 100.0;
        }
        result.processing_time = started.elapsed().as_secs_f64();
        result.end_time = Utc::now();
        info!(
            total = result.total,
            corrected = result.corrected_count,
            failed = result.failed_count,
            auto_apply,
            "Correction batch finished"
        );
        result
    }

    fn correct_entity(
        &self,
        entity: &mut Entity,
        report: &ValidationReport,
        auto_apply: bool,
    ) -> EntityCorrectionDetail {
        let suggestions = report.results.iter().flat_map(|r| {
            r.suggested_corrections
                .iter()
                .map(move |s| (r.rule_name.as_str(), s))
        });

        let mut working = entity.clone();
        let mut corrections = Vec::new();
        for (rule, suggestion) in suggestions {
            let (status, error) = if auto_apply {
                self.apply_correction(&mut working, &suggestion.to_correction())
            } else {
                (CorrectionStatus::Suggested, None)
            };
            corrections.push(CorrectionRecord {
                rule: rule.to_string(),
                field: suggestion.field.clone(),
                action: suggestion.action,
                description: suggestion.description.clone(),
                status,
                error,
            });
        }

        let success = corrections
            .iter()
            .all(|c| !matches!(c.status, CorrectionStatus::Failed | CorrectionStatus::Rejected));
        if success {
            if auto_apply {
                *entity = working;
            }
        } else {
            for record in &mut corrections {
                if record.status == CorrectionStatus::Applied {
                    record.status = CorrectionStatus::RolledBack;
                }
            }
        }

        EntityCorrectionDetail {
            entity_id: entity.id,
            corrections,
            success,
        }
    }

    /// Validate relationships, resolving endpoints from `entities`, and
    /// check cardinality over the whole batch
    pub fn validate_relationship_batch(
        &self,
        relationships: &[Relationship],
        entities: &[Entity],
    ) -> RelationshipBatchResult {
        let started = Instant::now();
        let by_id: HashMap<Uuid, &Entity> = entities.iter().map(|e| (e.id, e)).collect();
        let mut batch = BatchResult::start(relationships.len());
        let mut unresolved = Vec::new();

        if self.config.batch_size == 0 {
            warn!("Relationship batch rejected: batch size is zero");
            return RelationshipBatchResult {
                batch: batch.finish(started, BatchStatus::Failed),
                cardinality_findings: Vec::new(),
                unresolved,
            };
        }

        for chunk in relationships.chunks(self.config.batch_size) {
            for rel in chunk {
                let source = by_id.get(&rel.source_id).copied();
                let target = by_id.get(&rel.target_id).copied();
                if source.is_none() || target.is_none() {
                    unresolved.push(rel.id);
                }
                let outcome = self
                    .validate_relationship_pipeline(rel, source, target, true)
                    .map(|(report, _)| report);
                batch.record(rel.id, outcome);
            }
        }

        let cardinality_findings = self.service.check_relationship_cardinality(relationships);
        let batch = batch.finish(started, BatchStatus::Completed);
        info!(
            total = batch.total,
            errors = batch.error_count,
            cardinality_findings = cardinality_findings.len(),
            unresolved = unresolved.len(),
            "Relationship batch validated"
        );
        RelationshipBatchResult {
            batch,
            cardinality_findings,
            unresolved,
        }
    }

    /// Keep the first entity of each key tuple. Entities with none of the
    /// key fields are always kept.
    pub fn deduplicate_entities(&self, entities: Vec<Entity>, key_fields: &[&str]) -> Vec<Entity> {
        let before = entities.len();
        let mut seen = HashSet::new();
        let kept: Vec<Entity> = entities
            .into_iter()
            .filter(|entity| {
                let key: Vec<Option<String>> = key_fields
                    .iter()
                    .map(|field| entity_field(entity, field).map(|v| v.to_text()))
                    .collect();
                key.iter().all(Option::is_none) || seen.insert((entity.entity_type, key))
            })
            .collect();
        debug!(before, after = kept.len(), "Entities deduplicated");
        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::CorrectionParams;
    use crate::rules::RuleLevel;
    use crate::service::CorrectionSuggestion;
    use fkg_core::RelationshipType;

    fn pipeline() -> ValidationPipeline {
        ValidationPipeline::new(
            Arc::new(ValidationService::with_default_rules()),
            Arc::new(QualityControl::default()),
            ValidationConfig::default(),
        )
    }

    fn company(name: &str) -> Entity {
        Entity::new(EntityType::Company, name)
            .with_property("ticker", "ACME")
            .with_property("industry", "Manufacturing")
            .with_property("founding_date", "1999-01-01")
            .with_property("revenue", 1_000_000.0)
            .with_property("market_cap", 5_000_000.0)
            .with_property("employees", 250.0)
    }

    #[test]
    fn test_metrics_for_clean_entity() {
        let p = pipeline();
        let (report, metrics) = p.validate_entity_pipeline(&company("Acme Corp"), true).unwrap();
        assert_eq!(report.overall_status, RuleLevel::Info);
        assert_eq!(metrics.len(), 3);
        assert!(metrics.iter().all(|m| m.value == 1.0));
        assert_eq!(p.quality().calculate_quality_score(Some(EntityType::Company)), 1.0);
    }

    #[test]
    fn test_completeness_counts_missing_fields() {
        let p = pipeline();
        let mut entity = company("Acme Corp");
        entity.properties.remove("industry");
        let (_, metrics) = p.validate_entity_pipeline(&entity, false).unwrap();

        let completeness = &metrics[0];
        assert_eq!(completeness.metric_type, QualityMetricType::Completeness);
        assert!(completeness.value < 1.0);
        assert_eq!(completeness.affected_entities, vec![entity.id]);
        assert_eq!(
            completeness.details["missing_properties"],
            PropertyValue::from(vec!["industry"])
        );
        assert!(p.quality().current_metrics(None).is_empty());
    }

    #[test]
    fn test_relationship_type_consistency() {
        let p = pipeline();
        let person = Entity::new(EntityType::Person, "Jane Doe");
        let company = company("Acme Corp");
        let rel = Relationship::new(RelationshipType::Employment, company.id, person.id)
            .with_property("start_date", "2020-01-01")
            .with_property("role", "CFO");

        let (_, metrics) = p
            .validate_relationship_pipeline(&rel, Some(&company), Some(&person), false)
            .unwrap();
        let validity = metrics
            .iter()
            .find(|m| m.metric_type == QualityMetricType::Validity)
            .unwrap();
        assert_eq!(validity.value, 1.0);

        let (_, metrics) = p
            .validate_relationship_pipeline(&rel, Some(&person), Some(&company), false)
            .unwrap();
        let validity = metrics
            .iter()
            .find(|m| m.metric_type == QualityMetricType::Validity)
            .unwrap();
        assert_eq!(validity.value, 0.0);
        assert_eq!(validity.affected_relationships, vec![rel.id]);
    }

    #[test]
    fn test_zero_batch_size_fails() {
        let p = pipeline();
        let result = p.validate_entity_batch(&[company("Acme Corp")], None, false, 0);
        assert_eq!(result.status, BatchStatus::Failed);
        assert_eq!(result.processed, 0);
    }

    #[test]
    fn test_batch_counts() {
        let p = pipeline();
        let mut broken = company("Broken Inc");
        broken.properties.remove("industry");
        let entities = vec![
            company("Acme Corp"),
            broken,
            Entity::new(EntityType::Date, "2023"),
        ];
        let result = p.validate_entity_batch(&entities, None, false, 2);
        assert_eq!(result.status, BatchStatus::Completed);
        assert_eq!(result.processed, 3);
        assert_eq!(result.success_count, 1);
        assert_eq!(result.error_count, 1);
        assert_eq!(result.skipped_count, 1);
        assert_eq!(result.reports.len(), 2);
    }

    #[test]
    fn test_suggest_only_leaves_entities_untouched() {
        let p = pipeline();
        let mut entity = company("Acme Corp");
        entity.properties.remove("industry");
        let report = p.service().validate_entity(&entity).unwrap();
        let before = entity.clone();

        let mut entities = vec![entity];
        let result = p.correct_entity_batch(&mut entities, &[report], false, 10);
        assert_eq!(entities[0], before);
        assert_eq!(result.details.len(), 1);
        assert!(result.details[0]
            .corrections
            .iter()
            .all(|c| c.status == CorrectionStatus::Suggested));
        assert_eq!(result.success_rate, 100.0);
    }

    #[test]
    fn test_auto_apply_adds_missing_field() {
        let p = pipeline();
        let mut entity = company("Acme Corp");
        entity.properties.remove("industry");
        let report = p.service().validate_entity(&entity).unwrap();

        let mut entities = vec![entity];
        let result = p.correct_entity_batch(&mut entities, &[report], true, 10);
        assert!(result.details[0].success);
        assert_eq!(result.details[0].corrections[0].status, CorrectionStatus::Applied);
        assert!(entities[0].properties.contains_key("industry"));
    }

    #[test]
    fn test_failed_correction_rolls_back_entity() {
        let p = pipeline();
        let mut entity = company("Acme Corp");
        entity.properties.remove("industry");
        let mut report = p.service().validate_entity(&entity).unwrap();
        // A second suggestion that cannot be applied
        let mut broken = report.results[0].clone();
        broken.suggested_corrections[0] =
            CorrectionSuggestion::new("ticker", CorrectionStrategy::Format, "Format ticker")
                .with_params(CorrectionParams {
                    format: Some("bogus".into()),
                    ..Default::default()
                });
        report.results.push(broken);
        let before = entity.clone();

        let mut entities = vec![entity];
        let result = p.correct_entity_batch(&mut entities, &[report], true, 10);
        assert_eq!(entities[0], before);
        assert_eq!(result.failed_count, 1);
        let statuses: Vec<_> = result.details[0].corrections.iter().map(|c| c.status).collect();
        assert_eq!(statuses, vec![CorrectionStatus::RolledBack, CorrectionStatus::Failed]);
    }

    #[test]
    fn test_auto_apply_survives_pattern_mismatch() {
        let p = pipeline();
        let mut entity = company("Acme Corp").with_property("ticker", "toolong");
        entity.properties.remove("industry");
        let report = p.service().validate_entity(&entity).unwrap();
        assert_eq!(report.results_of(CheckKind::Pattern).count(), 1);

        let mut entities = vec![entity];
        let result = p.correct_entity_batch(&mut entities, &[report], true, 10);
        assert_eq!(result.failed_count, 0);
        assert_eq!(result.corrected_count, 1);
        let statuses: Vec<_> = result.details[0]
            .corrections
            .iter()
            .map(|c| (c.action, c.status))
            .collect();
        assert!(statuses.contains(&(CorrectionStrategy::Add, CorrectionStatus::Applied)));
        assert!(statuses.contains(&(CorrectionStrategy::Format, CorrectionStatus::Unchanged)));
        assert!(entities[0].properties.contains_key("industry"));
    }

    #[test]
    fn test_auto_apply_keeps_reversed_dates() {
        let p = pipeline();
        let person = Entity::new(EntityType::Person, "Jane Doe")
            .with_property("role", "CFO")
            .with_property("birth_date", "2000-01-01")
            .with_property("death_date", "1990-01-01");
        let report = p.service().validate_entity(&person).unwrap();

        let mut entities = vec![person.clone()];
        let result = p.correct_entity_batch(&mut entities, &[report], true, 10);
        assert_eq!(result.failed_count, 0);
        assert!(result.details[0].success);
        assert_eq!(entities[0], person);
    }

    #[test]
    fn test_relationship_batch_cardinality() {
        let p = pipeline();
        let acme = company("Acme Corp");
        let jane = Entity::new(EntityType::Person, "Jane Doe");
        let globex = company("Globex");
        let rels = vec![
            Relationship::new(RelationshipType::Employment, acme.id, jane.id)
                .with_property("start_date", "2020-01-01")
                .with_property("role", "CFO"),
            Relationship::new(RelationshipType::Employment, globex.id, jane.id)
                .with_property("start_date", "2021-01-01")
                .with_property("role", "Director"),
        ];
        let entities = vec![acme, jane, globex];
        let result = p.validate_relationship_batch(&rels, &entities);
        assert_eq!(result.batch.processed, 2);
        assert_eq!(result.batch.success_count, 2);
        assert!(result.unresolved.is_empty());
        assert_eq!(result.cardinality_findings.len(), 1);
        // Both employments share the same person
        assert_eq!(result.cardinality_findings[0].item_id, entities[1].id);
    }

    #[test]
    fn test_deduplicate_keeps_first() {
        let p = pipeline();
        let first = company("Acme Corp");
        let second = company("Acme Corp").with_property("employees", 300.0);
        let other = company("Globex");
        let kept = p.deduplicate_entities(
            vec![first.clone(), second, other.clone()],
            &["name", "ticker"],
        );
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].id, first.id);
        assert_eq!(kept[1].id, other.id);
    }

    #[test]
    fn test_summary_counts_rules() {
        let summary = pipeline().get_validation_summary(None);
        assert_eq!(summary.rule_counts.entity_rules, 4);
        assert_eq!(summary.rule_counts.relationship_rules, 3);
        assert_eq!(summary.rule_counts.domain_rules, 15);
        assert_eq!(summary.rule_counts.total, 22);
    }
}
