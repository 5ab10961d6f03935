//! Validation service: evaluates registered rules against entities and
//! relationships and reports per-rule results.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use fkg_core::{
    Entity, FinancialDomain, FkgError, PropertyMap, PropertyValue, Relationship, RelationshipGroup,
    RelationshipType, Result, ValueKind,
};

use crate::correction::{Correction, CorrectionParams, CorrectionStrategy};
use crate::parse_date;
use crate::rules::{
    FieldPattern, FieldRange, FinancialConstraints, RegulatoryCompliance, Requirement,
    RuleCatalog, RuleLevel, RuleRegistry, TemporalValidity, ValidationRule,
};

// ============================================================================
// Results and Reports
// ============================================================================

/// Check that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckKind {
    Required,
    Pattern,
    Range,
    Conversion,
    Metric,
    Document,
    Temporal,
    Compliance,
    RiskFactor,
    Cardinality,
    Uniqueness,
}

/// A correction proposed by a failed check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionSuggestion {
    pub field: String,
    pub action: CorrectionStrategy,
    pub description: String,
    #[serde(default)]
    pub parameters: CorrectionParams,
}

impl CorrectionSuggestion {
    pub fn new(
        field: impl Into<String>,
        action: CorrectionStrategy,
        description: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            action,
            description: description.into(),
            parameters: CorrectionParams::default(),
        }
    }

    pub fn with_params(mut self, parameters: CorrectionParams) -> Self {
        self.parameters = parameters;
        self
    }

    /// The correction the dispatch table would apply for this suggestion
    pub fn to_correction(&self) -> Correction {
        Correction::new(self.action)
            .with_field(self.field.clone())
            .with_params(self.parameters.clone())
    }
}

/// Outcome of one check of one rule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub rule_name: String,
    pub level: RuleLevel,
    pub message: String,
    pub check: CheckKind,
    pub affected_fields: Vec<String>,
    pub suggested_corrections: Vec<CorrectionSuggestion>,
    pub confidence_score: f64,
    pub timestamp: DateTime<Utc>,
}

/// Worst level among results; `Info` when there are none
pub fn overall_status(results: &[ValidationResult]) -> RuleLevel {
    results
        .iter()
        .map(|r| r.level)
        .max()
        .unwrap_or(RuleLevel::Info)
}

/// `1 - (errors * 0.7 + warnings * 0.3) / total`, or 1.0 without results
pub fn report_confidence(results: &[ValidationResult]) -> f64 {
    if results.is_empty() {
        return 1.0;
    }
    let errors = results.iter().filter(|r| r.level == RuleLevel::Error).count() as f64;
    let warnings = results.iter().filter(|r| r.level == RuleLevel::Warning).count() as f64;
    1.0 - (errors * 0.7 + warnings * 0.3) / results.len() as f64
}

/// All results for one validated item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship_id: Option<Uuid>,
    /// Entity or relationship type that selected the rules
    pub subject: String,
    pub rules_applied: Vec<String>,
    pub results: Vec<ValidationResult>,
    pub overall_status: RuleLevel,
    pub confidence_score: f64,
    pub duration_ms: f64,
    pub timestamp: DateTime<Utc>,
}

impl ValidationReport {
    fn new(subject: String, rules_applied: Vec<String>, results: Vec<ValidationResult>, started: Instant) -> Self {
        Self {
            entity_id: None,
            relationship_id: None,
            subject,
            rules_applied,
            overall_status: overall_status(&results),
            confidence_score: report_confidence(&results),
            results,
            duration_ms: started.elapsed().as_secs_f64() * 1000.0,
            timestamp: Utc::now(),
        }
    }

    pub fn count(&self, level: RuleLevel) -> usize {
        self.results.iter().filter(|r| r.level == level).count()
    }

    pub fn error_count(&self) -> usize {
        self.count(RuleLevel::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(RuleLevel::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.overall_status == RuleLevel::Error
    }

    pub fn has_warnings(&self) -> bool {
        self.warning_count() > 0
    }

    /// Results produced by one kind of check
    pub fn results_of(&self, check: CheckKind) -> impl Iterator<Item = &ValidationResult> {
        self.results.iter().filter(move |r| r.check == check)
    }
}

/// A result raised over a whole batch, attributed to one item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFinding {
    pub item_id: Uuid,
    pub result: ValidationResult,
}

// ============================================================================
// Rule Evaluation
// ============================================================================

/// Collects results for one rule over one property bag
struct Checker<'a> {
    rule_name: &'a str,
    fields: &'a PropertyMap,
    results: &'a mut Vec<ValidationResult>,
}

impl<'a> Checker<'a> {
    fn present(&self, field: &str) -> Option<&'a PropertyValue> {
        self.fields.get(field).filter(|v| !v.is_null())
    }

    fn push(
        &mut self,
        level: RuleLevel,
        check: CheckKind,
        message: String,
        affected: &[&str],
        suggestion: CorrectionSuggestion,
    ) {
        self.results.push(ValidationResult {
            rule_name: self.rule_name.to_string(),
            level,
            message,
            check,
            affected_fields: affected.iter().map(|f| f.to_string()).collect(),
            suggested_corrections: vec![suggestion],
            confidence_score: 1.0,
            timestamp: Utc::now(),
        });
    }

    fn required(&mut self, fields: &[String]) {
        for field in fields {
            if self.present(field).is_none() {
                self.push(
                    RuleLevel::Error,
                    CheckKind::Required,
                    format!("Missing required field: {field}"),
                    &[field.as_str()],
                    CorrectionSuggestion::new(
                        field.as_str(),
                        CorrectionStrategy::Add,
                        format!("Add required field {field}"),
                    ),
                );
            }
        }
    }

    fn patterns(&mut self, patterns: &[FieldPattern]) {
        for pattern in patterns {
            let Some(value) = self.present(&pattern.field) else {
                continue;
            };
            let field = pattern.field.as_str();
            match pattern.matches(&value.to_text()) {
                Some(true) => {}
                Some(false) => self.push(
                    RuleLevel::Error,
                    CheckKind::Pattern,
                    format!("Invalid format for field {field}"),
                    &[field],
                    CorrectionSuggestion::new(
                        field,
                        CorrectionStrategy::Format,
                        format!("Format {field} according to pattern: {}", pattern.pattern),
                    )
                    .with_params(CorrectionParams {
                        pattern: Some(pattern.pattern.clone()),
                        ..Default::default()
                    }),
                ),
                None => self.push(
                    RuleLevel::Error,
                    CheckKind::Pattern,
                    format!("Rule pattern for {field} does not compile: {}", pattern.pattern),
                    &[field],
                    CorrectionSuggestion::new(
                        field,
                        CorrectionStrategy::ValidatePattern,
                        format!("Review the pattern configured for {field}"),
                    ),
                ),
            }
        }
    }

    fn ranges(&mut self, ranges: &[FieldRange]) {
        for range in ranges {
            let Some(value) = self.present(&range.field) else {
                continue;
            };
            let field = range.field.as_str();
            match value.as_f64() {
                None => self.push(
                    RuleLevel::Error,
                    CheckKind::Conversion,
                    format!("Invalid numeric value for field {field}: {}", value.to_text()),
                    &[field],
                    CorrectionSuggestion::new(
                        field,
                        CorrectionStrategy::Convert,
                        format!("Convert {field} to a numeric value"),
                    )
                    .with_params(CorrectionParams {
                        target: Some(ValueKind::Number),
                        ..Default::default()
                    }),
                ),
                Some(number) if !range.contains(number) => self.push(
                    RuleLevel::Error,
                    CheckKind::Range,
                    format!("Value {number} for field {field} is outside {}", range.describe()),
                    &[field],
                    CorrectionSuggestion::new(
                        field,
                        CorrectionStrategy::Adjust,
                        format!("Adjust {field} to be within {}", range.describe()),
                    )
                    .with_params(CorrectionParams {
                        min: range.min,
                        max: range.max,
                        ..Default::default()
                    }),
                ),
                Some(_) => {}
            }
        }
    }

    fn financial(&mut self, constraints: &FinancialConstraints) {
        for metric in &constraints.required_metrics {
            if self.present(metric).is_none() {
                self.push(
                    RuleLevel::Error,
                    CheckKind::Metric,
                    format!("Missing required financial metric: {metric}"),
                    &[metric.as_str()],
                    CorrectionSuggestion::new(
                        metric.as_str(),
                        CorrectionStrategy::Add,
                        format!("Add financial metric {metric}"),
                    ),
                );
            }
        }
        self.ranges(&constraints.metric_ranges);
    }

    /// Every item must appear in the collection held by `holder`
    fn collection(&mut self, holder: &str, items: &[String], check: CheckKind, label: &str) {
        for item in items {
            let held = self
                .present(holder)
                .is_some_and(|collection| collection.contains_item(item));
            if !held {
                self.push(
                    RuleLevel::Error,
                    check,
                    format!("Missing {label}: {item}"),
                    &[holder],
                    CorrectionSuggestion::new(
                        holder,
                        CorrectionStrategy::Add,
                        format!("Add {item} to {holder}"),
                    ),
                );
            }
        }
    }

    fn documents(&mut self, compliance: &RegulatoryCompliance) {
        self.collection(
            "documents",
            &compliance.required_documents,
            CheckKind::Document,
            "required document",
        );
    }

    fn temporal_validity(&mut self, validity: &TemporalValidity) {
        let (Some(start), Some(end)) = (
            self.present(&validity.start_field).and_then(parse_date),
            self.present(&validity.end_field).and_then(parse_date),
        ) else {
            return;
        };
        if start > end {
            let (start_field, end_field) = (validity.start_field.as_str(), validity.end_field.as_str());
            self.push(
                RuleLevel::Warning,
                CheckKind::Temporal,
                format!("{start_field} ({start}) is after {end_field} ({end})"),
                &[start_field, end_field],
                CorrectionSuggestion::new(
                    start_field,
                    CorrectionStrategy::Update,
                    format!("Update {start_field} so it does not follow {end_field}"),
                ),
            );
        }
    }

    fn temporal_constraints(&mut self, constraints: &BTreeMap<String, Requirement>) {
        for (field, requirement) in constraints {
            if *requirement == Requirement::Required && self.present(field).is_none() {
                self.push(
                    RuleLevel::Error,
                    CheckKind::Temporal,
                    format!("Missing required date field: {field}"),
                    &[field.as_str()],
                    CorrectionSuggestion::new(
                        field.as_str(),
                        CorrectionStrategy::Add,
                        format!("Add date field {field}"),
                    ),
                );
            }
        }
    }
}

/// Entity properties with the entity name visible as the `name` field
fn entity_fields(entity: &Entity) -> Cow<'_, PropertyMap> {
    if entity.name.trim().is_empty() || entity.properties.contains_key("name") {
        return Cow::Borrowed(&entity.properties);
    }
    let mut fields = entity.properties.clone();
    fields.insert("name".to_string(), PropertyValue::String(entity.name.clone()));
    Cow::Owned(fields)
}

// ============================================================================
// Validation Service
// ============================================================================

/// Catalog entry for a relationship kind
#[derive(Debug, Clone, Serialize)]
pub struct RelationshipTypeInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub group: RelationshipGroup,
}

/// Evaluates registered rules
#[derive(Debug, Clone)]
pub struct ValidationService {
    registry: Arc<RuleRegistry>,
}

impl ValidationService {
    pub fn new(registry: Arc<RuleRegistry>) -> Self {
        Self { registry }
    }

    /// Service over the built-in rule catalog
    pub fn with_default_rules() -> Self {
        Self::new(Arc::new(RuleRegistry::with_default_rules()))
    }

    pub fn registry(&self) -> &Arc<RuleRegistry> {
        &self.registry
    }

    pub fn get_validation_rules(&self) -> RuleCatalog {
        self.registry.get_validation_rules()
    }

    pub fn add_validation_rule(&self, rule: impl Into<ValidationRule>) -> bool {
        self.registry.add_validation_rule(rule)
    }

    pub fn update_validation_rule(&self, rule: impl Into<ValidationRule>) -> bool {
        self.registry.update_validation_rule(rule)
    }

    pub fn get_relationship_types(&self) -> Vec<RelationshipTypeInfo> {
        RelationshipType::all()
            .iter()
            .map(|kind| RelationshipTypeInfo {
                name: kind.as_str(),
                description: kind.description(),
                group: kind.group(),
            })
            .collect()
    }

    /// Required fields declared by the entity rules for a type
    pub fn required_entity_fields(&self, entity: &Entity) -> Vec<String> {
        let mut fields: Vec<String> = self
            .registry
            .entity_rules_for(entity.entity_type)
            .into_iter()
            .flat_map(|rule| rule.required_fields)
            .collect();
        fields.sort();
        fields.dedup();
        fields
    }

    /// Validate an entity against the entity rules of its type
    pub fn validate_entity(&self, entity: &Entity) -> Result<ValidationReport> {
        let started = Instant::now();
        let rules = self.registry.entity_rules_for(entity.entity_type);
        if rules.is_empty() {
            return Err(FkgError::NoApplicableRules {
                subject: entity.entity_type.to_string(),
            });
        }

        let fields = entity_fields(entity);
        let mut results = Vec::new();
        for rule in &rules {
            let mut checker = Checker {
                rule_name: &rule.name,
                fields: &fields,
                results: &mut results,
            };
            checker.required(&rule.required_fields);
            checker.patterns(&rule.field_patterns);
            checker.ranges(&rule.field_ranges);
            if let Some(constraints) = &rule.financial_constraints {
                checker.financial(constraints);
            }
            if let Some(compliance) = &rule.regulatory_compliance {
                checker.documents(compliance);
            }
            if let Some(validity) = &rule.temporal_validity {
                checker.temporal_validity(validity);
            }
        }

        let names = rules.into_iter().map(|r| r.name).collect();
        let mut report = ValidationReport::new(entity.entity_type.to_string(), names, results, started);
        report.entity_id = Some(entity.id);
        debug!(
            entity_id = %entity.id,
            entity_type = %entity.entity_type,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "Entity validated"
        );
        Ok(report)
    }

    /// Validate a relationship against the rules of its type
    pub fn validate_relationship(&self, relationship: &Relationship) -> Result<ValidationReport> {
        let started = Instant::now();
        let rules = self
            .registry
            .relationship_rules_for(relationship.relationship_type);
        if rules.is_empty() {
            return Err(FkgError::NoApplicableRules {
                subject: relationship.relationship_type.to_string(),
            });
        }

        let mut results = Vec::new();
        for rule in &rules {
            let mut checker = Checker {
                rule_name: &rule.name,
                fields: &relationship.properties,
                results: &mut results,
            };
            checker.required(&rule.required_properties);
            checker.patterns(&rule.property_patterns);
            checker.ranges(&rule.property_ranges);
            checker.temporal_constraints(&rule.temporal_constraints);
            if let Some(constraints) = &rule.financial_constraints {
                checker.financial(constraints);
            }
            if let Some(compliance) = &rule.regulatory_compliance {
                checker.documents(compliance);
            }
        }

        let names = rules.into_iter().map(|r| r.name).collect();
        let mut report = ValidationReport::new(
            relationship.relationship_type.to_string(),
            names,
            results,
            started,
        );
        report.relationship_id = Some(relationship.id);
        debug!(
            relationship_id = %relationship.id,
            relationship_type = %relationship.relationship_type,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "Relationship validated"
        );
        Ok(report)
    }

    /// Validate an entity against the rules of a financial domain
    pub fn validate_financial_entity(
        &self,
        entity: &Entity,
        domain: FinancialDomain,
    ) -> Result<ValidationReport> {
        let started = Instant::now();
        let rules = self.registry.domain_rules_for(domain, entity.entity_type);
        if rules.is_empty() {
            return Err(FkgError::NoApplicableRules {
                subject: format!("{} in {domain}", entity.entity_type),
            });
        }

        let fields = entity_fields(entity);
        let mut results = Vec::new();
        for rule in &rules {
            let mut checker = Checker {
                rule_name: &rule.name,
                fields: &fields,
                results: &mut results,
            };
            checker.required(&rule.required_fields);
            checker.patterns(&rule.field_patterns);
            if let Some(constraints) = &rule.financial_constraints {
                checker.financial(constraints);
            }
            checker.collection(
                "compliance_status",
                &rule.compliance_requirements,
                CheckKind::Compliance,
                "compliance requirement",
            );
            checker.collection(
                "risk_assessment",
                &rule.risk_factors,
                CheckKind::RiskFactor,
                "required risk factor",
            );
        }

        let names = rules.into_iter().map(|r| r.name).collect();
        let mut report = ValidationReport::new(
            format!("{} in {domain}", entity.entity_type),
            names,
            results,
            started,
        );
        report.entity_id = Some(entity.id);
        debug!(
            entity_id = %entity.id,
            domain = %domain,
            errors = report.error_count(),
            warnings = report.warning_count(),
            "Entity validated against domain rules"
        );
        Ok(report)
    }

    /// Relationships of one type sharing a source or target beyond the
    /// limits declared by their rules
    pub fn check_relationship_cardinality(&self, relationships: &[Relationship]) -> Vec<BatchFinding> {
        let mut by_type: BTreeMap<_, Vec<&Relationship>> = BTreeMap::new();
        for rel in relationships {
            by_type.entry(rel.relationship_type).or_default().push(rel);
        }

        let mut findings = Vec::new();
        for (rel_type, group) in by_type {
            for rule in self.registry.relationship_rules_for(rel_type) {
                let Some(cardinality) = &rule.cardinality else {
                    continue;
                };
                let sides = [
                    ("source_id", cardinality.max_per_source, true),
                    ("target_id", cardinality.max_per_target, false),
                ];
                for (side, limit, is_source) in sides {
                    let Some(limit) = limit else {
                        continue;
                    };
                    let mut counts: BTreeMap<Uuid, usize> = BTreeMap::new();
                    for rel in &group {
                        let id = if is_source { rel.source_id } else { rel.target_id };
                        *counts.entry(id).or_default() += 1;
                    }
                    for (id, count) in counts.into_iter().filter(|(_, c)| *c > limit) {
                        findings.push(BatchFinding {
                            item_id: id,
                            result: ValidationResult {
                                rule_name: rule.name.clone(),
                                level: RuleLevel::Warning,
                                message: format!(
                                    "{count} {rel_type} relationships share {side} {id}, limit is {limit}"
                                ),
                                check: CheckKind::Cardinality,
                                affected_fields: vec![side.to_string()],
                                suggested_corrections: vec![CorrectionSuggestion::new(
                                    side,
                                    CorrectionStrategy::ValidateRelationship,
                                    format!("Review {rel_type} relationships for {id}"),
                                )],
                                confidence_score: 1.0,
                                timestamp: Utc::now(),
                            },
                        });
                    }
                }
            }
        }
        findings
    }

    /// Entities repeating a value of a field their rules declare unique.
    /// The first holder of a value is kept; later ones are reported.
    pub fn check_entity_uniqueness(&self, entities: &[Entity]) -> Vec<BatchFinding> {
        let mut findings = Vec::new();
        let mut seen: HashMap<(String, String), Uuid> = HashMap::new();

        for entity in entities {
            let fields = entity_fields(entity);
            for rule in self.registry.entity_rules_for(entity.entity_type) {
                for field in &rule.unique_fields {
                    let Some(value) = fields.get(field).filter(|v| !v.is_null()) else {
                        continue;
                    };
                    let text = value.to_text();
                    let key = (format!("{}.{field}", entity.entity_type), text.clone());
                    match seen.get(&key) {
                        Some(first) if *first != entity.id => findings.push(BatchFinding {
                            item_id: entity.id,
                            result: ValidationResult {
                                rule_name: rule.name.clone(),
                                level: RuleLevel::Warning,
                                message: format!("Duplicate {field} '{text}' already used by {first}"),
                                check: CheckKind::Uniqueness,
                                affected_fields: vec![field.clone()],
                                suggested_corrections: vec![CorrectionSuggestion::new(
                                    field.as_str(),
                                    CorrectionStrategy::ValidateUniqueness,
                                    format!("Make {field} unique"),
                                )
                                .with_params(CorrectionParams {
                                    allowed: vec![value.clone()],
                                    ..Default::default()
                                })],
                                confidence_score: 1.0,
                                timestamp: Utc::now(),
                            },
                        }),
                        Some(_) => {}
                        None => {
                            seen.insert(key, entity.id);
                        }
                    }
                }
            }
        }
        findings
    }
}

impl Default for ValidationService {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
