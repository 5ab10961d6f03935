//! Validation rules and the in-memory rule registry
//!
//! Rules are a closed set of kinds (entity, relationship, financial domain),
//! registered by name. A registered rule is only ever replaced as a whole.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use fkg_core::{EntityType, FinancialDomain, RelationshipType};

use crate::catalog;

// ============================================================================
// Rule Levels
// ============================================================================

/// Severity of a rule and of the results it produces
///
/// Ordered from least to most severe, so the worst level of a set of
/// results is its maximum.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    #[default]
    Info,
    Warning,
    Error,
}

impl RuleLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for RuleLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Constraint Building Blocks
// ============================================================================

/// Regular expression a field value must match from its first character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldPattern {
    pub field: String,
    pub pattern: String,
    /// Shared by clones, so rules handed out by the registry compile once
    #[serde(skip)]
    compiled: Arc<OnceCell<Option<Regex>>>,
}

impl FieldPattern {
    pub fn new(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: pattern.into(),
            compiled: Arc::default(),
        }
    }

    /// Pattern anchored at the start of the value, compiled on first use.
    /// `None` when the pattern does not compile.
    pub fn regex(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| Regex::new(&format!("^(?:{})", self.pattern)).ok())
            .as_ref()
    }

    /// `None` when the pattern itself is invalid
    pub fn matches(&self, text: &str) -> Option<bool> {
        self.regex().map(|re| re.is_match(text))
    }
}

/// Inclusive numeric bounds for a field. A missing bound is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRange {
    pub field: String,
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl FieldRange {
    /// Infinite bounds are stored as open bounds
    pub fn new(field: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            field: field.into(),
            min: min.is_finite().then_some(min),
            max: max.is_finite().then_some(max),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    /// Human readable bounds, e.g. `[0, inf)`
    pub fn describe(&self) -> String {
        let lower = self
            .min
            .map_or_else(|| "(-inf".to_string(), |min| format!("[{min}"));
        let upper = self
            .max
            .map_or_else(|| "inf)".to_string(), |max| format!("{max}]"));
        format!("{lower}, {upper}")
    }
}

/// Metrics an item must carry, and bounds for them
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialConstraints {
    #[serde(default)]
    pub required_metrics: Vec<String>,
    #[serde(default)]
    pub metric_ranges: Vec<FieldRange>,
}

/// Documents an item must reference in its `documents` property
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegulatoryCompliance {
    #[serde(default)]
    pub required_documents: Vec<String>,
    /// Informational, not checked per item
    #[serde(default)]
    pub reporting_requirements: Vec<String>,
}

/// Two date fields where the start must not come after the end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalValidity {
    pub start_field: String,
    pub end_field: String,
}

/// Presence requirement of a relationship date field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    Required,
    Optional,
}

/// Upper bounds on relationships of one type sharing an endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardinalityConstraint {
    #[serde(default)]
    pub max_per_source: Option<usize>,
    #[serde(default)]
    pub max_per_target: Option<usize>,
}

fn enabled_default() -> bool {
    true
}

fn level_default() -> RuleLevel {
    RuleLevel::Error
}

// ============================================================================
// Entity Rules
// ============================================================================

/// Field-level checks for one entity type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Catalog severity. Failed checks always report `Error`; only
    /// temporal, cardinality and uniqueness findings are warnings.
    #[serde(default = "level_default")]
    pub level: RuleLevel,
    #[serde(default = "enabled_default")]
    pub enabled: bool,

    pub entity_type: EntityType,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub field_patterns: Vec<FieldPattern>,
    #[serde(default)]
    pub field_ranges: Vec<FieldRange>,
    /// Fields whose values must not repeat across a batch
    #[serde(default)]
    pub unique_fields: Vec<String>,
    #[serde(default)]
    pub financial_constraints: Option<FinancialConstraints>,
    #[serde(default)]
    pub regulatory_compliance: Option<RegulatoryCompliance>,
    #[serde(default)]
    pub temporal_validity: Option<TemporalValidity>,
}

impl EntityRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        entity_type: EntityType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            level: RuleLevel::Error,
            enabled: true,
            entity_type,
            required_fields: Vec::new(),
            field_patterns: Vec::new(),
            field_ranges: Vec::new(),
            unique_fields: Vec::new(),
            financial_constraints: None,
            regulatory_compliance: None,
            temporal_validity: None,
        }
    }

    pub fn with_level(mut self, level: RuleLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_required_fields(mut self, fields: &[&str]) -> Self {
        self.required_fields = to_strings(fields);
        self
    }

    pub fn with_pattern(mut self, field: &str, pattern: &str) -> Self {
        self.field_patterns.push(FieldPattern::new(field, pattern));
        self
    }

    pub fn with_range(mut self, field: &str, min: f64, max: f64) -> Self {
        self.field_ranges.push(FieldRange::new(field, min, max));
        self
    }

    pub fn with_unique_fields(mut self, fields: &[&str]) -> Self {
        self.unique_fields = to_strings(fields);
        self
    }

    pub fn with_financial_constraints(mut self, constraints: FinancialConstraints) -> Self {
        self.financial_constraints = Some(constraints);
        self
    }

    pub fn with_regulatory_compliance(mut self, compliance: RegulatoryCompliance) -> Self {
        self.regulatory_compliance = Some(compliance);
        self
    }

    pub fn with_temporal_validity(mut self, start_field: &str, end_field: &str) -> Self {
        self.temporal_validity = Some(TemporalValidity {
            start_field: start_field.to_string(),
            end_field: end_field.to_string(),
        });
        self
    }
}

// ============================================================================
// Relationship Rules
// ============================================================================

/// Property and endpoint checks for one relationship type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationshipRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "level_default")]
    pub level: RuleLevel,
    #[serde(default = "enabled_default")]
    pub enabled: bool,

    pub relationship_type: RelationshipType,
    pub source_entity_type: EntityType,
    pub target_entity_type: EntityType,
    #[serde(default)]
    pub required_properties: Vec<String>,
    #[serde(default)]
    pub property_patterns: Vec<FieldPattern>,
    #[serde(default)]
    pub property_ranges: Vec<FieldRange>,
    #[serde(default)]
    pub temporal_constraints: BTreeMap<String, Requirement>,
    #[serde(default)]
    pub financial_constraints: Option<FinancialConstraints>,
    #[serde(default)]
    pub regulatory_compliance: Option<RegulatoryCompliance>,
    #[serde(default)]
    pub cardinality: Option<CardinalityConstraint>,
}

impl RelationshipRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        relationship_type: RelationshipType,
        source_entity_type: EntityType,
        target_entity_type: EntityType,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            level: RuleLevel::Error,
            enabled: true,
            relationship_type,
            source_entity_type,
            target_entity_type,
            required_properties: Vec::new(),
            property_patterns: Vec::new(),
            property_ranges: Vec::new(),
            temporal_constraints: BTreeMap::new(),
            financial_constraints: None,
            regulatory_compliance: None,
            cardinality: None,
        }
    }

    pub fn with_required_properties(mut self, properties: &[&str]) -> Self {
        self.required_properties = to_strings(properties);
        self
    }

    pub fn with_pattern(mut self, property: &str, pattern: &str) -> Self {
        self.property_patterns.push(FieldPattern::new(property, pattern));
        self
    }

    pub fn with_range(mut self, property: &str, min: f64, max: f64) -> Self {
        self.property_ranges.push(FieldRange::new(property, min, max));
        self
    }

    pub fn with_temporal_constraint(mut self, field: &str, requirement: Requirement) -> Self {
        self.temporal_constraints.insert(field.to_string(), requirement);
        self
    }

    pub fn with_financial_constraints(mut self, constraints: FinancialConstraints) -> Self {
        self.financial_constraints = Some(constraints);
        self
    }

    pub fn with_regulatory_compliance(mut self, compliance: RegulatoryCompliance) -> Self {
        self.regulatory_compliance = Some(compliance);
        self
    }

    pub fn with_cardinality(mut self, cardinality: CardinalityConstraint) -> Self {
        self.cardinality = Some(cardinality);
        self
    }

    /// Whether a (source, target) type pair is the one this rule expects
    pub fn accepts_endpoints(&self, source: EntityType, target: EntityType) -> bool {
        self.source_entity_type == source && self.target_entity_type == target
    }
}

// ============================================================================
// Financial Domain Rules
// ============================================================================

/// Checks an entity must pass to be valid within a financial domain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialDomainRule {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "level_default")]
    pub level: RuleLevel,
    #[serde(default = "enabled_default")]
    pub enabled: bool,

    pub domain: FinancialDomain,
    pub entity_type: EntityType,
    #[serde(default)]
    pub required_fields: Vec<String>,
    #[serde(default)]
    pub field_patterns: Vec<FieldPattern>,
    #[serde(default)]
    pub financial_constraints: Option<FinancialConstraints>,
    #[serde(default)]
    pub regulatory_framework: String,
    /// Checked against the entity's `compliance_status` property
    #[serde(default)]
    pub compliance_requirements: Vec<String>,
    /// Checked against the entity's `risk_assessment` property
    #[serde(default)]
    pub risk_factors: Vec<String>,
}

impl FinancialDomainRule {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        domain: FinancialDomain,
        entity_type: EntityType,
        regulatory_framework: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            level: RuleLevel::Error,
            enabled: true,
            domain,
            entity_type,
            required_fields: Vec::new(),
            field_patterns: Vec::new(),
            financial_constraints: None,
            regulatory_framework: regulatory_framework.into(),
            compliance_requirements: Vec::new(),
            risk_factors: Vec::new(),
        }
    }

    pub fn with_required_fields(mut self, fields: &[&str]) -> Self {
        self.required_fields = to_strings(fields);
        self
    }

    pub fn with_pattern(mut self, field: &str, pattern: &str) -> Self {
        self.field_patterns.push(FieldPattern::new(field, pattern));
        self
    }

    pub fn with_metric_range(mut self, metric: &str, min: f64, max: f64) -> Self {
        self.financial_constraints
            .get_or_insert_with(FinancialConstraints::default)
            .metric_ranges
            .push(FieldRange::new(metric, min, max));
        self
    }

    pub fn with_compliance_requirements(mut self, requirements: &[&str]) -> Self {
        self.compliance_requirements = to_strings(requirements);
        self
    }

    pub fn with_risk_factors(mut self, factors: &[&str]) -> Self {
        self.risk_factors = to_strings(factors);
        self
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Validation Rule
// ============================================================================

/// Any registered rule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationRule {
    Entity(EntityRule),
    Relationship(RelationshipRule),
    FinancialDomain(FinancialDomainRule),
}

impl ValidationRule {
    pub fn name(&self) -> &str {
        match self {
            Self::Entity(rule) => &rule.name,
            Self::Relationship(rule) => &rule.name,
            Self::FinancialDomain(rule) => &rule.name,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Self::Entity(rule) => &rule.description,
            Self::Relationship(rule) => &rule.description,
            Self::FinancialDomain(rule) => &rule.description,
        }
    }

    pub fn level(&self) -> RuleLevel {
        match self {
            Self::Entity(rule) => rule.level,
            Self::Relationship(rule) => rule.level,
            Self::FinancialDomain(rule) => rule.level,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Self::Entity(rule) => rule.enabled,
            Self::Relationship(rule) => rule.enabled,
            Self::FinancialDomain(rule) => rule.enabled,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Entity(_) => "entity",
            Self::Relationship(_) => "relationship",
            Self::FinancialDomain(_) => "financial_domain",
        }
    }
}

impl From<EntityRule> for ValidationRule {
    fn from(rule: EntityRule) -> Self {
        Self::Entity(rule)
    }
}

impl From<RelationshipRule> for ValidationRule {
    fn from(rule: RelationshipRule) -> Self {
        Self::Relationship(rule)
    }
}

impl From<FinancialDomainRule> for ValidationRule {
    fn from(rule: FinancialDomainRule) -> Self {
        Self::FinancialDomain(rule)
    }
}

// ============================================================================
// Rule Registry
// ============================================================================

/// Snapshot of every registered rule, grouped by kind
#[derive(Debug, Clone, Default, Serialize)]
pub struct RuleCatalog {
    pub entity_rules: Vec<EntityRule>,
    pub relationship_rules: Vec<RelationshipRule>,
    pub domain_rules: Vec<FinancialDomainRule>,
}

impl RuleCatalog {
    pub fn total(&self) -> usize {
        self.entity_rules.len() + self.relationship_rules.len() + self.domain_rules.len()
    }
}

/// Name-keyed table of validation rules, shared read-mostly
#[derive(Debug, Default)]
pub struct RuleRegistry {
    rules: RwLock<BTreeMap<String, ValidationRule>>,
}

impl RuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in rule catalog
    pub fn with_default_rules() -> Self {
        let registry = Self::new();
        for rule in catalog::default_rules() {
            registry.register(rule);
        }
        debug!(rules = registry.len(), "Registered default validation rules");
        registry
    }

    // A panic while holding the lock leaves the table itself intact.
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, ValidationRule>> {
        self.rules.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, ValidationRule>> {
        self.rules.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a rule, returning the rule it displaced
    pub fn register(&self, rule: impl Into<ValidationRule>) -> Option<ValidationRule> {
        let rule = rule.into();
        self.write().insert(rule.name().to_string(), rule)
    }

    pub fn get(&self, name: &str) -> Option<ValidationRule> {
        self.read().get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All rules grouped by kind, in name order
    pub fn get_validation_rules(&self) -> RuleCatalog {
        let mut catalog = RuleCatalog::default();
        for rule in self.read().values() {
            match rule {
                ValidationRule::Entity(r) => catalog.entity_rules.push(r.clone()),
                ValidationRule::Relationship(r) => catalog.relationship_rules.push(r.clone()),
                ValidationRule::FinancialDomain(r) => catalog.domain_rules.push(r.clone()),
            }
        }
        catalog
    }

    /// Add a rule under a name not yet registered.
    ///
    /// Returns `false`, leaving the registry untouched, when the name is taken.
    pub fn add_validation_rule(&self, rule: impl Into<ValidationRule>) -> bool {
        let rule = rule.into();
        match self.write().entry(rule.name().to_string()) {
            Entry::Occupied(_) => {
                debug!(rule = %rule.name(), "Add ignored for existing rule");
                false
            }
            Entry::Vacant(slot) => {
                info!(rule = %rule.name(), kind = rule.kind(), "Validation rule added");
                slot.insert(rule);
                true
            }
        }
    }

    /// Replace the rule registered under the same name.
    ///
    /// Returns `false`, leaving the registry untouched, when no rule of that
    /// name exists.
    pub fn update_validation_rule(&self, rule: impl Into<ValidationRule>) -> bool {
        let rule = rule.into();
        let mut rules = self.write();
        match rules.get_mut(rule.name()) {
            Some(slot) => {
                info!(rule = %rule.name(), kind = rule.kind(), "Validation rule updated");
                *slot = rule;
                true
            }
            None => {
                debug!(rule = %rule.name(), "Update ignored for unknown rule");
                false
            }
        }
    }

    /// Enabled entity rules for a type
    pub fn entity_rules_for(&self, entity_type: EntityType) -> Vec<EntityRule> {
        self.read()
            .values()
            .filter_map(|rule| match rule {
                ValidationRule::Entity(r) if r.enabled && r.entity_type == entity_type => {
                    Some(r.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Enabled relationship rules for a type
    pub fn relationship_rules_for(&self, relationship_type: RelationshipType) -> Vec<RelationshipRule> {
        self.read()
            .values()
            .filter_map(|rule| match rule {
                ValidationRule::Relationship(r)
                    if r.enabled && r.relationship_type == relationship_type =>
                {
                    Some(r.clone())
                }
                _ => None,
            })
            .collect()
    }

    /// Enabled domain rules for an entity type within a domain
    pub fn domain_rules_for(
        &self,
        domain: FinancialDomain,
        entity_type: EntityType,
    ) -> Vec<FinancialDomainRule> {
        self.read()
            .values()
            .filter_map(|rule| match rule {
                ValidationRule::FinancialDomain(r)
                    if r.enabled && r.domain == domain && r.entity_type == entity_type =>
                {
                    Some(r.clone())
                }
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(RuleLevel::Error > RuleLevel::Warning);
        assert!(RuleLevel::Warning > RuleLevel::Info);
        assert_eq!(RuleLevel::default(), RuleLevel::Info);
    }

    #[test]
    fn test_pattern_is_anchored_at_start() {
        let pattern = FieldPattern::new("ticker", "[A-Z]{1,5}");
        assert_eq!(pattern.matches("ABC"), Some(true));
        assert_eq!(pattern.matches("abcDEF"), Some(false));

        let broken = FieldPattern::new("ticker", "([A-Z");
        assert_eq!(broken.matches("ABC"), None);
    }

    #[test]
    fn test_registry_rules_share_compiled_patterns() {
        let registry = RuleRegistry::new();
        registry.register(
            EntityRule::new("company", "", EntityType::Company).with_pattern("ticker", "[A-Z]{1,5}$"),
        );
        let first = registry.entity_rules_for(EntityType::Company);
        let second = registry.entity_rules_for(EntityType::Company);
        let a = first[0].field_patterns[0].regex().unwrap();
        let b = second[0].field_patterns[0].regex().unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_range_open_bounds() {
        let range = FieldRange::new("revenue", 0.0, f64::INFINITY);
        assert_eq!(range.max, None);
        assert!(range.contains(0.0));
        assert!(range.contains(1e12));
        assert!(!range.contains(-1.0));
        assert_eq!(range.describe(), "[0, inf)");
    }

    #[test]
    fn test_rule_json_shape() {
        let rule: ValidationRule = EntityRule::new("r", "d", EntityType::Company)
            .with_required_fields(&["name"])
            .into();
        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["kind"], "entity");
        assert_eq!(json["level"], "error");

        let back: ValidationRule = serde_json::from_value(json).unwrap();
        assert_eq!(back.name(), "r");
        assert!(back.enabled());
    }

    #[test]
    fn test_update_replaces_by_name_only() {
        let registry = RuleRegistry::new();
        registry.register(EntityRule::new("company", "v1", EntityType::Company));

        let replaced = registry.update_validation_rule(
            EntityRule::new("company", "v2", EntityType::Company).with_level(RuleLevel::Warning),
        );
        assert!(replaced);
        let rule = registry.get("company").unwrap();
        assert_eq!(rule.description(), "v2");
        assert_eq!(rule.level(), RuleLevel::Warning);

        assert!(!registry.update_validation_rule(EntityRule::new("ghost", "", EntityType::Person)));
        assert!(registry.get("ghost").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_add_only_takes_new_names() {
        let registry = RuleRegistry::new();
        assert!(registry.add_validation_rule(EntityRule::new("company", "v1", EntityType::Company)));
        assert!(!registry.add_validation_rule(EntityRule::new("company", "v2", EntityType::Company)));
        assert_eq!(registry.get("company").unwrap().description(), "v1");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_disabled_rules_are_not_applicable() {
        let registry = RuleRegistry::new();
        let mut rule = EntityRule::new("company", "", EntityType::Company);
        rule.enabled = false;
        registry.register(rule);
        assert!(registry.entity_rules_for(EntityType::Company).is_empty());
        assert_eq!(registry.get_validation_rules().entity_rules.len(), 1);
    }

    #[test]
    fn test_default_catalog_counts() {
        let registry = RuleRegistry::with_default_rules();
        let catalog = registry.get_validation_rules();
        assert_eq!(catalog.entity_rules.len(), 4);
        assert_eq!(catalog.relationship_rules.len(), 3);
        assert_eq!(catalog.domain_rules.len(), 15);

        for domain in FinancialDomain::ALL {
            assert!(
                catalog.domain_rules.iter().any(|r| r.domain == domain),
                "no rule for {domain}"
            );
        }
    }

    #[test]
    fn test_default_patterns_compile() {
        let catalog = RuleRegistry::with_default_rules().get_validation_rules();
        let patterns = catalog
            .entity_rules
            .iter()
            .flat_map(|r| r.field_patterns.iter())
            .chain(catalog.domain_rules.iter().flat_map(|r| r.field_patterns.iter()));
        for pattern in patterns {
            assert!(pattern.regex().is_some(), "pattern for {} does not compile", pattern.field);
        }
    }
}
