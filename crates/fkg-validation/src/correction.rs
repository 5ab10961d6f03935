//! Correction strategies and their dispatch table
//!
//! Every strategy is a plain function over an entity and a data-only
//! parameter set. Handlers run on a working copy; the entity is only
//! replaced when the handler reports a change.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Duration, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use fkg_core::{Entity, PropertyMap, PropertyValue, ValueKind};

use crate::rules::FieldRange;
use crate::{entity_field, parse_date};

// ============================================================================
// Strategies
// ============================================================================

/// Kinds of correction the pipeline can dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStrategy {
    Add,
    Remove,
    Update,
    Format,
    Convert,
    Adjust,
    Normalize,
    Standardize,
    Validate,
    Enrich,
    Deduplicate,
    Merge,
    Split,
    Transform,
    Calculate,
    Infer,
    ValidateFormat,
    ValidateRange,
    ValidatePattern,
    ValidateRelationship,
    ValidateConsistency,
    ValidateCompleteness,
    ValidateAccuracy,
    ValidateTimeliness,
    ValidateUniqueness,
    ValidateIntegrity,
    ValidateConformity,
    ValidateBusinessRules,
    /// Any strategy name this build does not know; applying it does nothing
    #[serde(other)]
    Unknown,
}

impl CorrectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Update => "update",
            Self::Format => "format",
            Self::Convert => "convert",
            Self::Adjust => "adjust",
            Self::Normalize => "normalize",
            Self::Standardize => "standardize",
            Self::Validate => "validate",
            Self::Enrich => "enrich",
            Self::Deduplicate => "deduplicate",
            Self::Merge => "merge",
            Self::Split => "split",
            Self::Transform => "transform",
            Self::Calculate => "calculate",
            Self::Infer => "infer",
            Self::ValidateFormat => "validate_format",
            Self::ValidateRange => "validate_range",
            Self::ValidatePattern => "validate_pattern",
            Self::ValidateRelationship => "validate_relationship",
            Self::ValidateConsistency => "validate_consistency",
            Self::ValidateCompleteness => "validate_completeness",
            Self::ValidateAccuracy => "validate_accuracy",
            Self::ValidateTimeliness => "validate_timeliness",
            Self::ValidateUniqueness => "validate_uniqueness",
            Self::ValidateIntegrity => "validate_integrity",
            Self::ValidateConformity => "validate_conformity",
            Self::ValidateBusinessRules => "validate_business_rules",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CorrectionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arithmetic used by the `calculate` strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Sum,
    Difference,
    Product,
    Ratio,
}

// ============================================================================
// Corrections
// ============================================================================

/// Parameters a strategy may read. Each strategy uses a small subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyValue>,
    /// `upper`, `lower`, `trim`, `title`, `.Nf`, or a template containing `{}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<ValueKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub mapping: BTreeMap<String, PropertyValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tolerance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_age_days: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<PropertyValue>,
    /// Metadata key read by `enrich`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// A correction to apply to one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub strategy: CorrectionStrategy,
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default)]
    pub parameters: CorrectionParams,
}

impl Correction {
    pub fn new(strategy: CorrectionStrategy) -> Self {
        Self {
            strategy,
            field: None,
            parameters: CorrectionParams::default(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<PropertyValue>) -> Self {
        self.parameters.value = Some(value.into());
        self
    }

    pub fn with_params(mut self, parameters: CorrectionParams) -> Self {
        self.parameters = parameters;
        self
    }
}

/// What a handler did to the entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CorrectionOutcome {
    Applied,
    Unchanged,
    /// The entity as a whole fails the check and should not be kept
    Rejected { reason: String },
}

/// Correction failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrectionError {
    #[error("{strategy} requires parameter '{parameter}'")]
    MissingParameter {
        strategy: &'static str,
        parameter: &'static str,
    },

    #[error("Field '{0}' is not present")]
    MissingField(String),

    #[error("Field '{field}' is not numeric: {value}")]
    NotNumeric { field: String, value: String },

    #[error("Cannot convert '{field}' to {target:?}")]
    Conversion { field: String, target: ValueKind },

    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Division by zero computing '{0}'")]
    DivisionByZero(String),
}

pub type HandlerResult = Result<CorrectionOutcome, CorrectionError>;

/// Strategy handler signature
pub type Handler = fn(&mut Entity, &Correction) -> HandlerResult;

// ============================================================================
// Dispatch Table
// ============================================================================

const HANDLERS: [(CorrectionStrategy, Handler); 28] = [
    (CorrectionStrategy::Add, add_field),
    (CorrectionStrategy::Remove, remove_field),
    (CorrectionStrategy::Update, update_field),
    (CorrectionStrategy::Format, format_field),
    (CorrectionStrategy::Convert, convert_field),
    (CorrectionStrategy::Adjust, adjust_field),
    (CorrectionStrategy::Normalize, normalize_field),
    (CorrectionStrategy::Standardize, standardize_field),
    (CorrectionStrategy::Validate, validate_field),
    (CorrectionStrategy::Enrich, enrich_field),
    (CorrectionStrategy::Deduplicate, deduplicate_field),
    (CorrectionStrategy::Merge, merge_properties),
    (CorrectionStrategy::Split, split_field),
    (CorrectionStrategy::Transform, transform_field),
    (CorrectionStrategy::Calculate, calculate_field),
    (CorrectionStrategy::Infer, infer_field),
    (CorrectionStrategy::ValidateFormat, validate_format),
    (CorrectionStrategy::ValidateRange, validate_range),
    (CorrectionStrategy::ValidatePattern, validate_pattern),
    (CorrectionStrategy::ValidateRelationship, validate_reference),
    (CorrectionStrategy::ValidateConsistency, validate_consistency),
    (CorrectionStrategy::ValidateCompleteness, validate_completeness),
    (CorrectionStrategy::ValidateAccuracy, validate_accuracy),
    (CorrectionStrategy::ValidateTimeliness, validate_timeliness),
    (CorrectionStrategy::ValidateUniqueness, validate_uniqueness),
    (CorrectionStrategy::ValidateIntegrity, validate_integrity),
    (CorrectionStrategy::ValidateConformity, validate_conformity),
    (CorrectionStrategy::ValidateBusinessRules, validate_business_rules),
];

/// Handler registered for a strategy; `None` for unknown strategies
pub fn handler_for(strategy: CorrectionStrategy) -> Option<Handler> {
    HANDLERS
        .iter()
        .find(|(kind, _)| *kind == strategy)
        .map(|(_, handler)| *handler)
}

/// Strategies with a registered handler
pub fn strategies() -> impl Iterator<Item = CorrectionStrategy> {
    HANDLERS.iter().map(|(kind, _)| *kind)
}

/// Apply one correction.
///
/// The entity is modified only when the handler reports `Applied`; a
/// rejection or an error leaves it exactly as it was.
pub fn apply(entity: &mut Entity, correction: &Correction) -> HandlerResult {
    let Some(handler) = handler_for(correction.strategy) else {
        return Ok(CorrectionOutcome::Unchanged);
    };

    let mut working = entity.clone();
    let outcome = handler(&mut working, correction)?;
    if outcome == CorrectionOutcome::Applied {
        working.updated_at = Utc::now();
        *entity = working;
    }
    Ok(outcome)
}

// ============================================================================
// Helpers
// ============================================================================

fn field_of(correction: &Correction) -> Result<&str, CorrectionError> {
    correction
        .field
        .as_deref()
        .ok_or(CorrectionError::MissingParameter {
            strategy: correction.strategy.as_str(),
            parameter: "field",
        })
}

fn required<'a, T>(
    value: &'a Option<T>,
    correction: &Correction,
    parameter: &'static str,
) -> Result<&'a T, CorrectionError> {
    value.as_ref().ok_or(CorrectionError::MissingParameter {
        strategy: correction.strategy.as_str(),
        parameter,
    })
}

fn changed(changed: bool) -> HandlerResult {
    Ok(if changed {
        CorrectionOutcome::Applied
    } else {
        CorrectionOutcome::Unchanged
    })
}

fn rejected(reason: impl Into<String>) -> HandlerResult {
    Ok(CorrectionOutcome::Rejected {
        reason: reason.into(),
    })
}

/// Numeric value of a present field; `None` when the field is absent
fn numeric(entity: &Entity, field: &str) -> Result<Option<f64>, CorrectionError> {
    match entity.properties.get(field) {
        None | Some(PropertyValue::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| CorrectionError::NotNumeric {
                field: field.to_string(),
                value: value.to_text(),
            }),
    }
}

fn set(entity: &mut Entity, field: &str, value: PropertyValue) -> HandlerResult {
    let previous = entity.properties.insert(field.to_string(), value.clone());
    changed(previous.as_ref() != Some(&value))
}

fn drop_field(entity: &mut Entity, field: &str) -> HandlerResult {
    changed(entity.properties.remove(field).is_some())
}

fn is_allowed(allowed: &[PropertyValue], value: &PropertyValue) -> bool {
    let text = value.to_text();
    allowed.iter().any(|a| a == value || a.to_text() == text)
}

fn anchored(pattern: &str) -> Result<Regex, CorrectionError> {
    Regex::new(&format!("^(?:{pattern})")).map_err(|e| CorrectionError::InvalidPattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// Convert a value to another kind; `None` when it does not convert
pub fn convert_value(value: &PropertyValue, target: ValueKind) -> Option<PropertyValue> {
    match target {
        ValueKind::Number => value.as_f64().map(PropertyValue::Number),
        ValueKind::Integer => value.as_f64().map(|n| PropertyValue::Number(n.trunc())),
        ValueKind::String => Some(PropertyValue::String(value.to_text())),
        ValueKind::Bool => match value {
            PropertyValue::Bool(b) => Some(PropertyValue::Bool(*b)),
            PropertyValue::Number(n) => Some(PropertyValue::Bool(*n != 0.0)),
            PropertyValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Some(PropertyValue::Bool(true)),
                "false" | "no" | "0" => Some(PropertyValue::Bool(false)),
                _ => None,
            },
            _ => None,
        },
        ValueKind::Date => parse_date(value)
            .map(|date| PropertyValue::String(date.format("%Y-%m-%d").to_string())),
    }
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_value(value: &PropertyValue, spec: &str, field: &str) -> Result<PropertyValue, CorrectionError> {
    let text = || value.as_str().map(str::to_string).unwrap_or_else(|| value.to_text());
    match spec {
        "upper" => Ok(PropertyValue::String(text().to_uppercase())),
        "lower" => Ok(PropertyValue::String(text().to_lowercase())),
        "trim" => Ok(PropertyValue::String(text().trim().to_string())),
        "title" => Ok(PropertyValue::String(title_case(&text()))),
        _ if spec.contains("{}") => Ok(PropertyValue::String(spec.replace("{}", &text()))),
        _ => {
            let digits = spec
                .strip_prefix('.')
                .and_then(|rest| rest.strip_suffix('f'))
                .and_then(|n| n.parse::<i32>().ok())
                .ok_or_else(|| CorrectionError::UnsupportedFormat(spec.to_string()))?;
            let number = value.as_f64().ok_or_else(|| CorrectionError::NotNumeric {
                field: field.to_string(),
                value: value.to_text(),
            })?;
            let scale = 10f64.powi(digits);
            Ok(PropertyValue::Number((number * scale).round() / scale))
        }
    }
}

// ============================================================================
// Field Edits
// ============================================================================

fn add_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    if entity.properties.contains_key(field) {
        return changed(false);
    }
    let value = c.parameters.value.clone().unwrap_or_default();
    entity.properties.insert(field.to_string(), value);
    changed(true)
}

fn remove_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    drop_field(entity, field_of(c)?)
}

// Without a replacement value there is nothing to write.
fn update_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    match &c.parameters.value {
        Some(value) => set(entity, field, value.clone()),
        None => changed(false),
    }
}

fn format_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let (Some(spec), Some(value)) = (&c.parameters.format, entity.properties.get(field)) else {
        return changed(false);
    };
    let formatted = format_value(value, spec, field)?;
    set(entity, field, formatted)
}

fn convert_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let target = *required(&c.parameters.target, c, "target")?;
    let Some(value) = entity.properties.get(field) else {
        return changed(false);
    };
    let converted = convert_value(value, target).ok_or_else(|| CorrectionError::Conversion {
        field: field.to_string(),
        target,
    })?;
    set(entity, field, converted)
}

fn adjust_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let params = &c.parameters;
    if params.adjustment.is_none() && params.min.is_none() && params.max.is_none() {
        return Err(CorrectionError::MissingParameter {
            strategy: c.strategy.as_str(),
            parameter: "adjustment",
        });
    }
    let Some(mut value) = numeric(entity, field)? else {
        return changed(false);
    };
    if let Some(adjustment) = params.adjustment {
        value += adjustment;
    }
    if let Some(min) = params.min {
        value = value.max(min);
    }
    if let Some(max) = params.max {
        value = value.min(max);
    }
    set(entity, field, PropertyValue::Number(value))
}

fn normalize_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    match entity.properties.get(field).and_then(PropertyValue::as_str) {
        Some(text) => {
            let normalized = text.trim().to_lowercase();
            set(entity, field, PropertyValue::String(normalized))
        }
        None => changed(false),
    }
}

fn standardize_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let replacement = entity
        .properties
        .get(field)
        .and_then(|value| c.parameters.mapping.get(&value.to_text()))
        .cloned();
    match replacement {
        Some(value) => set(entity, field, value),
        None => changed(false),
    }
}

fn validate_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let Some(value) = entity.properties.get(field) else {
        return changed(false);
    };
    let empty = value.is_null() || value.as_str().is_some_and(|s| s.trim().is_empty());
    let disallowed = !c.parameters.allowed.is_empty() && !is_allowed(&c.parameters.allowed, value);
    if empty || disallowed {
        return drop_field(entity, field);
    }
    changed(false)
}

fn enrich_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    if entity_field(entity, field).is_some() {
        return changed(false);
    }
    let key = c.parameters.source.as_deref().unwrap_or(field);
    match entity.metadata.get(key).filter(|v| !v.is_null()).cloned() {
        Some(value) => set(entity, field, value),
        None => changed(false),
    }
}

fn deduplicate_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let Some(items) = entity.properties.get(field).and_then(PropertyValue::as_list) else {
        return changed(false);
    };
    let mut unique: Vec<PropertyValue> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    set(entity, field, PropertyValue::List(unique))
}

fn merge_properties(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let incoming = required(&c.parameters.value, c, "value")?
        .as_map()
        .ok_or(CorrectionError::MissingParameter {
            strategy: c.strategy.as_str(),
            parameter: "value",
        })?;
    let mut merged = false;
    for (key, value) in incoming {
        if !entity.properties.contains_key(key) {
            entity.properties.insert(key.clone(), value.clone());
            merged = true;
        }
    }
    changed(merged)
}

fn split_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let separator = c.parameters.separator.as_deref().unwrap_or(",");
    let Some(text) = entity.properties.get(field).and_then(PropertyValue::as_str) else {
        return changed(false);
    };
    let parts: Vec<PropertyValue> = text
        .split(separator)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(PropertyValue::from)
        .collect();
    set(entity, field, PropertyValue::List(parts))
}

fn transform_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let factor = *required(&c.parameters.factor, c, "factor")?;
    match numeric(entity, field)? {
        Some(value) => set(entity, field, PropertyValue::Number(value * factor)),
        None => changed(false),
    }
}

fn calculate_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let operation = *required(&c.parameters.operation, c, "operation")?;
    if c.parameters.fields.len() < 2 {
        return Err(CorrectionError::MissingParameter {
            strategy: c.strategy.as_str(),
            parameter: "fields",
        });
    }

    let mut operands = Vec::with_capacity(c.parameters.fields.len());
    for name in &c.parameters.fields {
        let value = numeric(entity, name)?.ok_or_else(|| CorrectionError::MissingField(name.clone()))?;
        operands.push(value);
    }

    let first = operands[0];
    let rest = &operands[1..];
    let result = match operation {
        Operation::Sum => operands.iter().sum(),
        Operation::Product => operands.iter().product(),
        Operation::Difference => rest.iter().fold(first, |acc, v| acc - v),
        Operation::Ratio => {
            let divisor = rest[0];
            if divisor == 0.0 {
                return Err(CorrectionError::DivisionByZero(field.to_string()));
            }
            first / divisor
        }
    };
    set(entity, field, PropertyValue::Number(result))
}

fn infer_field(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    if entity.properties.contains_key(field) {
        return changed(false);
    }
    let inferred = c
        .parameters
        .fields
        .iter()
        .find_map(|candidate| entity_field(entity, candidate));
    match inferred {
        Some(value) => set(entity, field, value),
        None => changed(false),
    }
}

// ============================================================================
// Checks
// ============================================================================

fn validate_format(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let target = *required(&c.parameters.target, c, "target")?;
    match entity.properties.get(field) {
        Some(value) if convert_value(value, target).is_none() => drop_field(entity, field),
        _ => changed(false),
    }
}

fn validate_range(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    if c.parameters.min.is_none() && c.parameters.max.is_none() {
        return Err(CorrectionError::MissingParameter {
            strategy: c.strategy.as_str(),
            parameter: "min",
        });
    }
    let range = FieldRange {
        field: field.to_string(),
        min: c.parameters.min,
        max: c.parameters.max,
    };
    match entity.properties.get(field) {
        None => changed(false),
        Some(value) => match value.as_f64() {
            Some(number) if range.contains(number) => changed(false),
            _ => drop_field(entity, field),
        },
    }
}

fn validate_pattern(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let Some(pattern) = &c.parameters.pattern else {
        return changed(false);
    };
    let regex = anchored(pattern)?;
    match entity.properties.get(field) {
        Some(value) if !regex.is_match(&value.to_text()) => drop_field(entity, field),
        _ => changed(false),
    }
}

/// Drops a reference field that does not hold an entity id
fn validate_reference(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    match entity.properties.get(field) {
        Some(value) if Uuid::parse_str(value.to_text().trim()).is_err() => {
            drop_field(entity, field)
        }
        _ => changed(false),
    }
}

/// Fields that must agree; all of them are dropped when they do not
fn validate_consistency(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let fields = &c.parameters.fields;
    if fields.len() < 2 {
        return Err(CorrectionError::MissingParameter {
            strategy: c.strategy.as_str(),
            parameter: "fields",
        });
    }
    let values: Option<Vec<String>> = fields
        .iter()
        .map(|f| entity.properties.get(f).map(PropertyValue::to_text))
        .collect();
    match values {
        Some(values) if values.windows(2).any(|pair| pair[0] != pair[1]) => {
            for field in fields {
                entity.properties.remove(field);
            }
            changed(true)
        }
        _ => changed(false),
    }
}

fn validate_completeness(entity: &mut Entity, c: &Correction) -> HandlerResult {
    match c
        .parameters
        .fields
        .iter()
        .find(|field| entity_field(entity, field).is_none())
    {
        Some(missing) => rejected(format!("missing required field '{missing}'")),
        None => changed(false),
    }
}

fn validate_accuracy(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let reference = required(&c.parameters.value, c, "value")?
        .as_f64()
        .ok_or(CorrectionError::MissingParameter {
            strategy: c.strategy.as_str(),
            parameter: "value",
        })?;
    let tolerance = c.parameters.tolerance.unwrap_or(0.0);
    match numeric(entity, field)? {
        Some(value) if (value - reference).abs() > tolerance => drop_field(entity, field),
        _ => changed(false),
    }
}

fn validate_timeliness(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    let max_age = *required(&c.parameters.max_age_days, c, "max_age_days")?;
    let Some(value) = entity.properties.get(field) else {
        return changed(false);
    };
    let cutoff = Utc::now().date_naive() - Duration::days(max_age);
    match parse_date(value) {
        Some(date) if date >= cutoff => changed(false),
        _ => drop_field(entity, field),
    }
}

/// Rejects an entity whose field value is among values already taken
fn validate_uniqueness(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    match entity_field(entity, field) {
        Some(value) if is_allowed(&c.parameters.allowed, &value) => {
            rejected(format!("duplicate value '{}' for '{field}'", value.to_text()))
        }
        _ => changed(false),
    }
}

/// `fields = [start, end]`: the start date must not follow the end date
fn validate_integrity(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let [start, end] = c.parameters.fields.as_slice() else {
        return Err(CorrectionError::MissingParameter {
            strategy: c.strategy.as_str(),
            parameter: "fields",
        });
    };
    let (Some(start_value), Some(end_value)) =
        (entity.properties.get(start), entity.properties.get(end))
    else {
        return changed(false);
    };
    match (parse_date(start_value), parse_date(end_value)) {
        (Some(s), Some(e)) if s <= e => changed(false),
        (Some(_), Some(_)) => rejected(format!("'{start}' is after '{end}'")),
        _ => rejected(format!("'{start}' or '{end}' is not a date")),
    }
}

fn validate_conformity(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let field = field_of(c)?;
    if c.parameters.allowed.is_empty() {
        return Err(CorrectionError::MissingParameter {
            strategy: c.strategy.as_str(),
            parameter: "allowed",
        });
    }
    match entity.properties.get(field) {
        Some(value) if !is_allowed(&c.parameters.allowed, value) => drop_field(entity, field),
        _ => changed(false),
    }
}

/// `fields = [lower, upper]`: the first value must not exceed the second
fn validate_business_rules(entity: &mut Entity, c: &Correction) -> HandlerResult {
    let [lower, upper] = c.parameters.fields.as_slice() else {
        return Err(CorrectionError::MissingParameter {
            strategy: c.strategy.as_str(),
            parameter: "fields",
        });
    };
    match (numeric(entity, lower)?, numeric(entity, upper)?) {
        (Some(l), Some(u)) if l > u => rejected(format!("'{lower}' exceeds '{upper}'")),
        _ => changed(false),
    }
}

/// Shorthand for building a property map in correction parameters
pub fn mapping<I, K, V>(pairs: I) -> PropertyMap
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<PropertyValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fkg_core::EntityType;

    fn company() -> Entity {
        Entity::new(EntityType::Company, "XYZ Corp")
            .with_property("revenue", "1,000")
            .with_property("employees", 250_i64)
            .with_property("industry", "  Banking ")
    }

    fn correction(strategy: CorrectionStrategy, field: &str) -> Correction {
        Correction::new(strategy).with_field(field)
    }

    #[test]
    fn test_table_covers_every_strategy() {
        assert_eq!(strategies().count(), 28);
        assert!(handler_for(CorrectionStrategy::Unknown).is_none());
        assert!(handler_for(CorrectionStrategy::ValidateBusinessRules).is_some());
    }

    #[test]
    fn test_unknown_strategy_deserializes_and_is_noop() {
        let c: Correction = serde_json::from_str(r#"{"strategy": "teleport", "field": "x"}"#).unwrap();
        assert_eq!(c.strategy, CorrectionStrategy::Unknown);

        let mut entity = company();
        let before = entity.clone();
        assert_eq!(apply(&mut entity, &c), Ok(CorrectionOutcome::Unchanged));
        assert_eq!(entity, before);
    }

    #[test]
    fn test_add_does_not_overwrite() {
        let mut entity = company();
        let add = correction(CorrectionStrategy::Add, "employees").with_value(1_i64);
        assert_eq!(apply(&mut entity, &add), Ok(CorrectionOutcome::Unchanged));

        let add = correction(CorrectionStrategy::Add, "ticker").with_value("XYZ");
        assert_eq!(apply(&mut entity, &add), Ok(CorrectionOutcome::Applied));
        assert_eq!(entity.property("ticker").and_then(PropertyValue::as_str), Some("XYZ"));
    }

    #[test]
    fn test_failed_conversion_leaves_entity_untouched() {
        let mut entity = company().with_property("market_cap", "N/A");
        let before = entity.clone();
        let convert = correction(CorrectionStrategy::Convert, "market_cap").with_params(
            CorrectionParams {
                target: Some(ValueKind::Number),
                ..Default::default()
            },
        );
        let err = apply(&mut entity, &convert).unwrap_err();
        assert!(matches!(err, CorrectionError::Conversion { .. }));
        assert_eq!(entity, before);
    }

    #[test]
    fn test_convert_and_format() {
        let mut entity = company().with_property("revenue", "1000.456");
        let convert = correction(CorrectionStrategy::Convert, "revenue").with_params(CorrectionParams {
            target: Some(ValueKind::Number),
            ..Default::default()
        });
        assert_eq!(apply(&mut entity, &convert), Ok(CorrectionOutcome::Applied));

        let format = correction(CorrectionStrategy::Format, "revenue").with_params(CorrectionParams {
            format: Some(".2f".to_string()),
            ..Default::default()
        });
        apply(&mut entity, &format).unwrap();
        assert_eq!(entity.property("revenue"), Some(&PropertyValue::Number(1000.46)));
    }

    #[test]
    fn test_adjust_clamps_into_range() {
        let mut entity = company().with_property("employees", 0_i64);
        let adjust = correction(CorrectionStrategy::Adjust, "employees").with_params(CorrectionParams {
            min: Some(1.0),
            ..Default::default()
        });
        assert_eq!(apply(&mut entity, &adjust), Ok(CorrectionOutcome::Applied));
        assert_eq!(entity.property("employees").and_then(PropertyValue::as_f64), Some(1.0));
    }

    #[test]
    fn test_normalize_and_standardize() {
        let mut entity = company();
        apply(&mut entity, &correction(CorrectionStrategy::Normalize, "industry")).unwrap();
        assert_eq!(entity.property("industry").and_then(PropertyValue::as_str), Some("banking"));

        let standardize = correction(CorrectionStrategy::Standardize, "industry").with_params(
            CorrectionParams {
                mapping: mapping([("banking", "Financial Services")]),
                ..Default::default()
            },
        );
        apply(&mut entity, &standardize).unwrap();
        assert_eq!(
            entity.property("industry").and_then(PropertyValue::as_str),
            Some("Financial Services")
        );
    }

    #[test]
    fn test_split_then_deduplicate() {
        let mut entity = company().with_property("markets", "US, EU,US,,APAC");
        apply(&mut entity, &correction(CorrectionStrategy::Split, "markets")).unwrap();
        apply(&mut entity, &correction(CorrectionStrategy::Deduplicate, "markets")).unwrap();
        assert_eq!(
            entity.property("markets"),
            Some(&PropertyValue::from(vec!["US", "EU", "APAC"]))
        );
    }

    #[test]
    fn test_calculate_ratio() {
        let mut entity = company()
            .with_property("net_income", 50.0)
            .with_property("revenue", 200.0);
        let calc = correction(CorrectionStrategy::Calculate, "profit_margin").with_params(
            CorrectionParams {
                operation: Some(Operation::Ratio),
                fields: vec!["net_income".into(), "revenue".into()],
                ..Default::default()
            },
        );
        apply(&mut entity, &calc).unwrap();
        assert_eq!(entity.property("profit_margin").and_then(PropertyValue::as_f64), Some(0.25));

        entity.properties.insert("revenue".into(), 0.0.into());
        assert!(matches!(
            apply(&mut entity, &calc),
            Err(CorrectionError::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_validate_range_drops_bad_values() {
        let mut entity = company().with_property("coupon_rate", "abc");
        let check = correction(CorrectionStrategy::ValidateRange, "coupon_rate").with_params(
            CorrectionParams {
                min: Some(0.0),
                max: Some(100.0),
                ..Default::default()
            },
        );
        assert_eq!(apply(&mut entity, &check), Ok(CorrectionOutcome::Applied));
        assert!(entity.property("coupon_rate").is_none());
    }

    #[test]
    fn test_completeness_rejects_without_change() {
        let mut entity = company();
        let before = entity.clone();
        let check = Correction::new(CorrectionStrategy::ValidateCompleteness).with_params(
            CorrectionParams {
                fields: vec!["name".into(), "founding_date".into()],
                ..Default::default()
            },
        );
        let outcome = apply(&mut entity, &check).unwrap();
        assert!(matches!(outcome, CorrectionOutcome::Rejected { .. }));
        assert_eq!(entity, before);
    }

    #[test]
    fn test_integrity_checks_date_order() {
        let mut entity = Entity::new(EntityType::Person, "Jane")
            .with_property("birth_date", "1990-05-01")
            .with_property("death_date", "1980-01-01");
        let check = Correction::new(CorrectionStrategy::ValidateIntegrity).with_params(
            CorrectionParams {
                fields: vec!["birth_date".into(), "death_date".into()],
                ..Default::default()
            },
        );
        assert!(matches!(
            apply(&mut entity, &check),
            Ok(CorrectionOutcome::Rejected { .. })
        ));
    }

    #[test]
    fn test_missing_parameter_is_an_error() {
        let mut entity = company();
        let convert = correction(CorrectionStrategy::Convert, "revenue");
        assert_eq!(
            apply(&mut entity, &convert),
            Err(CorrectionError::MissingParameter {
                strategy: "convert",
                parameter: "target"
            })
        );
    }

    #[test]
    fn test_update_and_format_without_parameters_are_noops() {
        let mut entity = company();
        let before = entity.clone();
        let update = correction(CorrectionStrategy::Update, "industry");
        let format = correction(CorrectionStrategy::Format, "industry").with_params(CorrectionParams {
            pattern: Some("[A-Z]+".into()),
            ..Default::default()
        });
        assert_eq!(apply(&mut entity, &update), Ok(CorrectionOutcome::Unchanged));
        assert_eq!(apply(&mut entity, &format), Ok(CorrectionOutcome::Unchanged));
        assert_eq!(entity, before);
    }
}
