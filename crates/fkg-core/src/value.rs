//! Typed property bags for entities, relationships and metadata.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Property bag keyed by field name
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A single property value
///
/// Serializes untagged, so a property map reads and writes as a plain
/// JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<PropertyValue>),
    Map(PropertyMap),
}

/// Kinds a value can be converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Number,
    Integer,
    Bool,
    Date,
}

impl PropertyValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropertyValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Fallible numeric view: numbers as-is, strings trimmed and parsed,
    /// booleans as 0/1. NaN is never returned.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Self::Number(n) => *n,
            Self::String(s) => s.trim().parse::<f64>().ok()?,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Null | Self::List(_) | Self::Map(_) => return None,
        };
        (!value.is_nan()).then_some(value)
    }

    /// True when the value holds `item`: list element, map key or equal string
    pub fn contains_item(&self, item: &str) -> bool {
        match self {
            Self::List(items) => items.iter().any(|v| v.as_str() == Some(item)),
            Self::Map(map) => map.contains_key(item),
            Self::String(s) => s == item,
            _ => false,
        }
    }

    /// Text form used for pattern checks
    pub fn to_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format_number(*n),
            Self::String(s) => s.clone(),
            Self::List(_) | Self::Map(_) => self.to_json_text(),
        }
    }

    /// Compact JSON encoding of the value
    pub fn to_json_text(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    fn is_scalar(&self) -> bool {
        !matches!(self, Self::List(_) | Self::Map(_))
    }

    /// Collapse nested structures into something a primitive-only store accepts.
    ///
    /// Scalars and lists of scalars pass through; maps and nested lists
    /// become JSON text.
    pub fn flatten(&self) -> PropertyValue {
        match self {
            Self::List(items) if items.iter().all(PropertyValue::is_scalar) => self.clone(),
            Self::List(_) | Self::Map(_) => Self::String(self.to_json_text()),
            scalar => scalar.clone(),
        }
    }

    /// True when the value is storable without flattening
    pub fn is_storable(&self) -> bool {
        match self {
            Self::List(items) => items.iter().all(PropertyValue::is_scalar),
            Self::Map(_) => false,
            _ => true,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Flatten every value of a property map
pub fn flatten_properties(props: &PropertyMap) -> PropertyMap {
    props
        .iter()
        .map(|(k, v)| (k.clone(), v.flatten()))
        .collect()
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<usize> for PropertyValue {
    fn from(value: usize) -> Self {
        Self::Number(value as f64)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl From<PropertyMap> for PropertyValue {
    fn from(map: PropertyMap) -> Self {
        Self::Map(map)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => n.as_f64().map_or(Self::Null, Self::Number),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Into::into).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_as_f64_is_fallible() {
        assert_eq!(PropertyValue::from(" 42.5 ").as_f64(), Some(42.5));
        assert_eq!(PropertyValue::from(7_i64).as_f64(), Some(7.0));
        assert_eq!(PropertyValue::from("N/A").as_f64(), None);
        assert_eq!(PropertyValue::from("NaN").as_f64(), None);
        assert_eq!(PropertyValue::Null.as_f64(), None);
    }

    #[test]
    fn test_untagged_json_shape() {
        let value: PropertyValue = serde_json::from_value(json!({
            "name": "XYZ Corp",
            "employees": 120,
            "listed": true,
            "documents": ["prospectus"],
            "extra": null
        }))
        .unwrap();

        let map = value.as_map().unwrap();
        assert_eq!(map["name"], PropertyValue::from("XYZ Corp"));
        assert_eq!(map["employees"], PropertyValue::Number(120.0));
        assert_eq!(map["listed"], PropertyValue::Bool(true));
        assert!(map["documents"].contains_item("prospectus"));
        assert!(map["extra"].is_null());
    }

    #[test]
    fn test_flatten_keeps_scalar_lists() {
        let scalar_list = PropertyValue::from(vec!["a", "b"]);
        assert_eq!(scalar_list.flatten(), scalar_list);

        let mut nested = PropertyMap::new();
        nested.insert("has_date".to_string(), true.into());
        let flat = PropertyValue::Map(nested).flatten();
        assert_eq!(flat, PropertyValue::from(r#"{"has_date":true}"#));
        assert!(flat.is_storable());
    }

    #[test]
    fn test_number_text_drops_integral_fraction() {
        assert_eq!(PropertyValue::Number(5.0).to_text(), "5");
        assert_eq!(PropertyValue::Number(2.5).to_text(), "2.5");
    }
}
