//! Relationship metadata analysis
//!
//! Lexicon and regex driven descriptors attached to every relationship
//! candidate: indicator flags, sentiment, certainty and, depending on the
//! relationship kind, structured financial, transactional, geographic,
//! intellectual-property or regulatory details.

use std::collections::HashSet;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::patterns::{
    FlagSet, LexiconCategory, COMPLIANCE_DETAILS, FINANCIAL_DETAILS, FINANCIAL_METRIC_PATTERNS,
    FINANCIAL_RATIO_PATTERNS, FINANCIAL_TREND_PATTERNS, GEOGRAPHIC_DETAILS, HIGH_CERTAINTY_TERMS,
    IP_DETAILS, IP_VALUATION_DETAILS, LOCATION_DETAILS, LOW_CERTAINTY_TERMS, NEGATIVE_TERMS,
    NEUTRAL_TERMS, POSITIVE_TERMS, QUANTITATIVE_INDICATORS, REGULATORY_DETAILS, SYNERGY_DETAILS,
    TEMPORAL_INDICATORS, TRANSACTION_DETAILS, VALUATION_DETAILS,
};
use crate::EntityCandidate;
use fkg_core::{PropertyMap, PropertyValue, RelationshipType};

// ============================================================================
// Flag Sets
// ============================================================================

struct CompiledFlags {
    name: &'static str,
    flags: Vec<(&'static str, Regex)>,
}

impl CompiledFlags {
    fn compile(set: &FlagSet) -> Self {
        Self {
            name: set.name,
            flags: set
                .flags
                .iter()
                .filter_map(|(flag, pattern)| Regex::new(pattern).ok().map(|r| (*flag, r)))
                .collect(),
        }
    }
}

static FLAG_SETS: Lazy<Vec<CompiledFlags>> = Lazy::new(|| {
    [
        TEMPORAL_INDICATORS,
        QUANTITATIVE_INDICATORS,
        FINANCIAL_DETAILS,
        TRANSACTION_DETAILS,
        VALUATION_DETAILS,
        SYNERGY_DETAILS,
        LOCATION_DETAILS,
        GEOGRAPHIC_DETAILS,
        IP_DETAILS,
        IP_VALUATION_DETAILS,
        REGULATORY_DETAILS,
        COMPLIANCE_DETAILS,
    ]
    .iter()
    .map(CompiledFlags::compile)
    .collect()
});

/// Evaluate every flag of `set` against `text`
pub fn evaluate_flags(set: &FlagSet, text: &str) -> PropertyMap {
    FLAG_SETS
        .iter()
        .find(|compiled| compiled.name == set.name)
        .map(|compiled| {
            compiled
                .flags
                .iter()
                .map(|(flag, regex)| (flag.to_string(), PropertyValue::Bool(regex.is_match(text))))
                .collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// Sentiment and Certainty
// ============================================================================

fn word_set(text: &str) -> HashSet<String> {
    text.to_lowercase().split_whitespace().map(str::to_string).collect()
}

fn score_bucket(words: &HashSet<String>, categories: &[LexiconCategory]) -> (i64, PropertyMap) {
    let mut count = 0;
    let mut matched = PropertyMap::new();
    for category in categories {
        let terms: Vec<&str> = category
            .terms
            .iter()
            .copied()
            .filter(|t| words.contains(*t))
            .collect();
        if terms.is_empty() {
            continue;
        }
        count += terms.len() as i64;
        let mut detail = PropertyMap::new();
        detail.insert("count".to_string(), PropertyValue::from(terms.len()));
        detail.insert("terms".to_string(), PropertyValue::from(terms));
        matched.insert(category.name.to_string(), PropertyValue::Map(detail));
    }
    (count, matched)
}

/// Lexicon hit counts per polarity and the resulting overall sentiment
pub fn analyze_sentiment(text: &str) -> PropertyMap {
    let words = word_set(text);
    let mut result = PropertyMap::new();
    let mut score = 0;

    for (name, categories, sign) in [
        ("positive", POSITIVE_TERMS, 1),
        ("negative", NEGATIVE_TERMS, -1),
        ("neutral", NEUTRAL_TERMS, 0),
    ] {
        let (count, matched) = score_bucket(&words, categories);
        score += sign * count;
        let mut bucket = PropertyMap::new();
        bucket.insert("count".to_string(), PropertyValue::from(count));
        bucket.insert("categories".to_string(), PropertyValue::Map(matched));
        result.insert(name.to_string(), PropertyValue::Map(bucket));
    }

    let overall = match score {
        s if s > 0 => "positive",
        s if s < 0 => "negative",
        _ => "neutral",
    };
    result.insert("overall_sentiment".to_string(), PropertyValue::from(overall));
    result.insert("sentiment_score".to_string(), PropertyValue::from(score));
    result
}

/// High and low certainty vocabulary present in `text`
pub fn analyze_certainty(text: &str) -> PropertyMap {
    let words = word_set(text);
    let high: Vec<&str> = HIGH_CERTAINTY_TERMS.iter().copied().filter(|t| words.contains(*t)).collect();
    let low: Vec<&str> = LOW_CERTAINTY_TERMS.iter().copied().filter(|t| words.contains(*t)).collect();

    let mut result = PropertyMap::new();
    result.insert("is_high_certainty".to_string(), PropertyValue::Bool(!high.is_empty()));
    result.insert("is_low_certainty".to_string(), PropertyValue::Bool(!low.is_empty()));
    result.insert(
        "certainty_words".to_string(),
        PropertyValue::from(high.into_iter().chain(low).collect::<Vec<_>>()),
    );
    result
}

// ============================================================================
// Named-capture Families
// ============================================================================

struct CompiledFamily {
    patterns: Vec<(&'static str, Regex)>,
}

impl CompiledFamily {
    fn compile(patterns: &[&'static str]) -> Self {
        Self {
            patterns: patterns
                .iter()
                .filter_map(|p| Regex::new(&format!("(?i){p}")).ok().map(|r| (*p, r)))
                .collect(),
        }
    }
}

static METRIC_FAMILY: Lazy<CompiledFamily> = Lazy::new(|| CompiledFamily::compile(FINANCIAL_METRIC_PATTERNS));
static RATIO_FAMILY: Lazy<CompiledFamily> = Lazy::new(|| CompiledFamily::compile(FINANCIAL_RATIO_PATTERNS));
static TREND_FAMILY: Lazy<CompiledFamily> = Lazy::new(|| CompiledFamily::compile(FINANCIAL_TREND_PATTERNS));

fn group(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name).map(|m| m.as_str().trim().to_string())
}

fn push_entry(out: &mut PropertyMap, key: String, entry: PropertyMap) {
    match out.entry(key).or_insert_with(|| PropertyValue::List(Vec::new())) {
        PropertyValue::List(items) => items.push(PropertyValue::Map(entry)),
        other => *other = PropertyValue::List(vec![PropertyValue::Map(entry)]),
    }
}

fn value_entry(value: String, value2: Option<String>, pattern: &str) -> PropertyMap {
    let mut entry = PropertyMap::new();
    entry.insert("value".to_string(), PropertyValue::from(value));
    entry.insert(
        "type".to_string(),
        PropertyValue::from(if value2.is_some() { "range" } else { "single" }),
    );
    if let Some(value2) = value2 {
        entry.insert("value2".to_string(), PropertyValue::from(value2));
    }
    entry.insert("pattern".to_string(), PropertyValue::from(pattern));
    entry
}

/// Metric phrases keyed by metric name
pub fn extract_financial_metrics(text: &str) -> PropertyMap {
    let mut metrics = PropertyMap::new();
    for (pattern, regex) in &METRIC_FAMILY.patterns {
        for caps in regex.captures_iter(text) {
            let (Some(metric), Some(value)) = (group(&caps, "metric"), group(&caps, "value")) else {
                continue;
            };
            push_entry(&mut metrics, metric, value_entry(value, group(&caps, "value2"), pattern));
        }
    }
    metrics
}

/// Ratio phrases keyed `"{numerator}_to_{denominator}"`
pub fn extract_financial_ratios(text: &str) -> PropertyMap {
    let mut ratios = PropertyMap::new();
    for (pattern, regex) in &RATIO_FAMILY.patterns {
        for caps in regex.captures_iter(text) {
            let (Some(numerator), Some(denominator), Some(value)) = (
                group(&caps, "numerator"),
                group(&caps, "denominator"),
                group(&caps, "value"),
            ) else {
                continue;
            };
            let key = format!("{numerator}_to_{denominator}");
            let mut entry = value_entry(value, group(&caps, "value2"), pattern);
            entry.insert("numerator".to_string(), PropertyValue::from(numerator));
            entry.insert("denominator".to_string(), PropertyValue::from(denominator));
            push_entry(&mut ratios, key, entry);
        }
    }
    ratios
}

/// Trend phrases keyed by metric name
pub fn extract_financial_trends(text: &str) -> PropertyMap {
    let mut trends = PropertyMap::new();
    for (pattern, regex) in &TREND_FAMILY.patterns {
        for caps in regex.captures_iter(text) {
            let (Some(metric), Some(value)) = (group(&caps, "metric"), group(&caps, "value")) else {
                continue;
            };
            let mut entry = PropertyMap::new();
            entry.insert("value".to_string(), PropertyValue::from(value));
            entry.insert("pattern".to_string(), PropertyValue::from(*pattern));
            push_entry(&mut trends, metric, entry);
        }
    }
    trends
}

// ============================================================================
// Relationship Metadata
// ============================================================================

/// Build the metadata map of one relationship candidate.
///
/// `context` is the text spanning both entities; temporal indicators are
/// read from the containing `sentence`.
pub fn relationship_metadata(
    context: &str,
    sentence: &str,
    source: &EntityCandidate,
    target: &EntityCandidate,
    relation: RelationshipType,
) -> PropertyMap {
    let mut metadata = PropertyMap::new();
    let mut put = |key: &str, value: PropertyValue| {
        metadata.insert(key.to_string(), value);
    };

    put("context", context.into());
    put("detected_at", Utc::now().to_rfc3339().into());
    put("source_type", source.entity_type.as_str().into());
    put("target_type", target.entity_type.as_str().into());
    put("source_text", source.text.as_str().into());
    put("target_text", target.text.as_str().into());
    put("sentence", sentence.into());
    put(TEMPORAL_INDICATORS.name, evaluate_flags(&TEMPORAL_INDICATORS, sentence).into());
    put(QUANTITATIVE_INDICATORS.name, evaluate_flags(&QUANTITATIVE_INDICATORS, context).into());
    put("sentiment", analyze_sentiment(context).into());
    put("certainty", analyze_certainty(context).into());

    use RelationshipType::*;
    match relation {
        HasMetric | HasRevenue | HasProfit | HasAsset | HasLiability => {
            put(FINANCIAL_DETAILS.name, evaluate_flags(&FINANCIAL_DETAILS, context).into());
            put("financial_metrics", extract_financial_metrics(context).into());
            put("financial_ratios", extract_financial_ratios(context).into());
            put("financial_trends", extract_financial_trends(context).into());
        }
        Acquires | MergesWith | JointVenture | StrategicAlliance => {
            for set in [TRANSACTION_DETAILS, VALUATION_DETAILS, SYNERGY_DETAILS] {
                put(set.name, evaluate_flags(&set, context).into());
            }
        }
        OperatesIn | HeadquarteredIn | HasOfficeIn => {
            for set in [LOCATION_DETAILS, GEOGRAPHIC_DETAILS] {
                put(set.name, evaluate_flags(&set, context).into());
            }
        }
        HasPatent | HasTrademark | HasLicense => {
            for set in [IP_DETAILS, IP_VALUATION_DETAILS] {
                put(set.name, evaluate_flags(&set, context).into());
            }
        }
        RegulatedBy | CertifiedBy | CompliesWith => {
            for set in [REGULATORY_DETAILS, COMPLIANCE_DETAILS] {
                put(set.name, evaluate_flags(&set, context).into());
            }
        }
        _ => {}
    }

    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use fkg_core::EntityType;

    fn flag(map: &PropertyMap, name: &str) -> bool {
        matches!(map.get(name), Some(PropertyValue::Bool(true)))
    }

    #[test]
    fn test_temporal_flags() {
        let flags = evaluate_flags(&TEMPORAL_INDICATORS, "Annual report for 2023, quarterly review planned");
        assert!(flag(&flags, "has_date"));
        assert!(flag(&flags, "has_time_period"));
        assert!(flag(&flags, "is_future"));
        assert!(!flag(&flags, "is_historical"));
        assert_eq!(flags.len(), 4);
    }

    #[test]
    fn test_financial_details_currency() {
        let flags = evaluate_flags(&FINANCIAL_DETAILS, "sales of €12 million, up from last year");
        assert!(flag(&flags, "has_currency"));
        assert!(flag(&flags, "is_growth"));
        assert!(!flag(&flags, "has_percentage"));
    }

    #[test]
    fn test_sentiment_polarity() {
        let sentiment = analyze_sentiment("Strong revenue growth despite debt");
        assert_eq!(sentiment["overall_sentiment"].as_str(), Some("positive"));
        assert_eq!(sentiment["sentiment_score"].as_f64(), Some(2.0));

        let positive = sentiment["positive"].as_map().unwrap();
        assert_eq!(positive["count"].as_f64(), Some(3.0));
        let categories = positive["categories"].as_map().unwrap();
        assert!(categories.contains_key("growth"));
        assert!(categories.contains_key("strength"));

        let neutral = analyze_sentiment("nothing to see");
        assert_eq!(neutral["overall_sentiment"].as_str(), Some("neutral"));
    }

    #[test]
    fn test_certainty() {
        let certainty = analyze_certainty("The deal is confirmed but synergies may lag");
        assert_eq!(certainty["is_high_certainty"], PropertyValue::Bool(true));
        assert_eq!(certainty["is_low_certainty"], PropertyValue::Bool(true));
        assert_eq!(certainty["certainty_words"].as_list().map(<[_]>::len), Some(2));
    }

    #[test]
    fn test_metric_family() {
        let metrics = extract_financial_metrics("revenue of $10 million");
        let entries = metrics["revenue"].as_list().unwrap();
        let first = entries[0].as_map().unwrap();
        assert_eq!(first["value"].as_str(), Some("$10 million"));
        assert_eq!(first["type"].as_str(), Some("single"));
    }

    #[test]
    fn test_range_metric() {
        let metrics = extract_financial_metrics("guidance between 40 and 45");
        let entry = metrics["guidance"].as_list().unwrap()[0].as_map().unwrap();
        assert_eq!(entry["type"].as_str(), Some("range"));
        assert_eq!(entry["value2"].as_str(), Some("45"));
    }

    #[test]
    fn test_trend_family() {
        let trends = extract_financial_trends("Sales have grown by 8% annually");
        assert!(trends.contains_key("Sales"));
    }

    #[test]
    fn test_type_specific_blocks() {
        let source = EntityCandidate::new("Acme Corp", EntityType::Company, 0.95, 1, 0, 9);
        let target = EntityCandidate::new("London", EntityType::Location, 0.8, 1, 30, 36);
        let context = "Acme Corp is headquartered in London";

        let located = relationship_metadata(context, context, &source, &target, RelationshipType::HeadquarteredIn);
        assert!(located.contains_key("location_details"));
        assert!(located.contains_key("geographic_details"));
        assert!(!located.contains_key("financial_details"));

        let plain = relationship_metadata(context, context, &source, &target, RelationshipType::WorksFor);
        for key in ["context", "sentence", "temporal_indicators", "quantitative_indicators", "sentiment", "certainty"] {
            assert!(plain.contains_key(key), "missing {key}");
        }
        assert!(!plain.contains_key("location_details"));
    }
}
