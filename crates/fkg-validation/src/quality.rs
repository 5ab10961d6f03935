//! Quality control: weighted quality metrics over a bounded history
//!
//! Metrics are appended per `(metric type, entity type)` series and to the
//! global series. Every query reads a time window of those series.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Duration, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use fkg_core::{EntityType, FkgError, PropertyMap, PropertyValue, QualityConfig};

// ============================================================================
// Metric Types
// ============================================================================

/// Dimensions of data quality
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMetricType {
    Completeness,
    Consistency,
    Accuracy,
    Timeliness,
    Validity,
    Reliability,
    Integrity,
    Conformity,
    Uniqueness,
    BusinessRules,
}

impl QualityMetricType {
    pub const ALL: [QualityMetricType; 10] = [
        Self::Completeness,
        Self::Consistency,
        Self::Accuracy,
        Self::Timeliness,
        Self::Validity,
        Self::Reliability,
        Self::Integrity,
        Self::Conformity,
        Self::Uniqueness,
        Self::BusinessRules,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completeness => "completeness",
            Self::Consistency => "consistency",
            Self::Accuracy => "accuracy",
            Self::Timeliness => "timeliness",
            Self::Validity => "validity",
            Self::Reliability => "reliability",
            Self::Integrity => "integrity",
            Self::Conformity => "conformity",
            Self::Uniqueness => "uniqueness",
            Self::BusinessRules => "business_rules",
        }
    }

    /// Weight in the aggregate quality score. The weights sum to 1.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Completeness => 0.20,
            Self::Consistency | Self::Accuracy => 0.15,
            Self::Timeliness | Self::Validity | Self::Reliability => 0.10,
            Self::Integrity | Self::Conformity | Self::Uniqueness | Self::BusinessRules => 0.05,
        }
    }
}

impl fmt::Display for QualityMetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityMetricType {
    type Err = FkgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| FkgError::ValidationError(format!("Unknown quality metric: {s}")))
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// One measurement of a quality dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetric {
    #[serde(rename = "type")]
    pub metric_type: QualityMetricType,
    pub value: f64,
    pub threshold: f64,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: PropertyMap,
    #[serde(default = "full_confidence")]
    pub confidence_score: f64,
    #[serde(default)]
    pub affected_entities: Vec<Uuid>,
    #[serde(default)]
    pub affected_relationships: Vec<Uuid>,
}

fn full_confidence() -> f64 {
    1.0
}

impl QualityMetric {
    pub fn new(metric_type: QualityMetricType, value: f64, threshold: f64) -> Self {
        Self {
            metric_type,
            value,
            threshold,
            timestamp: Utc::now(),
            details: PropertyMap::new(),
            confidence_score: 1.0,
            affected_entities: Vec::new(),
            affected_relationships: Vec::new(),
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    pub fn with_affected_entity(mut self, id: Uuid) -> Self {
        self.affected_entities.push(id);
        self
    }

    pub fn with_affected_relationship(mut self, id: Uuid) -> Self {
        self.affected_relationships.push(id);
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn is_below_threshold(&self) -> bool {
        self.value < self.threshold
    }
}

/// Weighted mean of metric values.
///
/// Weights of absent metric types are left out of both sums; no metrics
/// score 0.0.
pub fn weighted_score<'a>(metrics: impl IntoIterator<Item = &'a QualityMetric>) -> f64 {
    let (sum, weights) = metrics
        .into_iter()
        .fold((0.0, 0.0), |(sum, weights), metric| {
            let weight = metric.metric_type.weight();
            (sum + metric.value * weight, weights + weight)
        });
    if weights > 0.0 {
        sum / weights
    } else {
        0.0
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// Summary of a metric series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricStats {
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    /// Least-squares slope per observation
    pub trend: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricStats {
    /// `None` for an empty series
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let series = Array1::from_vec(values.to_vec());
        let mean = series.mean()?;
        let std = series.std(0.0);

        let x = Array1::range(0.0, values.len() as f64, 1.0);
        let dx = &x - x.mean()?;
        let dy = &series - mean;
        let spread = dx.dot(&dx);
        let trend = if spread > 0.0 { dx.dot(&dy) / spread } else { 0.0 };

        Some(Self {
            mean,
            std,
            trend,
            min: series.fold(f64::INFINITY, |acc, v| acc.min(*v)),
            max: series.fold(f64::NEG_INFINITY, |acc, v| acc.max(*v)),
        })
    }
}

/// Pearson correlation of two equally long series of at least two points
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let a = Array1::from_vec(a.to_vec());
    let b = Array1::from_vec(b.to_vec());
    let da = &a - a.mean()?;
    let db = &b - b.mean()?;
    let denominator = (da.dot(&da) * db.dot(&db)).sqrt();
    (denominator > 0.0).then(|| da.dot(&db) / denominator)
}

// ============================================================================
// Report Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricCorrelation {
    pub first: QualityMetricType,
    pub second: QualityMetricType,
    pub coefficient: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityRecommendation {
    pub metric: QualityMetricType,
    pub current_value: f64,
    pub threshold: f64,
    pub suggestion: String,
}

/// Current state of quality for an entity type, or globally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub entity_type: Option<EntityType>,
    pub score: f64,
    pub metrics: BTreeMap<QualityMetricType, QualityMetric>,
    pub trends: BTreeMap<QualityMetricType, MetricStats>,
    pub correlations: Vec<MetricCorrelation>,
    pub recommendations: Vec<QualityRecommendation>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityTrend {
    pub metric: QualityMetricType,
    pub entity_type: Option<EntityType>,
    pub values: Vec<f64>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub stats: Option<MetricStats>,
    pub current: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAnomaly {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub expected_range: (f64, f64),
    pub deviation: f64,
    pub details: PropertyMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkStatus {
    Good,
    NeedsImprovement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityBenchmark {
    pub metric: QualityMetricType,
    pub current: f64,
    pub average: f64,
    pub best: f64,
    pub worst: f64,
    pub threshold: f64,
    pub status: BenchmarkStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

/// A remediation step for an under-threshold metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Remediation {
    pub action: String,
    pub priority: Priority,
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricImpact {
    pub current_value: f64,
    pub threshold: f64,
    pub gap: f64,
    pub impact_score: f64,
    pub affected_entities: Vec<Uuid>,
    pub affected_relationships: Vec<Uuid>,
    pub recommendations: Vec<Remediation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactAnalysis {
    pub entity_type: Option<EntityType>,
    pub impact_scores: BTreeMap<QualityMetricType, MetricImpact>,
    pub total_impact: f64,
    /// Under-threshold metrics, highest impact first
    pub priority_areas: Vec<QualityMetricType>,
}

fn detail_targets(metric: &QualityMetric, key: &str) -> Vec<String> {
    match metric.details.get(key) {
        Some(PropertyValue::List(items)) => items.iter().map(PropertyValue::to_text).collect(),
        Some(PropertyValue::Null) | None => Vec::new(),
        Some(other) => vec![other.to_text()],
    }
}

/// Category-specific remediation for a metric below its threshold
fn remediation(metric: &QualityMetric) -> Vec<Remediation> {
    let (action, targets, high_below) = match metric.metric_type {
        QualityMetricType::Completeness => (
            "add_missing_fields",
            metric.affected_entities.iter().map(Uuid::to_string).collect(),
            0.5,
        ),
        QualityMetricType::Consistency => (
            "standardize_values",
            detail_targets(metric, "inconsistent_fields"),
            0.7,
        ),
        QualityMetricType::Accuracy => {
            ("correct_errors", detail_targets(metric, "validation_errors"), 0.8)
        }
        QualityMetricType::Timeliness => ("update_data", detail_targets(metric, "stale_data"), 0.6),
        QualityMetricType::Validity => {
            ("validate_data", detail_targets(metric, "invalid_values"), 0.9)
        }
        _ => return Vec::new(),
    };
    vec![Remediation {
        action: action.to_string(),
        priority: if metric.value < high_below {
            Priority::High
        } else {
            Priority::Medium
        },
        targets,
    }]
}

// ============================================================================
// Quality Control Service
// ============================================================================

type SeriesKey = (QualityMetricType, Option<EntityType>);

/// Tracks quality metrics and answers quality queries
#[derive(Debug)]
pub struct QualityControl {
    config: QualityConfig,
    history: RwLock<HashMap<SeriesKey, VecDeque<QualityMetric>>>,
}

impl QualityControl {
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config,
            history: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    fn cutoff(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }

    fn prune(&self, series: &mut VecDeque<QualityMetric>) {
        let cutoff = Self::cutoff(self.config.history_days);
        series.retain(|m| m.timestamp >= cutoff);
        while series.len() > self.config.max_history_entries {
            series.pop_front();
        }
    }

    /// Record a metric for an entity type, and in the global series
    pub fn update_quality_metric(&self, metric: QualityMetric, entity_type: Option<EntityType>) {
        let mut history = self.history.write().unwrap_or_else(PoisonError::into_inner);
        let mut keys = vec![(metric.metric_type, None)];
        if entity_type.is_some() {
            keys.push((metric.metric_type, entity_type));
        }
        for key in keys {
            let series = history.entry(key).or_default();
            series.push_back(metric.clone());
            self.prune(series);
        }
        debug!(
            metric = %metric.metric_type,
            value = metric.value,
            entity_type = ?entity_type,
            "Quality metric recorded"
        );
    }

    pub fn update_quality_metrics(&self, metrics: &[QualityMetric], entity_type: Option<EntityType>) {
        for metric in metrics {
            self.update_quality_metric(metric.clone(), entity_type);
        }
    }

    /// Metrics of one series within the last `days` days, oldest first
    pub fn history(
        &self,
        metric_type: QualityMetricType,
        entity_type: Option<EntityType>,
        days: i64,
    ) -> Vec<QualityMetric> {
        let cutoff = Self::cutoff(days);
        let history = self.history.read().unwrap_or_else(PoisonError::into_inner);
        history
            .get(&(metric_type, entity_type))
            .map(|series| {
                series
                    .iter()
                    .filter(|m| m.timestamp >= cutoff)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn values(&self, metric_type: QualityMetricType, entity_type: Option<EntityType>, days: i64) -> Vec<f64> {
        self.history(metric_type, entity_type, days)
            .iter()
            .map(|m| m.value)
            .collect()
    }

    /// Latest metric of each type
    pub fn current_metrics(
        &self,
        entity_type: Option<EntityType>,
    ) -> BTreeMap<QualityMetricType, QualityMetric> {
        let history = self.history.read().unwrap_or_else(PoisonError::into_inner);
        QualityMetricType::ALL
            .iter()
            .filter_map(|kind| {
                history
                    .get(&(*kind, entity_type))
                    .and_then(|series| series.back())
                    .map(|metric| (*kind, metric.clone()))
            })
            .collect()
    }

    /// Weighted score of the current metrics
    pub fn calculate_quality_score(&self, entity_type: Option<EntityType>) -> f64 {
        weighted_score(self.current_metrics(entity_type).values())
    }

    pub fn get_quality_report(&self, entity_type: Option<EntityType>) -> QualityReport {
        let days = self.config.history_days;
        let metrics = self.current_metrics(entity_type);

        let series: BTreeMap<QualityMetricType, Vec<f64>> = metrics
            .keys()
            .map(|kind| (*kind, self.values(*kind, entity_type, days)))
            .collect();

        let trends = series
            .iter()
            .filter_map(|(kind, values)| MetricStats::from_values(values).map(|s| (*kind, s)))
            .collect();

        let kinds: Vec<_> = series.keys().copied().collect();
        let mut correlations = Vec::new();
        for (i, first) in kinds.iter().enumerate() {
            for second in &kinds[i + 1..] {
                if let Some(coefficient) = pearson(&series[first], &series[second]) {
                    correlations.push(MetricCorrelation {
                        first: *first,
                        second: *second,
                        coefficient,
                    });
                }
            }
        }

        let recommendations = metrics
            .values()
            .filter(|m| m.is_below_threshold())
            .map(|m| {
                let affected = if m.affected_entities.is_empty() {
                    "the affected records".to_string()
                } else {
                    m.affected_entities
                        .iter()
                        .map(Uuid::to_string)
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                QualityRecommendation {
                    metric: m.metric_type,
                    current_value: m.value,
                    threshold: m.threshold,
                    suggestion: format!(
                        "Improve {} quality by addressing issues in {affected}",
                        m.metric_type
                    ),
                }
            })
            .collect();

        QualityReport {
            entity_type,
            score: weighted_score(metrics.values()),
            metrics,
            trends,
            correlations,
            recommendations,
            timestamp: Utc::now(),
        }
    }

    pub fn get_quality_trends(
        &self,
        metric_type: QualityMetricType,
        entity_type: Option<EntityType>,
        days: i64,
    ) -> QualityTrend {
        let history = self.history(metric_type, entity_type, days);
        let values: Vec<f64> = history.iter().map(|m| m.value).collect();
        QualityTrend {
            metric: metric_type,
            entity_type,
            stats: MetricStats::from_values(&values),
            current: values.last().copied(),
            timestamps: history.iter().map(|m| m.timestamp).collect(),
            values,
        }
    }

    /// Points further than `anomaly_sigma` standard deviations from the mean
    pub fn get_quality_anomalies(
        &self,
        metric_type: QualityMetricType,
        entity_type: Option<EntityType>,
        days: i64,
    ) -> Vec<QualityAnomaly> {
        let history = self.history(metric_type, entity_type, days);
        let values: Vec<f64> = history.iter().map(|m| m.value).collect();
        let Some(stats) = MetricStats::from_values(&values) else {
            return Vec::new();
        };
        let band = self.config.anomaly_sigma * stats.std;

        history
            .into_iter()
            .filter(|m| (m.value - stats.mean).abs() > band)
            .map(|m| QualityAnomaly {
                timestamp: m.timestamp,
                value: m.value,
                expected_range: (stats.mean - band, stats.mean + band),
                deviation: (m.value - stats.mean).abs(),
                details: m.details,
            })
            .collect()
    }

    pub fn get_quality_benchmarks(
        &self,
        metric_type: QualityMetricType,
        entity_type: Option<EntityType>,
        days: i64,
    ) -> Option<QualityBenchmark> {
        let history = self.history(metric_type, entity_type, days);
        let latest = history.last()?;
        let values: Vec<f64> = history.iter().map(|m| m.value).collect();
        let stats = MetricStats::from_values(&values)?;
        Some(QualityBenchmark {
            metric: metric_type,
            current: latest.value,
            average: stats.mean,
            best: stats.max,
            worst: stats.min,
            threshold: latest.threshold,
            status: if latest.value >= latest.threshold {
                BenchmarkStatus::Good
            } else {
                BenchmarkStatus::NeedsImprovement
            },
        })
    }

    /// Under-threshold metrics ranked by `(threshold - value) * weight`
    pub fn get_quality_impact_analysis(&self, entity_type: Option<EntityType>) -> ImpactAnalysis {
        let impact_scores: BTreeMap<_, _> = self
            .current_metrics(entity_type)
            .into_values()
            .filter(QualityMetric::is_below_threshold)
            .map(|metric| {
                let gap = metric.threshold - metric.value;
                let impact = MetricImpact {
                    current_value: metric.value,
                    threshold: metric.threshold,
                    gap,
                    impact_score: gap * metric.metric_type.weight(),
                    recommendations: remediation(&metric),
                    affected_entities: metric.affected_entities,
                    affected_relationships: metric.affected_relationships,
                };
                (metric.metric_type, impact)
            })
            .collect();

        let mut priority_areas: Vec<_> = impact_scores.keys().copied().collect();
        priority_areas.sort_by(|a, b| impact_scores[b].impact_score.total_cmp(&impact_scores[a].impact_score));

        ImpactAnalysis {
            entity_type,
            total_impact: impact_scores.values().map(|i| i.impact_score).sum(),
            impact_scores,
            priority_areas,
        }
    }
}

impl Default for QualityControl {
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(kind: QualityMetricType, value: f64) -> QualityMetric {
        QualityMetric::new(kind, value, 0.8)
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = QualityMetricType::ALL.iter().map(|m| m.weight()).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_score_excludes_absent_weights() {
        let metrics = [
            metric(QualityMetricType::Completeness, 1.0),
            metric(QualityMetricType::Integrity, 0.0),
        ];
        // 0.2 / 0.25
        assert!((weighted_score(&metrics) - 0.8).abs() < 1e-12);
        assert_eq!(weighted_score(Vec::<QualityMetric>::new().iter()), 0.0);
    }

    #[test]
    fn test_stats() {
        let stats = MetricStats::from_values(&[0.5, 0.6, 0.7]).unwrap();
        assert!((stats.mean - 0.6).abs() < 1e-12);
        assert!((stats.trend - 0.1).abs() < 1e-12);
        assert_eq!(stats.min, 0.5);
        assert_eq!(stats.max, 0.7);
        assert!(MetricStats::from_values(&[]).is_none());
    }

    #[test]
    fn test_pearson() {
        assert!((pearson(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&[1.0, 2.0, 3.0], &[3.0, 2.0, 1.0]).unwrap() + 1.0).abs() < 1e-12);
        assert!(pearson(&[1.0], &[1.0]).is_none());
        assert!(pearson(&[1.0, 1.0], &[1.0, 2.0]).is_none());
    }

    #[test]
    fn test_history_is_bounded() {
        let qc = QualityControl::new(QualityConfig {
            max_history_entries: 3,
            ..Default::default()
        });
        for i in 0..5 {
            qc.update_quality_metric(metric(QualityMetricType::Accuracy, i as f64 / 10.0), None);
        }
        let values: Vec<f64> = qc
            .history(QualityMetricType::Accuracy, None, 30)
            .iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(values, vec![0.2, 0.3, 0.4]);
    }

    #[test]
    fn test_expired_entries_are_dropped() {
        let qc = QualityControl::default();
        let old = metric(QualityMetricType::Validity, 0.1).with_timestamp(Utc::now() - Duration::days(45));
        qc.update_quality_metric(old, None);
        qc.update_quality_metric(metric(QualityMetricType::Validity, 0.9), None);
        assert_eq!(qc.history(QualityMetricType::Validity, None, 365).len(), 1);
    }

    #[test]
    fn test_entity_type_series_feed_global() {
        let qc = QualityControl::default();
        qc.update_quality_metric(metric(QualityMetricType::Completeness, 0.5), Some(EntityType::Company));
        qc.update_quality_metric(metric(QualityMetricType::Completeness, 1.0), Some(EntityType::Person));

        assert_eq!(qc.calculate_quality_score(Some(EntityType::Company)), 0.5);
        assert_eq!(qc.calculate_quality_score(None), 1.0);
        assert_eq!(qc.history(QualityMetricType::Completeness, None, 30).len(), 2);
    }

    #[test]
    fn test_report_recommends_below_threshold() {
        let qc = QualityControl::default();
        let id = Uuid::new_v4();
        qc.update_quality_metric(
            metric(QualityMetricType::Completeness, 0.4).with_affected_entity(id),
            None,
        );
        qc.update_quality_metric(metric(QualityMetricType::Consistency, 0.95), None);

        let report = qc.get_quality_report(None);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].metric, QualityMetricType::Completeness);
        assert!(report.recommendations[0].suggestion.ends_with(&id.to_string()));
        assert_eq!(report.metrics.len(), 2);
    }

    #[test]
    fn test_anomalies_beyond_two_sigma() {
        let qc = QualityControl::default();
        let start = Utc::now() - Duration::hours(20);
        let values = [0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.9, 0.1];
        for (i, value) in values.iter().enumerate() {
            qc.update_quality_metric(
                metric(QualityMetricType::Accuracy, *value).with_timestamp(start + Duration::hours(i as i64)),
                None,
            );
        }
        let anomalies = qc.get_quality_anomalies(QualityMetricType::Accuracy, None, 7);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].value, 0.1);
        assert!(anomalies[0].expected_range.0 > 0.1);
    }

    #[test]
    fn test_benchmarks() {
        let qc = QualityControl::default();
        for value in [0.6, 0.9, 0.7] {
            qc.update_quality_metric(metric(QualityMetricType::Timeliness, value), None);
        }
        let bench = qc
            .get_quality_benchmarks(QualityMetricType::Timeliness, None, 30)
            .unwrap();
        assert_eq!(bench.current, 0.7);
        assert_eq!(bench.best, 0.9);
        assert_eq!(bench.worst, 0.6);
        assert_eq!(bench.status, BenchmarkStatus::NeedsImprovement);
        assert!(qc.get_quality_benchmarks(QualityMetricType::Uniqueness, None, 30).is_none());
    }

    #[test]
    fn test_impact_ranking() {
        let qc = QualityControl::default();
        // gap 0.4 * 0.2 = 0.08
        qc.update_quality_metric(metric(QualityMetricType::Completeness, 0.4), None);
        // gap 0.7 * 0.05 = 0.035
        qc.update_quality_metric(metric(QualityMetricType::Integrity, 0.1), None);
        // gap 0.6 * 0.15 = 0.09
        qc.update_quality_metric(
            metric(QualityMetricType::Consistency, 0.2)
                .with_detail("inconsistent_fields", vec!["ticker"]),
            None,
        );

        let analysis = qc.get_quality_impact_analysis(None);
        assert_eq!(
            analysis.priority_areas,
            vec![
                QualityMetricType::Consistency,
                QualityMetricType::Completeness,
                QualityMetricType::Integrity
            ]
        );
        assert!((analysis.total_impact - 0.205).abs() < 1e-9);

        let consistency = &analysis.impact_scores[&QualityMetricType::Consistency];
        assert_eq!(consistency.recommendations[0].action, "standardize_values");
        assert_eq!(consistency.recommendations[0].priority, Priority::High);
        assert_eq!(consistency.recommendations[0].targets, vec!["ticker".to_string()]);
        assert!(analysis.impact_scores[&QualityMetricType::Integrity]
            .recommendations
            .is_empty());
    }

    #[test]
    fn test_metric_type_parse() {
        assert_eq!(
            "business_rules".parse::<QualityMetricType>().unwrap(),
            QualityMetricType::BusinessRules
        );
        assert!("sharpness".parse::<QualityMetricType>().is_err());
    }
}
