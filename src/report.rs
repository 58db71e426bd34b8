//! Autopsy report as returned by `POST /run-autopsy`.
//!
//! The backend is the only source of truth, so every field is defaulted and
//! a partially populated report still deserializes. Scalars are read
//! leniently: the backend stringifies some numpy values (`"True"`, `"3"`).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AutopsyReport {
    #[serde(deserialize_with = "null_default")]
    pub metadata: Metadata,
    #[serde(deserialize_with = "null_default")]
    pub executive_summary: ExecutiveSummary,
    #[serde(deserialize_with = "null_default")]
    pub drift_analysis: DriftAnalysis,
    #[serde(deserialize_with = "null_default")]
    pub impact_analysis: ImpactAnalysis,
    #[serde(deserialize_with = "null_default")]
    pub diagnosis: Diagnosis,
    #[serde(deserialize_with = "null_default")]
    pub timeline: Timeline,
    #[serde(deserialize_with = "null_default")]
    pub visualizations: Visualizations,
}

impl AutopsyReport {
    pub fn from_slice(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Metadata {
    pub report_type: Option<String>,
    pub generated_at: Option<String>,
    pub version: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExecutiveSummary {
    #[serde(deserialize_with = "lenient_string")]
    pub summary: String,
    /// Free-form, e.g. `"CRITICAL - Immediate action required"`.
    #[serde(deserialize_with = "lenient_string")]
    pub severity: String,
    pub business_impact: Option<String>,
    #[serde(deserialize_with = "lenient_u64")]
    pub critical_features_count: u64,
    pub recommendation_priority: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriftAnalysis {
    #[serde(deserialize_with = "null_default")]
    pub summary: DriftSummary,
    #[serde(deserialize_with = "null_default")]
    pub drift_leaderboard: Vec<DriftEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriftSummary {
    #[serde(deserialize_with = "lenient_u64")]
    pub total_features_analyzed: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub drifted_features_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub severe_drift_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DriftEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub feature: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub drift_score: f64,
    #[serde(deserialize_with = "lenient_string")]
    pub severity: String,
    pub method: Option<String>,
    #[serde(deserialize_with = "lenient_bool")]
    pub drift: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImpactAnalysis {
    #[serde(deserialize_with = "null_default")]
    pub summary: ImpactSummary,
    #[serde(deserialize_with = "null_default")]
    pub impact_leaderboard: Vec<ImpactEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImpactSummary {
    #[serde(deserialize_with = "lenient_u64")]
    pub high_impact_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub moderate_impact_count: u64,
    #[serde(deserialize_with = "lenient_u64")]
    pub low_impact_count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ImpactEntry {
    #[serde(deserialize_with = "lenient_string")]
    pub feature: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub impact_score: f64,
    #[serde(deserialize_with = "lenient_string")]
    pub impact_level: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Diagnosis {
    #[serde(deserialize_with = "lenient_string")]
    pub root_cause_analysis: String,
    #[serde(deserialize_with = "lenient_string")]
    pub business_impact: String,
    #[serde(deserialize_with = "lenient_string")]
    pub full_diagnosis: String,
    #[serde(deserialize_with = "null_default")]
    pub technical_recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Timeline {
    #[serde(deserialize_with = "null_default")]
    pub summary: TimelineSummary,
    #[serde(deserialize_with = "null_default")]
    pub critical_features: Vec<String>,
    #[serde(deserialize_with = "null_default")]
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimelineSummary {
    #[serde(deserialize_with = "lenient_u64")]
    pub critical_features: u64,
    pub severity_assessment: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Visualizations {
    #[serde(deserialize_with = "null_default")]
    pub correlation_data: CorrelationData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorrelationData {
    #[serde(deserialize_with = "null_default")]
    pub points: Vec<CorrelationPoint>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CorrelationPoint {
    #[serde(deserialize_with = "lenient_string")]
    pub feature: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub drift_score: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub impact_score: f64,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_critical: bool,
}

// =============================================================================
// Lenient scalar readers
// =============================================================================

fn null_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        Value::Bool(b) => f64::from(u8::from(b)),
        _ => 0.0,
    })
}

fn lenient_u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim(), "True" | "true" | "1"),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_object_deserializes() {
        let report = AutopsyReport::from_slice(b"{}").unwrap();
        assert_eq!(report.executive_summary.severity, "");
        assert!(report.drift_analysis.drift_leaderboard.is_empty());
        assert!(report.visualizations.correlation_data.points.is_empty());
    }

    #[test]
    fn test_numpy_stringified_scalars() {
        let body = json!({
            "drift_analysis": {
                "summary": {"total_features_analyzed": "7", "drifted_features_count": 3},
                "drift_leaderboard": [
                    {"feature": "income", "drift_score": "0.4512", "severity": "High", "drift": "True"}
                ]
            },
            "visualizations": {"correlation_data": {"points": [
                {"feature": "income", "drift_score": 0.45, "impact_score": 0.61, "is_critical": "True"},
                {"feature": "age", "drift_score": 0.12, "impact_score": 0.05, "is_critical": "False"}
            ]}}
        });
        let report: AutopsyReport = serde_json::from_value(body).unwrap();
        assert_eq!(report.drift_analysis.summary.total_features_analyzed, 7);
        assert_eq!(report.drift_analysis.summary.drifted_features_count, 3);
        let entry = &report.drift_analysis.drift_leaderboard[0];
        assert!((entry.drift_score - 0.4512).abs() < 1e-12);
        assert!(entry.drift);
        let points = &report.visualizations.correlation_data.points;
        assert!(points[0].is_critical);
        assert!(!points[1].is_critical);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let body = json!({
            "executive_summary": {"summary": "ok", "severity": "LOW - Routine monitoring", "extra": 1},
            "recommendations": {"immediate_actions": []},
            "timeline": {"events": [{"event_type": "drift_detected"}], "critical_features": ["zip"]}
        });
        let report: AutopsyReport = serde_json::from_value(body).unwrap();
        assert_eq!(report.executive_summary.severity, "LOW - Routine monitoring");
        assert_eq!(report.timeline.critical_features, vec!["zip".to_string()]);
    }

    #[test]
    fn test_null_sections_become_empty() {
        let body = json!({"visualizations": null, "timeline": {"critical_features": null}});
        let report: AutopsyReport = serde_json::from_value(body).unwrap();
        assert!(report.visualizations.correlation_data.points.is_empty());
        assert!(report.timeline.critical_features.is_empty());
    }

    #[test]
    fn test_null_scores_become_zero() {
        let body = json!({"impact_analysis": {"impact_leaderboard": [
            {"feature": "f", "impact_score": null, "impact_level": "Low"}
        ]}});
        let report: AutopsyReport = serde_json::from_value(body).unwrap();
        assert_eq!(report.impact_analysis.impact_leaderboard[0].impact_score, 0.0);
    }
}
