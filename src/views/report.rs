//! Projection of an `AutopsyReport` onto the report screen's widgets.
//!
//! The only derived values are top-N slices of the leaderboards and the
//! severity/impact → tone mapping.

use super::Tone;
use crate::report::AutopsyReport;

pub const TOP_N: usize = 10;
pub const TITLE: &str = "Autopsy Report Complete";

#[derive(Debug, Clone, PartialEq)]
pub struct StatCard {
    pub label: &'static str,
    pub value: u64,
    pub total: Option<u64>,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub value: f64,
    /// Severity or impact level the tone was derived from.
    pub class: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub title: &'static str,
    pub bars: Vec<Bar>,
    pub legend: &'static [(&'static str, Tone)],
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    pub feature: String,
    pub drift: f64,
    pub impact: f64,
    pub critical: bool,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPanel {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosisPanel {
    pub root_cause: String,
    pub business_impact: String,
    pub full: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView {
    pub summary: String,
    pub severity: String,
    pub severity_tone: Tone,
    pub generated_at: Option<String>,
    pub stat_cards: Vec<StatCard>,
    pub drift_chart: BarChart,
    pub impact_chart: BarChart,
    pub correlation: ScatterPanel,
    /// Empty means the panel is hidden.
    pub critical_features: Vec<String>,
    pub diagnosis: DiagnosisPanel,
    pub recommendations: Vec<String>,
}

const DRIFT_LEGEND: &[(&str, Tone)] = &[
    ("High", Tone::Red),
    ("Moderate", Tone::Orange),
    ("Low", Tone::Green),
];

const IMPACT_LEGEND: &[(&str, Tone)] = &[
    ("High", Tone::Purple),
    ("Moderate", Tone::Blue),
    ("Low", Tone::Violet),
];

const CORRELATION_LEGEND: &[(&str, Tone)] = &[
    ("Critical (High Drift + High Impact)", Tone::Red),
    ("Normal", Tone::Violet),
];

pub fn correlation_legend() -> &'static [(&'static str, Tone)] {
    CORRELATION_LEGEND
}

/// Badge tone for the overall severity string, matched by case-sensitive
/// substring.
pub fn severity_tone(severity: &str) -> Tone {
    if severity.contains("CRITICAL") {
        Tone::Red
    } else if severity.contains("HIGH") {
        Tone::Orange
    } else if severity.contains("MODERATE") {
        Tone::Yellow
    } else {
        Tone::Green
    }
}

pub fn drift_tone(severity: &str) -> Tone {
    match severity {
        "High" => Tone::Red,
        "Moderate" => Tone::Orange,
        "Low" => Tone::Green,
        _ => Tone::Gray,
    }
}

pub fn impact_tone(level: &str) -> Tone {
    match level {
        "High" => Tone::Purple,
        "Moderate" => Tone::Blue,
        "Low" => Tone::Violet,
        _ => Tone::Gray,
    }
}

impl ReportView {
    pub fn project(report: &AutopsyReport) -> Self {
        let drift = &report.drift_analysis;
        let impact = &report.impact_analysis;
        let timeline = &report.timeline;

        let stat_cards = vec![
            StatCard {
                label: "Features Drifted",
                value: drift.summary.drifted_features_count,
                total: Some(drift.summary.total_features_analyzed),
                tone: Tone::Red,
            },
            StatCard {
                label: "Severe Drift",
                value: drift.summary.severe_drift_count,
                total: None,
                tone: Tone::Orange,
            },
            StatCard {
                label: "High Impact",
                value: impact.summary.high_impact_count,
                total: None,
                tone: Tone::Purple,
            },
            StatCard {
                label: "Critical Features",
                value: timeline.summary.critical_features,
                total: None,
                tone: Tone::Blue,
            },
        ];

        let drift_chart = BarChart {
            title: "Drift Severity by Feature",
            bars: drift
                .drift_leaderboard
                .iter()
                .take(TOP_N)
                .map(|e| Bar {
                    label: e.feature.clone(),
                    value: e.drift_score,
                    class: e.severity.clone(),
                    tone: drift_tone(&e.severity),
                })
                .collect(),
            legend: DRIFT_LEGEND,
        };

        let impact_chart = BarChart {
            title: "Feature Impact Scores",
            bars: impact
                .impact_leaderboard
                .iter()
                .take(TOP_N)
                .map(|e| Bar {
                    label: e.feature.clone(),
                    value: e.impact_score,
                    class: e.impact_level.clone(),
                    tone: impact_tone(&e.impact_level),
                })
                .collect(),
            legend: IMPACT_LEGEND,
        };

        let correlation = ScatterPanel {
            title: "Drift vs Impact Correlation",
            subtitle: "Features in the top-right quadrant (high drift + high impact) are critical",
            points: report
                .visualizations
                .correlation_data
                .points
                .iter()
                .map(|p| ScatterPoint {
                    feature: p.feature.clone(),
                    drift: p.drift_score,
                    impact: p.impact_score,
                    critical: p.is_critical,
                    tone: if p.is_critical { Tone::Red } else { Tone::Violet },
                })
                .collect(),
        };

        Self {
            summary: report.executive_summary.summary.clone(),
            severity: report.executive_summary.severity.clone(),
            severity_tone: severity_tone(&report.executive_summary.severity),
            generated_at: report.metadata.generated_at.clone(),
            stat_cards,
            drift_chart,
            impact_chart,
            correlation,
            critical_features: timeline.critical_features.clone(),
            diagnosis: DiagnosisPanel {
                root_cause: report.diagnosis.root_cause_analysis.clone(),
                business_impact: report.diagnosis.business_impact.clone(),
                full: report.diagnosis.full_diagnosis.clone(),
            },
            recommendations: timeline.recommendations.clone(),
        }
    }
}
