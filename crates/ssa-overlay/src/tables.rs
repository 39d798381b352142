//! Alert and result table renderers
//!
//! Stateless transforms from backend records to display rows. Nothing here
//! touches the registry or the network.

use serde::{Deserialize, Serialize};
use ssa_gateway::{
    ClassMetrics, ClassificationRecord, ConjunctionAlert, EventType, PerformanceReport,
    ReportEntry, SatelliteId, SatelliteSummary,
};

use crate::color::RegimeTable;
use crate::registry::SatelliteOverlay;

/// Aggregate keys in a classification report that are not classes
const REPORT_AGGREGATES: [&str; 3] = ["accuracy", "macro avg", "weighted avg"];

/// Country placeholders the classifier emits when it has no guess
const UNKNOWN_COUNTRY: [&str; 2] = ["Bilinmiyor", "Unknown"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub severity: Severity,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertAction {
    /// Open the conjunction scene on the map
    Watch,
    PlanManeuver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRow {
    pub primary: String,
    pub secondary: String,
    pub tca: String,
    pub badge: Badge,
    pub miss_distance: String,
    pub actions: Vec<AlertAction>,
}

pub fn alert_badge(alert: &ConjunctionAlert) -> Badge {
    if alert.event_type == EventType::Docking {
        return Badge {
            severity: Severity::Info,
            label: "FORMATION".to_string(),
        };
    }
    let severity = if alert.score < 0.4 {
        Severity::Success
    } else if alert.score < 0.8 {
        Severity::Warning
    } else {
        Severity::Danger
    };
    Badge {
        severity,
        label: format!("{:.0}%", alert.score * 100.0),
    }
}

pub fn alert_row(alert: &ConjunctionAlert) -> AlertRow {
    let actions = match alert.event_type {
        EventType::Docking => vec![AlertAction::Watch],
        EventType::Collision => vec![AlertAction::Watch, AlertAction::PlanManeuver],
    };
    AlertRow {
        primary: format!("{} ({})", alert.sat1_name, alert.sat1_id),
        secondary: format!("{} ({})", alert.sat2_name, alert.sat2_id),
        tca: alert.tca.format("%Y-%m-%d %H:%M:%S").to_string(),
        badge: alert_badge(alert),
        miss_distance: format!("{:.4} km", alert.miss_distance_km),
        actions,
    }
}

/// Compact row for the overview card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardAlertRow {
    pub primary: String,
    pub secondary: String,
    pub tca: String,
    pub miss_distance: String,
}

pub fn dashboard_alert_row(alert: &ConjunctionAlert) -> DashboardAlertRow {
    DashboardAlertRow {
        primary: alert.sat1_name.clone(),
        secondary: alert.sat2_name.clone(),
        tca: alert.tca.format("%H:%M:%S").to_string(),
        miss_distance: format!("{:.2} km", alert.miss_distance_km),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SatelliteRow {
    pub id: SatelliteId,
    pub name: String,
    pub source: String,
}

pub fn satellite_row(summary: &SatelliteSummary) -> SatelliteRow {
    SatelliteRow {
        id: summary.id,
        name: summary.sat_name.clone(),
        source: summary.source.clone().unwrap_or_else(|| "N/A".to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSatelliteRow {
    pub id: SatelliteId,
    pub name: String,
    pub color: String,
}

/// Sidebar listing of displayed satellites, ordered by name
pub fn active_satellite_rows<'a>(
    overlays: impl IntoIterator<Item = (SatelliteId, &'a SatelliteOverlay)>,
) -> Vec<ActiveSatelliteRow> {
    let mut rows: Vec<ActiveSatelliteRow> = overlays
        .into_iter()
        .map(|(id, overlay)| ActiveSatelliteRow {
            id,
            name: overlay.name.clone(),
            color: overlay.color.clone(),
        })
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecayRisk {
    Critical,
    Moderate,
    Low,
}

impl DecayRisk {
    pub fn classify(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_uppercase()).as_deref() {
            Some("KRİTİK" | "KRITIK" | "CRITICAL") => Self::Critical,
            Some("ORTA" | "MEDIUM" | "MODERATE") => Self::Moderate,
            _ => Self::Low,
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::Critical => Severity::Danger,
            Self::Moderate => Severity::Warning,
            Self::Low => Severity::Success,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRow {
    pub sat_name: String,
    pub anomaly: bool,
    pub country: Option<String>,
    pub regime_label: String,
    pub regime_color: String,
    pub regime_icon: String,
    pub cluster: String,
    pub category: String,
    pub decay_risk: Option<String>,
    pub decay_class: DecayRisk,
    pub confidence: String,
}

pub fn classification_row(record: &ClassificationRecord, regimes: &RegimeTable) -> ClassificationRow {
    let regime = regimes.describe(record.cluster_id);
    ClassificationRow {
        sat_name: record.sat_name.clone(),
        anomaly: record.is_anomaly,
        country: record
            .predicted_country
            .clone()
            .filter(|c| !c.is_empty() && !UNKNOWN_COUNTRY.contains(&c.as_str())),
        regime_label: regime.label.clone(),
        regime_color: regime.color.clone(),
        regime_icon: regime.icon.clone(),
        cluster: record
            .cluster_id
            .map_or_else(|| "Cluster #-".to_string(), |id| format!("Cluster #{}", id)),
        category: record.predicted_category.clone().unwrap_or_default(),
        decay_risk: record.decay_risk.clone(),
        decay_class: DecayRisk::classify(record.decay_risk.as_deref()),
        confidence: format!("{:.1}%", record.confidence * 100.0),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReportRow {
    pub class_name: String,
    pub precision: String,
    pub recall: String,
    pub f1_score: String,
    pub support: u64,
}

impl ClassReportRow {
    fn new(class_name: &str, metrics: &ClassMetrics) -> Self {
        Self {
            class_name: class_name.to_string(),
            precision: format!("{:.2}", metrics.precision),
            recall: format!("{:.2}", metrics.recall),
            f1_score: format!("{:.2}", metrics.f1_score),
            support: metrics.support.round().max(0.0) as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub accuracy: String,
    pub f1_score: String,
    pub sample_size: u64,
    pub error_rate: String,
    pub class_count: usize,
    pub feature_count: usize,
    pub trained_at: Option<String>,
    pub class_rows: Vec<ClassReportRow>,
    /// (feature, percent) sorted by importance, largest first
    pub feature_importance: Vec<(String, String)>,
}

pub fn performance_summary(report: &PerformanceReport) -> PerformanceSummary {
    let class_rows = report
        .classification_report
        .iter()
        .filter(|(name, _)| !REPORT_AGGREGATES.contains(&name.as_str()))
        .filter_map(|(name, entry)| match entry {
            ReportEntry::Metrics(m) => Some(ClassReportRow::new(name, m)),
            ReportEntry::Scalar(_) => None,
        })
        .collect();

    let mut features: Vec<(&String, &f64)> = report.feature_importance.iter().collect();
    features.sort_by(|a, b| b.1.total_cmp(a.1));

    PerformanceSummary {
        accuracy: format!("{:.1}%", report.accuracy * 100.0),
        f1_score: format!("{:.3}", report.f1_score),
        sample_size: report.sample_size,
        error_rate: format!("{:.1}%", (1.0 - report.accuracy) * 100.0),
        class_count: report.classes.len(),
        feature_count: report.feature_importance.len(),
        trained_at: report.timestamp.clone(),
        class_rows,
        feature_importance: features
            .into_iter()
            .map(|(name, value)| (name.clone(), format!("{:.1}%", value * 100.0)))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use ssa_gateway::{SatelliteMetadata, TrackSample};
    use std::collections::BTreeMap;

    fn alert(event_type: EventType, score: f64) -> ConjunctionAlert {
        ConjunctionAlert {
            sat1_id: SatelliteId(1),
            sat1_name: "A".to_string(),
            sat2_id: SatelliteId(2),
            sat2_name: "B".to_string(),
            tca: Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap(),
            miss_distance_km: 1.234567,
            event_type,
            score,
        }
    }

    #[test]
    fn test_alert_badge_thresholds() {
        assert_eq!(alert_badge(&alert(EventType::Collision, 0.39)).severity, Severity::Success);
        assert_eq!(alert_badge(&alert(EventType::Collision, 0.4)).severity, Severity::Warning);
        assert_eq!(alert_badge(&alert(EventType::Collision, 0.8)).severity, Severity::Danger);
        assert_eq!(alert_badge(&alert(EventType::Collision, 0.756)).label, "76%");

        let docking = alert_badge(&alert(EventType::Docking, 0.99));
        assert_eq!(docking.severity, Severity::Info);
        assert_eq!(docking.label, "FORMATION");
    }

    #[test]
    fn test_alert_row_actions_and_precision() {
        let row = alert_row(&alert(EventType::Collision, 0.5));
        assert_eq!(row.miss_distance, "1.2346 km");
        assert_eq!(row.actions, vec![AlertAction::Watch, AlertAction::PlanManeuver]);
        assert_eq!(alert_row(&alert(EventType::Docking, 0.5)).actions, vec![AlertAction::Watch]);

        let compact = dashboard_alert_row(&alert(EventType::Collision, 0.5));
        assert_eq!(compact.miss_distance, "1.23 km");
        assert_eq!(compact.tca, "05:06:07");
    }

    #[test]
    fn test_satellite_row_source_fallback() {
        let row = satellite_row(&SatelliteSummary {
            id: SatelliteId(5),
            sat_name: "X".to_string(),
            epoch: None,
            source: None,
        });
        assert_eq!(row.source, "N/A");
    }

    #[test]
    fn test_active_rows_sorted_by_name() {
        let overlay = |id: u32, name: &str| SatelliteOverlay {
            id: SatelliteId(id),
            name: name.to_string(),
            color: "#fff".to_string(),
            metadata: SatelliteMetadata {
                id: SatelliteId(id),
                sat_name: name.to_string(),
                line1: String::new(),
                line2: String::new(),
            },
            track: vec![TrackSample::new(0.0, 0.0, Utc::now())],
        };
        let overlays = [overlay(1, "ZARYA"), overlay(2, "AQUA"), overlay(3, "METOP")];
        let rows = active_satellite_rows(overlays.iter().map(|o| (o.id, o)));
        let names: Vec<_> = rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["AQUA", "METOP", "ZARYA"]);
    }

    #[test]
    fn test_classification_row_uses_regime_table() {
        let record = ClassificationRecord {
            sat_name: "GPS IIF-3".to_string(),
            predicted_category: Some("Navigation".to_string()),
            confidence: 0.9876,
            cluster_id: Some(1),
            is_anomaly: false,
            predicted_country: Some("Bilinmiyor".to_string()),
            decay_risk: Some("ORTA".to_string()),
            regime_label: None,
        };
        let row = classification_row(&record, &RegimeTable::default());
        assert_eq!(row.regime_color, "#ffae00");
        assert_eq!(row.confidence, "98.8%");
        assert_eq!(row.country, None);
        assert_eq!(row.decay_class, DecayRisk::Moderate);
        assert_eq!(row.cluster, "Cluster #1");

        let unknown = ClassificationRecord {
            cluster_id: None,
            decay_risk: Some("KRİTİK".to_string()),
            ..record
        };
        let row = classification_row(&unknown, &RegimeTable::default());
        assert_eq!(row.regime_label, "Unclassified region");
        assert_eq!(row.decay_class.severity(), Severity::Danger);
    }

    #[test]
    fn test_performance_summary_skips_aggregates() {
        let metrics = |f1: f64| {
            ReportEntry::Metrics(ClassMetrics {
                precision: 0.9,
                recall: 0.8,
                f1_score: f1,
                support: 12.0,
            })
        };
        let mut classification_report = BTreeMap::new();
        classification_report.insert("Communications".to_string(), metrics(0.85));
        classification_report.insert("Navigation".to_string(), metrics(0.95));
        classification_report.insert("accuracy".to_string(), ReportEntry::Scalar(0.91));
        classification_report.insert("macro avg".to_string(), metrics(0.9));
        classification_report.insert("weighted avg".to_string(), metrics(0.9));

        let report = PerformanceReport {
            accuracy: 0.912,
            f1_score: 0.90123,
            roc_auc: None,
            sample_size: 1500,
            classes: vec!["Communications".to_string(), "Navigation".to_string()],
            confusion_matrix: vec![],
            feature_importance: [("inclination", 0.2), ("mean_motion", 0.5), ("eccentricity", 0.3)]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            classification_report,
            timestamp: None,
        };

        let summary = performance_summary(&report);
        assert_eq!(summary.accuracy, "91.2%");
        assert_eq!(summary.f1_score, "0.901");
        assert_eq!(summary.error_rate, "8.8%");
        let classes: Vec<_> = summary.class_rows.iter().map(|r| r.class_name.as_str()).collect();
        assert_eq!(classes, ["Communications", "Navigation"]);
        let features: Vec<_> = summary.feature_importance.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(features, ["mean_motion", "eccentricity", "inclination"]);
        assert_eq!(summary.feature_importance[0].1, "50.0%");
    }
}
