//! Wire types for the SSA backend
//!
//! Field names follow the backend's JSON exactly so the structs can be
//! (de)serialized without adapters.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::GatewayError;

/// Backend catalog key of a tracked object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SatelliteId(pub u32);

impl fmt::Display for SatelliteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SatelliteId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Catalog search / listing entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteSummary {
    pub id: SatelliteId,
    pub sat_name: String,
    #[serde(default)]
    pub epoch: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// Raw two-line element record for one satellite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteMetadata {
    pub id: SatelliteId,
    pub sat_name: String,
    pub line1: String,
    pub line2: String,
}

/// One propagated ground-track point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackSample {
    pub lat: f64,
    pub lon: f64,
    #[serde(with = "timestamp")]
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub alt_km: Option<f64>,
}

impl TrackSample {
    pub fn new(lat: f64, lon: f64, time: DateTime<Utc>) -> Self {
        Self {
            lat,
            lon,
            time,
            alt_km: None,
        }
    }
}

/// ML classifier output used for display coloring
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassificationHint {
    #[serde(default)]
    pub cluster_id: Option<u32>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ClassificationHint {
    pub fn cluster(cluster_id: u32) -> Self {
        Self {
            cluster_id: Some(cluster_id),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    #[default]
    Collision,
    Docking,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collision => "COLLISION",
            Self::Docking => "DOCKING",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "COLLISION" => Ok(Self::Collision),
            "DOCKING" => Ok(Self::Docking),
            other => Err(format!("unknown event type: {}", other)),
        }
    }
}

/// Conjunction or docking record produced by the screener
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConjunctionAlert {
    pub sat1_id: SatelliteId,
    pub sat1_name: String,
    pub sat2_id: SatelliteId,
    pub sat2_name: String,
    #[serde(with = "timestamp")]
    pub tca: DateTime<Utc>,
    pub miss_distance_km: f64,
    #[serde(default)]
    pub event_type: EventType,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertFilter {
    pub event_type: EventType,
    pub limit: usize,
}

impl AlertFilter {
    pub fn new(event_type: EventType, limit: usize) -> Self {
        Self { event_type, limit }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverRequest {
    pub sat_id_primary: SatelliteId,
    pub sat_id_secondary: SatelliteId,
    pub tca: DateTime<Utc>,
    pub target_miss_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverPlan {
    pub burn_time: DateTime<Utc>,
    pub dv_magnitude_m_s: f64,
    pub predicted_miss_km: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverRejection {
    pub message: String,
    pub error_detail: Option<String>,
}

impl ManeuverRejection {
    /// Text to show the operator; the detailed reason wins when present
    pub fn reason(&self) -> &str {
        self.error_detail
            .as_deref()
            .filter(|d| !d.is_empty())
            .unwrap_or(&self.message)
    }
}

/// Outcome of one maneuver request; exactly one variant per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ManeuverResult {
    Success(ManeuverPlan),
    Rejected(ManeuverRejection),
}

/// Solver reply as it arrives on the wire
#[derive(Debug, Deserialize)]
pub(crate) struct ManeuverResponse {
    pub success: bool,
    #[serde(default)]
    pub burn_time: Option<String>,
    #[serde(default)]
    pub dv_magnitude_m_s: Option<f64>,
    #[serde(default)]
    pub predicted_miss_km: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error_detail: Option<String>,
}

impl ManeuverResponse {
    pub(crate) fn into_result(self, endpoint: &str) -> crate::Result<ManeuverResult> {
        if !self.success {
            return Ok(ManeuverResult::Rejected(ManeuverRejection {
                message: self.message.unwrap_or_else(|| "Maneuver rejected".to_string()),
                error_detail: self.error_detail,
            }));
        }

        let missing = |field: &str| GatewayError::Decode {
            endpoint: endpoint.to_string(),
            reason: format!("successful maneuver reply is missing `{}`", field),
        };

        let burn_raw = self.burn_time.ok_or_else(|| missing("burn_time"))?;
        let burn_time = parse_timestamp(&burn_raw).ok_or_else(|| GatewayError::Decode {
            endpoint: endpoint.to_string(),
            reason: format!("invalid burn_time `{}`", burn_raw),
        })?;

        Ok(ManeuverResult::Success(ManeuverPlan {
            burn_time,
            dv_magnitude_m_s: self
                .dv_magnitude_m_s
                .ok_or_else(|| missing("dv_magnitude_m_s"))?,
            predicted_miss_km: self
                .predicted_miss_km
                .ok_or_else(|| missing("predicted_miss_km"))?,
            message: self.message.unwrap_or_default(),
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub services: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningSummary {
    pub status: String,
    pub processed_pairs: u64,
    pub alerts_saved: u64,
}

/// Stored classifier verdict for one satellite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub sat_name: String,
    #[serde(default)]
    pub predicted_category: Option<String>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub cluster_id: Option<u32>,
    #[serde(default, deserialize_with = "flag")]
    pub is_anomaly: bool,
    #[serde(default)]
    pub predicted_country: Option<String>,
    #[serde(default)]
    pub decay_risk: Option<String>,
    #[serde(default)]
    pub regime_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: f64,
}

/// A classification report value: per-class metrics or a bare scalar (`accuracy`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportEntry {
    Metrics(ClassMetrics),
    Scalar(f64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub accuracy: f64,
    pub f1_score: f64,
    #[serde(default)]
    pub roc_auc: Option<f64>,
    pub sample_size: u64,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub confusion_matrix: Vec<Vec<u64>>,
    #[serde(default)]
    pub feature_importance: BTreeMap<String, f64>,
    #[serde(default)]
    pub classification_report: BTreeMap<String, ReportEntry>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (`2024-01-01T12:00:00+00:00`, `...Z`) and naive ISO-8601
/// with `T` or space separator; naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Serde adapter for backend timestamps
pub mod timestamp {
    use super::*;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{}`", raw)))
    }
}

// SQLite hands booleans back as 0/1
fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(i)) => i != 0,
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-01T12:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T12:00:00+00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T15:00:00+03:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01T12:00:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-01 12:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_track_sample_from_propagator_json() {
        let json = r#"{
            "time": "2024-01-01T12:00:00.500000+00:00",
            "lat": 51.6, "lon": -0.12, "alt_km": 418.2,
            "position_km": [1.0, 2.0, 3.0], "velocity_km_s": [7.6, 0.0, 0.0]
        }"#;
        let sample: TrackSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.lat, 51.6);
        assert_eq!(sample.alt_km, Some(418.2));
        assert_eq!(sample.time.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_alert_decodes_event_type() {
        let json = r#"{
            "id": 7, "sat1_id": 1, "sat1_name": "ISS", "sat2_id": 2, "sat2_name": "DEB",
            "tca": "2024-01-01T12:00:00", "miss_distance_km": 0.42,
            "rel_velocity_km_s": 11.2, "score": 0.91, "created_at": "x",
            "event_type": "DOCKING"
        }"#;
        let alert: ConjunctionAlert = serde_json::from_str(json).unwrap();
        assert_eq!(alert.event_type, EventType::Docking);
        assert_eq!(alert.sat2_id, SatelliteId(2));
    }

    #[test]
    fn test_maneuver_failure_prefers_detail() {
        let raw: ManeuverResponse = serde_json::from_str(
            r#"{"success": false, "message": "failed", "error_detail": "secondary has no TLE"}"#,
        )
        .unwrap();
        match raw.into_result("/maneuver/calculate").unwrap() {
            ManeuverResult::Rejected(rejection) => {
                assert_eq!(rejection.reason(), "secondary has no TLE")
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_maneuver_success_requires_numbers() {
        let raw: ManeuverResponse = serde_json::from_str(
            r#"{"success": true, "burn_time": "2024-01-01T11:00:00", "message": "ok"}"#,
        )
        .unwrap();
        assert!(matches!(
            raw.into_result("/maneuver/calculate"),
            Err(GatewayError::Decode { .. })
        ));
    }

    #[test]
    fn test_classification_record_integer_flag() {
        let json = r#"{"sat_name": "X", "predicted_category": "Comms", "confidence": 0.8,
                       "cluster_id": 2, "is_anomaly": 1, "decay_risk": "LOW"}"#;
        let record: ClassificationRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_anomaly);
        assert_eq!(record.cluster_id, Some(2));
    }

    #[test]
    fn test_report_entry_untagged() {
        let json = r#"{"accuracy": 0.93,
                       "Comms": {"precision": 0.9, "recall": 0.8, "f1-score": 0.85, "support": 40}}"#;
        let report: BTreeMap<String, ReportEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(report["accuracy"], ReportEntry::Scalar(0.93));
        assert!(matches!(report["Comms"], ReportEntry::Metrics(_)));
    }
}
