//! Dashboard presentation state
//!
//! Everything an operator can see outside the map: loading overlay, blocking
//! notices, the status line, the details panel and the tables. Renderers read
//! this; only the dashboard writes it.

use std::fmt;

use serde::{Deserialize, Serialize};
use ssa_gateway::SatelliteId;

use crate::maneuver::AlertSummary;
use crate::registry::SatelliteOverlay;
use crate::render::GeoPoint;
use crate::tables::{
    ActiveSatelliteRow, AlertRow, ClassificationRow, DashboardAlertRow, PerformanceSummary,
    SatelliteRow,
};

/// Modal message the operator must acknowledge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn message(&self) -> &str {
        match self {
            Self::Info(m) | Self::Error(m) => m,
        }
    }
}

/// One overview-card value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StatValue {
    #[default]
    Loading,
    Value(String),
    /// Failed to load; carries the marker shown in place of the value
    Unavailable(String),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => write!(f, "..."),
            Self::Value(v) => write!(f, "{}", v),
            Self::Unavailable(marker) => write!(f, "{}", marker),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub health: StatValue,
    pub satellite_count: StatValue,
    pub alert_count: StatValue,
    pub recent_alerts: Vec<DashboardAlertRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteDetails {
    pub id: SatelliteId,
    pub name: String,
    pub color: String,
    pub line1: String,
    pub line2: String,
    pub samples: usize,
    pub last_position: Option<GeoPoint>,
}

impl From<&SatelliteOverlay> for SatelliteDetails {
    fn from(overlay: &SatelliteOverlay) -> Self {
        Self {
            id: overlay.id,
            name: overlay.name.clone(),
            color: overlay.color.clone(),
            line1: overlay.metadata.line1.clone(),
            line2: overlay.metadata.line2.clone(),
            samples: overlay.track.len(),
            last_position: overlay.track.last().map(GeoPoint::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardView {
    /// Loading overlay text; `None` when idle
    pub loading: Option<String>,
    pub notices: Vec<Notice>,
    pub status: Option<String>,
    pub details: Option<SatelliteDetails>,
    pub stats: DashboardStats,
    /// Map search dropdown; `None` hides it
    pub search_results: Option<Vec<SatelliteRow>>,
    pub active_satellites: Vec<ActiveSatelliteRow>,
    pub alert_rows: Vec<AlertRow>,
    pub satellite_rows: Vec<SatelliteRow>,
    pub classification_rows: Vec<ClassificationRow>,
    pub performance: Option<PerformanceSummary>,
    pub selected_alert: Option<AlertSummary>,
}

impl DashboardView {
    pub fn begin_loading(&mut self, message: impl Into<String>) {
        self.loading = Some(message.into());
    }

    pub fn end_loading(&mut self) {
        self.loading = None;
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.notices.push(Notice::Info(message.into()));
    }

    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notices.push(Notice::Error(message.into()));
    }

    /// Acknowledge and drain pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }
}
