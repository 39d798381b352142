//! Maneuver Workflow Controller
//!
//! Holds the conjunction alert the operator is planning against and routes
//! the solver's answer to the result panel. State transitions:
//!
//! ```text
//! Idle ──select_alert──▶ Planning(alert) ──dismiss──▶ Idle
//!                         │      ▲
//!                         └──────┘ select_alert (replaces)
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ssa_gateway::{
    ConjunctionAlert, EventType, ManeuverPlan, ManeuverRejection, ManeuverRequest, ManeuverResult,
    SatelliteId, SsaGateway,
};
use tracing::{info, warn};

use crate::{DashboardError, Result};

/// Placeholder shown in numeric fields when no plan exists
pub const BLANK_FIELD: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkflowState {
    Idle,
    Planning(ConjunctionAlert),
}

/// Read-only description of the selected alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSummary {
    pub primary: String,
    pub secondary: String,
    pub tca: String,
    pub miss_distance: String,
    pub event_type: EventType,
}

impl From<&ConjunctionAlert> for AlertSummary {
    fn from(alert: &ConjunctionAlert) -> Self {
        Self {
            primary: format!("{} ({})", alert.sat1_name, alert.sat1_id),
            secondary: format!("{} ({})", alert.sat2_name, alert.sat2_id),
            tca: alert.tca.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            miss_distance: format!("{:.4}", alert.miss_distance_km),
            event_type: alert.event_type,
        }
    }
}

/// Result panel; exactly one variant is shown at a time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ManeuverPanel {
    Hidden,
    Success {
        burn_time: DateTime<Utc>,
        dv_magnitude_m_s: f64,
        predicted_miss_km: f64,
        message: String,
    },
    Failure {
        message: String,
    },
}

/// Display strings for the four panel fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelFields {
    pub burn: String,
    pub dv: String,
    pub miss: String,
    pub message: String,
}

impl ManeuverPanel {
    pub fn fields(&self) -> Option<PanelFields> {
        match self {
            Self::Hidden => None,
            Self::Success {
                burn_time,
                dv_magnitude_m_s,
                predicted_miss_km,
                message,
            } => Some(PanelFields {
                burn: burn_time.format("%H:%M:%S UTC").to_string(),
                dv: format!("{:.5} m/s", dv_magnitude_m_s),
                miss: format!("{:.4} km", predicted_miss_km),
                message: message.clone(),
            }),
            Self::Failure { message } => Some(PanelFields {
                burn: BLANK_FIELD.to_string(),
                dv: BLANK_FIELD.to_string(),
                miss: BLANK_FIELD.to_string(),
                message: message.clone(),
            }),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }
}

impl From<ManeuverPlan> for ManeuverPanel {
    fn from(plan: ManeuverPlan) -> Self {
        Self::Success {
            burn_time: plan.burn_time,
            dv_magnitude_m_s: plan.dv_magnitude_m_s,
            predicted_miss_km: plan.predicted_miss_km,
            message: plan.message,
        }
    }
}

impl From<ManeuverRejection> for ManeuverPanel {
    fn from(rejection: ManeuverRejection) -> Self {
        Self::Failure {
            message: rejection.reason().to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManeuverWorkflow {
    state: WorkflowState,
    panel: ManeuverPanel,
}

impl Default for ManeuverWorkflow {
    fn default() -> Self {
        Self::new()
    }
}

impl ManeuverWorkflow {
    pub fn new() -> Self {
        Self {
            state: WorkflowState::Idle,
            panel: ManeuverPanel::Hidden,
        }
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn panel(&self) -> &ManeuverPanel {
        &self.panel
    }

    pub fn selected(&self) -> Option<&ConjunctionAlert> {
        match &self.state {
            WorkflowState::Planning(alert) => Some(alert),
            WorkflowState::Idle => None,
        }
    }

    /// Enter planning for `alert`, replacing any prior selection and hiding
    /// the previous result.
    pub fn select_alert(&mut self, alert: ConjunctionAlert) -> AlertSummary {
        let summary = AlertSummary::from(&alert);
        info!(
            primary = %alert.sat1_id,
            secondary = %alert.sat2_id,
            "alert selected for maneuver planning"
        );
        self.state = WorkflowState::Planning(alert);
        self.panel = ManeuverPanel::Hidden;
        summary
    }

    pub fn dismiss(&mut self) {
        self.state = WorkflowState::Idle;
        self.panel = ManeuverPanel::Hidden;
    }

    pub fn request(&self, target_miss_km: f64) -> Result<ManeuverRequest> {
        let alert = self.selected().ok_or(DashboardError::NoActiveAlert)?;
        Ok(ManeuverRequest {
            sat_id_primary: alert.sat1_id,
            sat_id_secondary: alert.sat2_id,
            tca: alert.tca,
            target_miss_km,
        })
    }

    /// Submit one maneuver request for the selected alert.
    ///
    /// A solver refusal lands in the panel as `Failure`. A transport error
    /// leaves the panel as it was and is returned to the caller.
    pub async fn calculate<G: SsaGateway>(
        &mut self,
        gateway: &G,
        target_miss_km: f64,
    ) -> Result<&ManeuverPanel> {
        let request = self.request(target_miss_km)?;

        let result = match gateway.calculate_maneuver(&request).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "maneuver request failed");
                return Err(e.into());
            }
        };

        self.panel = match result {
            ManeuverResult::Success(plan) => {
                info!(dv = plan.dv_magnitude_m_s, miss = plan.predicted_miss_km, "maneuver planned");
                plan.into()
            }
            ManeuverResult::Rejected(rejection) => {
                warn!(reason = rejection.reason(), "maneuver rejected by solver");
                rejection.into()
            }
        };
        Ok(&self.panel)
    }

    /// Ids of the two parties in the active alert
    pub fn parties(&self) -> Option<(SatelliteId, SatelliteId)> {
        self.selected().map(|a| (a.sat1_id, a.sat2_id))
    }
}
