//! SSA Remote Data Gateway
//!
//! Typed access to the space-situational-awareness backend:
//! - Satellite catalog (search, listing, count, raw TLE metadata)
//! - Ground-track propagation
//! - Conjunction / docking alerts and screening
//! - ML orbital-regime classification
//! - Avoidance maneuver calculation
//!
//! The gateway is pure request/response; it keeps no state between calls.
//!
//! # Usage
//!
//! ```rust,ignore
//! let gateway = HttpGateway::new(GatewayConfig::from_env())?;
//! let track = gateway.ground_track(SatelliteId(25544), 100, 60).await?;
//! ```

use std::future::Future;

use thiserror::Error;

pub mod config;
pub mod http;
pub mod mock;
pub mod types;

pub use config::GatewayConfig;
pub use http::HttpGateway;
pub use mock::{GatewayCall, MockGateway};
pub use types::{
    parse_timestamp, AlertFilter, ClassMetrics, ClassificationHint, ClassificationRecord,
    ConjunctionAlert, EventType, HealthStatus, ManeuverPlan, ManeuverRejection, ManeuverRequest,
    ManeuverResult, PerformanceReport, RefreshSummary, ReportEntry, SatelliteId,
    SatelliteMetadata, SatelliteSummary, ScreeningSummary, TrackSample,
};

/// Minimum query length accepted by the catalog search endpoint
pub const MIN_SEARCH_LEN: usize = 2;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Request to {endpoint} failed: {reason}")]
    Request { endpoint: String, reason: String },
    #[error("{endpoint} returned HTTP {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        endpoint: String,
        status: u16,
        detail: Option<String>,
    },
    #[error("Could not decode {endpoint} response: {reason}")]
    Decode { endpoint: String, reason: String },
    #[error("Search query must be at least {min} characters")]
    QueryTooShort { min: usize },
}

impl GatewayError {
    /// Endpoint the failed call was addressed to, if any
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Request { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(endpoint),
            Self::QueryTooShort { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// Backend operations consumed by the dashboard.
///
/// Every method is a single request; implementations must not cache or
/// reorder calls. Futures are `Send` so callers may hand them to a runtime.
pub trait SsaGateway {
    fn search_satellites(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<SatelliteSummary>>> + Send;

    fn list_satellites(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<SatelliteSummary>>> + Send;

    fn satellite_count(&self) -> impl Future<Output = Result<u64>> + Send;

    fn satellite_metadata(
        &self,
        id: SatelliteId,
    ) -> impl Future<Output = Result<SatelliteMetadata>> + Send;

    fn ground_track(
        &self,
        id: SatelliteId,
        duration_minutes: u32,
        step_seconds: u32,
    ) -> impl Future<Output = Result<Vec<TrackSample>>> + Send;

    /// Latest ML classification for a satellite; `None` when it was never classified
    fn classification_hint(
        &self,
        id: SatelliteId,
    ) -> impl Future<Output = Result<Option<ClassificationHint>>> + Send;

    fn alerts(
        &self,
        filter: AlertFilter,
    ) -> impl Future<Output = Result<Vec<ConjunctionAlert>>> + Send;

    /// Submit a maneuver request. A well-formed refusal from the solver is
    /// `Ok(ManeuverResult::Rejected)`; `Err` means the solver was unreachable
    /// or answered with something unreadable.
    fn calculate_maneuver(
        &self,
        request: &ManeuverRequest,
    ) -> impl Future<Output = Result<ManeuverResult>> + Send;

    fn health(&self) -> impl Future<Output = Result<HealthStatus>> + Send;

    fn refresh_tles(&self) -> impl Future<Output = Result<RefreshSummary>> + Send;

    fn run_screening(&self) -> impl Future<Output = Result<ScreeningSummary>> + Send;

    fn train_classifier(&self) -> impl Future<Output = Result<String>> + Send;

    fn run_classification(&self) -> impl Future<Output = Result<u64>> + Send;

    fn classification_results(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<ClassificationRecord>>> + Send;

    fn performance_report(&self) -> impl Future<Output = Result<PerformanceReport>> + Send;
}
