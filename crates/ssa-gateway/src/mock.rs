//! In-memory gateway for tests and demos
//!
//! Serves canned catalog, track, alert and maneuver data and records every
//! call so tests can assert on request counts and ordering.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{
    AlertFilter, ClassificationHint, ClassificationRecord, ConjunctionAlert, GatewayError,
    HealthStatus, ManeuverRejection, ManeuverRequest, ManeuverResult, PerformanceReport,
    RefreshSummary, Result, SatelliteId, SatelliteMetadata, SatelliteSummary, ScreeningSummary,
    SsaGateway, TrackSample, MIN_SEARCH_LEN,
};

/// One recorded gateway call
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall {
    Search(String),
    List(usize),
    Count,
    Metadata(SatelliteId),
    Track(SatelliteId),
    Hint(SatelliteId),
    Alerts(AlertFilter),
    Maneuver(ManeuverRequest),
    Health,
    Refresh,
    Screening,
    Train,
    Classify,
    Results(usize),
    Report,
}

impl GatewayCall {
    fn endpoint(&self) -> &'static str {
        match self {
            Self::Search(_) => "/tle/search",
            Self::List(_) => "/tle/list",
            Self::Count => "/tle/count",
            Self::Metadata(_) => "/tle/{id}",
            Self::Track(_) => "/orbit/propagate/{id}",
            Self::Hint(_) => "/ssa/prediction/{id}",
            Self::Alerts(_) => "/conjunctions/alerts",
            Self::Maneuver(_) => "/maneuver/calculate",
            Self::Health => "/health",
            Self::Refresh => "/tle/refresh",
            Self::Screening => "/conjunctions/run-screening",
            Self::Train => "/ssa/train",
            Self::Classify => "/ssa/run-analysis",
            Self::Results(_) => "/ssa/results",
            Self::Report => "/ssa/performance-report",
        }
    }
}

#[derive(Default)]
struct MockState {
    satellites: Vec<SatelliteMetadata>,
    tracks: HashMap<SatelliteId, Vec<TrackSample>>,
    hints: HashMap<SatelliteId, ClassificationHint>,
    alerts: Vec<ConjunctionAlert>,
    maneuver: Option<ManeuverResult>,
    classifications: Vec<ClassificationRecord>,
    report: Option<PerformanceReport>,
    failing: HashSet<&'static str>,
    search_delay: Duration,
    calls: Vec<GatewayCall>,
}

/// Canned-data gateway; clones share state
#[derive(Clone, Default)]
pub struct MockGateway {
    state: Arc<Mutex<MockState>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the calls recorded so far
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_satellite(self, metadata: SatelliteMetadata, track: Vec<TrackSample>) -> Self {
        {
            let mut state = self.lock();
            state.tracks.insert(metadata.id, track);
            state.satellites.push(metadata);
        }
        self
    }

    pub fn with_hint(self, id: SatelliteId, hint: ClassificationHint) -> Self {
        self.lock().hints.insert(id, hint);
        self
    }

    pub fn with_alerts(self, alerts: Vec<ConjunctionAlert>) -> Self {
        self.lock().alerts = alerts;
        self
    }

    pub fn with_maneuver_result(self, result: ManeuverResult) -> Self {
        self.set_maneuver_result(result);
        self
    }

    pub fn with_classifications(self, records: Vec<ClassificationRecord>) -> Self {
        self.lock().classifications = records;
        self
    }

    pub fn with_report(self, report: PerformanceReport) -> Self {
        self.lock().report = Some(report);
        self
    }

    /// Make every call to the given backend path fail with a transport error
    pub fn failing(self, endpoint: &'static str) -> Self {
        self.lock().failing.insert(endpoint);
        self
    }

    /// Hold every search reply for `delay` after the call is recorded
    pub fn with_search_delay(self, delay: Duration) -> Self {
        self.lock().search_delay = delay;
        self
    }

    pub fn set_maneuver_result(&self, result: ManeuverResult) {
        self.lock().maneuver = Some(result);
    }

    pub fn set_failing(&self, endpoint: &'static str, failing: bool) {
        let mut state = self.lock();
        if failing {
            state.failing.insert(endpoint);
        } else {
            state.failing.remove(endpoint);
        }
    }

    /// Every call recorded so far, in issue order
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.lock().calls.clone()
    }

    /// Number of calls that hit the network-facing side of the gateway
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Record the call and apply failure injection
    fn record(&self, call: GatewayCall) -> Result<MutexGuard<'_, MockState>> {
        let mut state = self.lock();
        let endpoint = call.endpoint();
        state.calls.push(call);
        if state.failing.contains(endpoint) {
            return Err(GatewayError::Request {
                endpoint: endpoint.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(state)
    }

    fn not_found(endpoint: String) -> GatewayError {
        GatewayError::Status {
            endpoint,
            status: 404,
            detail: Some("Satellite not found".to_string()),
        }
    }
}

fn summary(meta: &SatelliteMetadata) -> SatelliteSummary {
    SatelliteSummary {
        id: meta.id,
        sat_name: meta.sat_name.clone(),
        epoch: None,
        source: Some("mock".to_string()),
    }
}

impl SsaGateway for MockGateway {
    async fn search_satellites(&self, query: &str) -> Result<Vec<SatelliteSummary>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Err(GatewayError::QueryTooShort { min: MIN_SEARCH_LEN });
        }
        let (results, delay) = {
            let state = self.record(GatewayCall::Search(query.to_string()))?;
            let needle = query.to_lowercase();
            let results: Vec<SatelliteSummary> = state
                .satellites
                .iter()
                .filter(|s| s.sat_name.to_lowercase().contains(&needle))
                .map(summary)
                .collect();
            (results, state.search_delay)
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(results)
    }

    async fn list_satellites(&self, limit: usize) -> Result<Vec<SatelliteSummary>> {
        let state = self.record(GatewayCall::List(limit))?;
        Ok(state.satellites.iter().take(limit).map(summary).collect())
    }

    async fn satellite_count(&self) -> Result<u64> {
        let state = self.record(GatewayCall::Count)?;
        Ok(state.satellites.len() as u64)
    }

    async fn satellite_metadata(&self, id: SatelliteId) -> Result<SatelliteMetadata> {
        let state = self.record(GatewayCall::Metadata(id))?;
        state
            .satellites
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("/tle/{}", id)))
    }

    async fn ground_track(
        &self,
        id: SatelliteId,
        _duration_minutes: u32,
        _step_seconds: u32,
    ) -> Result<Vec<TrackSample>> {
        let state = self.record(GatewayCall::Track(id))?;
        state
            .tracks
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("/orbit/propagate/{}", id)))
    }

    async fn classification_hint(&self, id: SatelliteId) -> Result<Option<ClassificationHint>> {
        let state = self.record(GatewayCall::Hint(id))?;
        Ok(state.hints.get(&id).cloned())
    }

    async fn alerts(&self, filter: AlertFilter) -> Result<Vec<ConjunctionAlert>> {
        let state = self.record(GatewayCall::Alerts(filter))?;
        Ok(state
            .alerts
            .iter()
            .filter(|a| a.event_type == filter.event_type)
            .take(filter.limit)
            .cloned()
            .collect())
    }

    async fn calculate_maneuver(&self, request: &ManeuverRequest) -> Result<ManeuverResult> {
        let state = self.record(GatewayCall::Maneuver(request.clone()))?;
        Ok(state.maneuver.clone().unwrap_or_else(|| {
            ManeuverResult::Rejected(ManeuverRejection {
                message: "No solver configured".to_string(),
                error_detail: None,
            })
        }))
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.record(GatewayCall::Health)?;
        Ok(HealthStatus {
            status: "OK".to_string(),
            services: vec!["api".to_string(), "database".to_string()],
        })
    }

    async fn refresh_tles(&self) -> Result<RefreshSummary> {
        let state = self.record(GatewayCall::Refresh)?;
        Ok(RefreshSummary {
            message: "TLE data reloaded".to_string(),
            count: state.satellites.len() as u64,
        })
    }

    async fn run_screening(&self) -> Result<ScreeningSummary> {
        let state = self.record(GatewayCall::Screening)?;
        let n = state.satellites.len() as u64;
        Ok(ScreeningSummary {
            status: "completed".to_string(),
            processed_pairs: n * n.saturating_sub(1) / 2,
            alerts_saved: state.alerts.len() as u64,
        })
    }

    async fn train_classifier(&self) -> Result<String> {
        self.record(GatewayCall::Train)?;
        Ok("Model trained".to_string())
    }

    async fn run_classification(&self) -> Result<u64> {
        let state = self.record(GatewayCall::Classify)?;
        Ok(state.satellites.len() as u64)
    }

    async fn classification_results(&self, limit: usize) -> Result<Vec<ClassificationRecord>> {
        let state = self.record(GatewayCall::Results(limit))?;
        Ok(state.classifications.iter().take(limit).cloned().collect())
    }

    async fn performance_report(&self) -> Result<PerformanceReport> {
        let state = self.record(GatewayCall::Report)?;
        state.report.clone().ok_or_else(|| GatewayError::Status {
            endpoint: "/ssa/performance-report".to_string(),
            status: 404,
            detail: Some("No training run yet".to_string()),
        })
    }
}
