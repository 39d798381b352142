//! HTTP implementation of the gateway (reqwest)

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::types::ManeuverResponse;
use crate::{
    AlertFilter, ClassificationHint, ClassificationRecord, ConjunctionAlert, GatewayConfig,
    GatewayError, HealthStatus, ManeuverRejection, ManeuverRequest, ManeuverResult,
    PerformanceReport, RefreshSummary, Result, SatelliteId, SatelliteMetadata, SatelliteSummary,
    ScreeningSummary, SsaGateway, TrackSample, MIN_SEARCH_LEN,
};

const MANEUVER_ENDPOINT: &str = "/maneuver/calculate";

/// FastAPI-style error body
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl ErrorBody {
    fn detail_text(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountBody {
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AnalysisBody {
    processed_satellites: u64,
}

/// Live backend client
#[derive(Clone)]
pub struct HttpGateway {
    config: GatewayConfig,
    client: reqwest::Client,
}

impl HttpGateway {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_sec {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| GatewayError::Request {
            endpoint: config.base_url.clone(),
            reason: format!("could not build HTTP client: {}", e),
        })?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn send(&self, endpoint: &str, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        debug!(endpoint, "backend request");
        request.send().await.map_err(|e| {
            warn!(endpoint, error = %e, "backend unreachable");
            GatewayError::Request {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            }
        })
    }

    async fn decode<T: DeserializeOwned>(endpoint: &str, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|b| b.detail_text())
                .ok()
                .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()));
            warn!(endpoint, status = status.as_u16(), "backend returned error status");
            return Err(GatewayError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        response.json::<T>().await.map_err(|e| GatewayError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let request = self.client.get(self.config.url(path)).query(query);
        let response = self.send(path, request).await?;
        Self::decode(path, response).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.client.post(self.config.url(path));
        let response = self.send(path, request).await?;
        Self::decode(path, response).await
    }
}

impl SsaGateway for HttpGateway {
    async fn search_satellites(&self, query: &str) -> Result<Vec<SatelliteSummary>> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Err(GatewayError::QueryTooShort { min: MIN_SEARCH_LEN });
        }
        self.get("/tle/search", &[("q", query.to_string())]).await
    }

    async fn list_satellites(&self, limit: usize) -> Result<Vec<SatelliteSummary>> {
        self.get("/tle/list", &[("limit", limit.to_string())]).await
    }

    async fn satellite_count(&self) -> Result<u64> {
        let body: CountBody = self.get("/tle/count", &[]).await?;
        Ok(body.count.unwrap_or(0))
    }

    async fn satellite_metadata(&self, id: SatelliteId) -> Result<SatelliteMetadata> {
        self.get(&format!("/tle/{}", id), &[]).await
    }

    async fn ground_track(
        &self,
        id: SatelliteId,
        duration_minutes: u32,
        step_seconds: u32,
    ) -> Result<Vec<TrackSample>> {
        self.get(
            &format!("/orbit/propagate/{}", id),
            &[
                ("duration_minutes", duration_minutes.to_string()),
                ("step_seconds", step_seconds.to_string()),
            ],
        )
        .await
    }

    async fn classification_hint(&self, id: SatelliteId) -> Result<Option<ClassificationHint>> {
        self.get(&format!("/ssa/prediction/{}", id), &[]).await
    }

    async fn alerts(&self, filter: AlertFilter) -> Result<Vec<ConjunctionAlert>> {
        self.get(
            "/conjunctions/alerts",
            &[
                ("limit", filter.limit.to_string()),
                ("type", filter.event_type.as_str().to_string()),
            ],
        )
        .await
    }

    async fn calculate_maneuver(&self, request: &ManeuverRequest) -> Result<ManeuverResult> {
        let builder = self
            .client
            .post(self.config.url(MANEUVER_ENDPOINT))
            .json(request);
        let response = self.send(MANEUVER_ENDPOINT, builder).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| GatewayError::Request {
            endpoint: MANEUVER_ENDPOINT.to_string(),
            reason: e.to_string(),
        })?;

        if status.is_success() {
            let raw: ManeuverResponse =
                serde_json::from_slice(&body).map_err(|e| GatewayError::Decode {
                    endpoint: MANEUVER_ENDPOINT.to_string(),
                    reason: e.to_string(),
                })?;
            return raw.into_result(MANEUVER_ENDPOINT);
        }

        // The solver refuses with a JSON `detail`; anything else is a transport problem
        match serde_json::from_slice::<ErrorBody>(&body) {
            Ok(err) => {
                debug!(status = status.as_u16(), "maneuver rejected by solver");
                Ok(ManeuverResult::Rejected(ManeuverRejection {
                    message: format!("Solver returned HTTP {}", status.as_u16()),
                    error_detail: Some(err.detail_text()),
                }))
            }
            Err(_) => Err(GatewayError::Status {
                endpoint: MANEUVER_ENDPOINT.to_string(),
                status: status.as_u16(),
                detail: None,
            }),
        }
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.get("/health", &[]).await
    }

    async fn refresh_tles(&self) -> Result<RefreshSummary> {
        self.post("/tle/refresh").await
    }

    async fn run_screening(&self) -> Result<ScreeningSummary> {
        self.post("/conjunctions/run-screening").await
    }

    async fn train_classifier(&self) -> Result<String> {
        let body: MessageBody = self.post("/ssa/train").await?;
        Ok(body.message)
    }

    async fn run_classification(&self) -> Result<u64> {
        let body: AnalysisBody = self.post("/ssa/run-analysis").await?;
        Ok(body.processed_satellites)
    }

    async fn classification_results(&self, limit: usize) -> Result<Vec<ClassificationRecord>> {
        self.get("/ssa/results", &[("limit", limit.to_string())]).await
    }

    async fn performance_report(&self) -> Result<PerformanceReport> {
        self.get("/ssa/performance-report", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_short_query_issues_no_request() {
        // Nothing listens on port 9; a request would fail with `Request`
        let gateway =
            HttpGateway::new(GatewayConfig::default().with_base_url("http://127.0.0.1:9")).unwrap();
        let err = gateway.search_satellites(" a ").await.unwrap_err();
        assert_eq!(err, GatewayError::QueryTooShort { min: 2 });
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_request_error() {
        let gateway = HttpGateway::new(
            GatewayConfig::default()
                .with_base_url("http://127.0.0.1:9")
                .with_timeout_sec(2),
        )
        .unwrap();
        let err = gateway.health().await.unwrap_err();
        assert!(matches!(err, GatewayError::Request { ref endpoint, .. } if endpoint == "/health"));
    }
}
