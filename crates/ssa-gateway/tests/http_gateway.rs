//! HttpGateway against an in-process fake backend

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use ssa_gateway::{
    AlertFilter, EventType, GatewayConfig, GatewayError, HttpGateway, ManeuverRequest,
    ManeuverResult, SatelliteId, SsaGateway,
};

#[derive(Deserialize)]
struct SearchQuery {
    q: String,
}

#[derive(Deserialize)]
struct AlertQuery {
    limit: usize,
    #[serde(rename = "type")]
    event_type: String,
}

async fn search(Query(query): Query<SearchQuery>) -> Json<Value> {
    Json(json!([{ "id": 25544, "sat_name": format!("ISS {}", query.q), "epoch": null, "source": "celestrak" }]))
}

async fn metadata(Path(id): Path<u32>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if id == 25544 {
        Ok(Json(json!({ "id": 25544, "sat_name": "ISS (ZARYA)", "line1": "1 25544U", "line2": "2 25544" })))
    } else {
        Err((StatusCode::NOT_FOUND, Json(json!({ "detail": "Satellite not found" }))))
    }
}

async fn propagate(Path(_id): Path<u32>) -> Json<Value> {
    Json(json!([
        { "time": "2024-01-01T12:00:00+00:00", "lat": 10.0, "lon": 20.0, "alt_km": 420.0,
          "position_km": [0, 0, 0], "velocity_km_s": [0, 0, 0] },
        { "time": "2024-01-01T12:01:00+00:00", "lat": 11.0, "lon": 24.0, "alt_km": 421.0,
          "position_km": [0, 0, 0], "velocity_km_s": [0, 0, 0] }
    ]))
}

async fn alerts(Query(query): Query<AlertQuery>) -> Json<Value> {
    Json(json!([{
        "id": 1, "sat1_id": 1, "sat1_name": "A", "sat2_id": 2, "sat2_name": "B",
        "tca": "2024-01-01T12:00:00", "miss_distance_km": query.limit as f64,
        "rel_velocity_km_s": 10.0, "score": 0.5, "created_at": "", "event_type": query.event_type
    }]))
}

async fn maneuver(Json(body): Json<Value>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body["sat_id_secondary"] == json!(404) {
        return Err((StatusCode::NOT_FOUND, Json(json!({ "detail": "Secondary TLE missing" }))));
    }
    Ok(Json(json!({
        "success": true,
        "burn_time": "2024-01-01T11:00:00",
        "tca_requested": body["tca"],
        "predicted_miss_km": body["target_miss_km"],
        "dv_vector_m_s": [0.01, 0.0, 0.0],
        "dv_magnitude_m_s": 0.01,
        "message": "Prograde burn"
    })))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/health", get(|| async { Json(json!({ "status": "OK", "services": ["api"] })) }))
        .route("/tle/count", get(|| async { Json(json!({ "count": 12540 })) }))
        .route("/tle/search", get(search))
        .route("/tle/:id", get(metadata))
        .route("/orbit/propagate/:id", get(propagate))
        .route("/ssa/prediction/:id", get(|| async { Json(Value::Null) }))
        .route("/conjunctions/alerts", get(alerts))
        .route("/maneuver/calculate", post(maneuver))
        .route(
            "/ssa/performance-report",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({ "detail": "No training run yet" }))) }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn gateway() -> HttpGateway {
    let base = spawn_backend().await;
    HttpGateway::new(GatewayConfig::default().with_base_url(base).with_timeout_sec(5)).unwrap()
}

#[tokio::test]
async fn test_health_and_count() {
    let gw = gateway().await;
    assert_eq!(gw.health().await.unwrap().status, "OK");
    assert_eq!(gw.satellite_count().await.unwrap(), 12540);
}

#[tokio::test]
async fn test_search_encodes_query() {
    let gw = gateway().await;
    let results = gw.search_satellites("zarya & co").await.unwrap();
    assert_eq!(results[0].sat_name, "ISS zarya & co");
}

#[tokio::test]
async fn test_metadata_not_found_carries_detail() {
    let gw = gateway().await;
    let err = gw.satellite_metadata(SatelliteId(1)).await.unwrap_err();
    assert_eq!(
        err,
        GatewayError::Status {
            endpoint: "/tle/1".to_string(),
            status: 404,
            detail: Some("Satellite not found".to_string()),
        }
    );
}

#[tokio::test]
async fn test_ground_track_is_ordered_samples() {
    let gw = gateway().await;
    let track = gw.ground_track(SatelliteId(25544), 100, 60).await.unwrap();
    assert_eq!(track.len(), 2);
    assert!(track[0].time < track[1].time);
    assert_eq!(track[1].lon, 24.0);
}

#[tokio::test]
async fn test_missing_classification_is_none() {
    let gw = gateway().await;
    assert_eq!(gw.classification_hint(SatelliteId(25544)).await.unwrap(), None);
}

#[tokio::test]
async fn test_alert_filter_is_forwarded() {
    let gw = gateway().await;
    let alerts = gw.alerts(AlertFilter::new(EventType::Docking, 7)).await.unwrap();
    assert_eq!(alerts[0].event_type, EventType::Docking);
    assert_eq!(alerts[0].miss_distance_km, 7.0);
}

#[tokio::test]
async fn test_maneuver_success_and_rejection() {
    let gw = gateway().await;
    let tca = ssa_gateway::parse_timestamp("2024-01-01T12:00:00Z").unwrap();

    let ok = gw
        .calculate_maneuver(&ManeuverRequest {
            sat_id_primary: SatelliteId(1),
            sat_id_secondary: SatelliteId(2),
            tca,
            target_miss_km: 2.5,
        })
        .await
        .unwrap();
    match ok {
        ManeuverResult::Success(plan) => {
            assert_eq!(plan.predicted_miss_km, 2.5);
            assert_eq!(plan.message, "Prograde burn");
        }
        other => panic!("expected success, got {:?}", other),
    }

    let rejected = gw
        .calculate_maneuver(&ManeuverRequest {
            sat_id_primary: SatelliteId(1),
            sat_id_secondary: SatelliteId(404),
            tca,
            target_miss_km: 1.0,
        })
        .await
        .unwrap();
    match rejected {
        ManeuverResult::Rejected(r) => assert_eq!(r.reason(), "Secondary TLE missing"),
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn test_report_absent_is_status_error() {
    let gw = gateway().await;
    let err = gw.performance_report().await.unwrap_err();
    assert!(matches!(err, GatewayError::Status { status: 404, .. }));
}
