//! End-to-end conjunction scene through the dashboard and the GeoJSON surface

use chrono::{Duration, TimeZone, Utc};
use serde_json::json;
use ssa_gateway::{
    ClassificationHint, GatewayConfig, MockGateway, SatelliteId, SatelliteMetadata, TrackSample,
};
use ssa_overlay::color::{PRIMARY_HAZARD_COLOR, SECONDARY_HAZARD_COLOR};
use ssa_overlay::render::HAZARD_ZOOM;
use ssa_overlay::{ConjunctionScene, Dashboard, GeoJsonSurface, GeoPoint};

fn meta(id: u32, name: &str) -> SatelliteMetadata {
    SatelliteMetadata {
        id: SatelliteId(id),
        sat_name: name.to_string(),
        line1: String::new(),
        line2: String::new(),
    }
}

/// One sample per minute from 11:55 to 12:05, latitude = minute offset
fn track(lon: f64) -> Vec<TrackSample> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 11, 55, 0).unwrap();
    (0..=10)
        .map(|i| TrackSample::new(i as f64 - 5.0, lon, start + Duration::minutes(i)))
        .collect()
}

#[tokio::test]
async fn test_visualize_on_fresh_dashboard() {
    let gateway = MockGateway::new()
        .with_satellite(meta(43013, "NOAA 20"), track(100.0))
        .with_satellite(meta(48274, "CSS (TIANHE)"), track(-60.0))
        .with_hint(SatelliteId(43013), ClassificationHint::cluster(0));
    let mut dashboard = Dashboard::new(gateway, GeoJsonSurface::new(), GatewayConfig::default());

    let scene = ConjunctionScene {
        primary_id: SatelliteId(43013),
        primary_name: "Sat-A".to_string(),
        secondary_id: SatelliteId(48274),
        secondary_name: "Sat-B".to_string(),
        tca: ssa_gateway::parse_timestamp("2024-01-01T12:00:00Z").unwrap(),
    };
    let outcome = dashboard.visualize_conjunction(&scene).await.unwrap();

    let registry = dashboard.registry();
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.get(SatelliteId(43013)).unwrap().color, PRIMARY_HAZARD_COLOR);
    assert_eq!(registry.get(SatelliteId(48274)).unwrap().color, SECONDARY_HAZARD_COLOR);

    // 12:00 is the sixth sample of the primary track
    let expected = GeoPoint::new(0.0, 100.0);
    assert_eq!(outcome.hazard, Some(expected));
    assert_eq!(registry.surface().view(), Some((expected, HAZARD_ZOOM)));

    let scene_json = registry.surface().to_feature_collection();
    let hazards = scene_json
        .features
        .iter()
        .filter(|f| f.property("kind") == Some(&json!("hazard")))
        .count();
    assert_eq!(hazards, 1);
    // Two lines, two end markers, one hazard marker
    assert_eq!(scene_json.features.len(), 5);

    let names: Vec<_> = dashboard
        .view()
        .active_satellites
        .iter()
        .map(|r| r.name.as_str())
        .collect();
    assert_eq!(names, ["Sat-A", "Sat-B"]);
}

#[tokio::test]
async fn test_clear_map_empties_scene() {
    let gateway = MockGateway::new().with_satellite(meta(25544, "ISS (ZARYA)"), track(0.0));
    let mut dashboard = Dashboard::new(gateway, GeoJsonSurface::new(), GatewayConfig::default());

    dashboard.add_satellite(SatelliteId(25544), None, None).await.unwrap();
    let surface = dashboard.registry().surface();
    assert_eq!(surface.layer_count(), 2);
    assert_eq!(surface.bounds(), Some([0.0, -5.0, 0.0, 5.0]));

    dashboard.clear_map();
    assert_eq!(dashboard.registry().list().count(), 0);
    assert_eq!(dashboard.registry().surface().layer_count(), 0);
}
