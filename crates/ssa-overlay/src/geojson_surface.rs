//! GeoJSON map surface
//!
//! Headless [`MapSurface`] that keeps the scene as GeoJSON features, for the
//! console and for anything that wants the rendered map as data.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use crate::render::{GeoPoint, LayerHandle, LineStyle, MapSurface, MarkerKind, MarkerSpec};

#[derive(Debug, Clone, Default)]
pub struct GeoJsonSurface {
    layers: Vec<(LayerHandle, Feature)>,
    view: Option<(GeoPoint, u8)>,
    bounds: Option<[f64; 4]>,
}

fn position(p: &GeoPoint) -> Vec<f64> {
    vec![p.lon, p.lat]
}

fn feature(geometry: Value, handle: LayerHandle, properties: serde_json::Value) -> Feature {
    let mut properties = match properties {
        serde_json::Value::Object(map) => map,
        _ => JsonObject::new(),
    };
    properties.insert("layer".to_string(), json!(handle.0.to_string()));
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geometry)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

impl GeoJsonSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn view(&self) -> Option<(GeoPoint, u8)> {
        self.view
    }

    /// `[min_lon, min_lat, max_lon, max_lat]` of the last fit request
    pub fn bounds(&self) -> Option<[f64; 4]> {
        self.bounds
    }

    /// Current scene; the view and fitted bounds travel as foreign members
    pub fn to_feature_collection(&self) -> FeatureCollection {
        let mut members = JsonObject::new();
        if let Some((center, zoom)) = self.view {
            members.insert(
                "view".to_string(),
                json!({ "center": [center.lon, center.lat], "zoom": zoom }),
            );
        }

        FeatureCollection {
            bbox: self.bounds.map(|b| b.to_vec()),
            features: self.layers.iter().map(|(_, f)| f.clone()).collect(),
            foreign_members: if members.is_empty() { None } else { Some(members) },
        }
    }
}

impl MapSurface for GeoJsonSurface {
    fn add_polyline(&mut self, points: &[GeoPoint], style: &LineStyle) -> LayerHandle {
        let handle = LayerHandle::new();
        let line = Value::LineString(points.iter().map(position).collect());
        let props = json!({
            "kind": "track",
            "stroke": style.color,
            "stroke-width": style.weight,
            "stroke-opacity": style.opacity,
        });
        self.layers.push((handle, feature(line, handle, props)));
        handle
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> LayerHandle {
        let handle = LayerHandle::new();
        let (kind, color) = match &marker.kind {
            MarkerKind::Satellite { color } => ("satellite", Some(color.clone())),
            MarkerKind::Hazard => ("hazard", None),
        };
        let props = json!({
            "kind": kind,
            "marker-color": color,
            "title": marker.title,
            "description": marker.body,
            "open": marker.open,
        });
        self.layers
            .push((handle, feature(Value::Point(position(&marker.at)), handle, props)));
        handle
    }

    fn remove_layer(&mut self, handle: LayerHandle) {
        self.layers.retain(|(h, _)| *h != handle);
    }

    fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn fit_bounds(&mut self, points: &[GeoPoint]) {
        self.bounds = points.iter().fold(None, |acc: Option<[f64; 4]>, p| {
            Some(match acc {
                None => [p.lon, p.lat, p.lon, p.lat],
                Some([w, s, e, n]) => [w.min(p.lon), s.min(p.lat), e.max(p.lon), n.max(p.lat)],
            })
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_and_marker_export() {
        let mut surface = GeoJsonSurface::new();
        let points = [GeoPoint::new(10.0, 20.0), GeoPoint::new(-5.0, 30.0)];
        surface.add_polyline(&points, &LineStyle::track("#00f3ff"));
        let marker = surface.add_marker(MarkerSpec {
            at: points[1],
            kind: MarkerKind::Hazard,
            title: "PREDICTED CONJUNCTION POINT".to_string(),
            body: "TCA".to_string(),
            open: true,
        });
        surface.fit_bounds(&points);
        surface.set_view(points[1], 4);

        let fc = surface.to_feature_collection();
        assert_eq!(fc.features.len(), 2);
        assert_eq!(fc.bbox, Some(vec![20.0, -5.0, 30.0, 10.0]));
        let view = &fc.foreign_members.as_ref().unwrap()["view"];
        assert_eq!(view["zoom"], 4);
        assert_eq!(view["center"], json!([30.0, -5.0]));

        let line = fc.features[0].geometry.as_ref().unwrap();
        assert_eq!(line.value, Value::LineString(vec![vec![20.0, 10.0], vec![30.0, -5.0]]));
        assert_eq!(fc.features[0].property("stroke"), Some(&json!("#00f3ff")));

        surface.remove_layer(marker);
        surface.remove_layer(marker);
        assert_eq!(surface.layer_count(), 1);
    }

    #[test]
    fn test_empty_scene_has_no_members() {
        let fc = GeoJsonSurface::new().to_feature_collection();
        assert!(fc.features.is_empty());
        assert!(fc.foreign_members.is_none());
        assert!(fc.bbox.is_none());
    }
}
