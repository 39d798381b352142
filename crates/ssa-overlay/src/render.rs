//! Track Rendering Pipeline
//!
//! Turns an overlay's track and color into map primitives through the
//! [`MapSurface`] seam, so nothing above this module knows which map library
//! draws the scene.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ssa_gateway::TrackSample;
use uuid::Uuid;

use crate::registry::SatelliteOverlay;

/// Zoom used when the view jumps to a conjunction point
pub const HAZARD_ZOOM: u8 = 4;

pub const TRACK_LINE_WEIGHT: f64 = 3.0;
pub const TRACK_LINE_OPACITY: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

impl From<&TrackSample> for GeoPoint {
    fn from(sample: &TrackSample) -> Self {
        Self::new(sample.lat, sample.lon)
    }
}

/// Opaque reference to one primitive on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerHandle(pub Uuid);

impl LayerHandle {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LayerHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineStyle {
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
}

impl LineStyle {
    pub fn track(color: &str) -> Self {
        Self {
            color: color.to_string(),
            weight: TRACK_LINE_WEIGHT,
            opacity: TRACK_LINE_OPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarkerKind {
    /// End-of-track dot in the satellite's color
    Satellite { color: String },
    /// Pulsating conjunction marker
    Hazard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub at: GeoPoint,
    pub kind: MarkerKind,
    pub title: String,
    pub body: String,
    /// Open the popup immediately
    pub open: bool,
}

/// Drawing backend. Implementations own the primitives they hand out.
pub trait MapSurface {
    fn add_polyline(&mut self, points: &[GeoPoint], style: &LineStyle) -> LayerHandle;

    fn add_marker(&mut self, marker: MarkerSpec) -> LayerHandle;

    /// Remove a primitive; unknown handles are ignored
    fn remove_layer(&mut self, handle: LayerHandle);

    fn set_view(&mut self, center: GeoPoint, zoom: u8);

    fn fit_bounds(&mut self, points: &[GeoPoint]);
}

/// Primitives owned by one overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayHandles {
    pub line: LayerHandle,
    pub marker: LayerHandle,
}

/// Popup title and body for an overlay's end-of-track marker
pub fn marker_popup(overlay: &SatelliteOverlay) -> Option<(String, String)> {
    let last = overlay.track.last()?;
    Some((
        overlay.name.clone(),
        format!("Lat: {:.2}, Lon: {:.2}", last.lat, last.lon),
    ))
}

/// Draw the track line and end-of-track marker.
///
/// An empty track has nothing to draw and yields `None`.
pub fn render<M: MapSurface + ?Sized>(surface: &mut M, overlay: &SatelliteOverlay) -> Option<OverlayHandles> {
    let (title, body) = marker_popup(overlay)?;
    let points: Vec<GeoPoint> = overlay.track.iter().map(GeoPoint::from).collect();
    let end = *points.last()?;

    let line = surface.add_polyline(&points, &LineStyle::track(&overlay.color));
    let marker = surface.add_marker(MarkerSpec {
        at: end,
        kind: MarkerKind::Satellite {
            color: overlay.color.clone(),
        },
        title,
        body,
        open: false,
    });

    Some(OverlayHandles { line, marker })
}

/// Remove exactly the primitives in `handles`; a second call is a no-op
pub fn unrender<M: MapSurface + ?Sized>(surface: &mut M, handles: &mut Option<OverlayHandles>) {
    if let Some(h) = handles.take() {
        surface.remove_layer(h.line);
        surface.remove_layer(h.marker);
    }
}

/// Conjunction marker at the closest-approach sample
pub fn hazard_marker(sample: &TrackSample, tca: DateTime<Utc>) -> MarkerSpec {
    MarkerSpec {
        at: GeoPoint::from(sample),
        kind: MarkerKind::Hazard,
        title: "PREDICTED CONJUNCTION POINT".to_string(),
        body: format!("TCA: {}", tca.format("%Y-%m-%d %H:%M:%S UTC")),
        open: true,
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Recording surface shared by the crate's unit tests

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceOp {
        Line(LayerHandle, Vec<GeoPoint>, LineStyle),
        Marker(LayerHandle, MarkerSpec),
        Remove(LayerHandle),
        View(GeoPoint, u8),
        Fit(usize),
    }

    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        pub ops: Vec<SurfaceOp>,
    }

    impl RecordingSurface {
        pub fn created(&self) -> Vec<LayerHandle> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    SurfaceOp::Line(h, ..) | SurfaceOp::Marker(h, _) => Some(*h),
                    _ => None,
                })
                .collect()
        }

        pub fn removed(&self) -> Vec<LayerHandle> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    SurfaceOp::Remove(h) => Some(*h),
                    _ => None,
                })
                .collect()
        }

        pub fn live(&self) -> Vec<LayerHandle> {
            let removed = self.removed();
            self.created()
                .into_iter()
                .filter(|h| !removed.contains(h))
                .collect()
        }

        pub fn markers(&self) -> Vec<&MarkerSpec> {
            let live = self.live();
            self.ops
                .iter()
                .filter_map(|op| match op {
                    SurfaceOp::Marker(h, spec) if live.contains(h) => Some(spec),
                    _ => None,
                })
                .collect()
        }

        pub fn last_view(&self) -> Option<(GeoPoint, u8)> {
            self.ops.iter().rev().find_map(|op| match op {
                SurfaceOp::View(center, zoom) => Some((*center, *zoom)),
                _ => None,
            })
        }
    }

    impl MapSurface for RecordingSurface {
        fn add_polyline(&mut self, points: &[GeoPoint], style: &LineStyle) -> LayerHandle {
            let h = LayerHandle::new();
            self.ops.push(SurfaceOp::Line(h, points.to_vec(), style.clone()));
            h
        }

        fn add_marker(&mut self, marker: MarkerSpec) -> LayerHandle {
            let h = LayerHandle::new();
            self.ops.push(SurfaceOp::Marker(h, marker));
            h
        }

        fn remove_layer(&mut self, handle: LayerHandle) {
            self.ops.push(SurfaceOp::Remove(handle));
        }

        fn set_view(&mut self, center: GeoPoint, zoom: u8) {
            self.ops.push(SurfaceOp::View(center, zoom));
        }

        fn fit_bounds(&mut self, points: &[GeoPoint]) {
            self.ops.push(SurfaceOp::Fit(points.len()));
        }
    }
}
