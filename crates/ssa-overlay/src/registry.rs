//! Overlay Registry
//!
//! Single source of truth for which satellites are on the map. Domain records
//! ([`SatelliteOverlay`]) are kept apart from the map handles that draw them;
//! both live here, linked by satellite id.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ssa_gateway::{GatewayConfig, SatelliteId, SatelliteMetadata, SsaGateway, TrackSample};
use tracing::debug;

use crate::render::{self, GeoPoint, LayerHandle, MapSurface, MarkerSpec, OverlayHandles};
use crate::{DashboardError, Result};

/// One tracked satellite currently displayed. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteOverlay {
    pub id: SatelliteId,
    /// Display name shown in the marker popup
    pub name: String,
    pub color: String,
    pub metadata: SatelliteMetadata,
    pub track: Vec<TrackSample>,
}

impl SatelliteOverlay {
    /// Fetch metadata, then the ground track, and build the record.
    ///
    /// `name` overrides the catalog name in the popup. Nothing is registered.
    pub async fn fetch<G: SsaGateway>(
        gateway: &G,
        id: SatelliteId,
        name: Option<&str>,
        color: String,
        window: TrackWindow,
    ) -> Result<Self> {
        let metadata = gateway.satellite_metadata(id).await?;
        let track = gateway
            .ground_track(id, window.duration_minutes, window.step_seconds)
            .await?;

        Ok(Self {
            id,
            name: name.map_or_else(|| metadata.sat_name.clone(), str::to_string),
            color,
            metadata,
            track,
        })
    }
}

/// Propagation window requested for each new overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackWindow {
    pub duration_minutes: u32,
    pub step_seconds: u32,
}

impl Default for TrackWindow {
    fn default() -> Self {
        Self {
            duration_minutes: 100,
            step_seconds: 60,
        }
    }
}

impl From<&GatewayConfig> for TrackWindow {
    fn from(config: &GatewayConfig) -> Self {
        Self {
            duration_minutes: config.track_duration_minutes,
            step_seconds: config.track_step_seconds,
        }
    }
}

struct RegistryEntry {
    overlay: SatelliteOverlay,
    handles: Option<OverlayHandles>,
}

pub struct OverlayRegistry<M: MapSurface> {
    surface: M,
    entries: BTreeMap<SatelliteId, RegistryEntry>,
    /// Markers placed by scenarios (conjunction points), not owned by any overlay
    scenario_layers: Vec<LayerHandle>,
}

impl<M: MapSurface> OverlayRegistry<M> {
    pub fn new(surface: M) -> Self {
        Self {
            surface,
            entries: BTreeMap::new(),
            scenario_layers: Vec::new(),
        }
    }

    pub fn contains(&self, id: SatelliteId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: SatelliteId) -> Option<&SatelliteOverlay> {
        self.entries.get(&id).map(|e| &e.overlay)
    }

    pub fn handles(&self, id: SatelliteId) -> Option<OverlayHandles> {
        self.entries.get(&id).and_then(|e| e.handles)
    }

    /// Register and draw an overlay. Fails without touching the map when the
    /// id is already present.
    pub fn add(&mut self, overlay: SatelliteOverlay) -> Result<&SatelliteOverlay> {
        let id = overlay.id;
        if self.contains(id) {
            return Err(DashboardError::DuplicateOverlay(id));
        }

        let handles = render::render(&mut self.surface, &overlay);
        debug!(%id, drawn = handles.is_some(), samples = overlay.track.len(), "overlay added");

        let entry = self
            .entries
            .entry(id)
            .or_insert(RegistryEntry { overlay, handles });
        Ok(&entry.overlay)
    }

    /// Detach and forget an overlay. Returns whether anything was removed.
    pub fn remove(&mut self, id: SatelliteId) -> bool {
        match self.entries.remove(&id) {
            Some(mut entry) => {
                render::unrender(&mut self.surface, &mut entry.handles);
                debug!(%id, "overlay removed");
                true
            }
            None => false,
        }
    }

    /// Remove every overlay one by one, then any scenario markers
    pub fn clear(&mut self) {
        let ids: Vec<SatelliteId> = self.entries.keys().copied().collect();
        for id in ids {
            self.remove(id);
        }
        for handle in self.scenario_layers.drain(..) {
            self.surface.remove_layer(handle);
        }
    }

    /// Current overlays in registry order. Call again to restart.
    pub fn list(&self) -> impl Iterator<Item = (SatelliteId, &SatelliteOverlay)> + '_ {
        self.entries.iter().map(|(id, e)| (*id, &e.overlay))
    }

    pub fn add_scenario_marker(&mut self, marker: MarkerSpec) -> LayerHandle {
        let handle = self.surface.add_marker(marker);
        self.scenario_layers.push(handle);
        handle
    }

    pub fn scenario_markers(&self) -> &[LayerHandle] {
        &self.scenario_layers
    }

    pub fn set_view(&mut self, center: GeoPoint, zoom: u8) {
        self.surface.set_view(center, zoom);
    }

    /// Fit the view to one overlay's track
    pub fn fit_overlay(&mut self, id: SatelliteId) {
        if let Some(entry) = self.entries.get(&id) {
            let points: Vec<GeoPoint> = entry.overlay.track.iter().map(GeoPoint::from).collect();
            if !points.is_empty() {
                self.surface.fit_bounds(&points);
            }
        }
    }

    pub fn surface(&self) -> &M {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut M {
        &mut self.surface
    }
}

impl<M: MapSurface> Drop for OverlayRegistry<M> {
    fn drop(&mut self) {
        // Session teardown: leave no primitives behind on a shared surface
        self.clear();
    }
}
