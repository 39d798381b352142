//! Conjunction Visualizer
//!
//! Builds the two-satellite hazard scene for a conjunction alert: the map is
//! cleared, the at-risk object and the threat are loaded in fixed hazard
//! colors, and a marker is dropped on the primary's track sample nearest to
//! the time of closest approach.
//!
//! Loading is sequential. If the secondary fails, the primary stays on the
//! map; callers see the error and decide what to show.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ssa_gateway::{ConjunctionAlert, SatelliteId, SsaGateway};
use tracing::{info, warn};

use crate::approach::closest_sample;
use crate::color::{PRIMARY_HAZARD_COLOR, SECONDARY_HAZARD_COLOR};
use crate::registry::{OverlayRegistry, SatelliteOverlay, TrackWindow};
use crate::render::{hazard_marker, GeoPoint, LayerHandle, MapSurface, HAZARD_ZOOM};
use crate::{DashboardError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConjunctionScene {
    pub primary_id: SatelliteId,
    pub primary_name: String,
    pub secondary_id: SatelliteId,
    pub secondary_name: String,
    pub tca: DateTime<Utc>,
}

impl From<&ConjunctionAlert> for ConjunctionScene {
    fn from(alert: &ConjunctionAlert) -> Self {
        Self {
            primary_id: alert.sat1_id,
            primary_name: alert.sat1_name.clone(),
            secondary_id: alert.sat2_id,
            secondary_name: alert.sat2_name.clone(),
            tca: alert.tca,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualizeOutcome {
    /// Closest-approach location on the primary's track
    pub hazard: Option<GeoPoint>,
    pub marker: Option<LayerHandle>,
}

impl VisualizeOutcome {
    pub fn marker_placed(&self) -> bool {
        self.marker.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConjunctionVisualizer {
    window: TrackWindow,
}

impl ConjunctionVisualizer {
    pub fn new(window: TrackWindow) -> Self {
        Self { window }
    }

    async fn load<G: SsaGateway, M: MapSurface>(
        &self,
        gateway: &G,
        registry: &mut OverlayRegistry<M>,
        id: SatelliteId,
        name: &str,
        color: &str,
    ) -> Result<()> {
        if registry.contains(id) {
            return Err(DashboardError::DuplicateOverlay(id));
        }
        let overlay =
            SatelliteOverlay::fetch(gateway, id, Some(name), color.to_string(), self.window).await?;
        registry.add(overlay)?;
        Ok(())
    }

    pub async fn visualize<G: SsaGateway, M: MapSurface>(
        &self,
        gateway: &G,
        registry: &mut OverlayRegistry<M>,
        scene: &ConjunctionScene,
    ) -> Result<VisualizeOutcome> {
        registry.clear();
        info!(
            primary = %scene.primary_id,
            secondary = %scene.secondary_id,
            tca = %scene.tca,
            "building conjunction scene"
        );

        self.load(gateway, registry, scene.primary_id, &scene.primary_name, PRIMARY_HAZARD_COLOR)
            .await?;
        self.load(gateway, registry, scene.secondary_id, &scene.secondary_name, SECONDARY_HAZARD_COLOR)
            .await?;

        let closest = registry
            .get(scene.primary_id)
            .and_then(|primary| closest_sample(&primary.track, scene.tca))
            .copied();

        let Some(sample) = closest else {
            warn!(primary = %scene.primary_id, "primary track is empty, no hazard marker");
            return Ok(VisualizeOutcome {
                hazard: None,
                marker: None,
            });
        };

        let at = GeoPoint::from(&sample);
        let marker = registry.add_scenario_marker(hazard_marker(&sample, scene.tca));
        registry.set_view(at, HAZARD_ZOOM);

        Ok(VisualizeOutcome {
            hazard: Some(at),
            marker: Some(marker),
        })
    }
}
