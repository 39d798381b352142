//! Dashboard orchestrator
//!
//! One session of the SSA dashboard. Owns the overlay registry, the maneuver
//! workflow and the presentation state, and sequences every multi-step
//! operation as a chain of awaits on `&mut self`, so registry mutation is
//! serialized without locks.
//!
//! Every failure path leaves something visible: a blocking notice, the status
//! line, or an "unavailable" marker on an overview card.

use ssa_gateway::{
    AlertFilter, ConjunctionAlert, EventType, GatewayConfig, GatewayError, RefreshSummary,
    SatelliteId, ScreeningSummary, SsaGateway, MIN_SEARCH_LEN,
};
use tracing::{debug, error, info, warn};

use crate::color::ColorPolicy;
use crate::conjunction::{ConjunctionScene, ConjunctionVisualizer, VisualizeOutcome};
use crate::maneuver::{ManeuverPanel, ManeuverWorkflow};
use crate::registry::{OverlayRegistry, SatelliteOverlay, TrackWindow};
use crate::render::MapSurface;
use crate::search::{SearchDebouncer, SearchOutcome};
use crate::tables::{
    active_satellite_rows, alert_row, classification_row, dashboard_alert_row, performance_summary,
    satellite_row,
};
use crate::view::{DashboardView, SatelliteDetails, StatValue};
use crate::{DashboardError, Result};

pub struct Dashboard<G: SsaGateway, M: MapSurface> {
    gateway: G,
    config: GatewayConfig,
    registry: OverlayRegistry<M>,
    colors: ColorPolicy,
    visualizer: ConjunctionVisualizer,
    maneuver: ManeuverWorkflow,
    search: SearchDebouncer,
    view: DashboardView,
    alert_type: EventType,
    alerts: Vec<ConjunctionAlert>,
}

impl<G: SsaGateway, M: MapSurface> Dashboard<G, M> {
    pub fn new(gateway: G, surface: M, config: GatewayConfig) -> Self {
        let window = TrackWindow::from(&config);
        Self {
            gateway,
            config,
            registry: OverlayRegistry::new(surface),
            colors: ColorPolicy::default(),
            visualizer: ConjunctionVisualizer::new(window),
            maneuver: ManeuverWorkflow::new(),
            search: SearchDebouncer::default(),
            view: DashboardView::default(),
            alert_type: EventType::Collision,
            alerts: Vec::new(),
        }
    }

    pub fn with_color_policy(mut self, colors: ColorPolicy) -> Self {
        self.colors = colors;
        self
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn registry(&self) -> &OverlayRegistry<M> {
        &self.registry
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut DashboardView {
        &mut self.view
    }

    pub fn maneuver(&self) -> &ManeuverWorkflow {
        &self.maneuver
    }

    /// Alerts from the last `load_alerts`, in table order
    pub fn alerts(&self) -> &[ConjunctionAlert] {
        &self.alerts
    }

    /// Debouncer sharing this dashboard's generation counter
    pub fn search_handle(&self) -> SearchDebouncer {
        self.search.clone()
    }

    fn window(&self) -> TrackWindow {
        TrackWindow::from(&self.config)
    }

    fn refresh_active_list(&mut self) {
        self.view.active_satellites = active_satellite_rows(self.registry.list());
    }

    /// Log, raise a blocking notice and hand the error back
    fn fail<T>(&mut self, context: &str, err: impl Into<DashboardError>) -> Result<T> {
        let err = err.into();
        error!(error = %err, "{}", context);
        self.view.notify_error(format!("{}: {}", context, err));
        Err(err)
    }

    // ------------------------------------------------------------------
    // Map overlays
    // ------------------------------------------------------------------

    /// Add one satellite to the map.
    ///
    /// Order: duplicate check, classification hint (only without an explicit
    /// color), metadata, track, then render and register.
    pub async fn add_satellite(
        &mut self,
        id: SatelliteId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<()> {
        if self.registry.contains(id) {
            self.view.notify(format!("Satellite {} is already on the map", id));
            return Err(DashboardError::DuplicateOverlay(id));
        }

        self.view.begin_loading("Computing orbit...");
        let loaded = self.load_overlay(id, name, color).await;
        self.view.end_loading();

        if let Err(e) = loaded {
            return self.fail("Could not add satellite", e);
        }

        self.refresh_active_list();
        self.registry.fit_overlay(id);
        if self.registry.get(id).is_some_and(|o| o.track.is_empty()) {
            warn!(%id, "empty ground track, nothing drawn");
            self.view.set_status(format!("No track samples for {}", id));
        }
        self.show_details(id);
        info!(%id, total = self.registry.len(), "satellite added to map");
        Ok(())
    }

    async fn load_overlay(
        &mut self,
        id: SatelliteId,
        name: Option<&str>,
        color: Option<&str>,
    ) -> Result<()> {
        let hint = match color {
            Some(_) => None,
            None => match self.gateway.classification_hint(id).await {
                Ok(hint) => hint,
                Err(e) => {
                    warn!(%id, error = %e, "classification hint unavailable, using palette");
                    self.view
                        .set_status(format!("Classification unavailable for {}: {}", id, e));
                    None
                }
            },
        };

        let color = self.colors.assign(color, hint.as_ref(), self.registry.len());
        let overlay = SatelliteOverlay::fetch(&self.gateway, id, name, color, self.window()).await?;
        self.registry.add(overlay)?;
        Ok(())
    }

    pub fn remove_satellite(&mut self, id: SatelliteId) -> bool {
        let removed = self.registry.remove(id);
        if removed {
            self.refresh_active_list();
            if self.view.details.as_ref().is_some_and(|d| d.id == id) {
                self.view.details = None;
            }
        }
        removed
    }

    pub fn clear_map(&mut self) {
        self.registry.clear();
        self.refresh_active_list();
        self.view.details = None;
    }

    /// Fill the details panel from the registry; no network access
    pub fn show_details(&mut self, id: SatelliteId) -> Option<&SatelliteDetails> {
        self.view.details = self.registry.get(id).map(SatelliteDetails::from);
        self.view.details.as_ref()
    }

    /// Jump from the catalog table to a clean map showing one satellite
    pub async fn inspect_satellite(&mut self, id: SatelliteId, name: Option<&str>) -> Result<()> {
        self.clear_map();
        self.add_satellite(id, name, None).await
    }

    // ------------------------------------------------------------------
    // Conjunctions and maneuvers
    // ------------------------------------------------------------------

    pub async fn visualize_conjunction(&mut self, scene: &ConjunctionScene) -> Result<VisualizeOutcome> {
        self.view.details = None;
        self.view.begin_loading("Building conjunction scenario...");
        let outcome = self
            .visualizer
            .visualize(&self.gateway, &mut self.registry, scene)
            .await;
        self.view.end_loading();
        self.refresh_active_list();

        match outcome {
            Ok(outcome) => {
                if !outcome.marker_placed() {
                    self.view
                        .set_status(format!("No track samples for {}", scene.primary_name));
                }
                Ok(outcome)
            }
            Err(e) => self.fail("Visualization failed", e),
        }
    }

    /// Visualize the loaded alert at `index`
    pub async fn watch_alert(&mut self, index: usize) -> Result<Option<VisualizeOutcome>> {
        let Some(scene) = self.alerts.get(index).map(ConjunctionScene::from) else {
            return Ok(None);
        };
        self.visualize_conjunction(&scene).await.map(Some)
    }

    pub fn select_alert(&mut self, alert: ConjunctionAlert) {
        let summary = self.maneuver.select_alert(alert);
        self.view.selected_alert = Some(summary);
    }

    pub fn dismiss_alert(&mut self) {
        self.maneuver.dismiss();
        self.view.selected_alert = None;
    }

    /// Request an avoidance maneuver for the selected alert.
    ///
    /// Without a selection this is `NoActiveAlert` and nothing is shown.
    pub async fn calculate_maneuver(&mut self, target_miss_km: f64) -> Result<ManeuverPanel> {
        if self.maneuver.selected().is_none() {
            return Err(DashboardError::NoActiveAlert);
        }

        self.view.begin_loading("Calculating maneuver...");
        let panel = self
            .maneuver
            .calculate(&self.gateway, target_miss_km)
            .await
            .cloned();
        self.view.end_loading();

        match panel {
            Ok(panel) => Ok(panel),
            Err(e) => self.fail("Maneuver request failed", e),
        }
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Debounced map search; applies the reply only if it is still current.
    ///
    /// Holds `&mut self` through the debounce window. Keystrokes that must
    /// overlap go through [`Self::search_handle`] and [`Self::apply_search`].
    pub async fn search(&mut self, query: &str) -> SearchOutcome {
        let outcome = self.search.search(&self.gateway, query).await;
        self.apply_search(&outcome);
        outcome
    }

    /// Show the outcome of a search run through [`Self::search_handle`].
    /// `Superseded` leaves the dropdown as it is.
    pub fn apply_search(&mut self, outcome: &SearchOutcome) {
        match outcome {
            SearchOutcome::Hidden => self.view.search_results = None,
            SearchOutcome::Results(results) => {
                self.view.search_results = Some(results.iter().map(satellite_row).collect());
            }
            SearchOutcome::Failed(e) => {
                self.view.search_results = None;
                self.view.set_status(format!("Search failed: {}", e));
            }
            SearchOutcome::Superseded => {}
        }
    }

    /// Immediate search for the catalog table
    pub async fn search_catalog(&mut self, query: &str) -> Result<usize> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Err(DashboardError::EmptyQuery);
        }
        match self.gateway.search_satellites(query).await {
            Ok(results) => {
                self.view.satellite_rows = results.iter().map(satellite_row).collect();
                Ok(results.len())
            }
            Err(e) => self.fail("Search failed", e),
        }
    }

    // ------------------------------------------------------------------
    // Overview and tables
    // ------------------------------------------------------------------

    /// Health, catalog size and the latest alerts; each card fails on its own
    pub async fn load_dashboard_stats(&mut self) {
        let filter = AlertFilter::new(self.alert_type, self.config.stats_alert_limit);
        let (health, count, alerts) = futures::join!(
            self.gateway.health(),
            self.gateway.satellite_count(),
            self.gateway.alerts(filter),
        );

        let stats = &mut self.view.stats;
        stats.health = match health {
            Ok(h) => StatValue::Value(if h.status.is_empty() { "OK".to_string() } else { h.status }),
            Err(e) => {
                warn!(error = %e, "health check failed");
                StatValue::Unavailable("ERR".to_string())
            }
        };
        stats.satellite_count = match count {
            Ok(n) if n > 0 => StatValue::Value(n.to_string()),
            Ok(_) => StatValue::Unavailable("--".to_string()),
            Err(e) => {
                warn!(error = %e, "satellite count failed");
                StatValue::Unavailable("--".to_string())
            }
        };
        match alerts {
            Ok(alerts) => {
                stats.alert_count = StatValue::Value(alerts.len().to_string());
                stats.recent_alerts = alerts.iter().map(dashboard_alert_row).collect();
            }
            Err(e) => {
                warn!(error = %e, "recent alerts failed");
                stats.alert_count = StatValue::Unavailable("!".to_string());
                stats.recent_alerts.clear();
            }
        }
    }

    pub async fn load_alerts(&mut self, event_type: EventType) -> Result<usize> {
        self.alert_type = event_type;
        let filter = AlertFilter::new(event_type, self.config.alert_limit);
        match self.gateway.alerts(filter).await {
            Ok(alerts) => {
                self.view.alert_rows = alerts.iter().map(alert_row).collect();
                self.alerts = alerts;
                debug!(%event_type, count = self.alerts.len(), "alerts loaded");
                Ok(self.alerts.len())
            }
            Err(e) => {
                self.view.alert_rows.clear();
                self.alerts.clear();
                self.fail("Could not load alerts", e)
            }
        }
    }

    pub async fn load_satellites(&mut self) -> Result<usize> {
        match self.gateway.list_satellites(self.config.satellite_list_limit).await {
            Ok(list) => {
                self.view.satellite_rows = list.iter().map(satellite_row).collect();
                Ok(list.len())
            }
            Err(e) => {
                self.view.satellite_rows.clear();
                self.fail("Could not load satellites", e)
            }
        }
    }

    pub async fn refresh_tles(&mut self) -> Result<RefreshSummary> {
        self.view.begin_loading("Refreshing TLE catalog...");
        let refreshed = self.gateway.refresh_tles().await;
        self.view.end_loading();

        let summary = match refreshed {
            Ok(s) => s,
            Err(e) => return self.fail("TLE refresh failed", e),
        };
        self.view.notify(summary.message.clone());
        // A failed reload is already on screen; the refresh itself succeeded
        let _ = self.load_satellites().await;
        Ok(summary)
    }

    pub async fn run_screening(&mut self) -> Result<ScreeningSummary> {
        self.view.begin_loading("Screening started...");
        let screened = self.gateway.run_screening().await;
        self.view.end_loading();

        let summary = match screened {
            Ok(s) => s,
            Err(e) => return self.fail("Screening failed", e),
        };
        self.view
            .notify(format!("Screening finished. Processed pairs: {}", summary.processed_pairs));
        let _ = self.load_alerts(self.alert_type).await;
        Ok(summary)
    }

    pub async fn train_classifier(&mut self) -> Result<String> {
        self.view.begin_loading("Training classifier...");
        let trained = self.gateway.train_classifier().await;
        self.view.end_loading();

        match trained {
            Ok(message) => {
                self.view.notify(format!("Training complete: {}", message));
                Ok(message)
            }
            Err(e) => self.fail("Training failed", e),
        }
    }

    pub async fn run_classification(&mut self) -> Result<u64> {
        self.view.begin_loading("Classifying satellites...");
        let classified = self.gateway.run_classification().await;
        self.view.end_loading();

        let processed = match classified {
            Ok(n) => n,
            Err(e) => return self.fail("Classification failed", e),
        };
        self.view
            .notify(format!("Analysis finished: {} satellites classified", processed));
        let _ = self.load_classification_results().await;
        Ok(processed)
    }

    pub async fn load_classification_results(&mut self) -> Result<usize> {
        match self
            .gateway
            .classification_results(self.config.classification_limit)
            .await
        {
            Ok(records) => {
                let regimes = self.colors.regimes().clone();
                self.view.classification_rows = records
                    .iter()
                    .map(|r| classification_row(r, &regimes))
                    .collect();
                Ok(records.len())
            }
            Err(e) => self.fail("Could not load classification results", e),
        }
    }

    /// Load the latest training report. A missing report is not an error.
    pub async fn load_performance_report(&mut self) -> Result<bool> {
        match self.gateway.performance_report().await {
            Ok(report) => {
                self.view.performance = Some(performance_summary(&report));
                Ok(true)
            }
            Err(GatewayError::Status { status: 404, .. }) => {
                self.view.performance = None;
                self.view.set_status("No performance report yet; train the classifier first");
                Ok(false)
            }
            Err(e) => self.fail("Could not load performance report", e),
        }
    }
}
