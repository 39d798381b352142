//! SSA Overlay Library
//!
//! Client-side state for the space-situational-awareness dashboard:
//! which satellites are displayed, how they are colored and drawn, the
//! conjunction scene, the maneuver planning workflow and the debounced
//! catalog search. All remote data comes through [`ssa_gateway::SsaGateway`];
//! all drawing goes through [`render::MapSurface`].

use ssa_gateway::{GatewayError, SatelliteId};
use thiserror::Error;

pub mod approach;
pub mod color;
pub mod conjunction;
pub mod dashboard;
pub mod geojson_surface;
pub mod maneuver;
pub mod registry;
pub mod render;
pub mod search;
pub mod tables;
pub mod view;

pub use approach::closest_sample;
pub use color::{ColorPolicy, Regime, RegimeTable, NEON_PALETTE};
pub use conjunction::{ConjunctionScene, ConjunctionVisualizer, VisualizeOutcome};
pub use dashboard::Dashboard;
pub use geojson_surface::GeoJsonSurface;
pub use maneuver::{AlertSummary, ManeuverPanel, ManeuverWorkflow, WorkflowState};
pub use registry::{OverlayRegistry, SatelliteOverlay, TrackWindow};
pub use render::{GeoPoint, LayerHandle, MapSurface, MarkerSpec};
pub use search::{SearchDebouncer, SearchOutcome, SEARCH_DEBOUNCE};
pub use view::{DashboardView, Notice};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("Satellite {0} is already displayed")]
    DuplicateOverlay(SatelliteId),
    #[error("Backend request failed: {0}")]
    RemoteFetch(#[from] GatewayError),
    #[error("No conjunction alert selected")]
    NoActiveAlert,
    #[error("Search query is empty or too short")]
    EmptyQuery,
}

pub type Result<T> = std::result::Result<T, DashboardError>;
