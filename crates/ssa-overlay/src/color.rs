//! Color Assignment Policy
//!
//! Priority: explicit caller color > orbital-regime color from the classifier
//! hint > fixed palette rotation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ssa_gateway::ClassificationHint;

/// Sequential palette used when nothing better is known
pub const NEON_PALETTE: [&str; 6] = [
    "#00f3ff", "#bc13fe", "#0aff60", "#ffae00", "#ff0055", "#ffff00",
];

/// Forced color of the at-risk object in a conjunction scene
pub const PRIMARY_HAZARD_COLOR: &str = "#00f3ff";

/// Forced color of the threat object in a conjunction scene
pub const SECONDARY_HAZARD_COLOR: &str = "#ff0055";

/// Display attributes of one orbital regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Regime {
    pub label: String,
    pub color: String,
    pub icon: String,
}

impl Regime {
    pub fn new(label: &str, color: &str, icon: &str) -> Self {
        Self {
            label: label.to_string(),
            color: color.to_string(),
            icon: icon.to_string(),
        }
    }
}

/// Classifier cluster id → regime; shared by coloring and the SSA table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeTable {
    entries: BTreeMap<u32, Regime>,
    fallback: Regime,
}

impl Default for RegimeTable {
    fn default() -> Self {
        let entries = [
            (0, Regime::new("LEO - Low Earth Orbit (high traffic)", "#00f3ff", "fa-layer-group")),
            (1, Regime::new("MEO - Medium Earth Orbit (navigation)", "#ffae00", "fa-satellite-dish")),
            (2, Regime::new("GEO - Geostationary (communications belt)", "#bc13fe", "fa-broadcast-tower")),
            (3, Regime::new("HEO - Highly Elliptical (strategic)", "#0aff60", "fa-shield-alt")),
            (4, Regime::new("VLEO - Very Low Earth Orbit", "#ff0055", "fa-meteor")),
        ]
        .into_iter()
        .collect();

        Self {
            entries,
            fallback: Regime::new("Unclassified region", "#666666", "fa-question"),
        }
    }
}

impl RegimeTable {
    pub fn new(entries: BTreeMap<u32, Regime>, fallback: Regime) -> Self {
        Self { entries, fallback }
    }

    pub fn lookup(&self, cluster_id: u32) -> Option<&Regime> {
        self.entries.get(&cluster_id)
    }

    /// Regime for display; unknown or missing clusters get the fallback
    pub fn describe(&self, cluster_id: Option<u32>) -> &Regime {
        cluster_id
            .and_then(|id| self.lookup(id))
            .unwrap_or(&self.fallback)
    }
}

#[derive(Debug, Clone)]
pub struct ColorPolicy {
    palette: Vec<String>,
    regimes: Arc<RegimeTable>,
}

impl Default for ColorPolicy {
    fn default() -> Self {
        Self::new(Vec::new(), Arc::new(RegimeTable::default()))
    }
}

impl ColorPolicy {
    /// An empty palette falls back to [`NEON_PALETTE`]
    pub fn new(palette: Vec<String>, regimes: Arc<RegimeTable>) -> Self {
        let palette = if palette.is_empty() {
            NEON_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            palette
        };
        Self { palette, regimes }
    }

    pub fn regimes(&self) -> &Arc<RegimeTable> {
        &self.regimes
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    pub fn assign(
        &self,
        override_color: Option<&str>,
        hint: Option<&ClassificationHint>,
        current_count: usize,
    ) -> String {
        if let Some(color) = override_color {
            return color.to_string();
        }

        if let Some(regime) = hint
            .and_then(|h| h.cluster_id)
            .and_then(|id| self.regimes.lookup(id))
        {
            return regime.color.clone();
        }

        self.palette[current_count % self.palette.len()].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins_over_hint() {
        let policy = ColorPolicy::default();
        let hint = ClassificationHint::cluster(3);
        assert_eq!(policy.assign(Some("#ff0055"), Some(&hint), 0), "#ff0055");
    }

    #[test]
    fn test_known_hint_uses_regime_color() {
        let policy = ColorPolicy::default();
        let hint = ClassificationHint::cluster(3);
        assert_eq!(policy.assign(None, Some(&hint), 4), "#0aff60");
    }

    #[test]
    fn test_palette_rotation() {
        let policy = ColorPolicy::default();
        assert_eq!(policy.assign(None, None, 7), NEON_PALETTE[1]);
    }

    #[test]
    fn test_unknown_cluster_falls_through_to_palette() {
        let policy = ColorPolicy::default();
        let hint = ClassificationHint::cluster(42);
        assert_eq!(policy.assign(None, Some(&hint), 2), NEON_PALETTE[2]);
        let no_cluster = ClassificationHint::default();
        assert_eq!(policy.assign(None, Some(&no_cluster), 0), NEON_PALETTE[0]);
    }

    #[test]
    fn test_describe_fallback() {
        let table = RegimeTable::default();
        assert_eq!(table.describe(Some(9)).label, "Unclassified region");
        assert_eq!(table.describe(None).color, "#666666");
        assert_eq!(table.describe(Some(2)).icon, "fa-broadcast-tower");
    }
}
