//! Closest-approach sample search

use chrono::{DateTime, Utc};
use ssa_gateway::TrackSample;

/// Sample whose timestamp is nearest to `tca`.
///
/// Ties keep the earlier sample. An empty track yields `None`.
pub fn closest_sample(track: &[TrackSample], tca: DateTime<Utc>) -> Option<&TrackSample> {
    let mut best: Option<(&TrackSample, i64)> = None;
    for sample in track {
        let diff = (sample.time - tca).num_milliseconds().abs();
        match best {
            Some((_, best_diff)) if diff >= best_diff => {}
            _ => best = Some((sample, diff)),
        }
    }
    best.map(|(sample, _)| sample)
}
