use super::aggregation::SubstanceHistory;
use crate::dosing::DoseRecord;
use crate::models::SubstanceProfile;
use crate::time::{hours_to_millis, Millis};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveSetConfig {
    #[serde(default = "default_recency_window_hours")]
    pub recency_window_hours: f64,
    #[serde(default = "default_min_percent")]
    pub min_percent: f64,
}

fn default_recency_window_hours() -> f64 {
    72.0
}

fn default_min_percent() -> f64 {
    5.0
}

impl Default for ActiveSetConfig {
    fn default() -> Self {
        Self {
            recency_window_hours: default_recency_window_hours(),
            min_percent: default_min_percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSubstance {
    pub profile: SubstanceProfile,
    pub percent: f64,
}

/// Substances with at least one dose in `[at - window, at]` and a lifetime
/// relative level strictly above `min_percent`, highest level first. Recency
/// is a hard gate: older history alone never qualifies a substance, though it
/// still contributes to the level of one that does qualify.
pub fn active_substances(
    records: &[DoseRecord],
    profiles: &[SubstanceProfile],
    body_weight_kg: f64,
    at: Millis,
    config: &ActiveSetConfig,
) -> Vec<ActiveSubstance> {
    let window_start = at.saturating_sub(hours_to_millis(config.recency_window_hours));

    let mut active: Vec<ActiveSubstance> = profiles.iter()
        .filter_map(|profile| {
            let history = SubstanceHistory::new(records, profile, body_weight_kg);
            if !history.has_record_between(window_start, at) {
                return None;
            }

            let percent = history.percent_at(at);
            if percent > config.min_percent {
                Some(ActiveSubstance { profile: profile.clone(), percent })
            } else {
                None
            }
        })
        .collect();

    active.sort_by(|a, b| b.percent.partial_cmp(&a.percent).unwrap_or(Ordering::Equal));
    active
}
