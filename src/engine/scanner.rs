use super::aggregation::SubstanceHistory;
use crate::dosing::DoseRecord;
use crate::models::SubstanceProfile;
use crate::time::{minutes_to_millis, Millis};
use log::debug;
use serde::{Deserialize, Serialize};

/// Fixed step and bounded horizon of a forward scan. The aggregated curve is a
/// sum of exponentials, so crossings are found by stepping rather than solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_step_minutes")]
    pub step_minutes: i64,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

fn default_step_minutes() -> i64 {
    15
}

fn default_max_steps() -> usize {
    200
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            step_minutes: default_step_minutes(),
            max_steps: default_max_steps(),
        }
    }
}

impl ScanConfig {
    pub fn step_millis(&self) -> Millis {
        minutes_to_millis(self.step_minutes)
    }

    /// Furthest instant the scan will evaluate, relative to its start.
    pub fn horizon_millis(&self) -> Millis {
        let steps = Millis::try_from(self.max_steps).unwrap_or(Millis::MAX);
        self.step_millis().saturating_mul(steps)
    }
}

/// First instant `from + k * step` (k >= 1) whose lifetime-relative percent is
/// strictly below `threshold_percent`. The level at `from` itself is never
/// inspected, so a curve that is already below yields `from + step`.
pub fn first_crossing_below(
    records: &[DoseRecord],
    profile: &SubstanceProfile,
    body_weight_kg: f64,
    threshold_percent: f64,
    from: Millis,
    scan: &ScanConfig,
) -> Option<Millis> {
    let history = SubstanceHistory::new(records, profile, body_weight_kg);
    scan_history(&history, threshold_percent, from, scan)
}

/// Same scan over an already filtered history.
pub fn scan_history(
    history: &SubstanceHistory<'_>,
    threshold_percent: f64,
    from: Millis,
    scan: &ScanConfig,
) -> Option<Millis> {
    if history.is_empty() || history.lifetime_amount() == 0.0 {
        return None;
    }

    let step = scan.step_millis();
    let mut at = from;
    for _ in 0..scan.max_steps {
        // Stop at the end of the representable range
        at = at.checked_add(step)?;
        if history.percent_at(at) < threshold_percent {
            debug!(
                "{} drops below {:.1}% at {}",
                history.profile().name, threshold_percent, at
            );
            return Some(at);
        }
    }

    debug!(
        "{} stays above {:.1}% for {} steps from {}",
        history.profile().name, threshold_percent, scan.max_steps, from
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::aggregation::total_residual_percent;
    use crate::time::{MS_PER_HOUR, MS_PER_MINUTE};

    fn profile(half_life: f64) -> SubstanceProfile {
        SubstanceProfile::new("Testamine", half_life, 1.0)
    }

    #[test]
    fn test_default_horizon_is_fifty_hours() {
        let scan = ScanConfig::default();
        assert_eq!(scan.step_minutes, 15);
        assert_eq!(scan.max_steps, 200);
        assert_eq!(scan.horizon_millis(), 50 * MS_PER_HOUR);
    }

    #[test]
    fn test_finds_first_step_below_threshold() {
        let profile = profile(10.0);
        let records = vec![DoseRecord::new("Testamine", 100.0, 0)];
        let scan = ScanConfig::default();

        // 50% is reached exactly at 10h; strictly below is the following step.
        let crossing = first_crossing_below(&records, &profile, 70.0, 50.0, 0, &scan).unwrap();
        assert_eq!(crossing, 10 * MS_PER_HOUR + 15 * MS_PER_MINUTE);

        let previous = crossing - scan.step_millis();
        assert!(total_residual_percent(&records, &profile, 70.0, previous) >= 50.0);
        assert!(total_residual_percent(&records, &profile, 70.0, crossing) < 50.0);
    }

    #[test]
    fn test_crossing_is_on_step_grid() {
        let profile = profile(3.0);
        let records = vec![DoseRecord::new("Testamine", 100.0, 0)];
        let from = 7 * MS_PER_MINUTE;
        let scan = ScanConfig::default();

        let crossing = first_crossing_below(&records, &profile, 70.0, 30.0, from, &scan).unwrap();
        assert_eq!((crossing - from) % scan.step_millis(), 0);
    }

    #[test]
    fn test_no_crossing_within_horizon() {
        let profile = profile(144.0);
        let records = vec![DoseRecord::new("Testamine", 50.0, 0)];

        // After 50h of a 144h half-life roughly 79% remains.
        let result = first_crossing_below(&records, &profile, 70.0, 30.0, 0, &ScanConfig::default());
        assert_eq!(result, None);
    }

    #[test]
    fn test_shorter_horizon_config() {
        let profile = profile(10.0);
        let records = vec![DoseRecord::new("Testamine", 100.0, 0)];
        let scan = ScanConfig { step_minutes: 60, max_steps: 5 };

        assert_eq!(first_crossing_below(&records, &profile, 70.0, 50.0, 0, &scan), None);

        let wider = ScanConfig { step_minutes: 60, max_steps: 11 };
        assert_eq!(first_crossing_below(&records, &profile, 70.0, 50.0, 0, &wider), Some(11 * MS_PER_HOUR));
    }

    #[test]
    fn test_already_below_yields_first_step() {
        let profile = profile(1.0);
        let records = vec![DoseRecord::new("Testamine", 100.0, 0)];
        let from = 24 * MS_PER_HOUR;
        let scan = ScanConfig::default();

        let crossing = first_crossing_below(&records, &profile, 70.0, 30.0, from, &scan);
        assert_eq!(crossing, Some(from + scan.step_millis()));
    }

    #[test]
    fn test_scan_stops_at_end_of_range() {
        let profile = profile(10.0);
        let records = vec![DoseRecord::new("Testamine", 100.0, 0)];
        let scan = ScanConfig::default();
        let from = Millis::MAX - 2 * scan.step_millis() - 1;

        // Already below, so the first representable step is the answer
        assert_eq!(
            first_crossing_below(&records, &profile, 70.0, 30.0, from, &scan),
            Some(from + scan.step_millis())
        );
        // Never below, and the range runs out long before the step budget
        assert_eq!(first_crossing_below(&records, &profile, 70.0, 0.0, from, &scan), None);

        let huge = ScanConfig { step_minutes: i64::MAX, max_steps: usize::MAX };
        assert_eq!(huge.horizon_millis(), Millis::MAX);
    }

    #[test]
    fn test_no_records_is_none() {
        let profile = profile(10.0);
        let records = vec![DoseRecord::new("Otherine", 100.0, 0)];
        assert_eq!(first_crossing_below(&records, &profile, 70.0, 30.0, 0, &ScanConfig::default()), None);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let profile = profile(8.0);
        let records = vec![
            DoseRecord::new("Testamine", 100.0, 0),
            DoseRecord::new("Testamine", 50.0, 3 * MS_PER_HOUR),
        ];
        let snapshot = records.clone();
        let scan = ScanConfig::default();

        let first = first_crossing_below(&records, &profile, 70.0, 25.0, MS_PER_HOUR, &scan);
        let second = first_crossing_below(&records, &profile, 70.0, 25.0, MS_PER_HOUR, &scan);
        assert!(first.is_some());
        assert_eq!(first, second);
        assert_eq!(records, snapshot);
    }
}
