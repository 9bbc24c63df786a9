use super::aggregation::SubstanceHistory;
use crate::dosing::DoseRecord;
use crate::models::{DecayModel, SubstanceProfile};
use crate::time::{minutes_to_millis, Millis};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub at: Millis,
    pub amount: f64,
    pub percent: f64,
}

const MAX_GRID_CAPACITY: usize = 4096;

/// Instants from `start` every `step_minutes` while not past `end`. The grid
/// stops early rather than stepping past the end of the `Millis` range.
pub fn time_grid(start: Millis, end: Millis, step_minutes: i64) -> Vec<Millis> {
    let step = minutes_to_millis(step_minutes);
    if step <= 0 || end < start {
        return Vec::new();
    }

    // Capacity hint only; very wide ranges grow as they go
    let span = end.checked_sub(start).map_or(Millis::MAX, |span| span / step);
    let capacity = usize::try_from(span).map_or(MAX_GRID_CAPACITY, |n| n.saturating_add(1).min(MAX_GRID_CAPACITY));
    let mut points = Vec::with_capacity(capacity);

    let mut at = start;
    while at <= end {
        points.push(at);
        match at.checked_add(step) {
            Some(next) => at = next,
            None => break,
        }
    }
    points
}

/// Samples one substance's superposed curve on a fixed grid. Percentages are
/// relative to the lifetime dose, as everywhere else.
pub fn sample_curve(
    records: &[DoseRecord],
    profile: &SubstanceProfile,
    body_weight_kg: f64,
    start: Millis,
    end: Millis,
    step_minutes: i64,
    model: &dyn DecayModel,
) -> Vec<CurvePoint> {
    let history = SubstanceHistory::new(records, profile, body_weight_kg);

    time_grid(start, end, step_minutes)
        .into_iter()
        .map(|at| {
            let amount = history.amount_at_with(model, at);
            CurvePoint {
                at,
                amount,
                percent: history.percent_of_lifetime(amount),
            }
        })
        .collect()
}
