use super::aggregation::total_residual_amount;
use crate::dosing::DoseRecord;
use crate::models::{adjusted_half_life, residual_amount, SubstanceProfile};
use crate::time::{hours_between, hours_to_millis, Millis};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DosePlan {
    pub substance: SubstanceProfile,
    pub recommended_dose: f64,
    pub administer_at: Millis,
    pub peak_at: Millis,
    /// The residual the new dose alone contributes at `peak_at`, i.e. the gap
    /// between the target and what earlier doses still leave behind.
    pub target_residual: f64,
}

impl DosePlan {
    pub fn lead_time_hours(&self) -> f64 {
        hours_between(self.administer_at, self.peak_at)
    }
}

/// Sizes a single dose, taken `tmax` before `target_at`, so that together with
/// the residual of `existing` doses the target amount is present at
/// `target_at`. Returns `None` when the existing residual already meets it.
pub fn plan_dose_for_target(
    profile: &SubstanceProfile,
    target_at: Millis,
    target_amount: f64,
    body_weight_kg: f64,
    existing: &[DoseRecord],
) -> Option<DosePlan> {
    let half_life = adjusted_half_life(profile, body_weight_kg);
    let existing_amount = total_residual_amount(existing, profile, body_weight_kg, target_at);

    let needed = (target_amount - existing_amount).max(0.0);
    if needed <= 0.0 {
        debug!(
            "{}: residual {:.3} already meets target {:.3}",
            profile.name, existing_amount, target_amount
        );
        return None;
    }

    let decay_to_peak = 0.5_f64.powf(profile.tmax_hours / half_life);
    let recommended_dose = needed / decay_to_peak;
    let administer_at = target_at.saturating_sub(hours_to_millis(profile.tmax_hours));

    debug!(
        "{}: need {:.3} at {}, take {:.3} at {}",
        profile.name, needed, target_at, recommended_dose, administer_at
    );

    Some(DosePlan {
        substance: profile.clone(),
        recommended_dose,
        administer_at,
        peak_at: target_at,
        target_residual: needed,
    })
}

/// Total residual at `at` of every planned dose, each decayed from its own
/// administration instant with the profile's unadjusted half-life.
pub fn combined_effect(plans: &[DosePlan], at: Millis) -> f64 {
    plans.iter()
        .map(|plan| residual_amount(
            plan.recommended_dose,
            plan.substance.half_life_hours,
            hours_between(plan.administer_at, at),
        ))
        .sum()
}
