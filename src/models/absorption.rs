use super::{DecayModel, DecayModelKind};
use std::f64::consts::PI;

/// Two-phase approximation: a quarter sine wave rising to the full dose at
/// tmax, followed by first-order decay measured from the peak.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsorptionPhaseModel;

impl DecayModel for AbsorptionPhaseModel {
    fn amount_at(&self, dose: f64, half_life_hours: f64, tmax_hours: f64, hours_since_dose: f64) -> f64 {
        absorption_adjusted_amount(dose, half_life_hours, tmax_hours, hours_since_dose)
    }

    fn kind(&self) -> DecayModelKind {
        DecayModelKind::AbsorptionPhase
    }
}

pub fn absorption_adjusted_amount(
    dose: f64,
    half_life_hours: f64,
    tmax_hours: f64,
    hours_since_dose: f64,
) -> f64 {
    if hours_since_dose < 0.0 {
        return 0.0;
    }

    if hours_since_dose <= tmax_hours {
        let absorbed = ((hours_since_dose / tmax_hours) * PI / 2.0).sin();
        dose * absorbed
    } else {
        let hours_after_peak = hours_since_dose - tmax_hours;
        dose * 0.5_f64.powf(hours_after_peak / half_life_hours)
    }
}
