use super::{DecayModel, DecayModelKind};

/// Single-compartment first-order elimination with no absorption phase.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstOrderModel;

impl DecayModel for FirstOrderModel {
    fn amount_at(&self, dose: f64, half_life_hours: f64, _tmax_hours: f64, hours_since_dose: f64) -> f64 {
        residual_amount(dose, half_life_hours, hours_since_dose)
    }

    fn kind(&self) -> DecayModelKind {
        DecayModelKind::FirstOrder
    }
}

/// Percentage of a single dose remaining; 0 before the dose is taken.
pub fn residual_percent(half_life_hours: f64, hours_since_dose: f64) -> f64 {
    if hours_since_dose < 0.0 {
        return 0.0;
    }
    100.0 * 0.5_f64.powf(hours_since_dose / half_life_hours)
}

/// Absolute amount of a single dose remaining; 0 before the dose is taken.
pub fn residual_amount(dose: f64, half_life_hours: f64, hours_since_dose: f64) -> f64 {
    if hours_since_dose < 0.0 {
        return 0.0;
    }
    dose * 0.5_f64.powf(hours_since_dose / half_life_hours)
}

/// Peak amount under regular dosing every `interval_hours`.
pub fn steady_state_amount(dose: f64, half_life_hours: f64, interval_hours: f64) -> f64 {
    let accumulation = 1.0 / (1.0 - 0.5_f64.powf(interval_hours / half_life_hours));
    dose * accumulation
}
