pub mod first_order;
pub mod absorption;

use crate::error::{TrackerError, TrackerResult};
use serde::{Deserialize, Serialize};

pub use absorption::{absorption_adjusted_amount, AbsorptionPhaseModel};
pub use first_order::{residual_amount, residual_percent, steady_state_amount, FirstOrderModel};

/// Body weight the lipophilic half-life scaling is anchored at.
pub const REFERENCE_WEIGHT_KG: f64 = 70.0;
const WEIGHT_SCALING_EXPONENT: f64 = 0.3;

/// A decay strategy: residual amount of one dose after `hours_since_dose`.
pub trait DecayModel: Send + Sync {
    fn amount_at(&self, dose: f64, half_life_hours: f64, tmax_hours: f64, hours_since_dose: f64) -> f64;
    fn kind(&self) -> DecayModelKind;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecayModelKind {
    /// Plain first-order decay from the moment of intake. Used by every
    /// aggregation, scanning, planning and active-set path.
    #[default]
    FirstOrder,
    /// Sine-shaped rise to the full dose at tmax, then first-order decay.
    AbsorptionPhase,
}

impl std::str::FromStr for DecayModelKind {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_order" | "first-order" => Ok(DecayModelKind::FirstOrder),
            "absorption_phase" | "absorption-phase" | "absorption" => Ok(DecayModelKind::AbsorptionPhase),
            other => Err(TrackerError::Config(format!("Unknown decay model: {}", other))),
        }
    }
}

pub fn create_model(kind: DecayModelKind) -> Box<dyn DecayModel> {
    match kind {
        DecayModelKind::FirstOrder => Box::new(FirstOrderModel),
        DecayModelKind::AbsorptionPhase => Box::new(AbsorptionPhaseModel),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubstanceGroup {
    Maintenance,
    Functional,
    #[default]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstanceProfile {
    pub name: String,
    pub half_life_hours: f64,
    pub tmax_hours: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub is_lipophilic: bool,
    #[serde(default)]
    pub is_critical: bool,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub group: SubstanceGroup,
    #[serde(default)]
    pub default_dose: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

fn default_unit() -> String {
    "mg".to_string()
}

impl SubstanceProfile {
    pub fn new(name: impl Into<String>, half_life_hours: f64, tmax_hours: f64) -> Self {
        Self {
            name: name.into(),
            half_life_hours,
            tmax_hours,
            unit: default_unit(),
            is_lipophilic: false,
            is_critical: false,
            is_custom: false,
            group: SubstanceGroup::Other,
            default_dose: None,
            notes: String::new(),
        }
    }

    pub fn lipophilic(mut self) -> Self {
        self.is_lipophilic = true;
        self
    }

    pub fn critical(mut self) -> Self {
        self.is_critical = true;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn in_group(mut self, group: SubstanceGroup) -> Self {
        self.group = group;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Boundary check for profiles coming from user input. The engine itself
    /// never calls this.
    pub fn validate(&self) -> TrackerResult<()> {
        if self.name.trim().is_empty() {
            return Err(TrackerError::Validation(
                "Substance name must not be empty".to_string()
            ));
        }
        if !(self.half_life_hours > 0.0) {
            return Err(TrackerError::Validation(
                format!("Half-life of {} must be positive", self.name)
            ));
        }
        if !(self.tmax_hours >= 0.0) {
            return Err(TrackerError::Validation(
                format!("Tmax of {} must not be negative", self.name)
            ));
        }
        if let Some(dose) = self.default_dose {
            if dose <= 0.0 {
                return Err(TrackerError::Validation(
                    format!("Default dose of {} must be positive", self.name)
                ));
            }
        }
        Ok(())
    }
}

/// Half-life scaled by `(weight / 70)^0.3` for lipophilic substances,
/// unchanged otherwise. `body_weight_kg` must be positive.
pub fn adjusted_half_life(profile: &SubstanceProfile, body_weight_kg: f64) -> f64 {
    if profile.is_lipophilic {
        profile.half_life_hours * (body_weight_kg / REFERENCE_WEIGHT_KG).powf(WEIGHT_SCALING_EXPONENT)
    } else {
        profile.half_life_hours
    }
}
