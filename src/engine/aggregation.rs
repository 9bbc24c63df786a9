use crate::dosing::{records_for, DoseRecord};
use crate::models::{adjusted_half_life, residual_amount, DecayModel, SubstanceProfile};
use crate::time::{hours_between, hours_to_millis, Millis};

/// The records of one substance, filtered once, with the body-weight adjusted
/// half-life and lifetime dose precomputed for repeated evaluation.
#[derive(Debug, Clone)]
pub struct SubstanceHistory<'a> {
    profile: &'a SubstanceProfile,
    records: Vec<&'a DoseRecord>,
    half_life_hours: f64,
    lifetime_amount: f64,
}

impl<'a> SubstanceHistory<'a> {
    pub fn new(records: &'a [DoseRecord], profile: &'a SubstanceProfile, body_weight_kg: f64) -> Self {
        let records: Vec<&DoseRecord> = records_for(records, &profile.name).collect();
        let lifetime_amount = records.iter().map(|record| record.amount).sum();

        Self {
            profile,
            records,
            half_life_hours: adjusted_half_life(profile, body_weight_kg),
            lifetime_amount,
        }
    }

    pub fn profile(&self) -> &SubstanceProfile {
        self.profile
    }

    pub fn records(&self) -> &[&'a DoseRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn half_life_hours(&self) -> f64 {
        self.half_life_hours
    }

    /// Sum of every amount ever recorded for the substance.
    pub fn lifetime_amount(&self) -> f64 {
        self.lifetime_amount
    }

    /// Superposed first-order residual of every dose at `at`.
    pub fn amount_at(&self, at: Millis) -> f64 {
        self.records.iter()
            .map(|record| residual_amount(record.amount, self.half_life_hours, hours_between(record.taken_at, at)))
            .sum()
    }

    /// Superposed residual under an explicitly chosen decay strategy.
    pub fn amount_at_with(&self, model: &dyn DecayModel, at: Millis) -> f64 {
        self.records.iter()
            .map(|record| model.amount_at(
                record.amount,
                self.half_life_hours,
                self.profile.tmax_hours,
                hours_between(record.taken_at, at),
            ))
            .sum()
    }

    /// Residual as a percentage of the lifetime dose. Shrinks as history
    /// accumulates and is not bounded to 100. Zero with no records or a zero
    /// lifetime dose.
    pub fn percent_at(&self, at: Millis) -> f64 {
        self.percent_of_lifetime(self.amount_at(at))
    }

    pub fn percent_of_lifetime(&self, amount: f64) -> f64 {
        if self.records.is_empty() || self.lifetime_amount == 0.0 {
            return 0.0;
        }
        amount / self.lifetime_amount * 100.0
    }

    pub fn last_taken_at(&self) -> Option<Millis> {
        self.records.iter().map(|record| record.taken_at).max()
    }

    /// Whether any dose falls inside the closed window `[start, end]`.
    pub fn has_record_between(&self, start: Millis, end: Millis) -> bool {
        self.records.iter().any(|record| record.taken_at >= start && record.taken_at <= end)
    }
}

pub fn total_residual_amount(
    records: &[DoseRecord],
    profile: &SubstanceProfile,
    body_weight_kg: f64,
    at: Millis,
) -> f64 {
    SubstanceHistory::new(records, profile, body_weight_kg).amount_at(at)
}

pub fn total_residual_percent(
    records: &[DoseRecord],
    profile: &SubstanceProfile,
    body_weight_kg: f64,
    at: Millis,
) -> f64 {
    SubstanceHistory::new(records, profile, body_weight_kg).percent_at(at)
}

/// Peak of the most recent dose, if it is still ahead of `from`.
pub fn next_peak_time(records: &[DoseRecord], profile: &SubstanceProfile, from: Millis) -> Option<Millis> {
    let last = records_for(records, &profile.name)
        .map(|record| record.taken_at)
        .max()?;
    let peak_at = last + hours_to_millis(profile.tmax_hours);

    if peak_at > from {
        Some(peak_at)
    } else {
        None
    }
}
