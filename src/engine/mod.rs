//! Pure numeric engine. Every function here reads a borrowed snapshot of
//! records and profiles and returns plain values; nothing performs I/O or
//! holds state between calls.

pub mod aggregation;
pub mod scanner;
pub mod planner;
pub mod active;
pub mod reminder;
pub mod curve;

pub use aggregation::{next_peak_time, total_residual_amount, total_residual_percent, SubstanceHistory};
pub use scanner::{first_crossing_below, ScanConfig};
pub use planner::{combined_effect, plan_dose_for_target, DosePlan};
pub use active::{active_substances, ActiveSetConfig, ActiveSubstance};
pub use reminder::{critical_without_intake, due_critical_reminders, Reminder, ReminderPolicy};
pub use curve::{sample_curve, time_grid, CurvePoint};
