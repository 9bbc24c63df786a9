//! Residual tracking for substance intake.
//!
//! A history of [`dosing::DoseRecord`]s and a [`models::SubstanceProfile`]
//! determine, through first-order decay and linear superposition, how much of
//! a substance remains at any instant. The [`engine`] builds threshold
//! scanning, reverse dose planning, reminders and the active-substance view on
//! top of that. Everything in `engine` and `models` is pure; loading and
//! exporting live in `dosing`, `config` and `output`.

pub mod catalog;
pub mod config;
pub mod dosing;
pub mod engine;
pub mod error;
pub mod models;
pub mod output;
pub mod time;

pub use catalog::Catalog;
pub use config::Settings;
pub use dosing::DoseRecord;
pub use error::{TrackerError, TrackerResult};
pub use models::{DecayModel, DecayModelKind, SubstanceProfile};
pub use time::Millis;
