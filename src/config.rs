use serde::{Deserialize, Serialize};
use std::path::Path;
use crate::catalog::Catalog;
use crate::engine::{ActiveSetConfig, ReminderPolicy, ScanConfig};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{DecayModelKind, SubstanceProfile};
use log::debug;

/// User settings that every engine call receives explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_body_weight_kg")]
    pub body_weight_kg: f64,
    #[serde(default = "default_reminder_threshold_percent")]
    pub reminder_threshold_percent: f64,
    #[serde(default = "default_reminder_advance_minutes")]
    pub reminder_advance_minutes: i64,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub active: ActiveSetConfig,
    #[serde(default)]
    pub decay_model: DecayModelKind,
    #[serde(default = "default_display_utc_offset_hours")]
    pub display_utc_offset_hours: i32,
    /// Local hour of the daily check for critical substances.
    #[serde(default = "default_critical_reminder_hour")]
    pub critical_reminder_hour: u32,
    #[serde(default)]
    pub custom_substances: Vec<SubstanceProfile>,
}

fn default_body_weight_kg() -> f64 {
    70.0
}

fn default_reminder_threshold_percent() -> f64 {
    30.0
}

fn default_reminder_advance_minutes() -> i64 {
    60
}

fn default_display_utc_offset_hours() -> i32 {
    8
}

fn default_critical_reminder_hour() -> u32 {
    7
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            body_weight_kg: default_body_weight_kg(),
            reminder_threshold_percent: default_reminder_threshold_percent(),
            reminder_advance_minutes: default_reminder_advance_minutes(),
            scan: ScanConfig::default(),
            active: ActiveSetConfig::default(),
            decay_model: DecayModelKind::default(),
            display_utc_offset_hours: default_display_utc_offset_hours(),
            critical_reminder_hour: default_critical_reminder_hour(),
            custom_substances: Vec::new(),
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> TrackerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> TrackerResult<()> {
        if !(self.body_weight_kg > 0.0) {
            return Err(TrackerError::Config(
                "Body weight must be positive".to_string()
            ));
        }

        if !(0.0..=100.0).contains(&self.reminder_threshold_percent) {
            return Err(TrackerError::Config(
                "Reminder threshold must be between 0 and 100 percent".to_string()
            ));
        }

        if self.reminder_advance_minutes < 0 {
            return Err(TrackerError::Config(
                "Reminder advance must not be negative".to_string()
            ));
        }

        self.validate_scan()?;

        if !(self.active.recency_window_hours >= 0.0) {
            return Err(TrackerError::Config(
                "Recency window must not be negative".to_string()
            ));
        }

        if !(0.0..=100.0).contains(&self.active.min_percent) {
            return Err(TrackerError::Config(
                "Active minimum level must be between 0 and 100 percent".to_string()
            ));
        }

        if self.critical_reminder_hour > 23 {
            return Err(TrackerError::Config(
                format!("Critical reminder hour {} is not between 0 and 23", self.critical_reminder_hour)
            ));
        }

        if !(-12..=14).contains(&self.display_utc_offset_hours) {
            return Err(TrackerError::Config(
                format!("UTC offset {} is out of range", self.display_utc_offset_hours)
            ));
        }

        self.validate_custom_substances()?;

        Ok(())
    }

    fn validate_scan(&self) -> TrackerResult<()> {
        if self.scan.step_minutes <= 0 {
            return Err(TrackerError::Config(
                "Scan step must be positive".to_string()
            ));
        }

        if self.scan.max_steps == 0 {
            return Err(TrackerError::Config(
                "Scan must take at least one step".to_string()
            ));
        }

        Ok(())
    }

    fn validate_custom_substances(&self) -> TrackerResult<()> {
        for (index, profile) in self.custom_substances.iter().enumerate() {
            profile.validate()?;

            if self.custom_substances[..index].iter().any(|p| p.name == profile.name) {
                return Err(TrackerError::Config(
                    format!("Custom substance {} is defined twice", profile.name)
                ));
            }
        }

        Ok(())
    }

    pub fn reminder_policy(&self) -> ReminderPolicy {
        ReminderPolicy {
            threshold_percent: self.reminder_threshold_percent,
            advance_minutes: self.reminder_advance_minutes,
            scan: self.scan,
        }
    }

    /// Presets merged with the configured custom substances.
    pub fn catalog(&self) -> TrackerResult<Catalog> {
        debug!("Building catalog with {} custom substances", self.custom_substances.len());
        Catalog::with_presets().with_custom(self.custom_substances.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().unwrap();
        assert_eq!(settings.body_weight_kg, 70.0);
        assert_eq!(settings.scan, ScanConfig::default());
        assert_eq!(settings.reminder_policy(), ReminderPolicy::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "body_weight_kg": 82.5,
            "scan": { "step_minutes": 5 },
            "decay_model": "absorption_phase"
        }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        settings.validate().unwrap();

        assert_eq!(settings.body_weight_kg, 82.5);
        assert_eq!(settings.scan.step_minutes, 5);
        assert_eq!(settings.scan.max_steps, 200);
        assert_eq!(settings.active.recency_window_hours, 72.0);
        assert_eq!(settings.decay_model, DecayModelKind::AbsorptionPhase);
        assert_eq!(settings.reminder_threshold_percent, 30.0);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.body_weight_kg = 0.0;
        assert!(matches!(settings.validate(), Err(TrackerError::Config(_))));

        let mut settings = Settings::default();
        settings.reminder_threshold_percent = 120.0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.scan.step_minutes = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.scan.max_steps = 0;
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.active.min_percent = 150.0;
        assert!(matches!(settings.validate(), Err(TrackerError::Config(_))));

        let mut settings = Settings::default();
        settings.active.min_percent = f64::NAN;
        assert!(matches!(settings.validate(), Err(TrackerError::Config(_))));

        let mut settings = Settings::default();
        settings.critical_reminder_hour = 24;
        assert!(matches!(settings.validate(), Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_critical_reminder_hour_from_json() {
        let settings: Settings = serde_json::from_str(r#"{"critical_reminder_hour": 21}"#).unwrap();
        settings.validate().unwrap();
        assert_eq!(settings.critical_reminder_hour, 21);
        assert_eq!(Settings::default().critical_reminder_hour, 7);
    }

    #[test]
    fn test_duplicate_custom_substances_rejected() {
        let mut settings = Settings::default();
        settings.custom_substances = vec![
            SubstanceProfile::new("Nicotine", 2.0, 0.25),
            SubstanceProfile::new("Nicotine", 2.5, 0.25),
        ];
        assert!(matches!(settings.validate(), Err(TrackerError::Config(_))));
    }

    #[test]
    fn test_from_file_and_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"custom_substances": [{{"name": "Nicotine", "half_life_hours": 2.0, "tmax_hours": 0.25}}]}}"#
        ).unwrap();
        file.flush().unwrap();

        let settings = Settings::from_file(file.path()).unwrap();
        let catalog = settings.catalog().unwrap();
        assert!(catalog.find("Nicotine").unwrap().is_custom);
        assert!(catalog.find("Caffeine").is_some());
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"body_weight_kg": -3}}"#).unwrap();
        file.flush().unwrap();

        assert!(matches!(Settings::from_file(file.path()), Err(TrackerError::Config(_))));
    }
}
