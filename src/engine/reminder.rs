use super::aggregation::SubstanceHistory;
use super::scanner::{scan_history, ScanConfig};
use crate::dosing::{records_for, DoseRecord};
use crate::models::SubstanceProfile;
use crate::time::{day_start, minutes_to_millis, Millis, MS_PER_HOUR};
use log::debug;
use serde::{Deserialize, Serialize};

/// When to warn that a substance's level is about to fall below a threshold.
/// Delivering the reminder is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReminderPolicy {
    pub threshold_percent: f64,
    pub advance_minutes: i64,
    pub scan: ScanConfig,
}

impl Default for ReminderPolicy {
    fn default() -> Self {
        Self {
            threshold_percent: 30.0,
            advance_minutes: 60,
            scan: ScanConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub substance: String,
    pub remind_at: Millis,
    pub drop_at: Millis,
}

impl ReminderPolicy {
    /// `None` when there is no history, the level is already below the
    /// threshold, no crossing lies within the scan horizon, or the advance
    /// warning would already be in the past.
    pub fn evaluate(
        &self,
        records: &[DoseRecord],
        profile: &SubstanceProfile,
        body_weight_kg: f64,
        now: Millis,
    ) -> Option<Reminder> {
        let history = SubstanceHistory::new(records, profile, body_weight_kg);
        if history.is_empty() {
            return None;
        }

        let current = history.percent_at(now);
        if current < self.threshold_percent {
            debug!(
                "{} already at {:.1}%, below {:.1}%",
                profile.name, current, self.threshold_percent
            );
            return None;
        }

        let drop_at = scan_history(&history, self.threshold_percent, now, &self.scan)?;
        let remind_at = drop_at.saturating_sub(minutes_to_millis(self.advance_minutes));
        if remind_at <= now {
            debug!("{} drops at {}, too soon to remind", profile.name, drop_at);
            return None;
        }

        Some(Reminder {
            substance: profile.name.clone(),
            remind_at,
            drop_at,
        })
    }

    /// Reminders for every profile, soonest first.
    pub fn evaluate_all(
        &self,
        records: &[DoseRecord],
        profiles: &[SubstanceProfile],
        body_weight_kg: f64,
        now: Millis,
    ) -> Vec<Reminder> {
        let mut reminders: Vec<Reminder> = profiles.iter()
            .filter_map(|profile| self.evaluate(records, profile, body_weight_kg, now))
            .collect();
        reminders.sort_by_key(|reminder| reminder.remind_at);
        reminders
    }
}

/// Critical substances with no intake recorded at or after `since`
/// (typically the start of the current local day).
pub fn critical_without_intake<'a>(
    records: &[DoseRecord],
    profiles: &'a [SubstanceProfile],
    since: Millis,
) -> Vec<&'a SubstanceProfile> {
    profiles.iter()
        .filter(|profile| profile.is_critical)
        .filter(|profile| !records_for(records, &profile.name).any(|record| record.taken_at >= since))
        .collect()
}

/// The daily critical check as of `now`: nothing before local `hour:00`,
/// afterwards the critical substances not yet taken since local midnight.
pub fn due_critical_reminders<'a>(
    records: &[DoseRecord],
    profiles: &'a [SubstanceProfile],
    now: Millis,
    hour: u32,
    utc_offset_hours: i32,
) -> Vec<&'a SubstanceProfile> {
    let since = match day_start(now, utc_offset_hours) {
        Some(since) => since,
        None => return Vec::new(),
    };

    let due = since.checked_add(i64::from(hour) * MS_PER_HOUR);
    if due.map_or(true, |due| now < due) {
        debug!("Daily critical check not due yet at {}", now);
        return Vec::new();
    }

    critical_without_intake(records, profiles, since)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::{MS_PER_HOUR, MS_PER_MINUTE};

    fn profile() -> SubstanceProfile {
        SubstanceProfile::new("Testamine", 10.0, 1.0)
    }

    #[test]
    fn test_reminder_ahead_of_drop() {
        let records = vec![DoseRecord::new("Testamine", 100.0, 0)];
        let policy = ReminderPolicy::default();

        let reminder = policy.evaluate(&records, &profile(), 70.0, 0).unwrap();
        // 30% of a 10h half-life is reached just after 17.37h.
        assert_eq!(reminder.drop_at, 17 * MS_PER_HOUR + 30 * MS_PER_MINUTE);
        assert_eq!(reminder.remind_at, reminder.drop_at - MS_PER_HOUR);
        assert_eq!(reminder.substance, "Testamine");
    }

    #[test]
    fn test_no_reminder_when_already_below() {
        let records = vec![DoseRecord::new("Testamine", 100.0, 0)];
        let policy = ReminderPolicy::default();
        assert!(policy.evaluate(&records, &profile(), 70.0, 20 * MS_PER_HOUR).is_none());
    }

    #[test]
    fn test_no_reminder_when_too_close() {
        let records = vec![DoseRecord::new("Testamine", 100.0, 0)];
        let policy = ReminderPolicy::default();
        // Drop at 17.5h, reminder would be due at 16.5h.
        assert!(policy.evaluate(&records, &profile(), 70.0, 17 * MS_PER_HOUR).is_none());
        assert!(policy.evaluate(&records, &profile(), 70.0, 16 * MS_PER_HOUR).is_some());
    }

    #[test]
    fn test_no_reminder_without_history_or_crossing() {
        let policy = ReminderPolicy::default();
        assert!(policy.evaluate(&[], &profile(), 70.0, 0).is_none());

        let slow = SubstanceProfile::new("Slowamine", 144.0, 3.0);
        let records = vec![DoseRecord::new("Slowamine", 50.0, 0)];
        assert!(policy.evaluate(&records, &slow, 70.0, 0).is_none());
    }

    #[test]
    fn test_evaluate_all_sorted() {
        let profiles = vec![
            SubstanceProfile::new("Slowish", 20.0, 1.0),
            SubstanceProfile::new("Quick", 4.0, 1.0),
        ];
        let records = vec![
            DoseRecord::new("Slowish", 10.0, 0),
            DoseRecord::new("Quick", 10.0, 0),
        ];

        let reminders = ReminderPolicy::default().evaluate_all(&records, &profiles, 70.0, 0);
        let names: Vec<&str> = reminders.iter().map(|r| r.substance.as_str()).collect();
        assert_eq!(names, vec!["Quick", "Slowish"]);
    }

    #[test]
    fn test_critical_without_intake() {
        let profiles = vec![
            SubstanceProfile::new("Levothyroxine", 144.0, 3.0).critical(),
            SubstanceProfile::new("Lamotrigine", 25.0, 2.5).critical(),
            SubstanceProfile::new("Caffeine", 5.0, 0.5),
        ];
        let day_start = 48 * MS_PER_HOUR;
        let records = vec![
            DoseRecord::new("Levothyroxine", 50.0, day_start - MS_PER_HOUR),
            DoseRecord::new("Lamotrigine", 100.0, day_start),
        ];

        let missing = critical_without_intake(&records, &profiles, day_start);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "Levothyroxine");
    }

    #[test]
    fn test_daily_critical_check_waits_for_hour() {
        let profiles = vec![
            SubstanceProfile::new("Levothyroxine", 144.0, 3.0).critical(),
            SubstanceProfile::new("Caffeine", 5.0, 0.5),
        ];
        let midnight = 10 * 24 * MS_PER_HOUR;
        let records = vec![DoseRecord::new("Levothyroxine", 50.0, midnight - MS_PER_HOUR)];

        // UTC offset 0, check at 07:00
        assert!(due_critical_reminders(&records, &profiles, midnight + 6 * MS_PER_HOUR, 7, 0).is_empty());
        let due = due_critical_reminders(&records, &profiles, midnight + 7 * MS_PER_HOUR, 7, 0);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].name, "Levothyroxine");

        let taken = vec![DoseRecord::new("Levothyroxine", 50.0, midnight + 30 * MS_PER_MINUTE)];
        assert!(due_critical_reminders(&taken, &profiles, midnight + 9 * MS_PER_HOUR, 7, 0).is_empty());
    }
}
