use crate::dosing::DoseRecord;
use crate::engine::{ActiveSubstance, CurvePoint, DosePlan, Reminder};
use crate::error::TrackerResult;
use crate::time::format_local;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::path::Path;

/// Human label for the free-form record type tag.
pub fn record_type_label(record_type: &str) -> &'static str {
    match record_type {
        "prescription_regular" => "Scheduled prescription",
        "prn" => "As needed",
        "supplement" => "Supplement",
        _ => "Other",
    }
}

pub fn export_records_csv<P: AsRef<Path>>(
    records: &[DoseRecord],
    path: P,
    utc_offset_hours: i32,
) -> TrackerResult<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.write_record(["SUBSTANCE", "AMOUNT", "UNIT", "TAKEN_AT", "TAKEN_AT_LOCAL", "TYPE", "NOTES"])?;

    // Write records
    for record in records {
        writer.write_record(&[
            record.substance.clone(),
            record.amount.to_string(),
            record.unit.clone(),
            record.taken_at.to_string(),
            format_local(record.taken_at, utc_offset_hours),
            record_type_label(&record.record_type).to_string(),
            record.notes.clone(),
        ])?;
    }

    writer.flush()?;
    info!("Exported {} records to {:?}", records.len(), path);
    Ok(())
}

pub fn save_curve_csv<P: AsRef<Path>>(
    substance: &str,
    curve: &[CurvePoint],
    path: P,
    utc_offset_hours: i32,
) -> TrackerResult<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path)?;

    // Write header
    writer.write_record(["SUBSTANCE", "TIME", "TIME_LOCAL", "AMOUNT", "PERCENT"])?;

    // Write data
    for point in curve {
        writer.write_record(&[
            substance.to_string(),
            point.at.to_string(),
            format_local(point.at, utc_offset_hours),
            point.amount.to_string(),
            point.percent.to_string(),
        ])?;
    }

    writer.flush()?;
    info!("Saved {} curve points to {:?}", curve.len(), path);
    Ok(())
}

pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> TrackerResult<()> {
    let file = File::create(path.as_ref())?;
    serde_json::to_writer_pretty(file, value)?;
    info!("Wrote {:?}", path.as_ref());
    Ok(())
}

/// Ten-cell bar for a percentage, clamped to 0..=100 for display only.
pub fn level_bar(percent: f64) -> String {
    let filled = (percent / 10.0).clamp(0.0, 10.0) as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

pub fn format_active(active: &[ActiveSubstance]) -> String {
    if active.is_empty() {
        return "No active substances".to_string();
    }

    active.iter()
        .map(|entry| format!("{:<24} {} {:>5.0}%", entry.profile.name, level_bar(entry.percent), entry.percent))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_plan(plan: &DosePlan, utc_offset_hours: i32) -> String {
    format!(
        "Take {:.2} {} of {} at {} to reach {:.2} {} at {}",
        plan.recommended_dose,
        plan.substance.unit,
        plan.substance.name,
        format_local(plan.administer_at, utc_offset_hours),
        plan.target_residual,
        plan.substance.unit,
        format_local(plan.peak_at, utc_offset_hours),
    )
}

pub fn format_reminder(reminder: &Reminder, utc_offset_hours: i32) -> String {
    format!(
        "{}: expected to fall below threshold at {}; remind at {}",
        reminder.substance,
        format_local(reminder.drop_at, utc_offset_hours),
        format_local(reminder.remind_at, utc_offset_hours),
    )
}
