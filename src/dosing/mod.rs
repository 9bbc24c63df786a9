use crate::error::{TrackerError, TrackerResult};
use crate::time::Millis;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One intake event. Records are matched to profiles by name only; a record
/// whose name matches no profile is ignored by every calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoseRecord {
    pub substance: String,
    pub amount: f64,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub taken_at: Millis,
    #[serde(default = "default_record_type")]
    pub record_type: String,
    #[serde(default)]
    pub notes: String,
}

fn default_unit() -> String {
    "mg".to_string()
}

fn default_record_type() -> String {
    "prn".to_string()
}

impl DoseRecord {
    pub fn new(substance: impl Into<String>, amount: f64, taken_at: Millis) -> Self {
        Self {
            substance: substance.into(),
            amount,
            unit: default_unit(),
            taken_at,
            record_type: default_record_type(),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }
}

/// Records belonging to `substance`, in input order.
pub fn records_for<'a>(records: &'a [DoseRecord], substance: &'a str) -> impl Iterator<Item = &'a DoseRecord> + 'a {
    records.iter().filter(move |record| record.substance == substance)
}

/// Records taken inside the closed window `[start, end]`.
pub fn records_between(records: &[DoseRecord], start: Millis, end: Millis) -> Vec<DoseRecord> {
    records.iter()
        .filter(|record| record.taken_at >= start && record.taken_at <= end)
        .cloned()
        .collect()
}

pub fn sort_by_time(records: &mut [DoseRecord]) {
    records.sort_by_key(|record| record.taken_at);
}

/// Reads a records CSV with header
/// `substance,amount,unit,taken_at,record_type,notes`. Only `substance`,
/// `amount` and `taken_at` are required. The result is sorted by intake time.
pub fn load_records<P: AsRef<Path>>(path: P) -> TrackerResult<Vec<DoseRecord>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;

    // Parse rows
    let mut records = Vec::new();
    for (line, row) in reader.deserialize::<DoseRecord>().enumerate() {
        let record = row?;
        // Reject blank names
        if record.substance.is_empty() {
            return Err(TrackerError::Validation(
                format!("Record {} has an empty substance name", line + 1)
            ));
        }
        records.push(record);
    }

    // Sort by time
    sort_by_time(&mut records);
    info!("Loaded {} dose records from {:?}", records.len(), path);
    debug!("Distinct substances: {}", distinct_substances(&records).len());
    Ok(records)
}

/// Substance names in order of first appearance.
pub fn distinct_substances(records: &[DoseRecord]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for record in records {
        if !names.contains(&record.substance.as_str()) {
            names.push(&record.substance);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_records_for_filters_by_name() {
        let records = vec![
            DoseRecord::new("Caffeine", 100.0, 0),
            DoseRecord::new("Melatonin", 3.0, 10),
            DoseRecord::new("Caffeine", 50.0, 20),
        ];

        let caffeine: Vec<_> = records_for(&records, "Caffeine").collect();
        assert_eq!(caffeine.len(), 2);
        assert_eq!(caffeine[1].amount, 50.0);
        assert_eq!(records_for(&records, "Unknown").count(), 0);
    }

    #[test]
    fn test_records_between_is_inclusive() {
        let records = vec![
            DoseRecord::new("Caffeine", 100.0, 0),
            DoseRecord::new("Caffeine", 100.0, 10),
            DoseRecord::new("Caffeine", 100.0, 20),
        ];

        let window = records_between(&records, 10, 20);
        assert_eq!(window.len(), 2);
        assert_eq!(window[0].taken_at, 10);
    }

    #[test]
    fn test_load_records_from_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "substance,amount,unit,taken_at,record_type,notes").unwrap();
        writeln!(file, "Caffeine,100,mg,7200000,prn,morning").unwrap();
        writeln!(file, "Levothyroxine,50,μg,0,prescription_regular,").unwrap();
        file.flush().unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        // Sorted by intake time.
        assert_eq!(records[0].substance, "Levothyroxine");
        assert_eq!(records[0].unit, "μg");
        assert_eq!(records[1].notes, "morning");
        assert_eq!(distinct_substances(&records), vec!["Levothyroxine", "Caffeine"]);
    }

    #[test]
    fn test_load_records_minimal_columns() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "substance,amount,taken_at").unwrap();
        writeln!(file, "Ibuprofen,400,1000").unwrap();
        file.flush().unwrap();

        let records = load_records(file.path()).unwrap();
        assert_eq!(records[0].unit, "mg");
        assert_eq!(records[0].record_type, "prn");
        assert_eq!(records[0].notes, "");
    }

    #[test]
    fn test_load_records_rejects_bad_amount() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "substance,amount,taken_at").unwrap();
        writeln!(file, "Ibuprofen,lots,1000").unwrap();
        file.flush().unwrap();

        assert!(matches!(load_records(file.path()), Err(TrackerError::Csv(_))));
    }
}
