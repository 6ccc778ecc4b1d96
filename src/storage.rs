use std::collections::HashSet;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{ActivityEntry, DayRecord, sum_hours};
use crate::error::StorageError;
use crate::month::MonthLedger;

const DAYS_MARKER: &str = "\n=== DAYS ===\n";
const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthHeader {
    pub schema_version: u32,
    pub created_at: DateTime<Utc>,
    pub year: i32,
    pub month: u32,
}

/// Persisted shape of one day: `{ day, entries: [{ id, category, hours }] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRow {
    pub day: u32,
    pub entries: Vec<ActivityEntry>,
}

pub fn serialize_day(record: &DayRecord) -> DayRow {
    DayRow {
        day: record.day(),
        entries: record.entries().to_vec(),
    }
}

pub fn deserialize_day(row: DayRow, days_in_month: u32) -> Result<DayRecord, StorageError> {
    if row.day == 0 || row.day > days_in_month {
        return Err(StorageError::InvalidRecord(format!(
            "day {} is outside 1..={days_in_month}",
            row.day
        )));
    }

    let mut seen = HashSet::new();
    for entry in &row.entries {
        if entry.hours <= Decimal::ZERO {
            return Err(StorageError::InvalidRecord(format!(
                "entry {} on day {} has non-positive hours",
                entry.id, row.day
            )));
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(StorageError::InvalidRecord(format!(
                "entry id {} repeats on day {}",
                entry.id, row.day
            )));
        }
    }

    if sum_hours(row.entries.iter().map(|entry| entry.hours)).is_none() {
        return Err(StorageError::InvalidRecord(format!(
            "hours on day {} are too large to add up",
            row.day
        )));
    }

    Ok(DayRecord::with_entries(row.day, row.entries))
}

/// Loads a month ledger. A missing or blank file yields an empty month for `fallback`.
pub fn load_month(path: &Path, fallback: NaiveDate) -> Result<MonthLedger, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(MonthLedger::for_date(fallback)),
        Err(err) => return Err(StorageError::Io(err)),
    };

    if raw.trim().is_empty() {
        return Ok(MonthLedger::for_date(fallback));
    }

    let (header_blob, days_blob) = raw
        .split_once(DAYS_MARKER)
        .unwrap_or((raw.as_str(), ""));

    let header: MonthHeader = toml::from_str(header_blob)?;
    if header.schema_version != SCHEMA_VERSION {
        return Err(StorageError::InvalidRecord(format!(
            "unsupported schema version {}",
            header.schema_version
        )));
    }

    let days_in_month = crate::month::days_in_month(header.year, header.month)
        .map_err(|err| StorageError::InvalidRecord(err.to_string()))?;

    let mut records = Vec::new();
    let mut seen_days = HashSet::new();
    let mut seen_ids = HashSet::new();
    for (index, line) in days_blob.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let row: DayRow = serde_json::from_str(line).map_err(|source| StorageError::JsonDecode {
            line: index + 1,
            source,
        })?;
        if !seen_days.insert(row.day) {
            return Err(StorageError::InvalidRecord(format!("day {} appears twice", row.day)));
        }
        let record = deserialize_day(row, days_in_month)?;
        for entry in record.entries() {
            if !seen_ids.insert(entry.id.clone()) {
                return Err(StorageError::InvalidRecord(format!(
                    "entry id {} is used on more than one day",
                    entry.id
                )));
            }
        }
        records.push(record);
    }

    let ledger = MonthLedger::from_records(header.year, header.month, header.created_at, records)
        .map_err(|err| StorageError::InvalidRecord(err.to_string()))?;
    tracing::info!(path = %path.display(), year = ledger.year(), month = ledger.month(), "loaded month ledger");
    Ok(ledger)
}

pub fn save_month(path: &Path, ledger: &MonthLedger) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let header = MonthHeader {
        schema_version: SCHEMA_VERSION,
        created_at: ledger.created_at,
        year: ledger.year(),
        month: ledger.month(),
    };
    let header = toml::to_string_pretty(&header)?;
    let mut file = fs::File::create(path)?;
    file.write_all(header.as_bytes())?;
    file.write_all(DAYS_MARKER.as_bytes())?;

    for record in ledger.days().iter().filter(|record| !record.is_empty()) {
        let line = serde_json::to_string(&serialize_day(record)).map_err(StorageError::JsonEncode)?;
        file.write_all(line.as_bytes())?;
        file.write_all(b"\n")?;
    }

    tracing::debug!(path = %path.display(), "saved month ledger");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::{DayRow, deserialize_day, load_month, save_month, serialize_day};
    use crate::category::CategoryKey;
    use crate::domain::DayRecord;
    use crate::error::StorageError;
    use crate::month::MonthLedger;

    fn hours(text: &str) -> Decimal {
        text.parse().expect("valid decimal")
    }

    #[test]
    fn day_rows_use_numeric_hours() {
        let mut day = DayRecord::new(4);
        let entry = day.add_entry("gym", "1.5").expect("gym entry");

        let value = serde_json::to_value(serialize_day(&day)).expect("encode");
        assert_eq!(
            value,
            json!({ "day": 4, "entries": [{ "id": entry.id, "category": "gym", "hours": 1.5 }] })
        );

        let row: DayRow = serde_json::from_value(value).expect("decode");
        assert_eq!(deserialize_day(row, 28).expect("valid row"), day);
    }

    #[test]
    fn rejects_rows_that_break_invariants() {
        let row: DayRow = serde_json::from_value(json!({
            "day": 2,
            "entries": [{ "id": "a", "category": "rest", "hours": 0 }]
        }))
        .expect("decode");
        assert!(matches!(deserialize_day(row, 28), Err(StorageError::InvalidRecord(_))));

        let row = DayRow {
            day: 29,
            entries: Vec::new(),
        };
        assert!(matches!(deserialize_day(row, 28), Err(StorageError::InvalidRecord(_))));

        let unknown = serde_json::from_value::<DayRow>(json!({
            "day": 1,
            "entries": [{ "id": "a", "category": "", "hours": 1 }]
        }));
        assert!(unknown.is_err());
    }

    #[test]
    fn round_trips_toml_header_and_day_lines() {
        let mut ledger = MonthLedger::new(2026, 2).expect("valid month");
        let mut records = ledger.days().to_vec();
        records[0].add_entry("deep", "4").expect("deep entry");
        records[0].add_entry("gym", "1.5").expect("gym entry");
        records[13].add_entry("social", "0.1").expect("social entry");
        ledger = MonthLedger::from_records(2026, 2, ledger.created_at, records).expect("records");

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("2026-02.ledger");
        save_month(&path, &ledger).expect("save should succeed");

        let raw = fs::read_to_string(&path).expect("read back");
        assert!(raw.contains("=== DAYS ==="));
        assert_eq!(raw.lines().filter(|line| line.starts_with('{')).count(), 2);

        let fallback = NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date");
        let loaded = load_month(&path, fallback).expect("load should succeed");
        assert_eq!(loaded, ledger);
        let first = loaded.day(1).expect("day 1");
        assert_eq!(first.entries()[0].category, CategoryKey::Gym);
        assert_eq!(first.total_hours(), hours("5.5"));
        assert_eq!(loaded.day(14).expect("day 14").total_hours(), hours("0.1"));
    }

    #[test]
    fn hours_keep_every_digit_through_save_and_load() {
        let amounts = [
            "0.3333333333333333333",
            "12345678901234567.25",
            "79228162514264337593543950335",
        ];
        let mut ledger = MonthLedger::new(2026, 3).expect("valid month");
        let mut records = ledger.days().to_vec();
        for (index, amount) in amounts.iter().enumerate() {
            records[index].add_entry("study", amount).expect("study entry");
        }
        ledger = MonthLedger::from_records(2026, 3, ledger.created_at, records).expect("records");

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("2026-03.ledger");
        save_month(&path, &ledger).expect("save should succeed");

        let raw = fs::read_to_string(&path).expect("read back");
        for amount in amounts {
            assert!(
                raw.contains(&format!("\"hours\":{amount}")),
                "{amount} not written exactly"
            );
        }

        let fallback = NaiveDate::from_ymd_opt(2030, 1, 1).expect("valid date");
        let loaded = load_month(&path, fallback).expect("load should succeed");
        assert_eq!(loaded, ledger);
        for (index, amount) in amounts.iter().enumerate() {
            let day = loaded.day(index as u32 + 1).expect("day");
            assert_eq!(day.entries()[0].hours.to_string(), *amount);
        }
    }

    #[test]
    fn rejects_rows_whose_hours_overflow() {
        let row: DayRow = serde_json::from_str(
            r#"{"day":3,"entries":[{"id":"a","category":"gym","hours":79228162514264337593543950335},{"id":"b","category":"gym","hours":1}]}"#,
        )
        .expect("decode");
        assert!(matches!(deserialize_day(row, 31), Err(StorageError::InvalidRecord(_))));
    }

    #[test]
    fn missing_file_starts_an_empty_month() {
        let dir = tempfile::tempdir().expect("temp dir");
        let fallback = NaiveDate::from_ymd_opt(2026, 4, 10).expect("valid date");
        let ledger = load_month(&dir.path().join("absent.ledger"), fallback).expect("empty month");
        assert_eq!((ledger.year(), ledger.month(), ledger.days_in_month()), (2026, 4, 30));
    }

    #[test]
    fn rejects_duplicate_days_and_ids() {
        let dir = tempfile::tempdir().expect("temp dir");
        let fallback = NaiveDate::from_ymd_opt(2026, 2, 1).expect("valid date");
        let header = "schema_version = 1\ncreated_at = \"2026-02-01T00:00:00Z\"\nyear = 2026\nmonth = 2\n";

        let path = dir.path().join("dup_day.ledger");
        fs::write(
            &path,
            format!(
                "{header}\n=== DAYS ===\n{}\n{}\n",
                r#"{"day":1,"entries":[{"id":"a","category":"gym","hours":1}]}"#,
                r#"{"day":1,"entries":[{"id":"b","category":"gym","hours":1}]}"#
            ),
        )
        .expect("write");
        assert!(matches!(load_month(&path, fallback), Err(StorageError::InvalidRecord(_))));

        let path = dir.path().join("dup_id.ledger");
        fs::write(
            &path,
            format!(
                "{header}\n=== DAYS ===\n{}\n{}\n",
                r#"{"day":1,"entries":[{"id":"a","category":"gym","hours":1}]}"#,
                r#"{"day":2,"entries":[{"id":"a","category":"rest","hours":2}]}"#
            ),
        )
        .expect("write");
        assert!(matches!(load_month(&path, fallback), Err(StorageError::InvalidRecord(_))));
    }
}
