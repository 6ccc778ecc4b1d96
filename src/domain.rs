use std::str::FromStr;

use rand::{Rng, distributions::Alphanumeric, thread_rng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::aggregate::{DayTotals, IntensityScale, compute_day};
use crate::category::CategoryKey;
use crate::error::{LedgerError, ValidationError};

const ID_LEN: usize = 8;
const HOURS_PER_DAY: i64 = 24;

/// `hours` is written as a plain JSON number carrying every digit of the decimal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: String,
    pub category: CategoryKey,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub hours: Decimal,
}

/// One calendar day and the entries logged on it, newest first.
///
/// Totals and levels are not stored here; read them through [`DayRecord::totals`]
/// so they always match the entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayRecord {
    day: u32,
    entries: Vec<ActivityEntry>,
}

impl DayRecord {
    pub fn new(day: u32) -> Self {
        Self {
            day,
            entries: Vec::new(),
        }
    }

    pub(crate) fn with_entries(day: u32, entries: Vec<ActivityEntry>) -> Self {
        Self { day, entries }
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn entry(&self, id: &str) -> Option<&ActivityEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the day's entries. `add_entry` and stored-row loading refuse days
    /// whose sum would not fit a `Decimal`, so the saturating fallback is never hit.
    pub fn total_hours(&self) -> Decimal {
        sum_hours(self.entries.iter().map(|entry| entry.hours)).unwrap_or(Decimal::MAX)
    }

    pub fn totals(&self, scale: &IntensityScale) -> DayTotals {
        compute_day(&self.entries, scale)
    }

    pub fn add_entry(
        &mut self,
        category: &str,
        hours_text: &str,
    ) -> Result<ActivityEntry, ValidationError> {
        let mut id = generate_id();
        while self.entry(&id).is_some() {
            id = generate_id();
        }
        self.add_entry_with_id(id, category, hours_text)
    }

    /// Validates and prepends a new entry. The caller guarantees `id` is unused.
    pub(crate) fn add_entry_with_id(
        &mut self,
        id: String,
        category: &str,
        hours_text: &str,
    ) -> Result<ActivityEntry, ValidationError> {
        let hours = parse_hours(hours_text)?;
        let total = self
            .total_hours()
            .checked_add(hours)
            .ok_or_else(|| ValidationError::InvalidHours(hours_text.to_string()))?;
        let category = CategoryKey::from_str(category)?;

        let entry = ActivityEntry {
            id,
            category,
            hours,
        };
        self.entries.insert(0, entry.clone());
        tracing::debug!(day = self.day, id = %entry.id, %category, %hours, "added entry");

        if total > Decimal::from(HOURS_PER_DAY) {
            tracing::warn!(day = self.day, %total, "day total exceeds 24 hours");
        }

        Ok(entry)
    }

    pub fn remove_entry(&mut self, entry_id: &str) -> Result<ActivityEntry, LedgerError> {
        let index = self
            .entries
            .iter()
            .position(|entry| entry.id == entry_id)
            .ok_or_else(|| LedgerError::NotFound {
                day: self.day,
                entry_id: entry_id.to_string(),
            })?;

        let removed = self.entries.remove(index);
        tracing::debug!(day = self.day, id = %removed.id, "removed entry");
        Ok(removed)
    }

    pub fn reset(&mut self) {
        if !self.entries.is_empty() {
            tracing::debug!(day = self.day, cleared = self.entries.len(), "reset day");
        }
        self.entries.clear();
    }
}

/// Parses user-typed hours. A lone comma is read as the decimal separator so
/// locale keypads that emit `1,5` still work.
pub fn parse_hours(hours_text: &str) -> Result<Decimal, ValidationError> {
    let trimmed = hours_text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyHours);
    }

    let normalized = if !trimmed.contains('.') && trimmed.matches(',').count() == 1 {
        trimmed.replace(',', ".")
    } else {
        trimmed.to_string()
    };

    match Decimal::from_str(&normalized) {
        Ok(hours) if hours > Decimal::ZERO => Ok(hours),
        _ => Err(ValidationError::InvalidHours(hours_text.to_string())),
    }
}

/// Overflow-checked sum of hour amounts; `None` when the total does not fit a `Decimal`.
pub fn sum_hours(hours: impl IntoIterator<Item = Decimal>) -> Option<Decimal> {
    hours
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| total.checked_add(value))
}

pub fn generate_id() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

/// Display form of an hour amount: at most two decimals, trailing zeros dropped.
pub fn format_hours(hours: Decimal) -> String {
    format!("{}h", hours.round_dp(2).normalize())
}
