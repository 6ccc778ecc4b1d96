use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::category::CategoryKey;
use crate::domain::{ActivityEntry, DayRecord, sum_hours};
use crate::error::{AggregateError, ConfigError};

/// Ascending hour thresholds that split day totals into intensity levels.
///
/// A total's level is the number of thresholds it strictly exceeds, so with
/// `[0, 5.5, 8]` an empty day is level 0, up to 5.5h is level 1, up to 8h is
/// level 2 and anything above saturates at 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntensityScale {
    thresholds: Vec<Decimal>,
}

impl IntensityScale {
    pub fn new(thresholds: Vec<Decimal>) -> Result<Self, ConfigError> {
        let ascending = thresholds.windows(2).all(|pair| pair[0] < pair[1]);
        let non_negative = thresholds.iter().all(|value| *value >= Decimal::ZERO);
        if thresholds.is_empty() || !ascending || !non_negative {
            return Err(ConfigError::InvalidThresholds);
        }
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> &[Decimal] {
        &self.thresholds
    }

    pub fn max_level(&self) -> u8 {
        self.thresholds.len().min(u8::MAX as usize) as u8
    }

    pub fn level_for(&self, total_hours: Decimal) -> u8 {
        let exceeded = self
            .thresholds
            .iter()
            .take_while(|threshold| total_hours > **threshold)
            .count();
        exceeded.min(u8::MAX as usize) as u8
    }
}

impl Default for IntensityScale {
    fn default() -> Self {
        Self {
            thresholds: vec![Decimal::ZERO, Decimal::new(55, 1), Decimal::from(8)],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTotals {
    pub total_hours: Decimal,
    pub level: u8,
}

/// Totals for one day. A sum past `Decimal::MAX` saturates, which only
/// happens for entries that never went through `DayRecord::add_entry`.
pub fn compute_day(entries: &[ActivityEntry], scale: &IntensityScale) -> DayTotals {
    let total_hours = sum_hours(entries.iter().map(|entry| entry.hours)).unwrap_or(Decimal::MAX);
    DayTotals {
        total_hours,
        level: scale.level_for(total_hours),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapCell {
    pub day: u32,
    pub weekday: Weekday,
    pub total_hours: Decimal,
    pub level: u8,
}

pub fn compute_heatmap(
    first_of_month: NaiveDate,
    days: &[DayRecord],
    scale: &IntensityScale,
) -> Vec<HeatmapCell> {
    days.iter()
        .map(|record| {
            let totals = record.totals(scale);
            let date = first_of_month + Duration::days(i64::from(record.day()) - 1);
            HeatmapCell {
                day: record.day(),
                weekday: date.weekday(),
                total_hours: totals.total_hours,
                level: totals.level,
            }
        })
        .collect()
}

pub fn month_total(days: &[DayRecord]) -> Result<Decimal, AggregateError> {
    sum_hours(days.iter().map(DayRecord::total_hours)).ok_or(AggregateError::MonthTotalOverflow)
}

pub fn active_days(days: &[DayRecord]) -> usize {
    days.iter().filter(|record| !record.is_empty()).count()
}

/// Planning ceiling per category, the hours at which a summary bar is full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCeilings(BTreeMap<CategoryKey, Decimal>);

impl CategoryCeilings {
    pub fn new(ceilings: BTreeMap<CategoryKey, Decimal>) -> Self {
        Self(ceilings)
    }

    pub fn get(&self, category: CategoryKey) -> Option<Decimal> {
        self.0.get(&category).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CategoryKey, Decimal)> + '_ {
        self.0.iter().map(|(key, value)| (*key, *value))
    }
}

impl Default for CategoryCeilings {
    fn default() -> Self {
        Self(
            CategoryKey::ALL
                .into_iter()
                .map(|key| (key, default_ceiling(key)))
                .collect(),
        )
    }
}

pub fn default_ceiling(category: CategoryKey) -> Decimal {
    match category {
        CategoryKey::Deep | CategoryKey::Rest => Decimal::from(60),
        CategoryKey::Study | CategoryKey::Social => Decimal::from(40),
        CategoryKey::Gym => Decimal::from(20),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthSummary {
    pub per_category_totals: BTreeMap<CategoryKey, Decimal>,
    pub per_category_progress: BTreeMap<CategoryKey, Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryRow {
    pub category: CategoryKey,
    pub total_hours: Decimal,
    pub progress: Decimal,
}

impl SummaryRow {
    pub fn progress_percent(&self) -> u16 {
        (self.progress * Decimal::ONE_HUNDRED)
            .round()
            .to_u16()
            .unwrap_or(0)
    }
}

impl MonthSummary {
    /// Rows for the summary panel, largest total first.
    pub fn rows(&self) -> Vec<SummaryRow> {
        let mut rows = CategoryKey::ALL
            .into_iter()
            .map(|category| SummaryRow {
                category,
                total_hours: self
                    .per_category_totals
                    .get(&category)
                    .copied()
                    .unwrap_or_default(),
                progress: self
                    .per_category_progress
                    .get(&category)
                    .copied()
                    .unwrap_or_default(),
            })
            .collect::<Vec<_>>();

        rows.sort_by(|left, right| {
            right
                .total_hours
                .cmp(&left.total_hours)
                .then_with(|| left.category.cmp(&right.category))
        });
        rows
    }
}

pub fn compute_month(
    days: &[DayRecord],
    ceilings: &CategoryCeilings,
) -> Result<MonthSummary, AggregateError> {
    let mut per_category_totals: BTreeMap<CategoryKey, Decimal> = CategoryKey::ALL
        .into_iter()
        .map(|key| (key, Decimal::ZERO))
        .collect();

    for entry in days.iter().flat_map(DayRecord::entries) {
        let total = per_category_totals.entry(entry.category).or_default();
        *total = total
            .checked_add(entry.hours)
            .ok_or(AggregateError::CategoryTotalOverflow {
                category: entry.category,
            })?;
    }

    let mut per_category_progress = BTreeMap::new();
    for (category, total) in &per_category_totals {
        let ceiling = match ceilings.get(*category) {
            Some(value) if value > Decimal::ZERO => value,
            _ => return Err(AggregateError::InvalidCeiling { category: *category }),
        };
        // A quotient too large for Decimal is far past the ceiling anyway.
        let progress = total.checked_div(ceiling).unwrap_or(Decimal::ONE);
        per_category_progress.insert(*category, progress.min(Decimal::ONE));
    }

    Ok(MonthSummary {
        per_category_totals,
        per_category_progress,
    })
}
