use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::aggregate::{
    CategoryCeilings, DayTotals, HeatmapCell, IntensityScale, MonthSummary, compute_heatmap,
    compute_month,
};
use crate::category::{Category, list_categories};
use crate::domain::{ActivityEntry, DayRecord, generate_id};
use crate::error::{AccessError, AggregateError, LedgerError};
use crate::session::Session;

/// Every calendar day of one month, each with its own entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthLedger {
    pub created_at: DateTime<Utc>,
    year: i32,
    month: u32,
    days: Vec<DayRecord>,
}

impl MonthLedger {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        let days_in_month = days_in_month(year, month)?;
        Ok(Self {
            created_at: Utc::now(),
            year,
            month,
            days: (1..=days_in_month).map(DayRecord::new).collect(),
        })
    }

    pub fn for_date(date: NaiveDate) -> Self {
        let days = (1..=days_in_month_of(date)).map(DayRecord::new).collect();
        Self {
            created_at: Utc::now(),
            year: date.year(),
            month: date.month(),
            days,
        }
    }

    /// Rebuilds a month from stored day records. Days without a record come back empty.
    pub(crate) fn from_records(
        year: i32,
        month: u32,
        created_at: DateTime<Utc>,
        records: Vec<DayRecord>,
    ) -> Result<Self, LedgerError> {
        let mut ledger = Self::new(year, month)?;
        ledger.created_at = created_at;
        for record in records {
            let days_in_month = ledger.days_in_month();
            let slot = ledger
                .days
                .get_mut(record.day().wrapping_sub(1) as usize)
                .ok_or(LedgerError::DayOutOfRange {
                    day: record.day(),
                    days_in_month,
                })?;
            *slot = record;
        }
        Ok(ledger)
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month is validated on construction")
    }

    pub fn days_in_month(&self) -> u32 {
        self.days.len() as u32
    }

    pub fn days(&self) -> &[DayRecord] {
        &self.days
    }

    pub fn day(&self, day: u32) -> Result<&DayRecord, LedgerError> {
        let days_in_month = self.days_in_month();
        day.checked_sub(1)
            .and_then(|index| self.days.get(index as usize))
            .ok_or(LedgerError::DayOutOfRange { day, days_in_month })
    }

    fn day_mut(&mut self, day: u32) -> Result<&mut DayRecord, LedgerError> {
        let days_in_month = self.days_in_month();
        day.checked_sub(1)
            .and_then(|index| self.days.get_mut(index as usize))
            .ok_or(LedgerError::DayOutOfRange { day, days_in_month })
    }

    pub fn contains_entry(&self, entry_id: &str) -> bool {
        self.days.iter().any(|record| record.entry(entry_id).is_some())
    }

    fn unused_entry_id(&self) -> String {
        loop {
            let id = generate_id();
            if !self.contains_entry(&id) {
                return id;
            }
        }
    }
}

/// The month as the UI sees it: the ledger plus the settings used to derive
/// levels and summary progress. All user intents go through here.
#[derive(Debug, Clone)]
pub struct MonthView {
    ledger: MonthLedger,
    scale: IntensityScale,
    ceilings: CategoryCeilings,
}

impl MonthView {
    pub fn new(ledger: MonthLedger, scale: IntensityScale, ceilings: CategoryCeilings) -> Self {
        Self {
            ledger,
            scale,
            ceilings,
        }
    }

    /// Hands the month out only to a signed-in session.
    pub fn gate(&mut self, session: &Session) -> Result<&mut Self, AccessError> {
        if !session.is_authenticated() {
            return Err(AccessError::SignedOut);
        }
        Ok(self)
    }

    pub fn ledger(&self) -> &MonthLedger {
        &self.ledger
    }

    pub fn scale(&self) -> &IntensityScale {
        &self.scale
    }

    pub fn categories(&self) -> [Category; 5] {
        list_categories()
    }

    pub fn select_day(&self, day: u32) -> Result<&DayRecord, LedgerError> {
        self.ledger.day(day)
    }

    pub fn day_totals(&self, day: u32) -> Result<DayTotals, LedgerError> {
        Ok(self.select_day(day)?.totals(&self.scale))
    }

    pub fn add_entry(
        &mut self,
        day: u32,
        category: &str,
        hours_text: &str,
    ) -> Result<ActivityEntry, LedgerError> {
        self.ledger.day(day)?;
        let id = self.ledger.unused_entry_id();
        let entry = self.ledger.day_mut(day)?.add_entry_with_id(id, category, hours_text)?;
        Ok(entry)
    }

    pub fn remove_entry(&mut self, day: u32, entry_id: &str) -> Result<ActivityEntry, LedgerError> {
        self.ledger.day_mut(day)?.remove_entry(entry_id)
    }

    pub fn reset_day(&mut self, day: u32) -> Result<(), LedgerError> {
        self.ledger.day_mut(day)?.reset();
        Ok(())
    }

    pub fn heatmap(&self) -> Vec<HeatmapCell> {
        compute_heatmap(self.ledger.first_day(), self.ledger.days(), &self.scale)
    }

    pub fn summary(&self) -> Result<MonthSummary, AggregateError> {
        compute_month(self.ledger.days(), &self.ceilings)
    }

    pub fn month_total(&self) -> Result<Decimal, AggregateError> {
        crate::aggregate::month_total(self.ledger.days())
    }
}

pub fn days_in_month(year: i32, month: u32) -> Result<u32, LedgerError> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(days_in_month_of)
        .ok_or(LedgerError::InvalidMonth { year, month })
}

fn days_in_month_of(date: NaiveDate) -> u32 {
    let first_of_next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    first_of_next
        .map(|next| (next - Duration::days(1)).day())
        .unwrap_or(31)
}

#[cfg(test)]
mod tests {
    use std::sync::LazyLock;

    use rust_decimal::Decimal;

    use super::{MonthLedger, MonthView, days_in_month};
    use crate::aggregate::{CategoryCeilings, IntensityScale};
    use crate::category::CategoryKey;
    use crate::error::{AccessError, AggregateError, LedgerError, ValidationError};
    use crate::logging::TEST_LOGGING;
    use crate::session::Session;

    fn hours(text: &str) -> Decimal {
        text.parse().expect("valid decimal")
    }

    fn february() -> MonthView {
        LazyLock::force(&TEST_LOGGING);
        let ledger = MonthLedger::new(2026, 2).expect("valid month");
        let scale = IntensityScale::new(vec![hours("0"), hours("5.5"), hours("8")]).expect("scale");
        MonthView::new(ledger, scale, CategoryCeilings::default())
    }

    #[test]
    fn creates_one_empty_record_per_day() {
        assert_eq!(days_in_month(2026, 2), Ok(28));
        assert_eq!(days_in_month(2028, 2), Ok(29));
        assert_eq!(days_in_month(2026, 12), Ok(31));
        assert_eq!(
            days_in_month(2026, 13),
            Err(LedgerError::InvalidMonth {
                year: 2026,
                month: 13
            })
        );

        let view = february();
        assert_eq!(view.ledger().days_in_month(), 28);
        assert!(view.ledger().days().iter().all(|record| record.is_empty()));
        assert_eq!(view.ledger().days()[27].day(), 28);
    }

    #[test]
    fn select_day_checks_range() {
        let view = february();
        assert_eq!(view.select_day(1).map(|record| record.day()), Ok(1));
        assert_eq!(view.select_day(28).map(|record| record.day()), Ok(28));
        for day in [0, 29] {
            assert_eq!(
                view.select_day(day),
                Err(LedgerError::DayOutOfRange {
                    day,
                    days_in_month: 28
                })
            );
        }
    }

    #[test]
    fn reads_after_mutation_see_the_mutation() {
        let mut view = february();
        let entry = view.add_entry(5, "gym", "1.5").expect("gym entry");

        let day = view.select_day(5).expect("day 5");
        assert_eq!(day.entries()[0].id, entry.id);
        assert_eq!(view.day_totals(5).expect("totals").total_hours, hours("1.5"));
        assert_eq!(view.heatmap()[4].level, 1);
        let summary = view.summary().expect("summary");
        assert_eq!(summary.per_category_totals[&CategoryKey::Gym], hours("1.5"));

        view.remove_entry(5, &entry.id).expect("remove");
        assert!(view.select_day(5).expect("day 5").is_empty());
        assert_eq!(view.heatmap()[4].level, 0);
    }

    #[test]
    fn reset_day_scenario() {
        let mut view = february();
        view.add_entry(1, "gym", "1.5").expect("gym entry");
        view.add_entry(1, "deep", "4").expect("deep entry");
        assert_eq!(view.day_totals(1).expect("totals").level, 2);

        view.reset_day(1).expect("reset");
        let totals = view.day_totals(1).expect("totals");
        assert!(view.select_day(1).expect("day 1").is_empty());
        assert_eq!(totals.total_hours, Decimal::ZERO);
        assert_eq!(totals.level, 0);
    }

    #[test]
    fn invalid_input_leaves_month_untouched() {
        let mut view = february();
        assert_eq!(
            view.add_entry(2, "gym", ""),
            Err(LedgerError::Validation(ValidationError::EmptyHours))
        );
        assert_eq!(
            view.add_entry(2, "chess", "1"),
            Err(LedgerError::Validation(ValidationError::UnknownCategory(
                "chess".to_string()
            )))
        );
        assert_eq!(
            view.add_entry(30, "gym", "1"),
            Err(LedgerError::DayOutOfRange {
                day: 30,
                days_in_month: 28
            })
        );
        assert_eq!(view.month_total(), Ok(Decimal::ZERO));
    }

    #[test]
    fn huge_amounts_are_refused_or_reported_without_panicking() {
        let mut view = february();
        let max = Decimal::MAX.to_string();
        view.add_entry(1, "gym", &max).expect("largest amount");

        assert_eq!(
            view.add_entry(1, "gym", "1"),
            Err(LedgerError::Validation(ValidationError::InvalidHours(
                "1".to_string()
            )))
        );
        assert_eq!(view.select_day(1).expect("day 1").entries().len(), 1);

        view.add_entry(2, "gym", "1").expect("second day");
        assert_eq!(
            view.summary(),
            Err(AggregateError::CategoryTotalOverflow {
                category: CategoryKey::Gym
            })
        );
        assert_eq!(view.month_total(), Err(AggregateError::MonthTotalOverflow));
        assert_eq!(view.heatmap()[0].level, 3);
        assert_eq!(view.day_totals(2).expect("totals").total_hours, Decimal::ONE);
    }

    #[test]
    fn ids_are_unique_across_the_month() {
        let mut view = february();
        let mut ids = Vec::new();
        for day in 1..=28 {
            ids.push(view.add_entry(day, "rest", "1").expect("rest entry").id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 28);
    }

    #[test]
    fn signed_out_session_is_refused() {
        let mut view = february();
        assert!(matches!(
            view.gate(&Session::signed_out()),
            Err(AccessError::SignedOut)
        ));
        assert!(view.gate(&Session::signed_in("ada")).is_ok());
    }
}
