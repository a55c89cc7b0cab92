//! Availability Resolver: which calendar dates in a month have open slots.
//!
//! Resolution walks a fallback chain. The modern `availability` collection is
//! queried first; on error or an empty result the legacy `coach_availability`
//! collection is tried; when both fail or yield nothing usable a synthesized
//! heuristic keeps the calendar from ever going empty.

use std::{collections::BTreeSet, sync::Arc};

use time::{Date, Duration, Month, OffsetDateTime, Weekday, util};
use tracing::warn;
use uuid::Uuid;

use crate::{
    config::BackendMode,
    dao::{
        booking_store::BookingStore,
        models::{LocationEntity, OpenSlotEntity, WeeklyHourEntity},
    },
};

/// A calendar month, the resolver's unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRef {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: Month,
}

impl MonthRef {
    /// Build a month reference from a 1-based month number.
    pub fn new(year: i32, month: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        Some(Self { year, month })
    }

    /// First day of the month.
    pub fn first_day(self) -> Date {
        // The (year, month, 1) triple is valid for every representable month.
        Date::from_calendar_date(self.year, self.month, 1)
            .unwrap_or(Date::MIN)
    }

    /// Number of days in the month.
    pub fn day_count(self) -> u8 {
        util::days_in_year_month(self.year, self.month)
    }

    /// Iterate every date of the month.
    pub fn days(self) -> impl Iterator<Item = Date> {
        let first = self.first_day();
        (0..self.day_count()).filter_map(move |offset| first.checked_add(Duration::days(offset as i64)))
    }

    /// UTC instant at the start of the month.
    pub fn start_instant(self) -> OffsetDateTime {
        self.first_day().midnight().assume_utc()
    }

    /// UTC instant just past the end of the month.
    pub fn end_instant(self) -> OffsetDateTime {
        self.start_instant() + Duration::days(self.day_count() as i64)
    }
}

/// Where availability rows came from, as a strategy over the two coexisting
/// schema shapes plus the synthesized fallback.
#[derive(Debug, Clone)]
pub enum AvailabilitySource {
    /// Modern timestamp-range rows from the `availability` collection.
    Modern(Vec<OpenSlotEntity>),
    /// Legacy weekly recurrence rows from `coach_availability`.
    Legacy(Vec<WeeklyHourEntity>),
    /// No usable rows anywhere; synthesize dates from the backend mode.
    Heuristic(BackendMode),
}

/// Query the fallback chain and return whichever source produced rows.
///
/// Persistence errors are logged and treated as "no rows"; they never escape
/// to the caller.
pub async fn load_availability_source(
    store: Option<Arc<dyn BookingStore>>,
    month: MonthRef,
    location_id: Option<Uuid>,
    mode: BackendMode,
) -> AvailabilitySource {
    let Some(store) = store else {
        return AvailabilitySource::Heuristic(mode);
    };

    match store
        .open_slots_in_range(location_id, month.start_instant(), month.end_instant())
        .await
    {
        Ok(rows) if !rows.is_empty() => return AvailabilitySource::Modern(rows),
        Ok(_) => {}
        Err(err) => warn!(error = %err, "modern availability query failed; trying legacy schema"),
    }

    match store.weekly_hours().await {
        Ok(rows) if !rows.is_empty() => AvailabilitySource::Legacy(rows),
        Ok(_) => AvailabilitySource::Heuristic(mode),
        Err(err) => {
            warn!(error = %err, "legacy availability query failed; using heuristic dates");
            AvailabilitySource::Heuristic(mode)
        }
    }
}

/// Resolve the set of selectable dates in `month`.
///
/// All returned dates are clamped to `date >= today`. The result is never
/// empty while the month still has a future day: an empty computation falls
/// through to the heuristic set.
pub fn resolve_available_dates(
    month: MonthRef,
    today: Date,
    location: Option<&LocationEntity>,
    source: &AvailabilitySource,
    mode: BackendMode,
) -> BTreeSet<Date> {
    let dates: BTreeSet<Date> = month
        .days()
        .filter(|date| *date >= today)
        .filter(|date| date_is_available(*date, location, source))
        .collect();

    if !dates.is_empty() {
        return dates;
    }

    heuristic_dates(month, today, mode)
}

fn date_is_available(date: Date, location: Option<&LocationEntity>, source: &AvailabilitySource) -> bool {
    match source {
        AvailabilitySource::Modern(rows) => {
            let day_start = date.midnight().assume_utc();
            let day_end = day_start + Duration::DAY;
            rows.iter()
                .filter(|row| row.is_open())
                .any(|row| row.starts_at < day_end && row.ends_at > day_start)
        }
        AvailabilitySource::Legacy(rows) => rows
            .iter()
            .filter(|row| row.is_active)
            .filter(|row| row.day_of_week == day_of_week_number(date.weekday()))
            .any(|row| legacy_location_matches(row, location)),
        AvailabilitySource::Heuristic(mode) => match mode {
            BackendMode::Unconfigured => is_weekday(date.weekday()),
            BackendMode::Configured => true,
        },
    }
}

/// Synthesized date set used when no real rows are usable.
///
/// Without a backend the calendar offers future weekdays; with a configured
/// but empty backend, every future date. If the weekday set comes up empty
/// (a month tail of pure weekend days) the full future set is used so the
/// calendar still shows something selectable.
pub fn heuristic_dates(month: MonthRef, today: Date, mode: BackendMode) -> BTreeSet<Date> {
    let future = |date: &Date| *date >= today;

    if mode == BackendMode::Unconfigured {
        let weekdays: BTreeSet<Date> = month
            .days()
            .filter(future)
            .filter(|date| is_weekday(date.weekday()))
            .collect();
        if !weekdays.is_empty() {
            return weekdays;
        }
    }

    month.days().filter(future).collect()
}

fn legacy_location_matches(row: &WeeklyHourEntity, location: Option<&LocationEntity>) -> bool {
    let Some(location) = location else {
        return true;
    };
    let label = row.location.trim();
    label.eq_ignore_ascii_case(location.name.trim())
        || label.eq_ignore_ascii_case(location.city.trim())
}

/// Day-of-week as stored by the legacy schema: 0 = Sunday through 6 = Saturday.
pub fn day_of_week_number(weekday: Weekday) -> u8 {
    weekday.number_days_from_sunday()
}

fn is_weekday(weekday: Weekday) -> bool {
    !matches!(weekday, Weekday::Saturday | Weekday::Sunday)
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;
    use crate::dao::booking_store::memory::{MemoryBookingStore, fixtures::FailingStore};

    fn september() -> MonthRef {
        MonthRef::new(2026, 9).unwrap()
    }

    fn venue(name: &str, city: &str) -> LocationEntity {
        LocationEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            city: city.into(),
            address: String::new(),
        }
    }

    fn open_slot(starts_at: OffsetDateTime, hours: i64) -> OpenSlotEntity {
        OpenSlotEntity {
            coach_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            starts_at,
            ends_at: starts_at + Duration::hours(hours),
            status: "open".into(),
        }
    }

    fn weekly(day: u8, location: &str) -> WeeklyHourEntity {
        WeeklyHourEntity {
            coach_id: Uuid::new_v4(),
            day_of_week: day,
            start_time: "09:00".into(),
            end_time: "17:00".into(),
            location: location.into(),
            is_active: true,
        }
    }

    #[test]
    fn modern_rows_mark_only_covered_dates() {
        let source = AvailabilitySource::Modern(vec![
            open_slot(datetime!(2026 - 09 - 07 09:00 UTC), 4),
            open_slot(datetime!(2026 - 09 - 12 10:00 UTC), 2),
        ]);
        let dates = resolve_available_dates(
            september(),
            date!(2026 - 09 - 01),
            None,
            &source,
            BackendMode::Configured,
        );
        assert_eq!(
            dates.into_iter().collect::<Vec<_>>(),
            vec![date!(2026 - 09 - 07), date!(2026 - 09 - 12)]
        );
    }

    #[test]
    fn modern_row_spanning_midnight_covers_both_dates() {
        let source =
            AvailabilitySource::Modern(vec![open_slot(datetime!(2026 - 09 - 07 22:00 UTC), 4)]);
        let dates = resolve_available_dates(
            september(),
            date!(2026 - 09 - 01),
            None,
            &source,
            BackendMode::Configured,
        );
        assert!(dates.contains(&date!(2026 - 09 - 07)));
        assert!(dates.contains(&date!(2026 - 09 - 08)));
    }

    #[test]
    fn closed_modern_rows_are_ignored() {
        let mut row = open_slot(datetime!(2026 - 09 - 07 09:00 UTC), 4);
        row.status = "booked".into();
        let dates = resolve_available_dates(
            september(),
            date!(2026 - 09 - 01),
            None,
            &AvailabilitySource::Modern(vec![row]),
            BackendMode::Configured,
        );
        // No usable rows: heuristic takes over, every future date is offered.
        assert_eq!(dates.len() as u8, september().day_count());
    }

    #[test]
    fn past_dates_are_clamped_out() {
        let source =
            AvailabilitySource::Modern(vec![open_slot(datetime!(2026 - 09 - 07 09:00 UTC), 4)]);
        let dates = resolve_available_dates(
            september(),
            date!(2026 - 09 - 10),
            None,
            &source,
            BackendMode::Configured,
        );
        // The only real row is in the past; heuristic fills in from today on.
        assert!(dates.iter().all(|d| *d >= date!(2026 - 09 - 10)));
        assert!(!dates.is_empty());
    }

    #[test]
    fn legacy_rows_match_by_weekday_and_location() {
        // 2026-09-07 is a Monday; legacy day 1.
        let source = AvailabilitySource::Legacy(vec![weekly(1, "Lochwinnoch")]);
        let lochwinnoch = venue("Lochwinnoch", "Lochwinnoch");
        let paisley = venue("Paisley Grammar", "Paisley");

        let dates = resolve_available_dates(
            september(),
            date!(2026 - 09 - 01),
            Some(&lochwinnoch),
            &source,
            BackendMode::Configured,
        );
        assert_eq!(
            dates.into_iter().collect::<Vec<_>>(),
            vec![
                date!(2026 - 09 - 07),
                date!(2026 - 09 - 14),
                date!(2026 - 09 - 21),
                date!(2026 - 09 - 28),
            ]
        );

        // Location mismatch leaves zero usable rows, so the heuristic fills in.
        let dates = resolve_available_dates(
            september(),
            date!(2026 - 09 - 01),
            Some(&paisley),
            &source,
            BackendMode::Configured,
        );
        assert_eq!(dates.len() as u8, september().day_count());
    }

    #[test]
    fn legacy_rows_without_location_filter_match_every_occurrence() {
        let source = AvailabilitySource::Legacy(vec![weekly(3, "anywhere")]);
        let dates = resolve_available_dates(
            september(),
            date!(2026 - 09 - 01),
            None,
            &source,
            BackendMode::Configured,
        );
        // Wednesdays in September 2026.
        assert_eq!(dates.len(), 5);
        assert!(dates.contains(&date!(2026 - 09 - 02)));
        assert!(dates.contains(&date!(2026 - 09 - 30)));
    }

    #[test]
    fn heuristic_without_backend_offers_future_weekdays() {
        let dates = resolve_available_dates(
            september(),
            date!(2026 - 09 - 15),
            None,
            &AvailabilitySource::Heuristic(BackendMode::Unconfigured),
            BackendMode::Unconfigured,
        );
        assert!(!dates.is_empty());
        assert!(dates.iter().all(|d| *d >= date!(2026 - 09 - 15)));
        assert!(dates.iter().all(|d| is_weekday(d.weekday())));
    }

    #[test]
    fn heuristic_with_configured_backend_offers_every_future_date() {
        let dates = resolve_available_dates(
            september(),
            date!(2026 - 09 - 29),
            None,
            &AvailabilitySource::Heuristic(BackendMode::Configured),
            BackendMode::Configured,
        );
        assert_eq!(
            dates.into_iter().collect::<Vec<_>>(),
            vec![date!(2026 - 09 - 29), date!(2026 - 09 - 30)]
        );
    }

    #[test]
    fn fallback_never_empties_while_month_has_a_future_day() {
        // Last weekend of a month with an Unconfigured backend: the weekday
        // heuristic finds nothing, yet the calendar must not go blank.
        let january = MonthRef::new(2027, 1).unwrap();
        let dates = resolve_available_dates(
            january,
            date!(2027 - 01 - 30), // Saturday; the 31st is a Sunday
            None,
            &AvailabilitySource::Heuristic(BackendMode::Unconfigured),
            BackendMode::Unconfigured,
        );
        assert_eq!(
            dates.into_iter().collect::<Vec<_>>(),
            vec![date!(2027 - 01 - 30), date!(2027 - 01 - 31)]
        );
    }

    #[tokio::test]
    async fn loader_prefers_modern_rows() {
        let store = MemoryBookingStore::new();
        store.seed_open_slots(vec![open_slot(datetime!(2026 - 09 - 07 09:00 UTC), 4)]);
        store.seed_weekly_hours(vec![weekly(1, "Lochwinnoch")]);

        let source = load_availability_source(
            Some(Arc::new(store)),
            september(),
            None,
            BackendMode::Configured,
        )
        .await;
        assert!(matches!(source, AvailabilitySource::Modern(rows) if rows.len() == 1));
    }

    #[tokio::test]
    async fn loader_falls_back_to_legacy_when_modern_is_empty() {
        let store = MemoryBookingStore::new();
        store.seed_weekly_hours(vec![weekly(1, "Lochwinnoch")]);

        let source = load_availability_source(
            Some(Arc::new(store)),
            september(),
            None,
            BackendMode::Configured,
        )
        .await;
        assert!(matches!(source, AvailabilitySource::Legacy(rows) if rows.len() == 1));
    }

    #[tokio::test]
    async fn loader_absorbs_storage_errors_into_heuristic() {
        let source = load_availability_source(
            Some(Arc::new(FailingStore)),
            september(),
            None,
            BackendMode::Configured,
        )
        .await;
        assert!(matches!(
            source,
            AvailabilitySource::Heuristic(BackendMode::Configured)
        ));
    }

    #[tokio::test]
    async fn loader_without_store_uses_heuristic() {
        let source =
            load_availability_source(None, september(), None, BackendMode::Unconfigured).await;
        assert!(matches!(
            source,
            AvailabilitySource::Heuristic(BackendMode::Unconfigured)
        ));
    }
}
