//! Time-Slot Expander: hourly slots for one selected date.
//!
//! Expansion is a pure function of the date and the availability source; it
//! is recomputed on every date change and never resumed. A date that was
//! offered on the calendar must never expand to zero options, so an empty
//! expansion synthesizes the short degraded day.

use time::{Date, Duration, OffsetDateTime, Time};

use crate::{
    config::BackendMode,
    dao::models::{OpenSlotEntity, WeeklyHourEntity},
    services::availability::{AvailabilitySource, day_of_week_number},
    state::draft::SelectedSlot,
};

/// First bookable hour of a full day.
pub const FULL_DAY_FIRST_HOUR: u8 = 8;
/// Last bookable hour of a full day.
pub const FULL_DAY_LAST_HOUR: u8 = 20;
/// First bookable hour of the degraded short day.
pub const SHORT_DAY_FIRST_HOUR: u8 = 9;
/// Last bookable hour of the degraded short day.
pub const SHORT_DAY_LAST_HOUR: u8 = 17;

/// One bookable hour on the selected date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    /// Stable identifier: `<date>-<hour>`, e.g. `2026-09-07-10`.
    pub id: String,
    /// Inclusive slot start.
    pub start: OffsetDateTime,
    /// Exclusive slot end (start plus one hour).
    pub end: OffsetDateTime,
    /// Label shown on the picker, e.g. "10:00 AM - 11:00 AM".
    pub display_label: String,
    /// Whether some availability row covers this hour.
    pub available: bool,
}

impl TimeSlot {
    /// Convert to the draft's selected-slot form.
    pub fn to_selected(&self) -> SelectedSlot {
        SelectedSlot {
            start: self.start,
            end: self.end,
            display_label: self.display_label.clone(),
        }
    }
}

/// Expand the hourly slots for `date`.
///
/// Candidate hours are 8:00 through 20:00 when a backend is configured and
/// 9:00 through 17:00 otherwise. If the expansion yields no available slot at
/// all, the degraded 9-17 set is synthesized instead so the date always shows
/// something bookable.
pub fn expand_slots(date: Date, source: &AvailabilitySource, mode: BackendMode) -> Vec<TimeSlot> {
    let (first, last) = match mode {
        BackendMode::Configured => (FULL_DAY_FIRST_HOUR, FULL_DAY_LAST_HOUR),
        BackendMode::Unconfigured => (SHORT_DAY_FIRST_HOUR, SHORT_DAY_LAST_HOUR),
    };

    let slots: Vec<TimeSlot> = (first..=last)
        .map(|hour| build_slot(date, hour, slot_is_covered(date, hour, source)))
        .collect();

    if slots.iter().any(|slot| slot.available) {
        return slots;
    }

    (SHORT_DAY_FIRST_HOUR..=SHORT_DAY_LAST_HOUR)
        .map(|hour| build_slot(date, hour, true))
        .collect()
}

/// Coverage policy for a single hour. Deliberately lenient: overlapping rows
/// are fine, and a legacy row whose time strings cannot be parsed counts as
/// covering the hour. Tightening the policy later only touches this function.
pub fn slot_is_covered(date: Date, hour: u8, source: &AvailabilitySource) -> bool {
    match source {
        AvailabilitySource::Modern(rows) => {
            let slot_start = match hour_start(date, hour) {
                Some(start) => start,
                None => return false,
            };
            rows.iter()
                .filter(|row| row.is_open())
                .any(|row| modern_row_covers(row, slot_start))
        }
        AvailabilitySource::Legacy(rows) => rows
            .iter()
            .filter(|row| row.is_active)
            .any(|row| legacy_row_covers(row, date, hour)),
        AvailabilitySource::Heuristic(_) => true,
    }
}

fn modern_row_covers(row: &OpenSlotEntity, slot_start: OffsetDateTime) -> bool {
    row.starts_at <= slot_start && slot_start < row.ends_at
}

fn legacy_row_covers(row: &WeeklyHourEntity, date: Date, hour: u8) -> bool {
    if row.day_of_week != day_of_week_number(date.weekday()) {
        return false;
    }
    match (parse_hour(&row.start_time), parse_hour(&row.end_time)) {
        (Some(start), Some(end)) => hour >= start && hour < end,
        // Malformed time strings: ambiguous coverage counts as available.
        _ => true,
    }
}

/// Parse the hour component out of a legacy "HH:MM" string.
fn parse_hour(value: &str) -> Option<u8> {
    let (hour, _minute) = value.trim().split_once(':')?;
    let hour: u8 = hour.parse().ok()?;
    (hour < 24).then_some(hour)
}

fn build_slot(date: Date, hour: u8, available: bool) -> TimeSlot {
    let start = hour_start(date, hour)
        .unwrap_or_else(|| date.midnight().assume_utc());
    TimeSlot {
        id: format!("{date}-{hour:02}"),
        start,
        end: start + Duration::HOUR,
        display_label: format!("{} - {}", hour_label(hour), hour_label(hour + 1)),
        available,
    }
}

fn hour_start(date: Date, hour: u8) -> Option<OffsetDateTime> {
    let time = Time::from_hms(hour, 0, 0).ok()?;
    Some(date.with_time(time).assume_utc())
}

/// 12-hour clock label for an hour of day.
fn hour_label(hour: u8) -> String {
    let (display, period) = match hour % 24 {
        0 => (12, "AM"),
        h @ 1..=11 => (h, "AM"),
        12 => (12, "PM"),
        h => (h - 12, "PM"),
    };
    format!("{display}:00 {period}")
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};
    use uuid::Uuid;

    use super::*;

    fn modern(starts_at: OffsetDateTime, hours: i64) -> OpenSlotEntity {
        OpenSlotEntity {
            coach_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            starts_at,
            ends_at: starts_at + Duration::hours(hours),
            status: "open".into(),
        }
    }

    fn legacy(day: u8, start: &str, end: &str) -> WeeklyHourEntity {
        WeeklyHourEntity {
            coach_id: Uuid::new_v4(),
            day_of_week: day,
            start_time: start.into(),
            end_time: end.into(),
            location: "Lochwinnoch".into(),
            is_active: true,
        }
    }

    #[test]
    fn degraded_mode_yields_exactly_the_short_day() {
        let slots = expand_slots(
            date!(2026 - 09 - 07),
            &AvailabilitySource::Heuristic(BackendMode::Unconfigured),
            BackendMode::Unconfigured,
        );
        assert_eq!(slots.len(), 9);
        assert!(slots.iter().all(|slot| slot.available));
        assert_eq!(slots.first().unwrap().display_label, "9:00 AM - 10:00 AM");
        assert_eq!(slots.last().unwrap().display_label, "5:00 PM - 6:00 PM");
    }

    #[test]
    fn full_day_spans_eight_to_twenty() {
        let slots = expand_slots(
            date!(2026 - 09 - 07),
            &AvailabilitySource::Heuristic(BackendMode::Configured),
            BackendMode::Configured,
        );
        assert_eq!(slots.len(), 13);
        assert_eq!(slots.first().unwrap().id, "2026-09-07-08");
        assert_eq!(slots.last().unwrap().id, "2026-09-07-20");
    }

    #[test]
    fn modern_rows_mark_covered_hours_only() {
        let source = AvailabilitySource::Modern(vec![modern(
            datetime!(2026 - 09 - 07 10:00 UTC),
            2,
        )]);
        let slots = expand_slots(date!(2026 - 09 - 07), &source, BackendMode::Configured);

        let available: Vec<&str> = slots
            .iter()
            .filter(|slot| slot.available)
            .map(|slot| slot.id.as_str())
            .collect();
        assert_eq!(available, vec!["2026-09-07-10", "2026-09-07-11"]);
    }

    #[test]
    fn legacy_rows_cover_by_hour_of_day() {
        // 2026-09-07 is a Monday (legacy day 1).
        let source = AvailabilitySource::Legacy(vec![legacy(1, "09:00", "12:00")]);
        let slots = expand_slots(date!(2026 - 09 - 07), &source, BackendMode::Configured);

        let available: Vec<&str> = slots
            .iter()
            .filter(|slot| slot.available)
            .map(|slot| slot.id.as_str())
            .collect();
        assert_eq!(
            available,
            vec!["2026-09-07-09", "2026-09-07-10", "2026-09-07-11"]
        );
    }

    #[test]
    fn legacy_row_on_other_weekday_does_not_cover() {
        let source = AvailabilitySource::Legacy(vec![legacy(2, "09:00", "12:00")]);
        let slots = expand_slots(date!(2026 - 09 - 07), &source, BackendMode::Configured);
        // Nothing covered: the hard fallback kicks in with the short day.
        assert_eq!(slots.len(), 9);
        assert!(slots.iter().all(|slot| slot.available));
    }

    #[test]
    fn malformed_legacy_times_count_as_covering() {
        let source = AvailabilitySource::Legacy(vec![legacy(1, "late morning", "??")]);
        let slots = expand_slots(date!(2026 - 09 - 07), &source, BackendMode::Configured);
        assert_eq!(slots.len(), 13);
        assert!(slots.iter().all(|slot| slot.available));
    }

    #[test]
    fn empty_row_set_synthesizes_short_day() {
        let source = AvailabilitySource::Modern(Vec::new());
        let slots = expand_slots(date!(2026 - 09 - 07), &source, BackendMode::Configured);
        assert_eq!(slots.len(), 9);
        assert!(slots.iter().all(|slot| slot.available));
        assert_eq!(slots.first().unwrap().id, "2026-09-07-09");
    }

    #[test]
    fn expansion_is_idempotent() {
        let source = AvailabilitySource::Legacy(vec![legacy(1, "09:00", "17:00")]);
        let first = expand_slots(date!(2026 - 09 - 07), &source, BackendMode::Configured);
        let second = expand_slots(date!(2026 - 09 - 07), &source, BackendMode::Configured);
        assert_eq!(first, second);
    }

    #[test]
    fn slot_ids_embed_date_and_hour() {
        let slots = expand_slots(
            date!(2026 - 09 - 07),
            &AvailabilitySource::Heuristic(BackendMode::Configured),
            BackendMode::Configured,
        );
        let ten = slots.iter().find(|slot| slot.id == "2026-09-07-10").unwrap();
        assert_eq!(ten.start, datetime!(2026 - 09 - 07 10:00 UTC));
        assert_eq!(ten.end, datetime!(2026 - 09 - 07 11:00 UTC));
        assert_eq!(ten.display_label, "10:00 AM - 11:00 AM");
    }
}
