//! Coach Matcher: specialty filtering and availability demotion.
//!
//! Coaches are filtered, never excluded for availability: a coach with no
//! real opening for the selected context is demoted to "see other times"
//! through [`CoachCandidate::is_unavailable`] instead of disappearing, so the
//! coach step is never a dead end. A failed coach fetch is replaced with the
//! built-in roster for the same reason.

use std::collections::HashSet;

use tracing::warn;
use uuid::Uuid;

use crate::{
    dao::models::LocationEntity,
    services::{availability::AvailabilitySource, slots::slot_is_covered},
    state::SharedState,
    state::draft::{CoachCandidate, SelectedSlot},
};

/// Specialty filter value that disables filtering.
pub const ALL_SPECIALTIES: &str = "all";

/// Filter candidates by specialty.
///
/// The match is a case-insensitive substring test so a coarse filter such as
/// "finish" matches the finer "Finishing" specialty label. Input order is
/// preserved; no re-ranking happens here.
pub fn match_coaches(candidates: &[CoachCandidate], specialty: &str) -> Vec<CoachCandidate> {
    if specialty.trim().is_empty() || specialty.eq_ignore_ascii_case(ALL_SPECIALTIES) {
        return candidates.to_vec();
    }

    let needle = specialty.to_lowercase();
    candidates
        .iter()
        .filter(|candidate| {
            candidate
                .coach
                .specialties
                .iter()
                .any(|label| label.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Fetch coach candidates for the current booking context.
///
/// Storage failures and empty rosters degrade to the built-in fallback
/// roster; the booking flow is never blocked by a coach-list fetch error.
pub async fn fetch_coaches(
    state: &SharedState,
    location: Option<&LocationEntity>,
    slot: Option<&SelectedSlot>,
) -> Vec<CoachCandidate> {
    let location_id = location.map(|l| l.id);

    let coaches = match state.booking_store().await {
        Some(store) => match store.list_coaches(location_id).await {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => {
                warn!("coach query returned no rows; using fallback roster");
                state.config().fallback_roster.clone()
            }
            Err(err) => {
                warn!(error = %err, "coach query failed; using fallback roster");
                state.config().fallback_roster.clone()
            }
        },
        None => state.config().fallback_roster.clone(),
    };

    let covered = match slot {
        Some(slot) => covered_coach_ids(state, location_id, slot).await,
        None => None,
    };

    coaches
        .into_iter()
        .map(|coach| {
            let unavailable = covered
                .as_ref()
                .is_some_and(|ids| !ids.contains(&coach.id));
            CoachCandidate::from_entity(coach, unavailable)
        })
        .collect()
}

/// Coach ids with a real opening covering the selected slot, or `None` when
/// no availability information could be obtained (in which case nobody is
/// demoted). An empty set demotes every coach, which still returns the full
/// list rather than nothing.
async fn covered_coach_ids(
    state: &SharedState,
    location_id: Option<Uuid>,
    slot: &SelectedSlot,
) -> Option<HashSet<Uuid>> {
    let store = state.booking_store().await?;

    match store
        .open_slots_in_range(location_id, slot.start, slot.end)
        .await
    {
        Ok(rows) if !rows.is_empty() => {
            return Some(
                rows.iter()
                    .filter(|row| row.is_open())
                    .filter(|row| row.starts_at <= slot.start && slot.start < row.ends_at)
                    .map(|row| row.coach_id)
                    .collect(),
            );
        }
        Ok(_) => {}
        Err(err) => {
            warn!(error = %err, "availability narrowing query failed; skipping demotion");
            return None;
        }
    }

    let date = slot.start.date();
    let hour = slot.start.time().hour();
    match store.weekly_hours().await {
        Ok(rows) => Some(
            rows.into_iter()
                .filter(|row| {
                    slot_is_covered(date, hour, &AvailabilitySource::Legacy(vec![row.clone()]))
                })
                .map(|row| row.coach_id)
                .collect(),
        ),
        Err(err) => {
            warn!(error = %err, "legacy narrowing query failed; skipping demotion");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;

    use super::*;
    use crate::{
        config::{AppConfig, BackendMode},
        dao::{
            booking_store::memory::{MemoryBookingStore, fixtures::FailingStore},
            models::{CoachEntity, OpenSlotEntity},
        },
        state::{AppState, autosave::MemoryDraftStore},
    };

    fn coach(name: &str, specialties: &[&str]) -> CoachEntity {
        CoachEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            avatar_url: None,
            rating: 4.5,
            review_count: 3,
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
            experience_label: String::new(),
            bio: String::new(),
            price_per_session_pence: 3_000,
            certifications: vec![],
            current_club: None,
            locations_served: vec![],
        }
    }

    fn candidate(name: &str, specialties: &[&str]) -> CoachCandidate {
        CoachCandidate::from_entity(coach(name, specialties), false)
    }

    fn test_state(mode: BackendMode) -> SharedState {
        AppState::with_draft_store(AppConfig::default(), mode, Arc::new(MemoryDraftStore::new()))
    }

    fn slot_at(start: time::OffsetDateTime) -> SelectedSlot {
        SelectedSlot {
            start,
            end: start + time::Duration::HOUR,
            display_label: String::new(),
        }
    }

    #[test]
    fn all_filter_passes_everything_through() {
        let candidates = vec![
            candidate("Jack Haggerty", &["Finishing"]),
            candidate("Morven Clark", &["Goalkeeping"]),
        ];
        assert_eq!(match_coaches(&candidates, "all"), candidates);
        assert_eq!(match_coaches(&candidates, "ALL"), candidates);
    }

    #[test]
    fn specialty_filter_is_case_insensitive_substring() {
        let candidates = vec![
            candidate("Jack Haggerty", &["Finishing", "Dribbling"]),
            candidate("Morven Clark", &["Goalkeeping"]),
        ];
        let matched = match_coaches(&candidates, "finish");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].coach.name, "Jack Haggerty");
    }

    #[test]
    fn filter_preserves_input_order() {
        let candidates = vec![
            candidate("A", &["Passing", "Finishing"]),
            candidate("B", &["Finishing"]),
            candidate("C", &["finishing drills"]),
        ];
        let names: Vec<String> = match_coaches(&candidates, "Finishing")
            .into_iter()
            .map(|c| c.coach.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn unavailable_flag_survives_filtering() {
        let mut demoted = candidate("Busy", &["Finishing"]);
        demoted.is_unavailable = true;
        let matched = match_coaches(&[demoted.clone()], "finishing");
        assert_eq!(matched, vec![demoted]);
    }

    #[tokio::test]
    async fn degraded_state_serves_fallback_roster() {
        let state = test_state(BackendMode::Unconfigured);
        let candidates = fetch_coaches(&state, None, None).await;
        assert!(!candidates.is_empty());
        assert!(candidates.iter().any(|c| c.coach.name == "Jack Haggerty"));
        assert!(candidates.iter().all(|c| !c.is_unavailable));
    }

    #[tokio::test]
    async fn failing_store_serves_fallback_roster() {
        let state = test_state(BackendMode::Configured);
        state.install_booking_store(Arc::new(FailingStore)).await;

        let candidates = fetch_coaches(&state, None, None).await;
        assert!(candidates.iter().any(|c| c.coach.name == "Jack Haggerty"));
    }

    #[tokio::test]
    async fn zero_coverage_demotes_every_coach_but_returns_them_all() {
        let state = test_state(BackendMode::Configured);
        let store = MemoryBookingStore::new();
        store.seed_coaches(vec![coach("A", &["Finishing"]), coach("B", &["Passing"])]);
        // One open row, but hours away from the selected slot.
        store.seed_open_slots(vec![OpenSlotEntity {
            coach_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            starts_at: datetime!(2026 - 09 - 07 18:00 UTC),
            ends_at: datetime!(2026 - 09 - 07 19:00 UTC),
            status: "open".into(),
        }]);
        state.install_booking_store(Arc::new(store)).await;

        let slot = slot_at(datetime!(2026 - 09 - 07 10:00 UTC));
        let candidates = fetch_coaches(&state, None, Some(&slot)).await;
        assert_eq!(candidates.len(), 2);
        assert!(candidates.iter().all(|c| c.is_unavailable));
    }

    #[tokio::test]
    async fn covered_coaches_stay_selectable() {
        let state = test_state(BackendMode::Configured);
        let store = MemoryBookingStore::new();
        let available = coach("Jack Haggerty", &["Finishing"]);
        let busy = coach("Morven Clark", &["Goalkeeping"]);
        store.seed_coaches(vec![available.clone(), busy.clone()]);
        store.seed_open_slots(vec![OpenSlotEntity {
            coach_id: available.id,
            location_id: Uuid::new_v4(),
            starts_at: datetime!(2026 - 09 - 07 09:00 UTC),
            ends_at: datetime!(2026 - 09 - 07 12:00 UTC),
            status: "open".into(),
        }]);
        state.install_booking_store(Arc::new(store)).await;

        let slot = slot_at(datetime!(2026 - 09 - 07 10:00 UTC));
        let candidates = fetch_coaches(&state, None, Some(&slot)).await;
        let jack = candidates
            .iter()
            .find(|c| c.coach.name == "Jack Haggerty")
            .unwrap();
        let morven = candidates
            .iter()
            .find(|c| c.coach.name == "Morven Clark")
            .unwrap();
        assert!(!jack.is_unavailable);
        assert!(morven.is_unavailable);
    }
}
