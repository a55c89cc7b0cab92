//! Booking orchestration: wizard sessions, catalog fetches with fallbacks,
//! server-side re-validation of selections, payment, and persistence.
//!
//! Availability fetches are guarded by per-session generation tokens: a fetch
//! that completes after a newer one began is discarded as superseded instead
//! of overwriting fresher data. Persistence after payment is best-effort; a
//! storage failure never takes back a confirmed booking.

use std::{sync::Arc, time::Duration};

use time::{Date, OffsetDateTime, macros::format_description};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::models::{AthleteEntity, BookingEntity, LocationEntity},
    dto::{
        booking::{
            PaymentRequest, PlayerRequest, SelectCoachRequest, SelectDateRequest,
            SelectLocationRequest, SelectSlotRequest, SessionCreatedResponse, WizardSnapshot,
        },
        catalog::{AthleteDto, AvailableDatesResponse, CoachDto, LocationDto, MonthQuery, TimeSlotDto},
    },
    error::ServiceError,
    services::{
        availability::{self, AvailabilitySource, MonthRef},
        coaches,
        payment::CardDetails,
        slots,
    },
    state::{BookingStep, SharedState, WizardSession, draft::PlayerDetails},
};

/// How long a completed session stays resolvable after confirmation.
const RETIREMENT_DELAY: Duration = Duration::from_secs(5);

/// Fallback session price when the draft carries no coach price.
const DEFAULT_SESSION_PRICE_PENCE: u32 = 3_500;

/// Open a new wizard session, restoring any autosaved draft.
pub async fn open_session(state: &SharedState) -> SessionCreatedResponse {
    let (session_id, session) = state.create_session();
    let degraded = state.is_degraded().await;
    let wizard = session.wizard.lock().await;
    SessionCreatedResponse {
        session_id,
        snapshot: WizardSnapshot::from_wizard(&wizard, degraded),
    }
}

/// Current state of a live session.
pub async fn snapshot(state: &SharedState, id: Uuid) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    let degraded = state.is_degraded().await;
    let wizard = session.wizard.lock().await;
    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

/// Advance to the next step if the current gate is satisfied.
pub async fn advance(state: &SharedState, id: Uuid) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    let degraded = state.is_degraded().await;
    let mut wizard = session.wizard.lock().await;
    wizard.next()?;
    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

/// Step back, preserving everything entered so far.
pub async fn go_back(state: &SharedState, id: Uuid) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    let degraded = state.is_degraded().await;
    let mut wizard = session.wizard.lock().await;
    wizard.previous()?;
    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

/// Abandon the draft: reset the wizard and clear the autosave slot.
pub async fn cancel(state: &SharedState, id: Uuid) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    let degraded = state.is_degraded().await;
    let mut wizard = session.wizard.lock().await;
    wizard.cancel();
    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

/// Drop a session from the registry (navigation away from the flow).
pub fn close_session(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    require_session(state, id)?;
    state.remove_session(id);
    Ok(())
}

/// Saved athletes for a parent account, offered on the player step.
///
/// Fetch failures degrade to an empty list; the player step always accepts a
/// manually typed name.
pub async fn list_athletes(state: &SharedState, parent_id: Uuid) -> Vec<AthleteDto> {
    let Some(store) = state.booking_store().await else {
        return Vec::new();
    };
    match store.find_athletes(parent_id).await {
        Ok(rows) => rows.into_iter().map(AthleteDto::from).collect(),
        Err(err) => {
            warn!(error = %err, "athlete query failed; offering manual entry only");
            Vec::new()
        }
    }
}

/// Venues offered on the location step; falls back to the built-in catalog.
pub async fn list_locations(state: &SharedState) -> Vec<LocationDto> {
    fetch_locations(state)
        .await
        .into_iter()
        .map(LocationDto::from)
        .collect()
}

/// Bookable days of the requested month for the session's current context.
pub async fn available_dates(
    state: &SharedState,
    id: Uuid,
    query: &MonthQuery,
) -> Result<AvailableDatesResponse, ServiceError> {
    let session = require_session(state, id)?;
    let month = MonthRef::new(query.year, query.month)
        .ok_or_else(|| ServiceError::InvalidInput("month out of range".into()))?;

    let location = {
        let wizard = session.wizard.lock().await;
        wizard.draft().location.clone()
    };

    let token = session.begin_fetch();
    let source = load_source(state, month, location.as_ref()).await;
    if !session.fetch_is_current(token) {
        return Err(ServiceError::Superseded);
    }

    let mode = state.backend_mode();
    let dates = availability::resolve_available_dates(
        month,
        state.today(),
        location.as_ref(),
        &source,
        mode,
    );

    Ok(AvailableDatesResponse {
        dates: dates.iter().map(Date::to_string).collect(),
    })
}

/// Hourly slots for the session's selected date.
pub async fn slots_for_date(
    state: &SharedState,
    id: Uuid,
) -> Result<Vec<TimeSlotDto>, ServiceError> {
    let session = require_session(state, id)?;
    let expanded = expand_for_session(state, &session).await?;
    Ok(expanded.iter().map(TimeSlotDto::from).collect())
}

/// Coach candidates for the session's context, optionally specialty-filtered.
pub async fn coach_candidates(
    state: &SharedState,
    id: Uuid,
    specialty: Option<&str>,
) -> Result<Vec<CoachDto>, ServiceError> {
    let session = require_session(state, id)?;
    let (location, slot) = {
        let wizard = session.wizard.lock().await;
        let draft = wizard.draft();
        (draft.location.clone(), draft.time_slot.clone())
    };

    let token = session.begin_fetch();
    let candidates = coaches::fetch_coaches(state, location.as_ref(), slot.as_ref()).await;
    if !session.fetch_is_current(token) {
        return Err(ServiceError::Superseded);
    }

    let filtered = match specialty {
        Some(filter) => coaches::match_coaches(&candidates, filter),
        None => candidates,
    };
    Ok(filtered.into_iter().map(CoachDto::from).collect())
}

/// Record the venue choice after validating it against the catalog.
pub async fn select_location(
    state: &SharedState,
    id: Uuid,
    request: &SelectLocationRequest,
) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    let location = fetch_locations(state)
        .await
        .into_iter()
        .find(|l| l.id == request.location_id)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("location `{}` not found", request.location_id))
        })?;

    let degraded = state.is_degraded().await;
    let mut wizard = session.wizard.lock().await;
    wizard.set_location(location);
    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

/// Record the date choice; past dates are never bookable.
pub async fn select_date(
    state: &SharedState,
    id: Uuid,
    request: &SelectDateRequest,
) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    let date = parse_iso_date(&request.date)?;
    if date < state.today() {
        return Err(ServiceError::InvalidInput(format!(
            "date {date} is in the past"
        )));
    }

    let degraded = state.is_degraded().await;
    let mut wizard = session.wizard.lock().await;
    wizard.set_date(date);
    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

/// Record the slot choice after re-expanding the selected date server-side.
pub async fn select_slot(
    state: &SharedState,
    id: Uuid,
    request: &SelectSlotRequest,
) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    let expanded = expand_for_session(state, &session).await?;
    let slot = expanded
        .iter()
        .find(|slot| slot.id == request.slot_id)
        .ok_or_else(|| ServiceError::NotFound(format!("slot `{}` not found", request.slot_id)))?;
    if !slot.available {
        return Err(ServiceError::InvalidInput(format!(
            "slot `{}` is not available",
            request.slot_id
        )));
    }

    let degraded = state.is_degraded().await;
    let mut wizard = session.wizard.lock().await;
    wizard.set_time_slot(slot.to_selected());
    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

/// Record the coach choice; demoted coaches are rejected, not hidden.
pub async fn select_coach(
    state: &SharedState,
    id: Uuid,
    request: &SelectCoachRequest,
) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    let (location, slot) = {
        let wizard = session.wizard.lock().await;
        let draft = wizard.draft();
        (draft.location.clone(), draft.time_slot.clone())
    };
    let candidate = coaches::fetch_coaches(state, location.as_ref(), slot.as_ref())
        .await
        .into_iter()
        .find(|c| c.coach.id == request.coach_id)
        .ok_or_else(|| {
            ServiceError::NotFound(format!("coach `{}` not found", request.coach_id))
        })?;

    let degraded = state.is_degraded().await;
    let mut wizard = session.wizard.lock().await;
    wizard.set_coach(candidate)?;
    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

/// Record the player details.
pub async fn submit_player(
    state: &SharedState,
    id: Uuid,
    request: &PlayerRequest,
) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    if request.name.trim().is_empty() && request.athlete_id.is_none() {
        return Err(ServiceError::InvalidInput(
            "a player name or a saved athlete is required".into(),
        ));
    }
    let date_of_birth = match &request.date_of_birth {
        Some(raw) => Some(parse_iso_date(raw)?),
        None => None,
    };

    let degraded = state.is_degraded().await;
    let mut wizard = session.wizard.lock().await;
    wizard.set_player(PlayerDetails {
        athlete_id: request.athlete_id,
        name: request.name.trim().to_string(),
        date_of_birth,
        notes: request.notes.clone(),
        is_new_athlete: request.is_new_athlete,
    });
    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

/// Charge the card and confirm the booking.
///
/// On success the wizard lands on the confirmation step, the booking is
/// persisted best-effort, and the session is retired shortly after.
pub async fn take_payment(
    state: &SharedState,
    id: Uuid,
    request: &PaymentRequest,
) -> Result<WizardSnapshot, ServiceError> {
    let session = require_session(state, id)?;
    let degraded = state.is_degraded().await;
    let mut wizard = session.wizard.lock().await;

    // Gate before the gateway: never charge a card for a wizard that has not
    // reached the payment step.
    if wizard.current_step() != BookingStep::Payment {
        return Err(ServiceError::InvalidState(
            "payment is only taken on the payment step".into(),
        ));
    }

    let amount_pence = wizard
        .draft()
        .coach
        .as_ref()
        .map(|c| c.coach.price_per_session_pence)
        .unwrap_or(DEFAULT_SESSION_PRICE_PENCE);

    let card = CardDetails {
        number: request.card_number.clone(),
        expiry_month: request.expiry_month,
        expiry_year: request.expiry_year,
        cvc: request.cvc.clone(),
        cardholder: request.cardholder.clone(),
    };
    let receipt = state.payment_gateway().charge(card, amount_pence).await?;

    wizard.confirm_payment(receipt.clone())?;
    persist_confirmed_booking(state, &wizard, &receipt).await;
    wizard.complete();
    info!(session = %id, token = %receipt.token, "booking confirmed");

    let retire_state = state.clone();
    tokio::spawn(async move {
        tokio::time::sleep(RETIREMENT_DELAY).await;
        retire_state.remove_session(id);
    });

    Ok(WizardSnapshot::from_wizard(&wizard, degraded))
}

fn require_session(state: &SharedState, id: Uuid) -> Result<Arc<WizardSession>, ServiceError> {
    state
        .session(id)
        .ok_or_else(|| ServiceError::NotFound(format!("session `{id}` not found")))
}

fn parse_iso_date(raw: &str) -> Result<Date, ServiceError> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw.trim(), &format)
        .map_err(|_| ServiceError::InvalidInput(format!("`{raw}` is not an ISO date")))
}

async fn fetch_locations(state: &SharedState) -> Vec<LocationEntity> {
    match state.booking_store().await {
        Some(store) => match store.list_locations().await {
            Ok(rows) if !rows.is_empty() => rows,
            Ok(_) => {
                warn!("location query returned no rows; using fallback catalog");
                state.config().fallback_locations.clone()
            }
            Err(err) => {
                warn!(error = %err, "location query failed; using fallback catalog");
                state.config().fallback_locations.clone()
            }
        },
        None => state.config().fallback_locations.clone(),
    }
}

async fn load_source(
    state: &SharedState,
    month: MonthRef,
    location: Option<&LocationEntity>,
) -> AvailabilitySource {
    let store = state.booking_store().await;
    availability::load_availability_source(
        store,
        month,
        location.map(|l| l.id),
        state.backend_mode(),
    )
    .await
}

async fn expand_for_session(
    state: &SharedState,
    session: &Arc<WizardSession>,
) -> Result<Vec<slots::TimeSlot>, ServiceError> {
    let (date, location) = {
        let wizard = session.wizard.lock().await;
        let draft = wizard.draft();
        (draft.date, draft.location.clone())
    };
    let month = MonthRef::new(date.year(), u8::from(date.month()))
        .ok_or_else(|| ServiceError::InvalidInput("month out of range".into()))?;

    let token = session.begin_fetch();
    let source = load_source(state, month, location.as_ref()).await;
    if !session.fetch_is_current(token) {
        return Err(ServiceError::Superseded);
    }

    Ok(slots::expand_slots(date, &source, state.backend_mode()))
}

/// Write the athlete (when new) and the booking row. Failures are logged and
/// swallowed; the confirmation already happened.
async fn persist_confirmed_booking(
    state: &SharedState,
    wizard: &crate::state::wizard::BookingWizard,
    receipt: &crate::state::draft::PaymentReceipt,
) {
    let Some(store) = state.booking_store().await else {
        warn!("no storage backend; confirmed booking not persisted");
        return;
    };
    let draft = wizard.draft();
    let (Some(location), Some(coach), Some(slot)) =
        (&draft.location, &draft.coach, &draft.time_slot)
    else {
        warn!("draft missing selections at confirmation; booking not persisted");
        return;
    };

    let mut athlete_id = draft.player.as_ref().and_then(|p| p.athlete_id);
    if let Some(player) = &draft.player {
        if player.is_new_athlete && player.athlete_id.is_none() {
            let athlete = AthleteEntity {
                id: Uuid::new_v4(),
                parent_id: Uuid::nil(),
                name: player.name.clone(),
                birth_date: player.date_of_birth,
                notes: player.notes.clone(),
                created_at: OffsetDateTime::now_utc(),
            };
            match store.save_athlete(athlete.clone()).await {
                Ok(()) => athlete_id = Some(athlete.id),
                Err(err) => warn!(error = %err, "failed to save athlete"),
            }
        }
    }

    let booking = BookingEntity {
        id: Uuid::new_v4(),
        location_id: location.id,
        coach_id: coach.coach.id,
        athlete_id,
        athlete_name: draft
            .player
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_default(),
        starts_at: slot.start,
        ends_at: slot.end,
        amount_pence: receipt.amount_pence,
        payment_token: receipt.token.clone(),
        created_at: OffsetDateTime::now_utc(),
    };
    if let Err(err) = store.save_booking(booking).await {
        warn!(error = %err, "failed to persist confirmed booking");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use futures::future::BoxFuture;
    use time::{Duration, macros::datetime};

    use super::*;
    use crate::{
        config::{AppConfig, BackendMode},
        dao::{
            booking_store::memory::{MemoryBookingStore, fixtures::FailingStore},
            models::{CoachEntity, OpenSlotEntity},
        },
        services::payment::{PaymentError, PaymentGateway},
        state::{AppState, autosave::MemoryDraftStore, draft::PaymentReceipt},
    };

    fn test_state(mode: BackendMode) -> SharedState {
        AppState::with_draft_store(AppConfig::default(), mode, Arc::new(MemoryDraftStore::new()))
    }

    /// Gateway that counts charges so tests can assert a card was never hit.
    struct CountingGateway {
        charges: Arc<AtomicUsize>,
    }

    impl PaymentGateway for CountingGateway {
        fn charge(
            &self,
            _card: CardDetails,
            amount_pence: u32,
        ) -> BoxFuture<'static, Result<PaymentReceipt, PaymentError>> {
            self.charges.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                Ok(PaymentReceipt {
                    token: "pay_counted".into(),
                    card_last4: "4242".into(),
                    amount_pence,
                })
            })
        }
    }

    fn payment_request() -> PaymentRequest {
        PaymentRequest {
            card_number: "4242 4242 4242 4242".into(),
            expiry_month: 9,
            expiry_year: 2028,
            cvc: "123".into(),
            cardholder: "Alex Smith".into(),
        }
    }

    fn next_monday(state: &SharedState) -> Date {
        let mut date = state.today() + Duration::DAY;
        while date.weekday() != time::Weekday::Monday {
            date += Duration::DAY;
        }
        date
    }

    async fn walk_to_payment(state: &SharedState, session_id: Uuid) {
        let locations = list_locations(state).await;
        let lochwinnoch = locations
            .iter()
            .find(|l| l.name == "Lochwinnoch")
            .unwrap();
        select_location(
            state,
            session_id,
            &SelectLocationRequest {
                location_id: lochwinnoch.id,
            },
        )
        .await
        .unwrap();
        advance(state, session_id).await.unwrap();

        let monday = next_monday(state);
        select_date(
            state,
            session_id,
            &SelectDateRequest {
                date: monday.to_string(),
            },
        )
        .await
        .unwrap();
        let slots = slots_for_date(state, session_id).await.unwrap();
        let ten = slots
            .iter()
            .find(|s| s.display_label.starts_with("10:00 AM"))
            .unwrap();
        select_slot(
            state,
            session_id,
            &SelectSlotRequest {
                slot_id: ten.id.clone(),
            },
        )
        .await
        .unwrap();
        advance(state, session_id).await.unwrap();

        let coaches = coach_candidates(state, session_id, Some("finishing"))
            .await
            .unwrap();
        let jack = coaches
            .iter()
            .find(|c| c.name == "Jack Haggerty")
            .unwrap();
        select_coach(
            state,
            session_id,
            &SelectCoachRequest { coach_id: jack.id },
        )
        .await
        .unwrap();
        advance(state, session_id).await.unwrap();

        submit_player(
            state,
            session_id,
            &PlayerRequest {
                athlete_id: None,
                name: "Alex Smith".into(),
                date_of_birth: Some("2015-04-02".into()),
                notes: "left-footed".into(),
                is_new_athlete: false,
            },
        )
        .await
        .unwrap();
        advance(state, session_id).await.unwrap();
    }

    #[tokio::test]
    async fn degraded_happy_path_reaches_confirmation() {
        let state = test_state(BackendMode::Unconfigured);
        let opened = open_session(&state).await;
        assert_eq!(opened.snapshot.step, "location");
        assert!(opened.snapshot.degraded);

        walk_to_payment(&state, opened.session_id).await;
        let confirmed = take_payment(&state, opened.session_id, &payment_request())
            .await
            .unwrap();
        assert_eq!(confirmed.step, "confirmation");
        let receipt = confirmed.draft.receipt.unwrap();
        assert!(receipt.token.starts_with("pay_"));
        assert_eq!(receipt.amount_pence, 3_500);
    }

    #[tokio::test]
    async fn failing_store_still_allows_the_full_flow() {
        let state = test_state(BackendMode::Configured);
        state.install_booking_store(Arc::new(FailingStore)).await;

        let opened = open_session(&state).await;
        walk_to_payment(&state, opened.session_id).await;
        let confirmed = take_payment(&state, opened.session_id, &payment_request())
            .await
            .unwrap();
        assert_eq!(confirmed.step, "confirmation");
    }

    #[tokio::test]
    async fn confirmed_booking_is_persisted_when_storage_is_up() {
        let state = test_state(BackendMode::Configured);
        let store = MemoryBookingStore::new();
        state.install_booking_store(Arc::new(store.clone())).await;

        let opened = open_session(&state).await;
        walk_to_payment(&state, opened.session_id).await;
        take_payment(&state, opened.session_id, &payment_request())
            .await
            .unwrap();

        let bookings = store.bookings();
        assert_eq!(bookings.len(), 1);
        assert_eq!(bookings[0].athlete_name, "Alex Smith");
        assert!(bookings[0].payment_token.starts_with("pay_"));
    }

    #[tokio::test]
    async fn payment_before_the_payment_step_never_reaches_the_gateway() {
        let charges = Arc::new(AtomicUsize::new(0));
        let state = AppState::with_gateway(
            AppConfig::default(),
            BackendMode::Unconfigured,
            Arc::new(MemoryDraftStore::new()),
            Arc::new(CountingGateway {
                charges: charges.clone(),
            }),
        );

        let opened = open_session(&state).await;
        assert_eq!(opened.snapshot.step, "location");
        let err = take_payment(&state, opened.session_id, &payment_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
        assert_eq!(charges.load(Ordering::SeqCst), 0);

        // Once the flow actually reaches the payment step, the charge lands.
        walk_to_payment(&state, opened.session_id).await;
        take_payment(&state, opened.session_id, &payment_request())
            .await
            .unwrap();
        assert_eq!(charges.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn advancing_past_an_unsatisfied_gate_is_rejected() {
        let state = test_state(BackendMode::Unconfigured);
        let opened = open_session(&state).await;
        let err = advance(&state, opened.session_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn past_dates_are_rejected() {
        let state = test_state(BackendMode::Unconfigured);
        let opened = open_session(&state).await;
        let yesterday = state.today() - Duration::DAY;
        let err = select_date(
            &state,
            opened.session_id,
            &SelectDateRequest {
                date: yesterday.to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let state = test_state(BackendMode::Unconfigured);
        let err = snapshot(&state, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn stale_fetch_is_superseded() {
        let state = test_state(BackendMode::Unconfigured);
        let opened = open_session(&state).await;
        let session = state.session(opened.session_id).unwrap();

        let token = session.begin_fetch();
        // A newer fetch begins before the first one resolves.
        session.begin_fetch();
        assert!(!session.fetch_is_current(token));
    }

    #[tokio::test]
    async fn unavailable_coach_selection_is_rejected() {
        let state = test_state(BackendMode::Configured);
        let store = MemoryBookingStore::new();
        let roster = AppConfig::default().fallback_roster;
        store.seed_coaches(roster.clone());
        // The only opening belongs to someone else entirely.
        store.seed_open_slots(vec![OpenSlotEntity {
            coach_id: Uuid::new_v4(),
            location_id: Uuid::new_v4(),
            starts_at: datetime!(2099 - 01 - 04 10:00 UTC),
            ends_at: datetime!(2099 - 01 - 04 11:00 UTC),
            status: "open".into(),
        }]);
        state.install_booking_store(Arc::new(store)).await;

        let opened = open_session(&state).await;
        let session = state.session(opened.session_id).unwrap();
        {
            let mut wizard = session.wizard.lock().await;
            wizard.set_time_slot(crate::state::draft::SelectedSlot {
                start: datetime!(2099 - 01 - 04 10:00 UTC),
                end: datetime!(2099 - 01 - 04 11:00 UTC),
                display_label: "10:00 AM - 11:00 AM".into(),
            });
        }

        let jack: &CoachEntity = roster
            .iter()
            .find(|c| c.name == "Jack Haggerty")
            .unwrap();
        let err = select_coach(
            &state,
            opened.session_id,
            &SelectCoachRequest { coach_id: jack.id },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn saved_athletes_are_listed_per_parent() {
        let state = test_state(BackendMode::Configured);
        let store = MemoryBookingStore::new();
        let parent = Uuid::new_v4();
        store.seed_athletes(vec![
            AthleteEntity {
                id: Uuid::new_v4(),
                parent_id: parent,
                name: "Alex Smith".into(),
                birth_date: None,
                notes: String::new(),
                created_at: OffsetDateTime::now_utc(),
            },
            AthleteEntity {
                id: Uuid::new_v4(),
                parent_id: Uuid::new_v4(),
                name: "Someone Else".into(),
                birth_date: None,
                notes: String::new(),
                created_at: OffsetDateTime::now_utc(),
            },
        ]);
        state.install_booking_store(Arc::new(store)).await;

        let athletes = list_athletes(&state, parent).await;
        assert_eq!(athletes.len(), 1);
        assert_eq!(athletes[0].name, "Alex Smith");
    }

    #[tokio::test]
    async fn athlete_fetch_failure_degrades_to_manual_entry() {
        let state = test_state(BackendMode::Configured);
        state.install_booking_store(Arc::new(FailingStore)).await;
        assert!(list_athletes(&state, Uuid::new_v4()).await.is_empty());
    }

    #[tokio::test]
    async fn player_without_name_or_athlete_is_rejected() {
        let state = test_state(BackendMode::Unconfigured);
        let opened = open_session(&state).await;
        let err = submit_player(
            &state,
            opened.session_id,
            &PlayerRequest {
                athlete_id: None,
                name: "   ".into(),
                date_of_birth: None,
                notes: String::new(),
                is_new_athlete: false,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}
