use std::sync::Arc;

use thiserror::Error;
use time::Date;
use tracing::warn;

use crate::state::{
    autosave::DraftStore,
    draft::{BookingDraft, CoachCandidate, PaymentReceipt, PlayerDetails, SelectedSlot},
};

/// The six steps of the booking flow, in order. The flow is strictly linear:
/// no skipping forward, and backward navigation is allowed everywhere except
/// on the first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BookingStep {
    /// Pick a venue.
    Location,
    /// Pick a date and an hour slot.
    DateTime,
    /// Pick an available coach.
    Coach,
    /// Enter or pick the athlete attending.
    Player,
    /// Confirm payment through the payment collaborator.
    Payment,
    /// Terminal step; reached only after payment succeeded.
    Confirmation,
}

impl BookingStep {
    /// One-based position shown in the step indicator.
    pub fn index(self) -> u8 {
        match self {
            BookingStep::Location => 1,
            BookingStep::DateTime => 2,
            BookingStep::Coach => 3,
            BookingStep::Player => 4,
            BookingStep::Payment => 5,
            BookingStep::Confirmation => 6,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            BookingStep::Location => Some(BookingStep::DateTime),
            BookingStep::DateTime => Some(BookingStep::Coach),
            BookingStep::Coach => Some(BookingStep::Player),
            BookingStep::Player => Some(BookingStep::Payment),
            BookingStep::Payment => Some(BookingStep::Confirmation),
            BookingStep::Confirmation => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            BookingStep::Location => None,
            BookingStep::DateTime => Some(BookingStep::Location),
            BookingStep::Coach => Some(BookingStep::DateTime),
            BookingStep::Player => Some(BookingStep::Coach),
            BookingStep::Payment => Some(BookingStep::Player),
            BookingStep::Confirmation => Some(BookingStep::Payment),
        }
    }
}

/// Error returned when a wizard operation cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    /// The current step's completeness predicate does not hold yet.
    #[error("step {} is incomplete", step.index())]
    StepIncomplete {
        /// Step whose gate failed.
        step: BookingStep,
    },
    /// Backward navigation from the first step is not allowed.
    #[error("already at the first step")]
    AtFirstStep,
    /// Forward navigation past the confirmation step is not allowed.
    #[error("booking flow already completed")]
    AtFinalStep,
    /// The candidate is flagged unavailable and cannot be selected.
    #[error("coach is unavailable for the selected date and time")]
    CoachUnavailable,
}

/// The booking wizard: current step plus the draft it owns exclusively.
///
/// Every mutation fires the autosave observer; save failures are logged and
/// swallowed so the flow never dead-ends on storage.
pub struct BookingWizard {
    step: BookingStep,
    draft: BookingDraft,
    today: Date,
    autosave: Option<Arc<dyn DraftStore>>,
}

impl BookingWizard {
    /// Fresh wizard at the Location step with the date pre-set to `today`.
    pub fn new(today: Date) -> Self {
        Self {
            step: BookingStep::Location,
            draft: BookingDraft::new(today),
            today,
            autosave: None,
        }
    }

    /// Wizard with an autosave slot attached. A prior snapshot, when present
    /// and readable, is restored into the draft; restore failures are ignored
    /// and the wizard starts fresh. The step always restarts at Location.
    pub fn with_autosave(today: Date, store: Arc<dyn DraftStore>) -> Self {
        let mut wizard = Self::new(today);
        match store.load() {
            Ok(Some(snapshot)) => wizard.draft.restore(snapshot),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "ignoring unreadable draft snapshot"),
        }
        wizard.autosave = Some(store);
        wizard
    }

    /// Step currently mounted.
    pub fn current_step(&self) -> BookingStep {
        self.step
    }

    /// Read access to the draft.
    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    /// Whether the current step's completeness predicate holds.
    pub fn can_proceed(&self) -> bool {
        match self.step {
            BookingStep::Location => self.draft.location.is_some(),
            BookingStep::DateTime => self.draft.time_slot.is_some(),
            BookingStep::Coach => self
                .draft
                .coach
                .as_ref()
                .is_some_and(|coach| !coach.is_unavailable),
            BookingStep::Player => self
                .draft
                .player
                .as_ref()
                .is_some_and(PlayerDetails::is_complete),
            BookingStep::Payment => self.draft.payment.is_some(),
            BookingStep::Confirmation => true,
        }
    }

    /// Advance to the next step if the current gate holds.
    pub fn next(&mut self) -> Result<BookingStep, WizardError> {
        let Some(next) = self.step.next() else {
            return Err(WizardError::AtFinalStep);
        };
        if !self.can_proceed() {
            return Err(WizardError::StepIncomplete { step: self.step });
        }
        self.step = next;
        Ok(self.step)
    }

    /// Go back one step; allowed everywhere except on the first step.
    pub fn previous(&mut self) -> Result<BookingStep, WizardError> {
        let Some(previous) = self.step.previous() else {
            return Err(WizardError::AtFirstStep);
        };
        self.step = previous;
        Ok(self.step)
    }

    /// Discard the draft and empty the autosave slot. The replacement draft
    /// starts over from the wizard's construction date, not the last-selected
    /// one.
    pub fn cancel(&mut self) {
        self.draft = BookingDraft::new(self.today);
        self.step = BookingStep::Location;
        if let Some(store) = &self.autosave {
            if let Err(err) = store.clear() {
                warn!(error = %err, "failed to clear draft slot on cancel");
            }
        }
    }

    /// Select a venue.
    pub fn set_location(&mut self, location: crate::dao::models::LocationEntity) {
        self.draft.set_location(location);
        self.persist();
    }

    /// Select a date; a changed date invalidates the chosen slot.
    pub fn set_date(&mut self, date: Date) {
        self.draft.set_date(date);
        self.persist();
    }

    /// Select an hour slot for the current date.
    pub fn set_time_slot(&mut self, slot: SelectedSlot) {
        self.draft.time_slot = Some(slot);
        self.persist();
    }

    /// Select a coach. Candidates flagged unavailable leave the draft
    /// untouched: the click is a no-op beyond the returned error.
    pub fn set_coach(&mut self, candidate: CoachCandidate) -> Result<(), WizardError> {
        if candidate.is_unavailable {
            return Err(WizardError::CoachUnavailable);
        }
        self.draft.coach = Some(candidate);
        self.persist();
        Ok(())
    }

    /// Enter athlete details.
    pub fn set_player(&mut self, player: PlayerDetails) {
        self.draft.player = Some(player);
        self.persist();
    }

    /// Record a successful payment confirmation and enter the terminal step.
    pub fn confirm_payment(&mut self, receipt: PaymentReceipt) -> Result<BookingStep, WizardError> {
        if self.step != BookingStep::Payment {
            return Err(WizardError::StepIncomplete { step: self.step });
        }
        self.draft.payment = Some(receipt);
        self.persist();
        self.next()
    }

    /// Retire a finished flow: the draft is spent, so the autosave slot is
    /// emptied rather than left pointing at a completed booking.
    pub fn complete(&mut self) {
        if let Some(store) = &self.autosave {
            if let Err(err) = store.clear() {
                warn!(error = %err, "failed to clear draft slot on completion");
            }
        }
    }

    fn persist(&self) {
        if let Some(store) = &self.autosave {
            if let Err(err) = store.save(&self.draft.snapshot()) {
                warn!(error = %err, "draft autosave failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::{date, datetime};
    use uuid::Uuid;

    use super::*;
    use crate::{
        dao::models::{CoachEntity, LocationEntity},
        state::autosave::MemoryDraftStore,
    };

    fn venue(name: &str) -> LocationEntity {
        LocationEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            city: name.into(),
            address: format!("{name} Playing Fields"),
        }
    }

    fn coach(name: &str, unavailable: bool) -> CoachCandidate {
        CoachCandidate::from_entity(
            CoachEntity {
                id: Uuid::new_v4(),
                name: name.into(),
                avatar_url: None,
                rating: 4.8,
                review_count: 12,
                specialties: vec!["Finishing".into()],
                experience_label: "8+ years".into(),
                bio: String::new(),
                price_per_session_pence: 3_500,
                certifications: vec![],
                current_club: None,
                locations_served: vec![],
            },
            unavailable,
        )
    }

    fn slot(hour: u8) -> SelectedSlot {
        let start = datetime!(2026 - 09 - 07 00:00 UTC) + time::Duration::hours(hour as i64);
        SelectedSlot {
            start,
            end: start + time::Duration::HOUR,
            display_label: format!("{hour}:00"),
        }
    }

    fn player(name: &str) -> PlayerDetails {
        PlayerDetails {
            athlete_id: None,
            name: name.into(),
            date_of_birth: None,
            notes: String::new(),
            is_new_athlete: true,
        }
    }

    #[test]
    fn starts_at_location_with_date_preset() {
        let wizard = BookingWizard::new(date!(2026 - 09 - 01));
        assert_eq!(wizard.current_step(), BookingStep::Location);
        assert_eq!(wizard.draft().date, date!(2026 - 09 - 01));
        assert!(wizard.draft().location.is_none());
        assert!(!wizard.can_proceed());
    }

    #[test]
    fn date_alone_does_not_satisfy_datetime_gate() {
        let mut wizard = BookingWizard::new(date!(2026 - 09 - 01));
        wizard.set_location(venue("Lochwinnoch"));
        wizard.next().unwrap();

        wizard.set_date(date!(2026 - 09 - 07));
        assert!(!wizard.can_proceed());
        assert_eq!(
            wizard.next(),
            Err(WizardError::StepIncomplete {
                step: BookingStep::DateTime
            })
        );

        wizard.set_time_slot(slot(10));
        assert!(wizard.can_proceed());
    }

    #[test]
    fn changing_date_invalidates_time_slot() {
        let mut wizard = BookingWizard::new(date!(2026 - 09 - 01));
        wizard.set_date(date!(2026 - 09 - 07));
        wizard.set_time_slot(slot(10));
        assert!(wizard.draft().time_slot.is_some());

        wizard.set_date(date!(2026 - 09 - 08));
        assert!(wizard.draft().time_slot.is_none());

        // Re-selecting the same date keeps the slot.
        wizard.set_time_slot(slot(11));
        wizard.set_date(date!(2026 - 09 - 08));
        assert!(wizard.draft().time_slot.is_some());
    }

    #[test]
    fn changing_location_invalidates_time_slot() {
        let mut wizard = BookingWizard::new(date!(2026 - 09 - 01));
        wizard.set_location(venue("Lochwinnoch"));
        wizard.set_time_slot(slot(10));

        wizard.set_location(venue("Johnstone"));
        assert!(wizard.draft().time_slot.is_none());
    }

    #[test]
    fn unavailable_coach_is_not_selectable() {
        let mut wizard = BookingWizard::new(date!(2026 - 09 - 01));
        let selected = coach("Jack Haggerty", false);
        wizard.set_coach(selected.clone()).unwrap();

        let err = wizard.set_coach(coach("Busy Coach", true)).unwrap_err();
        assert_eq!(err, WizardError::CoachUnavailable);
        assert_eq!(wizard.draft().coach, Some(selected));
    }

    #[test]
    fn no_backward_navigation_from_first_step() {
        let mut wizard = BookingWizard::new(date!(2026 - 09 - 01));
        assert_eq!(wizard.previous(), Err(WizardError::AtFirstStep));
    }

    #[test]
    fn happy_path_gates_hold_up_to_payment() {
        let mut wizard = BookingWizard::new(date!(2026 - 09 - 01));

        wizard.set_location(venue("Lochwinnoch"));
        assert!(wizard.can_proceed());
        assert_eq!(wizard.next(), Ok(BookingStep::DateTime));

        wizard.set_date(date!(2026 - 09 - 07)); // next Monday
        wizard.set_time_slot(slot(10));
        assert!(wizard.can_proceed());
        assert_eq!(wizard.next(), Ok(BookingStep::Coach));

        wizard.set_coach(coach("Jack Haggerty", false)).unwrap();
        assert!(wizard.can_proceed());
        assert_eq!(wizard.next(), Ok(BookingStep::Player));

        wizard.set_player(player("Alex Smith"));
        assert!(wizard.can_proceed());
        assert_eq!(wizard.next(), Ok(BookingStep::Payment));

        // Payment gate stays closed until the collaborator confirms.
        assert!(!wizard.can_proceed());
        let receipt = PaymentReceipt {
            token: "pay_test".into(),
            card_last4: "4242".into(),
            amount_pence: 3_500,
        };
        assert_eq!(
            wizard.confirm_payment(receipt),
            Ok(BookingStep::Confirmation)
        );
        assert!(wizard.can_proceed());
        assert_eq!(wizard.next(), Err(WizardError::AtFinalStep));
    }

    #[test]
    fn whitespace_player_name_without_athlete_fails_gate() {
        let mut wizard = BookingWizard::new(date!(2026 - 09 - 01));
        wizard.set_location(venue("Lochwinnoch"));
        wizard.next().unwrap();
        wizard.set_time_slot(slot(9));
        wizard.next().unwrap();
        wizard.set_coach(coach("Jack Haggerty", false)).unwrap();
        wizard.next().unwrap();

        wizard.set_player(player("   "));
        assert!(!wizard.can_proceed());

        let mut existing = player("");
        existing.athlete_id = Some(Uuid::new_v4());
        wizard.set_player(existing);
        assert!(wizard.can_proceed());
    }

    #[test]
    fn snapshot_round_trips_through_autosave_slot() {
        let store = Arc::new(MemoryDraftStore::new());

        let mut wizard = BookingWizard::with_autosave(date!(2026 - 09 - 01), store.clone());
        wizard.set_location(venue("Lochwinnoch"));
        wizard.set_date(date!(2026 - 09 - 07));
        wizard.set_time_slot(slot(10));
        wizard.set_coach(coach("Jack Haggerty", false)).unwrap();
        wizard.set_player(player("Alex Smith"));
        let saved = wizard.draft().snapshot();

        let restored = BookingWizard::with_autosave(date!(2026 - 09 - 02), store);
        assert_eq!(restored.draft().snapshot(), saved);
        assert_eq!(restored.current_step(), BookingStep::Location);
    }

    #[test]
    fn cancel_clears_autosave_slot_and_draft() {
        let store = Arc::new(MemoryDraftStore::new());
        let mut wizard = BookingWizard::with_autosave(date!(2026 - 09 - 01), store.clone());
        wizard.set_location(venue("Lochwinnoch"));

        wizard.cancel();
        assert!(wizard.draft().location.is_none());

        let fresh = BookingWizard::with_autosave(date!(2026 - 09 - 01), store);
        assert!(fresh.draft().location.is_none());
    }

    #[test]
    fn cancel_resets_date_to_construction_day() {
        let mut wizard = BookingWizard::new(date!(2026 - 09 - 01));
        wizard.set_date(date!(2026 - 12 - 24));
        assert_eq!(wizard.draft().date, date!(2026 - 12 - 24));

        wizard.cancel();
        assert_eq!(wizard.draft().date, date!(2026 - 09 - 01));
        assert_eq!(wizard.current_step(), BookingStep::Location);
    }
}
