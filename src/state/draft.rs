use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::dao::models::{CoachEntity, LocationEntity};

/// A coach as presented to the parent, enriched with the availability flag.
///
/// `is_unavailable` coaches are shown with a "see other times" treatment but
/// can never become the draft's selected coach.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoachCandidate {
    /// Underlying coach record.
    #[serde(flatten)]
    pub coach: CoachEntity,
    /// True when the coach has no real opening for the current date/time/venue
    /// context; the candidate stays visible but is not selectable.
    pub is_unavailable: bool,
}

impl CoachCandidate {
    /// Wrap a persisted coach record with its availability flag.
    pub fn from_entity(coach: CoachEntity, is_unavailable: bool) -> Self {
        Self {
            coach,
            is_unavailable,
        }
    }
}

/// The hour-long slot chosen on the Date/Time step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedSlot {
    /// Inclusive start of the session.
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    /// Exclusive end of the session (start plus one hour).
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
    /// Human readable label, e.g. "10:00 AM - 11:00 AM".
    pub display_label: String,
}

/// Details of the athlete attending the session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerDetails {
    /// Existing athlete picked from the parent's account, if any.
    pub athlete_id: Option<Uuid>,
    /// Athlete name as entered on the form.
    pub name: String,
    /// Date of birth, when provided.
    pub date_of_birth: Option<Date>,
    /// Free-text notes for the coach.
    pub notes: String,
    /// True when the parent chose to register a new athlete.
    pub is_new_athlete: bool,
}

impl PlayerDetails {
    /// Whether these details satisfy the Player step gate: either a non-empty
    /// name or a reference to an existing athlete.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() || self.athlete_id.is_some()
    }
}

/// Redacted payment confirmation; raw card data is never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Opaque confirmation token from the payment collaborator.
    pub token: String,
    /// Last four digits of the card, for the confirmation screen.
    pub card_last4: String,
    /// Amount captured, in pence.
    pub amount_pence: u32,
}

/// The in-progress booking owned exclusively by the wizard.
///
/// Step components mutate it through the wizard's setters only; every
/// mutation is mirrored to the autosave slot.
#[derive(Debug, Clone, PartialEq)]
pub struct BookingDraft {
    /// Selected venue.
    pub location: Option<LocationEntity>,
    /// Selected calendar date; pre-set to "today" at creation.
    pub date: Date,
    /// Selected hour slot; invalidated whenever `date` or `location` changes.
    pub time_slot: Option<SelectedSlot>,
    /// Selected coach; only available candidates can be stored here.
    pub coach: Option<CoachCandidate>,
    /// Athlete details from the Player step.
    pub player: Option<PlayerDetails>,
    /// Set only after the payment collaborator confirms.
    pub payment: Option<PaymentReceipt>,
}

impl BookingDraft {
    /// Fresh draft with the date pre-set and everything else empty.
    pub fn new(today: Date) -> Self {
        Self {
            location: None,
            date: today,
            time_slot: None,
            coach: None,
            player: None,
            payment: None,
        }
    }

    /// Select a venue. A different venue invalidates the chosen time slot,
    /// since availability is computed per venue.
    pub fn set_location(&mut self, location: LocationEntity) {
        let changed = self
            .location
            .as_ref()
            .is_none_or(|current| current.id != location.id);
        self.location = Some(location);
        if changed {
            self.time_slot = None;
        }
    }

    /// Select a date. A different date invalidates the chosen time slot.
    pub fn set_date(&mut self, date: Date) {
        if self.date != date {
            self.date = date;
            self.time_slot = None;
        }
    }

    /// Projection persisted to the autosave slot. Payment confirmations are
    /// deliberately not part of it; a restored draft always re-enters payment.
    pub fn snapshot(&self) -> DraftSnapshot {
        DraftSnapshot {
            location: self.location.clone(),
            date: self.date,
            time_slot: self.time_slot.clone(),
            coach: self.coach.clone(),
            player: self.player.clone(),
        }
    }

    /// Overlay a restored snapshot onto this draft.
    pub fn restore(&mut self, snapshot: DraftSnapshot) {
        self.location = snapshot.location;
        self.date = snapshot.date;
        self.time_slot = snapshot.time_slot;
        self.coach = snapshot.coach;
        self.player = snapshot.player;
    }
}

/// Serialized form of the draft stored under the `booking-flow-data` key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DraftSnapshot {
    /// Selected venue, if any.
    pub location: Option<LocationEntity>,
    /// Selected calendar date.
    pub date: Date,
    /// Selected hour slot, if any.
    pub time_slot: Option<SelectedSlot>,
    /// Selected coach, if any.
    pub coach: Option<CoachCandidate>,
    /// Athlete details, if entered.
    pub player: Option<PlayerDetails>,
}
