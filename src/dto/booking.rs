use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dto::{
        catalog::{CoachDto, LocationDto},
        format_instant,
        validation::{validate_card_number, validate_cvc},
    },
    state::{
        draft::{BookingDraft, PaymentReceipt, PlayerDetails, SelectedSlot},
        wizard::{BookingStep, BookingWizard},
    },
};

/// Handle and initial snapshot returned when a wizard session is opened.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionCreatedResponse {
    /// Session identifier used in all subsequent wizard calls.
    pub session_id: Uuid,
    /// The restored (or fresh) wizard state.
    #[serde(flatten)]
    pub snapshot: WizardSnapshot,
}

/// Current wizard state as seen by the step components.
#[derive(Debug, Serialize, ToSchema)]
pub struct WizardSnapshot {
    /// Current step name.
    pub step: String,
    /// One-based step index, 1 through 6.
    pub step_index: u8,
    /// Whether the current step's gate is satisfied.
    pub can_proceed: bool,
    /// Whether the service is running without a storage backend.
    pub degraded: bool,
    /// The draft under construction.
    pub draft: DraftDto,
}

impl WizardSnapshot {
    /// Build a snapshot from a live wizard.
    pub fn from_wizard(wizard: &BookingWizard, degraded: bool) -> Self {
        let step = wizard.current_step();
        Self {
            step: step_name(step).to_string(),
            step_index: step.index(),
            can_proceed: wizard.can_proceed(),
            degraded,
            draft: DraftDto::from_draft(wizard.draft()),
        }
    }
}

fn step_name(step: BookingStep) -> &'static str {
    match step {
        BookingStep::Location => "location",
        BookingStep::DateTime => "date-time",
        BookingStep::Coach => "coach",
        BookingStep::Player => "player",
        BookingStep::Payment => "payment",
        BookingStep::Confirmation => "confirmation",
    }
}

/// Serializable view of the booking draft.
#[derive(Debug, Serialize, ToSchema)]
pub struct DraftDto {
    /// Chosen venue, if any.
    pub location: Option<LocationDto>,
    /// Selected date, ISO format.
    pub date: String,
    /// Selected hourly slot, if any.
    pub time_slot: Option<SlotSelectionDto>,
    /// Chosen coach, if any.
    pub coach: Option<CoachDto>,
    /// Player details, if captured.
    pub player: Option<PlayerDto>,
    /// Payment receipt once the charge went through.
    pub receipt: Option<ReceiptDto>,
}

impl DraftDto {
    fn from_draft(draft: &BookingDraft) -> Self {
        Self {
            location: draft.location.clone().map(LocationDto::from),
            date: draft.date.to_string(),
            time_slot: draft.time_slot.as_ref().map(SlotSelectionDto::from),
            coach: draft.coach.clone().map(CoachDto::from),
            player: draft.player.as_ref().map(PlayerDto::from),
            receipt: draft.payment.as_ref().map(ReceiptDto::from),
        }
    }
}

/// The slot held in the draft.
#[derive(Debug, Serialize, ToSchema)]
pub struct SlotSelectionDto {
    /// Slot start, RFC 3339.
    pub start: String,
    /// Slot end, RFC 3339.
    pub end: String,
    /// Picker label.
    pub display_label: String,
}

impl From<&SelectedSlot> for SlotSelectionDto {
    fn from(slot: &SelectedSlot) -> Self {
        Self {
            start: format_instant(slot.start),
            end: format_instant(slot.end),
            display_label: slot.display_label.clone(),
        }
    }
}

/// Player details held in the draft.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlayerDto {
    /// Saved athlete reference, if reusing one.
    pub athlete_id: Option<Uuid>,
    /// Player name.
    pub name: String,
    /// Date of birth, ISO format.
    pub date_of_birth: Option<String>,
    /// Notes for the coach.
    pub notes: String,
    /// Whether this player should be saved as a new athlete.
    pub is_new_athlete: bool,
}

impl From<&PlayerDetails> for PlayerDto {
    fn from(player: &PlayerDetails) -> Self {
        Self {
            athlete_id: player.athlete_id,
            name: player.name.clone(),
            date_of_birth: player.date_of_birth.map(|d| d.to_string()),
            notes: player.notes.clone(),
            is_new_athlete: player.is_new_athlete,
        }
    }
}

/// Receipt held in the draft after a successful charge.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReceiptDto {
    /// Processor token for the charge.
    pub token: String,
    /// Last four digits of the card.
    pub card_last4: String,
    /// Amount charged, in pence.
    pub amount_pence: u32,
}

impl From<&PaymentReceipt> for ReceiptDto {
    fn from(receipt: &PaymentReceipt) -> Self {
        Self {
            token: receipt.token.clone(),
            card_last4: receipt.card_last4.clone(),
            amount_pence: receipt.amount_pence,
        }
    }
}

/// Venue selection payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectLocationRequest {
    /// Identifier of the chosen venue.
    pub location_id: Uuid,
}

/// Date selection payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectDateRequest {
    /// ISO date, e.g. "2026-09-07".
    #[validate(length(min = 8, max = 10))]
    pub date: String,
}

/// Slot selection payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SelectSlotRequest {
    /// Slot identifier from the slot list, e.g. "2026-09-07-10".
    #[validate(length(min = 1))]
    pub slot_id: String,
}

/// Coach selection payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SelectCoachRequest {
    /// Identifier of the chosen coach.
    pub coach_id: Uuid,
}

/// Player details payload.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct PlayerRequest {
    /// Saved athlete to reuse, if any.
    #[serde(default)]
    pub athlete_id: Option<Uuid>,
    /// Player name; may be blank only when an athlete is referenced.
    #[validate(length(max = 120))]
    #[serde(default)]
    pub name: String,
    /// ISO date of birth.
    #[serde(default)]
    pub date_of_birth: Option<String>,
    /// Notes for the coach.
    #[serde(default)]
    pub notes: String,
    /// Save this player as a new athlete on completion.
    #[serde(default)]
    pub is_new_athlete: bool,
}

/// Card payload for the payment step.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    /// Primary account number; digits and spaces.
    pub card_number: String,
    /// Expiry month, 1 through 12.
    pub expiry_month: u8,
    /// Four-digit expiry year.
    pub expiry_year: u16,
    /// Card security code.
    pub cvc: String,
    /// Name as printed on the card.
    pub cardholder: String,
}

impl Validate for PaymentRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_card_number(&self.card_number) {
            errors.add("card_number", e);
        }
        if let Err(e) = validate_cvc(&self.cvc) {
            errors.add("cvc", e);
        }
        if !(1..=12).contains(&self.expiry_month) {
            errors.add("expiry_month", validator::ValidationError::new("range"));
        }
        if !(2000..=2100).contains(&self.expiry_year) {
            errors.add("expiry_year", validator::ValidationError::new("range"));
        }
        if self.cardholder.trim().is_empty() {
            errors.add("cardholder", validator::ValidationError::new("required"));
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
