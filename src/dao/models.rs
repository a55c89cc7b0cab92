use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// Venue where coaching sessions take place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocationEntity {
    /// Stable identifier for the venue.
    pub id: Uuid,
    /// Display name of the venue (e.g. "Lochwinnoch Sports Hub").
    pub name: String,
    /// Town or city the venue sits in, used to match legacy freeform rows.
    pub city: String,
    /// Street address shown on the confirmation.
    pub address: String,
}

/// Coach profile as persisted by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoachEntity {
    /// Stable identifier for the coach.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Avatar image URL, if one was uploaded.
    pub avatar_url: Option<String>,
    /// Average parent rating out of five.
    pub rating: f32,
    /// Number of reviews backing the rating.
    pub review_count: u32,
    /// Coaching specialties (e.g. "Finishing", "Goalkeeping").
    pub specialties: Vec<String>,
    /// Human readable experience summary (e.g. "8+ years").
    pub experience_label: String,
    /// Short biography shown on the coach card.
    pub bio: String,
    /// Price for a one-hour session, in pence.
    pub price_per_session_pence: u32,
    /// Certifications held by the coach.
    pub certifications: Vec<String>,
    /// Club the coach currently plays or works for.
    pub current_club: Option<String>,
    /// Venue identifiers this coach serves.
    pub locations_served: Vec<Uuid>,
}

/// Modern availability row: an explicit open timestamp range for one coach at
/// one venue. Only rows with [`OpenSlotEntity::is_open`] are usable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OpenSlotEntity {
    /// Coach the range belongs to.
    pub coach_id: Uuid,
    /// Venue the range applies to.
    pub location_id: Uuid,
    /// Inclusive start of the open range.
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    /// Exclusive end of the open range.
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    /// Row status; anything other than "open" makes the row unusable.
    pub status: String,
}

impl OpenSlotEntity {
    /// Whether this row may contribute availability at all.
    pub fn is_open(&self) -> bool {
        self.status == "open"
    }
}

/// Legacy availability row: a weekly recurrence expressed as day-of-week plus
/// time-of-day strings, with a freeform venue label instead of a foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeeklyHourEntity {
    /// Coach the recurrence belongs to.
    pub coach_id: Uuid,
    /// Day of week, 0 = Sunday through 6 = Saturday.
    pub day_of_week: u8,
    /// Start of the open window as "HH:MM".
    pub start_time: String,
    /// End of the open window as "HH:MM" (exclusive).
    pub end_time: String,
    /// Freeform venue label, compared against venue name or city.
    pub location: String,
    /// Inactive rows are ignored entirely.
    pub is_active: bool,
}

/// Child athlete owned by a parent account; survives across bookings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AthleteEntity {
    /// Stable identifier for the athlete.
    pub id: Uuid,
    /// Parent/guardian account that owns this record.
    pub parent_id: Uuid,
    /// Athlete display name.
    pub name: String,
    /// Date of birth, used for age-group placement.
    pub birth_date: Option<Date>,
    /// Free-text notes from the parent (medical, skill level, ...).
    pub notes: String,
    /// Creation timestamp for auditing.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Confirmed booking written once payment succeeds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingEntity {
    /// Primary key of the booking.
    pub id: Uuid,
    /// Venue the session takes place at.
    pub location_id: Uuid,
    /// Coach delivering the session.
    pub coach_id: Uuid,
    /// Athlete attending, when the parent picked an existing one.
    pub athlete_id: Option<Uuid>,
    /// Athlete name as entered, kept even when `athlete_id` is set.
    pub athlete_name: String,
    /// Session start instant.
    #[serde(with = "time::serde::rfc3339")]
    pub starts_at: OffsetDateTime,
    /// Session end instant.
    #[serde(with = "time::serde::rfc3339")]
    pub ends_at: OffsetDateTime,
    /// Amount captured, in pence.
    pub amount_pence: u32,
    /// Redacted payment confirmation token; never raw card data.
    pub payment_token: String,
    /// Creation timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
