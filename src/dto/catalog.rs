use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{CoachEntity, LocationEntity},
    dto::format_instant,
    services::slots::TimeSlot,
    state::draft::CoachCandidate,
};

/// A coaching venue offered on the location step.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LocationDto {
    /// Stable venue identifier.
    pub id: Uuid,
    /// Venue name shown on the card.
    pub name: String,
    /// Town or city.
    pub city: String,
    /// Street address.
    pub address: String,
}

impl From<LocationEntity> for LocationDto {
    fn from(entity: LocationEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            city: entity.city,
            address: entity.address,
        }
    }
}

/// A coach candidate with its availability flag for the current context.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CoachDto {
    /// Stable coach identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Optional avatar image URL.
    pub avatar_url: Option<String>,
    /// Average review rating.
    pub rating: f32,
    /// Number of reviews behind the rating.
    pub review_count: u32,
    /// Specialty labels used by the specialty filter.
    pub specialties: Vec<String>,
    /// Free-form experience blurb.
    pub experience_label: String,
    /// Longer biography text.
    pub bio: String,
    /// Session price in pence.
    pub price_per_session_pence: u32,
    /// Certification labels.
    pub certifications: Vec<String>,
    /// Current club affiliation, if any.
    pub current_club: Option<String>,
    /// Demoted for the selected slot; still listed, never hidden.
    pub is_unavailable: bool,
}

impl From<CoachCandidate> for CoachDto {
    fn from(candidate: CoachCandidate) -> Self {
        let CoachEntity {
            id,
            name,
            avatar_url,
            rating,
            review_count,
            specialties,
            experience_label,
            bio,
            price_per_session_pence,
            certifications,
            current_club,
            locations_served: _,
        } = candidate.coach;
        Self {
            id,
            name,
            avatar_url,
            rating,
            review_count,
            specialties,
            experience_label,
            bio,
            price_per_session_pence,
            certifications,
            current_club,
            is_unavailable: candidate.is_unavailable,
        }
    }
}

/// One hourly slot on the time picker.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimeSlotDto {
    /// Stable slot identifier, `<date>-<hour>`.
    pub id: String,
    /// Slot start, RFC 3339.
    pub start: String,
    /// Slot end, RFC 3339.
    pub end: String,
    /// Picker label, e.g. "10:00 AM - 11:00 AM".
    pub display_label: String,
    /// Whether an availability row covers this hour.
    pub available: bool,
}

impl From<&TimeSlot> for TimeSlotDto {
    fn from(slot: &TimeSlot) -> Self {
        Self {
            id: slot.id.clone(),
            start: format_instant(slot.start),
            end: format_instant(slot.end),
            display_label: slot.display_label.clone(),
            available: slot.available,
        }
    }
}

/// Query selecting the month shown on the date picker.
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct MonthQuery {
    /// Calendar year, e.g. 2026.
    #[validate(range(min = 2000, max = 2100))]
    pub year: i32,
    /// Calendar month, 1 through 12.
    #[validate(range(min = 1, max = 12))]
    pub month: u8,
}

/// Bookable days of the requested month.
#[derive(Debug, Serialize, ToSchema)]
pub struct AvailableDatesResponse {
    /// ISO dates, ascending, all today or later. Never empty while the month
    /// still has a future day.
    pub dates: Vec<String>,
}

/// Optional specialty filter on the coach list.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CoachQuery {
    /// Specialty substring; "all" or absent disables filtering.
    pub specialty: Option<String>,
}

/// Account filter on the saved-athlete list.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AthleteQuery {
    /// Parent account owning the athletes.
    pub parent_id: Uuid,
}

/// A saved athlete offered on the player step.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AthleteDto {
    /// Stable athlete identifier.
    pub id: Uuid,
    /// Athlete name.
    pub name: String,
    /// Date of birth, ISO format.
    pub date_of_birth: Option<String>,
    /// Standing notes for the coach.
    pub notes: String,
}

impl From<crate::dao::models::AthleteEntity> for AthleteDto {
    fn from(entity: crate::dao::models::AthleteEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            date_of_birth: entity.birth_date.map(|d| d.to_string()),
            notes: entity.notes,
        }
    }
}
