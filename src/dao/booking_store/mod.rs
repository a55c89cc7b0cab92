pub mod memory;
#[cfg(feature = "rest-store")]
pub mod rest;

use futures::future::BoxFuture;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::{
    models::{
        AthleteEntity, BookingEntity, CoachEntity, LocationEntity, OpenSlotEntity,
        WeeklyHourEntity,
    },
    storage::StorageResult,
};

/// Abstraction over the persistence layer behind the booking flow.
///
/// Every method is a plain filter-then-select over a named collection; the
/// booking core treats errors as "no rows" and falls back, so implementations
/// never need to distinguish error causes beyond [`crate::dao::storage::StorageError`].
pub trait BookingStore: Send + Sync {
    /// Open rows from the modern `availability` collection intersecting the range.
    fn open_slots_in_range(
        &self,
        location_id: Option<Uuid>,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Vec<OpenSlotEntity>>>;
    /// Active rows from the legacy `coach_availability` collection.
    fn weekly_hours(&self) -> BoxFuture<'static, StorageResult<Vec<WeeklyHourEntity>>>;
    /// All venues, ordered by name.
    fn list_locations(&self) -> BoxFuture<'static, StorageResult<Vec<LocationEntity>>>;
    /// Coaches, optionally narrowed to those serving a venue.
    fn list_coaches(
        &self,
        location_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<CoachEntity>>>;
    /// Athletes owned by a parent account.
    fn find_athletes(
        &self,
        parent_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AthleteEntity>>>;
    /// Insert or replace an athlete record.
    fn save_athlete(&self, athlete: AthleteEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert a confirmed booking.
    fn save_booking(&self, booking: BookingEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap liveness probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish connectivity after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
