use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::{
    booking_store::BookingStore,
    models::{
        AthleteEntity, BookingEntity, CoachEntity, LocationEntity, OpenSlotEntity,
        WeeklyHourEntity,
    },
    storage::StorageResult,
};

#[derive(Default)]
struct Collections {
    locations: RwLock<Vec<LocationEntity>>,
    coaches: RwLock<Vec<CoachEntity>>,
    open_slots: RwLock<Vec<OpenSlotEntity>>,
    weekly_hours: RwLock<Vec<WeeklyHourEntity>>,
    athletes: RwLock<Vec<AthleteEntity>>,
    bookings: RwLock<Vec<BookingEntity>>,
}

/// In-memory [`BookingStore`] used by tests and backend-less local runs.
#[derive(Clone, Default)]
pub struct MemoryBookingStore {
    collections: Arc<Collections>,
}

impl MemoryBookingStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the venue collection.
    pub fn seed_locations(&self, rows: Vec<LocationEntity>) {
        *self.collections.locations.write().unwrap() = rows;
    }

    /// Replace the coach collection.
    pub fn seed_coaches(&self, rows: Vec<CoachEntity>) {
        *self.collections.coaches.write().unwrap() = rows;
    }

    /// Replace the modern availability collection.
    pub fn seed_open_slots(&self, rows: Vec<OpenSlotEntity>) {
        *self.collections.open_slots.write().unwrap() = rows;
    }

    /// Replace the legacy availability collection.
    pub fn seed_weekly_hours(&self, rows: Vec<WeeklyHourEntity>) {
        *self.collections.weekly_hours.write().unwrap() = rows;
    }

    /// Replace the athlete collection.
    pub fn seed_athletes(&self, rows: Vec<AthleteEntity>) {
        *self.collections.athletes.write().unwrap() = rows;
    }

    /// Bookings written through [`BookingStore::save_booking`], oldest first.
    pub fn bookings(&self) -> Vec<BookingEntity> {
        self.collections.bookings.read().unwrap().clone()
    }
}

impl BookingStore for MemoryBookingStore {
    fn open_slots_in_range(
        &self,
        location_id: Option<Uuid>,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Vec<OpenSlotEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store.collections.open_slots.read().unwrap();
            Ok(rows
                .iter()
                .filter(|row| row.is_open())
                .filter(|row| location_id.is_none_or(|id| row.location_id == id))
                .filter(|row| row.starts_at < to && row.ends_at > from)
                .cloned()
                .collect())
        })
    }

    fn weekly_hours(&self) -> BoxFuture<'static, StorageResult<Vec<WeeklyHourEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store.collections.weekly_hours.read().unwrap();
            Ok(rows.iter().filter(|row| row.is_active).cloned().collect())
        })
    }

    fn list_locations(&self) -> BoxFuture<'static, StorageResult<Vec<LocationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut rows = store.collections.locations.read().unwrap().clone();
            rows.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(rows)
        })
    }

    fn list_coaches(
        &self,
        location_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<CoachEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store.collections.coaches.read().unwrap();
            Ok(rows
                .iter()
                .filter(|coach| location_id.is_none_or(|id| coach.locations_served.contains(&id)))
                .cloned()
                .collect())
        })
    }

    fn find_athletes(
        &self,
        parent_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AthleteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows = store.collections.athletes.read().unwrap();
            Ok(rows
                .iter()
                .filter(|athlete| athlete.parent_id == parent_id)
                .cloned()
                .collect())
        })
    }

    fn save_athlete(&self, athlete: AthleteEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let mut rows = store.collections.athletes.write().unwrap();
            rows.retain(|existing| existing.id != athlete.id);
            rows.push(athlete);
            Ok(())
        })
    }

    fn save_booking(&self, booking: BookingEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.collections.bookings.write().unwrap().push(booking);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
