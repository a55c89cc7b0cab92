use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use crate::dao::{
    booking_store::BookingStore,
    models::{
        AthleteEntity, BookingEntity, CoachEntity, LocationEntity, OpenSlotEntity,
        WeeklyHourEntity,
    },
    storage::StorageResult,
};

use super::{
    config::RestConfig,
    error::{RestDaoError, RestResult},
};

const LOCATIONS: &str = "locations";
const COACHES: &str = "coaches";
const AVAILABILITY: &str = "availability";
const COACH_AVAILABILITY: &str = "coach_availability";
const ATHLETES: &str = "athletes";
const BOOKINGS: &str = "sessions";

/// [`BookingStore`] backed by a PostgREST-style HTTP endpoint.
///
/// Every collection is a table exposed at `{base_url}/{table}` accepting
/// `select`, `eq.`, `gte.` and `lt.` filters as query parameters.
#[derive(Clone)]
pub struct RestBookingStore {
    client: Client,
    base_url: Arc<str>,
    api_key: Option<Arc<str>>,
}

impl RestBookingStore {
    /// Build the HTTP client and verify the endpoint answers.
    pub async fn connect(config: RestConfig) -> RestResult<Self> {
        let client = Client::builder()
            .build()
            .map_err(|source| RestDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            api_key: config.api_key.map(Arc::from),
        };

        store.probe().await?;
        Ok(store)
    }

    fn request(&self, table: &str, query: &[(&str, String)]) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, table);
        let mut builder = self.client.get(url).query(query);
        if let Some(ref key) = self.api_key {
            builder = builder
                .header("apikey", key.as_ref())
                .bearer_auth(key.as_ref());
        }
        builder
    }

    async fn select<T>(&self, table: &str, query: &[(&str, String)]) -> RestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self.request(table, query).send().await.map_err(|source| {
            RestDaoError::RequestSend {
                path: table.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestDaoError::RequestStatus {
                path: table.to_string(),
                status,
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| RestDaoError::DecodeResponse {
                path: table.to_string(),
                source,
            })
    }

    async fn insert<T>(&self, table: &str, row: &T) -> RestResult<()>
    where
        T: serde::Serialize + ?Sized,
    {
        let url = format!("{}/{}", self.base_url, table);
        let mut builder = self.client.post(url).json(row);
        if let Some(ref key) = self.api_key {
            builder = builder
                .header("apikey", key.as_ref())
                .bearer_auth(key.as_ref());
        }

        let response = builder
            .send()
            .await
            .map_err(|source| RestDaoError::RequestSend {
                path: table.to_string(),
                source,
            })?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(RestDaoError::RequestStatus {
                path: table.to_string(),
                status,
            })
        }
    }

    async fn probe(&self) -> RestResult<()> {
        self.select::<serde_json::Value>(LOCATIONS, &[("select", "id".into()), ("limit", "1".into())])
            .await
            .map(|_| ())
    }

    fn rfc3339(table: &str, instant: OffsetDateTime) -> RestResult<String> {
        instant
            .format(&Rfc3339)
            .map_err(|source| RestDaoError::EncodeQuery {
                path: table.to_string(),
                source,
            })
    }
}

impl BookingStore for RestBookingStore {
    fn open_slots_in_range(
        &self,
        location_id: Option<Uuid>,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> BoxFuture<'static, StorageResult<Vec<OpenSlotEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut query = vec![
                ("select", "*".to_string()),
                ("status", "eq.open".to_string()),
                ("ends_at", format!("gte.{}", Self::rfc3339(AVAILABILITY, from)?)),
                ("starts_at", format!("lt.{}", Self::rfc3339(AVAILABILITY, to)?)),
                ("order", "starts_at.asc".to_string()),
            ];
            if let Some(id) = location_id {
                query.push(("location_id", format!("eq.{id}")));
            }
            store
                .select(AVAILABILITY, &query)
                .await
                .map_err(Into::into)
        })
    }

    fn weekly_hours(&self) -> BoxFuture<'static, StorageResult<Vec<WeeklyHourEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query = [
                ("select", "*".to_string()),
                ("is_active", "eq.true".to_string()),
                ("order", "day_of_week.asc".to_string()),
            ];
            store
                .select(COACH_AVAILABILITY, &query)
                .await
                .map_err(Into::into)
        })
    }

    fn list_locations(&self) -> BoxFuture<'static, StorageResult<Vec<LocationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query = [
                ("select", "*".to_string()),
                ("order", "name.asc".to_string()),
            ];
            store.select(LOCATIONS, &query).await.map_err(Into::into)
        })
    }

    fn list_coaches(
        &self,
        location_id: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<CoachEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut query = vec![("select", "*".to_string()), ("order", "name.asc".to_string())];
            if let Some(id) = location_id {
                query.push(("locations_served", format!("cs.{{{id}}}")));
            }
            store.select(COACHES, &query).await.map_err(Into::into)
        })
    }

    fn find_athletes(
        &self,
        parent_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<AthleteEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let query = [
                ("select", "*".to_string()),
                ("parent_id", format!("eq.{parent_id}")),
                ("order", "created_at.asc".to_string()),
            ];
            store.select(ATHLETES, &query).await.map_err(Into::into)
        })
    }

    fn save_athlete(&self, athlete: AthleteEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(ATHLETES, &athlete).await.map_err(Into::into) })
    }

    fn save_booking(&self, booking: BookingEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert(BOOKINGS, &booking).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.probe().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.probe().await.map_err(Into::into) })
    }
}
