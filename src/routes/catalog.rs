use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::catalog::{AthleteDto, AthleteQuery, LocationDto},
    services::booking_service,
    state::SharedState,
};

/// Routes serving the static catalog surfaces.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/locations", get(list_locations))
        .route("/athletes", get(list_athletes))
}

/// List the venues offered on the location step.
#[utoipa::path(
    get,
    path = "/locations",
    tag = "catalog",
    responses(
        (status = 200, description = "Venue catalog", body = Vec<LocationDto>)
    )
)]
pub async fn list_locations(State(state): State<SharedState>) -> Json<Vec<LocationDto>> {
    Json(booking_service::list_locations(&state).await)
}

/// List saved athletes for a parent account.
#[utoipa::path(
    get,
    path = "/athletes",
    tag = "catalog",
    params(AthleteQuery),
    responses(
        (status = 200, description = "Saved athletes", body = Vec<AthleteDto>)
    )
)]
pub async fn list_athletes(
    State(state): State<SharedState>,
    Query(query): Query<AthleteQuery>,
) -> Json<Vec<AthleteDto>> {
    Json(booking_service::list_athletes(&state, query.parent_id).await)
}
