use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{
        booking::{
            PaymentRequest, PlayerRequest, SelectCoachRequest, SelectDateRequest,
            SelectLocationRequest, SelectSlotRequest, SessionCreatedResponse, WizardSnapshot,
        },
        catalog::{AvailableDatesResponse, CoachDto, CoachQuery, MonthQuery, TimeSlotDto},
    },
    error::AppError,
    services::booking_service,
    state::SharedState,
};

/// Routes driving the booking wizard.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/bookings/wizard", post(open_session))
        .route(
            "/bookings/wizard/{id}",
            get(get_session).delete(close_session),
        )
        .route("/bookings/wizard/{id}/next", post(advance_step))
        .route("/bookings/wizard/{id}/previous", post(previous_step))
        .route("/bookings/wizard/{id}/cancel", post(cancel_flow))
        .route("/bookings/wizard/{id}/location", put(put_location))
        .route("/bookings/wizard/{id}/date", put(put_date))
        .route("/bookings/wizard/{id}/slot", put(put_slot))
        .route("/bookings/wizard/{id}/coach", put(put_coach))
        .route("/bookings/wizard/{id}/player", put(put_player))
        .route("/bookings/wizard/{id}/dates", get(get_dates))
        .route("/bookings/wizard/{id}/slots", get(get_slots))
        .route("/bookings/wizard/{id}/coaches", get(get_coaches))
        .route("/bookings/wizard/{id}/payment", post(post_payment))
}

/// Open a wizard session, restoring any autosaved draft.
#[utoipa::path(
    post,
    path = "/bookings/wizard",
    tag = "booking",
    responses(
        (status = 200, description = "Session opened", body = SessionCreatedResponse)
    )
)]
pub async fn open_session(State(state): State<SharedState>) -> Json<SessionCreatedResponse> {
    Json(booking_service::open_session(&state).await)
}

/// Current wizard state.
#[utoipa::path(
    get,
    path = "/bookings/wizard/{id}",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    responses(
        (status = 200, description = "Wizard snapshot", body = WizardSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn get_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, AppError> {
    Ok(Json(booking_service::snapshot(&state, id).await?))
}

/// Drop a wizard session (navigation away from the flow).
#[utoipa::path(
    delete,
    path = "/bookings/wizard/{id}",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn close_session(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    booking_service::close_session(&state, id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Advance to the next step if the current gate is satisfied.
#[utoipa::path(
    post,
    path = "/bookings/wizard/{id}/next",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    responses(
        (status = 200, description = "Advanced", body = WizardSnapshot),
        (status = 409, description = "Step gate unsatisfied")
    )
)]
pub async fn advance_step(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, AppError> {
    Ok(Json(booking_service::advance(&state, id).await?))
}

/// Step back, preserving everything entered so far.
#[utoipa::path(
    post,
    path = "/bookings/wizard/{id}/previous",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    responses(
        (status = 200, description = "Stepped back", body = WizardSnapshot),
        (status = 409, description = "Already at the first step")
    )
)]
pub async fn previous_step(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, AppError> {
    Ok(Json(booking_service::go_back(&state, id).await?))
}

/// Abandon the draft and clear the autosave slot.
#[utoipa::path(
    post,
    path = "/bookings/wizard/{id}/cancel",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    responses(
        (status = 200, description = "Flow reset", body = WizardSnapshot),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn cancel_flow(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WizardSnapshot>, AppError> {
    Ok(Json(booking_service::cancel(&state, id).await?))
}

/// Record the venue choice.
#[utoipa::path(
    put,
    path = "/bookings/wizard/{id}/location",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    request_body = SelectLocationRequest,
    responses(
        (status = 200, description = "Location recorded", body = WizardSnapshot),
        (status = 404, description = "Unknown session or location")
    )
)]
pub async fn put_location(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectLocationRequest>,
) -> Result<Json<WizardSnapshot>, AppError> {
    Ok(Json(
        booking_service::select_location(&state, id, &payload).await?,
    ))
}

/// Record the date choice.
#[utoipa::path(
    put,
    path = "/bookings/wizard/{id}/date",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    request_body = SelectDateRequest,
    responses(
        (status = 200, description = "Date recorded", body = WizardSnapshot),
        (status = 400, description = "Malformed or past date")
    )
)]
pub async fn put_date(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectDateRequest>,
) -> Result<Json<WizardSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(
        booking_service::select_date(&state, id, &payload).await?,
    ))
}

/// Record the slot choice.
#[utoipa::path(
    put,
    path = "/bookings/wizard/{id}/slot",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    request_body = SelectSlotRequest,
    responses(
        (status = 200, description = "Slot recorded", body = WizardSnapshot),
        (status = 404, description = "Unknown slot")
    )
)]
pub async fn put_slot(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectSlotRequest>,
) -> Result<Json<WizardSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(
        booking_service::select_slot(&state, id, &payload).await?,
    ))
}

/// Record the coach choice.
#[utoipa::path(
    put,
    path = "/bookings/wizard/{id}/coach",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    request_body = SelectCoachRequest,
    responses(
        (status = 200, description = "Coach recorded", body = WizardSnapshot),
        (status = 409, description = "Coach unavailable for the selected slot")
    )
)]
pub async fn put_coach(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SelectCoachRequest>,
) -> Result<Json<WizardSnapshot>, AppError> {
    Ok(Json(
        booking_service::select_coach(&state, id, &payload).await?,
    ))
}

/// Record the player details.
#[utoipa::path(
    put,
    path = "/bookings/wizard/{id}/player",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    request_body = PlayerRequest,
    responses(
        (status = 200, description = "Player recorded", body = WizardSnapshot),
        (status = 400, description = "Missing player name and athlete")
    )
)]
pub async fn put_player(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlayerRequest>,
) -> Result<Json<WizardSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(
        booking_service::submit_player(&state, id, &payload).await?,
    ))
}

/// Bookable days of the requested month.
#[utoipa::path(
    get,
    path = "/bookings/wizard/{id}/dates",
    tag = "booking",
    params(
        ("id" = Uuid, Path, description = "Wizard session identifier"),
        MonthQuery
    ),
    responses(
        (status = 200, description = "Bookable days", body = AvailableDatesResponse),
        (status = 409, description = "Superseded by a newer request")
    )
)]
pub async fn get_dates(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<AvailableDatesResponse>, AppError> {
    query.validate()?;
    Ok(Json(
        booking_service::available_dates(&state, id, &query).await?,
    ))
}

/// Hourly slots for the selected date.
#[utoipa::path(
    get,
    path = "/bookings/wizard/{id}/slots",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    responses(
        (status = 200, description = "Hourly slots", body = Vec<TimeSlotDto>)
    )
)]
pub async fn get_slots(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TimeSlotDto>>, AppError> {
    Ok(Json(booking_service::slots_for_date(&state, id).await?))
}

/// Coach candidates for the current context.
#[utoipa::path(
    get,
    path = "/bookings/wizard/{id}/coaches",
    tag = "booking",
    params(
        ("id" = Uuid, Path, description = "Wizard session identifier"),
        CoachQuery
    ),
    responses(
        (status = 200, description = "Coach candidates", body = Vec<CoachDto>)
    )
)]
pub async fn get_coaches(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CoachQuery>,
) -> Result<Json<Vec<CoachDto>>, AppError> {
    Ok(Json(
        booking_service::coach_candidates(&state, id, query.specialty.as_deref()).await?,
    ))
}

/// Charge the card and confirm the booking.
#[utoipa::path(
    post,
    path = "/bookings/wizard/{id}/payment",
    tag = "booking",
    params(("id" = Uuid, Path, description = "Wizard session identifier")),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Booking confirmed", body = WizardSnapshot),
        (status = 402, description = "Payment declined"),
        (status = 409, description = "Wizard is not at the payment step")
    )
)]
pub async fn post_payment(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentRequest>,
) -> Result<Json<WizardSnapshot>, AppError> {
    payload.validate()?;
    Ok(Json(
        booking_service::take_payment(&state, id, &payload).await?,
    ))
}
