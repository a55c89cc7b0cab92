use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Touchline Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::catalog::list_locations,
        crate::routes::catalog::list_athletes,
        crate::routes::booking::open_session,
        crate::routes::booking::get_session,
        crate::routes::booking::close_session,
        crate::routes::booking::advance_step,
        crate::routes::booking::previous_step,
        crate::routes::booking::cancel_flow,
        crate::routes::booking::put_location,
        crate::routes::booking::put_date,
        crate::routes::booking::put_slot,
        crate::routes::booking::put_coach,
        crate::routes::booking::put_player,
        crate::routes::booking::get_dates,
        crate::routes::booking::get_slots,
        crate::routes::booking::get_coaches,
        crate::routes::booking::post_payment,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::catalog::LocationDto,
            crate::dto::catalog::AthleteDto,
            crate::dto::catalog::CoachDto,
            crate::dto::catalog::TimeSlotDto,
            crate::dto::catalog::AvailableDatesResponse,
            crate::dto::booking::SessionCreatedResponse,
            crate::dto::booking::WizardSnapshot,
            crate::dto::booking::DraftDto,
            crate::dto::booking::SlotSelectionDto,
            crate::dto::booking::PlayerDto,
            crate::dto::booking::ReceiptDto,
            crate::dto::booking::SelectLocationRequest,
            crate::dto::booking::SelectDateRequest,
            crate::dto::booking::SelectSlotRequest,
            crate::dto::booking::SelectCoachRequest,
            crate::dto::booking::PlayerRequest,
            crate::dto::booking::PaymentRequest,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Venues and coach catalog"),
        (name = "booking", description = "Booking wizard operations"),
    )
)]
pub struct ApiDoc;
