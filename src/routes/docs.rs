use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{services::documentation::ApiDoc, state::SharedState};

/// Swagger UI for the booking API, served at `/docs` and backed by the
/// generated document at `/api-doc/touchline.json`.
pub fn router(state: SharedState) -> Router<SharedState> {
    let ui: Router<SharedState> = SwaggerUi::new("/docs")
        .url("/api-doc/touchline.json", ApiDoc::openapi())
        .into();

    ui.with_state(state)
}
