use serde::Serialize;
use utoipa::ToSchema;

/// Simple health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Whether a storage backend was configured at startup.
    pub backend_configured: bool,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(backend_configured: bool) -> Self {
        Self {
            status: "ok".to_string(),
            backend_configured,
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded(backend_configured: bool) -> Self {
        Self {
            status: "degraded".to_string(),
            backend_configured,
        }
    }
}
