/// Availability resolution across modern, legacy and heuristic sources.
pub mod availability;
/// Booking wizard orchestration and persistence.
pub mod booking_service;
/// Coach matching and availability demotion.
pub mod coaches;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Payment gateway seam and stub processor.
pub mod payment;
/// Hourly slot expansion for a selected date.
pub mod slots;
/// Storage backend connection supervisor.
pub mod storage_supervisor;
