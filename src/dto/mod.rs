use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod booking;
pub mod catalog;
pub mod health;
pub mod validation;

fn format_instant(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
