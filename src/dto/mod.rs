use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod admin;
pub mod guess;
pub mod health;
pub mod playlist;
pub mod results;
pub mod submission;
pub mod validation;

pub(crate) fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
