use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod auth;
pub mod claim;
pub mod draw;
pub mod game;
pub mod health;
pub mod participant;
pub mod prize;
pub mod public;
pub mod sse;
pub mod validation;

pub(crate) fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}

pub(crate) fn format_optional_time(time: Option<SystemTime>) -> Option<String> {
    time.map(format_system_time)
}

/// Parse an RFC 3339 timestamp received from a client.
pub fn parse_timestamp(raw: &str) -> Option<SystemTime> {
    OffsetDateTime::parse(raw, &Rfc3339).ok().map(SystemTime::from)
}
