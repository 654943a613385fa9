/// Admin login and session checks.
pub mod auth_service;
/// Claim validation and the claim feed.
pub mod claim_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Game lifecycle and number drawing.
pub mod draw_service;
/// Game records and livestream configuration.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Participant registration and listing.
pub mod participant_service;
/// Prize catalog per claim tier.
pub mod prize_service;
/// Read-only projections for the mobile client.
pub mod public_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events streaming.
pub mod sse_service;
/// Storage connection supervision and degraded mode.
pub mod storage_supervisor;
