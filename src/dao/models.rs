use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::card::Card;

/// Lifecycle status of a bingo game.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    /// Created or reset, not accepting draws yet.
    Waiting,
    /// The single live game; draws are accepted.
    Active,
    /// Closed explicitly or superseded by another game's start.
    Finished,
}

impl GameStatus {
    /// Wire representation used by every backend.
    pub fn as_str(self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Active => "active",
            GameStatus::Finished => "finished",
        }
    }
}

/// Typed prize and livestream configuration attached to a game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSettings {
    /// Free-form description shown to operators.
    pub description: Option<String>,
    /// Amount awarded for the first validated line.
    pub prize_line: f64,
    /// Amount awarded for the first validated column.
    pub prize_column: f64,
    /// Amount awarded for the first validated full card.
    pub prize_full: f64,
    /// Image shown next to the main prize in the mobile client.
    pub prize_image_url: Option<String>,
    /// Livestream link pushed to the mobile client.
    pub youtube_live_url: Option<String>,
    /// Most recently drawn number, cleared on reset.
    pub last_number: Option<u8>,
}

impl GameSettings {
    /// Prize amount for the given claim tier.
    pub fn prize_for(&self, claim_type: ClaimType) -> f64 {
        match claim_type {
            ClaimType::Line => self.prize_line,
            ClaimType::Column => self.prize_column,
            ClaimType::FullCard => self.prize_full,
        }
    }
}

/// Persisted bingo game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameEntity {
    /// Stable identifier for the game.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Current lifecycle status.
    pub status: GameStatus,
    /// Set when the game becomes active.
    pub started_at: Option<SystemTime>,
    /// Set when the game is finished or superseded.
    pub finished_at: Option<SystemTime>,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// Last mutation timestamp.
    pub updated_at: SystemTime,
    /// Prize and livestream configuration.
    pub settings: GameSettings,
}

/// Single drawn number of a game. Never mutated after insertion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawnNumberEntity {
    /// Record identifier.
    pub id: Uuid,
    /// Owning game.
    pub game_id: Uuid,
    /// Value in `1..=75`, unique per game.
    pub number: u8,
    /// When the number was drawn.
    pub drawn_at: SystemTime,
    /// Whether the operator supplied the value.
    pub is_manual: bool,
}

/// Status of a participant relative to the game they registered for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    /// Registered, waiting for the game to begin.
    Waiting,
    /// Taking part in the running game.
    Playing,
}

impl ParticipantStatus {
    /// Wire representation used by every backend.
    pub fn as_str(self) -> &'static str {
        match self {
            ParticipantStatus::Waiting => "waiting",
            ParticipantStatus::Playing => "playing",
        }
    }
}

/// Player registered for a game together with their card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParticipantEntity {
    /// Stable identifier for the participant.
    pub id: Uuid,
    /// Game the participant registered for.
    pub game_id: Uuid,
    /// Display name, reported as winner name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Optional e-mail address.
    pub email: Option<String>,
    /// Optional PIX key used to pay prizes.
    pub pix_key: Option<String>,
    /// Card generated at registration.
    pub card: Card,
    /// Participation status.
    pub status: ParticipantStatus,
    /// Whether a claim of this participant was validated.
    pub is_winner: bool,
    /// Tier of the latest validated claim.
    pub winner_type: Option<ClaimType>,
    /// When the latest win was recorded.
    pub winner_at: Option<SystemTime>,
    /// Registration timestamp.
    pub created_at: SystemTime,
}

/// Prize tier a claim refers to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum ClaimType {
    /// Any complete row.
    #[serde(rename = "line")]
    Line,
    /// Any complete column.
    #[serde(rename = "column")]
    Column,
    /// Every cell of the card.
    #[serde(rename = "full-card")]
    FullCard,
}

impl ClaimType {
    /// All tiers in award order.
    pub const ALL: [ClaimType; 3] = [ClaimType::Line, ClaimType::Column, ClaimType::FullCard];

    /// Wire representation used by every backend.
    pub fn as_str(self) -> &'static str {
        match self {
            ClaimType::Line => "line",
            ClaimType::Column => "column",
            ClaimType::FullCard => "full-card",
        }
    }

    /// Human label shown in the admin claim feed.
    pub fn label(self) -> &'static str {
        match self {
            ClaimType::Line => "Linha",
            ClaimType::Column => "Coluna",
            ClaimType::FullCard => "Cartela completa",
        }
    }

    /// Parse the wire representation.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// Assertion by a participant (or operator) that a prize pattern is complete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimEntity {
    /// Record identifier.
    pub id: Uuid,
    /// Game the claim belongs to.
    pub game_id: Uuid,
    /// Participant asserting the win.
    pub participant_id: Uuid,
    /// Claimed tier.
    pub claim_type: ClaimType,
    /// At most one validated claim exists per `(game_id, claim_type)`.
    pub validated: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
    /// When the claim was validated.
    pub validated_at: Option<SystemTime>,
}

/// Catalog entry describing the prize of a tier, shown next to a validated claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrizeEntity {
    /// Record identifier.
    pub id: Uuid,
    /// Tier the prize is awarded for.
    pub prize_type: ClaimType,
    /// Display title.
    pub title: String,
    /// Free-form description, empty when not provided.
    pub description: String,
    /// Nominal value.
    pub value: f64,
    /// Picture of the prize.
    pub image_url: Option<String>,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Predicate used to list claims.
#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    /// Restrict to a single game.
    pub game_id: Option<Uuid>,
    /// Only claims created or validated at or after this instant.
    pub since: Option<SystemTime>,
    /// Only validated claims.
    pub only_validated: bool,
    /// Maximum number of rows, newest first.
    pub limit: Option<usize>,
}

impl ClaimFilter {
    /// Whether a claim satisfies this filter, ignoring the limit.
    pub fn matches(&self, claim: &ClaimEntity) -> bool {
        self.game_id.is_none_or(|id| claim.game_id == id)
            && self.since.is_none_or(|since| {
                claim.created_at >= since || claim.validated_at.is_some_and(|at| at >= since)
            })
            && (!self.only_validated || claim.validated)
    }
}
