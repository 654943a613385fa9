use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{RestDaoError, RestResult};
use crate::{
    dao::models::{
        ClaimEntity, ClaimType, DrawnNumberEntity, GameEntity, GameSettings, GameStatus,
        ParticipantEntity, ParticipantStatus, PrizeEntity,
    },
    dto::{format_optional_time, format_system_time, parse_timestamp},
    state::card::Card,
};

pub const GAME_TABLE: &str = "games";
pub const DRAWN_NUMBER_TABLE: &str = "drawn_numbers";
pub const PARTICIPANT_TABLE: &str = "participants";
pub const CLAIM_TABLE: &str = "bingo_claims";
pub const PRIZE_TABLE: &str = "prizes";

/// Row of the `games` table. Prizes live in the `settings` jsonb column; the livestream link is
/// mirrored into its own column for other readers of the table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRow {
    id: Uuid,
    name: String,
    status: GameStatus,
    started_at: Option<String>,
    finished_at: Option<String>,
    created_at: String,
    updated_at: String,
    #[serde(default)]
    youtube_live_url: Option<String>,
    settings: GameSettings,
}

impl From<GameEntity> for GameRow {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            name: value.name,
            status: value.status,
            started_at: format_optional_time(value.started_at),
            finished_at: format_optional_time(value.finished_at),
            created_at: format_system_time(value.created_at),
            updated_at: format_system_time(value.updated_at),
            youtube_live_url: value.settings.youtube_live_url.clone(),
            settings: value.settings,
        }
    }
}

impl TryFrom<GameRow> for GameEntity {
    type Error = RestDaoError;

    fn try_from(value: GameRow) -> RestResult<Self> {
        let mut settings = value.settings;
        if settings.youtube_live_url.is_none() {
            settings.youtube_live_url = value.youtube_live_url;
        }
        Ok(Self {
            id: value.id,
            name: value.name,
            status: value.status,
            started_at: parse_optional(GAME_TABLE, value.started_at)?,
            finished_at: parse_optional(GAME_TABLE, value.finished_at)?,
            created_at: parse(GAME_TABLE, &value.created_at)?,
            updated_at: parse(GAME_TABLE, &value.updated_at)?,
            settings,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawnNumberRow {
    id: Uuid,
    game_id: Uuid,
    number: u8,
    drawn_at: String,
    is_manual: bool,
}

impl From<DrawnNumberEntity> for DrawnNumberRow {
    fn from(value: DrawnNumberEntity) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            number: value.number,
            drawn_at: format_system_time(value.drawn_at),
            is_manual: value.is_manual,
        }
    }
}

impl TryFrom<DrawnNumberRow> for DrawnNumberEntity {
    type Error = RestDaoError;

    fn try_from(value: DrawnNumberRow) -> RestResult<Self> {
        Ok(Self {
            id: value.id,
            game_id: value.game_id,
            number: value.number,
            drawn_at: parse(DRAWN_NUMBER_TABLE, &value.drawn_at)?,
            is_manual: value.is_manual,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRow {
    id: Uuid,
    game_id: Uuid,
    name: String,
    phone: String,
    email: Option<String>,
    pix_key: Option<String>,
    card: Card,
    status: ParticipantStatus,
    #[serde(default)]
    is_winner: bool,
    winner_type: Option<ClaimType>,
    winner_at: Option<String>,
    created_at: String,
}

impl From<ParticipantEntity> for ParticipantRow {
    fn from(value: ParticipantEntity) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            name: value.name,
            phone: value.phone,
            email: value.email,
            pix_key: value.pix_key,
            card: value.card,
            status: value.status,
            is_winner: value.is_winner,
            winner_type: value.winner_type,
            winner_at: format_optional_time(value.winner_at),
            created_at: format_system_time(value.created_at),
        }
    }
}

impl TryFrom<ParticipantRow> for ParticipantEntity {
    type Error = RestDaoError;

    fn try_from(value: ParticipantRow) -> RestResult<Self> {
        Ok(Self {
            id: value.id,
            game_id: value.game_id,
            name: value.name,
            phone: value.phone,
            email: value.email,
            pix_key: value.pix_key,
            card: value.card,
            status: value.status,
            is_winner: value.is_winner,
            winner_type: value.winner_type,
            winner_at: parse_optional(PARTICIPANT_TABLE, value.winner_at)?,
            created_at: parse(PARTICIPANT_TABLE, &value.created_at)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimRow {
    id: Uuid,
    game_id: Uuid,
    participant_id: Uuid,
    claim_type: ClaimType,
    validated: bool,
    created_at: String,
    validated_at: Option<String>,
}

impl From<ClaimEntity> for ClaimRow {
    fn from(value: ClaimEntity) -> Self {
        Self {
            id: value.id,
            game_id: value.game_id,
            participant_id: value.participant_id,
            claim_type: value.claim_type,
            validated: value.validated,
            created_at: format_system_time(value.created_at),
            validated_at: format_optional_time(value.validated_at),
        }
    }
}

impl TryFrom<ClaimRow> for ClaimEntity {
    type Error = RestDaoError;

    fn try_from(value: ClaimRow) -> RestResult<Self> {
        Ok(Self {
            id: value.id,
            game_id: value.game_id,
            participant_id: value.participant_id,
            claim_type: value.claim_type,
            validated: value.validated,
            created_at: parse(CLAIM_TABLE, &value.created_at)?,
            validated_at: parse_optional(CLAIM_TABLE, value.validated_at)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizeRow {
    id: Uuid,
    #[serde(rename = "type")]
    prize_type: ClaimType,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    value: Option<f64>,
    image_url: Option<String>,
    created_at: String,
}

impl From<PrizeEntity> for PrizeRow {
    fn from(value: PrizeEntity) -> Self {
        Self {
            id: value.id,
            prize_type: value.prize_type,
            title: value.title,
            description: Some(value.description),
            value: Some(value.value),
            image_url: value.image_url,
            created_at: format_system_time(value.created_at),
        }
    }
}

impl TryFrom<PrizeRow> for PrizeEntity {
    type Error = RestDaoError;

    fn try_from(value: PrizeRow) -> RestResult<Self> {
        Ok(Self {
            id: value.id,
            prize_type: value.prize_type,
            title: value.title,
            description: value.description.unwrap_or_default(),
            value: value.value.unwrap_or_default(),
            image_url: value.image_url,
            created_at: parse(PRIZE_TABLE, &value.created_at)?,
        })
    }
}

fn parse(table: &'static str, value: &str) -> RestResult<SystemTime> {
    parse_timestamp(value).ok_or_else(|| RestDaoError::InvalidTimestamp {
        table,
        value: value.to_owned(),
    })
}

fn parse_optional(table: &'static str, value: Option<String>) -> RestResult<Option<SystemTime>> {
    value.map(|raw| parse(table, &raw)).transpose()
}
