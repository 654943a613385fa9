use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{MongoDaoError, MongoResult};
use crate::{
    dao::models::{
        ClaimEntity, ClaimType, DrawnNumberEntity, GameEntity, GameSettings, GameStatus,
        ParticipantEntity, ParticipantStatus, PrizeEntity,
    },
    state::card::Card,
};

pub const GAME_COLLECTION: &str = "games";
pub const DRAWN_NUMBER_COLLECTION: &str = "drawn_numbers";
pub const PARTICIPANT_COLLECTION: &str = "participants";
pub const CLAIM_COLLECTION: &str = "bingo_claims";
pub const PRIZE_COLLECTION: &str = "prizes";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    status: GameStatus,
    started_at: Option<DateTime>,
    finished_at: Option<DateTime>,
    created_at: DateTime,
    updated_at: DateTime,
    settings: GameSettings,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name,
            status: value.status,
            started_at: value.started_at.map(DateTime::from_system_time),
            finished_at: value.finished_at.map(DateTime::from_system_time),
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
            settings: value.settings,
        }
    }
}

impl TryFrom<MongoGameDocument> for GameEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoGameDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(GAME_COLLECTION, &value.id)?,
            name: value.name,
            status: value.status,
            started_at: value.started_at.map(DateTime::to_system_time),
            finished_at: value.finished_at.map(DateTime::to_system_time),
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
            settings: value.settings,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDrawnNumberDocument {
    #[serde(rename = "_id")]
    id: String,
    game_id: String,
    number: i32,
    drawn_at: DateTime,
    is_manual: bool,
}

impl From<DrawnNumberEntity> for MongoDrawnNumberDocument {
    fn from(value: DrawnNumberEntity) -> Self {
        Self {
            id: value.id.to_string(),
            game_id: value.game_id.to_string(),
            number: i32::from(value.number),
            drawn_at: DateTime::from_system_time(value.drawn_at),
            is_manual: value.is_manual,
        }
    }
}

impl TryFrom<MongoDrawnNumberDocument> for DrawnNumberEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoDrawnNumberDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(DRAWN_NUMBER_COLLECTION, &value.id)?,
            game_id: parse_id(DRAWN_NUMBER_COLLECTION, &value.game_id)?,
            // The collection only ever receives values in 1..=75.
            number: u8::try_from(value.number).unwrap_or_default(),
            drawn_at: value.drawn_at.to_system_time(),
            is_manual: value.is_manual,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoParticipantDocument {
    #[serde(rename = "_id")]
    id: String,
    game_id: String,
    name: String,
    phone: String,
    email: Option<String>,
    pix_key: Option<String>,
    card: Card,
    status: ParticipantStatus,
    #[serde(default)]
    is_winner: bool,
    winner_type: Option<ClaimType>,
    winner_at: Option<DateTime>,
    created_at: DateTime,
}

impl From<ParticipantEntity> for MongoParticipantDocument {
    fn from(value: ParticipantEntity) -> Self {
        Self {
            id: value.id.to_string(),
            game_id: value.game_id.to_string(),
            name: value.name,
            phone: value.phone,
            email: value.email,
            pix_key: value.pix_key,
            card: value.card,
            status: value.status,
            is_winner: value.is_winner,
            winner_type: value.winner_type,
            winner_at: value.winner_at.map(DateTime::from_system_time),
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoParticipantDocument> for ParticipantEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoParticipantDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(PARTICIPANT_COLLECTION, &value.id)?,
            game_id: parse_id(PARTICIPANT_COLLECTION, &value.game_id)?,
            name: value.name,
            phone: value.phone,
            email: value.email,
            pix_key: value.pix_key,
            card: value.card,
            status: value.status,
            is_winner: value.is_winner,
            winner_type: value.winner_type,
            winner_at: value.winner_at.map(DateTime::to_system_time),
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoClaimDocument {
    #[serde(rename = "_id")]
    id: String,
    game_id: String,
    participant_id: String,
    claim_type: ClaimType,
    validated: bool,
    created_at: DateTime,
    validated_at: Option<DateTime>,
}

impl From<ClaimEntity> for MongoClaimDocument {
    fn from(value: ClaimEntity) -> Self {
        Self {
            id: value.id.to_string(),
            game_id: value.game_id.to_string(),
            participant_id: value.participant_id.to_string(),
            claim_type: value.claim_type,
            validated: value.validated,
            created_at: DateTime::from_system_time(value.created_at),
            validated_at: value.validated_at.map(DateTime::from_system_time),
        }
    }
}

impl TryFrom<MongoClaimDocument> for ClaimEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoClaimDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(CLAIM_COLLECTION, &value.id)?,
            game_id: parse_id(CLAIM_COLLECTION, &value.game_id)?,
            participant_id: parse_id(CLAIM_COLLECTION, &value.participant_id)?,
            claim_type: value.claim_type,
            validated: value.validated,
            created_at: value.created_at.to_system_time(),
            validated_at: value.validated_at.map(DateTime::to_system_time),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPrizeDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "type")]
    prize_type: ClaimType,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    value: f64,
    image_url: Option<String>,
    created_at: DateTime,
}

impl From<PrizeEntity> for MongoPrizeDocument {
    fn from(value: PrizeEntity) -> Self {
        Self {
            id: value.id.to_string(),
            prize_type: value.prize_type,
            title: value.title,
            description: value.description,
            value: value.value,
            image_url: value.image_url,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoPrizeDocument> for PrizeEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoPrizeDocument) -> MongoResult<Self> {
        Ok(Self {
            id: parse_id(PRIZE_COLLECTION, &value.id)?,
            prize_type: value.prize_type,
            title: value.title,
            description: value.description,
            value: value.value,
            image_url: value.image_url,
            created_at: value.created_at.to_system_time(),
        })
    }
}

fn parse_id(collection: &'static str, value: &str) -> MongoResult<Uuid> {
    Uuid::parse_str(value).map_err(|source| MongoDaoError::InvalidIdentifier {
        collection,
        value: value.to_owned(),
        source,
    })
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::state::card::generate_card;

    #[test]
    fn participant_document_keeps_the_card_and_millisecond_times() {
        let created_at = SystemTime::UNIX_EPOCH + Duration::from_millis(1_700_000_000_123);
        let participant = ParticipantEntity {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            name: "Bia".into(),
            phone: "11988887777".into(),
            email: None,
            pix_key: None,
            card: generate_card(),
            status: ParticipantStatus::Waiting,
            is_winner: false,
            winner_type: None,
            winner_at: None,
            created_at,
        };

        let document = MongoParticipantDocument::from(participant.clone());
        assert_eq!(document.id, participant.id.to_string());

        let back = ParticipantEntity::try_from(document).unwrap();
        assert_eq!(back, participant);
    }

    #[test]
    fn malformed_identifiers_are_reported() {
        let document = MongoClaimDocument {
            id: "not-a-uuid".into(),
            game_id: Uuid::new_v4().to_string(),
            participant_id: Uuid::new_v4().to_string(),
            claim_type: ClaimType::Line,
            validated: false,
            created_at: DateTime::now(),
            validated_at: None,
        };
        let err = ClaimEntity::try_from(document).unwrap_err();
        assert!(matches!(
            err,
            MongoDaoError::InvalidIdentifier { collection: CLAIM_COLLECTION, .. }
        ));
    }
}
