use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{ClaimType, ParticipantEntity},
    dto::format_optional_time,
    dto::format_system_time,
};

/// Filters accepted by the participant listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantQuery {
    /// Restrict to one game.
    pub game_id: Option<Uuid>,
    /// Case-insensitive match over name, phone, e-mail and PIX key.
    pub search: Option<String>,
}

/// Operator-side registration of a participant.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreateParticipantRequest {
    pub game_id: Option<Uuid>,
    #[validate(length(max = 120))]
    pub name: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 140))]
    pub pix_key: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// Participant row. The `has_*` flags are present on listings only and reflect validated
/// claims.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantView {
    pub id: Uuid,
    pub game_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub pix_key: Option<String>,
    /// Five rows of five numbers, `0` marking the free centre.
    pub card: Vec<Vec<u8>>,
    pub status: String,
    pub is_winner: bool,
    pub winner_type: Option<ClaimType>,
    pub winner_at: Option<String>,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_line: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_column: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_full_card: Option<bool>,
}

impl From<&ParticipantEntity> for ParticipantView {
    fn from(participant: &ParticipantEntity) -> Self {
        Self {
            id: participant.id,
            game_id: participant.game_id,
            name: participant.name.clone(),
            phone: participant.phone.clone(),
            email: participant.email.clone(),
            pix_key: participant.pix_key.clone(),
            card: participant.card.clone().into(),
            status: participant.status.as_str().to_string(),
            is_winner: participant.is_winner,
            winner_type: participant.winner_type,
            winner_at: format_optional_time(participant.winner_at),
            created_at: format_system_time(participant.created_at),
            has_line: None,
            has_column: None,
            has_full_card: None,
        }
    }
}

impl ParticipantView {
    /// Attach the tiers this participant was awarded.
    pub fn with_awards(mut self, awarded: &[ClaimType]) -> Self {
        let has = |kind| awarded.contains(&kind);
        self.has_line = Some(has(ClaimType::Line));
        self.has_column = Some(has(ClaimType::Column));
        self.has_full_card = Some(has(ClaimType::FullCard));
        self.is_winner = self.is_winner || !awarded.is_empty();
        self
    }
}

/// `{ "participant": ... }` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantEnvelope {
    pub participant: ParticipantView,
}

/// `{ "participants": [...] }` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantListResponse {
    pub participants: Vec<ParticipantView>,
}
