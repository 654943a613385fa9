use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    dao::models::{ClaimEntity, ClaimType},
    dto::{format_optional_time, format_system_time},
};

/// Body of `POST /games/{id}/validate-bingo`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateBingoRequest {
    pub participant_id: Option<Uuid>,
    /// `line`, `column` or `full-card`.
    pub claim_type: Option<String>,
}

/// Filters accepted by the claim feed.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ClaimQuery {
    /// Required game identifier.
    pub game_id: Option<Uuid>,
    /// RFC 3339 instant; only claims created or validated since then are returned.
    pub since: Option<String>,
    /// Only validated claims.
    pub only_validated: Option<bool>,
}

/// Operator-created claim, stored unvalidated.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateClaimRequest {
    pub game_id: Option<Uuid>,
    pub participant_id: Option<Uuid>,
    pub claim_type: Option<String>,
}

/// Body of `POST /claims/validate`.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ApproveClaimRequest {
    pub id: Option<Uuid>,
}

/// Persisted claim.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimView {
    pub id: Uuid,
    pub game_id: Uuid,
    pub participant_id: Uuid,
    pub claim_type: ClaimType,
    pub validated: bool,
    pub created_at: String,
    pub validated_at: Option<String>,
}

impl From<&ClaimEntity> for ClaimView {
    fn from(claim: &ClaimEntity) -> Self {
        Self {
            id: claim.id,
            game_id: claim.game_id,
            participant_id: claim.participant_id,
            claim_type: claim.claim_type,
            validated: claim.validated,
            created_at: format_system_time(claim.created_at),
            validated_at: format_optional_time(claim.validated_at),
        }
    }
}

/// Claim enriched for the admin feed.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimFeedItem {
    #[serde(flatten)]
    pub claim: ClaimView,
    pub participant_name: Option<String>,
    pub type_label: String,
}

impl ClaimFeedItem {
    /// Enrich `claim` with the participant's name when known.
    pub fn new(claim: &ClaimEntity, participant_name: Option<String>) -> Self {
        Self {
            claim: ClaimView::from(claim),
            participant_name,
            type_label: claim.claim_type.label().to_string(),
        }
    }
}

/// `{ "claims": [...] }` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimListResponse {
    pub claims: Vec<ClaimFeedItem>,
}

/// `{ "claim": ... }` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClaimEnvelope {
    pub claim: ClaimView,
}

/// Prize tier awarded by a validated claim. `name` and `image_url` come from the prize
/// catalog when it has an entry for the tier.
#[derive(Debug, Serialize, ToSchema)]
pub struct PrizeView {
    #[serde(rename = "type")]
    pub kind: ClaimType,
    pub value: f64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Result of a successful bingo validation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateBingoResponse {
    pub bingo_claim: ClaimView,
    pub prize: PrizeView,
    /// Name of the winning participant.
    pub winner: String,
    pub claim_type: ClaimType,
}
