//! Claim validation and the admin claim feed.
//!
//! Awarding a tier is a check-then-insert decision serialized per `(game_id, claim_type)`
//! through [`GameLocks::lock_claim`](crate::state::locks::GameLocks::lock_claim); the store
//! rejects a second validated claim for the same pair as a last resort.

use std::time::SystemTime;

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        game_store::GameStore,
        models::{ClaimEntity, ClaimFilter, ClaimType},
    },
    dto::{
        claim::{
            ApproveClaimRequest, ClaimEnvelope, ClaimFeedItem, ClaimListResponse, ClaimQuery,
            ClaimView, CreateClaimRequest, PrizeView, ValidateBingoRequest,
            ValidateBingoResponse,
        },
        parse_timestamp,
    },
    error::ServiceError,
    services::{prize_service, sse_events},
    state::{SharedState, card::check_bingo, draw::DrawnSet},
};

const FEED_LIMIT: usize = 50;
const INVALID_CLAIM: &str = "Invalid bingo claim";

fn already_claimed(claim_type: ClaimType) -> ServiceError {
    let tier = claim_type.as_str();
    ServiceError::InvalidState(format!("{tier} bingo has already been claimed"))
}

/// Check a participant's card against the game's drawn numbers and award the tier to the
/// first valid claim.
pub async fn validate_claim(
    state: &SharedState,
    game_id: Uuid,
    request: ValidateBingoRequest,
) -> Result<ValidateBingoResponse, ServiceError> {
    let (Some(participant_id), Some(raw_type)) = (request.participant_id, request.claim_type)
    else {
        return Err(ServiceError::InvalidInput(
            "Participant ID and claim type are required".into(),
        ));
    };
    let claim_type = ClaimType::parse(&raw_type)
        .ok_or_else(|| ServiceError::InvalidInput(INVALID_CLAIM.into()))?;

    let store = state.require_game_store().await?;
    let game = store
        .find_game(game_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Game not found".into()))?;
    let participant = store
        .find_participant(game_id, participant_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Participant not found".into()))?;

    let drawn = DrawnSet::from_records(&store.list_drawn_numbers(game_id).await?);
    let result = check_bingo(&participant.card, drawn.iter());
    if !result.satisfies(claim_type) {
        return Err(ServiceError::InvalidInput(INVALID_CLAIM.into()));
    }

    let _guard = state.locks().lock_claim(game_id, claim_type).await;
    if store.find_validated_claim(game_id, claim_type).await?.is_some() {
        return Err(already_claimed(claim_type));
    }

    let now = SystemTime::now();
    let claim = ClaimEntity {
        id: Uuid::new_v4(),
        game_id,
        participant_id,
        claim_type,
        validated: true,
        created_at: now,
        validated_at: Some(now),
    };
    store.insert_claim(claim.clone()).await.map_err(|err| {
        if err.is_conflict() {
            already_claimed(claim_type)
        } else {
            ServiceError::from(err)
        }
    })?;

    record_win(state, store.as_ref(), participant_id, claim_type, now).await;

    let prize = game.settings.prize_for(claim_type);
    let catalog = match prize_service::catalog_prize_for(store.as_ref(), claim_type).await {
        Ok(catalog) => catalog,
        Err(err) => {
            warn!(%game_id, error = %err, "failed to load catalog prize");
            None
        }
    };
    sse_events::broadcast_claim_validated(state, &claim, &participant.name, prize);
    info!(
        %game_id,
        %participant_id,
        claim_type = claim_type.as_str(),
        "bingo claim validated"
    );

    Ok(ValidateBingoResponse {
        bingo_claim: ClaimView::from(&claim),
        prize: PrizeView {
            kind: claim_type,
            value: prize,
            name: catalog
                .as_ref()
                .map_or_else(|| claim_type.label().to_string(), |entry| entry.title.clone()),
            image_url: catalog.and_then(|entry| entry.image_url),
        },
        winner: participant.name,
        claim_type,
    })
}

/// Mark the participant as winner. The award already stands when this fails.
///
/// The participant is re-read under its own lock so that awards of different tiers landing
/// at once keep the most recent win.
async fn record_win(
    state: &SharedState,
    store: &dyn GameStore,
    participant_id: Uuid,
    claim_type: ClaimType,
    at: SystemTime,
) {
    let _guard = state.locks().lock_participant(participant_id).await;
    let mut participant = match store.find_participant_by_id(participant_id).await {
        Ok(Some(participant)) => participant,
        Ok(None) => {
            warn!(%participant_id, "winning participant disappeared before the win was recorded");
            return;
        }
        Err(err) => {
            warn!(%participant_id, error = %err, "failed to reload participant");
            return;
        }
    };
    participant.is_winner = true;
    if participant.winner_at.is_none_or(|previous| previous <= at) {
        participant.winner_type = Some(claim_type);
        participant.winner_at = Some(at);
    }
    if let Err(err) = store.save_participant(participant).await {
        warn!(%participant_id, error = %err, "failed to record participant win");
    }
}

/// Latest claims of a game, newest first, with participant names.
pub async fn list_claims(
    state: &SharedState,
    query: ClaimQuery,
) -> Result<ClaimListResponse, ServiceError> {
    let Some(game_id) = query.game_id else {
        return Err(ServiceError::InvalidInput("game_id é obrigatório".into()));
    };
    let since = match query.since.as_deref() {
        Some(raw) => Some(
            parse_timestamp(raw)
                .ok_or_else(|| ServiceError::InvalidInput(format!("since inválido: {raw}")))?,
        ),
        None => None,
    };

    let store = state.require_game_store().await?;
    let claims = store
        .list_claims(ClaimFilter {
            game_id: Some(game_id),
            since,
            only_validated: query.only_validated.unwrap_or(false),
            limit: Some(FEED_LIMIT),
        })
        .await?;

    let mut items = Vec::with_capacity(claims.len());
    for claim in &claims {
        let name = match store.find_participant_by_id(claim.participant_id).await {
            Ok(participant) => participant.map(|participant| participant.name),
            Err(err) => {
                warn!(claim_id = %claim.id, error = %err, "failed to resolve participant name");
                None
            }
        };
        items.push(ClaimFeedItem::new(claim, name));
    }

    Ok(ClaimListResponse { claims: items })
}

/// Record an unvalidated claim on behalf of a participant.
pub async fn create_claim(
    state: &SharedState,
    request: CreateClaimRequest,
) -> Result<ClaimEnvelope, ServiceError> {
    let (Some(game_id), Some(participant_id), Some(raw_type)) =
        (request.game_id, request.participant_id, request.claim_type)
    else {
        return Err(ServiceError::InvalidInput(
            "game_id, participant_id e claim_type são obrigatórios".into(),
        ));
    };
    let claim_type = ClaimType::parse(&raw_type).ok_or_else(|| {
        ServiceError::InvalidInput(format!("claim_type inválido: {raw_type}"))
    })?;

    let store = state.require_game_store().await?;
    store
        .find_participant(game_id, participant_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Participante não encontrado".into()))?;

    let claim = ClaimEntity {
        id: Uuid::new_v4(),
        game_id,
        participant_id,
        claim_type,
        validated: false,
        created_at: SystemTime::now(),
        validated_at: None,
    };
    store.insert_claim(claim.clone()).await?;
    info!(claim_id = %claim.id, %game_id, claim_type = claim_type.as_str(), "claim recorded");

    Ok(ClaimEnvelope {
        claim: ClaimView::from(&claim),
    })
}

/// Operator override: validate a pending claim without checking the card. A tier that was
/// already awarded stays with its first winner.
pub async fn approve_claim(
    state: &SharedState,
    request: ApproveClaimRequest,
) -> Result<ClaimEnvelope, ServiceError> {
    let Some(claim_id) = request.id else {
        return Err(ServiceError::InvalidInput("id é obrigatório".into()));
    };

    let store = state.require_game_store().await?;
    let mut claim = store
        .find_claim(claim_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Claim não encontrado".into()))?;
    if claim.validated {
        return Ok(ClaimEnvelope {
            claim: ClaimView::from(&claim),
        });
    }

    let _guard = state.locks().lock_claim(claim.game_id, claim.claim_type).await;
    if store
        .find_validated_claim(claim.game_id, claim.claim_type)
        .await?
        .is_some()
    {
        return Err(already_claimed(claim.claim_type));
    }

    let now = SystemTime::now();
    claim.validated = true;
    claim.validated_at = Some(now);
    store.save_claim(claim.clone()).await.map_err(|err| {
        if err.is_conflict() {
            already_claimed(claim.claim_type)
        } else {
            ServiceError::from(err)
        }
    })?;

    record_win(state, store.as_ref(), claim.participant_id, claim.claim_type, now).await;
    let winner = match store.find_participant_by_id(claim.participant_id).await {
        Ok(participant) => participant.map(|participant| participant.name).unwrap_or_default(),
        Err(err) => {
            warn!(claim_id = %claim.id, error = %err, "failed to load claim participant");
            String::new()
        }
    };
    let prize = match store.find_game(claim.game_id).await {
        Ok(Some(game)) => game.settings.prize_for(claim.claim_type),
        _ => 0.0,
    };
    sse_events::broadcast_claim_validated(state, &claim, &winner, prize);
    info!(%claim_id, claim_type = claim.claim_type.as_str(), "claim approved by operator");

    Ok(ClaimEnvelope {
        claim: ClaimView::from(&claim),
    })
}
