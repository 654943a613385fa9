use std::{collections::HashMap, time::SystemTime};

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{ClaimFilter, ClaimType, ParticipantEntity, ParticipantStatus},
    dto::participant::{
        CreateParticipantRequest, ParticipantEnvelope, ParticipantListResponse, ParticipantQuery,
        ParticipantView,
    },
    error::ServiceError,
    services::game_service::load_game,
    state::{SharedState, card::generate_card},
};

fn matches_search(participant: &ParticipantEntity, needle: &str) -> bool {
    [
        Some(participant.name.as_str()),
        Some(participant.phone.as_str()),
        participant.email.as_deref(),
        participant.pix_key.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Participants, newest first, enriched with the tiers they were awarded.
pub async fn list_participants(
    state: &SharedState,
    query: ParticipantQuery,
) -> Result<ParticipantListResponse, ServiceError> {
    let store = state.require_game_store().await?;
    let mut participants = store.list_participants(query.game_id).await?;

    if let Some(needle) = query
        .search
        .map(|search| search.trim().to_lowercase())
        .filter(|search| !search.is_empty())
    {
        participants.retain(|participant| matches_search(participant, &needle));
    }

    let validated = store
        .list_claims(ClaimFilter {
            game_id: query.game_id,
            only_validated: true,
            ..Default::default()
        })
        .await?;
    let mut awards: HashMap<Uuid, Vec<ClaimType>> = HashMap::new();
    for claim in validated {
        awards
            .entry(claim.participant_id)
            .or_default()
            .push(claim.claim_type);
    }

    let participants = participants
        .iter()
        .map(|participant| {
            let awarded = awards.get(&participant.id).map(Vec::as_slice).unwrap_or(&[]);
            ParticipantView::from(participant).with_awards(awarded)
        })
        .collect();

    Ok(ParticipantListResponse { participants })
}

/// Register a participant for an existing game and deal them a fresh card.
pub async fn create_participant(
    state: &SharedState,
    request: CreateParticipantRequest,
) -> Result<ParticipantEnvelope, ServiceError> {
    let required = |value: Option<String>| {
        value
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    };
    let (Some(name), Some(phone), Some(pix_key)) = (
        required(request.name.clone()),
        required(request.phone.clone()),
        required(request.pix_key.clone()),
    ) else {
        return Err(ServiceError::InvalidInput(
            "Name, phone, and pix_key are required".into(),
        ));
    };
    let Some(game_id) = request.game_id else {
        return Err(ServiceError::InvalidInput("game_id é obrigatório".into()));
    };
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    let store = state.require_game_store().await?;
    load_game(store.as_ref(), game_id).await?;

    let participant = ParticipantEntity {
        id: Uuid::new_v4(),
        game_id,
        name,
        phone,
        email: required(request.email),
        pix_key: Some(pix_key),
        card: generate_card(),
        status: ParticipantStatus::Waiting,
        is_winner: false,
        winner_type: None,
        winner_at: None,
        created_at: SystemTime::now(),
    };
    store.save_participant(participant.clone()).await?;
    info!(participant_id = %participant.id, %game_id, "participant registered");

    Ok(ParticipantEnvelope {
        participant: ParticipantView::from(&participant),
    })
}

/// Single participant by id.
pub async fn get_participant(
    state: &SharedState,
    participant_id: Uuid,
) -> Result<ParticipantEnvelope, ServiceError> {
    let store = state.require_game_store().await?;
    let participant = store
        .find_participant_by_id(participant_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Participante não encontrado".into()))?;
    Ok(ParticipantEnvelope {
        participant: ParticipantView::from(&participant),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::game_store::memory::InMemoryGameStore,
        dto::game::CreateGameRequest,
        services::game_service,
        state::{AppState, card::CARD_SIZE},
    };

    fn request(game_id: Uuid, name: &str) -> CreateParticipantRequest {
        CreateParticipantRequest {
            game_id: Some(game_id),
            name: Some(name.into()),
            phone: Some("11999990000".into()),
            pix_key: Some(format!("{}@pix", name.to_lowercase())),
            email: None,
        }
    }

    #[tokio::test]
    async fn registration_requires_contact_fields_and_a_game() {
        let state =
            AppState::with_store(AppConfig::default(), Arc::new(InMemoryGameStore::new())).await;

        let err = create_participant(&state, CreateParticipantRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(message) if message.contains("pix_key")));

        let err = create_participant(&state, request(Uuid::new_v4(), "Ana"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let state =
            AppState::with_store(AppConfig::default(), Arc::new(InMemoryGameStore::new())).await;
        let game_id = game_service::create_game(&state, CreateGameRequest::default())
            .await
            .unwrap()
            .game
            .id;

        let created = create_participant(&state, request(game_id, "Ana")).await.unwrap();
        assert_eq!(created.participant.card.len(), CARD_SIZE);
        create_participant(&state, request(game_id, "Bruno")).await.unwrap();

        let found = list_participants(
            &state,
            ParticipantQuery {
                game_id: Some(game_id),
                search: Some("ANA".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(found.participants.len(), 1);
        assert_eq!(found.participants[0].name, "Ana");
        assert_eq!(found.participants[0].has_line, Some(false));

        let fetched = get_participant(&state, created.participant.id).await.unwrap();
        assert_eq!(fetched.participant.id, created.participant.id);
    }
}
