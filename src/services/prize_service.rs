//! Prize catalog: what each tier pays out, shown next to validated claims.

use std::time::SystemTime;

use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        game_store::GameStore,
        models::{ClaimType, PrizeEntity},
    },
    dto::prize::{
        CatalogPrizeEnvelope, CatalogPrizeList, CatalogPrizeView, CreatePrizeRequest,
        UpdatePrizeRequest,
    },
    error::ServiceError,
    state::SharedState,
};

fn parse_type(raw: &str) -> Result<ClaimType, ServiceError> {
    ClaimType::parse(raw)
        .ok_or_else(|| ServiceError::InvalidInput(format!("type inválido: {raw}")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Catalog entry for a tier, oldest first when several exist.
pub(crate) async fn catalog_prize_for(
    store: &dyn GameStore,
    claim_type: ClaimType,
) -> Result<Option<PrizeEntity>, ServiceError> {
    Ok(store
        .list_prizes()
        .await?
        .into_iter()
        .find(|prize| prize.prize_type == claim_type))
}

/// Every catalog prize ordered by tier.
pub async fn list_prizes(state: &SharedState) -> Result<CatalogPrizeList, ServiceError> {
    let store = state.require_game_store().await?;
    let prizes = store.list_prizes().await?;
    Ok(CatalogPrizeList {
        prizes: prizes.iter().map(CatalogPrizeView::from).collect(),
    })
}

/// Add a prize to the catalog.
pub async fn create_prize(
    state: &SharedState,
    request: CreatePrizeRequest,
) -> Result<CatalogPrizeEnvelope, ServiceError> {
    let (Some(raw_type), Some(title)) = (request.prize_type.as_deref(), request.title.as_deref())
    else {
        return Err(ServiceError::InvalidInput("Type and title are required".into()));
    };
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    let prize_type = parse_type(raw_type)?;

    let prize = PrizeEntity {
        id: Uuid::new_v4(),
        prize_type,
        title: title.trim().to_string(),
        description: request.description.unwrap_or_default(),
        value: request.value.unwrap_or_default(),
        image_url: non_blank(request.image_url),
        created_at: SystemTime::now(),
    };
    let store = state.require_game_store().await?;
    store.save_prize(prize.clone()).await?;
    info!(prize_id = %prize.id, prize_type = prize_type.as_str(), "catalog prize created");

    Ok(CatalogPrizeEnvelope {
        prize: CatalogPrizeView::from(&prize),
    })
}

/// Patch a catalog prize. Omitted fields are kept.
pub async fn update_prize(
    state: &SharedState,
    request: UpdatePrizeRequest,
) -> Result<CatalogPrizeEnvelope, ServiceError> {
    let Some(prize_id) = request.id else {
        return Err(ServiceError::InvalidInput("Prize ID is required".into()));
    };
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;
    let prize_type = request.prize_type.as_deref().map(parse_type).transpose()?;

    let store = state.require_game_store().await?;
    let mut prize = store
        .find_prize(prize_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Prêmio não encontrado".into()))?;

    if let Some(prize_type) = prize_type {
        prize.prize_type = prize_type;
    }
    if let Some(title) = request.title {
        prize.title = title.trim().to_string();
    }
    if let Some(description) = request.description {
        prize.description = description;
    }
    if let Some(value) = request.value {
        prize.value = value;
    }
    if let Some(url) = request.image_url {
        prize.image_url = non_blank(Some(url));
    }
    store.save_prize(prize.clone()).await?;
    info!(%prize_id, "catalog prize updated");

    Ok(CatalogPrizeEnvelope {
        prize: CatalogPrizeView::from(&prize),
    })
}
