use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::models::{ClaimType, PrizeEntity},
    dto::{
        format_system_time,
        validation::{validate_not_blank, validate_optional_url},
    },
};

/// New catalog prize. `type` and `title` are required.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct CreatePrizeRequest {
    /// `line`, `column` or `full-card`.
    #[serde(rename = "type")]
    pub prize_type: Option<String>,
    #[validate(length(max = 120), custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub value: Option<f64>,
    #[validate(custom(function = "validate_optional_url"))]
    pub image_url: Option<String>,
}

/// Partial edit of a catalog prize identified by `id`.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdatePrizeRequest {
    pub id: Option<Uuid>,
    #[serde(rename = "type")]
    pub prize_type: Option<String>,
    #[validate(length(max = 120), custom(function = "validate_not_blank"))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub value: Option<f64>,
    #[validate(custom(function = "validate_optional_url"))]
    pub image_url: Option<String>,
}

/// Catalog prize as returned by the admin API.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogPrizeView {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub prize_type: ClaimType,
    pub title: String,
    pub description: String,
    pub value: f64,
    pub image_url: Option<String>,
    pub created_at: String,
}

impl From<&PrizeEntity> for CatalogPrizeView {
    fn from(prize: &PrizeEntity) -> Self {
        Self {
            id: prize.id,
            prize_type: prize.prize_type,
            title: prize.title.clone(),
            description: prize.description.clone(),
            value: prize.value,
            image_url: prize.image_url.clone(),
            created_at: format_system_time(prize.created_at),
        }
    }
}

/// `{ "prize": ... }` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogPrizeEnvelope {
    pub prize: CatalogPrizeView,
}

/// `{ "prizes": [...] }` envelope.
#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogPrizeList {
    pub prizes: Vec<CatalogPrizeView>,
}
