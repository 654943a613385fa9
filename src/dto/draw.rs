use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::DrawnNumberEntity,
    dto::format_system_time,
    state::draw::DrawRequest,
};

/// Persisted drawn number.
#[derive(Debug, Serialize, ToSchema)]
pub struct DrawnNumberView {
    pub id: Uuid,
    pub game_id: Uuid,
    pub number: u8,
    pub drawn_at: String,
    pub is_manual: bool,
}

impl From<&DrawnNumberEntity> for DrawnNumberView {
    fn from(record: &DrawnNumberEntity) -> Self {
        Self {
            id: record.id,
            game_id: record.game_id,
            number: record.number,
            drawn_at: format_system_time(record.drawn_at),
            is_manual: record.is_manual,
        }
    }
}

/// Body of the manual draw route.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ManualDrawRequest {
    /// Must be a JSON number in `1..=75`.
    #[serde(default)]
    #[schema(value_type = i64)]
    pub number: Value,
}

impl ManualDrawRequest {
    /// Translate the body into a draw request. Anything that is not an integral JSON number
    /// becomes `Manual(0)`, which the allocator rejects as out of range.
    pub fn to_draw_request(&self) -> DrawRequest {
        let number = self
            .number
            .as_i64()
            .or_else(|| {
                self.number
                    .as_f64()
                    .filter(|value| value.fract() == 0.0 && value.abs() <= i64::MAX as f64)
                    .map(|value| value as i64)
            })
            .unwrap_or(0);
        DrawRequest::Manual(number)
    }
}

/// Result of a committed draw.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrawResponse {
    pub number: u8,
    pub drawn_number: DrawnNumberView,
    pub total_drawn: usize,
    pub remaining: usize,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_manual: bool,
    pub message: String,
}

impl DrawResponse {
    /// Build the response for a committed record.
    pub fn new(record: &DrawnNumberEntity, total_drawn: usize, remaining: usize) -> Self {
        let message = if record.is_manual {
            format!("Número {} inserido manualmente!", record.number)
        } else {
            format!("Número {} sorteado!", record.number)
        };
        Self {
            number: record.number,
            drawn_number: DrawnNumberView::from(record),
            total_drawn,
            remaining,
            is_manual: record.is_manual,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn parse(body: Value) -> DrawRequest {
        serde_json::from_value::<ManualDrawRequest>(body)
            .unwrap()
            .to_draw_request()
    }

    #[test]
    fn manual_body_accepts_integral_numbers_only() {
        assert_eq!(parse(json!({ "number": 42 })), DrawRequest::Manual(42));
        assert_eq!(parse(json!({ "number": 7.0 })), DrawRequest::Manual(7));
        assert_eq!(parse(json!({ "number": 80 })), DrawRequest::Manual(80));
        assert_eq!(parse(json!({ "number": "42" })), DrawRequest::Manual(0));
        assert_eq!(parse(json!({ "number": 4.5 })), DrawRequest::Manual(0));
        assert_eq!(parse(json!({})), DrawRequest::Manual(0));
    }

    #[test]
    fn response_uses_camel_case_and_flags_manual_draws() {
        let record = DrawnNumberEntity {
            id: Uuid::new_v4(),
            game_id: Uuid::new_v4(),
            number: 42,
            drawn_at: std::time::SystemTime::now(),
            is_manual: true,
        };
        let body = serde_json::to_value(DrawResponse::new(&record, 3, 72)).unwrap();
        assert_eq!(body["drawnNumber"]["number"], 42);
        assert_eq!(body["totalDrawn"], 3);
        assert_eq!(body["isManual"], true);
        assert_eq!(body["message"], "Número 42 inserido manualmente!");

        let automatic = DrawnNumberEntity {
            is_manual: false,
            ..record
        };
        let body = serde_json::to_value(DrawResponse::new(&automatic, 4, 71)).unwrap();
        assert!(body.get("isManual").is_none());
        assert_eq!(body["message"], "Número 42 sorteado!");
    }
}
