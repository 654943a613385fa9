//! Read-only projections served to the mobile client under `/api/android`.

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{ClaimType, DrawnNumberEntity, GameEntity},
    dto::{format_optional_time, format_system_time},
    state::draw::TOTAL_NUMBERS,
};

/// Drawn number as seen by the mobile client.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicDrawnNumber {
    pub number: u8,
    pub drawn_at: String,
}

impl From<&DrawnNumberEntity> for PublicDrawnNumber {
    fn from(record: &DrawnNumberEntity) -> Self {
        Self {
            number: record.number,
            drawn_at: format_system_time(record.drawn_at),
        }
    }
}

/// Newest-first projection of a game's draw records.
fn newest_first(drawn: &[DrawnNumberEntity]) -> Vec<PublicDrawnNumber> {
    drawn.iter().rev().map(PublicDrawnNumber::from).collect()
}

/// Game configuration pushed to the mobile client.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicGame {
    pub id: Uuid,
    pub name: String,
    pub status: String,
    pub prize_line: f64,
    pub prize_column: f64,
    pub prize_full: f64,
    pub prize_image_url: Option<String>,
    pub youtube_live_url: Option<String>,
    pub last_number: Option<u8>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    /// Newest first.
    pub drawn_numbers: Vec<PublicDrawnNumber>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_drawn: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_numbers: Option<usize>,
}

impl PublicGame {
    /// Listing item.
    pub fn summary(game: &GameEntity, drawn: &[DrawnNumberEntity]) -> Self {
        Self {
            id: game.id,
            name: game.name.clone(),
            status: game.status.as_str().to_string(),
            prize_line: game.settings.prize_line,
            prize_column: game.settings.prize_column,
            prize_full: game.settings.prize_full,
            prize_image_url: game.settings.prize_image_url.clone(),
            youtube_live_url: game.settings.youtube_live_url.clone(),
            last_number: game.settings.last_number,
            created_at: format_system_time(game.created_at),
            started_at: format_optional_time(game.started_at),
            finished_at: format_optional_time(game.finished_at),
            drawn_numbers: newest_first(drawn),
            total_drawn: None,
            remaining_numbers: None,
        }
    }

    /// Detail view with draw totals.
    pub fn detail(game: &GameEntity, drawn: &[DrawnNumberEntity]) -> Self {
        Self {
            total_drawn: Some(drawn.len()),
            remaining_numbers: Some(TOTAL_NUMBERS.saturating_sub(drawn.len())),
            ..Self::summary(game, drawn)
        }
    }
}

/// `{ success, games }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicGameList {
    pub success: bool,
    pub games: Vec<PublicGame>,
}

/// `{ success, game }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicGameEnvelope {
    pub success: bool,
    pub game: PublicGame,
}

/// Identity header shared by the history and prize responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicGameRef {
    pub id: Uuid,
    pub name: String,
    pub status: String,
}

impl From<&GameEntity> for PublicGameRef {
    fn from(game: &GameEntity) -> Self {
        Self {
            id: game.id,
            name: game.name.clone(),
            status: game.status.as_str().to_string(),
        }
    }
}

/// Draw history of one game.
#[derive(Debug, Serialize, ToSchema)]
pub struct DrawHistory {
    /// Newest first.
    pub numbers: Vec<PublicDrawnNumber>,
    pub total_drawn: usize,
    pub remaining_numbers: usize,
    pub last_number: Option<u8>,
    pub last_drawn_at: Option<String>,
}

impl DrawHistory {
    /// Build the history from draw records in draw order.
    pub fn new(drawn: &[DrawnNumberEntity]) -> Self {
        let last = drawn.last();
        Self {
            numbers: newest_first(drawn),
            total_drawn: drawn.len(),
            remaining_numbers: TOTAL_NUMBERS.saturating_sub(drawn.len()),
            last_number: last.map(|record| record.number),
            last_drawn_at: last.map(|record| format_system_time(record.drawn_at)),
        }
    }
}

/// `{ success, game, history }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DrawHistoryResponse {
    pub success: bool,
    pub game: PublicGameRef,
    pub history: DrawHistory,
}

/// A prize tier as presented to players.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicPrize {
    pub name: String,
    pub description: String,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub kind: ClaimType,
}

/// Main and secondary prizes of a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct PrizeTable {
    pub main_prize: PublicPrize,
    pub secondary_prizes: Vec<PublicPrize>,
}

impl From<&GameEntity> for PrizeTable {
    fn from(game: &GameEntity) -> Self {
        let settings = &game.settings;
        Self {
            main_prize: PublicPrize {
                name: "Prêmio Principal".into(),
                description: "Cartela completa".into(),
                value: settings.prize_full,
                image_url: settings.prize_image_url.clone(),
                kind: ClaimType::FullCard,
            },
            secondary_prizes: vec![
                PublicPrize {
                    name: "Primeira Linha".into(),
                    description: "Primeira linha completa".into(),
                    value: settings.prize_line,
                    image_url: None,
                    kind: ClaimType::Line,
                },
                PublicPrize {
                    name: "Primeira Coluna".into(),
                    description: "Primeira coluna completa".into(),
                    value: settings.prize_column,
                    image_url: None,
                    kind: ClaimType::Column,
                },
            ],
        }
    }
}

/// `{ success, game, prizes }`.
#[derive(Debug, Serialize, ToSchema)]
pub struct PrizesResponse {
    pub success: bool,
    pub game: PublicGameRef,
    pub prizes: PrizeTable,
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::dao::models::{GameSettings, GameStatus};

    fn game() -> GameEntity {
        let now = SystemTime::now();
        GameEntity {
            id: Uuid::new_v4(),
            name: "Sábado".into(),
            status: GameStatus::Active,
            started_at: Some(now),
            finished_at: None,
            created_at: now,
            updated_at: now,
            settings: GameSettings {
                description: None,
                prize_line: 50.0,
                prize_column: 100.0,
                prize_full: 500.0,
                prize_image_url: Some("https://cdn.example/prize.png".into()),
                youtube_live_url: None,
                last_number: Some(9),
            },
        }
    }

    fn drawn(game_id: Uuid, numbers: &[u8]) -> Vec<DrawnNumberEntity> {
        let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        numbers
            .iter()
            .enumerate()
            .map(|(index, &number)| DrawnNumberEntity {
                id: Uuid::new_v4(),
                game_id,
                number,
                drawn_at: base + Duration::from_secs(index as u64),
                is_manual: false,
            })
            .collect()
    }

    #[test]
    fn history_lists_newest_first_with_totals() {
        let game = game();
        let history = DrawHistory::new(&drawn(game.id, &[4, 17, 9]));
        let numbers: Vec<u8> = history.numbers.iter().map(|n| n.number).collect();
        assert_eq!(numbers, vec![9, 17, 4]);
        assert_eq!(history.total_drawn, 3);
        assert_eq!(history.remaining_numbers, 72);
        assert_eq!(history.last_number, Some(9));
        assert_eq!(history.last_drawn_at.as_deref(), Some("2023-11-14T22:13:22Z"));

        let empty = DrawHistory::new(&[]);
        assert_eq!(empty.last_number, None);
        assert_eq!(empty.remaining_numbers, 75);
    }

    #[test]
    fn prize_table_puts_the_full_card_first() {
        let body = serde_json::to_value(PrizeTable::from(&game())).unwrap();
        assert_eq!(body["main_prize"]["type"], "full-card");
        assert_eq!(body["main_prize"]["value"], 500.0);
        assert_eq!(body["main_prize"]["image_url"], "https://cdn.example/prize.png");
        assert_eq!(body["secondary_prizes"][0]["type"], "line");
        assert_eq!(body["secondary_prizes"][1]["type"], "column");
    }

    #[test]
    fn detail_adds_totals_to_the_summary() {
        let game = game();
        let records = drawn(game.id, &[1, 2]);
        let summary = serde_json::to_value(PublicGame::summary(&game, &records)).unwrap();
        assert!(summary.get("total_drawn").is_none());
        let detail = serde_json::to_value(PublicGame::detail(&game, &records)).unwrap();
        assert_eq!(detail["total_drawn"], 2);
        assert_eq!(detail["remaining_numbers"], 73);
        assert_eq!(detail["drawn_numbers"][0]["number"], 2);
    }
}
