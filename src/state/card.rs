//! Bingo card generation and win detection.
//!
//! A card is a 5x5 grid where column `c` holds five distinct values from
//! `15 * c + 1 ..= 15 * c + 15`, and the center cell is the free marker [`FREE_CELL`].

use std::collections::HashSet;

use rand::{Rng, rng, seq::SliceRandom};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dao::models::ClaimType;

/// Width and height of a card.
pub const CARD_SIZE: usize = 5;
/// Amount of values available to each column.
pub const COLUMN_SPAN: u8 = 15;
/// Sentinel stored in the center cell, always considered marked.
pub const FREE_CELL: u8 = 0;
const CENTER: usize = CARD_SIZE / 2;

/// Immutable 5x5 card stored row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Card([[u8; CARD_SIZE]; CARD_SIZE]);

/// Reasons a grid is not a valid card.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    #[error("card must have {CARD_SIZE} rows of {CARD_SIZE} cells")]
    Shape,
    #[error("cell ({row}, {col}) value {value} is outside its column range")]
    OutOfRange { row: usize, col: usize, value: u8 },
    #[error("column {col} repeats value {value}")]
    Duplicate { col: usize, value: u8 },
    #[error("center cell must be the free marker")]
    Center,
}

/// Inclusive value range of a column.
pub fn column_range(col: usize) -> std::ops::RangeInclusive<u8> {
    let start = col as u8 * COLUMN_SPAN + 1;
    start..=start + COLUMN_SPAN - 1
}

impl Card {
    /// Validate a row-major grid and wrap it.
    pub fn from_rows(rows: [[u8; CARD_SIZE]; CARD_SIZE]) -> Result<Self, CardError> {
        if rows[CENTER][CENTER] != FREE_CELL {
            return Err(CardError::Center);
        }
        for col in 0..CARD_SIZE {
            let range = column_range(col);
            let mut seen = HashSet::with_capacity(CARD_SIZE);
            for (row, cells) in rows.iter().enumerate() {
                let value = cells[col];
                if row == CENTER && col == CENTER {
                    continue;
                }
                if !range.contains(&value) {
                    return Err(CardError::OutOfRange { row, col, value });
                }
                if !seen.insert(value) {
                    return Err(CardError::Duplicate { col, value });
                }
            }
        }
        Ok(Self(rows))
    }

    /// Row-major cells.
    pub fn rows(&self) -> &[[u8; CARD_SIZE]; CARD_SIZE] {
        &self.0
    }

    /// Values of a single column, top to bottom.
    pub fn column(&self, col: usize) -> [u8; CARD_SIZE] {
        std::array::from_fn(|row| self.0[row][col])
    }

    /// All numbered cells, excluding the free center.
    pub fn numbers(&self) -> impl Iterator<Item = u8> + '_ {
        self.0
            .iter()
            .flatten()
            .copied()
            .filter(|value| *value != FREE_CELL)
    }
}

impl TryFrom<Vec<Vec<u8>>> for Card {
    type Error = CardError;

    fn try_from(value: Vec<Vec<u8>>) -> Result<Self, Self::Error> {
        if value.len() != CARD_SIZE || value.iter().any(|row| row.len() != CARD_SIZE) {
            return Err(CardError::Shape);
        }
        let rows = std::array::from_fn(|row| std::array::from_fn(|col| value[row][col]));
        Card::from_rows(rows)
    }
}

impl From<Card> for Vec<Vec<u8>> {
    fn from(card: Card) -> Self {
        card.0.iter().map(|row| row.to_vec()).collect()
    }
}

/// Generate a card from the thread-local entropy source.
pub fn generate_card() -> Card {
    generate_card_with(&mut rng())
}

/// Generate a card from an explicit source, so tests can seed it.
pub fn generate_card_with<R: Rng + ?Sized>(rng: &mut R) -> Card {
    let mut rows = [[FREE_CELL; CARD_SIZE]; CARD_SIZE];
    for col in 0..CARD_SIZE {
        let mut pool: Vec<u8> = column_range(col).collect();
        let (picked, _) = pool.partial_shuffle(rng, CARD_SIZE);
        for (row, value) in picked.iter().enumerate() {
            rows[row][col] = *value;
        }
    }
    rows[CENTER][CENTER] = FREE_CELL;
    Card(rows)
}

/// Patterns completed by a card against a set of drawn numbers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BingoResult {
    /// Some row is fully marked.
    pub has_line: bool,
    /// Some column is fully marked.
    pub has_column: bool,
    /// Every cell is marked.
    pub has_full_card: bool,
}

impl BingoResult {
    /// Whether the pattern required by `claim_type` is complete.
    pub fn satisfies(&self, claim_type: ClaimType) -> bool {
        match claim_type {
            ClaimType::Line => self.has_line,
            ClaimType::Column => self.has_column,
            ClaimType::FullCard => self.has_full_card,
        }
    }
}

/// Check which patterns `card` completes. The free center is always marked.
pub fn check_bingo<I>(card: &Card, drawn: I) -> BingoResult
where
    I: IntoIterator<Item = u8>,
{
    let mut marked: HashSet<u8> = drawn.into_iter().collect();
    marked.insert(FREE_CELL);
    let is_marked = |value: &u8| marked.contains(value);

    let has_line = card.rows().iter().any(|row| row.iter().all(is_marked));
    let has_column = (0..CARD_SIZE).any(|col| card.column(col).iter().all(is_marked));
    let has_full_card = card.rows().iter().flatten().all(is_marked);

    BingoResult {
        has_line,
        has_column,
        has_full_card,
    }
}
