//! Number allocation for a single game.
//!
//! Automatic draws use rejection sampling over [`MIN_NUMBER`]`..=`[`MAX_NUMBER`]. That only
//! stays cheap because the domain is fixed at 75 values; a larger domain needs a shuffled
//! deck instead.

use indexmap::IndexSet;
use rand::{Rng, rng};
use thiserror::Error;

use crate::dao::models::DrawnNumberEntity;

/// Smallest drawable number.
pub const MIN_NUMBER: u8 = 1;
/// Largest drawable number.
pub const MAX_NUMBER: u8 = 75;
/// Size of the draw domain.
pub const TOTAL_NUMBERS: usize = MAX_NUMBER as usize;

/// How the next number should be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawRequest {
    /// Pick uniformly among the numbers not drawn yet.
    Random,
    /// Operator-supplied value, validated against the same invariants.
    Manual(i64),
}

impl DrawRequest {
    /// Whether the value comes from the operator.
    pub fn is_manual(&self) -> bool {
        matches!(self, DrawRequest::Manual(_))
    }
}

/// Reasons a number cannot be allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocationError {
    #[error("Número inválido. Deve ser entre {MIN_NUMBER} e {MAX_NUMBER}")]
    OutOfRange(i64),
    #[error("O número {0} já foi sorteado anteriormente")]
    AlreadyDrawn(u8),
    #[error("Todos os números já foram sorteados")]
    Exhausted,
}

/// Numbers already drawn for a game, in draw order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawnSet(IndexSet<u8>);

impl DrawnSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the set from persisted records.
    pub fn from_records(records: &[DrawnNumberEntity]) -> Self {
        records.iter().map(|record| record.number).collect()
    }

    /// Whether `number` was drawn.
    pub fn contains(&self, number: u8) -> bool {
        self.0.contains(&number)
    }

    /// Amount of numbers drawn.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was drawn.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Amount of numbers still available.
    pub fn remaining(&self) -> usize {
        TOTAL_NUMBERS - self.len()
    }

    /// Whether the whole domain was drawn.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Most recently drawn number.
    pub fn last(&self) -> Option<u8> {
        self.0.last().copied()
    }

    /// Numbers in draw order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    /// Record a number, returning `false` when it was already present.
    pub fn insert(&mut self, number: u8) -> bool {
        self.0.insert(number)
    }

    /// Choose the next number without recording it.
    pub fn allocate(&self, request: DrawRequest) -> Result<u8, AllocationError> {
        self.allocate_with(request, &mut rng())
    }

    /// Same as [`DrawnSet::allocate`] with an explicit entropy source.
    ///
    /// A manual value is range-checked first, then the exhaustion and duplicate checks
    /// apply to both kinds of request.
    pub fn allocate_with<R: Rng + ?Sized>(
        &self,
        request: DrawRequest,
        rng: &mut R,
    ) -> Result<u8, AllocationError> {
        let requested = match request {
            DrawRequest::Manual(value) => Some(validate_number(value)?),
            DrawRequest::Random => None,
        };

        if self.is_exhausted() {
            return Err(AllocationError::Exhausted);
        }

        match requested {
            Some(number) if self.contains(number) => Err(AllocationError::AlreadyDrawn(number)),
            Some(number) => Ok(number),
            None => loop {
                let candidate = rng.random_range(MIN_NUMBER..=MAX_NUMBER);
                if !self.contains(candidate) {
                    break Ok(candidate);
                }
            },
        }
    }
}

impl FromIterator<u8> for DrawnSet {
    fn from_iter<T: IntoIterator<Item = u8>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Check that a raw value lies in the draw domain.
pub fn validate_number(value: i64) -> Result<u8, AllocationError> {
    if (i64::from(MIN_NUMBER)..=i64::from(MAX_NUMBER)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(AllocationError::OutOfRange(value))
    }
}
