use serde::{Deserialize, Serialize};

use fragvault_core::{NounId, PoolError};

/// Ordered custody list of held nouns, an arena with swap-with-last
/// removal. A noun's position is its current index and is stable only
/// until some removal occurs, which is why multi-withdrawal callers must
/// name positions in strictly decreasing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VaultPositions {
    slots: Vec<NounId>,
}

impl VaultPositions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a noun and return its position.
    pub fn push(&mut self, noun: NounId) -> u64 {
        self.slots.push(noun);
        (self.slots.len() - 1) as u64
    }

    /// Remove the noun at `position` (swap-remove) and return it. Every
    /// position at or beyond the former last slot is invalidated.
    pub fn remove_at(&mut self, position: u64) -> Result<NounId, PoolError> {
        if position >= self.slots.len() as u64 {
            return Err(PoolError::InvalidPosition(position));
        }
        Ok(self.slots.swap_remove(position as usize))
    }

    pub fn noun_at(&self, position: u64) -> Result<NounId, PoolError> {
        self.slots
            .get(position as usize)
            .copied()
            .ok_or(PoolError::InvalidPosition(position))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn as_slice(&self) -> &[NounId] {
        &self.slots
    }
}
