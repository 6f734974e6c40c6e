use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use fragvault_core::{FragmentId, PoolError, Units, UNITS_PER_NOUN};

/// Size attribute of every live fragment claim. Ids are issued sequentially
/// from 0 and never reused, matching the external registry's token ids.
/// Ownership is the registry's concern; only the size bound lives here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FragmentLedger {
    counts: HashMap<FragmentId, Units>,
    next_id: FragmentId,
    total_units: Units,
}

impl FragmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_size(unit_count: Units) -> Result<(), PoolError> {
        if unit_count == 0 || unit_count >= UNITS_PER_NOUN {
            return Err(PoolError::InvalidFragmentSize(unit_count));
        }
        Ok(())
    }

    /// Create a claim of `unit_count` units and return its id.
    pub fn mint(&mut self, unit_count: Units) -> Result<FragmentId, PoolError> {
        Self::check_size(unit_count)?;
        let id = self.next_id;
        self.next_id += 1;
        self.counts.insert(id, unit_count);
        self.total_units += unit_count;
        Ok(id)
    }

    /// Destroy a claim and return the units it carried.
    pub fn burn(&mut self, id: FragmentId) -> Result<Units, PoolError> {
        let count = self
            .counts
            .remove(&id)
            .ok_or(PoolError::UnknownFragment(id))?;
        self.total_units -= count;
        Ok(count)
    }

    /// Resize an existing claim, keeping the size bound.
    pub fn set_count(&mut self, id: FragmentId, new_count: Units) -> Result<(), PoolError> {
        Self::check_size(new_count)?;
        let count = self
            .counts
            .get_mut(&id)
            .ok_or(PoolError::UnknownFragment(id))?;
        self.total_units = self.total_units - *count + new_count;
        *count = new_count;
        Ok(())
    }

    pub fn count_of(&self, id: FragmentId) -> Result<Units, PoolError> {
        self.counts
            .get(&id)
            .copied()
            .ok_or(PoolError::UnknownFragment(id))
    }

    pub fn contains(&self, id: FragmentId) -> bool {
        self.counts.contains_key(&id)
    }

    /// Number of live claims.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all live claim sizes, maintained incrementally.
    pub fn total_units(&self) -> Units {
        self.total_units
    }
}
