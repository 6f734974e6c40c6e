use crate::types::{Address, FragmentId, NounId, ProposalId, Support, Units};
use serde::{Deserialize, Serialize};

/// Audit record emitted once per successful write operation. Supply-moving
/// events carry the before/after totals so the conservation identity can be
/// replayed from the log alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PoolEvent {
    Deposited {
        depositor: Address,
        nouns: Vec<NounId>,
        fragments: Vec<FragmentId>,
        units_minted: Units,
        supply_before: Units,
        supply_after: Units,
        custody_after: u64,
    },
    Split {
        owner: Address,
        source: FragmentId,
        source_size: Units,
        into: Vec<FragmentId>,
        remainder_units: Units,
    },
    Combined {
        owner: Address,
        sources: Vec<FragmentId>,
        units_drawn: Units,
        result: FragmentId,
        result_size: Units,
    },
    Redeemed {
        redeemer: Address,
        fragments: Vec<FragmentId>,
        units_burned: Units,
        nouns: Vec<NounId>,
        supply_before: Units,
        supply_after: Units,
        custody_after: u64,
    },
    Delegated {
        fragments: Vec<FragmentId>,
        from: Address,
        to: Address,
    },
    VoteCast {
        voter: Address,
        proposal: ProposalId,
        support: Support,
        weight: Units,
        tally_after: Units,
    },
    VoteRelayed {
        proposal: ProposalId,
        support: Support,
    },
    PauseSet {
        paused: bool,
    },
}
