//! Fragvault: a custodial pool that fractionalizes indivisible
//! collectibles ("nouns") into variable-size fragment claims and a fungible
//! unit balance, and relays governance voting power back upstream one whole
//! asset at a time.
//!
//! The crate is a facade over the workspace members; `FragmentPool` is the
//! operation surface.

// === Re-exports for broader ecosystem access ===
pub use fragvault_core::{
    Address, CapabilityError, FragmentId, FragmentRegistry, GovernanceBridge, NounCustody, NounId,
    PoolError, PoolEvent, ProposalId, ProposalState, Support, Units, UNITS_PER_NOUN,
};
pub use fragvault_engine::{CastOutcome, FragmentPool, SharedPool, POOL_VOTE_REASON};
pub use fragvault_governance::VoteRelay;
pub use fragvault_ledger::{FragmentLedger, UnitLedger, VaultPositions};

/// Test doubles for the injected capabilities.
pub use fragvault_core::mock;
