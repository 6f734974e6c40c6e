// === Shared Vocabulary ===
pub mod types;
pub mod error;
pub mod events;

// === Injected Capabilities ===
pub mod capabilities;
pub mod mock;

// === Re-exports for broader ecosystem access ===
pub use types::{
    Address, FragmentId, NounId, ProposalId, ProposalState, Support, Units, UNITS_PER_NOUN,
};
pub use error::{CapabilityError, PoolError};
pub use events::PoolEvent;
pub use capabilities::{FragmentRegistry, GovernanceBridge, NounCustody};
