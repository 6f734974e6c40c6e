//! Capability traits the pool consumes. Implementations are injected at
//! construction so production backends and test doubles are interchangeable.

use crate::error::CapabilityError;
use crate::types::{Address, FragmentId, NounId, ProposalId, ProposalState, Support};

/// Moves the underlying collectible in and out of pool custody.
pub trait NounCustody {
    /// Take `noun` into custody from `from`. May be refused by the
    /// underlying transfer mechanism.
    fn take_custody(&mut self, noun: NounId, from: &Address) -> Result<(), CapabilityError>;

    /// Release a custodied `noun` to `to`. Releasing from the pool's own
    /// custody cannot be refused.
    fn release(&mut self, noun: NounId, to: &Address);

    /// Current holder of `noun`, if it exists.
    fn current_holder(&self, noun: NounId) -> Option<Address>;
}

/// Ownership registry for fragment claims. The pool is the id authority;
/// the registry only records who holds each claim.
pub trait FragmentRegistry {
    fn mint(&mut self, owner: &Address, id: FragmentId);
    fn burn(&mut self, id: FragmentId);
    fn owner_of(&self, id: FragmentId) -> Option<Address>;
}

/// Query and vote-submission surface of the external governance system.
pub trait GovernanceBridge {
    fn state_of(&self, proposal: ProposalId) -> ProposalState;

    fn submit_vote(
        &mut self,
        proposal: ProposalId,
        support: Support,
        reason: &str,
    ) -> Result<(), CapabilityError>;
}
