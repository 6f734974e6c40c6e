//! In-memory capability implementations used by the test suites and the
//! demo CLI, standing in for the real custody, registry, and governance
//! backends.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::capabilities::{FragmentRegistry, GovernanceBridge, NounCustody};
use crate::error::CapabilityError;
use crate::types::{Address, FragmentId, NounId, ProposalId, ProposalState, Support};

/// Holder registry for nouns. Custodied nouns are recorded under the
/// configured custodian address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MockCustody {
    custodian: Address,
    holders: HashMap<NounId, Address>,
    /// Nouns whose inbound transfer is refused, for failure-path tests.
    refuse_take: HashSet<NounId>,
}

impl MockCustody {
    pub fn new(custodian: Address) -> Self {
        MockCustody {
            custodian,
            holders: HashMap::new(),
            refuse_take: HashSet::new(),
        }
    }

    /// Mint a noun directly to `holder`.
    pub fn seed(&mut self, noun: NounId, holder: Address) {
        self.holders.insert(noun, holder);
    }

    pub fn refuse_take(&mut self, noun: NounId) {
        self.refuse_take.insert(noun);
    }
}

impl NounCustody for MockCustody {
    fn take_custody(&mut self, noun: NounId, from: &Address) -> Result<(), CapabilityError> {
        if self.refuse_take.contains(&noun) {
            return Err(CapabilityError::new(format!(
                "transfer of noun {noun} refused"
            )));
        }
        match self.holders.get(&noun) {
            Some(holder) if holder == from => {
                self.holders.insert(noun, self.custodian.clone());
                Ok(())
            }
            Some(holder) => Err(CapabilityError::new(format!(
                "noun {noun} is held by {holder}, not {from}"
            ))),
            None => Err(CapabilityError::new(format!("noun {noun} does not exist"))),
        }
    }

    fn release(&mut self, noun: NounId, to: &Address) {
        self.holders.insert(noun, to.clone());
    }

    fn current_holder(&self, noun: NounId) -> Option<Address> {
        self.holders.get(&noun).cloned()
    }
}

/// Fragment-claim ownership registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockFragmentRegistry {
    owners: HashMap<FragmentId, Address>,
}

impl MockFragmentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of claims currently held by `owner`.
    pub fn balance_of(&self, owner: &Address) -> usize {
        self.owners.values().filter(|o| *o == owner).count()
    }
}

impl FragmentRegistry for MockFragmentRegistry {
    fn mint(&mut self, owner: &Address, id: FragmentId) {
        self.owners.insert(id, owner.clone());
    }

    fn burn(&mut self, id: FragmentId) {
        self.owners.remove(&id);
    }

    fn owner_of(&self, id: FragmentId) -> Option<Address> {
        self.owners.get(&id).cloned()
    }
}

/// Governance double: proposal states are set by hand and submitted votes
/// are retained for assertions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockGovernance {
    states: HashMap<ProposalId, ProposalState>,
    pub submitted: Vec<(ProposalId, Support, String)>,
}

impl MockGovernance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_state(&mut self, proposal: ProposalId, state: ProposalState) {
        self.states.insert(proposal, state);
    }
}

impl GovernanceBridge for MockGovernance {
    fn state_of(&self, proposal: ProposalId) -> ProposalState {
        self.states
            .get(&proposal)
            .copied()
            .unwrap_or(ProposalState::Pending)
    }

    fn submit_vote(
        &mut self,
        proposal: ProposalId,
        support: Support,
        reason: &str,
    ) -> Result<(), CapabilityError> {
        self.submitted.push((proposal, support, reason.to_string()));
        Ok(())
    }
}
