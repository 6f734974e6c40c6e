use log::info;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use fragvault_core::{
    Address, FragmentId, GovernanceBridge, PoolError, ProposalId, ProposalState, Support, Units,
    UNITS_PER_NOUN,
};

/// Result of a successful cast: the weight contributed by this call, the
/// tally left behind for this `(proposal, support)` pair, and how many
/// whole-asset votes were relayed upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastOutcome {
    pub weight: Units,
    pub tally: Units,
    pub relayed: u32,
}

/// Per-claim vote-power delegation plus per-`(proposal, support)` weight
/// aggregation.
///
/// A claim's vote power belongs to its minter until reassigned by the
/// current delegate-of-record. Weight accumulates per support choice; the
/// instant a tally reaches one whole asset (1,000,000 units) a single vote
/// is submitted upstream and 1,000,000 is deducted. Surplus weight carries
/// into the next accumulation cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VoteRelay {
    delegates: HashMap<FragmentId, Address>,
    voted: HashMap<Address, HashSet<ProposalId>>,
    tallies: HashMap<ProposalId, HashMap<Support, Units>>,
}

impl VoteRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the initial delegate of a freshly minted claim.
    pub fn assign(&mut self, fragment: FragmentId, delegate: Address) {
        self.delegates.insert(fragment, delegate);
    }

    /// Drop the delegation record of a burned claim.
    pub fn clear(&mut self, fragment: FragmentId) {
        self.delegates.remove(&fragment);
    }

    pub fn delegate_of(&self, fragment: FragmentId) -> Result<&Address, PoolError> {
        self.delegates
            .get(&fragment)
            .ok_or(PoolError::UnknownFragment(fragment))
    }

    /// Reassign vote power for each claim. The caller must be the current
    /// delegate-of-record of every claim named; nothing changes on failure.
    pub fn reassign(
        &mut self,
        caller: &Address,
        fragments: &[FragmentId],
        new_delegate: &Address,
    ) -> Result<(), PoolError> {
        if fragments.is_empty() {
            return Err(PoolError::EmptyInput);
        }
        for &fragment in fragments {
            if self.delegate_of(fragment)? != caller {
                return Err(PoolError::Unauthorized {
                    caller: caller.clone(),
                    fragment,
                });
            }
        }
        for &fragment in fragments {
            self.delegates.insert(fragment, new_delegate.clone());
        }
        Ok(())
    }

    pub fn tally(&self, proposal: ProposalId, support: Support) -> Units {
        self.tallies
            .get(&proposal)
            .and_then(|per_support| per_support.get(&support))
            .copied()
            .unwrap_or(0)
    }

    pub fn has_voted(&self, voter: &Address, proposal: ProposalId) -> bool {
        self.voted
            .get(voter)
            .map_or(false, |proposals| proposals.contains(&proposal))
    }

    /// Aggregate the weight of `entries` (claim id, unit count) into the
    /// `(proposal, support)` tally, relaying one upstream vote per whole
    /// asset of accumulated weight.
    ///
    /// Validation happens in full before any mutation: proposal open (and
    /// objection-period restriction), caller is the delegate of every claim,
    /// caller has not voted on this proposal. Upstream submissions happen
    /// before the tally and idempotency record are committed, so a refused
    /// submission leaves the relay unchanged.
    pub fn cast<G: GovernanceBridge>(
        &mut self,
        governance: &mut G,
        caller: &Address,
        entries: &[(FragmentId, Units)],
        proposal: ProposalId,
        support: Support,
        reason: &str,
    ) -> Result<CastOutcome, PoolError> {
        if entries.is_empty() {
            return Err(PoolError::EmptyInput);
        }

        let state = governance.state_of(proposal);
        if !state.is_open() {
            return Err(PoolError::VotingClosed(state));
        }
        if state == ProposalState::ObjectionPeriod && support != Support::Against {
            return Err(PoolError::ObjectionPeriodRestricted);
        }

        if self.has_voted(caller, proposal) {
            return Err(PoolError::AlreadyVoted {
                voter: caller.clone(),
                proposal,
            });
        }
        for &(fragment, _) in entries {
            if self.delegate_of(fragment)? != caller {
                return Err(PoolError::Unauthorized {
                    caller: caller.clone(),
                    fragment,
                });
            }
        }

        let weight: Units = entries.iter().map(|&(_, w)| w).sum();
        let total = self.tally(proposal, support) + weight;
        let relayed = total / UNITS_PER_NOUN;
        let remainder = total % UNITS_PER_NOUN;

        for _ in 0..relayed {
            governance
                .submit_vote(proposal, support, reason)
                .map_err(|e| PoolError::Governance(e.to_string()))?;
        }

        self.voted.entry(caller.clone()).or_default().insert(proposal);
        self.tallies
            .entry(proposal)
            .or_default()
            .insert(support, remainder);

        if relayed > 0 {
            info!(
                "relayed {relayed} whole-asset vote(s) on proposal {proposal} ({support:?}), \
                 {remainder} units carried over"
            );
        }

        Ok(CastOutcome {
            weight,
            tally: remainder,
            relayed: relayed as u32,
        })
    }

    /// Drop tallies and idempotency records for a proposal that is no
    /// longer open, bounding the relay's growth. Returns whether anything
    /// was pruned; an open proposal is left untouched.
    pub fn prune_voted<G: GovernanceBridge>(
        &mut self,
        governance: &G,
        proposal: ProposalId,
    ) -> bool {
        if governance.state_of(proposal).is_open() {
            return false;
        }
        self.tallies.remove(&proposal);
        self.voted.retain(|_, proposals| {
            proposals.remove(&proposal);
            !proposals.is_empty()
        });
        true
    }
}
