use log::{info, warn};
use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use fragvault_core::{
    Address, FragmentId, FragmentRegistry, GovernanceBridge, NounCustody, NounId, PoolError,
    PoolEvent, ProposalId, Support, Units, UNITS_PER_NOUN,
};
use fragvault_governance::{CastOutcome, VoteRelay};
use fragvault_ledger::{FragmentLedger, UnitLedger, VaultPositions};

/// Reason string attached to every relayed upstream vote.
pub const POOL_VOTE_REASON: &str = "aggregated fragment-holder vote";

/// The pool engine is single-threaded per instance; a multi-threaded host
/// wraps it in one mutual-exclusion boundary per logical pool.
pub type SharedPool<C, R, G> = Arc<Mutex<FragmentPool<C, R, G>>>;

/// The public operation surface of the pool. Composes the three ledgers and
/// the vote relay; every operation validates in full before mutating, so a
/// returned error means observable state is unchanged.
///
/// Invariant, re-checked after every mutation:
/// `unit_supply + Σ fragment sizes == 1_000_000 × nouns in custody`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize, R: Serialize, G: Serialize",
    deserialize = "C: DeserializeOwned, R: DeserializeOwned, G: DeserializeOwned"
))]
pub struct FragmentPool<C, R, G> {
    custody: C,
    registry: R,
    governance: G,
    units: UnitLedger,
    fragments: FragmentLedger,
    vault: VaultPositions,
    relay: VoteRelay,
    paused: bool,
    events: Vec<PoolEvent>,
}

impl<C, R, G> FragmentPool<C, R, G>
where
    C: NounCustody,
    R: FragmentRegistry,
    G: GovernanceBridge,
{
    pub fn new(custody: C, registry: R, governance: G) -> Self {
        FragmentPool {
            custody,
            registry,
            governance,
            units: UnitLedger::new(),
            fragments: FragmentLedger::new(),
            vault: VaultPositions::new(),
            relay: VoteRelay::new(),
            paused: false,
            events: Vec::new(),
        }
    }

    fn check_size(size: Units) -> Result<(), PoolError> {
        if size == 0 || size >= UNITS_PER_NOUN {
            return Err(PoolError::InvalidFragmentSize(size));
        }
        Ok(())
    }

    /// Validate a flat fragment-size list against an available unit budget
    /// and return the sum.
    fn checked_size_total(sizes: &[Units], available: Units) -> Result<Units, PoolError> {
        let mut total: Units = 0;
        for &size in sizes {
            Self::check_size(size)?;
            total += size;
        }
        if total > available {
            return Err(PoolError::FragmentSizeExceedsDeposit {
                requested: total,
                available,
            });
        }
        Ok(total)
    }

    fn mint_fragment(&mut self, owner: &Address, size: Units) -> Result<FragmentId, PoolError> {
        let id = self.fragments.mint(size)?;
        self.registry.mint(owner, id);
        self.relay.assign(id, owner.clone());
        Ok(id)
    }

    fn burn_fragment(&mut self, id: FragmentId) -> Result<Units, PoolError> {
        let size = self.fragments.burn(id)?;
        self.registry.burn(id);
        self.relay.clear(id);
        Ok(size)
    }

    /// Claims named in one call must exist, belong to the caller, and be
    /// distinct. Returns their sizes in input order.
    fn check_claims(&self, caller: &Address, claims: &[FragmentId]) -> Result<Vec<Units>, PoolError> {
        let mut seen = HashSet::new();
        let mut sizes = Vec::with_capacity(claims.len());
        for &claim in claims {
            if !seen.insert(claim) {
                return Err(PoolError::DuplicateFragment(claim));
            }
            sizes.push(self.fragments.count_of(claim)?);
            if self.registry.owner_of(claim).as_ref() != Some(caller) {
                return Err(PoolError::Unauthorized {
                    caller: caller.clone(),
                    fragment: claim,
                });
            }
        }
        Ok(sizes)
    }

    fn check_conservation(&self) -> Result<(), PoolError> {
        let supply = self.units.total_supply();
        let fragments = self.fragments.total_units();
        let expected = UNITS_PER_NOUN * self.vault.len() as Units;
        if supply + fragments != expected {
            return Err(PoolError::ConservationViolated {
                supply,
                fragments,
                expected,
            });
        }
        Ok(())
    }

    fn emit(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    // === Write operations ===

    /// Take `noun_ids` into custody, minting one claim per entry of
    /// `fragment_sizes` (a flat list drawn against the pooled budget of one
    /// million units per noun) and crediting the remainder as fungible
    /// units. Returns the minted claim ids.
    pub fn deposit(
        &mut self,
        caller: &Address,
        noun_ids: &[NounId],
        fragment_sizes: &[Units],
    ) -> Result<Vec<FragmentId>, PoolError> {
        if self.paused {
            return Err(PoolError::Paused);
        }
        if noun_ids.is_empty() {
            return Err(PoolError::EmptyInput);
        }

        let budget = UNITS_PER_NOUN * noun_ids.len() as Units;
        let committed = Self::checked_size_total(fragment_sizes, budget)?;

        for &noun in noun_ids {
            match self.custody.current_holder(noun) {
                Some(ref holder) if holder == caller => {}
                Some(holder) => {
                    return Err(PoolError::Custody(format!(
                        "noun {noun} is held by {holder}, not {caller}"
                    )))
                }
                None => return Err(PoolError::Custody(format!("noun {noun} does not exist"))),
            }
        }

        // Custody transfers are the one step that can still be refused
        // after validation; on a mid-call refusal the already-taken nouns
        // go back to the caller so no partial deposit is observable.
        let mut taken: Vec<NounId> = Vec::with_capacity(noun_ids.len());
        for &noun in noun_ids {
            if let Err(e) = self.custody.take_custody(noun, caller) {
                warn!("deposit aborted: {e}; returning {} noun(s)", taken.len());
                for noun in taken {
                    self.custody.release(noun, caller);
                }
                return Err(PoolError::Custody(e.to_string()));
            }
            taken.push(noun);
        }

        for &noun in noun_ids {
            self.vault.push(noun);
        }

        let mut minted = Vec::with_capacity(fragment_sizes.len());
        for &size in fragment_sizes {
            minted.push(self.mint_fragment(caller, size)?);
        }

        let supply_before = self.units.total_supply();
        let remainder = budget - committed;
        self.units.mint(caller, remainder);

        self.check_conservation()?;
        info!(
            "deposit: {caller} custodied {} noun(s), minted {} claim(s) and {remainder} units",
            noun_ids.len(),
            minted.len()
        );
        self.emit(PoolEvent::Deposited {
            depositor: caller.clone(),
            nouns: noun_ids.to_vec(),
            fragments: minted.clone(),
            units_minted: remainder,
            supply_before,
            supply_after: self.units.total_supply(),
            custody_after: self.vault.len() as u64,
        });
        Ok(minted)
    }

    /// Burn `source` and mint one claim per entry of `sizes`; the
    /// uncommitted remainder is credited to the caller as fungible units.
    pub fn split(
        &mut self,
        caller: &Address,
        source: FragmentId,
        sizes: &[Units],
    ) -> Result<Vec<FragmentId>, PoolError> {
        let source_size = self.check_claims(caller, &[source])?[0];
        let committed = Self::checked_size_total(sizes, source_size)?;

        self.burn_fragment(source)?;
        let mut minted = Vec::with_capacity(sizes.len());
        for &size in sizes {
            minted.push(self.mint_fragment(caller, size)?);
        }
        let remainder = source_size - committed;
        self.units.mint(caller, remainder);

        self.check_conservation()?;
        info!("split: {caller} split claim {source} into {} claim(s)", minted.len());
        self.emit(PoolEvent::Split {
            owner: caller.clone(),
            source,
            source_size,
            into: minted.clone(),
            remainder_units: remainder,
        });
        Ok(minted)
    }

    /// Burn every claim in `sources`, debit `unit_amount` from the caller,
    /// and mint exactly one claim worth the total.
    pub fn combine(
        &mut self,
        caller: &Address,
        sources: &[FragmentId],
        unit_amount: Units,
    ) -> Result<FragmentId, PoolError> {
        let sizes = self.check_claims(caller, sources)?;
        let total: Units = sizes.iter().sum::<Units>() + unit_amount;
        Self::check_size(total)?;
        let balance = self.units.balance_of(caller);
        if balance < unit_amount {
            return Err(PoolError::InsufficientBalance {
                needed: unit_amount,
                available: balance,
            });
        }

        for &source in sources {
            self.burn_fragment(source)?;
        }
        self.units.burn(caller, unit_amount)?;
        let result = self.mint_fragment(caller, total)?;

        self.check_conservation()?;
        info!(
            "combine: {caller} merged {} claim(s) and {unit_amount} units into claim {result}",
            sources.len()
        );
        self.emit(PoolEvent::Combined {
            owner: caller.clone(),
            sources: sources.to_vec(),
            units_drawn: unit_amount,
            result,
            result_size: total,
        });
        Ok(result)
    }

    /// Withdraw whole nouns: burn the named claims and `unit_amount` units
    /// (together exactly one million per target position) and release the
    /// noun at each position, processed in the given strictly decreasing
    /// order. All validation happens in one up-front pass.
    pub fn redeem(
        &mut self,
        caller: &Address,
        claims: &[FragmentId],
        unit_amount: Units,
        positions: &[u64],
    ) -> Result<Vec<NounId>, PoolError> {
        let sizes = self.check_claims(caller, claims)?;
        let committed: Units = sizes.iter().sum::<Units>() + unit_amount;
        let required = UNITS_PER_NOUN * positions.len() as Units;
        if committed != required {
            return Err(PoolError::RedeemValueMismatch {
                committed,
                required,
            });
        }
        let balance = self.units.balance_of(caller);
        if balance < unit_amount {
            return Err(PoolError::InsufficientBalance {
                needed: unit_amount,
                available: balance,
            });
        }
        // Strictly decreasing also rules out duplicates; the offending
        // position value is reported.
        let len = self.vault.len() as u64;
        for (i, &position) in positions.iter().enumerate() {
            if position >= len || (i > 0 && position >= positions[i - 1]) {
                return Err(PoolError::InvalidPosition(position));
            }
        }

        for &claim in claims {
            self.burn_fragment(claim)?;
        }
        let supply_before = self.units.total_supply();
        self.units.burn(caller, unit_amount)?;

        let mut released = Vec::with_capacity(positions.len());
        for &position in positions {
            let noun = self.vault.remove_at(position)?;
            self.custody.release(noun, caller);
            released.push(noun);
        }

        self.check_conservation()?;
        info!(
            "redeem: {caller} burned {} claim(s) and {unit_amount} units for {} noun(s)",
            claims.len(),
            released.len()
        );
        self.emit(PoolEvent::Redeemed {
            redeemer: caller.clone(),
            fragments: claims.to_vec(),
            units_burned: unit_amount,
            nouns: released.clone(),
            supply_before,
            supply_after: self.units.total_supply(),
            custody_after: self.vault.len() as u64,
        });
        Ok(released)
    }

    /// Reassign the vote power of each claim to `new_delegate`. Only the
    /// current delegate-of-record may do this.
    pub fn delegate_vote(
        &mut self,
        caller: &Address,
        claims: &[FragmentId],
        new_delegate: &Address,
    ) -> Result<(), PoolError> {
        self.relay.reassign(caller, claims, new_delegate)?;
        info!("delegate: {caller} handed {} claim(s) to {new_delegate}", claims.len());
        self.emit(PoolEvent::Delegated {
            fragments: claims.to_vec(),
            from: caller.clone(),
            to: new_delegate.clone(),
        });
        Ok(())
    }

    /// Cast the caller-supplied `support` with the combined weight of
    /// `claims`, relaying one upstream vote per whole asset of accumulated
    /// weight.
    pub fn cast_vote(
        &mut self,
        caller: &Address,
        claims: &[FragmentId],
        proposal: ProposalId,
        support: u8,
    ) -> Result<CastOutcome, PoolError> {
        let support = Support::try_from(support).map_err(PoolError::InvalidSupport)?;

        let mut seen = HashSet::new();
        let mut entries = Vec::with_capacity(claims.len());
        for &claim in claims {
            if !seen.insert(claim) {
                return Err(PoolError::DuplicateFragment(claim));
            }
            entries.push((claim, self.fragments.count_of(claim)?));
        }

        let outcome = self.relay.cast(
            &mut self.governance,
            caller,
            &entries,
            proposal,
            support,
            POOL_VOTE_REASON,
        )?;

        self.emit(PoolEvent::VoteCast {
            voter: caller.clone(),
            proposal,
            support,
            weight: outcome.weight,
            tally_after: outcome.tally,
        });
        for _ in 0..outcome.relayed {
            self.emit(PoolEvent::VoteRelayed { proposal, support });
        }
        Ok(outcome)
    }

    /// Transfer fungible units between holders.
    pub fn transfer_units(
        &mut self,
        caller: &Address,
        to: &Address,
        amount: Units,
    ) -> Result<(), PoolError> {
        self.units.transfer(caller, to, amount)
    }

    /// Drop idempotency records and tallies for a proposal that is no
    /// longer open. Returns whether anything was pruned.
    pub fn prune_voted(&mut self, proposal: ProposalId) -> bool {
        self.relay.prune_voted(&self.governance, proposal)
    }

    /// Gate the deposit path. Redeem, split, combine, and voting stay
    /// available while paused so value is never trapped.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.emit(PoolEvent::PauseSet { paused });
    }

    // === Read operations ===

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn custody_len(&self) -> usize {
        self.vault.len()
    }

    pub fn custodied_nouns(&self) -> &[NounId] {
        self.vault.as_slice()
    }

    pub fn noun_at(&self, position: u64) -> Result<NounId, PoolError> {
        self.vault.noun_at(position)
    }

    pub fn fragment_count(&self, id: FragmentId) -> Result<Units, PoolError> {
        self.fragments.count_of(id)
    }

    pub fn live_fragments(&self) -> usize {
        self.fragments.len()
    }

    /// Sum of all live claim sizes.
    pub fn fragment_unit_total(&self) -> Units {
        self.fragments.total_units()
    }

    pub fn delegate_of(&self, id: FragmentId) -> Result<&Address, PoolError> {
        self.relay.delegate_of(id)
    }

    pub fn vote_tally(&self, proposal: ProposalId, support: Support) -> Units {
        self.relay.tally(proposal, support)
    }

    pub fn unit_balance(&self, addr: &Address) -> Units {
        self.units.balance_of(addr)
    }

    pub fn unit_supply(&self) -> Units {
        self.units.total_supply()
    }

    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    pub fn governance(&self) -> &G {
        &self.governance
    }

    pub fn governance_mut(&mut self) -> &mut G {
        &mut self.governance
    }

    pub fn custody(&self) -> &C {
        &self.custody
    }

    pub fn custody_mut(&mut self) -> &mut C {
        &mut self.custody
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }
}
