//! Integration suite exercising the full operation surface against the
//! in-memory capability doubles.

use fragvault_core::mock::{MockCustody, MockFragmentRegistry, MockGovernance};
use fragvault_core::{
    Address, NounCustody, PoolError, PoolEvent, ProposalState, Support, UNITS_PER_NOUN,
};
use fragvault_engine::FragmentPool;

type TestPool = FragmentPool<MockCustody, MockFragmentRegistry, MockGovernance>;

fn alice() -> Address {
    Address::from("alice")
}

fn bob() -> Address {
    Address::from("bob")
}

/// Ten nouns (0..10) seeded to alice, ten (10..20) to bob.
fn pool() -> TestPool {
    let mut custody = MockCustody::new(Address::from("vault"));
    for noun in 0..10 {
        custody.seed(noun, alice());
    }
    for noun in 10..20 {
        custody.seed(noun, bob());
    }
    FragmentPool::new(custody, MockFragmentRegistry::new(), MockGovernance::new())
}

fn assert_conserved(pool: &TestPool) {
    assert_eq!(
        pool.unit_supply() + pool.fragment_unit_total(),
        UNITS_PER_NOUN * pool.custody_len() as u64,
        "unit conservation violated"
    );
}

// === Deposit ===

#[test]
fn deposit_creates_fragments_and_units() {
    let mut pool = pool();
    let minted = pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    assert_eq!(minted, vec![0]);
    assert_eq!(pool.registry().balance_of(&alice()), 1);
    assert_eq!(pool.fragment_count(0).unwrap(), 500_000);
    assert_eq!(pool.unit_balance(&alice()), 500_000);
    assert_conserved(&pool);
}

#[test]
fn deposit_with_no_nouns_fails() {
    let mut pool = pool();
    assert_eq!(
        pool.deposit(&alice(), &[], &[500_000]),
        Err(PoolError::EmptyInput)
    );
}

#[test]
fn deposit_rejects_whole_asset_fragment() {
    let mut pool = pool();
    assert_eq!(
        pool.deposit(&alice(), &[0], &[1_000_000]),
        Err(PoolError::InvalidFragmentSize(1_000_000))
    );
}

#[test]
fn deposit_rejects_oversubscribed_flat_budget() {
    let mut pool = pool();
    assert_eq!(
        pool.deposit(&alice(), &[0, 1], &[900_000, 900_000, 200_001]),
        Err(PoolError::FragmentSizeExceedsDeposit {
            requested: 2_000_001,
            available: 2_000_000,
        })
    );
    // Nothing moved.
    assert_eq!(pool.custody_len(), 0);
    assert_eq!(pool.custody().current_holder(0), Some(alice()));
}

#[test]
fn deposit_without_sizes_mints_only_units() {
    let mut pool = pool();
    let minted = pool.deposit(&alice(), &[0], &[]).unwrap();
    assert!(minted.is_empty());
    assert_eq!(pool.registry().balance_of(&alice()), 0);
    assert_eq!(pool.unit_balance(&alice()), 1_000_000);
    assert_conserved(&pool);
}

#[test]
fn deposit_mints_listed_sizes_and_remainder() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[300_000, 400_000]).unwrap();
    assert_eq!(pool.registry().balance_of(&alice()), 2);
    assert_eq!(pool.fragment_count(0).unwrap(), 300_000);
    assert_eq!(pool.fragment_count(1).unwrap(), 400_000);
    assert_eq!(pool.unit_balance(&alice()), 300_000);
    assert_conserved(&pool);
}

#[test]
fn deposit_requires_caller_to_hold_the_noun() {
    let mut pool = pool();
    let err = pool.deposit(&bob(), &[0], &[]).unwrap_err();
    assert!(matches!(err, PoolError::Custody(_)));
    assert_eq!(pool.custody_len(), 0);
}

#[test]
fn refused_custody_mid_deposit_returns_taken_nouns() {
    let mut pool = pool();
    pool.custody_mut().refuse_take(1);

    let err = pool.deposit(&alice(), &[0, 1], &[]).unwrap_err();
    assert!(matches!(err, PoolError::Custody(_)));
    // Noun 0 was taken first and must be back with alice.
    assert_eq!(pool.custody().current_holder(0), Some(alice()));
    assert_eq!(pool.custody_len(), 0);
    assert_eq!(pool.unit_supply(), 0);
    assert_conserved(&pool);
}

#[test]
fn pause_gates_deposit_only() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();

    pool.set_paused(true);
    assert!(pool.paused());
    assert_eq!(pool.deposit(&alice(), &[1], &[]), Err(PoolError::Paused));

    // Value is never trapped: split, combine, redeem, voting stay open.
    pool.split(&alice(), 0, &[200_000]).unwrap();
    pool.combine(&alice(), &[1], 100_000).unwrap();
    pool.redeem(&alice(), &[2], 700_000, &[0]).unwrap();

    pool.set_paused(false);
    pool.deposit(&alice(), &[1], &[]).unwrap();
    assert_conserved(&pool);
}

// === Split ===

#[test]
fn split_mints_targets_and_credits_remainder() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000, 500_000]).unwrap();
    let minted = pool.split(&alice(), 0, &[200_000, 200_000]).unwrap();
    assert_eq!(minted, vec![2, 3]);
    assert_eq!(pool.registry().balance_of(&alice()), 3);
    assert_eq!(pool.fragment_count(2).unwrap(), 200_000);
    assert_eq!(pool.fragment_count(3).unwrap(), 200_000);
    assert_eq!(pool.unit_balance(&alice()), 100_000);
    assert_conserved(&pool);
}

#[test]
fn split_rejects_zero_sized_target() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    assert_eq!(
        pool.split(&alice(), 0, &[0, 200_000, 200_000]),
        Err(PoolError::InvalidFragmentSize(0))
    );
    assert_eq!(
        pool.split(&alice(), 0, &[200_000, 0, 200_000]),
        Err(PoolError::InvalidFragmentSize(0))
    );
    // Source untouched by the failures.
    assert_eq!(pool.fragment_count(0).unwrap(), 500_000);
}

#[test]
fn split_rejects_targets_exceeding_source() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    assert_eq!(
        pool.split(&alice(), 0, &[300_000, 300_000]),
        Err(PoolError::FragmentSizeExceedsDeposit {
            requested: 600_000,
            available: 500_000,
        })
    );
}

#[test]
fn split_requires_claim_owner() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    assert_eq!(
        pool.split(&bob(), 0, &[200_000]),
        Err(PoolError::Unauthorized {
            caller: bob(),
            fragment: 0
        })
    );
}

// === Combine ===

#[test]
fn combine_merges_claims_and_units() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[200_000, 200_000]).unwrap();
    let result = pool.combine(&alice(), &[0, 1], 200_000).unwrap();
    assert_eq!(result, 2);
    assert_eq!(pool.registry().balance_of(&alice()), 1);
    assert_eq!(pool.fragment_count(2).unwrap(), 600_000);
    assert_eq!(pool.unit_balance(&alice()), 400_000);
    assert_conserved(&pool);
}

#[test]
fn combine_from_units_alone() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[]).unwrap();
    let result = pool.combine(&alice(), &[], 500_000).unwrap();
    assert_eq!(pool.fragment_count(result).unwrap(), 500_000);
    assert_eq!(pool.unit_balance(&alice()), 500_000);
    assert_conserved(&pool);
}

#[test]
fn combine_rejects_whole_asset_total() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000, 500_000]).unwrap();
    assert_eq!(
        pool.combine(&alice(), &[0, 1], 0),
        Err(PoolError::InvalidFragmentSize(1_000_000))
    );
}

#[test]
fn combine_rejects_empty_total() {
    let mut pool = pool();
    assert_eq!(
        pool.combine(&alice(), &[], 0),
        Err(PoolError::InvalidFragmentSize(0))
    );
}

#[test]
fn combine_rejects_insufficient_balance() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[900_000]).unwrap();
    assert_eq!(
        pool.combine(&alice(), &[], 200_000),
        Err(PoolError::InsufficientBalance {
            needed: 200_000,
            available: 100_000,
        })
    );
}

#[test]
fn combine_rejects_duplicate_sources() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[400_000]).unwrap();
    assert_eq!(
        pool.combine(&alice(), &[0, 0], 0),
        Err(PoolError::DuplicateFragment(0))
    );
}

#[test]
fn combining_a_split_reproduces_the_source() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    let parts = pool.split(&alice(), 0, &[200_000, 100_000]).unwrap();
    // Remainder of the split went to units; drawing it back reproduces
    // the original size.
    let rejoined = pool.combine(&alice(), &parts, 200_000).unwrap();
    assert_eq!(pool.fragment_count(rejoined).unwrap(), 500_000);
    assert_conserved(&pool);
}

// === Redeem ===

#[test]
fn redeem_burns_claims_and_releases_the_noun() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();

    let released = pool.redeem(&alice(), &[0], 500_000, &[0]).unwrap();
    assert_eq!(released, vec![0]);
    assert_eq!(pool.registry().balance_of(&alice()), 0);
    assert_eq!(pool.fragment_count(0), Err(PoolError::UnknownFragment(0)));
    assert_eq!(pool.custody().current_holder(0), Some(alice()));
    assert_eq!(pool.noun_at(0), Err(PoolError::InvalidPosition(0)));
    assert_conserved(&pool);
}

#[test]
fn redeem_multiple_nouns_with_units() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0, 1, 2, 3], &[]).unwrap();

    let released = pool.redeem(&alice(), &[], 2_000_000, &[2, 1]).unwrap();
    assert_eq!(released, vec![2, 1]);
    assert_eq!(pool.custody().current_holder(1), Some(alice()));
    assert_eq!(pool.custody().current_holder(2), Some(alice()));
    assert_ne!(pool.custody().current_holder(0), Some(alice()));
    assert_ne!(pool.custody().current_holder(3), Some(alice()));
    assert_eq!(pool.custody_len(), 2);
    assert_conserved(&pool);
}

#[test]
fn redeem_rejects_bad_positions_up_front() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0, 1, 2, 3], &[]).unwrap();

    assert_eq!(
        pool.redeem(&alice(), &[], 3_000_000, &[4, 3, 2]),
        Err(PoolError::InvalidPosition(4))
    );
    assert_eq!(
        pool.redeem(&alice(), &[], 3_000_000, &[1, 2, 3]),
        Err(PoolError::InvalidPosition(2))
    );
    assert_eq!(
        pool.redeem(&alice(), &[], 3_000_000, &[3, 2, 2]),
        Err(PoolError::InvalidPosition(2))
    );
    // Failures applied no burn or debit.
    assert_eq!(pool.unit_balance(&alice()), 4_000_000);
    assert_eq!(pool.custody_len(), 4);
}

#[test]
fn redeem_requires_exact_whole_asset_value() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0, 1, 2, 3], &[]).unwrap();

    assert_eq!(
        pool.redeem(&alice(), &[], 2_999_999, &[3, 2, 1]),
        Err(PoolError::RedeemValueMismatch {
            committed: 2_999_999,
            required: 3_000_000,
        })
    );
    assert_eq!(
        pool.redeem(&alice(), &[], 2_000_000, &[3, 2, 1]),
        Err(PoolError::RedeemValueMismatch {
            committed: 2_000_000,
            required: 3_000_000,
        })
    );
}

#[test]
fn redeem_rejects_overpayment_for_one_noun() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0, 1], &[]).unwrap();
    assert_eq!(
        pool.redeem(&alice(), &[], 1_800_000, &[0]),
        Err(PoolError::RedeemValueMismatch {
            committed: 1_800_000,
            required: 1_000_000,
        })
    );
    assert_eq!(pool.unit_balance(&alice()), 2_000_000);
    assert_eq!(pool.custody_len(), 2);
}

#[test]
fn redeem_one_unit_short_fails() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    assert_eq!(
        pool.redeem(&alice(), &[0], 499_999, &[0]),
        Err(PoolError::RedeemValueMismatch {
            committed: 999_999,
            required: 1_000_000,
        })
    );
    assert_eq!(pool.fragment_count(0).unwrap(), 500_000);
}

#[test]
fn redeem_requires_claim_owner() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    pool.deposit(&bob(), &[10], &[]).unwrap();
    assert_eq!(
        pool.redeem(&bob(), &[0], 500_000, &[0]),
        Err(PoolError::Unauthorized {
            caller: bob(),
            fragment: 0
        })
    );
}

// === Delegation & voting ===

#[test]
fn depositor_is_the_default_delegate() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    assert_eq!(pool.delegate_of(0).unwrap(), &alice());

    pool.delegate_vote(&alice(), &[0], &bob()).unwrap();
    assert_eq!(pool.delegate_of(0).unwrap(), &bob());
}

#[test]
fn delegation_requires_delegate_of_record() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    assert_eq!(
        pool.delegate_vote(&bob(), &[0], &bob()),
        Err(PoolError::Unauthorized {
            caller: bob(),
            fragment: 0
        })
    );
    assert_eq!(pool.delegate_of(0).unwrap(), &alice());
}

#[test]
fn delegation_isolates_vote_power() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    pool.delegate_vote(&alice(), &[0], &bob()).unwrap();
    pool.governance_mut().set_state(1, ProposalState::Active);

    // The original custodian lost the power...
    assert_eq!(
        pool.cast_vote(&alice(), &[0], 1, 1),
        Err(PoolError::Unauthorized {
            caller: alice(),
            fragment: 0
        })
    );
    // ...and the new delegate holds it.
    pool.cast_vote(&bob(), &[0], 1, 1).unwrap();
    assert_eq!(pool.vote_tally(1, Support::For), 500_000);
}

#[test]
fn cast_vote_rejects_bad_support() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    pool.governance_mut().set_state(1, ProposalState::Active);
    assert_eq!(
        pool.cast_vote(&alice(), &[0], 1, 3),
        Err(PoolError::InvalidSupport(3))
    );
}

#[test]
fn cast_vote_requires_open_proposal() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();

    pool.governance_mut().set_state(1, ProposalState::Canceled);
    assert_eq!(
        pool.cast_vote(&alice(), &[0], 1, 2),
        Err(PoolError::VotingClosed(ProposalState::Canceled))
    );

    pool.governance_mut().set_state(1, ProposalState::ObjectionPeriod);
    assert_eq!(
        pool.cast_vote(&alice(), &[0], 1, 2),
        Err(PoolError::ObjectionPeriodRestricted)
    );
    // 'Against' is still accepted during the objection period.
    pool.cast_vote(&alice(), &[0], 1, 0).unwrap();
    assert_eq!(pool.vote_tally(1, Support::Against), 500_000);
}

#[test]
fn cast_vote_accumulates_claim_weight() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    pool.governance_mut().set_state(1, ProposalState::Active);
    let outcome = pool.cast_vote(&alice(), &[0], 1, 1).unwrap();
    assert_eq!(outcome.weight, 500_000);
    assert_eq!(pool.vote_tally(1, Support::For), 500_000);
    assert!(pool.governance().submitted.is_empty());
}

#[test]
fn voting_twice_fails_without_tally_change() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    pool.governance_mut().set_state(1, ProposalState::Active);
    pool.cast_vote(&alice(), &[0], 1, 1).unwrap();
    assert_eq!(
        pool.cast_vote(&alice(), &[0], 1, 1),
        Err(PoolError::AlreadyVoted {
            voter: alice(),
            proposal: 1
        })
    );
    assert_eq!(pool.vote_tally(1, Support::For), 500_000);
}

#[test]
fn full_weight_relays_exactly_one_vote_and_resets() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    pool.deposit(&bob(), &[10], &[500_000]).unwrap();
    pool.governance_mut().set_state(1, ProposalState::Active);

    pool.cast_vote(&alice(), &[0], 1, 1).unwrap();
    assert_eq!(pool.vote_tally(1, Support::For), 500_000);

    let outcome = pool.cast_vote(&bob(), &[1], 1, 1).unwrap();
    assert_eq!(outcome.relayed, 1);
    assert_eq!(pool.vote_tally(1, Support::For), 0);
    assert_eq!(pool.governance().submitted.len(), 1);
}

#[test]
fn surplus_weight_carries_into_the_next_cycle() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0, 1], &[700_000, 600_000]).unwrap();
    pool.governance_mut().set_state(1, ProposalState::Active);

    let outcome = pool.cast_vote(&alice(), &[0, 1], 1, 1).unwrap();
    assert_eq!(outcome.weight, 1_300_000);
    assert_eq!(outcome.relayed, 1);
    assert_eq!(pool.vote_tally(1, Support::For), 300_000);
    assert_eq!(pool.governance().submitted.len(), 1);
}

#[test]
fn prune_clears_records_once_voting_closes() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[500_000]).unwrap();
    pool.governance_mut().set_state(1, ProposalState::Active);
    pool.cast_vote(&alice(), &[0], 1, 1).unwrap();

    assert!(!pool.prune_voted(1));

    pool.governance_mut().set_state(1, ProposalState::Defeated);
    assert!(pool.prune_voted(1));
    assert_eq!(pool.vote_tally(1, Support::For), 0);
}

// === Reads & events ===

#[test]
fn noun_positions_are_queryable() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0, 1, 2], &[500_000, 500_000, 500_000])
        .unwrap();
    assert_eq!(pool.noun_at(0).unwrap(), 0);
    assert_eq!(pool.noun_at(1).unwrap(), 1);
    assert_eq!(pool.noun_at(2).unwrap(), 2);
    assert_eq!(pool.noun_at(3), Err(PoolError::InvalidPosition(3)));
    assert_eq!(pool.custodied_nouns(), &[0, 1, 2]);
}

#[test]
fn unit_transfers_move_freely() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[]).unwrap();
    pool.transfer_units(&alice(), &bob(), 400_000).unwrap();
    assert_eq!(pool.unit_balance(&alice()), 600_000);
    assert_eq!(pool.unit_balance(&bob()), 400_000);
    assert_conserved(&pool);
}

#[test]
fn events_carry_before_and_after_quantities() {
    let mut pool = pool();
    pool.deposit(&alice(), &[0], &[300_000]).unwrap();
    pool.redeem(&alice(), &[0], 700_000, &[0]).unwrap();

    let events = pool.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        PoolEvent::Deposited {
            depositor: alice(),
            nouns: vec![0],
            fragments: vec![0],
            units_minted: 700_000,
            supply_before: 0,
            supply_after: 700_000,
            custody_after: 1,
        }
    );
    assert_eq!(
        events[1],
        PoolEvent::Redeemed {
            redeemer: alice(),
            fragments: vec![0],
            units_burned: 700_000,
            nouns: vec![0],
            supply_before: 700_000,
            supply_after: 0,
            custody_after: 0,
        }
    );
}
