use crate::types::{Address, FragmentId, ProposalId, ProposalState, Units};
use thiserror::Error;

/// Failure reported by an injected capability (custody, registry,
/// governance). Surfaced to callers verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct CapabilityError(pub String);

impl CapabilityError {
    pub fn new(msg: impl Into<String>) -> Self {
        CapabilityError(msg.into())
    }
}

/// Error taxonomy for every pool operation.
///
/// Input-validation variants carry the offending value; state-conflict
/// variants carry both the attempted and the available quantities. A
/// returned error always means the pool state is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("empty input: at least one entry is required")]
    EmptyInput,

    #[error("fragment size {0} is outside the open interval (0, 1000000)")]
    InvalidFragmentSize(Units),

    #[error("fragment sizes total {requested} exceeds the available {available} units")]
    FragmentSizeExceedsDeposit { requested: Units, available: Units },

    #[error("invalid vault position {0}")]
    InvalidPosition(u64),

    #[error("unknown fragment {0}")]
    UnknownFragment(FragmentId),

    #[error("duplicate fragment {0} in input")]
    DuplicateFragment(FragmentId),

    #[error("insufficient unit balance: needed {needed}, available {available}")]
    InsufficientBalance { needed: Units, available: Units },

    #[error("{caller} is not authorized for fragment {fragment}")]
    Unauthorized { caller: Address, fragment: FragmentId },

    #[error("{voter} already voted on proposal {proposal}")]
    AlreadyVoted { voter: Address, proposal: ProposalId },

    #[error("voting is closed: proposal state is {0:?}")]
    VotingClosed(ProposalState),

    #[error("only 'against' votes are accepted during the objection period")]
    ObjectionPeriodRestricted,

    #[error("invalid support value {0}")]
    InvalidSupport(u8),

    #[error("redeem value mismatch: committed {committed} units, required {required}")]
    RedeemValueMismatch { committed: Units, required: Units },

    #[error("deposits are paused")]
    Paused,

    #[error("custody: {0}")]
    Custody(String),

    #[error("governance: {0}")]
    Governance(String),

    #[error(
        "unit conservation violated: supply {supply} + fragment units {fragments} != {expected}"
    )]
    ConservationViolated {
        supply: Units,
        fragments: Units,
        expected: Units,
    },
}
