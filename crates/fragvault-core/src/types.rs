use serde::{Deserialize, Serialize};
use std::fmt;

/// External identifier of a custodied collectible.
pub type NounId = u64;

/// Identifier of a fragment claim. Issued sequentially from 0.
pub type FragmentId = u64;

/// Identifier of an upstream governance proposal.
pub type ProposalId = u64;

/// Smallest ownership denomination.
pub type Units = u64;

/// One whole asset, expressed in ownership units.
pub const UNITS_PER_NOUN: Units = 1_000_000;

/// An account participating in the pool.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Address(addr.into())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Address(s.to_string())
    }
}

/// Voting choice relayed upstream.
///
/// Wire values follow the upstream governance convention:
/// 0 = against, 1 = for, 2 = abstain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Support {
    Against,
    For,
    Abstain,
}

impl Support {
    pub fn as_u8(self) -> u8 {
        match self {
            Support::Against => 0,
            Support::For => 1,
            Support::Abstain => 2,
        }
    }
}

impl TryFrom<u8> for Support {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        match raw {
            0 => Ok(Support::Against),
            1 => Ok(Support::For),
            2 => Ok(Support::Abstain),
            other => Err(other),
        }
    }
}

/// Lifecycle state of an upstream proposal, in the governance system's
/// numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProposalState {
    Pending,
    Active,
    Canceled,
    Defeated,
    Succeeded,
    Queued,
    Expired,
    Executed,
    Vetoed,
    ObjectionPeriod,
    Updatable,
}

impl ProposalState {
    /// Whether votes are still accepted for a proposal in this state.
    pub fn is_open(self) -> bool {
        matches!(self, ProposalState::Active | ProposalState::ObjectionPeriod)
    }
}

impl TryFrom<u8> for ProposalState {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, u8> {
        Ok(match raw {
            0 => ProposalState::Pending,
            1 => ProposalState::Active,
            2 => ProposalState::Canceled,
            3 => ProposalState::Defeated,
            4 => ProposalState::Succeeded,
            5 => ProposalState::Queued,
            6 => ProposalState::Expired,
            7 => ProposalState::Executed,
            8 => ProposalState::Vetoed,
            9 => ProposalState::ObjectionPeriod,
            10 => ProposalState::Updatable,
            other => return Err(other),
        })
    }
}
