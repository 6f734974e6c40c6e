// === Vote Relay ===
pub mod vote_relay;

pub use vote_relay::{CastOutcome, VoteRelay};
