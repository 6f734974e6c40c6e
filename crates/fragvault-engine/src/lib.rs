// === Orchestrator ===
pub mod orchestrator;

pub use orchestrator::{FragmentPool, SharedPool, POOL_VOTE_REASON};
pub use fragvault_governance::CastOutcome;
