// === Ledgers ===
pub mod unit_ledger;
pub mod fragment_ledger;
pub mod vault;

pub use fragment_ledger::FragmentLedger;
pub use unit_ledger::UnitLedger;
pub use vault::VaultPositions;
