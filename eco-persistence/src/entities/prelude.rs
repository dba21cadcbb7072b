pub use super::ledger_snapshots::Entity as LedgerSnapshots;
