pub mod prelude;

pub mod ledger_snapshots;
