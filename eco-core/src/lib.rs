pub mod achievements;
pub mod activity;
pub mod aggregation;
pub mod config;
pub mod detection;
pub mod events;
pub mod impact;
pub mod ledger;
pub mod rewards;
pub mod scanner;
pub mod storage;

// Re-export main components
pub use achievements::*;
pub use activity::*;
pub use aggregation::*;
pub use config::*;
pub use detection::*;
pub use events::*;
pub use impact::*;
pub use ledger::*;
pub use rewards::*;
pub use scanner::*;
pub use storage::*;
