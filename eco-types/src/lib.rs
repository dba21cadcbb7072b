pub mod activity;
pub mod detection;
pub mod errors;
pub mod gamification;
pub mod scan;
pub mod stats;
pub mod user;

// Re-export all types
pub use activity::*;
pub use detection::*;
pub use errors::*;
pub use gamification::*;
pub use scan::*;
pub use stats::*;
pub use user::*;

pub type DetectionId = uuid::Uuid;
pub type UserId = uuid::Uuid;

/// Milliseconds since the Unix epoch.
pub type EpochMillis = i64;
