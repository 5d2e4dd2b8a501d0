pub mod cascade;
pub mod ledger;
pub mod lock;
pub mod ranking;
pub mod resolver;

pub use lock::{Clock, LockStatus};
pub use ranking::RankingEntry;
pub use resolver::{OutcomeDecision, SettledMatch};
