//! Database repositories

mod schedule;
pub mod transaction;

pub use schedule::{ScheduleRepository, ScheduleStore};
pub use transaction::with_transaction;
