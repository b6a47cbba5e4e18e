pub mod log;
pub mod memory;
pub mod reclaimer;
pub mod report;

pub use log::{FileRunLog, MemoryRunLog, RunEvent, RunLog, TracingRunLog};
pub use memory::InMemoryReservationStore;
pub use reclaimer::ReservationReclaimer;
pub use report::{ReclaimOutcome, ReleaseFailure};

/// Default maximum age, in minutes, a pending stock-holding booking may
/// reach before it becomes eligible for automatic expiry.
pub const DEFAULT_TTL_MINUTES: i64 = 15;
