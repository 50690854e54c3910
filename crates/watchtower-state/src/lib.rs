pub mod daily;
pub mod sessions;
pub mod sprint;
pub mod tasks;
pub mod tracker;

pub use daily::DailyStore;
pub use sessions::SessionTracker;
pub use sprint::SprintTracker;
pub use tasks::TaskStore;
pub use tracker::{CompleteOutcome, RollOutcome, Watchtower};
