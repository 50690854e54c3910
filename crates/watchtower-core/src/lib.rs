pub mod analysis;
pub mod clock;
pub mod config;
pub mod id;
pub mod types;

pub use analysis::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, WatchConfig};
pub use types::*;
