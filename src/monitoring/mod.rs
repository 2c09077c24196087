pub mod logger;
pub mod metrics;
pub mod session;

pub use session::{LogLevel, SessionLog};
