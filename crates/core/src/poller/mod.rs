//! Waits for ordered data to land in the delivery bucket.

mod data_poller;
mod error;
mod types;

pub use data_poller::DataPoller;
pub use error::PollError;
pub use types::{MatchRule, PollSpec, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_TIMEOUT};
