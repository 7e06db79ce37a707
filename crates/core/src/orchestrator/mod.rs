//! Order workflow orchestration.
//!
//! Drives each prepared item through the full lifecycle:
//! duplicate guard, vendor submission, landing-bucket polling,
//! materialization, and terminal catalog writes with notifications.
//! Items are processed sequentially and fail independently.

mod config;
mod prepare;
mod runner;
mod types;

pub use config::{BatchFailurePolicy, OrchestratorConfig};
pub use prepare::{discover_catalogue_items, prepare_batch, PreparedItem};
pub use runner::{OrderWorkflow, WorkflowRequest};
pub use types::{ItemOutcome, WorkflowError, WorkflowReport};
