//! stratus-core: commercial satellite imagery order workflow.
//!
//! Submits orders to imagery vendors, waits for the delivered data to
//! land in object storage, materializes it into a workspace, and keeps
//! the STAC catalog record of each order's lifecycle.

pub mod config;
pub mod credentials;
pub mod materializer;
pub mod notify;
pub mod orchestrator;
pub mod poller;
pub mod stac;
pub mod storage;
pub mod store;
pub mod testing;
pub mod vendor;

pub use config::{load_config, validate_config, Config, ConfigError};
pub use orchestrator::{OrderWorkflow, WorkflowReport, WorkflowRequest};
