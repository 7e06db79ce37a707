//! Orchestrator configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// What to do with the rest of the batch when one item fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchFailurePolicy {
    /// Record the failure and keep processing the remaining items.
    #[default]
    Continue,
    /// Stop after the failing item; remaining items are not submitted.
    Abort,
}

/// Configuration for the order workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Batch behavior when an item ends in failure.
    #[serde(default)]
    pub on_item_failure: BatchFailurePolicy,

    /// Domain under which workspace files are served; used to build
    /// asset hrefs.
    #[serde(default = "default_workspaces_domain")]
    pub workspaces_domain: String,

    /// Directory where the local record pair (item + catalog) is
    /// written at the end of each item.
    #[serde(default = "default_record_dir")]
    pub record_dir: PathBuf,
}

fn default_workspaces_domain() -> String {
    "workspaces.local".to_string()
}

fn default_record_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            on_item_failure: BatchFailurePolicy::default(),
            workspaces_domain: default_workspaces_domain(),
            record_dir: default_record_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.on_item_failure, BatchFailurePolicy::Continue);
        assert_eq!(config.workspaces_domain, "workspaces.local");
        assert_eq!(config.record_dir, PathBuf::from("."));
    }

    #[test]
    fn test_deserialize_failure_policy() {
        let toml = r#"
            on_item_failure = "abort"
            workspaces_domain = "workspaces.example.org"
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.on_item_failure, BatchFailurePolicy::Abort);
        assert_eq!(config.workspaces_domain, "workspaces.example.org");
    }

    #[test]
    fn test_deserialize_minimal() {
        let config: OrchestratorConfig = toml::from_str("").unwrap();
        assert_eq!(config.on_item_failure, BatchFailurePolicy::Continue);
    }
}
