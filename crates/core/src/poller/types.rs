//! Poll specification types.

use std::time::Duration;

use crate::storage::ObjectHandle;

/// Default listing interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Default overall deadline: one day.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(86_400);

/// What counts as delivered data under the polled prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchRule {
    /// Key ends with the given suffix (e.g. `.tar.gz`).
    Suffix(String),
    /// Final path segment equals the given name (e.g. `manifest.json`).
    FileName(String),
    /// Any object under the prefix.
    Any,
}

impl MatchRule {
    pub fn matches(&self, object: &ObjectHandle) -> bool {
        match self {
            MatchRule::Suffix(suffix) => object.key.ends_with(suffix),
            MatchRule::FileName(name) => object.file_name() == name,
            MatchRule::Any => true,
        }
    }
}

/// One polling assignment.
#[derive(Debug, Clone)]
pub struct PollSpec {
    pub bucket: String,
    pub prefix: String,
    pub rule: MatchRule,
    pub interval: Duration,
    pub timeout: Duration,
    /// Extra wait after the first match before the final listing, so
    /// sibling files of the same delivery batch are picked up together.
    pub settle: Option<Duration>,
}

impl PollSpec {
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>, rule: MatchRule) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            rule,
            interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_POLL_TIMEOUT,
            settle: None,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_settle(mut self, settle: Duration) -> Self {
        self.settle = Some(settle);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_rule() {
        let rule = MatchRule::Suffix(".tar.gz".to_string());
        assert!(rule.matches(&ObjectHandle::new("b", "orders/ORD-1/scene.tar.gz", 1)));
        assert!(!rule.matches(&ObjectHandle::new("b", "orders/ORD-1/scene.zip", 1)));
    }

    #[test]
    fn test_file_name_rule() {
        let rule = MatchRule::FileName("manifest.json".to_string());
        assert!(rule.matches(&ObjectHandle::new("b", "planet/ORD-1/manifest.json", 1)));
        assert!(!rule.matches(&ObjectHandle::new("b", "planet/ORD-1/manifest.json.bak", 1)));
        assert!(!rule.matches(&ObjectHandle::new("b", "planet/ORD-1/other.json", 1)));
    }

    #[test]
    fn test_any_rule() {
        assert!(MatchRule::Any.matches(&ObjectHandle::new("b", "whatever", 0)));
    }
}
