//! Credential provider implementations.

use std::collections::HashMap;

use async_trait::async_trait;

use super::error::CredentialError;
use super::traits::{CredentialProvider, SecretString};

/// Reads secrets from `STRATUS_SECRET_<SCOPE>` environment variables,
/// with the scope uppercased and dashes mapped to underscores.
#[derive(Debug, Default, Clone)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    pub fn new() -> Self {
        Self
    }

    fn var_name(scope: &str) -> String {
        format!(
            "STRATUS_SECRET_{}",
            scope.to_ascii_uppercase().replace('-', "_")
        )
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn get(&self, scope: &str) -> Result<SecretString, CredentialError> {
        std::env::var(Self::var_name(scope))
            .map(SecretString::new)
            .map_err(|_| CredentialError::NotFound(scope.to_string()))
    }
}

/// Fixed scope -> secret map, for tests and local runs.
#[derive(Debug, Default, Clone)]
pub struct StaticCredentialProvider {
    secrets: HashMap<String, String>,
}

impl StaticCredentialProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_secret(mut self, scope: impl Into<String>, secret: impl Into<String>) -> Self {
        self.secrets.insert(scope.into(), secret.into());
        self
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn get(&self, scope: &str) -> Result<SecretString, CredentialError> {
        self.secrets
            .get(scope)
            .map(|s| SecretString::new(s.clone()))
            .ok_or_else(|| CredentialError::NotFound(scope.to_string()))
    }
}
