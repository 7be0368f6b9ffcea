//! Backend selection

use async_trait::async_trait;
use aws_types::SdkConfig;
use secrethook_core::{BackendKind, Result};
use tracing::debug;

use crate::parameter_store::ParameterStoreBackend;
use crate::secrets_manager::SecretsManagerBackend;
use crate::traits::{BackendResponse, SecretStore};

/// Holds exactly one backend, chosen once at construction.
pub struct SecretClient {
    backend: Box<dyn SecretStore>,
}

impl SecretClient {
    /// Secrets Manager when `use_secrets_manager` is set, Parameter Store otherwise
    pub fn new(use_secrets_manager: bool, config: &SdkConfig) -> Self {
        let backend: Box<dyn SecretStore> = match BackendKind::from_flag(use_secrets_manager) {
            BackendKind::SecretsManager => Box::new(SecretsManagerBackend::from_conf(config)),
            BackendKind::ParameterStore => Box::new(ParameterStoreBackend::from_conf(config)),
        };
        debug!(backend = %backend.kind(), "Selected secret backend");
        Self { backend }
    }
}

#[async_trait]
impl SecretStore for SecretClient {
    fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    async fn store(&self, name: &str, value: &str) -> Result<BackendResponse> {
        self.backend.store(name, value).await
    }

    async fn remove(&self, name: &str) -> Result<BackendResponse> {
        self.backend.remove(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrethook_test::{sdk_config, Emulator};

    #[tokio::test]
    async fn test_flag_selects_secrets_manager() {
        let emulator = Emulator::start().await.unwrap();
        emulator.state().create_secret("db-pass", None);
        let config = sdk_config(&emulator.endpoint()).await;

        let client = SecretClient::new(true, &config);
        assert_eq!(client.kind(), BackendKind::SecretsManager);

        client.store("db-pass", "s3cr3t").await.unwrap();
        assert_eq!(emulator.state().requests_for("secretsmanager.PutSecretValue").len(), 1);
        assert!(emulator.state().requests_for("AmazonSSM.PutParameter").is_empty());
    }

    #[tokio::test]
    async fn test_flag_unset_selects_parameter_store() {
        let emulator = Emulator::start().await.unwrap();
        let config = sdk_config(&emulator.endpoint()).await;

        let client = SecretClient::new(false, &config);
        assert_eq!(client.kind(), BackendKind::ParameterStore);

        client.remove("db-pass").await.unwrap_err();
        assert_eq!(emulator.state().requests_for("AmazonSSM.DeleteParameter").len(), 1);
        assert!(emulator.state().requests_for("secretsmanager.DeleteSecret").is_empty());
    }
}
