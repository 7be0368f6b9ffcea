//! Secrets Manager backend

use async_trait::async_trait;
use aws_sdk_secretsmanager::Client;
use aws_types::SdkConfig;
use secrethook_core::{BackendKind, Result};
use tracing::info;

use crate::traits::{report_failure, BackendResponse, SecretStore};

/// Stores the secret as a new version of an existing managed secret.
///
/// Deletion follows the secret's recovery window; nothing is force-deleted.
#[derive(Debug, Clone)]
pub struct SecretsManagerBackend {
    client: Client,
}

impl SecretsManagerBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl SecretStore for SecretsManagerBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::SecretsManager
    }

    async fn store(&self, name: &str, value: &str) -> Result<BackendResponse> {
        let output = self
            .client
            .put_secret_value()
            .secret_id(name)
            .secret_string(value)
            .send()
            .await
            .map_err(|e| report_failure(self.kind(), "PutSecretValue", name, e))?;

        info!(
            backend = %self.kind(),
            parameter = %name,
            arn = output.arn().unwrap_or_default(),
            version_id = output.version_id().unwrap_or_default(),
            "Secret created"
        );
        Ok(BackendResponse::PutSecretValue(output))
    }

    async fn remove(&self, name: &str) -> Result<BackendResponse> {
        let output = self
            .client
            .delete_secret()
            .secret_id(name)
            .send()
            .await
            .map_err(|e| report_failure(self.kind(), "DeleteSecret", name, e))?;

        info!(
            backend = %self.kind(),
            parameter = %name,
            arn = output.arn().unwrap_or_default(),
            deletion_date = ?output.deletion_date(),
            "Secret deleted"
        );
        Ok(BackendResponse::DeleteSecret(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrethook_core::HookError;
    use secrethook_test::{sdk_config, Emulator};

    #[tokio::test]
    async fn test_store_adds_current_version() {
        let emulator = Emulator::start().await.unwrap();
        emulator.state().create_secret("db-pass", Some("initial"));
        let backend = SecretsManagerBackend::from_conf(&sdk_config(&emulator.endpoint()).await);

        let response = backend.store("db-pass", "s3cr3t").await.unwrap();

        match response {
            BackendResponse::PutSecretValue(output) => {
                assert_eq!(output.name(), Some("db-pass"));
                assert!(output.version_id().is_some());
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let requests = emulator.state().requests_for("secretsmanager.PutSecretValue");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["SecretId"], "db-pass");
        assert_eq!(requests[0]["SecretString"], "s3cr3t");

        let secret = emulator.state().secret("db-pass").unwrap();
        assert_eq!(secret.current_value(), Some("s3cr3t"));
        assert_eq!(secret.versions.len(), 2);
    }

    #[tokio::test]
    async fn test_store_without_existing_secret_fails() {
        let emulator = Emulator::start().await.unwrap();
        let backend = SecretsManagerBackend::from_conf(&sdk_config(&emulator.endpoint()).await);

        let err = backend.store("db-pass", "s3cr3t").await.unwrap_err();

        assert!(matches!(
            err,
            HookError::Backend {
                backend: BackendKind::SecretsManager,
                operation: "PutSecretValue",
                ..
            }
        ));
        assert_eq!(err.code(), Some("ResourceNotFoundException"));
    }

    #[tokio::test]
    async fn test_remove_schedules_deletion() {
        let emulator = Emulator::start().await.unwrap();
        emulator.state().create_secret("db-pass", Some("s3cr3t"));
        let backend = SecretsManagerBackend::from_conf(&sdk_config(&emulator.endpoint()).await);

        let response = backend.remove("db-pass").await.unwrap();

        match response {
            BackendResponse::DeleteSecret(output) => {
                assert_eq!(output.name(), Some("db-pass"));
                assert!(output.deletion_date().is_some());
            }
            other => panic!("unexpected response: {:?}", other),
        }

        let requests = emulator.state().requests_for("secretsmanager.DeleteSecret");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["SecretId"], "db-pass");
        assert!(requests[0].get("ForceDeleteWithoutRecovery").is_none());
        assert!(emulator.state().secret("db-pass").unwrap().deleted_date.is_some());
    }
}
