//! Systems Manager Parameter Store backend

use async_trait::async_trait;
use aws_sdk_ssm::types::ParameterType;
use aws_sdk_ssm::Client;
use aws_types::SdkConfig;
use secrethook_core::{BackendKind, Result};
use tracing::info;

use crate::traits::{report_failure, BackendResponse, SecretStore};

/// Stores the secret as a `SecureString` parameter.
///
/// Writes overwrite an existing parameter in place; deletes are immediate.
#[derive(Debug, Clone)]
pub struct ParameterStoreBackend {
    client: Client,
}

impl ParameterStoreBackend {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &SdkConfig) -> Self {
        Self::new(Client::new(config))
    }
}

#[async_trait]
impl SecretStore for ParameterStoreBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ParameterStore
    }

    async fn store(&self, name: &str, value: &str) -> Result<BackendResponse> {
        let output = self
            .client
            .put_parameter()
            .name(name)
            .value(value)
            .r#type(ParameterType::SecureString)
            .overwrite(true)
            .send()
            .await
            .map_err(|e| report_failure(self.kind(), "PutParameter", name, e))?;

        info!(
            backend = %self.kind(),
            parameter = %name,
            version = output.version(),
            tier = ?output.tier(),
            "Secret created"
        );
        Ok(BackendResponse::PutParameter(output))
    }

    async fn remove(&self, name: &str) -> Result<BackendResponse> {
        let output = self
            .client
            .delete_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| report_failure(self.kind(), "DeleteParameter", name, e))?;

        info!(backend = %self.kind(), parameter = %name, "Secret deleted");
        Ok(BackendResponse::DeleteParameter(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrethook_core::HookError;
    use secrethook_test::{sdk_config, Emulator};

    #[tokio::test]
    async fn test_store_writes_secure_string() {
        let emulator = Emulator::start().await.unwrap();
        let backend = ParameterStoreBackend::from_conf(&sdk_config(&emulator.endpoint()).await);

        let response = backend.store("db-pass", "s3cr3t").await.unwrap();
        assert_eq!(response.operation(), "PutParameter");

        let requests = emulator.state().requests_for("AmazonSSM.PutParameter");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0]["Name"], "db-pass");
        assert_eq!(requests[0]["Value"], "s3cr3t");
        assert_eq!(requests[0]["Type"], "SecureString");

        let parameter = emulator.state().parameter("db-pass").unwrap();
        assert_eq!(parameter.value, "s3cr3t");
        assert_eq!(parameter.version, 1);
    }

    #[tokio::test]
    async fn test_store_overwrites_existing_parameter() {
        let emulator = Emulator::start().await.unwrap();
        let backend = ParameterStoreBackend::from_conf(&sdk_config(&emulator.endpoint()).await);

        backend.store("db-pass", "first").await.unwrap();
        let response = backend.store("db-pass", "second").await.unwrap();

        match response {
            BackendResponse::PutParameter(output) => assert_eq!(output.version(), 2),
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(emulator.state().parameter("db-pass").unwrap().value, "second");
    }

    #[tokio::test]
    async fn test_remove_deletes_parameter() {
        let emulator = Emulator::start().await.unwrap();
        let backend = ParameterStoreBackend::from_conf(&sdk_config(&emulator.endpoint()).await);

        backend.store("db-pass", "s3cr3t").await.unwrap();
        let response = backend.remove("db-pass").await.unwrap();

        assert_eq!(response.operation(), "DeleteParameter");
        assert!(emulator.state().parameter("db-pass").is_none());
    }

    #[tokio::test]
    async fn test_remove_missing_parameter_surfaces_backend_error() {
        let emulator = Emulator::start().await.unwrap();
        let backend = ParameterStoreBackend::from_conf(&sdk_config(&emulator.endpoint()).await);

        let err = backend.remove("missing").await.unwrap_err();

        assert!(matches!(
            err,
            HookError::Backend {
                backend: BackendKind::ParameterStore,
                operation: "DeleteParameter",
                ..
            }
        ));
        assert_eq!(err.code(), Some("ParameterNotFound"));
    }
}
