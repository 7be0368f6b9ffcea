//! Backend trait and response type

use async_trait::async_trait;
use aws_sdk_secretsmanager::operation::{
    delete_secret::DeleteSecretOutput, put_secret_value::PutSecretValueOutput,
};
use aws_sdk_ssm::operation::{
    delete_parameter::DeleteParameterOutput, put_parameter::PutParameterOutput,
};
use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use secrethook_core::{BackendKind, HookError, Result};
use tracing::error;

/// Raw response of a successful backend call
#[derive(Debug, Clone, PartialEq)]
pub enum BackendResponse {
    PutParameter(PutParameterOutput),
    DeleteParameter(DeleteParameterOutput),
    PutSecretValue(PutSecretValueOutput),
    DeleteSecret(DeleteSecretOutput),
}

impl BackendResponse {
    /// Name of the API operation that produced this response
    pub fn operation(&self) -> &'static str {
        match self {
            Self::PutParameter(_) => "PutParameter",
            Self::DeleteParameter(_) => "DeleteParameter",
            Self::PutSecretValue(_) => "PutSecretValue",
            Self::DeleteSecret(_) => "DeleteSecret",
        }
    }
}

/// Uniform store/remove contract over a secret-storage service
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Which service this store writes to
    fn kind(&self) -> BackendKind;

    /// Write `value` under `name`
    async fn store(&self, name: &str, value: &str) -> Result<BackendResponse>;

    /// Delete whatever is stored under `name`
    async fn remove(&self, name: &str) -> Result<BackendResponse>;
}

/// Log a failed SDK call and wrap it, unchanged, in a [`HookError`].
pub(crate) fn report_failure<E>(
    backend: BackendKind,
    operation: &'static str,
    name: &str,
    err: E,
) -> HookError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let code = err.code().map(str::to_string);
    error!(
        backend = %backend,
        operation,
        parameter = %name,
        code = code.as_deref().unwrap_or("unknown"),
        error = %DisplayErrorContext(&err),
        "Backend call failed"
    );
    HookError::backend(backend, operation, name, code, err)
}
