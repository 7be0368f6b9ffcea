//! Error types and backend identifiers

use std::fmt;
use thiserror::Error;

/// Boxed error as returned by the AWS SDK clients
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, HookError>;

/// The secret-storage service a backend talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// AWS Secrets Manager
    SecretsManager,
    /// AWS Systems Manager Parameter Store
    ParameterStore,
}

impl BackendKind {
    /// Pick the backend from the `use_secrets_manager` flag
    pub fn from_flag(use_secrets_manager: bool) -> Self {
        if use_secrets_manager {
            Self::SecretsManager
        } else {
            Self::ParameterStore
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SecretsManager => "secretsmanager",
            Self::ParameterStore => "ssm",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors surfaced by a lifecycle invocation
#[derive(Debug, Error)]
pub enum HookError {
    /// A call to the secret backend failed. The SDK error is kept unchanged.
    #[error("{backend} {operation} failed for {name}: {source}")]
    Backend {
        backend: BackendKind,
        operation: &'static str,
        name: String,
        /// AWS error code, when the service returned one
        code: Option<String>,
        #[source]
        source: BoxError,
    },

    #[error("Secret generation failed: {0}")]
    Generator(String),

    #[error("Cleanup failed: {0}")]
    Cleanup(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl HookError {
    pub fn backend(
        backend: BackendKind,
        operation: &'static str,
        name: impl Into<String>,
        code: Option<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Backend {
            backend,
            operation,
            name: name.into(),
            code,
            source: source.into(),
        }
    }

    /// AWS error code of a backend failure
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_from_flag() {
        assert_eq!(BackendKind::from_flag(true), BackendKind::SecretsManager);
        assert_eq!(BackendKind::from_flag(false), BackendKind::ParameterStore);
    }

    #[test]
    fn test_backend_error_display() {
        let error = HookError::backend(
            BackendKind::ParameterStore,
            "PutParameter",
            "db-pass",
            Some("AccessDeniedException".to_string()),
            "not authorized",
        );

        assert_eq!(error.to_string(), "ssm PutParameter failed for db-pass: not authorized");
        assert_eq!(error.code(), Some("AccessDeniedException"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_non_backend_error_has_no_code() {
        let error = HookError::Generator("exit status 1".to_string());
        assert_eq!(error.code(), None);
    }
}
