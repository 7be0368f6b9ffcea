//! Emulator server management

use aws_config::BehaviorVersion;
use aws_sdk_ssm::config::{Credentials, Region};
use aws_types::SdkConfig;
use axum::{routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::handle_request;
use crate::state::EmulatorState;
use crate::TEST_REGION;

/// A running in-process backend emulator
///
/// The server task is aborted when the emulator is dropped.
pub struct Emulator {
    addr: SocketAddr,
    state: Arc<EmulatorState>,
    handle: JoinHandle<()>,
}

impl Emulator {
    /// Start a new emulator on a random local port
    pub async fn start() -> Result<Self, TestError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| TestError::StartFailed(e.to_string()))?;
        let addr = listener
            .local_addr()
            .map_err(|e| TestError::StartFailed(e.to_string()))?;

        let state = Arc::new(EmulatorState::new());
        let router = Router::new()
            .route("/", post(handle_request))
            .layer(TraceLayer::new_for_http())
            .with_state(state.clone());

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        info!(port = addr.port(), "Emulator ready");
        Ok(Self {
            addr,
            state,
            handle,
        })
    }

    /// Base URL to use as the SDK endpoint
    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn state(&self) -> &EmulatorState {
        &self.state
    }
}

impl Drop for Emulator {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Errors that can occur starting the emulator
#[derive(Debug)]
pub enum TestError {
    StartFailed(String),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::StartFailed(msg) => write!(f, "Failed to start emulator: {}", msg),
        }
    }
}

impl std::error::Error for TestError {}

/// Shared SDK configuration pointing at `endpoint` with static test credentials
pub async fn sdk_config(endpoint: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(endpoint)
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .region(Region::new(TEST_REGION))
        .load()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emulator_serves_parameter_store() {
        let emulator = Emulator::start().await.unwrap();
        let client = aws_sdk_ssm::Client::new(&sdk_config(&emulator.endpoint()).await);

        let output = client
            .put_parameter()
            .name("db-pass")
            .value("s3cr3t")
            .r#type(aws_sdk_ssm::types::ParameterType::SecureString)
            .send()
            .await
            .unwrap();
        assert_eq!(output.version(), 1);

        let requests = emulator.state().requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].target, "AmazonSSM.PutParameter");
        assert_eq!(
            emulator.state().parameter("db-pass").unwrap().parameter_type,
            "SecureString"
        );
    }

    #[tokio::test]
    async fn test_unknown_operation_is_rejected() {
        let emulator = Emulator::start().await.unwrap();
        let client = aws_sdk_ssm::Client::new(&sdk_config(&emulator.endpoint()).await);

        let err = client
            .get_parameter()
            .name("db-pass")
            .send()
            .await
            .unwrap_err();

        assert_eq!(
            aws_sdk_ssm::error::ProvideErrorMetadata::code(&err),
            Some("UnknownOperationException")
        );
        assert_eq!(emulator.state().requests()[0].target, "AmazonSSM.GetParameter");
    }

    #[tokio::test]
    async fn test_emulator_reports_missing_parameter() {
        let emulator = Emulator::start().await.unwrap();
        let client = aws_sdk_ssm::Client::new(&sdk_config(&emulator.endpoint()).await);

        let err = client
            .delete_parameter()
            .name("missing")
            .send()
            .await
            .unwrap_err();

        assert!(err.into_service_error().is_parameter_not_found());
    }
}
