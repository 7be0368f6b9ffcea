//! Test utilities for secrethook
//!
//! Provides an in-process emulator of the two secret backends so the real AWS
//! SDK clients can be exercised without network access:
//! - Parameter Store: PutParameter, DeleteParameter
//! - Secrets Manager: PutSecretValue, DeleteSecret (secrets are seeded through
//!   [`EmulatorState::create_secret`])
//!
//! ## Usage
//!
//! ```rust,no_run
//! use secrethook_test::{sdk_config, Emulator};
//!
//! #[tokio::test]
//! async fn test_parameter_store() {
//!     let emulator = Emulator::start().await.unwrap();
//!     let config = sdk_config(&emulator.endpoint()).await;
//!
//!     // Build SDK clients from `config`, then inspect what they sent
//!     let requests = emulator.state().requests_for("AmazonSSM.PutParameter");
//! }
//! ```

mod handlers;
pub mod server;
mod state;

pub use server::{sdk_config, Emulator, TestError};
pub use state::{EmulatorState, Parameter, RecordedRequest, Secret, SecretVersion};

/// Region used by [`sdk_config`]
pub const TEST_REGION: &str = "us-east-1";
