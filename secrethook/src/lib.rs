//! secrethook - lifecycle hook for a single managed secret
//!
//! Invoked with `{"tf": {"action": "create" | "delete"}}`:
//! - `create` generates a value, stores it and returns the generator's outputs
//! - `delete` removes the stored value and runs the generator's cleanup
//!
//! The secret lives in AWS Systems Manager Parameter Store or, when
//! `USE_SECRETS_MANAGER` is `true`/`1`, in AWS Secrets Manager.

pub mod config;
pub mod generator;
pub mod handler;

pub use config::HookConfig;
pub use generator::{CommandGenerator, RandomPasswordGenerator, SecretGenerator};
pub use handler::LifecycleHandler;
