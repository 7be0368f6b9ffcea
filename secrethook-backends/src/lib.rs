//! Secret storage backends for secrethook
//!
//! Two interchangeable backends sit behind the [`SecretStore`] trait:
//! - AWS Systems Manager Parameter Store (`PutParameter` / `DeleteParameter`)
//! - AWS Secrets Manager (`PutSecretValue` / `DeleteSecret`)
//!
//! [`SecretClient`] picks one of them once, at construction time.

mod client;
mod parameter_store;
mod secrets_manager;
mod traits;

pub use client::SecretClient;
pub use parameter_store::ParameterStoreBackend;
pub use secrets_manager::SecretsManagerBackend;
pub use traits::{BackendResponse, SecretStore};
