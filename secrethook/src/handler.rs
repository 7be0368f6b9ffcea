//! Lifecycle event handling

use aws_types::SdkConfig;
use secrethook_backends::{SecretClient, SecretStore};
use secrethook_core::{Action, LifecycleEvent, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::HookConfig;
use crate::generator::SecretGenerator;

/// Turns one lifecycle event into backend and generator calls
pub struct LifecycleHandler {
    sdk_config: SdkConfig,
    generator: Arc<dyn SecretGenerator>,
}

impl LifecycleHandler {
    pub fn new(sdk_config: SdkConfig, generator: Arc<dyn SecretGenerator>) -> Self {
        Self {
            sdk_config,
            generator,
        }
    }

    /// Handle one invocation payload.
    ///
    /// A fresh backend client is built for every call.
    pub async fn invoke(&self, config: &HookConfig, payload: &Value) -> Result<Option<Value>> {
        let event = LifecycleEvent::from_value(payload);
        self.run(config, &event).await
    }

    /// Handle one runtime payload, loading the configuration only when the
    /// action needs a backend. Nothing to return is sent as JSON `null`.
    pub async fn handle_payload<F>(&self, payload: &Value, load_config: F) -> Result<Value>
    where
        F: FnOnce() -> Result<HookConfig>,
    {
        let event = LifecycleEvent::from_value(payload);
        if event.action().is_none() {
            warn!(action = ?event.action, "Unsupported lifecycle action, nothing to do");
            return Ok(Value::Null);
        }

        let config = load_config()?;
        let outputs = self.run(&config, &event).await?;
        Ok(outputs.unwrap_or(Value::Null))
    }

    async fn run(&self, config: &HookConfig, event: &LifecycleEvent) -> Result<Option<Value>> {
        let store = SecretClient::new(config.use_secrets_manager, &self.sdk_config);
        dispatch(&store, self.generator.as_ref(), &config.parameter_name, event).await
    }
}

/// Run the branch selected by the event's action.
///
/// `create` returns the generator's outputs; `delete` and unmatched actions
/// return `None`. Calls within a branch are strictly sequential and the first
/// failure aborts the rest of the branch.
pub async fn dispatch(
    store: &dyn SecretStore,
    generator: &dyn SecretGenerator,
    name: &str,
    event: &LifecycleEvent,
) -> Result<Option<Value>> {
    match event.action() {
        Some(Action::Delete) => {
            info!(action = "delete", parameter = %name, backend = %store.kind(), "Handling lifecycle event");
            store.remove(name).await?;
            generator.cleanup().await?;
            Ok(None)
        }
        Some(Action::Create) => {
            info!(action = "create", parameter = %name, backend = %store.kind(), "Handling lifecycle event");
            let generated = generator.generate().await?;
            store.store(name, &generated.value).await?;
            Ok(Some(Value::Object(generated.outputs)))
        }
        None => {
            warn!(action = ?event.action, "Unsupported lifecycle action, nothing to do");
            Ok(None)
        }
    }
}
