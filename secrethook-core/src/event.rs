//! Lifecycle event and generation result models

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Lifecycle action requested by the provisioning tool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Delete,
}

impl Action {
    /// Parse an action. Matching is exact and case-sensitive.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "delete" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Inbound invocation event
///
/// Only `tf.action` is read. The raw action text is kept so unmatched values
/// can be reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub action: Option<String>,
}

impl LifecycleEvent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
        }
    }

    /// Read `tf.action` from an arbitrary JSON payload.
    ///
    /// A missing `tf`, a non-object `tf`, a missing or `null` action and a
    /// non-string action all yield an event without an action.
    pub fn from_value(payload: &Value) -> Self {
        let action = payload
            .get("tf")
            .and_then(|tf| tf.get("action"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Self { action }
    }

    /// The recognised action, if any
    pub fn action(&self) -> Option<Action> {
        self.action.as_deref().and_then(Action::from_str)
    }
}

/// Value produced by a generator for a `create` action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    /// The secret to store
    pub value: String,
    /// Auxiliary data returned to the caller unchanged. Missing or `null`
    /// means no outputs.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub outputs: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Map<String, Value>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

impl GenerationResult {
    pub fn new(value: impl Into<String>, outputs: Map<String, Value>) -> Self {
        Self {
            value: value.into(),
            outputs,
        }
    }
}
