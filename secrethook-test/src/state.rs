//! In-memory backend state for the emulator

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

use crate::TEST_REGION;

const DEFAULT_RECOVERY_WINDOW_DAYS: i64 = 30;

/// A Parameter Store parameter
#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub value: String,
    /// `String`, `StringList` or `SecureString`
    pub parameter_type: String,
    pub version: i64,
    pub last_modified: DateTime<Utc>,
}

/// A Secrets Manager secret with its versions
#[derive(Debug, Clone)]
pub struct Secret {
    pub arn: String,
    pub name: String,
    /// Secret versions (version_id -> SecretVersion)
    pub versions: HashMap<String, SecretVersion>,
    /// Version carrying the AWSCURRENT stage
    pub current_version_id: Option<String>,
    pub created_date: DateTime<Utc>,
    pub last_changed_date: DateTime<Utc>,
    /// Set once the secret is scheduled for deletion
    pub deleted_date: Option<DateTime<Utc>>,
}

impl Secret {
    /// The AWSCURRENT string value
    pub fn current_value(&self) -> Option<&str> {
        self.current_version_id
            .as_ref()
            .and_then(|id| self.versions.get(id))
            .and_then(|v| v.secret_string.as_deref())
    }

    /// Older versions keep their value but lose every staging label
    fn add_current_version(
        &mut self,
        secret_string: Option<String>,
        now: DateTime<Utc>,
    ) -> SecretVersion {
        for version in self.versions.values_mut() {
            version.version_stages.clear();
        }

        let version = SecretVersion {
            version_id: Uuid::new_v4().to_string(),
            secret_string,
            created_date: now,
            version_stages: vec!["AWSCURRENT".to_string()],
        };
        self.versions.insert(version.version_id.clone(), version.clone());
        self.current_version_id = Some(version.version_id.clone());
        self.last_changed_date = now;
        version
    }
}

#[derive(Debug, Clone)]
pub struct SecretVersion {
    pub version_id: String,
    pub secret_string: Option<String>,
    pub created_date: DateTime<Utc>,
    pub version_stages: Vec<String>,
}

/// A request received by the emulator
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// The `X-Amz-Target` header, e.g. `AmazonSSM.PutParameter`
    pub target: String,
    /// Parsed JSON body (`Null` when the body was not JSON)
    pub body: Value,
}

/// Shared state behind the emulator router
#[derive(Debug, Default)]
pub struct EmulatorState {
    parameters: DashMap<String, Parameter>,
    secrets: DashMap<String, Secret>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl EmulatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, target: &str, body: Value) {
        self.requests.lock().push(RecordedRequest {
            target: target.to_string(),
            body,
        });
    }

    /// All requests in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Bodies of the requests sent to one operation, in arrival order
    pub fn requests_for(&self, target: &str) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.target == target)
            .map(|r| r.body.clone())
            .collect()
    }

    pub fn parameter(&self, name: &str) -> Option<Parameter> {
        self.parameters.get(name).map(|p| p.clone())
    }

    pub fn secret(&self, name: &str) -> Option<Secret> {
        self.secrets.get(name).map(|s| s.clone())
    }

    /// Seed a secret, as the provisioning tool would before invoking the hook.
    ///
    /// An existing secret of the same name is replaced.
    pub fn create_secret(&self, name: &str, secret_string: Option<&str>) -> Secret {
        let now = Utc::now();
        let mut secret = Secret {
            arn: format!(
                "arn:aws:secretsmanager:{}:000000000000:secret:{}-{}",
                TEST_REGION,
                name,
                &Uuid::new_v4().simple().to_string()[..6]
            ),
            name: name.to_string(),
            versions: HashMap::new(),
            current_version_id: None,
            created_date: now,
            last_changed_date: now,
            deleted_date: None,
        };
        if let Some(value) = secret_string {
            secret.add_current_version(Some(value.to_string()), now);
        }

        self.secrets.insert(name.to_string(), secret.clone());
        secret
    }

    /// Returns the new parameter version
    pub(crate) fn put_parameter(
        &self,
        name: &str,
        value: String,
        parameter_type: Option<String>,
        overwrite: bool,
    ) -> Result<i64, EmulatorError> {
        if name.is_empty() {
            return Err(EmulatorError::Validation("Parameter name must not be empty".to_string()));
        }

        let now = Utc::now();
        match self.parameters.entry(name.to_string()) {
            Entry::Occupied(mut existing) => {
                if !overwrite {
                    return Err(EmulatorError::ParameterAlreadyExists(name.to_string()));
                }
                let parameter = existing.get_mut();
                parameter.value = value;
                if let Some(parameter_type) = parameter_type {
                    parameter.parameter_type = parameter_type;
                }
                parameter.version += 1;
                parameter.last_modified = now;
                Ok(parameter.version)
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Parameter {
                    name: name.to_string(),
                    value,
                    parameter_type: parameter_type.unwrap_or_else(|| "String".to_string()),
                    version: 1,
                    last_modified: now,
                });
                Ok(1)
            }
        }
    }

    pub(crate) fn delete_parameter(&self, name: &str) -> Result<Parameter, EmulatorError> {
        self.parameters
            .remove(name)
            .map(|(_, p)| p)
            .ok_or_else(|| EmulatorError::ParameterNotFound(name.to_string()))
    }

    /// Store a new AWSCURRENT version of an existing secret
    pub(crate) fn put_secret_value(
        &self,
        secret_id: &str,
        secret_string: Option<String>,
    ) -> Result<(Secret, SecretVersion), EmulatorError> {
        let mut entry = self
            .secrets
            .get_mut(secret_id)
            .ok_or_else(|| EmulatorError::ResourceNotFound(secret_id.to_string()))?;
        let secret = entry.value_mut();

        if secret.deleted_date.is_some() {
            return Err(EmulatorError::InvalidRequest(format!(
                "Secret {} is scheduled for deletion",
                secret_id
            )));
        }

        let version = secret.add_current_version(secret_string, Utc::now());
        Ok((secret.clone(), version))
    }

    pub(crate) fn delete_secret(
        &self,
        secret_id: &str,
        force_delete: bool,
        recovery_window_in_days: Option<i64>,
    ) -> Result<Secret, EmulatorError> {
        if force_delete {
            let (_, mut secret) = self
                .secrets
                .remove(secret_id)
                .ok_or_else(|| EmulatorError::ResourceNotFound(secret_id.to_string()))?;
            secret.deleted_date = Some(Utc::now());
            return Ok(secret);
        }

        let mut secret = self
            .secrets
            .get_mut(secret_id)
            .ok_or_else(|| EmulatorError::ResourceNotFound(secret_id.to_string()))?;
        if secret.deleted_date.is_none() {
            let days = recovery_window_in_days.unwrap_or(DEFAULT_RECOVERY_WINDOW_DAYS);
            secret.deleted_date = Some(Utc::now() + Duration::days(days));
        }
        Ok(secret.clone())
    }
}

/// Errors returned to SDK clients, named after the AWS error codes
#[derive(Debug)]
pub(crate) enum EmulatorError {
    ParameterAlreadyExists(String),
    ParameterNotFound(String),
    ResourceNotFound(String),
    InvalidRequest(String),
    Validation(String),
    UnknownOperation(String),
}

impl EmulatorError {
    pub(crate) fn error_type(&self) -> &'static str {
        match self {
            Self::ParameterAlreadyExists(_) => "ParameterAlreadyExists",
            Self::ParameterNotFound(_) => "ParameterNotFound",
            Self::ResourceNotFound(_) => "ResourceNotFoundException",
            Self::InvalidRequest(_) => "InvalidRequestException",
            Self::Validation(_) => "ValidationException",
            Self::UnknownOperation(_) => "UnknownOperationException",
        }
    }
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParameterAlreadyExists(name) => {
                write!(f, "The parameter {} already exists.", name)
            }
            Self::ParameterNotFound(name) => write!(f, "Parameter {} not found.", name),
            Self::ResourceNotFound(name) => {
                write!(f, "Secrets Manager can't find the specified secret: {}", name)
            }
            Self::InvalidRequest(msg) | Self::Validation(msg) => f.write_str(msg),
            Self::UnknownOperation(target) => write!(f, "Unknown operation: {:?}", target),
        }
    }
}
