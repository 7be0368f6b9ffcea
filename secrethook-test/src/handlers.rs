//! AWS JSON 1.1 handlers for the emulated Parameter Store and Secrets Manager

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::state::{EmulatorError, EmulatorState};

const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Dispatch on the X-Amz-Target header
pub(crate) async fn handle_request(
    State(state): State<Arc<EmulatorState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let target = headers
        .get("x-amz-target")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    debug!(target = %target, "Emulator request");
    state.record(&target, serde_json::from_slice(&body).unwrap_or(Value::Null));

    let result = match target.as_str() {
        "AmazonSSM.PutParameter" => put_parameter(&state, &body),
        "AmazonSSM.DeleteParameter" => delete_parameter(&state, &body),
        "secretsmanager.PutSecretValue" => put_secret_value(&state, &body),
        "secretsmanager.DeleteSecret" => delete_secret(&state, &body),
        _ => {
            warn!(target = %target, "Unknown operation");
            Err(EmulatorError::UnknownOperation(target.clone()))
        }
    };
    result.unwrap_or_else(IntoResponse::into_response)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PutParameterRequest {
    name: String,
    value: String,
    #[serde(rename = "Type")]
    parameter_type: Option<String>,
    #[serde(default)]
    overwrite: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PutParameterResponse {
    version: i64,
    tier: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteParameterRequest {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PutSecretValueRequest {
    secret_id: String,
    secret_string: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct PutSecretValueResponse {
    #[serde(rename = "ARN")]
    arn: String,
    name: String,
    version_id: String,
    version_stages: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteSecretRequest {
    secret_id: String,
    #[serde(default)]
    force_delete_without_recovery: bool,
    recovery_window_in_days: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DeleteSecretResponse {
    #[serde(rename = "ARN")]
    arn: String,
    name: String,
    /// Epoch seconds
    deletion_date: Option<i64>,
}

fn put_parameter(state: &EmulatorState, body: &[u8]) -> Result<Response, EmulatorError> {
    let req: PutParameterRequest = parse(body)?;
    let version = state.put_parameter(&req.name, req.value, req.parameter_type, req.overwrite)?;
    Ok(json_response(&PutParameterResponse {
        version,
        tier: "Standard",
    }))
}

fn delete_parameter(state: &EmulatorState, body: &[u8]) -> Result<Response, EmulatorError> {
    let req: DeleteParameterRequest = parse(body)?;
    state.delete_parameter(&req.name)?;
    Ok(json_response(&serde_json::json!({})))
}

fn put_secret_value(state: &EmulatorState, body: &[u8]) -> Result<Response, EmulatorError> {
    let req: PutSecretValueRequest = parse(body)?;
    let (secret, version) = state.put_secret_value(&req.secret_id, req.secret_string)?;
    Ok(json_response(&PutSecretValueResponse {
        arn: secret.arn,
        name: secret.name,
        version_id: version.version_id,
        version_stages: version.version_stages,
    }))
}

fn delete_secret(state: &EmulatorState, body: &[u8]) -> Result<Response, EmulatorError> {
    let req: DeleteSecretRequest = parse(body)?;
    let secret = state.delete_secret(
        &req.secret_id,
        req.force_delete_without_recovery,
        req.recovery_window_in_days,
    )?;
    Ok(json_response(&DeleteSecretResponse {
        arn: secret.arn,
        name: secret.name,
        deletion_date: secret.deleted_date.map(|d| d.timestamp()),
    }))
}

fn parse<T: DeserializeOwned>(body: &[u8]) -> Result<T, EmulatorError> {
    serde_json::from_slice(body).map_err(|e| EmulatorError::Validation(e.to_string()))
}

fn json_response<T: Serialize>(body: &T) -> Response {
    let body = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    ([(header::CONTENT_TYPE, AMZ_JSON)], body).into_response()
}

impl IntoResponse for EmulatorError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "__type": self.error_type(),
            "message": self.to_string(),
        });
        (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, AMZ_JSON)],
            body.to_string(),
        )
            .into_response()
    }
}
