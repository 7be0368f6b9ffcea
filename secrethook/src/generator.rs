//! Secret value generators

use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use secrethook_core::{GenerationResult, HookError, Result};
use serde_json::{Map, Value};
use tokio::process::Command;
use tracing::{debug, error, info};

/// Produces the secret on `create` and tidies up on `delete`
#[async_trait]
pub trait SecretGenerator: Send + Sync {
    /// Produce the value to store and the outputs returned to the caller
    async fn generate(&self) -> Result<GenerationResult>;

    /// Post-deletion housekeeping
    async fn cleanup(&self) -> Result<()>;
}

/// Random alphanumeric password
#[derive(Debug, Clone)]
pub struct RandomPasswordGenerator {
    length: usize,
}

impl RandomPasswordGenerator {
    pub const DEFAULT_LENGTH: usize = 32;

    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomPasswordGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LENGTH)
    }
}

#[async_trait]
impl SecretGenerator for RandomPasswordGenerator {
    async fn generate(&self) -> Result<GenerationResult> {
        let value: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();

        let mut outputs = Map::new();
        outputs.insert("length".to_string(), Value::from(self.length));
        outputs.insert("generated_at".to_string(), Value::from(Utc::now().to_rfc3339()));

        debug!(length = self.length, "Generated random password");
        Ok(GenerationResult::new(value, outputs))
    }

    async fn cleanup(&self) -> Result<()> {
        Ok(())
    }
}

/// Runs external programs to generate and clean up the secret.
///
/// The generate program must print `{"value": "...", "outputs": {...}}` on
/// stdout. Command lines are split on whitespace; no shell is involved.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    generate: Vec<String>,
    cleanup: Option<Vec<String>>,
}

impl CommandGenerator {
    pub fn new(generate: &str, cleanup: Option<&str>) -> Result<Self> {
        let generate = split_command(generate)
            .ok_or_else(|| HookError::Config("generate command must not be empty".to_string()))?;
        let cleanup = match cleanup {
            Some(line) => Some(split_command(line).ok_or_else(|| {
                HookError::Config("cleanup command must not be empty".to_string())
            })?),
            None => None,
        };
        Ok(Self { generate, cleanup })
    }
}

fn split_command(line: &str) -> Option<Vec<String>> {
    let parts: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts)
    }
}

/// Run a command line to completion; `Err` carries a printable reason.
async fn run(command: &[String]) -> std::result::Result<Vec<u8>, String> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| "empty command".to_string())?;

    debug!(program = %program, "Running command");
    let output = Command::new(program)
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| format!("failed to run {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!(program = %program, status = %output.status, stderr = %stderr.trim(), "Command failed");
        return Err(format!("{} exited with {}", program, output.status));
    }

    Ok(output.stdout)
}

#[async_trait]
impl SecretGenerator for CommandGenerator {
    async fn generate(&self) -> Result<GenerationResult> {
        let stdout = run(&self.generate).await.map_err(HookError::Generator)?;
        let result: GenerationResult = serde_json::from_slice(&stdout)
            .map_err(|e| HookError::Generator(format!("invalid generator output: {}", e)))?;

        info!(outputs = result.outputs.len(), "Generator finished");
        Ok(result)
    }

    async fn cleanup(&self) -> Result<()> {
        let Some(command) = &self.cleanup else {
            return Ok(());
        };
        run(command).await.map_err(HookError::Cleanup)?;
        info!("Cleanup finished");
        Ok(())
    }
}
