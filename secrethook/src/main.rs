//! secrethook Lambda entry point
//!
//! Per invocation: for a `create` or `delete` event, read `PARAMETER_NAME` /
//! `USE_SECRETS_MANAGER`, build a backend client and run that branch.

use aws_config::BehaviorVersion;
use clap::{Parser, ValueEnum};
use lambda_runtime::{service_fn, LambdaEvent};
use secrethook::{
    CommandGenerator, HookConfig, LifecycleHandler, RandomPasswordGenerator, SecretGenerator,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, Instrument};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum GeneratorKind {
    /// Random alphanumeric password
    Random,
    /// External generate/cleanup programs
    Command,
}

#[derive(Parser, Debug)]
#[command(name = "secrethook")]
#[command(about = "Stores a generated secret in Parameter Store or Secrets Manager", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "SECRETHOOK_LOG_LEVEL")]
    log_level: String,

    /// How secret values are generated
    #[arg(long, value_enum, default_value = "random", env = "SECRETHOOK_GENERATOR")]
    generator: GeneratorKind,

    /// Length of generated passwords
    #[arg(long, default_value = "32", env = "SECRETHOOK_PASSWORD_LENGTH")]
    password_length: usize,

    /// Program printing `{"value": ..., "outputs": {...}}` (command generator)
    #[arg(long, env = "SECRETHOOK_GENERATE_COMMAND")]
    generate_command: Option<String>,

    /// Program run after the secret is deleted (command generator)
    #[arg(long, env = "SECRETHOOK_CLEANUP_COMMAND")]
    cleanup_command: Option<String>,

    /// Override the AWS endpoint, e.g. for a local emulator
    #[arg(long, env = "SECRETHOOK_ENDPOINT_URL")]
    endpoint_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize tracing; CloudWatch stamps each line itself
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "secrethook={level},secrethook_backends={level}",
                    level = args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_ansi(false).without_time())
        .init();

    let generator: Arc<dyn SecretGenerator> = match args.generator {
        GeneratorKind::Random => Arc::new(RandomPasswordGenerator::new(args.password_length)),
        GeneratorKind::Command => {
            let generate = args.generate_command.as_deref().ok_or_else(|| {
                anyhow::anyhow!("SECRETHOOK_GENERATE_COMMAND is required for the command generator")
            })?;
            Arc::new(CommandGenerator::new(generate, args.cleanup_command.as_deref())?)
        }
    };

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(endpoint) = &args.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }
    let sdk_config = loader.load().await;

    info!(generator = ?args.generator, "Starting secrethook");

    let handler = Arc::new(LifecycleHandler::new(sdk_config, generator));
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = handler.clone();
        async move { handle_event(&handler, event).await }
    }))
    .await
    .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

async fn handle_event(
    handler: &LifecycleHandler,
    event: LambdaEvent<Value>,
) -> Result<Value, lambda_runtime::Error> {
    let (payload, context) = event.into_parts();
    let span = tracing::info_span!("invocation", request_id = %context.request_id);

    handler
        .handle_payload(&payload, HookConfig::load)
        .instrument(span)
        .await
        .map_err(Into::into)
}
