//! Backend function calls from the command line.
//!
//! # Environment Variables
//!
//! - `BACKEND_URL` - Base URL of the backend deployment
//! - `BACKEND_DEPLOY_KEY` - Deployment key, used with `--deployment`

use std::sync::Arc;
use std::time::Duration;

use marketplace_gateway::backend::{
    Backend, BackendError, Credentials, HttpBackend, subscribe_query,
};
use marketplace_gateway::config::{ConfigError, GatewayConfig};
use serde_json::Value;
use thiserror::Error;

/// Errors from call commands.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid --args: {0}")]
    InvalidArgs(#[source] serde_json::Error),

    #[error("--args must be a JSON object")]
    ArgsNotObject,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("Failed to format result: {0}")]
    Format(#[source] serde_json::Error),
}

fn parse_args(raw: &str) -> Result<Value, CallError> {
    let args: Value = serde_json::from_str(raw).map_err(CallError::InvalidArgs)?;
    if args.is_object() {
        Ok(args)
    } else {
        Err(CallError::ArgsNotObject)
    }
}

fn backend() -> Result<HttpBackend, CallError> {
    let config = GatewayConfig::from_env()?;
    Ok(HttpBackend::new(&config.backend))
}

/// Run a query or mutation and print its result.
///
/// # Errors
///
/// Returns `CallError` if the arguments are invalid, the configuration is
/// incomplete, or the backend call fails.
#[allow(clippy::print_stdout)]
pub async fn call(
    function: &str,
    raw_args: &str,
    mutation: bool,
    credentials: Credentials<'_>,
) -> Result<(), CallError> {
    let args = parse_args(raw_args)?;
    let backend = backend()?;

    tracing::info!(function, mutation, "Calling backend");
    let value = if mutation {
        backend.mutation(function, args, credentials).await?
    } else {
        backend.query(function, args, credentials).await?
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&value).map_err(CallError::Format)?
    );
    Ok(())
}

/// Poll a query and print every change until interrupted.
///
/// # Errors
///
/// Returns `CallError` if the arguments are invalid or the configuration is
/// incomplete. Failed polls are logged and retried.
#[allow(clippy::print_stdout)]
pub async fn watch(
    function: String,
    raw_args: &str,
    token: Option<String>,
    interval_secs: u64,
) -> Result<(), CallError> {
    let args = parse_args(raw_args)?;
    let backend: Arc<dyn Backend> = Arc::new(backend()?);
    let mut updates = subscribe_query(
        backend,
        function,
        args,
        token,
        Duration::from_secs(interval_secs.max(1)),
    );

    loop {
        let current = updates.borrow_and_update().clone();
        println!(
            "{}",
            serde_json::to_string_pretty(&current).map_err(CallError::Format)?
        );

        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}
