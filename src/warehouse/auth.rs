//! OAuth access token lookup for the BigQuery REST API

use std::process::Command;

use crate::error::{PipelineError, Result};

/// Environment variable holding a ready-made access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Resolve an access token from the environment, falling back to the gcloud CLI
pub fn access_token() -> Result<String> {
    if let Some(token) = token_from_env(std::env::var(ACCESS_TOKEN_ENV).ok()) {
        tracing::debug!("using access token from {}", ACCESS_TOKEN_ENV);
        return Ok(token);
    }

    tracing::debug!("requesting access token from gcloud");
    let output = Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .map_err(|e| {
            PipelineError::Auth(format!(
                "{} is not set and gcloud could not be run: {}",
                ACCESS_TOKEN_ENV, e
            ))
        })?;

    if !output.status.success() {
        return Err(PipelineError::Auth(format!(
            "gcloud auth print-access-token failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    token_from_env(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
        .ok_or_else(|| PipelineError::Auth("gcloud returned an empty access token".to_string()))
}

fn token_from_env(value: Option<String>) -> Option<String> {
    value
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}
