//! Bearer token sources for authorizing NLU calls

use crate::{NluConfig, NluError, Result};
use async_trait::async_trait;

/// Supplies the bearer token attached to each NLU request
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn token(&self) -> Result<String>;
}

/// A fixed, pre-issued token
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String> {
        if self.0.is_empty() {
            return Err(NluError::Token("static token is empty".to_string()));
        }
        Ok(self.0.clone())
    }
}

/// Asks `gcloud auth application-default print-access-token` on every call
pub struct GcloudToken {
    program: String,
}

impl GcloudToken {
    pub fn new() -> Self {
        Self {
            program: "gcloud".to_string(),
        }
    }

    /// Use a different executable, e.g. a wrapper script
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GcloudToken {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenSource for GcloudToken {
    async fn token(&self) -> Result<String> {
        let output = tokio::process::Command::new(&self.program)
            .args(["auth", "application-default", "print-access-token"])
            .output()
            .await
            .map_err(|e| NluError::Token(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            return Err(NluError::Token(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let token = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        if token.is_empty() {
            return Err(NluError::Token("gcloud printed an empty token".to_string()));
        }
        Ok(token)
    }
}

/// Pick a token source from configuration
pub fn from_config(config: &NluConfig) -> Result<Box<dyn TokenSource>> {
    if let Some(token) = config.access_token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(Box::new(StaticToken::new(token)));
    }
    if config.use_gcloud_token {
        return Ok(Box::new(GcloudToken::new()));
    }
    Err(NluError::Token(
        "no access token configured and gcloud token lookup disabled".to_string(),
    ))
}
