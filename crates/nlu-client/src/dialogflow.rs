//! HTTP client for the Dialogflow v2 detectIntent endpoint.

use crate::token::TokenSource;
use crate::wire::{parse_response, session_url, DetectIntentRequest};
use crate::{NluBackendKind, NluClient, NluConfig, NluError, NluMetadata, NluReply, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct DialogflowClient {
    config: NluConfig,
    client: reqwest::Client,
    tokens: Box<dyn TokenSource>,
}

impl DialogflowClient {
    pub fn new(config: NluConfig, tokens: Box<dyn TokenSource>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| NluError::Http(e.to_string()))?;
        Ok(Self {
            config,
            client,
            tokens,
        })
    }
}

#[async_trait]
impl NluClient for DialogflowClient {
    async fn detect_intent(&self, session_id: &str, text: &str) -> Result<NluReply> {
        let url = session_url(&self.config.endpoint, &self.config.project_id, session_id)?;
        let token = self.tokens.token().await?;
        let body = DetectIntentRequest::new(text, &self.config.language_code);

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .header("Content-Type", "application/json; charset=utf-8")
            .json(&body)
            .send()
            .await
            .map_err(|e| NluError::Http(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NluError::Status(resp.status().as_u16()));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| NluError::Http(e.to_string()))?;
        let reply = parse_response(&bytes)?;
        tracing::debug!(
            intent = %reply.intent_name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "dialogflow detectIntent"
        );
        Ok(reply)
    }

    fn metadata(&self) -> NluMetadata {
        NluMetadata {
            name: format!("Dialogflow agent {}", self.config.project_id),
            backend: NluBackendKind::Dialogflow,
            language_code: self.config.language_code.clone(),
        }
    }
}
