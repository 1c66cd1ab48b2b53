use serde::{Deserialize, Serialize};
use std::fmt;

/// Which NLU implementation to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NluBackendKind {
    Mock,
    Dialogflow,
}

impl fmt::Display for NluBackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NluBackendKind::Mock => f.write_str("mock"),
            NluBackendKind::Dialogflow => f.write_str("dialogflow"),
        }
    }
}

/// NLU client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NluConfig {
    pub backend: NluBackendKind,
    /// Dialogflow agent project id
    pub project_id: String,
    /// Language code sent with every query ("en")
    pub language_code: String,
    /// API base, without a trailing slash
    pub endpoint: String,
    /// Upper bound for one detect-intent round trip
    pub timeout_ms: u64,
    /// Pre-issued bearer token; takes precedence over gcloud
    #[serde(default)]
    pub access_token: Option<String>,
    /// Ask the gcloud CLI for an application-default token on every call
    #[serde(default)]
    pub use_gcloud_token: bool,
}

impl Default for NluConfig {
    fn default() -> Self {
        Self {
            backend: NluBackendKind::Mock,
            project_id: "chipotle-aeeb4".to_string(),
            language_code: "en".to_string(),
            endpoint: "https://dialogflow.googleapis.com/v2".to_string(),
            timeout_ms: 5000,
            access_token: None,
            use_gcloud_token: false,
        }
    }
}

/// What the NLU service understood from one utterance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NluReply {
    /// Fulfillment text. The ordering agent uses it as a sub-state key
    /// ("fillings", "Done", ...) for some intents.
    pub reply_text: String,
    /// Detected intent display name, empty when nothing matched
    pub intent_name: String,
    /// Parameters extracted by the agent
    #[serde(default)]
    pub entities: serde_json::Map<String, serde_json::Value>,
}

impl NluReply {
    pub fn new(intent_name: &str, reply_text: &str) -> Self {
        Self {
            reply_text: reply_text.to_string(),
            intent_name: intent_name.to_string(),
            entities: serde_json::Map::new(),
        }
    }

    pub fn with_entity(mut self, key: &str, value: serde_json::Value) -> Self {
        self.entities.insert(key.to_string(), value);
        self
    }

    /// True when the agent matched no intent at all
    pub fn is_empty(&self) -> bool {
        self.intent_name.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = NluConfig::default();
        assert_eq!(config.backend, NluBackendKind::Mock);
        assert_eq!(config.language_code, "en");
        assert_eq!(config.timeout_ms, 5000);
        assert!(config.access_token.is_none());
    }

    #[test]
    fn test_backend_kind_names() {
        let kind: NluBackendKind = serde_json::from_str("\"dialogflow\"").unwrap();
        assert_eq!(kind, NluBackendKind::Dialogflow);
        assert_eq!(kind.to_string(), "dialogflow");
    }

    #[test]
    fn test_reply_builder() {
        let reply = NluReply::new("chipotle.burrito", "address")
            .with_entity("address", serde_json::json!("recent"));
        assert!(!reply.is_empty());
        assert_eq!(reply.entities["address"], "recent");
        assert!(NluReply::default().is_empty());
    }
}
