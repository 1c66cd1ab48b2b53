//! Scripted NLU client for development and testing

use crate::{NluBackendKind, NluClient, NluError, NluMetadata, NluReply, Result};
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Answers from a fixed table keyed by the lowercased, trimmed utterance.
/// Unknown utterances get an empty reply (no intent).
#[derive(Default)]
pub struct MockNlu {
    replies: HashMap<String, NluReply>,
    failure: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockNlu {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small script covering the common fallback intents
    pub fn scripted() -> Self {
        Self::new()
            .with_reply("hello", NluReply::new("Default Welcome Intent", "Hi! What can I get you today?"))
            .with_reply(
                "i want a burrito",
                NluReply::new("chipotle.burrito", "fillings"),
            )
            .with_reply(
                "burrito to my favorite place",
                NluReply::new("chipotle.burrito", "address").with_entity("address", json!("favorite")),
            )
            .with_reply("what's in my basket", NluReply::new("chipotle.cart", "Here is your bag."))
            .with_reply(
                "what did i get last time",
                NluReply::new("chipotle.recents", "Here are your recent orders."),
            )
            .with_reply(
                "around lunch",
                NluReply::new("chipotle.confirm", "payment")
                    .with_entity("time", json!("2026-10-19T12:00:00-07:00"))
                    .with_entity("payment", json!("credit card")),
            )
            .with_reply(
                "go ahead and finish up",
                NluReply::new("chipotle.confirm - yes", "Your order is placed!"),
            )
    }

    pub fn with_reply(mut self, utterance: &str, reply: NluReply) -> Self {
        self.replies.insert(normalize(utterance), reply);
        self
    }

    /// Fail every call with the given message
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    /// Sleep before answering, to exercise caller timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of detect-intent calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

#[async_trait]
impl NluClient for MockNlu {
    async fn detect_intent(&self, session_id: &str, text: &str) -> Result<NluReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(NluError::Scripted(message.clone()));
        }
        let reply = self.replies.get(&normalize(text)).cloned().unwrap_or_default();
        tracing::debug!(session_id, intent = %reply.intent_name, "mock NLU reply");
        Ok(reply)
    }

    fn metadata(&self) -> NluMetadata {
        NluMetadata {
            name: "Mock NLU".to_string(),
            backend: NluBackendKind::Mock,
            language_code: "en".to_string(),
        }
    }
}
