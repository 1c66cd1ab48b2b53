//! Per-utterance driver: confirmation, page rules, then the NLU fallback.

use crate::intents;
use crate::protocol::now_millis;
use crate::rules::rule_for;
use crate::session::SessionStore;
use crate::transition::{evaluate, Resolution, Transition};
use crate::{DialogResponse, UtteranceEvent};
use nlu_client::NluClient;
use slot_matcher::SlotCatalog;
use std::sync::Arc;
use std::time::Duration;

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on one NLU round trip
    pub nlu_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nlu_timeout: Duration::from_millis(5000),
        }
    }
}

/// Which stage produced the response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandledBy {
    Confirmation,
    Keyword,
    Nlu,
    /// The NLU call errored or timed out
    NluFailed,
    NoMatch,
    Cancelled,
    Silent,
}

#[derive(Debug, Clone)]
pub struct Turn {
    pub response: DialogResponse,
    pub handled_by: HandledBy,
}

pub struct DialogEngine {
    catalog: Arc<SlotCatalog>,
    store: Arc<SessionStore>,
    nlu: Arc<dyn NluClient>,
    config: EngineConfig,
}

impl DialogEngine {
    pub fn new(
        catalog: Arc<SlotCatalog>,
        store: Arc<SessionStore>,
        nlu: Arc<dyn NluClient>,
        config: EngineConfig,
    ) -> Self {
        tracing::info!(
            nlu = %nlu.metadata().name,
            timeout_ms = config.nlu_timeout.as_millis() as u64,
            "dialog engine ready"
        );
        Self {
            catalog,
            store,
            nlu,
            config,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Produce exactly one response for `event`
    pub async fn handle(&self, event: &UtteranceEvent) -> Turn {
        if let Some(response) = self.store.resolve(event) {
            return Turn {
                response,
                handled_by: HandledBy::Confirmation,
            };
        }

        let rule = rule_for(event.current_page);
        let evaluation = evaluate(rule, &event.query, &self.catalog);
        let (transition, handled_by) = if evaluation.needs_fallback(rule) {
            self.fallback(event).await
        } else {
            let handled_by = match evaluation.resolution {
                Resolution::Matched | Resolution::Negated | Resolution::Routed => {
                    HandledBy::Keyword
                }
                Resolution::Cancelled => HandledBy::Cancelled,
                Resolution::Silent => HandledBy::Silent,
                Resolution::Empty | Resolution::Unmatched => HandledBy::NoMatch,
            };
            (evaluation.transition, handled_by)
        };

        let response = DialogResponse {
            session_id: event.session_id,
            client_seq: event.client_seq,
            previous_page: event.current_page,
            proposed_page: transition.next_page,
            timestamp_ms: now_millis(),
            kind: transition.kind,
            prompt: transition.prompt,
            entities: transition.entities,
        };

        if response.awaits_confirmation() {
            self.store.propose(response.clone());
        }

        tracing::debug!(
            session = %event.session_id,
            page = event.current_page,
            next = response.proposed_page,
            handled_by = ?handled_by,
            "utterance handled"
        );
        Turn {
            response,
            handled_by,
        }
    }

    /// Ask the NLU service; no store lock is held here
    async fn fallback(&self, event: &UtteranceEvent) -> (Transition, HandledBy) {
        let session = event.session_id.to_string();
        let call = self.nlu.detect_intent(&session, &event.query);
        match tokio::time::timeout(self.config.nlu_timeout, call).await {
            Ok(Ok(reply)) if reply.is_empty() && reply.reply_text.trim().is_empty() => {
                (Transition::not_understood(), HandledBy::NoMatch)
            }
            Ok(Ok(reply)) => (intents::apply(event.current_page, &reply), HandledBy::Nlu),
            Ok(Err(e)) => {
                tracing::warn!(session = %event.session_id, error = %e, "NLU request failed");
                (Transition::not_understood(), HandledBy::NluFailed)
            }
            Err(_) => {
                tracing::warn!(
                    session = %event.session_id,
                    timeout_ms = self.config.nlu_timeout.as_millis() as u64,
                    "NLU request timed out"
                );
                (Transition::not_understood(), HandledBy::NluFailed)
            }
        }
    }
}
