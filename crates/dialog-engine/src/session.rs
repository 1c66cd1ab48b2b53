//! Pending actions awaiting the client's confirmation.
//!
//! A session holds at most one entry: the last response that asked the client
//! to act. The next event carrying an action result consumes it.

use crate::protocol::now_millis;
use crate::{ActionResult, DialogResponse, Entities, Page, ResponseKind, SessionId, UtteranceEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Instant;

/// Spoken when the client reports that the action failed
pub const APOLOGY: &str = "Sorry, I could not finish that. Please try again.";

#[derive(Debug, Clone)]
pub struct SessionEntry {
    pub response: DialogResponse,
    pub proposed_at: Instant,
}

/// Process-wide map of pending actions, shared by all connections
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: Mutex<HashMap<SessionId, SessionEntry>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `response` as the session's pending action, replacing any older one
    pub fn propose(&self, response: DialogResponse) -> Option<SessionEntry> {
        let session_id = response.session_id;
        let entry = SessionEntry {
            response,
            proposed_at: Instant::now(),
        };
        let replaced = self.entries.lock().insert(session_id, entry);
        if let Some(old) = &replaced {
            tracing::debug!(
                session = %session_id,
                replaced_page = old.response.proposed_page,
                "pending action replaced"
            );
        }
        replaced
    }

    /// Remove and return the pending entry in one step
    pub fn take(&self, session_id: SessionId) -> Option<SessionEntry> {
        self.entries.lock().remove(&session_id)
    }

    pub fn contains(&self, session_id: SessionId) -> bool {
        self.entries.lock().contains_key(&session_id)
    }

    /// Copy of the pending response, if any
    pub fn get(&self, session_id: SessionId) -> Option<DialogResponse> {
        self.entries
            .lock()
            .get(&session_id)
            .map(|entry| entry.response.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Consume the session's pending entry with the event's action result.
    ///
    /// Returns `None` when the event carries no result or nothing is pending;
    /// the caller then treats the event as an ordinary utterance.
    pub fn resolve(&self, event: &UtteranceEvent) -> Option<DialogResponse> {
        let result = event.action_result.as_ref()?;
        let Some(entry) = self.take(event.session_id) else {
            tracing::warn!(
                session = %event.session_id,
                result = ?result,
                "action result with nothing pending"
            );
            return None;
        };

        let pending = entry.response;
        tracing::debug!(
            session = %event.session_id,
            result = ?result,
            proposed = pending.proposed_page,
            waited_ms = entry.proposed_at.elapsed().as_millis() as u64,
            "resolving pending action"
        );

        let response = match result {
            ActionResult::ActionTrue => DialogResponse {
                previous_page: pending.proposed_page,
                kind: ResponseKind::Prompt,
                ..pending
            },
            ActionResult::ActionFalse => DialogResponse {
                proposed_page: Page::NoMatch.code(),
                kind: ResponseKind::Prompt,
                prompt: APOLOGY.to_string(),
                entities: Entities::new(),
                ..pending
            },
            other => DialogResponse {
                proposed_page: pending.previous_page,
                kind: ResponseKind::Prompt,
                prompt: diagnostic(other, pending.previous_page),
                entities: Entities::new(),
                ..pending
            },
        };

        Some(DialogResponse {
            session_id: event.session_id,
            client_seq: event.client_seq,
            timestamp_ms: now_millis(),
            ..response
        })
    }
}

fn diagnostic(result: &ActionResult, expected_page: u32) -> String {
    let page = match Page::from_code(expected_page) {
        Some(page) => page.to_string(),
        None => expected_page.to_string(),
    };
    match result {
        ActionResult::PageWrong => format!("The screen is on the wrong page. Please go back to page {}.", page),
        ActionResult::ItemNotFound => format!("I could not find that item. Please go back to page {}.", page),
        ActionResult::Other(raw) => format!("Unexpected result {:?}. Please go back to page {}.", raw, page),
        ActionResult::ActionTrue | ActionResult::ActionFalse => {
            format!("Please go back to page {}.", page)
        }
    }
}
