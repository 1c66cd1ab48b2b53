//! Wire messages exchanged with the client device.
//!
//! Inbound: `{"header": [session, seq, page, r, r, r], "data": {"query", "result"}}`
//! Outbound: `{"header": [session, seq, previous, proposed, ts_ms, 3, 0], "data": {"speech", "entity"}}`

use crate::{Page, ProtocolError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use time::OffsetDateTime;

/// Marker in header slot 5 of every outbound message
pub const PROTOCOL_VERSION: u64 = 3;

/// Speech sent while the client is selecting an option on screen
pub const SELECTING_SPEECH: &str = "selecting";

/// Speech sent while the client is performing a navigation task
pub const PERFORMING_SPEECH: &str = "Performing task now.";

/// Client session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of a client-side action, reported back in `data.result`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    ActionTrue,
    ActionFalse,
    PageWrong,
    ItemNotFound,
    /// Any other non-empty value
    Other(String),
}

impl ActionResult {
    /// Parse `data.result`. Empty means "not a confirmation".
    pub fn parse(raw: &str) -> Option<ActionResult> {
        match raw.trim() {
            "" => None,
            "actionTrue" => Some(ActionResult::ActionTrue),
            "actionFalse" => Some(ActionResult::ActionFalse),
            "pageWrong" => Some(ActionResult::PageWrong),
            "itemNotFound" => Some(ActionResult::ItemNotFound),
            other => Some(ActionResult::Other(other.to_string())),
        }
    }
}

/// Whether a response is conversation or an action the client must carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseKind {
    /// Speak the prompt
    Prompt,
    /// Client selects the matched option(s) on screen
    Selecting,
    /// Client performs a navigation task
    Performing,
}

impl ResponseKind {
    pub fn is_action(self) -> bool {
        !matches!(self, ResponseKind::Prompt)
    }

    /// The fixed speech string signalling a dispatched action
    pub fn sentinel(self) -> Option<&'static str> {
        match self {
            ResponseKind::Prompt => None,
            ResponseKind::Selecting => Some(SELECTING_SPEECH),
            ResponseKind::Performing => Some(PERFORMING_SPEECH),
        }
    }
}

/// One or more values for a slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SlotValue {
    One(String),
    /// Possibly empty: an empty list means the user declined the slot
    Many(Vec<String>),
    /// Anything else the NLU agent returned
    Raw(serde_json::Value),
}

impl SlotValue {
    pub fn from_json(value: &serde_json::Value) -> SlotValue {
        match value {
            serde_json::Value::String(s) => SlotValue::One(s.clone()),
            serde_json::Value::Array(items) if items.iter().all(|v| v.is_string()) => {
                SlotValue::Many(
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect(),
                )
            }
            other => SlotValue::Raw(other.clone()),
        }
    }
}

/// Slot name to matched value(s)
pub type Entities = BTreeMap<String, SlotValue>;

/// One inbound utterance, decoded and validated
#[derive(Debug, Clone, PartialEq)]
pub struct UtteranceEvent {
    pub session_id: SessionId,
    pub client_seq: u64,
    pub current_page: u32,
    pub query: String,
    pub action_result: Option<ActionResult>,
}

impl UtteranceEvent {
    pub fn new(session_id: u64, current_page: u32, query: &str) -> Self {
        Self {
            session_id: SessionId(session_id),
            client_seq: 0,
            current_page,
            query: query.to_string(),
            action_result: None,
        }
    }

    pub fn with_result(mut self, result: ActionResult) -> Self {
        self.action_result = Some(result);
        self
    }

    pub fn with_seq(mut self, client_seq: u64) -> Self {
        self.client_seq = client_seq;
        self
    }
}

/// Server answer to one utterance
#[derive(Debug, Clone, PartialEq)]
pub struct DialogResponse {
    pub session_id: SessionId,
    pub client_seq: u64,
    pub previous_page: u32,
    pub proposed_page: u32,
    pub timestamp_ms: u64,
    pub kind: ResponseKind,
    /// Human-readable prompt; for actions, the prompt of the page being entered
    pub prompt: String,
    pub entities: Entities,
}

impl DialogResponse {
    /// The speech string as sent on the wire
    pub fn speech(&self) -> &str {
        match self.kind.sentinel() {
            Some(sentinel) => sentinel,
            None => &self.prompt,
        }
    }

    pub fn status_code(&self) -> u64 {
        PROTOCOL_VERSION
    }

    pub fn proposes(&self, page: Page) -> bool {
        self.proposed_page == page.code()
    }

    /// True when the client must carry out an action and report back
    pub fn awaits_confirmation(&self) -> bool {
        self.kind.is_action() && self.proposed_page != self.previous_page
    }

    pub fn to_message(&self) -> OutboundMessage {
        OutboundMessage {
            header: [
                self.session_id.0,
                self.client_seq,
                u64::from(self.previous_page),
                u64::from(self.proposed_page),
                self.timestamp_ms,
                self.status_code(),
                0,
            ],
            data: OutboundData {
                speech: self.speech().to_string(),
                entity: self.entities.clone(),
            },
        }
    }

    /// Serialize to the JSON text frame sent to the client
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_message())?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(alias = "Header")]
    pub header: [f64; 6],
    #[serde(alias = "Data", default)]
    pub data: InboundData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundData {
    #[serde(alias = "Query", default)]
    pub query: String,
    #[serde(alias = "Result", default)]
    pub result: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundMessage {
    pub header: [u64; 7],
    pub data: OutboundData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundData {
    pub speech: String,
    pub entity: Entities,
}

fn header_u64(field: &'static str, value: f64) -> Result<u64> {
    if value.is_finite() && value >= 0.0 && value <= u64::MAX as f64 && value.fract() == 0.0 {
        Ok(value as u64)
    } else {
        Err(ProtocolError::InvalidHeader {
            field,
            kind: "unsigned integer",
            value,
        })
    }
}

fn header_page(value: f64) -> Result<u32> {
    let code = header_u64("currentPage", value)?;
    u32::try_from(code).map_err(|_| ProtocolError::InvalidHeader {
        field: "currentPage",
        kind: "page code",
        value,
    })
}

impl TryFrom<InboundMessage> for UtteranceEvent {
    type Error = ProtocolError;

    fn try_from(msg: InboundMessage) -> Result<Self> {
        Ok(UtteranceEvent {
            session_id: SessionId(header_u64("sessionId", msg.header[0])?),
            client_seq: header_u64("clientSeq", msg.header[1])?,
            current_page: header_page(msg.header[2])?,
            query: msg.data.query,
            action_result: ActionResult::parse(&msg.data.result),
        })
    }
}

/// Decode one inbound JSON text frame
pub fn decode_event(text: &str) -> Result<UtteranceEvent> {
    let msg: InboundMessage = serde_json::from_str(text)?;
    UtteranceEvent::try_from(msg)
}

/// Milliseconds since the Unix epoch
pub fn now_millis() -> u64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
    u64::try_from(nanos / 1_000_000).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(kind: ResponseKind, prompt: &str) -> DialogResponse {
        DialogResponse {
            session_id: SessionId(42),
            client_seq: 7,
            previous_page: 100,
            proposed_page: 1000,
            timestamp_ms: 1_700_000_000_000,
            kind,
            prompt: prompt.to_string(),
            entities: Entities::new(),
        }
    }

    #[test]
    fn test_decode_event() {
        let event = decode_event(
            r#"{"header":[42,7,1100,0,0,0],"data":{"query":"chicken please","result":""}}"#,
        )
        .unwrap();
        assert_eq!(event.session_id, SessionId(42));
        assert_eq!(event.client_seq, 7);
        assert_eq!(event.current_page, 1100);
        assert_eq!(event.query, "chicken please");
        assert_eq!(event.action_result, None);
    }

    #[test]
    fn test_decode_accepts_capitalized_fields_and_floats() {
        let event = decode_event(
            r#"{"Header":[42.0,1.0,1000.0,0,0,0],"Data":{"Query":"","Result":"actionTrue"}}"#,
        )
        .unwrap();
        assert_eq!(event.current_page, 1000);
        assert_eq!(event.action_result, Some(ActionResult::ActionTrue));
    }

    #[test]
    fn test_decode_without_data_block() {
        let event = decode_event(r#"{"header":[1,2,100,0,0,0]}"#).unwrap();
        assert!(event.query.is_empty());
        assert!(event.action_result.is_none());
    }

    #[test]
    fn test_decode_rejects_malformed_payloads() {
        assert!(matches!(
            decode_event("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            decode_event(r#"{"header":[1,2,3],"data":{}}"#),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            decode_event(r#"{"header":[-1,2,100,0,0,0]}"#),
            Err(ProtocolError::InvalidHeader { field: "sessionId", .. })
        ));
        assert!(matches!(
            decode_event(r#"{"header":[1,2,100.5,0,0,0]}"#),
            Err(ProtocolError::InvalidHeader { field: "currentPage", .. })
        ));
        assert!(matches!(
            decode_event(r#"{"header":[1,2,5000000000,0,0,0]}"#),
            Err(ProtocolError::InvalidHeader { field: "currentPage", .. })
        ));
    }

    #[test]
    fn test_action_result_parsing() {
        assert_eq!(ActionResult::parse(""), None);
        assert_eq!(ActionResult::parse("  "), None);
        assert_eq!(ActionResult::parse("actionFalse"), Some(ActionResult::ActionFalse));
        assert_eq!(ActionResult::parse("pageWrong"), Some(ActionResult::PageWrong));
        assert_eq!(ActionResult::parse("itemNotFound"), Some(ActionResult::ItemNotFound));
        assert_eq!(
            ActionResult::parse("timeout"),
            Some(ActionResult::Other("timeout".to_string()))
        );
    }

    #[test]
    fn test_speech_uses_sentinels_for_actions() {
        assert_eq!(response(ResponseKind::Selecting, "which fillings?").speech(), "selecting");
        assert_eq!(
            response(ResponseKind::Performing, "x").speech(),
            "Performing task now."
        );
        assert_eq!(response(ResponseKind::Prompt, "Any drinks?").speech(), "Any drinks?");
    }

    #[test]
    fn test_encode_outbound_message() {
        let mut resp = response(ResponseKind::Selecting, "which fillings do you want?");
        resp.entities
            .insert("ordertype".to_string(), SlotValue::One("burrito".to_string()));
        resp.entities.insert("rice".to_string(), SlotValue::Many(vec![]));

        let value: serde_json::Value = serde_json::from_str(&resp.encode().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "header": [42, 7, 100, 1000, 1_700_000_000_000u64, 3, 0],
                "data": {"speech": "selecting", "entity": {"ordertype": "burrito", "rice": []}}
            })
        );
    }

    #[test]
    fn test_slot_value_from_json() {
        assert_eq!(
            SlotValue::from_json(&json!("recent")),
            SlotValue::One("recent".to_string())
        );
        assert_eq!(
            SlotValue::from_json(&json!(["a", "b"])),
            SlotValue::Many(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(SlotValue::from_json(&json!(2)), SlotValue::Raw(json!(2)));
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2020-09-13 in milliseconds
        assert!(now_millis() > 1_600_000_000_000);
    }
}
