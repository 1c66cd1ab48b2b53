//! Dialogflow v2 `detectIntent` request and response bodies.
//!
//! Kept outside the `dialogflow` feature so the payload handling can be
//! exercised without an HTTP client.

use crate::{NluError, NluReply, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectIntentRequest<'a> {
    pub query_input: QueryInput<'a>,
}

#[derive(Debug, Serialize)]
pub struct QueryInput<'a> {
    pub text: TextInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextInput<'a> {
    pub text: &'a str,
    pub language_code: &'a str,
}

impl<'a> DetectIntentRequest<'a> {
    pub fn new(text: &'a str, language_code: &'a str) -> Self {
        Self {
            query_input: QueryInput {
                text: TextInput {
                    text,
                    language_code,
                },
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DetectIntentResponse {
    #[serde(default)]
    query_result: QueryResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryResult {
    #[serde(default)]
    fulfillment_text: String,
    #[serde(default)]
    intent: Option<IntentRef>,
    #[serde(default)]
    parameters: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentRef {
    #[serde(default)]
    display_name: String,
}

/// Build `{endpoint}/projects/{project}/agent/sessions/{session}:detectIntent`
pub fn session_url(endpoint: &str, project_id: &str, session_id: &str) -> Result<String> {
    if project_id.is_empty() || session_id.is_empty() {
        return Err(NluError::MissingSession {
            project: project_id.to_string(),
            session: session_id.to_string(),
        });
    }
    Ok(format!(
        "{}/projects/{}/agent/sessions/{}:detectIntent",
        endpoint.trim_end_matches('/'),
        project_id,
        session_id
    ))
}

/// Decode a detectIntent response body. Missing fields decode as empty.
pub fn parse_response(body: &[u8]) -> Result<NluReply> {
    let resp: DetectIntentResponse =
        serde_json::from_slice(body).map_err(|e| NluError::Decode(e.to_string()))?;
    let result = resp.query_result;
    Ok(NluReply {
        reply_text: result.fulfillment_text,
        intent_name: result.intent.map(|i| i.display_name).unwrap_or_default(),
        entities: result.parameters,
    })
}
