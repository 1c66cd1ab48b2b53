use crate::{NluBackendKind, NluReply, Result};
use async_trait::async_trait;

/// Intent detection service consulted when keyword rules do not resolve a page
#[async_trait]
pub trait NluClient: Send + Sync {
    /// Detect the intent of `text` within the agent session `session_id`
    async fn detect_intent(&self, session_id: &str, text: &str) -> Result<NluReply>;

    /// Get client metadata
    fn metadata(&self) -> NluMetadata;
}

/// Metadata about an NLU client
#[derive(Debug, Clone)]
pub struct NluMetadata {
    pub name: String,
    pub backend: NluBackendKind,
    pub language_code: String,
}
