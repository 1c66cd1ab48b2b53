//! nlu-client: fallback intent detection for utterances the keyword tables miss
//!
//! The dialog engine only talks to the [`NluClient`] trait. Backends are feature
//! gated: `mock` (default) answers from a script, `dialogflow` calls the
//! Dialogflow v2 `detectIntent` REST endpoint.

mod types;
pub use types::{NluBackendKind, NluConfig, NluReply};

mod error;
pub use error::{NluError, Result};

mod traits;
pub use traits::{NluClient, NluMetadata};

pub mod token;
pub use token::{GcloudToken, StaticToken, TokenSource};

pub mod wire;

#[cfg(feature = "mock")]
pub mod mock;
#[cfg(feature = "mock")]
pub use mock::MockNlu;

#[cfg(feature = "dialogflow")]
pub mod dialogflow;
#[cfg(feature = "dialogflow")]
pub use dialogflow::DialogflowClient;

use std::sync::Arc;

/// Initialize the NLU client system
pub fn init() -> Result<()> {
    tracing::info!("Initializing NLU fallback client system");
    Ok(())
}

/// Create an NLU client based on configuration
pub fn create_client(config: NluConfig) -> Result<Arc<dyn NluClient>> {
    match config.backend {
        #[cfg(feature = "mock")]
        NluBackendKind::Mock => Ok(Arc::new(MockNlu::scripted())),
        #[cfg(feature = "dialogflow")]
        NluBackendKind::Dialogflow => {
            let tokens = token::from_config(&config)?;
            Ok(Arc::new(DialogflowClient::new(config, tokens)?))
        }
        #[allow(unreachable_patterns)]
        other => Err(NluError::Unsupported(format!(
            "{} backend not enabled in this build",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "mock")]
    #[tokio::test]
    async fn test_create_mock_client() {
        let client = create_client(NluConfig::default()).unwrap();
        assert_eq!(client.metadata().backend, NluBackendKind::Mock);
        let reply = client.detect_intent("1", "what's in my basket").await.unwrap();
        assert_eq!(reply.intent_name, "chipotle.cart");
    }

    #[cfg(not(feature = "dialogflow"))]
    #[test]
    fn test_disabled_backend_is_unsupported() {
        let config = NluConfig {
            backend: NluBackendKind::Dialogflow,
            ..NluConfig::default()
        };
        assert!(matches!(create_client(config), Err(NluError::Unsupported(_))));
    }
}
