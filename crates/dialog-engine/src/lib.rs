//! dialog-engine: the ordering conversation state machine
//!
//! Each utterance arrives with the page the client is showing. The engine
//! first settles any action the client was asked to perform, then runs the
//! page's keyword rules, and only then asks the NLU service. Responses that
//! ask the client to act are held in the [`SessionStore`] until the client
//! reports back.

mod error;
pub use error::{ProtocolError, Result};

mod page;
pub use page::Page;

pub mod protocol;
pub use protocol::{
    decode_event, ActionResult, DialogResponse, Entities, ResponseKind, SessionId, SlotValue,
    UtteranceEvent,
};

pub mod rules;
pub use rules::{rule_for, PageRule};

pub mod transition;
pub use transition::{evaluate, Evaluation, Resolution, Transition};

pub mod intents;

pub mod session;
pub use session::{SessionEntry, SessionStore};

mod engine;
pub use engine::{DialogEngine, EngineConfig, HandledBy, Turn};

/// Initialize the dialog engine
pub fn init() -> Result<()> {
    tracing::info!(
        "Initializing dialog engine with {} page rules",
        rules::all_rules().len()
    );
    Ok(())
}
