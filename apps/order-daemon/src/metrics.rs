use dialog_engine::{HandledBy, Turn};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone)]
pub struct DialogMetrics {
    pub utterances: IntCounter,
    pub nlu_fallbacks: IntCounter,
    pub nlu_failures: IntCounter,
    pub confirmations: IntCounter,
    pub malformed_frames: IntCounter,
    pub connections: IntGauge,
    pub pending_sessions: IntGauge,
}

#[derive(Clone)]
pub struct MetricsHub {
    pub registry: Registry,
    pub dialog: DialogMetrics,
}

impl MetricsHub {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let dialog = DialogMetrics {
            utterances: IntCounter::new("order_utterances_total", "Utterance events handled")?,
            nlu_fallbacks: IntCounter::new(
                "order_nlu_fallbacks_total",
                "Utterances answered by the NLU service",
            )?,
            nlu_failures: IntCounter::new(
                "order_nlu_failures_total",
                "NLU calls that failed or timed out",
            )?,
            confirmations: IntCounter::new(
                "order_confirmations_total",
                "Pending actions resolved by the client",
            )?,
            malformed_frames: IntCounter::new(
                "order_malformed_frames_total",
                "Inbound frames that could not be decoded",
            )?,
            connections: IntGauge::new("order_connections", "Open WebSocket connections")?,
            pending_sessions: IntGauge::new(
                "order_pending_sessions",
                "Sessions waiting for an action result",
            )?,
        };
        registry.register(Box::new(dialog.utterances.clone()))?;
        registry.register(Box::new(dialog.nlu_fallbacks.clone()))?;
        registry.register(Box::new(dialog.nlu_failures.clone()))?;
        registry.register(Box::new(dialog.confirmations.clone()))?;
        registry.register(Box::new(dialog.malformed_frames.clone()))?;
        registry.register(Box::new(dialog.connections.clone()))?;
        registry.register(Box::new(dialog.pending_sessions.clone()))?;
        Ok(Self { registry, dialog })
    }

    /// Count one handled utterance
    pub fn record(&self, turn: &Turn, pending: usize) {
        self.dialog.utterances.inc();
        match turn.handled_by {
            HandledBy::Nlu => self.dialog.nlu_fallbacks.inc(),
            HandledBy::NluFailed => {
                self.dialog.nlu_fallbacks.inc();
                self.dialog.nlu_failures.inc();
            }
            HandledBy::Confirmation => self.dialog.confirmations.inc(),
            _ => {}
        }
        self.dialog.pending_sessions.set(pending as i64);
    }

    pub fn encode_text(&self) -> String {
        let mut buf = Vec::new();
        let encoder = TextEncoder::new();
        if let Err(e) = encoder.encode(&self.registry.gather(), &mut buf) {
            return format!("error encoding metrics: {e}");
        }
        String::from_utf8(buf).unwrap_or_default()
    }
}
