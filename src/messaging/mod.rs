mod consumer;
mod kafka;
#[cfg(test)]
mod recording;

use async_trait::async_trait;

use crate::domain::company::CompanyEvent;

pub use consumer::tail_events;
pub use kafka::KafkaEventPublisher;
#[cfg(test)]
pub use recording::RecordingPublisher;

// ============================================================================
// Messaging - outbound company events
// ============================================================================
//
// The command pipeline only sees `EventPublisher`. A returned `Ok` means the
// event was handed to the broker client; delivery is confirmed later and
// reported through logs and metrics.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("event publisher is unavailable: {0}")]
    Unavailable(String),

    #[error("could not serialize event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("broker rejected the event: {0}")]
    Handoff(String),
}

impl PublishError {
    /// Label used for the failure metric.
    pub fn stage(&self) -> &'static str {
        match self {
            PublishError::Unavailable(_) => "circuit_open",
            PublishError::Serialize(_) | PublishError::Handoff(_) => "handoff",
        }
    }
}

#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: CompanyEvent) -> Result<(), PublishError>;
}
