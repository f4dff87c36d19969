use anyhow::Context;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;

use crate::domain::company::CompanyEvent;

// ============================================================================
// Event Tail - follow the company topic and log every event
// ============================================================================

#[derive(Debug, thiserror::Error)]
enum DecodeError {
    #[error("message has no payload")]
    Empty,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn decode_event(payload: Option<&[u8]>) -> Result<CompanyEvent, DecodeError> {
    let payload = payload.ok_or(DecodeError::Empty)?;
    Ok(serde_json::from_slice(payload)?)
}

/// Consume `topic` from the earliest offset until Ctrl-C. Messages that do
/// not decode as company events are logged and skipped.
pub async fn tail_events(brokers: &str, group_id: &str, topic: &str) -> anyhow::Result<()> {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("group.id", group_id)
        .set("auto.offset.reset", "earliest")
        .set("enable.partition.eof", "false")
        .create()
        .context("failed to create Kafka consumer")?;

    consumer
        .subscribe(&[topic])
        .with_context(|| format!("failed to subscribe to {topic}"))?;

    tracing::info!(topic, group_id, "Tailing company events (Ctrl-C to stop)");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Stopping event tail");
                return Ok(());
            }
            received = consumer.recv() => match received {
                Ok(message) => match decode_event(message.payload()) {
                    Ok(event) => tracing::info!(
                        event_type = %event.event_type,
                        company_id = %event.company.id(),
                        timestamp = %event.timestamp,
                        partition = message.partition(),
                        offset = message.offset(),
                        "Received event"
                    ),
                    Err(e) => tracing::warn!(
                        error = %e,
                        partition = message.partition(),
                        offset = message.offset(),
                        "Skipping undecodable message"
                    ),
                },
                Err(e) => tracing::error!(error = %e, "Error consuming message"),
            }
        }
    }
}
